// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::podcast::non_blank;

/// Title used when an episode row has none
pub const UNTITLED_EPISODE: &str = "Untitled Episode";

/// Snapshot of an episode row as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    #[serde(rename = "episode_id")]
    pub id: i64,
    #[serde(default, rename = "episode_slug", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "content_encoded_html",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_html: Option<String>,
    #[serde(rename = "publication_date", deserialize_with = "timestamp")]
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosure_url: Option<String>,
    /// Older rows only carry the upload location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(
        default,
        rename = "enclosure_mime_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub mime_type: Option<String>,
    #[serde(
        default,
        rename = "enclosure_length_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub length_bytes: Option<u64>,
    #[serde(
        default,
        rename = "itunes_duration_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<u64>,
    #[serde(
        default,
        rename = "itunes_episode_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub episode_number: Option<u32>,
    #[serde(
        default,
        rename = "itunes_season_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub season_number: Option<u32>,
    #[serde(
        default,
        rename = "itunes_episode_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub episode_type: Option<String>,
    #[serde(default, rename = "itunes_explicit", skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,
    #[serde(
        default,
        rename = "itunes_image_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(default, rename = "speaker_name", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, rename = "itunes_summary", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Sermon series, published as the item category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

impl EpisodeRecord {
    /// Minimal record with only the required columns set
    pub fn new(id: i64, title: &str, published_at: DateTime<Utc>, enclosure_url: &str) -> Self {
        Self {
            id,
            slug: None,
            guid: None,
            title: title.to_string(),
            description: None,
            content_html: None,
            published_at,
            enclosure_url: Some(enclosure_url.to_string()),
            audio_url: None,
            mime_type: None,
            length_bytes: None,
            duration_seconds: None,
            episode_number: None,
            season_number: None,
            episode_type: None,
            explicit: None,
            image_url: None,
            author: None,
            summary: None,
            series: None,
        }
    }

    /// Title to publish, falling back to a placeholder for blank rows
    pub fn display_title(&self) -> &str {
        non_blank(Some(&self.title)).unwrap_or(UNTITLED_EPISODE)
    }

    /// Path segment of the episode's web page
    pub fn page_segment(&self) -> String {
        non_blank(self.slug.as_ref())
            .map(String::from)
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Raw enclosure location, preferring the dedicated enclosure column
    pub fn enclosure_source(&self) -> Option<&str> {
        non_blank(self.enclosure_url.as_ref()).or_else(|| non_blank(self.audio_url.as_ref()))
    }

    /// Full show notes: the HTML body, else the description
    pub fn show_notes(&self) -> Option<&str> {
        non_blank(self.content_html.as_ref()).or_else(|| non_blank(self.description.as_ref()))
    }

    /// Episode type for `itunes:episodeType`, if it is one Apple accepts
    pub fn episode_type(&self) -> Option<&'static str> {
        match self.episode_type.as_deref().map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("full") => Some("full"),
            Some(t) if t.eq_ignore_ascii_case("trailer") => Some("trailer"),
            Some(t) if t.eq_ignore_ascii_case("bonus") => Some("bonus"),
            _ => None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid publication date '{raw}'")))
}

/// Parse the timestamp shapes the catalog produces
///
/// Accepts RFC 3339, Postgres `timestamp[tz]` text, bare dates (midnight UTC)
/// and RFC 2822.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let offset_formats = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
    for format in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Naive values are stored as UTC
    let naive_formats = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
    for format in naive_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deserializes_catalog_row() {
        let row = r#"{
            "episode_id": 42,
            "guid": "f3b2c1",
            "title": "Ep 1: \"Hope\"",
            "description": "<p>Reading from Romans</p>",
            "publication_date": "2024-01-15T00:00:00+00:00",
            "enclosure_url": "https://cdn.example.com/ep1 final.mp3",
            "enclosure_mime_type": "audio/mpeg",
            "enclosure_length_bytes": 1234567,
            "itunes_duration_seconds": 1800,
            "itunes_episode_number": 1,
            "itunes_season_number": null,
            "itunes_episode_type": "Full",
            "series": "Romans"
        }"#;

        let episode: EpisodeRecord = serde_json::from_str(row).unwrap();

        assert_eq!(episode.id, 42);
        assert_eq!(episode.display_title(), "Ep 1: \"Hope\"");
        assert_eq!(
            episode.published_at,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(episode.length_bytes, Some(1234567));
        assert_eq!(episode.duration_seconds, Some(1800));
        assert_eq!(episode.episode_number, Some(1));
        assert!(episode.season_number.is_none());
        assert_eq!(episode.episode_type(), Some("full"));
        assert_eq!(episode.series.as_deref(), Some("Romans"));
    }

    #[test]
    fn null_title_falls_back_to_placeholder() {
        let row = r#"{
            "episode_id": 7,
            "title": null,
            "publication_date": "2024-03-01",
            "audio_url": "https://cdn.example.com/7.m4a"
        }"#;

        let episode: EpisodeRecord = serde_json::from_str(row).unwrap();

        assert_eq!(episode.display_title(), UNTITLED_EPISODE);
        assert_eq!(episode.enclosure_source(), Some("https://cdn.example.com/7.m4a"));
        assert_eq!(episode.page_segment(), "7");
    }

    #[test]
    fn rejects_unparseable_publication_date() {
        let row = r#"{"episode_id": 1, "publication_date": "last tuesday"}"#;
        assert!(serde_json::from_str::<EpisodeRecord>(row).is_err());
    }

    #[test]
    fn parse_timestamp_accepts_catalog_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 6, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-01-15T06:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 06:30:00+00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 08:30:00.000+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T06:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("Mon, 15 Jan 2024 06:30:00 +0000"),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("soon"), None);
    }

    #[test]
    fn show_notes_prefer_html_body() {
        let mut episode = EpisodeRecord::new(
            1,
            "t",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            "https://cdn.example.com/1.mp3",
        );
        episode.description = Some("short".to_string());
        assert_eq!(episode.show_notes(), Some("short"));

        episode.content_html = Some("<p>long</p>".to_string());
        assert_eq!(episode.show_notes(), Some("<p>long</p>"));
    }

    #[test]
    fn page_segment_prefers_slug() {
        let mut episode = EpisodeRecord::new(
            9,
            "t",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            "https://cdn.example.com/9.mp3",
        );
        assert_eq!(episode.page_segment(), "9");

        episode.slug = Some("grace-upon-grace".to_string());
        assert_eq!(episode.page_segment(), "grace-upon-grace");
    }
}
