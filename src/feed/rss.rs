// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::error::FeedError;
use crate::model::{EpisodeRecord, PodcastMetadata};

use super::extensions::{NAMESPACE_DECLARATIONS, write_channel_extensions, write_item_extensions};
use super::prepare::{self, Channel, Item};
use super::xml::XmlWriter;

/// Render an RSS 2.0 podcast feed
///
/// `episodes` must already be ordered newest-first; they are written in the
/// order given. `self_url` is the public location of this document.
pub fn assemble_rss(
    podcast: &PodcastMetadata,
    episodes: &[EpisodeRecord],
    config: &SiteConfig,
    self_url: &str,
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let channel = prepare::channel(podcast, config);
    let items = prepare::items(podcast, episodes, config)?;

    let mut root = vec![("version", "2.0")];
    root.extend(NAMESPACE_DECLARATIONS);

    let mut w = XmlWriter::new()?;
    w.start("rss", &root)?;
    w.start("channel", &[])?;

    write_channel(&mut w, &channel, config, self_url, now, items.first())?;
    for item in &items {
        write_item(&mut w, item)?;
    }

    w.end("channel")?;
    w.end("rss")?;
    w.finish()
}

fn write_channel(
    w: &mut XmlWriter,
    channel: &Channel,
    config: &SiteConfig,
    self_url: &str,
    now: DateTime<Utc>,
    latest: Option<&Item>,
) -> Result<(), FeedError> {
    w.text_element("title", &channel.title)?;
    w.text_element("link", &channel.link)?;
    w.text_element("description", &channel.description)?;
    w.text_element("language", &channel.language)?;
    w.optional_element("copyright", channel.copyright.as_deref())?;
    w.optional_element("managingEditor", channel.managing_editor.as_deref())?;
    w.optional_element("webMaster", channel.managing_editor.as_deref())?;
    w.text_element("generator", &config.generator)?;
    if let Some(latest) = latest {
        w.text_element("pubDate", &latest.published_at.to_rfc2822())?;
    }
    w.text_element("lastBuildDate", &now.to_rfc2822())?;
    w.text_element("ttl", &config.ttl_minutes.to_string())?;
    w.empty(
        "atom:link",
        &[
            ("href", self_url),
            ("rel", "self"),
            ("type", "application/rss+xml"),
        ],
    )?;

    w.start("image", &[])?;
    w.text_element("url", &channel.image_url)?;
    w.text_element("title", &channel.title)?;
    w.text_element("link", &channel.link)?;
    w.end("image")?;

    write_channel_extensions(w, channel)
}

fn write_item(w: &mut XmlWriter, item: &Item) -> Result<(), FeedError> {
    w.start("item", &[])?;

    w.text_element("title", &item.title)?;
    w.text_element("link", &item.link)?;
    w.text_element_with("guid", &[("isPermaLink", "false")], &item.guid)?;
    w.text_element("pubDate", &item.published_at.to_rfc2822())?;
    w.text_element("description", &item.description)?;
    w.optional_element("category", item.category.as_deref())?;
    if let Some(html) = &item.content_html {
        w.cdata_element("content:encoded", html)?;
    }
    let length = item.enclosure_length.to_string();
    w.empty(
        "enclosure",
        &[
            ("url", item.enclosure_url.as_str()),
            ("length", length.as_str()),
            ("type", item.enclosure_type.as_str()),
        ],
    )?;

    write_item_extensions(w, item)?;

    w.end("item")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{ATOM_NAMESPACE, CONTENT_NAMESPACE, ITUNES_NAMESPACE, PODCAST_NAMESPACE};
    use crate::model::Owner;
    use chrono::TimeZone;

    const SELF_URL: &str = "https://pulpit.example.org/podcasts/morning-devotion/rss.xml";

    fn config() -> SiteConfig {
        SiteConfig::new("https://pulpit.example.org", None).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    fn podcast() -> PodcastMetadata {
        PodcastMetadata {
            slug: "morning-devotion".to_string(),
            title: "Morning Devotion & Prayer".to_string(),
            description: Some("<p>Daily <em>readings</em> & prayer</p>".to_string()),
            owner: Owner {
                name: Some("Grace Chapel".to_string()),
                email: Some("host@example.com".to_string()),
            },
            categories: vec!["Religion & Spirituality > Christianity".to_string()],
            ..Default::default()
        }
    }

    fn episode(id: i64, title: &str, day: u32, url: &str) -> EpisodeRecord {
        EpisodeRecord::new(
            id,
            title,
            Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            url,
        )
    }

    fn render(episodes: &[EpisodeRecord]) -> String {
        assemble_rss(&podcast(), episodes, &config(), SELF_URL, now()).unwrap()
    }

    #[test]
    fn renders_escaped_scenario_fields() {
        let xml = render(&[episode(
            1,
            "Ep 1: \"Hope\"",
            15,
            "https://cdn.example.com/ep1 final.mp3",
        )]);

        assert!(xml.contains("<title>Morning Devotion &amp; Prayer</title>"));
        assert!(xml.contains("<title>Ep 1: &quot;Hope&quot;</title>"));
        assert!(xml.contains("url=\"https://cdn.example.com/ep1%20final.mp3\""));
    }

    #[test]
    fn declares_all_namespaces_on_root() {
        let xml = render(&[]);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(&format!("xmlns:content=\"{CONTENT_NAMESPACE}\"")));
        assert!(xml.contains(&format!("xmlns:atom=\"{ATOM_NAMESPACE}\"")));
        assert!(xml.contains(&format!("xmlns:itunes=\"{ITUNES_NAMESPACE}\"")));
        assert!(xml.contains(&format!("xmlns:podcast=\"{PODCAST_NAMESPACE}\"")));
    }

    #[test]
    fn renders_channel_metadata() {
        let xml = render(&[]);

        assert!(xml.contains("<link>https://pulpit.example.org/podcasts/morning-devotion</link>"));
        assert!(xml.contains("<description>Daily readings &amp; prayer</description>"));
        assert!(xml.contains("<language>en</language>"));
        assert!(xml.contains("<lastBuildDate>Thu, 1 Feb 2024 12:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains(&format!(
            "<atom:link href=\"{SELF_URL}\" rel=\"self\" type=\"application/rss+xml\"/>"
        )));
        assert!(xml.contains("<itunes:name>Grace Chapel</itunes:name>"));
        assert!(xml.contains("<itunes:email>host@example.com</itunes:email>"));
        assert!(xml.contains("<itunes:explicit>false</itunes:explicit>"));
        assert!(xml.contains("<itunes:category text=\"Religion &amp; Spirituality\">"));
        assert!(xml.contains("<itunes:category text=\"Christianity\"/>"));
        assert!(
            xml.contains("<itunes:image href=\"https://pulpit.example.org/image.png\"/>")
        );
        assert!(xml.contains("<podcast:locked owner=\"host@example.com\">no</podcast:locked>"));
        assert!(xml.contains("<managingEditor>host@example.com (Grace Chapel)</managingEditor>"));
        assert!(xml.contains("<webMaster>host@example.com (Grace Chapel)</webMaster>"));
        assert!(!xml.contains("<item>"));
        assert!(!xml.contains("<pubDate>"));
    }

    #[test]
    fn renders_required_item_elements() {
        let mut ep = episode(1, "Hope", 15, "https://cdn.example.com/ep1.m4a");
        ep.length_bytes = Some(1234567);
        ep.description = Some("<p>Romans 5</p>".to_string());

        let xml = render(&[ep]);

        assert!(xml.contains(
            "<link>https://pulpit.example.org/podcasts/morning-devotion/1</link>"
        ));
        assert!(xml.contains(
            "<guid isPermaLink=\"false\">https://pulpit.example.org/podcasts/morning-devotion/1</guid>"
        ));
        assert!(xml.contains("<pubDate>Mon, 15 Jan 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("<description>Romans 5</description>"));
        assert!(xml.contains("<content:encoded><![CDATA[<p>Romans 5</p>]]></content:encoded>"));
        assert!(xml.contains(
            "<enclosure url=\"https://cdn.example.com/ep1.m4a\" length=\"1234567\" type=\"audio/x-m4a\"/>"
        ));
    }

    #[test]
    fn omits_missing_optional_item_elements() {
        let xml = render(&[episode(1, "Hope", 15, "https://cdn.example.com/ep1.mp3")]);

        for tag in [
            "itunes:season",
            "itunes:episode>",
            "itunes:episodeType",
            "itunes:duration",
            "itunes:summary",
            "content:encoded",
            "<category>",
        ] {
            let item_part = &xml[xml.find("<item>").unwrap()..];
            assert!(!item_part.contains(tag), "unexpected {tag} in item");
        }
    }

    #[test]
    fn writes_present_optional_item_elements() {
        let mut ep = episode(1, "Hope", 15, "https://cdn.example.com/ep1.mp3");
        ep.duration_seconds = Some(1800);
        ep.episode_number = Some(3);
        ep.season_number = Some(2);
        ep.episode_type = Some("bonus".to_string());
        ep.explicit = Some(true);
        ep.image_url = Some("https://cdn.example.com/ep1.jpg".to_string());

        let xml = render(&[ep]);

        assert!(xml.contains("<itunes:duration>0:30:00</itunes:duration>"));
        assert!(xml.contains("<itunes:episode>3</itunes:episode>"));
        assert!(xml.contains("<itunes:season>2</itunes:season>"));
        assert!(xml.contains("<itunes:episodeType>bonus</itunes:episodeType>"));
        assert!(xml.contains("<itunes:explicit>true</itunes:explicit>"));
        assert!(xml.contains("<itunes:image href=\"https://cdn.example.com/ep1.jpg\"/>"));
    }

    #[test]
    fn series_becomes_item_category() {
        let mut ep = episode(1, "Hope", 15, "https://cdn.example.com/ep1.mp3");
        ep.series = Some("Romans & Hope".to_string());

        let xml = render(&[ep]);
        let item_part = &xml[xml.find("<item>").unwrap()..];
        assert!(item_part.contains("<category>Romans &amp; Hope</category>"));
    }

    #[test]
    fn omits_managing_editor_without_owner_email() {
        let mut podcast = podcast();
        podcast.owner.email = None;

        let xml = assemble_rss(&podcast, &[], &config(), SELF_URL, now()).unwrap();
        assert!(!xml.contains("managingEditor"));
        assert!(!xml.contains("webMaster"));
    }

    #[test]
    fn keeps_input_order() {
        let episodes = [
            episode(3, "Third", 20, "https://cdn.example.com/3.mp3"),
            episode(2, "Second", 10, "https://cdn.example.com/2.mp3"),
            episode(1, "First", 1, "https://cdn.example.com/1.mp3"),
        ];
        let xml = render(&episodes);

        let third = xml.find("<title>Third</title>").unwrap();
        let second = xml.find("<title>Second</title>").unwrap();
        let first = xml.find("<title>First</title>").unwrap();
        assert!(third < second && second < first);

        let channel_pub_date = xml
            .find("<pubDate>Sat, 20 Jan 2024 00:00:00 +0000</pubDate>")
            .unwrap();
        assert!(channel_pub_date < xml.find("<item>").unwrap());
    }

    #[test]
    fn output_is_deterministic() {
        let episodes = [episode(1, "Hope", 15, "https://cdn.example.com/1.mp3")];
        assert_eq!(render(&episodes), render(&episodes));
    }

    #[test]
    fn untitled_records_use_defaults() {
        let mut podcast = podcast();
        podcast.title = String::new();
        let episodes = [episode(1, "", 15, "https://cdn.example.com/1.mp3")];

        let xml = assemble_rss(&podcast, &episodes, &config(), SELF_URL, now()).unwrap();

        assert!(xml.contains("<title>Untitled Podcast</title>"));
        assert!(xml.contains("<title>Untitled Episode</title>"));
    }

    #[test]
    fn rejects_relative_enclosure_url() {
        let episodes = [episode(1, "Hope", 15, "uploads/ep1.mp3")];
        let result = assemble_rss(&podcast(), &episodes, &config(), SELF_URL, now());

        assert!(matches!(result, Err(FeedError::InvalidEnclosureUrl { .. })));
    }

    #[test]
    fn escapes_cdata_terminator_in_show_notes() {
        let mut ep = episode(1, "Hope", 15, "https://cdn.example.com/1.mp3");
        ep.content_html = Some("<p>a]]>b</p>".to_string());

        let xml = render(&[ep]);
        assert!(xml.contains("<![CDATA[<p>a]]]]><![CDATA[>b</p>]]>"));
    }
}
