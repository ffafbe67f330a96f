// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::error::FeedError;
use crate::model::{EpisodeRecord, PodcastMetadata};

use super::mime::enclosure_mime_type;
use super::text::summary;
use super::url::{absolute_url, enclosure_url};

/// Podcast fields normalized for writing, shared by both formats
#[derive(Debug, Clone)]
pub(crate) struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub image_url: String,
    pub author: String,
    pub owner_name: String,
    pub owner_email: Option<String>,
    /// `email (name)` for `managingEditor` / `webMaster`
    pub managing_editor: Option<String>,
    pub explicit: bool,
    pub categories: Vec<Category>,
    pub copyright: Option<String>,
    pub show_type: &'static str,
    pub complete: bool,
    pub podcast_guid: Option<String>,
    pub locked: bool,
    pub lock_email: Option<String>,
}

/// `itunes:category` with an optional nested subcategory
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Category {
    pub name: String,
    pub subcategory: Option<String>,
}

/// Episode fields normalized for writing, shared by both formats
#[derive(Debug, Clone)]
pub(crate) struct Item {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub published_at: DateTime<Utc>,
    pub description: String,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub content_html: Option<String>,
    pub enclosure_url: String,
    pub enclosure_length: u64,
    pub enclosure_type: String,
    pub author: String,
    pub duration: Option<String>,
    pub episode_number: Option<u32>,
    pub season_number: Option<u32>,
    pub episode_type: Option<&'static str>,
    pub explicit: Option<bool>,
    pub image_url: Option<String>,
}

pub(crate) fn channel(podcast: &PodcastMetadata, config: &SiteConfig) -> Channel {
    let title = podcast.display_title().to_string();

    let link = podcast
        .website
        .as_deref()
        .and_then(|raw| absolute_url(raw).ok())
        .unwrap_or_else(|| config.podcast_url(&podcast.slug))
        .to_string();

    let description = non_empty_summary(podcast.description.as_deref())
        .or_else(|| non_empty_summary(podcast.summary.as_deref()))
        .unwrap_or_else(|| title.clone());

    let image_url = image_url(config, podcast.image_url.as_deref())
        .unwrap_or_else(|| config.default_image_url().to_string());

    let owner_name = podcast.owner_name().to_string();
    let owner_email = trimmed(podcast.owner.email.as_deref());
    let managing_editor = owner_email
        .as_ref()
        .map(|email| format!("{email} ({owner_name})"));

    let mut categories: Vec<Category> = podcast.categories.iter().map(|c| category(c)).collect();
    if categories.is_empty() {
        categories.push(category(&config.default_category));
    }

    Channel {
        link,
        description,
        language: podcast.language_code().to_string(),
        image_url,
        author: podcast.author_name().to_string(),
        owner_name,
        owner_email,
        managing_editor,
        explicit: podcast.explicit,
        categories,
        copyright: trimmed(podcast.copyright.as_deref()),
        show_type: podcast.show_type(),
        complete: podcast.complete.unwrap_or(false),
        podcast_guid: trimmed(podcast.podcast_guid.as_deref()),
        locked: podcast.locked.unwrap_or(false),
        lock_email: podcast.lock_email().map(String::from),
        title,
    }
}

pub(crate) fn item(
    podcast: &PodcastMetadata,
    episode: &EpisodeRecord,
    config: &SiteConfig,
) -> Result<Item, FeedError> {
    let title = episode.display_title().to_string();
    let enclosure = enclosure_url(episode)?;
    let link = config
        .episode_url(&podcast.slug, &episode.page_segment())
        .to_string();

    let guid = trimmed(episode.guid.as_deref()).unwrap_or_else(|| link.clone());

    let description = non_empty_summary(episode.description.as_deref())
        .or_else(|| non_empty_summary(episode.summary.as_deref()))
        .unwrap_or_else(|| title.clone());

    let item_summary = non_empty_summary(episode.summary.as_deref())
        .or_else(|| non_empty_summary(episode.description.as_deref()));

    let author = episode
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| podcast.author_name())
        .to_string();

    Ok(Item {
        link,
        guid,
        published_at: episode.published_at,
        description,
        category: trimmed(episode.series.as_deref()),
        summary: item_summary,
        content_html: episode.show_notes().map(String::from),
        enclosure_type: enclosure_mime_type(episode.mime_type.as_deref(), &enclosure),
        enclosure_url: enclosure.to_string(),
        enclosure_length: episode.length_bytes.unwrap_or(0),
        author,
        duration: episode.duration_seconds.map(format_duration),
        episode_number: episode.episode_number,
        season_number: episode.season_number,
        episode_type: episode.episode_type(),
        explicit: episode.explicit,
        image_url: image_url(config, episode.image_url.as_deref()),
        title,
    })
}

/// Items in input order; the catalog already sorted them newest-first
pub(crate) fn items(
    podcast: &PodcastMetadata,
    episodes: &[EpisodeRecord],
    config: &SiteConfig,
) -> Result<Vec<Item>, FeedError> {
    episodes
        .iter()
        .map(|episode| item(podcast, episode, config))
        .collect()
}

/// `itunes:duration` as `H:MM:SS`
pub(crate) fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// `"Parent > Child"` becomes a category with one subcategory
fn category(label: &str) -> Category {
    match label.split_once('>') {
        Some((parent, child)) if !child.trim().is_empty() => Category {
            name: parent.trim().to_string(),
            subcategory: Some(child.trim().to_string()),
        },
        _ => Category {
            name: label.trim().trim_end_matches('>').trim().to_string(),
            subcategory: None,
        },
    }
}

fn image_url(config: &SiteConfig, raw: Option<&str>) -> Option<String> {
    raw.and_then(|raw| config.asset_url(raw))
        .and_then(|resolved| absolute_url(&resolved).ok())
        .map(String::from)
}

fn non_empty_summary(html: Option<&str>) -> Option<String> {
    html.map(summary).filter(|s| !s.is_empty())
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
