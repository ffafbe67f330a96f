// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Deserializer, Serialize};

/// Title used when a podcast row has none
pub const UNTITLED_PODCAST: &str = "Untitled Podcast";

/// Language used when a podcast row has none
pub const DEFAULT_LANGUAGE: &str = "en";

/// Snapshot of a podcast row as stored in the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodcastMetadata {
    #[serde(rename = "podcast_slug")]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "itunes_summary",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, rename = "language_code", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub owner: Owner,
    #[serde(
        default,
        rename = "itunes_author_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,
    #[serde(default, rename = "itunes_explicit")]
    pub explicit: bool,
    #[serde(default, deserialize_with = "category_labels")]
    pub categories: Vec<String>,
    #[serde(default, rename = "link_website", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, rename = "copyright_text", skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, rename = "itunes_type", skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
    #[serde(default, rename = "itunes_complete")]
    pub complete: Option<bool>,
    #[serde(
        default,
        rename = "podcast_namespace_guid",
        skip_serializing_if = "Option::is_none"
    )]
    pub podcast_guid: Option<String>,
    #[serde(default, rename = "podcast_namespace_locked")]
    pub locked: Option<bool>,
    #[serde(
        default,
        rename = "podcast_namespace_owner_email_for_lock",
        skip_serializing_if = "Option::is_none"
    )]
    pub lock_owner_email: Option<String>,
    /// Profile that owns the podcast; used to look up a missing owner email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Owner block published as `itunes:owner`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(
        default,
        rename = "itunes_owner_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        rename = "itunes_owner_email",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

impl PodcastMetadata {
    /// Title to publish, falling back to a placeholder for blank rows
    pub fn display_title(&self) -> &str {
        non_blank(Some(&self.title)).unwrap_or(UNTITLED_PODCAST)
    }

    /// Language code to publish
    pub fn language_code(&self) -> &str {
        non_blank(self.language.as_ref()).unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Owner display name: explicit owner, then author, then the title
    pub fn owner_name(&self) -> &str {
        non_blank(self.owner.name.as_ref())
            .or_else(|| non_blank(self.author.as_ref()))
            .unwrap_or_else(|| self.display_title())
    }

    /// Author display name: explicit author, then owner, then the title
    pub fn author_name(&self) -> &str {
        non_blank(self.author.as_ref())
            .or_else(|| non_blank(self.owner.name.as_ref()))
            .unwrap_or_else(|| self.display_title())
    }

    /// Show type for `itunes:type`, only `episodic` or `serial`
    pub fn show_type(&self) -> &'static str {
        match self.show_type.as_deref().map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("serial") => "serial",
            _ => "episodic",
        }
    }

    /// Email published with `podcast:locked`
    pub fn lock_email(&self) -> Option<&str> {
        non_blank(self.lock_owner_email.as_ref()).or_else(|| non_blank(self.owner.email.as_ref()))
    }
}

/// Profile row of the podcast's owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Profile {
    /// Full name, if any part of it is set
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_ref(), self.last_name.as_ref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

pub(crate) fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Categories arrive either as plain labels or as embedded `{ "name": .. }` rows
fn category_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Name(String),
        Row { name: String },
    }

    let labels: Option<Vec<Label>> = Option::deserialize(deserializer)?;
    Ok(labels
        .unwrap_or_default()
        .into_iter()
        .map(|label| match label {
            Label::Name(name) | Label::Row { name } => name,
        })
        .filter(|name| !name.trim().is_empty())
        .collect())
}
