// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::SiteConfig;
use crate::error::FeedError;
use crate::model::{EpisodeRecord, PodcastMetadata};

use super::extensions::{
    ATOM_NAMESPACE, NAMESPACE_DECLARATIONS, write_channel_extensions, write_item_extensions,
};
use super::prepare::{self, Channel, Item};
use super::xml::XmlWriter;

/// Render an Atom 1.0 podcast feed
///
/// Same inputs and ordering contract as [`super::assemble_rss`]. Episodes
/// become entries with an `enclosure` link; show notes go into an escaped
/// `type="html"` content element. The iTunes and Podcast-Index elements
/// match the RSS rendition.
pub fn assemble_atom(
    podcast: &PodcastMetadata,
    episodes: &[EpisodeRecord],
    config: &SiteConfig,
    self_url: &str,
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let channel = prepare::channel(podcast, config);
    let items = prepare::items(podcast, episodes, config)?;

    let mut root = vec![("xmlns", ATOM_NAMESPACE)];
    root.extend(NAMESPACE_DECLARATIONS);
    root.push(("xml:lang", channel.language.as_str()));

    let mut w = XmlWriter::new()?;
    w.start("feed", &root)?;

    write_header(&mut w, &channel, config, self_url, now)?;
    for item in &items {
        write_entry(&mut w, &podcast.slug, item)?;
    }

    w.end("feed")?;
    w.finish()
}

fn write_header(
    w: &mut XmlWriter,
    channel: &Channel,
    config: &SiteConfig,
    self_url: &str,
    now: DateTime<Utc>,
) -> Result<(), FeedError> {
    w.text_element("id", &channel.link)?;
    w.text_element("title", &channel.title)?;
    w.text_element("subtitle", &channel.description)?;
    w.text_element("updated", &rfc3339(now))?;
    w.empty(
        "link",
        &[
            ("rel", "self"),
            ("type", "application/atom+xml"),
            ("href", self_url),
        ],
    )?;
    w.empty(
        "link",
        &[
            ("rel", "alternate"),
            ("type", "text/html"),
            ("href", channel.link.as_str()),
        ],
    )?;

    w.start("author", &[])?;
    w.text_element("name", &channel.owner_name)?;
    w.optional_element("email", channel.owner_email.as_deref())?;
    w.end("author")?;

    w.text_element("generator", &config.generator)?;
    w.text_element("icon", &channel.image_url)?;
    w.text_element("logo", &channel.image_url)?;
    w.optional_element("rights", channel.copyright.as_deref())?;
    for category in &channel.categories {
        w.empty("category", &[("term", category.name.as_str())])?;
    }

    write_channel_extensions(w, channel)
}

fn write_entry(w: &mut XmlWriter, podcast_slug: &str, item: &Item) -> Result<(), FeedError> {
    let published = rfc3339(item.published_at);
    let length = item.enclosure_length.to_string();

    w.start("entry", &[])?;

    w.text_element("id", &entry_id(podcast_slug, &item.guid))?;
    w.text_element("title", &item.title)?;
    w.empty(
        "link",
        &[
            ("rel", "alternate"),
            ("type", "text/html"),
            ("href", item.link.as_str()),
        ],
    )?;
    w.empty(
        "link",
        &[
            ("rel", "enclosure"),
            ("type", item.enclosure_type.as_str()),
            ("length", length.as_str()),
            ("href", item.enclosure_url.as_str()),
        ],
    )?;
    w.text_element("published", &published)?;
    w.text_element("updated", &published)?;

    w.start("author", &[])?;
    w.text_element("name", &item.author)?;
    w.end("author")?;

    if let Some(series) = &item.category {
        w.empty("category", &[("term", series.as_str())])?;
    }
    w.text_element("summary", &item.description)?;
    if let Some(html) = &item.content_html {
        w.text_element_with("content", &[("type", "html")], html)?;
    }

    write_item_extensions(w, item)?;

    w.end("entry")
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Atom ids must be IRIs; plain database guids are wrapped in a URN
fn entry_id(podcast_slug: &str, guid: &str) -> String {
    if guid.starts_with("http://") || guid.starts_with("https://") || guid.starts_with("urn:") {
        guid.to_string()
    } else {
        format!("urn:pulpitcast:{podcast_slug}:{guid}")
    }
}
