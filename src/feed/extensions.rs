// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::FeedError;

use super::prepare::{Channel, Item};
use super::xml::XmlWriter;

pub const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const PODCAST_NAMESPACE: &str = "https://podcastindex.org/namespace/1.0";

/// Prefixed namespace declarations carried by the root of every feed
pub(crate) const NAMESPACE_DECLARATIONS: [(&str, &str); 4] = [
    ("xmlns:content", CONTENT_NAMESPACE),
    ("xmlns:atom", ATOM_NAMESPACE),
    ("xmlns:itunes", ITUNES_NAMESPACE),
    ("xmlns:podcast", PODCAST_NAMESPACE),
];

/// Podcast-level iTunes and Podcast-Index elements
pub(crate) fn write_channel_extensions(
    w: &mut XmlWriter,
    channel: &Channel,
) -> Result<(), FeedError> {
    w.text_element("itunes:author", &channel.author)?;
    w.text_element("itunes:summary", &channel.description)?;
    w.text_element("itunes:type", channel.show_type)?;
    w.start("itunes:owner", &[])?;
    w.text_element("itunes:name", &channel.owner_name)?;
    w.optional_element("itunes:email", channel.owner_email.as_deref())?;
    w.end("itunes:owner")?;
    w.empty("itunes:image", &[("href", channel.image_url.as_str())])?;
    w.text_element("itunes:explicit", explicit_value(channel.explicit))?;
    for category in &channel.categories {
        match &category.subcategory {
            Some(sub) => {
                w.start("itunes:category", &[("text", category.name.as_str())])?;
                w.empty("itunes:category", &[("text", sub.as_str())])?;
                w.end("itunes:category")?;
            }
            None => w.empty("itunes:category", &[("text", category.name.as_str())])?,
        }
    }
    if channel.complete {
        w.text_element("itunes:complete", "Yes")?;
    }

    let locked = if channel.locked { "yes" } else { "no" };
    match channel.lock_email.as_deref() {
        Some(email) => w.text_element_with("podcast:locked", &[("owner", email)], locked)?,
        None => w.text_element("podcast:locked", locked)?,
    }
    w.optional_element("podcast:guid", channel.podcast_guid.as_deref())?;

    Ok(())
}

/// Episode-level iTunes elements; absent values produce no element
pub(crate) fn write_item_extensions(w: &mut XmlWriter, item: &Item) -> Result<(), FeedError> {
    w.text_element("itunes:title", &item.title)?;
    w.text_element("itunes:author", &item.author)?;
    w.optional_element("itunes:summary", item.summary.as_deref())?;
    w.optional_element("itunes:duration", item.duration.as_deref())?;
    w.optional_element(
        "itunes:episode",
        item.episode_number.map(|n| n.to_string()).as_deref(),
    )?;
    w.optional_element(
        "itunes:season",
        item.season_number.map(|n| n.to_string()).as_deref(),
    )?;
    w.optional_element("itunes:episodeType", item.episode_type)?;
    w.optional_element("itunes:explicit", item.explicit.map(explicit_value))?;
    if let Some(image) = &item.image_url {
        w.empty("itunes:image", &[("href", image.as_str())])?;
    }

    Ok(())
}

fn explicit_value(explicit: bool) -> &'static str {
    if explicit { "true" } else { "false" }
}
