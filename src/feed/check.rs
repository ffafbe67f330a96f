// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::FeedError;

use super::FeedFormat;

/// What a rendered feed looks like to a standard feed parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    pub title: String,
    pub item_titles: Vec<String>,
    pub enclosure_urls: Vec<String>,
}

/// Parse a rendered document back with the `rss` / `atom_syndication` crates
pub fn check_feed(xml: &str, format: FeedFormat) -> Result<FeedSummary, FeedError> {
    match format {
        FeedFormat::Rss => check_rss(xml),
        FeedFormat::Atom => check_atom(xml),
    }
}

fn check_rss(xml: &str) -> Result<FeedSummary, FeedError> {
    let channel = rss::Channel::read_from(xml.as_bytes())?;

    Ok(FeedSummary {
        title: channel.title().to_string(),
        item_titles: channel
            .items()
            .iter()
            .map(|item| item.title().unwrap_or_default().to_string())
            .collect(),
        enclosure_urls: channel
            .items()
            .iter()
            .filter_map(|item| item.enclosure())
            .map(|enclosure| enclosure.url().to_string())
            .collect(),
    })
}

fn check_atom(xml: &str) -> Result<FeedSummary, FeedError> {
    let feed = atom_syndication::Feed::read_from(xml.as_bytes())?;

    Ok(FeedSummary {
        title: feed.title().as_str().to_string(),
        item_titles: feed
            .entries()
            .iter()
            .map(|entry| entry.title().as_str().to_string())
            .collect(),
        enclosure_urls: feed
            .entries()
            .iter()
            .flat_map(|entry| entry.links())
            .filter(|link| link.rel() == "enclosure")
            .map(|link| link.href().to_string())
            .collect(),
    })
}
