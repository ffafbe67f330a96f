// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;
use url::Url;

use crate::error::ConfigError;

/// Default `generator` value written into every feed
pub const DEFAULT_GENERATOR: &str = concat!("pulpitcast ", env!("CARGO_PKG_VERSION"));

/// Default channel `ttl` in minutes
pub const DEFAULT_TTL_MINUTES: u32 = 60;

/// Category published for podcasts that have none
pub const DEFAULT_CATEGORY: &str = "Religion & Spirituality";

/// Site-wide configuration passed explicitly into feed rendering
///
/// Base URLs always end with a slash so relative joins keep their last
/// path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteConfig {
    pub site_base_url: Url,
    pub assets_base_url: Option<Url>,
    pub generator: String,
    pub ttl_minutes: u32,
    pub default_category: String,
}

impl SiteConfig {
    /// Build a configuration from raw base URL strings
    pub fn new(site_base_url: &str, assets_base_url: Option<&str>) -> Result<Self, ConfigError> {
        let site_base_url = parse_base_url("site base URL", site_base_url)?;
        let assets_base_url = assets_base_url
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_base_url("assets base URL", s))
            .transpose()?;

        Ok(Self {
            site_base_url,
            assets_base_url,
            generator: DEFAULT_GENERATOR.to_string(),
            ttl_minutes: DEFAULT_TTL_MINUTES,
            default_category: DEFAULT_CATEGORY.to_string(),
        })
    }

    /// Public page of a podcast: `{site}/podcasts/{slug}`
    pub fn podcast_url(&self, slug: &str) -> Url {
        let mut url = self.site_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["podcasts", slug]);
        }
        url
    }

    /// Public page of an episode: `{site}/podcasts/{slug}/{episode}`
    pub fn episode_url(&self, podcast_slug: &str, episode_segment: &str) -> Url {
        let mut url = self.podcast_url(podcast_slug);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(episode_segment);
        }
        url
    }

    /// Feed document URL below the podcast page, e.g. `rss.xml`
    pub fn feed_url(&self, podcast_slug: &str, file_name: &str) -> Url {
        self.episode_url(podcast_slug, file_name)
    }

    /// Fallback cover art when a podcast has none
    pub fn default_image_url(&self) -> Url {
        self.site_base_url
            .join("image.png")
            .unwrap_or_else(|_| self.site_base_url.clone())
    }

    /// Resolve a stored image reference into an absolute URL
    ///
    /// Absolute http(s) URLs are returned as-is. Anything else is treated as
    /// an object key below the assets base URL, or the site base URL when no
    /// assets base is configured.
    pub fn asset_url(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Some(raw.to_string());
        }

        let base = self.assets_base_url.as_ref().unwrap_or(&self.site_base_url);
        base.join(raw.trim_start_matches('/'))
            .ok()
            .map(String::from)
    }
}

fn parse_base_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();

    // Hosts are often configured without a scheme
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&candidate).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            name,
            value: value.to_string(),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
