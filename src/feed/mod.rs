mod atom;
mod check;
mod extensions;
mod mime;
mod prepare;
mod rss;
mod text;
mod url;
mod xml;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::config::SiteConfig;
use crate::error::FeedError;
use crate::model::{EpisodeRecord, PodcastMetadata};

pub use self::atom::assemble_atom;
pub use self::check::{FeedSummary, check_feed};
pub use self::mime::{DEFAULT_AUDIO_MIME, enclosure_mime_type};
pub use self::extensions::{
    ATOM_NAMESPACE, CONTENT_NAMESPACE, ITUNES_NAMESPACE, PODCAST_NAMESPACE,
};
pub use self::rss::assemble_rss;
pub use self::text::{SUMMARY_LIMIT, plain_text, summary, truncate_at_boundary};
pub use self::url::{absolute_url, encode_url_text};

/// Output format of a rendered feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeedFormat {
    #[default]
    Rss,
    Atom,
}

impl FeedFormat {
    /// `Content-Type` header value for this format
    pub fn content_type(self) -> &'static str {
        match self {
            FeedFormat::Rss => "application/rss+xml; charset=utf-8",
            FeedFormat::Atom => "application/atom+xml; charset=utf-8",
        }
    }

    /// File name the feed is published under, below the podcast page
    pub fn file_name(self) -> &'static str {
        match self {
            FeedFormat::Rss => "rss.xml",
            FeedFormat::Atom => "atom.xml",
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFormat::Rss => f.write_str("rss"),
            FeedFormat::Atom => f.write_str("atom"),
        }
    }
}

impl FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rss" | "rss2" => Ok(FeedFormat::Rss),
            "atom" => Ok(FeedFormat::Atom),
            other => Err(format!("unknown feed format '{other}', expected 'rss' or 'atom'")),
        }
    }
}

/// Render a podcast and its episodes into a complete feed document
///
/// This is a pure transform: `episodes` are written in the order given
/// (newest-first is the caller's job) and `now` is the only clock reading.
/// The self link points at the canonical `rss.xml` / `atom.xml` location.
pub fn render_feed(
    podcast: &PodcastMetadata,
    episodes: &[EpisodeRecord],
    config: &SiteConfig,
    format: FeedFormat,
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let self_url = config.feed_url(&podcast.slug, format.file_name());
    render_feed_at(podcast, episodes, config, format, self_url.as_str(), now)
}

/// Like [`render_feed`], with an explicit self link for alias routes
pub fn render_feed_at(
    podcast: &PodcastMetadata,
    episodes: &[EpisodeRecord],
    config: &SiteConfig,
    format: FeedFormat,
    self_url: &str,
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let self_url = absolute_url(self_url).map_err(|reason| FeedError::InvalidUrl {
        url: self_url.to_string(),
        reason,
    })?;

    match format {
        FeedFormat::Rss => assemble_rss(podcast, episodes, config, self_url.as_str(), now),
        FeedFormat::Atom => assemble_atom(podcast, episodes, config, self_url.as_str(), now),
    }
}

/// Quoted entity tag for a feed, independent of the generation timestamp
///
/// Hashes every rendering input except `now`, so the tag only changes when
/// the podcast, its episodes, the self link or the site configuration do.
pub fn feed_etag(
    podcast: &PodcastMetadata,
    episodes: &[EpisodeRecord],
    config: &SiteConfig,
    format: FeedFormat,
    self_url: &str,
) -> Result<String, FeedError> {
    let mut hasher = Sha256::new();
    serde_json::to_writer(
        &mut hasher,
        &(format.file_name(), self_url, config, podcast, episodes),
    )?;
    Ok(format!("\"{:x}\"", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixtures() -> (PodcastMetadata, Vec<EpisodeRecord>, SiteConfig) {
        let podcast = PodcastMetadata {
            slug: "morning-devotion".to_string(),
            title: "Morning Devotion & Prayer".to_string(),
            ..Default::default()
        };
        let episodes = vec![EpisodeRecord::new(
            1,
            "Ep 1: \"Hope\"",
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            "https://cdn.example.com/ep1 final.mp3",
        )];
        let config = SiteConfig::new("https://pulpit.example.org", None).unwrap();
        (podcast, episodes, config)
    }

    #[test]
    fn format_parses_and_displays() {
        assert_eq!("RSS".parse::<FeedFormat>(), Ok(FeedFormat::Rss));
        assert_eq!("atom".parse::<FeedFormat>(), Ok(FeedFormat::Atom));
        assert!("json".parse::<FeedFormat>().is_err());
        assert_eq!(FeedFormat::Atom.to_string(), "atom");
    }

    #[test]
    fn format_content_types() {
        assert_eq!(
            FeedFormat::Rss.content_type(),
            "application/rss+xml; charset=utf-8"
        );
        assert_eq!(
            FeedFormat::Atom.content_type(),
            "application/atom+xml; charset=utf-8"
        );
    }

    #[test]
    fn render_feed_uses_canonical_self_link() {
        let (podcast, episodes, config) = fixtures();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let rss = render_feed(&podcast, &episodes, &config, FeedFormat::Rss, now).unwrap();
        assert!(rss.contains(
            "href=\"https://pulpit.example.org/podcasts/morning-devotion/rss.xml\" rel=\"self\""
        ));

        let atom = render_feed(&podcast, &episodes, &config, FeedFormat::Atom, now).unwrap();
        assert!(atom.contains(
            "href=\"https://pulpit.example.org/podcasts/morning-devotion/atom.xml\""
        ));
    }

    #[test]
    fn render_feed_at_rejects_relative_self_link() {
        let (podcast, episodes, config) = fixtures();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let result = render_feed_at(&podcast, &episodes, &config, FeedFormat::Rss, "/rss.xml", now);
        assert!(matches!(result, Err(FeedError::InvalidUrl { .. })));
    }

    #[test]
    fn etag_ignores_generation_time_but_tracks_content() {
        let (podcast, mut episodes, config) = fixtures();
        let self_url = "https://pulpit.example.org/podcasts/morning-devotion/rss.xml";

        let tag = feed_etag(&podcast, &episodes, &config, FeedFormat::Rss, self_url).unwrap();
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert_eq!(
            tag,
            feed_etag(&podcast, &episodes, &config, FeedFormat::Rss, self_url).unwrap()
        );

        let atom = feed_etag(&podcast, &episodes, &config, FeedFormat::Atom, self_url).unwrap();
        assert_ne!(tag, atom);

        episodes[0].title = "Ep 1: \"Faith\"".to_string();
        let edited = feed_etag(&podcast, &episodes, &config, FeedFormat::Rss, self_url).unwrap();
        assert_ne!(tag, edited);
    }

    #[test]
    fn only_now_changes_output() {
        let (podcast, episodes, config) = fixtures();
        let t1 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let a = render_feed(&podcast, &episodes, &config, FeedFormat::Rss, t1).unwrap();
        let b = render_feed(&podcast, &episodes, &config, FeedFormat::Rss, t1).unwrap();
        let c = render_feed(&podcast, &episodes, &config, FeedFormat::Rss, t2).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            a.replace("Thu, 1 Feb 2024 00:00:00 +0000", ""),
            c.replace("Fri, 1 Mar 2024 00:00:00 +0000", "")
        );
    }
}
