// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

use crate::error::FeedError;
use crate::model::EpisodeRecord;

/// Percent-encode whitespace and stray `%` in a URL string
///
/// A `%` that already starts a valid escape (`%20`) is left alone, so
/// encoding an encoded URL is a no-op.
pub fn encode_url_text(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut result = String::with_capacity(raw.len());

    for (i, c) in raw.char_indices() {
        if c == '%' {
            let escaped = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            result.push_str(if escaped { "%" } else { "%25" });
        } else if c.is_whitespace() {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                result.push_str(&format!("%{b:02X}"));
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Parse an absolute http(s) URL, encoding it first
pub fn absolute_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(&encode_url_text(raw.trim())).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }

    Ok(url)
}

/// Resolve and validate the enclosure URL of an episode
pub fn enclosure_url(episode: &EpisodeRecord) -> Result<Url, FeedError> {
    let raw = episode
        .enclosure_source()
        .ok_or_else(|| FeedError::InvalidEnclosureUrl {
            title: episode.display_title().to_string(),
            url: String::new(),
            reason: "no enclosure URL".to_string(),
        })?;

    absolute_url(raw).map_err(|reason| FeedError::InvalidEnclosureUrl {
        title: episode.display_title().to_string(),
        url: raw.to_string(),
        reason,
    })
}
