// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::{self, Either};
use tracing::{debug, info, warn};

use crate::error::{AppError, CatalogError};
use crate::feed::{FeedFormat, feed_etag, render_feed_at};
use crate::model::{EpisodeRecord, PodcastMetadata};

use super::AppState;

/// Lets CDNs hold a feed for ten minutes and serve it stale while refreshing
pub const CACHE_CONTROL_VALUE: &str = "public, s-maxage=600, stale-while-revalidate=300";

pub async fn rss_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    feed_response(&state, &slug, FeedFormat::Rss, "rss.xml", &headers).await
}

/// `feed.xml` is an alias of `rss.xml` whose self link names itself
pub async fn feed_alias_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    feed_response(&state, &slug, FeedFormat::Rss, "feed.xml", &headers).await
}

pub async fn atom_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    feed_response(&state, &slug, FeedFormat::Atom, "atom.xml", &headers).await
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn feed_response(
    state: &AppState,
    slug: &str,
    format: FeedFormat,
    file_name: &str,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let (podcast, episodes) = load_feed_inputs(state, slug).await?;

    let self_url = state.config.feed_url(&podcast.slug, file_name);
    let etag = feed_etag(&podcast, &episodes, &state.config, format, self_url.as_str())?;

    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| etag_matches(value, &etag));

    if not_modified {
        debug!(slug, %format, %etag, "Feed not modified");
        return Ok((
            StatusCode::NOT_MODIFIED,
            [(CACHE_CONTROL, CACHE_CONTROL_VALUE), (ETAG, etag.as_str())],
        )
            .into_response());
    }

    let body = render_feed_at(
        &podcast,
        &episodes,
        &state.config,
        format,
        self_url.as_str(),
        state.now(),
    )
    .inspect_err(|e| warn!(slug, error = %e, "Failed to render feed"))?;

    debug!(slug, %format, items = episodes.len(), %etag, "Rendered feed");

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, format.content_type()),
            (CACHE_CONTROL, CACHE_CONTROL_VALUE),
            (ETAG, etag.as_str()),
        ],
        body,
    )
        .into_response())
}

/// Look up the podcast and its episodes concurrently
///
/// When the podcast lookup settles first as missing or failed, the pending
/// episode query is dropped instead of awaited.
async fn load_feed_inputs(
    state: &AppState,
    slug: &str,
) -> Result<(PodcastMetadata, Vec<EpisodeRecord>), AppError> {
    let podcast = state.catalog.podcast(slug);
    let episodes = state.catalog.episodes(slug);

    match future::select(podcast, episodes).await {
        Either::Left((podcast, episodes)) => {
            let podcast = found(slug, podcast)?;
            Ok((podcast, or_empty(slug, episodes.await)))
        }
        Either::Right((episodes, podcast)) => {
            let podcast = found(slug, podcast.await)?;
            Ok((podcast, or_empty(slug, episodes)))
        }
    }
}

fn found(
    slug: &str,
    podcast: Result<Option<PodcastMetadata>, CatalogError>,
) -> Result<PodcastMetadata, AppError> {
    match podcast {
        Ok(Some(podcast)) => Ok(podcast),
        Ok(None) => {
            info!(slug, "Podcast not found");
            Err(AppError::NotFound)
        }
        Err(e) => {
            warn!(slug, error = %e, "Failed to load podcast");
            Err(AppError::NotFound)
        }
    }
}

fn or_empty(slug: &str, episodes: Result<Vec<EpisodeRecord>, CatalogError>) -> Vec<EpisodeRecord> {
    episodes.unwrap_or_else(|e| {
        warn!(slug, error = %e, "Failed to load episodes, rendering an empty feed");
        Vec::new()
    })
}

/// Weak comparison of an `If-None-Match` list against our entity tag
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}
