// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod file;
mod rest;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::model::{EpisodeRecord, PodcastMetadata};

pub use file::{CatalogEntry, FileCatalog};
pub use rest::RestCatalog;

/// Read-only source of podcast and episode snapshots
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a podcast by slug; `Ok(None)` when no such podcast exists
    async fn podcast(&self, slug: &str) -> Result<Option<PodcastMetadata>, CatalogError>;

    /// Episodes of a podcast, newest first
    async fn episodes(&self, slug: &str) -> Result<Vec<EpisodeRecord>, CatalogError>;
}

/// Order episodes by publication date, newest first
///
/// The sort is stable so episodes published at the same instant keep the
/// order the catalog returned them in.
pub fn sort_newest_first(episodes: &mut [EpisodeRecord]) {
    episodes.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}
