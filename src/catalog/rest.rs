// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::CatalogError;
use crate::http::HttpClient;
use crate::model::{EpisodeRecord, PodcastMetadata, Profile};

use super::{Catalog, sort_newest_first};

const PODCAST_COLUMNS: &str = "*,categories(name)";
const PROFILE_COLUMNS: &str = "email,first_name,last_name";

/// Catalog reading rows from a PostgREST-style HTTP API
///
/// Rows are fetched from the `podcasts`, `profiles` and `episodes` tables
/// with `column=eq.value` filters.
#[derive(Clone)]
pub struct RestCatalog<C: HttpClient> {
    client: C,
    base_url: Url,
    api_key: Option<String>,
}

impl<C: HttpClient> RestCatalog<C> {
    /// `base_url` is the REST root, e.g. `https://db.example.com/rest/v1`
    pub fn new(client: C, base_url: &str, api_key: Option<String>) -> Result<Self, CatalogError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.join(table)?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, url: &Url) -> Result<Vec<T>, CatalogError> {
        let bearer = self.api_key.as_ref().map(|key| format!("Bearer {key}"));
        let mut headers = vec![("Accept", "application/json")];
        if let (Some(key), Some(bearer)) = (&self.api_key, &bearer) {
            headers.push(("apikey", key.as_str()));
            headers.push(("Authorization", bearer.as_str()));
        }

        debug!(%url, "Fetching catalog rows");
        let response = self
            .client
            .get(url.as_str(), &headers)
            .await
            .map_err(|e| CatalogError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        if response.status >= 400 {
            return Err(CatalogError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| CatalogError::DecodeFailed {
            url: url.to_string(),
            source: e,
        })
    }

    /// Fill a missing owner from the podcast's profile row
    async fn complete_owner(&self, podcast: &mut PodcastMetadata) {
        if podcast.owner.email.is_some() {
            return;
        }
        let Some(user_id) = podcast.user_id.clone() else {
            return;
        };

        let filter = format!("eq.{user_id}");
        let profile = match self.table_url(
            "profiles",
            &[("select", PROFILE_COLUMNS), ("id", filter.as_str()), ("limit", "1")],
        ) {
            Ok(url) => self.fetch_rows::<Profile>(&url).await,
            Err(e) => Err(e),
        };

        match profile {
            Ok(rows) => {
                if let Some(profile) = rows.into_iter().next() {
                    if podcast.owner.name.is_none() {
                        podcast.owner.name = profile.full_name();
                    }
                    podcast.owner.email = profile.email;
                }
            }
            Err(e) => warn!(slug = %podcast.slug, error = %e, "Failed to load owner profile"),
        }
    }
}

#[async_trait]
impl<C: HttpClient> Catalog for RestCatalog<C> {
    async fn podcast(&self, slug: &str) -> Result<Option<PodcastMetadata>, CatalogError> {
        let filter = format!("eq.{slug}");
        let url = self.table_url(
            "podcasts",
            &[
                ("select", PODCAST_COLUMNS),
                ("podcast_slug", filter.as_str()),
                ("limit", "1"),
            ],
        )?;

        let rows: Vec<PodcastMetadata> = self.fetch_rows(&url).await?;
        let Some(mut podcast) = rows.into_iter().next() else {
            return Ok(None);
        };

        self.complete_owner(&mut podcast).await;
        Ok(Some(podcast))
    }

    async fn episodes(&self, slug: &str) -> Result<Vec<EpisodeRecord>, CatalogError> {
        let filter = format!("eq.{slug}");
        let url = self.table_url(
            "episodes",
            &[
                ("select", "*"),
                ("podcast_slug", filter.as_str()),
                ("order", "publication_date.desc"),
            ],
        )?;

        let mut episodes: Vec<EpisodeRecord> = self.fetch_rows(&url).await?;
        sort_newest_first(&mut episodes);
        Ok(episodes)
    }
}
