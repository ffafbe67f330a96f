// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{EpisodeRecord, PodcastMetadata};

use super::{Catalog, sort_newest_first};

/// One podcast row with its episode rows, as stored in a snapshot file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub podcast: PodcastMetadata,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
}

/// Catalog backed by a JSON snapshot, loaded once into memory
///
/// The file holds an array of podcast rows, each with an `episodes` array.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl FileCatalog {
    /// Load a snapshot file
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::FileReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&content).map_err(|e| CatalogError::FileParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self::from_entries(entries))
    }

    /// Build a catalog from in-memory entries; later duplicates win
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                sort_newest_first(&mut entry.episodes);
                (entry.podcast.slug.clone(), entry)
            })
            .collect();

        Self { entries }
    }

    /// Slugs of all podcasts in the snapshot, sorted
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn podcast(&self, slug: &str) -> Result<Option<PodcastMetadata>, CatalogError> {
        Ok(self.entries.get(slug).map(|entry| entry.podcast.clone()))
    }

    async fn episodes(&self, slug: &str) -> Result<Vec<EpisodeRecord>, CatalogError> {
        Ok(self
            .entries
            .get(slug)
            .map(|entry| entry.episodes.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SNAPSHOT: &str = r#"[
      {
        "podcast_slug": "morning-devotion",
        "title": "Morning Devotion & Prayer",
        "itunes_owner_email": "host@example.com",
        "episodes": [
          {
            "episode_id": 1,
            "title": "Older",
            "publication_date": "2024-01-08T00:00:00Z",
            "enclosure_url": "https://cdn.example.com/1.mp3"
          },
          {
            "episode_id": 2,
            "title": "Newer",
            "publication_date": "2024-01-15T00:00:00Z",
            "enclosure_url": "https://cdn.example.com/2.mp3"
          }
        ]
      },
      {
        "podcast_slug": "evening-vespers",
        "title": "Evening Vespers"
      }
    ]"#;

    fn write_snapshot(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn open_loads_podcasts_and_sorts_episodes() {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let catalog = FileCatalog::open(&path).unwrap();

        assert_eq!(catalog.slugs(), vec!["evening-vespers", "morning-devotion"]);

        let podcast = catalog.podcast("morning-devotion").await.unwrap().unwrap();
        assert_eq!(podcast.title, "Morning Devotion & Prayer");
        assert_eq!(podcast.owner.email.as_deref(), Some("host@example.com"));

        let episodes = catalog.episodes("morning-devotion").await.unwrap();
        let titles: Vec<&str> = episodes.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn unknown_slug_is_none() {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let catalog = FileCatalog::open(&path).unwrap();

        assert!(catalog.podcast("missing").await.unwrap().is_none());
        assert!(catalog.episodes("missing").await.unwrap().is_empty());
        assert!(catalog.episodes("evening-vespers").await.unwrap().is_empty());
    }

    #[test]
    fn open_reports_missing_file() {
        let dir = tempdir().unwrap();
        let result = FileCatalog::open(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(CatalogError::FileReadFailed { .. })));
    }

    #[test]
    fn open_reports_invalid_json() {
        let (_dir, path) = write_snapshot("{ not json");
        let result = FileCatalog::open(&path);
        assert!(matches!(result, Err(CatalogError::FileParseFailed { .. })));
    }
}
