pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod model;
pub mod server;

// Re-export main types for convenience
pub use catalog::{Catalog, CatalogEntry, FileCatalog, RestCatalog};
pub use config::SiteConfig;
pub use error::{AppError, CatalogError, ConfigError, FeedError};
pub use feed::{FeedFormat, FeedSummary, check_feed, render_feed, render_feed_at};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use model::{EpisodeRecord, Owner, PodcastMetadata, Profile};
pub use server::{AppState, router, serve};
