use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while assembling or checking a feed document
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Episode '{title}' has an invalid enclosure URL '{url}': {reason}")]
    InvalidEnclosureUrl {
        title: String,
        url: String,
        reason: String,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to write feed XML: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to write feed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Feed output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to fingerprint feed inputs: {0}")]
    Fingerprint(#[from] serde_json::Error),

    #[error("Rendered RSS feed does not parse: {0}")]
    RssCheckFailed(#[from] rss::Error),

    #[error("Rendered Atom feed does not parse: {0}")]
    AtomCheckFailed(#[from] atom_syndication::Error),
}

/// Errors that can occur when loading podcasts and episodes from a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode catalog response from {url}: {source}")]
    DecodeFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read catalog file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog file {path}: {source}")]
    FileParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors raised while building the site configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {name} '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} must be an http or https URL, got '{value}'")]
    UnsupportedScheme { name: &'static str, value: String },
}

/// Errors surfaced by the feed service as HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Podcast not found or could not generate feed")]
    NotFound,

    #[error("Failed to render feed: {0}")]
    Render(#[from] FeedError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
