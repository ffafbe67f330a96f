// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::SiteConfig;

pub use routes::{CACHE_CONTROL_VALUE, atom_handler, feed_alias_handler, health_handler, rss_handler};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub config: Arc<SiteConfig>,
    clock: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, config: SiteConfig) -> Self {
        Self {
            catalog,
            config: Arc::new(config),
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for `lastBuildDate` / `updated`
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Build the feed router with CORS and request tracing
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/podcasts/{slug}/rss.xml", get(rss_handler))
        .route("/podcasts/{slug}/feed.xml", get(feed_alias_handler))
        .route("/podcasts/{slug}/atom.xml", get(atom_handler))
        .route("/healthz", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `address` and serve feeds until Ctrl+C or SIGTERM
pub async fn serve(address: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
