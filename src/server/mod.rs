//! HTTP control surface
//!
//! A deliberately thin trigger layer: `POST /crawler` spawns a crawl on
//! a detached task and answers 202 immediately. There is no crawl id, no
//! status endpoint, and no cancellation; downstream outcomes are visible
//! only through the observer.

use crate::crawler::Orchestrator;
use crate::CrawlError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state for the trigger endpoint
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Builds the router with the trigger and liveness routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/crawler", post(trigger_crawl))
        .with_state(state)
}

/// Binds the listener and serves until the process exits
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), CrawlError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("control surface listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> &'static str {
    "storecrawl"
}

/// Fire-and-forget crawl trigger
///
/// Always answers 202; the spawned crawl reports its outcome through
/// logging only.
async fn trigger_crawl(State(state): State<AppState>) -> StatusCode {
    let orchestrator = Arc::clone(&state.orchestrator);
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run().await {
            tracing::error!("crawl run failed: {}", e);
        }
    });
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, CrawlerConfig, OutputConfig, ServerConfig};
    use crate::observe::{Level, Observer};
    use crate::storage::SqliteStorage;
    use tokio::sync::Mutex;

    fn test_state() -> AppState {
        let config = Config {
            crawler: CrawlerConfig {
                root_url: "http://127.0.0.1:1/".to_string(),
                categories: vec!["nfl".to_string()],
                category_concurrency: 1,
                product_concurrency: 1,
                fetch_retries: 0,
            },
            server: ServerConfig::default(),
            output: OutputConfig {
                database_path: ":memory:".to_string(),
            },
        };
        let storage = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
        let observer = Arc::new(Observer::empty(Level::Error));
        AppState {
            orchestrator: Arc::new(Orchestrator::new(config, storage, observer).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_router_builds() {
        let _router = router(test_state());
    }

    #[tokio::test]
    async fn test_trigger_returns_accepted_immediately() {
        // The root URL is unreachable; the trigger must still answer 202.
        let response = trigger_crawl(State(test_state())).await;
        assert_eq!(response, StatusCode::ACCEPTED);
    }
}
