//! HTTP fetcher with bounded retry
//!
//! Every page the crawler reads goes through [`Fetcher::fetch`]: a GET
//! request retried a fixed number of times on any failure. Transport
//! errors, non-success statuses, and body-read failures all consume one
//! unit of the same attempt budget; there is no backoff and no
//! per-error-class policy. On exhaustion the most recent error is
//! returned.
//!
//! The fetched body stays a plain `String` here; parsing into a
//! `scraper::Html` document happens inside the handler that consumes the
//! page, so the non-`Send` document never crosses a worker boundary.

use crate::observe::{CrawlEvent, Observer};
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Errors a single fetch can end with
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bad status {status} for {url}")]
    BadStatus { url: String, status: u16 },

    #[error("failed to read document from {url}: {message}")]
    Parse { url: String, message: String },
}

/// A successfully fetched page, not yet parsed
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

impl FetchedPage {
    /// Parses the body into a queryable document
    ///
    /// The returned `Html` is not `Send`; callers parse, extract what
    /// they need, and drop it before the next await point.
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Builds the HTTP client shared by all fetches
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("storecrawl/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a bounded linear retry loop
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    observer: Arc<Observer>,
}

impl Fetcher {
    pub fn new(observer: Arc<Observer>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
            observer,
        })
    }

    /// Fetches a URL, retrying up to `retries` times after the first attempt
    ///
    /// Makes at most `retries + 1` attempts. Each attempt emits an
    /// observability event carrying the URL and elapsed duration; failed
    /// attempts emit at warn level. On exhaustion the last observed error
    /// is returned.
    pub async fn fetch(&self, url: &Url, retries: u32) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let started = Instant::now();
            match self.attempt(url).await {
                Ok(body) => {
                    self.observer.emit(CrawlEvent::FetchSucceeded {
                        url: url.to_string(),
                        attempt,
                        elapsed: started.elapsed(),
                    });
                    return Ok(FetchedPage {
                        url: url.clone(),
                        body,
                    });
                }
                Err(err) => {
                    self.observer.emit(CrawlEvent::FetchFailed {
                        url: url.to_string(),
                        attempt,
                        elapsed: started.elapsed(),
                        reason: err.to_string(),
                    });
                    if attempt > retries {
                        self.observer.emit(CrawlEvent::RetriesExhausted {
                            url: url.to_string(),
                            attempts: attempt,
                        });
                        return Err(err);
                    }
                }
            }
        }
    }

    /// One GET attempt: transport, status, and body read can each fail
    async fn attempt(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
