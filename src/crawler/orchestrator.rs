//! Crawl orchestration across the three discovery tiers

use crate::config::Config;
use crate::dispatch::dispatch;
use crate::extract::{self, ProductLink};
use crate::fetch::Fetcher;
use crate::observe::{CrawlEvent, Observer};
use crate::storage::{SqliteStorage, Storage};
use crate::CrawlError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use url::Url;

/// Drives the three-tier crawl
///
/// Holds the retrying fetcher, the persistence gate (one mutex around
/// the storage backend, shared by every concurrent product handler), and
/// the injected observer. Cheap to share behind an `Arc`; one instance
/// can serve repeated runs.
pub struct Orchestrator {
    config: Arc<Config>,
    root: Url,
    fetcher: Fetcher,
    storage: Arc<Mutex<SqliteStorage>>,
    observer: Arc<Observer>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        storage: Arc<Mutex<SqliteStorage>>,
        observer: Arc<Observer>,
    ) -> Result<Self, CrawlError> {
        let root = Url::parse(&config.crawler.root_url)?;
        let fetcher = Fetcher::new(Arc::clone(&observer))?;

        Ok(Self {
            config: Arc::new(config),
            root,
            fetcher,
            storage,
            observer,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Fetches the root menu, then fans out category branches at the
    /// configured tier-2 concurrency. Returns only after every branch,
    /// including all nested product work, has drained. A root fetch
    /// failure is the one fatal error; everything downstream is
    /// branch-local.
    pub async fn run(self: Arc<Self>) -> Result<(), CrawlError> {
        let started = Instant::now();
        self.observer.emit(CrawlEvent::CrawlStarted {
            root: self.root.to_string(),
        });

        let retries = self.config.crawler.fetch_retries;
        let page = self.fetcher.fetch(&self.root, retries).await?;

        let categories = {
            let doc = page.parse();
            extract::menu_category_links(&doc, &self.config.crawler.categories, &self.root)
        };

        tracing::info!("menu yielded {} category pages", categories.len());

        let this = Arc::clone(&self);
        dispatch(
            categories,
            self.config.crawler.category_concurrency,
            move |url| {
                let this = Arc::clone(&this);
                async move { this.crawl_category(url).await }
            },
        )
        .await;

        self.observer.emit(CrawlEvent::CrawlFinished {
            elapsed: started.elapsed(),
        });

        Ok(())
    }

    /// Tier 2: one category branch
    ///
    /// Fetches the category page, follows its jerseys link, and fans out
    /// the listed products at the tier-3 concurrency. The product
    /// dispatch is awaited here, so this handler returns only after all
    /// of its products are done. Any failure terminates this branch and
    /// nothing else.
    async fn crawl_category(self: Arc<Self>, url: Url) {
        let retries = self.config.crawler.fetch_retries;

        let page = match self.fetcher.fetch(&url, retries).await {
            Ok(page) => page,
            Err(e) => {
                self.observer.emit(CrawlEvent::BranchSkipped {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        let jerseys = {
            let doc = page.parse();
            extract::jerseys_link(&doc, &self.root)
        };

        let jerseys = match jerseys {
            Some(link) => link,
            None => {
                self.observer.emit(CrawlEvent::BranchSkipped {
                    url: url.to_string(),
                    reason: "no jerseys link on category page".to_string(),
                });
                return;
            }
        };

        let listing = match self.fetcher.fetch(&jerseys, retries).await {
            Ok(page) => page,
            Err(e) => {
                self.observer.emit(CrawlEvent::BranchSkipped {
                    url: jerseys.to_string(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        let listing_links = {
            let doc = listing.parse();
            extract::product_links(&doc, &self.root)
        };

        for index in &listing_links.cards_without_link {
            self.observer.emit(CrawlEvent::BranchSkipped {
                url: jerseys.to_string(),
                reason: format!("product card {} has no link", index),
            });
        }

        let products = listing_links.links;
        tracing::debug!("category {} listed {} products", url, products.len());

        let this = Arc::clone(&self);
        dispatch(
            products,
            self.config.crawler.product_concurrency,
            move |link| {
                let this = Arc::clone(&this);
                async move { this.crawl_product(link).await }
            },
        )
        .await;
    }

    /// Tier 3: one product page
    ///
    /// Fetches, extracts, and writes through the persistence gate. The
    /// document is parsed and dropped locally; only the owned record
    /// crosses into storage.
    async fn crawl_product(&self, link: ProductLink) {
        let retries = self.config.crawler.fetch_retries;

        let page = match self.fetcher.fetch(&link.url, retries).await {
            Ok(page) => page,
            // The fetcher already reported the exhausted retries.
            Err(_) => return,
        };

        let record = {
            let doc = page.parse();
            extract::extract_product(&doc)
        };

        let stored = {
            let mut storage = self.storage.lock().await;
            storage.upsert_product(&record)
        };

        match stored {
            Ok(id) => self.observer.emit(CrawlEvent::RecordStored {
                id,
                jersey_assured: link.jersey_assured,
            }),
            Err(e) => self.observer.emit(CrawlEvent::StoreFailed {
                url: link.url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
