//! Crawler module: the three-tier crawl pipeline
//!
//! Tier 1 reads the storefront root menu and collects category page
//! references. Tier 2 follows each category to its jerseys listing and
//! collects product references. Tier 3 extracts each product and
//! persists it. Each tier fans out through the bounded dispatcher, and
//! every branch handles its own failures; no branch aborts a sibling.

mod orchestrator;

pub use orchestrator::Orchestrator;
