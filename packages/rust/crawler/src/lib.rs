//! Bounded-concurrency site crawler for webcorpus.
//!
//! A fixed pool of workers shares one [`Frontier`] (pending queue + visited
//! set + page budget) and one corpus assembler. Each worker loops:
//! dequeue → fetch → extract → discover links → enqueue new URLs → record.
//! The crawl terminates when the frontier is empty and no worker is
//! mid-flight; a single failed page never aborts the crawl.

pub mod discover;
pub mod engine;
pub mod fetcher;
pub mod frontier;

pub use discover::discover_links;
pub use engine::{CrawlEngine, CrawlStats, ProgressReporter, SilentProgress};
pub use fetcher::{FetchedResource, build_http_client, fetch};
pub use frontier::{Frontier, normalize_url};
