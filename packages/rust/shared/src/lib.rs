//! Shared types, error model, and configuration for webcorpus.
//!
//! This crate is the foundation depended on by all other webcorpus crates.
//! It provides:
//! - [`WebCorpusError`] — the unified error type
//! - Domain types ([`PageRecord`], [`Section`], [`Corpus`], [`ContentKind`])
//! - Configuration ([`AppConfig`], [`CrawlOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlOptions, DefaultsConfig, OutputConfig, TranscriberConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, WebCorpusError};
pub use types::{ContentKind, Corpus, PageRecord, Section};
