//! Application configuration for webcorpus.
//!
//! User config lives at `~/.webcorpus/webcorpus.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WebCorpusError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "webcorpus.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".webcorpus";

// ---------------------------------------------------------------------------
// Config structs (matching webcorpus.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Speech-to-text settings for audio payloads.
    #[serde(default)]
    pub transcriber: TranscriberConfig,

    /// Output artifact locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum number of URLs ever admitted to the frontier.
    #[serde(default = "default_page_budget")]
    pub page_budget: usize,

    /// Worker pool size.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            page_budget: default_page_budget(),
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_page_budget() -> usize {
    100
}
fn default_workers() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[transcriber]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Speech-to-text endpoint URL. Empty disables audio transcription.
    #[serde(default)]
    pub endpoint: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Transcription model identifier sent with each request.
    #[serde(default = "default_stt_model")]
    pub model: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key_env: default_api_key_env(),
            model: default_stt_model(),
        }
    }
}

fn default_api_key_env() -> String {
    "WEBCORPUS_STT_API_KEY".into()
}
fn default_stt_model() -> String {
    "whisper-1".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the serialized corpus artifact.
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,

    /// Directory for fetched binary media side files.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            media_dir: default_media_dir(),
        }
    }
}

fn default_corpus_path() -> String {
    "output/corpus.json".into()
}
fn default_media_dir() -> String {
    "output/media".into()
}

// ---------------------------------------------------------------------------
// Crawl options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl options — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Hard ceiling on URLs ever admitted to the frontier.
    pub page_budget: usize,
    /// Number of concurrent workers.
    pub workers: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for CrawlOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            page_budget: config.defaults.page_budget,
            workers: config.defaults.workers,
            timeout_secs: config.defaults.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.webcorpus/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WebCorpusError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.webcorpus/webcorpus.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WebCorpusError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WebCorpusError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WebCorpusError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WebCorpusError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WebCorpusError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
