//! Side-file store for fetched binary media.
//!
//! A cache-to-disk side effect only: the crawl's correctness never depends
//! on it, and callers log (not propagate) its failures. Filenames derive
//! from the URL's last path segment plus a short hash of the full URL so
//! distinct URLs with the same basename cannot collide.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use webcorpus_shared::{Result, WebCorpusError};

/// Fallback stem for URLs whose path has no usable final segment.
const DEFAULT_STEM: &str = "resource";

/// Writes fetched media payloads under one directory.
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    /// Create the store, making the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| WebCorpusError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Persist one payload; returns the path it was written to.
    pub fn save(&self, url: &Url, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(filename_for(url));
        let temp = self.dir.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        std::fs::write(&temp, bytes).map_err(|e| WebCorpusError::io(&temp, e))?;
        std::fs::rename(&temp, &path).map_err(|e| WebCorpusError::io(&path, e))?;

        debug!(%url, path = %path.display(), size = bytes.len(), "saved media file");
        Ok(path)
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Derive a filesystem-safe filename from a URL.
fn filename_for(url: &Url) -> String {
    let stem = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(sanitize)
        .unwrap_or_else(|| DEFAULT_STEM.to_string());

    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    format!("{}-{stem}", &hash[..8])
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
