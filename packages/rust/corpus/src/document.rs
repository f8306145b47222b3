//! The serialized corpus artifact.
//!
//! One JSON document per crawl run with the shape
//! `{ "url": <seed>, "children": [ { "url", "kind", "text", "children":
//! [ { "header", "content", "children": [] } ] } ] }`. The tree shape
//! round-trips losslessly to and from the in-memory [`Corpus`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use webcorpus_shared::{ContentKind, Corpus, PageRecord, Result, Section, WebCorpusError};

/// Root of the serialized corpus tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDoc {
    /// The seed URL the crawl started from.
    pub url: Url,
    /// When the artifact was written.
    pub generated_at: DateTime<Utc>,
    /// One entry per completed page, in completion order.
    pub children: Vec<PageDoc>,
}

/// One page entry in the corpus tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDoc {
    /// The fetched URL.
    pub url: Url,
    /// Content kind the page was extracted as.
    pub kind: ContentKind,
    /// Flat converted text (empty when the page exploded into sections).
    #[serde(default)]
    pub text: String,
    /// Ordered heading sections (markup pages with headings only).
    #[serde(default)]
    pub children: Vec<SectionDoc>,
}

/// One heading section inside a page entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDoc {
    /// Heading text.
    pub header: String,
    /// Text between this heading and the next.
    pub content: String,
    /// Always empty; sections form one flat list per page.
    #[serde(default)]
    pub children: Vec<SectionDoc>,
}

impl CorpusDoc {
    /// Build the artifact tree from a finalized corpus.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        Self {
            url: corpus.root.clone(),
            generated_at: Utc::now(),
            children: corpus.pages.iter().map(PageDoc::from_record).collect(),
        }
    }

    /// Reconstruct the in-memory corpus from the artifact tree.
    pub fn into_corpus(self) -> Corpus {
        Corpus {
            root: self.url,
            pages: self.children.into_iter().map(PageDoc::into_record).collect(),
        }
    }
}

impl PageDoc {
    fn from_record(record: &PageRecord) -> Self {
        Self {
            url: record.url.clone(),
            kind: record.kind,
            text: record.text.clone(),
            children: record
                .sections
                .iter()
                .map(|s| SectionDoc {
                    header: s.heading.clone(),
                    content: s.body.clone(),
                    children: Vec::new(),
                })
                .collect(),
        }
    }

    fn into_record(self) -> PageRecord {
        PageRecord {
            url: self.url,
            kind: self.kind,
            sections: self
                .children
                .into_iter()
                .map(|s| Section::new(s.header, s.content))
                .collect(),
            text: self.text,
        }
    }
}

/// Write the corpus artifact as pretty-printed JSON.
///
/// Writes to a temp file in the target directory first, then renames, so a
/// crash never leaves a half-written artifact behind.
pub fn write_corpus(path: &Path, corpus: &Corpus) -> Result<()> {
    let doc = CorpusDoc::from_corpus(corpus);
    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| WebCorpusError::validation(format!("corpus serialization failed: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| WebCorpusError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| WebCorpusError::validation("corpus path has no file name"))?
        .to_string_lossy();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, &json).map_err(|e| WebCorpusError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| WebCorpusError::io(path, e))?;

    debug!(path = %path.display(), bytes = json.len(), "wrote corpus artifact");
    info!(pages = corpus.pages.len(), path = %path.display(), "corpus artifact written");

    Ok(())
}
