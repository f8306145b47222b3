//! Concurrent-safe accumulation of completed page records.

use std::sync::Mutex;

use tracing::debug;
use url::Url;

use webcorpus_shared::{Corpus, PageRecord};

/// Collects [`PageRecord`]s from concurrent crawl workers.
///
/// Appends are serialized behind one mutex; a record becomes visible only
/// once its worker completed the whole page (no partial records are ever
/// published). Page order is worker completion order, not frontier order.
pub struct CorpusAssembler {
    root: Url,
    pages: Mutex<Vec<PageRecord>>,
}

impl CorpusAssembler {
    /// Create an empty assembler rooted at the seed URL.
    pub fn new(root: Url) -> Self {
        Self {
            root,
            pages: Mutex::new(Vec::new()),
        }
    }

    /// Append one completed record. Safe under concurrent writers.
    pub fn record(&self, record: PageRecord) {
        debug!(url = %record.url, kind = %record.kind, "recorded page");
        self.pages.lock().unwrap().push(record);
    }

    /// Number of records collected so far.
    pub fn len(&self) -> usize {
        self.pages.lock().unwrap().len()
    }

    /// True when no record has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the accumulated records into a [`Corpus`]. Call only after
    /// the crawl reports quiescence; records appended later are not
    /// reflected in the returned value.
    pub fn finalize(&self) -> Corpus {
        Corpus {
            root: self.root.clone(),
            pages: self.pages.lock().unwrap().clone(),
        }
    }
}
