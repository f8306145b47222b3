//! Core domain types for webcorpus crawl results.

use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// ContentKind
// ---------------------------------------------------------------------------

/// Classification of a fetched resource's payload, derived from the declared
/// media type. Drives the extraction strategy, one handler per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// HTML/XHTML markup. The only kind that yields sections and links.
    Markup,
    /// PDF document.
    Pdf,
    /// CSV or spreadsheet data.
    Tabular,
    /// Audio payload, transcribed to text.
    Audio,
    /// Anything unclassified. Recorded in the corpus without content.
    Binary,
}

impl ContentKind {
    /// Classify from a `Content-Type` header value. Unknown or missing
    /// media types map to [`ContentKind::Binary`].
    pub fn from_media_type(media_type: Option<&str>) -> Self {
        let Some(mt) = media_type else {
            return ContentKind::Binary;
        };
        let mt = mt.to_ascii_lowercase();
        if mt.contains("html") || mt.contains("xml") {
            ContentKind::Markup
        } else if mt.contains("pdf") {
            ContentKind::Pdf
        } else if mt.contains("csv") || mt.contains("spreadsheet") || mt.contains("ms-excel") {
            ContentKind::Tabular
        } else if mt.starts_with("audio/") {
            ContentKind::Audio
        } else {
            ContentKind::Binary
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentKind::Markup => "markup",
            ContentKind::Pdf => "pdf",
            ContentKind::Tabular => "tabular",
            ContentKind::Audio => "audio",
            ContentKind::Binary => "binary",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One heading-delimited region of a markup page.
///
/// Sections always form one flat ordered list per page: every heading on a
/// page, regardless of its level, produces a sibling entry directly under
/// the page. `children` is carried for the serialized tree shape and stays
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text, whitespace-trimmed.
    pub heading: String,
    /// All text between this heading and the next, single-space joined.
    pub body: String,
    /// Always empty; headings never nest under each other.
    #[serde(default)]
    pub children: Vec<Section>,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
            children: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// The extraction result for one fetched URL. Write-once: created by the
/// extractor, appended to the corpus, never mutated afterwards.
///
/// For markup pages with headings, `sections` is non-empty and `text` is
/// empty; pages without headings carry the whole-document visible text in
/// `text`; non-markup pages always carry converted text (possibly empty for
/// unclassified binaries) in `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// The fetched URL.
    pub url: Url,
    /// Payload classification this record was extracted as.
    pub kind: ContentKind,
    /// Flat ordered list of heading sections (markup pages only).
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Flat converted text for pages without a section tree.
    #[serde(default)]
    pub text: String,
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// The accumulated result of one crawl run: every completed page record,
/// rooted at the seed URL. Pages appear in worker completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    /// The seed URL the crawl started from.
    pub root: Url,
    /// Completed page records, append-only during the crawl.
    pub pages: Vec<PageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_kind_classification() {
        assert_eq!(
            ContentKind::from_media_type(Some("text/html; charset=utf-8")),
            ContentKind::Markup
        );
        assert_eq!(
            ContentKind::from_media_type(Some("application/xhtml+xml")),
            ContentKind::Markup
        );
        assert_eq!(
            ContentKind::from_media_type(Some("application/pdf")),
            ContentKind::Pdf
        );
        assert_eq!(
            ContentKind::from_media_type(Some("text/csv")),
            ContentKind::Tabular
        );
        assert_eq!(
            ContentKind::from_media_type(Some(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            )),
            ContentKind::Tabular
        );
        assert_eq!(
            ContentKind::from_media_type(Some("audio/mpeg")),
            ContentKind::Audio
        );
        assert_eq!(
            ContentKind::from_media_type(Some("application/octet-stream")),
            ContentKind::Binary
        );
        assert_eq!(ContentKind::from_media_type(None), ContentKind::Binary);
    }

    #[test]
    fn content_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ContentKind::Markup).unwrap(),
            "\"markup\""
        );
        let parsed: ContentKind = serde_json::from_str("\"audio\"").unwrap();
        assert_eq!(parsed, ContentKind::Audio);
    }

    #[test]
    fn page_record_roundtrip() {
        let record = PageRecord {
            url: Url::parse("https://example.com/docs").unwrap(),
            kind: ContentKind::Markup,
            sections: vec![
                Section::new("Overview", "Intro text."),
                Section::new("Details", "More text."),
            ],
            text: String::new(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: PageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert!(parsed.sections[0].children.is_empty());
    }

    #[test]
    fn corpus_roundtrip() {
        let corpus = Corpus {
            root: Url::parse("https://example.com/").unwrap(),
            pages: vec![PageRecord {
                url: Url::parse("https://example.com/a.pdf").unwrap(),
                kind: ContentKind::Pdf,
                sections: Vec::new(),
                text: "extracted pdf text".into(),
            }],
        };

        let json = serde_json::to_string(&corpus).unwrap();
        let parsed: Corpus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pages.len(), 1);
        assert_eq!(parsed.pages[0].kind, ContentKind::Pdf);
    }
}
