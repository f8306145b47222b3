//! PDF extraction: page-ordered text via `pdf-extract`.

use tracing::warn;
use url::Url;

use webcorpus_shared::{ContentKind, PageRecord};

/// Extract page-ordered text from PDF bytes.
///
/// A payload that cannot be decoded as PDF degrades to a single diagnostic
/// string in the record's text; extraction never fails past this boundary.
pub(crate) fn extract_pdf(url: &Url, bytes: &[u8]) -> PageRecord {
    let text = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(raw) => collapse_blank_lines(&raw),
        Err(e) => {
            warn!(%url, error = %e, "pdf extraction failed");
            format!("unreadable pdf payload: {e}")
        }
    };

    PageRecord {
        url: url.clone(),
        kind: ContentKind::Pdf,
        sections: Vec::new(),
        text,
    }
}

/// Trim per-line whitespace and squeeze runs of blank lines down to one,
/// keeping paragraph breaks intact.
fn collapse_blank_lines(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}
