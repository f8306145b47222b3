//! Tabular extraction: CSV and XLSX rendered as plain text tables.
//!
//! The declared media type is unreliable for distinguishing the two
//! (`application/vnd.ms-excel` shows up for both in the wild), so the
//! handler sniffs the ZIP magic instead: XLSX workbooks are ZIP archives,
//! CSV is anything else.

use std::io::Cursor;

use calamine::Reader;
use tracing::warn;
use url::Url;

use webcorpus_shared::{ContentKind, PageRecord};

/// Column separator used in the rendered text table.
const CELL_SEPARATOR: &str = " | ";

/// ZIP local-file-header magic, the start of every XLSX workbook.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Render tabular bytes as a text table preserving row and column order.
///
/// A payload that cannot be parsed degrades to a single diagnostic string;
/// extraction never fails past this boundary.
pub(crate) fn extract_tabular(url: &Url, bytes: &[u8]) -> PageRecord {
    let result = if bytes.starts_with(ZIP_MAGIC) {
        render_xlsx(bytes)
    } else {
        render_csv(bytes)
    };

    let text = match result {
        Ok(table) => table,
        Err(cause) => {
            warn!(%url, %cause, "tabular extraction failed");
            format!("unreadable tabular payload: {cause}")
        }
    };

    PageRecord {
        url: url.clone(),
        kind: ContentKind::Tabular,
        sections: Vec::new(),
        text,
    }
}

fn render_csv(bytes: &[u8]) -> Result<String, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(record.iter().collect::<Vec<_>>().join(CELL_SEPARATOR));
    }
    Ok(rows.join("\n"))
}

fn render_xlsx(bytes: &[u8]) -> Result<String, String> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor).map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    for (sheet_name, range) in workbook.worksheets() {
        out.push(format!("[{sheet_name}]"));
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            out.push(cells.join(CELL_SEPARATOR));
        }
    }
    Ok(out.join("\n"))
}
