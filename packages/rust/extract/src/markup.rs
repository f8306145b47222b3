//! Markup extraction: heading-scoped sections and visible-text fallback.
//!
//! The section scan is a single forward pass over heading elements. For each
//! heading, the body collects text from the heading's following *siblings*
//! up to the next heading sibling. The walk never descends past the sibling
//! boundary to look for headings, so text inside nested wrapper elements
//! that are not siblings of any heading is dropped. Sibling-only scanning
//! is intentional; keep it when touching this module.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use webcorpus_shared::{ContentKind, PageRecord, Section};

/// Extract a page record from markup bytes.
///
/// Pages with at least one non-empty heading yield a flat ordered section
/// list and no flat text; pages without headings yield the whole-document
/// visible text (script/style excluded).
pub(crate) fn extract_markup(url: &Url, bytes: &[u8]) -> PageRecord {
    let html = String::from_utf8_lossy(bytes);
    let doc = Html::parse_document(&html);

    let sections = extract_sections(&doc);
    let text = if sections.is_empty() {
        visible_text(&doc)
    } else {
        String::new()
    };

    PageRecord {
        url: url.clone(),
        kind: ContentKind::Markup,
        sections,
        text,
    }
}

/// One flat ordered list of sections, one entry per heading in document
/// order. Headings never nest under each other.
fn extract_sections(doc: &Html) -> Vec<Section> {
    let heading_sel = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    let mut sections = Vec::new();

    for heading in doc.select(&heading_sel) {
        let title = heading.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let mut parts: Vec<String> = Vec::new();
        for sibling in heading.next_siblings() {
            match sibling.value() {
                Node::Element(el) if is_heading(el.name()) => break,
                Node::Element(el) => {
                    if el.name() == "script" || el.name() == "style" {
                        continue;
                    }
                    if let Some(el_ref) = ElementRef::wrap(sibling) {
                        push_text(&mut parts, el_ref.text());
                    }
                }
                Node::Text(t) => {
                    let trimmed = t.trim();
                    if !trimmed.is_empty() {
                        parts.push(trimmed.to_string());
                    }
                }
                _ => {}
            }
        }

        sections.push(Section::new(title, parts.join(" ")));
    }

    sections
}

/// Whole-document visible text, script and style contents excluded.
fn visible_text(doc: &Html) -> String {
    let mut parts = Vec::new();
    collect_visible(*doc.root_element(), &mut parts);
    parts.join(" ")
}

fn collect_visible(node: NodeRef<'_, Node>, parts: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(el) => {
                if el.name() != "script" && el.name() != "style" {
                    collect_visible(child, parts);
                }
            }
            _ => {}
        }
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn push_text<'a>(parts: &mut Vec<String>, text: impl Iterator<Item = &'a str>) {
    let joined = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !joined.is_empty() {
        parts.push(joined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> PageRecord {
        let url = Url::parse("https://example.com/page").unwrap();
        extract_markup(&url, html.as_bytes())
    }

    #[test]
    fn headings_become_flat_ordered_sections() {
        let html = r#"<html><body>
            <h1>First</h1>
            <p>alpha</p>
            <p>beta</p>
            <h2>Second</h2>
            <p>gamma</p>
            <h3>Third</h3>
            <p>delta</p>
            <p>epsilon</p>
        </body></html>"#;

        let record = extract(html);
        assert!(record.text.is_empty());
        assert_eq!(record.sections.len(), 3);

        assert_eq!(record.sections[0].heading, "First");
        assert_eq!(record.sections[0].body, "alpha beta");
        assert_eq!(record.sections[1].heading, "Second");
        assert_eq!(record.sections[1].body, "gamma");
        assert_eq!(record.sections[2].heading, "Third");
        assert_eq!(record.sections[2].body, "delta epsilon");

        // Deeper headings never nest: one page, one flat sibling list.
        assert!(record.sections.iter().all(|s| s.children.is_empty()));
    }

    #[test]
    fn body_stops_at_next_heading_of_any_level() {
        let html = "<body><h2>A</h2><p>only for a</p><h1>B</h1><p>only for b</p></body>";
        let record = extract(html);

        assert_eq!(record.sections.len(), 2);
        assert_eq!(record.sections[0].body, "only for a");
        assert_eq!(record.sections[1].body, "only for b");
    }

    #[test]
    fn no_headings_falls_back_to_visible_text() {
        let html = r#"<html><head>
            <script>var x = "invisible";</script>
            <style>.hidden { display: none; }</style>
        </head><body>
            <div><p>Plain page</p><span>with text</span></div>
        </body></html>"#;

        let record = extract(html);
        assert!(record.sections.is_empty());
        assert_eq!(record.text, "Plain page with text");
        assert!(!record.text.contains("invisible"));
        assert!(!record.text.contains("hidden"));
    }

    #[test]
    fn sibling_walk_takes_wrapper_text_but_not_nested_heading_boundaries() {
        // The <div> is a sibling of <h1>, so its full text lands in the
        // body, including the nested <h2>, which is not a stop boundary
        // at sibling level. The nested <h2> still produces its own section
        // from the document-order scan, with its own siblings as body.
        let html = "<body><h1>Top</h1><div><h2>Inner</h2><p>wrapped</p></div></body>";
        let record = extract(html);

        assert_eq!(record.sections.len(), 2);
        assert_eq!(record.sections[0].heading, "Top");
        assert_eq!(record.sections[0].body, "Inner wrapped");
        assert_eq!(record.sections[1].heading, "Inner");
        assert_eq!(record.sections[1].body, "wrapped");
    }

    #[test]
    fn text_after_last_heading_runs_to_end_of_siblings() {
        let html = "<body><h1>Only</h1><p>tail one</p><p>tail two</p></body>";
        let record = extract(html);
        assert_eq!(record.sections.len(), 1);
        assert_eq!(record.sections[0].body, "tail one tail two");
    }

    #[test]
    fn empty_headings_are_skipped() {
        let html = "<body><h1></h1><h2>Real</h2><p>content</p></body>";
        let record = extract(html);
        assert_eq!(record.sections.len(), 1);
        assert_eq!(record.sections[0].heading, "Real");
    }
}
