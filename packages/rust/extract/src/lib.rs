//! Content extraction for webcorpus.
//!
//! Converts raw fetched bytes into a [`PageRecord`] according to the
//! payload's [`ContentKind`]. Dispatch is a closed enum match, so adding a
//! new kind is a compile-time-checked addition, not a string comparison:
//! - [`ContentKind::Markup`] → heading-scoped section list (or whole-page
//!   visible text when the page has no headings)
//! - [`ContentKind::Pdf`] → page-ordered text
//! - [`ContentKind::Tabular`] → row/column-preserving text table
//! - [`ContentKind::Audio`] → transcript from the configured speech-to-text
//!   service (transcoding first if the payload is not WAV)
//! - [`ContentKind::Binary`] → empty text, record still emitted
//!
//! Malformed pdf/tabular payloads degrade to a diagnostic text body and
//! never propagate; audio failures surface as typed [`WebCorpusError::Conversion`]
//! errors for the crawl worker to log.

mod audio;
mod markup;
mod pdf;
mod tabular;

pub use audio::Transcriber;

use url::Url;

use webcorpus_shared::{ContentKind, PageRecord, Result, WebCorpusError};

/// Polymorphic content extractor. Stateless apart from the optional
/// speech-to-text client.
#[derive(Default)]
pub struct Extractor {
    transcriber: Option<Transcriber>,
}

impl Extractor {
    /// Create an extractor without audio support. Audio payloads will
    /// surface a conversion error.
    pub fn new() -> Self {
        Self { transcriber: None }
    }

    /// Create an extractor with a speech-to-text client for audio payloads.
    pub fn with_transcriber(transcriber: Transcriber) -> Self {
        Self {
            transcriber: Some(transcriber),
        }
    }

    /// Extract a [`PageRecord`] from raw bytes.
    ///
    /// Deterministic for identical inputs; the only suspension point is the
    /// speech-to-text call on the audio path.
    pub async fn extract(
        &self,
        url: &Url,
        kind: ContentKind,
        media_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<PageRecord> {
        match kind {
            ContentKind::Markup => Ok(markup::extract_markup(url, bytes)),
            ContentKind::Pdf => Ok(pdf::extract_pdf(url, bytes)),
            ContentKind::Tabular => Ok(tabular::extract_tabular(url, bytes)),
            ContentKind::Audio => {
                let transcriber = self.transcriber.as_ref().ok_or_else(|| {
                    WebCorpusError::Conversion("no speech-to-text endpoint configured".into())
                })?;
                let text = transcriber.transcribe(bytes, media_type).await?;
                Ok(PageRecord {
                    url: url.clone(),
                    kind: ContentKind::Audio,
                    sections: Vec::new(),
                    text,
                })
            }
            ContentKind::Binary => Ok(PageRecord {
                url: url.clone(),
                kind: ContentKind::Binary,
                sections: Vec::new(),
                text: String::new(),
            }),
        }
    }
}
