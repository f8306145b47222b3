//! Corpus assembly and serialization for webcorpus.
//!
//! Collects per-page records into one ordered tree rooted at the seed URL
//! ([`CorpusAssembler`]), serializes the finalized tree as the crawl's
//! output artifact ([`CorpusDoc`], [`write_corpus`]), and persists fetched
//! binary media as side files ([`MediaStore`]).

pub mod assembler;
pub mod document;
pub mod media;

pub use assembler::CorpusAssembler;
pub use document::{CorpusDoc, PageDoc, SectionDoc, write_corpus};
pub use media::MediaStore;
