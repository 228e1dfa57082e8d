//! Reader and decoder for the TLG/PHI binary corpus format.
//!
//! The Thesaurus Linguae Graecae / Packard Humanities Institute corpora
//! ship as a legacy high-bit-encoded file family: each author's works
//! are a stream of interleaved 7-bit text and control bytes, where the
//! control bytes maintain a hierarchical citation state
//! (book/chapter/section/line) as deltas against persistent registers.
//!
//! This crate decodes that family:
//!
//! - [`idt`](tlg::format::idt): per-author work tables (titles, IDs and
//!   citation-level definitions)
//! - [`TlgReader`]: streaming work listing and extraction from the main
//!   text files, with human-readable citation prefixes
//! - [`tlg::authtab`] / [`tlg::canon`]: the author table and the canon
//!   bibliography that accompany the corpus
//!
//! ```no_run
//! use tlg_reader::{BetaCode, TlgReader};
//! use tlg_reader::tlg::format::idt;
//!
//! # fn main() -> tlg_reader::Result<()> {
//! let mut reader = TlgReader::<BetaCode>::open("tlg0012.txt")?;
//! reader.set_metadata(idt::read::<BetaCode>("tlg0012.idt")?);
//! for line in reader.list_works()? {
//!     println!("{}", line);
//! }
//! print!("{}", reader.extract_work("1")?);
//! # Ok(())
//! # }
//! ```

pub mod tlg;

pub use tlg::format::idt;
pub use tlg::reader::{Script, TlgReader, BLOCK_SIZE};
pub use tlg::translit::{BetaCode, Transliterator};
pub use tlg::types::error::{Result, TlgError};
pub use tlg::types::models::{AuthorRecord, CanonField, CitationDef, Level, LevelState, WorkMetadata};
