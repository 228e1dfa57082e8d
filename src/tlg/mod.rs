//! Core TLG/PHI corpus decoder.
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌──────────────────┐
//! │  authtab.dir     │ ← authtab::read_author_table()
//! ├──────────────────┤
//! │  <author>.idt    │ ← format::idt::read()
//! │  (work table)    │
//! ├──────────────────┤
//! │  <author>.txt    │ ← reader::TlgReader (citation state machine
//! │  (text stream)   │   in state::CitationState, opcodes decoded
//! │                  │   by format::opcode)
//! └──────────────────┘
//! ```
//!
//! Text bytes have the high bit clear and pass through the pluggable
//! [`translit::Transliterator`]; control bytes have the high bit set
//! and drive the citation register file.

pub mod authtab;
pub mod canon;
pub mod format;
pub mod reader;
pub mod state;
pub mod translit;
pub mod types;
pub mod utils;

pub use reader::{Script, TlgReader, BLOCK_SIZE};
pub use types::error::{Result, TlgError};
