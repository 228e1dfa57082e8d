//! Format parsing layer for the TLG/PHI binary encoding.
//!
//! This is the mid-level layer between raw bytes and the high-level
//! [`TlgReader`](crate::tlg::reader::TlgReader).
//!
//! # Module Organization
//!
//! - [`opcode`]: the reified control-opcode table of the text stream
//! - [`work_id`]: the delta decoder for IDT work-ID byte groups
//! - [`idt`]: the per-author IDT metadata record walk

pub mod idt;
pub mod opcode;
pub mod work_id;
