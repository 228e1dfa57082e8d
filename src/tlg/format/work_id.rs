//! The stateful work-ID delta decoder of the IDT stream.
//!
//! Work IDs are not stored whole: each type-2 IDT record carries a group
//! of opcodes expressing the new ID as a delta against the previous
//! work's `(integer, suffix)` pair. Only opcodes addressed to level `b`
//! (the work identifier) participate; everything else in the group is
//! decoded for its argument bytes and discarded.
//!
//! A group opening with `[0xEF, 0x81]` uses the legacy encoding instead:
//! the remaining bytes spell the ID in plain 7-bit ASCII.

use log::trace;

use crate::tlg::format::opcode::{read_delta, Delta};
use crate::tlg::utils::ByteCursor;

/// The persistent `(integer, suffix)` pair threaded through consecutive
/// work entries of one author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkId {
    pub int_part: u32,
    pub suffix: String,
}

impl WorkId {
    /// Render the canonical ID string: integer followed by suffix when
    /// the integer is set, bare suffix otherwise.
    pub fn to_id_string(&self) -> String {
        if self.int_part != 0 {
            format!("{}{}", self.int_part, self.suffix)
        } else {
            self.suffix.clone()
        }
    }
}

/// Decode the legacy plain-ASCII branch: keep `[0-9A-Za-z]` from the
/// low 7 bits of high-bit bytes, stopping at `0xFF`.
pub fn decode_simple_ascii(bytes: &[u8]) -> String {
    let mut s = String::new();
    for &b in bytes {
        if b == 0xFF {
            break;
        }
        if b >= 0x80 {
            let c = char::from(b & 0x7F);
            if c.is_ascii_alphanumeric() {
                s.push(c);
            }
        }
    }
    match s.parse::<u32>() {
        Ok(v) => v.to_string(),
        Err(_) => s,
    }
}

/// Decode one work-ID byte group against the previous decoder state.
///
/// Pure in the sense that the same `(prev, bytes)` always yields the
/// same output; the caller threads the result back in as the next
/// previous state.
pub fn decode(prev: &WorkId, bytes: &[u8]) -> WorkId {
    if bytes.is_empty() {
        return prev.clone();
    }

    // Legacy encoding: the ID is spelled out rather than delta-coded.
    if bytes.len() >= 2 && bytes[0] == 0xEF && bytes[1] == 0x81 {
        let res = decode_simple_ascii(&bytes[2..]);
        trace!("work ID group uses legacy ASCII encoding: {:?}", res);
        return match res.parse::<u32>() {
            Ok(v) => WorkId {
                int_part: v,
                suffix: String::new(),
            },
            Err(_) => WorkId {
                int_part: 0,
                suffix: res,
            },
        };
    }

    let mut cur = ByteCursor::new(bytes);
    let mut id = prev.clone();

    while let Some(val) = cur.bump() {
        let left = (val >> 4) & 0x0F;
        let right = val & 0x0F;

        // Only escape opcodes whose selector names level b update the
        // work ID. Every opcode still consumes its argument bytes so the
        // group stays in sync.
        let mut targets_work = false;
        if left == 0xE {
            if let Some(selector) = cur.bump() {
                targets_work = selector & 0x7F == 1;
            }
        }

        let delta = read_delta(&mut cur, right);
        if !targets_work {
            continue;
        }

        match delta {
            Delta::Increment => {
                id.int_part += 1;
                id.suffix.clear();
            }
            Delta::Binary(v) => {
                id.int_part = v;
                id.suffix.clear();
            }
            Delta::BinaryAscii(v, s) => {
                id.int_part = v;
                id.suffix = s;
            }
            Delta::Ascii(s) => {
                id.suffix = s;
            }
        }
    }

    id
}
