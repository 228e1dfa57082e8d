//! The reified opcode/escape table of the text stream.
//!
//! Every control byte (high bit set) is decoded in two stages:
//!
//! 1. The left nibble resolves the target citation level. `0xE` is an
//!    escape that consumes one selector byte for the low-rank levels
//!    `a`–`d`; `0xF` is the special group (no level).
//! 2. The right nibble selects the argument shape, which may consume
//!    further bytes from the cursor.
//!
//! Keeping the two stages reified as data means the dispatch loop never
//! peeks into the argument table by accident, and the state machine can
//! be driven from plain values in tests.

use crate::tlg::types::models::Level;
use crate::tlg::utils::ByteCursor;

/// The decoded argument of a level-update opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// Advance the integer component by one and clear the suffix.
    Increment,
    /// Replace the integer component; clears the suffix.
    Binary(u32),
    /// Replace both the integer component and the suffix.
    BinaryAscii(u32, String),
    /// Replace the suffix only.
    Ascii(String),
}

/// One fully decoded control opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// A citation-level update. `level` is `None` when the escape
    /// selector named no known level; the argument bytes were still
    /// consumed but no register changes.
    Update { level: Option<Level>, delta: Delta },
    /// Abandon the remainder of the current block.
    EndBlock,
    /// End of work: the current pass terminates.
    EndWork,
    /// A special opcode with no dispatch-level effect.
    Nop,
}

/// Resolve the level addressed by the left nibble, consuming the escape
/// selector byte when one is required.
///
/// Returns `Err(())` when the escape selector is missing entirely
/// (buffer exhausted), which callers treat like an end-of-block.
fn resolve_level(left: u8, cur: &mut ByteCursor) -> Result<Option<Level>, ()> {
    Ok(match left {
        0x8 => Some(Level::Z),
        0x9 => Some(Level::Y),
        0xA => Some(Level::X),
        0xB => Some(Level::W),
        0xC => Some(Level::V),
        0xD => Some(Level::N),
        0xE => {
            let selector = match cur.bump() {
                Some(b) => b & 0x7F,
                None => return Err(()),
            };
            match selector {
                0 => Some(Level::A),
                1 => Some(Level::B),
                2 => Some(Level::C),
                4 => Some(Level::D),
                _ => None,
            }
        }
        _ => None,
    })
}

/// Read the argument shape selected by the right nibble.
///
/// Shapes `0x9`/`0xC` pair an integer with a single character suffix,
/// `0xA`/`0xD` with a `0xFF`-terminated string; `0xE`/`0xF` carry a
/// suffix alone.
pub fn read_delta(cur: &mut ByteCursor, right: u8) -> Delta {
    match right {
        0x0 => Delta::Increment,
        0x1..=0x7 => Delta::Binary(u32::from(right)),
        0x8 => Delta::Binary(cur.read_bin(1)),
        0x9 => {
            let v = cur.read_bin(1);
            Delta::BinaryAscii(v, cur.read_char().to_string())
        }
        0xA => {
            let v = cur.read_bin(1);
            Delta::BinaryAscii(v, cur.read_str())
        }
        0xB => Delta::Binary(cur.read_bin(2)),
        0xC => {
            let v = cur.read_bin(2);
            Delta::BinaryAscii(v, cur.read_char().to_string())
        }
        0xD => {
            let v = cur.read_bin(2);
            Delta::BinaryAscii(v, cur.read_str())
        }
        0xE => Delta::Ascii(cur.read_char().to_string()),
        _ => Delta::Ascii(cur.read_str()),
    }
}

/// Decode one control opcode at the cursor.
///
/// The cursor must be positioned on a byte with the high bit set.
/// Unknown opcodes consume nothing beyond their own bytes and decode to
/// [`Opcode::Nop`] or an update with no level.
pub fn decode(cur: &mut ByteCursor) -> Opcode {
    let b = match cur.bump() {
        Some(b) => b,
        None => return Opcode::EndBlock,
    };
    let left = (b >> 4) & 0x0F;
    let right = b & 0x0F;

    if left == 0xF {
        return match right {
            0x0 => Opcode::EndBlock,
            0xE => Opcode::EndWork,
            _ => Opcode::Nop,
        };
    }

    let level = match resolve_level(left, cur) {
        Ok(level) => level,
        // Escape selector ran off the buffer; treat as a terminator.
        Err(()) => return Opcode::EndBlock,
    };
    let delta = read_delta(cur, right);
    Opcode::Update { level, delta }
}
