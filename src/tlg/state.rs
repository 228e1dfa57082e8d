//! The ten-level citation state machine.
//!
//! The text stream never spells out a full citation; every control
//! opcode nudges one register of a persistent register file, and the
//! current citation is whatever the registers hold when a text segment
//! arrives. Applying a delta to a level resets every level of strictly
//! higher rank: advancing a book restarts its chapters and lines.
//!
//! Two Stephanus-pagination conventions live here as named predicates
//! rather than inline decoder logic: the two-rank page/column revert and
//! the three-level section-letter rendering (the latter is consulted by
//! the citation formatter in `reader`).

use crate::tlg::format::opcode::Delta;
use crate::tlg::types::models::{Level, LevelState};

/// The register file: one [`LevelState`] per citation level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationState {
    levels: [LevelState; 10],
}

/// In a two-rank work, updates to the lower-rank level are page
/// advances and participate in the page/column revert.
fn is_two_rank_primary(schema: &[Level], level: Level) -> bool {
    schema.len() == 2 && schema[0] == level
}

/// Three-level works render their middle level as Stephanus section
/// letters; the formatter needs to know which level that is.
pub fn stephanus_section_level(schema: &[Level]) -> Option<Level> {
    if schema.len() == 3 {
        Some(schema[1])
    } else {
        None
    }
}

impl CitationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every register to the unset state. Idempotent.
    pub fn reset(&mut self) {
        for st in &mut self.levels {
            *st = LevelState::default();
        }
    }

    /// The register for `level`.
    pub fn level(&self, level: Level) -> &LevelState {
        &self.levels[level.rank()]
    }

    /// Apply a decoded delta to `level`.
    ///
    /// `schema` is the work's sorted citation-level list, consulted for
    /// the two-rank Stephanus revert. Returns whether the register
    /// actually changed (which is also when subordinates were reset).
    pub fn apply(&mut self, level: Level, delta: &Delta, schema: &[Level]) -> bool {
        let st = &mut self.levels[level.rank()];

        let old_active = st.active;
        let old_binary = st.binary;
        let old_ascii = st.ascii.clone();

        st.active = true;

        match delta {
            Delta::Increment => {
                st.binary += 1;
                st.ascii.clear();
            }
            Delta::Binary(v) => {
                st.binary = *v;
                st.ascii.clear();
            }
            Delta::BinaryAscii(v, s) => {
                st.binary = *v;
                st.ascii = s.clone();
            }
            Delta::Ascii(s) => {
                st.ascii = s.clone();
            }
        }

        // Stephanus page/column convention: after "327a", a bare
        // increment means column b of the same page, not the next page.
        if is_two_rank_primary(schema, level)
            && old_ascii == "a"
            && st.binary == old_binary + 1
            && st.ascii.is_empty()
        {
            st.binary = old_binary;
            st.ascii.push('b');
        }

        let changed = !old_active || st.binary != old_binary || st.ascii != old_ascii;
        if changed {
            self.reset_below(level);
        }
        changed
    }

    /// Reset every level of strictly higher rank than `trigger`.
    ///
    /// Structural levels (`a`, `b`, `n`) wipe their subordinates back to
    /// the unset state; textual levels restart them at 1 — a new book
    /// implicitly begins at line 1.
    fn reset_below(&mut self, trigger: Level) {
        let to_null = matches!(trigger, Level::A | Level::B | Level::N);
        for level in Level::ALL {
            if level.rank() > trigger.rank() {
                self.levels[level.rank()] = if to_null {
                    LevelState::default()
                } else {
                    LevelState {
                        binary: 1,
                        ascii: String::new(),
                        active: true,
                    }
                };
            }
        }
    }
}
