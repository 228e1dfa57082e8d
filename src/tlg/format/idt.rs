//! IDT metadata stream reader.
//!
//! Each author's `.idt` file is a flat record stream: a one-byte type
//! code followed by a type-specific payload. The reader walks it once
//! and assembles per-work titles and citation-level definitions, keyed
//! by the canonical work ID string.
//!
//! IDT files are small (tens of KB); the whole file is loaded before
//! walking.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, trace};

use crate::tlg::format::work_id::{self, WorkId};
use crate::tlg::translit::Transliterator;
use crate::tlg::types::error::Result;
use crate::tlg::types::models::{CitationDef, Level, WorkMetadata};
use crate::tlg::utils::ByteCursor;

/// New author: work-ID state resets.
const TYPE_AUTHOR: u8 = 1;
/// New work: the following ID byte group is delta-decoded.
const TYPE_WORK: u8 = 2;
/// Title record when its subtype is 1.
const TYPE_TITLE: u8 = 16;
/// Citation-level definition record.
const TYPE_CITATION: u8 = 17;

/// Citation level addressed by a type-17 subtype byte.
fn citation_level(subtype: u8) -> Option<Level> {
    match subtype {
        0 => Some(Level::Z),
        1 => Some(Level::Y),
        2 => Some(Level::X),
        3 => Some(Level::W),
        4 => Some(Level::V),
        _ => None,
    }
}

/// Read and parse an IDT file.
pub fn read<T: Transliterator>(path: impl AsRef<Path>) -> Result<HashMap<String, WorkMetadata>> {
    let path = path.as_ref();
    info!("Reading IDT metadata: {}", path.display());
    let data = std::fs::read(path)?;
    let works = parse::<T>(&data);
    info!("IDT parsed: {} works", works.len());
    Ok(works)
}

/// Walk an in-memory IDT record stream.
///
/// The walk is permissive: unknown record types are skipped without
/// advancing past their type byte, and truncated payloads yield partial
/// values rather than errors.
pub fn parse<T: Transliterator>(data: &[u8]) -> HashMap<String, WorkMetadata> {
    let mut works: HashMap<String, WorkMetadata> = HashMap::new();
    let mut current: Option<String> = None;
    let mut last_id = WorkId::default();

    let mut cur = ByteCursor::new(data);
    while let Some(typ) = cur.bump() {
        match typ {
            0 => {}
            TYPE_AUTHOR => {
                cur.skip(4);
                cur.take_high_run();
                last_id = WorkId::default();
                current = None;
                debug!("IDT: new author record, work-ID state reset");
            }
            TYPE_WORK => {
                cur.skip(4);
                let group = cur.take_high_run();

                if group.is_empty() {
                    // An absent group means "next work": bump the
                    // running integer and drop any suffix.
                    last_id.int_part += 1;
                    last_id.suffix.clear();
                } else {
                    last_id = work_id::decode(&last_id, group);
                }

                let mut id_str = last_id.to_id_string();
                if id_str.is_empty() && !group.is_empty() {
                    id_str = work_id::decode_simple_ascii(group);
                }

                trace!("IDT: new work {:?}", id_str);
                works.insert(id_str.clone(), WorkMetadata { id: id_str.clone(), ..Default::default() });
                current = Some(id_str);
            }
            3 => cur.skip(2),
            8..=10 | 12 | 13 => {
                cur.take_high_run();
            }
            11 => {
                cur.skip(2);
                cur.take_high_run();
            }
            TYPE_TITLE => {
                let Some((subtype, payload)) = read_tagged_payload(&mut cur) else {
                    break;
                };
                if subtype != 1 {
                    continue;
                }

                // Some IDT files omit interior type-2 records and mark
                // each further work only by its next title: a second
                // title for the same work starts work N+1.
                let has_title = current
                    .as_ref()
                    .and_then(|id| works.get(id))
                    .is_some_and(|w| !w.title.is_empty());
                if has_title {
                    last_id.int_part += 1;
                    last_id.suffix.clear();
                    let id_str = last_id.int_part.to_string();
                    works.insert(id_str.clone(), WorkMetadata { id: id_str.clone(), ..Default::default() });
                    current = Some(id_str);
                }

                if let Some(work) = current.as_ref().and_then(|id| works.get_mut(id)) {
                    work.title = T::render(&String::from_utf8_lossy(payload));
                }
            }
            TYPE_CITATION => {
                let Some((subtype, payload)) = read_tagged_payload(&mut cur) else {
                    break;
                };
                let Some(level) = citation_level(subtype) else {
                    continue;
                };
                if let Some(work) = current.as_ref().and_then(|id| works.get_mut(id)) {
                    work.citations.push(CitationDef {
                        level,
                        label: T::render(&String::from_utf8_lossy(payload)),
                    });
                }
            }
            _ => {
                // Unknown type: no advancement beyond the type byte.
            }
        }
    }

    works
}

/// Read a `[subtype][length][payload]` record body. `None` only when
/// the stream ends before the length byte; a short payload is clamped.
fn read_tagged_payload<'a>(cur: &mut ByteCursor<'a>) -> Option<(u8, &'a [u8])> {
    let subtype = cur.bump()?;
    let length = cur.bump()?;
    Some((subtype, cur.take(usize::from(length))))
}
