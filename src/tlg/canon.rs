//! Canon bibliography extraction.
//!
//! The canon (`doccan1.txt` and the canon database) is itself a corpus
//! text file, but its payload is line-oriented once decoded: four-digit
//! author IDs open sections, `NNNN NNN` lines open work sections, and
//! `key NNNN [NNN]` lines open tagged field blocks. Extraction runs the
//! whole file through [`TlgReader::extract_all_text`] and scans lines.

use std::path::Path;

use crate::tlg::reader::{Script, TlgReader};
use crate::tlg::translit::Transliterator;
use crate::tlg::types::error::Result;
use crate::tlg::types::models::CanonField;

/// Human-readable label for a canon field tag.
fn tag_label(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "nam" => "Author Name",
        "epi" => "Epithet",
        "geo" => "Geography",
        "dat" => "Date",
        "vid" => "Vide",
        "wrk" => "Work Title",
        "cla" => "Classification",
        "xmt" => "Transmission",
        "typ" => "Type",
        "wct" => "Word Count",
        "cit" => "Citation Schema",
        "tit" => "Title in Ed.",
        "pub" => "Publisher",
        "pla" => "Place",
        "pyr" => "Pub. Year",
        "ryr" => "Reprint Year",
        "pag" => "Pages",
        "edr" => "Editor",
        "brk" => "Breaks/Frags",
        "ser" => "Series",
        "key" => "Key ID",
        _ => return None,
    })
}

fn is_numeric(s: &[u8]) -> bool {
    !s.is_empty() && s.iter().all(u8::is_ascii_digit)
}

/// Normalize an author ID: uppercase, collection prefix and leading
/// zeros stripped, parsed as a number (0 when nothing numeric remains).
fn numeric_author_id(tlg_id: &str) -> u32 {
    let upper = tlg_id.to_ascii_uppercase();
    let stripped = upper.strip_prefix("TLG").unwrap_or(&upper);
    stripped.trim_start_matches('0').parse().unwrap_or(0)
}

fn numeric_work_id(work_id: &str) -> u32 {
    work_id.trim_start_matches('0').parse().unwrap_or(0)
}

/// Read the whole canon file as plain lines.
///
/// Canon payloads are Latin-script; the file name carries no script
/// hint, so the script is pinned here.
fn canon_lines<T: Transliterator>(path: &Path) -> Result<String> {
    let mut reader = TlgReader::<T>::open(path)?;
    reader.set_script(Script::Latin);
    reader.extract_all_text()
}

/// Extract the bibliography section for an author or a single work.
///
/// Returns the work section when `work_id` names one that exists, the
/// author section otherwise, and an empty string when the ID is absent.
pub fn biblio<T: Transliterator>(
    canon_path: impl AsRef<Path>,
    tlg_id: &str,
    work_id: &str,
) -> Result<String> {
    let full_text = canon_lines::<T>(canon_path.as_ref())?;

    let auth_id = format!("{:04}", numeric_author_id(tlg_id));
    let w_id = if work_id.is_empty() {
        String::new()
    } else {
        format!("{:03}", numeric_work_id(work_id))
    };
    let target_work = format!("{} {}", auth_id, w_id);

    let mut author_buf = String::new();
    let mut work_buf = String::new();
    let mut in_author = false;
    let mut in_work = false;

    for line in full_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bytes = line.as_bytes();
        let is_id_line = bytes.len() >= 4 && is_numeric(&bytes[..4]);

        if is_id_line {
            if line.starts_with(&auth_id) {
                let is_work_line =
                    bytes.len() >= 8 && bytes[4] == b' ' && is_numeric(&bytes[5..8]);
                if !is_work_line {
                    in_author = true;
                    in_work = false;
                    author_buf.push_str(line);
                    author_buf.push('\n');
                    continue;
                }
                if !w_id.is_empty() && line.starts_with(&target_work) {
                    in_work = true;
                    work_buf.push('\n');
                    work_buf.push_str(line);
                    work_buf.push('\n');
                } else {
                    in_work = false;
                }
            } else if in_author {
                // Another author's section begins; we are done.
                break;
            }
        } else if in_work {
            work_buf.push_str(line);
            work_buf.push('\n');
        } else if in_author {
            author_buf.push_str(line);
            author_buf.push('\n');
        }
    }

    if !work_buf.is_empty() {
        return Ok(work_buf.trim().to_string());
    }
    Ok(author_buf.trim().to_string())
}

/// Extract tagged metadata fields from the canon database.
///
/// Fields are grouped under `key NNNN` (author) and `key NNNN NNN`
/// (work) section headers; each matching section is prefixed with a
/// synthetic `---`/"Section" field.
pub fn canon_fields<T: Transliterator>(
    db_path: impl AsRef<Path>,
    tlg_id: &str,
    work_id: &str,
) -> Result<Vec<CanonField>> {
    let full_text = canon_lines::<T>(db_path.as_ref())?;

    let auth_id = format!("{:04}", numeric_author_id(tlg_id));
    let auth_key = format!("key {}", auth_id);
    let work_key = if work_id.is_empty() {
        String::new()
    } else {
        format!("key {} {:03}", auth_id, numeric_work_id(work_id))
    };

    let mut fields = Vec::new();
    let mut capture = false;

    for line in full_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("key ") {
            let is_auth = line == auth_key;
            let is_work = !work_key.is_empty() && line == work_key;
            if is_auth || is_work {
                capture = true;
                fields.push(CanonField {
                    tag: "---".to_string(),
                    label: "Section".to_string(),
                    value: if is_work { "Work Metadata" } else { "Author Metadata" }.to_string(),
                });
            } else {
                capture = false;
            }
        }

        if capture && line.len() > 4 && line.as_bytes()[3] == b' ' {
            let tag = &line[..3];
            if tag == "key" {
                continue;
            }
            fields.push(CanonField {
                tag: tag.to_string(),
                label: tag_label(tag).unwrap_or(tag).to_string(),
                value: line[4..].trim().to_string(),
            });
        }
    }

    Ok(fields)
}
