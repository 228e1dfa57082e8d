//! `authtab.dir` author-table reader.
//!
//! The author table is a packed record stream with no length framing:
//! a record begins wherever a collection prefix (`TLG`, `LAT`, `CIV`,
//! `COP`, `"L  "`) is followed by a digit. After the 8-byte ID field,
//! the record alternates between field-type bytes (any byte with the
//! high bit set) and 7-bit text runs; one or more `0xFF` bytes close
//! the record.

use std::path::Path;

use log::info;

use crate::tlg::translit::Transliterator;
use crate::tlg::types::error::Result;
use crate::tlg::types::models::AuthorRecord;

/// Field type that suppresses the following text run.
const FIELD_SUPPRESSED: u8 = 0x83;

/// Read and parse an `authtab.dir` file.
pub fn read_author_table<T: Transliterator>(path: impl AsRef<Path>) -> Result<Vec<AuthorRecord>> {
    let path = path.as_ref();
    info!("Reading author table: {}", path.display());
    let data = std::fs::read(path)?;
    let records = parse::<T>(&data);
    info!("Author table parsed: {} records", records.len());
    Ok(records)
}

/// Scan an in-memory author table.
pub fn parse<T: Transliterator>(data: &[u8]) -> Vec<AuthorRecord> {
    let mut records = Vec::new();
    let mut i = 0;
    while i < data.len() {
        if is_record_start(&data[i..]) {
            let (record, next) = decode_entry::<T>(data, i);
            records.push(record);
            i = next;
        } else {
            i += 1;
        }
    }
    records
}

/// A record starts at a known collection prefix followed by a digit.
fn is_record_start(buf: &[u8]) -> bool {
    if buf.len() < 4 {
        return false;
    }
    let prefix = &buf[..3];
    let known: [&[u8]; 5] = [b"TLG", b"LAT", b"CIV", b"COP", b"L  "];
    known.contains(&prefix) && buf[3].is_ascii_digit()
}

fn decode_entry<T: Transliterator>(data: &[u8], start: usize) -> (AuthorRecord, usize) {
    let mut i = start;

    let id = if i + 8 <= data.len() {
        let raw = String::from_utf8_lossy(&data[i..i + 8]);
        i += 8;
        raw.trim().to_string()
    } else {
        String::new()
    };

    let mut parts: Vec<String> = Vec::new();
    let mut field_type: u8 = 0;

    while i < data.len() {
        if i + 4 < data.len() && is_record_start(&data[i..]) {
            break;
        }

        let b = data[i];

        if b == 0xFF {
            // Terminator run; skip every padding 0xFF.
            i += 1;
            while i < data.len() && data[i] == 0xFF {
                i += 1;
            }
            break;
        }

        if b & 0x80 != 0 {
            field_type = b;
            i += 1;
            continue;
        }

        let text_start = i;
        while i < data.len() {
            if data[i] & 0x80 != 0 {
                break;
            }
            if i + 4 < data.len() && is_record_start(&data[i..]) {
                break;
            }
            i += 1;
        }

        let segment = &data[text_start..i];
        if segment.is_empty() || field_type == FIELD_SUPPRESSED {
            continue;
        }
        let decoded = T::to_latin(&String::from_utf8_lossy(segment));
        let trimmed = decoded.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_string());
        }
    }

    (
        AuthorRecord {
            id,
            name: parts.join(" "),
        },
        i,
    )
}

/// Look up an author's display name by scanning the raw table bytes.
///
/// The ID is normalized to the collection prefix plus a zero-padded
/// four-character remainder ("TLG12" becomes "TLG0012") and located
/// with a `&1 ... &` field scan. Returns the queried ID when the table
/// holds no match, and `"Unknown"` when the table cannot be read.
pub fn author_name(path: impl AsRef<Path>, tlg_id: &str) -> String {
    let Ok(data) = std::fs::read(path.as_ref()) else {
        return "Unknown".to_string();
    };
    if tlg_id.len() < 3 {
        return "Unknown".to_string();
    }

    let upper = tlg_id.to_ascii_uppercase();
    let prefix = &upper[..3];
    let rest = upper.strip_prefix(prefix).unwrap_or(&upper);
    let clean_id = format!("{}{:0>4}", prefix, rest);

    let pattern = format!(r"(?s){}.*?&1(.*?)&", regex::escape(&clean_id));
    let Ok(re) = regex::bytes::Regex::new(&pattern) else {
        return tlg_id.to_string();
    };

    match re.captures(&data).and_then(|caps| caps.get(1)) {
        Some(m) => String::from_utf8_lossy(m.as_bytes()).trim().to_string(),
        None => tlg_id.to_string(),
    }
}
