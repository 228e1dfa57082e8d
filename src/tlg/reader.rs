//! The main reader for TLG/PHI corpus text files.
//!
//! A `.txt` corpus file is streamed in fixed-size blocks. Each byte is
//! either 7-bit text (accumulated into segments) or a control opcode
//! that mutates the citation register file. The reader owns the file
//! handle, the block buffer and the citation state for the duration of
//! one pass; a new pass seeks back to zero and resets the state in
//! full. Passes must not be interleaved on one reader.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::tlg::format::opcode::{self, Opcode};
use crate::tlg::state::{stephanus_section_level, CitationState};
use crate::tlg::translit::{BetaCode, Transliterator};
use crate::tlg::types::error::{Result, TlgError};
use crate::tlg::types::models::{Level, WorkMetadata};
use crate::tlg::utils::{normalize_id, ByteCursor};

/// Read granularity of the text stream.
pub const BLOCK_SIZE: usize = 8192;

/// Script of a corpus file, selecting the transliteration direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Greek,
    Latin,
}

impl Script {
    /// Infer the script from a corpus file name: the `LAT`, `CIV` and
    /// `PHI` collections are Latin, everything else Greek.
    pub fn for_file_name(name: &str) -> Script {
        let upper = name.to_ascii_uppercase();
        for prefix in ["LAT", "CIV", "PHI"] {
            if upper.starts_with(prefix) {
                return Script::Latin;
            }
        }
        Script::Greek
    }
}

/// Streaming reader and work extractor for one corpus text file.
///
/// # Type Parameter
/// * `T` - the [`Transliterator`] rendering text segments for display
pub struct TlgReader<T: Transliterator = BetaCode> {
    file: File,
    buf: Box<[u8]>,
    state: CitationState,
    script: Script,
    works: HashMap<String, WorkMetadata>,
    current: Option<WorkMetadata>,
    schema: Vec<Level>,
    _translit: PhantomData<T>,
}

/// Resolve a text path against the corpus habit of shipping files as
/// either `.txt` or `.TXT`.
pub fn resolve_text_path(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let swapped = match path.extension().and_then(|e| e.to_str()) {
        Some("txt") => Some(path.with_extension("TXT")),
        Some("TXT") => Some(path.with_extension("txt")),
        _ => None,
    };
    match swapped {
        Some(alt) if alt.exists() => alt,
        _ => path.to_path_buf(),
    }
}

impl<T: Transliterator> TlgReader<T> {
    /// Open a corpus text file.
    ///
    /// The script is inferred from the file name; override it with
    /// [`set_script`](Self::set_script). Metadata starts empty — attach
    /// an IDT map with [`set_metadata`](Self::set_metadata) to get
    /// titles and declared citation schemas.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_text_path(path.as_ref());
        info!("Opening corpus text: {}", path.display());
        let script = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(Script::for_file_name)
            .unwrap_or(Script::Greek);
        let file = File::open(&path)?;
        Ok(Self {
            file,
            buf: vec![0u8; BLOCK_SIZE].into_boxed_slice(),
            state: CitationState::new(),
            script,
            works: HashMap::new(),
            current: None,
            schema: Vec::new(),
            _translit: PhantomData,
        })
    }

    /// Attach per-work metadata from the author's IDT file.
    pub fn set_metadata(&mut self, works: HashMap<String, WorkMetadata>) {
        self.works = works;
    }

    /// Override the inferred script.
    pub fn set_script(&mut self, script: Script) {
        self.script = script;
    }

    pub fn script(&self) -> Script {
        self.script
    }

    /// Render a text segment for display.
    fn process_text(&self, s: &str) -> String {
        match self.script {
            Script::Greek => T::to_greek(s),
            Script::Latin => T::to_latin(s),
        }
    }

    /// Seek to the start of the file and reset the citation state.
    fn reset_pass(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.state.reset();
        Ok(())
    }

    /// Read the next block; 0 means end of file.
    fn fill_block(&mut self) -> Result<usize> {
        Ok(self.file.read(&mut self.buf)?)
    }

    /// The work ID currently held by level `b`: the integer component
    /// when set, else the normalized suffix, else `"0"`.
    fn current_work_id(&self) -> String {
        let st = self.state.level(Level::B);
        if st.binary > 0 {
            return st.binary.to_string();
        }
        if !st.ascii.is_empty() {
            return normalize_id(&st.ascii);
        }
        "0".to_string()
    }

    /// Unique citation levels declared by `meta`, sorted by rank.
    fn analyze_citation_levels(meta: Option<&WorkMetadata>) -> Vec<Level> {
        let mut levels: Vec<Level> = Vec::new();
        if let Some(meta) = meta {
            for def in &meta.citations {
                if !levels.contains(&def.level) {
                    levels.push(def.level);
                }
            }
        }
        levels.sort_by_key(|l| l.rank());
        levels
    }

    /// Enumerate the works present in the text stream, in first-seen
    /// order, as `ID:<id> | <title>` lines.
    pub fn list_works(&mut self) -> Result<Vec<String>> {
        debug!("Listing works");
        self.reset_pass()?;
        self.current = None;
        self.schema.clear();

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        'pass: loop {
            let n = self.fill_block()?;
            if n == 0 {
                break;
            }
            let mut cur = ByteCursor::new(&self.buf[..n]);
            while !cur.is_empty() {
                if cur.peek().is_some_and(|b| b & 0x80 != 0) {
                    match opcode::decode(&mut cur) {
                        Opcode::Update { level: Some(level), delta } => {
                            self.state.apply(level, &delta, &self.schema);
                        }
                        Opcode::Update { level: None, .. } | Opcode::Nop => {}
                        Opcode::EndBlock => break,
                        Opcode::EndWork => break 'pass,
                    }
                    continue;
                }

                cur.take_text_run();

                if !self.state.level(Level::B).active {
                    continue;
                }
                let id = self.current_work_id();
                if id == "0" {
                    continue;
                }
                if seen.insert(id.clone()) {
                    let title = self
                        .works
                        .get(&id)
                        .map(|w| w.title.as_str())
                        .unwrap_or("(Unknown Title)");
                    results.push(format!("ID:{:<4} | {}", id, title));
                }
            }
        }

        debug!("List pass complete: {} works", results.len());
        Ok(results)
    }

    /// Extract one work as citation-prefixed text lines.
    ///
    /// The stream is scanned until the current work ID matches
    /// `target_id` (by string or by integer value); once a matching
    /// region has been seen, the first mismatch terminates the pass, so
    /// the output never mixes in text from another work.
    pub fn extract_work(&mut self, target_id: &str) -> Result<String> {
        debug!("Extracting work {}", target_id);
        self.reset_pass()?;
        self.current = self.works.get(target_id).cloned();
        self.schema = Self::analyze_citation_levels(self.current.as_ref());

        let target_int: Option<u32> = target_id.parse().ok();
        let mut out = String::new();
        let mut found = false;

        'pass: loop {
            let n = self.fill_block()?;
            if n == 0 {
                break;
            }
            let mut cur = ByteCursor::new(&self.buf[..n]);
            while !cur.is_empty() {
                if cur.peek().is_some_and(|b| b & 0x80 != 0) {
                    match opcode::decode(&mut cur) {
                        Opcode::Update { level: Some(level), delta } => {
                            self.state.apply(level, &delta, &self.schema);
                        }
                        Opcode::Update { level: None, .. } | Opcode::Nop => {}
                        Opcode::EndBlock => break,
                        Opcode::EndWork => break 'pass,
                    }
                    continue;
                }

                let text = strip_nuls(cur.take_text_run());
                if text.is_empty() {
                    continue;
                }
                if !self.state.level(Level::B).active {
                    continue;
                }

                let current_id = self.current_work_id();
                let current_int: Option<u32> = current_id.parse().ok();
                let matches = current_id == target_id
                    || (target_int.is_some() && current_int == target_int);

                if matches {
                    found = true;
                    let rendered = self.process_text(&text);
                    if !rendered.trim().is_empty() {
                        let citation = self.format_citation();
                        out.push_str(&format!("{:<10} {}\n", citation, rendered));
                    }
                } else if found {
                    return Ok(out);
                }
            }
        }

        if out.is_empty() {
            return Err(TlgError::WorkNotFound(target_id.to_string()));
        }
        Ok(out)
    }

    /// Transliterate and concatenate every text segment in the file,
    /// ignoring citation state. The canon files are read this way.
    pub fn extract_all_text(&mut self) -> Result<String> {
        debug!("Extracting full text");
        self.reset_pass()?;
        self.current = None;
        self.schema.clear();

        let mut out = String::new();

        'pass: loop {
            let n = self.fill_block()?;
            if n == 0 {
                break;
            }
            let mut cur = ByteCursor::new(&self.buf[..n]);
            while !cur.is_empty() {
                if cur.peek().is_some_and(|b| b & 0x80 != 0) {
                    match opcode::decode(&mut cur) {
                        Opcode::Update { level: Some(level), delta } => {
                            self.state.apply(level, &delta, &self.schema);
                        }
                        Opcode::Update { level: None, .. } | Opcode::Nop => {}
                        Opcode::EndBlock => break,
                        Opcode::EndWork => break 'pass,
                    }
                    continue;
                }

                let text = strip_nuls(cur.take_text_run());
                if !text.is_empty() {
                    out.push_str(&self.process_text(&text));
                }
            }
        }

        Ok(out)
    }

    /// Format the current citation from the active registers.
    ///
    /// Levels are visited in the work's declared order (first occurrence
    /// per level), defaulting to `w.x.y.z` when nothing is declared.
    /// Tokens are `<int><suffix>` when the integer is set, bare suffix
    /// otherwise; three-level works render their middle level's 1..=5 as
    /// the Stephanus section letters `a`..`e` when the suffix is empty.
    fn format_citation(&self) -> String {
        let declared: Vec<Level> = match &self.current {
            Some(meta) if !meta.citations.is_empty() => {
                meta.citations.iter().map(|c| c.level).collect()
            }
            _ => vec![Level::W, Level::X, Level::Y, Level::Z],
        };
        let section = stephanus_section_level(&self.schema);

        let mut seen = [false; 10];
        let mut parts: Vec<String> = Vec::new();

        for level in declared {
            if seen[level.rank()] {
                continue;
            }
            let st = self.state.level(level);
            if !st.active {
                continue;
            }

            let mut token = st.ascii.clone();
            if st.binary > 0 {
                if section == Some(level) && (1..=5).contains(&st.binary) && st.ascii.is_empty() {
                    token = char::from(b'a' + (st.binary as u8 - 1)).to_string();
                } else {
                    token = format!("{}{}", st.binary, st.ascii);
                }
            }

            if !token.is_empty() {
                parts.push(token);
                seen[level.rank()] = true;
            }
        }

        if parts.is_empty() && self.state.level(Level::Z).active {
            return self.state.level(Level::Z).ascii.clone();
        }
        parts.join(".")
    }
}

/// Text segments may carry NUL padding; it never reaches output.
fn strip_nuls(run: &[u8]) -> String {
    run.iter()
        .filter(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}
