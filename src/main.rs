//! tlgview - command-line front-end for the TLG/PHI corpus reader.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tlg_reader::tlg::format::opcode::{self, Delta, Opcode};
use tlg_reader::tlg::reader::resolve_text_path;
use tlg_reader::tlg::utils::{normalize_id, ByteCursor};
use tlg_reader::tlg::{authtab, canon};
use tlg_reader::{idt, BetaCode, TlgReader, BLOCK_SIZE};

#[derive(Parser)]
#[command(name = "tlgview")]
#[command(about = "Browse and extract works from TLG/PHI corpus files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the works contained in a corpus text file
    List {
        /// Corpus text file (tlg0000.txt, phi0474.txt, ...)
        file: PathBuf,
    },

    /// Extract one work as citation-prefixed text
    Extract {
        /// Corpus text file
        file: PathBuf,
        /// Work ID as shown by `list` (leading zeros are ignored)
        work_id: String,
    },

    /// Decode the first block of a text file opcode by opcode
    Dump {
        /// Corpus text file
        file: PathBuf,
    },

    /// Print the author table
    Authors {
        /// Path to the author table
        #[arg(default_value = "authtab.dir")]
        path: PathBuf,
    },

    /// Look up the canon bibliography for an author or work
    Biblio {
        /// Canon file (doccan1.txt)
        canon: PathBuf,
        /// Author ID (tlg0012, 12, ...)
        tlg_id: String,
        /// Optional work ID
        #[arg(default_value = "")]
        work_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::List { file } => cmd_list(&file),
        Commands::Extract { file, work_id } => cmd_extract(&file, &work_id),
        Commands::Dump { file } => cmd_dump(&file),
        Commands::Authors { path } => cmd_authors(&path),
        Commands::Biblio { canon, tlg_id, work_id } => cmd_biblio(&canon, &tlg_id, &work_id),
    }
}

/// File stem of a corpus path ("tlg0012" from ".../tlg0012.txt").
fn corpus_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load the sibling IDT of a text file, degrading to empty metadata
/// with a warning when it is missing or unreadable.
fn load_sibling_idt(path: &Path) -> std::collections::HashMap<String, tlg_reader::WorkMetadata> {
    let idt_path = path.with_extension("idt");
    match idt::read::<BetaCode>(&idt_path) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Warning: failed to read IDT file {}: {}", idt_path.display(), e);
            Default::default()
        }
    }
}

/// Author display name from the sibling `authtab.dir`, if present.
fn sibling_author(path: &Path) -> String {
    let auth_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("authtab.dir");
    let target = corpus_stem(path).to_ascii_uppercase();
    match authtab::read_author_table::<BetaCode>(&auth_path) {
        Ok(records) => records
            .into_iter()
            .find(|r| r.id == target)
            .map(|r| r.name)
            .unwrap_or_else(|| "Unknown Author".to_string()),
        Err(e) => {
            eprintln!("Warning: could not read author table: {}", e);
            "Unknown Author".to_string()
        }
    }
}

fn cmd_list(file: &Path) -> Result<()> {
    let metadata = load_sibling_idt(file);
    let author = sibling_author(file);

    let mut reader = TlgReader::<BetaCode>::open(file)
        .with_context(|| format!("failed to open {}", file.display()))?;
    reader.set_metadata(metadata);

    println!("File: {} ({})", corpus_stem(file), author);
    println!("----------------------------------------");
    for line in reader.list_works()? {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_extract(file: &Path, work_id: &str) -> Result<()> {
    let metadata = load_sibling_idt(file);
    let author = sibling_author(file);
    let clean_id = normalize_id(work_id);

    let meta = metadata.get(&clean_id).cloned();
    let title = meta
        .as_ref()
        .map(|m| m.title.clone())
        .unwrap_or_else(|| "(Unknown Title)".to_string());

    println!("Author: {}", author);
    println!("Work:   {} (ID: {})", title, clean_id);
    if let Some(meta) = &meta {
        if !meta.citations.is_empty() {
            for def in &meta.citations {
                print!("{} ({}) ", def.label, def.level);
            }
            println!();
        }
    }
    println!("----------------------------------------");

    let mut reader = TlgReader::<BetaCode>::open(file)
        .with_context(|| format!("failed to open {}", file.display()))?;
    reader.set_metadata(metadata);
    print!("{}", reader.extract_work(&clean_id)?);
    Ok(())
}

/// Rendering of a decoded argument for the dump listing.
fn delta_display(delta: &Delta) -> String {
    match delta {
        Delta::Increment => "INC".to_string(),
        Delta::Binary(v) => format!("INT={}", v),
        Delta::BinaryAscii(v, s) => format!("INT={} STR={}", v, s),
        Delta::Ascii(s) => format!("STR={}", s),
    }
}

fn cmd_dump(file: &Path) -> Result<()> {
    let path = resolve_text_path(file);
    let data = std::fs::read(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let limit = data.len().min(BLOCK_SIZE);

    println!("--- Dumping {} (first {} bytes) ---", path.display(), limit);

    let mut cur = ByteCursor::new(&data[..limit]);
    while !cur.is_empty() {
        if cur.peek().is_some_and(|b| b & 0x80 == 0) {
            let run = cur.take_text_run();
            let text = String::from_utf8_lossy(run).replace('\n', "\\n");
            println!("TEXT: [{}]", text);
            continue;
        }

        let offset = cur.pos();
        let op_byte = cur.peek().unwrap_or(0);
        match opcode::decode(&mut cur) {
            Opcode::Update { level, delta } => {
                let level = level.map(|l| l.to_string()).unwrap_or_default();
                println!(
                    "OFFSET {}: Op={:02X} Level={} Val={}",
                    offset,
                    op_byte,
                    level,
                    delta_display(&delta)
                );
            }
            Opcode::EndBlock => {
                println!("OFFSET {}: Op={:02X} END-OF-BLOCK", offset, op_byte);
            }
            Opcode::EndWork => {
                println!("OFFSET {}: Op={:02X} END-OF-WORK", offset, op_byte);
            }
            Opcode::Nop => {
                println!("OFFSET {}: Op={:02X} SPECIAL", offset, op_byte);
            }
        }
    }
    Ok(())
}

fn cmd_authors(path: &Path) -> Result<()> {
    let records = authtab::read_author_table::<BetaCode>(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    for record in records {
        // Asterisked IDs are table-internal annotations.
        if record.id.starts_with('*') || record.id.is_empty() {
            continue;
        }
        println!("{:<8} | {}", record.id, record.name);
    }
    Ok(())
}

fn cmd_biblio(canon_path: &Path, tlg_id: &str, work_id: &str) -> Result<()> {
    let text = canon::biblio::<BetaCode>(canon_path, tlg_id, work_id)
        .with_context(|| format!("failed to read {}", canon_path.display()))?;
    if text.is_empty() {
        println!("No canon entry found for {} {}", tlg_id, work_id);
    } else {
        println!("{}", text);
    }
    Ok(())
}
