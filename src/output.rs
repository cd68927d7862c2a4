//! JSON output stage: array and per-line rendering, chunked file writing.
//!
//! Array mode emits one `[ ... ]` document list with one document per line;
//! per-line mode emits bare documents separated by newlines (not itself valid
//! JSON, but the common one-record-per-line exchange shape). Chunking splits
//! the document sequence into files of at most `max_docs` documents named
//! `<stem>_<k>.json` with `k` counting up from zero.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use serde_json::Value;

use crate::io_utils;

pub fn write_documents(output: Option<&Path>, documents: &[Value], per_line: bool) -> Result<()> {
    let rendered = render(documents, per_line)?;
    match output {
        Some(path) if !io_utils::is_dash(path) => {
            let mut file = BufWriter::new(
                File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
            );
            file.write_all(rendered.as_bytes())
                .and_then(|_| file.flush())
                .with_context(|| format!("Writing output file {path:?}"))?;
            info!("Wrote {} document(s) to {path:?}", documents.len());
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|_| writeln!(stdout))
                .context("Writing documents to stdout")?;
        }
    }
    Ok(())
}

/// Writes ⌈N / max_docs⌉ chunk files; concatenating them in chunk order
/// reproduces the full document sequence. Zero documents means zero files.
pub fn write_chunked(
    output: &Path,
    documents: &[Value],
    max_docs: usize,
    per_line: bool,
) -> Result<()> {
    for (index, chunk) in documents.chunks(max_docs).enumerate() {
        let path = chunk_path(output, index);
        write_documents(Some(&path), chunk, per_line)?;
    }
    Ok(())
}

fn render(documents: &[Value], per_line: bool) -> Result<String> {
    let serialized: Vec<String> = documents
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<_, _>>()
        .context("Serializing documents")?;
    if per_line {
        Ok(serialized.iter().join("\n"))
    } else {
        Ok(format!("[\n{}\n]", serialized.iter().join(",\n")))
    }
}

fn chunk_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{stem}_{index}.json"))
}
