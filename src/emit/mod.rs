//! Table emission
//!
//! Writes the computed tables to disk in one of several formats. Every file
//! is written to a temporary file in the destination directory and renamed
//! into place. If any rename fails, files already renamed are removed or
//! restored to their previous contents.
//!
//! # Submodules
//! - `tables` - The table bundle handed to the writers
//! - `binary` - Little-endian binary format
//! - `json` - JSON (base64 arrays) and MessagePack
//! - `c_source` - C header/source pair

mod tables;
mod binary;
mod json;
mod c_source;

use crate::config::OutputFormat;
use crate::error::{Result, SegmeshError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub use tables::{EmittedTables, LayerTable};
pub use binary::{read_binary, to_bytes, write_binary, MAGIC};
pub use json::{to_json, to_msgpack};
pub use c_source::{render_header, render_source};

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn write_err(path: &Path) -> impl Fn(std::io::Error) -> SegmeshError + '_ {
    move |source| SegmeshError::WriteOutput { path: path.to_path_buf(), source }
}

/// Stage `contents` next to `path` without touching `path` yet
fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path)).map_err(write_err(path))?;
    tmp.write_all(contents).map_err(write_err(path))?;
    tmp.as_file().sync_all().map_err(write_err(path))?;
    Ok(tmp)
}

/// Copy of an existing output file, kept until the whole commit succeeds
fn backup(path: &Path) -> Result<Option<NamedTempFile>> {
    if !path.is_file() {
        return Ok(None);
    }
    let tmp = NamedTempFile::new_in(parent_dir(path)).map_err(write_err(path))?;
    fs::copy(path, tmp.path()).map_err(write_err(path))?;
    Ok(Some(tmp))
}

/// Undo already persisted files, newest first: restore what they replaced
/// or remove them if nothing was there before.
fn rollback(committed: Vec<(PathBuf, Option<NamedTempFile>)>) {
    for (path, previous) in committed.into_iter().rev() {
        let undone = match previous {
            Some(old) => old.persist(&path).map(|_| ()).map_err(|e| e.error),
            None => fs::remove_file(&path),
        };
        if let Err(error) = undone {
            warn!(path = %path.display(), %error, "could not roll back output file");
        }
    }
}

fn commit(staged: Vec<(NamedTempFile, PathBuf)>) -> Result<Vec<PathBuf>> {
    let mut committed: Vec<(PathBuf, Option<NamedTempFile>)> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        let previous = match backup(&path) {
            Ok(previous) => previous,
            Err(e) => {
                rollback(committed);
                return Err(e);
            }
        };
        if let Err(e) = tmp.persist(&path) {
            rollback(committed);
            return Err(SegmeshError::WriteOutput { path, source: e.error });
        }
        committed.push((path, previous));
    }
    Ok(committed.into_iter().map(|(path, _)| path).collect())
}

/// Write the tables to `path` and return the files created. The C format
/// writes `path` as the source and a sibling `.h` header.
pub fn write_tables(tables: &EmittedTables, path: &Path, format: OutputFormat) -> Result<Vec<PathBuf>> {
    let start = std::time::Instant::now();
    let files: Vec<(PathBuf, Vec<u8>)> = match format {
        OutputFormat::Binary => vec![(path.to_path_buf(), to_bytes(tables))],
        OutputFormat::Json => vec![(path.to_path_buf(), to_json(tables)?)],
        OutputFormat::MsgPack => vec![(path.to_path_buf(), to_msgpack(tables)?)],
        OutputFormat::C => {
            let header_path = path.with_extension("h");
            let header_name = header_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "segdefs.h".to_string());
            vec![
                (header_path, render_header(tables).into_bytes()),
                (path.to_path_buf(), render_source(tables, &header_name).into_bytes()),
            ]
        }
    };

    // Stage everything before renaming anything
    let mut staged = Vec::with_capacity(files.len());
    for (file_path, contents) in &files {
        staged.push((stage(file_path, contents)?, file_path.clone()));
    }
    let written = commit(staged)?;

    let bytes: usize = files.iter().map(|(_, c)| c.len()).sum();
    info!(
        ?format,
        files = written.len(),
        bytes,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "wrote output tables"
    );
    Ok(written)
}
