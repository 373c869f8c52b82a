//! TSV loading and storing for all pipeline artifacts.
//!
//! Every file is newline-delimited, tab-separated, and headerless:
//!
//! - `dataset.tsv` — `user \t item [\t timestamp]`
//! - `knowledge/kg.tsv` — `subject \t predicate \t object`
//! - `knowledge/linking.tsv` — `item \t entity`
//! - `kgflex/item_features.tsv` — `item \t feature_index`
//!
//! Loaders fail fast on malformed rows instead of skipping them; a silently
//! dropped row would break the alignment invariants further down the
//! pipeline.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{LoadError, StoreError};
use crate::model::{Interaction, Triple};

// ── Loaders ─────────────────────────────────────────────────────────────

/// Load the interaction log, deduplicating on `(user, item)` (first seen
/// wins) while preserving source order.
pub fn load_dataset(path: &Path) -> Result<Vec<Interaction>, LoadError> {
    let mut records = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (line_no, line) in read_lines(path)? {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 && fields.len() != 3 {
            return Err(LoadError::MalformedRecord {
                path: path.to_path_buf(),
                line: line_no,
                expected: "2 or 3",
                actual: fields.len(),
            });
        }
        let user = parse_id(fields[0], path, line_no)?;
        let item = parse_id(fields[1], path, line_no)?;
        let timestamp = match fields.get(2) {
            Some(raw) => Some(parse_id(raw, path, line_no)?),
            None => None,
        };
        if seen.insert((user, item)) {
            records.push(Interaction {
                user,
                item,
                timestamp,
            });
        }
    }

    tracing::info!(records = records.len(), path = %path.display(), "loaded dataset");
    Ok(records)
}

/// Load the knowledge-graph dump, deduplicating exact triples while
/// preserving source order.
pub fn load_kg(path: &Path) -> Result<Vec<Triple>, LoadError> {
    let mut triples = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (line_no, line) in read_lines(path)? {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(LoadError::MalformedRecord {
                path: path.to_path_buf(),
                line: line_no,
                expected: "3",
                actual: fields.len(),
            });
        }
        let triple = Triple::new(fields[0], fields[1], fields[2]);
        if seen.insert(triple.clone()) {
            triples.push(triple);
        }
    }

    tracing::info!(triples = triples.len(), path = %path.display(), "loaded knowledge graph");
    Ok(triples)
}

/// Load the raw item-entity linking table.
///
/// Returned as rows rather than a map: the linking cleaner needs to see
/// duplicate item entries to apply its resolution policy.
pub fn load_linking(path: &Path) -> Result<Vec<(u64, String)>, LoadError> {
    let mut rows = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 {
            return Err(LoadError::MalformedRecord {
                path: path.to_path_buf(),
                line: line_no,
                expected: "2",
                actual: fields.len(),
            });
        }
        let item = parse_id(fields[0], path, line_no)?;
        rows.push((item, fields[1].to_string()));
    }

    tracing::info!(rows = rows.len(), path = %path.display(), "loaded linking table");
    Ok(rows)
}

fn read_lines(path: &Path) -> Result<Vec<(usize, String)>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        // Line numbers are 1-based in diagnostics.
        lines.push((idx + 1, line.to_string()));
    }
    Ok(lines)
}

fn parse_id(raw: &str, path: &Path, line: usize) -> Result<u64, LoadError> {
    raw.trim().parse().map_err(|_| LoadError::BadField {
        path: path.to_path_buf(),
        line,
        value: raw.to_string(),
    })
}

// ── Store ───────────────────────────────────────────────────────────────

/// A row that can be rendered as a tab-separated line.
pub trait TsvRecord {
    /// Write the row's fields, tab-separated, without the trailing newline.
    fn write_row(&self, out: &mut dyn Write) -> std::io::Result<()>;
}

impl TsvRecord for Interaction {
    fn write_row(&self, out: &mut dyn Write) -> std::io::Result<()> {
        match self.timestamp {
            Some(ts) => write!(out, "{}\t{}\t{}", self.user, self.item, ts),
            None => write!(out, "{}\t{}", self.user, self.item),
        }
    }
}

impl TsvRecord for Triple {
    fn write_row(&self, out: &mut dyn Write) -> std::io::Result<()> {
        write!(out, "{}\t{}\t{}", self.subject, self.predicate, self.object)
    }
}

impl TsvRecord for (u64, usize) {
    fn write_row(&self, out: &mut dyn Write) -> std::io::Result<()> {
        write!(out, "{}\t{}", self.0, self.1)
    }
}

/// Persist a tabular artifact as `<folder>/<name>.tsv`, creating the folder
/// if absent. The message describes the artifact in the run log.
pub fn store<R: TsvRecord>(
    rows: &[R],
    folder: &Path,
    name: &str,
    message: &str,
) -> Result<PathBuf, StoreError> {
    std::fs::create_dir_all(folder).map_err(|source| StoreError::CreateDir {
        path: folder.to_path_buf(),
        source,
    })?;

    let path = folder.join(format!("{name}.tsv"));
    let file = File::create(&path).map_err(|source| StoreError::Write {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let write_all = |writer: &mut BufWriter<File>| -> std::io::Result<()> {
        for row in rows {
            row.write_row(writer)?;
            writeln!(writer)?;
        }
        writer.flush()
    };
    write_all(&mut writer).map_err(|source| StoreError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(rows = rows.len(), path = %path.display(), "stored {message}");
    Ok(path)
}
