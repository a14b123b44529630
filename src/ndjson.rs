//! Line-delimited JSON helpers.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::{error, warn};

pub type Object = Map<String, Value>;

/// Read every parseable line of `path` as `T`.
///
/// Lines that fail to parse are logged and skipped. A missing file is logged
/// and treated as empty.
pub fn read_lenient<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!("File not found - {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to open {:?}", path)),
    };

    let mut items = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {:?}", path))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(item) => items.push(item),
            Err(e) => warn!(
                file = %path.display(),
                line = idx + 1,
                "Could not parse line as JSON: {}",
                e
            ),
        }
    }
    Ok(items)
}

/// Read JSON objects, keeping every key as-is.
pub fn read_objects(path: &Path) -> Result<Vec<Object>> {
    read_lenient(path)
}

/// Overwrite `path` with one JSON document per line.
pub fn write_all<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut out = BufWriter::new(file);
    for item in items {
        write_line(&mut out, item)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_line<W: Write, T: Serialize>(out: &mut W, item: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, item)?;
    out.write_all(b"\n")?;
    Ok(())
}
