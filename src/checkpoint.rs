//! Append-only response log doubling as the resume checkpoint.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::ndjson;
use crate::record::ResponseRecord;
use tracing::warn;

#[derive(Deserialize)]
struct LoggedId {
    file_id: i64,
}

pub struct ResponseLog {
    seen: HashSet<i64>,
    file: File,
}

impl ResponseLog {
    /// Open (or create) the log and remember every identifier already in it.
    pub fn open(path: &Path) -> Result<Self> {
        let seen = if path.exists() {
            ndjson::read_lenient::<LoggedId>(path)?
                .into_iter()
                .map(|l| l.file_id)
                .collect()
        } else {
            HashSet::new()
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {:?} for append", path))?;
        let mut log = ResponseLog { seen, file };
        if ends_mid_line(path)? {
            warn!("Response log {} ends with a partial line; terminating it", path.display());
            log.file.write_all(b"\n")?;
            log.file.flush()?;
        }
        Ok(log)
    }

    pub fn contains(&self, file_id: i64) -> bool {
        self.seen.contains(&file_id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Write one complete line and flush it before returning.
    pub fn append(&mut self, record: &ResponseRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        self.seen.insert(record.file_id);
        Ok(())
    }
}

/// True when the file is non-empty and its last byte is not a newline.
fn ends_mid_line(path: &Path) -> Result<bool> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
