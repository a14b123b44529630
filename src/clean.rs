use anyhow::Result;
use std::path::Path;
use tracing::error;

use crate::extract::{extract, Extraction};
use crate::ndjson;
use crate::record::{CleanedRecord, ResponseRecord};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanSummary {
    pub total: usize,
    pub extracted: usize,
    pub no_solution: usize,
    pub ambiguous: usize,
}

pub fn clean_record(record: &ResponseRecord, summary: &mut CleanSummary) -> CleanedRecord {
    summary.total += 1;
    let regex = match extract(&record.response) {
        Extraction::Single(r) => {
            summary.extracted += 1;
            Some(r)
        }
        Extraction::NoSolution => {
            summary.no_solution += 1;
            None
        }
        Extraction::Ambiguous(candidates) => {
            error!(
                file_id = record.file_id,
                ?candidates,
                "Multiple regex found; writing null"
            );
            summary.ambiguous += 1;
            None
        }
    };
    CleanedRecord {
        file_id: record.file_id,
        regex,
    }
}

/// Rewrite the response log as one extracted regex per record.
pub fn clean_responses(log_path: &Path, clean_path: &Path) -> Result<CleanSummary> {
    let responses: Vec<ResponseRecord> = ndjson::read_lenient(log_path)?;
    let mut summary = CleanSummary::default();
    let cleaned: Vec<CleanedRecord> = responses
        .iter()
        .map(|r| clean_record(r, &mut summary))
        .collect();
    ndjson::write_all(clean_path, &cleaned)?;
    Ok(summary)
}
