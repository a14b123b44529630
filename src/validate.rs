use anyhow::Result;
use fancy_regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::corpus::{file_id_from_name, list_example_files};
use crate::ndjson;
use crate::prompt::{parse_example_file, ExampleSet};
use crate::record::{CleanedRecord, PassOutcome, TestedRecord};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationStats {
    pub total: usize,
    pub valid: usize,
    pub passed: usize,
}

impl ValidationStats {
    pub fn from_records(records: &[TestedRecord]) -> Self {
        ValidationStats {
            total: records.len(),
            valid: records.iter().filter(|r| r.valid_regex == Some(true)).count(),
            passed: records.iter().filter(|r| r.pass.passed()).count(),
        }
    }

    pub fn valid_pct(&self) -> f64 {
        percent(self.valid, self.total)
    }

    pub fn passed_pct(&self) -> f64 {
        percent(self.passed, self.total)
    }

    pub fn print(&self) {
        println!("Total: {}", self.total);
        println!("Valid: {}, Passed: {}", self.valid, self.passed);
        println!(
            "Valid percentage: {:.2}%, Passed percentage: {:.2}%",
            self.valid_pct(),
            self.passed_pct()
        );
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Returns `(valid, pass)`. A pattern that fails to compile is invalid and
/// never passes. Look-around and backreferences are accepted; a match that
/// hits the backtrack limit counts as a failed example.
pub fn test_regex(pattern: &str, set: &ExampleSet) -> (bool, bool) {
    let Ok(re) = Regex::new(pattern) else {
        return (false, false);
    };
    let pass = set.positive.iter().all(|p| re.is_match(p).unwrap_or(false))
        && set.negative.iter().all(|n| matches!(re.is_match(n), Ok(false)));
    (true, pass)
}

pub fn test_record(record: &CleanedRecord, example_files: &HashMap<i64, PathBuf>) -> TestedRecord {
    let set = example_files.get(&record.file_id).and_then(|path| {
        parse_example_file(path)
            .map_err(|e| warn!(file_id = record.file_id, "{:#}", e))
            .ok()
    });

    let (valid_regex, pass) = match (set, record.regex.as_deref()) {
        (None, _) => (None, PassOutcome::file_not_found()),
        (Some(_), None) => (Some(false), PassOutcome::Checked(false)),
        (Some(set), Some(pattern)) => {
            let (valid, pass) = test_regex(pattern, &set);
            (Some(valid), PassOutcome::Checked(pass))
        }
    };

    TestedRecord {
        file_id: record.file_id,
        regex: record.regex.clone(),
        valid_regex,
        pass,
    }
}

#[cfg(feature = "rayon")]
fn test_all(records: &[CleanedRecord], example_files: &HashMap<i64, PathBuf>) -> Vec<TestedRecord> {
    records
        .par_iter()
        .map(|r| test_record(r, example_files))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn test_all(records: &[CleanedRecord], example_files: &HashMap<i64, PathBuf>) -> Vec<TestedRecord> {
    records
        .iter()
        .map(|r| test_record(r, example_files))
        .collect()
}

/// Test every cleaned regex against its example file and write the results.
pub fn validate_responses(
    clean_path: &Path,
    examples_dir: &Path,
    tested_path: &Path,
) -> Result<ValidationStats> {
    let records: Vec<CleanedRecord> = ndjson::read_lenient(clean_path)?;
    let example_files: HashMap<i64, PathBuf> = list_example_files(examples_dir)
        .into_iter()
        .filter_map(|name| Some((file_id_from_name(&name)?, examples_dir.join(name))))
        .collect();

    let tested = test_all(&records, &example_files);
    ndjson::write_all(tested_path, &tested)?;
    Ok(ValidationStats::from_records(&tested))
}
