use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{error, warn};

use crate::ndjson;
use crate::{SENTINEL_NO_SOLUTION, SENTINEL_TIMEOUT};

/// Names of the `*.txt` example files in `dir`, sorted.
pub fn list_example_files(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            error!("Directory not readable - {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.ends_with(".txt"))
        .collect();
    files.sort();
    files
}

/// Numeric identifier in front of the first dot: `00042.txt` -> 42.
pub fn file_id_from_name(name: &str) -> Option<i64> {
    name.split('.').next()?.parse().ok()
}

#[derive(Deserialize)]
struct SolverLine {
    file_id: Option<i64>,
    solution: Option<Value>,
}

/// Map of identifier to solver outcome. Lines without a `solution` count as
/// `NO_SOL`.
pub fn load_solver_outcomes(path: &Path) -> Result<HashMap<i64, String>> {
    let lines: Vec<SolverLine> = ndjson::read_lenient(path)?;
    let mut map = HashMap::new();
    for line in lines {
        let Some(file_id) = line.file_id else {
            warn!("Solver line without file_id; skipped");
            continue;
        };
        let solution = match line.solution {
            None | Some(Value::Null) => SENTINEL_NO_SOLUTION.to_string(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };
        map.insert(file_id, solution);
    }
    Ok(map)
}

pub fn is_usable_outcome(outcome: &str) -> bool {
    outcome != SENTINEL_TIMEOUT && outcome != SENTINEL_NO_SOLUTION
}

/// Keep only files whose solver produced a usable reference solution.
pub fn filter_candidates(outcomes: &HashMap<i64, String>, files: &[String]) -> Vec<String> {
    files
        .iter()
        .filter(|name| {
            let Some(id) = file_id_from_name(name) else {
                warn!("Example file without numeric id: {}", name);
                return false;
            };
            outcomes.get(&id).is_some_and(|o| is_usable_outcome(o))
        })
        .cloned()
        .collect()
}
