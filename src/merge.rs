use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::ndjson::{self, Object};
use crate::record::{MODEL_RESPONSE_KEY, SOLVER_SOLUTION_KEY};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergeSummary {
    pub primary: usize,
    pub secondary: usize,
    pub written: usize,
    pub merged: usize,
    pub defaults_added: usize,
}

/// Copy the model response of every passing primary record into the
/// secondary record with the same identifier.
///
/// Returns the secondary records in their original order. A repeated `id`
/// keeps the first position and the last value; records without an integer
/// `id` cannot be keyed in the table and are dropped.
pub fn merge_responses(primary: &[Object], secondary: Vec<Object>) -> (Vec<Object>, usize) {
    let mut records: Vec<Object> = Vec::with_capacity(secondary.len());
    let mut index: HashMap<i64, usize> = HashMap::new();

    for entry in secondary {
        match entry.get("id").and_then(Value::as_i64) {
            Some(id) => match index.get(&id) {
                Some(&pos) => records[pos] = entry,
                None => {
                    index.insert(id, records.len());
                    records.push(entry);
                }
            },
            None => warn!("Secondary record without integer id; dropped"),
        }
    }

    let mut merged = 0;
    for response in primary {
        let Some(file_id) = response.get("file_id").and_then(Value::as_i64) else {
            warn!("Response record without integer file_id; skipped");
            continue;
        };
        let Some(passed) = response.get("pass") else {
            warn!(file_id, "Response record without pass flag; skipped");
            continue;
        };
        if passed.as_bool() != Some(true) {
            continue;
        }
        if let Some(&pos) = index.get(&file_id) {
            let value = response.get(MODEL_RESPONSE_KEY).cloned().unwrap_or(Value::Null);
            records[pos].insert(MODEL_RESPONSE_KEY.to_string(), value);
            merged += 1;
        }
    }

    (records, merged)
}

/// Make sure both optional fields are present, defaulting to `null`.
/// Returns the number of keys added; zero on already-normalized input.
pub fn normalize(records: &mut [Object]) -> usize {
    let mut added = 0;
    for entry in records.iter_mut() {
        for key in [SOLVER_SOLUTION_KEY, MODEL_RESPONSE_KEY] {
            if !entry.contains_key(key) {
                entry.insert(key.to_string(), Value::Null);
                added += 1;
            }
        }
    }
    added
}

/// Normalize an NDJSON file. `input` and `output` may be the same path.
pub fn normalize_file(input: &Path, output: &Path) -> Result<usize> {
    let mut records = ndjson::read_objects(input)?;
    let added = normalize(&mut records);
    ndjson::write_all(output, &records)?;
    Ok(added)
}

pub fn build_merged_file(
    primary_path: &Path,
    secondary_path: &Path,
    merged_path: &Path,
) -> Result<MergeSummary> {
    let primary = ndjson::read_objects(primary_path)?;
    let secondary = ndjson::read_objects(secondary_path)?;
    let summary_primary = primary.len();
    let summary_secondary = secondary.len();

    let (mut records, merged) = merge_responses(&primary, secondary);
    let defaults_added = normalize(&mut records);
    ndjson::write_all(merged_path, &records)?;

    info!(
        merged,
        defaults_added,
        out = %merged_path.display(),
        "Wrote merged database"
    );
    Ok(MergeSummary {
        primary: summary_primary,
        secondary: summary_secondary,
        written: records.len(),
        merged,
        defaults_added,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Object {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn only_passing_matches_are_copied() {
        let primary = vec![
            obj(json!({"file_id": 1, "pass": true, "GPT-response": "a+"})),
            obj(json!({"file_id": 2, "pass": false, "GPT-response": "b+"})),
            obj(json!({"file_id": 3, "pass": "File not found", "GPT-response": "c+"})),
            obj(json!({"file_id": 99, "pass": true, "GPT-response": "z"})),
        ];
        let secondary = vec![
            obj(json!({"id": 1, "regex": "a*"})),
            obj(json!({"id": 2, "regex": "b*"})),
            obj(json!({"id": 3, "regex": "c*"})),
        ];

        let (records, merged) = merge_responses(&primary, secondary);
        assert_eq!(merged, 1);
        assert_eq!(records[0]["GPT-response"], json!("a+"));
        assert!(!records[1].contains_key("GPT-response"));
        assert!(!records[2].contains_key("GPT-response"));
    }

    #[test]
    fn duplicate_secondary_id_keeps_first_slot_last_value() {
        let secondary = vec![
            obj(json!({"id": 5, "regex": "old"})),
            obj(json!({"id": 6, "regex": "x"})),
            obj(json!({"id": 5, "regex": "new"})),
        ];
        let (records, _) = merge_responses(&[], secondary);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["regex"], json!("new"));
    }

    #[test]
    fn records_without_integer_id_are_dropped() {
        let secondary = vec![
            obj(json!({"regex": "no id"})),
            obj(json!({"id": "7", "regex": "string id"})),
            obj(json!({"id": 7, "regex": null})),
        ];
        let (records, _) = merge_responses(&[], secondary);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], json!(7));
    }

    #[test]
    fn normalize_adds_explicit_nulls_once() {
        let mut records = vec![
            obj(json!({"id": 1, "RFixer-Solution": "a"})),
            obj(json!({"id": 2})),
        ];
        assert_eq!(normalize(&mut records), 3);
        for r in &records {
            assert!(r.contains_key("RFixer-Solution"));
            assert!(r.contains_key("GPT-response"));
        }
        assert_eq!(records[0]["RFixer-Solution"], json!("a"));
        assert_eq!(records[1]["GPT-response"], Value::Null);

        let snapshot = records.clone();
        assert_eq!(normalize(&mut records), 0);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn normalize_file_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.ndjson");
        std::fs::write(&path, "{\"id\":1,\"extra\":[1,2]}\n{\"id\":2,\"GPT-response\":\"q\"}\n")
            .unwrap();

        assert_eq!(normalize_file(&path, &path).unwrap(), 3);
        let first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(normalize_file(&path, &path).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert!(first.starts_with("{\"id\":1,\"extra\":[1,2],"));
    }

    #[test]
    fn build_merged_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("tested.ndjson");
        let secondary = dir.path().join("solutions.ndjson");
        let merged = dir.path().join("db.ndjson");
        std::fs::write(
            &primary,
            "{\"file_id\":1,\"GPT-response\":\"\\\\d+\",\"Valid_Regex\":true,\"pass\":true}\nbroken\n",
        )
        .unwrap();
        std::fs::write(
            &secondary,
            "{\"id\":1,\"regex\":\"[0-9]+\",\"file_path\":\"00001.txt\"}\n{\"id\":2,\"regex\":\"x\",\"file_path\":\"00002.txt\",\"RFixer-Solution\":\"x\"}\n",
        )
        .unwrap();

        let summary = build_merged_file(&primary, &secondary, &merged).unwrap();
        assert_eq!(summary.primary, 1);
        assert_eq!(summary.secondary, 2);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.merged, 1);
        assert_eq!(summary.defaults_added, 2);

        let out = ndjson::read_objects(&merged).unwrap();
        assert_eq!(out[0]["GPT-response"], json!("\\d+"));
        assert_eq!(out[0]["RFixer-Solution"], Value::Null);
        assert_eq!(out[1]["GPT-response"], Value::Null);
    }
}
