use serde::{Deserialize, Serialize};

pub const SOLVER_SOLUTION_KEY: &str = "RFixer-Solution";
pub const MODEL_RESPONSE_KEY: &str = "GPT-response";

/// One row of the merged regex database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexRecord {
    pub id: i64,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub positive_inputs: Vec<String>,
    #[serde(default)]
    pub negative_inputs: Vec<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(rename = "RFixer-Solution", default)]
    pub solver_solution: Option<String>,
    #[serde(rename = "GPT-response", default)]
    pub model_solution: Option<String>,
}

/// Raw model answer as appended to the response log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub file_id: i64,
    #[serde(rename = "GPT-response")]
    pub response: String,
    #[serde(rename = "RFixer_Sol")]
    pub solver_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub file_id: i64,
    #[serde(rename = "GPT-response")]
    pub regex: Option<String>,
}

/// Outcome of testing a cleaned regex against its example file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PassOutcome {
    Checked(bool),
    Missing(String),
}

impl PassOutcome {
    pub const FILE_NOT_FOUND: &'static str = "File not found";

    pub fn file_not_found() -> Self {
        PassOutcome::Missing(Self::FILE_NOT_FOUND.to_string())
    }

    pub fn passed(&self) -> bool {
        matches!(self, PassOutcome::Checked(true))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestedRecord {
    pub file_id: i64,
    #[serde(rename = "GPT-response")]
    pub regex: Option<String>,
    #[serde(rename = "Valid_Regex", default, skip_serializing_if = "Option::is_none")]
    pub valid_regex: Option<bool>,
    pub pass: PassOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn regex_record_uses_hyphenated_keys() {
        let rec: RegexRecord = serde_json::from_value(json!({
            "id": 7,
            "regex": "a+",
            "positive_inputs": ["a", "aa"],
            "negative_inputs": ["b"],
            "file_path": "00007.txt",
            "RFixer-Solution": "a*",
            "GPT-response": null
        }))
        .unwrap();
        assert_eq!(rec.solver_solution.as_deref(), Some("a*"));
        assert!(rec.model_solution.is_none());
    }

    #[test]
    fn solver_record_may_lack_regex_and_path() {
        let rec: RegexRecord = serde_json::from_value(json!({
            "id": 8,
            "regex": null,
            "RFixer-Solution": null,
            "GPT-response": null
        }))
        .unwrap();
        assert!(rec.regex.is_none());
        assert!(rec.file_path.is_none());
        assert!(rec.positive_inputs.is_empty());
    }

    #[test]
    fn missing_file_pass_serializes_as_string() {
        let rec = TestedRecord {
            file_id: 3,
            regex: Some("x".into()),
            valid_regex: None,
            pass: PassOutcome::file_not_found(),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["pass"], json!("File not found"));
        assert!(v.get("Valid_Regex").is_none());

        let back: TestedRecord = serde_json::from_value(v).unwrap();
        assert!(!back.pass.passed());
    }
}
