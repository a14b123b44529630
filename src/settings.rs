use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Paths, model and credentials for both pipelines.
///
/// Loaded from `REGEXPIPE_*` variables (e.g. `REGEXPIPE_EXAMPLES_DIR`), with
/// the API credential taken from `OPENAI_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub responses_path: PathBuf,
    pub solver_db_path: PathBuf,
    pub merged_path: PathBuf,
    pub sqlite_path: PathBuf,

    pub examples_dir: PathBuf,
    pub solver_results_path: PathBuf,
    pub response_log_path: PathBuf,
    pub clean_output_path: PathBuf,
    pub tested_output_path: PathBuf,

    pub model: String,
    pub max_examples: usize,
    pub request_timeout_secs: Option<u64>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            responses_path: PathBuf::from("gpt_output_tested.ndjson"),
            solver_db_path: PathBuf::from("rfixer_solutions.ndjson"),
            merged_path: PathBuf::from("db.ndjson"),
            sqlite_path: PathBuf::from("composition_regexes.db"),
            examples_dir: PathBuf::from("rfixer_output"),
            solver_results_path: PathBuf::from("rfixer_output/.temp_sols.ndjson"),
            response_log_path: PathBuf::from("gpt_output.ndjson"),
            clean_output_path: PathBuf::from("gpt_output_clean.ndjson"),
            tested_output_path: PathBuf::from("gpt_output_tested.ndjson"),
            model: "gpt-4-turbo-preview".to_string(),
            max_examples: 100,
            request_timeout_secs: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(Environment::with_prefix("REGEXPIPE"))
            .add_source(Environment::with_prefix("OPENAI").keep_prefix(true))
            .build()
            .context("Failed to read settings from environment")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
