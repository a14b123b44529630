use anyhow::Result;
use tracing::{error, info, warn};

use crate::checkpoint::ResponseLog;
use crate::client::ModelClient;
use crate::corpus::{self, file_id_from_name};
use crate::prompt::{parse_example_file, render_prompt};
use crate::record::ResponseRecord;
use crate::settings::Settings;
use crate::SENTINEL_NO_SOLUTION;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuerySummary {
    pub candidates: usize,
    pub already_logged: usize,
    pub skipped_oversized: usize,
    pub unreadable: usize,
    pub answered: usize,
    pub failed: usize,
}

/// Send one prompt per new candidate file and append each answer to the log.
///
/// Per-file failures are logged and left out of the log so the next run
/// picks them up again.
pub fn run_queries(settings: &Settings, client: &dyn ModelClient) -> Result<QuerySummary> {
    let outcomes = corpus::load_solver_outcomes(&settings.solver_results_path)?;
    let files = corpus::list_example_files(&settings.examples_dir);
    let candidates = corpus::filter_candidates(&outcomes, &files);
    let mut log = ResponseLog::open(&settings.response_log_path)?;

    info!(
        files = files.len(),
        candidates = candidates.len(),
        logged = log.len(),
        "Starting queries"
    );

    let mut summary = QuerySummary {
        candidates: candidates.len(),
        ..Default::default()
    };

    for file_name in &candidates {
        let Some(file_id) = file_id_from_name(file_name) else {
            continue;
        };
        if log.contains(file_id) {
            summary.already_logged += 1;
            continue;
        }

        let set = match parse_example_file(&settings.examples_dir.join(file_name)) {
            Ok(set) => set,
            Err(e) => {
                warn!("Skipping {}: {:#}", file_name, e);
                summary.unreadable += 1;
                continue;
            }
        };
        let Some(prompt) = render_prompt(&set, settings.max_examples) else {
            summary.skipped_oversized += 1;
            continue;
        };

        info!("Processing file: {:05}", file_id);
        match client.complete(&prompt) {
            Ok(response) => {
                let solver_label = outcomes
                    .get(&file_id)
                    .cloned()
                    .unwrap_or_else(|| SENTINEL_NO_SOLUTION.to_string());
                log.append(&ResponseRecord {
                    file_id,
                    response,
                    solver_label,
                })?;
                summary.answered += 1;
            }
            Err(e) => {
                error!(file_id, "Model call failed: {}", e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::ndjson;
    use std::cell::RefCell;
    use std::path::Path;

    /// Answers from a script; `None` entries fail the call.
    struct ScriptedClient {
        replies: RefCell<Vec<Option<String>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Option<&str>>) -> Self {
            ScriptedClient {
                replies: RefCell::new(replies.into_iter().rev().map(|r| r.map(String::from)).collect()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModelClient for ScriptedClient {
        fn complete(&self, prompt: &str) -> Result<String, ClientError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match self.replies.borrow_mut().pop().flatten() {
                Some(r) => Ok(r),
                None => Err(ClientError::MissingContent),
            }
        }
    }

    fn settings_in(root: &Path) -> Settings {
        let examples = root.join("rfixer_output");
        std::fs::create_dir_all(&examples).unwrap();
        let fixture = std::fs::read_to_string("tests/fixtures/00017.txt").unwrap();
        for id in [1, 2, 3, 4] {
            std::fs::write(examples.join(format!("{:05}.txt", id)), &fixture).unwrap();
        }
        let big: String = (0..101).map(|i| format!("p{i}\n")).collect();
        std::fs::write(examples.join("00005.txt"), format!("+++\n{big}---\nn\n")).unwrap();

        let sols = examples.join(".temp_sols.ndjson");
        std::fs::write(
            &sols,
            [
                r#"{"file_id": 1, "solution": "a"}"#,
                r#"{"file_id": 2, "solution": "TIMEOUT"}"#,
                r#"{"file_id": 3, "solution": "c"}"#,
                r#"{"file_id": 4, "solution": "d"}"#,
                r#"{"file_id": 5, "solution": "e"}"#,
            ]
            .join("\n"),
        )
        .unwrap();

        Settings {
            examples_dir: examples,
            solver_results_path: sols,
            response_log_path: root.join("gpt_output.ndjson"),
            ..Settings::default()
        }
    }

    #[test]
    fn failures_are_skipped_and_retried_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());

        let client = ScriptedClient::new(vec![Some("one"), None, Some("four")]);
        let summary = run_queries(&settings, &client).unwrap();
        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.answered, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped_oversized, 1);
        assert!(client.prompts.borrow()[0].contains("2023-01-05"));

        let logged: Vec<ResponseRecord> = ndjson::read_lenient(&settings.response_log_path).unwrap();
        let ids: Vec<i64> = logged.iter().map(|r| r.file_id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(logged[1].solver_label, "d");

        let client = ScriptedClient::new(vec![Some("three")]);
        let summary = run_queries(&settings, &client).unwrap();
        assert_eq!(summary.already_logged, 2);
        assert_eq!(summary.answered, 1);
        assert_eq!(client.prompts.borrow().len(), 1);

        let logged: Vec<ResponseRecord> = ndjson::read_lenient(&settings.response_log_path).unwrap();
        assert_eq!(logged.len(), 3);
        assert_eq!(logged[2].file_id, 3);
    }

    #[test]
    fn missing_inputs_mean_nothing_to_do() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            examples_dir: dir.path().join("absent"),
            solver_results_path: dir.path().join("absent.ndjson"),
            response_log_path: dir.path().join("gpt_output.ndjson"),
            ..Settings::default()
        };
        let client = ScriptedClient::new(vec![]);
        let summary = run_queries(&settings, &client).unwrap();
        assert_eq!(summary, QuerySummary::default());
    }
}
