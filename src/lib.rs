//! Regex generation pipeline.
//!
//! Two batch flows share this crate:
//!   - `build_db`: merge tested model responses into the solver database
//!     and load the result into SQLite.
//!   - `query_llm`: prompt a chat model with example sets, then extract and
//!     validate the regexes it answered with.

pub mod checkpoint;
pub mod clean;
pub mod client;
pub mod corpus;
pub mod extract;
pub mod merge;
pub mod ndjson;
pub mod prompt;
pub mod query;
pub mod record;
pub mod settings;
pub mod store;
pub mod validate;

/// Solver outcomes that mean no usable reference solution exists.
pub const SENTINEL_TIMEOUT: &str = "TIMEOUT";
pub const SENTINEL_NO_SOLUTION: &str = "NO_SOL";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}
