use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use regex_llm_pipeline::client::OpenAiClient;
use regex_llm_pipeline::settings::Settings;
use regex_llm_pipeline::{clean, init_tracing, query, validate};
use tracing::info;

#[derive(Parser)]
#[command(name = "query_llm", about = "Generate regexes from example sets with a chat model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt the model for every candidate not yet in the response log
    Query,
    /// Extract one regex per logged response
    Clean,
    /// Test cleaned regexes against their example files
    Validate,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    info!(model = %settings.model, examples = ?settings.examples_dir, "Settings loaded");

    let t0 = Instant::now();
    match cli.command {
        Commands::Query => {
            let client = OpenAiClient::new(
                &settings.model,
                settings.openai_api_key.as_deref(),
                &settings.openai_base_url,
                settings.request_timeout(),
            )?;
            let s = query::run_queries(&settings, &client)?;
            println!(
                "Candidates: {} | answered: {} | failed: {} | already logged: {} | too many examples: {} | unreadable: {}",
                s.candidates, s.answered, s.failed, s.already_logged, s.skipped_oversized, s.unreadable
            );
        }
        Commands::Clean => {
            let s = clean::clean_responses(&settings.response_log_path, &settings.clean_output_path)?;
            println!(
                "Cleaned {} responses ({} extracted, {} ambiguous) -> {:?}",
                s.total, s.extracted, s.ambiguous, settings.clean_output_path
            );
            println!("Total files with no solution: {}", s.no_solution);
        }
        Commands::Validate => {
            let stats = validate::validate_responses(
                &settings.clean_output_path,
                &settings.examples_dir,
                &settings.tested_output_path,
            )?;
            stats.print();
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}
