use anyhow::Result;
use regex_llm_pipeline::settings::Settings;
use regex_llm_pipeline::{init_tracing, merge, store};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let settings = Settings::load()?;
    info!(settings_loaded = ?settings.sqlite_path, msg = "Starting database builder");

    println!("Regex Database Builder");
    println!("======================\n");

    println!("Pass 1: merge model responses");
    let summary = merge::build_merged_file(
        &settings.responses_path,
        &settings.solver_db_path,
        &settings.merged_path,
    )?;
    println!(
        "  -> {} records ({} responses merged, {} null defaults) written to {:?}\n",
        summary.written, summary.merged, summary.defaults_added, settings.merged_path
    );

    println!("Pass 2: load SQLite");
    println!("Database: {:?}", settings.sqlite_path);
    let conn = store::connect(&settings.sqlite_path)?;
    store::create_tables(&conn)?;
    let n = store::load_merged(&conn, &settings.merged_path)?;
    println!("  -> {} rows (table now has {})\n", n, store::count_rows(&conn)?);

    println!("Done.");
    Ok(())
}
