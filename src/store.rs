use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

use crate::record::RegexRecord;

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    Ok(conn)
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS regex_data (
            id INTEGER PRIMARY KEY,
            regex TEXT,
            positive_inputs TEXT,  -- JSON array
            negative_inputs TEXT,  -- JSON array
            file_path TEXT,
            RFixer_Solution TEXT,
            GPT_response TEXT
        );
        "#,
    )?;
    Ok(())
}

/// Insert every record of the merged NDJSON file.
///
/// Plain inserts inside one transaction: a malformed line or a duplicate
/// identifier aborts the load and nothing from this file is kept.
pub fn load_merged(conn: &Connection, merged_path: &Path) -> Result<usize> {
    let file =
        File::open(merged_path).with_context(|| format!("Failed to open {:?}", merged_path))?;

    let tx = conn.unchecked_transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO regex_data (
                id, regex, positive_inputs, negative_inputs,
                file_path, RFixer_Solution, GPT_response
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )?;

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: RegexRecord = serde_json::from_str(&line)
                .with_context(|| format!("Bad record on line {} of {:?}", idx + 1, merged_path))?;
            insert_record(&mut stmt, &record)
                .with_context(|| format!("Failed to insert id {} (line {})", record.id, idx + 1))?;
            inserted += 1;
        }
    }
    tx.commit()?;

    info!(inserted, "Loaded regex_data");
    Ok(inserted)
}

fn insert_record(stmt: &mut rusqlite::Statement<'_>, record: &RegexRecord) -> Result<()> {
    let positive = serde_json::to_string(&record.positive_inputs)?;
    let negative = serde_json::to_string(&record.negative_inputs)?;
    stmt.execute(params![
        record.id,
        record.regex,
        positive,
        negative,
        record.file_path,
        record.solver_solution,
        record.model_solution
    ])?;
    Ok(())
}

pub fn count_rows(conn: &Connection) -> Result<i64> {
    let n = conn.query_row("SELECT COUNT(*) FROM regex_data", [], |r| r.get(0))?;
    Ok(n)
}
