use anyhow::{Context, Result};
use std::env;

const STATEMENT_EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".xml", ".pdf"];

fn main() -> Result<()> {
    // Usage:
    //   general_parser <statement files ...> [database_path]
    //
    // Statement files are recognised by extension (.xlsx/.xls/.xml/.pdf);
    // the remaining argument, if any, is the database directory or
    // database.json path.
    //
    // Default database_path: ./database

    let args: Vec<String> = env::args().skip(1).collect();

    let mut statement_files: Vec<String> = Vec::new();
    let mut other_args: Vec<String> = Vec::new();
    for arg in &args {
        let lower = arg.to_lowercase();
        if STATEMENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            statement_files.push(arg.clone());
        } else {
            other_args.push(arg.clone());
        }
    }

    if statement_files.is_empty() {
        println!("❌ No statement files given.");
        println!("   Usage: general_parser <statement.xlsx|.xls|.xml|.pdf ...> [database_path]");
        return Ok(());
    }

    let database_path = other_args.first().map(|s| s.as_str()).unwrap_or("./database");

    println!("📖 Importing {} statement file(s)", statement_files.len());

    let mut all_txns = Vec::new();
    for file in &statement_files {
        println!("  • Processing: {}", file);
        let txns = general_parser::import_file(file)
            .with_context(|| format!("Failed parsing {}", file))?;
        println!("    → {} incoming transaction(s)", txns.len());
        all_txns.extend(txns);
    }

    if all_txns.is_empty() {
        println!("❌ No incoming transactions found.");
        return Ok(());
    }

    println!("📖 Reading database from: {}", database_path);
    let template = utils::read_database(database_path)?;

    let (mut merged, stats) = utils::merge_transactions_with_deduplication(template, all_txns)?;
    utils::sort_transactions_by_date(&mut merged)?;

    let written = utils::write_database(database_path, &merged)?;

    println!("\n📊 Summary:");
    println!("─────────────────────────────────────────");
    println!(
        "✓ Transactions: {} new, {} duplicates skipped",
        stats.added, stats.skipped
    );
    println!(
        "✓ Total transactions in database: {}",
        merged
            .get("transactions")
            .and_then(|t| t.as_array())
            .map(|a| a.len())
            .unwrap_or(0)
    );
    println!("─────────────────────────────────────────");
    println!("✅ Database written to: {}", written.display());

    Ok(())
}
