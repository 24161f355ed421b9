use anyhow::{Context, Result};
use std::env;

fn main() -> Result<()> {
    // Usage:
    //   swedbank_xlsx <statement.xlsx> [statement2.xlsx ...]
    //
    // Parses each Swedbank Excel export and prints the extracted incoming
    // transactions as JSON.

    let files: Vec<String> = env::args().skip(1).collect();
    if files.is_empty() {
        println!("❌ No input files. Usage: swedbank_xlsx <statement.xlsx> [...]");
        return Ok(());
    }

    for file in &files {
        println!("📖 Parsing: {}", file);
        let transactions =
            swedbank_xlsx::parse_file(file).with_context(|| format!("Failed parsing {}", file))?;
        println!("  → {} incoming transaction(s)", transactions.len());
        println!("{}", serde_json::to_string_pretty(&transactions)?);
    }

    Ok(())
}
