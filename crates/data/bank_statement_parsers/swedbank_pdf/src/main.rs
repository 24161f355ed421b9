use anyhow::{Context, Result};
use std::env;

fn main() -> Result<()> {
    // Usage:
    //   swedbank_pdf <statement.pdf> [statement2.pdf ...]
    //
    // Extracts each PDF's text and prints the recovered incoming
    // transactions as JSON.

    let files: Vec<String> = env::args().skip(1).collect();
    if files.is_empty() {
        println!("❌ No input files. Usage: swedbank_pdf <statement.pdf> [...]");
        return Ok(());
    }

    for file in &files {
        println!("📖 Parsing: {}", file);
        let transactions =
            swedbank_pdf::parse_file(file).with_context(|| format!("Failed parsing {}", file))?;
        println!("  → {} incoming transaction(s)", transactions.len());
        println!("{}", serde_json::to_string_pretty(&transactions)?);
    }

    Ok(())
}
