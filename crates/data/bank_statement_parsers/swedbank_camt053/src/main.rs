use anyhow::{Context, Result};
use std::env;

fn main() -> Result<()> {
    // Usage:
    //   swedbank_camt053 <statement.xml> [statement2.xml ...]
    //
    // Prints the credit entries extracted from each camt.053 statement.

    let files: Vec<String> = env::args().skip(1).collect();
    if files.is_empty() {
        println!("❌ No input files. Usage: swedbank_camt053 <statement.xml> [...]");
        return Ok(());
    }

    for file in &files {
        println!("📖 Parsing: {}", file);
        let transactions =
            camt053::parse_file(file).with_context(|| format!("Failed parsing {}", file))?;
        println!("  → {} credit entr(ies)", transactions.len());
        for txn in &transactions {
            println!(
                "  {}  {:>10.2}  {}  {}",
                txn.date, txn.amount, txn.payer, txn.details
            );
        }
    }

    Ok(())
}
