use std::path::Path;
use utils::{ParseError, RawTransaction, Transaction};

pub const PARSER_NAME: &str = "general_parser";

/// Merchant terminal settlement signature: these two fragments co-occur in
/// the details of Swedbank terminal payout rows, which are not customer
/// payments.
const TERMINAL_MARKER_A: &str = "PREKYB. ID";
const TERMINAL_MARKER_B: &str = "TERM. SK.";

/// Parse a statement file, selecting the extractor by extension. Unknown
/// extensions fail immediately, before any read. The shared post-filter
/// drops merchant terminal settlements regardless of which extractor
/// produced them.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>, ParseError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let transactions = match ext.as_str() {
        "xlsx" | "xls" => swedbank_xlsx::parse_file(path)?,
        "xml" => camt053::parse_file(path)?,
        "pdf" => swedbank_pdf::parse_file(path)?,
        _ => return Err(ParseError::UnsupportedFormat(format!(".{}", ext))),
    };

    Ok(transactions
        .into_iter()
        .filter(|t| !is_terminal_settlement(t))
        .collect())
}

/// Parse and fingerprint: the records handed to the persistence layer.
pub fn import_file<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>, ParseError> {
    Ok(parse_file(path)?
        .into_iter()
        .map(Transaction::from_raw)
        .collect())
}

pub fn is_terminal_settlement(transaction: &RawTransaction) -> bool {
    if transaction.details.is_empty() {
        return false;
    }
    let details = transaction.details.to_uppercase();
    details.contains(TERMINAL_MARKER_A) && details.contains(TERMINAL_MARKER_B)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(details: &str) -> RawTransaction {
        RawTransaction {
            date: "2025-11-13".to_string(),
            payer: "Jonas Jonaitis".to_string(),
            details: details.to_string(),
            amount: 98.0,
            iban: String::new(),
        }
    }

    #[test]
    fn test_unsupported_extension_fails_without_extraction() {
        // The path does not exist; dispatch must fail on the extension
        // alone, before any read is attempted.
        match parse_file("statement.docx") {
            Err(ParseError::UnsupportedFormat(ext)) => assert_eq!(ext, ".docx"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        // Reaches the PDF extractor, which then fails on the missing file
        // rather than on the extension.
        match parse_file("statement.PDF") {
            Err(ParseError::Unreadable(_)) => {}
            other => panic!("expected Unreadable, got {:?}", other),
        }
    }

    #[test]
    fn test_terminal_settlement_detected() {
        let tx = raw("Swedbank IMONE PREKYB. ID 123 TERM. SK. 456");
        assert!(is_terminal_settlement(&tx));
    }

    #[test]
    fn test_terminal_settlement_case_insensitive() {
        let tx = raw("prekyb. id 123 term. sk. 456");
        assert!(is_terminal_settlement(&tx));
    }

    #[test]
    fn test_single_marker_is_kept() {
        assert!(!is_terminal_settlement(&raw("PREKYB. ID 123")));
        assert!(!is_terminal_settlement(&raw("TERM. SK. 456")));
        assert!(!is_terminal_settlement(&raw("")));
        assert!(!is_terminal_settlement(&raw("užsak.123")));
    }
}
