use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// One incoming-payment row as produced by an extractor, before
/// fingerprinting. `date` is extractor-local (ISO for XML/PDF, vendor
/// string for spreadsheets) and not yet validated as a calendar date.
/// Emitted rows always have `amount >= 0` and a non-empty `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: String,
    pub payer: String,
    pub details: String,
    pub amount: f64,
    pub iban: String,
}

/// A fingerprinted transaction, ready for the persistence layer. The `key`
/// is the deduplication contract: two rows with identical date, payer,
/// details and 2-decimal amount collapse to the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub key: String,
    pub date: String,
    pub payer: String,
    pub details: String,
    pub amount: f64,
    pub iban: String,
}

impl Transaction {
    pub fn from_raw(raw: RawTransaction) -> Self {
        let key = fingerprint(&raw.date, &raw.payer, &raw.details, raw.amount);
        Self {
            key,
            date: raw.date,
            payer: raw.payer,
            details: raw.details,
            amount: raw.amount,
            iban: raw.iban,
        }
    }
}

/// Stable content key over the defining fields of a transaction. The amount
/// is canonicalized to two decimals before hashing, so float noise below a
/// cent never splits duplicates. SHA-256 truncated to 12 bytes (24 hex
/// chars) is plenty for human-scale statement volumes.
pub fn fingerprint(date: &str, payer: &str, details: &str, amount: f64) -> String {
    let canonical = format!(
        "{}|{}|{}|{:.2}",
        date.trim(),
        payer.trim(),
        details.trim(),
        amount
    );
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..12])
}

/// Statistics about a transaction merge operation
#[derive(Debug, Clone)]
pub struct MergeStats {
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
}

impl MergeStats {
    pub fn has_duplicates(&self) -> bool {
        self.skipped > 0
    }
}

/// Merges freshly imported transactions into an existing database.json
/// Value with duplicate detection. Rows whose `key` is already present are
/// skipped, everything else is appended.
pub fn merge_transactions_with_deduplication(
    mut template: Value,
    new_txns: Vec<Transaction>,
) -> Result<(Value, MergeStats)> {
    let arr = template
        .get_mut("transactions")
        .and_then(|v| v.as_array_mut())
        .ok_or_else(|| anyhow!("database.json missing 'transactions' array"))?;

    let existing_keys: HashSet<String> = arr
        .iter()
        .filter_map(|txn| {
            txn.get("key")
                .and_then(|k| k.as_str())
                .map(|s| s.to_string())
        })
        .collect();

    let mut stats = MergeStats {
        added: 0,
        skipped: 0,
        total: new_txns.len(),
    };

    for txn in new_txns {
        if existing_keys.contains(&txn.key) {
            stats.skipped += 1;
        } else {
            arr.push(serde_json::to_value(&txn)?);
            stats.added += 1;
        }
    }

    Ok((template, stats))
}

/// Sort transactions in-place by `date` ascending.
///
/// Sorting is stable. Transactions with missing/non-string `date` are placed
/// at the end, preserving their relative order.
pub fn sort_transactions_by_date(database: &mut Value) -> Result<()> {
    let arr = database
        .get_mut("transactions")
        .and_then(|v| v.as_array_mut())
        .ok_or_else(|| anyhow!("database.json missing 'transactions' array"))?;

    arr.sort_by(|a, b| {
        let da = a.get("date").and_then(|v| v.as_str());
        let db = b.get("date").and_then(|v| v.as_str());

        match (da, db) {
            (Some(left), Some(right)) => left.cmp(right),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });

    Ok(())
}

/// Returns the subset of `keys` that already exist in the database, useful
/// for reporting which imports were duplicates.
pub fn find_duplicate_keys(database: &Value, keys: &[String]) -> Result<Vec<String>> {
    let arr = database
        .get("transactions")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("database.json missing 'transactions' array"))?;

    let existing: HashSet<&str> = arr
        .iter()
        .filter_map(|txn| txn.get("key").and_then(|k| k.as_str()))
        .collect();

    Ok(keys
        .iter()
        .filter(|k| existing.contains(k.as_str()))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(date: &str, payer: &str, amount: f64) -> RawTransaction {
        RawTransaction {
            date: date.to_string(),
            payer: payer.to_string(),
            details: "uz paslaugas".to_string(),
            amount,
            iban: String::new(),
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint("2025-11-13", "Jonas Jonaitis", "užsak.123", 98.0);
        let b = fingerprint("2025-11-13", "Jonas Jonaitis", "užsak.123", 98.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 24);
    }

    #[test]
    fn test_fingerprint_rounds_amount_to_two_decimals() {
        let a = fingerprint("2025-11-13", "Jonas", "x", 10.005);
        let b = fingerprint("2025-11-13", "Jonas", "x", 10.0049999);
        let c = fingerprint("2025-11-13", "Jonas", "x", 10.01);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_distinguishes_fields() {
        let a = fingerprint("2025-11-13", "Jonas", "x", 10.0);
        assert_ne!(a, fingerprint("2025-11-14", "Jonas", "x", 10.0));
        assert_ne!(a, fingerprint("2025-11-13", "Ona", "x", 10.0));
        assert_ne!(a, fingerprint("2025-11-13", "Jonas", "y", 10.0));
    }

    #[test]
    fn test_from_raw_sets_key() {
        let txn = Transaction::from_raw(raw("2025-11-13", "Jonas Jonaitis", 98.0));
        assert_eq!(
            txn.key,
            fingerprint("2025-11-13", "Jonas Jonaitis", "uz paslaugas", 98.0)
        );
        assert_eq!(txn.amount, 98.0);
    }

    #[test]
    fn test_merge_with_no_duplicates() {
        let database = json!({ "transactions": [] });
        let new_txns = vec![
            Transaction::from_raw(raw("2025-11-13", "Jonas", 98.0)),
            Transaction::from_raw(raw("2025-11-14", "Ona", 12.5)),
        ];

        let (merged, stats) =
            merge_transactions_with_deduplication(database, new_txns).unwrap();

        assert_eq!(stats.added, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.total, 2);
        assert!(!stats.has_duplicates());
        assert_eq!(merged["transactions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_skips_duplicate_keys() {
        let first = Transaction::from_raw(raw("2025-11-13", "Jonas", 98.0));
        let database = json!({ "transactions": [serde_json::to_value(&first).unwrap()] });

        let new_txns = vec![
            Transaction::from_raw(raw("2025-11-13", "Jonas", 98.0)), // duplicate
            Transaction::from_raw(raw("2025-11-14", "Ona", 12.5)),   // new
        ];

        let (merged, stats) =
            merge_transactions_with_deduplication(database, new_txns).unwrap();

        assert_eq!(stats.added, 1);
        assert_eq!(stats.skipped, 1);
        assert!(stats.has_duplicates());
        assert_eq!(merged["transactions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_requires_transactions_array() {
        let database = json!({});
        let result = merge_transactions_with_deduplication(database, Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_sort_transactions_by_date() {
        let mut database = json!({
            "transactions": [
                {"key": "A", "date": "2026-01-10"},
                {"key": "B", "date": "2025-12-01"},
                {"key": "C", "date": "2026-01-10"},
                {"key": "D"}
            ]
        });

        sort_transactions_by_date(&mut database).unwrap();

        let keys: Vec<&str> = database["transactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_find_duplicate_keys() {
        let database = json!({
            "transactions": [
                {"key": "K1"},
                {"key": "K2"}
            ]
        });

        let check = vec!["K1".to_string(), "K3".to_string(), "K2".to_string()];
        let duplicates = find_duplicate_keys(&database, &check).unwrap();

        assert_eq!(duplicates, vec!["K1".to_string(), "K2".to_string()]);
    }
}
