pub mod database;
pub mod errors;
pub mod text;
pub mod transactions;

// Re-export commonly used items
pub use crate::database::{ensure_database_exists, read_database, write_database};
pub use crate::errors::ParseError;
pub use crate::text::{clean_iban, normalize, parse_amount, split_details, IBAN_RE};
pub use crate::transactions::{
    fingerprint, find_duplicate_keys, merge_transactions_with_deduplication,
    sort_transactions_by_date, MergeStats, RawTransaction, Transaction,
};
