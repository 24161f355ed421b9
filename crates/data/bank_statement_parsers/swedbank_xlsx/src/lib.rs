use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use utils::{parse_amount, ParseError, RawTransaction};

pub const PARSER_NAME: &str = "swedbank_xlsx";

/// Swedbank LT export column names. The header row is located by scanning
/// for the date column, since exports carry a variable number of title and
/// metadata rows above the table.
const COL_DATE: &str = "Data";
const COL_PAYER: &str = "Gavėjas/Mokėtojas";
const COL_DETAILS: &str = "Paaiškinimai";
const COL_AMOUNT: &str = "Apyvarta";

/// Alternate account-number columns, checked in order. A value shorter than
/// a plausible IBAN is ignored and left for the details-based fallback.
const IBAN_COLUMNS: &[&str] = &["Sąskaita", "Mokėtojo sąskaita", "IBAN"];

/// Parse a Swedbank Excel statement and return the incoming transactions.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>, ParseError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ParseError::Unreadable(format!("{}: {}", path.display(), e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::Unreadable(format!("{}: no sheets found", path.display())))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::Unreadable(format!("{}: {}", path.display(), e)))?;

    let rows: Vec<_> = range.rows().collect();
    parse_rows(&rows)
}

/// Core of the extractor, split out so tests can feed cell grids directly.
pub fn parse_rows(rows: &[&[Data]]) -> Result<Vec<RawTransaction>, ParseError> {
    let header_row_idx = rows
        .iter()
        .position(|row| row.iter().any(|cell| cell_text(cell).trim() == COL_DATE))
        .ok_or_else(|| ParseError::HeaderNotFound(COL_DATE.to_string()))?;

    // Promote the row to headers; trimming defends against embedded
    // newlines in spreadsheet header cells.
    let mut columns: HashMap<String, usize> = HashMap::new();
    for (idx, cell) in rows[header_row_idx].iter().enumerate() {
        let name = cell_text(cell).trim().to_string();
        if !name.is_empty() {
            columns.entry(name).or_insert(idx);
        }
    }

    validate_columns(&columns)?;

    let mut transactions = Vec::new();
    for row in rows.iter().skip(header_row_idx + 1) {
        // An all-empty row marks the end of the table
        if row.iter().all(is_blank) {
            break;
        }
        if let Some(tx) = process_row(row, &columns) {
            transactions.push(tx);
        }
    }

    Ok(transactions)
}

fn validate_columns(columns: &HashMap<String, usize>) -> Result<(), ParseError> {
    let mut missing: Vec<&str> = [COL_DATE, COL_PAYER, COL_DETAILS, COL_AMOUNT]
        .into_iter()
        .filter(|col| !columns.contains_key(*col))
        .collect();
    if !IBAN_COLUMNS.iter().any(|col| columns.contains_key(*col)) {
        missing.push(IBAN_COLUMNS[0]);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParseError::MissingColumns(missing.join(", ")))
    }
}

/// One data row to one transaction. Returns None for rows to skip: debit
/// rows, unparsable amounts, rows without a date.
fn process_row(row: &[Data], columns: &HashMap<String, usize>) -> Option<RawTransaction> {
    let amount = amount_cell_value(cell_at(row, columns, COL_AMOUNT)?)?;
    if amount < 0.0 {
        return None;
    }

    let date = date_cell_text(cell_at(row, columns, COL_DATE)?);
    if date.is_empty() {
        return None;
    }

    let payer = cell_at(row, columns, COL_PAYER)
        .map(|c| cell_text(c).trim().to_string())
        .unwrap_or_default();
    let details = cell_at(row, columns, COL_DETAILS)
        .map(|c| cell_text(c).trim().to_string())
        .unwrap_or_default();

    let mut iban = String::new();
    for col in IBAN_COLUMNS {
        if let Some(&idx) = columns.get(*col) {
            if let Some(cell) = row.get(idx) {
                let val = cell_text(cell).trim().to_string();
                if val.len() > 10 {
                    iban = val;
                    break;
                }
            }
        }
    }

    Some(RawTransaction {
        date,
        payer,
        details,
        amount,
        iban,
    })
}

fn cell_at<'a>(row: &'a [Data], columns: &HashMap<String, usize>, col: &str) -> Option<&'a Data> {
    row.get(*columns.get(col)?)
}

fn is_blank(cell: &Data) -> bool {
    matches!(cell, Data::Empty) || cell_text(cell).trim().is_empty()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Render a date cell to a string. Excel serial dates become ISO
/// `YYYY-MM-DD`; text dates pass through untouched, in whatever vendor
/// format the export used.
fn date_cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => serial_to_iso(dt.as_f64()).unwrap_or_default(),
        Data::Float(f) => serial_to_iso(*f).unwrap_or_else(|| f.to_string()),
        Data::Int(i) => serial_to_iso(*i as f64).unwrap_or_else(|| i.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        other => cell_text(other).trim().to_string(),
    }
}

/// Excel serial dates count days since 1899-12-30.
fn serial_to_iso(serial: f64) -> Option<String> {
    if !(1.0..100_000.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(chrono::Duration::days(serial.floor() as i64))?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn amount_cell_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_amount(s),
        _ => None,
    }
}
