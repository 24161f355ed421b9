use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// IBAN anchor: literal `LT` followed by 16..20 digits. Whitespace is
    /// tolerated between digits so that line-wrapped or OCR-damaged account
    /// numbers still match; short or mistyped rows match too.
    pub static ref IBAN_RE: Regex = Regex::new(r"(?i)LT\s*\d(?:\s*\d){15,19}").unwrap();
}

/// Case- and accent-insensitive canonical form used for name comparison:
/// lowercase, NFD-decompose, drop combining marks, collapse whitespace runs.
/// Total and idempotent; empty input yields an empty string.
pub fn normalize(s: &str) -> String {
    let stripped: String = s
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalize a matched IBAN span: uppercase two-letter prefix plus the
/// concatenated digits, inner spaces removed.
pub fn clean_iban(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let letters: String = raw
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_uppercase();
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let prefix: String = if letters.starts_with("LT") {
        "LT".to_string()
    } else {
        letters.chars().take(2).collect()
    };
    format!("{}{}", prefix, digits)
}

/// Split a raw `Name ... LT######## ... Comment` blob into
/// `(name, iban, comment)`. Survives weird spacing, newlines and partial
/// IBANs; never fails, empty input yields three empty strings.
///
/// Without an IBAN anchor the first two whitespace tokens are taken as the
/// name (first + last) and the rest becomes the comment.
pub fn split_details(details_raw: &str) -> (String, String, String) {
    if details_raw.is_empty() {
        return (String::new(), String::new(), String::new());
    }
    if let Some(m) = IBAN_RE.find(details_raw) {
        // Slice by match indices to avoid spacing mismatches
        let name = details_raw[..m.start()]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let comment = details_raw[m.end()..]
            .trim_matches(|c: char| matches!(c, ' ' | '\t' | '-' | ',' | ':' | ';'))
            .to_string();
        (name, clean_iban(m.as_str()), comment)
    } else {
        let parts: Vec<&str> = details_raw.split_whitespace().collect();
        let name = parts.iter().take(2).copied().collect::<Vec<_>>().join(" ");
        let comment = details_raw
            .get(name.len()..)
            .map(|rest| rest.trim().to_string())
            .unwrap_or_default();
        (name, String::new(), comment)
    }
}

/// Lenient statement-amount parser shared by the extractors. Tolerates a
/// leading `+`, currency markers, regular and non-breaking spaces as
/// thousands separators, the Unicode minus sign, and the European
/// comma-as-decimal convention (`1.234,56`). Returns `None` on anything
/// unparsable; callers treat that as a row to skip, not an error.
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "-" || s == "--" {
        return None;
    }
    let mut cleaned = s
        .replace('€', "")
        .replace("EUR", "")
        .replace('+', "")
        .replace(' ', "")
        .replace('\u{a0}', "")
        .replace('−', "-");
    if cleaned.contains(',') {
        // Dots are thousands separators whenever a decimal comma is present
        cleaned = cleaned.replace('.', "").replace(',', ".");
    }
    cleaned.parse::<f64>().ok()
}
