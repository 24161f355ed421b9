use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use utils::{clean_iban, split_details, ParseError, RawTransaction, IBAN_RE};

pub const PARSER_NAME: &str = "swedbank_pdf";

lazy_static! {
    /// Strict transaction boundary: extracted PDF text has no reliable line
    /// structure, so every `YYYY-MM-DD` occurrence is treated as the start
    /// of a transaction block.
    static ref DATE_RE: Regex = Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap();

    /// Amount-shaped token: optional sign (including Unicode minus), digit
    /// run with optional internal whitespace (thousands separators or OCR
    /// gaps), decimal separator, exactly two decimals. Neighbouring
    /// digit/separator characters are rejected separately, since the regex
    /// crate has no lookaround.
    static ref AMOUNT_RE: Regex = Regex::new(r"([+−-]?)(\d[\d\s\u{A0}]*)[.,](\d{2})").unwrap();
}

/// Parse a PDF statement: extract the text of all pages into one stream
/// and segment it on date anchors.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>, ParseError> {
    let path = path.as_ref();
    let stream = pdf_extract::extract_text(path)
        .map_err(|e| ParseError::Unreadable(format!("{}: {}", path.display(), e)))?;
    parse_text(&stream)
}

/// Pure core over already-extracted text. Fatal only when the whole stream
/// contains no date anchor; blocks that fail field extraction are dropped.
pub fn parse_text(stream: &str) -> Result<Vec<RawTransaction>, ParseError> {
    let anchors = date_anchors(stream);
    if anchors.is_empty() {
        return Err(ParseError::NoDateAnchors);
    }

    let mut transactions = Vec::new();
    for (i, anchor) in anchors.iter().enumerate() {
        let block_end = anchors
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(stream.len());
        let date = &stream[anchor.clone()];
        let block = stream[anchor.end..block_end].trim();
        if let Some(tx) = parse_block(date, block) {
            transactions.push(tx);
        }
    }

    Ok(transactions)
}

/// Every strict date match whose neighbours are not digits (an ID number
/// containing a date-shaped run must not split a block).
fn date_anchors(stream: &str) -> Vec<Range<usize>> {
    DATE_RE
        .find_iter(stream)
        .filter(|m| {
            let before = stream[..m.start()].chars().last();
            let after = stream[m.end()..].chars().next();
            !matches!(before, Some(c) if c.is_ascii_digit())
                && !matches!(after, Some(c) if c.is_ascii_digit())
        })
        .map(|m| m.range())
        .collect()
}

/// First amount-shaped token with clean boundaries, parsed. The sign and
/// internal whitespace are normalized away before the float parse.
fn first_amount(text: &str) -> Option<(Range<usize>, f64)> {
    for caps in AMOUNT_RE.captures_iter(text) {
        let whole = caps.get(0)?;
        let before = text[..whole.start()].chars().last();
        let after = text[whole.end()..].chars().next();
        if matches!(before, Some(c) if c.is_ascii_digit() || c == '.' || c == ',') {
            continue;
        }
        if matches!(after, Some(c) if c.is_ascii_digit() || c == '.' || c == ',') {
            continue;
        }

        let sign = match caps.get(1).map(|m| m.as_str()) {
            Some("−") | Some("-") => "-",
            _ => "",
        };
        let integer: String = caps[2].chars().filter(|c| c.is_ascii_digit()).collect();
        let value = format!("{}{}.{}", sign, integer, &caps[3]).parse::<f64>().ok()?;
        return Some((whole.range(), value));
    }
    None
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Recover amount, IBAN, name and comment from one block. Returns None for
/// blocks that are not transactions (no amount) and for debit entries (the
/// PDF export keeps the sign).
fn parse_block(date: &str, text: &str) -> Option<RawTransaction> {
    let (amt_range, amount) = first_amount(text)?;
    if amount < 0.0 {
        return None;
    }

    let mut final_name = String::new();
    let mut final_comment = String::new();
    let mut iban = String::new();

    if let Some(m) = IBAN_RE.find(text) {
        iban = clean_iban(m.as_str());

        // Text before the IBAN is the tentative name, with the amount token
        // masked out when it falls in that span.
        let pre = if amt_range.start < m.start() {
            format!(
                "{} {}",
                &text[..amt_range.start],
                &text[amt_range.end.min(m.start())..m.start()]
            )
        } else {
            text[..m.start()].to_string()
        };
        final_name = collapse(&pre);

        // Text after the IBAN is the tentative comment.
        let post = if amt_range.start > m.end() {
            format!("{} {}", &text[m.end()..amt_range.start], &text[amt_range.end..])
        } else {
            text[m.end()..].to_string()
        };
        final_comment = collapse(&post);

        // Some exports place the name after the account number. When the
        // pre-IBAN span was empty, re-run the split over the remainder and
        // adopt its name/comment if a name comes back.
        if final_name.is_empty() && !final_comment.is_empty() {
            let (extracted_name, _, extracted_comment) = split_details(&final_comment);
            if !extracted_name.is_empty() {
                final_name = extracted_name;
                final_comment = extracted_comment;
            }
        }
    } else {
        // No IBAN anywhere in the block: mask the amount and approximate a
        // name/comment split from what is left.
        let masked = format!("{} {}", &text[..amt_range.start], &text[amt_range.end..]);
        let (name, _, comment) = split_details(&collapse(&masked));
        final_name = name;
        final_comment = comment;
    }

    let payer = if final_name.is_empty() {
        "Statement Entry".to_string()
    } else {
        final_name
    };

    Some(RawTransaction {
        date: date.to_string(),
        payer,
        details: final_comment,
        amount,
        iban,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_with_debit_entry_dropped() {
        let stream = "2025-11-13 +98.00 ALEŠKEVIČIENĖ\nGRETA LT237044060007980165 užsak.nr3279\n2025-11-01 -10.00 OUTGOING SKIPPED";
        let txns = parse_text(stream).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].date, "2025-11-13");
        assert_eq!(txns[0].amount, 98.0);
        assert_eq!(txns[0].iban, "LT237044060007980165");
        assert!(txns[0].payer.contains("ALEŠKEVIČIENĖ"));
        assert!(txns[0].payer.contains("GRETA"));
        assert!(txns[0].details.contains("užsak.nr3279"));
    }

    #[test]
    fn test_name_after_iban_fallback() {
        let stream = "2025-11-13 +45.50 LT237044060007980165 PETRAITIS JONAS uz mokslus";
        let txns = parse_text(stream).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].payer, "PETRAITIS JONAS");
        assert!(txns[0].details.contains("uz mokslus"));
        assert_eq!(txns[0].iban, "LT237044060007980165");
    }

    #[test]
    fn test_block_without_amount_dropped() {
        let stream = "2025-11-13 tarpinė eilutė be sumos\n2025-11-14 +12.00 JONAS JONAITIS pavedimas";
        let txns = parse_text(stream).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].date, "2025-11-14");
        assert_eq!(txns[0].payer, "JONAS JONAITIS");
    }

    #[test]
    fn test_no_iban_uses_two_token_split() {
        let stream = "2025-11-13 +5.00 ONA PETRAITIENE dovana vaikams";
        let txns = parse_text(stream).unwrap();
        assert_eq!(txns[0].payer, "ONA PETRAITIENE");
        assert_eq!(txns[0].details, "dovana vaikams");
        assert_eq!(txns[0].iban, "");
    }

    #[test]
    fn test_amount_with_internal_spaces() {
        let stream = "2025-11-13 +1 234.56 JONAS JONAITIS pavedimas";
        let txns = parse_text(stream).unwrap();
        assert_eq!(txns[0].amount, 1234.56);
    }

    #[test]
    fn test_unicode_minus_is_a_debit() {
        let stream = "2025-11-13 −10.00 JONAS JONAITIS\n2025-11-14 +2.00 ONA PETRAITIENE x";
        let txns = parse_text(stream).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].date, "2025-11-14");
    }

    #[test]
    fn test_empty_name_defaults_to_placeholder() {
        let stream = "2025-11-13 +3.00";
        let txns = parse_text(stream).unwrap();
        assert_eq!(txns[0].payer, "Statement Entry");
        assert_eq!(txns[0].details, "");
    }

    #[test]
    fn test_date_inside_digit_run_is_not_an_anchor() {
        let stream = "sutarties nr 92025-11-139 be datos";
        match parse_text(stream) {
            Err(ParseError::NoDateAnchors) => {}
            other => panic!("expected NoDateAnchors, got {:?}", other),
        }
    }

    #[test]
    fn test_no_anchors_is_fatal() {
        match parse_text("jokios datos čia nėra") {
            Err(ParseError::NoDateAnchors) => {}
            other => panic!("expected NoDateAnchors, got {:?}", other),
        }
    }
}
