use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use utils::{split_details, ParseError, RawTransaction};

pub const PARSER_NAME: &str = "swedbank_camt053";

/// Statement schema this parser targets. Elements are matched by local name
/// so prefixed documents and minor-version namespace URIs parse the same.
pub const CAMT053_NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:camt.053.001.02";

/// Parse an ISO 20022 camt.053 statement file, keeping only credit
/// (incoming) entries.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>, ParseError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)
        .map_err(|e| ParseError::Unreadable(format!("{}: {}", path.display(), e)))?;
    parse_str(&xml)
}

/// Walk the document's `Ntry` elements with an event reader. A document
/// with zero entries is fatal (wrong schema, most likely); individual
/// entries missing a date or amount are skipped.
pub fn parse_str(xml: &str) -> Result<Vec<RawTransaction>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut entries = Vec::new();
    let mut entry_count = 0usize;
    let mut current: Option<EntryBuilder> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref());
                if name == "Ntry" {
                    entry_count += 1;
                    current = Some(EntryBuilder::default());
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                if path.last().map(String::as_str) == Some("Ntry") {
                    if let Some(builder) = current.take() {
                        if let Some(tx) = builder.finish() {
                            entries.push(tx);
                        }
                    }
                }
                path.pop();
            }
            Ok(Event::Text(t)) => {
                if let Some(builder) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map(|cow| cow.into_owned())
                        .unwrap_or_default();
                    builder.accept(&path, text.trim());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::Unreadable(format!("malformed XML: {}", e))),
        }
        buf.clear();
    }

    if entry_count == 0 {
        return Err(ParseError::NoEntries);
    }

    Ok(entries)
}

fn local_name(qname: &[u8]) -> String {
    let local = qname
        .rsplit(|b| *b == b':')
        .next()
        .unwrap_or(qname);
    String::from_utf8_lossy(local).into_owned()
}

fn path_ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

/// Accumulates the fields of one `Ntry` as text events arrive.
#[derive(Default)]
struct EntryBuilder {
    date: Option<String>,
    amount: Option<f64>,
    indicator: Option<String>,
    payer: Option<String>,
    iban: Option<String>,
    ustrd: Vec<String>,
    refs: Vec<String>,
}

impl EntryBuilder {
    fn accept(&mut self, path: &[String], text: &str) {
        if text.is_empty() {
            return;
        }
        if path_ends_with(path, &["Ntry", "BookgDt", "Dt"]) && self.date.is_none() {
            self.date = Some(text.to_string());
        } else if path_ends_with(path, &["Ntry", "Amt"]) && self.amount.is_none() {
            self.amount = text.parse::<f64>().ok();
        } else if path_ends_with(path, &["Ntry", "CdtDbtInd"]) && self.indicator.is_none() {
            self.indicator = Some(text.to_string());
        } else if path_ends_with(path, &["RltdPties", "Dbtr", "Nm"]) && self.payer.is_none() {
            self.payer = Some(text.to_string());
        } else if path_ends_with(path, &["RltdPties", "DbtrAcct", "Id", "IBAN"])
            && self.iban.is_none()
        {
            self.iban = Some(text.to_string());
        } else if path_ends_with(path, &["RmtInf", "Ustrd"]) {
            self.ustrd.push(text.to_string());
        } else if path_ends_with(path, &["Strd", "CdtrRefInf", "Ref"]) {
            self.refs.push(text.to_string());
        }
    }

    /// Finalize the entry. Debit entries are discarded here: the camt.053
    /// amount field is unsigned, so `CdtDbtInd` is the authoritative filter.
    fn finish(self) -> Option<RawTransaction> {
        let date = self.date?;
        let amount = self.amount?;
        let indicator = self.indicator?;
        if indicator.to_uppercase() == "DBIT" {
            return None;
        }

        // A single entry may carry several free-text fragments; structured
        // creditor references are only consulted when there are none.
        let details = if !self.ustrd.is_empty() {
            self.ustrd.join(" ")
        } else {
            self.refs.join(" ")
        };

        let mut iban = self.iban.unwrap_or_default();
        if iban.is_empty() && !details.is_empty() {
            let (_, found_iban, _) = split_details(&details);
            iban = found_iban;
        }

        let payer = match self.payer {
            Some(p) if !p.trim().is_empty() => p,
            _ => "Unknown".to_string(),
        };

        Some(RawTransaction {
            date,
            payer,
            details,
            amount: amount.abs(),
            iban,
        })
    }
}
