use thiserror::Error;

/// Fatal, file-level parsing failures. These abort the whole parse call;
/// no partial transaction list is returned.
///
/// Row-level problems (unparsable amount, missing date, empty row) are not
/// errors: the extractors skip those rows internally and keep going.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Extension not handled by any extractor; raised before any read.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file could not be opened or decoded at all.
    #[error("could not read statement: {0}")]
    Unreadable(String),

    /// Spreadsheet header scan exhausted without finding the anchor column.
    #[error("could not find the header row looking for '{0}'")]
    HeaderNotFound(String),

    /// Spreadsheet is missing required columns; the message names them.
    #[error("missing required columns: {0}")]
    MissingColumns(String),

    /// camt.053 document with zero entry elements.
    #[error("no entries found in XML statement; namespace might be mismatched")]
    NoEntries,

    /// PDF text with zero YYYY-MM-DD anchors anywhere.
    #[error("no dates found in PDF text; unknown statement format")]
    NoDateAnchors,
}
