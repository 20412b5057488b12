//! Parser for IES LM-63 photometric files.
//!
//! The format is plain text:
//! ```text
//! IESNA:LM-63-2002            <- version tag
//! [KEYWORD] value             <- any number of keyword lines
//! TILT=NONE                   <- TILT=INCLUDE is followed by four tilt lines
//! <13 header numbers>
//! <vertical angles> <horizontal angles> <candela values>
//! ```
//! Everything after the tilt section is a single whitespace-separated number
//! stream; original line breaks carry no meaning.

mod ies;

use std::path::Path;

use thiserror::Error;

use crate::diagnostics::Checked;
use crate::types::{GridError, LampRecord};

pub use ies::{parse, parse_with_source};

/// Errors during photometric file parsing. All of them are fatal.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("No TILT= line found; the file has no photometric data section")]
    MissingTilt,

    #[error("Header needs 13 numeric values but only {found} remain")]
    HeaderTruncated { found: usize },

    #[error("Header field '{field}' at line {line}: '{token}' is not a valid {expected}")]
    InvalidHeaderField {
        field: &'static str,
        line: usize,
        token: String,
        expected: &'static str,
    },

    #[error("Data truncated in {section}: expected {expected} values, found {found}")]
    Truncated {
        section: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Parse error at line {line}: invalid number '{token}' in {section}")]
    InvalidNumber {
        section: &'static str,
        line: usize,
        token: String,
    },

    #[error("Invalid angle grid: {0}")]
    Shape(#[from] GridError),
}

/// Read and parse an `.ies` file from disk.
///
/// The path is kept as the record's source identifier.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Checked<LampRecord>, ParseError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if extension.as_deref() != Some("ies") {
        return Err(ParseError::UnsupportedFormat(format!(
            "file must be .ies, got '{}'",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    parse_with_source(&content, path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_rejects_other_extensions() {
        let err = parse_file("luminaire.ldt").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("luminaire.ldt"));
    }

    #[test]
    fn test_parse_file_reports_missing_file() {
        let err = parse_file("/nonexistent/candela/fixture.IES").unwrap_err();
        assert!(matches!(err, ParseError::IoError(_)));
    }
}
