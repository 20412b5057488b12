//! Positional reader for the IES keyword block and numeric body.

use std::str::FromStr;

use crate::diagnostics::{Checked, ValidationWarning};
use crate::symmetry::classify;
use crate::types::{AngleGrid, Header, LampRecord, PhotometricType, UnitsType};

use super::ParseError;

const VERSION_PREFIX: &str = "IES";
const TILT_PREFIX: &str = "TILT=";
const TILT_INCLUDE: &str = "INCLUDE";
/// Lamp-to-luminaire geometry, angle count, tilt angles, multiplying factors.
const TILT_INCLUDE_LINES: usize = 4;
const HEADER_FIELDS: usize = 13;
const DEFAULT_SOURCE: &str = "<memory>";

/// Parse IES text held in memory.
pub fn parse(content: &str) -> Result<Checked<LampRecord>, ParseError> {
    parse_with_source(content, DEFAULT_SOURCE)
}

/// Parse IES text, tagging the record with `source` (usually a path).
///
/// Returns the record plus every non-fatal warning raised along the way. The
/// same warnings are also kept on the record itself.
pub fn parse_with_source(
    content: &str,
    source: impl Into<String>,
) -> Result<Checked<LampRecord>, ParseError> {
    let source = source.into();
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.split('\n').map(str::trim).collect();

    let mut warnings = Vec::new();

    let first_line = lines.first().copied().unwrap_or_default();
    let version = if first_line.starts_with(VERSION_PREFIX) {
        Some(first_line.to_string())
    } else {
        let warning = ValidationWarning::MalformedVersion {
            first_line: first_line.to_string(),
        };
        log::warn!("{}: {}", source, warning);
        warnings.push(warning);
        None
    };

    let tilt_index = lines
        .iter()
        .position(|line| line.starts_with(TILT_PREFIX))
        .ok_or(ParseError::MissingTilt)?;
    let keywords: Vec<String> = lines[..=tilt_index].iter().map(|l| l.to_string()).collect();
    let (tilt_data, data_start) = read_tilt(&lines, tilt_index)?;

    let mut stream = TokenStream::new(&lines[data_start..], data_start);
    let header = read_header(&mut stream)?;

    let thetas = stream.take_numbers("vertical angles", header.num_vertical_angles)?;
    let phis = stream.take_numbers("horizontal angles", header.num_horizontal_angles)?;
    let num_values = header
        .num_vertical_angles
        .saturating_mul(header.num_horizontal_angles);
    let values = stream.take_numbers("candela values", num_values)?;

    if stream.remaining() > 0 {
        let warning = ValidationWarning::TrailingTokens {
            count: stream.remaining(),
        };
        log::warn!("{}: {}", source, warning);
        warnings.push(warning);
    }

    let original = AngleGrid::from_flat(thetas, phis, values)?;

    let (lamp_type, symmetry_warnings) = classify(&header, original.phis()).into_parts();
    warnings.extend(symmetry_warnings);

    log::debug!(
        "parsed {}: {} vertical x {} horizontal angles, lamp type {}, {} warning(s)",
        source,
        original.num_thetas(),
        original.num_phis(),
        lamp_type,
        warnings.len()
    );

    let record = LampRecord {
        source,
        version,
        keywords,
        tilt_data,
        header,
        original,
        full: None,
        interpolated: None,
        lamp_type,
        warnings: warnings.clone(),
    };
    Ok(Checked::with_warnings(record, warnings))
}

/// Returns the verbatim tilt lines and the index of the first numeric line.
fn read_tilt(lines: &[&str], tilt_index: usize) -> Result<(Vec<String>, usize), ParseError> {
    let setting = lines[tilt_index]
        .strip_prefix(TILT_PREFIX)
        .unwrap_or_default()
        .trim();
    // NONE, or the name of a separate tilt file.
    if setting != TILT_INCLUDE {
        return Ok((Vec::new(), tilt_index + 1));
    }

    let end = tilt_index + 1 + TILT_INCLUDE_LINES;
    if end > lines.len() {
        return Err(ParseError::Truncated {
            section: "tilt data",
            expected: TILT_INCLUDE_LINES,
            found: lines.len() - tilt_index - 1,
        });
    }
    let tilt_data = lines[tilt_index + 1..end].iter().map(|l| l.to_string()).collect();
    Ok((tilt_data, end))
}

fn read_header(stream: &mut TokenStream<'_>) -> Result<Header, ParseError> {
    let found = stream.remaining();
    if found < HEADER_FIELDS {
        return Err(ParseError::HeaderTruncated { found });
    }

    // Field order is positional and fixed by LM-63.
    Ok(Header {
        num_lamps: stream.header_int("num_lamps")?,
        lumens_per_lamp: stream.header_float("lumens_per_lamp")?,
        multiplier: stream.header_float("multiplier")?,
        num_vertical_angles: stream.header_int("num_vertical_angles")?,
        num_horizontal_angles: stream.header_int("num_horizontal_angles")?,
        photometric_type: PhotometricType::from_code(stream.header_int("photometric_type")?),
        units_type: UnitsType::from_code(stream.header_int("units_type")?),
        width: stream.header_float("width")?,
        length: stream.header_float("length")?,
        height: stream.header_float("height")?,
        ballast_factor: stream.header_float("ballast_factor")?,
        future_use: stream.header_float("future_use")?,
        input_watts: stream.header_float("input_watts")?,
    })
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

struct Token<'a> {
    text: &'a str,
    /// 1-based line number in the source text.
    line: usize,
}

struct TokenStream<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    fn new(lines: &[&'a str], first_line_index: usize) -> Self {
        let tokens = lines
            .iter()
            .enumerate()
            .flat_map(|(offset, line)| {
                line.split_whitespace().map(move |text| Token {
                    text,
                    line: first_line_index + offset + 1,
                })
            })
            .collect();
        Self { tokens, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    fn next_token(&mut self) -> Result<&Token<'a>, ParseError> {
        let found = self.remaining();
        let token = self
            .tokens
            .get(self.pos)
            .ok_or(ParseError::HeaderTruncated { found })?;
        self.pos += 1;
        Ok(token)
    }

    fn header_int<T: FromStr>(&mut self, field: &'static str) -> Result<T, ParseError> {
        let token = self.next_token()?;
        token.text.parse().map_err(|_| ParseError::InvalidHeaderField {
            field,
            line: token.line,
            token: token.text.to_string(),
            expected: "integer",
        })
    }

    fn header_float(&mut self, field: &'static str) -> Result<f64, ParseError> {
        let token = self.next_token()?;
        parse_finite(token.text).ok_or_else(|| ParseError::InvalidHeaderField {
            field,
            line: token.line,
            token: token.text.to_string(),
            expected: "number",
        })
    }

    fn take_numbers(
        &mut self,
        section: &'static str,
        count: usize,
    ) -> Result<Vec<f64>, ParseError> {
        let found = self.remaining();
        if found < count {
            return Err(ParseError::Truncated {
                section,
                expected: count,
                found,
            });
        }

        let numbers = self.tokens[self.pos..self.pos + count]
            .iter()
            .map(|token| {
                parse_finite(token.text).ok_or_else(|| ParseError::InvalidNumber {
                    section,
                    line: token.line,
                    token: token.text.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.pos += count;
        Ok(numbers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LampType;

    const BILATERAL: &str = "IESNA:LM-63-2002\n\
        [TEST] bilateral\n\
        [MANUFAC] Candela\n\
        TILT=NONE\n\
        1 1000 1 3 2 1 2 0.5 0.25 0.1\n\
        1 1 40\n\
        0 90 180\n\
        0 180\n\
        10 20 30\n\
        1 2 3\n";

    #[test]
    fn test_parse_simple_ies() {
        let checked = parse(BILATERAL).unwrap();
        assert!(checked.is_clean(), "{:?}", checked.warnings);
        let record = checked.value;

        assert_eq!(record.version(), "IESNA:LM-63-2002");
        assert_eq!(record.source(), "<memory>");
        assert_eq!(record.keywords().len(), 4);
        assert_eq!(record.keywords()[3], "TILT=NONE");
        assert!(record.tilt_data().is_empty());

        let header = record.header();
        assert_eq!(header.num_lamps, 1);
        assert_eq!(header.lumens_per_lamp, 1000.0);
        assert_eq!(header.num_vertical_angles, 3);
        assert_eq!(header.num_horizontal_angles, 2);
        assert_eq!(header.photometric_type, PhotometricType::C);
        assert_eq!(header.units_type, UnitsType::Meters);
        assert_eq!(header.length, 0.25);
        assert_eq!(header.input_watts, 40.0);

        let grid = record.original();
        assert_eq!(grid.thetas(), &[0.0, 90.0, 180.0]);
        assert_eq!(grid.phis(), &[0.0, 180.0]);
        assert_eq!(grid.value(0, 2), Some(30.0));
        assert_eq!(grid.value(1, 0), Some(1.0));

        assert_eq!(record.lamp_type(), LampType::C180);
        assert!(record.can_mirror());
        assert!(record.full().is_none());
    }

    #[test]
    fn test_parse_tolerates_crlf_and_rewrapped_body() {
        let content = "IESNA91\r\nTILT=NONE\r\n1 1000 1 3 2 1\r\n2 0.5 0.25 0.1 1 1 40 0\r\n\
                       90 180 0 180 10 20\r\n30 1\r\n2 3\r\n";
        let record = parse(content).unwrap().value;
        assert_eq!(record.keywords(), &["IESNA91".to_string(), "TILT=NONE".to_string()]);
        assert_eq!(record.original().values().row(1).to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_version_is_a_warning() {
        let content = BILATERAL.replacen("IESNA:LM-63-2002", "Acme downlight", 1);
        let checked = parse(&content).unwrap();
        assert_eq!(checked.value.version(), "unspecified");
        assert_eq!(
            checked.warnings,
            vec![ValidationWarning::MalformedVersion {
                first_line: "Acme downlight".into()
            }]
        );
        assert_eq!(checked.value.warnings(), checked.warnings.as_slice());
    }

    #[test]
    fn test_tilt_include_lines_are_kept_aside() {
        let content = "IESNA:LM-63-1995\n\
            TILT=INCLUDE\n\
            1\n\
            3\n\
            0 45 90\n\
            1.0 0.95 0.9\n\
            1 1000 1 3 2 1 2 0 0 0\n\
            1 1 10\n\
            0 90 180\n\
            0 180\n\
            10 20 30\n\
            1 2 3\n";
        let record = parse(content).unwrap().value;
        assert_eq!(record.tilt_data().len(), 4);
        assert_eq!(record.tilt_data()[2], "0 45 90");
        assert_eq!(record.header().num_vertical_angles, 3);
        assert_eq!(record.original().value(0, 1), Some(20.0));
    }

    #[test]
    fn test_tilt_file_reference_reads_like_none() {
        let content = BILATERAL.replace("TILT=NONE", "TILT=lamp.tlt");
        let checked = parse(&content).unwrap();
        assert!(checked.is_clean());
        let record = checked.value;
        assert_eq!(record.keywords().last().map(String::as_str), Some("TILT=lamp.tlt"));
        assert!(record.tilt_data().is_empty());
        assert_eq!(record.header().input_watts, 40.0);
        assert_eq!(record.original().values().row(1).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(record.lamp_type(), LampType::C180);
    }

    #[test]
    fn test_tilt_include_without_tilt_lines() {
        let err = parse("IESNA91\nTILT=INCLUDE\n1\n3\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated {
                section: "tilt data",
                expected: 4,
                found: 3,
            }
        ));
    }

    #[test]
    fn test_missing_tilt_is_fatal() {
        let err = parse("IESNA91\n[TEST] no tilt\n1 1000 1 3 2 1 2 0 0 0 1 1 10\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingTilt));
    }

    #[test]
    fn test_short_header() {
        let err = parse("IESNA91\nTILT=NONE\n1 1000 1 3 2 1 2\n").unwrap_err();
        assert!(matches!(err, ParseError::HeaderTruncated { found: 7 }));
    }

    #[test]
    fn test_non_numeric_header_field() {
        let err = parse("IESNA91\nTILT=NONE\n1 1000 1 three 2 1 2 0 0 0\n1 1 10\n").unwrap_err();
        match err {
            ParseError::InvalidHeaderField {
                field,
                line,
                token,
                ..
            } => {
                assert_eq!(field, "num_vertical_angles");
                assert_eq!(line, 3);
                assert_eq!(token, "three");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_fractional_count_is_rejected() {
        let err = parse("IESNA91\nTILT=NONE\n1 1000 1 3.5 2 1 2 0 0 0\n1 1 10\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidHeaderField {
                field: "num_vertical_angles",
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_candela_values() {
        let content = BILATERAL.replace("1 2 3\n", "1 2\n");
        let err = parse(&content).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated {
                section: "candela values",
                expected: 6,
                found: 5,
            }
        ));
    }

    #[test]
    fn test_invalid_candela_token_reports_line() {
        let content = BILATERAL.replace("1 2 3", "1 x 3");
        let err = parse(&content).unwrap_err();
        match err {
            ParseError::InvalidNumber {
                section,
                line,
                token,
            } => {
                assert_eq!(section, "candela values");
                assert_eq!(line, 10);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_nan_is_not_a_number_here() {
        let content = BILATERAL.replace("10 20 30", "10 NaN 30");
        assert!(matches!(parse(&content), Err(ParseError::InvalidNumber { .. })));
    }

    #[test]
    fn test_unsorted_angles_are_a_shape_error() {
        let content = BILATERAL.replace("0 90 180", "0 180 90");
        assert!(matches!(parse(&content), Err(ParseError::Shape(_))));
    }

    #[test]
    fn test_trailing_tokens_warn() {
        let content = format!("{}999 998\n", BILATERAL);
        let checked = parse(&content).unwrap();
        assert_eq!(checked.warnings, vec![ValidationWarning::TrailingTokens { count: 2 }]);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let content = format!("\u{feff}{}", BILATERAL);
        let checked = parse(&content).unwrap();
        assert!(checked.is_clean());
        assert_eq!(checked.value.version(), "IESNA:LM-63-2002");
    }
}
