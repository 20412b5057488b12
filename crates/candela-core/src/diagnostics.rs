//! Non-fatal findings raised while reading and classifying a file.
//!
//! Structural problems abort with an error. Everything else degrades
//! capability (for example, mirroring is skipped) and is reported through a
//! [`ValidationWarning`] carried next to the result in a [`Checked`] value.

use std::fmt;

use serde::Serialize;

use crate::types::PhotometricType;

/// A condition that leaves the result usable but possibly degraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// The first line does not start with `IES`.
    MalformedVersion { first_line: String },
    /// The phi layout does not match what the photometric type implies;
    /// values will not be mirrored.
    SymmetryMismatch {
        photometric_type: PhotometricType,
        first_phi: f64,
        last_phi: f64,
    },
    /// The photometric type has no mirroring rule.
    UnsupportedPhotometry { photometric_type: PhotometricType },
    /// Numeric tokens left over after the candela values.
    TrailingTokens { count: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedVersion { first_line } => write!(
                f,
                "File does not begin with \"IES\" and may be malformed (first line: {:?})",
                first_line
            ),
            Self::SymmetryMismatch {
                photometric_type,
                first_phi,
                last_phi,
            } => write!(
                f,
                "Horizontal angles {}..{} do not match photometric type {}; values will not be mirrored",
                first_phi, last_phi, photometric_type
            ),
            Self::UnsupportedPhotometry { photometric_type } => write!(
                f,
                "Photometric type {} is not supported for mirroring; values will not be mirrored",
                photometric_type
            ),
            Self::TrailingTokens { count } => {
                write!(f, "{} unused token(s) after the candela values", count)
            }
        }
    }
}

/// A value together with the warnings accumulated while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<T> {
    pub value: T,
    pub warnings: Vec<ValidationWarning>,
}

impl<T> Checked<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<ValidationWarning>) -> Self {
        Self { value, warnings }
    }

    /// Attach a warning.
    pub fn warn(mut self, warning: ValidationWarning) -> Self {
        log::warn!("{}", warning);
        self.warnings.push(warning);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checked<U> {
        Checked {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_parts(self) -> (T, Vec<ValidationWarning>) {
        (self.value, self.warnings)
    }
}
