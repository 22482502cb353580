//! Error types for schema derivation and table conversion.
//!
//! The taxonomy mirrors where things can go wrong:
//!
//! - [`SchemaError`] - the schema declaration itself is invalid
//! - [`MissingColumnError`] - a header lacks a column the schema requires
//! - [`ShapeMismatchError`] - column-style data with inconsistent shapes
//! - [`FormatError`] - malformed CSV text, tagged with the offending line
//! - [`Error`] - top-level wrapper returned by every load/dump entry point
//!
//! Error conversion is automatic via `From` implementations, allowing `?`
//! to work across module boundaries. All errors are fatal to the current
//! call: no partial results, no row-skipping recovery.

use thiserror::Error;

/// Boxed error type accepted from user-supplied parsers and serializers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for all load/dump operations.
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Schema Declaration Errors
// =============================================================================

/// Errors in the schema declaration itself.
///
/// Raised when the schema is derived, never deferred to decode/encode time.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate field name '{0}' in schema")]
    DuplicateField(String),

    /// A column-style field declares a default that is not a sequence.
    #[error("default for column-style field '{0}' is not a sequence")]
    NonSequenceDefault(String),

    /// The declaration has no fields at all.
    #[error("schema declares no fields")]
    Empty,
}

// =============================================================================
// Decode/Encode Errors
// =============================================================================

/// A header lacks a column the schema requires.
#[derive(Debug, Error)]
#[error("header is missing required column '{column}'")]
pub struct MissingColumnError {
    /// Name of the absent schema field.
    pub column: String,
}

/// Column-style data with inconsistent shapes.
#[derive(Debug, Error)]
pub enum ShapeMismatchError {
    /// Two columns ended up with different lengths.
    #[error("column '{column}' has length {actual}, expected {expected}")]
    UnequalLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A column-style attribute did not serialize to a sequence.
    #[error("attribute '{0}' is not a sequence")]
    NotASequence(String),
}

/// Malformed CSV text.
///
/// `line` is 1-based and counts the header as line 1, so the first data row
/// is line 2.
#[derive(Debug, Error)]
#[error("malformed CSV at line {line}: {message}")]
pub struct FormatError {
    pub line: usize,
    pub message: String,
}

// =============================================================================
// Top-level Error
// =============================================================================

/// Top-level error returned by every load/dump entry point.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid schema declaration.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Header lacks a required column.
    #[error(transparent)]
    MissingColumn(#[from] MissingColumnError),

    /// Column shapes are inconsistent.
    #[error(transparent)]
    Shape(#[from] ShapeMismatchError),

    /// Malformed CSV text.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A user-supplied parser or serializer failed. The original error is
    /// carried unmodified as the source.
    #[error("field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: BoxError,
    },

    /// A record has no value for a declared field and the field has no
    /// default.
    #[error("record has no value for field '{0}'")]
    MissingValue(String),

    /// A record did not serialize to a plain field map.
    #[error("{0} does not serialize to a plain field map")]
    InvalidRecord(&'static str),

    /// Converting between a typed record and its field map failed.
    #[error("record conversion failed: {0}")]
    Convert(#[from] serde_json::Error),

    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(0, |p| p.line() as usize);
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            csv::ErrorKind::UnequalLengths { pos, expected_len, len } => {
                Error::Format(FormatError {
                    line: pos.map_or(line, |p| p.line() as usize),
                    message: format!("expected {expected_len} cells, found {len}"),
                })
            }
            csv::ErrorKind::Utf8 { pos, .. } => Error::Format(FormatError {
                line: pos.map_or(line, |p| p.line() as usize),
                message: "cell is not valid UTF-8".to_string(),
            }),
            _ => Error::Format(FormatError {
                line,
                message: "unreadable CSV input".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SchemaError -> Error
        let schema_err = SchemaError::DuplicateField("title".into());
        let err: Error = schema_err.into();
        assert!(err.to_string().contains("title"));

        // MissingColumnError -> Error
        let missing: Error = MissingColumnError { column: "age".into() }.into();
        assert!(missing.to_string().contains("age"));
    }

    #[test]
    fn test_shape_mismatch_format() {
        let err = ShapeMismatchError::UnequalLength {
            column: "y".into(),
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("'y'"));
        assert!(msg.contains("length 2"));
        assert!(msg.contains("expected 3"));
    }

    #[test]
    fn test_format_error_carries_line() {
        let err = FormatError { line: 4, message: "expected 2 cells, found 3".into() };
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_field_error_preserves_source() {
        let source: BoxError = "boom".parse::<i64>().unwrap_err().into();
        let err = Error::Field { field: "age".into(), source };
        assert!(err.to_string().contains("age"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
