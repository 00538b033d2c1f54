//! Error types for the gait-entropy library.

use thiserror::Error;

/// Result type alias for entropy pipeline operations.
pub type Result<T> = std::result::Result<T, EntropyError>;

/// Errors that can occur while estimating complexity measures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntropyError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Signal has zero variance and cannot be standardized.
    #[error("signal has zero variance")]
    ZeroVariance,

    /// Signal contains NaN or infinite samples.
    #[error("non-finite sample at index {index}")]
    NonFinite { index: usize },

    /// Requested channel is not present in the source table.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues during clustering).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// No file in a dataset produced usable embedding parameters.
    #[error("no valid embedding estimates among {files} files")]
    NoValidEstimates { files: usize },

    /// A data cell could not be read as a number.
    #[error("cannot parse '{value}' as a number at row {row}")]
    Parse { row: usize, value: String },

    /// Reading or parsing an external source failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<csv::Error> for EntropyError {
    fn from(err: csv::Error) -> Self {
        EntropyError::Io(err.to_string())
    }
}

impl From<std::io::Error> for EntropyError {
    fn from(err: std::io::Error) -> Self {
        EntropyError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = EntropyError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = EntropyError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = EntropyError::MissingColumn("LKneeAngles_X".to_string());
        assert_eq!(err.to_string(), "missing column: LKneeAngles_X");

        let err = EntropyError::NoValidEstimates { files: 12 };
        assert_eq!(
            err.to_string(),
            "no valid embedding estimates among 12 files"
        );

        let err = EntropyError::Parse {
            row: 4,
            value: "n/a".to_string(),
        };
        assert_eq!(err.to_string(), "cannot parse 'n/a' as a number at row 4");

        let err = EntropyError::NonFinite { index: 3 };
        assert_eq!(err.to_string(), "non-finite sample at index 3");
    }

    #[test]
    fn io_errors_are_stringified() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EntropyError = io.into();
        assert_eq!(err, EntropyError::Io("gone".to_string()));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = EntropyError::ZeroVariance;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
