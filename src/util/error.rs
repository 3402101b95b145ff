//! Error types for array resolution.

use thiserror::Error;

/// Main error type for array operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An array invariant does not hold
    #[error("Malformed array: {0}")]
    MalformedArray(String),

    /// Position outside the declared bounds of a mask or jagged array.
    /// Signed so negative producer indices are reported as they were given.
    #[error("Index {index} out of bounds (count: {count})")]
    IndexOutOfBounds { index: i64, count: usize },

    /// Dataset not present in the external store
    #[error("External resource not found: {path} in {uri}")]
    ExternalResourceNotFound { uri: String, path: String },

    /// Requested window does not fit the dataset, or the store returned
    /// a different number of values than requested
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Element kind requested does not match the stored encoding
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Inline token that cannot be parsed as the declared element kind
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Failure inside a named array or sub-array role
    #[error("in {array}: {source}")]
    Array {
        array: String,
        #[source]
        source: Box<Error>,
    },

    /// Failure inside one sub-array of a jagged array
    #[error("in sub-array {index}: {source}")]
    SubArray {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor or catalog JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a malformed array error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedArray(msg.into())
    }

    /// Create a shape mismatch error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an out-of-bounds error for an unsigned position.
    pub fn out_of_bounds(index: usize, count: usize) -> Self {
        Self::IndexOutOfBounds {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            count,
        }
    }

    /// Wrap this error with the name of the array it occurred in.
    pub fn in_array(self, array: impl Into<String>) -> Self {
        Self::Array {
            array: array.into(),
            source: Box::new(self),
        }
    }

    /// Wrap this error with a jagged sub-array index.
    pub fn in_sub_array(self, index: usize) -> Self {
        Self::SubArray {
            index,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping context wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Self::Array { source, .. } | Self::SubArray { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Extension for attaching array context to a `Result`.
pub trait ResultExt<T> {
    /// Wrap the error (if any) with the name of the failing array.
    fn in_array(self, array: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[inline]
    fn in_array(self, array: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.in_array(array))
    }
}

/// Result type alias for array operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::IndexOutOfBounds { index: 5, count: 3 };
        assert!(e.to_string().contains("5"));
        assert!(e.to_string().contains("3"));

        let e = Error::malformed("cumulative length decreases");
        assert!(e.to_string().contains("decreases"));
    }

    #[test]
    fn test_error_context() {
        let e = Error::IndexOutOfBounds { index: 9, count: 4 }
            .in_sub_array(2)
            .in_array("cells");
        let msg = e.to_string();
        assert!(msg.contains("cells"));
        assert!(msg.contains("sub-array 2"));
        assert!(matches!(e.root(), Error::IndexOutOfBounds { index: 9, count: 4 }));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
