//! Error types for flume run loading.
//!
//! This module provides the [`Error`] enum covering all failure modes when
//! reading a flume container and assembling a [`Run`](crate::Run), along with
//! a convenient [`Result`] type alias.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flume operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or deriving a run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container file could not be opened or read.
    #[error("Failed to access '{}': {source}", path.display())]
    FileAccess {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The container does not have the expected internal structure.
    #[error("Malformed container '{}': {reason}", path.display())]
    MalformedContainer {
        /// Path of the container (empty for in-memory buffers).
        path: PathBuf,
        /// Description of the structural problem.
        reason: String,
    },

    /// A required variable is absent from the container.
    #[error("Variable '{name}' not found in '{}'", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path of the container.
        path: PathBuf,
    },

    /// An array does not have the dimensions implied by the rest of the run.
    #[error("Shape mismatch for '{variable}': shape {shape:?}, expected {expected}")]
    ShapeMismatch {
        /// Name of the offending array.
        variable: String,
        /// Actual shape of the array.
        shape: Vec<usize>,
        /// Description of the expected shape.
        expected: String,
    },

    /// An add-operation received the wrong kind of record.
    #[error("Type mismatch: expected {expected}, received {found}")]
    TypeMismatch {
        /// Record kind the operation accepts.
        expected: &'static str,
        /// Record kind that was received.
        found: &'static str,
    },

    /// A derivation was invoked before its inputs exist or agree.
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Description of the unmet precondition.
        message: String,
    },

    /// A sequence that must be non-empty was empty.
    #[error("Empty sequence: {context}")]
    EmptySequence {
        /// What was empty.
        context: &'static str,
    },

    /// A time code cannot be represented as a calendar timestamp.
    #[error("Invalid time code at index {index}: {value}")]
    InvalidTimeCode {
        /// Position in the input sequence.
        index: usize,
        /// The offending (offset-corrected) day count.
        value: f64,
    },

    /// A time index is past the end of the time axis.
    #[error("Time index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the axis.
        len: usize,
    },

    /// No gauge with the requested identifier exists in the run.
    #[error("Unknown gauge id {id}")]
    UnknownGauge {
        /// Requested gauge identifier.
        id: u32,
    },
}

impl Error {
    /// Create a FileAccess error for the given path.
    pub fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a MalformedContainer error.
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedContainer {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingVariable error.
    pub fn missing_variable(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingVariable {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        variable: impl Into<String>,
        shape: &[usize],
        expected: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            variable: variable.into(),
            shape: shape.to_vec(),
            expected: expected.into(),
        }
    }

    /// Create a TypeMismatch error.
    pub const fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Create a Precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an EmptySequence error.
    pub const fn empty_sequence(context: &'static str) -> Self {
        Self::EmptySequence { context }
    }

    /// Create an InvalidTimeCode error.
    pub const fn invalid_time_code(index: usize, value: f64) -> Self {
        Self::InvalidTimeCode { index, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_variable("eta_wm", "/data/run001.mat");
        assert!(err.to_string().contains("eta_wm"));
        assert!(err.to_string().contains("run001.mat"));

        let err = Error::shape_mismatch("eta", &[100, 4], "[100, 3]");
        assert!(err.to_string().contains("[100, 4]"));

        let err = Error::type_mismatch("ActuatorRecord", "GaugeRecord");
        assert!(err.to_string().contains("received GaugeRecord"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
