//! Error types for the numeric systems.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    #[error("{context}: division by zero (leading denominator coefficient is 0)")]
    DivisionByZero { context: &'static str },

    #[error("{context}: coefficient vector is empty")]
    EmptyCoefficients { context: &'static str },

    #[error("{context}: expected {expected} elements, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{context}: invalid matrix dimensions ({reason})")]
    InvalidDimensions {
        context: &'static str,
        reason: String,
    },

    #[error("{context}: index ({row}, {col}) out of range for a {rows}x{cols} system")]
    IndexOutOfRange {
        context: &'static str,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("TF_MIMO_DIAGONAL: ({row}, {col}) is not on the diagonal")]
    OffDiagonal { row: usize, col: usize },

    #[error("{context}: jacobian of the {function} function was not provided")]
    MissingJacobian {
        context: &'static str,
        function: &'static str,
    },

    #[error("{context}: {operation} is not supported")]
    Unsupported {
        context: &'static str,
        operation: &'static str,
    },

    #[error("{context}: numeric failure ({reason})")]
    Numeric {
        context: &'static str,
        reason: String,
    },
}

pub type SystemResult<T> = Result<T, SystemError>;

impl SystemError {
    pub(crate) fn unsupported(context: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { context, operation }
    }

    pub(crate) fn invalid_dimensions(context: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            context,
            reason: reason.into(),
        }
    }
}
