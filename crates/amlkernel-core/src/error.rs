//! Error types for AmlKernels.

use thiserror::Error;

/// Result type alias using `KernelError`.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors that can occur during kernel operations.
///
/// Degenerate inputs (empty graphs, empty cluster sets, all-tied measures) are
/// not errors: they produce empty or zeroed results. Non-convergence of an
/// iterative algorithm is reported on the result and logged, never raised.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Input table lacks one or more mandatory columns.
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        /// Names of the missing columns.
        missing: Vec<String>,
    },

    /// A transaction has no sender or receiver account.
    #[error("MissingAccountIdentifier: row {row} has an empty {column}")]
    MissingAccountIdentifier {
        /// Zero-based row index.
        row: usize,
        /// Column that was empty.
        column: String,
    },

    /// A cell could not be interpreted.
    #[error("Invalid value in row {row}, column {column}: {reason}")]
    InvalidField {
        /// Zero-based row index.
        row: usize,
        /// Column name.
        column: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Kernel not found in registry.
    #[error("Kernel not found: {0}")]
    KernelNotFound(String),

    /// Kernel already registered.
    #[error("Kernel already registered: {0}")]
    KernelAlreadyRegistered(String),

    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    ValidationError(String),

    /// Timeout waiting for a kernel to finish.
    #[error("Timeout waiting for response after {0:?}")]
    Timeout(std::time::Duration),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl KernelError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        KernelError::ValidationError(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        KernelError::InternalError(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        KernelError::ConfigError(msg.into())
    }

    /// Create a kernel not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        KernelError::KernelNotFound(id.into())
    }

    /// Create a missing account identifier error.
    #[must_use]
    pub fn missing_account(row: usize, column: impl Into<String>) -> Self {
        KernelError::MissingAccountIdentifier {
            row,
            column: column.into(),
        }
    }

    /// Returns true if the error was caused by the input data rather than
    /// the library or its configuration.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            KernelError::MissingColumns { .. }
                | KernelError::MissingAccountIdentifier { .. }
                | KernelError::InvalidField { .. }
                | KernelError::ValidationError(_)
        )
    }
}
