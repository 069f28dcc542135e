//! Error types for Caminar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Caminar operations.
///
/// Invalid configuration is rejected eagerly at call boundaries; sparse-data
/// conditions (empty graphs, absorbing walks, items without embeddings,
/// undersized candidate sets) are absorbed as smaller or empty results and
/// never surface through this type.
///
/// # Examples
///
/// ```
/// use caminar::error::CaminarError;
///
/// let err = CaminarError::InvalidHyperparameter {
///     param: "sample_length".to_string(),
///     value: "0".to_string(),
///     constraint: ">0".to_string(),
/// };
/// assert!(err.to_string().contains("sample_length"));
/// ```
#[derive(Debug)]
pub enum CaminarError {
    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Input data is malformed (empty identifiers, inconsistent records).
    MalformedInput {
        /// What was wrong with the input
        message: String,
    },

    /// Vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension found
        actual: usize,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for CaminarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaminarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            CaminarError::MalformedInput { message } => {
                write!(f, "Malformed input: {message}")
            }
            CaminarError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Vector dimension mismatch: expected {expected}, got {actual}"
                )
            }
            CaminarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CaminarError {}

impl From<&str> for CaminarError {
    fn from(msg: &str) -> Self {
        CaminarError::Other(msg.to_string())
    }
}

impl From<String> for CaminarError {
    fn from(msg: String) -> Self {
        CaminarError::Other(msg)
    }
}

impl CaminarError {
    /// Create an invalid hyperparameter error from a parameter name,
    /// a displayable value, and a constraint description.
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create a malformed input error.
    #[must_use]
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, CaminarError>;
