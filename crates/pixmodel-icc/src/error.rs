//! ICC error types.

use pixmodel_core::Error;
use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur while loading profiles or building transforms.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to load profile from file.
    #[error("failed to load profile: {0}")]
    LoadFailed(String),

    /// Failed to create profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),

    /// Failed to create transform.
    #[error("failed to create transform: {0}")]
    TransformFailed(String),

    /// Invalid profile data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// The engine only chains RGB profiles.
    #[error("profile {index} is {actual}, only RGB profiles can be chained")]
    NotRgb {
        /// Position in the profile sequence.
        index: usize,
        /// Color space signature of the profile.
        actual: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IccError> for Error {
    fn from(err: IccError) -> Self {
        match err {
            IccError::NotRgb { .. } => Error::unsupported("icc transform", err.to_string()),
            other => Error::invalid_config(other.to_string()),
        }
    }
}
