//! Unified error handling.
//!
//! One application-level error aggregating the layer errors. Transport
//! failures never surface here: the persistence layer consumes them by
//! retrying against the local record, so what remains is either a domain
//! rule violation or a well-formed remote response - both meaningful to
//! the user.

use thiserror::Error;

use crate::config::ConfigError;
use crate::persist::{ApiError, CacheError};
use crate::router::PatternError;
use crate::services::GenerateError;
use crate::store::StoreError;

/// Application-level error for the client core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Content store rule violation.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Well-formed error response from the remote API.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Generation service failure.
    #[error("{0}")]
    Generate(#[from] GenerateError),

    /// Local cache could not be written.
    #[error("{0}")]
    Cache(#[from] CacheError),

    /// Invalid configuration.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Invalid route pattern at registration time.
    #[error("{0}")]
    Pattern(#[from] PatternError),
}

impl AppError {
    /// Whether this should render as a "not found" view rather than a
    /// failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::ProjectNotFound | StoreError::VersionNotFound(_))
                | Self::Api(ApiError::NotFound)
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(AppError::Store(StoreError::ProjectNotFound).is_not_found());
        assert!(AppError::Store(StoreError::VersionNotFound(3)).is_not_found());
        assert!(AppError::Api(ApiError::NotFound).is_not_found());
        assert!(!AppError::Store(StoreError::Forbidden).is_not_found());
    }

    #[test]
    fn test_display_passthrough() {
        let err = AppError::Store(StoreError::InvalidCredentials);
        assert_eq!(err.to_string(), "invalid credentials");
    }
}
