//! Directory error types
//!
//! A `DirectoryError` means the backend call itself failed (network, auth,
//! validation, throttling). "No match" on a lookup is not an error and is
//! represented as `Ok(None)` by the lookup capabilities.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type for directory capabilities.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// The directory capability that was being exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryOperation {
    FindGroup,
    CreateGroup,
    FindUser,
    CreateUser,
    CreateMembership,
}

impl DirectoryOperation {
    /// Stable name used in log fields and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectoryOperation::FindGroup => "find_group",
            DirectoryOperation::CreateGroup => "create_group",
            DirectoryOperation::FindUser => "find_user",
            DirectoryOperation::CreateUser => "create_user",
            DirectoryOperation::CreateMembership => "create_membership",
        }
    }
}

impl fmt::Display for DirectoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a directory-service call.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backend rejected or failed the call for an unclassified reason.
    #[error("{operation} failed: {message}")]
    ServiceFailure {
        operation: DirectoryOperation,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The principal or membership the call would create already exists.
    #[error("{operation} conflict: '{identifier}' already exists")]
    Conflict {
        operation: DirectoryOperation,
        identifier: String,
    },

    /// The backend is rate limiting requests.
    #[error("{operation} throttled: {message}")]
    Throttled {
        operation: DirectoryOperation,
        message: String,
    },

    /// The request was malformed or failed backend validation.
    #[error("{operation} rejected: {message}")]
    InvalidRequest {
        operation: DirectoryOperation,
        message: String,
    },
}

impl DirectoryError {
    /// The capability that failed.
    pub fn operation(&self) -> DirectoryOperation {
        match self {
            DirectoryError::ServiceFailure { operation, .. }
            | DirectoryError::Conflict { operation, .. }
            | DirectoryError::Throttled { operation, .. }
            | DirectoryError::InvalidRequest { operation, .. } => *operation,
        }
    }

    /// Whether the same call might succeed later.
    ///
    /// Informational only; the provisioning engine never retries.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::ServiceFailure { .. } | DirectoryError::Throttled { .. }
        )
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ServiceFailure { .. } => "SERVICE_FAILURE",
            DirectoryError::Conflict { .. } => "CONFLICT",
            DirectoryError::Throttled { .. } => "THROTTLED",
            DirectoryError::InvalidRequest { .. } => "INVALID_REQUEST",
        }
    }

    // Convenience constructors

    /// Create a service failure without an underlying source.
    pub fn service_failure(operation: DirectoryOperation, message: impl Into<String>) -> Self {
        DirectoryError::ServiceFailure {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Create a service failure wrapping the backend's error.
    pub fn service_failure_with_source(
        operation: DirectoryOperation,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ServiceFailure {
            operation,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a conflict error.
    pub fn conflict(operation: DirectoryOperation, identifier: impl Into<String>) -> Self {
        DirectoryError::Conflict {
            operation,
            identifier: identifier.into(),
        }
    }

    /// Create a throttling error.
    pub fn throttled(operation: DirectoryOperation, message: impl Into<String>) -> Self {
        DirectoryError::Throttled {
            operation,
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(operation: DirectoryOperation, message: impl Into<String>) -> Self {
        DirectoryError::InvalidRequest {
            operation,
            message: message.into(),
        }
    }
}
