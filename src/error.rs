//! Error types for the endpoint service reconciliation engine.
//!
//! This module provides the error hierarchy for all operations in a
//! synthesis pass: deferred reference resolution, cloud API calls,
//! desired-state model construction, and synthesis itself.

use thiserror::Error;

/// The main error type for endpoint service reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Deferred reference resolution errors.
    #[error("Token resolution error: {0}")]
    Token(#[from] TokenError),

    /// Cloud API errors.
    #[error("Cloud API error: {0}")]
    Cloud(#[from] CloudError),

    /// Desired-state model errors.
    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    /// Synthesis pass errors.
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Deferred reference (token) resolution errors.
///
/// A failed resolution aborts the current operation before any remote
/// call is issued; it is never cached as a permanent failure.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The producing resource has no status yet.
    #[error("Resource '{resource_id}' is not fulfilled yet")]
    NotFulfilled {
        /// Logical ID of the producing resource.
        resource_id: String,
    },

    /// An external lookup backing the token failed.
    #[error("Token lookup failed: {message}")]
    LookupFailed {
        /// Description of the lookup failure.
        message: String,
    },
}

/// Cloud API errors.
#[derive(Debug, Error)]
pub enum CloudError {
    /// The resource is still referenced by an in-progress dependency.
    ///
    /// This is the designated transient class: `Delete` retries on it at a
    /// fixed poll interval until its deadline elapses.
    #[error("Dependency violation: {message}")]
    DependencyViolation {
        /// Error message returned by the cloud API.
        message: String,
    },

    /// The API rejected or failed the request.
    #[error("API request failed ({code}): {message}")]
    ApiRequestFailed {
        /// Remote error code.
        code: String,
        /// Error message returned by the cloud API.
        message: String,
    },

    /// The API response could not be interpreted.
    #[error("Invalid response from cloud API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Desired-state model errors.
#[derive(Debug, Error)]
pub enum StackError {
    /// A resource with the same logical ID was already registered.
    #[error("Duplicate resource ID in stack: {resource_id}")]
    DuplicateResource {
        /// The duplicated logical ID.
        resource_id: String,
    },
}

/// Synthesis pass errors.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Discovery returned more than one live object for one logical ID.
    ///
    /// Ambiguous ownership is fatal for that resource and never silently
    /// resolved.
    #[error("Ambiguous ownership: {count} live endpoint services match resource '{resource_id}'")]
    AmbiguousMatch {
        /// Logical ID with multiple matches.
        resource_id: String,
        /// Number of live objects that matched.
        count: usize,
    },

    /// Deletion kept hitting the transient error class until the deadline.
    #[error("Timed out deleting endpoint service '{service_id}'")]
    DeleteTimedOut {
        /// Remote ID of the endpoint service.
        service_id: String,
        /// The last transient error observed before the deadline.
        #[source]
        source: CloudError,
    },
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error belongs to the transient remote class.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Cloud(err) if err.is_retryable())
    }
}

impl CloudError {
    /// Creates an API request error.
    #[must_use]
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a dependency violation error.
    #[must_use]
    pub fn dependency_violation(message: impl Into<String>) -> Self {
        Self::DependencyViolation {
            message: message.into(),
        }
    }

    /// Returns true if this error belongs to the transient remote class.
    ///
    /// Only dependency violations are retry-eligible; everything else is
    /// fatal for the operation that observed it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DependencyViolation { .. })
    }
}

impl TokenError {
    /// Creates a lookup failure with the given message.
    #[must_use]
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::LookupFailed {
            message: message.into(),
        }
    }
}
