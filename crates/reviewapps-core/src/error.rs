//! # Design
//!
//! - `ApiError` is the contract between the workflows and the external collaborators;
//!   not-found and conflict are distinct variants so callers can branch on them.
//! - `ReviewError` is the workflow taxonomy. Recoverable outcomes carry just enough
//!   context to render a short message; everything else is fatal.

use std::error::Error;
use std::time::Duration;

use reviewapps_api_models::ReviewAppStatus;
use thiserror::Error;
use uuid::Uuid;

/// Boxed source error carried by transport and decode failures.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Result alias for collaborator calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the deployment platform or source host.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The addressed resource does not exist.
    #[error("{resource} was not found")]
    NotFound {
        /// Resource path or description.
        resource: String,
    },
    /// The request conflicts with the current state of the resource.
    #[error("{resource} conflicts with an existing resource")]
    Conflict {
        /// Resource path or description.
        resource: String,
        /// Upstream message, if any.
        message: String,
    },
    /// Any other non-success status.
    #[error("{resource} failed with status {status}: {message}")]
    Status {
        /// Resource path or description.
        resource: String,
        /// HTTP status code.
        status: u16,
        /// Upstream message, if any.
        message: String,
    },
    /// The request never produced a response.
    #[error("request to {resource} failed")]
    Transport {
        /// Resource path or description.
        resource: String,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },
    /// The response could not be decoded.
    #[error("response from {resource} could not be decoded")]
    Decode {
        /// Resource path or description.
        resource: String,
        /// Underlying decode error.
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    /// Whether the upstream reported the resource as absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the upstream reported a conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result alias for review app workflows.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Errors produced by the review app workflows.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The named pipeline does not exist.
    #[error("pipeline does not exist")]
    PipelineNotFound {
        /// Pipeline name that was looked up.
        pipeline: String,
    },
    /// No review app matches the branch, or it has no application yet.
    #[error("review app does not exist")]
    ReviewAppNotFound {
        /// Branch that was looked up.
        branch: String,
    },
    /// A review app already exists (or is being created) for the branch.
    #[error("review app already exists")]
    AlreadyExists {
        /// Branch that was requested.
        branch: String,
    },
    /// Provisioning ended in the `errored` status.
    #[error("review app was changed to errored status")]
    ProvisioningFailed {
        /// Review app identifier.
        review_app_id: Uuid,
        /// Failure reason reported by the platform.
        message: Option<String>,
    },
    /// The configured maximum wait elapsed before a terminal status.
    #[error("timed out waiting for review app")]
    PollTimedOut {
        /// Review app identifier.
        review_app_id: Uuid,
        /// Time spent polling.
        waited: Duration,
        /// Last status observed.
        last_status: ReviewAppStatus,
    },
    /// The platform has no formation for the application or process type.
    #[error("formation does not exist")]
    FormationNotFound {
        /// Application identifier.
        app_id: Uuid,
        /// Process type, when a single entry was addressed.
        process_type: Option<String>,
    },
    /// The repository argument is not of the form `owner/name`.
    #[error("repository must be given as owner/name")]
    InvalidRepository {
        /// Offending value.
        repository: String,
    },
    /// The configuration lacks the credential key.
    #[error("configuration variable {key} is missing")]
    MissingCredential {
        /// Application identifier.
        app_id: Uuid,
        /// Configuration key that was expected.
        key: String,
    },
    /// The credential value is not a usable connection URI.
    #[error("configuration variable {key} is not a valid connection URI: {reason}")]
    MalformedCredential {
        /// Configuration key that was parsed.
        key: String,
        /// Static reason for the failure.
        reason: &'static str,
        /// Underlying URL parse error, when parsing failed outright.
        #[source]
        source: Option<url::ParseError>,
    },
    /// A created review app did not reference an application.
    #[error("review app {review_app_id} was created without an application")]
    MissingApplication {
        /// Review app identifier.
        review_app_id: Uuid,
    },
    /// An external call failed in a way the workflow does not handle.
    #[error("{operation} failed")]
    Upstream {
        /// Operation identifier.
        operation: &'static str,
        /// Source collaborator error.
        #[source]
        source: ApiError,
    },
}

impl ReviewError {
    pub(crate) const fn upstream(operation: &'static str, source: ApiError) -> Self {
        Self::Upstream { operation, source }
    }

    /// Whether the error is an expected outcome that should be reported briefly
    /// rather than aborting with a diagnostic.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PipelineNotFound { .. }
                | Self::ReviewAppNotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::ProvisioningFailed { .. }
                | Self::PollTimedOut { .. }
                | Self::FormationNotFound { .. }
        )
    }
}
