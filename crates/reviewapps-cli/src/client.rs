//! CLI error type and the per-command application context.

use std::fmt::{self, Display, Formatter};

use reviewapps_core::ReviewError;

use crate::config::RuntimeConfig;
use crate::platform::HttpPlatform;
use crate::source_host::HttpSourceHost;

/// CLI-level error type separating reported outcomes, bad input, and failures.
#[derive(Debug)]
pub(crate) enum CliError {
    /// Expected domain outcome (not found, already exists, errored).
    Reported(String),
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Reported(_) => 1,
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Reported(message) | Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ReviewError> for CliError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::InvalidRepository { .. } => Self::validation(err.to_string()),
            ReviewError::ProvisioningFailed {
                message: Some(ref message),
                ..
            } if !message.trim().is_empty() => {
                Self::Reported(format!("{err}: {}", message.trim()))
            }
            ReviewError::PollTimedOut { last_status, .. } => {
                Self::Reported(format!("{err} (last status: {last_status})"))
            }
            err if err.is_recoverable() => Self::Reported(err.to_string()),
            err => Self::failure(err),
        }
    }
}

/// Collaborators and configuration handed to command handlers.
pub(crate) struct AppContext {
    pub(crate) platform: HttpPlatform,
    pub(crate) source: HttpSourceHost,
    pub(crate) config: RuntimeConfig,
}

impl AppContext {
    /// Build both HTTP collaborators; every platform request carries `trace_id`.
    pub(crate) fn new(config: RuntimeConfig, trace_id: &str) -> CliResult<Self> {
        let platform = HttpPlatform::new(&config, trace_id)?;
        let source = HttpSourceHost::new(&config)?;
        Ok(Self {
            platform,
            source,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewapps_api_models::ReviewAppStatus;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn recoverable_review_errors_are_reported() {
        let reported = CliError::from(ReviewError::PipelineNotFound {
            pipeline: "sample-app".to_string(),
        });
        assert_eq!(reported.exit_code(), 1);
        assert_eq!(reported.display_message(), "pipeline does not exist");

        let exists = CliError::from(ReviewError::AlreadyExists {
            branch: "feature/x".to_string(),
        });
        assert_eq!(exists.display_message(), "review app already exists");
    }

    #[test]
    fn errored_status_appends_platform_message() {
        let errored = CliError::from(ReviewError::ProvisioningFailed {
            review_app_id: Uuid::new_v4(),
            message: Some("build failed".to_string()),
        });
        assert_eq!(errored.exit_code(), 1);
        assert_eq!(
            errored.display_message(),
            "review app was changed to errored status: build failed"
        );

        let silent = CliError::from(ReviewError::ProvisioningFailed {
            review_app_id: Uuid::new_v4(),
            message: None,
        });
        assert_eq!(
            silent.display_message(),
            "review app was changed to errored status"
        );
    }

    #[test]
    fn timeout_reports_last_status() {
        let err = CliError::from(ReviewError::PollTimedOut {
            review_app_id: Uuid::new_v4(),
            waited: Duration::from_secs(90),
            last_status: ReviewAppStatus::Creating,
        });
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.display_message(),
            "timed out waiting for review app (last status: creating)"
        );
    }

    #[test]
    fn credential_problems_are_fatal() {
        let fatal = CliError::from(ReviewError::MissingCredential {
            app_id: Uuid::new_v4(),
            key: "DATABASE_URL".to_string(),
        });
        assert_eq!(fatal.exit_code(), 3);
        assert_eq!(
            fatal.display_message(),
            "configuration variable DATABASE_URL is missing"
        );
    }

    #[test]
    fn invalid_repository_is_validation() {
        let err = CliError::from(ReviewError::InvalidRepository {
            repository: "sample".to_string(),
        });
        assert_eq!(err.exit_code(), 2);
    }
}
