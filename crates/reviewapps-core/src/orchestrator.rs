//! Review app creation workflow.
//!
//! # Design
//! - States: absent → submitted → polling → created | errored.
//! - The existence check is best effort; the platform's conflict response on
//!   submit is the authoritative duplicate guard and is folded into the same
//!   `AlreadyExists` outcome.
//! - Exactly one external call is in flight at any time. Polling sleeps between
//!   fetches and never fetches again once a terminal status is observed.

use std::time::Duration;

use reviewapps_api_models::{
    CreateReviewAppRequest, ReviewApp, ReviewAppDetails, ReviewAppStatus, SOURCE_BLOB_VERSION,
    SourceBlob,
};
use tokio::time::{Instant, sleep};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{find_review_app, resolve_pipeline};
use crate::credentials::{DEFAULT_CREDENTIAL_KEY, describe_application};
use crate::error::{ReviewError, ReviewResult};
use crate::service::{PlatformApi, SourceHost};
use crate::source::{RepositorySlug, resolve_source_archive};

/// Delay between status checks when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Polling cadence and optional liveness bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive status checks.
    pub interval: Duration,
    /// Give up once this much time has been spent polling; `None` polls forever.
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }
}

/// Receives every non-terminal status observed while polling.
pub trait ProgressSink {
    /// Called once per non-terminal poll, before waiting.
    fn observe(&mut self, status: ReviewAppStatus);
}

/// Progress sink that discards updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn observe(&mut self, _status: ReviewAppStatus) {}
}

/// Parameters of one creation request.
#[derive(Debug, Clone, Copy)]
pub struct CreateReviewApp<'a> {
    /// Pipeline name.
    pub pipeline: &'a str,
    /// Branch to deploy.
    pub branch: &'a str,
    /// Repository hosting the branch.
    pub repository: &'a RepositorySlug,
}

/// Drives review app creation across the platform and source host.
pub struct ReviewAppOrchestrator<'a, P: ?Sized, S: ?Sized> {
    platform: &'a P,
    source: &'a S,
    policy: PollPolicy,
    credential_key: &'a str,
}

impl<'a, P, S> ReviewAppOrchestrator<'a, P, S>
where
    P: PlatformApi + ?Sized,
    S: SourceHost + ?Sized,
{
    /// Orchestrator with the default poll policy and credential key.
    #[must_use]
    pub const fn new(platform: &'a P, source: &'a S) -> Self {
        Self {
            platform,
            source,
            policy: PollPolicy {
                interval: DEFAULT_POLL_INTERVAL,
                max_wait: None,
            },
            credential_key: DEFAULT_CREDENTIAL_KEY,
        }
    }

    /// Override the poll policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the configuration key holding the database URL.
    #[must_use]
    pub const fn with_credential_key(mut self, key: &'a str) -> Self {
        self.credential_key = key;
        self
    }

    /// Create a review app for `request.branch` and wait for it to provision.
    ///
    /// # Errors
    ///
    /// - [`ReviewError::PipelineNotFound`] before anything else is called.
    /// - [`ReviewError::AlreadyExists`] before any create request or poll when a
    ///   review app exists for the branch, or when the platform reports a conflict.
    /// - [`ReviewError::ProvisioningFailed`] when the app ends up `errored`.
    /// - [`ReviewError::PollTimedOut`] when a configured max wait elapses.
    /// - Credential and upstream errors from the final extraction step.
    pub async fn create(
        &self,
        request: CreateReviewApp<'_>,
        progress: &mut dyn ProgressSink,
    ) -> ReviewResult<ReviewAppDetails> {
        let pipeline = resolve_pipeline(self.platform, request.pipeline).await?;

        if let Some(existing) = find_review_app(self.platform, pipeline.id, request.branch).await? {
            info!(
                review_app_id = %existing.id,
                branch = request.branch,
                "review app already exists for branch"
            );
            return Err(ReviewError::AlreadyExists {
                branch: request.branch.to_string(),
            });
        }

        let archive =
            resolve_source_archive(self.source, request.repository, request.branch).await?;

        let submission = CreateReviewAppRequest {
            branch: request.branch.to_string(),
            pipeline: pipeline.id,
            source_blob: SourceBlob {
                url: archive.url,
                version: SOURCE_BLOB_VERSION.to_string(),
            },
            pr_number: archive.pr_number,
        };
        let submitted = self.submit(&submission).await?;

        let terminal = self.wait_for_terminal(submitted.id, progress).await?;
        self.classify(&terminal).await
    }

    async fn submit(&self, request: &CreateReviewAppRequest) -> ReviewResult<ReviewApp> {
        match self.platform.create_review_app(request).await {
            Ok(app) => {
                info!(
                    review_app_id = %app.id,
                    branch = %request.branch,
                    pr_number = request.pr_number,
                    "submitted review app"
                );
                Ok(app)
            }
            Err(err) if err.is_conflict() => Err(ReviewError::AlreadyExists {
                branch: request.branch.clone(),
            }),
            Err(err) => Err(ReviewError::upstream("review_app.create", err)),
        }
    }

    /// Poll `review_app_id` until it reaches `created` or `errored`.
    ///
    /// # Errors
    ///
    /// [`ReviewError::PollTimedOut`] when the policy's max wait elapses, or
    /// [`ReviewError::Upstream`] when a status fetch fails.
    pub async fn wait_for_terminal(
        &self,
        review_app_id: Uuid,
        progress: &mut dyn ProgressSink,
    ) -> ReviewResult<ReviewApp> {
        let started = Instant::now();
        loop {
            let app = self
                .platform
                .review_app(review_app_id)
                .await
                .map_err(|err| ReviewError::upstream("review_app.get", err))?;

            info!(review_app_id = %review_app_id, status = %app.status, "review app status");
            if app.status.is_terminal() {
                return Ok(app);
            }
            progress.observe(app.status);

            if let Some(max_wait) = self.policy.max_wait {
                let waited = started.elapsed();
                if waited + self.policy.interval > max_wait {
                    warn!(
                        review_app_id = %review_app_id,
                        waited_secs = waited.as_secs(),
                        "giving up on review app before a terminal status"
                    );
                    return Err(ReviewError::PollTimedOut {
                        review_app_id,
                        waited,
                        last_status: app.status,
                    });
                }
            }

            sleep(self.policy.interval).await;
        }
    }

    async fn classify(&self, app: &ReviewApp) -> ReviewResult<ReviewAppDetails> {
        if app.status == ReviewAppStatus::Errored {
            return Err(ReviewError::ProvisioningFailed {
                review_app_id: app.id,
                message: app.message.clone(),
            });
        }

        let app_id = app.app_id().ok_or(ReviewError::MissingApplication {
            review_app_id: app.id,
        })?;
        describe_application(self.platform, app.id, app_id, self.credential_key).await
    }
}
