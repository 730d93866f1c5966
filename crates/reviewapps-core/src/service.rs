//! Interfaces to the two external collaborators.

use async_trait::async_trait;
use reviewapps_api_models::{
    Application, ConfigVars, CreateReviewAppRequest, Formation, FormationUpdate, Pipeline,
    PullRequest, ReviewApp,
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::source::RepositorySlug;

/// Deployment platform operations used by the workflows.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Look up a pipeline by name or identifier.
    async fn pipeline(&self, name: &str) -> ApiResult<Pipeline>;
    /// List every review app under a pipeline.
    async fn review_apps(&self, pipeline_id: Uuid) -> ApiResult<Vec<ReviewApp>>;
    /// Submit a review app creation request.
    async fn create_review_app(&self, request: &CreateReviewAppRequest) -> ApiResult<ReviewApp>;
    /// Fetch a single review app.
    async fn review_app(&self, id: Uuid) -> ApiResult<ReviewApp>;
    /// Delete a review app, returning the deleted record.
    async fn delete_review_app(&self, id: Uuid) -> ApiResult<ReviewApp>;
    /// Fetch application metadata.
    async fn application(&self, app_id: Uuid) -> ApiResult<Application>;
    /// Fetch the configuration variables of an application.
    async fn config_vars(&self, app_id: Uuid) -> ApiResult<ConfigVars>;
    /// List the formation of an application.
    async fn formation(&self, app_id: Uuid) -> ApiResult<Vec<Formation>>;
    /// Partially update one formation entry.
    async fn update_formation(
        &self,
        app_id: Uuid,
        process_type: &str,
        update: &FormationUpdate,
    ) -> ApiResult<Formation>;
}

/// Source-control host operations used to build the source blob.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Time-limited archive download URL for `reference`.
    async fn archive_link(&self, repository: &RepositorySlug, reference: &str)
    -> ApiResult<String>;
    /// Pull requests in any state whose head matches `head` (`org:branch`),
    /// in the host's default order.
    async fn pull_requests(
        &self,
        repository: &RepositorySlug,
        head: &str,
    ) -> ApiResult<Vec<PullRequest>>;
}
