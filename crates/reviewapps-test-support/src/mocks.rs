//! In-memory collaborators that record every call.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reviewapps_api_models::{
    AppReference, Application, ConfigVars, CreateReviewAppRequest, Formation, FormationUpdate,
    Pipeline, PullRequest, ReviewApp, ReviewAppStatus,
};
use reviewapps_core::{ApiError, ApiResult, PlatformApi, RepositorySlug, SourceHost};
use uuid::Uuid;

/// Calls received by [`FakePlatform`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    /// `pipeline(name)`.
    Pipeline(String),
    /// `review_apps(pipeline_id)`.
    ReviewApps(Uuid),
    /// `create_review_app(request)`.
    CreateReviewApp(CreateReviewAppRequest),
    /// `review_app(id)`.
    ReviewApp(Uuid),
    /// `delete_review_app(id)`.
    DeleteReviewApp(Uuid),
    /// `application(app_id)`.
    Application(Uuid),
    /// `config_vars(app_id)`.
    ConfigVars(Uuid),
    /// `formation(app_id)`.
    Formation(Uuid),
    /// `update_formation(app_id, process_type, update)`.
    UpdateFormation {
        /// Application identifier.
        app_id: Uuid,
        /// Process type addressed.
        process_type: String,
        /// Update body.
        update: FormationUpdate,
    },
}

/// One scripted answer to a status poll.
#[derive(Debug, Clone)]
struct PollStep {
    status: ReviewAppStatus,
    app_id: Option<Uuid>,
    message: Option<String>,
}

#[derive(Debug, Default)]
struct PlatformState {
    pipelines: Vec<Pipeline>,
    review_apps: Vec<(Uuid, ReviewApp)>,
    applications: HashMap<Uuid, Application>,
    config_vars: HashMap<Uuid, ConfigVars>,
    formations: HashMap<Uuid, Vec<Formation>>,
    poll_script: VecDeque<PollStep>,
    conflict_on_create: bool,
    calls: Vec<PlatformCall>,
}

/// Deployment platform backed by in-memory state.
///
/// Status polls replay the scripted sequence; the last step repeats once the
/// script is exhausted.
#[derive(Debug, Default)]
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    /// Empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a pipeline.
    #[must_use]
    pub fn with_pipeline(self, pipeline: Pipeline) -> Self {
        self.state().pipelines.push(pipeline);
        self
    }

    /// Register an existing review app under `pipeline_id`.
    #[must_use]
    pub fn with_review_app(self, pipeline_id: Uuid, app: ReviewApp) -> Self {
        self.state().review_apps.push((pipeline_id, app));
        self
    }

    /// Register application metadata and configuration.
    #[must_use]
    pub fn with_application(self, application: Application, vars: ConfigVars) -> Self {
        {
            let mut state = self.state();
            state.config_vars.insert(application.id, vars);
            state.applications.insert(application.id, application);
        }
        self
    }

    /// Register the formation of an application.
    #[must_use]
    pub fn with_formation(self, app_id: Uuid, formation: Vec<Formation>) -> Self {
        self.state().formations.insert(app_id, formation);
        self
    }

    /// Append non-terminal or terminal statuses without an application.
    #[must_use]
    pub fn with_poll_statuses(self, statuses: &[ReviewAppStatus]) -> Self {
        {
            let mut state = self.state();
            for status in statuses {
                state.poll_script.push_back(PollStep {
                    status: *status,
                    app_id: None,
                    message: None,
                });
            }
        }
        self
    }

    /// Append a `created` status backed by `app_id`.
    #[must_use]
    pub fn with_poll_created(self, app_id: Uuid) -> Self {
        self.state().poll_script.push_back(PollStep {
            status: ReviewAppStatus::Created,
            app_id: Some(app_id),
            message: None,
        });
        self
    }

    /// Append an `errored` status carrying `message`.
    #[must_use]
    pub fn with_poll_errored(self, message: &str) -> Self {
        self.state().poll_script.push_back(PollStep {
            status: ReviewAppStatus::Errored,
            app_id: None,
            message: Some(message.to_string()),
        });
        self
    }

    /// Answer every create request with a conflict.
    #[must_use]
    pub fn with_create_conflict(self) -> Self {
        self.state().conflict_on_create = true;
        self
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state().calls.clone()
    }

    /// Number of calls matching `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&PlatformCall) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(call)).count()
    }

    /// Number of create requests received.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.count(|call| matches!(call, PlatformCall::CreateReviewApp(_)))
    }

    /// Number of status polls received.
    #[must_use]
    pub fn poll_calls(&self) -> usize {
        self.count(|call| matches!(call, PlatformCall::ReviewApp(_)))
    }

    /// Current formation of `app_id`.
    #[must_use]
    pub fn formation_of(&self, app_id: Uuid) -> Vec<Formation> {
        self.state()
            .formations
            .get(&app_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn not_found(resource: String) -> ApiError {
    ApiError::NotFound { resource }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn pipeline(&self, name: &str) -> ApiResult<Pipeline> {
        let mut state = self.state();
        state.calls.push(PlatformCall::Pipeline(name.to_string()));
        state
            .pipelines
            .iter()
            .find(|pipeline| pipeline.name == name || pipeline.id.to_string() == name)
            .cloned()
            .ok_or_else(|| not_found(format!("/pipelines/{name}")))
    }

    async fn review_apps(&self, pipeline_id: Uuid) -> ApiResult<Vec<ReviewApp>> {
        let mut state = self.state();
        state.calls.push(PlatformCall::ReviewApps(pipeline_id));
        if !state.pipelines.iter().any(|pipeline| pipeline.id == pipeline_id) {
            return Err(not_found(format!("/pipelines/{pipeline_id}/review-apps")));
        }
        Ok(state
            .review_apps
            .iter()
            .filter(|(owner, _)| *owner == pipeline_id)
            .map(|(_, app)| app.clone())
            .collect())
    }

    async fn create_review_app(&self, request: &CreateReviewAppRequest) -> ApiResult<ReviewApp> {
        let mut state = self.state();
        state
            .calls
            .push(PlatformCall::CreateReviewApp(request.clone()));
        if state.conflict_on_create {
            return Err(ApiError::Conflict {
                resource: "/review-apps".to_string(),
                message: "a review app is already being created for this branch".to_string(),
            });
        }
        let app = ReviewApp {
            id: Uuid::new_v4(),
            branch: request.branch.clone(),
            pr_number: request.pr_number,
            status: ReviewAppStatus::Pending,
            app: None,
            message: None,
            created_at: None,
            updated_at: None,
        };
        state.review_apps.push((request.pipeline, app.clone()));
        Ok(app)
    }

    async fn review_app(&self, id: Uuid) -> ApiResult<ReviewApp> {
        let mut state = self.state();
        state.calls.push(PlatformCall::ReviewApp(id));
        let step = if state.poll_script.len() > 1 {
            state.poll_script.pop_front()
        } else {
            state.poll_script.front().cloned()
        };
        let entry = state
            .review_apps
            .iter_mut()
            .find(|(_, app)| app.id == id)
            .ok_or_else(|| not_found(format!("/review-apps/{id}")))?;
        if let Some(step) = step {
            entry.1.status = step.status;
            entry.1.app = step.app_id.map(|id| AppReference { id });
            entry.1.message = step.message;
        }
        Ok(entry.1.clone())
    }

    async fn delete_review_app(&self, id: Uuid) -> ApiResult<ReviewApp> {
        let mut state = self.state();
        state.calls.push(PlatformCall::DeleteReviewApp(id));
        let index = state
            .review_apps
            .iter()
            .position(|(_, app)| app.id == id)
            .ok_or_else(|| not_found(format!("/review-apps/{id}")))?;
        let (_, mut app) = state.review_apps.remove(index);
        app.status = ReviewAppStatus::Deleting;
        Ok(app)
    }

    async fn application(&self, app_id: Uuid) -> ApiResult<Application> {
        let mut state = self.state();
        state.calls.push(PlatformCall::Application(app_id));
        state
            .applications
            .get(&app_id)
            .cloned()
            .ok_or_else(|| not_found(format!("/apps/{app_id}")))
    }

    async fn config_vars(&self, app_id: Uuid) -> ApiResult<ConfigVars> {
        let mut state = self.state();
        state.calls.push(PlatformCall::ConfigVars(app_id));
        state
            .config_vars
            .get(&app_id)
            .cloned()
            .ok_or_else(|| not_found(format!("/apps/{app_id}/config-vars")))
    }

    async fn formation(&self, app_id: Uuid) -> ApiResult<Vec<Formation>> {
        let mut state = self.state();
        state.calls.push(PlatformCall::Formation(app_id));
        state
            .formations
            .get(&app_id)
            .cloned()
            .ok_or_else(|| not_found(format!("/apps/{app_id}/formation")))
    }

    async fn update_formation(
        &self,
        app_id: Uuid,
        process_type: &str,
        update: &FormationUpdate,
    ) -> ApiResult<Formation> {
        let mut state = self.state();
        state.calls.push(PlatformCall::UpdateFormation {
            app_id,
            process_type: process_type.to_string(),
            update: update.clone(),
        });
        let entry = state
            .formations
            .get_mut(&app_id)
            .and_then(|entries| {
                entries
                    .iter_mut()
                    .find(|entry| entry.process_type == process_type)
            })
            .ok_or_else(|| not_found(format!("/apps/{app_id}/formation/{process_type}")))?;
        entry.quantity = update.quantity;
        if let Some(size) = &update.size {
            entry.size.clone_from(size);
        }
        Ok(entry.clone())
    }
}

/// Calls received by [`FakeSourceHost`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    /// `archive_link(repository, reference)`.
    ArchiveLink {
        /// `owner/name` of the repository.
        repository: String,
        /// Requested reference.
        reference: String,
    },
    /// `pull_requests(repository, head)`.
    PullRequests {
        /// `owner/name` of the repository.
        repository: String,
        /// Head filter.
        head: String,
    },
}

#[derive(Debug, Default)]
struct SourceState {
    archive_url: Option<String>,
    pull_requests: Vec<PullRequest>,
    calls: Vec<SourceCall>,
}

/// Source host that serves a fixed archive link and pull request list.
#[derive(Debug, Default)]
pub struct FakeSourceHost {
    state: Mutex<SourceState>,
}

impl FakeSourceHost {
    /// Host that knows every branch and serves `archive_url` for it.
    #[must_use]
    pub fn new(archive_url: &str) -> Self {
        Self {
            state: Mutex::new(SourceState {
                archive_url: Some(archive_url.to_string()),
                ..SourceState::default()
            }),
        }
    }

    /// Host that reports every repository and branch as missing.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve `pull_requests` for every head filter.
    #[must_use]
    pub fn with_pull_requests(self, pull_requests: Vec<PullRequest>) -> Self {
        self.state().pull_requests = pull_requests;
        self
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<SourceCall> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl SourceHost for FakeSourceHost {
    async fn archive_link(
        &self,
        repository: &RepositorySlug,
        reference: &str,
    ) -> ApiResult<String> {
        let mut state = self.state();
        state.calls.push(SourceCall::ArchiveLink {
            repository: repository.to_string(),
            reference: reference.to_string(),
        });
        state
            .archive_url
            .clone()
            .ok_or_else(|| not_found(format!("/repos/{repository}/tarball/{reference}")))
    }

    async fn pull_requests(
        &self,
        repository: &RepositorySlug,
        head: &str,
    ) -> ApiResult<Vec<PullRequest>> {
        let mut state = self.state();
        state.calls.push(SourceCall::PullRequests {
            repository: repository.to_string(),
            head: head.to_string(),
        });
        Ok(state.pull_requests.clone())
    }
}
