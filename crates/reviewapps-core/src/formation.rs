//! Formation lookups and updates, always scoped through a review app's branch.

use reviewapps_api_models::{Formation, FormationUpdate, ReviewApp};
use tracing::info;
use uuid::Uuid;

use crate::catalog::locate_review_app;
use crate::error::{ReviewError, ReviewResult};
use crate::service::PlatformApi;

/// Process type updated when none is specified.
pub const DEFAULT_PROCESS_TYPE: &str = "web";

/// Quantity applied when none is specified.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Review app located by branch together with its provisioned application.
#[derive(Debug, Clone)]
pub struct FormationTarget {
    /// Review app matched by branch.
    pub review_app: ReviewApp,
    /// Application backing the review app.
    pub app_id: Uuid,
}

/// Requested change to a single formation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationChange {
    /// Process type to update.
    pub process_type: String,
    /// Desired instance count.
    pub quantity: u32,
    /// Optional new size class.
    pub size: Option<String>,
}

impl Default for FormationChange {
    fn default() -> Self {
        Self {
            process_type: DEFAULT_PROCESS_TYPE.to_string(),
            quantity: DEFAULT_QUANTITY,
            size: None,
        }
    }
}

/// Reads and mutates the formation behind a review app.
pub struct FormationAdjuster<'a, P: ?Sized> {
    platform: &'a P,
}

impl<'a, P> FormationAdjuster<'a, P>
where
    P: PlatformApi + ?Sized,
{
    /// Adjuster backed by `platform`.
    #[must_use]
    pub const fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    /// Locate the application behind the review app for `branch`.
    ///
    /// # Errors
    ///
    /// [`ReviewError::PipelineNotFound`], or [`ReviewError::ReviewAppNotFound`]
    /// when no review app matches or it has no application yet.
    pub async fn locate(&self, pipeline: &str, branch: &str) -> ReviewResult<FormationTarget> {
        let review_app = locate_review_app(self.platform, pipeline, branch).await?;
        let app_id = review_app
            .app_id()
            .ok_or_else(|| ReviewError::ReviewAppNotFound {
                branch: branch.to_string(),
            })?;
        Ok(FormationTarget { review_app, app_id })
    }

    /// List the formation of the review app for `branch`.
    ///
    /// # Errors
    ///
    /// Lookup errors from [`Self::locate`], or [`ReviewError::FormationNotFound`].
    pub async fn list(&self, pipeline: &str, branch: &str) -> ReviewResult<Vec<Formation>> {
        let target = self.locate(pipeline, branch).await?;
        match self.platform.formation(target.app_id).await {
            Ok(formation) => Ok(formation),
            Err(err) if err.is_not_found() => Err(ReviewError::FormationNotFound {
                app_id: target.app_id,
                process_type: None,
            }),
            Err(err) => Err(ReviewError::upstream("formation.list", err)),
        }
    }

    /// Apply `change` to the matching formation entry only.
    ///
    /// # Errors
    ///
    /// Lookup errors from [`Self::locate`], or [`ReviewError::FormationNotFound`]
    /// when the process type does not exist.
    pub async fn update(
        &self,
        pipeline: &str,
        branch: &str,
        change: &FormationChange,
    ) -> ReviewResult<Formation> {
        let target = self.locate(pipeline, branch).await?;
        let update = FormationUpdate {
            quantity: change.quantity,
            size: change.size.clone(),
        };
        match self
            .platform
            .update_formation(target.app_id, &change.process_type, &update)
            .await
        {
            Ok(formation) => {
                info!(
                    app_id = %target.app_id,
                    process_type = %formation.process_type,
                    quantity = formation.quantity,
                    "updated formation"
                );
                Ok(formation)
            }
            Err(err) if err.is_not_found() => Err(ReviewError::FormationNotFound {
                app_id: target.app_id,
                process_type: Some(change.process_type.clone()),
            }),
            Err(err) => Err(ReviewError::upstream("formation.update", err)),
        }
    }
}
