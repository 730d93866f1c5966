//! Pipeline resolution and branch lookups shared by every command.

use reviewapps_api_models::{Pipeline, ReviewApp};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ReviewError, ReviewResult};
use crate::service::PlatformApi;

/// Resolve a pipeline by name.
///
/// # Errors
///
/// [`ReviewError::PipelineNotFound`] when the platform does not know the name.
pub async fn resolve_pipeline<P>(platform: &P, name: &str) -> ReviewResult<Pipeline>
where
    P: PlatformApi + ?Sized,
{
    match platform.pipeline(name).await {
        Ok(pipeline) => {
            debug!(pipeline = name, pipeline_id = %pipeline.id, "resolved pipeline");
            Ok(pipeline)
        }
        Err(err) if err.is_not_found() => Err(ReviewError::PipelineNotFound {
            pipeline: name.to_string(),
        }),
        Err(err) => Err(ReviewError::upstream("pipeline.info", err)),
    }
}

/// List every review app under the named pipeline.
///
/// # Errors
///
/// [`ReviewError::PipelineNotFound`] when the pipeline is unknown; any other
/// platform failure is [`ReviewError::Upstream`].
pub async fn list_review_apps<P>(platform: &P, pipeline: &str) -> ReviewResult<Vec<ReviewApp>>
where
    P: PlatformApi + ?Sized,
{
    let pipeline = resolve_pipeline(platform, pipeline).await?;
    platform
        .review_apps(pipeline.id)
        .await
        .map_err(|err| ReviewError::upstream("review_app.list", err))
}

/// Find the review app deployed from exactly `branch`, if any.
///
/// # Errors
///
/// Any listing failure, not-found included, is [`ReviewError::Upstream`].
pub async fn find_review_app<P>(
    platform: &P,
    pipeline_id: Uuid,
    branch: &str,
) -> ReviewResult<Option<ReviewApp>>
where
    P: PlatformApi + ?Sized,
{
    let apps = platform
        .review_apps(pipeline_id)
        .await
        .map_err(|err| ReviewError::upstream("review_app.list", err))?;
    Ok(matching_branch(apps, branch))
}

/// Locate the review app for `branch`, failing when there is none.
///
/// # Errors
///
/// [`ReviewError::PipelineNotFound`] or [`ReviewError::ReviewAppNotFound`]; a
/// not-found listing counts as the latter.
pub async fn locate_review_app<P>(
    platform: &P,
    pipeline: &str,
    branch: &str,
) -> ReviewResult<ReviewApp>
where
    P: PlatformApi + ?Sized,
{
    let pipeline = resolve_pipeline(platform, pipeline).await?;
    let apps = match platform.review_apps(pipeline.id).await {
        Ok(apps) => apps,
        Err(err) if err.is_not_found() => Vec::new(),
        Err(err) => return Err(ReviewError::upstream("review_app.list", err)),
    };
    matching_branch(apps, branch).ok_or_else(|| ReviewError::ReviewAppNotFound {
        branch: branch.to_string(),
    })
}

fn matching_branch(apps: Vec<ReviewApp>, branch: &str) -> Option<ReviewApp> {
    apps.into_iter().find(|app| app.branch == branch)
}

/// Delete the review app deployed from `branch`.
///
/// # Errors
///
/// [`ReviewError::PipelineNotFound`] or [`ReviewError::ReviewAppNotFound`]
/// (including when the platform no longer knows the app at delete time).
pub async fn delete_review_app<P>(
    platform: &P,
    pipeline: &str,
    branch: &str,
) -> ReviewResult<ReviewApp>
where
    P: PlatformApi + ?Sized,
{
    let app = locate_review_app(platform, pipeline, branch).await?;
    match platform.delete_review_app(app.id).await {
        Ok(deleted) => {
            info!(review_app_id = %deleted.id, branch, "deleted review app");
            Ok(deleted)
        }
        Err(err) if err.is_not_found() => Err(ReviewError::ReviewAppNotFound {
            branch: branch.to_string(),
        }),
        Err(err) => Err(ReviewError::upstream("review_app.delete", err)),
    }
}
