use reviewapps_api_models::ReviewAppStatus;
use reviewapps_core::{
    FormationAdjuster, FormationChange, ReviewError, delete_review_app, list_review_apps,
};
use reviewapps_test_support::fixtures;
use reviewapps_test_support::mocks::{FakePlatform, PlatformCall};
use uuid::Uuid;

#[tokio::test]
async fn list_returns_apps_of_the_pipeline_only() -> anyhow::Result<()> {
    let pipeline = fixtures::pipeline("sample-app");
    let other = fixtures::pipeline("other-app");
    let platform = FakePlatform::new()
        .with_pipeline(pipeline.clone())
        .with_pipeline(other.clone())
        .with_review_app(
            pipeline.id,
            fixtures::review_app("feature/a", ReviewAppStatus::Created),
        )
        .with_review_app(
            other.id,
            fixtures::review_app("feature/b", ReviewAppStatus::Pending),
        );

    let apps = list_review_apps(&platform, "sample-app").await?;
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].branch, "feature/a");
    Ok(())
}

#[tokio::test]
async fn list_for_unknown_pipeline_fails() {
    let platform = FakePlatform::new();
    let err = list_review_apps(&platform, "missing")
        .await
        .expect_err("unknown pipeline");
    assert!(matches!(err, ReviewError::PipelineNotFound { .. }));
    assert_eq!(platform.calls().len(), 1);
}

#[tokio::test]
async fn delete_targets_the_exact_branch() -> anyhow::Result<()> {
    let pipeline = fixtures::pipeline("sample-app");
    let keep = fixtures::review_app("feature/x-2", ReviewAppStatus::Created);
    let target = fixtures::review_app("feature/x", ReviewAppStatus::Created);
    let target_id = target.id;
    let platform = FakePlatform::new()
        .with_pipeline(pipeline.clone())
        .with_review_app(pipeline.id, keep)
        .with_review_app(pipeline.id, target);

    let deleted = delete_review_app(&platform, "sample-app", "feature/x").await?;
    assert_eq!(deleted.id, target_id);
    assert_eq!(
        platform.count(|call| matches!(call, PlatformCall::DeleteReviewApp(id) if *id == target_id)),
        1
    );

    let remaining = list_review_apps(&platform, "sample-app").await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].branch, "feature/x-2");
    Ok(())
}

#[tokio::test]
async fn delete_of_unknown_branch_issues_no_delete() {
    let pipeline = fixtures::pipeline("sample-app");
    let platform = FakePlatform::new().with_pipeline(pipeline);

    let err = delete_review_app(&platform, "sample-app", "feature/none")
        .await
        .expect_err("no review app");
    assert!(matches!(err, ReviewError::ReviewAppNotFound { ref branch } if branch == "feature/none"));
    assert_eq!(
        platform.count(|call| matches!(call, PlatformCall::DeleteReviewApp(_))),
        0
    );
}

#[tokio::test]
async fn delete_for_unknown_pipeline_fails_first() {
    let platform = FakePlatform::new();
    let err = delete_review_app(&platform, "missing", "feature/x")
        .await
        .expect_err("unknown pipeline");
    assert!(matches!(err, ReviewError::PipelineNotFound { .. }));
    assert_eq!(platform.calls().len(), 1);
}

fn formation_platform(app_id: Uuid) -> FakePlatform {
    let pipeline = fixtures::pipeline("sample-app");
    FakePlatform::new()
        .with_pipeline(pipeline.clone())
        .with_review_app(
            pipeline.id,
            fixtures::provisioned_review_app("feature/x", app_id),
        )
        .with_formation(
            app_id,
            vec![fixtures::formation("web", 2), fixtures::formation("worker", 3)],
        )
}

#[tokio::test]
async fn formation_list_returns_every_entry() -> anyhow::Result<()> {
    let app_id = Uuid::new_v4();
    let platform = formation_platform(app_id);

    let formation = FormationAdjuster::new(&platform)
        .list("sample-app", "feature/x")
        .await?;
    let types: Vec<_> = formation
        .iter()
        .map(|entry| entry.process_type.as_str())
        .collect();
    assert_eq!(types, vec!["web", "worker"]);
    Ok(())
}

#[tokio::test]
async fn default_update_scales_web_only() -> anyhow::Result<()> {
    let app_id = Uuid::new_v4();
    let platform = formation_platform(app_id);

    let updated = FormationAdjuster::new(&platform)
        .update("sample-app", "feature/x", &FormationChange::default())
        .await?;
    assert_eq!(updated.process_type, "web");
    assert_eq!(updated.quantity, 1);

    let after = platform.formation_of(app_id);
    let worker = after
        .iter()
        .find(|entry| entry.process_type == "worker")
        .expect("worker entry");
    assert_eq!(worker.quantity, 3);
    Ok(())
}

#[tokio::test]
async fn update_with_size_changes_size_and_quantity() -> anyhow::Result<()> {
    let app_id = Uuid::new_v4();
    let platform = formation_platform(app_id);
    let change = FormationChange {
        process_type: "worker".to_string(),
        quantity: 0,
        size: Some("performance-m".to_string()),
    };

    let updated = FormationAdjuster::new(&platform)
        .update("sample-app", "feature/x", &change)
        .await?;
    assert_eq!(updated.quantity, 0);
    assert_eq!(updated.size, "performance-m");
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_process_type_is_formation_not_found() {
    let app_id = Uuid::new_v4();
    let platform = formation_platform(app_id);
    let change = FormationChange {
        process_type: "clock".to_string(),
        ..FormationChange::default()
    };

    let err = FormationAdjuster::new(&platform)
        .update("sample-app", "feature/x", &change)
        .await
        .expect_err("unknown process type");
    match err {
        ReviewError::FormationNotFound { process_type, .. } => {
            assert_eq!(process_type.as_deref(), Some("clock"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn formation_of_unprovisioned_app_is_review_app_not_found() {
    let pipeline = fixtures::pipeline("sample-app");
    let platform = FakePlatform::new()
        .with_pipeline(pipeline.clone())
        .with_review_app(
            pipeline.id,
            fixtures::review_app("feature/x", ReviewAppStatus::Pending),
        );

    let err = FormationAdjuster::new(&platform)
        .list("sample-app", "feature/x")
        .await
        .expect_err("no application yet");
    assert!(matches!(err, ReviewError::ReviewAppNotFound { .. }));
    assert_eq!(
        platform.count(|call| matches!(call, PlatformCall::Formation(_))),
        0
    );
}

#[tokio::test]
async fn formation_missing_on_platform_is_formation_not_found() {
    let app_id = Uuid::new_v4();
    let pipeline = fixtures::pipeline("sample-app");
    let platform = FakePlatform::new()
        .with_pipeline(pipeline.clone())
        .with_review_app(
            pipeline.id,
            fixtures::provisioned_review_app("feature/x", app_id),
        );

    let err = FormationAdjuster::new(&platform)
        .list("sample-app", "feature/x")
        .await
        .expect_err("no formation");
    assert!(matches!(
        err,
        ReviewError::FormationNotFound {
            process_type: None,
            ..
        }
    ));
}

#[tokio::test]
async fn formation_list_for_unknown_pipeline_stops_after_the_lookup() {
    let platform = FakePlatform::new();

    let err = FormationAdjuster::new(&platform)
        .list("missing", "feature/x")
        .await
        .expect_err("unknown pipeline");
    assert!(matches!(err, ReviewError::PipelineNotFound { ref pipeline } if pipeline == "missing"));
    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Pipeline("missing".to_string())]
    );
}

#[tokio::test]
async fn formation_update_for_unknown_pipeline_stops_after_the_lookup() {
    let platform = FakePlatform::new();

    let err = FormationAdjuster::new(&platform)
        .update("missing", "feature/x", &FormationChange::default())
        .await
        .expect_err("unknown pipeline");
    assert!(matches!(err, ReviewError::PipelineNotFound { .. }));
    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Pipeline("missing".to_string())]
    );
}
