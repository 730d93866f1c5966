//! Deployment platform client over the platform's v3 JSON API.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use reviewapps_api_models::{
    Application, ConfigVars, CreateReviewAppRequest, Formation, FormationUpdate, Pipeline,
    ReviewApp,
};
use reviewapps_core::{ApiResult, PlatformApi};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::client::{CliError, CliResult};
use crate::config::RuntimeConfig;
use crate::http::{endpoint, send_json};

pub(crate) const PLATFORM_ACCEPT: &str = "application/vnd.heroku+json; version=3";
pub(crate) const HEADER_REQUEST_ID: &str = "request-id";

/// reqwest-backed [`PlatformApi`].
#[derive(Debug, Clone)]
pub(crate) struct HttpPlatform {
    client: Client,
    base_url: Url,
}

impl HttpPlatform {
    pub(crate) fn new(config: &RuntimeConfig, trace_id: &str) -> CliResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(PLATFORM_ACCEPT));
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", config.platform_token))
                .map_err(|_| CliError::validation("platform token contains invalid characters"))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.platform_url.clone(),
        })
    }

    async fn get<T>(&self, segments: &[&str]) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, segments)?;
        let resource = url.path().to_string();
        debug!(resource = %resource, "platform GET");
        send_json(self.client.get(url), &resource).await
    }
}

#[async_trait]
impl PlatformApi for HttpPlatform {
    async fn pipeline(&self, name: &str) -> ApiResult<Pipeline> {
        self.get(&["pipelines", name]).await
    }

    async fn review_apps(&self, pipeline_id: Uuid) -> ApiResult<Vec<ReviewApp>> {
        self.get(&["pipelines", &pipeline_id.to_string(), "review-apps"])
            .await
    }

    async fn create_review_app(&self, request: &CreateReviewAppRequest) -> ApiResult<ReviewApp> {
        let url = endpoint(&self.base_url, &["review-apps"])?;
        let resource = url.path().to_string();
        debug!(resource = %resource, branch = %request.branch, "platform POST");
        send_json(self.client.post(url).json(request), &resource).await
    }

    async fn review_app(&self, id: Uuid) -> ApiResult<ReviewApp> {
        self.get(&["review-apps", &id.to_string()]).await
    }

    async fn delete_review_app(&self, id: Uuid) -> ApiResult<ReviewApp> {
        let url = endpoint(&self.base_url, &["review-apps", &id.to_string()])?;
        let resource = url.path().to_string();
        debug!(resource = %resource, "platform DELETE");
        send_json(self.client.delete(url), &resource).await
    }

    async fn application(&self, app_id: Uuid) -> ApiResult<Application> {
        self.get(&["apps", &app_id.to_string()]).await
    }

    async fn config_vars(&self, app_id: Uuid) -> ApiResult<ConfigVars> {
        self.get(&["apps", &app_id.to_string(), "config-vars"]).await
    }

    async fn formation(&self, app_id: Uuid) -> ApiResult<Vec<Formation>> {
        self.get(&["apps", &app_id.to_string(), "formation"]).await
    }

    async fn update_formation(
        &self,
        app_id: Uuid,
        process_type: &str,
        update: &FormationUpdate,
    ) -> ApiResult<Formation> {
        let url = endpoint(
            &self.base_url,
            &["apps", &app_id.to_string(), "formation", process_type],
        )?;
        let resource = url.path().to_string();
        debug!(resource = %resource, quantity = update.quantity, "platform PATCH");
        send_json(self.client.patch(url).json(update), &resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_for_tests;
    use httpmock::Method::{DELETE, PATCH};
    use httpmock::prelude::*;
    use reviewapps_test_support::fixtures;
    use serde_json::json;

    fn platform(server: &MockServer) -> HttpPlatform {
        let config = config_for_tests(&server.base_url(), &server.base_url());
        HttpPlatform::new(&config, "trace-123").expect("platform client")
    }

    #[tokio::test]
    async fn requests_carry_platform_headers() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let pipeline = fixtures::pipeline("sample-app");
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/pipelines/sample-app")
                .header("accept", PLATFORM_ACCEPT)
                .header("authorization", "Bearer platform-token")
                .header("request-id", "trace-123");
            then.status(200).json_body(serde_json::to_value(&pipeline).expect("json"));
        });

        let resolved = platform(&server).pipeline("sample-app").await?;
        mock.assert();
        assert_eq!(resolved, pipeline);
        Ok(())
    }

    #[tokio::test]
    async fn not_found_and_conflict_are_distinguished() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pipelines/missing");
            then.status(404)
                .json_body(json!({"id": "not_found", "message": "Couldn't find that pipeline."}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/review-apps");
            then.status(409)
                .json_body(json!({"id": "conflict", "message": "A review app already exists"}));
        });

        let platform = platform(&server);
        let missing = platform
            .pipeline("missing")
            .await
            .expect_err("pipeline should be missing");
        assert!(missing.is_not_found());

        let request = CreateReviewAppRequest {
            branch: "feature/x".to_string(),
            pipeline: Uuid::new_v4(),
            source_blob: reviewapps_api_models::SourceBlob {
                url: "https://codeload.example.com/archive.tar.gz".to_string(),
                version: reviewapps_api_models::SOURCE_BLOB_VERSION.to_string(),
            },
            pr_number: None,
        };
        let conflict = platform
            .create_review_app(&request)
            .await
            .expect_err("create should conflict");
        assert!(conflict.is_conflict());
    }

    #[tokio::test]
    async fn create_body_omits_missing_pr_number() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let pipeline_id = Uuid::new_v4();
        let created = fixtures::review_app("feature/x", reviewapps_api_models::ReviewAppStatus::Pending);
        let mock = server.mock(|when, then| {
            when.method(POST).path("/review-apps").json_body(json!({
                "branch": "feature/x",
                "pipeline": pipeline_id,
                "source_blob": {
                    "url": "https://codeload.example.com/archive.tar.gz",
                    "version": "v1.0.0"
                }
            }));
            then.status(201).json_body(serde_json::to_value(&created).expect("json"));
        });

        let request = CreateReviewAppRequest {
            branch: "feature/x".to_string(),
            pipeline: pipeline_id,
            source_blob: reviewapps_api_models::SourceBlob {
                url: "https://codeload.example.com/archive.tar.gz".to_string(),
                version: "v1.0.0".to_string(),
            },
            pr_number: None,
        };
        let response = platform(&server).create_review_app(&request).await?;
        mock.assert();
        assert_eq!(response.id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn formation_update_patches_single_type() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let app_id = Uuid::new_v4();
        let entry = fixtures::formation("worker", 2);
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path(format!("/apps/{app_id}/formation/worker"))
                .json_body(json!({"quantity": 2, "size": "performance-m"}));
            then.status(200).json_body(serde_json::to_value(&entry).expect("json"));
        });

        let updated = platform(&server)
            .update_formation(
                app_id,
                "worker",
                &FormationUpdate {
                    quantity: 2,
                    size: Some("performance-m".to_string()),
                },
            )
            .await?;
        mock.assert();
        assert_eq!(updated.process_type, "worker");
        Ok(())
    }

    #[tokio::test]
    async fn delete_and_config_vars_hit_expected_paths() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let review_app = fixtures::review_app("feature/x", reviewapps_api_models::ReviewAppStatus::Deleting);
        let app_id = Uuid::new_v4();
        let delete = server.mock(|when, then| {
            when.method(DELETE).path(format!("/review-apps/{}", review_app.id));
            then.status(200).json_body(serde_json::to_value(&review_app).expect("json"));
        });
        let vars = server.mock(|when, then| {
            when.method(GET).path(format!("/apps/{app_id}/config-vars"));
            then.status(200)
                .json_body(json!({"DATABASE_URL": fixtures::SAMPLE_DATABASE_URL}));
        });

        let platform = platform(&server);
        let deleted = platform.delete_review_app(review_app.id).await?;
        let config = platform.config_vars(app_id).await?;
        delete.assert();
        vars.assert();
        assert_eq!(deleted.id, review_app.id);
        assert_eq!(
            config.get("DATABASE_URL").map(String::as_str),
            Some(fixtures::SAMPLE_DATABASE_URL)
        );
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pipelines/sample-app");
            then.status(200).body("<html>maintenance</html>");
        });

        let err = platform(&server)
            .pipeline("sample-app")
            .await
            .expect_err("body should not decode");
        assert!(matches!(err, reviewapps_core::ApiError::Decode { .. }));
    }
}
