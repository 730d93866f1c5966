//! Source host client: archive links and pull request lookups.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use reviewapps_api_models::PullRequest;
use reviewapps_core::{ApiError, ApiResult, RepositorySlug, SourceHost};
use tracing::debug;

use crate::client::{CliError, CliResult};
use crate::config::RuntimeConfig;
use crate::http::{classify_response, endpoint, send, send_json};

pub(crate) const SOURCE_ACCEPT: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("reviewapps/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`SourceHost`]; never follows redirects so archive links can be read.
#[derive(Debug, Clone)]
pub(crate) struct HttpSourceHost {
    client: Client,
    base_url: Url,
}

impl HttpSourceHost {
    pub(crate) fn new(config: &RuntimeConfig) -> CliResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(SOURCE_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(token) = &config.source_token {
            let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| CliError::validation("source token contains invalid characters"))?;
            authorization.set_sensitive(true);
            headers.insert(AUTHORIZATION, authorization);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .default_headers(headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.source_url.clone(),
        })
    }
}

#[async_trait]
impl SourceHost for HttpSourceHost {
    async fn archive_link(
        &self,
        repository: &RepositorySlug,
        reference: &str,
    ) -> ApiResult<String> {
        let url = endpoint(
            &self.base_url,
            &[
                "repos",
                repository.owner(),
                repository.name(),
                "tarball",
                reference,
            ],
        )?;
        let resource = url.path().to_string();
        debug!(resource = %resource, "source HEAD");
        let response = send(self.client.head(url.clone()), &resource).await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| ApiError::Decode {
                    resource: resource.clone(),
                    source: "redirect without a Location header".into(),
                })?;
            // Relative locations resolve against the request URL.
            let link = url.join(location).map_err(|err| ApiError::Decode {
                resource: resource.clone(),
                source: Box::new(err),
            })?;
            return Ok(link.into());
        }
        if status.is_success() {
            return Ok(url.into());
        }
        Err(classify_response(response, &resource).await)
    }

    async fn pull_requests(
        &self,
        repository: &RepositorySlug,
        head: &str,
    ) -> ApiResult<Vec<PullRequest>> {
        let mut url = endpoint(
            &self.base_url,
            &["repos", repository.owner(), repository.name(), "pulls"],
        )?;
        url.query_pairs_mut()
            .append_pair("state", "all")
            .append_pair("head", head);
        let resource = url.path().to_string();
        debug!(resource = %resource, head, "source GET");
        send_json(self.client.get(url), &resource).await
    }
}
