//! Response handling shared by the platform and source host clients.

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use reviewapps_api_models::PlatformProblem;
use reviewapps_core::{ApiError, ApiResult};
use serde::de::DeserializeOwned;

/// Append `segments` to `base`, percent-encoding each one as a single segment.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::Transport {
            resource: base.to_string(),
            source: "base URL cannot carry a path".into(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send `request` and decode a JSON body from a successful response.
pub(crate) async fn send_json<T>(request: RequestBuilder, resource: &str) -> ApiResult<T>
where
    T: DeserializeOwned,
{
    let response = send(request, resource).await?;
    if !response.status().is_success() {
        return Err(classify_response(response, resource).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode {
            resource: resource.to_string(),
            source: Box::new(err),
        })
}

/// Send `request`, mapping transport failures only.
pub(crate) async fn send(request: RequestBuilder, resource: &str) -> ApiResult<Response> {
    request.send().await.map_err(|err| ApiError::Transport {
        resource: resource.to_string(),
        source: Box::new(err),
    })
}

/// Classify a non-success response into a collaborator error.
///
/// 404 is `NotFound`, 409 is `Conflict`; anything else keeps its status. The
/// message comes from an `{id, message}` error body when present, otherwise
/// from the raw body text.
pub(crate) async fn classify_response(response: Response, resource: &str) -> ApiError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<PlatformProblem>(&bytes)
        .ok()
        .map(|problem| problem.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(&bytes).trim().to_string());

    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound {
            resource: resource.to_string(),
        },
        StatusCode::CONFLICT => ApiError::Conflict {
            resource: resource.to_string(),
            message,
        },
        _ => ApiError::Status {
            resource: resource.to_string(),
            status: status.as_u16(),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("no body").to_string()
            } else {
                message
            },
        },
    }
}
