//! Shared HTTP transport core.
//!
//! Every operation in this crate funnels through [`send_json`]: build a JSON
//! request, attach the bearer credential when asked, send, and let the caller
//! classify the outcome. Within one call the credential is read before the
//! send and the body is parsed before any callback runs; no ordering is
//! guaranteed across calls.

use aula_core::{ApiError, ApiResult};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Read-only view of the current bearer credential.
///
/// The resource layer holds a reference to the credential slot without
/// owning it; the session layer stays the only writer.
pub trait CredentialSource: Send + Sync {
    /// Current credential; empty string when no session is active.
    fn credential(&self) -> String;
}

/// Fixed-token source (tests, service-to-service calls).
#[derive(Debug, Clone)]
pub struct StaticCredential(pub String);

impl CredentialSource for StaticCredential {
    fn credential(&self) -> String {
        self.0.clone()
    }
}

/// Build and send one JSON request.
///
/// `credential` is attached as `Authorization: Bearer <token>` when present.
/// A request that never completes maps to [`ApiError::Transport`].
pub async fn send_json<B: Serialize + ?Sized>(
    http: &Client,
    method: Method,
    url: &str,
    credential: Option<&str>,
    body: Option<&B>,
) -> ApiResult<Response> {
    let mut request = http
        .request(method, url)
        .header(reqwest::header::CONTENT_TYPE, "application/json");
    if let Some(token) = credential {
        request = request.bearer_auth(token);
    }
    if let Some(body) = body {
        request = request.json(body);
    }
    request
        .send()
        .await
        .map_err(|err| ApiError::transport(err.to_string()))
}

/// Classify a response that must be exactly `200 OK` (reads, session ops).
pub fn ensure_ok(response: Response) -> ApiResult<Response> {
    if response.status() == StatusCode::OK {
        Ok(response)
    } else {
        Err(status_error(response.status()))
    }
}

/// Classify a response where any 2xx counts as success (mutations).
pub fn ensure_success(response: Response) -> ApiResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response.status()))
    }
}

fn status_error(status: StatusCode) -> ApiError {
    ApiError::status(status.as_u16(), status.canonical_reason().unwrap_or_default())
}

/// Parse a JSON body. An empty body is legal for mutations (e.g. a 204
/// delete) and yields `None`.
pub async fn parse_json<T: DeserializeOwned>(response: Response) -> ApiResult<Option<T>> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| ApiError::transport(err.to_string()))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| ApiError::transport(format!("invalid response body: {err}")))
}
