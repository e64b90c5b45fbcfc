//! HTTP client for the upstream content-platform REST API.
//!
//! One logical resource fetch per call, bearer-authenticated with the
//! caller's per-query credential. Transport and response errors are
//! normalized into [`Error`](crate::Error), and the envelope unwrap rule for
//! every list endpoint is declared here, next to its fetch method, so the
//! shape contract stays auditable in one place.
//!
//! No retries and no caching: the upstream's throttling policy is unknown
//! and must not be guessed.

use crate::error::{Error, Result};
use crate::types::{ContentAnalyticsPage, ContentRevision, Me, Org, SearchAnalytics, Space};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Opaque bearer credential for one query.
///
/// The hosting layer extracts it from the inbound request; the gateway
/// carries it in the GraphQL request data for the duration of a single query
/// and attaches it to every upstream call. It is caller-specific and is
/// never stored on the client or written to logs.
#[derive(Clone)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Envelope key under which a list endpoint nests its payload.
///
/// The upstream is inconsistent about this: owner and space collections
/// arrive under `items`, analytics collections under `pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Envelope {
    Items,
    Pages,
}

impl Envelope {
    fn key(self) -> &'static str {
        match self {
            Envelope::Items => "items",
            Envelope::Pages => "pages",
        }
    }
}

/// Client for the upstream REST API.
///
/// Holds the base URL and a connection-pooling HTTP client; the credential
/// is supplied per call, never held here.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Create a new builder for UpstreamClient
    pub fn builder() -> UpstreamClientBuilder {
        UpstreamClientBuilder::default()
    }

    /// Create a client with default settings for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one authenticated call and return the decoded JSON body.
    ///
    /// A non-success status, or an `{error: {code, message}}` envelope in the
    /// body, surfaces as [`Error::Upstream`]. The envelope is inspected even
    /// on success-shaped transport responses, since the upstream can pair the
    /// two freely.
    pub async fn request(&self, method: Method, path: &str, token: &AuthToken) -> Result<JsonValue> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let response = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body: JsonValue = if bytes.is_empty() {
            JsonValue::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(err) if status.is_success() => return Err(Error::Serialization(err)),
                // error statuses sometimes carry non-JSON bodies; the status
                // alone is enough to classify them
                Err(_) => JsonValue::Null,
            }
        };

        debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "upstream call"
        );

        if let Some(err) = upstream_error(status, &body) {
            return Err(err);
        }

        Ok(body)
    }

    /// `GET` a resource and deserialize it as `T`.
    async fn fetch<T: DeserializeOwned>(&self, path: &str, token: &AuthToken) -> Result<T> {
        let body = self.request(Method::GET, path, token).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// `GET` a list resource and unwrap its declared envelope.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        envelope: Envelope,
        token: &AuthToken,
    ) -> Result<Vec<T>> {
        let body = self.request(Method::GET, path, token).await?;
        unwrap_envelope(path, envelope, body)
    }

    /// `GET /user` - the caller's own identity.
    pub async fn current_user(&self, token: &AuthToken) -> Result<Me> {
        self.fetch("/user", token).await
    }

    /// `GET /orgs` - organizations the caller belongs to.
    pub async fn orgs(&self, token: &AuthToken) -> Result<Vec<Org>> {
        self.fetch_list("/orgs", Envelope::Items, token).await
    }

    /// `GET /owners/{uid}` - a single owner, discriminated by `kind`.
    ///
    /// Returns the raw payload: variant selection happens in
    /// [`resolve_owner`](crate::types::resolve_owner), which owns the
    /// discriminant rule.
    pub async fn owner(&self, uid: &str, token: &AuthToken) -> Result<JsonValue> {
        self.request(Method::GET, &format!("/owners/{uid}"), token).await
    }

    /// `GET /user/spaces` - spaces owned by the caller.
    pub async fn current_user_spaces(&self, token: &AuthToken) -> Result<Vec<Space>> {
        self.fetch_list("/user/spaces", Envelope::Items, token).await
    }

    /// `GET /owners/{ownerId}/spaces` - spaces owned by a specific owner.
    pub async fn owner_spaces(&self, owner_id: &str, token: &AuthToken) -> Result<Vec<Space>> {
        self.fetch_list(&format!("/owners/{owner_id}/spaces"), Envelope::Items, token)
            .await
    }

    /// `GET /spaces/{uid}` - a single space.
    pub async fn space(&self, uid: &str, token: &AuthToken) -> Result<Space> {
        self.fetch(&format!("/spaces/{uid}"), token).await
    }

    /// `GET /spaces/{spaceId}/analytics/content` - per-page view metrics.
    pub async fn space_content_analytics(
        &self,
        space_id: &str,
        token: &AuthToken,
    ) -> Result<Vec<ContentAnalyticsPage>> {
        self.fetch_list(
            &format!("/spaces/{space_id}/analytics/content"),
            Envelope::Pages,
            token,
        )
        .await
    }

    /// `GET /spaces/{spaceId}/analytics/search` - aggregate and per-query
    /// search metrics, as a single record.
    pub async fn space_search_analytics(
        &self,
        space_id: &str,
        token: &AuthToken,
    ) -> Result<SearchAnalytics> {
        self.fetch(&format!("/spaces/{space_id}/analytics/search"), token).await
    }

    /// `GET /spaces/{spaceId}/content` - the current revision of the space's
    /// document tree. The payload already carries the fully nested page
    /// tree; it is passed through unchanged.
    pub async fn space_content(&self, space_id: &str, token: &AuthToken) -> Result<ContentRevision> {
        self.fetch(&format!("/spaces/{space_id}/content"), token).await
    }
}

/// Builder for UpstreamClient
#[derive(Debug, Default)]
pub struct UpstreamClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
    default_headers: HashMap<String, String>,
}

impl UpstreamClientBuilder {
    /// Set the base URL for all endpoints
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a request timeout.
    ///
    /// The gateway core imposes none of its own; this belongs to the hosting
    /// configuration surface.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a default header for all requests
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Build the UpstreamClient
    pub fn build(self) -> Result<UpstreamClient> {
        if self.base_url.is_empty() {
            return Err(Error::Schema("upstream client requires a base_url".into()));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &self.default_headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::Schema(format!("invalid default header `{key}`: {e}")))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| Error::Schema(format!("invalid default header `{key}`: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Schema(format!("failed to create HTTP client: {e}")))?;

        Ok(UpstreamClient {
            base_url: self.base_url,
            http,
        })
    }
}

/// Detect an upstream failure in a (status, body) pair.
///
/// The upstream signals errors through the transport status, through an
/// `{error: {code, message}}` body envelope, or through both at once; either
/// signal alone is authoritative.
fn upstream_error(status: StatusCode, body: &JsonValue) -> Option<Error> {
    let envelope = body.get("error");
    if status.is_success() && envelope.is_none() {
        return None;
    }

    let code = envelope
        .and_then(|e| e.get("code"))
        .and_then(|code| match code {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        });
    let message = envelope
        .and_then(|e| e.get("message"))
        .and_then(JsonValue::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("upstream returned status {}", status.as_u16()));

    Some(Error::Upstream {
        status: status.as_u16(),
        code,
        message,
    })
}

/// Unwrap exactly one envelope level to the declared sequence type.
///
/// An empty envelope yields an empty sequence. A payload that lacks the
/// declared key altogether violates the stated upstream shape: under
/// non-production validation that is an error, in release builds it degrades
/// to an empty sequence.
fn unwrap_envelope<T: DeserializeOwned>(
    path: &str,
    envelope: Envelope,
    mut body: JsonValue,
) -> Result<Vec<T>> {
    match body.get_mut(envelope.key()) {
        Some(list) => Ok(serde_json::from_value(list.take())?),
        None if cfg!(debug_assertions) => Err(Error::ShapeMismatch {
            path: path.to_string(),
            key: envelope.key().to_string(),
        }),
        None => {
            error!(path, key = envelope.key(), "upstream response is missing its declared envelope");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_requires_base_url() {
        let result = UpstreamClient::builder().build();
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = UpstreamClient::new("https://api.example.com/v1/").expect("client builds");
        assert_eq!(client.base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn test_builder_rejects_invalid_default_header() {
        let result = UpstreamClient::builder()
            .base_url("https://api.example.com")
            .default_header("x-team\n", "docs")
            .build();
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_auth_token_debug_is_redacted() {
        let token = AuthToken::new("t_very_secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("t_very_secret"));
    }

    #[test]
    fn test_upstream_error_ignores_clean_success() {
        let body = json!({"id": "u_1", "kind": "user"});
        assert!(upstream_error(StatusCode::OK, &body).is_none());
    }

    #[test]
    fn test_upstream_error_detects_envelope_on_success_status() {
        let body = json!({"error": {"code": 404, "message": "owner not found"}});
        let err = upstream_error(StatusCode::OK, &body).expect("envelope detected");
        match err {
            Error::Upstream { status, code, message } => {
                assert_eq!(status, 200);
                assert_eq!(code.as_deref(), Some("404"));
                assert_eq!(message, "owner not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upstream_error_on_error_status_without_envelope() {
        let err = upstream_error(StatusCode::BAD_GATEWAY, &JsonValue::Null).expect("status detected");
        match err {
            Error::Upstream { status, code, message } => {
                assert_eq!(status, 502);
                assert_eq!(code, None);
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upstream_error_prefers_string_codes() {
        let body = json!({"error": {"code": "forbidden", "message": "no access"}});
        let err = upstream_error(StatusCode::FORBIDDEN, &body).expect("envelope detected");
        match err {
            Error::Upstream { code, .. } => assert_eq!(code.as_deref(), Some("forbidden")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unwrap_envelope_items() {
        let body = json!({"items": [{"id": "sp_1", "title": "Docs"}]});
        let spaces: Vec<Space> = unwrap_envelope("/user/spaces", Envelope::Items, body).unwrap();
        assert_eq!(spaces.len(), 1);
        assert_eq!(spaces[0].id.as_deref(), Some("sp_1"));
    }

    #[test]
    fn test_unwrap_empty_envelope_yields_empty_sequence() {
        let body = json!({"items": []});
        let spaces: Vec<Space> = unwrap_envelope("/user/spaces", Envelope::Items, body).unwrap();
        assert!(spaces.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_unwrap_missing_envelope_is_shape_mismatch() {
        let body = json!({"records": []});
        let result: Result<Vec<Space>> = unwrap_envelope("/user/spaces", Envelope::Items, body);
        match result {
            Err(Error::ShapeMismatch { path, key }) => {
                assert_eq!(path, "/user/spaces");
                assert_eq!(key, "items");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_keys() {
        assert_eq!(Envelope::Items.key(), "items");
        assert_eq!(Envelope::Pages.key(), "pages");
    }
}
