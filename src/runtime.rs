//! Runtime support for the gateway - HTTP integration.

use crate::client::AuthToken;
use crate::schema::GatewaySchema;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

/// ServeMux - main gateway handler
///
/// Owns the built schema and handles the routing of GraphQL requests. The
/// bearer credential is pulled out of the inbound `Authorization` header and
/// scoped to exactly one query; it never outlives the request.
pub struct ServeMux {
    schema: GatewaySchema,
}

impl ServeMux {
    /// Create a new ServeMux with an already built schema
    pub fn new(schema: GatewaySchema) -> Self {
        Self { schema }
    }

    /// Access the schema
    pub fn schema(&self) -> &GatewaySchema {
        &self.schema
    }

    /// Handle a GraphQL HTTP request.
    ///
    /// The request pipeline:
    /// 1. Extract the bearer credential from the headers, if present
    /// 2. Inject it into the request data for this one query
    /// 3. Execute the query against the schema
    ///
    /// A missing credential is not fatal at this layer; the resolver layer
    /// reports `UNAUTHENTICATED` per field, so introspection-only queries
    /// still work.
    pub async fn handle_http(&self, headers: HeaderMap, request: GraphQLRequest) -> GraphQLResponse {
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let span = tracing::info_span!("graphql_request", %request_id);

        let mut gql_request = request.into_inner();
        if let Some(token) = bearer_token(&headers) {
            gql_request = gql_request.data(token);
        }

        self.schema.execute(gql_request).instrument(span).await.into()
    }

    /// Convert to Axum router
    pub fn into_router(self) -> Router {
        let state = Arc::new(self);

        Router::new()
            .route("/graphql", post(handle_graphql_post).get(graphql_playground))
            .route("/health", get(health_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// Pull the bearer credential out of the inbound `Authorization` header.
///
/// Token extraction policy belongs to the hosting layer; this is the default
/// adapter for plain `Bearer <token>` headers.
fn bearer_token(headers: &HeaderMap) -> Option<AuthToken> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(AuthToken::new(token))
}

/// Handler for POST requests to /graphql
async fn handle_graphql_post(
    State(mux): State<Arc<ServeMux>>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> impl IntoResponse {
    mux.handle_http(headers, request).await
}

/// Serve the GraphQL Playground UI for ad-hoc exploration.
async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}

/// Liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::UpstreamClient;
    use crate::schema::build_schema;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn build_router() -> Router {
        let upstream = UpstreamClient::new("http://127.0.0.1:1").expect("client builds");
        ServeMux::new(build_schema(upstream)).into_router()
    }

    #[test]
    fn bearer_token_parses_well_formed_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer t_abc123".parse().unwrap());
        assert!(bearer_token(&headers).is_some());
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_absence() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcjpwdw==".parse().unwrap());
        assert!(bearer_token(&headers).is_none());

        assert!(bearer_token(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }

    #[tokio::test]
    async fn playground_served_on_get() {
        let app = build_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/graphql")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("receive response");

        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let body_str = String::from_utf8(body.to_vec()).expect("utf8 body");

        assert!(
            body_str.contains("GraphQL Playground"),
            "playground HTML should be returned"
        );
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = build_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("receive response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn post_without_credential_reports_unauthenticated() {
        let app = build_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query": "{ me { id } }"}"#))
                    .expect("build request"),
            )
            .await
            .expect("receive response");

        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let body_str = String::from_utf8(body.to_vec()).expect("utf8 body");

        assert!(body_str.contains("UNAUTHENTICATED"));
    }
}
