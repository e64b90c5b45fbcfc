//! Gateway builder and main orchestration

use crate::client::UpstreamClient;
use crate::error::{Error, Result};
use crate::runtime::ServeMux;
use crate::schema::{build_schema, GatewaySchema};
use axum::Router;
use std::time::Duration;
use tracing::info;

/// Main Gateway struct - entry point for the library
///
/// The `Gateway` ties the GraphQL schema, the upstream REST client, and the
/// HTTP runtime together. It is created via the [`GatewayBuilder`] and runs
/// identically behind a long-lived process ([`Gateway::serve`]) or a
/// short-lived invocation ([`Gateway::into_router`] mounted by the host).
///
/// # Example
///
/// ```rust,no_run
/// use rest_graphql_gateway::Gateway;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = Gateway::builder()
///     .api_base_url("https://api.example.com/v1")
///     .build()?;
///
/// gateway.serve("0.0.0.0:4000").await?;
/// # Ok(())
/// # }
/// ```
pub struct Gateway {
    mux: ServeMux,
    schema: GatewaySchema,
}

impl Gateway {
    /// Create a new gateway builder
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Access the built GraphQL schema
    pub fn schema(&self) -> &GatewaySchema {
        &self.schema
    }

    /// Convert gateway into Axum router
    pub fn into_router(self) -> Router {
        self.mux.into_router()
    }

    /// Serve on `addr` until interrupted.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "gateway listening");
        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await?;
        Ok(())
    }
}

/// Builder for creating a Gateway
#[derive(Debug, Default)]
pub struct GatewayBuilder {
    api_base_url: Option<String>,
    timeout: Option<Duration>,
    default_headers: Vec<(String, String)>,
}

impl GatewayBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upstream REST API base URL (fixed per deployment)
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the upstream request timeout.
    ///
    /// The core imposes none; this is the hosting configuration surface.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a default header sent on every upstream request
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Build the Gateway
    pub fn build(self) -> Result<Gateway> {
        let base_url = self
            .api_base_url
            .ok_or_else(|| Error::Schema("gateway requires an upstream API base url".into()))?;

        let mut client_builder = UpstreamClient::builder().base_url(base_url);
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        for (key, value) in self.default_headers {
            client_builder = client_builder.default_header(key, value);
        }

        let schema = build_schema(client_builder.build()?);
        Ok(Gateway {
            mux: ServeMux::new(schema.clone()),
            schema,
        })
    }
}
