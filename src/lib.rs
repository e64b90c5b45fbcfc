//! # rest-graphql-gateway
//!
//! A Rust gateway that re-exposes a content platform's REST API as a single
//! typed GraphQL graph. Callers issue one query; the gateway resolves it
//! into one or more authenticated REST calls, reshapes the JSON responses
//! into the requested graph shape, and returns a single tree.
//!
//! ## Main Components
//!
//! - [`Gateway`]: The main entry point for creating and running the gateway.
//! - [`GatewayBuilder`]: Configuration builder for the gateway.
//! - [`UpstreamClient`]: Authenticated HTTP client for the upstream REST API.
//! - [`QueryRoot`]: Root resolvers binding every graph field to an upstream
//!   resolution rule.
//! - [`ServeMux`]: HTTP runtime converting the gateway into an Axum router.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rest_graphql_gateway::Gateway;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Gateway::builder()
//!         .api_base_url("https://api.example.com/v1")
//!         .build()?;
//!
//!     gateway.serve("0.0.0.0:4000").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod gateway;
pub mod runtime;
pub mod schema;
pub mod types;

pub use client::{AuthToken, UpstreamClient, UpstreamClientBuilder};
pub use error::{Error, Result};
pub use gateway::{Gateway, GatewayBuilder};
pub use runtime::ServeMux;
pub use schema::{build_schema, GatewaySchema, QueryRoot};
pub use types::{
    resolve_owner, Asset, ContentAnalyticsPage, ContentRevision, Me, Org, Owner, Page,
    PageFeedback, SearchAnalytics, SearchAnalyticsQuery, Space, User, Variant,
};
