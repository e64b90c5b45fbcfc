//! Long-lived process entrypoint for the gateway.
//!
//! Configuration comes from the environment: `CONTENT_API_URL` for the
//! upstream REST API base, `PORT` for the listen port, `RUST_LOG` for log
//! filtering.

use anyhow::Context;
use rest_graphql_gateway::Gateway;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let api_base_url = std::env::var("CONTENT_API_URL")
        .context("CONTENT_API_URL must point at the upstream REST API")?;
    let port: u16 = match std::env::var("PORT") {
        Ok(port) => port.parse().context("PORT must be a number")?,
        Err(_) => 4000,
    };

    let gateway = Gateway::builder().api_base_url(api_base_url).build()?;
    gateway.serve(&format!("0.0.0.0:{port}")).await?;

    Ok(())
}
