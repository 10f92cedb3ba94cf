//! # crossplane-fn-irsa
//!
//! Composition function that discovers the AWS resources behind a cluster's
//! IRSA setup and renders its OIDC discovery and key documents.
//!
//! ## Environment
//!
//! - `FUNCTION_PORT`: RunFunction listener (default 9443)
//! - `METRICS_PORT`: metrics and probes listener (default 8080)
//! - `FUNCTION_RESPONSE_TTL_SECS`: response TTL (default 60)
//! - `FUNCTION_DEADLINE_SECS`: deadline of one invocation (default 30)
//! - `RUST_LOG`: log filter (default `irsa_function=info`)

use anyhow::Result;
use irsa_function::runtime::{initialize, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    let init_result = initialize().await?;

    start_server(
        &init_result.server_config,
        init_result.function_state,
        init_result.server_state,
    )
    .await
}
