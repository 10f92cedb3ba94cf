//! # Initialization
//!
//! Function startup: rustls setup, tracing, metrics, configuration and the
//! Kubernetes backed collaborators of the pipeline.

use super::server::{FunctionState, ServerState};
use crate::config::{load_config, ServerConfig};
use crate::constants::FUNCTION_NAME;
use crate::function::IrsaFunction;
use crate::observability;
use crate::provider::{AwsClientFactory, KubeProviderConfigResolver};
use crate::secret::KubeSigningKeySource;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::info;

/// Everything needed to start serving
#[derive(Debug)]
pub struct InitializationResult {
    pub server_config: ServerConfig,
    pub function_state: Arc<FunctionState>,
    pub server_state: Arc<ServerState>,
}

/// Initialize the function runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Metrics registration
/// - Configuration loading
/// - Kubernetes client creation
pub async fn initialize() -> Result<InitializationResult> {
    // Configure rustls crypto provider FIRST, before any TLS connection is made
    // We use ring as the crypto provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_existing| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    observability::tracing::init_tracing()?;

    info!("Starting {} v{}", FUNCTION_NAME, env!("CARGO_PKG_VERSION"));

    observability::metrics::register_metrics()?;

    let (function_config, server_config) = load_config();
    info!(
        "Configuration: deadline={:?}, response_ttl={:?}, function_port={}, metrics_port={}",
        function_config.deadline,
        function_config.response_ttl,
        server_config.function_port,
        server_config.metrics_port
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let resolver = Arc::new(KubeProviderConfigResolver::new(client.clone()));
    let function = IrsaFunction::new(
        Arc::new(AwsClientFactory::new(resolver)),
        Arc::new(KubeSigningKeySource::new(client)),
    );

    Ok(InitializationResult {
        server_config,
        function_state: Arc::new(FunctionState {
            function,
            config: function_config,
        }),
        server_state: Arc::new(ServerState::default()),
    })
}
