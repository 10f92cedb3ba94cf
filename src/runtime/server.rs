//! # HTTP Server
//!
//! Two listeners:
//!
//! - the function port serves `POST /v1/run`
//! - the metrics port serves `/metrics`, `/healthz` and `/readyz`

use super::handler::run_function;
use crate::config::{FunctionConfig, ServerConfig};
use crate::crd::{RunFunctionRequest, RunFunctionResponse};
use crate::function::IrsaFunction;
use crate::observability::metrics::encode_metrics;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for the probe endpoints
#[derive(Debug, Default)]
pub struct ServerState {
    /// Set once both listeners are bound
    pub is_ready: AtomicBool,
}

/// Shared state for the RunFunction endpoint
#[derive(Debug, Clone)]
pub struct FunctionState {
    pub function: IrsaFunction,
    pub config: FunctionConfig,
}

async fn run(
    State(state): State<Arc<FunctionState>>,
    Json(request): Json<RunFunctionRequest>,
) -> Json<RunFunctionResponse> {
    Json(run_function(&state.function, &state.config, request).await)
}

/// Router for the RunFunction endpoint
pub fn function_router(state: Arc<FunctionState>) -> Router {
    Router::new()
        .route("/v1/run", post(run))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics() -> Response {
    match encode_metrics() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(state): State<Arc<ServerState>>) -> Response {
    if state.is_ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}

/// Router for metrics and health probes
pub fn probe_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

async fn bind(port: u16, what: &str) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {what} listener on {addr}"))?;
    info!("Listening for {} on {}", what, addr);
    Ok(listener)
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Serve both listeners until a shutdown signal arrives
pub async fn start_server(
    server_config: &ServerConfig,
    function_state: Arc<FunctionState>,
    server_state: Arc<ServerState>,
) -> Result<()> {
    let function_listener = bind(server_config.function_port, "RunFunction").await?;
    let probe_listener = bind(server_config.metrics_port, "metrics and probes").await?;

    server_state.is_ready.store(true, Ordering::Relaxed);
    info!("✅ Function is ready");

    tokio::try_join!(
        async {
            axum::serve(function_listener, function_router(function_state))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("RunFunction server failed")
        },
        async {
            axum::serve(probe_listener, probe_router(Arc::clone(&server_state)))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("metrics server failed")
        },
    )?;

    server_state.is_ready.store(false, Ordering::Relaxed);
    Ok(())
}
