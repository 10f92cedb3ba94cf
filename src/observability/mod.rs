//! # Observability
//!
//! Logging and metrics for the function process.
//!
//! - `metrics`: Prometheus counters and histograms exposed on `/metrics`
//! - `tracing`: `tracing-subscriber` setup driven by `RUST_LOG`

pub mod metrics;
pub mod tracing;
