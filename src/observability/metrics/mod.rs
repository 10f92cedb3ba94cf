//! # Metrics Module
//!
//! Prometheus metrics for monitoring the function.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text encoding
//! - `function_metrics` - Invocation, failure and discovery metrics

pub mod function_metrics;
pub mod registry;

pub use function_metrics::*;
pub use registry::*;
