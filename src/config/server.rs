//! # Server Configuration
//!
//! HTTP listener settings loaded from environment variables.

use super::env_var_or_default;
use crate::constants::{DEFAULT_FUNCTION_PORT, DEFAULT_METRICS_PORT};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port serving the RunFunction endpoint
    pub function_port: u16,
    /// Port serving metrics and health probes
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            function_port: DEFAULT_FUNCTION_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            function_port: env_var_or_default("FUNCTION_PORT", DEFAULT_FUNCTION_PORT),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
        }
    }
}
