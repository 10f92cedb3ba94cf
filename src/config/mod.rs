//! # Function Configuration
//!
//! Process-level configuration loaded from environment variables.
//!
//! All configuration has sensible defaults and can be overridden via environment variables.
//! Per-request settings (field paths, region, provider config) arrive through the
//! function input instead and are not part of this module.

mod function;
mod server;

pub use function::FunctionConfig;
pub use server::ServerConfig;

/// Load configuration from environment variables with defaults
pub fn load_config() -> (FunctionConfig, ServerConfig) {
    (FunctionConfig::from_env(), ServerConfig::from_env())
}

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
