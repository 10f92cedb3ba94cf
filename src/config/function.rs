//! # Invocation Configuration
//!
//! Limits applied to every RunFunction invocation.

use super::env_var_or_default;
use crate::constants::{DEFAULT_DEADLINE_SECS, DEFAULT_RESPONSE_TTL_SECS};
use std::time::Duration;

/// Settings applied to each invocation of the function
#[derive(Debug, Clone)]
pub struct FunctionConfig {
    /// Time-to-live reported back in the response meta
    pub response_ttl: Duration,
    /// Overall deadline for one invocation, propagated into every cloud call
    pub deadline: Duration,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            response_ttl: Duration::from_secs(DEFAULT_RESPONSE_TTL_SECS),
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        }
    }
}

impl FunctionConfig {
    /// Load configuration from environment variables with defaults
    ///
    /// A deadline of zero would fail every invocation, so it falls back to the default.
    pub fn from_env() -> Self {
        let deadline_secs = env_var_or_default("FUNCTION_DEADLINE_SECS", DEFAULT_DEADLINE_SECS);
        Self {
            response_ttl: Duration::from_secs(env_var_or_default(
                "FUNCTION_RESPONSE_TTL_SECS",
                DEFAULT_RESPONSE_TTL_SECS,
            )),
            deadline: Duration::from_secs(if deadline_secs == 0 {
                DEFAULT_DEADLINE_SECS
            } else {
                deadline_secs
            }),
        }
    }
}
