//! # STS
//!
//! Caller identity lookup.

use super::{api_error, AwsEnvironment};
use crate::provider::{CallerIdentityApi, ProviderError};
use async_trait::async_trait;
use aws_sdk_sts::Client;

/// STS backed [`CallerIdentityApi`]
#[derive(Debug, Clone)]
pub struct AwsCallerIdentity {
    client: Client,
}

impl AwsCallerIdentity {
    pub fn new(env: &AwsEnvironment) -> Self {
        let mut builder = aws_sdk_sts::config::Builder::from(&env.sdk_config);
        if let Some(endpoint) = &env.endpoints.sts {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl CallerIdentityApi for AwsCallerIdentity {
    async fn account_id(&self) -> Result<String, ProviderError> {
        const OPERATION: &str = "GetCallerIdentity";
        let identity = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| api_error(OPERATION, e))?;

        identity
            .account()
            .map(str::to_string)
            .ok_or(ProviderError::MissingField {
                operation: OPERATION,
                field: "account",
            })
    }
}
