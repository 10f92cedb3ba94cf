//! # AWS Providers
//!
//! AWS SDK implementations of the provider capabilities.
//!
//! - `auth`: SDK configuration from a Crossplane AWS `ProviderConfig`
//! - `route53`: hosted zones and hosted zone tags
//! - `cloudfront`: distributions
//! - `iam`: OpenID Connect providers
//! - `sts`: caller identity

mod auth;
mod cloudfront;
mod iam;
mod route53;
mod sts;

pub use auth::{
    credentials_from_profile, endpoints_from_spec, AwsEnvironment, KubeProviderConfigResolver,
    ProviderConfigResolver, ServiceEndpoints,
};
pub use cloudfront::AwsDistributions;
pub use iam::AwsOidcProviders;
pub use route53::AwsHostedZones;
pub use sts::AwsCallerIdentity;

use super::{ClientFactory, ProviderClients, ProviderError};
use async_trait::async_trait;
use std::sync::Arc;

/// All provider clients for one invocation, built from the same environment
#[derive(Debug, Clone)]
pub struct AwsClients {
    pub hosted_zones: AwsHostedZones,
    pub distributions: AwsDistributions,
    pub oidc_providers: AwsOidcProviders,
    pub caller_identity: AwsCallerIdentity,
}

impl AwsClients {
    /// Build every client, honouring per-service endpoint overrides
    pub fn new(env: &AwsEnvironment) -> Self {
        Self {
            hosted_zones: AwsHostedZones::new(env),
            distributions: AwsDistributions::new(env),
            oidc_providers: AwsOidcProviders::new(env),
            caller_identity: AwsCallerIdentity::new(env),
        }
    }
}

impl From<AwsClients> for ProviderClients {
    fn from(clients: AwsClients) -> Self {
        Self {
            hosted_zones: Box::new(clients.hosted_zones),
            distributions: Box::new(clients.distributions),
            oidc_providers: Box::new(clients.oidc_providers),
            caller_identity: Box::new(clients.caller_identity),
        }
    }
}

/// Client factory resolving credentials through a provider config resolver
#[derive(Clone)]
pub struct AwsClientFactory {
    resolver: Arc<dyn ProviderConfigResolver>,
}

impl std::fmt::Debug for AwsClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsClientFactory").finish_non_exhaustive()
    }
}

impl AwsClientFactory {
    pub fn new(resolver: Arc<dyn ProviderConfigResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl ClientFactory for AwsClientFactory {
    async fn clients(
        &self,
        region: &str,
        provider_config: &str,
    ) -> Result<ProviderClients, ProviderError> {
        let env = self.resolver.resolve(region, provider_config).await?;
        Ok(AwsClients::new(&env).into())
    }
}

/// Flatten an SDK error with its full context
fn api_error<E: std::error::Error>(operation: &'static str, error: E) -> ProviderError {
    ProviderError::Api {
        operation,
        message: aws_sdk_sts::error::DisplayErrorContext(error).to_string(),
    }
}
