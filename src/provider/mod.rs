//! # Cloud Providers
//!
//! Read-only capability interfaces over the AWS APIs the function needs,
//! plus their AWS SDK implementations.
//!
//! - [`HostedZoneApi`]: Route 53 hosted zones and their tags
//! - [`DistributionApi`]: CloudFront distributions
//! - [`OidcProviderApi`]: IAM OpenID Connect providers
//! - [`CallerIdentityApi`]: STS caller identity
//!
//! The orchestrator receives these as trait objects, so tests substitute fakes
//! without any global client factories.

pub mod aws;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

pub use aws::{
    AwsClientFactory, AwsClients, AwsEnvironment, KubeProviderConfigResolver,
    ProviderConfigResolver,
};

/// Error returned by a cloud provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API call itself failed
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },
    /// The API answered without a field we rely on
    #[error("{operation} returned no {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
    /// SDK configuration could not be built
    #[error("failed to load aws config: {0}")]
    Config(String),
}

/// A Route 53 hosted zone as returned by listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZoneCandidate {
    /// Zone id, possibly prefixed with `/hostedzone/`
    pub id: String,
    /// DNS name, usually terminated by a trailing dot
    pub name: String,
}

impl HostedZoneCandidate {
    /// Zone name without the trailing dot
    pub fn normalized_name(&self) -> &str {
        self.name.strip_suffix('.').unwrap_or(&self.name)
    }

    /// Zone id without the `/hostedzone/` prefix
    pub fn bare_id(&self) -> &str {
        self.id
            .strip_prefix(crate::constants::HOSTED_ZONE_ID_PREFIX)
            .unwrap_or(&self.id)
    }
}

/// A CloudFront distribution as returned by listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionCandidate {
    pub id: String,
    /// Alternate domain names (CNAMEs) configured on the distribution
    pub aliases: Vec<String>,
}

/// An IAM OpenID Connect provider with its detail fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcProviderCandidate {
    pub arn: String,
    /// Issuer URL as stored by IAM (usually without scheme)
    pub url: String,
}

/// Route 53 hosted zone listing
#[async_trait]
pub trait HostedZoneApi: Send + Sync {
    /// List every hosted zone visible to the caller, in listing order
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZoneCandidate>, ProviderError>;

    /// Fetch the tags of one hosted zone
    async fn list_hosted_zone_tags(
        &self,
        zone_id: &str,
    ) -> Result<BTreeMap<String, String>, ProviderError>;
}

/// CloudFront distribution listing
#[async_trait]
pub trait DistributionApi: Send + Sync {
    async fn list_distributions(&self) -> Result<Vec<DistributionCandidate>, ProviderError>;
}

/// IAM OpenID Connect provider listing
#[async_trait]
pub trait OidcProviderApi: Send + Sync {
    /// ARNs of every OIDC provider in the account
    async fn list_oidc_provider_arns(&self) -> Result<Vec<String>, ProviderError>;

    /// Fetch the detail of one provider
    async fn get_oidc_provider(&self, arn: &str) -> Result<OidcProviderCandidate, ProviderError>;
}

/// STS caller identity
#[async_trait]
pub trait CallerIdentityApi: Send + Sync {
    /// Account id of the credentials in use
    async fn account_id(&self) -> Result<String, ProviderError>;
}

/// The provider capabilities for one invocation
pub struct ProviderClients {
    pub hosted_zones: Box<dyn HostedZoneApi>,
    pub distributions: Box<dyn DistributionApi>,
    pub oidc_providers: Box<dyn OidcProviderApi>,
    pub caller_identity: Box<dyn CallerIdentityApi>,
}

impl std::fmt::Debug for ProviderClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClients").finish_non_exhaustive()
    }
}

/// Builds the provider clients once the region and provider config are known
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn clients(
        &self,
        region: &str,
        provider_config: &str,
    ) -> Result<ProviderClients, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_zone_normalization() {
        let zone = HostedZoneCandidate {
            id: "/hostedzone/Z0123456789ABC".into(),
            name: "example.com.".into(),
        };
        assert_eq!(zone.normalized_name(), "example.com");
        assert_eq!(zone.bare_id(), "Z0123456789ABC");

        let zone = HostedZoneCandidate {
            id: "Z0123456789ABC".into(),
            name: "example.com".into(),
        };
        assert_eq!(zone.normalized_name(), "example.com");
        assert_eq!(zone.bare_id(), "Z0123456789ABC");
    }
}
