//! # Test Fakes
//!
//! In-memory implementations of the provider and signing key capabilities.

#![allow(dead_code, reason = "each test binary uses a different subset of the fakes")]

use async_trait::async_trait;
use irsa_function::provider::{
    CallerIdentityApi, ClientFactory, DistributionApi, DistributionCandidate, HostedZoneApi,
    HostedZoneCandidate, OidcProviderApi, OidcProviderCandidate, ProviderClients, ProviderError,
};
use irsa_function::secret::{SecretError, SecretRef, SigningKeySource};
use irsa_function::IrsaFunction;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zeroize::Zeroizing;

pub const SIGNING_KEY: &str = include_str!("../fixtures/sa-signer.key");
pub const SIGNING_KEY_PKCS8: &str = include_str!("../fixtures/sa-signer-pkcs8.key");
pub const OTHER_SIGNING_KEY: &str = include_str!("../fixtures/other-signer.key");
pub const SIGNING_KEY_ID: &str = "pDXwfFNZRRWQeVTOKbjSKo-IqA149_ZS3fWD4gSaXZE";
pub const OTHER_SIGNING_KEY_ID: &str = "qi7h8Q2QiPergKCruzFF1vRgH_no7IXUWlXhhcWcz1E";

fn api_error(operation: &'static str, message: &str) -> ProviderError {
    ProviderError::Api {
        operation,
        message: message.to_string(),
    }
}

/// A scripted AWS account
#[derive(Debug, Clone, Default)]
pub struct FakeCloud {
    pub zones: Vec<HostedZoneCandidate>,
    /// Tags by bare zone id; `Err` makes the tag lookup fail
    pub zone_tags: BTreeMap<String, Result<BTreeMap<String, String>, String>>,
    pub distributions: Vec<DistributionCandidate>,
    /// Provider URL by ARN, in listing order; `Err` makes the detail fetch fail
    pub oidc_providers: Vec<(String, Result<String, String>)>,
    pub account_id: String,
    /// Fail the hosted zone listing
    pub fail_zone_listing: bool,
    /// Delay the hosted zone listing
    pub zone_listing_delay: Option<Duration>,
    /// Every call made, e.g. `list_hosted_zones` or `get_oidc_provider:arn`
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeCloud {
    pub fn with_zone(mut self, id: &str, name: &str) -> Self {
        self.zones.push(HostedZoneCandidate {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_zone_tags(mut self, bare_id: &str, tags: &[(&str, &str)]) -> Self {
        let tags = tags
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.zone_tags.insert(bare_id.to_string(), Ok(tags));
        self
    }

    pub fn with_failing_zone_tags(mut self, bare_id: &str) -> Self {
        self.zone_tags
            .insert(bare_id.to_string(), Err("throttled".to_string()));
        self
    }

    pub fn with_distribution(mut self, id: &str, aliases: &[&str]) -> Self {
        self.distributions.push(DistributionCandidate {
            id: id.to_string(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
        });
        self
    }

    pub fn with_oidc_provider(mut self, arn: &str, url: &str) -> Self {
        self.oidc_providers
            .push((arn.to_string(), Ok(url.to_string())));
        self
    }

    pub fn with_failing_oidc_provider(mut self, arn: &str) -> Self {
        self.oidc_providers
            .push((arn.to_string(), Err("access denied".to_string())));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn log(&self, call: impl Into<String>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.into());
        }
    }
}

#[async_trait]
impl HostedZoneApi for FakeCloud {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZoneCandidate>, ProviderError> {
        self.log("list_hosted_zones");
        if let Some(delay) = self.zone_listing_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_zone_listing {
            return Err(api_error("ListHostedZones", "service unavailable"));
        }
        Ok(self.zones.clone())
    }

    async fn list_hosted_zone_tags(
        &self,
        zone_id: &str,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        self.log(format!("list_hosted_zone_tags:{zone_id}"));
        match self.zone_tags.get(zone_id) {
            Some(Ok(tags)) => Ok(tags.clone()),
            Some(Err(message)) => Err(api_error("ListTagsForResource", message)),
            None => Ok(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl DistributionApi for FakeCloud {
    async fn list_distributions(&self) -> Result<Vec<DistributionCandidate>, ProviderError> {
        self.log("list_distributions");
        Ok(self.distributions.clone())
    }
}

#[async_trait]
impl OidcProviderApi for FakeCloud {
    async fn list_oidc_provider_arns(&self) -> Result<Vec<String>, ProviderError> {
        self.log("list_oidc_provider_arns");
        Ok(self
            .oidc_providers
            .iter()
            .map(|(arn, _)| arn.clone())
            .collect())
    }

    async fn get_oidc_provider(&self, arn: &str) -> Result<OidcProviderCandidate, ProviderError> {
        self.log(format!("get_oidc_provider:{arn}"));
        match self.oidc_providers.iter().find(|(candidate, _)| candidate == arn) {
            Some((_, Ok(url))) => Ok(OidcProviderCandidate {
                arn: arn.to_string(),
                url: url.clone(),
            }),
            Some((_, Err(message))) => Err(api_error("GetOpenIDConnectProvider", message)),
            None => Err(api_error("GetOpenIDConnectProvider", "no such entity")),
        }
    }
}

#[async_trait]
impl CallerIdentityApi for FakeCloud {
    async fn account_id(&self) -> Result<String, ProviderError> {
        self.log("get_caller_identity");
        Ok(self.account_id.clone())
    }
}

/// Hands out the same fake account for every region and provider config
#[derive(Debug, Clone, Default)]
pub struct FakeClientFactory {
    pub cloud: FakeCloud,
    /// Record of `(region, provider_config)` requests
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl ClientFactory for FakeClientFactory {
    async fn clients(
        &self,
        region: &str,
        provider_config: &str,
    ) -> Result<ProviderClients, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((region.to_string(), provider_config.to_string()));
        }
        Ok(ProviderClients {
            hosted_zones: Box::new(self.cloud.clone()),
            distributions: Box::new(self.cloud.clone()),
            oidc_providers: Box::new(self.cloud.clone()),
            caller_identity: Box::new(self.cloud.clone()),
        })
    }
}

/// Secrets by `namespace/name`, each holding a PEM encoded `tls.key`
#[derive(Debug, Clone, Default)]
pub struct FakeSigningKeys {
    pub secrets: BTreeMap<String, String>,
}

impl FakeSigningKeys {
    pub fn with_key(mut self, namespace: &str, name: &str, pem: &str) -> Self {
        self.secrets
            .insert(format!("{namespace}/{name}"), pem.to_string());
        self
    }
}

#[async_trait]
impl SigningKeySource for FakeSigningKeys {
    async fn fetch_signing_key_pem(
        &self,
        secret: &SecretRef,
    ) -> Result<Zeroizing<Vec<u8>>, SecretError> {
        self.secrets
            .get(&secret.to_string())
            .map(|pem| Zeroizing::new(pem.as_bytes().to_vec()))
            .ok_or_else(|| SecretError::NotFound {
                namespace: secret.namespace.clone(),
                name: secret.name.clone(),
            })
    }
}

/// Signing keys holding the fixture key for the `demo` cluster in `org-acme`
pub fn demo_signing_keys() -> FakeSigningKeys {
    FakeSigningKeys::default().with_key("org-acme", "demo-sa", SIGNING_KEY)
}

pub fn function(cloud: FakeCloud, keys: FakeSigningKeys) -> IrsaFunction {
    IrsaFunction::new(
        Arc::new(FakeClientFactory {
            cloud,
            ..Default::default()
        }),
        Arc::new(keys),
    )
}

/// Observed composite of the `demo` cluster
pub fn observed_composite(domain: Option<&str>, region: &str) -> Value {
    let mut composite = json!({
        "apiVersion": "infrastructure.giantswarm.io/v1alpha1",
        "kind": "Irsa",
        "metadata": {
            "name": "demo",
            "labels": {"crossplane.io/claim-namespace": "org-acme"}
        },
        "spec": {
            "region": region,
            "providerConfigName": "demo-aws",
            "tags": {"giantswarm.io/cluster": "demo"}
        },
        "status": {"bucketName": "demo-irsa"}
    });
    if let Some(domain) = domain {
        composite["spec"]["domain"] = json!(domain);
    }
    composite
}

/// Function input, `extra` is merged into the spec
pub fn function_input(extra: Value) -> Value {
    let mut spec = json!({
        "domainRef": "spec.domain",
        "regionRef": "spec.region",
        "providerConfigRef": "spec.providerConfigName",
        "s3BucketNameRef": "status.bucketName",
        "route53HostedZonePatchToRef": "status.importResources.route53HostedZoneId",
        "s3DiscoveryPatchToRef": "status.discoveryFile",
        "s3KeysPatchToRef": "status.keysFile"
    });
    if let (Value::Object(spec), Value::Object(extra)) = (&mut spec, extra) {
        spec.extend(extra);
    }
    json!({"apiVersion": "irsa.fn.giantswarm.io/v1beta1", "kind": "Input", "spec": spec})
}
