//! # AWS Authentication
//!
//! Builds the AWS SDK configuration for an invocation from the Crossplane AWS
//! `ProviderConfig` (`providerconfigs.aws.upbound.io`) named in the function input.
//!
//! - `credentials.source: Secret` reads static credentials from the referenced
//!   secret key (AWS shared credentials file format)
//! - any other source (`IRSA`, `WebIdentity`, `PodIdentity`) uses the default
//!   credential chain, which picks up the pod's web identity token
//! - `endpoint.services` with `endpoint.url.static` overrides the endpoint of
//!   the listed services

use crate::provider::ProviderError;
use async_trait::async_trait;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use k8s_openapi::api::core::v1::Secret;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};
use serde::Deserialize;
use serde_json::Value;
use zeroize::Zeroizing;

/// Profile read from a provider config credentials secret
const CREDENTIALS_PROFILE: &str = "default";

/// Endpoint overrides for the services the function talks to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub route53: Option<String>,
    pub cloudfront: Option<String>,
    pub iam: Option<String>,
    pub sts: Option<String>,
}

/// Everything needed to build provider clients for one invocation
#[derive(Debug, Clone)]
pub struct AwsEnvironment {
    pub sdk_config: SdkConfig,
    pub endpoints: ServiceEndpoints,
}

/// Resolves a provider config name into an [`AwsEnvironment`]
#[async_trait]
pub trait ProviderConfigResolver: Send + Sync {
    async fn resolve(&self, region: &str, provider_config: &str)
        -> Result<AwsEnvironment, ProviderError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProviderConfigSpec {
    #[serde(default)]
    credentials: CredentialsSpec,
    #[serde(default)]
    endpoint: Option<EndpointSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsSpec {
    #[serde(default)]
    source: String,
    #[serde(default)]
    secret_ref: Option<SecretKeySelector>,
}

#[derive(Debug, Clone, Deserialize)]
struct SecretKeySelector {
    name: String,
    namespace: String,
    key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointSpec {
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    url: Option<EndpointUrl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EndpointUrl {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(rename = "static", default)]
    static_url: Option<String>,
}

/// Endpoint overrides declared by a provider config spec
///
/// Only a `Static` URL is honoured; `Dynamic` endpoints are resolved by the SDK.
pub fn endpoints_from_spec(spec: &Value) -> Result<ServiceEndpoints, ProviderError> {
    let spec = parse_spec(spec)?;
    Ok(endpoints(&spec))
}

fn parse_spec(spec: &Value) -> Result<ProviderConfigSpec, ProviderError> {
    ProviderConfigSpec::deserialize(spec)
        .map_err(|e| ProviderError::Config(format!("invalid provider config spec: {e}")))
}

fn endpoints(spec: &ProviderConfigSpec) -> ServiceEndpoints {
    let mut endpoints = ServiceEndpoints::default();
    let Some(endpoint) = &spec.endpoint else {
        return endpoints;
    };
    let Some(url) = endpoint
        .url
        .as_ref()
        .filter(|url| url.kind.eq_ignore_ascii_case("static"))
        .and_then(|url| url.static_url.clone())
    else {
        return endpoints;
    };

    for service in &endpoint.services {
        let slot = match service.as_str() {
            "route53" => &mut endpoints.route53,
            "cloudfront" => &mut endpoints.cloudfront,
            "iam" => &mut endpoints.iam,
            "sts" => &mut endpoints.sts,
            _ => continue,
        };
        *slot = Some(url.clone());
    }
    endpoints
}

/// Load the `default` profile of an AWS shared credentials file
pub async fn credentials_from_profile(content: &str) -> Result<Credentials, ProviderError> {
    let files = ProfileFiles::builder()
        .with_contents(ProfileFileKind::Credentials, content)
        .build();
    ProfileFileCredentialsProvider::builder()
        .profile_files(files)
        .profile_name(CREDENTIALS_PROFILE)
        .build()
        .provide_credentials()
        .await
        .map_err(|e| {
            ProviderError::Config(format!(
                "cannot read profile {CREDENTIALS_PROFILE:?} from credentials secret: {e}"
            ))
        })
}

/// Provider config resolver backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeProviderConfigResolver {
    client: Client,
}

impl std::fmt::Debug for KubeProviderConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeProviderConfigResolver")
            .finish_non_exhaustive()
    }
}

impl KubeProviderConfigResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn load_spec(&self, name: &str) -> Result<ProviderConfigSpec, ProviderError> {
        let gvk = GroupVersionKind::gvk("aws.upbound.io", "v1beta1", "ProviderConfig");
        let resource = ApiResource::from_gvk(&gvk);
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);

        let object = api
            .get_opt(name)
            .await
            .map_err(|e| ProviderError::Config(format!("cannot get provider config {name}: {e}")))?
            .ok_or_else(|| ProviderError::Config(format!("provider config {name} not found")))?;

        object
            .data
            .get("spec")
            .map_or_else(|| Ok(ProviderConfigSpec::default()), parse_spec)
    }

    async fn load_static_credentials(
        &self,
        selector: &SecretKeySelector,
    ) -> Result<Credentials, ProviderError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &selector.namespace);
        let location = format!("{}/{}", selector.namespace, selector.name);

        let secret = secrets
            .get_opt(&selector.name)
            .await
            .map_err(|e| ProviderError::Config(format!("cannot get secret {location}: {e}")))?
            .ok_or_else(|| ProviderError::Config(format!("secret {location} not found")))?;

        let content = secret
            .data
            .and_then(|mut data| data.remove(&selector.key))
            .map(|bytes| Zeroizing::new(bytes.0))
            .ok_or_else(|| {
                ProviderError::Config(format!("secret {location} has no {:?} field", selector.key))
            })?;
        let content = std::str::from_utf8(&content)
            .map_err(|e| ProviderError::Config(format!("secret {location} is not UTF-8: {e}")))?;

        credentials_from_profile(content).await
    }
}

#[async_trait]
impl ProviderConfigResolver for KubeProviderConfigResolver {
    async fn resolve(
        &self,
        region: &str,
        provider_config: &str,
    ) -> Result<AwsEnvironment, ProviderError> {
        let spec = self.load_spec(provider_config).await?;

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

        if spec.credentials.source.eq_ignore_ascii_case("secret") {
            let selector = spec.credentials.secret_ref.as_ref().ok_or_else(|| {
                ProviderError::Config(format!(
                    "provider config {provider_config} uses Secret credentials without a secretRef"
                ))
            })?;
            let credentials = self.load_static_credentials(selector).await?;
            loader = loader.credentials_provider(credentials);
        }

        Ok(AwsEnvironment {
            sdk_config: loader.load().await,
            endpoints: endpoints(&spec),
        })
    }
}
