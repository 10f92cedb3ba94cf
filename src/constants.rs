//! # Constants
//!
//! Default values and fixed names used throughout the function.

/// Name the function reports in logs and response metadata
pub const FUNCTION_NAME: &str = "crossplane-fn-irsa";

/// Default port for the RunFunction listener
pub const DEFAULT_FUNCTION_PORT: u16 = 9443;

/// Default port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default response time-to-live (seconds)
pub const DEFAULT_RESPONSE_TTL_SECS: u64 = 60;

/// Default overall deadline for a single invocation (seconds)
pub const DEFAULT_DEADLINE_SECS: u64 = 30;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "irsa_function=info";

/// Prefix Route 53 puts in front of hosted zone ids
pub const HOSTED_ZONE_ID_PREFIX: &str = "/hostedzone/";

/// Where the discovered CloudFront distribution id is written by default
pub const DEFAULT_DISTRIBUTION_ID_PATCH_TO: &str = "status.importResources.cloudfrontDistributionId";

/// Where the discovered OIDC provider ARN is written by default
pub const DEFAULT_OPENID_PROVIDER_ARN_PATCH_TO: &str = "status.importResources.openIdProviderArn";

/// Suffix appended to the cluster name to find the service account signing secret
pub const SERVICE_ACCOUNT_SECRET_SUFFIX: &str = "-sa";

/// Secret data key holding the PEM encoded signing key
pub const SERVICE_ACCOUNT_SECRET_KEY: &str = "tls.key";

/// Label carrying the claim namespace on cluster scoped composites
pub const CLAIM_NAMESPACE_LABEL: &str = "crossplane.io/claim-namespace";

/// Namespace used when the composite carries no namespace information
pub const DEFAULT_NAMESPACE: &str = "default";

/// Object key under which the JWKS document is published
pub const KEYS_DOCUMENT_NAME: &str = "keys.json";
