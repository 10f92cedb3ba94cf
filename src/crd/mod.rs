//! # Custom Resource Definitions
//!
//! The function's input type, `Input.irsa.fn.giantswarm.io/v1beta1`, and the
//! RunFunction request and response messages that carry it.
//!
//! Crossplane never stores an `Input`; it is embedded in the pipeline step of a
//! Composition and handed to the function verbatim with every RunFunction call.
//! The CRD is still generated (see the `crdgen` binary) so the input can be
//! validated by tooling.
//!
//! Every `*Ref` field is a field path evaluated against the observed composite
//! resource (`spec.region`, `metadata.labels['giantswarm.io/cluster']`, ...), and
//! every `*PatchToRef` field is a field path written on the desired composite.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: irsa.fn.giantswarm.io/v1beta1
//! kind: Input
//! spec:
//!   domainRef: spec.domain
//!   regionRef: spec.region
//!   providerConfigRef: spec.providerConfigName
//!   s3BucketNameRef: status.bucketName
//!   route53HostedZonePatchToRef: status.importResources.route53HostedZoneId
//!   s3DiscoveryPatchToRef: status.discoveryFile
//!   s3KeysPatchToRef: status.keysFile
//! ```

mod protocol;

pub use protocol::{
    FunctionResult, RequestMeta, Resource, ResponseMeta, RunFunctionRequest, RunFunctionResponse,
    Severity, State,
};

use crate::constants::{DEFAULT_DISTRIBUTION_ID_PATCH_TO, DEFAULT_OPENID_PROVIDER_ARN_PATCH_TO};
use crate::error::FunctionError;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Input for one pipeline step of the IRSA function
#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    kind = "Input",
    group = "irsa.fn.giantswarm.io",
    version = "v1beta1",
    category = "crossplane"
)]
#[serde(rename_all = "camelCase")]
pub struct InputSpec {
    /// Cluster domain. Leave unset for clusters published through S3 only;
    /// discovery is skipped and the documents use S3 addressing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_ref: Option<String>,

    /// Where the discovered hosted zone id is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route53_hosted_zone_patch_to_ref: Option<String>,

    /// Where the JWKS document is written
    #[serde(default)]
    pub s3_keys_patch_to_ref: String,

    /// Name of the bucket the documents are published to
    #[serde(default)]
    pub s3_bucket_name_ref: String,

    /// Where the OIDC discovery document is written
    #[serde(default)]
    pub s3_discovery_patch_to_ref: String,

    /// AWS region of the cluster
    #[serde(default)]
    pub region_ref: String,

    /// Name of the AWS `ProviderConfig` to authenticate with
    #[serde(default)]
    pub provider_config_ref: String,

    /// Tags a hosted zone must carry to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,

    /// Map of tags read from the composite, merged over `tags`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_ref: Option<String>,

    /// Where the imported CloudFront distribution id is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_id_patch_to_ref: Option<String>,

    /// Where the imported OIDC provider ARN is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id_provider_arn_patch_to_ref: Option<String>,

    /// Where the AWS account id is written. Caller identity is only looked up when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id_patch_to_ref: Option<String>,
}

/// Treat empty strings the same as absent values
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl InputSpec {
    /// Check every required reference is set and no two results share a patch target
    ///
    /// All missing fields are reported at once.
    pub fn validate(&self) -> Result<(), FunctionError> {
        let required = [
            ("s3KeysPatchToRef", &self.s3_keys_patch_to_ref),
            ("s3BucketNameRef", &self.s3_bucket_name_ref),
            ("s3DiscoveryPatchToRef", &self.s3_discovery_patch_to_ref),
            ("regionRef", &self.region_ref),
            ("providerConfigRef", &self.provider_config_ref),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(FunctionError::Configuration(format!(
                "input is missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut targets = vec![
            self.s3_keys_patch_to_ref.as_str(),
            self.s3_discovery_patch_to_ref.as_str(),
        ];
        targets.extend(self.account_id_patch_to());
        if self.domain_ref().is_some() {
            targets.extend(self.hosted_zone_patch_to());
            targets.push(self.distribution_id_patch_to());
            targets.push(self.open_id_provider_arn_patch_to());
        }
        let mut seen = BTreeSet::new();
        for target in targets {
            if !seen.insert(target) {
                return Err(FunctionError::Configuration(format!(
                    "field path {target:?} is the patch target of more than one result"
                )));
            }
        }
        Ok(())
    }

    pub fn domain_ref(&self) -> Option<&str> {
        non_empty(self.domain_ref.as_ref())
    }

    pub fn hosted_zone_patch_to(&self) -> Option<&str> {
        non_empty(self.route53_hosted_zone_patch_to_ref.as_ref())
    }

    pub fn tags_ref(&self) -> Option<&str> {
        non_empty(self.tags_ref.as_ref())
    }

    pub fn distribution_id_patch_to(&self) -> &str {
        non_empty(self.distribution_id_patch_to_ref.as_ref())
            .unwrap_or(DEFAULT_DISTRIBUTION_ID_PATCH_TO)
    }

    pub fn open_id_provider_arn_patch_to(&self) -> &str {
        non_empty(self.open_id_provider_arn_patch_to_ref.as_ref())
            .unwrap_or(DEFAULT_OPENID_PROVIDER_ARN_PATCH_TO)
    }

    pub fn account_id_patch_to(&self) -> Option<&str> {
        non_empty(self.account_id_patch_to_ref.as_ref())
    }
}

/// The `input` object of a RunFunction request
///
/// Only `spec` is interpreted; `apiVersion` and `kind` are accepted as sent.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<InputSpec>,
}

impl FunctionInput {
    /// Decode the raw `input` object and return its validated spec
    pub fn spec_from(input: Option<&Value>) -> Result<InputSpec, FunctionError> {
        let input = match input {
            None | Some(Value::Null) => FunctionInput::default(),
            Some(value) => FunctionInput::deserialize(value)
                .map_err(|e| FunctionError::Configuration(format!("cannot parse input: {e}")))?,
        };
        let spec = input
            .spec
            .ok_or_else(|| FunctionError::Configuration("input spec is missing".to_string()))?;
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;
    use serde_json::json;

    fn complete_input() -> Value {
        json!({
            "apiVersion": "irsa.fn.giantswarm.io/v1beta1",
            "kind": "Input",
            "spec": {
                "domainRef": "spec.domain",
                "regionRef": "spec.region",
                "providerConfigRef": "spec.providerConfigName",
                "s3BucketNameRef": "status.bucketName",
                "s3DiscoveryPatchToRef": "status.discoveryFile",
                "s3KeysPatchToRef": "status.keysFile"
            }
        })
    }

    #[test]
    fn test_spec_from_complete_input() {
        let input = complete_input();
        let spec = FunctionInput::spec_from(Some(&input)).unwrap();
        assert_eq!(spec.domain_ref(), Some("spec.domain"));
        assert_eq!(spec.hosted_zone_patch_to(), None);
        assert_eq!(
            spec.distribution_id_patch_to(),
            "status.importResources.cloudfrontDistributionId"
        );
        assert_eq!(
            spec.open_id_provider_arn_patch_to(),
            "status.importResources.openIdProviderArn"
        );
        assert_eq!(spec.account_id_patch_to(), None);
    }

    #[test]
    fn test_missing_spec() {
        let input = json!({"apiVersion": "irsa.fn.giantswarm.io/v1beta1", "kind": "Input"});
        let err = FunctionInput::spec_from(Some(&input)).unwrap_err();
        assert_eq!(err.to_string(), "input spec is missing");
        assert!(FunctionInput::spec_from(None).is_err());
    }

    #[test]
    fn test_missing_required_fields_are_listed() {
        let input = json!({"spec": {"regionRef": "spec.region", "s3KeysPatchToRef": ""}});
        let err = FunctionInput::spec_from(Some(&input)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "input is missing required fields: s3KeysPatchToRef, s3BucketNameRef, \
             s3DiscoveryPatchToRef, providerConfigRef"
        );
    }

    #[test]
    fn test_empty_optional_refs_are_absent() {
        let mut input = complete_input();
        input["spec"]["domainRef"] = json!("");
        input["spec"]["distributionIdPatchToRef"] = json!("");
        input["spec"]["openIdProviderArnPatchToRef"] = json!("status.oidcArn");
        let spec = FunctionInput::spec_from(Some(&input)).unwrap();
        assert_eq!(spec.domain_ref(), None);
        assert_eq!(
            spec.distribution_id_patch_to(),
            "status.importResources.cloudfrontDistributionId"
        );
        assert_eq!(spec.open_id_provider_arn_patch_to(), "status.oidcArn");
    }

    #[test]
    fn test_shared_patch_target_is_rejected() {
        let mut input = complete_input();
        input["spec"]["accountIdPatchToRef"] = json!("status.keysFile");
        let err = FunctionInput::spec_from(Some(&input)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field path \"status.keysFile\" is the patch target of more than one result"
        );

        // import targets only count when a domain is configured
        input["spec"]["accountIdPatchToRef"] = json!("status.accountId");
        input["spec"]["domainRef"] = json!("");
        input["spec"]["distributionIdPatchToRef"] = json!("status.discoveryFile");
        assert!(FunctionInput::spec_from(Some(&input)).is_ok());
    }

    #[test]
    fn test_crd_metadata() {
        let crd = Input::crd();
        assert_eq!(
            crd.metadata.name.as_deref(),
            Some("inputs.irsa.fn.giantswarm.io")
        );
        assert_eq!(crd.spec.versions[0].name, "v1beta1");
    }
}
