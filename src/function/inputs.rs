//! # Input Resolution
//!
//! Turns the typed input and the observed composite into the concrete values
//! one invocation works with.

use crate::constants::{CLAIM_NAMESPACE_LABEL, DEFAULT_NAMESPACE};
use crate::crd::{FunctionInput, InputSpec};
use crate::error::FunctionError;
use crate::fieldpath::{get_string, get_string_map};
use crate::secret::SecretRef;
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything read from the request before any cloud call is made
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInputs {
    pub spec: InputSpec,
    /// `None` when no domain reference is configured
    pub domain: Option<String>,
    pub region: String,
    pub bucket_name: String,
    pub provider_config: String,
    pub tags: BTreeMap<String, String>,
    /// Where the service account signing key is stored
    pub signing_key: SecretRef,
}

/// Resolve a required string reference; empty strings count as unresolved
fn required_string(
    observed: &Value,
    field: &'static str,
    path: &str,
) -> Result<String, FunctionError> {
    let value =
        get_string(observed, path).map_err(|source| FunctionError::Unresolved { field, source })?;
    if value.is_empty() {
        return Err(FunctionError::Configuration(format!(
            "{field} resolved to an empty string at {path:?}"
        )));
    }
    Ok(value)
}

/// Namespace holding the signing key secret of the composite
fn composite_namespace(observed: &Value) -> String {
    let label = format!("metadata.labels['{CLAIM_NAMESPACE_LABEL}']");
    let namespace = ["metadata.namespace", label.as_str()]
        .into_iter()
        .filter_map(|path| get_string(observed, path).ok())
        .find(|namespace| !namespace.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    namespace
}

/// Resolve the function input against the observed composite
pub fn resolve_inputs(
    observed: &Value,
    input: Option<&Value>,
) -> Result<ResolvedInputs, FunctionError> {
    let spec = FunctionInput::spec_from(input)?;

    let region = required_string(observed, "region", &spec.region_ref)?;
    let bucket_name = required_string(observed, "bucket name", &spec.s3_bucket_name_ref)?;
    let provider_config =
        required_string(observed, "provider config name", &spec.provider_config_ref)?;
    let domain = spec
        .domain_ref()
        .map(|path| required_string(observed, "domain", path))
        .transpose()?;

    let mut tags = spec.tags.clone().unwrap_or_default();
    if let Some(path) = spec.tags_ref() {
        let referenced = get_string_map(observed, path)
            .map_err(|source| FunctionError::Unresolved { field: "tags", source })?;
        tags.extend(referenced);
    }

    let cluster_name = required_string(observed, "composite name", "metadata.name")?;
    let signing_key = SecretRef::for_cluster(&composite_namespace(observed), &cluster_name);

    Ok(ResolvedInputs {
        spec,
        domain,
        region,
        bucket_name,
        provider_config,
        tags,
        signing_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn input(extra: Value) -> Value {
        let mut spec = json!({
            "domainRef": "spec.domain",
            "regionRef": "spec.region",
            "providerConfigRef": "spec.providerConfigName",
            "s3BucketNameRef": "status.bucketName",
            "s3DiscoveryPatchToRef": "status.discoveryFile",
            "s3KeysPatchToRef": "status.keysFile"
        });
        if let (Value::Object(spec), Value::Object(extra)) = (&mut spec, extra) {
            spec.extend(extra);
        }
        json!({"apiVersion": "irsa.fn.giantswarm.io/v1beta1", "kind": "Input", "spec": spec})
    }

    fn observed() -> Value {
        json!({
            "apiVersion": "infrastructure.giantswarm.io/v1alpha1",
            "kind": "Irsa",
            "metadata": {
                "name": "demo",
                "labels": {"crossplane.io/claim-namespace": "org-acme"}
            },
            "spec": {
                "domain": "irsa.demo.example.com",
                "region": "eu-west-1",
                "providerConfigName": "demo-aws",
                "tags": {"owner": "team-a", "env": "prod"}
            },
            "status": {"bucketName": "demo-irsa"}
        })
    }

    #[test]
    fn test_resolves_all_references() {
        let resolved = resolve_inputs(&observed(), Some(&input(json!({})))).unwrap();
        assert_eq!(resolved.domain.as_deref(), Some("irsa.demo.example.com"));
        assert_eq!(resolved.region, "eu-west-1");
        assert_eq!(resolved.bucket_name, "demo-irsa");
        assert_eq!(resolved.provider_config, "demo-aws");
        assert!(resolved.tags.is_empty());
        assert_eq!(resolved.signing_key, SecretRef::for_cluster("org-acme", "demo"));
    }

    #[test]
    fn test_without_domain_ref() {
        let resolved =
            resolve_inputs(&observed(), Some(&input(json!({"domainRef": ""})))).unwrap();
        assert_eq!(resolved.domain, None);
    }

    #[test]
    fn test_unresolvable_domain_is_configuration_error() {
        let err = resolve_inputs(&observed(), Some(&input(json!({"domainRef": "spec.missing"}))))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            crate::error::error_chain(&err),
            "cannot resolve domain: spec.missing: no such field"
        );
    }

    #[test]
    fn test_tags_ref_is_merged_over_inline_tags() {
        let resolved = resolve_inputs(
            &observed(),
            Some(&input(json!({
                "tags": {"owner": "inline", "cluster": "demo"},
                "tagsRef": "spec.tags"
            }))),
        )
        .unwrap();
        assert_eq!(resolved.tags.len(), 3);
        assert_eq!(resolved.tags["owner"], "team-a");
        assert_eq!(resolved.tags["cluster"], "demo");
        assert_eq!(resolved.tags["env"], "prod");
    }

    #[test]
    fn test_namespace_fallbacks() {
        let mut composite = observed();
        composite["metadata"]["namespace"] = json!("org-direct");
        let resolved = resolve_inputs(&composite, Some(&input(json!({})))).unwrap();
        assert_eq!(resolved.signing_key.namespace, "org-direct");

        let mut composite = observed();
        composite["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("labels");
        let resolved = resolve_inputs(&composite, Some(&input(json!({})))).unwrap();
        assert_eq!(resolved.signing_key.namespace, "default");
        assert_eq!(resolved.signing_key.name, "demo-sa");
    }

    #[test]
    fn test_empty_region_is_rejected() {
        let mut composite = observed();
        composite["spec"]["region"] = json!("");
        let err = resolve_inputs(&composite, Some(&input(json!({})))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
