//! # OIDC Discovery Document
//!
//! Minimal provider metadata accepted by the IAM OIDC federation for
//! service account tokens. See
//! <https://github.com/aws/amazon-eks-pod-identity-webhook/blob/master/SELF_HOSTED_SETUP.md>.

use super::partition::{partition_for_region, Addressing};
use super::SynthesisError;
use crate::constants::KEYS_DOCUMENT_NAME;
use serde::{Deserialize, Serialize};

/// Fixed authorization endpoint for programmatic (non-interactive) issuers
pub const AUTHORIZATION_ENDPOINT: &str = "urn:kubernetes:programmatic_authorization";

/// Signature algorithm advertised here and stamped onto the published key
pub const SIGNING_ALGORITHM: &str = "RS256";

/// OpenID Connect discovery document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub jwks_uri: String,
    pub response_types_supported: Vec<String>,
    pub subject_types_supported: Vec<String>,
    pub id_token_signing_alg_values_supported: Vec<String>,
    pub claims_supported: Vec<String>,
}

impl DiscoveryDocument {
    /// Compact JSON encoding
    pub fn to_json(&self) -> Result<String, SynthesisError> {
        serde_json::to_string(self).map_err(|source| SynthesisError::Json {
            document: "discovery document",
            source,
        })
    }
}

/// Build the discovery document for a cluster
///
/// In partitions with CloudFront and with a domain available the issuer is
/// `https://{domain}`; otherwise the documents are addressed through the regional
/// S3 endpoint as `https://s3.{region}.{dnsSuffix}/{bucket}`.
pub fn synthesize_discovery_document(
    domain: Option<&str>,
    bucket_name: &str,
    region: &str,
) -> DiscoveryDocument {
    let partition = partition_for_region(region);

    let issuer = match (partition.addressing(), domain) {
        (Addressing::Cdn, Some(domain)) => format!("https://{domain}"),
        _ => format!("https://{}/{bucket_name}", partition.s3_host(region)),
    };
    let jwks_uri = format!("{issuer}/{KEYS_DOCUMENT_NAME}");

    DiscoveryDocument {
        issuer,
        authorization_endpoint: AUTHORIZATION_ENDPOINT.to_string(),
        jwks_uri,
        response_types_supported: vec!["id_token".to_string()],
        subject_types_supported: vec!["public".to_string()],
        id_token_signing_alg_values_supported: vec![SIGNING_ALGORITHM.to_string()],
        claims_supported: vec!["sub".to_string(), "iss".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_partition_uses_domain() {
        let doc = synthesize_discovery_document(Some("irsa.example.com"), "bucket", "us-east-1");
        assert_eq!(doc.issuer, "https://irsa.example.com");
        assert_eq!(doc.jwks_uri, "https://irsa.example.com/keys.json");
    }

    #[test]
    fn test_china_partition_uses_bucket() {
        let doc = synthesize_discovery_document(Some("irsa.example.cn"), "my-bucket", "cn-northwest-1");
        assert_eq!(doc.issuer, "https://s3.cn-northwest-1.amazonaws.com.cn/my-bucket");
        assert_eq!(
            doc.jwks_uri,
            "https://s3.cn-northwest-1.amazonaws.com.cn/my-bucket/keys.json"
        );
    }

    #[test]
    fn test_missing_domain_falls_back_to_bucket() {
        let doc = synthesize_discovery_document(None, "my-bucket", "eu-west-1");
        assert_eq!(doc.issuer, "https://s3.eu-west-1.amazonaws.com/my-bucket");
    }

    #[test]
    fn test_json_field_names_and_constants() {
        let json = synthesize_discovery_document(Some("example.com"), "b", "us-east-1")
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"issuer":"https://example.com","authorization_endpoint":"urn:kubernetes:programmatic_authorization","jwks_uri":"https://example.com/keys.json","response_types_supported":["id_token"],"subject_types_supported":["public"],"id_token_signing_alg_values_supported":["RS256"],"claims_supported":["sub","iss"]}"#
        );
    }
}
