//! # Document Synthesis
//!
//! Renders the two documents a self-hosted IRSA issuer publishes:
//!
//! - the OIDC discovery document (`.well-known/openid-configuration`)
//! - the JSON Web Key Set (`keys.json`) derived from the service account signing key
//!
//! Both are pure functions of their inputs.

mod discovery;
mod jwks;
mod partition;

pub use discovery::{
    synthesize_discovery_document, DiscoveryDocument, AUTHORIZATION_ENDPOINT, SIGNING_ALGORITHM,
};
pub use jwks::{key_document_json, key_id, synthesize_key_document};
pub use partition::{partition_for_region, Addressing, Partition};

use thiserror::Error;

/// Failure while rendering a document
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The public key could not be DER encoded
    #[error("failed to serialize public key to DER format: {0}")]
    PublicKeyEncoding(String),
    /// The document could not be serialized
    #[error("cannot encode {document} to JSON")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
