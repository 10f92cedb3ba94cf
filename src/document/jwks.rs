//! # JSON Web Key Set
//!
//! Publishes the public half of the service account signing key.
//!
//! The key id is the unpadded base64url encoding of the SHA-256 digest of the
//! DER encoded SubjectPublicKeyInfo, the same derivation the Kubernetes API
//! server uses for the `kid` header of the tokens it signs.

use super::SynthesisError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse,
    RSAKeyParameters, RSAKeyType,
};
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Content derived key id of an RSA public key
pub fn key_id(public_key: &RsaPublicKey) -> Result<String, SynthesisError> {
    let der = public_key
        .to_public_key_der()
        .map_err(|e| SynthesisError::PublicKeyEncoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(Sha256::digest(der.as_bytes())))
}

/// Build the key set publishing the public half of `private_key`
///
/// Only the modulus and public exponent are serialized.
pub fn synthesize_key_document(private_key: &RsaPrivateKey) -> Result<JwkSet, SynthesisError> {
    let public_key = private_key.to_public_key();
    let kid = key_id(&public_key)?;

    Ok(JwkSet {
        keys: vec![Jwk {
            common: CommonParameters {
                public_key_use: Some(PublicKeyUse::Signature),
                key_algorithm: Some(KeyAlgorithm::RS256),
                key_id: Some(kid),
                ..Default::default()
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
            }),
        }],
    })
}

/// JSON encoding of a key set, indented with four spaces
pub fn key_document_json(key_set: &JwkSet) -> Result<String, SynthesisError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    key_set
        .serialize(&mut serializer)
        .map_err(|source| SynthesisError::Json {
            document: "key document",
            source,
        })?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1::DecodeRsaPrivateKey;

    const FIXTURE_KEY: &str = include_str!("../../tests/fixtures/sa-signer.key");
    /// `openssl rsa -pubout -outform DER | openssl dgst -sha256 -binary | base64url`
    const FIXTURE_KID: &str = "pDXwfFNZRRWQeVTOKbjSKo-IqA149_ZS3fWD4gSaXZE";

    fn fixture() -> RsaPrivateKey {
        RsaPrivateKey::from_pkcs1_pem(FIXTURE_KEY).unwrap()
    }

    #[test]
    fn test_key_id_matches_openssl_derivation() {
        assert_eq!(key_id(&fixture().to_public_key()).unwrap(), FIXTURE_KID);
    }

    #[test]
    fn test_key_document_shape() {
        let document = synthesize_key_document(&fixture()).unwrap();
        assert_eq!(document.keys.len(), 1);

        let key = &document.keys[0];
        assert_eq!(key.common.public_key_use, Some(PublicKeyUse::Signature));
        assert_eq!(key.common.key_algorithm, Some(KeyAlgorithm::RS256));
        assert_eq!(key.common.key_id.as_deref(), Some(FIXTURE_KID));
        let AlgorithmParameters::RSA(params) = &key.algorithm else {
            panic!("expected an RSA key, got {:?}", key.algorithm);
        };
        assert_eq!(params.key_type, RSAKeyType::RSA);
        // 65537
        assert_eq!(params.e, "AQAB");
        assert!(!params.n.contains('='));
    }

    #[test]
    fn test_key_document_json_has_no_private_material() {
        let json = key_document_json(&synthesize_key_document(&fixture()).unwrap()).unwrap();
        assert!(json.starts_with("{\n    \"keys\": ["));
        assert!(json.contains("\"use\": \"sig\""));
        assert!(json.contains("\"alg\": \"RS256\""));
        assert!(json.contains("\"kty\": \"RSA\""));
        for private_field in ["\"d\"", "\"p\"", "\"q\"", "\"dp\"", "\"dq\"", "\"qi\""] {
            assert!(!json.contains(private_field), "{private_field} leaked");
        }
    }
}
