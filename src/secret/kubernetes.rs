//! # Kubernetes Secret Source
//!
//! Reads the signing key from a Kubernetes secret.

use super::{SecretError, SecretRef, SigningKeySource};
use crate::constants::SERVICE_ACCOUNT_SECRET_KEY;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use zeroize::Zeroizing;

/// Signing key source backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSigningKeySource {
    client: Client,
}

impl std::fmt::Debug for KubeSigningKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSigningKeySource").finish_non_exhaustive()
    }
}

impl KubeSigningKeySource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SigningKeySource for KubeSigningKeySource {
    async fn fetch_signing_key_pem(
        &self,
        secret: &SecretRef,
    ) -> Result<Zeroizing<Vec<u8>>, SecretError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &secret.namespace);

        let found = secrets
            .get_opt(&secret.name)
            .await
            .map_err(|e| SecretError::Api {
                namespace: secret.namespace.clone(),
                name: secret.name.clone(),
                message: e.to_string(),
            })?
            .ok_or_else(|| SecretError::NotFound {
                namespace: secret.namespace.clone(),
                name: secret.name.clone(),
            })?;

        found
            .data
            .and_then(|mut data| data.remove(SERVICE_ACCOUNT_SECRET_KEY))
            .map(|bytes| Zeroizing::new(bytes.0))
            .ok_or_else(|| SecretError::MissingKey {
                namespace: secret.namespace.clone(),
                name: secret.name.clone(),
                key: SERVICE_ACCOUNT_SECRET_KEY.to_string(),
            })
    }
}
