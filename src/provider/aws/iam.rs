//! # IAM
//!
//! OpenID Connect provider listing and detail lookup.

use super::{api_error, AwsEnvironment};
use crate::provider::{OidcProviderApi, OidcProviderCandidate, ProviderError};
use async_trait::async_trait;
use aws_sdk_iam::Client;

/// IAM backed [`OidcProviderApi`]
#[derive(Debug, Clone)]
pub struct AwsOidcProviders {
    client: Client,
}

impl AwsOidcProviders {
    pub fn new(env: &AwsEnvironment) -> Self {
        let mut builder = aws_sdk_iam::config::Builder::from(&env.sdk_config);
        if let Some(endpoint) = &env.endpoints.iam {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl OidcProviderApi for AwsOidcProviders {
    async fn list_oidc_provider_arns(&self) -> Result<Vec<String>, ProviderError> {
        let output = self
            .client
            .list_open_id_connect_providers()
            .send()
            .await
            .map_err(|e| api_error("ListOpenIDConnectProviders", e))?;

        Ok(output
            .open_id_connect_provider_list()
            .iter()
            .filter_map(|entry| entry.arn().map(str::to_string))
            .collect())
    }

    async fn get_oidc_provider(&self, arn: &str) -> Result<OidcProviderCandidate, ProviderError> {
        const OPERATION: &str = "GetOpenIDConnectProvider";
        let output = self
            .client
            .get_open_id_connect_provider()
            .open_id_connect_provider_arn(arn)
            .send()
            .await
            .map_err(|e| api_error(OPERATION, e))?;

        let url = output.url().ok_or(ProviderError::MissingField {
            operation: OPERATION,
            field: "url",
        })?;

        Ok(OidcProviderCandidate {
            arn: arn.to_string(),
            url: url.to_string(),
        })
    }
}
