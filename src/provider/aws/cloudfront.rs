//! # CloudFront
//!
//! Distribution listing.

use super::{api_error, AwsEnvironment};
use crate::provider::{DistributionApi, DistributionCandidate, ProviderError};
use async_trait::async_trait;
use aws_sdk_cloudfront::Client;

/// CloudFront backed [`DistributionApi`]
#[derive(Debug, Clone)]
pub struct AwsDistributions {
    client: Client,
}

impl AwsDistributions {
    pub fn new(env: &AwsEnvironment) -> Self {
        let mut builder = aws_sdk_cloudfront::config::Builder::from(&env.sdk_config);
        if let Some(endpoint) = &env.endpoints.cloudfront {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl DistributionApi for AwsDistributions {
    async fn list_distributions(&self) -> Result<Vec<DistributionCandidate>, ProviderError> {
        let mut distributions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| api_error("ListDistributions", e))?;

            // An account without distributions returns no list at all
            let Some(list) = output.distribution_list() else {
                break;
            };

            distributions.extend(list.items().iter().map(|summary| DistributionCandidate {
                id: summary.id().to_string(),
                aliases: summary
                    .aliases()
                    .map(|aliases| aliases.items().to_vec())
                    .unwrap_or_default(),
            }));

            marker = list
                .is_truncated()
                .then(|| list.next_marker().map(str::to_string))
                .flatten();
            if marker.is_none() {
                break;
            }
        }

        Ok(distributions)
    }
}
