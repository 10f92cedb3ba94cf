//! # Route 53
//!
//! Hosted zone listing and tag lookup.

use super::{api_error, AwsEnvironment};
use crate::provider::{HostedZoneApi, HostedZoneCandidate, ProviderError};
use async_trait::async_trait;
use aws_sdk_route53::types::TagResourceType;
use aws_sdk_route53::Client;
use std::collections::BTreeMap;

/// Route 53 backed [`HostedZoneApi`]
#[derive(Debug, Clone)]
pub struct AwsHostedZones {
    client: Client,
}

impl AwsHostedZones {
    pub fn new(env: &AwsEnvironment) -> Self {
        let mut builder = aws_sdk_route53::config::Builder::from(&env.sdk_config);
        if let Some(endpoint) = &env.endpoints.route53 {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl HostedZoneApi for AwsHostedZones {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZoneCandidate>, ProviderError> {
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_hosted_zones()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| api_error("ListHostedZones", e))?;

            zones.extend(output.hosted_zones().iter().map(|zone| HostedZoneCandidate {
                id: zone.id().to_string(),
                name: zone.name().to_string(),
            }));

            marker = output
                .is_truncated()
                .then(|| output.next_marker().map(str::to_string))
                .flatten();
            if marker.is_none() {
                break;
            }
        }

        Ok(zones)
    }

    async fn list_hosted_zone_tags(
        &self,
        zone_id: &str,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_type(TagResourceType::Hostedzone)
            .resource_id(zone_id)
            .send()
            .await
            .map_err(|e| api_error("ListTagsForResource", e))?;

        Ok(output
            .resource_tag_set()
            .map(|set| {
                set.tags()
                    .iter()
                    .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
                    .collect()
            })
            .unwrap_or_default())
    }
}
