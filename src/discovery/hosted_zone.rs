//! # Hosted Zone Discovery
//!
//! Finds the Route 53 hosted zone named after the cluster domain, optionally
//! narrowed down by tags.

use super::{match_candidates, tags_superset, Discovery, DomainQuery, MatchResult, Note, ResourceKind};
use crate::error::{FunctionError, Stage};
use crate::function::Deadline;
use crate::provider::{HostedZoneApi, HostedZoneCandidate};

/// List hosted zones and keep the ones whose trailing-dot-stripped name equals the domain
///
/// When the query carries tags, the tags of each remaining zone are fetched one
/// after another in listing order and only zones carrying all query tags are kept.
/// A zone whose tags cannot be fetched is dropped and noted.
pub async fn discover_hosted_zone(
    api: &dyn HostedZoneApi,
    query: &DomainQuery,
    deadline: &Deadline,
) -> Result<Discovery<HostedZoneCandidate>, FunctionError> {
    let stage = Stage::DiscoverHostedZone;
    let zones = deadline.call(stage, api.list_hosted_zones()).await??;
    let listed = zones.len();

    let by_name = match_candidates(zones, |zone| zone.normalized_name() == query.domain);
    let mut notes = Vec::new();

    let result = if query.tags.is_empty() {
        by_name
    } else {
        let named = match by_name {
            MatchResult::None => Vec::new(),
            MatchResult::Unique(zone) => vec![zone],
            MatchResult::Ambiguous(zones) => zones,
        };

        let mut tagged = Vec::with_capacity(named.len());
        for zone in named {
            match deadline
                .call(stage, api.list_hosted_zone_tags(zone.bare_id()))
                .await?
            {
                Ok(tags) => {
                    if tags_superset(&tags, &query.tags) {
                        tagged.push(zone);
                    }
                }
                Err(e) => notes.push(Note {
                    resource: ResourceKind::HostedZone,
                    candidate: zone.id.clone(),
                    message: format!("cannot list tags, skipping zone: {e}"),
                }),
            }
        }
        MatchResult::from_matches(tagged)
    };

    Ok(Discovery {
        resource: ResourceKind::HostedZone,
        result,
        listed,
        notes,
    })
}
