//! # CloudFront Distribution Discovery
//!
//! Finds the distribution serving the cluster domain as an alternate domain name.

use super::{match_candidates, Discovery, DomainQuery, ResourceKind};
use crate::error::{FunctionError, Stage};
use crate::function::Deadline;
use crate::provider::{DistributionApi, DistributionCandidate};

/// List distributions and keep the ones with an alias exactly equal to the domain
///
/// Aliases are compared case-sensitively.
pub async fn discover_distribution(
    api: &dyn DistributionApi,
    query: &DomainQuery,
    deadline: &Deadline,
) -> Result<Discovery<DistributionCandidate>, FunctionError> {
    let distributions = deadline
        .call(Stage::ImportDistribution, api.list_distributions())
        .await??;
    let listed = distributions.len();

    let result = match_candidates(distributions, |distribution| {
        distribution.aliases.iter().any(|alias| *alias == query.domain)
    });

    Ok(Discovery {
        resource: ResourceKind::Distribution,
        result,
        listed,
        notes: Vec::new(),
    })
}
