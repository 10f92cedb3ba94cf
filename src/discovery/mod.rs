//! # Resource Discovery
//!
//! Locates pre-existing AWS resources belonging to a cluster's IRSA setup by
//! listing them and filtering against the cluster domain.
//!
//! Every lookup produces a [`MatchResult`]. How a result is acted on depends on
//! the lookup: the hosted zone is required, the CloudFront distribution and the
//! OIDC provider are optional imports. An ambiguous result is always fatal.
//!
//! Per-candidate detail fetches (hosted zone tags, OIDC provider details) that
//! fail are recorded as [`Note`]s and the candidate is dropped; the lookup carries on.

mod distribution;
mod hosted_zone;
mod matcher;
mod oidc_provider;

pub use distribution::discover_distribution;
pub use hosted_zone::discover_hosted_zone;
pub use matcher::{match_candidates, MatchOutcome, MatchResult};
pub use oidc_provider::{discover_oidc_provider, issuer_url_for, normalize_provider_url};

use crate::error::ErrorKind;
use std::collections::BTreeMap;
use std::fmt;

/// The kinds of resource the function discovers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    HostedZone,
    Distribution,
    OidcProvider,
}

impl ResourceKind {
    /// Stable identifier used in metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::HostedZone => "hosted_zone",
            ResourceKind::Distribution => "cloudfront_distribution",
            ResourceKind::OidcProvider => "openid_connect_provider",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::HostedZone => "hosted zone",
            ResourceKind::Distribution => "cloudfront distribution",
            ResourceKind::OidcProvider => "openid connect provider",
        })
    }
}

/// What to look for, built once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainQuery {
    pub domain: String,
    pub region: String,
    /// Tags a hosted zone must carry; empty disables tag filtering
    pub tags: BTreeMap<String, String>,
    /// Name of the provider config the clients were built from
    pub provider_config: String,
}

/// A recovered per-candidate failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub resource: ResourceKind,
    /// Identifier of the candidate that was dropped
    pub candidate: String,
    pub message: String,
}

impl Note {
    /// Recovered failures are always transient provider errors
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::TransientProvider
    }
}

/// Result of one discovery operation together with what was seen on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery<T> {
    pub resource: ResourceKind,
    pub result: MatchResult<T>,
    /// Number of candidates returned by the listing
    pub listed: usize,
    /// Candidates dropped because their detail fetch failed
    pub notes: Vec<Note>,
}

/// True when `tags` contains every key/value pair of `required`
pub fn tags_superset(tags: &BTreeMap<String, String>, required: &BTreeMap<String, String>) -> bool {
    required
        .iter()
        .all(|(key, value)| tags.get(key).is_some_and(|v| v == value))
}
