//! # OpenID Connect Provider Discovery
//!
//! Finds the IAM OIDC provider whose issuer URL is `https://{domain}`.
//!
//! IAM stores provider URLs without a scheme (`example.com`), while the issuer
//! advertised by the discovery document carries one (`https://example.com`).
//! Both sides are normalized to `https://host[/path]` without a trailing slash
//! and then compared for exact equality. ARN substring matching is not used:
//! a provider for `foo.example.com` must never be taken for `example.com`.

use super::{Discovery, DomainQuery, MatchResult, Note, ResourceKind};
use crate::error::{FunctionError, Stage};
use crate::function::Deadline;
use crate::provider::{OidcProviderApi, OidcProviderCandidate};

/// Issuer URL the provider for `domain` is registered under
pub fn issuer_url_for(domain: &str) -> String {
    normalize_provider_url(domain)
}

/// Normalize a provider URL to `https://host[/path]`
///
/// Any scheme is dropped, whatever its case, before `https://` is put back.
pub fn normalize_provider_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let rest = match trimmed.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            rest
        }
        _ => trimmed,
    };
    format!("https://{rest}")
}

/// List OIDC providers, fetch each one's detail in listing order and keep those
/// whose URL matches the domain
///
/// Providers whose detail cannot be fetched are skipped and noted.
pub async fn discover_oidc_provider(
    api: &dyn OidcProviderApi,
    query: &DomainQuery,
    deadline: &Deadline,
) -> Result<Discovery<OidcProviderCandidate>, FunctionError> {
    let stage = Stage::ImportOidcProvider;
    let arns = deadline.call(stage, api.list_oidc_provider_arns()).await??;
    let listed = arns.len();
    let expected = issuer_url_for(&query.domain);

    let mut matches = Vec::new();
    let mut notes = Vec::new();
    for arn in arns {
        match deadline.call(stage, api.get_oidc_provider(&arn)).await? {
            Ok(provider) => {
                if normalize_provider_url(&provider.url) == expected {
                    matches.push(provider);
                }
            }
            Err(e) => notes.push(Note {
                resource: ResourceKind::OidcProvider,
                candidate: arn,
                message: format!("cannot get provider details, skipping: {e}"),
            }),
        }
    }

    Ok(Discovery {
        resource: ResourceKind::OidcProvider,
        result: MatchResult::from_matches(matches),
        listed,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_provider_url() {
        assert_eq!(normalize_provider_url("example.com"), "https://example.com");
        assert_eq!(normalize_provider_url("https://example.com/"), "https://example.com");
        assert_eq!(
            normalize_provider_url("s3.cn-north-1.amazonaws.com.cn/bucket"),
            "https://s3.cn-north-1.amazonaws.com.cn/bucket"
        );
    }

    #[test]
    fn test_normalize_provider_url_replaces_any_scheme() {
        assert_eq!(normalize_provider_url("http://example.com"), "https://example.com");
        assert_eq!(normalize_provider_url("HTTPS://example.com"), "https://example.com");
        assert_eq!(normalize_provider_url("Https://example.com/"), "https://example.com");
        assert_eq!(
            normalize_provider_url("http://example.com"),
            issuer_url_for("example.com")
        );
    }

    #[test]
    fn test_subdomain_does_not_match_parent() {
        assert_ne!(
            normalize_provider_url("irsa.example.com"),
            issuer_url_for("example.com")
        );
    }
}
