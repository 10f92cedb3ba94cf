//! # IRSA Function
//!
//! The orchestrator: a linear pipeline run once per RunFunction call.
//!
//! ```text
//! ResolveInputs -> CallerIdentity -> DiscoverHostedZone -> ImportDistribution
//!   -> ImportOidcProvider -> SynthesizeDiscoveryDocument -> RetrieveSigningKey
//!   -> SynthesizeKeyDocument -> PatchResults
//! ```
//!
//! - `CallerIdentity` only runs when an account id patch target is configured
//! - the three discovery stages only run when a domain is configured
//! - the first fatal error ends the run, wrapped with the stage and its input
//! - results are staged while the pipeline runs and only written to the desired
//!   composite in `PatchResults`, so a failed run never leaves a partial patch
//!
//! The provider clients and the signing key source are injected, which keeps
//! the pipeline free of any AWS or Kubernetes specifics.

pub mod deadline;
mod inputs;
mod report;

pub use deadline::Deadline;
pub use inputs::{resolve_inputs, ResolvedInputs};
pub use report::{AppliedPatch, RunFailure, RunReport, StageOutcome, StageReport};

use crate::discovery::{
    discover_distribution, discover_hosted_zone, discover_oidc_provider, Discovery, DomainQuery,
    MatchResult,
};
use crate::document::{key_document_json, synthesize_discovery_document, synthesize_key_document};
use crate::error::{FunctionError, Stage};
use crate::fieldpath::{get_string, set_value};
use crate::provider::{ClientFactory, ProviderClients};
use crate::secret::{decode_signing_key, SigningKeySource};
use serde_json::Value;
use std::sync::Arc;

/// A result waiting for `PatchResults`
#[derive(Debug)]
struct StagedPatch {
    stage: Stage,
    path: String,
    value: Value,
}

/// Mutable state of one pass through the pipeline
#[derive(Debug)]
struct Pass {
    deadline: Deadline,
    report: RunReport,
    staged: Vec<StagedPatch>,
}

impl Pass {
    fn stage_patch(&mut self, stage: Stage, path: &str, value: impl Into<Value>) {
        self.staged.push(StagedPatch {
            stage,
            path: path.to_string(),
            value: value.into(),
        });
    }

    /// Record a discovery and decide what to do with it
    ///
    /// Ambiguous results always fail. Nothing found only fails when `required`.
    fn settle<T>(
        &mut self,
        stage: Stage,
        discovery: Discovery<T>,
        domain: &str,
        required: bool,
    ) -> Result<Option<T>, FunctionError> {
        self.report.record(
            stage,
            StageOutcome::Discovered {
                resource: discovery.resource,
                outcome: discovery.result.outcome(),
                listed: discovery.listed,
                matched: discovery.result.len(),
            },
        );
        self.report.notes.extend(discovery.notes);

        match discovery.result {
            MatchResult::Unique(found) => Ok(Some(found)),
            MatchResult::None if !required => Ok(None),
            MatchResult::None => Err(FunctionError::NotFound {
                resource: discovery.resource,
                domain: domain.to_string(),
            }),
            MatchResult::Ambiguous(all) => Err(FunctionError::Ambiguous {
                resource: discovery.resource,
                domain: domain.to_string(),
                count: all.len(),
            }),
        }
    }
}

/// The IRSA composition function
#[derive(Clone)]
pub struct IrsaFunction {
    clients: Arc<dyn ClientFactory>,
    signing_keys: Arc<dyn SigningKeySource>,
}

impl std::fmt::Debug for IrsaFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrsaFunction").finish_non_exhaustive()
    }
}

impl IrsaFunction {
    pub fn new(clients: Arc<dyn ClientFactory>, signing_keys: Arc<dyn SigningKeySource>) -> Self {
        Self {
            clients,
            signing_keys,
        }
    }

    /// Run the pipeline for one invocation
    ///
    /// `observed` is the observed composite resource, `desired` the desired one.
    /// `desired` is only modified when the whole run succeeds.
    pub async fn run(
        &self,
        observed: &Value,
        desired: &mut Value,
        input: Option<&Value>,
        deadline: Deadline,
    ) -> Result<RunReport, RunFailure> {
        let mut pass = Pass {
            deadline,
            report: RunReport::default(),
            staged: Vec::new(),
        };

        match self.execute(&mut pass, observed, desired, input).await {
            Ok(()) => Ok(pass.report),
            Err(error) => {
                if let Some(stage) = error.stage() {
                    pass.report.record(stage, StageOutcome::Failed { kind: error.kind() });
                }
                Err(RunFailure {
                    error,
                    report: pass.report,
                })
            }
        }
    }

    async fn execute(
        &self,
        pass: &mut Pass,
        observed: &Value,
        desired: &mut Value,
        input: Option<&Value>,
    ) -> Result<(), FunctionError> {
        let composite = get_string(observed, "metadata.name")
            .map_or_else(|_| "composite resource".to_string(), |name| format!("composite {name:?}"));
        let (inputs, clients) = self
            .resolve(pass, observed, input)
            .await
            .map_err(|e| e.at(Stage::ResolveInputs, composite))?;
        pass.report.record(Stage::ResolveInputs, StageOutcome::Completed);

        self.caller_identity(pass, &inputs, &clients).await?;

        match &inputs.domain {
            Some(domain) => {
                let query = DomainQuery {
                    domain: domain.clone(),
                    region: inputs.region.clone(),
                    tags: inputs.tags.clone(),
                    provider_config: inputs.provider_config.clone(),
                };
                let described = format!("domain {domain:?}");
                self.import_resources(pass, &inputs, &clients, &query)
                    .await
                    .map_err(|(stage, e)| e.at(stage, described))?;
            }
            None => {
                for stage in [
                    Stage::DiscoverHostedZone,
                    Stage::ImportDistribution,
                    Stage::ImportOidcProvider,
                ] {
                    pass.report.record(
                        stage,
                        StageOutcome::Skipped {
                            reason: "no domain configured",
                        },
                    );
                }
            }
        }

        let stage = Stage::SynthesizeDiscoveryDocument;
        let described = match &inputs.domain {
            Some(domain) => format!("domain {domain:?}"),
            None => format!("bucket {:?}", inputs.bucket_name),
        };
        pass.deadline.check(stage).map_err(|e| e.at(stage, &described))?;
        let discovery = synthesize_discovery_document(
            inputs.domain.as_deref(),
            &inputs.bucket_name,
            &inputs.region,
        )
        .to_json()
        .map_err(|e| FunctionError::from(e).at(stage, &described))?;
        pass.stage_patch(stage, &inputs.spec.s3_discovery_patch_to_ref, discovery);
        pass.report.record(stage, StageOutcome::Completed);

        let described = format!("secret {}", inputs.signing_key);
        let stage = Stage::RetrieveSigningKey;
        pass.deadline.check(stage).map_err(|e| e.at(stage, &described))?;
        let signing_key = async {
            let pem = pass
                .deadline
                .call(stage, self.signing_keys.fetch_signing_key_pem(&inputs.signing_key))
                .await??;
            Ok::<_, FunctionError>(decode_signing_key(&pem)?)
        }
        .await
        .map_err(|e| e.at(stage, &described))?;
        pass.report.record(stage, StageOutcome::Completed);

        let stage = Stage::SynthesizeKeyDocument;
        pass.deadline.check(stage).map_err(|e| e.at(stage, &described))?;
        let keys = synthesize_key_document(&signing_key)
            .and_then(|document| key_document_json(&document))
            .map_err(|e| FunctionError::from(e).at(stage, &described))?;
        drop(signing_key);
        pass.stage_patch(stage, &inputs.spec.s3_keys_patch_to_ref, keys);
        pass.report.record(stage, StageOutcome::Completed);

        let stage = Stage::PatchResults;
        pass.deadline
            .check(stage)
            .map_err(|e| e.at(stage, "desired composite"))?;
        apply_patches(pass, desired).map_err(|e| e.at(stage, "desired composite"))?;
        pass.report.record(stage, StageOutcome::Completed);
        Ok(())
    }

    async fn resolve(
        &self,
        pass: &Pass,
        observed: &Value,
        input: Option<&Value>,
    ) -> Result<(ResolvedInputs, ProviderClients), FunctionError> {
        pass.deadline.check(Stage::ResolveInputs)?;
        let inputs = resolve_inputs(observed, input)?;
        let clients = pass
            .deadline
            .call(
                Stage::ResolveInputs,
                self.clients.clients(&inputs.region, &inputs.provider_config),
            )
            .await??;
        Ok((inputs, clients))
    }

    async fn caller_identity(
        &self,
        pass: &mut Pass,
        inputs: &ResolvedInputs,
        clients: &ProviderClients,
    ) -> Result<(), FunctionError> {
        let stage = Stage::CallerIdentity;
        let Some(path) = inputs.spec.account_id_patch_to() else {
            pass.report.record(
                stage,
                StageOutcome::Skipped {
                    reason: "no account id patch target",
                },
            );
            return Ok(());
        };

        let described = format!("provider config {:?}", inputs.provider_config);
        let account_id = async {
            pass.deadline.check(stage)?;
            Ok::<_, FunctionError>(
                pass.deadline
                    .call(stage, clients.caller_identity.account_id())
                    .await??,
            )
        }
        .await
        .map_err(|e| e.at(stage, described))?;

        pass.stage_patch(stage, path, account_id);
        pass.report.record(stage, StageOutcome::Completed);
        Ok(())
    }

    /// Hosted zone lookup followed by the optional imports
    ///
    /// Errors carry the stage they happened in.
    async fn import_resources(
        &self,
        pass: &mut Pass,
        inputs: &ResolvedInputs,
        clients: &ProviderClients,
        query: &DomainQuery,
    ) -> Result<(), (Stage, FunctionError)> {
        let spec = &inputs.spec;

        let stage = Stage::DiscoverHostedZone;
        pass.deadline.check(stage).map_err(|e| (stage, e))?;
        let discovery = discover_hosted_zone(clients.hosted_zones.as_ref(), query, &pass.deadline)
            .await
            .map_err(|e| (stage, e))?;
        let zone = pass
            .settle(stage, discovery, &query.domain, true)
            .map_err(|e| (stage, e))?;
        if let (Some(zone), Some(path)) = (zone, spec.hosted_zone_patch_to()) {
            pass.stage_patch(stage, path, zone.bare_id());
        }

        let stage = Stage::ImportDistribution;
        pass.deadline.check(stage).map_err(|e| (stage, e))?;
        let discovery =
            discover_distribution(clients.distributions.as_ref(), query, &pass.deadline)
                .await
                .map_err(|e| (stage, e))?;
        if let Some(distribution) = pass
            .settle(stage, discovery, &query.domain, false)
            .map_err(|e| (stage, e))?
        {
            pass.stage_patch(stage, spec.distribution_id_patch_to(), distribution.id);
        }

        let stage = Stage::ImportOidcProvider;
        pass.deadline.check(stage).map_err(|e| (stage, e))?;
        let discovery =
            discover_oidc_provider(clients.oidc_providers.as_ref(), query, &pass.deadline)
                .await
                .map_err(|e| (stage, e))?;
        if let Some(provider) = pass
            .settle(stage, discovery, &query.domain, false)
            .map_err(|e| (stage, e))?
        {
            pass.stage_patch(stage, spec.open_id_provider_arn_patch_to(), provider.arn);
        }

        Ok(())
    }
}

/// Write every staged result onto a copy of `desired`, then commit the copy
fn apply_patches(pass: &mut Pass, desired: &mut Value) -> Result<(), FunctionError> {
    let mut working = desired.clone();
    let mut applied = Vec::with_capacity(pass.staged.len());

    for patch in std::mem::take(&mut pass.staged) {
        set_value(&mut working, &patch.path, patch.value).map_err(|source| {
            FunctionError::Patch {
                path: patch.path.clone(),
                source,
            }
        })?;
        applied.push(AppliedPatch {
            stage: patch.stage,
            path: patch.path,
        });
    }

    *desired = working;
    pass.report.patches = applied;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldpath::FieldPathError;
    use serde_json::json;
    use std::time::Duration;

    fn pass() -> Pass {
        Pass {
            deadline: Deadline::after(Duration::from_secs(30)),
            report: RunReport::default(),
            staged: Vec::new(),
        }
    }

    #[test]
    fn test_apply_patches_commits_all_or_nothing() {
        let mut pass = pass();
        pass.stage_patch(Stage::DiscoverHostedZone, "status.zoneId", "Z123");
        pass.stage_patch(Stage::SynthesizeKeyDocument, "status.keys[0]", "{}");
        let mut desired = json!({"metadata": {"name": "demo"}, "status": "flat"});
        let before = desired.clone();

        let err = apply_patches(&mut pass, &mut desired).unwrap_err();
        assert!(matches!(
            err,
            FunctionError::Patch {
                source: FieldPathError::WrongType { .. },
                ..
            }
        ));
        assert_eq!(desired, before);
        assert!(pass.report.patches.is_empty());
    }

    #[test]
    fn test_apply_patches_records_paths() {
        let mut pass = pass();
        pass.stage_patch(Stage::CallerIdentity, "status.accountId", "123456789012");
        let mut desired = json!({});
        apply_patches(&mut pass, &mut desired).unwrap();
        assert_eq!(desired, json!({"status": {"accountId": "123456789012"}}));
        assert_eq!(
            pass.report.patches,
            vec![AppliedPatch {
                stage: Stage::CallerIdentity,
                path: "status.accountId".to_string()
            }]
        );
    }

    #[test]
    fn test_settle_policy() {
        let mut pass = pass();
        let discovery = |result| Discovery {
            resource: crate::discovery::ResourceKind::Distribution,
            result,
            listed: 3,
            notes: Vec::new(),
        };

        let found = pass
            .settle(Stage::ImportDistribution, discovery(MatchResult::None), "example.com", false)
            .unwrap();
        assert_eq!(found, None::<u8>);

        let err = pass
            .settle(Stage::ImportDistribution, discovery(MatchResult::<u8>::None), "example.com", true)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no cloudfront distribution found matching the domain: example.com"
        );

        let err = pass
            .settle(
                Stage::ImportDistribution,
                discovery(MatchResult::Ambiguous(vec![1u8, 2])),
                "example.com",
                false,
            )
            .unwrap_err();
        assert!(matches!(err, FunctionError::Ambiguous { count: 2, .. }));
        assert_eq!(pass.report.stages.len(), 3);
    }
}
