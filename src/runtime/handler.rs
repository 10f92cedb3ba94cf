//! # RunFunction Handler
//!
//! Glue between the RunFunction messages and the [`IrsaFunction`] pipeline.
//!
//! The pipeline itself stays silent; this is where its [`RunReport`] is turned
//! into log events and metrics.

use crate::config::FunctionConfig;
use crate::crd::{Resource, RunFunctionRequest, RunFunctionResponse};
use crate::error::{error_chain, ErrorKind};
use crate::fieldpath::get_string;
use crate::function::{Deadline, IrsaFunction, RunReport, StageOutcome};
use crate::observability::metrics;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Desired composite to patch: the one sent by Crossplane, or a skeleton
/// identifying the observed composite when none was sent yet
fn desired_composite(request: &RunFunctionRequest, observed: &Value) -> Value {
    match &request.desired.composite {
        Some(composite) if !composite.resource.is_null() => composite.resource.clone(),
        _ => json!({
            "apiVersion": observed.get("apiVersion").cloned().unwrap_or(Value::Null),
            "kind": observed.get("kind").cloned().unwrap_or(Value::Null),
            "metadata": {
                "name": observed.pointer("/metadata/name").cloned().unwrap_or(Value::Null)
            }
        }),
    }
}

/// Emit the report as log events and metrics
fn record_report(report: &RunReport) {
    for stage in &report.stages {
        match &stage.outcome {
            StageOutcome::Completed => debug!("Stage {} completed", stage.stage),
            StageOutcome::Skipped { reason } => {
                debug!("Stage {} skipped: {}", stage.stage, reason);
            }
            StageOutcome::Discovered {
                resource,
                outcome,
                listed,
                matched,
            } => info!(
                "🔍 Discovered {} ({} of {} candidates): {}",
                resource,
                matched,
                listed,
                outcome.as_str()
            ),
            StageOutcome::Failed { kind } => {
                warn!("Stage {} failed: {}", stage.stage, kind.as_str());
            }
        }
    }
    for (resource, outcome) in report.discoveries() {
        metrics::increment_discovery(resource.as_str(), outcome.as_str());
    }

    for note in &report.notes {
        let kind = note.kind();
        warn!(
            "Skipped {} candidate {} ({}): {}",
            note.resource,
            note.candidate,
            kind.as_str(),
            note.message
        );
        metrics::increment_skipped_candidates(note.resource.as_str(), kind.as_str());
    }
    for patch in &report.patches {
        debug!("Patched {} from stage {}", patch.path, patch.stage);
    }
}

/// Handle one RunFunction request
///
/// Always produces a response. A failed run yields exactly one fatal result
/// and the desired state exactly as it was received.
pub async fn run_function(
    function: &IrsaFunction,
    config: &FunctionConfig,
    request: RunFunctionRequest,
) -> RunFunctionResponse {
    let observed = request
        .observed
        .composite
        .as_ref()
        .map(|composite| composite.resource.clone())
        .unwrap_or(Value::Null);
    let composite = get_string(&observed, "metadata.name").unwrap_or_default();
    let span = info_span!("run_function", tag = %request.meta.tag, composite = %composite);

    async move {
        let start = Instant::now();
        metrics::increment_runs();
        let mut response = RunFunctionResponse::to(&request, config.response_ttl);

        if observed.is_null() {
            error!("Request carries no observed composite resource");
            metrics::increment_failures(ErrorKind::Configuration.as_str());
            response.fatal("observed composite resource is missing");
            metrics::observe_run_duration(start.elapsed().as_secs_f64());
            return response;
        }

        let mut desired = desired_composite(&request, &observed);
        let result = function
            .run(
                &observed,
                &mut desired,
                request.input.as_ref(),
                Deadline::after(config.deadline),
            )
            .await;

        match result {
            Ok(report) => {
                record_report(&report);
                let slot = response
                    .desired
                    .composite
                    .get_or_insert_with(Resource::default);
                slot.resource = desired;
                info!(
                    "✅ Run completed with {} patches in {:?}",
                    report.patches.len(),
                    start.elapsed()
                );
            }
            Err(failure) => {
                record_report(&failure.report);
                let kind = failure.error.kind();
                let message = error_chain(&failure.error);
                error!("❌ Run failed ({}): {}", kind.as_str(), message);
                metrics::increment_failures(kind.as_str());
                response.fatal(message);
            }
        }

        metrics::observe_run_duration(start.elapsed().as_secs_f64());
        response
    }
    .instrument(span)
    .await
}
