//! # Function Metrics
//!
//! Metrics for RunFunction invocations: runs, failures by kind, run duration and
//! discovery outcomes per resource.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec};
use std::sync::LazyLock;

// Invocation metrics
static RUNS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("irsa_function_runs_total", "Total number of function runs")
        .expect("Failed to create RUNS_TOTAL metric - this should never happen")
});

static FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "irsa_function_failures_total",
            "Total number of failed function runs by error kind",
        ),
        &["kind"],
    )
    .expect("Failed to create FAILURES_TOTAL metric - this should never happen")
});

static RUN_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "irsa_function_run_duration_seconds",
            "Duration of function runs in seconds",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RUN_DURATION metric - this should never happen")
});

// Discovery metrics
static DISCOVERY_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "irsa_function_discovery_total",
            "Total number of discovery lookups by resource and outcome",
        ),
        &["resource", "outcome"],
    )
    .expect("Failed to create DISCOVERY_TOTAL metric - this should never happen")
});

static DISCOVERY_NOTES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "irsa_function_discovery_skipped_candidates_total",
            "Total number of candidates dropped because their details could not be fetched",
        ),
        &["resource", "kind"],
    )
    .expect("Failed to create DISCOVERY_NOTES_TOTAL metric - this should never happen")
});

/// Register function metrics with the registry
pub(crate) fn register_function_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RUNS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RUN_DURATION.clone()))?;
    REGISTRY.register(Box::new(DISCOVERY_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DISCOVERY_NOTES_TOTAL.clone()))?;
    Ok(())
}

// Public functions for function metrics

pub fn increment_runs() {
    RUNS_TOTAL.inc();
}

pub fn increment_failures(kind: &str) {
    FAILURES_TOTAL.with_label_values(&[kind]).inc();
}

pub fn observe_run_duration(duration: f64) {
    RUN_DURATION.observe(duration);
}

pub fn increment_discovery(resource: &str, outcome: &str) {
    DISCOVERY_TOTAL.with_label_values(&[resource, outcome]).inc();
}

pub fn increment_skipped_candidates(resource: &str, kind: &str) {
    DISCOVERY_NOTES_TOTAL.with_label_values(&[resource, kind]).inc();
}
