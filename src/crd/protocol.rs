//! # RunFunction Protocol
//!
//! JSON rendition of the composition function RunFunction messages.
//!
//! Resources are kept as schemaless [`Value`]s; the function only ever touches
//! them through field paths.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Request metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Opaque tag identifying the request, echoed in the response
    #[serde(default)]
    pub tag: String,
}

/// A composed or composite resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub resource: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connection_details: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<String>,
}

/// Observed or desired state of a composition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Resource>,
}

/// A RunFunction request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFunctionRequest {
    #[serde(default)]
    pub meta: RequestMeta,
    #[serde(default)]
    pub observed: State,
    #[serde(default)]
    pub desired: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Response metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub tag: String,
    /// How long the response may be cached, e.g. `60s`
    pub ttl: String,
}

/// Severity of a [`FunctionResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "SEVERITY_FATAL")]
    Fatal,
    #[serde(rename = "SEVERITY_WARNING")]
    Warning,
    #[serde(rename = "SEVERITY_NORMAL")]
    Normal,
}

/// A message reported back to Crossplane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub severity: Severity,
    pub message: String,
}

/// A RunFunction response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFunctionResponse {
    pub meta: ResponseMeta,
    #[serde(default)]
    pub desired: State,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<FunctionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl RunFunctionResponse {
    /// Response carrying the request's desired state, tag and context forward
    pub fn to(request: &RunFunctionRequest, ttl: Duration) -> Self {
        Self {
            meta: ResponseMeta {
                tag: request.meta.tag.clone(),
                ttl: format!("{}s", ttl.as_secs()),
            },
            desired: request.desired.clone(),
            results: Vec::new(),
            context: request.context.clone(),
        }
    }

    /// Append a fatal result
    pub fn fatal(&mut self, message: impl Into<String>) {
        self.results.push(FunctionResult {
            severity: Severity::Fatal,
            message: message.into(),
        });
    }

    /// True when a fatal result has been appended
    pub fn is_fatal(&self) -> bool {
        self.results
            .iter()
            .any(|result| result.severity == Severity::Fatal)
    }
}
