//! # Function Errors
//!
//! Error taxonomy for a single RunFunction invocation.
//!
//! Every fatal error is wrapped in [`FunctionError::Stage`] before it leaves the
//! orchestrator, so the rendered chain names the stage that failed and the input
//! it was working on, e.g.
//! `cannot discover hosted zone for domain "example.com": multiple hosted zones found matching the domain (2 matches)`.

use crate::discovery::ResourceKind;
use crate::document::SynthesisError;
use crate::fieldpath::FieldPathError;
use crate::provider::ProviderError;
use crate::secret::SecretError;
use std::fmt;
use thiserror::Error;

/// Stages of the linear reconciliation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ResolveInputs,
    CallerIdentity,
    DiscoverHostedZone,
    ImportDistribution,
    ImportOidcProvider,
    SynthesizeDiscoveryDocument,
    RetrieveSigningKey,
    SynthesizeKeyDocument,
    PatchResults,
}

impl Stage {
    /// Stable identifier used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ResolveInputs => "resolve_inputs",
            Stage::CallerIdentity => "caller_identity",
            Stage::DiscoverHostedZone => "discover_hosted_zone",
            Stage::ImportDistribution => "import_distribution",
            Stage::ImportOidcProvider => "import_oidc_provider",
            Stage::SynthesizeDiscoveryDocument => "synthesize_discovery_document",
            Stage::RetrieveSigningKey => "retrieve_signing_key",
            Stage::SynthesizeKeyDocument => "synthesize_key_document",
            Stage::PatchResults => "patch_results",
        }
    }

    /// Verb phrase used when wrapping errors ("cannot <action> for ...")
    fn action(&self) -> &'static str {
        match self {
            Stage::ResolveInputs => "resolve function input",
            Stage::CallerIdentity => "look up caller identity",
            Stage::DiscoverHostedZone => "discover hosted zone",
            Stage::ImportDistribution => "import cloudfront distribution",
            Stage::ImportOidcProvider => "import openid connect provider",
            Stage::SynthesizeDiscoveryDocument => "generate discovery file",
            Stage::RetrieveSigningKey => "retrieve service account signing key",
            Stage::SynthesizeKeyDocument => "generate keys file",
            Stage::PatchResults => "patch desired composite",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of failures, used for metrics labels and result reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid input, unresolved field path
    Configuration,
    /// A required lookup matched nothing
    DiscoveryNotFound,
    /// A lookup matched more than one resource
    DiscoveryAmbiguous,
    /// A per-candidate lookup failed; only ever recorded, never fatal
    TransientProvider,
    /// A listing or identity call against the cloud provider failed
    Provider,
    /// The signing key could not be fetched or decoded
    Secret,
    /// Document rendering failed
    Synthesis,
    /// A result could not be written to the desired resource
    Patch,
    /// The invocation deadline expired
    Timeout,
}

impl ErrorKind {
    /// Stable identifier used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::DiscoveryNotFound => "discovery_not_found",
            ErrorKind::DiscoveryAmbiguous => "discovery_ambiguous",
            ErrorKind::TransientProvider => "transient_provider_error",
            ErrorKind::Provider => "provider_error",
            ErrorKind::Secret => "secret_error",
            ErrorKind::Synthesis => "synthesis_error",
            ErrorKind::Patch => "patch_error",
            ErrorKind::Timeout => "timeout",
        }
    }
}

/// Fatal error raised while running the function
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("{0}")]
    Configuration(String),

    #[error("cannot resolve {field}")]
    Unresolved {
        field: &'static str,
        #[source]
        source: FieldPathError,
    },

    #[error("no {resource} found matching the domain: {domain}")]
    NotFound {
        resource: ResourceKind,
        domain: String,
    },

    #[error("multiple {resource}s found matching the domain: {domain} ({count} matches)")]
    Ambiguous {
        resource: ResourceKind,
        domain: String,
        count: usize,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("cannot patch field {path:?}")]
    Patch {
        path: String,
        #[source]
        source: FieldPathError,
    },

    #[error("deadline exceeded during {stage}")]
    DeadlineExceeded { stage: Stage },

    #[error("cannot {} for {input}", .stage.action())]
    Stage {
        stage: Stage,
        input: String,
        #[source]
        source: Box<FunctionError>,
    },
}

impl FunctionError {
    /// Classify the innermost failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            FunctionError::Configuration(_) | FunctionError::Unresolved { .. } => {
                ErrorKind::Configuration
            }
            FunctionError::NotFound { .. } => ErrorKind::DiscoveryNotFound,
            FunctionError::Ambiguous { .. } => ErrorKind::DiscoveryAmbiguous,
            FunctionError::Provider(_) => ErrorKind::Provider,
            FunctionError::Secret(_) => ErrorKind::Secret,
            FunctionError::Synthesis(_) => ErrorKind::Synthesis,
            FunctionError::Patch { .. } => ErrorKind::Patch,
            FunctionError::DeadlineExceeded { .. } => ErrorKind::Timeout,
            FunctionError::Stage { source, .. } => source.kind(),
        }
    }

    /// Stage that failed, if the error has been wrapped
    pub fn stage(&self) -> Option<Stage> {
        match self {
            FunctionError::Stage { stage, .. } | FunctionError::DeadlineExceeded { stage } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    /// Wrap with the stage and input that produced this error
    pub(crate) fn at(self, stage: Stage, input: impl Into<String>) -> Self {
        FunctionError::Stage {
            stage,
            input: input.into(),
            source: Box::new(self),
        }
    }
}

/// Render an error and all of its sources as `context: cause: root cause`
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        // transparent wrappers repeat their inner message
        if !rendered.ends_with(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        source = cause.source();
    }
    rendered
}
