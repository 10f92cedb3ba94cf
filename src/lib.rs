//! Crossplane composition function for IAM Roles for Service Accounts (IRSA).
//!
//! For a cluster composite resource the function
//!
//! 1. discovers the Route 53 hosted zone of the cluster domain and imports the
//!    CloudFront distribution and IAM OpenID Connect provider already serving it
//! 2. renders the OIDC discovery document and the JSON Web Key Set published
//!    for the cluster's service account issuer
//!
//! and writes the results as field patches onto the desired composite.
//! It never creates or modifies cloud resources.

pub mod config;
pub mod constants;
pub mod crd;
pub mod discovery;
pub mod document;
pub mod error;
pub mod fieldpath;
pub mod function;
pub mod observability;
pub mod provider;
pub mod runtime;
pub mod secret;

pub use error::{error_chain, ErrorKind, FunctionError, Stage};
pub use function::{Deadline, IrsaFunction, RunFailure, RunReport};
