//! # Runtime Module
//!
//! Runtime components for the function process, including initialization,
//! the RunFunction handler and the HTTP server.

pub mod handler;
pub mod initialization;
pub mod server;

pub use handler::*;
pub use initialization::*;
pub use server::*;
