//! Stager - deploy swagger-defined APIs to API Gateway stages
//!
//! Resolves an API by name (creating it on first use), applies a
//! definition to it and publishes the result as a stage named after the
//! target environment.

pub mod applier;
pub mod artifact;
pub mod audit;
pub mod aws;
pub mod cli;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod reconcile;

pub use error::{StagerError, StagerResult};
