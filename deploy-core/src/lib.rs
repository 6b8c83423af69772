//! Core library for the `shouldideploy` CLI.
//!
//! This crate defines:
//! - Configuration handling (defaults, on-disk TOML)
//! - The advisory client and the `Advisor` abstraction over it
//! - Shared domain models (request parameters, advisory results, errors)
//!
//! It is used by `deploy-cli`, but can also be reused by other binaries or services.

pub mod advisor;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;

pub use advisor::{Advisor, client::AdvisoryClient};
pub use config::{Config, Settings};
pub use error::AdvisoryError;
pub use model::{AdvisoryResult, RequestParameters};
