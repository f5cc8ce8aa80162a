//! # Serial Bridge Library
//!
//! Forwards technician serial updates to a Salesforce action endpoint,
//! authenticating with a cached OAuth2 client-credentials token and
//! re-authenticating once when the token is rejected.
//!
//! Modules:
//! - `sources`: token provider seam and the OAuth2 client-credentials provider
//! - `cache`: single-slot credential cache
//! - `action`: action client, payload mapping, response normalization
//! - `server`: inbound `/process-serial` gateway and HTTP server
//! - `config`: YAML configuration, defaults and validation

pub mod action;
pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::action::client::ActionClient;
pub use crate::action::types::{ActionRequest, NormalizedResult};
pub use crate::config::service::ServiceConfig;
pub use crate::sources::{oauth2::OAuth2TokenProvider, TokenProvider};
