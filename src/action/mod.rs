//! Downstream action call: payload mapping, single re-authentication retry
//! and response normalization.

pub mod client;
pub mod normalize;
pub mod types;
