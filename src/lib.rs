//! compose-gen - docker-compose generator for dgraph clusters
//!
//! Builds a docker-compose file describing a cluster of zeros
//! (coordinators) and alphas (workers) from a handful of options:
//!
//! - Node counts, group count and LRU size
//! - Data on a named volume or a host directory
//! - Enterprise features and ACL secrets
//! - Running as the invoking user, tmpfs, jaeger tracing

pub mod compose;
pub mod error;
pub mod identity;
pub mod options;

pub use error::{ComposeError, Result};
pub use options::{Options, OutputTarget};
