//! Docker Compose topology generation
//!
//! This module builds the compose document for a zero/alpha cluster
//! and writes it out as YAML.

pub mod builder;
pub mod config;
pub mod writer;

pub use builder::{Role, TopologyBuilder};
pub use config::{ComposeConfig, MountType, ServiceConfig, VolumeConfig, VolumeMount};
pub use writer::ComposeWriter;
