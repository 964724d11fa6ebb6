//! Docker Compose document types
//!
//! Field order in these structs is the order keys appear in the
//! rendered file, and every map is a `BTreeMap`, so two renders of the
//! same document are byte-identical.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compose file format version written to every document
pub const COMPOSE_VERSION: &str = "3.5";

/// Docker Compose file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Compose file version
    pub version: String,
    /// Services, keyed by service name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
    /// Named volumes
    #[serde(default)]
    pub volumes: BTreeMap<String, VolumeConfig>,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            version: COMPOSE_VERSION.to_string(),
            services: BTreeMap::new(),
            volumes: BTreeMap::new(),
        }
    }
}

impl ComposeConfig {
    /// Add a service under its own name, replacing any previous one
    pub fn add_service(&mut self, service: ServiceConfig) {
        self.services.insert(service.name.clone(), service);
    }

    /// Declare a named volume with default settings
    pub fn add_volume(&mut self, name: &str) {
        self.volumes.insert(name.to_string(), VolumeConfig::default());
    }
}

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name; the key in `services`, never written as a field
    #[serde(skip)]
    pub name: String,
    /// Image reference
    pub image: String,
    /// Container name
    pub container_name: String,
    /// Working directory
    pub working_dir: String,
    /// Services started before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Environment as KEY=value strings
    #[serde(default)]
    pub environment: Vec<String>,
    /// Port mappings, short syntax "host:container"
    #[serde(default)]
    pub ports: Vec<String>,
    /// Volume mounts
    #[serde(default)]
    pub volumes: Vec<VolumeMount>,
    /// tmpfs mount points
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tmpfs: Vec<String>,
    /// User to run as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Command string
    pub command: String,
}

impl ServiceConfig {
    /// Create a service whose container name matches its service name
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            container_name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Mount type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    /// Host path bind mount
    Bind,
    /// Named volume
    Volume,
}

/// Volume mount, long syntax
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Mount type
    #[serde(rename = "type")]
    pub mount_type: MountType,
    /// Host path or volume name
    pub source: String,
    /// Target path in container
    pub target: String,
    /// Read only
    #[serde(default)]
    pub read_only: bool,
}

impl VolumeMount {
    /// Bind mount a host path
    pub fn bind(source: &str, target: &str, read_only: bool) -> Self {
        Self {
            mount_type: MountType::Bind,
            source: source.to_string(),
            target: target.to_string(),
            read_only,
        }
    }

    /// Mount a named volume read-write
    pub fn volume(name: &str, target: &str) -> Self {
        Self {
            mount_type: MountType::Volume,
            source: name.to_string(),
            target: target.to_string(),
            read_only: false,
        }
    }
}

/// Named volume configuration; the generator only declares volumes
/// with default settings, written as `{}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeConfig {}
