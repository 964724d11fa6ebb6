//! Generator options
//!
//! [`Options`] holds every parameter that shapes the generated topology.
//! It is filled once from the command line and checked by
//! [`Options::validate`] before anything is built.

use crate::error::{ComposeError, Result};
use std::path::PathBuf;

/// Smallest and largest node count accepted per role
pub const MIN_NODES: u32 = 1;
pub const MAX_NODES: u32 = 99;

/// Smallest LRU cache size accepted, in MB
pub const MIN_LRU_MB: u64 = 1024;

/// Default output file
pub const DEFAULT_OUT_FILE: &str = "./docker-compose.yml";

/// Where the rendered document goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

impl OutputTarget {
    /// Parse a destination argument, `-` meaning stdout
    pub fn parse(s: &str) -> Self {
        if s == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(s))
        }
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget::File(PathBuf::from(DEFAULT_OUT_FILE))
    }
}

/// Topology generator options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Number of zeros (coordinators)
    pub num_zeros: u32,
    /// Number of alphas (workers)
    pub num_alphas: u32,
    /// Number of alpha groups, used to derive the replica factor
    pub num_groups: u32,
    /// Approximate LRU cache size for alphas, in MB
    pub lru_mb: u64,
    /// Pass enterprise feature flags to alphas
    pub enterprise: bool,
    /// Host path of the ACL HMAC secret file
    pub acl_secret: Option<String>,
    /// Host directory mounted as /data
    pub data_dir: Option<String>,
    /// Mount a named docker volume as /data
    pub data_vol: bool,
    /// Keep w and zw directories on tmpfs
    pub tmpfs: bool,
    /// Run containers as the invoking user
    pub user: bool,
    /// Add a jaeger service and point nodes at it
    pub jaeger: bool,
    /// Shift alpha ports into the range the regression tests expect
    pub test_ports: bool,
    /// glog verbosity passed to every node
    pub verbosity: u32,
    /// Container image repository
    pub image: String,
    /// Container image tag
    pub tag: String,
    /// Output destination
    pub out: OutputTarget,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            num_zeros: 3,
            num_alphas: 3,
            num_groups: 1,
            lru_mb: MIN_LRU_MB,
            enterprise: false,
            acl_secret: None,
            data_dir: None,
            data_vol: false,
            tmpfs: false,
            user: false,
            jaeger: false,
            test_ports: true,
            verbosity: 2,
            image: "dgraph/dgraph".to_string(),
            tag: "latest".to_string(),
            out: OutputTarget::default(),
        }
    }
}

impl Options {
    /// Check the options and apply implied settings.
    ///
    /// Returns the resolved options together with any warnings raised
    /// along the way. The first rule violated is reported as an error.
    pub fn validate(mut self) -> Result<(Options, Vec<String>)> {
        let mut warnings = Vec::new();

        self.check_node_counts()?;
        if self.num_groups < 1 {
            return Err(ComposeError::InvalidOption(
                "number of groups must be at least 1".to_string(),
            ));
        }
        if self.lru_mb < MIN_LRU_MB {
            return Err(ComposeError::InvalidOption(format!(
                "LRU cache size must be >= {} MB",
                MIN_LRU_MB
            )));
        }
        if self.acl_secret.is_some() && !self.enterprise {
            warnings.push("adding --enterprise because it is required by ACL feature".to_string());
            self.enterprise = true;
        }
        if self.data_vol && self.data_dir.is_some() {
            return Err(ComposeError::ConflictingOptions("--data_vol", "--data_dir"));
        }
        if self.user && self.data_dir.is_none() {
            return Err(ComposeError::InvalidOption(
                "--user option requires --data_dir=<path>".to_string(),
            ));
        }

        Ok((self, warnings))
    }

    /// Check both node counts lie in [MIN_NODES, MAX_NODES]
    pub fn check_node_counts(&self) -> Result<()> {
        for (role, count) in [("zeros", self.num_zeros), ("alphas", self.num_alphas)] {
            if !(MIN_NODES..=MAX_NODES).contains(&count) {
                return Err(ComposeError::InvalidOption(format!(
                    "number of {} must be {}-{}",
                    role, MIN_NODES, MAX_NODES
                )));
            }
        }
        Ok(())
    }

    /// Replica factor handed to zeros: ceil(alphas / groups)
    pub fn replicas(&self) -> u32 {
        self.num_alphas.div_ceil(self.num_groups.max(1))
    }

    /// Full image reference, `<image>:<tag>`
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}
