//! Cluster topology builder
//!
//! Turns validated [`Options`] into a [`ComposeConfig`]: one service per
//! zero and alpha instance, plus the jaeger sidecar when requested.
//! Every value is derived from the instance index and the options, so
//! the same options always give the same document.

use super::config::{ComposeConfig, ServiceConfig, VolumeMount};
use crate::error::Result;
use crate::identity::{self, CurrentUser};
use crate::options::Options;
use std::collections::BTreeMap;

/// First zero's gRPC port
pub const ZERO_BASE_PORT: u16 = 5080;
/// First alpha's internal port
pub const ALPHA_BASE_PORT: u16 = 7080;
/// Alpha port shift when the regression-test port range is on
pub const TEST_PORT_SHIFT: u16 = 100;
/// Distance from a node's internal port to its next exposed port
pub const PORT_OFFSET: u16 = 1000;

/// Host directory holding the dgraph binary
pub const HOST_BIN_DIR: &str = "$GOPATH/bin";
/// Where the binary directory is mounted in containers
pub const CONTAINER_BIN_DIR: &str = "/gobin";
/// Named volume used in data-volume mode
pub const DATA_VOLUME: &str = "data";
/// Where the ACL secret is mounted in alphas
pub const SECRET_TARGET: &str = "/secret/hmac";
/// Networks alphas accept admin requests from
pub const WHITELIST: &str = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16";
/// Jaeger collector endpoint
pub const JAEGER_COLLECTOR: &str = "http://jaeger:14268";
/// Jaeger service name
pub const JAEGER_SERVICE: &str = "jaeger";

/// Node role in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Coordinator, handles membership and metadata
    Zero,
    /// Worker, serves data
    Alpha,
}

impl Role {
    /// Service name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Zero => "zero",
            Role::Alpha => "alpha",
        }
    }

    /// Service name for the 1-based `idx`
    pub fn service_name(&self, idx: u32) -> String {
        format!("{}{}", self.prefix(), idx)
    }
}

/// Port offset for the 1-based `idx`: the first node sits on the base
/// port, node i > 1 on base + i. `idx` is at most `MAX_NODES`.
fn port_offset(idx: u32) -> u16 {
    match idx {
        1 => 0,
        _ => u16::try_from(idx).unwrap_or(u16::MAX),
    }
}

fn exposed_port(port: u16) -> String {
    format!("{}:{}", port, port)
}

/// Builds the compose document for a cluster
pub struct TopologyBuilder<'a> {
    /// Validated options
    options: &'a Options,
    /// Invoking user, present in run-as-user mode
    user: Option<CurrentUser>,
}

impl<'a> TopologyBuilder<'a> {
    /// Create a builder, looking up the current user if the options ask
    /// for run-as-user mode
    pub fn new(options: &'a Options) -> Result<Self> {
        let user = if options.user {
            let user = identity::current_user()?;
            tracing::debug!("Running nodes as {} (uid {})", user.name, user.uid);
            Some(user)
        } else {
            None
        };
        Self::with_user(options, user)
    }

    /// Create a builder with an already resolved user.
    ///
    /// Node counts outside [`MAX_NODES`](crate::options::MAX_NODES) are
    /// rejected since they would run ports past the u16 range.
    pub fn with_user(options: &'a Options, user: Option<CurrentUser>) -> Result<Self> {
        options.check_node_counts()?;
        Ok(Self { options, user })
    }

    /// Build the whole document
    pub fn build(&self) -> ComposeConfig {
        let mut config = ComposeConfig::default();

        for idx in 1..=self.options.num_zeros {
            config.add_service(self.zero(idx));
        }
        for idx in 1..=self.options.num_alphas {
            config.add_service(self.alpha(idx));
        }

        if self.options.data_vol {
            config.add_volume(DATA_VOLUME);
        }
        if self.options.jaeger {
            config.add_service(self.jaeger());
        }

        tracing::debug!(
            "Built topology with {} services and {} volumes",
            config.services.len(),
            config.volumes.len()
        );
        config
    }

    /// Fields shared by zeros and alphas
    fn base_service(&self, role: Role, idx: u32, grpc_port: u16) -> ServiceConfig {
        let name = role.service_name(idx);
        let mut svc = ServiceConfig::new(&name, &self.options.image_ref());

        svc.working_dir = format!("/data/{}", name);
        if idx > 1 {
            svc.depends_on.push(role.service_name(idx - 1));
        }
        svc.labels = BTreeMap::from([("cluster".to_string(), "test".to_string())]);
        svc.ports = vec![exposed_port(grpc_port), exposed_port(grpc_port + PORT_OFFSET)];

        svc.volumes
            .push(VolumeMount::bind(HOST_BIN_DIR, CONTAINER_BIN_DIR, true));
        if self.options.data_vol {
            svc.volumes.push(VolumeMount::volume(DATA_VOLUME, "/data"));
        } else if let Some(dir) = &self.options.data_dir {
            svc.volumes.push(VolumeMount::bind(dir, "/data", false));
        }

        svc.command = format!("{}/dgraph", CONTAINER_BIN_DIR);
        if let Some(user) = &self.user {
            svc.user = Some(user.compose_user());
            svc.working_dir = format!("/working/{}", name);
            svc.command.push_str(&format!(" --cwd=/data/{}", name));
        }
        if self.options.jaeger {
            svc.command
                .push_str(&format!(" --jaeger.collector={}", JAEGER_COLLECTOR));
        }

        svc
    }

    /// Zero (coordinator) number `idx`
    fn zero(&self, idx: u32) -> ServiceConfig {
        let opts = self.options;
        let grpc_port = ZERO_BASE_PORT + port_offset(idx);

        let mut svc = self.base_service(Role::Zero, idx, grpc_port);

        if opts.tmpfs {
            svc.tmpfs.push(format!("/data/{}/zw", svc.name));
        }

        let cmd = &mut svc.command;
        cmd.push_str(&format!(" zero -o {} --idx={}", idx - 1, idx));
        cmd.push_str(&format!(" --my={}:{}", svc.name, grpc_port));
        cmd.push_str(&format!(" --replicas={}", opts.replicas()));
        cmd.push_str(&format!(" --logtostderr -v={}", opts.verbosity));
        if idx == 1 {
            cmd.push_str(" --bindall");
        } else {
            cmd.push_str(&format!(
                " --peer={}:{}",
                Role::Zero.service_name(1),
                ZERO_BASE_PORT
            ));
        }

        tracing::debug!("Generated {} on port {}", svc.name, grpc_port);
        svc
    }

    /// Alpha (worker) number `idx`
    fn alpha(&self, idx: u32) -> ServiceConfig {
        let opts = self.options;
        let shift = if opts.test_ports { TEST_PORT_SHIFT } else { 0 };
        let internal_port = ALPHA_BASE_PORT + shift + port_offset(idx);
        let grpc_port = internal_port + PORT_OFFSET;

        let mut svc = self.base_service(Role::Alpha, idx, grpc_port);

        if opts.tmpfs {
            svc.tmpfs.push(format!("/data/{}/w", svc.name));
        }

        let cmd = &mut svc.command;
        cmd.push_str(&format!(" alpha -o {}", u32::from(shift) + idx - 1));
        cmd.push_str(&format!(" --my={}:{}", svc.name, internal_port));
        cmd.push_str(&format!(" --lru_mb={}", opts.lru_mb));
        cmd.push_str(&format!(
            " --zero={}:{}",
            Role::Zero.service_name(1),
            ZERO_BASE_PORT
        ));
        cmd.push_str(&format!(" --logtostderr -v={}", opts.verbosity));
        cmd.push_str(&format!(" --whitelist={}", WHITELIST));

        if opts.enterprise {
            cmd.push_str(" --enterprise_features");
            if let Some(secret) = &opts.acl_secret {
                cmd.push_str(&format!(
                    " --acl_secret_file={} --acl_access_ttl 10s",
                    SECRET_TARGET
                ));
                svc.volumes.push(VolumeMount::bind(secret, SECRET_TARGET, true));
            }
        }

        tracing::debug!("Generated {} on port {}", svc.name, internal_port);
        svc
    }

    /// Jaeger all-in-one tracing service
    fn jaeger(&self) -> ServiceConfig {
        let mut svc = ServiceConfig::new(JAEGER_SERVICE, "jaegertracing/all-in-one:latest");
        svc.working_dir = format!("/working/{}", JAEGER_SERVICE);
        svc.ports = vec![exposed_port(16686)];
        svc.environment = vec!["COLLECTOR_ZIPKIN_HTTP_PORT=9411".to_string()];
        svc.command = "--memory.max-traces=1000000".to_string();
        svc
    }
}
