//! compose-gen - docker-compose config file generator for dgraph
//!
//! This is the CLI entry point.

use clap::{ArgAction, Parser};
use compose_gen::compose::{ComposeWriter, TopologyBuilder};
use compose_gen::error::Result;
use compose_gen::options::{Options, OutputTarget, DEFAULT_OUT_FILE};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Dynamically generate a docker-compose.yml file for running a dgraph cluster.
#[derive(Parser, Debug)]
#[command(name = "compose")]
#[command(version)]
#[command(about = "docker-compose config file generator for dgraph", long_about = None)]
#[command(after_help = "Example: compose --num_zeros=3 --num_alphas=3 -O- | docker-compose -f- up")]
struct Cli {
    /// Number of zeros in dgraph cluster
    #[arg(short = 'z', long = "num_zeros", default_value_t = 3, allow_negative_numbers = true)]
    num_zeros: i64,

    /// Number of alphas in dgraph cluster
    #[arg(short = 'a', long = "num_alphas", default_value_t = 3, allow_negative_numbers = true)]
    num_alphas: i64,

    /// Number of groups in dgraph cluster
    #[arg(short = 'g', long = "num_groups", default_value_t = 1, allow_negative_numbers = true)]
    num_groups: i64,

    /// Approximate size of LRU cache
    #[arg(long = "lru_mb", default_value_t = 1024, allow_negative_numbers = true)]
    lru_mb: i64,

    /// Mount a docker volume as /data in containers
    #[arg(short = 'o', long = "data_vol")]
    data_vol: bool,

    /// Mount a host directory as /data in containers
    #[arg(short = 'd', long = "data_dir")]
    data_dir: Option<String>,

    /// Enable enterprise features in alphas
    #[arg(short = 'e', long = "enterprise")]
    enterprise: bool,

    /// Enable ACL feature with specified HMAC secret file
    #[arg(long = "acl_secret")]
    acl_secret: Option<String>,

    /// Run as the current user rather than root
    #[arg(short = 'u', long = "user")]
    user: bool,

    /// Store w and zw directories on a tmpfs filesystem
    #[arg(long = "tmpfs")]
    tmpfs: bool,

    /// Include jaeger service
    #[arg(short = 'j', long = "jaeger")]
    jaeger: bool,

    /// Use alpha ports expected by regression tests
    #[arg(
        long = "test_ports",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    test_ports: bool,

    /// glog verbosity level
    #[arg(short = 'v', long = "verbosity", default_value_t = 2)]
    verbosity: u32,

    /// Docker image repository for dgraph nodes
    #[arg(long, default_value = "dgraph/dgraph")]
    image: String,

    /// Docker image tag for dgraph nodes
    #[arg(long, default_value = "latest")]
    tag: String,

    /// Name of output file, "-" for stdout
    #[arg(short = 'O', long = "out", default_value = DEFAULT_OUT_FILE)]
    out: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// Negative or oversized counts clamp to a value `Options::validate`
/// rejects with the matching rule
fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl Cli {
    fn into_options(self) -> Options {
        Options {
            num_zeros: clamp_count(self.num_zeros),
            num_alphas: clamp_count(self.num_alphas),
            num_groups: clamp_count(self.num_groups),
            lru_mb: u64::try_from(self.lru_mb).unwrap_or(0),
            enterprise: self.enterprise,
            acl_secret: self.acl_secret.filter(|s| !s.is_empty()),
            data_dir: self.data_dir.filter(|s| !s.is_empty()),
            data_vol: self.data_vol,
            tmpfs: self.tmpfs,
            user: self.user,
            jaeger: self.jaeger,
            test_ports: self.test_ports,
            verbosity: self.verbosity,
            image: self.image,
            tag: self.tag,
            out: OutputTarget::parse(&self.out),
        }
    }
}

fn run(options: Options, args: &[String]) -> Result<()> {
    let (options, warnings) = options.validate()?;
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let config = TopologyBuilder::new(&options)?.build();
    ComposeWriter::write(&config, args, &options.out)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse();

    // Initialize logging; stdout may carry the document
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.into_options(), &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("compose: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["compose"]).unwrap();
        assert_eq!(cli.into_options(), Options::default());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "compose", "-z", "1", "-a", "2", "-g", "2", "-o", "-e", "-j", "-v", "3", "-O", "-",
        ])
        .unwrap();
        let opts = cli.into_options();

        assert_eq!(opts.num_zeros, 1);
        assert_eq!(opts.num_alphas, 2);
        assert_eq!(opts.num_groups, 2);
        assert!(opts.data_vol);
        assert!(opts.enterprise);
        assert!(opts.jaeger);
        assert_eq!(opts.verbosity, 3);
        assert_eq!(opts.out, OutputTarget::Stdout);
    }

    #[test]
    fn test_test_ports_flag() {
        let cli = Cli::try_parse_from(["compose", "--test_ports=false"]).unwrap();
        assert!(!cli.test_ports);

        let cli = Cli::try_parse_from(["compose", "--test_ports"]).unwrap();
        assert!(cli.test_ports);

        let cli = Cli::try_parse_from(["compose", "--test_ports", "-z", "1"]).unwrap();
        assert!(cli.test_ports);
        assert_eq!(cli.num_zeros, 1);

        // a bare flag never swallows the next word
        assert!(Cli::try_parse_from(["compose", "--test_ports", "false"]).is_err());
    }

    fn run_args(args: &[&str]) -> Result<()> {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        run(cli.into_options(), &[])
    }

    #[test]
    fn test_run_rejects_negative_counts() {
        let err = run_args(&["compose", "--num_zeros=-1", "-O", "-"]).unwrap_err();
        assert_eq!(err.to_string(), "number of zeros must be 1-99");

        let err = run_args(&["compose", "-z", "-1", "-O", "-"]).unwrap_err();
        assert_eq!(err.to_string(), "number of zeros must be 1-99");

        let err = run_args(&["compose", "--num_alphas=-3", "-O", "-"]).unwrap_err();
        assert_eq!(err.to_string(), "number of alphas must be 1-99");

        let err = run_args(&["compose", "--num_groups=-2", "-O", "-"]).unwrap_err();
        assert_eq!(err.to_string(), "number of groups must be at least 1");

        let err = run_args(&["compose", "--lru_mb=-5", "-O", "-"]).unwrap_err();
        assert_eq!(err.to_string(), "LRU cache size must be >= 1024 MB");
    }

    #[test]
    fn test_run_rule_order_with_out_of_range_counts() {
        let err = run_args(&["compose", "-z", "100", "-a", "-1", "-O", "-"]).unwrap_err();
        assert_eq!(err.to_string(), "number of zeros must be 1-99");

        let err = run_args(&["compose", "-z", "5000000000", "-O", "-"]).unwrap_err();
        assert_eq!(err.to_string(), "number of zeros must be 1-99");
    }

    #[test]
    fn test_empty_paths_are_unset() {
        let cli = Cli::try_parse_from(["compose", "--data_dir=", "--acl_secret="]).unwrap();
        let opts = cli.into_options();
        assert!(opts.data_dir.is_none());
        assert!(opts.acl_secret.is_none());
    }

    #[test]
    fn test_run_rejects_conflicting_volumes() {
        let cli = Cli::try_parse_from(["compose", "-o", "-d", "/tmp/data", "-O", "-"]).unwrap();
        let err = run(cli.into_options(), &[]).unwrap_err();
        assert!(err.to_string().contains("--data_vol"));
    }
}
