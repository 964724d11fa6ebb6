//! Docker Compose file writer

use super::config::ComposeConfig;
use crate::error::{ComposeError, Result};
use crate::options::OutputTarget;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Compose file writer
pub struct ComposeWriter;

impl ComposeWriter {
    /// Provenance comment naming the invocation that produced the file
    pub fn header(args: &[String]) -> String {
        format!("# Auto-generated with: [{}]\n#\n", args.join(" "))
    }

    /// Render a document, header included
    pub fn render(config: &ComposeConfig, args: &[String]) -> Result<String> {
        let yaml = serde_yaml::to_string(config)?;
        Ok(format!("{}{}", Self::header(args), yaml))
    }

    /// Render a document into any writer and flush it
    pub fn write_to<W: Write>(config: &ComposeConfig, args: &[String], mut out: W) -> Result<()> {
        let rendered = Self::render(config, args)?;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Write a document to its destination
    pub fn write(config: &ComposeConfig, args: &[String], target: &OutputTarget) -> Result<()> {
        match target {
            OutputTarget::Stdout => Self::write_to(config, args, io::stdout().lock()),
            OutputTarget::File(path) => {
                tracing::info!("writing file: {}", path.display());
                let file = File::create(path).map_err(|e| ComposeError::Output(e.to_string()))?;
                Self::write_to(config, args, BufWriter::new(file))
            }
        }
    }

    /// Parse a rendered document back into the typed model
    pub fn parse_str(content: &str) -> Result<ComposeConfig> {
        let mut config: ComposeConfig = serde_yaml::from_str(content)?;
        for (name, service) in config.services.iter_mut() {
            service.name = name.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::builder::TopologyBuilder;
    use crate::options::Options;
    use tempfile::tempdir;

    fn args() -> Vec<String> {
        vec!["compose".to_string(), "-z".to_string(), "1".to_string()]
    }

    fn sample(options: Options) -> ComposeConfig {
        let (options, _) = options.validate().unwrap();
        TopologyBuilder::with_user(&options, None).unwrap().build()
    }

    #[test]
    fn test_header() {
        let rendered = ComposeWriter::render(&sample(Options::default()), &args()).unwrap();
        assert!(rendered.starts_with("# Auto-generated with: [compose -z 1]\n#\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let opts = Options {
            num_zeros: 5,
            num_alphas: 12,
            jaeger: true,
            data_vol: true,
            tmpfs: true,
            ..Default::default()
        };

        let first = ComposeWriter::render(&sample(opts.clone()), &args()).unwrap();
        let second = ComposeWriter::render(&sample(opts), &args()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_service_keys_sorted() {
        let rendered = ComposeWriter::render(&sample(Options::default()), &args()).unwrap();
        let alpha1 = rendered.find("\n  alpha1:").unwrap();
        let alpha3 = rendered.find("\n  alpha3:").unwrap();
        let zero1 = rendered.find("\n  zero1:").unwrap();
        assert!(alpha1 < alpha3);
        assert!(alpha3 < zero1);
    }

    #[test]
    fn test_parse_back() {
        let config = sample(Options {
            jaeger: true,
            data_vol: true,
            ..Default::default()
        });
        let rendered = ComposeWriter::render(&config, &args()).unwrap();
        let parsed = ComposeWriter::parse_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_write_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docker-compose.yml");
        let config = sample(Options::default());

        ComposeWriter::write(&config, &args(), &OutputTarget::File(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, ComposeWriter::render(&config, &args()).unwrap());
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docker-compose.yml");
        std::fs::write(&path, "x".repeat(100_000)).unwrap();

        let config = sample(Options {
            num_zeros: 1,
            num_alphas: 1,
            ..Default::default()
        });
        ComposeWriter::write(&config, &args(), &OutputTarget::File(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("xxxxxxxxxx"));
        assert!(ComposeWriter::parse_str(&content).is_ok());
    }

    #[test]
    fn test_write_unopenable_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing").join("docker-compose.yml");

        let err = ComposeWriter::write(&sample(Options::default()), &args(), &OutputTarget::File(path))
            .unwrap_err();
        assert!(matches!(err, ComposeError::Output(_)));
        assert!(err.to_string().starts_with("unable to open file for writing"));
    }
}
