//! Configuration for the Legends ingest tool

mod ingest;
mod logging;

pub use ingest::{IngestConfig, DEFAULT_CHUNK_SIZE, DEFAULT_PROGRESS_STEP};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name `legends init` writes and the CLI looks for by default
pub const DEFAULT_CONFIG_FILE: &str = "legends.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Chunk driver configuration
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `legends.toml` in the working directory if
    /// present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate all configuration fields.
    ///
    /// Collects every validation error and reports them together.
    pub fn validate(&self) -> Result<()> {
        let errors = self.ingest.validation_errors();

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }

    /// Commented default configuration file
    pub fn default_toml() -> String {
        let defaults = Self::default();
        format!(
            "# Legends ingest configuration\n\
             \n\
             [ingest]\n\
             # Bytes read from the export per chunk\n\
             chunk_size = {}\n\
             # Percentage points between progress updates\n\
             progress_step = {}\n\
             # Let the runtime run other tasks between chunks\n\
             yield_between_chunks = {}\n\
             \n\
             [logging]\n\
             # trace, debug, info, warn, error\n\
             level = \"{}\"\n\
             # text or json\n\
             format = \"{}\"\n",
            defaults.ingest.chunk_size,
            defaults.ingest.progress_step,
            defaults.ingest.yield_between_chunks,
            defaults.logging.level,
            match defaults.logging.format {
                LogFormat::Text => "text",
                LogFormat::Json => "json",
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_reports_all_errors_together() {
        let mut cfg = Config::default();
        cfg.ingest.chunk_size = 0;
        cfg.ingest.progress_step = 101;
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("ingest.chunk_size must be positive"), "{}", err);
        assert!(err.contains("ingest.progress_step must be between 1 and 100"), "{}", err);
    }

    #[test]
    fn default_toml_round_trips() {
        let parsed: Config = toml::from_str(&Config::default_toml()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\nchunk_size = 4096\n\n[logging]\nformat = \"json\"").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.ingest.chunk_size, 4096);
        assert_eq!(cfg.ingest.progress_step, DEFAULT_PROGRESS_STEP);
        assert!(cfg.ingest.yield_between_chunks);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, LogLevel::Info);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\nprogress_step = 0").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("progress_step"));
    }
}
