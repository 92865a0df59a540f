//! Pipeline configuration
//!
//! A [`PipelineConfig`] names the four input files and the one output file
//! of a run. It is constructed once at process start and never mutated. The
//! defaults are the conventional file names in the current working
//! directory; a TOML or JSON config file and CLI flags can override them,
//! with precedence defaults -> file -> CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::error::PipelineError;

/// Default initial document path
pub const DEFAULT_INPUT_DOCUMENT: &str = "init_xml.xml";
/// Default input schema path
pub const DEFAULT_INPUT_SCHEMA: &str = "xsd_file.xsd";
/// Default output schema path
pub const DEFAULT_OUTPUT_SCHEMA: &str = "trans_xsd.xsd";
/// Default stylesheet path
pub const DEFAULT_STYLESHEET: &str = "xslt_file.xslt";
/// Default result path
pub const DEFAULT_OUTPUT_PATH: &str = "final_xml.xml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("configuration validation error: {0}")]
    Validation(String),

    #[error("unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}

/// The five paths of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Initial XML document to validate and transform
    pub input_document: PathBuf,
    /// Schema the initial document must conform to
    pub input_schema: PathBuf,
    /// Schema the transformed document must conform to
    pub output_schema: PathBuf,
    /// XSLT stylesheet applied to the initial document
    pub stylesheet: PathBuf,
    /// Where the transformed result is written
    pub output_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_document: PathBuf::from(DEFAULT_INPUT_DOCUMENT),
            input_schema: PathBuf::from(DEFAULT_INPUT_SCHEMA),
            output_schema: PathBuf::from(DEFAULT_OUTPUT_SCHEMA),
            stylesheet: PathBuf::from(DEFAULT_STYLESHEET),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> CLI
    pub fn load(cli: &Cli) -> ConfigResult<PipelineConfig> {
        let mut config = if let Some(config_path) = &cli.config {
            Self::load_from_file(config_path)?
        } else if let Some(found) = Self::find_config_file()? {
            found
        } else {
            PipelineConfig::default()
        };

        // CLI argument overrides (highest precedence)
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> ConfigResult<PipelineConfig> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try TOML first, then JSON
                if let Ok(config) = toml::from_str::<PipelineConfig>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find a configuration file in the current directory
    pub fn find_config_file() -> ConfigResult<Option<PipelineConfig>> {
        let config_names = [
            "transform-xml.toml",
            "transform-xml.json",
            ".transform-xml.toml",
            ".transform-xml.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path)?));
            }
        }

        Ok(None)
    }

    fn merge_with_cli(mut config: PipelineConfig, cli: &Cli) -> PipelineConfig {
        if let Some(input) = &cli.input {
            config.input_document = input.clone();
        }
        if let Some(input_schema) = &cli.input_schema {
            config.input_schema = input_schema.clone();
        }
        if let Some(output_schema) = &cli.output_schema {
            config.output_schema = output_schema.clone();
        }
        if let Some(stylesheet) = &cli.stylesheet {
            config.stylesheet = stylesheet.clone();
        }
        if let Some(output) = &cli.output {
            config.output_path = output.clone();
        }
        config
    }

    fn validate_config(config: &PipelineConfig) -> ConfigResult<()> {
        let paths = [
            ("input_document", &config.input_document),
            ("input_schema", &config.input_schema),
            ("output_schema", &config.output_schema),
            ("stylesheet", &config.stylesheet),
            ("output_path", &config.output_path),
        ];

        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        Ok(())
    }
}
