use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Show all available debugging information
    Debug,
}

impl VerbosityLevel {
    /// Default tracing filter directive for this level
    pub fn filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
            VerbosityLevel::Debug => "trace",
        }
    }
}

/// Parse a path argument, allowing empty values so that empty-path
/// rejection is handled uniformly by the configuration validation layer
/// rather than pre-empted by the argument parser.
fn parse_path(value: &str) -> Result<PathBuf, std::convert::Infallible> {
    Ok(PathBuf::from(value))
}

/// Validate an XML document, transform it with an XSLT stylesheet, validate
/// the result, and write it out
#[derive(Parser, Debug, Clone)]
#[command(name = "transform-xml")]
#[command(
    about = "Validate an XML document against a schema, apply an XSLT stylesheet, \
             validate the transformed result against a second schema, and write it out"
)]
#[command(version)]
pub struct Cli {
    /// Initial XML document
    #[arg(
        long = "input",
        value_parser = parse_path,
        help = "Initial XML document [default: init_xml.xml]"
    )]
    pub input: Option<PathBuf>,

    /// Schema for the initial document
    #[arg(
        long = "input-schema",
        value_parser = parse_path,
        help = "XSD schema for the initial document [default: xsd_file.xsd]"
    )]
    pub input_schema: Option<PathBuf>,

    /// Schema for the transformed document
    #[arg(
        long = "output-schema",
        value_parser = parse_path,
        help = "XSD schema for the transformed document [default: trans_xsd.xsd]"
    )]
    pub output_schema: Option<PathBuf>,

    /// XSLT stylesheet to apply
    #[arg(
        long = "stylesheet",
        value_parser = parse_path,
        help = "XSLT stylesheet to apply [default: xslt_file.xslt]"
    )]
    pub stylesheet: Option<PathBuf>,

    /// Where to write the result
    #[arg(
        short = 'o',
        long = "output",
        value_parser = parse_path,
        help = "Where to write the transformed result [default: final_xml.xml]"
    )]
    pub output: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(config) = &self.config
            && !config.exists()
        {
            return Err(format!(
                "Configuration file does not exist: {}",
                config.display()
            ));
        }
        Ok(())
    }
}
