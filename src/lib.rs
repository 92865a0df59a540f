//! # transform-xml Library
//!
//! Validate an XML document against an XSD schema, transform it with an
//! XSLT stylesheet, validate the transformed result against a second
//! schema, and write it out. Schema compilation, validation, and
//! transformation are delegated to libxml2/libxslt through safe FFI
//! wrappers; the pipeline itself is a fixed, synchronous, single-threaded
//! sequence of four stages.

pub mod cli;
pub mod config;
pub mod error;
pub mod libxml2;
pub mod libxslt;
pub mod pipeline;
pub mod schema_loader;
pub mod transformer;
pub mod validator;
pub mod writer;

pub use cli::{Cli, VerbosityLevel};
pub use config::{ConfigError, ConfigManager, PipelineConfig};
pub use error::{ErrorCategory, LibXml2Error, PipelineError, Result, XsltError};
pub use libxml2::{LibXml2Wrapper, ValidationResult, XmlDocPtr, XmlSchemaPtr};
pub use libxslt::{XsltProcessor, XsltStylesheetPtr};
pub use pipeline::{Pipeline, PipelineReport, StageTimings};
pub use schema_loader::{CompiledSchema, SchemaLoader};
pub use transformer::Transformer;
pub use validator::Validator;
pub use writer::write_output;
