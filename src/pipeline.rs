//! Pipeline orchestration
//!
//! One run is a fixed, linear sequence with no branching: read the four
//! input files, build the input schema, validate the initial document,
//! build the output schema, transform, validate the transformed bytes,
//! write the result. Any failure aborts the remaining stages, so nothing is
//! ever written on a failed run and no partial state needs cleaning up.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::schema_loader::SchemaLoader;
use crate::transformer::Transformer;
use crate::validator::Validator;
use crate::writer;

/// Wall-clock duration of each pipeline stage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageTimings {
    /// Reading the four input files
    pub read_inputs: Duration,
    /// Compiling the input schema
    pub input_schema: Duration,
    /// Validating the initial document
    pub validate_input: Duration,
    /// Compiling the output schema
    pub output_schema: Duration,
    /// Applying the stylesheet
    pub transform: Duration,
    /// Validating the transformed document
    pub validate_output: Duration,
    /// Writing the result file
    pub write: Duration,
}

impl StageTimings {
    /// Sum of all stage durations
    pub fn total(&self) -> Duration {
        self.read_inputs
            + self.input_schema
            + self.validate_input
            + self.output_schema
            + self.transform
            + self.validate_output
            + self.write
    }
}

/// Outcome of a successful pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineReport {
    /// Where the result was written
    pub output_path: PathBuf,
    /// Size of the result in bytes
    pub bytes_written: u64,
    /// Per-stage durations
    pub timings: StageTimings,
}

/// The four-stage pipeline: validate, transform, validate, write
pub struct Pipeline {
    schemas: SchemaLoader,
    validator: Validator,
    transformer: Transformer,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            schemas: SchemaLoader::new(),
            validator: Validator::new(),
            transformer: Transformer::new(),
        }
    }

    /// Run the pipeline described by `config` to completion
    ///
    /// Synchronous and single-threaded; every transient object (schemas,
    /// document trees, byte buffers) is dropped before this returns.
    pub fn run(&self, config: &PipelineConfig) -> Result<PipelineReport> {
        let mut timings = StageTimings::default();

        info!("reading input files");
        let started = Instant::now();
        let document = read_file(&config.input_document)?;
        let input_schema_bytes = read_file(&config.input_schema)?;
        let output_schema_bytes = read_file(&config.output_schema)?;
        let stylesheet = read_file(&config.stylesheet)?;
        timings.read_inputs = started.elapsed();

        info!(schema = %config.input_schema.display(), "parsing input XSD to obtain the XML schema");
        let started = Instant::now();
        let input_schema = self
            .schemas
            .compile(&input_schema_bytes, &config.input_schema)?;
        timings.input_schema = started.elapsed();
        info!("schema obtained");

        info!("validating the initial XML against the schema");
        let started = Instant::now();
        let document_name = config.input_document.display().to_string();
        self.validator
            .validate(&input_schema, &document, &document_name)?;
        timings.validate_input = started.elapsed();
        info!("validation passed, XML corresponds to the schema");

        // The output schema is compiled before the transform runs.
        info!(schema = %config.output_schema.display(), "parsing output XSD to obtain the XML schema");
        let started = Instant::now();
        let output_schema = self
            .schemas
            .compile(&output_schema_bytes, &config.output_schema)?;
        timings.output_schema = started.elapsed();
        info!("schema obtained");

        info!(stylesheet = %config.stylesheet.display(), "transforming the validated XML using XSLT");
        let started = Instant::now();
        let transformed = self.transformer.transform(&document, &stylesheet)?;
        timings.transform = started.elapsed();
        info!(bytes = transformed.len(), "transformation is done");

        info!("validating the transformed XML against the schema");
        let started = Instant::now();
        self.validator
            .validate(&output_schema, &transformed, "transformed document")?;
        timings.validate_output = started.elapsed();
        info!("validation passed, XML corresponds to the schema");

        info!(output = %config.output_path.display(), "writing the final XML file");
        let started = Instant::now();
        let bytes_written = writer::write_output(&config.output_path, &transformed)?;
        timings.write = started.elapsed();

        Ok(PipelineReport {
            output_path: config.output_path.clone(),
            bytes_written,
            timings,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}
