use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
/// of a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema construction failed for {}: {details}", .path.display())]
    SchemaBuild { path: PathBuf, details: String },

    #[error("malformed XML in {name}: {details}")]
    MalformedInput { name: String, details: String },

    #[error("{name} does not conform to schema {}: {} error(s)", .schema.display(), .errors.len())]
    SchemaViolation {
        name: String,
        schema: PathBuf,
        errors: Vec<String>,
    },

    #[error("XSLT transform failed: {details}")]
    Transform { details: String },

    #[error("LibXML2 internal error: {details}")]
    LibXml2Internal { details: String },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Top-level failure categories.
///
/// The outermost handler only distinguishes XML-level failures from
/// filesystem failures; the finer-grained `PipelineError` variants collapse
/// onto these two (plus `Config` for startup problems).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Well-formedness, schema, or transform failure
    Xml,
    /// Reading an input file or writing the output file failed
    Io,
    /// Invalid configuration before the pipeline started
    Config,
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Io { .. } => ErrorCategory::Io,
            PipelineError::Config(_) => ErrorCategory::Config,
            PipelineError::SchemaBuild { .. }
            | PipelineError::MalformedInput { .. }
            | PipelineError::SchemaViolation { .. }
            | PipelineError::Transform { .. }
            | PipelineError::LibXml2Internal { .. } => ErrorCategory::Xml,
        }
    }
}

/// LibXML2-specific error types
#[derive(Error, Debug)]
pub enum LibXml2Error {
    #[error("schema parsing failed: {details}")]
    SchemaParseFailed { details: String },

    #[error("document parsing failed: {details}")]
    DocumentParseFailed { details: String },

    #[error("validation context creation failed")]
    ValidationContextCreationFailed,

    #[error("memory allocation failed in libxml2")]
    MemoryAllocation,

    #[error("serialization failed: null or empty output buffer")]
    SerializeFailed,
}

/// LibXSLT-specific error types
#[derive(Error, Debug)]
pub enum XsltError {
    #[error("stylesheet compilation failed: {details}")]
    StylesheetCompileFailed { details: String },

    #[error("applying stylesheet failed: {details}")]
    ApplyFailed { details: String },
}

// Error conversion implementations
impl From<LibXml2Error> for PipelineError {
    fn from(err: LibXml2Error) -> Self {
        PipelineError::LibXml2Internal {
            details: err.to_string(),
        }
    }
}

impl From<XsltError> for PipelineError {
    fn from(err: XsltError) -> Self {
        PipelineError::Transform {
            details: err.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PipelineError>;

/// LibXML2 result type alias
pub type LibXml2Result<T> = std::result::Result<T, LibXml2Error>;

/// LibXSLT result type alias
pub type XsltResult<T> = std::result::Result<T, XsltError>;
