//! Document validation
//!
//! Parses document bytes and checks the resulting tree against a compiled
//! schema. Success produces no value; the parsed tree is dropped on return,
//! and later stages re-parse the bytes independently.
//!
//! Malformed input and schema violations surface as distinct error variants
//! (`MalformedInput` vs `SchemaViolation`) rather than one conflated parse
//! error. Both map to [`ErrorCategory::Xml`](crate::error::ErrorCategory)
//! at the top level.

use tracing::debug;

use crate::error::{LibXml2Error, PipelineError, Result};
use crate::libxml2::{LibXml2Wrapper, ValidationResult};
use crate::schema_loader::CompiledSchema;

/// Validates document bytes against compiled schemas
pub struct Validator {
    wrapper: LibXml2Wrapper,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            wrapper: LibXml2Wrapper::new(),
        }
    }

    /// Parse `document` and check it against `schema`
    ///
    /// `name` labels the document in diagnostics. Fails with
    /// `MalformedInput` if the bytes are not well-formed XML, or
    /// `SchemaViolation` (carrying libxml2's violation messages) if the
    /// well-formed document does not conform to the schema.
    pub fn validate(&self, schema: &CompiledSchema, document: &[u8], name: &str) -> Result<()> {
        let doc = self
            .wrapper
            .parse_document(document, name)
            .map_err(|err| match err {
                LibXml2Error::DocumentParseFailed { details } => PipelineError::MalformedInput {
                    name: name.to_string(),
                    details,
                },
                other => other.into(),
            })?;

        let outcome = self.wrapper.validate_document(schema.as_schema(), &doc)?;

        match outcome {
            ValidationResult::Valid => {
                debug!(document = name, schema = %schema.source().display(), "document conforms");
                Ok(())
            }
            ValidationResult::Invalid { errors } => Err(PipelineError::SchemaViolation {
                name: name.to_string(),
                schema: schema.source().to_path_buf(),
                errors,
            }),
            ValidationResult::InternalError { code } => Err(PipelineError::LibXml2Internal {
                details: format!("validation of {} failed with code {}", name, code),
            }),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
