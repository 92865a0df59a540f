//! Schema loading
//!
//! Turns raw XSD bytes into a [`CompiledSchema`]: an opaque, reusable
//! validator object. Compilation happens once per schema; the compiled form
//! is stateless and can back any number of validation calls.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LibXml2Error, PipelineError, Result};
use crate::libxml2::{LibXml2Wrapper, XmlSchemaPtr};

/// A compiled XML schema, tagged with the path it was built from
///
/// Cloning is cheap; clones share the underlying libxml2 schema, which is
/// freed exactly once when the last clone drops.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    schema: XmlSchemaPtr,
    source: PathBuf,
}

impl CompiledSchema {
    /// Path of the schema document this was compiled from
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub(crate) fn as_schema(&self) -> &XmlSchemaPtr {
        &self.schema
    }
}

/// Loads and compiles XSD schema documents
pub struct SchemaLoader {
    wrapper: LibXml2Wrapper,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self {
            wrapper: LibXml2Wrapper::new(),
        }
    }

    /// Read a schema file and compile it
    pub fn load(&self, path: &Path) -> Result<CompiledSchema> {
        let bytes = fs::read(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.compile(&bytes, path)
    }

    /// Compile schema bytes already read from `source`
    ///
    /// Fails with `SchemaBuild` if the bytes are not well-formed XML or not
    /// a valid XSD document.
    pub fn compile(&self, bytes: &[u8], source: &Path) -> Result<CompiledSchema> {
        let schema = self
            .wrapper
            .parse_schema_from_memory(bytes)
            .map_err(|err| match err {
                LibXml2Error::SchemaParseFailed { details } => PipelineError::SchemaBuild {
                    path: source.to_path_buf(),
                    details,
                },
                other => other.into(),
            })?;

        debug!(schema = %source.display(), "schema compiled");

        Ok(CompiledSchema {
            schema,
            source: source.to_path_buf(),
        })
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}
