//! Document transformation
//!
//! Compiles an XSLT stylesheet, applies it to a freshly parsed document
//! tree, and serializes the result pretty-printed with an explicit UTF-8
//! declaration. The stylesheet is compiled and applied once per call; no
//! transform state survives between runs.

use tracing::debug;

use crate::error::{LibXml2Error, PipelineError, Result};
use crate::libxml2::LibXml2Wrapper;
use crate::libxslt::XsltProcessor;

/// Applies XSLT stylesheets to documents
pub struct Transformer {
    xml: LibXml2Wrapper,
    xslt: XsltProcessor,
}

impl Transformer {
    pub fn new() -> Self {
        Self {
            xml: LibXml2Wrapper::new(),
            xslt: XsltProcessor::new(),
        }
    }

    /// Transform `document` with `stylesheet`, returning the serialized
    /// result bytes
    ///
    /// Fails with `MalformedInput` if either buffer is not well-formed XML,
    /// or `Transform` if the stylesheet is not a valid transform definition
    /// or its application fails.
    pub fn transform(&self, document: &[u8], stylesheet: &[u8]) -> Result<Vec<u8>> {
        let style_doc = self
            .xml
            .parse_document(stylesheet, "stylesheet")
            .map_err(|err| malformed("stylesheet", err))?;
        let style = self.xslt.compile_stylesheet(style_doc)?;

        let doc = self
            .xml
            .parse_document(document, "document")
            .map_err(|err| malformed("document", err))?;

        let result = self.xslt.apply(&style, &doc)?;
        let bytes = self.xml.serialize_pretty(&result)?;

        debug!(bytes = bytes.len(), "transform result serialized");
        Ok(bytes)
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

fn malformed(name: &str, err: LibXml2Error) -> PipelineError {
    match err {
        LibXml2Error::DocumentParseFailed { details } => PipelineError::MalformedInput {
            name: name.to_string(),
            details,
        },
        other => other.into(),
    }
}
