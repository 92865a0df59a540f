//! LibXSLT FFI Wrapper Module
//!
//! Safe wrappers around libxslt, libxml2's companion XSLT 1.0 engine, for
//! compiling stylesheets and applying them to parsed documents. Follows the
//! same RAII conventions as [`crate::libxml2`]: raw pointers are wrapped at
//! the FFI boundary and freed exactly once on drop.
//!
//! Stylesheet compilation goes through libxml2's parser internals and is
//! serialized behind the same process-wide lock as schema parsing.

use std::marker::PhantomData;
use std::sync::Once;

use libc::c_char;

use crate::error::{LibXml2Error, XsltError, XsltResult};
use crate::libxml2::{XmlDoc, XmlDocPtr, last_error_message, parse_lock};

/// Global initialization flag for libxslt
static LIBXSLT_INIT: Once = Once::new();

/// Opaque libxslt structures
#[repr(C)]
pub struct XsltStylesheet {
    _private: [u8; 0],
}

// External libxslt FFI declarations
#[cfg_attr(target_os = "windows", link(name = "libxslt"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xslt"))]
unsafe extern "C" {
    pub fn xsltInit();

    pub fn xsltParseStylesheetDoc(doc: *mut XmlDoc) -> *mut XsltStylesheet;
    pub fn xsltFreeStylesheet(style: *mut XsltStylesheet);

    pub fn xsltApplyStylesheet(
        style: *const XsltStylesheet,
        doc: *const XmlDoc,
        params: *const *const c_char,
    ) -> *mut XmlDoc;
}

/// Owned wrapper for a compiled XSLT stylesheet
///
/// Once compiled, the stylesheet owns the document tree it was parsed from;
/// `xsltFreeStylesheet` releases both.
#[derive(Debug)]
pub struct XsltStylesheetPtr {
    ptr: *mut XsltStylesheet,
}

impl XsltStylesheetPtr {
    /// Create a new XsltStylesheetPtr from a raw pointer
    ///
    /// # Safety
    ///
    /// The pointer must come from `xsltParseStylesheetDoc` and must not be
    /// freed by any other code.
    unsafe fn from_raw(
        ptr: *mut XsltStylesheet,
        details: impl FnOnce() -> String,
    ) -> XsltResult<Self> {
        if ptr.is_null() {
            return Err(XsltError::StylesheetCompileFailed { details: details() });
        }
        Ok(XsltStylesheetPtr { ptr })
    }

    /// Get the raw pointer for FFI calls
    fn as_ptr(&self) -> *const XsltStylesheet {
        self.ptr
    }
}

impl Drop for XsltStylesheetPtr {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                xsltFreeStylesheet(self.ptr);
            }
            self.ptr = std::ptr::null_mut();
        }
    }
}

/// Safe access to libxslt stylesheet compilation and application
pub struct XsltProcessor {
    _phantom: PhantomData<()>,
}

impl XsltProcessor {
    /// Create a new XSLT processor instance
    ///
    /// Safe to call multiple times; libxslt initialization happens exactly
    /// once.
    pub fn new() -> Self {
        LIBXSLT_INIT.call_once(|| unsafe {
            xsltInit();
        });

        XsltProcessor {
            _phantom: PhantomData,
        }
    }

    /// Compile a parsed stylesheet document into a transform object
    ///
    /// Ownership of the document transfers to libxslt: on success the
    /// compiled stylesheet frees the tree when dropped. Fails with
    /// `StylesheetCompileFailed` if the document is not a valid XSLT
    /// definition.
    pub fn compile_stylesheet(&self, doc: XmlDocPtr) -> XsltResult<XsltStylesheetPtr> {
        // Stylesheet compilation drives libxml2's parser machinery.
        let _guard = parse_lock();

        unsafe {
            let style = xsltParseStylesheetDoc(doc.into_raw());

            XsltStylesheetPtr::from_raw(style, || {
                last_error_message()
                    .unwrap_or_else(|| "document is not a valid stylesheet".to_string())
            })
        }
    }

    /// Apply a compiled stylesheet to a document, producing a new result tree
    ///
    /// The input document is left untouched and remains owned by the caller.
    pub fn apply(&self, style: &XsltStylesheetPtr, doc: &XmlDocPtr) -> XsltResult<XmlDocPtr> {
        unsafe {
            let result = xsltApplyStylesheet(style.as_ptr(), doc.as_ptr(), std::ptr::null());

            XmlDocPtr::from_raw(result, || {
                last_error_message().unwrap_or_else(|| "transform produced no result".to_string())
            })
            .map_err(|err| XsltError::ApplyFailed {
                details: match err {
                    LibXml2Error::DocumentParseFailed { details } => details,
                    other => other.to_string(),
                },
            })
        }
    }
}

impl Default for XsltProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libxml2::LibXml2Wrapper;

    const IDENTITY_XSLT: &str = r#"<?xml version="1.0"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="@*|node()">
    <xsl:copy><xsl:apply-templates select="@*|node()"/></xsl:copy>
  </xsl:template>
</xsl:stylesheet>"#;

    const RENAMING_XSLT: &str = r#"<?xml version="1.0"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/a">
    <root><value><xsl:value-of select="b"/></value></root>
  </xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn test_compile_valid_stylesheet() {
        let xml = LibXml2Wrapper::new();
        let xslt = XsltProcessor::new();

        let doc = xml
            .parse_document(IDENTITY_XSLT.as_bytes(), "identity.xslt")
            .unwrap();
        let style = xslt.compile_stylesheet(doc);
        assert!(style.is_ok());
    }

    #[test]
    fn test_compile_rejects_non_stylesheet() {
        let xml = LibXml2Wrapper::new();
        let xslt = XsltProcessor::new();

        let doc = xml
            .parse_document(b"<root>plain document</root>", "plain.xml")
            .unwrap();
        let result = xslt.compile_stylesheet(doc);

        match result {
            Err(XsltError::StylesheetCompileFailed { .. }) => (),
            other => panic!("Expected StylesheetCompileFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_identity_transform() {
        let xml = LibXml2Wrapper::new();
        let xslt = XsltProcessor::new();

        let style_doc = xml
            .parse_document(IDENTITY_XSLT.as_bytes(), "identity.xslt")
            .unwrap();
        let style = xslt.compile_stylesheet(style_doc).unwrap();

        let doc = xml
            .parse_document(b"<a><b>1</b></a>", "input.xml")
            .unwrap();
        let result = xslt.apply(&style, &doc).unwrap();

        let bytes = xml.serialize_pretty(&result).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("<b>1</b>"));
    }

    #[test]
    fn test_apply_renaming_transform() {
        let xml = LibXml2Wrapper::new();
        let xslt = XsltProcessor::new();

        let style_doc = xml
            .parse_document(RENAMING_XSLT.as_bytes(), "rename.xslt")
            .unwrap();
        let style = xslt.compile_stylesheet(style_doc).unwrap();

        let doc = xml
            .parse_document(b"<a><b>1</b></a>", "input.xml")
            .unwrap();
        let result = xslt.apply(&style, &doc).unwrap();

        let bytes = xml.serialize_pretty(&result).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("<root>"));
        assert!(text.contains("<value>1</value>"));
    }

    #[test]
    fn test_stylesheet_reusable_across_applications() {
        let xml = LibXml2Wrapper::new();
        let xslt = XsltProcessor::new();

        let style_doc = xml
            .parse_document(IDENTITY_XSLT.as_bytes(), "identity.xslt")
            .unwrap();
        let style = xslt.compile_stylesheet(style_doc).unwrap();

        for payload in ["<a>one</a>", "<a>two</a>"] {
            let doc = xml.parse_document(payload.as_bytes(), "input.xml").unwrap();
            let result = xslt.apply(&style, &doc);
            assert!(result.is_ok());
        }
    }
}
