//! LibXML2 FFI Wrapper Module
//!
//! This module provides a safe wrapper around libxml2 FFI calls for XML
//! parsing, XML Schema validation, and serialization.
//!
//! No mature pure Rust library exists for XML Schema (XSD) validation —
//! roxmltree, quick-xml and xml-rs parse but do not validate, and xsd-parser
//! generates code rather than validating at runtime — so libxml2 remains the
//! engine, accessed through direct FFI with RAII wrappers.
//!
//! ## Thread Safety
//!
//! Per libxml2's documentation (http://xmlsoft.org/threads.html), parsed
//! schema structures are thread-safe for reading and documents may be loaded
//! concurrently, but the schema parser setup itself is not thread-safe.
//! Schema parsing is therefore serialized behind a process-wide lock; see
//! [`parse_lock`]. The pipeline itself is single-threaded, so the lock only
//! matters when the library is embedded in a multi-threaded harness.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, Once, PoisonError};

use libc::{c_char, c_int, c_uchar, c_void};

use crate::error::{LibXml2Error, LibXml2Result};

/// Global initialization flag for libxml2
///
/// libxml2's initialization is NOT thread-safe, so it is protected with
/// std::sync::Once and runs exactly once per process.
static LIBXML2_INIT: Once = Once::new();

/// Process-wide lock serializing schema and stylesheet compilation.
static PARSE_LOCK: Mutex<()> = Mutex::new(());

/// The lock that must be held while libxml2 compiles a schema or libxslt
/// compiles a stylesheet.
pub(crate) fn parse_lock() -> std::sync::MutexGuard<'static, ()> {
    PARSE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

// Parser options for xmlReadMemory. Diagnostics are captured through the
// error APIs instead of being printed to stderr, and network access during
// parsing is disabled.
const XML_PARSE_NOERROR: c_int = 32;
const XML_PARSE_NOWARNING: c_int = 64;
const XML_PARSE_NONET: c_int = 2048;

/// Opaque libxml2 structures
#[repr(C)]
pub struct XmlSchema {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaValidCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlDoc {
    _private: [u8; 0],
}

// External libxml2 FFI declarations
#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
unsafe extern "C" {
    pub fn xmlInitParser();

    // Document parsing and serialization
    pub fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    pub fn xmlFreeDoc(doc: *mut XmlDoc);
    pub fn xmlDocDumpFormatMemoryEnc(
        doc: *mut XmlDoc,
        doc_txt_ptr: *mut *mut c_uchar,
        doc_txt_len: *mut c_int,
        txt_encoding: *const c_char,
        format: c_int,
    );

    // Error reporting
    pub fn xmlGetLastError() -> *const xmlError;
    pub fn xmlResetLastError();

    // libxml2's allocator; buffers it hands out must go back through this.
    pub static xmlFree: unsafe extern "C" fn(mem: *mut c_void);

    // Schema parsing functions
    pub fn xmlSchemaNewMemParserCtxt(
        buffer: *const c_char,
        size: c_int,
    ) -> *mut XmlSchemaParserCtxt;
    pub fn xmlSchemaParse(ctxt: *const XmlSchemaParserCtxt) -> *mut XmlSchema;
    pub fn xmlSchemaFreeParserCtxt(ctxt: *mut XmlSchemaParserCtxt);
    pub fn xmlSchemaFree(schema: *mut XmlSchema);
    pub fn xmlSchemaSetParserStructuredErrors(
        ctxt: *mut XmlSchemaParserCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );

    // Schema validation functions
    pub fn xmlSchemaNewValidCtxt(schema: *const XmlSchema) -> *mut XmlSchemaValidCtxt;
    pub fn xmlSchemaFreeValidCtxt(ctxt: *mut XmlSchemaValidCtxt);
    pub fn xmlSchemaValidateDoc(ctxt: *const XmlSchemaValidCtxt, doc: *mut XmlDoc) -> c_int;
    pub fn xmlSchemaSetValidStructuredErrors(
        ctxt: *mut XmlSchemaValidCtxt,
        sherr: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
}

#[repr(C)]
#[allow(non_camel_case_types)]
pub struct xmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *const c_char,
    pub level: c_int,
    pub file: *const c_char,
    pub line: c_int,
    pub str1: *const c_char,
    pub str2: *const c_char,
    pub str3: *const c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

pub type XmlStructuredErrorFunc =
    Option<unsafe extern "C" fn(user_data: *mut c_void, error: *const xmlError)>;

/// Callback for libxml2 to report parser and validation errors (structured)
unsafe extern "C" fn structured_error_callback(user_data: *mut c_void, error: *const xmlError) {
    let errors = unsafe { &mut *(user_data as *mut Vec<String>) };

    if !error.is_null() {
        let msg_ptr = unsafe { (*error).message };
        if !msg_ptr.is_null() {
            let c_str = unsafe { CStr::from_ptr(msg_ptr) };
            if let Ok(s) = c_str.to_str() {
                errors.push(s.trim().to_string());
            }
        }
    }
}

/// Message of the most recent libxml2 error, if any.
pub(crate) fn last_error_message() -> Option<String> {
    unsafe {
        let error = xmlGetLastError();
        if error.is_null() {
            return None;
        }
        let msg_ptr = (*error).message;
        if msg_ptr.is_null() {
            return None;
        }
        CStr::from_ptr(msg_ptr)
            .to_str()
            .ok()
            .map(|s| s.trim().to_string())
    }
}

/// Thread-safe wrapper for a libxml2 schema pointer with proper resource
/// management
///
/// This wrapper ensures that:
/// - Schema pointers are properly freed when dropped
/// - The schema can be safely shared across threads (libxml2 schemas are
///   thread-safe for reading)
/// - Null pointers are handled safely
#[derive(Debug)]
pub struct XmlSchemaPtr {
    inner: Arc<XmlSchemaInner>,
}

#[derive(Debug)]
struct XmlSchemaInner {
    ptr: *mut XmlSchema,
    _phantom: PhantomData<XmlSchema>,
}

// Safety: libxml2 documentation states that xmlSchema structures are
// thread-safe for reading. See: http://xmlsoft.org/threads.html
unsafe impl Send for XmlSchemaInner {}
unsafe impl Sync for XmlSchemaInner {}

impl XmlSchemaPtr {
    /// Create a new XmlSchemaPtr from a raw pointer
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - The pointer is valid and points to a properly initialized xmlSchema
    /// - The pointer was allocated by libxml2 and should be freed with
    ///   xmlSchemaFree
    /// - No other code will free this pointer
    pub(crate) unsafe fn from_raw(
        ptr: *mut XmlSchema,
        details: impl FnOnce() -> String,
    ) -> LibXml2Result<Self> {
        if ptr.is_null() {
            return Err(LibXml2Error::SchemaParseFailed { details: details() });
        }

        Ok(XmlSchemaPtr {
            inner: Arc::new(XmlSchemaInner {
                ptr,
                _phantom: PhantomData,
            }),
        })
    }

    /// Get the raw pointer for FFI calls
    ///
    /// The returned pointer is only valid as long as this XmlSchemaPtr
    /// exists and must not be freed by the caller.
    pub(crate) fn as_ptr(&self) -> *const XmlSchema {
        self.inner.ptr
    }

    /// Check if the schema pointer is valid (non-null)
    pub fn is_valid(&self) -> bool {
        !self.inner.ptr.is_null()
    }
}

impl Clone for XmlSchemaPtr {
    fn clone(&self) -> Self {
        XmlSchemaPtr {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for XmlSchemaInner {
    fn drop(&mut self) {
        // The Arc ensures this Drop runs exactly once per schema.
        if !self.ptr.is_null() {
            unsafe {
                xmlSchemaFree(self.ptr);
            }
            self.ptr = std::ptr::null_mut();
        }
    }
}

/// Owned wrapper for a parsed libxml2 document tree
///
/// Documents are transient within a pipeline run: parsed, used by one stage,
/// then dropped. Unlike schemas they are never shared, so no Arc is needed.
#[derive(Debug)]
pub struct XmlDocPtr {
    ptr: *mut XmlDoc,
}

impl XmlDocPtr {
    /// Create a new XmlDocPtr from a raw pointer
    ///
    /// # Safety
    ///
    /// The pointer must come from a libxml2 parse call and must not be freed
    /// by any other code.
    pub(crate) unsafe fn from_raw(
        ptr: *mut XmlDoc,
        details: impl FnOnce() -> String,
    ) -> LibXml2Result<Self> {
        if ptr.is_null() {
            return Err(LibXml2Error::DocumentParseFailed { details: details() });
        }
        Ok(XmlDocPtr { ptr })
    }

    /// Get the raw pointer for FFI calls
    pub(crate) fn as_ptr(&self) -> *mut XmlDoc {
        self.ptr
    }

    /// Release ownership of the underlying document.
    ///
    /// Used when a libxslt call takes over freeing the tree.
    pub(crate) fn into_raw(self) -> *mut XmlDoc {
        let ptr = self.ptr;
        std::mem::forget(self);
        ptr
    }
}

impl Drop for XmlDocPtr {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                xmlFreeDoc(self.ptr);
            }
            self.ptr = std::ptr::null_mut();
        }
    }
}

/// Validation result from libxml2
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Validation succeeded (return code 0)
    Valid,
    /// Validation failed with schema violations (return code > 0)
    Invalid { errors: Vec<String> },
    /// Internal error occurred (return code < 0)
    InternalError { code: i32 },
}

impl ValidationResult {
    /// Create ValidationResult from libxml2 return code and captured errors
    pub fn from_code(code: c_int, errors: Vec<String>) -> Self {
        match code {
            0 => ValidationResult::Valid,
            n if n > 0 => ValidationResult::Invalid { errors },
            n => ValidationResult::InternalError { code: n },
        }
    }

    /// Check if validation was successful
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Check if validation failed due to schema violations
    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationResult::Invalid { .. })
    }

    /// Check if an internal error occurred
    pub fn is_error(&self) -> bool {
        matches!(self, ValidationResult::InternalError { .. })
    }
}

/// Safe access to libxml2 parsing, validation, and serialization
///
/// The wrapper initializes libxml2 on first construction and provides
/// methods whose resources (parser contexts, validation contexts, output
/// buffers) are acquired and released within a single call.
pub struct LibXml2Wrapper {
    _phantom: PhantomData<()>,
}

impl LibXml2Wrapper {
    /// Create a new LibXML2 wrapper instance
    ///
    /// Safe to call multiple times; initialization happens exactly once.
    pub fn new() -> Self {
        LIBXML2_INIT.call_once(|| unsafe {
            xmlInitParser();
        });

        LibXml2Wrapper {
            _phantom: PhantomData,
        }
    }

    /// Parse an XML schema from a memory buffer
    ///
    /// Fails with `SchemaParseFailed` if the buffer is not well-formed XML
    /// or is not a valid XSD document, carrying the diagnostics libxml2
    /// reported while parsing.
    pub fn parse_schema_from_memory(&self, schema_data: &[u8]) -> LibXml2Result<XmlSchemaPtr> {
        // Schema parsing is not thread-safe in libxml2.
        let _guard = parse_lock();

        unsafe {
            let parser_ctxt = xmlSchemaNewMemParserCtxt(
                schema_data.as_ptr() as *const c_char,
                schema_data.len() as c_int,
            );

            if parser_ctxt.is_null() {
                return Err(LibXml2Error::MemoryAllocation);
            }

            let mut errors: Vec<String> = Vec::new();
            let errors_ptr = &mut errors as *mut Vec<String> as *mut c_void;
            xmlSchemaSetParserStructuredErrors(
                parser_ctxt,
                Some(structured_error_callback),
                errors_ptr,
            );

            let schema_ptr = xmlSchemaParse(parser_ctxt);

            // Always free the parser context
            xmlSchemaFreeParserCtxt(parser_ctxt);

            XmlSchemaPtr::from_raw(schema_ptr, || {
                if errors.is_empty() {
                    last_error_message().unwrap_or_else(|| "no diagnostic available".to_string())
                } else {
                    errors.join("; ")
                }
            })
        }
    }

    /// Parse an XML document from a memory buffer
    ///
    /// Fails with `DocumentParseFailed` carrying libxml2's syntax diagnostic
    /// if the buffer is not well-formed XML. `name` is used as the document
    /// URL in diagnostics.
    pub fn parse_document(&self, data: &[u8], name: &str) -> LibXml2Result<XmlDocPtr> {
        let c_name = CString::new(name).ok();
        let name_ptr = c_name
            .as_ref()
            .map_or(std::ptr::null(), |c| c.as_ptr());

        unsafe {
            xmlResetLastError();

            let doc = xmlReadMemory(
                data.as_ptr() as *const c_char,
                data.len() as c_int,
                name_ptr,
                std::ptr::null(),
                XML_PARSE_NOERROR | XML_PARSE_NOWARNING | XML_PARSE_NONET,
            );

            XmlDocPtr::from_raw(doc, || {
                last_error_message().unwrap_or_else(|| "no diagnostic available".to_string())
            })
        }
    }

    /// Validate a parsed document against a schema
    ///
    /// A fresh validation context is created per call; the schema pointer is
    /// reusable across any number of validations.
    pub fn validate_document(
        &self,
        schema: &XmlSchemaPtr,
        doc: &XmlDocPtr,
    ) -> LibXml2Result<ValidationResult> {
        unsafe {
            let valid_ctxt = xmlSchemaNewValidCtxt(schema.as_ptr());
            if valid_ctxt.is_null() {
                return Err(LibXml2Error::ValidationContextCreationFailed);
            }

            let mut errors: Vec<String> = Vec::new();
            let errors_ptr = &mut errors as *mut Vec<String> as *mut c_void;
            xmlSchemaSetValidStructuredErrors(
                valid_ctxt,
                Some(structured_error_callback),
                errors_ptr,
            );

            let result_code = xmlSchemaValidateDoc(valid_ctxt, doc.as_ptr());

            // Always free the validation context
            xmlSchemaFreeValidCtxt(valid_ctxt);

            Ok(ValidationResult::from_code(result_code, errors))
        }
    }

    /// Serialize a document tree to pretty-printed bytes with an explicit
    /// UTF-8 encoding declaration.
    pub fn serialize_pretty(&self, doc: &XmlDocPtr) -> LibXml2Result<Vec<u8>> {
        unsafe {
            let mut buf: *mut c_uchar = std::ptr::null_mut();
            let mut len: c_int = 0;

            xmlDocDumpFormatMemoryEnc(doc.as_ptr(), &mut buf, &mut len, c"UTF-8".as_ptr(), 1);

            if buf.is_null() || len <= 0 {
                return Err(LibXml2Error::SerializeFailed);
            }

            let bytes = std::slice::from_raw_parts(buf, len as usize).to_vec();
            xmlFree(buf as *mut c_void);

            Ok(bytes)
        }
    }
}

impl Default for LibXml2Wrapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="root" type="xs:string"/>
</xs:schema>"#;

    const VALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root>Hello World</root>"#;

    const INVALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root><invalid>content</invalid></root>"#;

    const MALFORMED_XML: &str = "<root><unclosed></root>";

    #[test]
    fn test_libxml2_wrapper_creation() {
        let wrapper = LibXml2Wrapper::new();
        drop(wrapper);
    }

    #[test]
    fn test_schema_parsing_success() {
        let wrapper = LibXml2Wrapper::new();

        let result = wrapper.parse_schema_from_memory(SIMPLE_XSD.as_bytes());
        assert!(result.is_ok());
        assert!(result.unwrap().is_valid());
    }

    #[test]
    fn test_schema_parsing_invalid_schema() {
        let wrapper = LibXml2Wrapper::new();
        let invalid_schema = b"<invalid>not a schema</invalid>";

        let result = wrapper.parse_schema_from_memory(invalid_schema);
        assert!(result.is_err());

        match result.unwrap_err() {
            LibXml2Error::SchemaParseFailed { .. } => (),
            other => panic!("Expected SchemaParseFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_parsing_empty_data() {
        let wrapper = LibXml2Wrapper::new();

        let result = wrapper.parse_schema_from_memory(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_document_parsing_success() {
        let wrapper = LibXml2Wrapper::new();

        let result = wrapper.parse_document(VALID_XML.as_bytes(), "test.xml");
        assert!(result.is_ok());
    }

    #[test]
    fn test_document_parsing_malformed() {
        let wrapper = LibXml2Wrapper::new();

        let result = wrapper.parse_document(MALFORMED_XML.as_bytes(), "test.xml");
        assert!(result.is_err());

        match result.unwrap_err() {
            LibXml2Error::DocumentParseFailed { .. } => (),
            other => panic!("Expected DocumentParseFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_document_valid() {
        let wrapper = LibXml2Wrapper::new();
        let schema = wrapper
            .parse_schema_from_memory(SIMPLE_XSD.as_bytes())
            .unwrap();
        let doc = wrapper
            .parse_document(VALID_XML.as_bytes(), "test.xml")
            .unwrap();

        let result = wrapper.validate_document(&schema, &doc).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_document_invalid() {
        let wrapper = LibXml2Wrapper::new();
        let schema = wrapper
            .parse_schema_from_memory(SIMPLE_XSD.as_bytes())
            .unwrap();
        let doc = wrapper
            .parse_document(INVALID_XML.as_bytes(), "test.xml")
            .unwrap();

        let result = wrapper.validate_document(&schema, &doc).unwrap();
        assert!(result.is_invalid());
        match result {
            ValidationResult::Invalid { errors } => assert!(!errors.is_empty()),
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_reusable_across_validations() {
        let wrapper = LibXml2Wrapper::new();
        let schema = wrapper
            .parse_schema_from_memory(SIMPLE_XSD.as_bytes())
            .unwrap();

        for _ in 0..3 {
            let doc = wrapper
                .parse_document(VALID_XML.as_bytes(), "test.xml")
                .unwrap();
            let result = wrapper.validate_document(&schema, &doc).unwrap();
            assert!(result.is_valid());
        }
    }

    #[test]
    fn test_serialize_pretty_declares_utf8() {
        let wrapper = LibXml2Wrapper::new();
        let doc = wrapper
            .parse_document(b"<root><value>1</value></root>", "test.xml")
            .unwrap();

        let bytes = wrapper.serialize_pretty(&doc).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("encoding=\"UTF-8\""));
        assert!(text.contains("<value>1</value>"));
    }

    #[test]
    fn test_validation_result_from_code() {
        assert_eq!(
            ValidationResult::from_code(0, vec![]),
            ValidationResult::Valid
        );
        assert_eq!(
            ValidationResult::from_code(5, vec!["err".to_string()]),
            ValidationResult::Invalid {
                errors: vec!["err".to_string()]
            }
        );
        assert_eq!(
            ValidationResult::from_code(-1, vec![]),
            ValidationResult::InternalError { code: -1 }
        );
    }

    #[test]
    fn test_validation_result_predicates() {
        let valid = ValidationResult::Valid;
        assert!(valid.is_valid());
        assert!(!valid.is_invalid());
        assert!(!valid.is_error());

        let invalid = ValidationResult::Invalid { errors: vec![] };
        assert!(!invalid.is_valid());
        assert!(invalid.is_invalid());
        assert!(!invalid.is_error());

        let error = ValidationResult::InternalError { code: -1 };
        assert!(!error.is_valid());
        assert!(!error.is_invalid());
        assert!(error.is_error());
    }

    #[test]
    fn test_schema_ptr_cloning() {
        let wrapper = LibXml2Wrapper::new();

        let schema = wrapper
            .parse_schema_from_memory(SIMPLE_XSD.as_bytes())
            .unwrap();
        let cloned_schema = schema.clone();

        assert!(schema.is_valid());
        assert!(cloned_schema.is_valid());

        // Both should point to the same underlying schema
        assert_eq!(schema.as_ptr(), cloned_schema.as_ptr());
    }

    #[test]
    fn test_memory_safety() {
        // Dropping schemas and documents must not affect later parses
        let wrapper = LibXml2Wrapper::new();

        {
            let schema = wrapper
                .parse_schema_from_memory(SIMPLE_XSD.as_bytes())
                .unwrap();
            assert!(schema.is_valid());
            let doc = wrapper
                .parse_document(VALID_XML.as_bytes(), "test.xml")
                .unwrap();
            drop(doc);
        }

        let schema2 = wrapper
            .parse_schema_from_memory(SIMPLE_XSD.as_bytes())
            .unwrap();
        assert!(schema2.is_valid());
    }
}
