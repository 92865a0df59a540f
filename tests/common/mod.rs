//! Shared fixtures for integration tests

use std::path::Path;

use transform_xml::PipelineConfig;

/// Initial document from the canonical scenario
pub const INPUT_XML: &str = "<a><b>1</b></a>";

/// Schema requiring element `a` to contain one `b` of type integer
pub const INPUT_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="a">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="b" type="xs:integer"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

/// Schema requiring `root/value` as a string
pub const OUTPUT_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="value" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

/// Stylesheet mapping `<a><b>` onto `<root><value>`
pub const STYLESHEET: &str = r#"<?xml version="1.0"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/a">
    <root><value><xsl:value-of select="b"/></value></root>
  </xsl:template>
</xsl:stylesheet>"#;

/// Stylesheet whose output does not conform to [`OUTPUT_XSD`]
pub const NONCONFORMING_STYLESHEET: &str = r#"<?xml version="1.0"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/a">
    <root><unexpected><xsl:value-of select="b"/></unexpected></root>
  </xsl:template>
</xsl:stylesheet>"#;

/// Not well-formed: mismatched closing tag
pub const MALFORMED_XML: &str = "<a><b>1</a>";

/// Well-formed but `b` is not an integer
pub const VIOLATING_XML: &str = "<a><b>not-a-number</b></a>";

/// Write the canonical fixture set into `dir` and return a config pointing
/// at it
pub fn write_fixtures(dir: &Path) -> PipelineConfig {
    std::fs::write(dir.join("init_xml.xml"), INPUT_XML).unwrap();
    std::fs::write(dir.join("xsd_file.xsd"), INPUT_XSD).unwrap();
    std::fs::write(dir.join("trans_xsd.xsd"), OUTPUT_XSD).unwrap();
    std::fs::write(dir.join("xslt_file.xslt"), STYLESHEET).unwrap();

    PipelineConfig {
        input_document: dir.join("init_xml.xml"),
        input_schema: dir.join("xsd_file.xsd"),
        output_schema: dir.join("trans_xsd.xsd"),
        stylesheet: dir.join("xslt_file.xslt"),
        output_path: dir.join("final_xml.xml"),
    }
}
