//! The `[Content_Types].xml` part.
//!
//! Maps file extensions (Default) and individual part names (Override) to
//! content types. Entries keep their document order so an untouched package
//! writes the part back unchanged in meaning.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Content type map read from, and written to, `[Content_Types].xml`.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// (extension, content type), extension stored lowercase
    defaults: Vec<(String, String)>,
    /// (partname, content type)
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Create a map with the two defaults every package needs.
    pub fn new() -> Self {
        Self {
            defaults: vec![
                ("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string()),
                ("xml".to_string(), ct::XML.to_string()),
            ],
            overrides: Vec::new(),
        }
    }

    /// Parse `[Content_Types].xml`.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"Types" => saw_root = true,
                    b"Default" => {
                        let mut extension = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"Extension" => extension = Some(attr.unescape_value()?.to_string()),
                                b"ContentType" => {
                                    content_type = Some(attr.unescape_value()?.to_string())
                                },
                                _ => {},
                            }
                        }
                        if let (Some(ext), Some(ct)) = (extension, content_type) {
                            types.set_default(&ext, &ct);
                        }
                    },
                    b"Override" => {
                        let mut partname = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"PartName" => partname = Some(attr.unescape_value()?.to_string()),
                                b"ContentType" => {
                                    content_type = Some(attr.unescape_value()?.to_string())
                                },
                                _ => {},
                            }
                        }
                        if let (Some(pn), Some(ct)) = (partname, content_type) {
                            types.set_override(&pn, &ct);
                        }
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        if !saw_root {
            return Err(OpcError::XmlError(
                "Content types parse error: missing <Types> root".to_string(),
            ));
        }
        Ok(types)
    }

    /// Look up the content type of a part.
    ///
    /// Overrides take precedence over extension defaults. Partname matching
    /// is case-insensitive, as OPC part names are.
    pub fn content_type_for(&self, partname: &PackURI) -> Option<&str> {
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(pn, _)| pn.eq_ignore_ascii_case(partname.as_str()))
        {
            return Some(ct);
        }
        let ext = partname.ext().to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    /// Add or replace a Default entry.
    pub fn set_default(&mut self, extension: &str, content_type: &str) {
        let ext = extension.to_ascii_lowercase();
        match self.defaults.iter_mut().find(|(e, _)| *e == ext) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.defaults.push((ext, content_type.to_string())),
        }
    }

    /// Add or replace an Override entry.
    pub fn set_override(&mut self, partname: &str, content_type: &str) {
        match self
            .overrides
            .iter_mut()
            .find(|(pn, _)| pn.eq_ignore_ascii_case(partname))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self
                .overrides
                .push((partname.to_string(), content_type.to_string())),
        }
    }

    /// Make sure a part resolves to `content_type`, adding an Override if
    /// neither an override nor an extension default already does.
    ///
    /// Returns true when the map changed.
    pub fn ensure_override(&mut self, partname: &PackURI, content_type: &str) -> bool {
        if self.content_type_for(partname) == Some(content_type) {
            return false;
        }
        self.set_override(partname.as_str(), content_type);
        true
    }

    /// Number of Default entries.
    #[inline]
    pub fn default_count(&self) -> usize {
        self.defaults.len()
    }

    /// Number of Override entries.
    #[inline]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Generate the XML for `[Content_Types].xml`.
    pub fn to_xml(&self) -> String {
        let mut xml =
            String::with_capacity(256 + (self.defaults.len() + self.overrides.len()) * 128);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns=""#);
        xml.push_str(namespace::OPC_CONTENT_TYPES);
        xml.push_str(r#"">"#);

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="PNG" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

    #[test]
    fn test_lookup_prefers_override() {
        let types = ContentTypes::from_xml(TYPES).unwrap();
        let doc = PackURI::new("/word/document.xml").unwrap();
        assert_eq!(types.content_type_for(&doc), Some(ct::WML_DOCUMENT_MAIN));

        let styles = PackURI::new("/word/styles.xml").unwrap();
        assert_eq!(types.content_type_for(&styles), Some(ct::XML));

        let image = PackURI::new("/word/media/image1.png").unwrap();
        assert_eq!(types.content_type_for(&image), Some("image/png"));
    }

    #[test]
    fn test_ensure_override() {
        let mut types = ContentTypes::from_xml(TYPES).unwrap();
        let numbering = PackURI::new("/word/numbering.xml").unwrap();

        assert!(types.ensure_override(&numbering, ct::WML_NUMBERING));
        assert!(!types.ensure_override(&numbering, ct::WML_NUMBERING));
        assert_eq!(types.override_count(), 2);
        assert_eq!(types.content_type_for(&numbering), Some(ct::WML_NUMBERING));
    }

    #[test]
    fn test_to_xml_keeps_order() {
        let types = ContentTypes::from_xml(TYPES).unwrap();
        let xml = types.to_xml();

        let rels = xml.find(r#"Extension="rels""#).unwrap();
        let png = xml.find(r#"Extension="png""#).unwrap();
        assert!(rels < png);
        assert!(xml.contains(r#"<Override PartName="/word/document.xml""#));

        let reparsed = ContentTypes::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.default_count(), 3);
        assert_eq!(reparsed.override_count(), 1);
    }

    #[test]
    fn test_missing_root() {
        assert!(ContentTypes::from_xml(b"").is_err());
    }
}
