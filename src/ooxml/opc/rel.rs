//! Relationship-related objects for OPC packages.
//!
//! A relationships part (`*.rels`) lists the typed, id-addressed references
//! from one source part to other parts or to external URLs.
use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{namespace, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;

/// A single relationship from a source part to a target.
///
/// Identified by an rId, unique within its source. Either internal (pointing
/// to another part) or external (pointing to a URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    target_ref: String,
    is_external: bool,
}

impl Relationship {
    /// Create a new relationship.
    pub fn new(r_id: String, reltype: String, target_ref: String, is_external: bool) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            is_external,
        }
    }

    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference.
    ///
    /// For internal relationships, this is a part reference relative to the
    /// source's base URI. For external relationships, an absolute URL.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Get the target mode string as written in the .rels part.
    #[inline]
    pub fn target_mode(&self) -> &'static str {
        if self.is_external {
            target_mode::EXTERNAL
        } else {
            target_mode::INTERNAL
        }
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }
}

/// Collection of relationships from a single source.
///
/// Kept in document order so that an untouched relationships part is written
/// back the way it was read.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,
    rels: SmallVec<[Relationship; 8]>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    ///
    /// # Arguments
    /// * `base_uri` - Base URI for resolving relative references
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: SmallVec::new(),
        }
    }

    /// Parse a `.rels` part.
    ///
    /// Entries missing an `Id`, `Type` or `Target` attribute are skipped; a
    /// duplicate id is an error.
    pub fn from_xml(xml: &[u8], base_uri: &str) -> Result<Self> {
        let mut rels = Self::new(base_uri.to_string());
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"Relationships" => saw_root = true,
                    b"Relationship" => {
                        let mut r_id = None;
                        let mut reltype = None;
                        let mut target_ref = None;
                        let mut is_external = false;

                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                                b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                                b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                                b"TargetMode" => {
                                    is_external = attr.unescape_value()? == target_mode::EXTERNAL
                                },
                                _ => {},
                            }
                        }

                        if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                            if rels.get(&id).is_some() {
                                return Err(OpcError::InvalidRelationship(format!(
                                    "Duplicate relationship id '{}'",
                                    id
                                )));
                            }
                            rels.rels.push(Relationship::new(id, rt, tr, is_external));
                        }
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        if !saw_root {
            return Err(OpcError::XmlError(
                "Rels parse error: missing <Relationships> root".to_string(),
            ));
        }
        Ok(rels)
    }

    /// Get the base URI relative targets are resolved against.
    #[inline]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.r_id == r_id)
    }

    /// Get or add an internal relationship to a target part.
    ///
    /// Returns the rId of the existing or newly created relationship.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(rel) = self
            .rels
            .iter()
            .find(|r| r.reltype == reltype && r.target_ref == target_ref && !r.is_external)
        {
            return rel.r_id.clone();
        }

        let r_id = self.next_r_id();
        self.rels.push(Relationship::new(
            r_id.clone(),
            reltype.to_string(),
            target_ref.to_string(),
            false,
        ));
        r_id
    }

    /// Add an external relationship (e.g. a hyperlink URL) under a fresh rId.
    pub fn add_external(&mut self, reltype: &str, url: &str) -> String {
        let r_id = self.next_r_id();
        self.rels.push(Relationship::new(
            r_id.clone(),
            reltype.to_string(),
            url.to_string(),
            true,
        ));
        r_id
    }

    /// Get the next available relationship ID.
    ///
    /// Generates IDs in the format "rId1", "rId2", etc., filling in gaps.
    fn next_r_id(&self) -> String {
        let mut used_numbers: Vec<u32> = self
            .rels
            .iter()
            .filter_map(|rel| {
                rel.r_id
                    .strip_prefix("rId")
                    .and_then(|n| atoi_simd::parse::<u32>(n.as_bytes()).ok())
            })
            .collect();
        used_numbers.sort_unstable();

        let mut next_num = 1u32;
        for &num in &used_numbers {
            match num.cmp(&next_num) {
                std::cmp::Ordering::Equal => next_num += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }

        format!("rId{}", next_num)
    }

    /// Get the single relationship of a specific type.
    ///
    /// Returns an error if none or more than one exists.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.iter().filter(|rel| rel.reltype == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    /// Get the first relationship of a specific type, if any.
    pub fn first_with_reltype(&self, reltype: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.reltype == reltype)
    }

    /// Resolve an internal relationship's target to an absolute part name.
    pub fn target_partname(&self, rel: &Relationship) -> Result<PackURI> {
        if rel.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "Cannot get target_partname for external relationship '{}'",
                rel.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &rel.target_ref).map_err(OpcError::InvalidPackUri)
    }

    /// Get an iterator over all relationships, in document order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Get the number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize relationships to XML format.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns=""#);
        xml.push_str(namespace::OPC_RELATIONSHIPS);
        xml.push_str(r#"">"#);

        for rel in &self.rels {
            let target_mode = if rel.is_external {
                r#" TargetMode="External""#
            } else {
                ""
            };

            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref),
                target_mode
            ));
        }

        xml.push_str("</Relationships>");
        xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as rt;

    const DOC_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_rels() {
        let rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        assert_eq!(rels.len(), 2);

        let link = rels.get("rId3").unwrap();
        assert!(link.is_external());
        assert_eq!(link.target_ref(), "https://example.com/?a=1&b=2");

        let styles = rels.part_with_reltype(rt::STYLES).unwrap();
        assert_eq!(
            rels.target_partname(styles).unwrap().as_str(),
            "/word/styles.xml"
        );
    }

    #[test]
    fn test_next_r_id_fills_gaps() {
        let mut rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        assert_eq!(rels.add_external(rt::HYPERLINK, "https://a.example"), "rId2");
        assert_eq!(rels.add_external(rt::HYPERLINK, "https://b.example"), "rId4");
    }

    #[test]
    fn test_get_or_add() {
        let mut rels = Relationships::new("/word".to_string());
        assert_eq!(rels.get_or_add(rt::NUMBERING, "numbering.xml"), "rId1");
        assert_eq!(rels.get_or_add(rt::NUMBERING, "numbering.xml"), "rId1");
        assert_eq!(rels.get_or_add(rt::STYLES, "styles.xml"), "rId2");
    }

    #[test]
    fn test_missing_reltype_is_error() {
        let rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        assert!(matches!(
            rels.part_with_reltype(rt::NUMBERING),
            Err(OpcError::RelationshipNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_reltype_is_error() {
        let mut rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        rels.add_external(rt::HYPERLINK, "https://other.example");
        assert!(matches!(
            rels.part_with_reltype(rt::HYPERLINK),
            Err(OpcError::InvalidRelationship(_))
        ));
    }

    #[test]
    fn test_to_xml_round_trips() {
        let rels = Relationships::from_xml(DOC_RELS, "/word").unwrap();
        let reparsed = Relationships::from_xml(rels.to_xml().as_bytes(), "/word").unwrap();
        let ids: Vec<&str> = reparsed.iter().map(|r| r.r_id()).collect();
        assert_eq!(ids, ["rId1", "rId3"]);
        assert_eq!(
            reparsed.get("rId3").unwrap().target_ref(),
            "https://example.com/?a=1&b=2"
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Relationships::from_xml(b"not xml at all", "/").is_err());
    }
}
