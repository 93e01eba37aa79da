/// Package implementation for Word documents.
use crate::ooxml::docx::document::Document;
use crate::ooxml::docx::numbering::Numbering;
use crate::ooxml::docx::styles::StyleCatalog;
use crate::ooxml::docx::template;
use crate::ooxml::docx::types::Hex;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{MEDIA_PREFIX, content_type as ct, relationship_type as rt};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI};
use crate::ooxml::opc::{ContentTypes, PackURI, PhysPkgReader, PhysPkgWriter, Relationships};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Where a numbering part is placed when a package gains one.
const DEFAULT_NUMBERING_URI: &str = "/word/numbering.xml";

/// Largest value Word accepts for `w14:paraId`.
const MAX_PARA_ID: u32 = 0x7FFF_FFFF;

/// A Word (.docx) package.
///
/// The main document, its relationships, the style catalog and the
/// numbering part are parsed; every other part is kept as bytes and
/// written back unchanged.
///
/// # Examples
///
/// ```
/// use docx_delta::ooxml::docx::Package;
///
/// let mut pkg = Package::new()?;
/// let r_id = pkg.add_hyperlink_relationship("https://example.com");
/// let bytes = pkg.to_bytes()?;
///
/// let reopened = Package::from_bytes(&bytes)?;
/// assert!(reopened.doc_rels().get(&r_id).is_some());
/// # Ok::<(), docx_delta::ooxml::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    content_types: ContentTypes,
    package_rels: Relationships,
    document_uri: PackURI,
    document: Document,
    doc_rels: Relationships,
    styles_uri: Option<PackURI>,
    styles: StyleCatalog,
    numbering_uri: Option<PackURI>,
    numbering: Numbering,
    /// Unmodeled parts by member name
    parts: BTreeMap<String, Vec<u8>>,
    /// Member name prefix of image parts
    media_prefix: String,
    last_para_id: u32,
}

impl Package {
    /// Create a package from the built-in template.
    pub fn new() -> Result<Self> {
        Self::from_bytes(&template::template_archive()?)
    }

    /// Open a .docx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Unpack a .docx archive held in memory.
    ///
    /// # Errors
    /// Fails on an unreadable archive, a missing content-types part, a
    /// missing or repeated main document relationship, any required part that
    /// does not parse, and a body block the object model does not represent
    /// (reported as `UnsupportedContent`).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut parts = PhysPkgReader::from_bytes(data)?.into_members();
        debug!(members = parts.len(), "unpacking package");

        let content_types_uri = PackURI::new(CONTENT_TYPES_URI).map_err(OoxmlError::InvalidFormat)?;
        let content_types = ContentTypes::from_xml(&take_part(&mut parts, &content_types_uri)?)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OoxmlError::InvalidFormat)?;
        let package_rels_uri = package_uri.rels_uri().map_err(OoxmlError::InvalidFormat)?;
        let package_rels =
            Relationships::from_xml(&take_part(&mut parts, &package_rels_uri)?, PACKAGE_URI)?;

        let main_rel = package_rels.part_with_reltype(rt::OFFICE_DOCUMENT)?;
        let document_uri = package_rels.target_partname(main_rel)?;
        let document = Document::from_xml(&take_part(&mut parts, &document_uri)?)?;
        if let Some((index, tag)) = document.first_unsupported() {
            return Err(OoxmlError::UnsupportedContent {
                index,
                tag: tag.to_string(),
            });
        }

        let doc_rels_uri = document_uri.rels_uri().map_err(OoxmlError::InvalidFormat)?;
        let doc_rels = match parts.remove(doc_rels_uri.membername()) {
            Some(xml) => Relationships::from_xml(&xml, document_uri.base_uri())?,
            None => {
                warn!(part = %document_uri, "main document has no relationships part");
                Relationships::new(document_uri.base_uri().to_string())
            },
        };

        let (styles_uri, styles) = match doc_rels.first_with_reltype(rt::STYLES) {
            Some(rel) => {
                let uri = doc_rels.target_partname(rel)?;
                let styles = StyleCatalog::from_xml(take_part(&mut parts, &uri)?)?;
                (Some(uri), styles)
            },
            None => {
                warn!("package has no styles part");
                (None, StyleCatalog::default())
            },
        };

        let (numbering_uri, numbering) = match doc_rels.first_with_reltype(rt::NUMBERING) {
            Some(rel) => {
                let uri = doc_rels.target_partname(rel)?;
                match parts.remove(uri.membername()) {
                    Some(xml) => (Some(uri), Numbering::from_xml(&xml)?),
                    None => {
                        warn!(part = %uri, "numbering relationship has no target part");
                        (None, Numbering::new())
                    },
                }
            },
            None => (None, Numbering::new()),
        };

        for name in parts.keys() {
            trace!(part = %name, "retaining part");
        }

        let last_para_id = document.max_para_id();
        let package = Self {
            content_types,
            package_rels,
            document_uri,
            document,
            doc_rels,
            styles_uri,
            styles,
            numbering_uri,
            numbering,
            parts,
            media_prefix: MEDIA_PREFIX.to_string(),
            last_para_id,
        };
        debug!(
            retained = package.parts.len(),
            images = package.image_count(),
            families = package.numbering.family_count(),
            "package unpacked"
        );
        Ok(package)
    }

    /// Repack into .docx archive bytes.
    ///
    /// A numbering part, its relationship and its content-type override are
    /// added when the model holds families and the package had none.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut content_types = self.content_types.clone();
        let mut doc_rels = self.doc_rels.clone();

        let numbering_uri = match &self.numbering_uri {
            Some(uri) => Some(uri.clone()),
            None if !self.numbering.is_empty() => {
                let uri = PackURI::new(DEFAULT_NUMBERING_URI).map_err(OoxmlError::InvalidFormat)?;
                let r_id = doc_rels.get_or_add(rt::NUMBERING, &uri.relative_ref(doc_rels.base_uri()));
                debug!(r_id = %r_id, "adding numbering part");
                Some(uri)
            },
            None => None,
        };
        if let Some(uri) = &numbering_uri {
            content_types.ensure_override(uri, ct::WML_NUMBERING);
        }
        content_types.ensure_override(&self.document_uri, ct::WML_DOCUMENT_MAIN);

        let mut writer = PhysPkgWriter::new();
        writer.write_member(
            PackURI::new(CONTENT_TYPES_URI)
                .map_err(OoxmlError::InvalidFormat)?
                .membername(),
            content_types.to_xml().as_bytes(),
        )?;
        let package_uri = PackURI::new(PACKAGE_URI).map_err(OoxmlError::InvalidFormat)?;
        writer.write(
            &package_uri.rels_uri().map_err(OoxmlError::InvalidFormat)?,
            self.package_rels.to_xml().as_bytes(),
        )?;

        writer.write(&self.document_uri, self.document.to_xml()?.as_bytes())?;
        writer.write(
            &self.document_uri.rels_uri().map_err(OoxmlError::InvalidFormat)?,
            doc_rels.to_xml().as_bytes(),
        )?;
        if let Some(uri) = &self.styles_uri {
            writer.write(uri, self.styles.raw())?;
        }
        if let Some(uri) = &numbering_uri {
            writer.write(uri, &self.numbering.to_xml()?)?;
        }

        for (name, blob) in &self.parts {
            writer.write_member(name, blob)?;
        }
        Ok(writer.finish()?)
    }

    /// Repack and write to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Register an external hyperlink target on the main document.
    ///
    /// Returns the new relationship id.
    pub fn add_hyperlink_relationship(&mut self, url: &str) -> String {
        self.doc_rels.add_external(rt::HYPERLINK, url)
    }

    /// Allocate a fresh `w14:paraId`.
    pub fn next_para_id(&mut self) -> Hex {
        self.last_para_id = if self.last_para_id >= MAX_PARA_ID {
            1
        } else {
            self.last_para_id + 1
        };
        Hex::new(self.last_para_id)
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[inline]
    pub fn numbering(&self) -> &Numbering {
        &self.numbering
    }

    #[inline]
    pub fn numbering_mut(&mut self) -> &mut Numbering {
        &mut self.numbering
    }

    #[inline]
    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    /// Relationships of the main document part.
    #[inline]
    pub fn doc_rels(&self) -> &Relationships {
        &self.doc_rels
    }

    #[inline]
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Member name prefix under which retained parts count as images.
    #[inline]
    pub fn media_prefix(&self) -> &str {
        &self.media_prefix
    }

    /// Classify retained parts under `prefix` as images from now on.
    pub fn set_media_prefix(&mut self, prefix: &str) {
        self.media_prefix = prefix.trim_start_matches('/').to_string();
    }

    /// Retained image parts, by member name.
    pub fn media_parts(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.parts
            .iter()
            .filter(|(name, _)| name.starts_with(&self.media_prefix))
            .map(|(name, blob)| (name.as_str(), blob.as_slice()))
    }

    /// Number of media parts (images) carried by the package.
    #[inline]
    pub fn image_count(&self) -> usize {
        self.media_parts().count()
    }

    /// Unmodeled parts kept for repacking, by member name.
    #[inline]
    pub fn retained_parts(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.parts
    }
}

fn take_part(parts: &mut BTreeMap<String, Vec<u8>>, uri: &PackURI) -> Result<Vec<u8>> {
    parts
        .remove(uri.membername())
        .ok_or_else(|| OoxmlError::PartNotFound(uri.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::paragraph::Paragraph;

    #[test]
    fn test_new_package_from_template() {
        let pkg = Package::new().unwrap();
        assert!(pkg.document().body().is_empty());
        assert!(pkg.numbering().is_empty());
        assert!(pkg.styles().get_by_id("Heading1", None).is_some());
        assert_eq!(pkg.image_count(), 0);
        assert!(pkg.retained_parts().contains_key("word/settings.xml"));
    }

    #[test]
    fn test_repack_keeps_paragraphs_and_numbering() {
        let mut pkg = Package::new().unwrap();
        let num_id = pkg.numbering_mut().new_family(true);
        let id = pkg.next_para_id();
        let mut para = Paragraph::new(Some(id));
        para.set_numbering(num_id, 2);
        para.add_run("item");
        pkg.document_mut().push_paragraph(para);

        let reopened = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        let para = reopened.document().paragraphs().next().unwrap();
        assert_eq!(para.text(), "item");
        assert_eq!(para.para_id(), Some(id));
        let numbering = para.numbering().unwrap();
        assert!(reopened.numbering().resolve_level(numbering.num_id, numbering.ilvl).is_some());
    }

    #[test]
    fn test_numbering_part_added_when_missing() {
        let mut pkg = Package::new().unwrap();
        pkg.numbering_uri = None;
        let styles_only = format!(
            r#"<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}" Target="styles.xml"/></Relationships>"#,
            crate::ooxml::opc::constants::namespace::OPC_RELATIONSHIPS,
            rt::STYLES
        );
        pkg.doc_rels = Relationships::from_xml(styles_only.as_bytes(), "/word").unwrap();
        pkg.numbering_mut().new_family(false);

        let reopened = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.numbering().family_count(), 1);
        let uri = PackURI::new(DEFAULT_NUMBERING_URI).unwrap();
        assert_eq!(
            reopened.content_types().content_type_for(&uri),
            Some(ct::WML_NUMBERING)
        );
    }

    #[test]
    fn test_para_ids_continue_after_load() {
        let mut pkg = Package::new().unwrap();
        let first = pkg.next_para_id();
        pkg.document_mut().push_paragraph(Paragraph::new(Some(first)));

        let mut reopened = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert!(reopened.next_para_id() > first);
    }

    #[test]
    fn test_media_prefix_reclassifies_parts() {
        let mut pkg = Package::new().unwrap();
        pkg.parts.insert("word/media/image1.png".to_string(), vec![0x89, b'P']);
        pkg.parts.insert("word/pictures/image2.png".to_string(), vec![0x89, b'P']);
        assert_eq!(pkg.image_count(), 1);

        pkg.set_media_prefix("/word/pictures/");
        assert_eq!(pkg.media_prefix(), "word/pictures/");
        let names: Vec<&str> = pkg.media_parts().map(|(name, _)| name).collect();
        assert_eq!(names, ["word/pictures/image2.png"]);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(Package::from_bytes(b"definitely not a zip").is_err());
    }
}
