//! Built-in template for new documents.
//!
//! The parts are the smallest set a word processor accepts: content types,
//! package and document relationships, an empty body with one US Letter
//! section, styles (Normal, Title, Heading 1-9, Hyperlink), an empty
//! numbering part and settings.

use crate::ooxml::error::Result;
use crate::ooxml::opc::PhysPkgWriter;

/// (member name, content) of every template part.
const PARTS: &[(&str, &str)] = &[
    ("[Content_Types].xml", include_str!("resources/[Content_Types].xml")),
    ("_rels/.rels", include_str!("resources/_rels/.rels")),
    ("word/document.xml", include_str!("resources/word/document.xml")),
    (
        "word/_rels/document.xml.rels",
        include_str!("resources/word/_rels/document.xml.rels"),
    ),
    ("word/styles.xml", include_str!("resources/word/styles.xml")),
    ("word/numbering.xml", include_str!("resources/word/numbering.xml")),
    ("word/settings.xml", include_str!("resources/word/settings.xml")),
];

/// Zip the template parts into an archive.
pub fn template_archive() -> Result<Vec<u8>> {
    let mut writer = PhysPkgWriter::new();
    for (name, content) in PARTS {
        writer.write_member(name, content.as_bytes())?;
    }
    Ok(writer.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::numbering::Numbering;
    use crate::ooxml::docx::styles::StyleCatalog;
    use crate::ooxml::docx::types::StyleKind;
    use crate::ooxml::opc::PhysPkgReader;

    fn part(name: &str) -> &'static str {
        PARTS
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, content)| *content)
            .unwrap()
    }

    #[test]
    fn test_template_archive_members() {
        let bytes = template_archive().unwrap();
        let reader = PhysPkgReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.len(), PARTS.len());
        assert!(reader.member_names().any(|n| n == "word/document.xml"));
    }

    #[test]
    fn test_template_styles_have_headings() {
        let styles = StyleCatalog::from_xml(part("word/styles.xml").as_bytes().to_vec()).unwrap();
        for n in 1..=9 {
            let style = styles
                .get_by_id(&format!("Heading{}", n), Some(StyleKind::Paragraph))
                .unwrap();
            assert_eq!(style.heading_level(), Some(n));
        }
        assert!(styles.get_by_id("Title", None).is_some());
        assert!(styles.get_by_id("Hyperlink", Some(StyleKind::Character)).is_some());
    }

    #[test]
    fn test_template_numbering_is_empty() {
        let numbering = Numbering::from_xml(part("word/numbering.xml").as_bytes()).unwrap();
        assert!(numbering.is_empty());
    }
}
