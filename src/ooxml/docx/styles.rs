/// Styles - the style catalog of a document.
///
/// The catalog is read from the styles part for lookups. The part itself is
/// never rewritten: its bytes are kept and written back unchanged.
use crate::ooxml::docx::types::{OnOff, StyleKind};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;

/// The styles defined in a document.
///
/// # Examples
///
/// ```
/// use docx_delta::ooxml::docx::styles::StyleCatalog;
/// use docx_delta::ooxml::docx::types::StyleKind;
///
/// let xml = br#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
///   <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
/// </w:styles>"#;
/// let catalog = StyleCatalog::from_xml(xml.to_vec()).unwrap();
/// let style = catalog.get_by_name("Heading 2", Some(StyleKind::Paragraph)).unwrap();
/// assert_eq!(style.style_id(), "Heading2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: SmallVec<[Style; 32]>,
    raw: Vec<u8>,
}

impl StyleCatalog {
    /// Parse a styles part, keeping its bytes for repacking.
    pub fn from_xml(raw: Vec<u8>) -> Result<Self> {
        let styles = parse_styles(&raw)?;
        Ok(Self { styles, raw })
    }

    /// Bytes of the styles part as read.
    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Style> {
        self.styles.iter()
    }

    /// Get a style by its id, optionally restricted to one kind.
    pub fn get_by_id(&self, style_id: &str, kind: Option<StyleKind>) -> Option<&Style> {
        self.styles
            .iter()
            .find(|s| s.style_id == style_id && kind.is_none_or(|k| s.kind == k))
    }

    /// Get a style by its UI name, compared case-insensitively.
    pub fn get_by_name(&self, name: &str, kind: Option<StyleKind>) -> Option<&Style> {
        self.styles.iter().find(|s| {
            s.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
                && kind.is_none_or(|k| s.kind == k)
        })
    }

    /// Get the default style of a kind.
    pub fn get_default(&self, kind: StyleKind) -> Option<&Style> {
        self.styles.iter().find(|s| s.is_default && s.kind == kind)
    }
}

/// A single `<w:style>` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    style_id: String,
    name: Option<String>,
    kind: StyleKind,
    is_default: bool,
    based_on: Option<String>,
}

impl Style {
    #[inline]
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    /// Get the UI-visible name, if one is defined.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    #[inline]
    pub fn based_on(&self) -> Option<&str> {
        self.based_on.as_deref()
    }

    /// The heading level encoded in the name ("heading 3" gives 3).
    ///
    /// The prefix is matched case-insensitively; the suffix must be an
    /// integer.
    pub fn heading_level(&self) -> Option<u32> {
        let name = self.name.as_deref()?;
        let prefix = name.get(..8)?;
        if !prefix.eq_ignore_ascii_case("heading ") {
            return None;
        }
        name[8..].parse().ok()
    }
}

fn parse_styles(xml: &[u8]) -> Result<SmallVec<[Style; 32]>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut styles = SmallVec::new();
    let mut current: Option<Style> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"style" => {
                let mut style = Style {
                    style_id: String::new(),
                    name: None,
                    kind: StyleKind::Paragraph,
                    is_default: false,
                    based_on: None,
                };
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"type" => {
                            // Unknown kinds are treated as paragraph styles
                            style.kind = attr
                                .unescape_value()?
                                .parse()
                                .unwrap_or(StyleKind::Paragraph);
                        },
                        b"styleId" => style.style_id = attr.unescape_value()?.into_owned(),
                        b"default" => {
                            let value = attr.unescape_value()?;
                            style.is_default = OnOff::parse(Some(value.as_ref()))?.is_on();
                        },
                        _ => {},
                    }
                }
                current = Some(style);
            },
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"styles" => saw_root = true,
                b"name" | b"basedOn" => {
                    let Some(style) = current.as_mut() else { continue };
                    let mut val = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.local_name().as_ref() == b"val" {
                            val = Some(attr.unescape_value()?.into_owned());
                        }
                    }
                    if e.local_name().as_ref() == b"name" {
                        style.name = val;
                    } else {
                        style.based_on = val;
                    }
                },
                _ => {},
            },
            Event::End(e) if e.local_name().as_ref() == b"style" => {
                if let Some(style) = current.take()
                    && !style.style_id.is_empty()
                {
                    styles.push(style);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !saw_root {
        return Err(OoxmlError::Xml(
            "styles part has no <w:styles> root".to_string(),
        ));
    }
    Ok(styles)
}
