/// The main document part: body content and final section properties.
use crate::common::xml::{XmlCursor, attr, attrs, escape_xml, local_name};
use crate::ooxml::docx::paragraph::Paragraph;
use crate::ooxml::docx::run::unexpected_eof;
use crate::ooxml::docx::types::{DecimalNumber, PageOrientation};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as FmtWrite;

/// Page size (`w:pgSz`), in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
    pub orientation: PageOrientation,
}

impl Default for PageSize {
    /// US Letter, portrait.
    fn default() -> Self {
        Self {
            width: 12240,
            height: 15840,
            orientation: PageOrientation::Portrait,
        }
    }
}

/// Page margins (`w:pgMar`), in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
    pub header: i32,
    pub footer: i32,
    pub gutter: i32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: 1440,
            right: 1440,
            bottom: 1440,
            left: 1440,
            header: 720,
            footer: 720,
            gutter: 0,
        }
    }
}

/// Section properties of the final section (`w:body/w:sectPr`).
///
/// Page size, margins and the page numbering start are modeled; other
/// children (header references, columns, grid, ...) are kept as markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionProperties {
    pub page_size: Option<PageSize>,
    pub margins: Option<PageMargins>,
    /// `w:pgNumType/@w:start`
    pub page_number_start: Option<i64>,
    /// Other `w:pgNumType` attributes, e.g. `w:fmt`
    page_number_attrs: Vec<(String, String)>,
    /// Attributes of `w:sectPr` itself (rsids)
    attrs: Vec<(String, String)>,
    /// Unmodeled children as (local name, markup)
    extras: Vec<(String, String)>,
}

/// Children that precede `w:pgSz` in schema order.
const SECT_PR_HEAD: &[&str] = &["headerReference", "footerReference", "footnotePr", "endnotePr", "type"];
/// Children between `w:pgMar` and `w:pgNumType`.
const SECT_PR_MIDDLE: &[&str] = &["paperSrc", "pgBorders", "lnNumType"];

impl SectionProperties {
    fn parse(cursor: &mut XmlCursor<'_>, start: &BytesStart<'_>, is_empty: bool) -> Result<Self> {
        let mut sect = Self {
            attrs: attrs(start)?,
            ..Self::default()
        };
        if is_empty {
            return Ok(sect);
        }

        loop {
            let (offset, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    match e.local_name().as_ref() {
                        b"pgSz" => {
                            let mut size = PageSize::default();
                            if let Some(w) = attr_num(e, b"w")? {
                                size.width = to_u32(w)?;
                            }
                            if let Some(h) = attr_num(e, b"h")? {
                                size.height = to_u32(h)?;
                            }
                            if let Some(orient) = attr(e, b"orient")? {
                                size.orientation = orient.parse()?;
                            }
                            sect.page_size = Some(size);
                            if !is_empty {
                                cursor.skip(e)?;
                            }
                        },
                        b"pgMar" => {
                            let mut m = PageMargins::default();
                            for (field, name) in [
                                (&mut m.top, &b"top"[..]),
                                (&mut m.right, b"right"),
                                (&mut m.bottom, b"bottom"),
                                (&mut m.left, b"left"),
                                (&mut m.header, b"header"),
                                (&mut m.footer, b"footer"),
                                (&mut m.gutter, b"gutter"),
                            ] {
                                if let Some(v) = attr_num(e, name)? {
                                    *field = i32::try_from(v).map_err(|_| out_of_range(v))?;
                                }
                            }
                            sect.margins = Some(m);
                            if !is_empty {
                                cursor.skip(e)?;
                            }
                        },
                        b"pgNumType" => {
                            for (key, value) in attrs(e)? {
                                if key == "w:start" {
                                    sect.page_number_start =
                                        Some(DecimalNumber::parse(value.as_bytes())?.get());
                                } else {
                                    sect.page_number_attrs.push((key, value));
                                }
                            }
                            if !is_empty {
                                cursor.skip(e)?;
                            }
                        },
                        _ => {
                            let tag = local_name(e);
                            let raw = cursor.raw_element(offset, e, is_empty)?;
                            sect.extras.push((tag, raw));
                        },
                    }
                },
                Event::End(ref e) if e.local_name().as_ref() == b"sectPr" => break,
                Event::Eof => return Err(unexpected_eof("sectPr")),
                _ => {},
            }
        }
        Ok(sect)
    }

    fn write_extras(&self, xml: &mut String, filter: impl Fn(&str) -> bool) {
        for (tag, raw) in &self.extras {
            if filter(tag) {
                xml.push_str(raw);
            }
        }
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<w:sectPr");
        write_attrs(xml, &self.attrs)?;
        xml.push('>');

        self.write_extras(xml, |t| SECT_PR_HEAD.contains(&t));
        if let Some(size) = self.page_size {
            write!(xml, r#"<w:pgSz w:w="{}" w:h="{}""#, size.width, size.height)
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            if size.orientation != PageOrientation::Portrait {
                write!(xml, r#" w:orient="{}""#, size.orientation.as_str())
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            xml.push_str("/>");
        }
        if let Some(m) = self.margins {
            write!(
                xml,
                r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="{}"/>"#,
                m.top, m.right, m.bottom, m.left, m.header, m.footer, m.gutter
            )
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        self.write_extras(xml, |t| SECT_PR_MIDDLE.contains(&t));
        if self.page_number_start.is_some() || !self.page_number_attrs.is_empty() {
            xml.push_str("<w:pgNumType");
            write_attrs(xml, &self.page_number_attrs)?;
            if let Some(start) = self.page_number_start {
                write!(xml, r#" w:start="{}""#, start)
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            xml.push_str("/>");
        }
        self.write_extras(xml, |t| {
            !SECT_PR_HEAD.contains(&t) && !SECT_PR_MIDDLE.contains(&t)
        });

        xml.push_str("</w:sectPr>");
        Ok(())
    }
}

/// A block-level child of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyChild {
    Paragraph(Paragraph),
    /// Tables, content controls and other blocks, kept as markup
    Unsupported { tag: String, raw: String },
}

/// The parsed main document part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Attributes of the root element, namespace declarations included
    root_attrs: Vec<(String, String)>,
    /// Children of `w:document` before `w:body` (e.g. `w:background`)
    prelude: Vec<String>,
    body: Vec<BodyChild>,
    section: Option<SectionProperties>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            root_attrs: vec![
                ("xmlns:w".to_string(), namespace::WML_MAIN.to_string()),
                ("xmlns:r".to_string(), namespace::OFC_RELATIONSHIPS.to_string()),
                ("xmlns:w14".to_string(), namespace::WML_2010.to_string()),
            ],
            prelude: Vec::new(),
            body: Vec::new(),
            section: Some(SectionProperties {
                page_size: Some(PageSize::default()),
                margins: Some(PageMargins::default()),
                page_number_start: Some(1),
                ..SectionProperties::default()
            }),
        }
    }
}

impl Document {
    #[inline]
    pub fn body(&self) -> &[BodyChild] {
        &self.body
    }

    /// Iterate the paragraphs of the body, skipping other blocks.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|child| match child {
            BodyChild::Paragraph(p) => Some(p),
            BodyChild::Unsupported { .. } => None,
        })
    }

    /// Append a paragraph and return it.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) -> &mut Paragraph {
        self.body.push(BodyChild::Paragraph(paragraph));
        match self.body.last_mut() {
            Some(BodyChild::Paragraph(p)) => p,
            _ => unreachable!("a paragraph was just pushed"),
        }
    }

    /// Remove all body content, keeping the section properties.
    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Index and tag of the first block that is not a paragraph.
    pub fn first_unsupported(&self) -> Option<(usize, &str)> {
        self.body.iter().enumerate().find_map(|(i, c)| match c {
            BodyChild::Unsupported { tag, .. } => Some((i, tag.as_str())),
            BodyChild::Paragraph(_) => None,
        })
    }

    #[inline]
    pub fn section(&self) -> Option<&SectionProperties> {
        self.section.as_ref()
    }

    /// Largest `w14:paraId` in use.
    pub fn max_para_id(&self) -> u32 {
        self.paragraphs()
            .filter_map(|p| p.para_id())
            .map(|id| id.value())
            .max()
            .unwrap_or(0)
    }

    /// Parse the main document part.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut cursor = XmlCursor::new(xml);
        let mut doc = Self {
            root_attrs: Vec::new(),
            prelude: Vec::new(),
            body: Vec::new(),
            section: None,
        };
        let mut saw_root = false;
        let mut saw_body = false;

        loop {
            let (offset, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) if !saw_root => {
                    if e.local_name().as_ref() != b"document" {
                        return Err(OoxmlError::InvalidFormat(format!(
                            "document part root is <{}>",
                            local_name(e)
                        )));
                    }
                    saw_root = true;
                    doc.root_attrs = attrs(e)?;
                    if matches!(event, Event::Empty(_)) {
                        break;
                    }
                },
                Event::Start(ref e) if e.local_name().as_ref() == b"body" => {
                    saw_body = true;
                    doc.parse_body(&mut cursor)?;
                },
                Event::Empty(ref e) if e.local_name().as_ref() == b"body" => saw_body = true,
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    doc.prelude.push(cursor.raw_element(offset, e, is_empty)?);
                },
                Event::End(ref e) if e.local_name().as_ref() == b"document" => break,
                Event::Eof => break,
                _ => {},
            }
        }

        if !saw_root || !saw_body {
            return Err(OoxmlError::InvalidFormat(
                "document part has no <w:document>/<w:body>".to_string(),
            ));
        }
        Ok(doc)
    }

    fn parse_body(&mut self, cursor: &mut XmlCursor<'_>) -> Result<()> {
        loop {
            let (offset, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    match e.local_name().as_ref() {
                        b"p" => {
                            let para = Paragraph::parse(cursor, e, is_empty)?;
                            self.body.push(BodyChild::Paragraph(para));
                        },
                        b"sectPr" => {
                            self.section = Some(SectionProperties::parse(cursor, e, is_empty)?);
                        },
                        b"bookmarkStart" | b"bookmarkEnd" | b"proofErr" | b"permStart"
                        | b"permEnd" => {
                            if !is_empty {
                                cursor.skip(e)?;
                            }
                        },
                        _ => {
                            let tag = local_name(e);
                            let raw = cursor.raw_element(offset, e, is_empty)?;
                            self.body.push(BodyChild::Unsupported { tag, raw });
                        },
                    }
                },
                Event::End(ref e) if e.local_name().as_ref() == b"body" => return Ok(()),
                Event::Eof => return Err(unexpected_eof("body")),
                _ => {},
            }
        }
    }

    /// Serialize the main document part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024 + self.body.len() * 256);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str("<w:document");
        write_attrs(&mut xml, &self.root_attrs)?;
        for (prefix, uri) in [
            ("xmlns:w", namespace::WML_MAIN),
            ("xmlns:r", namespace::OFC_RELATIONSHIPS),
            ("xmlns:w14", namespace::WML_2010),
        ] {
            if !self.root_attrs.iter().any(|(k, _)| k == prefix) {
                write!(xml, r#" {}="{}""#, prefix, uri)
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
        }
        xml.push('>');

        for raw in &self.prelude {
            xml.push_str(raw);
        }
        xml.push_str("<w:body>");
        for child in &self.body {
            match child {
                BodyChild::Paragraph(p) => p.write_xml(&mut xml)?,
                BodyChild::Unsupported { raw, .. } => xml.push_str(raw),
            }
        }
        if let Some(section) = &self.section {
            section.write_xml(&mut xml)?;
        }
        xml.push_str("</w:body></w:document>");
        Ok(xml)
    }
}

fn write_attrs(xml: &mut String, attrs: &[(String, String)]) -> Result<()> {
    for (key, value) in attrs {
        write!(xml, r#" {}="{}""#, key, escape_xml(value))
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    Ok(())
}

fn attr_num(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<i64>> {
    match attr(e, name)? {
        Some(v) => Ok(Some(DecimalNumber::parse(v.as_bytes())?.get())),
        None => Ok(None),
    }
}

fn to_u32(v: i64) -> Result<u32> {
    u32::try_from(v).map_err(|_| out_of_range(v))
}

fn out_of_range(v: i64) -> OoxmlError {
    OoxmlError::InvalidFormat(format!("section measure {} out of range", v))
}
