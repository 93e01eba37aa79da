/// Numbering support: list definitions of a Word document.
///
/// A *family* (`w:abstractNum`) holds up to nine level templates; an
/// *instance* (`w:num`) binds the `w:numId` a paragraph refers to onto one
/// family. Families created by this crate always carry all nine levels in
/// one format, either decimal or bullet.
use crate::common::xml::{attr, escape_xml};
use crate::ooxml::docx::types::{DecimalNumber, NumberFormat};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;
use tracing::trace;

/// Number of indent levels in a list family.
pub const LEVEL_COUNT: u8 = 9;

/// How generated list levels look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStyle {
    /// `w:lvlText` of ordered levels
    pub ordered_text: String,
    /// `w:lvlText` of bullet levels
    pub bullet_text: String,
    /// Left indent added per level, in twentieths of a point
    pub indent_step_twips: u32,
    /// Hanging indent of every level
    pub hanging_twips: u32,
}

impl Default for ListStyle {
    fn default() -> Self {
        Self {
            ordered_text: "%1.".to_string(),
            bullet_text: "\u{25CF}".to_string(),
            indent_step_twips: 720,
            hanging_twips: 360,
        }
    }
}

/// One level template of a family (`w:lvl`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    ilvl: u8,
    start: i64,
    /// Raw `w:numFmt` value; formats this model does not name are kept as is
    format: String,
    text: String,
    indent_left: Option<i64>,
    hanging: Option<i64>,
}

impl Level {
    fn generated(ilvl: u8, ordered: bool, style: &ListStyle) -> Self {
        let (format, text) = if ordered {
            (NumberFormat::Decimal, &style.ordered_text)
        } else {
            (NumberFormat::Bullet, &style.bullet_text)
        };
        Self {
            ilvl,
            start: 1,
            format: format.as_str().to_string(),
            text: text.clone(),
            indent_left: Some(i64::from(style.indent_step_twips) * (i64::from(ilvl) + 1)),
            hanging: Some(i64::from(style.hanging_twips)),
        }
    }

    /// Indent level, 0-8.
    #[inline]
    pub fn ilvl(&self) -> u8 {
        self.ilvl
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    /// The number format, if it is one this model names.
    #[inline]
    pub fn format(&self) -> Option<NumberFormat> {
        self.format.parse().ok()
    }

    /// Whether this level renders as an ordered (decimal) list.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.format().is_some_and(NumberFormat::is_ordered)
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:lvl w:ilvl="{}"><w:start w:val="{}"/><w:numFmt w:val="{}"/><w:lvlText w:val="{}"/><w:lvlJc w:val="left"/>"#,
            self.ilvl,
            self.start,
            escape_xml(&self.format),
            escape_xml(&self.text)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        if self.indent_left.is_some() || self.hanging.is_some() {
            xml.push_str("<w:pPr><w:ind");
            if let Some(left) = self.indent_left {
                write!(xml, r#" w:left="{}""#, left)
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            if let Some(hanging) = self.hanging {
                write!(xml, r#" w:hanging="{}""#, hanging)
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            xml.push_str("/></w:pPr>");
        }
        xml.push_str("</w:lvl>");
        Ok(())
    }
}

/// A list family (`w:abstractNum`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    id: u32,
    levels: Vec<Level>,
}

impl Family {
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Find the level template for an indent level.
    pub fn level(&self, ilvl: u8) -> Option<&Level> {
        self.levels.iter().find(|l| l.ilvl == ilvl)
    }

    fn fill(&mut self, ordered: bool, style: &ListStyle) {
        self.levels = (0..LEVEL_COUNT)
            .map(|ilvl| Level::generated(ilvl, ordered, style))
            .collect();
    }
}

/// A numbering instance (`w:num`) binding a `numId` to a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instance {
    num_id: u32,
    family_id: u32,
}

impl Instance {
    #[inline]
    pub fn num_id(&self) -> u32 {
        self.num_id
    }

    #[inline]
    pub fn family_id(&self) -> u32 {
        self.family_id
    }
}

/// The numbering part of a package.
///
/// # Examples
///
/// ```
/// use docx_delta::ooxml::docx::numbering::Numbering;
///
/// let mut numbering = Numbering::new();
/// assert_eq!(numbering.new_family(true), 1);
/// assert_eq!(numbering.new_family(false), 2);
/// assert!(numbering.resolve_level(2, 0).is_some_and(|l| !l.is_ordered()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    families: Vec<Family>,
    instances: Vec<Instance>,
    style: ListStyle,
    /// Bytes the part was read from, kept until the model is mutated
    original: Option<Vec<u8>>,
}

impl Numbering {
    /// Create an empty numbering model with the default list style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the templates used for generated levels.
    pub fn set_list_style(&mut self, style: ListStyle) {
        self.style = style;
    }

    #[inline]
    pub fn list_style(&self) -> &ListStyle {
        &self.style
    }

    #[inline]
    pub fn families(&self) -> &[Family] {
        &self.families
    }

    #[inline]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    #[inline]
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.instances.is_empty()
    }

    /// Whether the model changed since it was read.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.original.is_none()
    }

    /// Look up a family by id.
    pub fn family(&self, family_id: u32) -> Result<&Family> {
        self.families
            .iter()
            .find(|f| f.id == family_id)
            .ok_or(OoxmlError::FamilyNotFound(family_id))
    }

    /// Look up an instance by `numId`.
    pub fn instance(&self, num_id: u32) -> Option<&Instance> {
        self.instances.iter().find(|n| n.num_id == num_id)
    }

    /// Resolve a paragraph numbering reference to its level template.
    pub fn resolve_level(&self, num_id: u32, ilvl: u8) -> Option<&Level> {
        let instance = self.instance(num_id)?;
        self.family(instance.family_id).ok()?.level(ilvl)
    }

    /// Append a fully populated family plus a paired instance.
    ///
    /// Returns the new instance's `numId`, which paragraphs reference. It
    /// only equals the family id when both collections were dense.
    pub fn new_family(&mut self, ordered: bool) -> u32 {
        let family_id = next_id(self.families.len(), self.families.iter().map(|f| f.id));
        let num_id = next_id(self.instances.len(), self.instances.iter().map(|n| n.num_id));

        let mut family = Family {
            id: family_id,
            levels: Vec::with_capacity(LEVEL_COUNT as usize),
        };
        family.fill(ordered, &self.style);
        self.families.push(family);
        self.instances.push(Instance { num_id, family_id });
        self.original = None;

        trace!(family_id, num_id, ordered, "allocated list family");
        num_id
    }

    /// Rewrite all nine levels of an existing family as ordered or bullet.
    ///
    /// Returns false, changing nothing, when the family does not exist.
    pub fn set_family_order(&mut self, family_id: u32, ordered: bool) -> bool {
        let style = &self.style;
        match self.families.iter_mut().find(|f| f.id == family_id) {
            Some(family) => {
                family.fill(ordered, style);
                self.original = None;
                true
            },
            None => false,
        }
    }

    /// Remove every family and instance.
    pub fn clear(&mut self) {
        self.families.clear();
        self.instances.clear();
        self.original = None;
    }

    /// Parse a numbering part.
    ///
    /// Levels of families are read as they are; no format normalization
    /// happens here.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut families = Vec::new();
        let mut instances = Vec::new();
        let mut saw_root = false;

        let mut family: Option<Family> = None;
        let mut level: Option<Level> = None;
        let mut instance: Option<(Option<u32>, Option<u32>)> = None;
        let mut buf = Vec::with_capacity(1024);

        loop {
            let event = reader.read_event_into(&mut buf)?;
            let is_empty = matches!(event, Event::Empty(_));
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"numbering" => saw_root = true,
                    b"abstractNum" => {
                        let id = attr_u32(e, b"abstractNumId")?.ok_or_else(|| {
                            OoxmlError::InvalidFormat("abstractNum without id".to_string())
                        })?;
                        let fam = Family {
                            id,
                            levels: Vec::new(),
                        };
                        if is_empty {
                            families.push(fam);
                        } else {
                            family = Some(fam);
                        }
                    },
                    b"lvl" if family.is_some() => {
                        let ilvl = attr_u32(e, b"ilvl")?.unwrap_or(0);
                        let lvl = Level {
                            ilvl: u8::try_from(ilvl).map_err(|_| {
                                OoxmlError::InvalidFormat(format!("level {} out of range", ilvl))
                            })?,
                            start: 1,
                            format: NumberFormat::Decimal.as_str().to_string(),
                            text: String::new(),
                            indent_left: None,
                            hanging: None,
                        };
                        if is_empty {
                            if let Some(fam) = family.as_mut() {
                                fam.levels.push(lvl);
                            }
                        } else {
                            level = Some(lvl);
                        }
                    },
                    b"start" => {
                        if let (Some(lvl), Some(v)) = (level.as_mut(), attr_i64(e, b"val")?) {
                            lvl.start = v;
                        }
                    },
                    b"numFmt" => {
                        if let (Some(lvl), Some(v)) = (level.as_mut(), attr(e, b"val")?) {
                            lvl.format = v;
                        }
                    },
                    b"lvlText" => {
                        if let (Some(lvl), Some(v)) = (level.as_mut(), attr(e, b"val")?) {
                            lvl.text = v;
                        }
                    },
                    b"ind" => {
                        if let Some(lvl) = level.as_mut() {
                            lvl.indent_left = match attr_i64(e, b"left")? {
                                Some(v) => Some(v),
                                None => attr_i64(e, b"start")?,
                            };
                            lvl.hanging = attr_i64(e, b"hanging")?;
                        }
                    },
                    b"num" if family.is_none() => {
                        let num_id = attr_u32(e, b"numId")?;
                        if !is_empty {
                            instance = Some((num_id, None));
                        }
                    },
                    b"abstractNumId" => {
                        if let Some(inst) = instance.as_mut() {
                            inst.1 = attr_u32(e, b"val")?;
                        }
                    },
                    b"lvlOverride" if instance.is_some() && !is_empty => {
                        // Per-instance overrides are not modeled
                        reader.read_to_end_into(e.name(), &mut Vec::new())?;
                    },
                    _ => {},
                },
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"lvl" => {
                        if let (Some(fam), Some(lvl)) = (family.as_mut(), level.take()) {
                            fam.levels.push(lvl);
                        }
                    },
                    b"abstractNum" => {
                        if let Some(fam) = family.take() {
                            families.push(fam);
                        }
                    },
                    b"num" => {
                        if let Some((Some(num_id), Some(family_id))) = instance.take() {
                            instances.push(Instance { num_id, family_id });
                        }
                    },
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        if !saw_root {
            return Err(OoxmlError::Xml(
                "numbering part has no <w:numbering> root".to_string(),
            ));
        }

        Ok(Self {
            families,
            instances,
            style: ListStyle::default(),
            original: Some(xml.to_vec()),
        })
    }

    /// Serialize the numbering part.
    ///
    /// An unmodified model writes back the bytes it was read from.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        if let Some(original) = &self.original {
            return Ok(original.clone());
        }

        let mut xml = String::with_capacity(512 + self.families.len() * 2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        write!(xml, r#"<w:numbering xmlns:w="{}">"#, namespace::WML_MAIN)
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;

        for family in &self.families {
            write!(
                xml,
                r#"<w:abstractNum w:abstractNumId="{}"><w:multiLevelType w:val="hybridMultilevel"/>"#,
                family.id
            )
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            for level in &family.levels {
                level.write_xml(&mut xml)?;
            }
            xml.push_str("</w:abstractNum>");
        }

        for instance in &self.instances {
            write!(
                xml,
                r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/></w:num>"#,
                instance.num_id, instance.family_id
            )
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }

        xml.push_str("</w:numbering>");
        Ok(xml.into_bytes())
    }
}

/// `count + 1`, unless a sparse id set read from a file already uses it.
fn next_id(count: usize, used: impl Iterator<Item = u32> + Clone) -> u32 {
    let candidate = u32::try_from(count).unwrap_or(u32::MAX - 1).saturating_add(1);
    if used.clone().any(|id| id == candidate) {
        used.max().unwrap_or(0).saturating_add(1)
    } else {
        candidate
    }
}

fn attr_i64(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<i64>> {
    match attr(e, name)? {
        Some(v) => DecimalNumber::parse(v.as_bytes()).map(|n| Some(n.get())),
        None => Ok(None),
    }
}

fn attr_u32(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<u32>> {
    match attr_i64(e, name)? {
        Some(v) => u32::try_from(v)
            .map(Some)
            .map_err(|_| OoxmlError::InvalidFormat(format!("id {} out of range", v))),
        None => Ok(None),
    }
}
