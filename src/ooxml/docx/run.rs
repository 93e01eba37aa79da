/// Runs: the smallest styled inline unit of a paragraph.
use crate::common::xml::{XmlCursor, attr, escape_xml, local_name};
use crate::ooxml::docx::types::{HexColor, OnOff, Underline};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as FmtWrite;
use tracing::trace;

/// Child order of `w:rPr` in the schema.
const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath", "rPrChange",
];

/// Character formatting of a run (`w:rPr`).
///
/// Children without a field are kept as markup and written back in schema
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Character style id (`w:rStyle`)
    pub style: Option<String>,
    pub bold: Option<OnOff>,
    pub italic: Option<OnOff>,
    pub strike: Option<OnOff>,
    pub underline: Option<Underline>,
    /// `RRGGBB` or `auto`
    pub color: Option<String>,
    /// ASCII/high-ANSI font name
    pub font: Option<String>,
    /// Size in half-points
    pub size: Option<u32>,
    /// (tag, markup) of unmodeled children
    extras: Vec<(String, String)>,
}

impl RunProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[inline]
    pub fn is_bold(&self) -> bool {
        self.bold.is_some_and(OnOff::is_on)
    }

    #[inline]
    pub fn is_italic(&self) -> bool {
        self.italic.is_some_and(OnOff::is_on)
    }

    /// Whether any underline other than `none` is set.
    #[inline]
    pub fn is_underlined(&self) -> bool {
        self.underline.is_some_and(|u| u != Underline::None)
    }

    pub(crate) fn parse(cursor: &mut XmlCursor<'_>) -> Result<Self> {
        let mut props = Self::default();
        loop {
            let (offset, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_start = matches!(event, Event::Start(_));
                    let val = attr(e, b"val")?;
                    match e.local_name().as_ref() {
                        b"rStyle" => props.style = val,
                        b"b" => props.bold = Some(OnOff::parse(val.as_deref())?),
                        b"i" => props.italic = Some(OnOff::parse(val.as_deref())?),
                        b"strike" => props.strike = Some(OnOff::parse(val.as_deref())?),
                        b"u" => {
                            // Unknown underline kinds still underline
                            props.underline = Some(
                                val.as_deref()
                                    .and_then(|v| v.parse().ok())
                                    .unwrap_or(Underline::Single),
                            );
                        },
                        b"color" => props.color = val,
                        b"rFonts" if has_named_font(e)? => {
                            props.font = match attr(e, b"ascii")? {
                                Some(font) => Some(font),
                                None => attr(e, b"hAnsi")?,
                            };
                        },
                        b"sz" => props.size = val.and_then(|v| v.parse().ok()),
                        _ => {
                            let tag = local_name(e);
                            let raw = cursor.raw_element(offset, e, !is_start)?;
                            props.extras.push((tag, raw));
                            continue;
                        },
                    }
                    if is_start {
                        cursor.skip(e)?;
                    }
                },
                Event::End(ref e) if e.local_name().as_ref() == b"rPr" => break,
                Event::Eof => return Err(unexpected_eof("rPr")),
                _ => {},
            }
        }
        Ok(props)
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let mut children: Vec<(&str, String)> = Vec::with_capacity(8 + self.extras.len());
        if let Some(style) = &self.style {
            children.push(("rStyle", format!(r#"<w:rStyle w:val="{}"/>"#, escape_xml(style))));
        }
        if let Some(font) = &self.font {
            let font = escape_xml(font);
            children.push((
                "rFonts",
                format!(r#"<w:rFonts w:ascii="{}" w:hAnsi="{}"/>"#, font, font),
            ));
        }
        if let Some(bold) = self.bold {
            children.push(("b", bold.to_xml("w:b")));
        }
        if let Some(italic) = self.italic {
            children.push(("i", italic.to_xml("w:i")));
        }
        if let Some(strike) = self.strike {
            children.push(("strike", strike.to_xml("w:strike")));
        }
        if let Some(color) = &self.color {
            // w:color only accepts RRGGBB or auto
            let color = match HexColor::parse(color) {
                Some(hex) => hex.to_rrggbb(),
                None => escape_xml(color),
            };
            children.push(("color", format!(r#"<w:color w:val="{}"/>"#, color)));
        }
        if let Some(size) = self.size {
            children.push(("sz", format!(r#"<w:sz w:val="{}"/>"#, size)));
        }
        if let Some(underline) = self.underline {
            children.push(("u", format!(r#"<w:u w:val="{}"/>"#, underline.as_str())));
        }
        for (tag, raw) in &self.extras {
            children.push((tag.as_str(), raw.clone()));
        }

        xml.push_str("<w:rPr>");
        write_in_order(xml, RPR_ORDER, children);
        xml.push_str("</w:rPr>");
        Ok(())
    }
}

/// `w:rFonts` naming a concrete font rather than only theme fonts.
fn has_named_font(e: &BytesStart<'_>) -> Result<bool> {
    Ok(attr(e, b"ascii")?.is_some() || attr(e, b"hAnsi")?.is_some())
}

/// Append `(tag, markup)` children sorted by their position in `order`.
/// Tags missing from `order` go last, keeping their relative order.
pub(crate) fn write_in_order(xml: &mut String, order: &[&str], mut children: Vec<(&str, String)>) {
    children.sort_by_key(|(tag, _)| order.iter().position(|t| t == tag).unwrap_or(order.len()));
    for (_, markup) in children {
        xml.push_str(&markup);
    }
}

/// Content of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunChild {
    /// `w:t`
    Text(String),
    /// `w:tab`
    Tab,
    /// `w:br` / `w:cr`; page and column breaks keep their `w:type`
    Break(Option<String>),
    /// Any other run content, with its tag name and original markup
    Unsupported { tag: String, raw: String },
}

/// A run (`w:r`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    properties: Option<RunProperties>,
    children: Vec<RunChild>,
}

impl Run {
    /// Create a run holding one text node.
    pub fn with_text(text: &str) -> Self {
        Self {
            properties: None,
            children: vec![RunChild::Text(text.to_string())],
        }
    }

    #[inline]
    pub fn properties(&self) -> Option<&RunProperties> {
        self.properties.as_ref()
    }

    /// Get the properties, creating an empty set if there is none.
    pub fn properties_mut(&mut self) -> &mut RunProperties {
        self.properties.get_or_insert_with(RunProperties::default)
    }

    #[inline]
    pub fn children(&self) -> &[RunChild] {
        &self.children
    }

    pub fn push(&mut self, child: RunChild) {
        self.children.push(child);
    }

    /// Make the text bold.
    pub fn bold(&mut self, bold: bool) -> &mut Self {
        self.properties_mut().bold = Some(bold.into());
        self
    }

    /// Make the text italic.
    pub fn italic(&mut self, italic: bool) -> &mut Self {
        self.properties_mut().italic = Some(italic.into());
        self
    }

    pub fn underline(&mut self, underline: Underline) -> &mut Self {
        self.properties_mut().underline = Some(underline);
        self
    }

    /// Set the color, `RRGGBB` without `#`.
    pub fn color(&mut self, color: &str) -> &mut Self {
        self.properties_mut().color = Some(color.to_string());
        self
    }

    /// Set the character style.
    pub fn style(&mut self, style_id: &str) -> &mut Self {
        self.properties_mut().style = Some(style_id.to_string());
        self
    }

    /// Plain text of the run: tabs as `\t`, breaks as `\n`.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                RunChild::Text(t) => text.push_str(t),
                RunChild::Tab => text.push('\t'),
                RunChild::Break(_) => text.push('\n'),
                RunChild::Unsupported { .. } => {},
            }
        }
        text
    }

    /// Index and tag of the first child that has no text form.
    pub fn first_unsupported(&self) -> Option<(usize, &str)> {
        self.children.iter().enumerate().find_map(|(i, c)| match c {
            RunChild::Unsupported { tag, .. } => Some((i, tag.as_str())),
            _ => None,
        })
    }

    /// Parse a `w:r` whose start tag was just read.
    pub(crate) fn parse(cursor: &mut XmlCursor<'_>, is_empty: bool) -> Result<Self> {
        let mut run = Self::default();
        if is_empty {
            return Ok(run);
        }

        loop {
            let (offset, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    run.parse_child(cursor, offset, e, is_empty)?;
                },
                Event::End(ref e) if e.local_name().as_ref() == b"r" => break,
                Event::Eof => return Err(unexpected_eof("r")),
                _ => {},
            }
        }
        Ok(run)
    }

    fn parse_child(
        &mut self,
        cursor: &mut XmlCursor<'_>,
        offset: usize,
        e: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<()> {
        match e.local_name().as_ref() {
            b"rPr" => {
                if !is_empty {
                    self.properties = Some(RunProperties::parse(cursor)?);
                }
            },
            b"t" => {
                let text = if is_empty {
                    String::new()
                } else {
                    cursor.read_text(e.name())?
                };
                self.children.push(RunChild::Text(text));
            },
            b"tab" => {
                self.children.push(RunChild::Tab);
                if !is_empty {
                    cursor.skip(e)?;
                }
            },
            b"br" | b"cr" => {
                self.children.push(RunChild::Break(attr(e, b"type")?));
                if !is_empty {
                    cursor.skip(e)?;
                }
            },
            b"lastRenderedPageBreak" | b"softHyphen" | b"noBreakHyphen" => {
                trace!(tag = %local_name(e), "skipping layout hint");
                if !is_empty {
                    cursor.skip(e)?;
                }
            },
            _ => {
                let tag = local_name(e);
                let raw = cursor.raw_element(offset, e, is_empty)?;
                self.children.push(RunChild::Unsupported { tag, raw });
            },
        }
        Ok(())
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<w:r>");
        if let Some(props) = &self.properties {
            props.write_xml(xml)?;
        }
        for child in &self.children {
            match child {
                RunChild::Text(text) => {
                    write!(
                        xml,
                        r#"<w:t xml:space="preserve">{}</w:t>"#,
                        escape_xml(text)
                    )
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                },
                RunChild::Tab => xml.push_str("<w:tab/>"),
                RunChild::Break(None) => xml.push_str("<w:br/>"),
                RunChild::Break(Some(kind)) => {
                    write!(xml, r#"<w:br w:type="{}"/>"#, escape_xml(kind))
                        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                },
                RunChild::Unsupported { raw, .. } => xml.push_str(raw),
            }
        }
        xml.push_str("</w:r>");
        Ok(())
    }
}

pub(crate) fn unexpected_eof(tag: &str) -> OoxmlError {
    OoxmlError::Xml(format!("unexpected end of part inside <w:{}>", tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(xml: &str) -> Run {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        let (_, event) = cursor.next().unwrap();
        let is_empty = matches!(event, Event::Empty(_));
        Run::parse(&mut cursor, is_empty).unwrap()
    }

    #[test]
    fn test_parse_properties() {
        let run = parse_run(
            r#"<w:r><w:rPr><w:rStyle w:val="Hyperlink"/><w:b/><w:i w:val="0"/><w:u w:val="double"/><w:color w:val="FF00AA"/><w:sz w:val="28"/></w:rPr><w:t>Hi</w:t></w:r>"#,
        );
        let props = run.properties().unwrap();
        assert_eq!(props.style.as_deref(), Some("Hyperlink"));
        assert!(props.is_bold());
        assert!(!props.is_italic());
        assert_eq!(props.underline, Some(Underline::Double));
        assert_eq!(props.color.as_deref(), Some("FF00AA"));
        assert_eq!(props.size, Some(28));
        assert_eq!(run.text(), "Hi");
    }

    #[test]
    fn test_text_tab_break() {
        let run = parse_run(
            r#"<w:r><w:t xml:space="preserve">a </w:t><w:tab/><w:t>b</w:t><w:br/><w:lastRenderedPageBreak/><w:t>c</w:t></w:r>"#,
        );
        assert_eq!(run.text(), "a \tb\nc");
        assert!(run.first_unsupported().is_none());
    }

    #[test]
    fn test_unsupported_child_keeps_markup() {
        let run = parse_run(r#"<w:r><w:t>x</w:t><w:fldChar w:fldCharType="begin"/></w:r>"#);
        assert_eq!(run.first_unsupported(), Some((1, "fldChar")));

        let mut xml = String::new();
        run.write_xml(&mut xml).unwrap();
        assert!(xml.contains(r#"<w:fldChar w:fldCharType="begin"/>"#));
    }

    #[test]
    fn test_unmodeled_properties_kept_in_order() {
        let run = parse_run(
            r#"<w:r><w:rPr><w:rFonts w:asciiTheme="minorHAnsi"/><w:b/><w:lang w:val="de-DE"/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr><w:t>x</w:t></w:r>"#,
        );
        let props = run.properties().unwrap();
        assert_eq!(props.font, None);
        assert_eq!(props.size, Some(24));

        let mut xml = String::new();
        run.write_xml(&mut xml).unwrap();
        assert!(xml.starts_with(
            r#"<w:r><w:rPr><w:rFonts w:asciiTheme="minorHAnsi"/><w:b/><w:sz w:val="24"/><w:szCs w:val="24"/><w:lang w:val="de-DE"/></w:rPr>"#
        ));
        assert_eq!(parse_run(&xml), run);
    }

    #[test]
    fn test_short_color_written_as_six_digits() {
        let mut run = Run::with_text("c");
        run.color("F0A");

        let mut xml = String::new();
        run.write_xml(&mut xml).unwrap();
        assert!(xml.contains(r#"<w:color w:val="FF00AA"/>"#));
        assert_eq!(
            parse_run(&xml).properties().unwrap().color.as_deref(),
            Some("FF00AA")
        );
    }

    #[test]
    fn test_write_xml() {
        let mut run = Run::with_text("a < b");
        run.bold(true).underline(Underline::Single).color("00FF00");

        let mut xml = String::new();
        run.write_xml(&mut xml).unwrap();
        assert_eq!(
            xml,
            r#"<w:r><w:rPr><w:b/><w:color w:val="00FF00"/><w:u w:val="single"/></w:rPr><w:t xml:space="preserve">a &lt; b</w:t></w:r>"#
        );

        assert_eq!(parse_run(&xml), run);
    }
}
