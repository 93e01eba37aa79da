/// Paragraphs and their properties.
use crate::common::xml::{XmlCursor, attr, escape_xml, local_name};
use crate::ooxml::docx::hyperlink::Hyperlink;
use crate::ooxml::docx::run::{Run, unexpected_eof, write_in_order};
use crate::ooxml::docx::types::{DecimalNumber, Hex, Justification};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as FmtWrite;
use tracing::{trace, warn};

/// A paragraph's list membership (`w:numPr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    /// `w:numId`, the numbering instance
    pub num_id: u32,
    /// `w:ilvl`, the indent level 0-8
    pub ilvl: u8,
}

/// Child order of `w:pPr` in the schema.
const PPR_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap",
    "overflowPunct", "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd",
    "snapToGrid", "spacing", "ind", "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc",
    "textDirection", "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr",
    "sectPr", "pPrChange",
];

/// Paragraph formatting (`w:pPr`).
///
/// Children without a field are kept as markup and written back in schema
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphProperties {
    /// Paragraph style id (`w:pStyle`)
    pub style: Option<String>,
    pub numbering: Option<NumberingRef>,
    pub justification: Option<Justification>,
    /// (tag, markup) of unmodeled children
    extras: Vec<(String, String)>,
}

impl ParagraphProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn parse(cursor: &mut XmlCursor<'_>) -> Result<Self> {
        let mut props = Self::default();
        let mut num_id: Option<i64> = None;
        let mut ilvl: Option<i64> = None;
        let mut in_num_pr = false;

        loop {
            let (offset, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_start = matches!(event, Event::Start(_));
                    match e.local_name().as_ref() {
                        // numPr's children are read in this loop
                        b"numPr" => {
                            in_num_pr = is_start;
                            continue;
                        },
                        b"pStyle" => props.style = attr(e, b"val")?,
                        b"numId" => num_id = decimal_val(e)?,
                        b"ilvl" => ilvl = decimal_val(e)?,
                        b"jc" => {
                            props.justification = attr(e, b"val")?.and_then(|v| v.parse().ok());
                        },
                        _ if in_num_pr => {},
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
                Event::End(ref e) if e.local_name().as_ref() == b"numPr" => in_num_pr = false,
                Event::End(ref e) if e.local_name().as_ref() == b"pPr" => break,
                Event::Eof => return Err(unexpected_eof("pPr")),
                _ => {},
            }
        }

        // numId 0 removes numbering
        if let Some(num_id) = num_id.filter(|&n| n > 0) {
            let num_id = u32::try_from(num_id)
                .map_err(|_| OoxmlError::InvalidFormat(format!("numId {} out of range", num_id)))?;
            let ilvl = ilvl.unwrap_or(0);
            let ilvl = u8::try_from(ilvl)
                .map_err(|_| OoxmlError::InvalidFormat(format!("ilvl {} out of range", ilvl)))?;
            props.numbering = Some(NumberingRef { num_id, ilvl });
        }
        Ok(props)
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let mut children: Vec<(&str, String)> = Vec::with_capacity(3 + self.extras.len());
        if let Some(style) = &self.style {
            children.push(("pStyle", format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(style))));
        }
        if let Some(numbering) = self.numbering {
            children.push((
                "numPr",
                format!(
                    r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                    numbering.ilvl, numbering.num_id
                ),
            ));
        }
        if let Some(jc) = self.justification {
            children.push(("jc", format!(r#"<w:jc w:val="{}"/>"#, jc.as_str())));
        }
        for (tag, raw) in &self.extras {
            children.push((tag.as_str(), raw.clone()));
        }

        xml.push_str("<w:pPr>");
        write_in_order(xml, PPR_ORDER, children);
        xml.push_str("</w:pPr>");
        Ok(())
    }
}

fn decimal_val(e: &BytesStart<'_>) -> Result<Option<i64>> {
    match attr(e, b"val")? {
        Some(v) => Ok(Some(DecimalNumber::parse(v.as_bytes())?.get())),
        None => Ok(None),
    }
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphChild {
    Run(Run),
    Hyperlink(Hyperlink),
    /// Any other inline content, with its tag name and original markup
    Unsupported { tag: String, raw: String },
}

/// A paragraph (`w:p`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// `w14:paraId`
    para_id: Option<Hex>,
    properties: Option<ParagraphProperties>,
    children: Vec<ParagraphChild>,
}

impl Paragraph {
    pub fn new(para_id: Option<Hex>) -> Self {
        Self {
            para_id,
            ..Self::default()
        }
    }

    #[inline]
    pub fn para_id(&self) -> Option<Hex> {
        self.para_id
    }

    #[inline]
    pub fn properties(&self) -> Option<&ParagraphProperties> {
        self.properties.as_ref()
    }

    pub fn properties_mut(&mut self) -> &mut ParagraphProperties {
        self.properties
            .get_or_insert_with(ParagraphProperties::default)
    }

    /// Paragraph style id, if any.
    pub fn style_id(&self) -> Option<&str> {
        self.properties.as_ref()?.style.as_deref()
    }

    /// List membership, if any.
    pub fn numbering(&self) -> Option<NumberingRef> {
        self.properties.as_ref()?.numbering
    }

    pub fn set_style(&mut self, style_id: &str) -> &mut Self {
        self.properties_mut().style = Some(style_id.to_string());
        self
    }

    pub fn set_numbering(&mut self, num_id: u32, ilvl: u8) -> &mut Self {
        self.properties_mut().numbering = Some(NumberingRef { num_id, ilvl });
        self
    }

    #[inline]
    pub fn children(&self) -> &[ParagraphChild] {
        &self.children
    }

    /// Append a run holding `text` and return it for formatting.
    pub fn add_run(&mut self, text: &str) -> &mut Run {
        self.children.push(ParagraphChild::Run(Run::with_text(text)));
        match self.children.last_mut() {
            Some(ParagraphChild::Run(run)) => run,
            _ => unreachable!("a run was just pushed"),
        }
    }

    /// Append a hyperlink and return it for formatting.
    pub fn add_hyperlink(&mut self, link: Hyperlink) -> &mut Hyperlink {
        self.children.push(ParagraphChild::Hyperlink(link));
        match self.children.last_mut() {
            Some(ParagraphChild::Hyperlink(link)) => link,
            _ => unreachable!("a hyperlink was just pushed"),
        }
    }

    /// Concatenated text of all runs and hyperlinks.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                ParagraphChild::Run(run) => text.push_str(&run.text()),
                ParagraphChild::Hyperlink(link) => text.push_str(&link.run().text()),
                ParagraphChild::Unsupported { .. } => {},
            }
        }
        text
    }

    /// Parse a `w:p` whose start tag was just read.
    pub(crate) fn parse(
        cursor: &mut XmlCursor<'_>,
        start: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<Self> {
        let mut para = Self::default();
        for a in start.attributes() {
            let a = a?;
            if a.key.as_ref() == b"w14:paraId" {
                let value = a.unescape_value()?;
                match value.parse::<Hex>() {
                    Ok(id) => para.para_id = Some(id),
                    Err(_) => warn!(value = %value, "ignoring malformed paragraph id"),
                }
            }
        }
        if is_empty {
            return Ok(para);
        }

        loop {
            let (offset, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    para.parse_child(cursor, offset, e, is_empty)?;
                },
                Event::End(ref e) if e.local_name().as_ref() == b"p" => break,
                Event::Eof => return Err(unexpected_eof("p")),
                _ => {},
            }
        }
        Ok(para)
    }

    fn parse_child(
        &mut self,
        cursor: &mut XmlCursor<'_>,
        offset: usize,
        e: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<()> {
        match e.local_name().as_ref() {
            b"pPr" => {
                if !is_empty {
                    self.properties = Some(ParagraphProperties::parse(cursor)?);
                }
            },
            b"r" => self
                .children
                .push(ParagraphChild::Run(Run::parse(cursor, is_empty)?)),
            b"hyperlink" => self
                .children
                .push(ParagraphChild::Hyperlink(Hyperlink::parse(cursor, e, is_empty)?)),
            b"bookmarkStart" | b"bookmarkEnd" | b"proofErr" | b"permStart" | b"permEnd" => {
                trace!(tag = %local_name(e), "skipping paragraph bookkeeping");
                if !is_empty {
                    cursor.skip(e)?;
                }
            },
            _ => {
                let tag = local_name(e);
                let raw = cursor.raw_element(offset, e, is_empty)?;
                self.children.push(ParagraphChild::Unsupported { tag, raw });
            },
        }
        Ok(())
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        match self.para_id {
            Some(id) => write!(xml, r#"<w:p w14:paraId="{}">"#, id)
                .map_err(|e| OoxmlError::Xml(e.to_string()))?,
            None => xml.push_str("<w:p>"),
        }
        if let Some(props) = &self.properties {
            props.write_xml(xml)?;
        }
        for child in &self.children {
            match child {
                ParagraphChild::Run(run) => run.write_xml(xml)?,
                ParagraphChild::Hyperlink(link) => link.write_xml(xml)?,
                ParagraphChild::Unsupported { raw, .. } => xml.push_str(raw),
            }
        }
        xml.push_str("</w:p>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_para(xml: &str) -> Paragraph {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        let (_, event) = cursor.next().unwrap();
        match event {
            Event::Start(e) => Paragraph::parse(&mut cursor, &e, false).unwrap(),
            Event::Empty(e) => Paragraph::parse(&mut cursor, &e, true).unwrap(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_paragraph() {
        let para = parse_para(
            r#"<w:p w14:paraId="1A2B3C4D" w:rsidR="00AB12CD"><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="2"/><w:numId w:val="5"/></w:numPr><w:jc w:val="center"/></w:pPr><w:bookmarkStart w:id="0" w:name="x"/><w:r><w:t>item</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#,
        );
        assert_eq!(para.para_id(), Some(Hex::new(0x1A2B_3C4D)));
        assert_eq!(para.style_id(), Some("ListParagraph"));
        assert_eq!(para.numbering(), Some(NumberingRef { num_id: 5, ilvl: 2 }));
        assert_eq!(
            para.properties().unwrap().justification,
            Some(Justification::Center)
        );
        assert_eq!(para.children().len(), 1);
        assert_eq!(para.text(), "item");
    }

    #[test]
    fn test_num_id_zero_is_not_a_list() {
        let para = parse_para(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="0"/></w:numPr></w:pPr></w:p>"#,
        );
        assert_eq!(para.numbering(), None);
    }

    #[test]
    fn test_unsupported_child() {
        let para = parse_para(
            r#"<w:p><w:r><w:t>a</w:t></w:r><w:ins w:id="1"><w:r><w:t>b</w:t></w:r></w:ins></w:p>"#,
        );
        match &para.children()[1] {
            ParagraphChild::Unsupported { tag, raw } => {
                assert_eq!(tag, "ins");
                assert!(raw.starts_with("<w:ins") && raw.ends_with("</w:ins>"));
            },
            other => panic!("unexpected child {other:?}"),
        }
    }

    #[test]
    fn test_unmodeled_properties_kept_in_order() {
        let para = parse_para(
            r#"<w:p><w:pPr><w:pStyle w:val="Quote"/><w:spacing w:after="120"/><w:keepNext/><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>q</w:t></w:r></w:p>"#,
        );
        let mut xml = String::new();
        para.write_xml(&mut xml).unwrap();
        assert!(xml.starts_with(
            r#"<w:p><w:pPr><w:pStyle w:val="Quote"/><w:keepNext/><w:spacing w:after="120"/><w:rPr><w:b/></w:rPr></w:pPr>"#
        ));
        assert_eq!(parse_para(&xml), para);
    }

    #[test]
    fn test_empty_paragraph() {
        let para = parse_para("<w:p/>");
        assert!(para.children().is_empty());
        assert!(para.properties().is_none());
    }

    #[test]
    fn test_write_and_reparse() {
        let mut para = Paragraph::new(Some(Hex::new(7)));
        para.set_style("Heading1").set_numbering(2, 3);
        para.add_run("x & y").bold(true);

        let mut xml = String::new();
        para.write_xml(&mut xml).unwrap();
        assert!(xml.starts_with(r#"<w:p w14:paraId="00000007"><w:pPr><w:pStyle w:val="Heading1"/>"#));
        assert_eq!(parse_para(&xml), para);
    }
}
