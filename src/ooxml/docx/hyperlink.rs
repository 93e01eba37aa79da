/// Hyperlinks: a run wrapped in a link to a relationship target.
use crate::common::xml::{XmlCursor, attr, escape_xml};
use crate::ooxml::docx::run::{Run, unexpected_eof};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as FmtWrite;

/// A hyperlink (`w:hyperlink`).
///
/// External links point at a relationship (`r:id`) of the document part;
/// internal links name a bookmark (`w:anchor`) instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hyperlink {
    r_id: Option<String>,
    anchor: Option<String>,
    run: Run,
}

impl Hyperlink {
    /// Create an external hyperlink around a run.
    pub fn new(r_id: impl Into<String>, run: Run) -> Self {
        Self {
            r_id: Some(r_id.into()),
            anchor: None,
            run,
        }
    }

    /// Relationship id of the link target, if external.
    #[inline]
    pub fn r_id(&self) -> Option<&str> {
        self.r_id.as_deref()
    }

    /// Bookmark name, if internal.
    #[inline]
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    #[inline]
    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Parse a `w:hyperlink` whose start tag was just read.
    ///
    /// A link spanning several runs is folded into one run carrying the
    /// first run's properties.
    pub(crate) fn parse(
        cursor: &mut XmlCursor<'_>,
        start: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<Self> {
        let mut link = Self::default();
        for a in start.attributes() {
            let a = a?;
            match a.key.as_ref() {
                b"r:id" => link.r_id = Some(a.unescape_value()?.into_owned()),
                b"w:anchor" => link.anchor = Some(a.unescape_value()?.into_owned()),
                _ => {},
            }
        }
        if link.r_id.is_none() {
            link.r_id = attr(start, b"id")?;
        }
        if is_empty {
            return Ok(link);
        }

        let mut first = true;
        loop {
            let (_, event) = cursor.next()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"r" => {
                    let run = Run::parse(cursor, matches!(event, Event::Empty(_)))?;
                    if first {
                        link.run = run;
                        first = false;
                    } else {
                        for child in run.children() {
                            link.run.push(child.clone());
                        }
                    }
                },
                Event::Start(ref e) => cursor.skip(e)?,
                Event::End(ref e) if e.local_name().as_ref() == b"hyperlink" => break,
                Event::Eof => return Err(unexpected_eof("hyperlink")),
                _ => {},
            }
        }
        Ok(link)
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<w:hyperlink");
        if let Some(r_id) = &self.r_id {
            write!(xml, r#" r:id="{}""#, escape_xml(r_id))
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        if let Some(anchor) = &self.anchor {
            write!(xml, r#" w:anchor="{}""#, escape_xml(anchor))
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        xml.push_str(r#" w:history="1">"#);
        self.run.write_xml(xml)?;
        xml.push_str("</w:hyperlink>");
        Ok(())
    }
}
