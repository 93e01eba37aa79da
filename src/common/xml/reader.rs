use super::escape::resolve_entity;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;

/// Pull reader over an in-memory XML part that can hand back the raw
/// markup of an element it has read.
///
/// Text is not trimmed, so whitespace inside `w:t` survives.
pub struct XmlCursor<'a> {
    reader: Reader<&'a [u8]>,
    src: &'a [u8],
}

impl<'a> XmlCursor<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            reader: Reader::from_reader(src),
            src,
        }
    }

    /// Read the next event together with the byte offset it starts at.
    #[inline]
    pub fn next(&mut self) -> quick_xml::Result<(usize, Event<'a>)> {
        let start = self.position();
        let event = self.reader.read_event()?;
        Ok((start, event))
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Skip to the end of an element whose start tag was just read.
    #[inline]
    pub fn skip(&mut self, start: &BytesStart<'_>) -> quick_xml::Result<()> {
        self.reader.read_to_end(start.name())?;
        Ok(())
    }

    /// Raw markup of an element, from the offset of its start tag.
    ///
    /// For a `Start` event the reader is advanced past the matching end tag
    /// first; for an `Empty` event pass `is_empty = true`.
    pub fn raw_element(
        &mut self,
        offset: usize,
        start: &BytesStart<'_>,
        is_empty: bool,
    ) -> quick_xml::Result<String> {
        if !is_empty {
            self.skip(start)?;
        }
        let end = self.position().min(self.src.len());
        let raw = self.src.get(offset..end).unwrap_or_default();
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Collect the character data of an element up to its end tag.
    ///
    /// Entity and character references are resolved; unknown entities are
    /// kept as written. Nested markup is skipped.
    pub fn read_text(&mut self, end: QName<'_>) -> quick_xml::Result<String> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(&String::from_utf8_lossy(&t)),
                Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
                Event::GeneralRef(r) => {
                    let name = String::from_utf8_lossy(&r);
                    match resolve_entity(&name) {
                        Some(c) => text.push(c),
                        None => {
                            text.push('&');
                            text.push_str(&name);
                            text.push(';');
                        },
                    }
                },
                Event::Start(e) => {
                    self.reader.read_to_end(e.name())?;
                },
                Event::End(e) if e.name() == end => break,
                Event::Eof => {
                    return Err(quick_xml::Error::IllFormed(
                        quick_xml::errors::IllFormedError::MissingEndTag(
                            String::from_utf8_lossy(end.as_ref()).into_owned(),
                        ),
                    ));
                },
                _ => {},
            }
        }
        Ok(text)
    }
}

/// Find an attribute by local name and return its unescaped value.
pub fn attr(e: &BytesStart<'_>, local_name: &[u8]) -> quick_xml::Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// All attributes of an element as (qualified name, unescaped value).
pub fn attrs(e: &BytesStart<'_>) -> quick_xml::Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        out.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(out)
}

/// Local name of an element as an owned string.
#[inline]
pub fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}
