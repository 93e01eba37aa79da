/// Delta → Word package conversion.
///
/// Ops are scanned left to right. An op followed by a block marker (a
/// newline carrying `header`, `list` or `indent`) is consumed together with
/// it and the marker decides the paragraph kind; every other op becomes a
/// plain paragraph of its own.
use super::config::ConvertOptions;
use super::op::{Delta, Op};
use super::traits::ToDocx;
use crate::common::{Error, Result};
use crate::ooxml::docx::numbering::LEVEL_COUNT;
use crate::ooxml::docx::types::{HexColor, Underline};
use crate::ooxml::docx::{Hyperlink, Package, Paragraph, Run};
use serde_json::Value;
use tracing::{debug, trace};

/// List kind named by a marker's `list` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Bullet,
}

impl ListKind {
    #[inline]
    fn is_ordered(self) -> bool {
        self == ListKind::Ordered
    }
}

impl ToDocx for Delta {
    fn to_docx_with_options(&self, options: &ConvertOptions) -> Result<Package> {
        let mut package = Package::new()?;
        package.set_media_prefix(&options.media_prefix);
        package.numbering_mut().clear();
        package.numbering_mut().set_list_style(options.list_style());
        package.document_mut().clear_body();

        let mut converter = Converter {
            package: &mut package,
            options,
            target_family: 1,
        };

        let mut i = 0;
        while i < self.ops.len() {
            let op = &self.ops[i];
            let marker = self.ops.get(i + 1).filter(|next| next.is_block_marker());

            // A content op opening with a newline starts a new list group.
            if marker.is_some_and(Op::is_list_marker)
                && op.insert.len() > 1
                && op.insert.starts_with('\n')
            {
                converter.target_family += 1;
            }

            converter.convert(i, op, marker)?;
            i += if marker.is_some() { 2 } else { 1 };
        }

        debug!(
            ops = self.ops.len(),
            paragraphs = package.document().body().len(),
            families = package.numbering().family_count(),
            "converted delta to package"
        );
        Ok(package)
    }
}

struct Converter<'a> {
    package: &'a mut Package,
    options: &'a ConvertOptions,
    /// Family id the next list paragraph joins
    target_family: u32,
}

impl Converter<'_> {
    fn convert(&mut self, index: usize, op: &Op, marker: Option<&Op>) -> Result<()> {
        let para_id = self.package.next_para_id();
        let mut paragraph = Paragraph::new(Some(para_id));

        if let Some(marker) = marker {
            self.apply_marker(&mut paragraph, index + 1, marker)?;
        }
        self.append_content(&mut paragraph, op);

        self.package.document_mut().push_paragraph(paragraph);
        Ok(())
    }

    /// Give the paragraph a heading style or a list numbering.
    ///
    /// A valid `header` wins; the list attributes are then ignored.
    fn apply_marker(&mut self, paragraph: &mut Paragraph, index: usize, marker: &Op) -> Result<()> {
        if let Some(level) = marker.attr("header").and_then(as_integer) {
            if (1..10).contains(&level) {
                paragraph.set_style(&format!("Heading{}", level));
                return Ok(());
            }
            trace!(index, level, "header level out of range, ignored");
        }

        let Some(kind) = list_kind(index, marker)? else {
            return Ok(());
        };
        let indent = list_indent(index, marker)?;

        let numbering = self.package.numbering_mut();
        while numbering.family_count() < self.target_family as usize {
            numbering.new_family(kind.is_ordered());
        }
        paragraph.set_numbering(self.target_family, indent);
        Ok(())
    }

    /// Add the op's text as a run, or as a hyperlink when it carries `link`.
    fn append_content(&mut self, paragraph: &mut Paragraph, op: &Op) {
        match op.attr("link").and_then(Value::as_str) {
            Some(url) => {
                let r_id = self.package.add_hyperlink_relationship(url);
                let mut run = Run::with_text(&op.insert);
                run.style(&self.options.hyperlink_style);
                apply_inline(&mut run, op);
                paragraph.add_hyperlink(Hyperlink::new(r_id, run));
            },
            None => apply_inline(paragraph.add_run(&op.insert), op),
        }
    }
}

/// Map inline attributes onto run properties. Unknown attributes and
/// values of the wrong type are ignored.
fn apply_inline(run: &mut Run, op: &Op) {
    if is_true(op.attr("bold")) {
        run.bold(true);
    }
    if is_true(op.attr("italic")) {
        run.italic(true);
    }
    if is_true(op.attr("underline")) {
        run.underline(Underline::Single);
    }
    if let Some(color) = op.attr("color").and_then(Value::as_str) {
        match HexColor::parse(color) {
            Some(hex) => {
                run.color(hex.as_str());
            },
            None if !color.is_empty() => {
                trace!(color, "color is not a hex value, upper-casing as is");
                run.color(&color.trim_start_matches('#').to_ascii_uppercase());
            },
            None => {},
        }
    }
}

fn list_kind(index: usize, marker: &Op) -> Result<Option<ListKind>> {
    match marker.attr("list") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(kind)) if kind.is_empty() => Ok(None),
        Some(Value::String(kind)) if kind == "ordered" => Ok(Some(ListKind::Ordered)),
        Some(Value::String(kind)) if kind == "bullet" => Ok(Some(ListKind::Bullet)),
        Some(other) => Err(Error::InvalidAttributeValue {
            index,
            attribute: "list",
            value: value_text(other),
        }),
    }
}

fn list_indent(index: usize, marker: &Op) -> Result<u8> {
    let Some(value) = marker.attr("indent") else {
        return Ok(0);
    };
    as_integer(value)
        .filter(|level| (0..i64::from(LEVEL_COUNT)).contains(level))
        .and_then(|level| u8::try_from(level).ok())
        .ok_or_else(|| Error::InvalidAttributeValue {
            index,
            attribute: "indent",
            value: value_text(value),
        })
}

/// An integral JSON number, whether written `2` or `2.0`.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

#[inline]
fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::ParagraphChild;

    fn convert(ops: Vec<Op>) -> Result<Package> {
        ops.into_iter().collect::<Delta>().to_docx()
    }

    fn list_marker(kind: &str, indent: i64) -> Op {
        Op::text("\n").with_attr("list", kind).with_attr("indent", indent)
    }

    #[test]
    fn test_plain_ops_each_start_a_paragraph() {
        let pkg = convert(vec![Op::text("one"), Op::text("two")]).unwrap();
        let texts: Vec<String> = pkg.document().paragraphs().map(Paragraph::text).collect();
        assert_eq!(texts, ["one", "two"]);
    }

    #[test]
    fn test_heading() {
        let pkg = convert(vec![
            Op::text("Title"),
            Op::text("\n").with_attr("header", 1),
        ])
        .unwrap();
        let para = pkg.document().paragraphs().next().unwrap();
        assert_eq!(para.style_id(), Some("Heading1"));
        assert_eq!(para.text(), "Title");
        assert_eq!(pkg.document().body().len(), 1);
    }

    #[test]
    fn test_header_wins_over_list() {
        let pkg = convert(vec![
            Op::text("x"),
            Op::text("\n").with_attr("header", 3).with_attr("list", "bullet"),
        ])
        .unwrap();
        let para = pkg.document().paragraphs().next().unwrap();
        assert_eq!(para.style_id(), Some("Heading3"));
        assert!(para.numbering().is_none());
        assert!(pkg.numbering().is_empty());
    }

    #[test]
    fn test_out_of_range_header_is_plain() {
        let pkg = convert(vec![Op::text("x"), Op::text("\n").with_attr("header", 12)]).unwrap();
        let para = pkg.document().paragraphs().next().unwrap();
        assert_eq!(para.style_id(), None);
    }

    #[test]
    fn test_list_groups() {
        let pkg = convert(vec![
            Op::text("a"),
            list_marker("bullet", 0),
            Op::text("b"),
            list_marker("bullet", 1),
            Op::text("\nc"),
            list_marker("ordered", 0),
        ])
        .unwrap();
        let refs: Vec<_> = pkg
            .document()
            .paragraphs()
            .map(|p| p.numbering().unwrap())
            .collect();
        assert_eq!((refs[0].num_id, refs[0].ilvl), (1, 0));
        assert_eq!((refs[1].num_id, refs[1].ilvl), (1, 1));
        assert_eq!((refs[2].num_id, refs[2].ilvl), (2, 0));
        assert_eq!(pkg.numbering().family_count(), 2);
        assert!(!pkg.numbering().resolve_level(1, 0).unwrap().is_ordered());
        assert!(pkg.numbering().resolve_level(2, 0).unwrap().is_ordered());
    }

    #[test]
    fn test_indent_bounds() {
        for indent in [0, 8] {
            assert!(convert(vec![Op::text("a"), list_marker("ordered", indent)]).is_ok());
        }
        for indent in [-1, 9] {
            let err = convert(vec![Op::text("a"), list_marker("ordered", indent)]).unwrap_err();
            match err {
                Error::InvalidAttributeValue { index, attribute, .. } => {
                    assert_eq!(index, 1);
                    assert_eq!(attribute, "indent");
                },
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_list_kind() {
        let err = convert(vec![Op::text("a"), Op::text("\n").with_attr("list", "checked")])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAttributeValue { attribute: "list", .. }));
    }

    #[test]
    fn test_inline_attributes() {
        let pkg = convert(vec![
            Op::text("styled")
                .with_attr("bold", true)
                .with_attr("italic", true)
                .with_attr("underline", true)
                .with_attr("color", "#ff00aa")
                .with_attr("font", "ignored"),
        ])
        .unwrap();
        let para = pkg.document().paragraphs().next().unwrap();
        let ParagraphChild::Run(run) = &para.children()[0] else {
            panic!("expected a run");
        };
        let props = run.properties().unwrap();
        assert!(props.is_bold() && props.is_italic() && props.is_underlined());
        assert_eq!(props.color.as_deref(), Some("FF00AA"));
    }

    #[test]
    fn test_link() {
        let pkg = convert(vec![Op::text("docs").with_attr("link", "https://example.com")]).unwrap();
        let para = pkg.document().paragraphs().next().unwrap();
        let ParagraphChild::Hyperlink(link) = &para.children()[0] else {
            panic!("expected a hyperlink");
        };
        let rel = pkg.doc_rels().get(link.r_id().unwrap()).unwrap();
        assert_eq!(rel.target_ref(), "https://example.com");
        assert!(rel.is_external());
        assert_eq!(
            link.run().properties().unwrap().style.as_deref(),
            Some("Hyperlink")
        );
    }

    #[test]
    fn test_marker_without_content_is_paired_with_previous() {
        // "\n" with header after another marker is itself a content op
        let pkg = convert(vec![
            Op::text("\n").with_attr("header", 1),
            Op::text("\n").with_attr("header", 2),
        ])
        .unwrap();
        let para = pkg.document().paragraphs().next().unwrap();
        assert_eq!(para.style_id(), Some("Heading2"));
        assert_eq!(pkg.document().body().len(), 1);
    }
}
