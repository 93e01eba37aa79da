/// Word package → delta conversion.
///
/// Each inline child of a paragraph becomes one op. A heading style or a
/// list numbering on the paragraph is emitted as a block marker after the
/// paragraph's last op.
use super::config::ConvertOptions;
use super::op::{Delta, Op};
use super::traits::ToDelta;
use crate::common::{Error, Result};
use crate::ooxml::docx::numbering::Numbering;
use crate::ooxml::docx::types::StyleKind;
use crate::ooxml::docx::{BodyChild, Hyperlink, Package, Paragraph, ParagraphChild, Run};
use crate::ooxml::opc::Relationships;
use tracing::{debug, warn};

impl ToDelta for Package {
    fn to_delta_with_options(&mut self, options: &ConvertOptions) -> Result<Delta> {
        self.set_media_prefix(&options.media_prefix);

        // Family normalization is applied to a working copy and stored back
        // once the whole body converted.
        let mut numbering = self.numbering().clone();
        let mut ops = Vec::with_capacity(self.document().body().len() * 2);

        for (index, child) in self.document().body().iter().enumerate() {
            let paragraph = match child {
                BodyChild::Paragraph(p) => p,
                BodyChild::Unsupported { tag, .. } => {
                    return Err(Error::UnsupportedContent {
                        index,
                        kind: format!("<{}>", tag),
                    });
                },
            };

            let marker = self.block_marker(paragraph, &mut numbering);
            let children = paragraph.children();
            for (child_index, child) in children.iter().enumerate() {
                let op = match child {
                    ParagraphChild::Run(run) => run_op(run, index, child_index)?,
                    ParagraphChild::Hyperlink(link) => {
                        hyperlink_op(link, self.doc_rels(), index, child_index)?
                    },
                    ParagraphChild::Unsupported { tag, .. } => {
                        return Err(unsupported(tag, index, child_index));
                    },
                };
                ops.push(op);
            }
            if !children.is_empty() {
                ops.extend(marker);
            }
        }

        debug!(ops = ops.len(), media = self.image_count(), "converted package to delta");

        *self.numbering_mut() = numbering;
        Ok(Delta { ops })
    }
}

impl Package {
    /// The marker a paragraph ends with, if it is a heading or list item.
    ///
    /// A list numbering replaces a heading marker. Resolving a list level
    /// rewrites its whole family to that level's list kind.
    fn block_marker(&self, paragraph: &Paragraph, numbering: &mut Numbering) -> Option<Op> {
        let mut marker = paragraph
            .style_id()
            .and_then(|id| self.styles().get_by_id(id, Some(StyleKind::Paragraph)))
            .and_then(|style| style.heading_level())
            .map(|level| Op::text("\n").with_attr("header", level));

        if let Some(num) = paragraph.numbering() {
            let ordered = numbering
                .resolve_level(num.num_id, num.ilvl)
                .map(|level| level.is_ordered());
            let family_id = numbering.instance(num.num_id).map(|n| n.family_id());
            match (ordered, family_id) {
                (Some(ordered), Some(family_id)) => {
                    numbering.set_family_order(family_id, ordered);
                    marker = Some(
                        Op::text("\n")
                            .with_attr("indent", num.ilvl)
                            .with_attr("list", if ordered { "ordered" } else { "bullet" }),
                    );
                },
                _ => warn!(
                    num_id = num.num_id,
                    ilvl = num.ilvl,
                    "numbering reference does not resolve, paragraph kept plain"
                ),
            }
        }
        marker
    }
}

fn run_op(run: &Run, paragraph: usize, child: usize) -> Result<Op> {
    if let Some((_, tag)) = run.first_unsupported() {
        return Err(unsupported(tag, paragraph, child));
    }

    let mut op = Op::text(run.text());
    if let Some(props) = run.properties() {
        if props.is_bold() {
            op = op.with_attr("bold", true);
        }
        if props.is_italic() {
            op = op.with_attr("italic", true);
        }
        if props.is_underlined() {
            op = op.with_attr("underline", true);
        }
        if let Some(color) = props.color.as_deref().filter(|c| !c.eq_ignore_ascii_case("auto")) {
            op = op.with_attr("color", color);
        }
    }
    Ok(op.normalize())
}

fn hyperlink_op(
    link: &Hyperlink,
    rels: &Relationships,
    paragraph: usize,
    child: usize,
) -> Result<Op> {
    let target = match (link.r_id(), link.anchor()) {
        (Some(r_id), _) if !r_id.is_empty() => rels
            .get(r_id)
            .map(|rel| rel.target_ref().to_string())
            .ok_or_else(|| Error::UnresolvedRelationship {
                paragraph,
                child,
                r_id: r_id.to_string(),
            })?,
        (_, Some(anchor)) => format!("#{}", anchor),
        (r_id, None) => {
            return Err(Error::UnresolvedRelationship {
                paragraph,
                child,
                r_id: r_id.unwrap_or_default().to_string(),
            });
        },
    };
    Ok(run_op(link.run(), paragraph, child)?.with_attr("link", target))
}

fn unsupported(tag: &str, paragraph: usize, child: usize) -> Error {
    Error::UnsupportedContent {
        index: child,
        kind: format!("<{}> in paragraph {}", tag, paragraph),
    }
}
