/// Word (.docx) document support.
///
/// This module provides the object model of a WordprocessingML package and
/// its unpack/repack.
///
/// # Architecture
///
/// The module is organized around these key types:
/// - `Package`: The overall .docx file package
/// - `Document`: The body of the main document part
/// - `Paragraph`: A paragraph with runs and hyperlinks
/// - `Run`: A text run with formatting
/// - `Numbering`: List families and the instances that reference them
/// - `StyleCatalog`: Styles looked up by id or name
///
/// # Example
///
/// ```rust,no_run
/// use docx_delta::ooxml::docx::Package;
///
/// let package = Package::open("document.docx")?;
///
/// for para in package.document().paragraphs() {
///     println!("Paragraph: {}", para.text());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod document;
pub mod hyperlink;
pub mod numbering;
pub mod package;
pub mod paragraph;
pub mod run;
pub mod styles;
pub mod template;
pub mod types;

pub use document::{BodyChild, Document, PageMargins, PageSize, SectionProperties};
pub use hyperlink::Hyperlink;
pub use numbering::{Family, Instance, Level, ListStyle, Numbering};
pub use package::Package;
pub use paragraph::{NumberingRef, Paragraph, ParagraphChild, ParagraphProperties};
pub use run::{Run, RunChild, RunProperties};
pub use styles::{Style, StyleCatalog};
