//! XML helpers shared by the package parts.
mod escape;
mod reader;

pub use escape::{escape_xml, resolve_entity};
pub use reader::{XmlCursor, attr, attrs, local_name};
