/// Open Packaging Conventions (OPC) implementation.
///
/// The container layer of a .docx file:
///
/// - Part names (`PackURI`)
/// - Relationship parts (`Relationships`)
/// - Content type mapping (`ContentTypes`)
/// - ZIP-based physical packaging (`PhysPkgReader`, `PhysPkgWriter`)
pub mod constants;
pub mod content_types;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypes;
pub use packuri::PackURI;
pub use phys_pkg::{PhysPkgReader, PhysPkgWriter};
pub use rel::{Relationship, Relationships};
