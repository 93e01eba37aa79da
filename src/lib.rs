//! docx-delta - convert between delta documents and Word (.docx) packages
//!
//! A delta is a flat, ordered list of insert operations carrying optional
//! formatting attributes; a .docx file is a zip of XML parts linked by
//! relationships. This crate maps one onto the other and implements the
//! part of the WordprocessingML object model the mapping needs.
//!
//! # Features
//!
//! - **Delta → DOCX**: headings, bullet/ordered lists with nine indent levels,
//!   hyperlinks, bold/italic/underline/color runs
//! - **DOCX → Delta**: the reverse mapping, with list families normalized to
//!   one list kind
//! - **Lossless repacking**: parts the object model does not cover are
//!   written back byte-for-byte
//!
//! # Example - Delta to DOCX and back
//!
//! ```no_run
//! use docx_delta::delta::{ConvertOptions, Delta, ToDelta, ToDocx};
//! use docx_delta::ooxml::docx::Package;
//!
//! # fn main() -> Result<(), docx_delta::Error> {
//! let delta = Delta::from_json(br#"{"ops":[{"insert":"Gandalf","attributes":{"bold":true}}]}"#)?;
//! delta.to_docx()?.save("gandalf.docx")?;
//!
//! let mut package = Package::open("gandalf.docx")?;
//! let back = package.to_delta_with_options(&ConvertOptions::default())?;
//! println!("{}", String::from_utf8_lossy(&back.to_json()?));
//! # Ok(())
//! # }
//! ```

/// Error types and XML helpers shared across the crate
pub mod common;

/// Delta model and the two conversion directions
pub mod delta;

/// OOXML (Office Open XML) package and word-processing object model
pub mod ooxml;

/// File-level save/load entry points
pub mod service;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use delta::{ConvertOptions, Delta, Op, ToDelta, ToDocx};
pub use ooxml::docx::Package;
