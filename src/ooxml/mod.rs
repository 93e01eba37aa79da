//! Office Open XML (OOXML) word-processing packages.
//!
//! The implementation is based on the Open Packaging Conventions (OPC).
//!
//! # Architecture
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, content types, relationships)
//! 2. **Word Layer** (`docx`): The document object model and package unpack/repack
//!
//! # Example
//!
//! ```rust,no_run
//! use docx_delta::ooxml::docx::Package;
//!
//! let pkg = Package::open("document.docx")?;
//! println!("{} paragraphs", pkg.document().paragraphs().count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod docx;
pub mod error;
pub mod opc;

// Re-export commonly used types from OPC layer
pub use opc::PackURI;

// Re-export error types
pub use error::{OoxmlError, Result};
