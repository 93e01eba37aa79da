//! Conversion between delta documents and Word packages.
//!
//! A delta is a flat list of insert operations with optional formatting
//! attributes. Paragraph formatting travels on a trailing newline op (a
//! block marker) that describes the content before it.
//!
//! # Quick Start
//!
//! ```rust
//! use docx_delta::delta::{Delta, ToDelta, ToDocx};
//!
//! # fn main() -> Result<(), docx_delta::Error> {
//! let delta = Delta::from_json(br#"{"ops":[
//!     {"insert":"Shopping"},{"insert":"\n","attributes":{"header":2}},
//!     {"insert":"milk"},{"insert":"\n","attributes":{"list":"bullet"}}
//! ]}"#)?;
//!
//! let mut package = delta.to_docx()?;
//! let back = package.to_delta()?;
//! assert_eq!(back.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`Delta`] / [`Op`]: the wire model
//! - [`ToDocx`] / [`ToDelta`]: the two conversion directions
//! - [`ConvertOptions`]: hyperlink style and list level templates

pub mod config;
mod from_docx;
pub mod op;
mod to_docx;
pub mod traits;

pub use config::ConvertOptions;
pub use op::{Attributes, Delta, Op};
pub use traits::{ToDelta, ToDocx};
