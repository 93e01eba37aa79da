//! Unified error type for conversions.
//!
//! Every public entry point of the crate reports one of these variants. The
//! lower layers (`OpcError`, `OoxmlError`) are folded in by the conversions
//! in [`super::conversions`].
use thiserror::Error;

/// Main error type for delta/package conversions.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid zip, missing load-bearing part, or an unparsable required part
    #[error("Malformed archive: {0}")]
    MalformedArchive(String),

    /// A body, paragraph or run child the converter cannot represent
    #[error("Unsupported content at index {index}: {kind}")]
    UnsupportedContent { index: usize, kind: String },

    /// Out-of-range or unrecognized attribute value on a delta op
    #[error("Invalid value for attribute '{attribute}' on op {index}: {value}")]
    InvalidAttributeValue {
        index: usize,
        attribute: &'static str,
        value: String,
    },

    /// Hyperlink whose relationship id has no matching entry
    #[error("Unresolved relationship '{r_id}' (paragraph {paragraph}, child {child})")]
    UnresolvedRelationship {
        paragraph: usize,
        child: usize,
        r_id: String,
    },

    /// Lookup of a numbering family that does not exist
    #[error("Numbering family {0} not found")]
    FamilyNotFound(u32),

    /// Delta wire format error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Options file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
