//! Error conversion implementations.
//!
//! From trait implementations folding the package-layer errors into the
//! unified [`Error`].

use super::types::Error;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::error::OpcError;

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        match err {
            OpcError::IoError(e) => Error::Io(e),
            other => Error::MalformedArchive(other.to_string()),
        }
    }
}

impl From<OoxmlError> for Error {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Opc(e) => Error::from(e),
            OoxmlError::Io(e) => Error::Io(e),
            OoxmlError::UnsupportedContent { index, tag } => Error::UnsupportedContent {
                index,
                kind: format!("<{}>", tag),
            },
            OoxmlError::FamilyNotFound(id) => Error::FamilyNotFound(id),
            OoxmlError::Xml(s)
            | OoxmlError::PartNotFound(s)
            | OoxmlError::InvalidRelationship(s)
            | OoxmlError::InvalidFormat(s) => Error::MalformedArchive(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_part_is_malformed_archive() {
        let err: Error = OoxmlError::PartNotFound("word/document.xml".to_string()).into();
        assert!(matches!(err, Error::MalformedArchive(_)));
    }

    #[test]
    fn test_unsupported_content_keeps_index() {
        let err: Error = OoxmlError::UnsupportedContent {
            index: 3,
            tag: "tbl".to_string(),
        }
        .into();
        match err {
            Error::UnsupportedContent { index, kind } => {
                assert_eq!(index, 3);
                assert_eq!(kind, "<tbl>");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
