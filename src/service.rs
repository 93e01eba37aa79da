/// File-level entry points for a host application.
///
/// Each call owns one package from start to end. Callers that may touch the
/// same file concurrently must serialize those calls themselves.
use crate::common::Result;
use crate::delta::{ConvertOptions, Delta, ToDelta, ToDocx};
use crate::ooxml::docx::Package;
use std::path::Path;
use tracing::info;

/// Convert delta JSON and write it as a .docx file at `path`.
///
/// # Examples
///
/// ```rust,no_run
/// use docx_delta::delta::ConvertOptions;
/// use docx_delta::service::save_delta;
///
/// save_delta(br#"{"ops":[{"insert":"hello"}]}"#, "hello.docx", &ConvertOptions::default())?;
/// # Ok::<(), docx_delta::Error>(())
/// ```
pub fn save_delta<P: AsRef<Path>>(delta_json: &[u8], path: P, options: &ConvertOptions) -> Result<()> {
    let delta = Delta::from_json(delta_json)?;
    let package = delta.to_docx_with_options(options)?;
    package.save(path.as_ref())?;
    info!(path = %path.as_ref().display(), ops = delta.len(), "saved delta as docx");
    Ok(())
}

/// Read the .docx file at `path` and return its content as delta JSON.
pub fn load_delta<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Vec<u8>> {
    let mut package = Package::open(path.as_ref())?;
    let delta = package.to_delta_with_options(options)?;
    info!(path = %path.as_ref().display(), ops = delta.len(), "loaded docx as delta");
    delta.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.docx");
        let json = br#"{"ops":[{"insert":"hello","attributes":{"bold":true}},{"insert":"world"}]}"#;

        save_delta(json, &path, &ConvertOptions::default()).unwrap();
        let loaded = load_delta(&path, &ConvertOptions::default()).unwrap();
        assert_eq!(
            Delta::from_json(&loaded).unwrap(),
            Delta::from_json(json).unwrap()
        );
    }

    #[test]
    fn test_bad_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_delta(b"{not json", dir.path().join("x.docx"), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_delta(dir.path().join("absent.docx"), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
