use crate::Result;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Write a downloaded document to `path`, creating its directory as needed.
///
/// The body is written to a sibling `.part` file first and renamed into place,
/// so an interrupted run never leaves a truncated file that a later run would
/// mistake for a cached copy.
pub(crate) async fn write_document(path: &Path, body: &[u8]) -> Result<()> {
    if let Some(dir_path) = path.parent() {
        trace!("checking directory path: {:?}", dir_path);
        tokio::fs::create_dir_all(dir_path).await?;
    }

    let partial = partial_path(path);
    tokio::fs::write(&partial, body).await?;
    tokio::fs::rename(&partial, path).await?;
    trace!("{} bytes written to {:?}", body.len(), path);

    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Reads a `.json` file from `path`.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    trace!("reading file path: {path:?}");
    let file = tokio::fs::read(path).await?;
    trace!("file read; deserializing bytes ...");
    let data: T = serde_json::from_slice(&file)?;
    Ok(data)
}

/// The final component of `path` as text, used as a document's provenance.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_creates_directory_and_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("2401ut_ftr022.pdf");

        write_document(&path, b"%PDF-1.4").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn display_name_is_the_file_name() {
        assert_eq!(
            display_name(Path::new("pdfs/2401ut_ftr022.pdf")),
            "2401ut_ftr022.pdf"
        );
    }
}
