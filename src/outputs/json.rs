//! JSON cache file output.
//!
//! The whole ordered collection is written as one compact JSON array. The
//! bytes go to a sibling temporary file first and are renamed over the
//! destination, so readers only ever see the previous file or the complete
//! new one.

use crate::error::PubsError;
use crate::models::NormalizedRecord;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

/// Serialize records, newest first, as the output document.
pub fn render_publications(
    records: Vec<NormalizedRecord>,
    emit_timestamp: bool,
) -> Result<String, PubsError> {
    let objects: Vec<_> = records
        .into_iter()
        .map(|r| r.into_output(emit_timestamp))
        .collect();
    Ok(serde_json::to_string(&objects)?)
}

/// Replace `path` with `contents`.
///
/// Creates the parent directory when missing. On failure the temporary file
/// is removed and `path` is left as it was.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_publications(path: &Path, contents: &str) -> Result<(), PubsError> {
    let write_err = |source: std::io::Error| PubsError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_and_sync(&tmp, contents).await {
        error!(tmp = %tmp.display(), error = %e, "Failed writing temporary output");
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        error!(tmp = %tmp.display(), error = %e, "Failed moving output into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }

    info!(bytes = contents.len(), "Wrote publications file");
    Ok(())
}

async fn write_and_sync(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await
}

/// `dir/publications.json` -> `dir/.publications.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "publications.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublicationRecord;
    use serde_json::json;
    use tempfile::tempdir;

    fn normalized(title: &str, date: &str, sort_key: Option<i64>) -> NormalizedRecord {
        NormalizedRecord {
            record: PublicationRecord(
                json!({"title": title, "date": date}).as_object().unwrap().clone(),
            ),
            sort_key,
        }
    }

    #[test]
    fn test_render_is_compact_array() {
        let records = vec![
            normalized("B", "2021-06-15T00:00:00.000Z", Some(1623715200000)),
            normalized("A", "2020-01-01T00:00:00.000Z", Some(1577836800000)),
        ];
        let out = render_publications(records, false).unwrap();
        assert_eq!(
            out,
            r#"[{"title":"B","date":"2021-06-15T00:00:00.000Z"},{"title":"A","date":"2020-01-01T00:00:00.000Z"}]"#
        );
    }

    #[test]
    fn test_render_with_timestamp() {
        let out = render_publications(vec![normalized("A", "odd", None)], true).unwrap();
        assert_eq!(out, r#"[{"title":"A","date":"odd","timestamp":null}]"#);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_publications(Vec::new(), false).unwrap(), "[]");
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path(Path::new("/site/_data/publications.json")),
            PathBuf::from("/site/_data/.publications.json.tmp")
        );
    }

    #[tokio::test]
    async fn test_write_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("publications.json");
        std::fs::write(&path, "[\"a much longer previous document\"]").unwrap();

        write_publications(&path, "[]").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(!dir.path().join(".publications.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("_data").join("publications.json");

        write_publications(&path, "[1]").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1]");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let dir = tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("publications.json");

        let err = write_publications(&path, "[]").await.unwrap_err();
        assert!(matches!(err, PubsError::Write { .. }));
    }
}
