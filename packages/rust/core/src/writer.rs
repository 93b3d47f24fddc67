//! Persist the assembled document.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use clinerules_shared::{ClineRulesError, Result};

/// Metadata about a written document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Destination that was (over)written.
    pub path: PathBuf,
    /// Size of the document in bytes.
    pub bytes: usize,
    /// Hex SHA-256 of the document.
    pub sha256: String,
}

/// Write `content` to `destination`, replacing any existing file.
///
/// The document goes to a sibling temp file first and is renamed into place,
/// so readers never observe a partial file. No backup is kept.
///
/// A symlinked destination is written through: the link stays and its target
/// is replaced. An existing file keeps its permissions; a new one gets the
/// process defaults.
#[instrument(skip(content), fields(destination = %destination.display(), len = content.len()))]
pub async fn write_document(destination: &Path, content: &str) -> Result<WriteReport> {
    let target = resolve_target(destination).await;
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ClineRulesError::validation(format!(
                "destination {} has no file name",
                destination.display()
            ))
        })?;
    let temp = target.with_file_name(format!(".{name}.tmp"));

    let write_err = |source: std::io::Error| ClineRulesError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let permissions = tokio::fs::metadata(&target)
        .await
        .ok()
        .map(|meta| meta.permissions());

    let staged = async {
        tokio::fs::write(&temp, content).await?;
        if let Some(permissions) = permissions {
            tokio::fs::set_permissions(&temp, permissions).await?;
        }
        tokio::fs::rename(&temp, &target).await
    };
    if let Err(source) = staged.await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(write_err(source));
    }

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    debug!(temp = %temp.display(), target = %target.display(), "temp file renamed into place");
    info!(bytes = content.len(), %sha256, "document written");

    Ok(WriteReport {
        path: destination.to_path_buf(),
        bytes: content.len(),
        sha256,
    })
}

/// The file a write to `destination` should replace: the link target when
/// `destination` is a symlink, else `destination` itself.
async fn resolve_target(destination: &Path) -> PathBuf {
    let is_link = tokio::fs::symlink_metadata(destination)
        .await
        .is_ok_and(|meta| meta.file_type().is_symlink());
    if !is_link {
        return destination.to_path_buf();
    }

    if let Ok(resolved) = tokio::fs::canonicalize(destination).await {
        return resolved;
    }
    // Dangling link: create the file it points at.
    match tokio::fs::read_link(destination).await {
        Ok(link) => match destination.parent() {
            Some(parent) => parent.join(link),
            None => link,
        },
        Err(_) => destination.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "clinerules-writer-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn writes_and_reports_checksum() {
        let tmp = temp_dir();
        let dest = tmp.join(".clinerules");

        let report = write_document(&dest, "# T\n\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "# T\n\n");
        assert_eq!(report.bytes, 5);
        assert_eq!(report.sha256.len(), 64);
        assert_eq!(report.path, dest);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn overwrites_existing_file_without_leftovers() {
        let tmp = temp_dir();
        let dest = tmp.join(".clinerules");
        std::fs::write(&dest, "old content that is longer").unwrap();

        write_document(&dest, "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");

        let names: Vec<String> = std::fs::read_dir(&tmp)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![".clinerules"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn missing_parent_is_write_error() {
        let tmp = temp_dir();
        let dest = tmp.join("no-such-dir").join(".clinerules");

        let err = write_document(&dest, "x").await.unwrap_err();
        assert!(matches!(err, ClineRulesError::Write { .. }));
        assert!(!err.is_fatal());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_destination_is_written_through() {
        let tmp = temp_dir();
        let real = tmp.join("shared-rules.md");
        std::fs::write(&real, "old").unwrap();
        let dest = tmp.join(".clinerules");
        std::os::unix::fs::symlink(&real, &dest).unwrap();

        write_document(&dest, "new").await.unwrap();

        assert!(std::fs::symlink_metadata(&dest).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "new");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn existing_permissions_are_kept() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = temp_dir();
        let dest = tmp.join(".clinerules");
        std::fs::write(&dest, "old").unwrap();
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_document(&dest, "new").await.unwrap();

        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
