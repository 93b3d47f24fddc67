//! Fragment discovery: list the rule directory and load each fragment.
//!
//! Listing failure is fatal ([`ClineRulesError::DirectoryNotFound`]). Reading
//! or parsing an individual fragment never is: the fragment degrades to an
//! empty body with default metadata and the run continues.

mod extract;

use std::path::Path;

use clinerules_markdown::FrontMatterParser;
use clinerules_shared::{ClineRulesError, Fragment, FragmentRef, Result};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

pub use extract::{ExtractOutcome, extract_fragment};

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// List fragment file names directly inside `dir`.
///
/// Only names ending in `.<extension>` are kept; subdirectories are neither
/// listed nor descended into. Names are returned sorted so discovery order
/// does not depend on the filesystem.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub async fn list_fragments(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let suffix = format!(".{extension}");

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|source| ClineRulesError::DirectoryNotFound {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(source) => {
                return Err(ClineRulesError::DirectoryNotFound {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let Ok(name) = entry.file_name().into_string() else {
            warn!(name = ?entry.file_name(), "skipping non UTF-8 file name");
            continue;
        };
        if !name.ends_with(&suffix) {
            continue;
        }
        if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
            debug!(%name, "skipping directory with fragment extension");
            continue;
        }
        files.push(name);
    }

    files.sort();
    info!(count = files.len(), "fragments discovered");
    Ok(files)
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Read and parse every fragment in `files`, concurrently.
///
/// The returned fragments are in the order of `files`, with
/// [`FragmentRef`] set to that position. Bytes that are not valid UTF-8 are
/// replaced, not rejected. Per-fragment failures are logged and produce a
/// degraded fragment.
#[instrument(skip_all, fields(dir = %dir.display(), count = files.len()))]
pub async fn load_fragments(
    dir: &Path,
    files: &[String],
    extension: &str,
    parser: &dyn FrontMatterParser,
) -> Vec<Fragment> {
    let mut reads = JoinSet::new();
    for (idx, file) in files.iter().enumerate() {
        let path = dir.join(file);
        reads.spawn(async move {
            // Invalid UTF-8 becomes U+FFFD instead of failing the fragment.
            let result = tokio::fs::read(&path)
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
            (idx, result)
        });
    }

    let mut texts: Vec<Option<std::io::Result<String>>> = files.iter().map(|_| None).collect();
    while let Some(joined) = reads.join_next().await {
        match joined {
            Ok((idx, result)) => texts[idx] = Some(result),
            Err(e) => warn!(error = %e, "fragment read task failed"),
        }
    }

    let mut fragments = Vec::with_capacity(files.len());
    let mut degraded = 0usize;
    for (idx, (file, text)) in files.iter().zip(texts).enumerate() {
        let path = dir.join(file);
        let text = text.unwrap_or_else(|| Err(std::io::Error::other("read task did not complete")));
        let outcome = extract_fragment(FragmentRef(idx), file, &path, text, extension, parser);
        if outcome.is_degraded() {
            degraded += 1;
        }
        fragments.push(outcome.into_fragment());
    }

    info!(
        loaded = fragments.len(),
        degraded,
        "fragments loaded"
    );

    fragments
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clinerules_markdown::YamlFrontMatter;
    use clinerules_shared::{DEFAULT_CATEGORY, DEFAULT_ORDER};

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "clinerules-discovery-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn lists_only_markdown_files_sorted() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("b.md"), "b").unwrap();
        std::fs::write(tmp.join("a.md"), "a").unwrap();
        std::fs::write(tmp.join("notes.txt"), "x").unwrap();
        std::fs::write(tmp.join("md"), "x").unwrap();
        std::fs::create_dir_all(tmp.join("nested.md")).unwrap();
        std::fs::create_dir_all(tmp.join("sub")).unwrap();
        std::fs::write(tmp.join("sub/c.md"), "c").unwrap();

        let files = list_fragments(&tmp, "md").await.unwrap();
        assert_eq!(files, vec!["a.md", "b.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn missing_directory_is_directory_not_found() {
        let tmp = temp_dir();
        let err = list_fragments(&tmp.join("absent"), "md").await.unwrap_err();
        assert!(matches!(err, ClineRulesError::DirectoryNotFound { .. }));
        assert!(err.is_fatal());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn loads_fragments_in_file_order() {
        let tmp = temp_dir();
        std::fs::write(
            tmp.join("a.md"),
            "---\ntitle: A\ncategory: api\norder: 2\n---\nAlpha\n",
        )
        .unwrap();
        std::fs::write(tmp.join("b.md"), "Beta\n").unwrap();

        let files = vec!["a.md".to_string(), "b.md".to_string()];
        let fragments = load_fragments(&tmp, &files, "md", &YamlFrontMatter).await;

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].id, FragmentRef(0));
        assert_eq!(fragments[0].meta.title, "A");
        assert_eq!(fragments[0].body, "Alpha\n");
        assert_eq!(fragments[1].id, FragmentRef(1));
        assert_eq!(fragments[1].meta.title, "b");
        assert_eq!(fragments[1].meta.category, DEFAULT_CATEGORY);
        assert_eq!(fragments[1].body, "Beta\n");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_degraded() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), b"---\ncategory: api\n---\nCaf\xe9 rules\n").unwrap();

        let files = list_fragments(&tmp, "md").await.unwrap();
        let fragments = load_fragments(&tmp, &files, "md", &YamlFrontMatter).await;

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].meta.category, "api");
        assert_eq!(fragments[0].body, "Caf\u{fffd} rules\n");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn unreadable_fragment_degrades_without_stopping() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("good.md"), "Good\n").unwrap();
        // Listed but vanished before the read.
        let files = vec!["gone.md".to_string(), "good.md".to_string()];

        let fragments = load_fragments(&tmp, &files, "md", &YamlFrontMatter).await;

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].body, "");
        assert_eq!(fragments[0].meta.title, "gone");
        assert_eq!(fragments[0].meta.order, DEFAULT_ORDER);
        assert_eq!(fragments[1].body, "Good\n");

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
