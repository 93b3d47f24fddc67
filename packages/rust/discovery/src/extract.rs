//! Per-fragment metadata extraction with failure isolation.

use std::path::Path;

use clinerules_markdown::FrontMatterParser;
use clinerules_shared::{ClineRulesError, Fragment, FragmentMeta, FragmentRef};
use tracing::{debug, warn};

/// Result of extracting one fragment.
#[derive(Debug)]
pub enum ExtractOutcome {
    /// Read and parsed normally.
    Parsed(Fragment),
    /// Read or parse failed; the fragment carries defaults and an empty body.
    Degraded {
        fragment: Fragment,
        error: ClineRulesError,
    },
}

impl ExtractOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn into_fragment(self) -> Fragment {
        match self {
            Self::Parsed(fragment) | Self::Degraded { fragment, .. } => fragment,
        }
    }
}

/// Turn the raw read result of `file` into a fragment.
///
/// Both read and front-matter failures are logged at `warn` and degrade to
/// `body = ""` with default metadata.
pub fn extract_fragment(
    id: FragmentRef,
    file: &str,
    path: &Path,
    text: std::io::Result<String>,
    extension: &str,
    parser: &dyn FrontMatterParser,
) -> ExtractOutcome {
    let parsed = text
        .map_err(|source| ClineRulesError::FragmentRead {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|text| parser.parse(&text));

    match parsed {
        Ok(doc) => {
            let meta = FragmentMeta::from_data(file, extension, &doc.data);
            debug!(
                %file,
                title = %meta.title,
                category = %meta.category,
                order = meta.order,
                "fragment parsed"
            );
            ExtractOutcome::Parsed(Fragment {
                id,
                file: file.to_string(),
                meta,
                body: doc.body,
            })
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "could not load fragment, continuing without it");
            ExtractOutcome::Degraded {
                fragment: Fragment {
                    id,
                    file: file.to_string(),
                    meta: FragmentMeta::defaults_for(file, extension),
                    body: String::new(),
                },
                error,
            }
        }
    }
}
