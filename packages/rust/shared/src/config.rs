//! Application configuration for the rules generator.
//!
//! User config lives at `~/.clinerules/clinerules.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClineRulesError, Result};
use crate::types::{DEFAULT_CATEGORY_ORDER, FRAGMENT_EXTENSION, OUTPUT_FILE_NAME};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "clinerules.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".clinerules";

// ---------------------------------------------------------------------------
// Config structs (matching clinerules.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Category display settings.
    #[serde(default)]
    pub categories: CategoriesConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Fragment directory, relative to the working directory.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Output file name, placed in the parent of `source_dir`.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Title line of the assembled document.
    #[serde(default = "default_document_title")]
    pub document_title: String,

    /// Fragment file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Metadata block syntax.
    #[serde(default)]
    pub front_matter: FrontMatterKind,

    /// Ask for confirmation before writing.
    #[serde(default = "default_true")]
    pub confirm: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_file: default_output_file(),
            document_title: default_document_title(),
            extension: default_extension(),
            front_matter: FrontMatterKind::default(),
            confirm: true,
        }
    }
}

fn default_source_dir() -> String {
    "rules".into()
}
fn default_output_file() -> String {
    OUTPUT_FILE_NAME.into()
}
fn default_document_title() -> String {
    "Project Guidelines".into()
}
fn default_extension() -> String {
    FRAGMENT_EXTENSION.into()
}
fn default_true() -> bool {
    true
}

/// Which front-matter parser to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterKind {
    /// Full YAML via `serde_yaml`.
    #[default]
    Yaml,
    /// Line-based `key: value` parser.
    Minimal,
}

impl std::str::FromStr for FrontMatterKind {
    type Err = ClineRulesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" => Ok(Self::Yaml),
            "minimal" => Ok(Self::Minimal),
            other => Err(ClineRulesError::config(format!(
                "unknown front matter kind '{other}': expected 'yaml' or 'minimal'"
            ))),
        }
    }
}

/// `[categories]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Preferred category order in the selector.
    #[serde(default = "default_display_order")]
    pub display_order: Vec<String>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            display_order: default_display_order(),
        }
    }
}

fn default_display_order() -> Vec<String> {
    DEFAULT_CATEGORY_ORDER.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Generate config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration: explicit paths, no ambient process state.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory holding the fragment files.
    pub source_dir: PathBuf,
    /// Where the assembled document is written.
    pub destination: PathBuf,
    /// Title line of the assembled document.
    pub document_title: String,
    /// Fragment file extension, without the dot.
    pub extension: String,
    /// Preferred category order in the selector.
    pub category_order: Vec<String>,
    /// Ask the prompter for confirmation before writing.
    pub confirm: bool,
}

impl GenerateConfig {
    /// Resolve runtime config against a base directory (usually the CWD).
    ///
    /// The destination is `<parent of source_dir>/<output_file>`.
    pub fn resolve(config: &AppConfig, base_dir: &Path) -> Self {
        let source_dir = base_dir.join(&config.defaults.source_dir);
        Self::for_source(config, source_dir)
    }

    /// Build runtime config for an explicit fragment directory.
    pub fn for_source(config: &AppConfig, source_dir: PathBuf) -> Self {
        let destination = destination_for(&source_dir, &config.defaults.output_file);
        Self {
            source_dir,
            destination,
            document_title: config.defaults.document_title.clone(),
            extension: config.defaults.extension.clone(),
            category_order: config.categories.display_order.clone(),
            confirm: config.defaults.confirm,
        }
    }
}

/// Command-line overrides applied on top of the file config.
#[derive(Debug, Clone, Default)]
pub struct GenerateOverrides {
    /// Fragment directory (relative paths resolve against the base dir).
    pub source: Option<PathBuf>,
    /// Output file path.
    pub output: Option<PathBuf>,
    /// Document title line.
    pub title: Option<String>,
    /// Skip the confirmation step.
    pub skip_confirm: bool,
}

impl GenerateConfig {
    /// Resolve file config plus overrides against `base_dir`.
    ///
    /// An explicit source moves the default destination with it; an explicit
    /// output always wins.
    pub fn with_overrides(
        config: &AppConfig,
        base_dir: &Path,
        overrides: &GenerateOverrides,
    ) -> Self {
        let mut resolved = match &overrides.source {
            Some(source) => Self::for_source(config, base_dir.join(source)),
            None => Self::resolve(config, base_dir),
        };
        if let Some(output) = &overrides.output {
            resolved.destination = base_dir.join(output);
        }
        if let Some(title) = &overrides.title {
            resolved.document_title = title.clone();
        }
        if overrides.skip_confirm {
            resolved.confirm = false;
        }
        resolved
    }
}

/// Output path one directory above the fragment directory.
pub fn destination_for(source_dir: &Path, output_file: &str) -> PathBuf {
    match source_dir.parent() {
        Some(parent) => parent.join(output_file),
        None => source_dir.join("..").join(output_file),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.clinerules/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ClineRulesError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.clinerules/clinerules.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ClineRulesError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ClineRulesError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ClineRulesError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ClineRulesError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ClineRulesError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("source_dir"));
        assert!(toml_str.contains("display_order"));
        assert!(toml_str.contains("front_matter = \"yaml\""));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let toml_str = r#"
[defaults]
document_title = "Team Rules"
front_matter = "minimal"

[categories]
display_order = ["api", "testing"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.document_title, "Team Rules");
        assert_eq!(config.defaults.front_matter, FrontMatterKind::Minimal);
        assert_eq!(config.defaults.output_file, ".clinerules");
        assert!(config.defaults.confirm);
        assert_eq!(config.categories.display_order, vec!["api", "testing"]);
    }

    #[test]
    fn generate_config_places_output_above_source() {
        let app = AppConfig::default();
        let cfg = GenerateConfig::resolve(&app, Path::new("/work/project/.cline"));
        assert_eq!(cfg.source_dir, PathBuf::from("/work/project/.cline/rules"));
        assert_eq!(cfg.destination, PathBuf::from("/work/project/.cline/.clinerules"));
        assert_eq!(cfg.extension, "md");
        assert_eq!(cfg.category_order.len(), 5);
    }

    #[test]
    fn overrides_move_destination_with_source() {
        let app = AppConfig::default();
        let overrides = GenerateOverrides {
            source: Some(PathBuf::from(".cline/rules")),
            title: Some("Rules".into()),
            skip_confirm: true,
            ..Default::default()
        };
        let cfg = GenerateConfig::with_overrides(&app, Path::new("/repo"), &overrides);
        assert_eq!(cfg.source_dir, PathBuf::from("/repo/.cline/rules"));
        assert_eq!(cfg.destination, PathBuf::from("/repo/.cline/.clinerules"));
        assert_eq!(cfg.document_title, "Rules");
        assert!(!cfg.confirm);

        let overrides = GenerateOverrides {
            output: Some(PathBuf::from("/elsewhere/.clinerules")),
            ..Default::default()
        };
        let cfg = GenerateConfig::with_overrides(&app, Path::new("/repo"), &overrides);
        assert_eq!(cfg.destination, PathBuf::from("/elsewhere/.clinerules"));
        assert!(cfg.confirm);
    }

    #[test]
    fn destination_for_bare_relative_dir() {
        assert_eq!(
            destination_for(Path::new("rules"), ".clinerules"),
            PathBuf::from(".clinerules")
        );
    }

    #[test]
    fn front_matter_kind_parses() {
        assert_eq!("YAML".parse::<FrontMatterKind>().unwrap(), FrontMatterKind::Yaml);
        assert_eq!("minimal".parse::<FrontMatterKind>().unwrap(), FrontMatterKind::Minimal);
        assert!("toml".parse::<FrontMatterKind>().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ClineRulesError::Io { .. }));
    }
}
