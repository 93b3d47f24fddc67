//! Shared types, error model, and configuration for the rules generator.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`ClineRulesError`]: the unified error type
//! - Domain types ([`Fragment`], [`FragmentMeta`], [`CategoryBucket`], [`FragmentRef`])
//! - Configuration ([`AppConfig`], [`GenerateConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CategoriesConfig, DefaultsConfig, FrontMatterKind, GenerateConfig,
    GenerateOverrides, config_dir, config_file_path, destination_for, init_config, load_config,
    load_config_from,
};
pub use error::{ClineRulesError, Result};
pub use types::{
    CategoryBucket, DEFAULT_CATEGORY, DEFAULT_CATEGORY_ORDER, DEFAULT_ORDER, FRAGMENT_EXTENSION,
    Fragment, FragmentMeta, FragmentRef, OUTPUT_FILE_NAME, capitalize, file_stem,
};
