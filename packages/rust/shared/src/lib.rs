//! Shared types, error model, and configuration for the llms.txt generator.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`LlmsTxtError`], the unified error type
//! - Domain types ([`ContentItem`], [`RawMenuItem`], [`MenuEntry`], [`LanguageDocument`])
//! - Configuration ([`AppConfig`], [`Frequency`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Frequency, OutputConfig, ScheduleConfig, ServerConfig, SourceConfig, config_dir,
    config_file_path, expand_home, init_config, load_config, load_config_from,
};
pub use error::{LlmsTxtError, Result};
pub use types::{
    ContentId, ContentItem, ContentKind, LanguageDocument, MenuEntry, MenuId, MenuItemId,
    PostMeta, RawMenuItem,
};
