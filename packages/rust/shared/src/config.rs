//! Application configuration for the llms.txt generator.
//!
//! User config lives at `~/.llmstxt/llmstxt.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LlmsTxtError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "llmstxt.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".llmstxt";

// ---------------------------------------------------------------------------
// Config structs (matching llmstxt.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where artifacts and the generation registry are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Periodic regeneration.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// HTTP serving.
    #[serde(default)]
    pub server: ServerConfig,

    /// Site content source.
    #[serde(default)]
    pub source: SourceConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Artifact directory holding `llms-<slug>.txt` files.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Registry file name, relative to `dir` unless absolute.
    #[serde(default = "default_registry_file")]
    pub registry_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            registry_file: default_registry_file(),
        }
    }
}

impl OutputConfig {
    /// Resolved artifact directory (with `~` expanded).
    pub fn dir_path(&self) -> PathBuf {
        expand_home(&self.dir)
    }

    /// Resolved registry file path.
    pub fn registry_path(&self) -> PathBuf {
        let file = expand_home(&self.registry_file);
        if file.is_absolute() {
            file
        } else {
            self.dir_path().join(file)
        }
    }
}

fn default_output_dir() -> String {
    "~/llmstxt/llms-txt".into()
}
fn default_registry_file() -> String {
    "registry.json".into()
}

/// How often scheduled regeneration runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    /// Interval between two scheduled runs.
    pub fn period(self) -> Duration {
        match self {
            Self::Daily => Duration::from_secs(24 * 60 * 60),
            Self::Weekly => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => f.write_str("daily"),
            Self::Weekly => f.write_str("weekly"),
        }
    }
}

/// `[schedule]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Regeneration frequency.
    #[serde(default)]
    pub frequency: Frequency,

    /// Whether `serve` runs the background regeneration loop.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::default(),
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:8080`.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".into()
}

/// `[source]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to a site snapshot JSON export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.llmstxt/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| LlmsTxtError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.llmstxt/llmstxt.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| LlmsTxtError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LlmsTxtError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LlmsTxtError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LlmsTxtError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LlmsTxtError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
