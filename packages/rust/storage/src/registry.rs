//! Persisted record of when each language was last generated.
//!
//! The registry is an explicit object: load it once with
//! [`GenerationRegistry::load`], update entries as languages complete, and
//! call [`GenerationRegistry::save`] after each update.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use llmstxt_shared::{LlmsTxtError, Result};

use crate::{ArtifactMeta, write_atomic};

/// Last successful generation of one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<usize>,
}

/// On-disk layout of the registry file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    languages: BTreeMap<String, RegistryEntry>,
}

/// Language slug → last-generated record.
#[derive(Debug, Clone)]
pub struct GenerationRegistry {
    path: PathBuf,
    entries: BTreeMap<String, RegistryEntry>,
}

impl GenerationRegistry {
    /// Load the registry from `path`. A missing file yields an empty registry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: RegistryFile = serde_json::from_str(&content).map_err(|e| {
                    LlmsTxtError::Serialization(format!("invalid {}: {e}", path.display()))
                })?;
                file.languages
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no registry yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(LlmsTxtError::io(&path, e)),
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist all entries atomically.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LlmsTxtError::io(parent, e))?;
        }

        let file = RegistryFile {
            languages: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LlmsTxtError::Serialization(e.to_string()))?;

        write_atomic(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), languages = self.entries.len(), "registry saved");
        Ok(())
    }

    /// Slug → last-generated timestamp.
    pub fn last_generated(&self) -> BTreeMap<String, DateTime<Utc>> {
        self.entries
            .iter()
            .map(|(slug, entry)| (slug.clone(), entry.generated_at))
            .collect()
    }

    pub fn entry(&self, slug: &str) -> Option<&RegistryEntry> {
        self.entries.get(slug)
    }

    /// Update only the timestamp of a language, keeping any checksum on record.
    pub fn set_last_generated(&mut self, slug: &str, at: DateTime<Utc>) {
        self.entries
            .entry(slug.to_string())
            .and_modify(|entry| entry.generated_at = at)
            .or_insert(RegistryEntry {
                generated_at: at,
                sha256: None,
                size_bytes: None,
            });
    }

    /// Record a freshly written artifact.
    pub fn record(&mut self, slug: &str, at: DateTime<Utc>, artifact: &ArtifactMeta) {
        self.entries.insert(
            slug.to_string(),
            RegistryEntry {
                generated_at: at,
                sha256: Some(artifact.sha256.clone()),
                size_bytes: Some(artifact.size_bytes),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("llmstxt-registry-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = temp_dir();
        let registry = GenerationRegistry::load(tmp.join("registry.json")).unwrap();
        assert!(registry.last_generated().is_empty());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn save_and_reload() {
        let tmp = temp_dir();
        let path = tmp.join("nested").join("registry.json");
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let mut registry = GenerationRegistry::load(&path).unwrap();
        registry.record(
            "en",
            at,
            &ArtifactMeta {
                filename: "llms-en.txt".into(),
                sha256: "ab".repeat(32),
                size_bytes: 120,
            },
        );
        registry.set_last_generated("fr", at);
        registry.save().unwrap();

        let reloaded = GenerationRegistry::load(&path).unwrap();
        let stamps = reloaded.last_generated();
        assert_eq!(stamps.len(), 2);
        assert_eq!(stamps["en"], at);
        assert_eq!(reloaded.entry("en").unwrap().size_bytes, Some(120));
        assert_eq!(reloaded.entry("fr").unwrap().sha256, None);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn set_last_generated_keeps_checksum() {
        let tmp = temp_dir();
        let mut registry = GenerationRegistry::load(tmp.join("registry.json")).unwrap();
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();

        registry.record(
            "de",
            first,
            &ArtifactMeta {
                filename: "llms-de.txt".into(),
                sha256: "cd".repeat(32),
                size_bytes: 10,
            },
        );
        registry.set_last_generated("de", second);

        let entry = registry.entry("de").unwrap();
        assert_eq!(entry.generated_at, second);
        assert_eq!(entry.size_bytes, Some(10));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = temp_dir();
        let path = tmp.join("registry.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = GenerationRegistry::load(&path).unwrap_err();
        assert!(err.to_string().contains("serialization error"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
