//! On-disk storage for generated llms.txt artifacts.
//!
//! The [`ArtifactStore`] owns one directory holding `llms-<slug>.txt` per
//! language. Every write goes to a temporary file first and is renamed into
//! place, so readers only ever see a complete document.
//!
//! The [`GenerationRegistry`] records when each language was last generated.

mod registry;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use llmstxt_shared::{LanguageDocument, LlmsTxtError, Result};

pub use registry::{GenerationRegistry, RegistryEntry};

/// Access rules written into the artifact directory.
const HTACCESS: &str = "# Disable directory browsing\n\
Options -Indexes\n\
# Allow access to .txt files\n\
<Files ~ \"\\.txt$\">\n    Allow from all\n</Files>\n";

/// Metadata for a single written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Handle on the artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Artifact file name for a language (`llms-<slug>.txt`).
    pub fn file_name(slug: &str) -> Result<String> {
        validate_slug(slug)?;
        Ok(format!("llms-{slug}.txt"))
    }

    /// Full path of the artifact for a language.
    pub fn path_for(&self, slug: &str) -> Result<PathBuf> {
        Ok(self.dir.join(Self::file_name(slug)?))
    }

    /// Create the artifact directory and its access rules if missing.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| LlmsTxtError::io(&self.dir, e))?;

        let htaccess = self.dir.join(".htaccess");
        if !htaccess.exists() {
            std::fs::write(&htaccess, HTACCESS).map_err(|e| LlmsTxtError::io(&htaccess, e))?;
            debug!(path = %htaccess.display(), "wrote directory access rules");
        }

        Ok(())
    }

    /// Replace the artifact for `doc.language` with `doc.content`.
    #[instrument(skip_all, fields(lang = %doc.language))]
    pub fn write(&self, doc: &LanguageDocument) -> Result<ArtifactMeta> {
        let filename = Self::file_name(&doc.language)?;
        self.ensure_dir()?;

        let target = self.dir.join(&filename);
        write_atomic(&target, doc.content.as_bytes())?;

        let mut hasher = Sha256::new();
        hasher.update(doc.content.as_bytes());
        let sha256 = format!("{:x}", hasher.finalize());

        info!(file = %filename, size = doc.content.len(), "wrote llms.txt artifact");

        Ok(ArtifactMeta {
            filename,
            sha256,
            size_bytes: doc.content.len(),
        })
    }

    /// Read the artifact for a language, `None` if it has not been generated.
    pub fn read(&self, slug: &str) -> Result<Option<String>> {
        let path = self.path_for(slug)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LlmsTxtError::io(&path, e)),
        }
    }
}

/// Reject slugs that could escape the artifact directory or break routes.
pub fn validate_slug(slug: &str) -> Result<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(LlmsTxtError::validation(format!(
            "invalid language slug '{slug}'"
        )))
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `target`.
pub(crate) fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{name}.{}.tmp", uuid::Uuid::now_v7()));

    std::fs::write(&temp, bytes).map_err(|e| LlmsTxtError::io(&temp, e))?;

    if let Err(e) = std::fs::rename(&temp, target) {
        let _ = std::fs::remove_file(&temp);
        return Err(LlmsTxtError::io(target, e));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("llmstxt-storage-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn doc(lang: &str, content: &str) -> LanguageDocument {
        LanguageDocument {
            language: lang.into(),
            content: content.into(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn file_name_uses_slug() {
        assert_eq!(ArtifactStore::file_name("en").unwrap(), "llms-en.txt");
        assert_eq!(ArtifactStore::file_name("pt-br").unwrap(), "llms-pt-br.txt");
    }

    #[test]
    fn invalid_slugs_rejected() {
        for slug in ["", "../etc", "en/fr", "en.txt", "fr fr"] {
            let err = ArtifactStore::file_name(slug).unwrap_err();
            assert!(err.to_string().contains("invalid language slug"), "{slug}");
        }
    }

    #[test]
    fn write_creates_dir_htaccess_and_file() {
        let tmp = temp_dir();
        let store = ArtifactStore::new(tmp.join("llms-txt"));

        let meta = store.write(&doc("en", "# Acme\n")).unwrap();

        assert_eq!(meta.filename, "llms-en.txt");
        assert_eq!(meta.size_bytes, 7);
        assert_eq!(meta.sha256.len(), 64);

        let htaccess = std::fs::read_to_string(store.dir().join(".htaccess")).unwrap();
        assert!(htaccess.contains("Options -Indexes"));
        assert_eq!(store.read("en").unwrap().as_deref(), Some("# Acme\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_replaces_previous_content() {
        let tmp = temp_dir();
        let store = ArtifactStore::new(&tmp);

        store.write(&doc("fr", "old")).unwrap();
        store.write(&doc("fr", "new")).unwrap();

        assert_eq!(store.read("fr").unwrap().as_deref(), Some("new"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_htaccess_is_kept() {
        let tmp = temp_dir();
        std::fs::write(tmp.join(".htaccess"), "custom").unwrap();
        let store = ArtifactStore::new(&tmp);

        store.write(&doc("en", "body")).unwrap();

        assert_eq!(std::fs::read_to_string(tmp.join(".htaccess")).unwrap(), "custom");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let tmp = temp_dir();
        let store = ArtifactStore::new(&tmp);

        store.write(&doc("en", "hello")).unwrap();
        store.write(&doc("de", "hallo")).unwrap();

        for entry in std::fs::read_dir(&tmp).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_rename_cleans_up_temp() {
        let tmp = temp_dir();
        let store = ArtifactStore::new(&tmp);
        // A non-empty directory where the artifact should go blocks the rename.
        let blocker = tmp.join("llms-fr.txt");
        std::fs::create_dir_all(blocker.join("inner")).unwrap();

        let err = store.write(&doc("fr", "bonjour")).unwrap_err();
        assert!(matches!(err, LlmsTxtError::Io { .. }));

        for entry in std::fs::read_dir(&tmp).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn read_missing_is_none() {
        let tmp = temp_dir();
        let store = ArtifactStore::new(&tmp);
        assert_eq!(store.read("de").unwrap(), None);
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
