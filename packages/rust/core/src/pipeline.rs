//! Generation runs across languages.
//!
//! [`Generator`] owns the site source, the artifact store and the registry.
//! Each language is assembled, written atomically and then timestamped; a
//! failure is recorded in that language's [`LanguageOutcome`] and the run
//! moves on to the next language.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use llmstxt_shared::{LlmsTxtError, Result};
use llmstxt_storage::{ArtifactMeta, ArtifactStore, GenerationRegistry};

use crate::assembler::Assembler;
use crate::source::SiteSource;

/// Progress callback for reporting generation status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a language is generated (`index` is 1-based).
    fn language_started(&self, lang: &str, index: usize, total: usize);
    /// Called after a language finished, successfully or not.
    fn language_finished(&self, outcome: &LanguageOutcome);
    /// Called when the whole run completes.
    fn done(&self, report: &GenerationReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn language_started(&self, _lang: &str, _index: usize, _total: usize) {}
    fn language_finished(&self, _outcome: &LanguageOutcome) {}
    fn done(&self, _report: &GenerationReport) {}
}

/// How generation went for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Generated {
        artifact: ArtifactMeta,
        generated_at: DateTime<Utc>,
    },
    Failed {
        reason: String,
    },
}

/// Result of generating one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOutcome {
    pub language: String,
    pub status: OutcomeStatus,
}

impl LanguageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Generated { .. })
    }
}

/// Result of a run over all languages, in language order.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub outcomes: Vec<LanguageOutcome>,
    pub elapsed: Duration,
}

impl GenerationReport {
    /// True when at least one language ran and none failed.
    pub fn is_success(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(LanguageOutcome::is_success)
    }

    /// Slugs of the languages that failed.
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.language.as_str())
            .collect()
    }

    /// Human-readable summary for manual triggers.
    pub fn message(&self) -> String {
        if self.outcomes.is_empty() {
            return "No languages configured; nothing was generated.".into();
        }
        let failed = self.failed();
        if failed.is_empty() {
            "llms.txt files have been generated successfully.".into()
        } else {
            format!("Failed to generate llms.txt files for: {}", failed.join(", "))
        }
    }
}

/// Public route of a language's llms.txt (the default language lives at the root).
pub fn llms_path(slug: &str, default_language: Option<&str>) -> String {
    if default_language == Some(slug) {
        "/llms.txt".into()
    } else {
        format!("/{slug}/llms.txt")
    }
}

/// Absolute public URL of a language's llms.txt under `home_url`.
pub fn public_url(home_url: &str, slug: &str, default_language: Option<&str>) -> String {
    format!(
        "{}{}",
        home_url.trim_end_matches('/'),
        llms_path(slug, default_language)
    )
}

/// Generates, stores and timestamps llms.txt documents.
pub struct Generator {
    source: Arc<dyn SiteSource>,
    store: ArtifactStore,
    registry: Mutex<GenerationRegistry>,
    /// Single-flight guard per language slug.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Generator {
    pub fn new(source: Arc<dyn SiteSource>, store: ArtifactStore, registry: GenerationRegistry) -> Self {
        Self {
            source,
            store,
            registry: Mutex::new(registry),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn languages(&self) -> Vec<String> {
        self.source.list_languages()
    }

    pub fn default_language(&self) -> Option<String> {
        self.source.default_language()
    }

    pub fn is_known_language(&self, slug: &str) -> bool {
        self.source.list_languages().iter().any(|l| l == slug)
    }

    pub fn home_url(&self) -> String {
        self.source.home_url()
    }

    /// Slug → last successful generation.
    pub fn last_generated(&self) -> BTreeMap<String, DateTime<Utc>> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_generated()
    }

    /// Stored artifact for a known language, `None` when not generated yet.
    pub fn read_artifact(&self, slug: &str) -> Result<Option<String>> {
        if !self.is_known_language(slug) {
            return Err(LlmsTxtError::validation(format!("unknown language '{slug}'")));
        }
        self.store.read(slug)
    }

    /// Generate every configured language in order.
    #[instrument(skip_all)]
    pub fn generate_all(&self, progress: &dyn ProgressReporter) -> GenerationReport {
        let start = Instant::now();
        let languages = self.source.list_languages();
        let total = languages.len();

        if languages.is_empty() {
            warn!("no languages configured, nothing to generate");
        }

        let mut outcomes = Vec::with_capacity(total);
        for (idx, lang) in languages.iter().enumerate() {
            progress.language_started(lang, idx + 1, total);
            let outcome = self.generate_one(lang);
            progress.language_finished(&outcome);
            outcomes.push(outcome);
        }

        let report = GenerationReport {
            outcomes,
            elapsed: start.elapsed(),
        };

        info!(
            languages = total,
            failed = report.failed().len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "generation run finished"
        );
        progress.done(&report);
        report
    }

    /// Generate a single language.
    #[instrument(skip_all, fields(lang = %slug))]
    pub fn generate_one(&self, slug: &str) -> LanguageOutcome {
        let status = match self.run(slug) {
            Ok((artifact, generated_at)) => OutcomeStatus::Generated {
                artifact,
                generated_at,
            },
            Err(e) => {
                warn!(error = %e, "language generation failed");
                OutcomeStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        LanguageOutcome {
            language: slug.to_string(),
            status,
        }
    }

    fn run(&self, slug: &str) -> Result<(ArtifactMeta, DateTime<Utc>)> {
        if !self.is_known_language(slug) {
            return Err(LlmsTxtError::validation(format!("unknown language '{slug}'")));
        }

        let guard = self.lock_for(slug);
        let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

        let doc = Assembler::new(self.source.as_ref()).generate(slug);
        let artifact = self.store.write(&doc)?;

        // Only swap in the updated registry once it is on disk.
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = registry.clone();
        updated.record(slug, doc.generated_at, &artifact);
        updated.save()?;
        *registry = updated;

        Ok((artifact, doc.generated_at))
    }

    fn lock_for(&self, slug: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(slug.to_string()).or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
