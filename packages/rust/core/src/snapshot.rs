//! [`SiteSource`] backed by a JSON export of the site.
//!
//! The snapshot holds everything the generator reads from the host: site
//! identity, languages, content with translations and post meta, and menus.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use llmstxt_shared::{
    ContentId, ContentItem, ContentKind, LlmsTxtError, MenuId, PostMeta, RawMenuItem, Result,
};

use crate::source::SiteSource;

const PUBLISHED: &str = "publish";

// ---------------------------------------------------------------------------
// Snapshot schema
// ---------------------------------------------------------------------------

/// Root of a site snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSnapshot {
    pub site: SiteInfo,
    /// Language slugs in display order.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Defaults to the first language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_page: Option<ContentId>,
    #[serde(default)]
    pub content: Vec<SnapshotContent>,
    #[serde(default)]
    pub menu_locations: Vec<MenuLocation>,
    #[serde(default)]
    pub menus: Vec<SnapshotMenu>,
}

/// `site` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    pub url: String,
}

/// One page or post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotContent {
    pub id: ContentId,
    pub kind: ContentKind,
    pub title: String,
    /// Permalink, absolute or relative to the site URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Language slug → id of the translated counterpart.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, ContentId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: PostMeta,
}

fn default_status() -> String {
    PUBLISHED.into()
}

/// A theme menu location and the menu assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuLocation {
    pub location: String,
    pub menu: MenuId,
}

/// A menu and its items in stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMenu {
    pub id: MenuId,
    #[serde(default)]
    pub items: Vec<RawMenuItem>,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// In-memory site source loaded from a [`SiteSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: SiteSnapshot,
    site_url: Url,
    by_id: HashMap<ContentId, usize>,
}

impl SnapshotSource {
    /// Load and validate a snapshot file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LlmsTxtError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Parse and validate snapshot JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SiteSnapshot = serde_json::from_str(json)
            .map_err(|e| LlmsTxtError::Source(format!("invalid site snapshot: {e}")))?;
        Self::new(snapshot)
    }

    pub fn new(snapshot: SiteSnapshot) -> Result<Self> {
        let site_url = Url::parse(&snapshot.site.url).map_err(|e| {
            LlmsTxtError::Source(format!("invalid site url '{}': {e}", snapshot.site.url))
        })?;

        if let Some(default) = &snapshot.default_language {
            if !snapshot.languages.contains(default) {
                return Err(LlmsTxtError::Source(format!(
                    "default language '{default}' is not in the language list"
                )));
            }
        }

        let mut by_id = HashMap::with_capacity(snapshot.content.len());
        for (idx, item) in snapshot.content.iter().enumerate() {
            if by_id.insert(item.id, idx).is_some() {
                return Err(LlmsTxtError::Source(format!(
                    "duplicate content id {}",
                    item.id
                )));
            }
        }

        let undeclared = undeclared_languages(&snapshot);
        if !undeclared.is_empty() {
            warn!(languages = ?undeclared, "content uses languages missing from the language list");
        }

        debug!(
            languages = snapshot.languages.len(),
            content = snapshot.content.len(),
            menus = snapshot.menus.len(),
            "site snapshot loaded"
        );

        Ok(Self {
            snapshot,
            site_url,
            by_id,
        })
    }

    fn get(&self, id: ContentId) -> Option<&SnapshotContent> {
        self.by_id.get(&id).map(|&idx| &self.snapshot.content[idx])
    }

    fn to_item(&self, content: &SnapshotContent) -> ContentItem {
        ContentItem {
            id: content.id,
            title: content.title.clone(),
            url: self.permalink(content.id),
            raw_body: content.body.clone(),
            excerpt: content.excerpt.clone(),
            meta: content.meta.clone(),
        }
    }

    /// Published items of `kind` in `lang`, newest first (undated last).
    fn published(&self, kind: ContentKind, lang: &str) -> Vec<&SnapshotContent> {
        let mut items: Vec<&SnapshotContent> = self
            .snapshot
            .content
            .iter()
            .filter(|c| c.kind == kind && c.status == PUBLISHED)
            .filter(|c| c.language.as_deref() == Some(lang))
            .collect();

        // Stable sort keeps snapshot order for equal dates.
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items
    }
}

impl SiteSource for SnapshotSource {
    fn list_languages(&self) -> Vec<String> {
        self.snapshot.languages.clone()
    }

    fn default_language(&self) -> Option<String> {
        self.snapshot
            .default_language
            .clone()
            .or_else(|| self.snapshot.languages.first().cloned())
    }

    fn translated_content_id(&self, id: ContentId, lang: &str) -> Option<ContentId> {
        let content = self.get(id)?;
        if content.language.as_deref() == Some(lang) {
            return Some(id);
        }
        if let Some(&translated) = content.translations.get(lang) {
            return self.get(translated).map(|c| c.id);
        }

        // Translation groups may only be recorded on the other side.
        self.snapshot
            .content
            .iter()
            .find(|c| {
                c.language.as_deref() == Some(lang)
                    && c.translations.values().any(|&other| other == id)
            })
            .map(|c| c.id)
    }

    fn content_language(&self, id: ContentId) -> Option<String> {
        self.get(id).and_then(|c| c.language.clone())
    }

    fn front_page_id(&self) -> Option<ContentId> {
        self.snapshot.front_page.filter(|&id| id != 0)
    }

    fn fetch_content(&self, id: ContentId) -> Option<ContentItem> {
        self.get(id).map(|c| self.to_item(c))
    }

    fn fetch_published_pages(&self, lang: &str) -> Vec<ContentItem> {
        self.published(ContentKind::Page, lang)
            .into_iter()
            .map(|c| self.to_item(c))
            .collect()
    }

    fn fetch_recent_posts(&self, lang: &str, limit: usize) -> Vec<ContentItem> {
        self.published(ContentKind::Post, lang)
            .into_iter()
            .take(limit)
            .map(|c| self.to_item(c))
            .collect()
    }

    fn fetch_menu_locations(&self) -> Vec<(String, MenuId)> {
        self.snapshot
            .menu_locations
            .iter()
            .map(|l| (l.location.clone(), l.menu))
            .collect()
    }

    fn fetch_menu_items(&self, menu: MenuId) -> Vec<RawMenuItem> {
        self.snapshot
            .menus
            .iter()
            .find(|m| m.id == menu)
            .map(|m| m.items.clone())
            .unwrap_or_default()
    }

    fn site_title(&self) -> String {
        self.snapshot.site.title.clone()
    }

    fn site_tagline(&self) -> String {
        self.snapshot.site.tagline.clone()
    }

    fn permalink(&self, id: ContentId) -> String {
        let link = self.get(id).and_then(|c| c.link.as_deref());
        let resolved = match link {
            Some(link) => self.site_url.join(link),
            None => self.site_url.join(&format!("?p={id}")),
        };
        match resolved {
            Ok(url) => url.to_string(),
            Err(_) => link.map_or_else(|| self.site_url.to_string(), str::to_string),
        }
    }

    fn home_url(&self) -> String {
        self.site_url.to_string()
    }
}

/// Language slugs referenced by content but missing from the language list.
pub fn undeclared_languages(snapshot: &SiteSnapshot) -> Vec<String> {
    let declared: HashSet<&str> = snapshot.languages.iter().map(String::as_str).collect();
    let mut missing: Vec<String> = snapshot
        .content
        .iter()
        .filter_map(|c| c.language.as_deref())
        .filter(|lang| !declared.contains(lang))
        .map(str::to_string)
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixture_source() -> SnapshotSource {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/json/site.fixture.json");
        SnapshotSource::load(&path).expect("load fixture snapshot")
    }

    fn minimal(json_tail: &str) -> String {
        format!(
            r#"{{"site": {{"title": "T", "url": "https://t.test/"}}, {json_tail}}}"#
        )
    }

    #[test]
    fn fixture_languages_and_default() {
        let source = fixture_source();
        assert_eq!(source.list_languages(), vec!["en", "fr", "de", "it"]);
        assert_eq!(source.default_language().as_deref(), Some("en"));
        assert_eq!(source.site_title(), "Acme");
        assert_eq!(source.site_tagline(), "Widgets");
    }

    #[test]
    fn default_language_falls_back_to_first() {
        let source = SnapshotSource::from_json(&minimal(r#""languages": ["de", "en"]"#)).unwrap();
        assert_eq!(source.default_language().as_deref(), Some("de"));
    }

    #[test]
    fn unknown_default_language_rejected() {
        let err = SnapshotSource::from_json(&minimal(
            r#""languages": ["en"], "default_language": "fr""#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("default language 'fr'"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = SnapshotSource::from_json(&minimal(
            r#""content": [
                {"id": 1, "kind": "page", "title": "A"},
                {"id": 1, "kind": "post", "title": "B"}
            ]"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate content id 1"));
    }

    #[test]
    fn invalid_json_is_source_error() {
        let err = SnapshotSource::from_json("{").unwrap_err();
        assert!(matches!(err, LlmsTxtError::Source(_)));
    }

    #[test]
    fn published_pages_are_filtered_and_sorted() {
        let source = fixture_source();
        let titles: Vec<String> = source
            .fetch_published_pages("en")
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["About", "Team", "Services", "Home"]);
    }

    #[test]
    fn recent_posts_are_limited_newest_first() {
        let source = fixture_source();
        let titles: Vec<String> = source
            .fetch_recent_posts("en", 5)
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Spring catalogue",
                "Factory tour",
                "Widget care",
                "Launch day",
                "Hiring"
            ]
        );
        assert!(source.fetch_recent_posts("fr", 5).is_empty());
    }

    #[test]
    fn translations_resolve_both_directions() {
        let source = fixture_source();
        assert_eq!(source.translated_content_id(1, "fr"), Some(101));
        assert_eq!(source.translated_content_id(1, "en"), Some(1));
        // 201 has no translation map of its own.
        assert_eq!(source.translated_content_id(201, "en"), Some(1));
        assert_eq!(source.translated_content_id(201, "fr"), Some(101));
        assert_eq!(source.translated_content_id(1, "it"), None);
        assert_eq!(source.translated_content_id(999, "en"), None);
    }

    #[test]
    fn permalinks_resolve_against_site_url() {
        let source = fixture_source();
        assert_eq!(source.permalink(2), "https://acme.test/about/");
        assert_eq!(source.permalink(15), "https://acme.test/?p=15");
        assert_eq!(source.home_url(), "https://acme.test/");
    }

    #[test]
    fn menu_lookups() {
        let source = fixture_source();
        let locations = source.fetch_menu_locations();
        assert_eq!(locations[0], ("footer".to_string(), 20));
        assert_eq!(source.fetch_menu_items(10).len(), 6);
        assert!(source.fetch_menu_items(99).is_empty());
    }

    #[test]
    fn undeclared_languages_reported() {
        let snapshot: SiteSnapshot = serde_json::from_str(&minimal(
            r#""languages": ["en"], "content": [
                {"id": 1, "kind": "page", "title": "A", "language": "en"},
                {"id": 2, "kind": "page", "title": "B", "language": "nl"},
                {"id": 3, "kind": "post", "title": "C", "language": "nl"}
            ]"#,
        ))
        .unwrap();
        assert_eq!(undeclared_languages(&snapshot), vec!["nl"]);
    }
}
