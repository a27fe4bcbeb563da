//! Core domain types for llms.txt generation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a page, post, or other content object in the host.
pub type ContentId = u64;

/// Identifier of a navigation menu.
pub type MenuId = u64;

/// Identifier of a single navigation menu item.
pub type MenuItemId = u64;

/// Host-side metadata stored alongside a content item (page-builder payloads live here).
pub type PostMeta = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Kind of content object as stored by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Page,
    Post,
}

/// A page, post, or homepage fetched from the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    /// Public permalink.
    pub url: String,
    /// Stored body markup, possibly containing shortcodes.
    #[serde(default)]
    pub raw_body: String,
    #[serde(default)]
    pub excerpt: String,
    /// Page-builder metadata keyed by meta name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: PostMeta,
}

// ---------------------------------------------------------------------------
// Menus
// ---------------------------------------------------------------------------

/// A navigation menu item as the host stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMenuItem {
    pub id: MenuItemId,
    pub title: String,
    pub url: String,
    /// Parent menu item; `0` and absent both mean top-level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<MenuItemId>,
    #[serde(default)]
    pub description: String,
    /// Content object the item links to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ContentId>,
    /// Object type the item links to (`page`, `post`, `category`, `custom`, ...).
    #[serde(default = "default_object")]
    pub object: String,
}

fn default_object() -> String {
    "custom".into()
}

impl RawMenuItem {
    /// Declared parent id, normalizing the host's `0` sentinel to `None`.
    pub fn parent_id(&self) -> Option<MenuItemId> {
        self.parent.filter(|&p| p != 0)
    }

    /// Content object this item points at, unless it is a free-form link.
    pub fn linked_content(&self) -> Option<ContentId> {
        if self.object == "custom" {
            return None;
        }
        self.object_id.filter(|&id| id != 0)
    }
}

/// One navigational link kept for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: MenuItemId,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MenuItemId>,
    #[serde(default)]
    pub description: String,
}

impl From<&RawMenuItem> for MenuEntry {
    fn from(item: &RawMenuItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            url: item.url.clone(),
            parent_id: item.parent_id(),
            description: item.description.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// LanguageDocument
// ---------------------------------------------------------------------------

/// The generated llms.txt body for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDocument {
    /// Language slug (e.g. `en`).
    pub language: String,
    /// Markdown document body.
    pub content: String,
    pub generated_at: DateTime<Utc>,
}
