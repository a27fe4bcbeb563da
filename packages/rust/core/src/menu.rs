//! Navigation menu resolution.
//!
//! Picks the site's main menu location, keeps the items that belong to the
//! requested language, and arranges them as a fixed two-level tree: top-level
//! entries plus their direct children. Deeper levels are dropped.

use std::collections::HashSet;

use tracing::{debug, instrument};

use llmstxt_normalizer::{plain_text, word_limit};
use llmstxt_shared::{MenuEntry, MenuId, MenuItemId, RawMenuItem};

use crate::source::SiteSource;

/// Word budget for menu item descriptions.
pub const MENU_SUMMARY_WORDS: usize = 20;

/// Location name fragments that mark the main navigation.
const PREFERRED_LOCATIONS: [&str; 3] = ["primary", "main", "header"];

/// A top-level menu entry and its direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub entry: MenuEntry,
    pub children: Vec<MenuEntry>,
}

/// Two-level menu in stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuTree {
    pub nodes: Vec<MenuNode>,
}

impl MenuTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// What the `## Menu` section should show for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSection {
    /// No location has a menu assigned.
    Undefined,
    /// A menu exists but nothing in it belongs to this language.
    Empty,
    Tree(MenuTree),
}

/// Choose the menu to render from `(location, menu)` pairs.
///
/// Locations without an assigned menu (id `0`) are ignored. The first location
/// whose name mentions primary, main, or header wins; otherwise the first one.
pub fn select_menu_location(locations: &[(String, MenuId)]) -> Option<MenuId> {
    let assigned: Vec<&(String, MenuId)> = locations.iter().filter(|(_, menu)| *menu != 0).collect();

    let preferred = assigned.iter().find(|(name, _)| {
        let name = name.to_lowercase();
        PREFERRED_LOCATIONS.iter().any(|hint| name.contains(hint))
    });

    preferred.or_else(|| assigned.first()).map(|(_, menu)| *menu)
}

/// Resolve the menu section for `lang`.
#[instrument(skip_all, fields(lang = %lang))]
pub fn resolve_menu(source: &dyn SiteSource, lang: &str) -> MenuSection {
    let Some(menu) = select_menu_location(&source.fetch_menu_locations()) else {
        debug!("no menu location assigned");
        return MenuSection::Undefined;
    };

    let items = source.fetch_menu_items(menu);
    let total = items.len();
    let kept = filter_by_language(source, items, lang);
    debug!(menu, total, kept = kept.len(), "menu items filtered by language");

    let tree = build_menu_tree(&kept);
    if tree.is_empty() {
        MenuSection::Empty
    } else {
        MenuSection::Tree(tree)
    }
}

/// Drop items that link to content written in another language.
///
/// Free-form links and items whose target language is unknown are kept.
pub fn filter_by_language(
    source: &dyn SiteSource,
    items: Vec<RawMenuItem>,
    lang: &str,
) -> Vec<RawMenuItem> {
    items
        .into_iter()
        .filter(|item| {
            item.linked_content()
                .and_then(|id| source.content_language(id))
                .is_none_or(|item_lang| item_lang == lang)
        })
        .collect()
}

/// Arrange raw items into top-level entries and their direct children.
pub fn build_menu_tree(items: &[RawMenuItem]) -> MenuTree {
    let present: HashSet<MenuItemId> = items.iter().map(|item| item.id).collect();

    let is_top_level = |item: &RawMenuItem| match item.parent_id() {
        None => true,
        Some(parent) => parent == item.id || !present.contains(&parent),
    };

    let mut nodes: Vec<MenuNode> = items
        .iter()
        .filter(|item| is_top_level(item))
        .map(|item| MenuNode {
            entry: MenuEntry::from(item),
            children: Vec::new(),
        })
        .collect();

    for item in items.iter().filter(|item| !is_top_level(item)) {
        let Some(parent) = item.parent_id() else {
            continue;
        };
        // Anything whose parent is itself a child sits too deep and is dropped.
        if let Some(node) = nodes.iter_mut().find(|node| node.entry.id == parent) {
            node.children.push(MenuEntry::from(item));
        }
    }

    MenuTree { nodes }
}

/// One-line summary of a menu entry: its description, or a placeholder.
pub fn menu_summary(entry: &MenuEntry) -> String {
    let text = word_limit(&plain_text(&entry.description), MENU_SUMMARY_WORDS);
    if text.is_empty() {
        format!("Menu link to {}", entry.title)
    } else {
        text
    }
}
