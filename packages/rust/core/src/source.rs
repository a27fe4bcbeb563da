//! Read-only view of the host site that documents are generated from.

use llmstxt_shared::{ContentId, ContentItem, MenuId, RawMenuItem};

/// Content, translation, and menu lookups provided by the hosting CMS.
///
/// Implementations return empty collections or `None` when data is missing;
/// the assembler turns absence into notices rather than errors.
pub trait SiteSource: Send + Sync {
    /// Configured language slugs, in display order.
    fn list_languages(&self) -> Vec<String>;

    fn default_language(&self) -> Option<String>;

    /// The id of `id`'s translation into `lang`, if one exists.
    fn translated_content_id(&self, id: ContentId, lang: &str) -> Option<ContentId>;

    /// Language a content object is written in, when known.
    fn content_language(&self, id: ContentId) -> Option<String>;

    /// Static front page configured for the site.
    fn front_page_id(&self) -> Option<ContentId>;

    fn fetch_content(&self, id: ContentId) -> Option<ContentItem>;

    /// All published pages in `lang`.
    fn fetch_published_pages(&self, lang: &str) -> Vec<ContentItem>;

    /// The `limit` most recent published posts in `lang`, newest first.
    fn fetch_recent_posts(&self, lang: &str, limit: usize) -> Vec<ContentItem>;

    /// Menu locations in registration order, mapped to the assigned menu.
    fn fetch_menu_locations(&self) -> Vec<(String, MenuId)>;

    fn fetch_menu_items(&self, menu: MenuId) -> Vec<RawMenuItem>;

    fn site_title(&self) -> String;

    fn site_tagline(&self) -> String;

    fn permalink(&self, id: ContentId) -> String;

    /// Public base URL of the site.
    fn home_url(&self) -> String;
}
