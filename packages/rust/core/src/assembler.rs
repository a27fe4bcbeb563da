//! llms.txt document assembler.
//!
//! Pulls the homepage, menu, pages and recent posts for one language from a
//! [`SiteSource`], resolves a short summary for every item, and renders the
//! markdown document.
//!
//! Every item goes through the same fallback chain:
//! 1. cleaned raw body
//! 2. page-builder payload from post meta
//! 3. cleaned excerpt
//! 4. a placeholder built from the title

use chrono::Utc;
use tracing::{debug, info, instrument};

use llmstxt_normalizer::{extract, extract_from_builder_meta, plain_text, word_limit};
use llmstxt_shared::{ContentItem, LanguageDocument};

use crate::menu::{MenuSection, menu_summary, resolve_menu};
use crate::source::SiteSource;

/// Word budget for the homepage summary.
pub const HOMEPAGE_SUMMARY_WORDS: usize = 100;

/// Word budget for page and post summaries.
pub const ITEM_SUMMARY_WORDS: usize = 50;

/// Number of posts listed in the blog section.
pub const RECENT_POSTS_LIMIT: usize = 5;

const NO_MENU: &str = "- No menu defined";
const NO_MENU_ITEMS: &str = "- No menu items found for this language";
const NO_PAGES: &str = "- No pages found for this language";
const NO_POSTS: &str = "- No blog posts found for this language";

/// What a summary is for; decides the word budget and the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Homepage,
    Page,
    Post,
}

impl SummaryKind {
    pub fn word_budget(self) -> usize {
        match self {
            Self::Homepage => HOMEPAGE_SUMMARY_WORDS,
            Self::Page | Self::Post => ITEM_SUMMARY_WORDS,
        }
    }

    pub fn placeholder(self, title: &str) -> String {
        match self {
            Self::Homepage => format!("Homepage: {title}"),
            Self::Page => format!("Page about {title}"),
            Self::Post => format!("Blog post about {title}"),
        }
    }
}

/// Best available text for an item, before the word budget is applied.
pub fn resolve_text(item: &ContentItem, kind: SummaryKind) -> String {
    let body = extract(&item.raw_body);
    if !body.is_empty() {
        return body;
    }

    let builder = extract_from_builder_meta(&item.meta);
    if !builder.is_empty() {
        debug!(id = item.id, "summary from page-builder payload");
        return builder;
    }

    let excerpt = plain_text(&item.excerpt);
    if !excerpt.is_empty() {
        debug!(id = item.id, "summary from excerpt");
        return excerpt;
    }

    debug!(id = item.id, "summary from title placeholder");
    kind.placeholder(&item.title)
}

/// Resolve an item's summary and cut it to the kind's word budget.
pub fn summarize(item: &ContentItem, kind: SummaryKind) -> String {
    word_limit(&resolve_text(item, kind), kind.word_budget())
}

/// One `[title](url): summary` link line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    pub title: String,
    pub url: String,
    pub summary: String,
}

impl Bullet {
    fn from_item(item: &ContentItem, kind: SummaryKind) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            summary: summarize(item, kind),
        }
    }

    fn render(&self, marker: &str) -> String {
        format!("{marker} [{}]({}): {}", self.title, self.url, self.summary)
    }
}

/// Everything a document shows, resolved but not yet rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSections {
    pub title: String,
    pub tagline: String,
    /// Empty when the language has no homepage.
    pub homepage: String,
    pub menu: MenuSection,
    pub pages: Vec<Bullet>,
    pub posts: Vec<Bullet>,
}

impl DocumentSections {
    /// Render the markdown body.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("# {}", self.title),
            format!("> {}", self.tagline).trim_end().to_string(),
            String::new(),
        ];

        if !self.homepage.is_empty() {
            lines.push(self.homepage.clone());
            lines.push(String::new());
        }

        lines.push("## Menu".into());
        match &self.menu {
            MenuSection::Undefined => lines.push(NO_MENU.into()),
            MenuSection::Empty => lines.push(NO_MENU_ITEMS.into()),
            MenuSection::Tree(tree) => {
                for node in &tree.nodes {
                    lines.push(menu_line("-", &node.entry));
                    for child in &node.children {
                        lines.push(menu_line("--", child));
                    }
                }
            }
        }
        lines.push(String::new());

        lines.push("## Pages".into());
        push_bullets(&mut lines, &self.pages, NO_PAGES);
        lines.push(String::new());

        lines.push("## Blog".into());
        push_bullets(&mut lines, &self.posts, NO_POSTS);

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn menu_line(marker: &str, entry: &llmstxt_shared::MenuEntry) -> String {
    Bullet {
        title: entry.title.clone(),
        url: entry.url.clone(),
        summary: menu_summary(entry),
    }
    .render(marker)
}

fn push_bullets(lines: &mut Vec<String>, bullets: &[Bullet], absent: &str) {
    if bullets.is_empty() {
        lines.push(absent.into());
    } else {
        lines.extend(bullets.iter().map(|b| b.render("-")));
    }
}

/// Builds llms.txt documents from a site source.
pub struct Assembler<'a> {
    source: &'a dyn SiteSource,
}

impl<'a> Assembler<'a> {
    pub fn new(source: &'a dyn SiteSource) -> Self {
        Self { source }
    }

    /// Homepage translated into `lang`, if the site has one.
    fn homepage(&self, lang: &str) -> Option<ContentItem> {
        let front = self.source.front_page_id()?;
        let translated = self.source.translated_content_id(front, lang)?;
        self.source.fetch_content(translated)
    }

    /// Resolve all sections for `lang`.
    #[instrument(skip_all, fields(lang = %lang))]
    pub fn sections(&self, lang: &str) -> DocumentSections {
        let homepage = self
            .homepage(lang)
            .map(|item| summarize(&item, SummaryKind::Homepage))
            .unwrap_or_default();

        let pages: Vec<Bullet> = self
            .source
            .fetch_published_pages(lang)
            .iter()
            .map(|item| Bullet::from_item(item, SummaryKind::Page))
            .collect();

        let posts: Vec<Bullet> = self
            .source
            .fetch_recent_posts(lang, RECENT_POSTS_LIMIT)
            .iter()
            .map(|item| Bullet::from_item(item, SummaryKind::Post))
            .collect();

        debug!(
            has_homepage = !homepage.is_empty(),
            pages = pages.len(),
            posts = posts.len(),
            "sections resolved"
        );

        DocumentSections {
            title: self.source.site_title(),
            tagline: self.source.site_tagline(),
            homepage,
            menu: resolve_menu(self.source, lang),
            pages,
            posts,
        }
    }

    /// Build the complete document for `lang`.
    pub fn generate(&self, lang: &str) -> LanguageDocument {
        let content = self.sections(lang).render();
        info!(lang, bytes = content.len(), "llms.txt document assembled");

        LanguageDocument {
            language: lang.to_string(),
            content,
            generated_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotSource;
    use crate::snapshot::tests::fixture_source;
    use llmstxt_shared::PostMeta;

    fn item(title: &str, body: &str, excerpt: &str) -> ContentItem {
        ContentItem {
            id: 1,
            title: title.into(),
            url: "https://acme.test/x/".into(),
            raw_body: body.into(),
            excerpt: excerpt.into(),
            meta: PostMeta::new(),
        }
    }

    #[test]
    fn empty_page_falls_back_to_placeholder() {
        assert_eq!(summarize(&item("Team", "", ""), SummaryKind::Page), "Page about Team");
        assert_eq!(summarize(&item("News", "", ""), SummaryKind::Post), "Blog post about News");
        assert_eq!(summarize(&item("Start", "", ""), SummaryKind::Homepage), "Homepage: Start");
    }

    #[test]
    fn noise_body_falls_back_to_excerpt() {
        let page = item("Hi", "[shortcode]<b>Hi</b>", "<p>A short excerpt</p>");
        assert_eq!(summarize(&page, SummaryKind::Page), "A short excerpt");
    }

    #[test]
    fn builder_payload_used_before_excerpt() {
        let mut page = item("Builder", "[et_pb_section][/et_pb_section]", "Excerpt text here");
        page.meta.insert("_et_pb_use_builder".into(), serde_json::json!("on"));
        page.meta.insert(
            "_et_pb_post_content_layout".into(),
            serde_json::json!("<p>Built with the visual editor.</p>"),
        );
        assert_eq!(summarize(&page, SummaryKind::Page), "Built with the visual editor.");
    }

    #[test]
    fn summaries_respect_word_budget() {
        let long = (1..=120).map(|n| format!("word{n}")).collect::<Vec<_>>().join(" ");
        let page = item("Long", &long, "");
        assert_eq!(summarize(&page, SummaryKind::Page).split(' ').count(), ITEM_SUMMARY_WORDS);
        assert_eq!(
            summarize(&page, SummaryKind::Homepage).split(' ').count(),
            HOMEPAGE_SUMMARY_WORDS
        );
    }

    #[test]
    fn fixture_document_contains_expected_lines() {
        let source = fixture_source();
        let doc = Assembler::new(&source).generate("en");

        assert_eq!(doc.language, "en");
        let lines: Vec<&str> = doc.content.lines().collect();
        assert!(lines.contains(&"# Acme"));
        assert!(lines.contains(&"> Widgets"));
        assert!(lines.contains(&"- [About](https://acme.test/about/): We make widgets."));
        assert!(lines.contains(&"- [Team](https://acme.test/team/): Page about Team"));
        assert!(!doc.content.contains("Unfinished"));
        assert!(!doc.content.contains("Oldest news"));
        assert!(!doc.content.contains("Deep"));
    }

    #[test]
    fn english_document_renders_exactly() {
        let source = fixture_source();
        let doc = Assembler::new(&source).generate("en");

        let expected = "\
# Acme
> Widgets

Welcome to Acme We build reliable widgets for homes and factories.

## Menu
- [Home](https://acme.test/): Menu link to Home
- [About](https://acme.test/about/): Who we are and what we do
-- [Team](https://acme.test/team/): Menu link to Team
- [Orphan](https://acme.test/orphan/): Menu link to Orphan

## Pages
- [About](https://acme.test/about/): We make widgets.
- [Team](https://acme.test/team/): Page about Team
- [Services](https://acme.test/services/): Design, assembly and repair of widgets.
- [Home](https://acme.test/): Welcome to Acme We build reliable widgets for homes and factories.

## Blog
- [Spring catalogue](https://acme.test/blog/spring-catalogue/): The spring catalogue is out with twelve new widgets.
- [Factory tour](https://acme.test/blog/factory-tour/): Join us for a guided tour of the factory floor.
- [Widget care](https://acme.test/blog/widget-care/): Keep widgets dry and away from direct sunlight.
- [Launch day](https://acme.test/blog/launch-day/): Our first widget shipped today.
- [Hiring](https://acme.test/?p=15): Blog post about Hiring
";
        assert_eq!(doc.content, expected);
    }

    #[test]
    fn french_homepage_comes_from_builder_payload() {
        let source = fixture_source();
        let sections = Assembler::new(&source).sections("fr");

        assert_eq!(sections.homepage, "Bienvenue chez Acme Des widgets fiables pour tous.");
        assert_eq!(sections.pages.len(), 2);
        assert_eq!(sections.pages[0].summary, "Nous fabriquons des widgets.");
        assert!(sections.posts.is_empty());
        assert!(sections.render().contains(NO_POSTS));
    }

    #[test]
    fn homepage_placeholder_for_empty_translation() {
        let source = fixture_source();
        let sections = Assembler::new(&source).sections("de");
        assert_eq!(sections.homepage, "Homepage: Startseite");
    }

    #[test]
    fn language_without_content_still_renders_all_sections() {
        let source = fixture_source();
        let doc = Assembler::new(&source).generate("it");

        assert!(doc.content.starts_with("# Acme\n> Widgets\n\n## Menu\n"));
        assert!(doc.content.contains("## Pages\n- No pages found for this language\n"));
        assert!(doc.content.contains("## Blog\n- No blog posts found for this language\n"));
    }

    #[test]
    fn missing_menu_and_tagline() {
        let source = SnapshotSource::from_json(
            r#"{"site": {"title": "Bare", "url": "https://bare.test/"}, "languages": ["en"]}"#,
        )
        .unwrap();
        let doc = Assembler::new(&source).generate("en");

        assert_eq!(
            doc.content,
            "# Bare\n>\n\n## Menu\n- No menu defined\n\n## Pages\n- No pages found for this language\n\n## Blog\n- No blog posts found for this language\n"
        );
    }
}
