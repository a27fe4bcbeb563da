//! Text cleanup pipeline for stored content.
//!
//! Each pass is a function `&str -> String` applied in sequence. The pipeline
//! turns shortcode- and markup-heavy bodies into a single line of plain text.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on raw stored content.
pub(crate) fn run_pipeline(raw: &str) -> String {
    let mut result = strip_shortcodes(raw);

    result = strip_tags(&result);
    result = decode_entities(&result);
    result = collapse_whitespace(&result);
    result = remove_control_chars(&result);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Shortcodes
// ---------------------------------------------------------------------------

/// Replace every `[...]` token (no nested brackets) with a single space.
fn strip_shortcodes(raw: &str) -> String {
    static SHORTCODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[[^\]]+\]").expect("valid regex"));

    SHORTCODE_RE.replace_all(raw, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Markup tags
// ---------------------------------------------------------------------------

/// Remove markup, keeping only text content.
///
/// Script/style bodies and comments are dropped entirely. Block-level tags
/// become a space so adjacent paragraphs don't fuse into one word; inline
/// tags are removed without a trace.
fn strip_tags(text: &str) -> String {
    static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex")
    });
    static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex")
    });
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
    static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)</?(?:p|div|br|hr|li|ul|ol|dl|dt|dd|h[1-6]|table|thead|tbody|tr|td|th|section|article|aside|header|footer|nav|blockquote|figure|figcaption|pre)\b[^>]*>",
        )
        .expect("valid regex")
    });
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*>").expect("valid regex"));

    let result = SCRIPT_RE.replace_all(text, " ");
    let result = STYLE_RE.replace_all(&result, " ");
    let result = COMMENT_RE.replace_all(&result, " ");
    let result = BLOCK_TAG_RE.replace_all(&result, " ");
    TAG_RE.replace_all(&result, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Character entities
// ---------------------------------------------------------------------------

fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

// ---------------------------------------------------------------------------
// Pass 4: Whitespace
// ---------------------------------------------------------------------------

/// Collapse any run of whitespace (including non-breaking spaces) into one space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Pass 5: Control characters
// ---------------------------------------------------------------------------

fn remove_control_chars(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
