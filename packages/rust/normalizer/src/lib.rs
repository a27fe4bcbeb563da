//! Content normalization for llms.txt summaries.
//!
//! Turns stored page/post bodies (markup, shortcodes, page-builder payloads)
//! into short plain-text extracts. Nothing in this crate fails: "no usable
//! content" is signalled by an empty string and callers apply their own
//! fallback chain.

mod builders;
mod cleanup;

pub use builders::{BuilderKind, extract_from_builder_meta, extract_from_structured_payload};

/// Cleaned text shorter than this many characters is treated as noise.
pub const NOISE_THRESHOLD: usize = 10;

/// Extract a clean plain-text body from raw stored content.
///
/// Returns an empty string when the input is empty or when what survives
/// cleanup is shorter than [`NOISE_THRESHOLD`] characters.
pub fn extract(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let cleaned = cleanup::run_pipeline(raw);
    if cleaned.chars().count() < NOISE_THRESHOLD {
        return String::new();
    }

    cleaned
}

/// Run the cleanup pipeline without the noise threshold.
///
/// Used for short free-form fields (excerpts, menu descriptions) where a
/// few words are still meaningful.
pub fn plain_text(raw: &str) -> String {
    cleanup::run_pipeline(raw)
}

/// Keep the first `limit` whitespace-delimited words, rejoined with single spaces.
///
/// Text with `limit` words or fewer is returned unchanged.
pub fn word_limit(text: &str, limit: usize) -> String {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(limit).collect();

    if words.next().is_none() {
        return text.to_string();
    }

    kept.join(" ")
}
