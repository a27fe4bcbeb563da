//! Page-builder payload extraction.
//!
//! Visual editors keep their real content in post metadata rather than in the
//! body. Each supported builder is one [`BuilderKind`] variant, detected from
//! the metadata keys it writes, with one extraction function per kind.

use serde_json::Value;
use tracing::debug;

use llmstxt_shared::PostMeta;

use crate::{extract, plain_text};

const WPBAKERY_CSS_KEY: &str = "_wpb_shortcodes_custom_css";
const ELEMENTOR_DATA_KEY: &str = "_elementor_data";
const DIVI_FLAG_KEY: &str = "_et_pb_use_builder";
const DIVI_LAYOUT_KEY: &str = "_et_pb_post_content_layout";
const BEAVER_DATA_KEY: &str = "_fl_builder_data";

/// Known page-builder storage conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    /// Single pre-rendered style/markup blob.
    WpBakery,
    /// JSON element tree with `title`/`editor` settings and nested `elements`.
    Elementor,
    /// Builder flag plus a separate markup layout.
    Divi,
    /// Ordered node list carrying `text` or `content` settings.
    BeaverBuilder,
}

impl BuilderKind {
    /// Pick the builder whose metadata is present, checked in a fixed order.
    pub fn detect(meta: &PostMeta) -> Option<Self> {
        if meta.get(WPBAKERY_CSS_KEY).is_some_and(is_present) {
            return Some(Self::WpBakery);
        }
        if meta.get(ELEMENTOR_DATA_KEY).is_some_and(is_present) {
            return Some(Self::Elementor);
        }
        if meta.get(DIVI_FLAG_KEY).is_some_and(is_truthy) {
            return Some(Self::Divi);
        }
        if meta.get(BEAVER_DATA_KEY).is_some_and(is_present) {
            return Some(Self::BeaverBuilder);
        }
        None
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::WpBakery => "wpbakery",
            Self::Elementor => "elementor",
            Self::Divi => "divi",
            Self::BeaverBuilder => "beaver-builder",
        }
    }
}

/// Extract text from the payload of a specific builder.
///
/// Missing or malformed payloads yield an empty string.
pub fn extract_from_structured_payload(meta: &PostMeta, kind: BuilderKind) -> String {
    match kind {
        BuilderKind::WpBakery => meta
            .get(WPBAKERY_CSS_KEY)
            .and_then(Value::as_str)
            .map(extract)
            .unwrap_or_default(),
        BuilderKind::Elementor => extract_elementor(meta),
        BuilderKind::Divi => {
            if !meta.get(DIVI_FLAG_KEY).is_some_and(is_truthy) {
                return String::new();
            }
            meta.get(DIVI_LAYOUT_KEY)
                .and_then(Value::as_str)
                .map(extract)
                .unwrap_or_default()
        }
        BuilderKind::BeaverBuilder => extract_beaver(meta),
    }
}

/// Detect the builder from metadata and extract its text, if any.
pub fn extract_from_builder_meta(meta: &PostMeta) -> String {
    match BuilderKind::detect(meta) {
        Some(kind) => {
            let text = extract_from_structured_payload(meta, kind);
            debug!(builder = kind.name(), chars = text.len(), "builder payload extracted");
            text
        }
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Elementor
// ---------------------------------------------------------------------------

fn extract_elementor(meta: &PostMeta) -> String {
    let Some(tree) = meta.get(ELEMENTOR_DATA_KEY).and_then(json_payload) else {
        return String::new();
    };
    let Some(nodes) = tree.as_array() else {
        debug!("elementor payload is not an element list");
        return String::new();
    };

    let mut parts = Vec::new();
    collect_elementor_text(nodes, &mut parts);
    extract(&parts.join(" "))
}

/// Depth-first, pre-order walk collecting titles and stripped editor bodies.
fn collect_elementor_text(nodes: &[Value], parts: &mut Vec<String>) {
    for node in nodes {
        if let Some(title) = node_field(node, "title") {
            parts.push(title.to_string());
        }
        if let Some(editor) = node_field(node, "editor") {
            parts.push(plain_text(editor));
        }
        if let Some(children) = node.get("elements").and_then(Value::as_array) {
            collect_elementor_text(children, parts);
        }
    }
}

// ---------------------------------------------------------------------------
// Beaver Builder
// ---------------------------------------------------------------------------

fn extract_beaver(meta: &PostMeta) -> String {
    let Some(data) = meta.get(BEAVER_DATA_KEY).and_then(json_payload) else {
        return String::new();
    };

    let nodes: Vec<&Value> = match &data {
        Value::Array(list) => list.iter().collect(),
        // Keyed by node id, iterated in stored order (serde_json `preserve_order`).
        Value::Object(map) => map.values().collect(),
        _ => {
            debug!("beaver builder payload is not a node list");
            return String::new();
        }
    };

    let text = nodes
        .into_iter()
        .filter_map(|node| node_field(node, "text").or_else(|| node_field(node, "content")))
        .collect::<Vec<_>>()
        .join(" ");

    extract(&text)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read a string field from a node's `settings`, or from the node itself.
fn node_field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get("settings")
        .and_then(|settings| settings.get(key))
        .or_else(|| node.get(key))
        .and_then(Value::as_str)
}

/// Decode a payload that may be stored as JSON text or as structured JSON.
fn json_payload(value: &Value) -> Option<Value> {
    match value {
        Value::String(raw) => match serde_json::from_str(raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(error = %e, "builder payload is not valid JSON");
                None
            }
        },
        Value::Null => None,
        other => Some(other.clone()),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "yes" | "1"
        ),
        _ => false,
    }
}
