use archiver_logging::archive_debug;
use serde::Deserialize;

use crate::node::{NodeKind, RichTextNode};

/// Versioning token some descriptions carry in front of the serialized tree.
pub const VERSION_MARKER: &str = "[v2]";

/// Opening of a serialized array of node objects.
const ARRAY_OPEN: &str = "[{";

#[derive(Deserialize)]
struct DocumentRoot {
    #[serde(default)]
    content: Option<Vec<RichTextNode>>,
}

/// Parse a module description blob into a node sequence.
///
/// The blob may be plain prose or carry a serialized node tree at an
/// arbitrary offset, possibly HTML-entity encoded. Anything that does not
/// decode as a tree comes back as a single paragraph holding the trimmed
/// input, so this never fails.
pub fn parse_document(raw: &str) -> Vec<RichTextNode> {
    if raw.is_empty() {
        return Vec::new();
    }
    let cleaned = raw.replace(VERSION_MARKER, "");

    let Some(offset) = cleaned.find(ARRAY_OPEN) else {
        return plain_text_document(&cleaned);
    };

    let decoded = html_escape::decode_html_entities(&cleaned[offset..]);
    match decode_nodes(&decoded) {
        Some(nodes) => nodes,
        None => {
            archive_debug!(
                "Description at offset {} is not a node tree; using plain text ({} bytes)",
                offset,
                cleaned.len()
            );
            plain_text_document(&cleaned)
        }
    }
}

/// Wrap raw text into a single paragraph. Escaping happens at render time.
pub fn plain_text_document(raw: &str) -> Vec<RichTextNode> {
    vec![RichTextNode::new(NodeKind::Paragraph).with_children(vec![RichTextNode::text(raw.trim())])]
}

fn decode_nodes(json: &str) -> Option<Vec<RichTextNode>> {
    if let Ok(nodes) = serde_json::from_str::<Vec<RichTextNode>>(json) {
        return Some(nodes);
    }
    match serde_json::from_str::<DocumentRoot>(json) {
        Ok(DocumentRoot {
            content: Some(content),
        }) if !content.is_empty() => Some(content),
        _ => None,
    }
}
