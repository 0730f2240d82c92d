use std::fmt::Write;

use serde_json::Value;

use crate::node::{Mark, NodeKind, RichTextNode};

const DEFAULT_HEADING_LEVEL: u8 = 1;

/// Render a node sequence into an HTML fragment (no surrounding document).
pub fn render_nodes(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

/// Render a parsed description, trimmed for embedding in a page.
pub fn render_description(nodes: &[RichTextNode]) -> String {
    render_nodes(nodes).trim().to_string()
}

/// True when a rendered fragment still carries serialized editor JSON.
pub fn leaks_editor_json(fragment: &str) -> bool {
    fragment.contains("[{") || fragment.contains("\"type\":")
}

fn render_node(node: &RichTextNode, out: &mut String) {
    match &node.kind {
        NodeKind::Heading => {
            let level = heading_level(node);
            let inner = render_inner(&node.children);
            let _ = writeln!(out, "<h{level}>{inner}</h{level}>");
        }
        NodeKind::Paragraph => {
            let inner = render_inner(&node.children);
            if !inner.is_empty() {
                let _ = writeln!(out, "<p>{inner}</p>");
            }
        }
        NodeKind::BulletList => {
            out.push_str("<ul>\n");
            out.push_str(&render_nodes(&node.children));
            out.push_str("</ul>\n");
        }
        NodeKind::OrderedList => {
            out.push_str("<ol>\n");
            out.push_str(&render_nodes(&node.children));
            out.push_str("</ol>\n");
        }
        NodeKind::ListItem => {
            let inner = render_inner(&node.children);
            let _ = writeln!(out, "<li>{inner}</li>");
        }
        NodeKind::Text => out.push_str(&render_text(node)),
        NodeKind::HardBreak => out.push_str("<br>\n"),
        NodeKind::Blockquote => {
            let inner = render_inner(&node.children);
            let _ = writeln!(out, "<blockquote>{inner}</blockquote>");
        }
        NodeKind::Other(_) => {
            for child in &node.children {
                render_node(child, out);
            }
        }
    }
}

fn render_inner(children: &[RichTextNode]) -> String {
    render_nodes(children).trim().to_string()
}

/// Escaped text wrapped by each mark in order; the first mark ends up innermost.
///
/// Quotes are escaped too, so prose quoting editor JSON never reads as a leak.
fn render_text(node: &RichTextNode) -> String {
    let text = node.text.as_deref().unwrap_or_default();
    let mut html = html_escape::encode_quoted_attribute(text).into_owned();
    for mark in &node.marks {
        html = match mark {
            Mark::Bold => format!("<strong>{html}</strong>"),
            Mark::Italic => format!("<em>{html}</em>"),
            Mark::Link { href } => {
                let href = html_escape::encode_double_quoted_attribute(
                    href.as_deref().unwrap_or_default(),
                );
                format!("<a href=\"{href}\" target=\"_blank\">{html}</a>")
            }
            Mark::Other(_) => html,
        };
    }
    html
}

fn heading_level(node: &RichTextNode) -> u8 {
    node.attributes
        .get("level")
        .and_then(Value::as_f64)
        .filter(|level| level.fract() == 0.0 && (1.0..=6.0).contains(level))
        .map(|level| level as u8)
        .unwrap_or(DEFAULT_HEADING_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn heading_level_defaults_and_bounds() {
        let plain = RichTextNode::new(NodeKind::Heading);
        assert_eq!(heading_level(&plain), 1);
        let three = RichTextNode::new(NodeKind::Heading).with_attribute("level", json!(3));
        assert_eq!(heading_level(&three), 3);
        let float = RichTextNode::new(NodeKind::Heading).with_attribute("level", json!(2.0));
        assert_eq!(heading_level(&float), 2);
        let huge = RichTextNode::new(NodeKind::Heading).with_attribute("level", json!(9));
        assert_eq!(heading_level(&huge), 1);
        let text = RichTextNode::new(NodeKind::Heading).with_attribute("level", json!("2"));
        assert_eq!(heading_level(&text), 1);
    }

    #[test]
    fn quotes_in_text_are_escaped() {
        let node = RichTextNode::text(r#"{"type":"module"} it's"#);
        let html = render_text(&node);
        assert_eq!(html, "{&quot;type&quot;:&quot;module&quot;} it&#x27;s");
        assert!(!leaks_editor_json(&html));
    }

    #[test]
    fn unknown_marks_leave_text_unchanged() {
        let node = RichTextNode::text("a<b").with_marks(vec![Mark::Other("strike".into())]);
        assert_eq!(render_text(&node), "a&lt;b");
    }

    #[test]
    fn link_without_href_renders_empty_target() {
        let node = RichTextNode::text("x").with_marks(vec![Mark::Link { href: None }]);
        assert_eq!(render_text(&node), "<a href=\"\" target=\"_blank\">x</a>");
    }

    #[test]
    fn leak_detection() {
        assert!(leaks_editor_json("<p>[{&quot;</p>"));
        assert!(leaks_editor_json("<p>{\"type\":\"x\"}</p>"));
        assert!(!leaks_editor_json("<p>fine</p>"));
    }
}
