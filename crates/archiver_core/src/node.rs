use serde::Deserialize;
use serde_json::{Map, Value};

/// Node type tag of a rich-text document tree.
///
/// Type strings the renderer does not know about decode to [`NodeKind::Other`]
/// so that newer editor output still renders its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    HardBreak,
    Other(String),
}

impl From<&str> for NodeKind {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => NodeKind::Text,
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "bulletList" => NodeKind::BulletList,
            "orderedList" => NodeKind::OrderedList,
            "listItem" => NodeKind::ListItem,
            "blockquote" => NodeKind::Blockquote,
            "hardBreak" => NodeKind::HardBreak,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

/// Inline annotation attached to a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Link { href: Option<String> },
    Other(String),
}

impl Mark {
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            href: Some(href.into()),
        }
    }
}

#[derive(Deserialize)]
struct RawMark {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    attrs: Option<Map<String, Value>>,
}

impl From<RawMark> for Mark {
    fn from(raw: RawMark) -> Self {
        match raw.kind.as_deref().unwrap_or_default() {
            "bold" => Mark::Bold,
            "italic" => Mark::Italic,
            "link" => Mark::Link {
                href: raw
                    .attrs
                    .as_ref()
                    .and_then(|attrs| attrs.get("href"))
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            },
            other => Mark::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Mark {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawMark::deserialize(deserializer).map(Mark::from)
    }
}

/// One node of a parsed rich-text document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub struct RichTextNode {
    pub kind: NodeKind,
    pub text: Option<String>,
    pub marks: Vec<Mark>,
    pub attributes: Map<String, Value>,
    pub children: Vec<RichTextNode>,
}

// `null` and missing fields are both accepted for every optional part.
#[derive(Deserialize)]
struct RawNode {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    marks: Option<Vec<Mark>>,
    #[serde(default)]
    attrs: Option<Map<String, Value>>,
    #[serde(default)]
    content: Option<Vec<RichTextNode>>,
}

impl From<RawNode> for RichTextNode {
    fn from(raw: RawNode) -> Self {
        Self {
            kind: NodeKind::from(raw.kind.as_deref().unwrap_or_default()),
            text: raw.text,
            marks: raw.marks.unwrap_or_default(),
            attributes: raw.attrs.unwrap_or_default(),
            children: raw.content.unwrap_or_default(),
        }
    }
}

impl RichTextNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: None,
            marks: Vec::new(),
            attributes: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::new(NodeKind::Text)
        }
    }

    pub fn with_children(mut self, children: Vec<RichTextNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Visits this node and all descendants in document order (pre-order).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RichTextNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
