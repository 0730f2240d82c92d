//! Archiver core: pure document model, rendering and media extraction.
mod canonical;
mod document;
mod media;
mod node;
mod plan;
mod render;

pub use canonical::{candidate_urls, rewrite_to_player, CANONICAL_BASE, PLAYER_BASE};
pub use document::{parse_document, plain_text_document, VERSION_MARKER};
pub use media::{
    collect_link_marks, collect_video_links, dedupe, extract_hosted_links, merge_candidates,
    MediaCandidate, HOSTING_DOMAINS, VIDEO_LINK_KEY,
};
pub use node::{Mark, NodeKind, RichTextNode};
pub use plan::{find_module, module_description, render, render_payload, ModuleRender, PlannedVideo};
pub use render::{leaks_editor_json, render_description, render_nodes};
