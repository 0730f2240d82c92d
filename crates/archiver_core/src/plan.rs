use archiver_logging::{archive_debug, archive_warn};
use serde_json::Value;

use crate::canonical::candidate_urls;
use crate::document::{parse_document, plain_text_document};
use crate::media::{collect_video_links, extract_hosted_links, merge_candidates, MediaCandidate};
use crate::render::{leaks_editor_json, render_description};

/// One video to fetch: the merged reference and the URLs to try, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedVideo {
    pub media: MediaCandidate,
    pub candidates: Vec<String>,
}

impl PlannedVideo {
    pub fn new(media: MediaCandidate) -> Self {
        let candidates = candidate_urls(&media.url);
        Self { media, candidates }
    }
}

/// Output of [`render`]: the description fragment and the download plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRender {
    pub description_html: String,
    pub plan: Vec<PlannedVideo>,
}

/// Render one module out of a page hydration payload.
///
/// A payload that is not JSON, or that does not list the module, yields an
/// empty render rather than an error.
pub fn render(module_id: &str, raw_payload: &str) -> ModuleRender {
    match serde_json::from_str::<Value>(raw_payload) {
        Ok(payload) => render_payload(module_id, &payload),
        Err(err) => {
            archive_warn!("Payload for module {} is not valid JSON: {}", module_id, err);
            ModuleRender::default()
        }
    }
}

pub fn render_payload(module_id: &str, payload: &Value) -> ModuleRender {
    let Some(module) = find_module(payload, module_id) else {
        archive_warn!("Module {} not found in page payload", module_id);
        return ModuleRender::default();
    };

    let description = module_description(module);
    let nodes = parse_document(description);
    let mut description_html = render_description(&nodes);
    if leaks_editor_json(&description_html) {
        archive_debug!("Rendered description of module {} still holds editor JSON", module_id);
        description_html = render_description(&plain_text_document(description));
    }

    let video_links = collect_video_links(module);
    let hosted_links = extract_hosted_links(&nodes);
    archive_debug!(
        "Module {}: {} payload video link(s), {} description link(s)",
        module_id,
        video_links.len(),
        hosted_links.len()
    );

    let plan = merge_candidates(&video_links, &hosted_links)
        .into_iter()
        .map(PlannedVideo::new)
        .collect();

    ModuleRender {
        description_html,
        plan,
    }
}

/// The `course` object of the child whose id matches `module_id`.
pub fn find_module<'a>(payload: &'a Value, module_id: &str) -> Option<&'a Value> {
    payload
        .pointer("/props/pageProps/course/children")?
        .as_array()?
        .iter()
        .filter_map(|child| child.get("course"))
        .find(|course| course.get("id").and_then(Value::as_str) == Some(module_id))
}

pub fn module_description(module: &Value) -> &str {
    module
        .pointer("/metadata/desc")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
