use std::collections::HashSet;

use serde_json::Value;

use crate::canonical::rewrite_to_player;
use crate::node::{Mark, RichTextNode};

/// Payload key under which the platform stores machine-generated video links.
pub const VIDEO_LINK_KEY: &str = "videoLink";

/// Substrings identifying hyperlinks to supported video hosts.
pub const HOSTING_DOMAINS: [&str; 2] = ["loom.com", "vimeo.com"];

/// A playable URL together with the raw reference it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCandidate {
    pub url: String,
    pub reference: String,
}

/// Collect every non-empty string stored under [`VIDEO_LINK_KEY`] anywhere
/// in an untyped payload, in traversal order.
pub fn collect_video_links(payload: &Value) -> Vec<String> {
    let mut links = Vec::new();
    visit_value(payload, &mut links);
    links
}

fn visit_value(value: &Value, links: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == VIDEO_LINK_KEY {
                    if let Value::String(link) = child {
                        if !link.is_empty() {
                            links.push(link.clone());
                        }
                    }
                }
                visit_value(child, links);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_value(item, links);
            }
        }
        _ => {}
    }
}

/// Every link-mark target in the tree, in document order.
pub fn collect_link_marks(nodes: &[RichTextNode]) -> Vec<String> {
    let mut hrefs = Vec::new();
    for node in nodes {
        node.walk(&mut |n| {
            for mark in &n.marks {
                if let Mark::Link { href: Some(href) } = mark {
                    hrefs.push(href.clone());
                }
            }
        });
    }
    hrefs
}

/// Link-mark targets pointing at a supported video host, deduplicated.
pub fn extract_hosted_links(nodes: &[RichTextNode]) -> Vec<String> {
    dedupe(collect_link_marks(nodes))
        .into_iter()
        .filter(|link| is_hosted_video(link))
        .collect()
}

fn is_hosted_video(link: &str) -> bool {
    let lower = link.to_lowercase();
    HOSTING_DOMAINS.iter().any(|domain| lower.contains(domain))
}

/// Remove repeated strings, keeping the first occurrence of each.
pub fn dedupe<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Build a module's video list: payload references rewritten to their player
/// form first, then description hyperlinks unchanged, deduplicated by URL.
pub fn merge_candidates(video_links: &[String], hosted_links: &[String]) -> Vec<MediaCandidate> {
    let mut seen = HashSet::new();
    video_links
        .iter()
        .map(|reference| MediaCandidate {
            url: rewrite_to_player(reference),
            reference: reference.clone(),
        })
        .chain(hosted_links.iter().map(|link| MediaCandidate {
            url: link.clone(),
            reference: link.clone(),
        }))
        .filter(|candidate| seen.insert(candidate.url.clone()))
        .collect()
}
