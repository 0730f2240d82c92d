use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Embeddable player endpoint; `/{id}` is appended.
pub const PLAYER_BASE: &str = "https://player.vimeo.com/video";
/// Canonical watch page host.
pub const CANONICAL_BASE: &str = "https://vimeo.com";

const PLAYER_HOST: &str = "player.vimeo.com";
const HOST_DOMAIN: &str = "vimeo.com";
const VIDEO_SEGMENT: &str = "video";
const HASH_PARAM: &str = "h";

static ID_AND_HASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"vimeo\.com/(?:video/)?(\d+)(?:/([a-zA-Z0-9]+))?").expect("valid regex")
});
static ID_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)vimeo\.com/(?:video/)?(\d+)").expect("valid regex"));

/// Numeric id and optional access hash of a hosted video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct VideoRef {
    id: String,
    hash: String,
}

impl VideoRef {
    /// `video/{id}/{hash}` or `{id}/{hash}` path shapes.
    fn from_path(url: &Url) -> Self {
        let segments: Vec<&str> = url.path().trim_matches('/').split('/').collect();
        let (id, hash) = match segments.as_slice() {
            [VIDEO_SEGMENT, rest @ ..] => (rest.first(), rest.get(1)),
            [first, rest @ ..] => (Some(first), rest.first()),
            [] => (None, None),
        };
        Self {
            id: id.map(|s| s.to_string()).unwrap_or_default(),
            hash: hash.map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    fn hash_param(url: &Url) -> Option<String> {
        url.query_pairs()
            .find(|(key, _)| key == HASH_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

/// Ordered playable URLs to try for one hosted link, most canonical first.
///
/// The original link is always part of the result, so the list is never
/// empty. A hash-less link already on the player host is its own only
/// candidate, and links on other hosts are only tried verbatim.
pub fn candidate_urls(link: &str) -> Vec<String> {
    // Ids are read from Vimeo hosts only; a Loom share path would otherwise
    // yield a bogus `player.vimeo.com/video/share` candidate.
    let (video, on_player_host) = match Url::parse(link) {
        Ok(url) if !is_vimeo_host(&url) => (VideoRef::default(), false),
        Ok(url) => {
            let mut video = VideoRef::from_path(&url);
            if let Some(hash) = VideoRef::hash_param(&url) {
                video.hash = hash;
            }
            (video, url.host_str() == Some(PLAYER_HOST))
        }
        Err(_) => (match_id_and_hash(link), false),
    };

    if on_player_host && video.hash.is_empty() {
        return vec![link.to_string()];
    }

    let mut urls = Vec::with_capacity(5);
    if !video.id.is_empty() {
        let VideoRef { id, hash } = &video;
        if !hash.is_empty() {
            urls.push(format!("{PLAYER_BASE}/{id}?h={hash}"));
        }
        urls.push(format!("{PLAYER_BASE}/{id}"));
        if !hash.is_empty() {
            urls.push(format!("{CANONICAL_BASE}/{id}/{hash}"));
        }
        urls.push(format!("{CANONICAL_BASE}/{id}"));
    }
    if !urls.iter().any(|url| url == link) {
        urls.push(link.to_string());
    }
    urls
}

/// Rewrite a hosted link into its player form, leaving anything that does
/// not resolve to a video id untouched.
pub fn rewrite_to_player(link: &str) -> String {
    if link.contains(PLAYER_HOST) {
        return link.to_string();
    }
    let Ok(url) = Url::parse(link) else {
        return link.to_string();
    };
    // Same host restriction as `candidate_urls`.
    if !is_vimeo_host(&url) {
        return link.to_string();
    }

    let path_ref = VideoRef::from_path(&url);
    let hash = if path_ref.hash.is_empty() {
        VideoRef::hash_param(&url).unwrap_or_default()
    } else {
        path_ref.hash
    };
    let id = if path_ref.id.is_empty() {
        ID_ONLY
            .captures(link)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    } else {
        path_ref.id
    };

    match (id.is_empty(), hash.is_empty()) {
        (true, _) => link.to_string(),
        (false, true) => format!("{PLAYER_BASE}/{id}"),
        (false, false) => format!("{PLAYER_BASE}/{id}?h={hash}"),
    }
}

/// Only Vimeo paths carry a numeric id; other hosts are passed through.
fn is_vimeo_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == HOST_DOMAIN || host.ends_with(&format!(".{HOST_DOMAIN}"))
    })
}

fn match_id_and_hash(link: &str) -> VideoRef {
    let Some(caps) = ID_AND_HASH.captures(link) else {
        return VideoRef::default();
    };
    VideoRef {
        id: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
        hash: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
    }
}
