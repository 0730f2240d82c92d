use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::persist::PersistError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// A video that was materialized locally, and the candidate URL that worked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub source_url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub title: String,
    pub url: String,
    pub description_html: String,
    pub videos: Vec<VideoRecord>,
}

impl ModuleRecord {
    /// Title and URL only; used for skipped and failed modules.
    pub fn bare(module: &ModuleInfo) -> Self {
        Self {
            title: module.title.clone(),
            url: module.url.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CourseRecord {
    pub title: String,
    pub url: String,
    pub modules: Vec<ModuleRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub kind: PageFailureKind,
    pub message: String,
}

impl PageError {
    pub(crate) fn new(kind: PageFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PageError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailureKind {
    InvalidUrl,
    InvalidHeader,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    Decode,
    MissingPayload,
}

impl fmt::Display for PageFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageFailureKind::InvalidUrl => write!(f, "invalid url"),
            PageFailureKind::InvalidHeader => write!(f, "invalid header value"),
            PageFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            PageFailureKind::Timeout => write!(f, "timeout"),
            PageFailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "page too large (max {max_bytes}, actual {actual:?})")
            }
            PageFailureKind::Network => write!(f, "network error"),
            PageFailureKind::Decode => write!(f, "undecodable page"),
            PageFailureKind::MissingPayload => write!(f, "hydration payload missing"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("page error: {0}")]
    Page(#[from] PageError),
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("session timed out after {0:?}")]
    SessionTimeout(Duration),
}
