use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Desktop browser user agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct PageSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub user_agent: String,
    /// Value of the `Cookie` header identifying the logged-in session.
    pub session_cookie: Option<String>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_bytes: 20 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_cookie: None,
        }
    }
}

/// Returns the timestamp recorded in the run manifest.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub classroom_url: String,
    pub output_dir: PathBuf,
    pub page: PageSettings,
    /// Pause before each page read.
    pub settle_wait: Duration,
    /// Wall-clock bound on a whole run.
    pub session_timeout: Duration,
    pub downloader_program: PathBuf,
    pub clock: Clock,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            classroom_url: String::new(),
            output_dir,
            page: PageSettings::default(),
            settle_wait: Duration::from_secs(5),
            session_timeout: Duration::from_secs(1800),
            downloader_program: PathBuf::from("yt-dlp"),
            clock: Arc::new(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::default_with_output(PathBuf::from("downloads"))
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("classroom_url", &self.classroom_url)
            .field("output_dir", &self.output_dir)
            .field("page", &self.page)
            .field("settle_wait", &self.settle_wait)
            .field("session_timeout", &self.session_timeout)
            .field("downloader_program", &self.downloader_program)
            .finish_non_exhaustive()
    }
}
