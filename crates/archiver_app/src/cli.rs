use std::path::PathBuf;
use std::time::Duration;

use archiver_engine::{EngineConfig, PageSettings};
use clap::Parser;
use archiver_logging::LogDestination;
use log::LevelFilter;

const LOG_FILENAME: &str = "archive.log";

#[derive(Debug, Parser)]
#[command(name = "course-archiver")]
#[command(version, about = "Archive a Skool classroom for offline viewing", long_about = None)]
#[command(after_help = "EXAMPLES:
    course-archiver --url https://www.skool.com/group/classroom --cookie 'auth_token=...'
    SKOOL_COOKIE='auth_token=...' course-archiver --url https://www.skool.com/group/classroom -o archive")]
pub struct Cli {
    /// Classroom URL listing every course
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// Session cookie of a logged-in browser (`name=value; ...`)
    #[arg(long, env = "SKOOL_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Directory receiving the archive
    #[arg(short, long, value_name = "DIR", default_value = "downloads")]
    pub output: PathBuf,

    /// Seconds to wait before reading each page
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub wait: u64,

    /// Abort the whole run after this many seconds
    #[arg(long, value_name = "SECS", default_value_t = 1800)]
    pub timeout: u64,

    /// yt-dlp executable used for downloads
    #[arg(long = "yt-dlp", value_name = "PATH", default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub debug: bool,

    /// Log file (defaults to archive.log in the output directory)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log to the terminal only
    #[arg(long, conflicts_with_all = ["log_file", "quiet"])]
    pub no_log_file: bool,

    /// Log to the file only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            classroom_url: self.url.clone(),
            page: PageSettings {
                session_cookie: self.cookie.clone().filter(|cookie| !cookie.trim().is_empty()),
                ..PageSettings::default()
            },
            settle_wait: Duration::from_secs(self.wait),
            session_timeout: Duration::from_secs(self.timeout),
            downloader_program: self.yt_dlp.clone(),
            ..EngineConfig::default_with_output(self.output.clone())
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.output.join(LOG_FILENAME))
    }

    pub fn log_destination(&self) -> LogDestination {
        if self.no_log_file {
            LogDestination::Terminal
        } else if self.quiet {
            LogDestination::File(self.log_path())
        } else {
            LogDestination::Both(self.log_path())
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
