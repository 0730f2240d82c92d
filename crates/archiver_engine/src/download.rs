use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use archiver_logging::{archive_debug, archive_info};

use crate::persist::file_exists_non_empty;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to launch downloader: {0}")]
    Spawn(#[from] io::Error),
    #[error("downloader exited with {status:?} for {url}")]
    Exit { url: String, status: Option<i32> },
}

/// Fetches one video into `dest_dir` as `video-{index:02}.mp4`.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        index: usize,
    ) -> Result<PathBuf, DownloadError>;
}

/// Local file name of the `index`-th video of a module.
pub fn video_filename(index: usize) -> String {
    format!("video-{index:02}.mp4")
}

/// Runs the `yt-dlp` executable once per attempt.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    program: PathBuf,
}

impl YtDlpDownloader {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new(PathBuf::from("yt-dlp"))
    }
}

#[async_trait::async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        index: usize,
    ) -> Result<PathBuf, DownloadError> {
        let target = dest_dir.join(video_filename(index));
        if file_exists_non_empty(&target) {
            archive_info!("Skipping existing file {}", target.display());
            return Ok(target);
        }

        let template = dest_dir.join(format!("video-{index:02}.%(ext)s"));
        archive_debug!("Running {} for {}", self.program.display(), url);
        let status = Command::new(&self.program)
            .arg("-o")
            .arg(&template)
            .arg(url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await?;

        if !status.success() {
            return Err(DownloadError::Exit {
                url: url.to_string(),
                status: status.code(),
            });
        }
        Ok(target)
    }
}
