use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use archiver_engine::{
    load_manifest, Archiver, DownloadError, Downloader, EngineConfig, ModuleRecord, PageError,
    PageFailureKind, PageSource, PipelineError, VideoRecord, INDEX_PAGE, MODULE_PAGE,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

const CLASSROOM: &str = "https://x.test/classroom";
const COURSE: &str = "https://x.test/classroom/intro";
const MODULE: &str = "https://x.test/classroom/intro?md=m1";

#[derive(Default, Clone)]
struct FakePages {
    payloads: HashMap<String, String>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakePages {
    fn with(mut self, url: &str, payload: Value) -> Self {
        self.payloads.insert(url.to_string(), payload.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageSource for FakePages {
    async fn hydration_payload(&self, url: &str) -> Result<String, PageError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.payloads.get(url).cloned().ok_or_else(|| PageError {
            kind: PageFailureKind::HttpStatus(404),
            message: url.to_string(),
        })
    }
}

/// Writes a small file for every URL not containing one of `failing`.
#[derive(Default, Clone)]
struct FakeDownloader {
    failing: Vec<&'static str>,
    calls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl FakeDownloader {
    fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Downloader for FakeDownloader {
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        index: usize,
    ) -> Result<PathBuf, DownloadError> {
        self.calls.lock().unwrap().push((url.to_string(), index));
        if self.failing.iter().any(|part| url.contains(part)) {
            return Err(DownloadError::Exit {
                url: url.to_string(),
                status: Some(1),
            });
        }
        let target = dest_dir.join(format!("video-{index:02}.mp4"));
        fs::write(&target, b"mp4")?;
        Ok(target)
    }
}

fn config(output: &Path) -> EngineConfig {
    EngineConfig {
        classroom_url: CLASSROOM.to_string(),
        settle_wait: Duration::ZERO,
        clock: Arc::new(|| "2026-01-01T00:00:00Z".to_string()),
        ..EngineConfig::default_with_output(output.to_path_buf())
    }
}

fn description() -> String {
    let tree = json!([
        {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Start"}]},
        {"type": "paragraph", "content": [{"type": "text", "text": "Hello"}]}
    ]);
    format!("[v2]{tree}")
}

fn standard_pages() -> FakePages {
    FakePages::default()
        .with(
            CLASSROOM,
            json!({"props": {"pageProps": {"allCourses": [
                {"name": "intro", "metadata": {"title": "Intro"}}
            ]}}}),
        )
        .with(
            COURSE,
            json!({"props": {"pageProps": {"course": {"children": [
                {"course": {"id": "m1", "metadata": {"title": "Welcome"}}}
            ]}}}}),
        )
        .with(
            MODULE,
            json!({"props": {"pageProps": {"course": {"children": [
                {"course": {
                    "id": "m1",
                    "metadata": {"title": "Welcome", "desc": description(), "videoLink": "https://vimeo.com/111"},
                    "lessons": [{"videoLink": "https://vimeo.com/222"}]
                }}
            ]}}}}),
        )
}

fn archiver(output: &Path, pages: &FakePages, downloader: &FakeDownloader) -> Archiver {
    Archiver::new(
        config(output),
        Box::new(pages.clone()),
        Box::new(downloader.clone()),
    )
}

#[tokio::test]
async fn run_archives_module_and_writes_index_and_manifest() {
    let temp = TempDir::new().unwrap();
    let pages = standard_pages();
    let downloader = FakeDownloader::default();

    let manifest = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap();

    let module_dir = temp.path().join("Intro").join("Welcome");
    let page = fs::read_to_string(module_dir.join(MODULE_PAGE)).unwrap();
    assert!(page.contains("<h1>Welcome</h1>"));
    assert!(page.contains("<h2>Start</h2>"));
    assert!(page.contains(r#"<source src="video-01.mp4" type="video/mp4">"#));
    assert!(page.contains(r#"<source src="video-02.mp4" type="video/mp4">"#));
    let mut entries: Vec<String> = fs::read_dir(&module_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["module.html", "video-01.mp4", "video-02.mp4"]);

    let index = fs::read_to_string(temp.path().join(INDEX_PAGE)).unwrap();
    assert!(index.contains(r#"<a href="Intro/Welcome/module.html">Welcome</a>"#));

    assert_eq!(manifest.archived_utc, "2026-01-01T00:00:00Z");
    let module = &manifest.courses[0].modules[0];
    assert_eq!(
        module.videos,
        vec![
            VideoRecord {
                source_url: "https://player.vimeo.com/video/111".into(),
                filename: "video-01.mp4".into(),
            },
            VideoRecord {
                source_url: "https://player.vimeo.com/video/222".into(),
                filename: "video-02.mp4".into(),
            },
        ]
    );
    assert_eq!(load_manifest(temp.path()), Some(manifest));
}

#[tokio::test]
async fn failing_video_does_not_stop_the_next_one() {
    let temp = TempDir::new().unwrap();
    let pages = standard_pages();
    let downloader = FakeDownloader {
        failing: vec!["111"],
        ..FakeDownloader::default()
    };

    let manifest = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap();

    let module = &manifest.courses[0].modules[0];
    assert_eq!(
        module.videos,
        vec![VideoRecord {
            source_url: "https://player.vimeo.com/video/222".into(),
            filename: "video-02.mp4".into(),
        }]
    );
    let indexes: Vec<usize> = downloader.calls().iter().map(|(_, index)| *index).collect();
    assert_eq!(indexes, vec![1, 2]);

    let page = temp.path().join("Intro").join("Welcome").join(MODULE_PAGE);
    let html = fs::read_to_string(page).unwrap();
    assert!(!html.contains("video-01.mp4"));
    assert!(html.contains("video-02.mp4"));
}

#[tokio::test]
async fn existing_module_page_is_left_untouched() {
    let temp = TempDir::new().unwrap();
    let module_dir = temp.path().join("Intro").join("Welcome");
    fs::create_dir_all(&module_dir).unwrap();
    fs::write(module_dir.join(MODULE_PAGE), "archived earlier").unwrap();

    let pages = standard_pages();
    let downloader = FakeDownloader::default();
    let manifest = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(module_dir.join(MODULE_PAGE)).unwrap(),
        "archived earlier"
    );
    assert!(!pages.calls().contains(&MODULE.to_string()));
    assert!(downloader.calls().is_empty());
    assert_eq!(
        manifest.courses[0].modules,
        vec![ModuleRecord {
            title: "Welcome".into(),
            url: MODULE.into(),
            description_html: String::new(),
            videos: Vec::new(),
        }]
    );
}

#[tokio::test]
async fn skipped_module_keeps_previous_videos() {
    let temp = TempDir::new().unwrap();
    let pages = standard_pages();
    let downloader = FakeDownloader::default();

    let first = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap();
    let second = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap();

    assert_eq!(second.courses, first.courses);
    assert_eq!(downloader.calls().len(), 2);
}

#[tokio::test]
async fn unreadable_module_page_is_recorded_bare_and_retried_later() {
    let temp = TempDir::new().unwrap();
    let mut pages = standard_pages();
    pages.payloads.remove(MODULE);
    let downloader = FakeDownloader::default();

    let manifest = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap();

    let module = &manifest.courses[0].modules[0];
    assert_eq!(module.title, "Welcome");
    assert!(module.videos.is_empty());
    assert!(!temp
        .path()
        .join("Intro")
        .join("Welcome")
        .join(MODULE_PAGE)
        .exists());
}

#[tokio::test]
async fn course_listing_failure_aborts_the_run() {
    let temp = TempDir::new().unwrap();
    let pages = FakePages::default();
    let downloader = FakeDownloader::default();

    let err = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Page(_)));
}

#[tokio::test]
async fn course_without_module_listing_is_skipped() {
    let temp = TempDir::new().unwrap();
    let mut pages = standard_pages();
    pages.payloads.remove(COURSE);
    let downloader = FakeDownloader::default();

    let manifest = archiver(temp.path(), &pages, &downloader)
        .run()
        .await
        .unwrap();
    assert!(manifest.courses.is_empty());
    assert!(temp.path().join(INDEX_PAGE).exists());
}

#[tokio::test]
async fn session_timeout_cancels_the_run() {
    let temp = TempDir::new().unwrap();
    let pages = FakePages {
        delay: Some(Duration::from_millis(500)),
        ..standard_pages()
    };
    let downloader = FakeDownloader::default();
    let config = EngineConfig {
        session_timeout: Duration::from_millis(20),
        ..config(temp.path())
    };

    let archiver = Archiver::new(config, Box::new(pages), Box::new(downloader));
    let err = archiver.run_bounded().await.unwrap_err();
    assert!(matches!(err, PipelineError::SessionTimeout(limit) if limit == Duration::from_millis(20)));
}
