//! Archiver engine: page access, downloads, persistence and the archive pipeline.
mod config;
mod download;
mod filename;
mod manifest;
mod page;
mod pages;
mod payload;
mod persist;
mod pipeline;
mod types;

pub use config::{Clock, EngineConfig, PageSettings, DEFAULT_USER_AGENT};
pub use download::{video_filename, DownloadError, Downloader, YtDlpDownloader};
pub use filename::clean_title;
pub use manifest::{load_manifest, save_manifest, ArchiveManifest, MANIFEST_FILENAME};
pub use page::{HttpPageSource, PageSource};
pub use pages::{index_page, module_page, INDEX_PAGE, MODULE_PAGE};
pub use payload::{
    decode_body, extract_hydration_payload, parse_courses, parse_modules, PAYLOAD_SELECTOR,
};
pub use persist::{
    create_dir, ensure_output_dir, file_exists_non_empty, write_atomically, PersistError,
};
pub use pipeline::Archiver;
pub use types::{
    Course, CourseRecord, ModuleInfo, ModuleRecord, PageError, PageFailureKind, PipelineError,
    VideoRecord,
};
