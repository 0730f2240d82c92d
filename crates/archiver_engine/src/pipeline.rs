use std::path::{Path, PathBuf};
use std::time::Duration;

use archiver_core::{render, PlannedVideo};
use archiver_logging::{archive_debug, archive_error, archive_info, archive_trace, archive_warn};

use crate::download::{video_filename, Downloader};
use crate::manifest::{load_manifest, save_manifest, ArchiveManifest};
use crate::page::PageSource;
use crate::pages::{index_page, module_page, INDEX_PAGE, MODULE_PAGE};
use crate::payload::{parse_courses, parse_modules};
use crate::persist::{create_dir, ensure_output_dir, file_exists_non_empty, write_atomically};
use crate::{
    Course, CourseRecord, EngineConfig, ModuleInfo, ModuleRecord, PipelineError, VideoRecord,
};

/// Walks every course and module of a classroom and archives it to disk.
pub struct Archiver {
    config: EngineConfig,
    pages: Box<dyn PageSource>,
    downloader: Box<dyn Downloader>,
}

impl Archiver {
    pub fn new(
        config: EngineConfig,
        pages: Box<dyn PageSource>,
        downloader: Box<dyn Downloader>,
    ) -> Self {
        Self {
            config,
            pages,
            downloader,
        }
    }

    /// [`Archiver::run`] cancelled once the session timeout elapses.
    pub async fn run_bounded(&self) -> Result<ArchiveManifest, PipelineError> {
        let limit = self.config.session_timeout;
        tokio::time::timeout(limit, self.run())
            .await
            .map_err(|_| PipelineError::SessionTimeout(limit))?
    }

    pub async fn run(&self) -> Result<ArchiveManifest, PipelineError> {
        let output_dir = &self.config.output_dir;
        ensure_output_dir(output_dir)?;
        let previous = load_manifest(output_dir);

        let courses = self.list_courses().await?;
        archive_info!("Found {} courses", courses.len());

        let mut records = Vec::with_capacity(courses.len());
        for course in &courses {
            let modules = match self.list_modules(course).await {
                Ok(modules) => modules,
                Err(err) => {
                    archive_error!("Skipping course {}: {}", course.title, err);
                    continue;
                }
            };
            archive_info!("Course {}: {} modules", course.title, modules.len());

            let course_dir = output_dir.join(&course.title);
            let mut module_records = Vec::with_capacity(modules.len());
            for module in &modules {
                let remembered = previous
                    .as_ref()
                    .and_then(|manifest| manifest.find_module(&course.title, &module.title));
                module_records.push(self.process_module(module, &course_dir, remembered).await);
            }

            records.push(CourseRecord {
                title: course.title.clone(),
                url: course.url.clone(),
                modules: module_records,
            });
        }

        write_atomically(&output_dir.join(INDEX_PAGE), &index_page(&records))?;

        let manifest = ArchiveManifest {
            archived_utc: (self.config.clock)(),
            courses: records,
        };
        save_manifest(output_dir, &manifest);
        Ok(manifest)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, PipelineError> {
        let url = &self.config.classroom_url;
        let payload = self.read_payload(url).await?;
        let courses = parse_courses(&payload, url)?;
        if courses.is_empty() {
            archive_warn!("No courses listed at {}", url);
        }
        Ok(courses)
    }

    pub async fn list_modules(&self, course: &Course) -> Result<Vec<ModuleInfo>, PipelineError> {
        let payload = self.read_payload(&course.url).await?;
        Ok(parse_modules(&payload, &course.url)?)
    }

    /// Archive one module; failures are logged and yield a title/URL-only record.
    ///
    /// A module whose page already exists is left alone and keeps what the
    /// previous run remembered about it.
    pub async fn process_module(
        &self,
        module: &ModuleInfo,
        course_dir: &Path,
        remembered: Option<&ModuleRecord>,
    ) -> ModuleRecord {
        let module_dir = course_dir.join(&module.title);
        if file_exists_non_empty(&module_dir.join(MODULE_PAGE)) {
            archive_info!("Skipping module {} (already archived)", module.title);
            return match remembered {
                Some(record) => ModuleRecord {
                    title: module.title.clone(),
                    url: module.url.clone(),
                    ..record.clone()
                },
                None => ModuleRecord::bare(module),
            };
        }

        match self.archive_module(module, module_dir).await {
            Ok(record) => record,
            Err(err) => {
                archive_error!("Module {} failed: {}", module.title, err);
                ModuleRecord::bare(module)
            }
        }
    }

    async fn archive_module(
        &self,
        module: &ModuleInfo,
        module_dir: PathBuf,
    ) -> Result<ModuleRecord, PipelineError> {
        create_dir(&module_dir)?;
        let payload = self.read_payload(&module.url).await?;
        let rendered = render(&module.id, &payload);
        archive_debug!(
            "Module {}: {} videos planned",
            module.title,
            rendered.plan.len()
        );

        let videos = self
            .download_videos(&module.title, &module_dir, &rendered.plan)
            .await;
        let page = module_page(&module.title, &rendered.description_html, &videos);
        write_atomically(&module_dir.join(MODULE_PAGE), &page)?;

        Ok(ModuleRecord {
            title: module.title.clone(),
            url: module.url.clone(),
            description_html: rendered.description_html,
            videos,
        })
    }

    /// Try every candidate of each planned video; the first success wins.
    async fn download_videos(
        &self,
        module_title: &str,
        module_dir: &Path,
        plan: &[PlannedVideo],
    ) -> Vec<VideoRecord> {
        let mut videos = Vec::new();
        for (position, planned) in plan.iter().enumerate() {
            let index = position + 1;
            let mut fetched = None;
            for candidate in &planned.candidates {
                archive_trace!("Trying {} for video {} of {}", candidate, index, module_title);
                match self.downloader.download(candidate, module_dir, index).await {
                    Ok(path) => {
                        fetched = Some(VideoRecord {
                            source_url: candidate.clone(),
                            filename: path
                                .file_name()
                                .map(|name| name.to_string_lossy().into_owned())
                                .unwrap_or_else(|| video_filename(index)),
                        });
                        break;
                    }
                    Err(err) => archive_warn!("Attempt {} failed: {}", candidate, err),
                }
            }
            match fetched {
                Some(record) => {
                    archive_info!("Saved {} in {}", record.filename, module_title);
                    videos.push(record);
                }
                None => archive_error!(
                    "Video {} of {} could not be downloaded ({})",
                    index,
                    module_title,
                    planned.media.reference
                ),
            }
        }
        videos
    }

    async fn read_payload(&self, url: &str) -> Result<String, PipelineError> {
        self.settle().await;
        archive_debug!("Reading payload from {}", url);
        Ok(self.pages.hydration_payload(url).await?)
    }

    async fn settle(&self) {
        let wait = self.config.settle_wait;
        if wait > Duration::ZERO {
            tokio::time::sleep(wait).await;
        }
    }
}
