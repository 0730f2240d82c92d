use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use archiver_logging::{archive_error, archive_info, archive_warn};

use crate::persist::{create_dir, write_atomically};
use crate::{CourseRecord, ModuleRecord};

pub const MANIFEST_FILENAME: &str = ".archive_state.ron";

/// What the last run archived, kept at the output root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArchiveManifest {
    pub archived_utc: String,
    pub courses: Vec<CourseRecord>,
}

impl ArchiveManifest {
    pub fn find_module(&self, course_title: &str, module_title: &str) -> Option<&ModuleRecord> {
        self.courses
            .iter()
            .filter(|course| course.title == course_title)
            .flat_map(|course| course.modules.iter())
            .find(|module| module.title == module_title)
    }
}

/// Previous manifest, or `None` when missing or unreadable.
pub fn load_manifest(output_dir: &Path) -> Option<ArchiveManifest> {
    let path = output_dir.join(MANIFEST_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            archive_warn!("Failed to read archive manifest from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str::<ArchiveManifest>(&content) {
        Ok(manifest) => {
            archive_info!("Loaded archive manifest from {:?}", path);
            Some(manifest)
        }
        Err(err) => {
            archive_warn!("Failed to parse archive manifest from {:?}: {}", path, err);
            None
        }
    }
}

pub fn save_manifest(output_dir: &Path, manifest: &ArchiveManifest) {
    if let Err(err) = create_dir(output_dir) {
        archive_error!("Failed to ensure output dir {:?}: {}", output_dir, err);
        return;
    }

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(manifest, pretty) {
        Ok(text) => text,
        Err(err) => {
            archive_error!("Failed to serialize archive manifest: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomically(&output_dir.join(MANIFEST_FILENAME), &content) {
        archive_error!(
            "Failed to write archive manifest to {:?}: {}",
            output_dir,
            err
        );
    }
}
