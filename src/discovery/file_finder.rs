use crate::config::Config;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Type of project file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Serialized scene document
    Scene,
    /// Script artifact subject to usage analysis
    Script,
}

impl FileType {
    /// Determine file type from path using the configured extensions
    pub fn from_path(path: &Path, config: &Config) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        if config.scene_extensions.iter().any(|e| e == extension) {
            Some(FileType::Scene)
        } else if config.script_extensions.iter().any(|e| e == extension) {
            Some(FileType::Script)
        } else {
            None
        }
    }
}

/// Represents a discovered project file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path to the file
    pub path: PathBuf,

    /// Type of file
    pub file_type: FileType,
}

impl SourceFile {
    pub fn new(path: PathBuf, file_type: FileType) -> Self {
        Self { path, file_type }
    }

    /// Path of the sidecar metadata file paired with this file
    pub fn sidecar(&self, suffix: &str) -> PathBuf {
        sidecar_path(&self.path, suffix)
    }
}

/// `Player.cs` + `meta` -> `Player.cs.meta`
pub fn sidecar_path(artifact: &Path, suffix: &str) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// File finder for discovering scenes and scripts in a project
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find scene documents under the configured scene directories
    pub fn find_scenes(&self, root: &Path) -> Vec<SourceFile> {
        let targets: Vec<PathBuf> = self
            .config
            .scene_dirs
            .iter()
            .map(|d| root.join(d))
            .collect();
        let scenes = self.find_in(root, &targets, FileType::Scene);
        debug!("Found {} scene documents", scenes.len());
        scenes
    }

    /// Find script artifacts anywhere in the project
    pub fn find_scripts(&self, root: &Path) -> Vec<SourceFile> {
        let scripts = self.find_in(root, &[root.to_path_buf()], FileType::Script);
        debug!("Found {} scripts", scripts.len());
        scripts
    }

    fn find_in(&self, root: &Path, targets: &[PathBuf], wanted: FileType) -> Vec<SourceFile> {
        let mut files: Vec<SourceFile> = targets
            .par_iter()
            .flat_map(|target| self.scan_directory(root, target))
            .filter(|file| file.file_type == wanted)
            .collect();

        // Overlapping targets must not yield a file twice
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        files
    }

    /// Scan a single directory for project files.
    ///
    /// Exclusion patterns see paths relative to the project root, so the
    /// directories the project itself lives in never match them.
    fn scan_directory(&self, root: &Path, dir: &Path) -> Vec<SourceFile> {
        if !dir.exists() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }

        let walker = WalkBuilder::new(dir)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .ignore(true)
            .parents(true)
            .follow_links(false)
            .build();

        walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();
                let relative = path.strip_prefix(root).unwrap_or(path);

                if self.config.should_exclude(relative) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                let file_type = FileType::from_path(path, self.config)?;

                trace!("Found {:?}: {}", file_type, path.display());
                Some(SourceFile::new(path.to_path_buf(), file_type))
            })
            .collect()
    }
}
