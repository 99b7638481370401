//! Project-wide analysis
//!
//! The [`Analyzer`] registers every script, then processes every scene
//! document, and finally reports the scripts no scene object uses.

mod analyzer;

pub use analyzer::Analyzer;

use crate::hierarchy::HierarchyIssue;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a run before any processing happens
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Project path not found: {0}")]
    ProjectNotFound(PathBuf),
    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A registered script that no scene object uses
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnusedScript {
    /// Path relative to the project root, forward slashes
    pub relative_path: String,
    pub guid: String,
}

/// Outcome of one successfully processed scene
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub scene: PathBuf,
    /// `None` when an earlier scene with the same file name owns the dump
    pub dump: Option<PathBuf>,
    pub objects: usize,
    pub components: usize,
    pub malformed_blocks: usize,
    pub issues: Vec<HierarchyIssue>,
}

/// A scene that could not be processed
#[derive(Debug, Clone)]
pub struct SceneFailure {
    pub scene: PathBuf,
    pub reason: String,
}

/// Result of a whole run
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub unused: Vec<UnusedScript>,
    pub scripts_found: usize,
    pub scripts_registered: usize,
    pub scenes: Vec<SceneSummary>,
    pub failed_scenes: Vec<SceneFailure>,
}

impl AnalysisReport {
    pub fn scenes_processed(&self) -> usize {
        self.scenes.len()
    }

    pub fn used_count(&self) -> usize {
        self.scripts_registered - self.unused.len()
    }

    pub fn cycle_count(&self) -> usize {
        self.scenes
            .iter()
            .flat_map(|s| s.issues.iter())
            .filter(|issue| issue.is_cycle())
            .count()
    }
}

/// Project-relative path with forward slashes
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
