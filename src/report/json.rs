use crate::analysis::{relative_path, AnalysisReport, UnusedScript};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: PathBuf,
    project_root: PathBuf,
}

impl JsonReporter {
    pub fn new(output_path: PathBuf, project_root: &Path) -> Self {
        Self {
            output_path,
            project_root: project_root.to_path_buf(),
        }
    }

    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        let json_report = JsonReport::from_report(report, &self.project_root);
        let json = serde_json::to_string_pretty(&json_report).into_diagnostic()?;
        std::fs::write(&self.output_path, &json).into_diagnostic()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    unused: &'a [UnusedScript],
    scenes: Vec<JsonScene>,
    failed_scenes: Vec<JsonFailure>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonScene {
    scene: String,
    objects: usize,
    components: usize,
    malformed_blocks: usize,
    cycles: usize,
}

#[derive(Serialize)]
struct JsonFailure {
    scene: String,
    reason: String,
}

#[derive(Serialize)]
struct JsonSummary {
    scripts_found: usize,
    scripts_registered: usize,
    scripts_used: usize,
    scripts_unused: usize,
    scenes_processed: usize,
    scenes_failed: usize,
}

impl<'a> JsonReport<'a> {
    fn from_report(report: &'a AnalysisReport, root: &Path) -> Self {
        let scenes = report
            .scenes
            .iter()
            .map(|s| JsonScene {
                scene: relative_path(root, &s.scene),
                objects: s.objects,
                components: s.components,
                malformed_blocks: s.malformed_blocks,
                cycles: s.issues.iter().filter(|i| i.is_cycle()).count(),
            })
            .collect();

        let failed_scenes = report
            .failed_scenes
            .iter()
            .map(|f| JsonFailure {
                scene: relative_path(root, &f.scene),
                reason: f.reason.clone(),
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION"),
            unused: &report.unused,
            scenes,
            failed_scenes,
            summary: JsonSummary {
                scripts_found: report.scripts_found,
                scripts_registered: report.scripts_registered,
                scripts_used: report.used_count(),
                scripts_unused: report.unused.len(),
                scenes_processed: report.scenes_processed(),
                scenes_failed: report.failed_scenes.len(),
            },
        }
    }
}
