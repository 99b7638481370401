use super::{relative_path, AnalysisError, AnalysisReport, SceneFailure, SceneSummary, UnusedScript};
use crate::config::Config;
use crate::discovery::{FileFinder, SourceFile};
use crate::hierarchy::Hierarchy;
use crate::registry::{IdentifierRegistry, UsedSet};
use crate::scene::{ComponentRef, SceneDocument, SceneParser};
use crate::usage::UsageResolver;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Shared state of one run, handed to every worker
struct RunContext<'a> {
    registry: &'a IdentifierRegistry,
    used: &'a UsedSet,
    resolver: &'a UsageResolver,
    scene_parser: &'a SceneParser,
}

/// Runs the full registry -> scenes -> unused-set pipeline
pub struct Analyzer<'a> {
    config: &'a Config,
    progress: bool,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            progress: false,
        }
    }

    /// Show a progress bar over scene documents
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(
        &self,
        project_root: &Path,
        output_dir: &Path,
    ) -> Result<AnalysisReport, AnalysisError> {
        if !project_root.exists() {
            return Err(AnalysisError::ProjectNotFound(project_root.to_path_buf()));
        }
        if !project_root.is_dir() {
            return Err(AnalysisError::NotADirectory(project_root.to_path_buf()));
        }
        std::fs::create_dir_all(output_dir).map_err(|source| AnalysisError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let finder = FileFinder::new(self.config);
        let scripts = finder.find_scripts(project_root);
        let scenes = finder.find_scenes(project_root);
        info!("Found {} scripts and {} scenes", scripts.len(), scenes.len());

        // Phase 1: every script must be registered before any scene is resolved
        let registry = IdentifierRegistry::new();
        scripts.par_iter().for_each(|script| {
            let sidecar = script.sidecar(&self.config.meta_suffix);
            if let Some(guid) = registry.register(&script.path, &sidecar) {
                trace!("Registered {} as {}", script.path.display(), guid);
            }
        });
        info!("Registered {} of {} scripts", registry.len(), scripts.len());

        // Phase 2: scenes
        let used = UsedSet::new();
        let resolver = UsageResolver::from_config(self.config);
        let scene_parser = SceneParser::from_config(self.config);
        let ctx = RunContext {
            registry: &registry,
            used: &used,
            resolver: &resolver,
            scene_parser: &scene_parser,
        };

        let dumps = self.plan_dumps(&scenes, output_dir);
        let pb = self.progress_bar(scenes.len());
        let outcomes: Vec<Result<SceneSummary, SceneFailure>> = scenes
            .par_iter()
            .zip(dumps.par_iter())
            .map(|(scene, dump)| {
                let outcome = self.process_scene(scene, dump.as_deref(), &ctx);
                pb.inc(1);
                outcome
            })
            .collect();
        pb.finish_and_clear();

        let mut report = AnalysisReport {
            scripts_found: scripts.len(),
            scripts_registered: registry.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                Ok(summary) => report.scenes.push(summary),
                Err(failure) => {
                    warn!("Skipped scene {}: {}", failure.scene.display(), failure.reason);
                    report.failed_scenes.push(failure);
                }
            }
        }

        // Phase 3: registered minus used
        let used = used.snapshot();
        report.unused = registry
            .records()
            .into_iter()
            .filter(|record| !used.contains(&record.identifier))
            .map(|record| UnusedScript {
                relative_path: relative_path(project_root, &record.location),
                guid: record.identifier,
            })
            .collect();
        report.unused.sort();

        info!(
            "{} scenes processed, {} failed, {} of {} scripts unused",
            report.scenes_processed(),
            report.failed_scenes.len(),
            report.unused.len(),
            report.scripts_registered
        );

        Ok(report)
    }

    /// Dump target of every scene, in discovery order.
    ///
    /// Dumps are named after the scene's file name, so of several same-named
    /// scenes only the first in path order gets one.
    fn plan_dumps(&self, scenes: &[SourceFile], output_dir: &Path) -> Vec<Option<PathBuf>> {
        let mut owners: HashMap<PathBuf, &Path> = HashMap::new();
        let mut dumps = Vec::with_capacity(scenes.len());

        for scene in scenes {
            let Some(file_name) = scene.path.file_name() else {
                dumps.push(None);
                continue;
            };
            let dump = output_dir.join(format!(
                "{}.{}",
                file_name.to_string_lossy(),
                self.config.report.dump_suffix
            ));

            if let Some(owner) = owners.get(&dump) {
                warn!(
                    "{} has the same file name as {}; only the latter is dumped to {}",
                    scene.path.display(),
                    owner.display(),
                    dump.display()
                );
                dumps.push(None);
            } else {
                owners.insert(dump.clone(), &scene.path);
                dumps.push(Some(dump));
            }
        }

        dumps
    }

    fn process_scene(
        &self,
        scene: &SourceFile,
        dump: Option<&Path>,
        ctx: &RunContext,
    ) -> Result<SceneSummary, SceneFailure> {
        let fail = |reason: String| SceneFailure {
            scene: scene.path.clone(),
            reason,
        };

        let document = SceneDocument::load(&scene.path, ctx.scene_parser)
            .map_err(|e| fail(e.to_string()))?;
        debug!(
            "Parsed {}: {} entities, {} malformed blocks",
            scene.path.display(),
            document.entity_count(),
            document.malformed_blocks
        );

        let components: Vec<&ComponentRef> = document.components().collect();
        components
            .par_iter()
            .for_each(|component| self.resolve_component(component, ctx));

        let hierarchy = Hierarchy::build(&document);
        if let Some(dump) = dump {
            std::fs::write(dump, hierarchy.render())
                .map_err(|e| fail(format!("failed to write {}: {}", dump.display(), e)))?;
        }

        Ok(SceneSummary {
            scene: scene.path.clone(),
            dump: dump.map(Path::to_path_buf),
            objects: hierarchy.lines().len(),
            components: components.len(),
            malformed_blocks: document.malformed_blocks,
            issues: hierarchy.issues().to_vec(),
        })
    }

    fn resolve_component(&self, component: &ComponentRef, ctx: &RunContext) {
        if !component.has_script() {
            return;
        }
        let guid = component.script_guid.as_str();

        // Already confirmed by another component; nothing left to decide
        if ctx.used.contains(guid) {
            return;
        }

        let Some(location) = ctx.registry.lookup(guid) else {
            trace!("Component &{} references unregistered script {}", component.anchor, guid);
            return;
        };

        if ctx.resolver.is_used(&location, component) && ctx.used.mark(guid) {
            debug!("{} ({}) is used", location.display(), guid);
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scenes ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
