//! ScriptSweep - Unused script detection and scene hierarchy dumps for Unity projects
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find scene documents and C# scripts
//! 2. **Registry** - Map each script's sidecar identifier to the script
//! 3. **Scene Parsing** - Turn scene documents into objects, transforms and behaviours
//! 4. **Hierarchy** - Rebuild and dump each scene's object tree
//! 5. **Usage Resolution** - Match behaviour fields against script members (tree-sitter)
//! 6. **Reporting** - Write the unused-script CSV and summaries

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod hierarchy;
pub mod parser;
pub mod registry;
pub mod report;
pub mod scene;
pub mod usage;

pub use analysis::{AnalysisError, AnalysisReport, Analyzer, UnusedScript};
pub use config::Config;
pub use discovery::FileFinder;
pub use hierarchy::{Hierarchy, HierarchyIssue};
pub use registry::{ArtifactRecord, IdentifierRegistry, UsedSet};
pub use report::Reporter;
pub use scene::{ComponentRef, SceneDocument, SceneNode, SceneParser, TransformRef};
pub use usage::{UsagePolicy, UsageResolver, DEFAULT_USAGE_POLICY};
