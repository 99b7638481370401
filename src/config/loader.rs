use crate::usage::UsagePolicy;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration for a ScriptSweep run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories (relative to the project root) holding scene documents
    pub scene_dirs: Vec<PathBuf>,

    /// File extensions treated as scene documents
    pub scene_extensions: Vec<String>,

    /// File extensions treated as script artifacts
    pub script_extensions: Vec<String>,

    /// Suffix of the sidecar file carrying an artifact's identifier
    pub meta_suffix: String,

    /// Patterns to exclude from discovery
    pub exclude: Vec<String>,

    /// Usage resolution configuration
    pub usage: UsageConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// Base type names that mark a script's primary type (exact token match)
    pub base_types: Vec<String>,

    /// Behaviour block keys that are never serialized script fields
    pub reserved_fields: Vec<String>,

    /// Which usage decision to apply
    pub policy: UsagePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// File name of the unused-script summary
    pub csv_name: String,

    /// Suffix appended to a scene's file name for its hierarchy dump
    pub dump_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scene_dirs: vec![PathBuf::from("Assets/Scenes")],
            scene_extensions: vec!["unity".to_string()],
            script_extensions: vec!["cs".to_string()],
            meta_suffix: "meta".to_string(),
            exclude: vec![
                "**/Library/**".to_string(),
                "**/Temp/**".to_string(),
                "**/obj/**".to_string(),
            ],
            usage: UsageConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            base_types: vec!["MonoBehaviour".to_string()],
            reserved_fields: [
                "m_ObjectHideFlags",
                "m_CorrespondingSourceObject",
                "m_PrefabInstance",
                "m_PrefabInternal",
                "m_PrefabParentObject",
                "m_PrefabAsset",
                "m_GameObject",
                "m_Enabled",
                "m_EditorHideFlags",
                "m_Script",
                "m_Name",
                "m_EditorClassIdentifier",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            policy: UsagePolicy::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_name: "UnusedScripts.csv".to_string(),
            dump_suffix: "dump".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(path, &contents)?;
        debug!("Loaded config from {}", path.display());
        for problem in config.problems() {
            warn!("{}: {}", path.display(), problem);
        }
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(contents) {
                    Ok(config)
                } else {
                    toml::from_str(contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".scriptsweep.yml",
            ".scriptsweep.yaml",
            ".scriptsweep.toml",
            "scriptsweep.yml",
            "scriptsweep.yaml",
            "scriptsweep.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Settings that load fine but quietly change what a run reports
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.usage.base_types.is_empty() {
            problems.push(
                "usage.base_types is empty; every script is judged by its first declared type"
                    .to_string(),
            );
        }
        if self.scene_dirs.is_empty() || self.scene_extensions.is_empty() {
            problems.push(
                "no scene documents can be found; every script will be reported unused"
                    .to_string(),
            );
        }
        if self.report.dump_suffix.is_empty() {
            problems.push("report.dump_suffix is empty; dumps end in a bare '.'".to_string());
        }
        if !self.usage.reserved_fields.iter().any(|f| f == "m_Script") {
            problems.push(
                "usage.reserved_fields lacks m_Script; it is compared as a serialized field"
                    .to_string(),
            );
        }

        problems
    }

    /// Check if a project-relative path matches one of the exclusion patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }
}

/// Simple glob matching for patterns like "*.unity" or "**/Library/**"
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern.starts_with('*') && !pattern.contains('/') {
        return text.ends_with(&pattern[1..]);
    }

    if pattern.ends_with('*') && !pattern.contains('/') {
        return text.starts_with(&pattern[..pattern.len() - 1]);
    }

    if pattern.contains("**") {
        // "**/Library/**" matches a whole directory name anywhere in the path
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern.replace("**/", "").replace("/**", "");
            let dir_name = dir_name.trim_matches('/');
            return text.contains(&format!("/{}/", dir_name))
                || text.starts_with(&format!("{}/", dir_name));
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }

            if prefix.is_empty() {
                return text.ends_with(suffix) || text.contains(&format!("/{}", suffix));
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && (text.ends_with(suffix) || text.contains(&format!("/{}", suffix)));
        }
    }

    text == pattern
}
