//! Usage resolution
//!
//! Decides whether a behaviour attached in a scene is backed by a script whose
//! declared members match the behaviour's serialized fields. Names on both
//! sides are compared after [`normalize`].

use crate::config::Config;
use crate::parser::{CSharpParser, Parser, ScriptInfo};
use crate::scene::ComponentRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace, warn};

/// How a resolved component is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsagePolicy {
    /// Every component whose script exists counts as used, match or not.
    /// Reproduces the historical tool output.
    Preserve,
    /// A script with declared members counts as used only when at least one
    /// serialized field matches one of them.
    Strict,
}

pub const DEFAULT_USAGE_POLICY: UsagePolicy = UsagePolicy::Strict;

impl Default for UsagePolicy {
    fn default() -> Self {
        DEFAULT_USAGE_POLICY
    }
}

impl std::fmt::Display for UsagePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsagePolicy::Preserve => write!(f, "preserve"),
            UsagePolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Canonical form of a field or member name: `m_Speed` / `_speed` / `Speed` -> `speed`
pub fn normalize(name: &str) -> String {
    let name = name.strip_prefix("m_").unwrap_or(name);
    name.trim_start_matches('_').to_lowercase()
}

/// Normalized member names of a script's primary type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// The script declares at least one type
    pub declares_type: bool,
    pub symbols: HashSet<String>,
}

impl SymbolTable {
    pub fn from_script(info: &ScriptInfo, base_types: &[String]) -> Self {
        match info.primary_type(base_types) {
            Some(primary) => Self {
                declares_type: true,
                symbols: primary.member_names().map(normalize).collect(),
            },
            None => Self::default(),
        }
    }

    /// Whether any serialized field matches a declared member
    pub fn matches_any(&self, fields: &[String]) -> bool {
        fields.iter().any(|field| self.symbols.contains(&normalize(field)))
    }
}

/// The usage decision for a script that exists
pub fn decide(policy: UsagePolicy, table: &SymbolTable, fields: &[String]) -> bool {
    match policy {
        UsagePolicy::Preserve => true,
        UsagePolicy::Strict => {
            !table.declares_type || table.symbols.is_empty() || table.matches_any(fields)
        }
    }
}

/// Resolves components against script sources, memoizing parsed scripts for
/// the lifetime of one run
pub struct UsageResolver {
    policy: UsagePolicy,
    base_types: Vec<String>,
    parser: CSharpParser,
    tables: Mutex<HashMap<PathBuf, Arc<SymbolTable>>>,
}

impl UsageResolver {
    pub fn new(policy: UsagePolicy, base_types: Vec<String>) -> Self {
        Self {
            policy,
            base_types,
            parser: CSharpParser::new(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.usage.policy, config.usage.base_types.clone())
    }

    pub fn policy(&self) -> UsagePolicy {
        self.policy
    }

    /// Whether the component is backed by the script at `location`.
    ///
    /// A missing script is never used.
    pub fn is_used(&self, location: &Path, component: &ComponentRef) -> bool {
        if !location.is_file() {
            debug!("Script {} does not exist", location.display());
            return false;
        }

        let table = self.symbols_for(location);
        let used = decide(self.policy, &table, &component.serialized_fields);

        trace!(
            "Component &{} -> {}: {} ({} symbols, policy {})",
            component.anchor,
            location.display(),
            if used { "used" } else { "unused" },
            table.symbols.len(),
            self.policy
        );

        used
    }

    /// Symbol table for a script, parsed once per run
    pub fn symbols_for(&self, location: &Path) -> Arc<SymbolTable> {
        if let Some(table) = self.cached(location) {
            return table;
        }

        let table = Arc::new(self.load_symbols(location));
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(location.to_path_buf())
            .or_insert(table)
            .clone()
    }

    fn cached(&self, location: &Path) -> Option<Arc<SymbolTable>> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(location)
            .cloned()
    }

    fn load_symbols(&self, location: &Path) -> SymbolTable {
        let contents = match std::fs::read_to_string(location) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read script {}: {}", location.display(), e);
                return SymbolTable::default();
            }
        };

        match self.parser.parse(location, &contents) {
            Ok(info) => SymbolTable::from_script(&info, &self.base_types),
            Err(e) => {
                warn!("Failed to parse script {}: {}", location.display(), e);
                SymbolTable::default()
            }
        }
    }
}
