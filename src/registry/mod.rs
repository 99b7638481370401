//! Identifier registry
//!
//! Maps the opaque identifier carried by an artifact's sidecar metadata file to
//! the artifact's location. The registry is populated once, concurrently, and
//! only read afterwards. [`UsedSet`] records which identifiers a scene has
//! confirmed as used.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::{trace, warn};

/// One registered artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRecord {
    /// Identifier read from the sidecar
    pub identifier: String,
    /// Location of the artifact itself
    pub location: PathBuf,
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*guid:[ \t]*([^\s#]+)").expect("valid identifier regex")
    })
}

/// Extract the identifier from sidecar text (`guid: <token>`)
pub fn scan_identifier(text: &str) -> Option<String> {
    identifier_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Lock a mutex, recovering the data if another worker panicked while holding it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Concurrent identifier -> artifact location map
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    entries: Mutex<HashMap<String, PathBuf>>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact using the identifier found in its sidecar.
    ///
    /// A missing sidecar or a sidecar without an identifier line leaves the
    /// artifact unregistered. Registering an identifier twice keeps the later
    /// location. Returns the identifier that was registered, if any.
    pub fn register(&self, artifact: &Path, sidecar: &Path) -> Option<String> {
        let text = match std::fs::read_to_string(sidecar) {
            Ok(text) => text,
            Err(e) => {
                trace!("No sidecar for {}: {}", artifact.display(), e);
                return None;
            }
        };

        let identifier = scan_identifier(&text)?;
        self.insert(identifier.clone(), artifact.to_path_buf());
        Some(identifier)
    }

    /// Insert or overwrite a mapping
    pub fn insert(&self, identifier: String, location: PathBuf) {
        let mut entries = lock(&self.entries);
        if let Some(previous) = entries.get(&identifier) {
            if *previous != location {
                warn!(
                    "Identifier {} registered by both {} and {}; keeping the latter",
                    identifier,
                    previous.display(),
                    location.display()
                );
            }
        }
        entries.insert(identifier, location);
    }

    /// Location registered for an identifier
    pub fn lookup(&self, identifier: &str) -> Option<PathBuf> {
        lock(&self.entries).get(identifier).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered artifact
    pub fn records(&self) -> Vec<ArtifactRecord> {
        lock(&self.entries)
            .iter()
            .map(|(identifier, location)| ArtifactRecord {
                identifier: identifier.clone(),
                location: location.clone(),
            })
            .collect()
    }
}

/// Identifiers confirmed as used by at least one scene object
#[derive(Debug, Default)]
pub struct UsedSet {
    ids: Mutex<HashSet<String>>,
}

impl UsedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an identifier as used. Returns true only for the first mark.
    pub fn mark(&self, identifier: &str) -> bool {
        lock(&self.ids).insert(identifier.to_string())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        lock(&self.ids).contains(identifier)
    }

    pub fn len(&self) -> usize {
        lock(&self.ids).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> HashSet<String> {
        lock(&self.ids).clone()
    }
}
