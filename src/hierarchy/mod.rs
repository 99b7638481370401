// Scene hierarchy reconstruction
//
// Transforms are loaded into a petgraph arena once; from then on the walk works
// on node indices instead of anchor strings.

use crate::scene::{SceneDocument, ROOT_ANCHOR};
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A transform in the arena, with its owner's name resolved up front
#[derive(Debug, Clone)]
pub struct HierarchyEntry {
    pub anchor: String,
    pub owner: String,
    /// `None` when the owner reference does not resolve to a scene object
    pub name: Option<String>,
}

/// Structural problems met while walking the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyIssue {
    /// The walk reached a transform it had already emitted
    Cycle { anchor: String },
    /// The owner reference of a transform names no scene object
    DanglingOwner { anchor: String, owner: String },
}

impl HierarchyIssue {
    pub fn is_cycle(&self) -> bool {
        matches!(self, HierarchyIssue::Cycle { .. })
    }
}

/// Anchors sort numerically when they are integers, textually otherwise
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum AnchorKey<'a> {
    Numeric(i64),
    Text(&'a str),
}

impl<'a> AnchorKey<'a> {
    fn of(anchor: &'a str) -> Self {
        anchor
            .parse::<i64>()
            .map(AnchorKey::Numeric)
            .unwrap_or(AnchorKey::Text(anchor))
    }
}

fn compare_anchors(a: &str, b: &str) -> Ordering {
    AnchorKey::of(a).cmp(&AnchorKey::of(b))
}

/// Object tree of one scene document
#[derive(Debug)]
pub struct Hierarchy {
    graph: DiGraph<HierarchyEntry, ()>,
    roots: Vec<NodeIndex>,
    lines: Vec<String>,
    issues: Vec<HierarchyIssue>,
}

impl Hierarchy {
    /// Resolve parent/child references of a document into a forest and walk it
    pub fn build(document: &SceneDocument) -> Self {
        let names: HashMap<&str, &str> = document
            .nodes()
            .map(|node| (node.anchor.as_str(), node.name.as_str()))
            .collect();

        let mut transforms: Vec<_> = document.transforms().collect();
        transforms.sort_by(|a, b| compare_anchors(&a.anchor, &b.anchor));

        let mut graph = DiGraph::new();
        let mut by_anchor: HashMap<&str, Vec<NodeIndex>> = HashMap::new();
        let mut indices = Vec::with_capacity(transforms.len());

        for transform in &transforms {
            let idx = graph.add_node(HierarchyEntry {
                anchor: transform.anchor.clone(),
                owner: transform.owner.clone(),
                name: names.get(transform.owner.as_str()).map(|n| n.to_string()),
            });
            by_anchor.entry(transform.anchor.as_str()).or_default().push(idx);
            indices.push(idx);
        }

        let mut roots = Vec::new();
        for (transform, &idx) in transforms.iter().zip(&indices) {
            if transform.parent == ROOT_ANCHOR {
                roots.push(idx);
                continue;
            }
            // Parents that name no transform leave the subtree unreachable
            for &parent in by_anchor.get(transform.parent.as_str()).into_iter().flatten() {
                graph.add_edge(parent, idx, ());
            }
        }

        let mut hierarchy = Self {
            graph,
            roots,
            lines: Vec::new(),
            issues: Vec::new(),
        };
        hierarchy.walk();
        hierarchy
    }

    fn walk(&mut self) {
        let mut visited = HashSet::new();
        let roots = self.roots.clone();
        for root in roots {
            self.visit(root, 0, &mut visited);
        }
    }

    fn visit(&mut self, idx: NodeIndex, depth: usize, visited: &mut HashSet<NodeIndex>) {
        let entry = &self.graph[idx];

        if !visited.insert(idx) {
            warn!("Hierarchy cycle at transform &{}, branch cut", entry.anchor);
            self.issues.push(HierarchyIssue::Cycle {
                anchor: entry.anchor.clone(),
            });
            return;
        }

        let Some(name) = entry.name.clone() else {
            debug!("Transform &{} has no owning object, branch dropped", entry.anchor);
            self.issues.push(HierarchyIssue::DanglingOwner {
                anchor: entry.anchor.clone(),
                owner: entry.owner.clone(),
            });
            return;
        };

        self.lines.push(format!("{}{}", "-".repeat(depth), name));

        for child in self.children(idx) {
            self.visit(child, depth + 1, visited);
        }
    }

    /// Children of a transform in anchor order
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<_> = self.graph.neighbors(idx).collect();
        children.sort_by(|a, b| compare_anchors(&self.graph[*a].anchor, &self.graph[*b].anchor));
        children.dedup();
        children
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Emitted lines, one per reachable object, dashes marking depth
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn issues(&self) -> &[HierarchyIssue] {
        &self.issues
    }

    /// The textual dump written next to each scene
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
