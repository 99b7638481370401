//! Scene document model
//!
//! A scene document is a sequence of independently parsed blocks. Each block
//! carries an anchor in its header and a single top-level key naming its kind.
//! Three kinds matter for analysis:
//!
//! - `GameObject` becomes a [`SceneNode`]
//! - `Transform` / `RectTransform` becomes a [`TransformRef`] (one hierarchy edge)
//! - `MonoBehaviour` becomes a [`ComponentRef`]
//!
//! Every other kind is kept as a raw [`SceneBlock`] and otherwise ignored.

mod parser;

pub use parser::{file_id_of, split_blocks, RawBlock, SceneParser};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reference value meaning "no reference"; a transform with this parent is a root
pub const ROOT_ANCHOR: &str = "0";

/// Name given to objects that do not declare one
pub const UNNAMED: &str = "<unnamed>";

/// Errors raised while loading a scene document
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed block &{anchor}: {source}")]
    Block {
        anchor: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Recognized block kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Object,
    Transform,
    Behavior,
    Other(String),
}

impl BlockKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "GameObject" => BlockKind::Object,
            "Transform" | "RectTransform" => BlockKind::Transform,
            "MonoBehaviour" => BlockKind::Behavior,
            other => BlockKind::Other(other.to_string()),
        }
    }
}

/// One parsed block with its property map
#[derive(Debug, Clone)]
pub struct SceneBlock {
    pub anchor: String,
    pub kind: BlockKind,
    /// Header marks the block as a stripped prefab stand-in
    pub stripped: bool,
    pub properties: serde_yaml::Mapping,
}

/// One logical scene object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub anchor: String,
    pub name: String,
}

/// One hierarchy edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRef {
    pub anchor: String,
    /// Anchor of the object owning this transform
    pub owner: String,
    /// Anchor of the parent transform, [`ROOT_ANCHOR`] for roots
    pub parent: String,
}

impl TransformRef {
    pub fn is_root(&self) -> bool {
        self.parent == ROOT_ANCHOR
    }
}

/// One behaviour attached to a scene object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub anchor: String,
    /// Identifier of the backing script, empty when the block carries none
    pub script_guid: String,
    /// Property keys that are neither structural nor reserved, in document order
    pub serialized_fields: Vec<String>,
}

impl ComponentRef {
    pub fn has_script(&self) -> bool {
        !self.script_guid.is_empty()
    }
}

/// Typed entity built from a recognized block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEntity {
    Node(SceneNode),
    Transform(TransformRef),
    Component(ComponentRef),
}

/// All blocks and entities of one scene document, in document order
#[derive(Debug, Default)]
pub struct SceneDocument {
    pub blocks: Vec<SceneBlock>,
    pub entities: Vec<SceneEntity>,
    /// Blocks dropped because their body could not be parsed
    pub malformed_blocks: usize,
}

impl SceneDocument {
    /// Read and parse a scene file
    pub fn load(path: &Path, parser: &SceneParser) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(parser.parse(&text))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.entities.iter().filter_map(|e| match e {
            SceneEntity::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn transforms(&self) -> impl Iterator<Item = &TransformRef> {
        self.entities.iter().filter_map(|e| match e {
            SceneEntity::Transform(transform) => Some(transform),
            _ => None,
        })
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentRef> {
        self.entities.iter().filter_map(|e| match e {
            SceneEntity::Component(component) => Some(component),
            _ => None,
        })
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}
