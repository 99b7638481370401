use super::{
    BlockKind, ComponentRef, SceneBlock, SceneDocument, SceneEntity, SceneError, SceneNode,
    TransformRef, ROOT_ANCHOR, UNNAMED,
};
use crate::config::Config;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{trace, warn};

/// A block as cut from the document text, before its body is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Class id from the `!u!<id>` tag, if present
    pub class_id: Option<String>,
    /// Anchor from the `&<anchor>` token; `None` when missing or empty
    pub anchor: Option<String>,
    pub stripped: bool,
    pub body: String,
}

impl RawBlock {
    fn from_header(header: &str) -> Self {
        let mut block = RawBlock {
            class_id: None,
            anchor: None,
            stripped: false,
            body: String::new(),
        };

        for token in header.split_whitespace() {
            if let Some(anchor) = token.strip_prefix('&') {
                if !anchor.is_empty() {
                    block.anchor = Some(canonical_anchor(anchor));
                }
            } else if let Some(class_id) = token.strip_prefix("!u!") {
                block.class_id = Some(class_id.to_string());
            } else if token == "stripped" {
                block.stripped = true;
            }
        }

        block
    }
}

/// Integer anchors are compared in their canonical decimal form
fn canonical_anchor(token: &str) -> String {
    token
        .parse::<i64>()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| token.to_string())
}

/// Cut a document into header-delimited blocks.
///
/// Directives before the first header (`%YAML`, `%TAG`) and document end
/// markers are dropped.
pub fn split_blocks(text: &str) -> Vec<RawBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<RawBlock> = None;

    for line in text.lines() {
        if let Some(header) = line.strip_prefix("---") {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(RawBlock::from_header(header));
            continue;
        }

        if line.trim_end() == "..." {
            continue;
        }

        if let Some(block) = current.as_mut() {
            block.body.push_str(line);
            block.body.push('\n');
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    blocks
}

/// Read the `fileID` of a `{fileID: N}` reference.
///
/// Absent or malformed references resolve to [`ROOT_ANCHOR`].
pub fn file_id_of(value: Option<&Value>) -> String {
    value
        .and_then(|v| v.get("fileID"))
        .and_then(|id| match id {
            Value::Number(n) => n
                .as_i64()
                .map(|n| n.to_string())
                .or_else(|| n.as_u64().map(|n| n.to_string())),
            Value::String(s) => s.trim().parse::<i64>().ok().map(|n| n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| ROOT_ANCHOR.to_string())
}

/// Text of a top-level property as written in the block body: the rest of
/// its line plus any more deeply indented continuation lines.
fn property_text(body: &str, key: &str) -> Option<String> {
    let indent = body.lines().find_map(|line| {
        let trimmed = line.trim_start_matches(' ');
        (trimmed.len() < line.len() && !trimmed.is_empty()).then(|| line.len() - trimmed.len())
    })?;
    let prefix = " ".repeat(indent);

    let mut lines = body.lines();
    let first = lines.find_map(|line| {
        let rest = line.strip_prefix(&prefix)?;
        if rest.starts_with(' ') {
            return None;
        }
        rest.strip_prefix(key)?.strip_prefix(':').map(str::trim)
    })?;

    let mut text = first.to_string();
    for line in lines {
        let depth = line.len() - line.trim_start_matches(' ').len();
        if depth <= indent && !line.trim().is_empty() {
            break;
        }
        text.push('\n');
        text.push_str(line.trim());
    }
    Some(text)
}

fn script_guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"guid:[ \t]*([^,}\s]+)").expect("valid guid regex"))
}

/// A scalar in its written form.
///
/// Quoted strings come from the typed value. Plain scalars YAML would retype
/// (`1.50`, `~`, `0123`) are taken verbatim from `raw`.
fn plain_scalar(value: Option<&Value>, raw: Option<&str>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) | Value::Null => {
            raw.map(str::trim).filter(|r| !r.is_empty()).map(str::to_string)
        }
        _ => None,
    }
}

/// Turns scene document text into typed entities
#[derive(Debug, Clone)]
pub struct SceneParser {
    reserved_fields: HashSet<String>,
}

impl SceneParser {
    pub fn new<I, S>(reserved_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved_fields: reserved_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.usage.reserved_fields.iter().cloned())
    }

    /// Parse a whole document. Never fails: malformed blocks are logged and
    /// skipped, blocks without an anchor are ignored.
    pub fn parse(&self, text: &str) -> SceneDocument {
        let mut document = SceneDocument::default();

        for raw in split_blocks(text) {
            let Some(anchor) = raw.anchor.clone() else {
                trace!("Skipping block without anchor (class {:?})", raw.class_id);
                continue;
            };

            match self.parse_block(anchor, &raw) {
                Ok(Some(block)) => {
                    if let Some(entity) = self.build_entity(&block, &raw.body) {
                        document.entities.push(entity);
                    }
                    document.blocks.push(block);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("{}", e);
                    document.malformed_blocks += 1;
                }
            }
        }

        document
    }

    fn parse_block(
        &self,
        anchor: String,
        raw: &RawBlock,
    ) -> Result<Option<SceneBlock>, SceneError> {
        let value: Value =
            serde_yaml::from_str(&raw.body).map_err(|source| SceneError::Block {
                anchor: anchor.clone(),
                source,
            })?;

        let Value::Mapping(root) = value else {
            return Ok(None);
        };
        let Some((key, body)) = root.into_iter().next() else {
            return Ok(None);
        };
        let Some(type_name) = key.as_str() else {
            return Ok(None);
        };

        let properties = match body {
            Value::Mapping(properties) => properties,
            _ => Mapping::new(),
        };

        Ok(Some(SceneBlock {
            anchor,
            kind: BlockKind::from_type_name(type_name),
            stripped: raw.stripped,
            properties,
        }))
    }

    fn build_entity(&self, block: &SceneBlock, body: &str) -> Option<SceneEntity> {
        let props = &block.properties;

        match &block.kind {
            BlockKind::Object => {
                let raw_name = property_text(body, "m_Name");
                let first_line = raw_name.as_deref().and_then(|text| text.lines().next());
                Some(SceneEntity::Node(SceneNode {
                    anchor: block.anchor.clone(),
                    name: plain_scalar(props.get("m_Name"), first_line)
                        .unwrap_or_else(|| UNNAMED.to_string()),
                }))
            }
            BlockKind::Transform => Some(SceneEntity::Transform(TransformRef {
                anchor: block.anchor.clone(),
                owner: file_id_of(props.get("m_GameObject")),
                parent: file_id_of(props.get("m_Father")),
            })),
            BlockKind::Behavior => Some(SceneEntity::Component(ComponentRef {
                anchor: block.anchor.clone(),
                script_guid: {
                    let raw_guid = property_text(body, "m_Script").and_then(|text| {
                        script_guid_pattern()
                            .captures(&text)
                            .map(|caps| caps[1].to_string())
                    });
                    let typed = props.get("m_Script").and_then(|script| script.get("guid"));
                    plain_scalar(typed, raw_guid.as_deref()).unwrap_or_default()
                },
                serialized_fields: props
                    .keys()
                    .filter_map(|key| key.as_str())
                    .filter(|key| !self.reserved_fields.contains(*key))
                    .map(str::to_string)
                    .collect(),
            })),
            BlockKind::Other(_) => None,
        }
    }
}

impl Default for SceneParser {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
