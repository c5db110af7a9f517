//! Accessibility tree snapshots and flattening

use crate::element::{Element, ElementKind, Frame};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node exactly as `idb ui describe-all --json --nested` reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "AXLabel", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "AXValue", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "AXUniqueId", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

fn enabled_default() -> bool {
    true
}

impl RawNode {
    /// Element for this node, or `None` when the node has no usable type.
    pub fn to_element(&self) -> Option<Element> {
        let kind = self.kind.as_deref().filter(|k| !k.is_empty())?;
        Some(Element {
            kind: ElementKind::parse(kind),
            label: self.label.clone(),
            value: self.value.clone(),
            identifier: self.identifier.clone(),
            frame: self.frame.unwrap_or_default(),
            traits: self.traits.clone(),
            enabled: self.enabled,
        })
    }
}

/// A tree fetched in one piece from the UI-description collaborator.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    pub root: RawNode,
    pub fetched_at: DateTime<Utc>,
}

impl TreeSnapshot {
    pub fn new(root: RawNode) -> Self {
        Self {
            root,
            fetched_at: Utc::now(),
        }
    }

    pub fn elements(&self) -> Vec<Element> {
        flatten(&self.root)
    }
}

/// Parse describe-all output. idb wraps the root in a one-element array;
/// a bare object is accepted as the root as well.
pub fn parse_tree(json: &str) -> Result<RawNode> {
    let json = json.trim();
    if json.is_empty() {
        return Err(Error::malformed_output("idb ui describe-all", "empty output"));
    }

    let value: serde_json::Value = serde_json::from_str(json)?;
    let root = match value {
        serde_json::Value::Array(mut nodes) => {
            if nodes.is_empty() {
                return Err(Error::malformed_output(
                    "idb ui describe-all",
                    "empty element array",
                ));
            }
            nodes.swap_remove(0)
        }
        obj @ serde_json::Value::Object(_) => obj,
        other => {
            return Err(Error::malformed_output(
                "idb ui describe-all",
                &format!("expected array or object, got {}", json_kind(&other)),
            ))
        }
    };

    Ok(serde_json::from_value(root)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Pre-order flattening. Type-less nodes are not emitted but their
/// children are; disabled nodes are emitted.
pub fn flatten(root: &RawNode) -> Vec<Element> {
    let mut elements = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(element) = node.to_element() {
            elements.push(element);
        }
        stack.extend(node.children.iter().rev());
    }

    elements
}

/// Count every node, typed or not.
pub fn count_nodes(root: &RawNode) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}
