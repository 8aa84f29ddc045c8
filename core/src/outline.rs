//! Serializable outlines of a compiled tree.
//!
//! An outline keeps the names, kinds, help and requiredness of every node,
//! flag and positional, but none of the mappers or default values, so it can
//! be compared, printed as JSON or snapshotted in tests.

use serde::{Deserialize, Serialize};

use crate::{Application, Flag, NodeId, NodeKind, Value};

/// Outline of a positional or flag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueOutline {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub required: bool,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub passthrough: bool,
    pub target: String,
}

impl From<&Value> for ValueOutline {
    fn from(value: &Value) -> Self {
        Self {
            name: value.name.clone(),
            help: value.help.clone(),
            type_name: value.type_name.to_string(),
            default: value.default.clone(),
            required: value.required,
            position: value.position,
            enum_values: value.enum_values.clone(),
            passthrough: value.passthrough,
            target: value.target.to_string(),
        }
    }
}

/// Outline of a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagOutline {
    #[serde(flatten)]
    pub value: ValueOutline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xor: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl From<&Flag> for FlagOutline {
    fn from(flag: &Flag) -> Self {
        Self {
            value: ValueOutline::from(&flag.value),
            short: flag.short,
            env: flag.env.clone(),
            group: flag.group.as_ref().map(|g| g.key.clone()),
            xor: flag.xor.clone(),
            hidden: flag.hidden,
        }
    }
}

/// Outline of a node and, recursively, its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOutline {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<ValueOutline>,
    /// Name of the default command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagOutline>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional: Vec<ValueOutline>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeOutline>,
}

impl NodeOutline {
    /// Outlines the subtree of `app` rooted at `id`.
    pub fn of(app: &Application, id: NodeId) -> Self {
        let node = app.node(id);
        Self {
            kind: node.kind,
            name: node.name.clone(),
            help: node.help.clone(),
            detail: node.detail.clone(),
            hidden: node.hidden,
            aliases: node.aliases.clone(),
            group: node.group.as_ref().map(|g| g.key.clone()),
            argument: node.argument.as_ref().map(ValueOutline::from),
            default_command: app.default_command(id).map(|n| n.name.clone()),
            flags: node.flags.iter().map(FlagOutline::from).collect(),
            positional: node.positional.iter().map(ValueOutline::from).collect(),
            children: node
                .children
                .iter()
                .map(|child| NodeOutline::of(app, *child))
                .collect(),
        }
    }

    /// Finds a direct child outline by name.
    pub fn child(&self, name: &str) -> Option<&NodeOutline> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Renders the outline as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
