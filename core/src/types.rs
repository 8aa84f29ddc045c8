//! Compiled command tree types.
//!
//! These types are produced by the schema compiler and consumed read-only
//! by argument parsers and help renderers. A [`Node`] is the application
//! root, a command or a branching argument; it owns [`Flag`]s and
//! positional [`Value`]s and refers to its children and parent by
//! [`NodeId`] inside an [`Application`](crate::Application).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Tag;
use crate::mapper::{AnyValue, Mapper};

/// Kind of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// The application root.
    Application,
    /// A sub-command.
    Command,
    /// A branching positional argument.
    Argument,
}

/// Index of a node inside its [`NodeArena`](crate::NodeArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Location of a field's storage relative to the compiled root structure,
/// as a list of field identifiers (plugin elements use their index).
///
/// # Examples
///
/// ```
/// use command_tree_core::SlotPath;
///
/// let path = SlotPath::root().child("serve").child("port");
/// assert_eq!(path.to_string(), "serve.port");
/// assert_eq!(path.segments(), ["serve", "port"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotPath(Vec<String>);

impl SlotPath {
    /// The path of the root structure itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SlotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A presentation group for flags and commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Key referenced by field tags.
    pub key: String,
    /// Display title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Group {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// A bindable datum: a flag's value or a positional argument.
#[derive(Debug, Clone)]
pub struct Value {
    pub name: String,
    pub help: String,
    /// Default literal, decoded by the mapper when nothing else is supplied.
    pub default: Option<String>,
    /// The pristine `Default` of the storage type.
    pub default_value: AnyValue,
    pub mapper: Arc<dyn Mapper>,
    pub tag: Tag,
    /// Declared type of the storage slot.
    pub type_name: &'static str,
    pub enum_values: Vec<String>,
    pub passthrough: bool,
    pub required: bool,
    pub format: Option<String>,
    /// Ordinal among the owning node's positionals.
    pub position: usize,
    /// Where the decoded value is written.
    pub target: SlotPath,
}

impl Value {
    /// Creates an optional value with no help or default.
    pub fn new(name: &str, mapper: Arc<dyn Mapper>, default_value: AnyValue) -> Self {
        Self {
            name: name.to_string(),
            help: String::new(),
            default: None,
            type_name: default_value.type_name(),
            default_value,
            mapper,
            tag: Tag::new(),
            enum_values: Vec::new(),
            passthrough: false,
            required: false,
            format: None,
            position: 0,
            target: SlotPath::root(),
        }
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// Returns `true` if the value is a switch that takes no argument.
    pub fn is_bool(&self) -> bool {
        self.mapper.is_bool()
    }

    /// Usage form: `<name>` when required, `[<name>]` otherwise.
    pub fn summary(&self) -> String {
        if self.required {
            format!("<{}>", self.name)
        } else {
            format!("[<{}>]", self.name)
        }
    }
}

/// A [`Value`] supplied with option syntax.
///
/// # Examples
///
/// ```
/// use std::any::TypeId;
///
/// use command_tree_core::{AnyValue, Flag, Registry, Value};
///
/// let registry = Registry::with_builtins();
/// let mapper = registry.for_type(TypeId::of::<bool>()).unwrap();
/// let help = Flag::new(Value::new("help", mapper, AnyValue::zero_of::<bool>()))
///     .with_short('h');
///
/// assert!(help.matches("--help"));
/// assert!(help.matches("-h"));
/// assert!(!help.matches("--verbose"));
/// ```
#[derive(Debug, Clone)]
pub struct Flag {
    pub value: Value,
    pub short: Option<char>,
    pub placeholder: String,
    /// Environment variable the value may be read from.
    pub env: Option<String>,
    pub group: Option<Group>,
    /// Mutual exclusion sets.
    pub xor: Vec<String>,
    pub hidden: bool,
}

impl Flag {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            short: None,
            placeholder: String::new(),
            env: None,
            group: None,
            xor: Vec::new(),
            hidden: false,
        }
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_env(mut self, env: &str) -> Self {
        self.env = Some(env.to_string());
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.value.name
    }

    /// The `--name` form.
    pub fn long_form(&self) -> String {
        format!("--{}", self.value.name)
    }

    /// The `-x` form, if the flag has a short name.
    pub fn short_form(&self) -> Option<String> {
        self.short.map(|c| format!("-{c}"))
    }

    /// Checks if `s` is this flag's long or short form.
    pub fn matches(&self, s: &str) -> bool {
        if let Some(long) = s.strip_prefix("--") {
            return long == self.value.name;
        }
        let mut chars = s.chars();
        matches!(
            (chars.next(), chars.next(), chars.next(), self.short),
            (Some('-'), Some(c), None, Some(short)) if c == short
        )
    }

    /// Placeholder shown in usage, defaulting to the upper-cased name.
    pub fn form_placeholder(&self) -> String {
        if !self.placeholder.is_empty() {
            return self.placeholder.clone();
        }
        self.value.name.to_uppercase().replace('-', "_")
    }
}

/// A node of the compiled command tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub help: String,
    /// Long-form description.
    pub detail: Option<String>,
    pub hidden: bool,
    pub aliases: Vec<String>,
    pub group: Option<Group>,
    pub tag: Tag,
    /// Storage of the structure this node was built from.
    pub target: SlotPath,
    pub parent: Option<NodeId>,
    /// Sub-commands and branching arguments, in declaration order.
    pub children: Vec<NodeId>,
    pub flags: Vec<Flag>,
    /// Positional values, in declaration order.
    pub positional: Vec<Value>,
    /// Child selected when no command is given.
    pub default_command: Option<NodeId>,
    /// Branch argument of an [`NodeKind::Argument`] node.
    pub argument: Option<Value>,
}

impl Node {
    /// Creates an empty node of `kind` built from the structure at `target`.
    pub fn new(kind: NodeKind, target: SlotPath) -> Self {
        Self {
            kind,
            name: String::new(),
            help: String::new(),
            detail: None,
            hidden: false,
            aliases: Vec::new(),
            group: None,
            tag: Tag::new(),
            target,
            parent: None,
            children: Vec::new(),
            flags: Vec::new(),
            positional: Vec::new(),
            default_command: None,
            argument: None,
        }
    }

    /// Checks if `name` is this node's name or one of its aliases.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }

    pub fn find_flag(&self, flag: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.matches(flag))
    }

    /// Name and usage: `<name>` for branch arguments, followed by the
    /// positional forms.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_tree_core::{Node, NodeKind, SlotPath};
    ///
    /// let mut node = Node::new(NodeKind::Command, SlotPath::root());
    /// node.name = "deploy".to_string();
    /// assert_eq!(node.summary(), "deploy");
    /// ```
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        match (&self.kind, &self.argument) {
            (NodeKind::Argument, Some(arg)) => parts.push(format!("<{}>", arg.name)),
            _ if !self.name.is_empty() => parts.push(self.name.clone()),
            _ => {}
        }
        parts.extend(self.positional.iter().map(Value::summary));
        if parts.is_empty() {
            return "<root>".to_string();
        }
        parts.join(" ")
    }
}
