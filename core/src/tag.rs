//! Resolved per-field metadata.
//!
//! A [`Tag`] controls how a declared field is compiled: its public name,
//! whether it is a command, a positional argument or a flag, grouping,
//! environment binding and template variables. Schema authors build the
//! declared annotation with the builder methods below; a [`TagResolver`]
//! turns it into the resolved tag the compiler consumes.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::Tag;
//!
//! let tag = Tag::new()
//!     .with_help("Port to listen on")
//!     .with_short('p')
//!     .with_default("8080");
//! assert_eq!(tag.short, Some('p'));
//! assert_eq!(tag.default.as_deref(), Some("8080"));
//! assert!(!tag.arg);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::FieldInfo;

/// Template variable bindings.
///
/// Bindings compose through embedded structures and down the command tree:
/// the outer bindings form the base and inner entries take precedence.
///
/// # Examples
///
/// ```
/// use command_tree_core::Vars;
///
/// let parent = Vars::from_iter([("env", "prod"), ("region", "eu")]);
/// let child = Vars::from_iter([("env", "dev")]);
///
/// let merged = parent.clone_with(&child);
/// assert_eq!(merged.get("env"), Some("dev"));
/// assert_eq!(merged.get("region"), Some("eu"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vars(BTreeMap<String, String>);

impl Vars {
    /// Creates an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of `self` overlaid with the entries of `other`.
    pub fn clone_with(&self, other: &Vars) -> Vars {
        let mut merged = self.clone();
        merged
            .0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Binds `key` to `value`, replacing any previous binding.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value bound to `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterates bindings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Vars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Marks a command field as the default command of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultCommand {
    /// Not a default command (the default).
    #[default]
    No,
    /// Selected when no command is given; must not take arguments.
    Yes,
    /// Selected when no command is given; may carry positionals and children.
    WithArgs,
}

/// Resolved field metadata.
///
/// Empty strings and `None` mean "not set". `prefix`, `env_prefix`,
/// `group` and `vars` are rewritten while flattening embedded structures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    /// Explicit public name; derived from the field identifier when unset.
    pub name: Option<String>,
    pub help: String,
    /// Explicit type hint used to select a named mapper.
    pub type_hint: Option<String>,
    /// Default value literal.
    pub default: Option<String>,
    /// Allowed values.
    pub enum_values: Vec<String>,
    pub required: bool,
    pub optional: bool,
    /// Positional argument (or branching argument for structures).
    pub arg: bool,
    /// Sub-command.
    pub cmd: bool,
    /// Inline the structure's fields into the owning node.
    pub embed: bool,
    /// Drop the field entirely.
    pub ignored: bool,
    pub passthrough: bool,
    pub hidden: bool,
    pub default_command: DefaultCommand,
    pub format: Option<String>,
    /// Group key.
    pub group: Option<String>,
    /// Prepended to the public name of every flattened field.
    pub prefix: String,
    /// Prepended to the environment name of every flattened field.
    pub env_prefix: String,
    /// Environment variable name.
    pub env: Option<String>,
    pub short: Option<char>,
    pub placeholder: String,
    pub aliases: Vec<String>,
    /// Mutual exclusion sets this flag belongs to.
    pub xor: Vec<String>,
    pub vars: Vars,
}

impl Tag {
    /// Creates an empty tag.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn with_type(mut self, hint: &str) -> Self {
        self.type_hint = Some(hint.to_string());
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_group(mut self, key: &str) -> Self {
        self.group = Some(key.to_string());
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn with_env(mut self, env: &str) -> Self {
        self.env = Some(env.to_string());
        self
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_xor(mut self, set: &str) -> Self {
        self.xor.push(set.to_string());
        self
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key, value);
        self
    }

    /// Marks the field as a sub-command.
    pub fn as_command(mut self) -> Self {
        self.cmd = true;
        self
    }

    /// Marks the field as a positional argument.
    pub fn as_argument(mut self) -> Self {
        self.arg = true;
        self
    }

    /// Marks the field as an embedded structure.
    pub fn as_embedded(mut self) -> Self {
        self.embed = true;
        self
    }

    pub fn as_ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn as_required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn as_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn as_hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn as_passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    /// Marks a command as the default command of its parent.
    pub fn as_default_command(mut self) -> Self {
        self.default_command = DefaultCommand::Yes;
        self
    }

    /// Like [`as_default_command`](Self::as_default_command), but the
    /// command may declare positionals and sub-commands.
    pub fn as_default_command_with_args(mut self) -> Self {
        self.default_command = DefaultCommand::WithArgs;
        self
    }
}

/// Inconsistent field annotations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Both `cmd` and `arg` are set.
    #[error("field can't be both a command and an argument")]
    CommandAndArgument,
    /// Both `embed` and `cmd` are set.
    #[error("field can't be both embedded and a command")]
    EmbedAndCommand,
    /// Both `required` and `optional` are set.
    #[error("field can't be both required and optional")]
    RequiredAndOptional,
    /// The short name can't be used on a command line.
    #[error("invalid short flag name {0:?}")]
    InvalidShort(char),
}

/// Produces the resolved [`Tag`] for a declared field.
pub trait TagResolver: Send + Sync {
    /// Resolves the tag of `field`, declared on the structure named `owner`.
    fn resolve(&self, owner: &str, field: &FieldInfo) -> Result<Tag, TagError>;
}

/// Resolver that takes the declared annotation as is, after checking it for
/// contradictory markers.
///
/// # Examples
///
/// ```
/// use command_tree_core::{AnnotationResolver, Field, Tag, TagError, TagResolver};
///
/// let mut port = 0u16;
/// let field = Field::value("port", Tag::new().as_command().as_argument(), &mut port);
/// let err = AnnotationResolver.resolve("Cli", &field.info).unwrap_err();
/// assert_eq!(err, TagError::CommandAndArgument);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationResolver;

impl TagResolver for AnnotationResolver {
    fn resolve(&self, _owner: &str, field: &FieldInfo) -> Result<Tag, TagError> {
        let tag = &field.annotation;
        if tag.cmd && tag.arg {
            return Err(TagError::CommandAndArgument);
        }
        if tag.embed && tag.cmd {
            return Err(TagError::EmbedAndCommand);
        }
        if tag.required && tag.optional {
            return Err(TagError::RequiredAndOptional);
        }
        if let Some(short) = tag.short {
            if short == '-' || short.is_whitespace() || short.is_control() {
                return Err(TagError::InvalidShort(short));
            }
        }
        Ok(tag.clone())
    }
}
