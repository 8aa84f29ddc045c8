//! Error types for schema compilation and compiler configuration.
//!
//! Every [`BuildError`] is a defect in the schema declaration, detected while
//! compiling; the first one aborts compilation and no partial tree is
//! returned.

use std::fmt;

use command_tree_core::TagError;
use thiserror::Error;

/// Where in the schema an error was found: the owning structure's type name
/// and, when the error concerns a single field, the field identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub owner: &'static str,
    pub field: Option<&'static str>,
}

impl Location {
    pub fn structure(owner: &'static str) -> Self {
        Self { owner, field: None }
    }

    pub fn field(owner: &'static str, field: &'static str) -> Self {
        Self {
            owner,
            field: Some(field),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{}.{}", self.owner, field),
            None => f.write_str(self.owner),
        }
    }
}

/// Structural errors in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The root is not a structure.
    #[error("expected a structure as the application root but got {type_name}")]
    InvalidRoot { type_name: &'static str },

    /// The field's annotation could not be resolved.
    #[error("{at}: {source}")]
    Tag {
        at: Location,
        #[source]
        source: TagError,
    },

    /// An embedded or anonymous field does not hold a structure.
    #[error("{at}: can't embed a field of type {type_name}, only structures can be embedded")]
    InvalidEmbed {
        at: Location,
        type_name: &'static str,
    },

    /// No mapper is registered for the field's type.
    #[error("{at}: unsupported field type {type_name}, perhaps missing a command marker?")]
    UnsupportedType {
        at: Location,
        type_name: &'static str,
    },

    /// The long name is already used by this node or an ancestor.
    #[error("{at}: duplicate flag --{name}")]
    DuplicateFlag { at: Location, name: String },

    /// The short name is already used by this node or an ancestor.
    #[error("{at}: duplicate short flag -{short}")]
    DuplicateShortFlag { at: Location, short: char },

    /// A required positional follows an optional one.
    #[error("{at}: argument {name:?} can not be required after an optional")]
    RequiredAfterOptional { at: Location, name: String },

    /// A node has both sub-commands/branches and positionals.
    #[error("{at}: can't mix positional arguments and branching arguments")]
    MixedArguments { at: Location },

    /// A branching argument's structure declares no positionals.
    #[error("{at}: positional branch must have at least one child positional argument named {name:?}")]
    MissingBranchArgument { at: Location, name: String },

    /// A branching argument's first positional has another name.
    #[error("{at}: first field in positional branch must have the same name as the parent field ({name})")]
    BranchArgumentMismatch { at: Location, name: String },

    /// A second default command at the same level.
    #[error("{at}: can't have more than one default command under {parent}")]
    MultipleDefaultCommands { at: Location, parent: String },

    /// A default command that takes arguments without allowing them.
    #[error("{at}: default command {command} must not have subcommands or arguments")]
    DefaultCommandWithArguments { at: Location, command: String },
}

/// Convenience alias for results with [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors loading or applying compiler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A field-exclusion pattern is not a valid regular expression.
    #[error("invalid field exclusion pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
