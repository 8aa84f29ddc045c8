//! Compiler configuration.
//!
//! The parts of a [`Compiler`](crate::Compiler) that are plain data can be
//! kept in a YAML file next to the application: its name and help,
//! predeclared groups, field-exclusion patterns and template variables.
//! Global flags and mappers carry code and are set on the compiler directly.
//!
//! # Example YAML
//!
//! ```yaml
//! name: app
//! help: Demo application
//! groups:
//!   - key: net
//!     title: Networking
//! ignore_fields:
//!   - "^Cli\\.internal$"
//! vars:
//!   version: "1.0"
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use command_tree_core::{Group, Vars};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Plain-data compiler settings.
///
/// # Examples
///
/// ```
/// use command_tree_compiler::CompilerConfig;
///
/// let config = CompilerConfig::from_yaml_str("
/// name: app
/// groups:
///   - key: net
///     title: Networking
/// ").unwrap();
/// assert_eq!(config.name, "app");
/// assert_eq!(config.groups[0].title, "Networking");
/// assert!(config.ignore_fields.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Application name, given to the root node.
    pub name: String,
    /// Application help, given to the root node.
    pub help: String,
    /// Groups referenced by field tags.
    pub groups: Vec<Group>,
    /// Regular expressions matched against `<Structure>.<field>`.
    pub ignore_fields: Vec<String>,
    /// Default template variables.
    pub vars: Vars,
}

impl CompilerConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
