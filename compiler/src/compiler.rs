//! The compiler entry point.

use std::fmt;

use command_tree_core::{
    AnnotationResolver, Application, Field, Flag, Group, NodeKind, Registry, Schema, Slot,
    SlotPath, Tag, TagResolver, Vars,
};
use regex::Regex;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::{BuildError, ConfigError, Location, Result};
use crate::node::TreeBuilder;
use crate::seen::SeenFlags;

/// Compiles schemas into [`Application`] trees.
///
/// A compiler holds everything that is not declared on the schema itself:
/// the type-conversion registry, the tag resolver, predeclared groups,
/// field-exclusion patterns, global flags and template variables. It can be
/// reused for any number of compilations.
pub struct Compiler {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) registry: Registry,
    pub(crate) resolver: Box<dyn TagResolver>,
    pub(crate) groups: Vec<Group>,
    pub(crate) ignore_fields: Vec<Regex>,
    pub(crate) global_flags: Vec<Flag>,
    pub(crate) vars: Vars,
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("ignore_fields", &self.ignore_fields)
            .field("global_flags", &self.global_flags.len())
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            name: String::new(),
            help: String::new(),
            registry: Registry::with_builtins(),
            resolver: Box::new(AnnotationResolver),
            groups: Vec::new(),
            ignore_fields: Vec::new(),
            global_flags: Vec::new(),
            vars: Vars::new(),
        }
    }
}

impl Compiler {
    /// Creates a compiler with the built-in mappers and the annotation
    /// resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler from plain-data configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if an exclusion pattern does
    /// not compile.
    pub fn from_config(config: CompilerConfig) -> std::result::Result<Self, ConfigError> {
        let mut compiler = Self::new()
            .with_name(&config.name)
            .with_help(&config.help)
            .with_groups(config.groups)
            .with_vars(config.vars);
        for pattern in &config.ignore_fields {
            compiler = compiler.ignore_field(pattern)?;
        }
        Ok(compiler)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Replaces the type-conversion registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Replaces the tag resolver.
    pub fn with_tag_resolver(mut self, resolver: impl TagResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = Group>) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Excludes every field whose `<Structure>.<field>` key matches
    /// `pattern`.
    pub fn ignore_field(mut self, pattern: &str) -> std::result::Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.ignore_fields.push(regex);
        Ok(self)
    }

    /// Adds a flag to the root that no schema field may redeclare.
    pub fn with_global_flag(mut self, flag: Flag) -> Self {
        self.global_flags.push(flag);
        self
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key, value);
        self
    }

    pub fn with_vars(mut self, vars: Vars) -> Self {
        self.vars = self.vars.clone_with(&vars);
        self
    }

    pub(crate) fn is_excluded(&self, owner: &str, field: &str) -> bool {
        if self.ignore_fields.is_empty() {
            return false;
        }
        let key = format!("{owner}.{field}");
        self.ignore_fields.iter().any(|pattern| pattern.is_match(&key))
    }

    /// Compiles `root` into an application tree.
    ///
    /// Absent command and embedded structures reachable from `root` are
    /// instantiated with their defaults, so the tree's slot paths all lead
    /// to live storage.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] found; no partial tree is produced.
    pub fn compile(&self, root: &mut dyn Schema) -> Result<Application> {
        let owner = root.type_name();
        let mut seen = SeenFlags::seeded(&self.global_flags);
        let mut builder = TreeBuilder::new(self);
        let root_id =
            builder.build_node(&mut *root, NodeKind::Application, SlotPath::root(), &mut seen)?;
        let mut nodes = builder.into_nodes();

        let node = &mut nodes[root_id];
        if !node.positional.is_empty() && !node.children.is_empty() {
            return Err(BuildError::MixedArguments {
                at: Location::structure(owner),
            });
        }
        node.name = self.name.clone();
        node.help = self.help.clone();
        node.detail = root.detail();
        node.flags.splice(0..0, self.global_flags.iter().cloned());

        let mut tag = Tag::new();
        tag.vars = self.vars.clone();
        debug!(
            owner,
            nodes = nodes.len(),
            global_flags = self.global_flags.len(),
            "compiled command tree"
        );
        Ok(Application::new(nodes, root_id, tag))
    }

    /// Compiles a declared field as the application root.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidRoot`] unless the field holds a
    /// structure; absent optional structures are rejected too.
    pub fn compile_field(&self, field: Field<'_>) -> Result<Application> {
        let Field { info, slot } = field;
        let root: &mut dyn Schema = match slot {
            Slot::Struct(schema) => schema,
            Slot::Dynamic(boxed) => &mut **boxed,
            Slot::Optional(optional) if optional.is_present() => optional.ensure_present(),
            Slot::Value(_) | Slot::Optional(_) | Slot::Plugins(_) => {
                return Err(BuildError::InvalidRoot {
                    type_name: info.type_name,
                });
            }
        };
        self.compile(root)
    }
}

/// Compiles `root` with a default [`Compiler`].
pub fn compile(root: &mut dyn Schema) -> Result<Application> {
    Compiler::new().compile(root)
}
