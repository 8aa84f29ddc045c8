//! Node construction.
//!
//! A [`TreeBuilder`] turns a structure into a node: it flattens the
//! structure's fields, classifies each one as a branch (sub-command or
//! branching argument, see `branch.rs`) or a leaf (flag or positional, see
//! `leaf.rs`), then checks the node's own invariants.

use command_tree_core::{FieldInfo, Node, NodeArena, NodeId, NodeKind, Schema, Slot, SlotPath, Tag};
use tracing::debug;

use crate::Compiler;
use crate::error::{BuildError, Location, Result};
use crate::flatten::{FlatField, flatten};
use crate::seen::SeenFlags;

/// A flattened field with its public name and environment name resolved.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) at: Location,
    pub(crate) info: FieldInfo,
    pub(crate) tag: Tag,
    pub(crate) name: String,
    pub(crate) target: SlotPath,
}

/// Builds nodes into an arena, following the compiler's settings.
pub(crate) struct TreeBuilder<'c> {
    pub(crate) compiler: &'c Compiler,
    pub(crate) nodes: NodeArena,
}

impl<'c> TreeBuilder<'c> {
    pub(crate) fn new(compiler: &'c Compiler) -> Self {
        Self {
            compiler,
            nodes: NodeArena::new(),
        }
    }

    pub(crate) fn into_nodes(self) -> NodeArena {
        self.nodes
    }

    /// Builds a node of `kind` from `schema`, whose storage lives at
    /// `target`.
    ///
    /// `seen` holds the flags of every ancestor; this node's flags are added
    /// while it is built and removed again before returning.
    pub(crate) fn build_node(
        &mut self,
        schema: &mut dyn Schema,
        kind: NodeKind,
        target: SlotPath,
        seen: &mut SeenFlags,
    ) -> Result<NodeId> {
        let owner = schema.type_name();
        let id = self.nodes.push(Node::new(kind, target.clone()));
        let fields = flatten(schema, &target, self.compiler.resolver.as_ref())?;

        for FlatField {
            info,
            slot,
            mut tag,
            target,
        } in fields
        {
            if self.compiler.is_excluded(owner, info.name) {
                debug!(owner, field = info.name, "skipping excluded field");
                continue;
            }

            let name = public_name(&tag, info.name);
            let env = format!("{}{}", tag.env_prefix, tag.env.as_deref().unwrap_or_default());
            tag.env = (!env.is_empty()).then_some(env);
            let entry = Entry {
                at: Location::field(owner, info.name),
                info,
                tag,
                name,
                target,
            };

            // Nested structures are commands or branching arguments unless a
            // mapper decodes them as a single value.
            match slot {
                Slot::Struct(child)
                    if (entry.tag.cmd || entry.tag.arg)
                        && self
                            .compiler
                            .registry
                            .for_type(child.schema_type_id())
                            .is_none() =>
                {
                    let kind = if entry.tag.arg {
                        NodeKind::Argument
                    } else {
                        NodeKind::Command
                    };
                    self.build_child(id, kind, entry, child, seen)?;
                }
                _ => self.build_field(id, entry, seen)?,
            }
        }

        let node = &mut self.nodes[id];
        for flag in &node.flags {
            seen.release(flag);
        }

        // The first positional is never checked.
        let mut last_required = true;
        for (position, value) in node.positional.iter_mut().enumerate() {
            if !last_required && value.required {
                return Err(BuildError::RequiredAfterOptional {
                    at: Location::structure(owner),
                    name: value.name.clone(),
                });
            }
            last_required = value.required;
            value.position = position;
        }

        debug!(
            owner,
            kind = ?node.kind,
            flags = node.flags.len(),
            positional = node.positional.len(),
            children = node.children.len(),
            "built node"
        );
        Ok(id)
    }
}

/// Public name of a field: the explicit tag name, or the identifier in
/// lowercase hyphenated form, behind the accumulated prefix.
pub(crate) fn public_name(tag: &Tag, ident: &str) -> String {
    match tag.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{}{}", tag.prefix, name),
        _ => format!("{}{}", tag.prefix, dashed(ident)),
    }
}

/// `dry_run`, `DryRun` and `dryRun` all become `dry-run`. A run of digits
/// is a word of its own: `ipv4Address` becomes `ipv-4-address`.
fn dashed(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if i > 0 && !out.is_empty() && !out.ends_with('-') {
            let prev = chars[i - 1];
            let boundary = if c.is_uppercase() {
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            } else if c.is_ascii_digit() {
                !prev.is_ascii_digit()
            } else {
                prev.is_ascii_digit()
            };
            if boundary {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }

    let trimmed = out.trim_end_matches('-').len();
    out.truncate(trimmed);
    out
}
