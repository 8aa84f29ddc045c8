//! Sub-commands and branching arguments.

use command_tree_core::{DefaultCommand, NodeId, NodeKind, Schema};
use tracing::debug;

use crate::error::{BuildError, Result};
use crate::groups::group_for_key;
use crate::node::{Entry, TreeBuilder};
use crate::seen::SeenFlags;

impl TreeBuilder<'_> {
    /// Builds `schema` as a child of `parent` and attaches it.
    ///
    /// A branching argument's first positional must carry the branch's own
    /// name; it becomes the node's argument and the remaining positionals
    /// keep their positions.
    pub(crate) fn build_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        entry: Entry,
        schema: &mut dyn Schema,
        seen: &mut SeenFlags,
    ) -> Result<()> {
        let Entry {
            at,
            tag,
            name,
            target,
            ..
        } = entry;
        let child = self.build_node(&mut *schema, kind, target, seen)?;
        let detail = schema.detail();
        let group = group_for_key(&self.compiler.groups, tag.group.as_deref());
        let is_argument = tag.arg;
        let default_command = tag.default_command;

        let node = &mut self.nodes[child];
        node.name = name;
        node.parent = Some(parent);
        node.help = tag.help.clone();
        node.hidden = tag.hidden;
        node.group = group;
        node.aliases = tag.aliases.clone();
        node.detail = detail;
        node.tag = tag;

        if is_argument {
            let Some(first) = node.positional.first() else {
                return Err(BuildError::MissingBranchArgument {
                    at,
                    name: node.name.clone(),
                });
            };
            if first.name != node.name {
                return Err(BuildError::BranchArgumentMismatch {
                    at,
                    name: node.name.clone(),
                });
            }
            let argument = node.positional.remove(0);
            if node.help.is_empty() {
                node.help = argument.help.clone();
            }
            node.argument = Some(argument);
        } else if default_command != DefaultCommand::No {
            let takes_arguments = !node.children.is_empty() || !node.positional.is_empty();
            let summary = node.summary();
            if self.nodes[parent].default_command.is_some() {
                return Err(BuildError::MultipleDefaultCommands {
                    at,
                    parent: self.nodes[parent].summary(),
                });
            }
            if default_command != DefaultCommand::WithArgs && takes_arguments {
                return Err(BuildError::DefaultCommandWithArguments {
                    at,
                    command: summary,
                });
            }
            self.nodes[parent].default_command = Some(child);
        }

        self.nodes[parent].children.push(child);

        let node = &self.nodes[child];
        if !node.positional.is_empty() && !node.children.is_empty() {
            return Err(BuildError::MixedArguments { at });
        }
        debug!(field = %at, name = %node.name, kind = ?node.kind, "attached child");
        Ok(())
    }
}
