//! Flags and positional values.

use command_tree_core::{Flag, NodeId, Value};

use crate::error::{BuildError, Result};
use crate::groups::group_for_key;
use crate::node::{Entry, TreeBuilder};
use crate::seen::SeenFlags;

impl TreeBuilder<'_> {
    /// Turns a leaf field into a positional of `parent`, or into one of its
    /// flags after checking the names against every flag in scope.
    pub(crate) fn build_field(
        &mut self,
        parent: NodeId,
        entry: Entry,
        seen: &mut SeenFlags,
    ) -> Result<()> {
        let Entry {
            at,
            info,
            tag,
            name,
            target,
        } = entry;
        let mapper = self
            .compiler
            .registry
            .for_named_value(tag.type_hint.as_deref(), info.type_id)
            .ok_or(BuildError::UnsupportedType {
                at,
                type_name: info.type_name,
            })?;

        let value = Value {
            name,
            help: tag.help.clone(),
            default: tag.default.clone(),
            default_value: (info.zero)(),
            mapper,
            tag: tag.clone(),
            type_name: info.type_name,
            enum_values: tag.enum_values.clone(),
            passthrough: tag.passthrough,
            required: if tag.arg { !tag.optional } else { tag.required },
            format: tag.format.clone(),
            position: 0,
            target,
        };

        if tag.arg {
            self.nodes[parent].positional.push(value);
            return Ok(());
        }

        if !seen.claim_long(&value.name) {
            return Err(BuildError::DuplicateFlag {
                at,
                name: value.name,
            });
        }
        if let Some(short) = tag.short {
            if !seen.claim_short(short) {
                return Err(BuildError::DuplicateShortFlag { at, short });
            }
        }

        let flag = Flag {
            value,
            short: tag.short,
            placeholder: tag.placeholder,
            env: tag.env,
            group: group_for_key(&self.compiler.groups, tag.group.as_deref()),
            xor: tag.xor,
            hidden: tag.hidden,
        };
        self.nodes[parent].flags.push(flag);
        Ok(())
    }
}
