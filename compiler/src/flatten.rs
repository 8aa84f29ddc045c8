//! Schema flattening.
//!
//! Expands embedded structures, anonymous fields and plugin collections into
//! one ordered list of leaf-or-branch fields, composing the embedding tag
//! into the tags of the fields it contributes.

use command_tree_core::{Field, FieldInfo, Schema, Slot, SlotPath, Tag, TagResolver};
use tracing::debug;

use crate::error::{BuildError, Location, Result};

/// A field of a node's structure after flattening.
#[derive(Debug)]
pub(crate) struct FlatField<'a> {
    pub(crate) info: FieldInfo,
    pub(crate) slot: Slot<'a>,
    pub(crate) tag: Tag,
    /// Storage location relative to the compiled root.
    pub(crate) target: SlotPath,
}

/// Flattens the fields of `schema`, whose storage lives at `base`.
///
/// Fails on the first field whose tag can't be resolved or that can't be
/// embedded.
pub(crate) fn flatten<'a>(
    schema: &'a mut dyn Schema,
    base: &SlotPath,
    resolver: &dyn TagResolver,
) -> Result<Vec<FlatField<'a>>> {
    let owner = schema.type_name();
    let mut out = Vec::new();

    for Field { info, slot } in schema.fields() {
        let at = Location::field(owner, info.name);
        let tag = resolver
            .resolve(owner, &info)
            .map_err(|source| BuildError::Tag { at, source })?;
        if tag.ignored {
            debug!(field = %at, "skipping ignored field");
            continue;
        }
        let target = base.child(info.name);

        // Commands and embedded structures may be absent; create them so
        // they can be populated.
        let slot = match slot {
            Slot::Optional(optional) if tag.cmd || tag.embed || info.anonymous => {
                Slot::Struct(optional.ensure_present())
            }
            slot => slot,
        };

        if !info.anonymous && !tag.embed {
            out.push(FlatField {
                info,
                slot,
                tag,
                target,
            });
            continue;
        }

        let nested: &'a mut dyn Schema = match slot {
            Slot::Struct(nested) => nested,
            Slot::Dynamic(boxed) => &mut **boxed,
            Slot::Plugins(plugins) => {
                for (index, plugin) in plugins.iter_mut().enumerate() {
                    out.extend(flatten(plugin, &target.child(index.to_string()), resolver)?);
                }
                continue;
            }
            Slot::Value(_) | Slot::Optional(_) => {
                return Err(BuildError::InvalidEmbed {
                    at,
                    type_name: info.type_name,
                });
            }
        };
        for mut sub in flatten(nested, &target, resolver)? {
            compose(&tag, &mut sub.tag);
            out.push(sub);
        }
    }

    Ok(out)
}

/// Applies the tag of an embedding field to a field it contributes.
fn compose(parent: &Tag, child: &mut Tag) {
    if matches!(child.group.as_deref(), None | Some("")) {
        child.group = parent.group.clone();
    }
    child.prefix = format!("{}{}", parent.prefix, child.prefix);
    child.env_prefix = format!("{}{}", parent.env_prefix, child.env_prefix);
    child.vars = parent.vars.clone_with(&child.vars);
}
