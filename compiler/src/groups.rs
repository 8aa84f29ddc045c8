//! Group resolution.

use command_tree_core::Group;

/// Resolves a tag's group key against the predeclared `groups`.
///
/// An unknown key yields an ad-hoc group titled after the key; an absent or
/// empty key yields no group.
pub(crate) fn group_for_key(groups: &[Group], key: Option<&str>) -> Option<Group> {
    let key = key.filter(|key| !key.is_empty())?;
    let group = groups
        .iter()
        .find(|group| group.key == key)
        .cloned()
        .unwrap_or_else(|| Group::new(key, key));
    Some(group)
}
