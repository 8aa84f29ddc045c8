//! Flag names claimed along the current build path.

use std::collections::HashSet;

use command_tree_core::Flag;

/// Long (`--name`) and short (`-x`) flag forms declared by the node being
/// built and all of its ancestors.
///
/// A node claims its flags as it declares them and releases them once it is
/// complete, so a descendant can't redeclare an ancestor's flag while
/// siblings built later may reuse the same names.
#[derive(Debug, Default)]
pub(crate) struct SeenFlags(HashSet<String>);

impl SeenFlags {
    /// Claims the names of flags injected from outside the schema.
    pub(crate) fn seeded(flags: &[Flag]) -> Self {
        let mut seen = Self::default();
        for flag in flags {
            seen.claim_long(flag.name());
            if let Some(short) = flag.short {
                seen.claim_short(short);
            }
        }
        seen
    }

    /// Claims `--name`; returns `false` if it was already claimed.
    pub(crate) fn claim_long(&mut self, name: &str) -> bool {
        self.0.insert(format!("--{name}"))
    }

    /// Claims `-short`; returns `false` if it was already claimed.
    pub(crate) fn claim_short(&mut self, short: char) -> bool {
        self.0.insert(format!("-{short}"))
    }

    /// Releases both forms of `flag`.
    pub(crate) fn release(&mut self, flag: &Flag) {
        self.0.remove(&flag.long_form());
        if let Some(short) = flag.short_form() {
            self.0.remove(&short);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
