//! Core types for compiled command trees.
//!
//! This crate defines the data model shared by the schema compiler and the
//! consumers of its output:
//!
//! - [`Schema`], [`Field`] and [`Slot`]: how annotated structures describe
//!   their fields.
//! - [`Tag`]: resolved per-field metadata, produced by a [`TagResolver`].
//! - [`Registry`] and [`Mapper`]: type conversion for field storage.
//! - [`Node`], [`Flag`], [`Value`], [`Group`]: the compiled tree elements.
//! - [`Application`]: the frozen tree with read-only traversal helpers.
//! - [`NodeOutline`]: a serializable outline of a compiled tree.
//!
//! The compiler itself lives in the `command-tree-compiler` crate.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//!
//! #[derive(Debug, Default)]
//! struct CopyFiles {
//!     src: String,
//!     dst: String,
//! }
//!
//! impl Schema for CopyFiles {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::value("src", Tag::new().as_argument(), &mut self.src),
//!             Field::value("dst", Tag::new().as_argument().as_optional(), &mut self.dst),
//!         ]
//!     }
//! }
//!
//! let mut copy = CopyFiles::default();
//! let fields = copy.fields();
//! assert_eq!(fields.len(), 2);
//! assert!(fields[1].info.annotation.optional);
//! ```

mod mapper;
mod outline;
mod schema;
mod tag;
mod tree;
mod types;

pub use mapper::{AnyValue, FromStrMapper, Mapper, MapperError, Registry, SeparatedMapper};
pub use outline::{FlagOutline, NodeOutline, ValueOutline};
pub use schema::{Field, FieldInfo, OptionalSchema, Plugins, Schema, Slot, short_type_name};
pub use tag::{AnnotationResolver, DefaultCommand, Tag, TagError, TagResolver, Vars};
pub use tree::{Application, NodeArena};
pub use types::*;
