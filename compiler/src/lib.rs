//! Schema compiler for command-line applications.
//!
//! Walks a structure implementing [`Schema`](command_tree_core::Schema) and
//! produces an [`Application`](command_tree_core::Application): a tree of
//! commands, branching arguments, flags and positional values, with every
//! structural rule checked up front.
//!
//! # Overview
//!
//! - Fields tagged as commands or arguments holding a structure become
//!   child nodes.
//! - Embedded and anonymous structures contribute their fields to the
//!   enclosing node, behind the embedding field's name and env prefixes.
//! - Every other field becomes a flag or, when tagged as an argument, a
//!   positional value decoded by a mapper from the
//!   [`Registry`](command_tree_core::Registry).
//! - Flag names are unique along every root-to-node path, while siblings
//!   may reuse them.
//!
//! # Example
//!
//! ```
//! use command_tree_compiler::Compiler;
//! use command_tree_core::{Field, Schema, Tag};
//!
//! #[derive(Debug, Default)]
//! struct Serve {
//!     port: u16,
//! }
//!
//! impl Schema for Serve {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![Field::value("port", Tag::new().with_short('p').with_default("8080"), &mut self.port)]
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Cli {
//!     verbose: bool,
//!     serve: Serve,
//! }
//!
//! impl Schema for Cli {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::value("verbose", Tag::new().with_help("Chatty output"), &mut self.verbose),
//!             Field::structure("serve", Tag::new().as_command().with_help("Run the server"), &mut self.serve),
//!         ]
//!     }
//! }
//!
//! let app = Compiler::new().with_name("app").compile(&mut Cli::default()).unwrap();
//! let serve = app.find_path(&["serve"]).unwrap();
//! assert_eq!(app.root().flags[0].name(), "verbose");
//! assert_eq!(app.node(serve).help, "Run the server");
//! assert_eq!(app.node(serve).flags[0].short, Some('p'));
//! ```

mod branch;
mod compiler;
mod config;
mod error;
mod flatten;
mod groups;
mod leaf;
mod node;
mod seen;

pub use compiler::{Compiler, compile};
pub use config::CompilerConfig;
pub use error::{BuildError, ConfigError, Location, Result};
