//! Command tree outline example.
//!
//! Declares a small deployment tool, compiles it and prints the resulting
//! tree, first as an indented listing and then as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-tree-demos --example outline
//! ```

use std::io::Write;
use std::path::PathBuf;

use command_tree_compiler::Compiler;
use command_tree_core::{
    AnyValue, Application, Field, Flag, Group, NodeId, Registry, Schema, Tag, Value,
};

#[derive(Debug, Default)]
struct RegistryOptions {
    url: String,
    insecure: bool,
}

impl Schema for RegistryOptions {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("url", Tag::new().with_env("URL").with_help("Registry URL"), &mut self.url),
            Field::value("insecure", Tag::new().with_help("Skip TLS verification"), &mut self.insecure),
        ]
    }
}

#[derive(Debug, Default)]
struct Push {
    image: String,
    tags: Vec<String>,
}

impl Schema for Push {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("image", Tag::new().as_argument().with_help("Image to push"), &mut self.image),
            Field::value("tags", Tag::new().as_argument().as_optional(), &mut self.tags),
        ]
    }

    fn detail(&self) -> Option<String> {
        Some("Uploads a local image and any extra tags to the registry.".to_string())
    }
}

#[derive(Debug, Default)]
struct Rollback {
    release: String,
    force: bool,
}

impl Schema for Rollback {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("release", Tag::new().as_argument().with_help("Release to act on"), &mut self.release),
            Field::value("force", Tag::new().with_short('f'), &mut self.force),
        ]
    }
}

#[derive(Debug, Default)]
struct Release {
    rollback: Rollback,
}

impl Schema for Release {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure(
            "rollback",
            Tag::new().as_command().with_help("Roll back a release"),
            &mut self.rollback,
        )]
    }
}

#[derive(Debug, Default)]
struct Status;

impl Schema for Status {
    fn fields(&mut self) -> Vec<Field<'_>> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
struct Deploy {
    config: PathBuf,
    registry: RegistryOptions,
    status: Status,
    push: Push,
    release: Release,
}

impl Schema for Deploy {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("config", Tag::new().with_short('c').with_default("deploy.yml"), &mut self.config),
            Field::structure(
                "registry",
                Tag::new()
                    .as_embedded()
                    .with_prefix("registry-")
                    .with_env_prefix("DEPLOY_REGISTRY_")
                    .with_group("registry"),
                &mut self.registry,
            ),
            Field::structure(
                "status",
                Tag::new().as_command().as_default_command().with_help("Show deployment status"),
                &mut self.status,
            ),
            Field::structure("push", Tag::new().as_command().with_help("Push an image"), &mut self.push),
            Field::structure("release", Tag::new().as_command().with_alias("rel"), &mut self.release),
        ]
    }
}

fn main() {
    let mapper = Registry::with_builtins()
        .for_type(std::any::TypeId::of::<bool>())
        .unwrap();
    let help = Flag::new(Value::new("help", mapper, AnyValue::zero_of::<bool>()).with_help("Show help"))
        .with_short('h');

    let app = Compiler::new()
        .with_name("deploy")
        .with_help("Ship container images")
        .with_group(Group::new("registry", "Registry options"))
        .with_global_flag(help)
        .compile(&mut Deploy::default())
        .unwrap();

    print_node(&app, app.root_id());
    println!();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &app.outline()).unwrap();
    writeln!(out).unwrap();
}

fn print_node(app: &Application, id: NodeId) {
    let node = app.node(id);
    let indent = "  ".repeat(app.depth(id));
    let default = if app.parent(id).and_then(|p| p.default_command) == Some(id) {
        " (default)"
    } else {
        ""
    };
    println!("{indent}{}{default}  {}", node.summary(), node.help);
    for flag in &node.flags {
        let short = flag.short.map(|c| format!("-{c}, ")).unwrap_or_default();
        println!("{indent}    {short}--{}  {}", flag.name(), flag.value.help);
    }
    for child in &node.children {
        print_node(app, *child);
    }
}
