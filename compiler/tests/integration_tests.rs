use std::path::PathBuf;
use std::time::Duration;

use command_tree_compiler::{BuildError, Compiler, Location, compile};
use command_tree_core::{
    AnyValue, Field, Flag, Group, Mapper, MapperError, NodeKind, Plugins, Registry, Schema, Tag,
    TagError, Value,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn flag_names(flags: &[Flag]) -> Vec<&str> {
    flags.iter().map(Flag::name).collect()
}

fn help_flag() -> Flag {
    let mapper = Registry::with_builtins()
        .for_type(std::any::TypeId::of::<bool>())
        .unwrap();
    Flag::new(Value::new("help", mapper, AnyValue::zero_of::<bool>()).with_help("Show help"))
        .with_short('h')
}

// ---------------------------------------------------------------------------
// Sibling commands reuse flag names
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Serve {
    port: u16,
}

impl Schema for Serve {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("port", Tag::new().with_short('p'), &mut self.port)]
    }

    fn detail(&self) -> Option<String> {
        Some("Starts the HTTP server in the foreground.".to_string())
    }
}

#[derive(Debug, Default)]
struct Build {
    port: u16,
}

impl Schema for Build {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("port", Tag::new().with_short('p'), &mut self.port)]
    }
}

#[derive(Debug, Default)]
struct Siblings {
    verbose: bool,
    serve: Serve,
    build: Build,
}

impl Schema for Siblings {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("verbose", Tag::new().with_short('v'), &mut self.verbose),
            Field::structure("serve", Tag::new().as_command().with_help("Serve"), &mut self.serve),
            Field::structure("build", Tag::new().as_command().with_alias("b"), &mut self.build),
        ]
    }
}

#[test]
fn test_siblings_may_reuse_flag_names() {
    let app = compile(&mut Siblings::default()).unwrap();

    let root = app.root();
    assert_eq!(root.kind, NodeKind::Application);
    assert_eq!(flag_names(&root.flags), vec!["verbose"]);
    assert_eq!(root.children.len(), 2);

    for name in ["serve", "build"] {
        let id = app.find_path(&[name]).unwrap();
        let node = app.node(id);
        assert_eq!(node.kind, NodeKind::Command);
        assert_eq!(flag_names(&node.flags), vec!["port"]);
        assert_eq!(node.flags[0].short, Some('p'));
        assert_eq!(app.parent(id).unwrap().kind, NodeKind::Application);
    }
}

#[test]
fn test_child_attributes_and_detail() {
    let app = compile(&mut Siblings::default()).unwrap();

    let serve = app.node(app.find_path(&["serve"]).unwrap());
    assert_eq!(serve.help, "Serve");
    assert_eq!(
        serve.detail.as_deref(),
        Some("Starts the HTTP server in the foreground.")
    );
    assert_eq!(serve.target.to_string(), "serve");
    assert_eq!(serve.flags[0].value.target.to_string(), "serve.port");

    let build = app.find_child(app.root_id(), "b").unwrap();
    assert_eq!(app.node(build).name, "build");
    assert_eq!(app.node(build).detail, None);
}

#[test]
fn test_recompiling_yields_identical_outline() {
    let compiler = Compiler::new().with_name("app");
    let first = compiler.compile(&mut Siblings::default()).unwrap();
    let second = compiler.compile(&mut Siblings::default()).unwrap();

    assert_eq!(first.outline(), second.outline());
}

// ---------------------------------------------------------------------------
// Flag scoping
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ShadowingChild {
    verbose: bool,
}

impl Schema for ShadowingChild {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("verbose", Tag::new(), &mut self.verbose)]
    }
}

#[derive(Debug, Default)]
struct ShadowingRoot {
    verbose: bool,
    child: ShadowingChild,
}

impl Schema for ShadowingRoot {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("verbose", Tag::new(), &mut self.verbose),
            Field::structure("child", Tag::new().as_command(), &mut self.child),
        ]
    }
}

#[test]
fn test_descendant_cannot_redeclare_ancestor_flag() {
    let err = compile(&mut ShadowingRoot::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::DuplicateFlag {
            at: Location::field("ShadowingChild", "verbose"),
            name: "verbose".to_string(),
        }
    );
}

#[derive(Debug, Default)]
struct ShortClash {
    port: u16,
    profile: String,
}

impl Schema for ShortClash {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("port", Tag::new().with_short('p'), &mut self.port),
            Field::value("profile", Tag::new().with_short('p'), &mut self.profile),
        ]
    }
}

#[test]
fn test_duplicate_short_flag() {
    let err = compile(&mut ShortClash::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::DuplicateShortFlag {
            at: Location::field("ShortClash", "profile"),
            short: 'p',
        }
    );
}

#[test]
fn test_global_flags_come_first_and_are_reserved() {
    let app = Compiler::new()
        .with_global_flag(help_flag())
        .compile(&mut Siblings::default())
        .unwrap();
    assert_eq!(flag_names(&app.root().flags), vec!["help", "verbose"]);

    let serve = app.find_path(&["serve"]).unwrap();
    let in_scope: Vec<&str> = app.flags_in_scope(serve).into_iter().map(Flag::name).collect();
    assert_eq!(in_scope, vec!["help", "verbose", "port"]);
}

#[derive(Debug, Default)]
struct DeclaresHelp {
    hostname: String,
}

impl Schema for DeclaresHelp {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("hostname", Tag::new().with_short('h'), &mut self.hostname)]
    }
}

#[test]
fn test_global_flag_short_conflict() {
    let err = Compiler::new()
        .with_global_flag(help_flag())
        .compile(&mut DeclaresHelp::default())
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicateShortFlag { short: 'h', .. }));
}

// ---------------------------------------------------------------------------
// Positional ordering
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CopyFiles {
    src: PathBuf,
    dst: PathBuf,
}

impl Schema for CopyFiles {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("src", Tag::new().as_argument().with_help("Source"), &mut self.src),
            Field::value("dst", Tag::new().as_argument().as_optional(), &mut self.dst),
        ]
    }
}

#[test]
fn test_required_then_optional_positionals() {
    let app = compile(&mut CopyFiles::default()).unwrap();
    let positional = &app.root().positional;

    assert_eq!(positional.len(), 2);
    assert_eq!((positional[0].name.as_str(), positional[0].position), ("src", 0));
    assert!(positional[0].required);
    assert_eq!((positional[1].name.as_str(), positional[1].position), ("dst", 1));
    assert!(!positional[1].required);
    assert_eq!(app.root().summary(), "<src> [<dst>]");
}

#[derive(Debug, Default)]
struct Reversed {
    src: String,
    dst: String,
}

impl Schema for Reversed {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("src", Tag::new().as_argument().as_optional(), &mut self.src),
            Field::value("dst", Tag::new().as_argument(), &mut self.dst),
        ]
    }
}

#[test]
fn test_required_after_optional_fails() {
    let err = compile(&mut Reversed::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::RequiredAfterOptional {
            at: Location::structure("Reversed"),
            name: "dst".to_string(),
        }
    );
}

#[derive(Debug, Default)]
struct AllOptional {
    first: String,
    second: String,
}

impl Schema for AllOptional {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("first", Tag::new().as_argument().as_optional(), &mut self.first),
            Field::value("second", Tag::new().as_argument().as_optional(), &mut self.second),
        ]
    }
}

#[test]
fn test_optional_positionals_never_fail() {
    let app = compile(&mut AllOptional::default()).unwrap();
    let positions: Vec<usize> = app.root().positional.iter().map(|p| p.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[derive(Debug, Default)]
struct LoneOptional {
    target: String,
}

impl Schema for LoneOptional {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("target", Tag::new().as_argument().as_optional(), &mut self.target)]
    }
}

#[test]
fn test_lone_optional_positional() {
    let app = compile(&mut LoneOptional::default()).unwrap();
    assert_eq!(app.root().positional.len(), 1);
    assert!(!app.root().positional[0].required);
}

// ---------------------------------------------------------------------------
// Branching arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Delete {
    force: bool,
}

impl Schema for Delete {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("force", Tag::new().with_short('f'), &mut self.force)]
    }
}

#[derive(Debug, Default)]
struct UserBranch {
    user: String,
    delete: Delete,
}

impl Schema for UserBranch {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("user", Tag::new().as_argument().with_help("User to act on"), &mut self.user),
            Field::structure("delete", Tag::new().as_command(), &mut self.delete),
        ]
    }
}

#[derive(Debug, Default)]
struct Users {
    user: UserBranch,
}

impl Schema for Users {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure("user", Tag::new().as_argument(), &mut self.user)]
    }
}

#[test]
fn test_branch_argument_is_promoted() {
    let app = compile(&mut Users::default()).unwrap();

    let branch_id = app.root().children[0];
    let branch = app.node(branch_id);
    assert_eq!(branch.kind, NodeKind::Argument);
    assert_eq!(branch.name, "user");
    assert!(branch.positional.is_empty());
    assert_eq!(branch.argument.as_ref().unwrap().name, "user");
    assert_eq!(branch.help, "User to act on");
    assert_eq!(branch.summary(), "<user>");

    let delete = app.find_child(branch_id, "delete").unwrap();
    assert_eq!(app.full_path(delete), "user delete");
    assert_eq!(app.depth(delete), 2);
}

#[derive(Debug, Default)]
struct MisnamedBranch {
    name: String,
}

impl Schema for MisnamedBranch {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("name", Tag::new().as_argument(), &mut self.name)]
    }
}

#[derive(Debug, Default)]
struct Misnamed {
    user: MisnamedBranch,
}

impl Schema for Misnamed {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure("user", Tag::new().as_argument(), &mut self.user)]
    }
}

#[test]
fn test_branch_argument_name_mismatch() {
    let err = compile(&mut Misnamed::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::BranchArgumentMismatch {
            at: Location::field("Misnamed", "user"),
            name: "user".to_string(),
        }
    );
}

#[derive(Debug, Default)]
struct EmptyBranch {
    force: bool,
}

impl Schema for EmptyBranch {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("force", Tag::new(), &mut self.force)]
    }
}

#[derive(Debug, Default)]
struct MissingArgument {
    user: EmptyBranch,
}

impl Schema for MissingArgument {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure("user", Tag::new().as_argument(), &mut self.user)]
    }
}

#[test]
fn test_branch_without_positionals() {
    let err = compile(&mut MissingArgument::default()).unwrap_err();
    assert!(matches!(err, BuildError::MissingBranchArgument { name, .. } if name == "user"));
}

// ---------------------------------------------------------------------------
// Mixed positionals and children
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MixedRoot {
    file: String,
    serve: Serve,
}

impl Schema for MixedRoot {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("file", Tag::new().as_argument(), &mut self.file),
            Field::structure("serve", Tag::new().as_command(), &mut self.serve),
        ]
    }
}

#[test]
fn test_root_cannot_mix_positionals_and_children() {
    let err = compile(&mut MixedRoot::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::MixedArguments {
            at: Location::structure("MixedRoot"),
        }
    );
}

#[derive(Debug, Default)]
struct MixedParent {
    nested: MixedRoot,
}

impl Schema for MixedParent {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure("nested", Tag::new().as_command(), &mut self.nested)]
    }
}

#[test]
fn test_child_cannot_mix_positionals_and_children() {
    let err = compile(&mut MixedParent::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::MixedArguments {
            at: Location::field("MixedParent", "nested"),
        }
    );
}

#[test]
fn test_children_and_positionals_are_exclusive() {
    for app in [
        compile(&mut Siblings::default()).unwrap(),
        compile(&mut Users::default()).unwrap(),
        compile(&mut CopyFiles::default()).unwrap(),
    ] {
        for (_, node) in app.nodes() {
            assert!(node.children.is_empty() || node.positional.is_empty());
        }
    }
}

// ---------------------------------------------------------------------------
// Default commands
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Status;

impl Schema for Status {
    fn fields(&mut self) -> Vec<Field<'_>> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
struct Run {
    target: String,
}

impl Schema for Run {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("target", Tag::new().as_argument(), &mut self.target)]
    }
}

#[derive(Debug, Default)]
struct TwoDefaults {
    status: Status,
    info: Status,
}

impl Schema for TwoDefaults {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::structure("status", Tag::new().as_command().as_default_command(), &mut self.status),
            Field::structure("info", Tag::new().as_command().as_default_command(), &mut self.info),
        ]
    }
}

#[test]
fn test_multiple_default_commands() {
    let err = compile(&mut TwoDefaults::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::MultipleDefaultCommands {
            at: Location::field("TwoDefaults", "info"),
            parent: "<root>".to_string(),
        }
    );
}

#[derive(Debug, Default)]
struct DefaultWithArgs {
    status: Status,
    run: Run,
}

impl Schema for DefaultWithArgs {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::structure("status", Tag::new().as_command(), &mut self.status),
            Field::structure("run", Tag::new().as_command().as_default_command(), &mut self.run),
        ]
    }
}

#[test]
fn test_default_command_with_positional_fails() {
    let err = compile(&mut DefaultWithArgs::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::DefaultCommandWithArguments {
            at: Location::field("DefaultWithArgs", "run"),
            command: "run <target>".to_string(),
        }
    );
}

#[derive(Debug, Default)]
struct DefaultAllowingArgs {
    status: Status,
    run: Run,
}

impl Schema for DefaultAllowingArgs {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::structure("status", Tag::new().as_command(), &mut self.status),
            Field::structure(
                "run",
                Tag::new().as_command().as_default_command_with_args(),
                &mut self.run,
            ),
        ]
    }
}

#[test]
fn test_default_command_with_args_allowed() {
    let app = compile(&mut DefaultAllowingArgs::default()).unwrap();
    let default = app.default_command(app.root_id()).unwrap();
    assert_eq!(default.name, "run");
    assert_eq!(app.outline().default_command.as_deref(), Some("run"));
}

// ---------------------------------------------------------------------------
// Embedding and naming
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Tls {
    cert_file: PathBuf,
}

impl Schema for Tls {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("cert_file", Tag::new().with_env("CERT"), &mut self.cert_file)]
    }
}

#[derive(Debug, Default)]
struct Database {
    host: String,
    max_conns: u32,
    tls: Tls,
}

impl Schema for Database {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("host", Tag::new().with_env("HOST"), &mut self.host),
            Field::value("max_conns", Tag::new().with_group("tuning"), &mut self.max_conns),
            Field::structure(
                "tls",
                Tag::new().as_embedded().with_prefix("tls-").with_env_prefix("TLS_"),
                &mut self.tls,
            ),
        ]
    }
}

#[derive(Debug, Default)]
struct Embedding {
    database: Database,
    internal: String,
    secret: String,
}

impl Schema for Embedding {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::structure(
                "database",
                Tag::new()
                    .as_embedded()
                    .with_prefix("db-")
                    .with_env_prefix("APP_DB_")
                    .with_group("storage"),
                &mut self.database,
            ),
            Field::value("internal", Tag::new(), &mut self.internal),
            Field::value("secret", Tag::new().as_ignored(), &mut self.secret),
        ]
    }
}

#[test]
fn test_embedded_prefixes_concatenate() {
    let app = compile(&mut Embedding::default()).unwrap();
    let flags = &app.root().flags;

    assert_eq!(
        flag_names(flags),
        vec!["db-host", "db-max-conns", "db-tls-cert-file", "internal"]
    );
    assert_eq!(flags[0].env.as_deref(), Some("APP_DB_HOST"));
    assert_eq!(flags[2].env.as_deref(), Some("APP_DB_TLS_CERT"));
    assert_eq!(flags[1].env.as_deref(), Some("APP_DB_"));
    assert_eq!(flags[3].env, None);
    assert_eq!(flags[2].value.target.to_string(), "database.tls.cert_file");
}

#[derive(Debug, Default)]
struct Pool {
    host: String,
    port: u16,
}

impl Schema for Pool {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("host", Tag::new().with_env("HOST"), &mut self.host),
            Field::value("port", Tag::new(), &mut self.port),
        ]
    }
}

#[derive(Debug, Default)]
struct PoolCli {
    pool: Pool,
}

impl Schema for PoolCli {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure(
            "pool",
            Tag::new().as_embedded().with_env_prefix("DB_"),
            &mut self.pool,
        )]
    }
}

#[test]
fn test_env_prefix_applies_without_env_name() {
    let app = compile(&mut PoolCli::default()).unwrap();
    let flags = &app.root().flags;

    assert_eq!(flags[0].env.as_deref(), Some("DB_HOST"));
    assert_eq!(flags[1].env.as_deref(), Some("DB_"));
}

// ---------------------------------------------------------------------------
// Flag and command attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Maintenance {
    force: bool,
}

impl Schema for Maintenance {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("force", Tag::new(), &mut self.force)]
    }
}

#[derive(Debug, Default)]
struct Attributes {
    output: String,
    json: bool,
    yaml: bool,
    token: String,
    exec: String,
    since: String,
    maintenance: Maintenance,
}

impl Schema for Attributes {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value(
                "output",
                Tag::new()
                    .with_placeholder("FILE")
                    .with_enum(["text", "json"])
                    .with_default("text")
                    .with_help("Output format"),
                &mut self.output,
            ),
            Field::value("json", Tag::new().with_xor("format"), &mut self.json),
            Field::value("yaml", Tag::new().with_xor("format"), &mut self.yaml),
            Field::value("token", Tag::new().as_required().as_hidden(), &mut self.token),
            Field::value("exec", Tag::new().as_passthrough(), &mut self.exec),
            Field::value("since", Tag::new().with_format("%Y-%m-%d"), &mut self.since),
            Field::structure(
                "maintenance",
                Tag::new().as_command().as_hidden().with_group("admin"),
                &mut self.maintenance,
            ),
        ]
    }
}

#[test]
fn test_flag_and_command_attributes_are_kept() {
    let app = Compiler::new()
        .with_group(Group::new("admin", "Administration"))
        .compile(&mut Attributes::default())
        .unwrap();
    let flags = &app.root().flags;
    assert_eq!(
        flag_names(flags),
        vec!["output", "json", "yaml", "token", "exec", "since"]
    );

    let output = &flags[0];
    assert_eq!(output.placeholder, "FILE");
    assert_eq!(output.form_placeholder(), "FILE");
    assert_eq!(output.value.enum_values, vec!["text", "json"]);
    assert_eq!(output.value.default.as_deref(), Some("text"));
    assert_eq!(output.value.help, "Output format");
    assert!(!output.value.required);
    assert!(!output.hidden);

    assert_eq!(flags[1].xor, vec!["format"]);
    assert_eq!(flags[2].xor, vec!["format"]);

    let token = &flags[3];
    assert!(token.value.required);
    assert!(token.hidden);

    assert!(flags[4].value.passthrough);
    assert!(!flags[0].value.passthrough);
    assert_eq!(flags[5].value.format.as_deref(), Some("%Y-%m-%d"));
    assert_eq!(flags[0].value.format, None);

    let maintenance = app.node(app.find_path(&["maintenance"]).unwrap());
    assert!(maintenance.hidden);
    assert_eq!(maintenance.group, Some(Group::new("admin", "Administration")));
    assert!(maintenance.flags.iter().all(|flag| !flag.hidden));
}

#[test]
fn test_embedded_groups_inherit_unless_declared() {
    let app = Compiler::new()
        .with_group(Group::new("storage", "Storage options"))
        .compile(&mut Embedding::default())
        .unwrap();
    let flags = &app.root().flags;

    assert_eq!(flags[0].group, Some(Group::new("storage", "Storage options")));
    assert_eq!(flags[1].group, Some(Group::new("tuning", "tuning")));
    assert_eq!(flags[3].group, None);
}

#[test]
fn test_ignored_and_excluded_fields_are_absent() {
    let app = Compiler::new()
        .ignore_field(r"^Embedding\.internal$")
        .unwrap()
        .compile(&mut Embedding::default())
        .unwrap();

    let names = flag_names(&app.root().flags);
    assert!(!names.contains(&"secret"));
    assert!(!names.contains(&"internal"));
    let json = app.outline().to_json_pretty().unwrap();
    assert!(!json.contains("secret"));
}

#[derive(Debug, Default)]
struct Renamed {
    dry_run: bool,
    listen: String,
}

impl Schema for Renamed {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("dry_run", Tag::new(), &mut self.dry_run),
            Field::value("listen", Tag::new().with_name("bind"), &mut self.listen),
        ]
    }
}

#[test]
fn test_flag_names_from_identifiers_and_tags() {
    let app = compile(&mut Renamed::default()).unwrap();
    assert_eq!(flag_names(&app.root().flags), vec!["dry-run", "bind"]);
    assert!(app.root().flags[0].value.is_bool());
}

// ---------------------------------------------------------------------------
// Optional, dynamic and plugin structures
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Metrics {
    metrics_addr: String,
}

impl Schema for Metrics {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("metrics_addr", Tag::new(), &mut self.metrics_addr)]
    }
}

struct Extensible {
    serve: Option<Box<Serve>>,
    backend: Box<dyn Schema>,
    plugins: Plugins,
}

impl Default for Extensible {
    fn default() -> Self {
        let mut plugins = Plugins::new();
        plugins.push(Metrics::default());
        Self {
            serve: None,
            backend: Box::new(Build::default()),
            plugins,
        }
    }
}

impl Schema for Extensible {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::optional("serve", Tag::new().as_command(), &mut self.serve),
            Field::dynamic("backend", Tag::new().as_embedded(), &mut self.backend),
            Field::plugins("plugins", Tag::new(), &mut self.plugins).anonymous(),
        ]
    }
}

#[test]
fn test_optional_command_is_instantiated() {
    let mut cli = Extensible::default();
    assert!(cli.serve.is_none());

    let app = compile(&mut cli).unwrap();
    assert!(cli.serve.is_some());
    assert!(app.find_path(&["serve"]).is_some());
}

#[test]
fn test_dynamic_and_plugin_fields_join_the_root() {
    let app = compile(&mut Extensible::default()).unwrap();
    let flags = &app.root().flags;

    assert_eq!(flag_names(flags), vec!["port", "metrics-addr"]);
    assert_eq!(flags[0].value.target.to_string(), "backend.port");
    assert_eq!(flags[1].value.target.to_string(), "plugins.0.metrics_addr");
}

struct DynamicCommand {
    backend: Box<dyn Schema>,
}

impl Schema for DynamicCommand {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::dynamic("backend", Tag::new().as_command(), &mut self.backend)]
    }
}

#[test]
fn test_dynamic_command_needs_a_mapper() {
    let mut cli = DynamicCommand {
        backend: Box::new(Build::default()),
    };
    let err = compile(&mut cli).unwrap_err();
    assert!(matches!(
        err,
        BuildError::UnsupportedType { at, type_name }
            if at == Location::field("DynamicCommand", "backend") && type_name.contains("Box<dyn ")
    ));
}

#[derive(Debug)]
struct BackendMapper;

impl Mapper for BackendMapper {
    fn decode(&self, raw: &str) -> Result<AnyValue, MapperError> {
        Ok(AnyValue::new(raw.to_string()))
    }
}

#[test]
fn test_dynamic_field_uses_mapper_for_boxed_schema() {
    let mut compiler = Compiler::new();
    compiler.registry_mut().register::<Box<dyn Schema>>(BackendMapper);
    let mut cli = DynamicCommand {
        backend: Box::new(Build::default()),
    };

    let app = compiler.compile(&mut cli).unwrap();
    let backend = &app.root().flags[0].value;
    assert_eq!(backend.name, "backend");
    assert!(backend.type_name.contains("Box<dyn "));
    assert!(matches!(
        backend.default_value.downcast_ref::<Option<Box<dyn Schema>>>(),
        Some(None)
    ));
}

// ---------------------------------------------------------------------------
// Mappers
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SecondsMapper;

impl Mapper for SecondsMapper {
    fn decode(&self, raw: &str) -> Result<AnyValue, MapperError> {
        raw.parse::<u64>()
            .map(|secs| AnyValue::new(Duration::from_secs(secs)))
            .map_err(|err| MapperError::Invalid {
                type_name: "Duration",
                value: raw.to_string(),
                reason: err.to_string(),
            })
    }
}

#[derive(Debug, Default)]
struct Timeouts {
    timeout: Duration,
    log_dir: String,
}

impl Schema for Timeouts {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("timeout", Tag::new().with_default("30"), &mut self.timeout),
            Field::value("log_dir", Tag::new().with_type("path"), &mut self.log_dir),
        ]
    }
}

#[test]
fn test_unregistered_type_is_unsupported() {
    let err = compile(&mut Timeouts::default()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::UnsupportedType { at, type_name }
            if at == Location::field("Timeouts", "timeout") && type_name.ends_with("Duration")
    ));
}

#[test]
fn test_registered_mapper_and_type_hint() {
    let mut compiler = Compiler::new();
    compiler.registry_mut().register::<Duration>(SecondsMapper);
    let app = compiler.compile(&mut Timeouts::default()).unwrap();

    let timeout = &app.root().flags[0].value;
    assert_eq!(timeout.default.as_deref(), Some("30"));
    assert_eq!(timeout.default_value.downcast_ref::<Duration>(), Some(&Duration::ZERO));
    let decoded = timeout.mapper.decode("5").unwrap();
    assert_eq!(decoded.downcast_ref::<Duration>(), Some(&Duration::from_secs(5)));

    let log_dir = &app.root().flags[1].value;
    let decoded = log_dir.mapper.decode("/var/log").unwrap();
    assert_eq!(decoded.downcast_ref::<PathBuf>(), Some(&PathBuf::from("/var/log")));
}

#[derive(Debug, Default)]
struct Endpoint {
    host: String,
}

impl Schema for Endpoint {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::value("host", Tag::new(), &mut self.host)]
    }
}

#[derive(Debug)]
struct EndpointMapper;

impl Mapper for EndpointMapper {
    fn decode(&self, raw: &str) -> Result<AnyValue, MapperError> {
        Ok(AnyValue::new(raw.to_string()))
    }
}

#[derive(Debug, Default)]
struct Connect {
    endpoint: Endpoint,
}

impl Schema for Connect {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure("endpoint", Tag::new().as_argument(), &mut self.endpoint)]
    }
}

#[test]
fn test_structure_with_mapper_is_a_value() {
    let mut registry = Registry::with_builtins();
    registry.register::<Endpoint>(EndpointMapper);
    let app = Compiler::new()
        .with_registry(registry)
        .compile(&mut Connect::default())
        .unwrap();

    assert!(app.root().children.is_empty());
    assert_eq!(app.root().positional[0].name, "endpoint");
}

// ---------------------------------------------------------------------------
// Tags, vars and roots
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Contradictory {
    serve: Serve,
}

impl Schema for Contradictory {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure("serve", Tag::new().as_command().as_argument(), &mut self.serve)]
    }
}

#[test]
fn test_tag_errors_carry_location() {
    let err = compile(&mut Contradictory::default()).unwrap_err();
    assert_eq!(
        err,
        BuildError::Tag {
            at: Location::field("Contradictory", "serve"),
            source: TagError::CommandAndArgument,
        }
    );
    assert_eq!(
        err.to_string(),
        "Contradictory.serve: field can't be both a command and an argument"
    );
}

#[derive(Debug, Default)]
struct Versioned {
    serve: Serve,
}

impl Schema for Versioned {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::structure(
            "serve",
            Tag::new().as_command().with_var("version", "2").with_var("scope", "serve"),
            &mut self.serve,
        )]
    }
}

#[test]
fn test_vars_overlay_from_root_down() {
    let app = Compiler::new()
        .with_var("version", "1")
        .with_var("name", "app")
        .compile(&mut Versioned::default())
        .unwrap();

    assert_eq!(app.vars(app.root_id()).get("version"), Some("1"));
    let serve = app.vars(app.find_path(&["serve"]).unwrap());
    assert_eq!(serve.get("version"), Some("2"));
    assert_eq!(serve.get("name"), Some("app"));
    assert_eq!(serve.get("scope"), Some("serve"));
}

#[test]
fn test_compile_field_accepts_structures_only() {
    let compiler = Compiler::new();

    let mut port = 0u16;
    let err = compiler
        .compile_field(Field::value("port", Tag::new(), &mut port))
        .unwrap_err();
    assert_eq!(err, BuildError::InvalidRoot { type_name: "u16" });

    let mut absent: Option<Box<Serve>> = None;
    let err = compiler
        .compile_field(Field::optional("serve", Tag::new(), &mut absent))
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidRoot { .. }));

    let mut present = Some(Box::new(Serve::default()));
    let app = compiler
        .compile_field(Field::optional("serve", Tag::new(), &mut present))
        .unwrap();
    assert_eq!(flag_names(&app.root().flags), vec!["port"]);

    let mut serve = Serve::default();
    let app = compiler
        .compile_field(Field::structure("serve", Tag::new(), &mut serve))
        .unwrap();
    assert_eq!(
        app.root().detail.as_deref(),
        Some("Starts the HTTP server in the foreground.")
    );
}

#[test]
fn test_application_name_and_help() {
    let app = Compiler::new()
        .with_name("app")
        .with_help("Demo application")
        .compile(&mut Siblings::default())
        .unwrap();

    assert_eq!(app.root().name, "app");
    assert_eq!(app.root().help, "Demo application");
    assert_eq!(app.full_path(app.find_path(&["serve"]).unwrap()), "app serve");
    let mut leaves: Vec<&str> = app.leaves().into_iter().map(|id| app.node(id).name.as_str()).collect();
    leaves.sort_unstable();
    assert_eq!(leaves, vec!["build", "serve"]);
}
