//! Schema reflection.
//!
//! Rust has no runtime field introspection, so structures that describe a
//! command line implement [`Schema`] by hand: [`Schema::fields`] lists the
//! declared fields in order, each with its annotation and a mutable
//! [`Slot`] into the structure. The compiler walks these lists recursively.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::{Field, Schema, Tag};
//!
//! #[derive(Debug, Default)]
//! struct Serve {
//!     port: u16,
//!     verbose: bool,
//! }
//!
//! impl Schema for Serve {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::value("port", Tag::new().with_short('p'), &mut self.port),
//!             Field::value("verbose", Tag::new(), &mut self.verbose),
//!         ]
//!     }
//! }
//!
//! let mut serve = Serve::default();
//! assert_eq!(serve.type_name(), "Serve");
//! let names: Vec<_> = serve.fields().iter().map(|f| f.info.name).collect();
//! assert_eq!(names, vec!["port", "verbose"]);
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use crate::Tag;
use crate::mapper::AnyValue;

/// A structure that declares command-line fields.
pub trait Schema: Send + Sync + 'static {
    /// Lists the declared fields in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;

    /// Long-form description shown as the detail text of commands built
    /// from this structure.
    fn detail(&self) -> Option<String> {
        None
    }

    /// Short type name, without module path.
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Concrete type id of the implementing structure.
    fn schema_type_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// An absent-able nested structure.
///
/// Command and embedded fields stored this way are instantiated on demand
/// so they can be populated by the parser.
pub trait OptionalSchema: Send + Sync {
    fn is_present(&self) -> bool;

    /// Returns the nested structure, creating a default one if absent.
    fn ensure_present(&mut self) -> &mut dyn Schema;
}

impl<T: Schema + Default> OptionalSchema for Option<Box<T>> {
    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn ensure_present(&mut self) -> &mut dyn Schema {
        self.get_or_insert_with(Box::default).as_mut()
    }
}

/// Dynamically attached structures, each flattened as if embedded where the
/// collection is declared.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Field, Plugins, Schema, Tag};
///
/// #[derive(Debug, Default)]
/// struct Metrics {
///     metrics_addr: String,
/// }
///
/// impl Schema for Metrics {
///     fn fields(&mut self) -> Vec<Field<'_>> {
///         vec![Field::value("metrics_addr", Tag::new(), &mut self.metrics_addr)]
///     }
/// }
///
/// let mut plugins = Plugins::new();
/// plugins.push(Metrics::default());
/// assert_eq!(plugins.len(), 1);
/// ```
#[derive(Default)]
pub struct Plugins(Vec<Box<dyn Schema>>);

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a structure.
    pub fn push(&mut self, plugin: impl Schema) {
        self.0.push(Box::new(plugin));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Schema + 'static)> {
        self.0.iter().map(|plugin| plugin.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Schema + 'static)> {
        self.0.iter_mut().map(|plugin| plugin.as_mut())
    }
}

impl fmt::Debug for Plugins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|p| p.type_name()))
            .finish()
    }
}

/// Mutable access to a declared field's storage.
pub enum Slot<'a> {
    /// A scalar value, decoded by a mapper.
    Value(&'a mut dyn Any),
    /// A nested structure.
    Struct(&'a mut dyn Schema),
    /// A nested structure that may be absent.
    Optional(&'a mut dyn OptionalSchema),
    /// A structure behind a trait object.
    Dynamic(&'a mut Box<dyn Schema>),
    /// A plugin collection.
    Plugins(&'a mut Plugins),
}

impl fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(_) => f.write_str("Value"),
            Slot::Struct(s) => write!(f, "Struct({})", s.type_name()),
            Slot::Optional(o) => write!(f, "Optional(present: {})", o.is_present()),
            Slot::Dynamic(d) => write!(f, "Dynamic({})", d.type_name()),
            Slot::Plugins(p) => write!(f, "Plugins({})", p.len()),
        }
    }
}

/// Static description of a declared field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field identifier.
    pub name: &'static str,
    /// Declared type, as reported by [`std::any::type_name`].
    pub type_name: &'static str,
    pub type_id: TypeId,
    /// Flattened into the owner regardless of annotation.
    pub anonymous: bool,
    /// Declared annotation, before resolution.
    pub annotation: Tag,
    /// Constructs the default value of the declared type.
    pub zero: fn() -> AnyValue,
}

/// A declared field: its description plus mutable access to its storage.
#[derive(Debug)]
pub struct Field<'a> {
    pub info: FieldInfo,
    pub slot: Slot<'a>,
}

impl<'a> Field<'a> {
    fn new<T>(name: &'static str, annotation: Tag, slot: Slot<'a>) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::typed::<T>(name, annotation, AnyValue::zero_of::<T>, slot)
    }

    /// Declares storage of type `T` whose pristine default comes from `zero`.
    fn typed<T: 'static>(
        name: &'static str,
        annotation: Tag,
        zero: fn() -> AnyValue,
        slot: Slot<'a>,
    ) -> Self {
        Self {
            info: FieldInfo {
                name: name.strip_prefix("r#").unwrap_or(name),
                type_name: std::any::type_name::<T>(),
                type_id: TypeId::of::<T>(),
                anonymous: false,
                annotation,
                zero,
            },
            slot,
        }
    }

    /// A scalar field (flag or positional value).
    pub fn value<T>(name: &'static str, annotation: Tag, target: &'a mut T) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::new::<T>(name, annotation, Slot::Value(target))
    }

    /// A nested structure (command, argument branch or embedded fields).
    pub fn structure<T>(name: &'static str, annotation: Tag, target: &'a mut T) -> Self
    where
        T: Schema + Default,
    {
        Self::new::<T>(name, annotation, Slot::Struct(target))
    }

    /// A boxed nested structure that may be absent.
    pub fn optional<T>(name: &'static str, annotation: Tag, target: &'a mut Option<Box<T>>) -> Self
    where
        T: Schema + Default,
    {
        Self::new::<Option<Box<T>>>(name, annotation, Slot::Optional(target))
    }

    /// A structure behind a trait object.
    ///
    /// The field is declared as `Box<dyn Schema>`; it has no `Default`, so
    /// its pristine default is an absent `Option<Box<dyn Schema>>`.
    pub fn dynamic(name: &'static str, annotation: Tag, target: &'a mut Box<dyn Schema>) -> Self {
        Self::typed::<Box<dyn Schema>>(name, annotation, absent_dynamic, Slot::Dynamic(target))
    }

    /// A plugin collection.
    pub fn plugins(name: &'static str, annotation: Tag, target: &'a mut Plugins) -> Self {
        Self::new::<Plugins>(name, annotation, Slot::Plugins(target))
    }

    /// Flattens the field into its owner even without an embed marker.
    pub fn anonymous(mut self) -> Self {
        self.info.anonymous = true;
        self
    }
}

fn absent_dynamic() -> AnyValue {
    AnyValue::new(Option::<Box<dyn Schema>>::None)
}

/// Strips module paths from a type name: `app::cli::Serve<u8>` → `Serve`.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
