//! Type conversion registry.
//!
//! A [`Mapper`] turns a raw command-line string into a typed value for a
//! field's storage. The [`Registry`] resolves mappers by explicit type hint
//! or by the declared type of a field. The compiler only asks whether a
//! mapper exists; decoding is driven later by the argument parser.
//!
//! # Examples
//!
//! ```
//! use std::any::TypeId;
//!
//! use command_tree_core::Registry;
//!
//! let registry = Registry::with_builtins();
//! let mapper = registry.for_type(TypeId::of::<u16>()).unwrap();
//!
//! let value = mapper.decode("8080").unwrap();
//! assert_eq!(value.downcast_ref::<u16>(), Some(&8080));
//! assert!(mapper.decode("http").is_err());
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// A type-erased, shareable value.
#[derive(Clone)]
pub struct AnyValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl AnyValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// The `Default` value of `T`.
    pub fn zero_of<T: Default + Send + Sync + 'static>() -> Self {
        Self::new(T::default())
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyValue<{}>", self.type_name)
    }
}

/// Value decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    /// The raw string can't be converted to the target type.
    #[error("expected {type_name} but got {value:?}: {reason}")]
    Invalid {
        type_name: &'static str,
        value: String,
        reason: String,
    },
}

/// Converts raw strings into typed values.
pub trait Mapper: fmt::Debug + Send + Sync {
    fn decode(&self, raw: &str) -> Result<AnyValue, MapperError>;

    /// Whether the value is a switch that takes no argument.
    fn is_bool(&self) -> bool {
        false
    }
}

/// Decodes any [`FromStr`] type.
pub struct FromStrMapper<T>(PhantomData<fn() -> T>);

impl<T> FromStrMapper<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromStrMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FromStrMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FromStrMapper<{}>", std::any::type_name::<T>())
    }
}

impl<T> Mapper for FromStrMapper<T>
where
    T: FromStr + Any + Send + Sync,
    T::Err: fmt::Display,
{
    fn decode(&self, raw: &str) -> Result<AnyValue, MapperError> {
        raw.parse::<T>()
            .map(AnyValue::new)
            .map_err(|err| MapperError::Invalid {
                type_name: std::any::type_name::<T>(),
                value: raw.to_string(),
                reason: err.to_string(),
            })
    }

    fn is_bool(&self) -> bool {
        TypeId::of::<T>() == TypeId::of::<bool>()
    }
}

/// Decodes a separator-delimited list of strings into `Vec<String>`.
#[derive(Debug, Clone, Copy)]
pub struct SeparatedMapper {
    pub separator: char,
}

impl Default for SeparatedMapper {
    fn default() -> Self {
        Self { separator: ',' }
    }
}

impl Mapper for SeparatedMapper {
    fn decode(&self, raw: &str) -> Result<AnyValue, MapperError> {
        let items: Vec<String> = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(self.separator).map(str::to_string).collect()
        };
        Ok(AnyValue::new(items))
    }
}

/// Mappers keyed by declared type and by explicit type hint.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: HashMap<TypeId, Arc<dyn Mapper>>,
    names: HashMap<String, Arc<dyn Mapper>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry covering strings, booleans, characters, numbers,
    /// paths and comma-separated string lists, plus the `path` type hint.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_from_str::<String>();
        registry.register_from_str::<bool>();
        registry.register_from_str::<char>();
        registry.register_from_str::<i8>();
        registry.register_from_str::<i16>();
        registry.register_from_str::<i32>();
        registry.register_from_str::<i64>();
        registry.register_from_str::<i128>();
        registry.register_from_str::<isize>();
        registry.register_from_str::<u8>();
        registry.register_from_str::<u16>();
        registry.register_from_str::<u32>();
        registry.register_from_str::<u64>();
        registry.register_from_str::<u128>();
        registry.register_from_str::<usize>();
        registry.register_from_str::<f32>();
        registry.register_from_str::<f64>();
        registry.register_from_str::<PathBuf>();
        registry.register::<Vec<String>>(SeparatedMapper::default());
        registry.register_named("path", FromStrMapper::<PathBuf>::new());
        registry
    }

    /// Registers `mapper` for fields declared with type `T`.
    pub fn register<T: Any>(&mut self, mapper: impl Mapper + 'static) -> &mut Self {
        self.types.insert(TypeId::of::<T>(), Arc::new(mapper));
        self
    }

    /// Registers a [`FromStrMapper`] for `T`.
    pub fn register_from_str<T>(&mut self) -> &mut Self
    where
        T: FromStr + Any + Send + Sync,
        T::Err: fmt::Display,
    {
        self.register::<T>(FromStrMapper::<T>::new())
    }

    /// Registers `mapper` under an explicit type hint.
    pub fn register_named(&mut self, name: &str, mapper: impl Mapper + 'static) -> &mut Self {
        self.names.insert(name.to_string(), Arc::new(mapper));
        self
    }

    /// Returns the mapper registered for a declared type.
    pub fn for_type(&self, type_id: TypeId) -> Option<Arc<dyn Mapper>> {
        self.types.get(&type_id).cloned()
    }

    /// Returns the mapper for an explicit type hint, falling back to the
    /// declared type when there is no hint or the hint is unknown.
    pub fn for_named_value(&self, hint: Option<&str>, type_id: TypeId) -> Option<Arc<dyn Mapper>> {
        hint.and_then(|name| self.names.get(name).cloned())
            .or_else(|| self.for_type(type_id))
    }
}
