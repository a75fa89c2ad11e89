//! Definition registry: what is registered under each identifier.
//!
//! The registry maps an [`Identifier`] to a [`Definition`]: a literal or
//! instance returned as is, a factory invoked with the container, or the
//! name of a type to autowire.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::container::Container;
use crate::error::Result;
use crate::key::Identifier;
use crate::value::{Object, Value};

/// Factory function of a [`Definition::Factory`].
///
/// Receives the container itself so it can resolve other identifiers.
///
/// # Why `Arc` and not `Box`?
/// The factory is cloned out of the registry before it runs, because it
/// needs `&mut Container` while the registry lives inside that container.
pub type FactoryFn = Arc<dyn Fn(&mut Container) -> Result<Value> + Send + Sync>;

/// A registered definition.
#[derive(Clone)]
pub enum Definition {
    /// A literal or an already built instance, returned verbatim.
    Value(Value),
    /// Invoked with the container on first resolve.
    Factory(FactoryFn),
    /// Name of a catalogued type, autowired on first resolve.
    Type(Identifier),
}

impl Definition {
    /// A literal: scalar, list, map or null.
    pub fn value(value: impl Into<Value>) -> Self {
        Definition::Value(value.into())
    }

    /// An already built instance. Resolving it returns this very handle.
    pub fn instance<T: ?Sized + Send + Sync + 'static>(handle: Arc<T>) -> Self {
        Definition::Value(Value::Object(Object::new(handle)))
    }

    pub fn factory(
        factory: impl Fn(&mut Container) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Definition::Factory(Arc::new(factory))
    }

    /// A type name to autowire.
    pub fn type_name(name: impl Into<Identifier>) -> Self {
        Definition::Type(name.into())
    }

    /// The type name of `T`, to autowire.
    pub fn of_type<T: ?Sized + 'static>() -> Self {
        Definition::Type(Identifier::of::<T>())
    }

    /// Short description, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Value(Value::Object(_)) => "instance",
            Definition::Value(_) => "literal",
            Definition::Factory(_) => "factory",
            Definition::Type(_) => "type",
        }
    }
}

impl From<Value> for Definition {
    fn from(value: Value) -> Self {
        Definition::Value(value)
    }
}

impl From<Object> for Definition {
    fn from(object: Object) -> Self {
        Definition::Value(Value::Object(object))
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Definition::Factory(_) => f.write_str("Factory(..)"),
            Definition::Type(name) => f.debug_tuple("Type").field(name).finish(),
        }
    }
}

/// Stores all definitions of a container.
#[derive(Debug, Default, Clone)]
pub(crate) struct Registry {
    definitions: HashMap<Identifier, Definition>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the definition of `id`.
    ///
    /// Returns the replaced definition, if any.
    pub fn register(&mut self, id: Identifier, definition: Definition) -> Option<Definition> {
        debug!(id = %id, kind = definition.kind(), "Registered definition");
        self.definitions.insert(id, definition)
    }

    pub fn get(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn registered_ids(&self) -> impl Iterator<Item = &Identifier> {
        self.definitions.keys()
    }
}
