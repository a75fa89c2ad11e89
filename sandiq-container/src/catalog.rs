//! Type catalog: explicit constructor declarations.
//!
//! Rust has no runtime reflection over constructors, so every type the
//! container may autowire is described up front by a [`TypeDescriptor`]:
//! its ordered constructor [`Parameter`]s and a function that builds it from
//! the assembled [`Arguments`].
//!
//! Descriptors come from three places:
//! - [`Autowire`] impls, hand-written or generated by `#[derive(Autowire)]`
//! - [`TypeDescriptor::concrete`] for types you do not own
//! - [`TypeCatalog::discovered`], which collects every derived type
//!
//! # Examples
//! ```
//! use sandiq_container::catalog::{Arguments, Autowire, Parameter, TypeCatalog};
//! use sandiq_container::key::Identifier;
//! use sandiq_container::Result;
//! use std::sync::Arc;
//!
//! struct Transport;
//!
//! impl Autowire for Transport {
//!     fn construct(_: &mut Arguments) -> Result<Self> {
//!         Ok(Transport)
//!     }
//! }
//!
//! struct Mailer {
//!     transport: Arc<Transport>,
//!     retries: u32,
//! }
//!
//! impl Autowire for Mailer {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![
//!             Parameter::service::<Transport>("transport"),
//!             Parameter::scalar("retries").with_default(3),
//!         ]
//!     }
//!
//!     fn construct(args: &mut Arguments) -> Result<Self> {
//!         Ok(Mailer {
//!             transport: args.object()?,
//!             retries: args.value()?,
//!         })
//!     }
//! }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<Transport>().register::<Mailer>();
//! assert!(catalog.is_constructible(Identifier::of::<Mailer>().as_str()));
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{Result, SandiqError};
use crate::key::Identifier;
use crate::value::{FromValue, Object, Value};

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: &'static str,
    service: Option<Identifier>,
    default: Option<Value>,
}

impl Parameter {
    /// A parameter whose argument is the service registered under
    /// `Identifier::of::<T>()`, passed to the constructor as `Arc<T>`.
    pub fn service<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            name,
            service: Some(Identifier::of::<T>()),
            default: None,
        }
    }

    /// A parameter whose argument is the service registered under `id`.
    pub fn service_id(name: &'static str, id: impl Into<Identifier>) -> Self {
        Self {
            name,
            service: Some(id.into()),
            default: None,
        }
    }

    /// A parameter with no service type; it needs a default.
    pub fn scalar(name: &'static str) -> Self {
        Self {
            name,
            service: None,
            default: None,
        }
    }

    /// Sets the default value. Falsy values (`0`, `""`, `false`, null)
    /// are ordinary defaults.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identifier of the declared service type, if any.
    pub fn service_type(&self) -> Option<&Identifier> {
        self.service.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Ordered constructor arguments, consumed front to back.
#[derive(Debug)]
pub struct Arguments {
    owner: Identifier,
    values: std::vec::IntoIter<(&'static str, Value)>,
}

impl Arguments {
    pub fn new(owner: impl Into<Identifier>, values: Vec<(&'static str, Value)>) -> Self {
        Self {
            owner: owner.into(),
            values: values.into_iter(),
        }
    }

    /// Type being constructed.
    pub fn owner(&self) -> &Identifier {
        &self.owner
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Takes the next argument as is.
    pub fn next_value(&mut self) -> Result<(&'static str, Value)> {
        self.values.next().ok_or_else(|| SandiqError::TypeMismatch {
            id: self.owner.clone(),
            expected: "another constructor argument",
            found: "end of arguments".to_string(),
        })
    }

    /// Takes the next argument as a shared service handle.
    pub fn object<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let (name, value) = self.next_value()?;
        value.downcast::<T>().ok_or_else(|| self.mismatch(name, type_name::<Arc<T>>(), &value))
    }

    /// Takes the next argument as a plain value.
    pub fn value<T: FromValue>(&mut self) -> Result<T> {
        let (name, value) = self.next_value()?;
        let found = value.describe();
        T::from_value(value).ok_or_else(|| SandiqError::TypeMismatch {
            id: self.parameter_id(name),
            expected: type_name::<T>(),
            found,
        })
    }

    fn mismatch(&self, name: &str, expected: &'static str, value: &Value) -> SandiqError {
        SandiqError::TypeMismatch {
            id: self.parameter_id(name),
            expected,
            found: value.describe(),
        }
    }

    fn parameter_id(&self, name: &str) -> Identifier {
        Identifier::from(format!("{}::{name}", self.owner))
    }
}

/// A type the container can construct.
///
/// Usually derived with `#[derive(Autowire)]`. Implement it by hand to
/// declare constructor parameters explicitly:
/// `parameters` lists them in order and `construct` consumes the resolved
/// arguments in that same order.
pub trait Autowire: Send + Sync + Sized + 'static {
    /// Constructor parameters. None by default.
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    fn construct(args: &mut Arguments) -> Result<Self>;
}

pub(crate) type ConstructFn = Arc<dyn Fn(&mut Arguments) -> Result<Object> + Send + Sync>;

type ViewFn = Arc<dyn Fn(&Object) -> Option<Object> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Shape {
    Concrete {
        parameters: Vec<Parameter>,
        construct: ConstructFn,
    },
    Abstract,
}

/// Catalog entry for one type name.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Identifier,
    pub(crate) shape: Shape,
}

impl TypeDescriptor {
    /// Descriptor of an [`Autowire`] type, named `Identifier::of::<T>()`.
    pub fn of<T: Autowire>() -> Self {
        Self {
            name: Identifier::of::<T>(),
            shape: Shape::Concrete {
                parameters: T::parameters(),
                construct: Arc::new(|args: &mut Arguments| {
                    T::construct(args).map(|v| Object::new(Arc::new(v)))
                }),
            },
        }
    }

    /// Descriptor built from an explicit parameter list and constructor.
    pub fn concrete(
        name: impl Into<Identifier>,
        parameters: Vec<Parameter>,
        construct: impl Fn(&mut Arguments) -> Result<Object> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Concrete {
                parameters,
                construct: Arc::new(construct),
            },
        }
    }

    /// Descriptor of a trait or other type that cannot be instantiated.
    pub fn abstract_type(name: impl Into<Identifier>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Abstract,
        }
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.shape, Shape::Abstract)
    }

    /// Constructor parameters; empty for abstract types.
    pub fn parameters(&self) -> &[Parameter] {
        match &self.shape {
            Shape::Concrete { parameters, .. } => parameters,
            Shape::Abstract => &[],
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("abstract", &self.is_abstract())
            .field("parameters", &self.parameters())
            .finish()
    }
}

/// Link-time registration of a derived type.
///
/// `#[derive(Autowire)]` submits one of these per type; they are only read
/// by [`TypeCatalog::discovered`].
pub struct Discovered {
    register: fn(&mut TypeCatalog),
}

impl Discovered {
    pub const fn new(register: fn(&mut TypeCatalog)) -> Self {
        Self { register }
    }
}

inventory::collect!(Discovered);

static DISCOVERED: Lazy<TypeCatalog> = Lazy::new(|| {
    let mut catalog = TypeCatalog::new();
    for entry in inventory::iter::<Discovered> {
        (entry.register)(&mut catalog);
    }
    debug!(types = catalog.len(), "Discovered autowire types");
    catalog
});

/// Known constructible and abstract types, by identifier.
#[derive(Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<Identifier, TypeDescriptor>,
    // (concrete, abstract) -> concrete handle seen as the abstract handle
    views: HashMap<(Identifier, Identifier), ViewFn>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every type that derives `Autowire` in the final binary.
    pub fn discovered() -> Self {
        DISCOVERED.clone()
    }

    /// Adds an [`Autowire`] type.
    pub fn register<T: Autowire>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor::of::<T>())
    }

    /// Declares `T` (usually `dyn Trait`) abstract.
    pub fn register_abstract<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor::abstract_type(Identifier::of::<T>()))
    }

    /// Lets a constructed `C` stand in for the abstract `A`.
    ///
    /// When `A`'s identifier is bound to `C`'s type name, the constructed
    /// `Arc<C>` goes through `cast` before it is cached, so dependents
    /// declaring `Arc<A>` receive it.
    ///
    /// ```
    /// use sandiq_container::catalog::TypeCatalog;
    /// use std::sync::Arc;
    ///
    /// trait Logger: Send + Sync {}
    /// struct ConsoleLogger;
    /// impl Logger for ConsoleLogger {}
    ///
    /// let mut catalog = TypeCatalog::new();
    /// catalog
    ///     .register_abstract::<dyn Logger>()
    ///     .implement::<dyn Logger, ConsoleLogger>(|c| c as Arc<dyn Logger>);
    /// ```
    pub fn implement<A, C>(
        &mut self,
        cast: impl Fn(Arc<C>) -> Arc<A> + Send + Sync + 'static,
    ) -> &mut Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Send + Sync + 'static,
    {
        let key = (Identifier::of::<C>(), Identifier::of::<A>());
        debug!(concrete = %key.0, abstract_type = %key.1, "Registered view");
        self.views.insert(
            key,
            Arc::new(move |object: &Object| object.downcast::<C>().map(|c| Object::new(cast(c)))),
        );
        self
    }

    /// Adds or replaces a descriptor.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        debug!(
            type_name = %descriptor.name,
            is_abstract = descriptor.is_abstract(),
            "Registered type"
        );
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Merges another catalog in; entries of `other` win.
    pub fn extend(&mut self, other: TypeCatalog) -> &mut Self {
        self.types.extend(other.types);
        self.views.extend(other.views);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Whether `name` is known at all, abstract or not.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn is_constructible(&self, name: &str) -> bool {
        self.get(name).is_some_and(|d| !d.is_abstract())
    }

    pub fn is_abstract(&self, name: &str) -> bool {
        self.get(name).is_some_and(TypeDescriptor::is_abstract)
    }

    /// Converts `object` (built as `concrete`) for use under `target`.
    ///
    /// Returns the object unchanged when no view applies.
    pub fn view(&self, concrete: &str, target: &str, object: Object) -> Object {
        if concrete == target {
            return object;
        }
        let key = (Identifier::new(concrete.to_string()), Identifier::new(target.to_string()));
        match self.views.get(&key).and_then(|view| view(&object)) {
            Some(viewed) => viewed,
            None => object,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &Identifier> {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("types", &self.types.len())
            .field("views", &self.views.len())
            .finish()
    }
}
