//! # The Container: heart of Sandiq
//!
//! Maps identifiers to definitions, resolves them on demand and caches
//! every resolved value (singleton semantics) until the identifier is
//! registered again.
//!
//! # Resolution
//! ```text
//! get(id) ── cached? ──yes──> cached value
//!               │ no
//!               ▼
//!        definition of id?
//!     ┌─────────┼──────────────┬──────────────┐
//!  Factory     Type(name)    Value         none
//!  f(&mut c)   autowire      as is     id in catalog?
//!                                       yes: autowire(id)
//!                                       no:  NotFound
//! ```
//!
//! Autowiring asks the [`TypeCatalog`] for the constructor parameters of a
//! type, resolves every service parameter through [`Container::get`]
//! (so bindings are honoured and sub-dependencies are shared), falls back to
//! declared defaults for scalar parameters, then calls the constructor.
//!
//! # Examples
//! ```rust
//! use sandiq_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Article {
//!     id: i64,
//!     title: String,
//! }
//!
//! let mut container = Container::new();
//! container.set("id", Definition::value(100));
//! container.set("title", Definition::value("Title of article"));
//! container.set("article", Definition::factory(|c| {
//!     Ok(Value::object(Arc::new(Article {
//!         id: c.get_value("id")?,
//!         title: c.get_value("title")?,
//!     })))
//! }));
//!
//! let article: Arc<Article> = container.get_as("article").unwrap();
//! assert_eq!(article.id, 100);
//! assert_eq!(article.title, "Title of article");
//!
//! // Same instance on every call
//! let again: Arc<Article> = container.get_as("article").unwrap();
//! assert!(Arc::ptr_eq(&article, &again));
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use sandiq_support::rendering::suggest_similar;
use tracing::{debug, info, instrument, trace};

use crate::catalog::{Arguments, Autowire, Shape, TypeCatalog, TypeDescriptor};
use crate::error::{
    NotFoundError, ResolutionError, ResolutionReason, Result, SandiqError, UninstantiableError,
};
use crate::graph::ResolutionPath;
use crate::key::Identifier;
use crate::provider::{Provider, ProviderRegistry};
use crate::registry::{Definition, Registry};
use crate::settings::Settings;
use crate::value::{FromValue, Object, Value};

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with its definitions, catalog and settings.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .settings(settings)
///     .discover()
///     .register_abstract::<dyn Logger>()
///     .set(Identifier::of::<dyn Logger>(), Definition::of_type::<ConsoleLogger>())
///     .add_provider(&MailProvider)
///     .build();
/// ```
pub struct ContainerBuilder {
    registry: Registry,
    catalog: TypeCatalog,
    settings: Settings,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            catalog: TypeCatalog::new(),
            settings: Settings::default(),
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Longest resolution path allowed.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.settings.max_depth = max_depth;
        self
    }

    /// Merges `catalog` into the builder's catalog.
    pub fn catalog(mut self, catalog: TypeCatalog) -> Self {
        self.catalog.extend(catalog);
        self
    }

    /// Adds every type deriving `Autowire` in this binary.
    pub fn discover(mut self) -> Self {
        self.catalog.extend(TypeCatalog::discovered());
        self
    }

    pub fn register_type<T: Autowire>(mut self) -> Self {
        self.catalog.register::<T>();
        self
    }

    pub fn register_abstract<T: ?Sized + 'static>(mut self) -> Self {
        self.catalog.register_abstract::<T>();
        self
    }

    /// See [`TypeCatalog::implement`].
    pub fn implement<A, C>(mut self, cast: impl Fn(Arc<C>) -> Arc<A> + Send + Sync + 'static) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Send + Sync + 'static,
    {
        self.catalog.implement::<A, C>(cast);
        self
    }

    /// Registers a definition, replacing any previous one.
    pub fn set(mut self, id: impl Into<Identifier>, definition: impl Into<Definition>) -> Self {
        self.registry.register(id.into(), definition.into());
        self
    }

    /// Add a [`Provider`] module.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Applying provider");
        provider.register(&mut self);
        self
    }

    /// Build the container.
    ///
    /// Definitions are not validated here; every check happens on `get`.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Container {
        info!(
            definitions = self.registry.len(),
            types = self.catalog.len(),
            "Building container"
        );

        Container {
            registry: self.registry,
            resolved: HashMap::new(),
            catalog: self.catalog,
            path: ResolutionPath::new(self.settings.max_depth),
            settings: self.settings,
        }
    }
}

impl ProviderRegistry for ContainerBuilder {
    fn define(&mut self, id: Identifier, definition: Definition) {
        self.registry.register(id, definition);
    }

    fn declare(&mut self, descriptor: TypeDescriptor) {
        self.catalog.insert(descriptor);
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Dependency injection container with singleton caching.
///
/// Every operation takes `&mut self`: resolving fills the cache. Share it
/// between threads as a [`SharedContainer`].
pub struct Container {
    registry: Registry,
    resolved: HashMap<Identifier, Value>,
    catalog: TypeCatalog,
    path: ResolutionPath,
    settings: Settings,
}

/// A container behind a mutex, for callers on several threads.
pub type SharedContainer = Arc<Mutex<Container>>;

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// An empty container with an empty catalog.
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// An empty container autowiring the types of `catalog`.
    pub fn with_catalog(catalog: TypeCatalog) -> Self {
        ContainerBuilder::new().catalog(catalog).build()
    }

    // ── Registration ──

    /// Registers `definition` under `id`, replacing any previous one.
    ///
    /// A cached resolution of `id` is dropped, so the next `get` sees the
    /// new definition. Nothing is validated until then.
    pub fn set(&mut self, id: impl Into<Identifier>, definition: impl Into<Definition>) {
        let id = id.into();
        if self.resolved.remove(id.as_str()).is_some() {
            debug!(id = %id, "Invalidated cached resolution");
        }
        self.registry.register(id, definition.into());
    }

    /// Same as [`set`](Self::set).
    pub fn bind(&mut self, id: impl Into<Identifier>, definition: impl Into<Definition>) {
        self.set(id, definition);
    }

    /// Adds an [`Autowire`] type to the catalog.
    pub fn register_type<T: Autowire>(&mut self) -> &mut Self {
        self.catalog.register::<T>();
        self
    }

    /// Applies a [`Provider`] to this container.
    pub fn add_provider(&mut self, provider: &dyn Provider) -> &mut Self {
        debug!(provider = provider.name(), "Applying provider");
        provider.register(self);
        self
    }

    // ── Queries ──

    /// True iff a definition is registered under `id`.
    ///
    /// Types that are only in the catalog do not count, nor does the cache.
    pub fn has(&self, id: impl AsRef<str>) -> bool {
        self.registry.contains(id.as_ref())
    }

    /// True iff `id` has a cached resolution.
    pub fn is_resolved(&self, id: impl AsRef<str>) -> bool {
        self.resolved.contains_key(id.as_ref())
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TypeCatalog {
        &mut self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Resolution ──

    /// Returns the value of `id`, resolving and caching it on first use.
    ///
    /// # Errors
    /// - [`SandiqError::NotFound`]: nothing registered and not a known type
    /// - [`SandiqError::Resolution`]: a constructor argument could not be
    ///   supplied, or the named type is unknown or failed to construct
    /// - [`SandiqError::Uninstantiable`]: an abstract type has no binding
    /// - [`SandiqError::CircularDependency`] / [`SandiqError::DepthExceeded`]
    ///
    /// A failed resolution caches nothing.
    pub fn get(&mut self, id: impl AsRef<str>) -> Result<Value> {
        let id = id.as_ref();

        if let Some(value) = self.resolved.get(id) {
            trace!(id, "Resolved from cache");
            return Ok(value.clone());
        }

        trace!(id, depth = self.path.depth(), "Resolving");
        let value = self.resolve_id(id)?;
        self.resolved.insert(Identifier::new(id.to_string()), value.clone());
        Ok(value)
    }

    /// Builds a fresh instance of a catalogued type, bypassing the cache.
    ///
    /// Service parameters are still obtained through [`get`](Self::get),
    /// so sub-dependencies stay shared.
    ///
    /// # Errors
    /// [`SandiqError::Resolution`] when `type_name` is not a known type,
    /// plus everything autowiring can raise.
    pub fn make(&mut self, type_name: impl AsRef<str>) -> Result<Value> {
        let name = type_name.as_ref();
        trace!(type_name = name, "Making fresh instance");

        self.path.enter(name)?;
        let result = self.autowire(name).map(Value::Object);
        self.path.leave();
        result
    }

    /// [`get`](Self::get), then the `Arc<T>` held by the object.
    pub fn get_as<T: ?Sized + Send + Sync + 'static>(&mut self, id: impl AsRef<str>) -> Result<Arc<T>> {
        let id = id.as_ref();
        let value = self.get(id)?;
        value.downcast::<T>().ok_or_else(|| SandiqError::TypeMismatch {
            id: Identifier::new(id.to_string()),
            expected: type_name::<Arc<T>>(),
            found: value.describe(),
        })
    }

    /// [`get`](Self::get), then convert the value.
    pub fn get_value<T: FromValue>(&mut self, id: impl AsRef<str>) -> Result<T> {
        let id = id.as_ref();
        let value = self.get(id)?;
        let found = value.describe();
        T::from_value(value).ok_or_else(|| SandiqError::TypeMismatch {
            id: Identifier::new(id.to_string()),
            expected: type_name::<T>(),
            found,
        })
    }

    /// Resolves the service registered under `T`'s own type identifier.
    ///
    /// ```rust,ignore
    /// let mailer: Arc<Mailer> = container.resolve()?;
    /// let logger: Arc<dyn Logger> = container.resolve()?;
    /// ```
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        self.get_as::<T>(Identifier::of::<T>())
    }

    /// Wraps the container for use from several threads.
    pub fn into_shared(self) -> SharedContainer {
        Arc::new(Mutex::new(self))
    }

    // ── Internal ──

    fn resolve_id(&mut self, id: &str) -> Result<Value> {
        self.path.enter(id)?;
        let result = self.resolve_definition(id);
        self.path.leave();
        result
    }

    fn resolve_definition(&mut self, id: &str) -> Result<Value> {
        match self.registry.get(id).cloned() {
            Some(Definition::Factory(factory)) => {
                debug!(id, "Invoking factory");
                factory(self)
            }
            Some(Definition::Type(name)) => {
                let object = self.autowire(name.as_str())?;
                Ok(Value::Object(self.catalog.view(name.as_str(), id, object)))
            }
            Some(Definition::Value(value)) => Ok(value),
            None if self.catalog.contains(id) => self.autowire(id).map(Value::Object),
            None => Err(self.not_found(id)),
        }
    }

    fn autowire(&mut self, name: &str) -> Result<Object> {
        let Some(descriptor) = self.catalog.get(name).cloned() else {
            return Err(self.resolution_error(name, ResolutionReason::UnknownType, None));
        };

        let type_name = descriptor.name().clone();
        let (parameters, construct) = match descriptor.shape {
            Shape::Concrete {
                parameters,
                construct,
            } => (parameters, construct),
            Shape::Abstract => {
                return Err(SandiqError::Uninstantiable(UninstantiableError {
                    type_name,
                    chain: self.path.chain(),
                }));
            }
        };

        let mut arguments = Vec::with_capacity(parameters.len());
        for parameter in &parameters {
            let value = match (parameter.service_type(), parameter.default_value()) {
                (Some(service), _) => self.get(service.as_str())?,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(self.resolution_error(
                        name,
                        ResolutionReason::MissingDefault {
                            parameter: parameter.name(),
                        },
                        None,
                    ));
                }
            };
            arguments.push((parameter.name(), value));
        }

        debug!(type_name = name, arguments = arguments.len(), "Constructing");
        let mut arguments = Arguments::new(type_name, arguments);
        construct(&mut arguments).map_err(|source| {
            self.resolution_error(name, ResolutionReason::ConstructionFailed, Some(source))
        })
    }

    fn resolution_error(
        &self,
        name: &str,
        reason: ResolutionReason,
        source: Option<SandiqError>,
    ) -> SandiqError {
        SandiqError::Resolution(ResolutionError {
            service: Identifier::new(name.to_string()),
            reason,
            chain: self.path.chain(),
            source: source.map(Box::new),
        })
    }

    fn not_found(&self, id: &str) -> SandiqError {
        let known: Vec<&str> = self
            .registry
            .registered_ids()
            .chain(self.catalog.names())
            .map(Identifier::as_str)
            .collect();

        SandiqError::NotFound(NotFoundError {
            requested: Identifier::new(id.to_string()),
            suggestions: suggest_similar(id, &known, self.settings.max_suggestions),
        })
    }
}

impl ProviderRegistry for Container {
    fn define(&mut self, id: Identifier, definition: Definition) {
        self.set(id, definition);
    }

    fn declare(&mut self, descriptor: TypeDescriptor) {
        self.catalog.insert(descriptor);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.registry.len())
            .field("resolved", &self.resolved.len())
            .field("types", &self.catalog.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, SharedContainer};
    pub use crate::catalog::{Arguments, Autowire, Parameter, TypeCatalog, TypeDescriptor};
    pub use crate::error::{Result, SandiqError};
    pub use crate::key::Identifier;
    pub use crate::provider::Provider;
    pub use crate::registry::Definition;
    pub use crate::settings::Settings;
    pub use crate::value::{FromValue, Object, Value};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Parameter;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicU32, Ordering};

    // === Fixtures ===

    #[derive(Debug, PartialEq)]
    struct SimpleClass;

    impl SimpleClass {
        fn get_string_test(&self, text: &str) -> String {
            text.to_string()
        }
    }

    impl Autowire for SimpleClass {
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(SimpleClass)
        }
    }

    #[derive(Debug)]
    struct WithPrimitives {
        simple_class: Arc<SimpleClass>,
        array: Vec<i64>,
        string: String,
        number: i64,
        null: Option<String>,
    }

    impl Autowire for WithPrimitives {
        fn parameters() -> Vec<Parameter> {
            vec![
                Parameter::service::<SimpleClass>("simple_class"),
                Parameter::scalar("array").with_default(vec![1, 2, 3]),
                Parameter::scalar("string").with_default("public string"),
                Parameter::scalar("number").with_default(100),
                Parameter::scalar("null").with_default(()),
            ]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(WithPrimitives {
                simple_class: args.object()?,
                array: args.value()?,
                string: args.value()?,
                number: args.value()?,
                null: args.value()?,
            })
        }
    }

    struct WithConstructor {
        deps: Arc<WithPrimitives>,
    }

    impl Autowire for WithConstructor {
        fn parameters() -> Vec<Parameter> {
            vec![Parameter::service::<WithPrimitives>("deps")]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(WithConstructor {
                deps: args.object()?,
            })
        }
    }

    #[allow(dead_code)]
    struct MissingDefault {
        simple_class: Arc<SimpleClass>,
        string: String,
        array: Vec<i64>,
    }

    impl Autowire for MissingDefault {
        fn parameters() -> Vec<Parameter> {
            vec![
                Parameter::service::<SimpleClass>("simple_class"),
                Parameter::scalar("string"),
                Parameter::scalar("array").with_default(vec![1, 2, 3]),
            ]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(MissingDefault {
                simple_class: args.object()?,
                string: args.value()?,
                array: args.value()?,
            })
        }
    }

    struct Invocable {
        simple_class: Arc<SimpleClass>,
    }

    impl Invocable {
        fn call(&self) -> String {
            self.simple_class
                .get_string_test("Function is called from ClassInvocable")
        }
    }

    impl Autowire for Invocable {
        fn parameters() -> Vec<Parameter> {
            vec![Parameter::service::<SimpleClass>("simple_class")]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(Invocable {
                simple_class: args.object()?,
            })
        }
    }

    trait Repository: Send + Sync {
        fn name(&self) -> &'static str;
    }

    trait Notifier: Send + Sync {
        fn notify(&self) -> &'static str;
    }

    struct SqlRepository;

    impl Repository for SqlRepository {
        fn name(&self) -> &'static str {
            "sql"
        }
    }

    impl Autowire for SqlRepository {
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(SqlRepository)
        }
    }

    struct MailNotifier;

    impl Notifier for MailNotifier {
        fn notify(&self) -> &'static str {
            "mail"
        }
    }

    struct ParentClass;

    impl Autowire for ParentClass {
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(ParentClass)
        }
    }

    #[allow(dead_code)]
    struct WithSupertypes {
        parent: Arc<ParentClass>,
        repository: Arc<dyn Repository>,
        notifier: Arc<dyn Notifier>,
    }

    impl Autowire for WithSupertypes {
        fn parameters() -> Vec<Parameter> {
            vec![
                Parameter::service::<ParentClass>("parent"),
                Parameter::service::<dyn Repository>("repository"),
                Parameter::service::<dyn Notifier>("notifier"),
            ]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(WithSupertypes {
                parent: args.object()?,
                repository: args.object()?,
                notifier: args.object()?,
            })
        }
    }

    struct Article {
        id: i64,
        title: Mutex<String>,
    }

    fn container() -> Container {
        Container::builder()
            .register_type::<SimpleClass>()
            .register_type::<WithPrimitives>()
            .register_type::<WithConstructor>()
            .register_type::<MissingDefault>()
            .register_type::<Invocable>()
            .register_type::<ParentClass>()
            .register_type::<SqlRepository>()
            .register_type::<WithSupertypes>()
            .register_abstract::<dyn Repository>()
            .register_abstract::<dyn Notifier>()
            .implement::<dyn Repository, SqlRepository>(|c| c as Arc<dyn Repository>)
            .build()
    }

    // === Literals and instances ===

    #[test]
    fn get_primitives() {
        let mut c = container();

        let values = vec![
            Value::from(1),
            Value::from("5"),
            Value::from("string"),
            Value::from(vec!["array"]),
            Value::from(false),
            Value::Null,
        ];

        for value in values {
            c.set("service", value.clone());
            assert_eq!(c.get("service").unwrap(), value);
            assert_eq!(c.get("service").unwrap(), value);
        }
    }

    #[test]
    fn falsy_values_are_cached_too() {
        let mut c = container();
        c.set("zero", Definition::value(0));
        c.set("nothing", Definition::value(()));

        assert_eq!(c.get("zero").unwrap(), Value::Int(0));
        assert_eq!(c.get("nothing").unwrap(), Value::Null);
        assert!(c.is_resolved("zero"));
        assert!(c.is_resolved("nothing"));
    }

    #[test]
    fn get_object_instance_keeps_identity() {
        let mut c = container();
        let instance = Arc::new(SimpleClass);
        c.set("service", Definition::instance(instance.clone()));

        let resolved: Arc<SimpleClass> = c.get_as("service").unwrap();
        assert!(Arc::ptr_eq(&instance, &resolved));
    }

    #[test]
    fn one_instance_under_two_ids_is_equal() {
        let mut c = container();
        let instance = Arc::new(SimpleClass);
        c.set("a", Definition::instance(instance.clone()));
        c.set("b", Definition::instance(instance.clone()));

        let a = c.get("a").unwrap();
        let b = c.get("b").unwrap();
        assert_eq!(a, b);
        assert!(a.same(&Value::object(instance)));
    }

    #[test]
    fn set_invalidates_cached_resolution() {
        let mut c = container();
        c.set("service", Definition::value("v1"));
        assert_eq!(c.get_value::<String>("service").unwrap(), "v1");

        c.set("service", Definition::value("v2"));
        assert!(!c.is_resolved("service"));
        assert_eq!(c.get_value::<String>("service").unwrap(), "v2");
    }

    #[test]
    fn bind_is_set() {
        let mut c = container();
        c.bind("service", Definition::value(1));
        assert!(c.has("service"));
        assert_eq!(c.get("service").unwrap(), Value::Int(1));
    }

    // === Factories ===

    #[test]
    fn get_callback() {
        let mut c = container();
        c.set(
            "service",
            Definition::factory(|_| Ok(Value::object(Arc::new(SimpleClass)))),
        );

        let resolved: Arc<SimpleClass> = c.get_as("service").unwrap();
        assert_eq!(*resolved, SimpleClass);
    }

    #[test]
    fn factory_receives_container() {
        let mut c = container();
        c.set("id", Definition::value(100));
        c.set("title", Definition::value("Title of article"));
        c.set(
            "service",
            Definition::factory(|c| {
                Ok(Value::object(Arc::new(Article {
                    id: c.get_value("id")?,
                    title: Mutex::new(c.get_value("title")?),
                })))
            }),
        );

        let article: Arc<Article> = c.get_as("service").unwrap();
        assert_eq!(article.id, 100);
        assert_eq!(*article.title.lock(), "Title of article");
    }

    #[test]
    fn factory_called_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut c = container();
        c.set("service", {
            let counter = counter.clone();
            Definition::factory(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::object(Arc::new(SimpleClass)))
            })
        });

        let a: Arc<SimpleClass> = c.get_as("service").unwrap();
        let b: Arc<SimpleClass> = c.get_as("service").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn changing_singleton_property_is_observed() {
        let mut c = container();
        c.set(
            "service",
            Definition::factory(|_| {
                Ok(Value::object(Arc::new(Article {
                    id: 1,
                    title: Mutex::new("first title".into()),
                })))
            }),
        );

        let article: Arc<Article> = c.get_as("service").unwrap();
        *article.title.lock() = "changed title".into();

        let again: Arc<Article> = c.get_as("service").unwrap();
        assert_eq!(*again.title.lock(), "changed title");
    }

    #[test]
    fn failing_factory_caches_nothing() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut c = container();
        c.set("flaky", {
            let calls = calls.clone();
            Definition::factory(move |_| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(SandiqError::construction("flaky", "not yet"))
                } else {
                    Ok(Value::from("ready"))
                }
            })
        });

        assert!(c.get("flaky").is_err());
        assert!(!c.is_resolved("flaky"));
        assert_eq!(c.get_value::<String>("flaky").unwrap(), "ready");
    }

    // === Autowiring ===

    #[test]
    fn object_from_type_name() {
        let mut c = container();
        c.set("service", Definition::of_type::<SimpleClass>());
        assert_eq!(*c.get_as::<SimpleClass>("service").unwrap(), SimpleClass);

        c.set("service2", Definition::type_name(type_name::<SimpleClass>()));
        assert_eq!(*c.get_as::<SimpleClass>("service2").unwrap(), SimpleClass);
    }

    #[test]
    fn create_not_bound_service() {
        let mut c = container();
        assert!(!c.has(Identifier::of::<SimpleClass>()));
        assert!(c.resolve::<SimpleClass>().is_ok());
        assert!(!c.has(Identifier::of::<SimpleClass>()));
    }

    #[test]
    fn singleton_for_not_bound() {
        let mut c = container();
        let a = c.resolve::<SimpleClass>().unwrap();
        let b = c.resolve::<SimpleClass>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn autowiring_uses_defaults() {
        let mut c = container();
        let obj = c.resolve::<WithPrimitives>().unwrap();

        assert_eq!(obj.array, vec![1, 2, 3]);
        assert_eq!(obj.string, "public string");
        assert_eq!(obj.number, 100);
        assert_eq!(obj.null, None);
    }

    struct Falsy {
        zero: i64,
        empty: String,
        off: bool,
        nothing: Option<i64>,
    }

    impl Autowire for Falsy {
        fn parameters() -> Vec<Parameter> {
            vec![
                Parameter::scalar("zero").with_default(0),
                Parameter::scalar("empty").with_default(""),
                Parameter::scalar("off").with_default(false),
                Parameter::scalar("nothing").with_default(()),
            ]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(Falsy {
                zero: args.value()?,
                empty: args.value()?,
                off: args.value()?,
                nothing: args.value()?,
            })
        }
    }

    #[test]
    fn falsy_defaults_are_used() {
        let mut c = container();
        c.register_type::<Falsy>();

        let obj = c.resolve::<Falsy>().unwrap();
        assert_eq!(obj.zero, 0);
        assert_eq!(obj.empty, "");
        assert!(!obj.off);
        assert_eq!(obj.nothing, None);
    }

    #[test]
    fn autowiring_depth() {
        let mut c = container();
        let obj = c.resolve::<WithConstructor>().unwrap();

        assert_eq!(obj.deps.number, 100);
        assert!(c.is_resolved(Identifier::of::<WithPrimitives>()));
        assert!(c.is_resolved(Identifier::of::<SimpleClass>()));
    }

    #[test]
    fn singleton_for_resolved_child_dependencies() {
        let mut c = container();
        let obj = c.resolve::<WithConstructor>().unwrap();
        let simple = c.resolve::<SimpleClass>().unwrap();

        assert!(Arc::ptr_eq(&obj.deps.simple_class, &simple));
    }

    #[test]
    fn registered_binding_is_honoured_by_dependents() {
        let mut c = container();
        let shared = Arc::new(SimpleClass);
        c.set(Identifier::of::<SimpleClass>(), Definition::instance(shared.clone()));

        let obj = c.resolve::<Invocable>().unwrap();
        assert!(Arc::ptr_eq(&obj.simple_class, &shared));
    }

    #[test]
    fn autowiring_for_invocable() {
        let mut c = container();
        c.set(Identifier::of::<Invocable>(), Definition::of_type::<Invocable>());

        let obj = c.resolve::<Invocable>().unwrap();
        assert_eq!(obj.call(), "Function is called from ClassInvocable");
    }

    #[test]
    fn supertypes_resolved_through_bindings() {
        let mut c = container();
        c.set(
            Identifier::of::<dyn Repository>(),
            Definition::of_type::<SqlRepository>(),
        );
        c.set(
            Identifier::of::<dyn Notifier>(),
            Definition::factory(|_| Ok(Value::object(Arc::new(MailNotifier) as Arc<dyn Notifier>))),
        );

        let obj = c.resolve::<WithSupertypes>().unwrap();
        assert_eq!(obj.repository.name(), "sql");
        assert_eq!(obj.notifier.notify(), "mail");

        let repository = c.resolve::<dyn Repository>().unwrap();
        assert!(Arc::ptr_eq(&repository, &obj.repository));
    }

    #[test]
    fn error_for_not_bound_supertypes() {
        let mut c = container();

        match c.resolve::<WithSupertypes>() {
            Err(SandiqError::Uninstantiable(err)) => {
                assert_eq!(err.type_name, Identifier::of::<dyn Repository>());
                assert_eq!(err.chain.first(), Some(&Identifier::of::<WithSupertypes>()));
            }
            other => panic!("Expected Uninstantiable, got: {:?}", other.map(|_| ())),
        }
        assert!(!c.is_resolved(Identifier::of::<WithSupertypes>()));
    }

    // === Errors ===

    #[test]
    fn exception_not_found() {
        let mut c = container();
        match c.get("not-exist-service") {
            Err(SandiqError::NotFound(err)) => assert_eq!(err.requested, "not-exist-service"),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn not_found_suggests_similar_identifiers() {
        let mut c = container();
        c.set("mailer.transport", Definition::value("smtp"));

        match c.get("mailer") {
            Err(SandiqError::NotFound(err)) => {
                assert_eq!(err.suggestions, vec!["mailer.transport".to_string()]);
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn missing_default_is_a_resolution_error() {
        let mut c = container();

        match c.resolve::<MissingDefault>() {
            Err(SandiqError::Resolution(err)) => {
                assert_eq!(err.reason, ResolutionReason::MissingDefault { parameter: "string" });
                assert_eq!(err.service, Identifier::of::<MissingDefault>());
            }
            other => panic!("Expected Resolution, got: {:?}", other.map(|_| ())),
        }
        assert!(!c.is_resolved(Identifier::of::<MissingDefault>()));
    }

    #[test]
    fn unknown_type_name_is_a_resolution_error() {
        let mut c = container();
        c.set("service", Definition::type_name("app::DoesNotExist"));

        match c.get("service") {
            Err(SandiqError::Resolution(err)) => {
                assert_eq!(err.reason, ResolutionReason::UnknownType);
                assert_eq!(err.service, "app::DoesNotExist");
                assert_eq!(err.chain, vec![Identifier::from("service")]);
            }
            other => panic!("Expected Resolution, got: {other:?}"),
        }
    }

    #[test]
    fn constructor_failure_is_wrapped_with_source() {
        let mut c = container();
        c.catalog_mut().insert(TypeDescriptor::concrete(
            "app::Broken",
            vec![],
            |_| Err(SandiqError::construction("app::Broken", "disk full")),
        ));

        let err = c.get("app::Broken").unwrap_err();
        match &err {
            SandiqError::Resolution(inner) => {
                assert_eq!(inner.reason, ResolutionReason::ConstructionFailed);
            }
            other => panic!("Expected Resolution, got: {other:?}"),
        }
        assert!(err.source().unwrap().to_string().contains("disk full"));
    }

    #[test]
    fn typed_getter_mismatch() {
        let mut c = container();
        c.set("n", Definition::value(1));

        match c.get_as::<SimpleClass>("n") {
            Err(SandiqError::TypeMismatch { id, found, .. }) => {
                assert_eq!(id, "n");
                assert_eq!(found, "int");
            }
            other => panic!("Expected TypeMismatch, got: {:?}", other.map(|_| ())),
        }
    }

    // === Cycles ===

    struct Chicken;
    struct Egg;

    impl Autowire for Chicken {
        fn parameters() -> Vec<Parameter> {
            vec![Parameter::service::<Egg>("egg")]
        }

        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Chicken)
        }
    }

    impl Autowire for Egg {
        fn parameters() -> Vec<Parameter> {
            vec![Parameter::service::<Chicken>("chicken")]
        }

        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Egg)
        }
    }

    #[test]
    fn circular_dependency_detected_and_path_unwound() {
        let mut c = container();
        c.register_type::<Chicken>().register_type::<Egg>();

        match c.resolve::<Chicken>() {
            Err(SandiqError::CircularDependency(err)) => assert_eq!(err.chain.len(), 3),
            other => panic!("Expected CircularDependency, got: {:?}", other.map(|_| ())),
        }

        // the container is still usable
        assert!(c.resolve::<SimpleClass>().is_ok());
    }

    #[test]
    fn depth_limit_applies() {
        let mut c = Container::builder()
            .max_depth(2)
            .register_type::<SimpleClass>()
            .register_type::<WithPrimitives>()
            .register_type::<WithConstructor>()
            .build();

        assert!(matches!(
            c.resolve::<WithConstructor>(),
            Err(SandiqError::DepthExceeded { limit: 2, .. })
        ));
        assert!(c.resolve::<WithPrimitives>().is_ok());
    }

    // === make ===

    #[test]
    fn make_builds_fresh_instances() {
        let mut c = container();
        let name = Identifier::of::<WithPrimitives>();

        let a = c.make(&name).unwrap().downcast::<WithPrimitives>().unwrap();
        let b = c.make(&name).unwrap().downcast::<WithPrimitives>().unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.array, b.array);
        assert_eq!(a.string, b.string);
        assert!(Arc::ptr_eq(&a.simple_class, &b.simple_class));
        assert!(!c.is_resolved(&name));
    }

    #[test]
    fn make_of_non_type_is_a_resolution_error() {
        let mut c = container();
        let err = c.make("this-string-is-not-class").unwrap_err();
        assert!(err.is_resolution());
    }

    // === has / providers / sharing ===

    #[test]
    fn has() {
        let mut c = container();
        c.set("service", Definition::instance(Arc::new(SimpleClass)));

        assert!(c.has("service"));
        assert!(!c.has("not-exist"));
    }

    struct ArticleProvider;

    impl Provider for ArticleProvider {
        fn register(&self, registry: &mut dyn ProviderRegistry) {
            registry.define("id".into(), Definition::value(7));
            registry.declare(TypeDescriptor::of::<SimpleClass>());
        }
    }

    #[test]
    fn provider_on_builder_and_on_live_container() {
        let mut built = Container::builder().add_provider(&ArticleProvider).build();
        assert_eq!(built.get_value::<i64>("id").unwrap(), 7);
        assert!(built.resolve::<SimpleClass>().is_ok());

        let mut live = Container::new();
        live.set("id", Definition::value(1));
        assert_eq!(live.get_value::<i64>("id").unwrap(), 1);

        live.add_provider(&ArticleProvider);
        assert_eq!(live.get_value::<i64>("id").unwrap(), 7);
    }

    #[test]
    fn shared_container_across_threads() {
        let shared = container().into_shared();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.lock().resolve::<SimpleClass>().unwrap())
            })
            .collect();

        let resolved: Vec<Arc<SimpleClass>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let direct = shared.lock().resolve::<SimpleClass>().unwrap();
        assert!(resolved.iter().all(|s| Arc::ptr_eq(s, &direct)));
    }

    #[test]
    fn debug_display() {
        let mut c = Container::new();
        c.set("a", Definition::value(1));
        c.set("b", Definition::value(2));
        c.get("a").unwrap();

        let debug = format!("{c:?}");
        assert!(debug.contains("Container"));
        assert!(debug.contains("definitions: 2"));
        assert!(debug.contains("resolved: 1"));
    }
}
