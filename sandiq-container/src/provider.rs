//! Provider trait: a module of related registrations.
//!
//! Providers group definitions and type declarations that belong together,
//! similar to a service provider in other containers.
//!
//! # Examples
//! ```rust
//! use sandiq_container::prelude::*;
//! use sandiq_container::provider::ProviderRegistry;
//!
//! struct MailProvider;
//!
//! impl Provider for MailProvider {
//!     fn register(&self, registry: &mut dyn ProviderRegistry) {
//!         registry.define("mail.sender".into(), Definition::value("noreply@example.com"));
//!         registry.define("mail.retries".into(), Definition::value(3));
//!     }
//! }
//!
//! let mut container = Container::builder().add_provider(&MailProvider).build();
//! assert_eq!(container.get_value::<i64>("mail.retries").unwrap(), 3);
//! ```

use crate::catalog::TypeDescriptor;
use crate::key::Identifier;
use crate::registry::Definition;

/// A module that registers related services.
///
/// Split registrations by concern instead of one giant block:
///
/// ```rust,ignore
/// let container = Container::builder()
///     .add_provider(&DatabaseProvider)
///     .add_provider(&MailProvider)
///     .build();
/// ```
pub trait Provider {
    /// Register definitions and types.
    ///
    /// Called once per `add_provider`.
    fn register(&self, registry: &mut dyn ProviderRegistry);

    /// Optional: human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Interface that providers register through.
///
/// Implemented by both the builder and a live container, so the same
/// provider can be applied before or after `build()`.
pub trait ProviderRegistry {
    /// Insert or replace a definition.
    fn define(&mut self, id: Identifier, definition: Definition);

    /// Add a type to the catalog.
    fn declare(&mut self, descriptor: TypeDescriptor);

    /// Bind an abstract identifier to a concrete type name.
    fn bind(&mut self, abstract_id: Identifier, concrete: Identifier) {
        self.define(abstract_id, Definition::Type(concrete));
    }
}
