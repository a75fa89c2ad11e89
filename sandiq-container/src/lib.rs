//! Core container implementation for Sandiq DI.

pub mod catalog;
pub mod container;
pub mod error;
mod graph;
pub mod key;
pub mod provider;
pub mod registry;
pub mod settings;
pub mod value;

pub use catalog::{Arguments, Autowire, Discovered, Parameter, TypeCatalog, TypeDescriptor};
pub use container::{Container, ContainerBuilder, SharedContainer, prelude};
pub use error::{Result, SandiqError};
pub use key::Identifier;
pub use provider::{Provider, ProviderRegistry};
pub use registry::Definition;
pub use settings::Settings;
pub use value::{FromValue, Object, Value};

#[doc(hidden)]
pub use inventory;
