//! # Sandiq: Dependency Injection Container for Rust
//!
//! A small container mapping identifiers to definitions (literals,
//! instances, factories or type names), resolving them on demand with
//! constructor autowiring and caching every resolved value.
//!
//! # Quick start
//! ```rust,ignore
//! use sandiq::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Autowire)]
//! struct Transport;
//!
//! #[derive(Autowire)]
//! struct Mailer {
//!     transport: Arc<Transport>,
//!     #[sandiq(default = 3)]
//!     retries: u32,
//! }
//!
//! let mut container = Container::builder().discover().build();
//! let mailer: Arc<Mailer> = container.resolve()?;
//! assert_eq!(mailer.retries, 3);
//! ```

pub use sandiq_container::*;
pub use sandiq_derive::*;
pub use sandiq_support::*;

/// Everything needed to register and resolve services, derive included.
pub mod prelude {
    pub use sandiq_container::prelude::*;
    pub use sandiq_derive::Autowire;
}
