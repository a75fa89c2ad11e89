//! Service identifiers.
//!
//! An [`Identifier`] is the string key a definition is registered under.
//! Any string is legal; autowiring uses the canonical identifier of a Rust
//! type, produced by [`Identifier::of`].

use std::any::type_name;
use std::borrow::{Borrow, Cow};
use std::fmt;

use sandiq_support::rendering::shorten_type_name;

/// Opaque string key of a service.
///
/// # Examples
/// ```
/// use sandiq_container::key::Identifier;
///
/// // Plain identifier
/// let id = Identifier::from("database.url");
/// assert_eq!(id.as_str(), "database.url");
///
/// // Type identifier
/// let id = Identifier::of::<String>();
/// assert_eq!(id.as_str(), "alloc::string::String");
/// assert_eq!(id.short_name(), "String");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Cow<'static, str>);

impl Identifier {
    /// Creates an identifier from any string.
    #[inline]
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// The identifier autowiring uses for type `T`.
    ///
    /// Works for unsized types too, so `Identifier::of::<dyn Logger>()`
    /// names the trait a binding is registered under. The value is the
    /// compiler's [`type_name`], stable within one build.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(type_name::<T>()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier without module paths, for display.
    pub fn short_name(&self) -> String {
        shorten_type_name(&self.0)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Identifier {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl From<&String> for Identifier {
    fn from(id: &String) -> Self {
        Self(Cow::Owned(id.clone()))
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({:?})", self.as_str())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
