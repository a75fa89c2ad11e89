//! Values produced by resolution.
//!
//! A [`Value`] is either a literal (scalar, list, map, null) or an
//! [`Object`]: a type-erased, shared handle to a constructed service.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased shared handle to a service.
///
/// Wraps an `Arc<T>` for any `T: ?Sized`, so trait objects are stored as
/// `Arc<dyn Trait>` and handed back as such. Clones share the handle, and
/// two objects are equal only when they are the same handle.
///
/// # Examples
/// ```
/// use sandiq_container::value::Object;
/// use std::sync::Arc;
///
/// let object = Object::new(Arc::new(String::from("smtp")));
/// let same = object.clone();
///
/// assert!(object.ptr_eq(&same));
/// assert_eq!(object.downcast::<String>().unwrap().as_str(), "smtp");
/// assert!(object.downcast::<i32>().is_none());
/// ```
#[derive(Clone)]
pub struct Object {
    handle: Arc<dyn Any + Send + Sync>,
    // data address of the wrapped `Arc<T>`, shared by every clone of it
    address: usize,
    type_name: &'static str,
}

impl Object {
    pub fn new<T: ?Sized + Send + Sync + 'static>(handle: Arc<T>) -> Self {
        Self {
            address: Arc::as_ptr(&handle) as *const () as usize,
            handle: Arc::new(handle),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the `Arc<T>` inside, if this object holds one.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        (*self.handle).downcast_ref::<Arc<T>>().cloned()
    }

    pub fn is<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        (*self.handle).is::<Arc<T>>()
    }

    /// Name of the type behind the handle.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Reference identity of the service: true when both objects wrap the
    /// same allocation, whichever `Arc` clone or trait-object view they hold.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        self.address == other.address
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.type_name)
    }
}

/// A resolved value.
///
/// Literals compare by value, objects by identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Object),
}

impl Value {
    /// Wraps a shared handle as an object value.
    pub fn object<T: ?Sized + Send + Sync + 'static>(handle: Arc<T>) -> Self {
        Value::Object(Object::new(handle))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the `Arc<T>` held by an object value.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.as_object().and_then(Object::downcast::<T>)
    }

    /// Same value: identity for objects, equality for literals.
    pub fn same(&self, other: &Value) -> bool {
        self == other
    }

    /// Short description of the variant, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Object(object) => format!("object {}", object.type_name()),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! int_into_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

int_into_value!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_into_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            /// Falls back to `Float` above `i64::MAX`.
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(n) => Value::Int(n),
                    Err(_) => Value::Float(v as f64),
                }
            }
        })*
    };
}

wide_int_into_value!(u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(v: BTreeMap<String, T>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

/// Conversion out of a [`Value`].
///
/// Used by typed getters and by generated constructors for scalar
/// parameters. Returns `None` when the value has the wrong shape.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

macro_rules! int_from_value {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(n) => <$t>::try_from(n).ok(),
                    _ => None,
                }
            }
        })*
    };
}

int_from_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            Value::Int(n) => Some(n as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for Object {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}
