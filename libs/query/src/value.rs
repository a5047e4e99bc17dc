//! Literal values carried by predicates and function arguments.

use crate::geo::{Distance, GeoBox, Point};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Literal value
///
/// `Null` is representable on purpose: a null predicate value is omitted from
/// the rendered query, a null function argument is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    DateTime(DateTime<Utc>),
    Point(Point),
    Distance(Distance),
    Box(GeoBox),
    /// Application type rendered through the conversion service.
    #[serde(skip)]
    Custom(CustomValue),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn custom<T>(value: T) -> Self
    where
        T: Any + fmt::Display + Send + Sync,
    {
        Self::Custom(CustomValue::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::DateTime(_) => "datetime",
            Self::Point(_) => "point",
            Self::Distance(_) => "distance",
            Self::Box(_) => "box",
            Self::Custom(c) => c.type_name(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Point> for Value {
    fn from(value: Point) -> Self {
        Self::Point(value)
    }
}

impl From<Distance> for Value {
    fn from(value: Distance) -> Self {
        Self::Distance(value)
    }
}

impl From<GeoBox> for Value {
    fn from(value: GeoBox) -> Self {
        Self::Box(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Type-erased application value.
///
/// Keeps the concrete `TypeId` so a converter registered for that type can
/// be looked up; falls back to the type's `Display` output.
#[derive(Clone)]
pub struct CustomValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    display: fn(&(dyn Any + Send + Sync)) -> String,
}

fn display_as<T: Any + fmt::Display>(value: &(dyn Any + Send + Sync)) -> String {
    value
        .downcast_ref::<T>()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl CustomValue {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Display + Send + Sync,
    {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            display: display_as::<T>,
        }
    }

    pub fn value_type_id(&self) -> TypeId {
        Any::type_id(&*self.inner)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&(self.display)(&*self.inner))
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValue")
            .field("type", &self.type_name)
            .field("value", &self.to_string())
            .finish()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
