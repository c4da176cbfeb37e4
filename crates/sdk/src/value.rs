//! Dynamic values passed to constructors and carried in object state
//!
//! A [`Value`] is what callers hand to the manager when creating an instance,
//! and what a backing object exports when its state is transferred. Every
//! non-null value has a runtime [`ArgType`]; constructors declare the
//! [`ParamType`] each argument slot accepts.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// An opaque object argument, compared by its concrete `TypeId`
#[derive(Clone)]
pub struct ObjectValue {
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl ObjectValue {
    /// Wrap any `'static` value
    pub fn new<U: Any + Send + Sync>(value: U) -> Self {
        Self {
            type_id: TypeId::of::<U>(),
            type_name: std::any::type_name::<U>(),
            value: Arc::new(value),
        }
    }

    /// Concrete type id of the wrapped value
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Concrete type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the wrapped value if it is a `U`
    pub fn downcast_ref<U: Any>(&self) -> Option<&U> {
        self.value.downcast_ref::<U>()
    }

    /// Share the wrapped value if it is a `U`
    pub fn downcast<U: Any + Send + Sync>(&self) -> Option<Arc<U>> {
        Arc::clone(&self.value).downcast::<U>().ok()
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object<{}>", self.type_name)
    }
}

/// A dynamically typed argument or state value
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value. Has no runtime type.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Object(ObjectValue),
}

impl Value {
    /// Wrap an arbitrary `'static` value as an object argument
    pub fn object<U: Any + Send + Sync>(value: U) -> Self {
        Value::Object(ObjectValue::new(value))
    }

    /// Runtime type of this value, or `None` for [`Value::Null`]
    pub fn arg_type(&self) -> Option<ArgType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ArgType::Bool),
            Value::Int(_) => Some(ArgType::Int),
            Value::Float(_) => Some(ArgType::Float),
            Value::Str(_) => Some(ArgType::Str),
            Value::List(_) => Some(ArgType::List),
            Value::Object(o) => Some(ArgType::Object {
                type_id: o.type_id(),
                name: o.type_name(),
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(values: Vec<V>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Runtime type of a non-null [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Bool,
    Int,
    Float,
    Str,
    List,
    Object { type_id: TypeId, name: &'static str },
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Bool => f.write_str("bool"),
            ArgType::Int => f.write_str("int"),
            ArgType::Float => f.write_str("float"),
            ArgType::Str => f.write_str("str"),
            ArgType::List => f.write_str("list"),
            ArgType::Object { name, .. } => f.write_str(name),
        }
    }
}

/// Declared type of a constructor parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Str,
    List,
    Object { type_id: TypeId, name: &'static str },
    /// Accepts any non-null value
    Any,
    /// Accepts `Null` as well as anything the inner type accepts
    Nullable(Box<ParamType>),
}

impl ParamType {
    /// Parameter accepting exactly objects of type `U`
    pub fn object<U: Any>() -> Self {
        ParamType::Object {
            type_id: TypeId::of::<U>(),
            name: std::any::type_name::<U>(),
        }
    }

    /// Wrap this parameter so it also accepts `Null`
    pub fn nullable(self) -> Self {
        match self {
            ParamType::Nullable(_) => self,
            other => ParamType::Nullable(Box::new(other)),
        }
    }

    /// Whether an argument of runtime type `arg` may be passed here.
    ///
    /// `None` stands for a null argument, which only a `Nullable` slot accepts.
    pub fn is_assignable_from(&self, arg: Option<&ArgType>) -> bool {
        let Some(arg) = arg else {
            return matches!(self, ParamType::Nullable(_));
        };

        match (self, arg) {
            (ParamType::Nullable(inner), _) => inner.is_assignable_from(Some(arg)),
            (ParamType::Any, _) => true,
            (ParamType::Bool, ArgType::Bool)
            | (ParamType::Int, ArgType::Int)
            | (ParamType::Float, ArgType::Float)
            | (ParamType::Str, ArgType::Str)
            | (ParamType::List, ArgType::List) => true,
            (ParamType::Object { type_id, .. }, ArgType::Object { type_id: arg_id, .. }) => {
                type_id == arg_id
            }
            _ => false,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => f.write_str("bool"),
            ParamType::Int => f.write_str("int"),
            ParamType::Float => f.write_str("float"),
            ParamType::Str => f.write_str("str"),
            ParamType::List => f.write_str("list"),
            ParamType::Object { name, .. } => f.write_str(name),
            ParamType::Any => f.write_str("any"),
            ParamType::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}
