//! Transferable object state
//!
//! When an implementation is swapped, the old backing object exports its
//! state as an [`ObjectState`] and the new one imports it. Field types opt in
//! through [`StateValue`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicU32, AtomicU64, Ordering};

use crate::value::Value;

/// Named state fields exported by a backing object
#[derive(Debug, Clone)]
pub struct ObjectState {
    type_name: &'static str,
    fields: BTreeMap<String, Value>,
}

impl ObjectState {
    /// Create an empty state for the given source type
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: BTreeMap::new(),
        }
    }

    /// Type that exported this state
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Trait for field types that can be carried across a swap
///
/// Implement this for custom field types used with `#[reload(state)]`.
pub trait StateValue: Sized {
    /// Export the current value
    fn to_value(&self) -> Value;

    /// Rebuild from an exported value, `None` if the value has the wrong shape
    fn from_value(value: &Value) -> Option<Self>;
}

impl StateValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

macro_rules! int_state_value {
    ($($ty:ty),*) => {
        $(
            impl StateValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_int().and_then(|i| <$ty>::try_from(i).ok())
                }
            }
        )*
    };
}

int_state_value!(i8, i16, i32, i64, u8, u16, u32);

// Values past i64::MAX capture as null and fail to restore.
macro_rules! wide_int_state_value {
    ($($ty:ty),*) => {
        $(
            impl StateValue for $ty {
                fn to_value(&self) -> Value {
                    i64::try_from(*self).map_or(Value::Null, Value::Int)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_int().and_then(|i| <$ty>::try_from(i).ok())
                }
            }
        )*
    };
}

wide_int_state_value!(u64, usize);

impl StateValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float().map(|f| f as f32)
    }
}

impl StateValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl StateValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl<T: StateValue> StateValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map(T::to_value).unwrap_or(Value::Null)
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: StateValue> StateValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl<T: StateValue> StateValue for parking_lot::Mutex<T> {
    fn to_value(&self) -> Value {
        self.lock().to_value()
    }

    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(parking_lot::Mutex::new)
    }
}

impl<T: StateValue> StateValue for parking_lot::RwLock<T> {
    fn to_value(&self) -> Value {
        self.read().to_value()
    }

    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(parking_lot::RwLock::new)
    }
}

macro_rules! atomic_state_value {
    ($($atomic:ty => $inner:ty),*) => {
        $(
            impl StateValue for $atomic {
                fn to_value(&self) -> Value {
                    self.load(Ordering::SeqCst).to_value()
                }

                fn from_value(value: &Value) -> Option<Self> {
                    <$inner>::from_value(value).map(<$atomic>::new)
                }
            }
        )*
    };
}

atomic_state_value!(
    AtomicBool => bool,
    AtomicI32 => i32,
    AtomicI64 => i64,
    AtomicU32 => u32,
    AtomicU64 => u64
);
