//! Implementation class descriptors
//!
//! An [`ImplementClass`] describes one concrete type that can back instances of
//! the service interface `T`, together with its constructors in declaration
//! order. Constructors take their arguments as a slice of [`Value`]s.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use hermes_sdk::{Implements, ObjectValue, ParamType, Value};

use crate::error::ConstructionError;

/// Argument list handed to a constructor body
///
/// The accessors turn a shape mismatch into a [`ConstructionError`] so bodies
/// can use `?`.
#[derive(Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &'a [Value] {
        self.values
    }

    /// Raw value at `index`
    pub fn value(&self, index: usize) -> Result<&'a Value, ConstructionError> {
        self.values.get(index).ok_or(ConstructionError::BadArgument {
            index,
            expected: "a value",
            found: "nothing".into(),
        })
    }

    pub fn int(&self, index: usize) -> Result<i64, ConstructionError> {
        let value = self.value(index)?;
        value.as_int().ok_or_else(|| bad_argument(index, "int", value))
    }

    pub fn float(&self, index: usize) -> Result<f64, ConstructionError> {
        let value = self.value(index)?;
        value.as_float().ok_or_else(|| bad_argument(index, "float", value))
    }

    pub fn bool(&self, index: usize) -> Result<bool, ConstructionError> {
        let value = self.value(index)?;
        value.as_bool().ok_or_else(|| bad_argument(index, "bool", value))
    }

    pub fn str(&self, index: usize) -> Result<&'a str, ConstructionError> {
        let value = self.value(index)?;
        value.as_str().ok_or_else(|| bad_argument(index, "str", value))
    }

    pub fn list(&self, index: usize) -> Result<&'a [Value], ConstructionError> {
        let value = self.value(index)?;
        value.as_list().ok_or_else(|| bad_argument(index, "list", value))
    }

    /// Object argument of concrete type `U`
    pub fn object<U: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<U>, ConstructionError> {
        let value = self.value(index)?;
        value
            .as_object()
            .and_then(ObjectValue::downcast::<U>)
            .ok_or_else(|| bad_argument(index, std::any::type_name::<U>(), value))
    }

    /// `true` if the argument at `index` is `Null`
    pub fn is_null(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(Value::is_null)
    }
}

fn bad_argument(index: usize, expected: &'static str, found: &Value) -> ConstructionError {
    ConstructionError::BadArgument {
        index,
        expected,
        found: found
            .arg_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "null".into()),
    }
}

/// Wrap a constructor body so it can be stored as a trait object
fn boxed_body<T: ?Sized + 'static, F>(
    body: F,
) -> Arc<dyn Fn(Args<'_>) -> Result<Box<T>, ConstructionError> + Send + Sync>
where
    F: Fn(Args<'_>) -> Result<Box<T>, ConstructionError> + Send + Sync + 'static,
{
    Arc::new(body)
}

/// One declared constructor of an implementation class
pub struct Constructor<T: ?Sized> {
    class: &'static str,
    params: Arc<[ParamType]>,
    body: Arc<dyn Fn(Args<'_>) -> Result<Box<T>, ConstructionError> + Send + Sync>,
}

impl<T: ?Sized + 'static> Constructor<T> {
    /// Create a constructor whose body already yields the interface type
    pub fn new<F>(class: &'static str, params: Vec<ParamType>, body: F) -> Self
    where
        F: Fn(Args<'_>) -> Result<Box<T>, ConstructionError> + Send + Sync + 'static,
    {
        Self {
            class,
            params: params.into(),
            body: boxed_body(body),
        }
    }

    /// Name of the class this constructor belongs to
    pub fn class_name(&self) -> &'static str {
        self.class
    }

    /// Declared parameter types
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Human-readable parameter list, e.g. `(int, str?)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("({})", params.join(", "))
    }

    /// Run the body without any argument checks
    pub(crate) fn invoke(&self, args: &[Value]) -> Result<Box<T>, ConstructionError> {
        (self.body)(Args::new(args))
    }
}

impl<T: ?Sized> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            class: self.class,
            params: Arc::clone(&self.params),
            body: Arc::clone(&self.body),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.signature())
    }
}

/// Descriptor of a concrete type backing the interface `T`
pub struct ImplementClass<T: ?Sized> {
    name: &'static str,
    type_id: TypeId,
    constructors: Vec<Constructor<T>>,
}

impl<T: ?Sized + 'static> ImplementClass<T> {
    /// Start describing the concrete type `C`
    ///
    /// # Example
    /// ```ignore
    /// let class = ImplementClass::<dyn CounterService>::builder::<Counter>()
    ///     .constructor([], |_| Ok(Counter::new(0)))
    ///     .constructor([ParamType::Int], |args| Ok(Counter::new(args.int(0)?)))
    ///     .build();
    /// ```
    pub fn builder<C: Implements<T>>() -> ImplementClassBuilder<T, C> {
        ImplementClassBuilder {
            name: std::any::type_name::<C>(),
            constructors: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `TypeId` of the concrete type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether this descriptor stands for the concrete type `C`
    pub fn is<C: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }

    /// Constructors in declaration order
    pub fn constructors(&self) -> &[Constructor<T>] {
        &self.constructors
    }
}

impl<T: ?Sized> Clone for ImplementClass<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            type_id: self.type_id,
            constructors: self.constructors.clone(),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for ImplementClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementClass")
            .field("name", &self.name)
            .field("constructors", &self.constructors)
            .finish()
    }
}

/// Builder for [`ImplementClass`]
pub struct ImplementClassBuilder<T: ?Sized, C> {
    name: &'static str,
    constructors: Vec<Constructor<T>>,
    _marker: PhantomData<fn() -> C>,
}

impl<T: ?Sized + 'static, C: Implements<T>> ImplementClassBuilder<T, C> {
    /// Override the class name (defaults to the Rust type name)
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        for ctor in &mut self.constructors {
            ctor.class = name;
        }
        self
    }

    /// Declare the next constructor
    ///
    /// Declaration order is significant: overload resolution picks the first
    /// constructor whose parameters accept the arguments.
    pub fn constructor<F>(mut self, params: impl Into<Vec<ParamType>>, body: F) -> Self
    where
        F: Fn(Args<'_>) -> Result<C, ConstructionError> + Send + Sync + 'static,
    {
        let body = boxed_body(move |args: Args<'_>| {
            body(args).map(|object| <C as Implements<T>>::upcast(Box::new(object)))
        });
        self.constructors.push(Constructor {
            class: self.name,
            params: params.into().into(),
            body,
        });
        self
    }

    pub fn build(self) -> ImplementClass<T> {
        ImplementClass {
            name: self.name,
            type_id: TypeId::of::<C>(),
            constructors: self.constructors,
        }
    }
}
