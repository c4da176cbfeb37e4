//! Construction, assignability and state merge
//!
//! These are the primitive operations the class manager builds on:
//! [`match_assignable_types`] decides whether runtime argument types fit a
//! parameter list, [`construct`] and [`create_instance`] build backing objects,
//! and [`merge_object`] carries state from one backing object into another.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use hermes_sdk::{ArgType, MergeError, ParamType, Reloadable, Value};

use crate::class::{Constructor, ImplementClass};
use crate::error::ConstructionError;

/// Runtime type of each argument, `None` for null arguments
pub fn runtime_types(args: &[Value]) -> Vec<Option<ArgType>> {
    args.iter().map(Value::arg_type).collect()
}

/// Render runtime argument types, e.g. `int, null, str`
pub fn describe_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| {
            arg.arg_type()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "null".into())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that every declared parameter accepts the matching argument type
///
/// Lists of different length never match. A `None` argument type (a null
/// argument) is only accepted by a nullable parameter.
pub fn match_assignable_types(params: &[ParamType], args: &[Option<ArgType>]) -> bool {
    params.len() == args.len()
        && params
            .iter()
            .zip(args)
            .all(|(param, arg)| param.is_assignable_from(arg.as_ref()))
}

/// Invoke a specific constructor after checking arity and argument types
///
/// A panic inside the constructor body is caught and reported as
/// [`ConstructionError::Panicked`].
pub fn construct<T: ?Sized + 'static>(
    constructor: &Constructor<T>,
    args: &[Value],
) -> Result<Box<T>, ConstructionError> {
    if constructor.arity() != args.len() {
        return Err(ConstructionError::ArityMismatch {
            class: constructor.class_name(),
            expected: constructor.arity(),
            found: args.len(),
        });
    }

    if !match_assignable_types(constructor.params(), &runtime_types(args)) {
        return Err(ConstructionError::NoMatchingConstructor {
            class: constructor.class_name(),
            signature: describe_args(args),
        });
    }

    invoke_guarded(constructor, args)
}

/// Build an instance of `class` with its first constructor accepting `args`
///
/// Constructors are scanned in declaration order. With no arguments the first
/// zero-argument constructor is used.
pub fn create_instance<T: ?Sized + 'static>(
    class: &ImplementClass<T>,
    args: &[Value],
) -> Result<Box<T>, ConstructionError> {
    let types = runtime_types(args);
    let constructor = class
        .constructors()
        .iter()
        .filter(|c| c.arity() == args.len())
        .find(|c| args.is_empty() || match_assignable_types(c.params(), &types))
        .ok_or_else(|| ConstructionError::NoMatchingConstructor {
            class: class.name(),
            signature: describe_args(args),
        })?;

    tracing::trace!("create_instance({}) -> {:?}", class.name(), constructor);
    invoke_guarded(constructor, args)
}

fn invoke_guarded<T: ?Sized + 'static>(
    constructor: &Constructor<T>,
    args: &[Value],
) -> Result<Box<T>, ConstructionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| constructor.invoke(args))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::error!(
                "Constructor {:?} panicked: {}",
                constructor,
                message
            );
            Err(ConstructionError::Panicked {
                class: constructor.class_name(),
                message,
            })
        }
    }
}

/// Text of a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}

/// Copy the observable state of `source` into `destination`
pub fn merge_object<T: ?Sized + Reloadable>(
    source: &T,
    destination: &mut T,
) -> Result<(), MergeError> {
    let state = source.capture_state();
    tracing::trace!(
        "merge_object({} -> {}): {} fields",
        source.type_name(),
        destination.type_name(),
        state.len()
    );
    destination.restore_state(&state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_sdk::{Implements, ObjectState, StateValue};

    trait Meter: Reloadable {
        fn reading(&self) -> i64;
    }

    struct Gauge {
        reading: i64,
    }

    impl Meter for Gauge {
        fn reading(&self) -> i64 {
            self.reading
        }
    }

    impl Reloadable for Gauge {
        fn capture_state(&self) -> ObjectState {
            let mut state = ObjectState::new(std::any::type_name::<Self>());
            state.insert("reading", self.reading.to_value());
            state
        }

        fn restore_state(&mut self, state: &ObjectState) -> Result<(), MergeError> {
            if let Some(value) = state.get("reading") {
                self.reading = i64::from_value(value).ok_or_else(|| {
                    MergeError::FieldTypeMismatch {
                        target: "Gauge",
                        source_type: state.type_name(),
                        field: "reading".into(),
                        found: format!("{:?}", value),
                    }
                })?;
            }
            Ok(())
        }
    }

    impl Implements<dyn Meter> for Gauge {
        fn upcast(self: Box<Self>) -> Box<dyn Meter> {
            self
        }
    }

    fn gauge_class() -> ImplementClass<dyn Meter> {
        ImplementClass::<dyn Meter>::builder::<Gauge>()
            .constructor([], |_| Ok(Gauge { reading: 0 }))
            .constructor([ParamType::Str], |args| {
                let reading = args
                    .str(0)?
                    .parse()
                    .map_err(|e| ConstructionError::Failed(format!("{}", e)))?;
                Ok(Gauge { reading })
            })
            .constructor([ParamType::Int], |args| Ok(Gauge { reading: args.int(0)? }))
            .constructor([ParamType::Any], |_| Ok(Gauge { reading: -1 }))
            .constructor([ParamType::Int, ParamType::Int], |_| panic!("two-argument gauge"))
            .build()
    }

    #[test]
    fn test_match_assignable_types_length() {
        assert!(match_assignable_types(&[], &[]));
        assert!(!match_assignable_types(&[ParamType::Int], &[]));
        assert!(match_assignable_types(&[ParamType::Int], &[Some(ArgType::Int)]));
        assert!(!match_assignable_types(&[ParamType::Int], &[None]));
    }

    #[test]
    fn test_create_instance_first_match_wins() {
        let class = gauge_class();
        assert_eq!(create_instance(&class, &[]).unwrap().reading(), 0);
        assert_eq!(create_instance(&class, &[Value::from(7)]).unwrap().reading(), 7);
        assert_eq!(create_instance(&class, &[Value::from("12")]).unwrap().reading(), 12);
        assert_eq!(create_instance(&class, &[Value::Bool(true)]).unwrap().reading(), -1);
    }

    #[test]
    fn test_create_instance_rejects_null() {
        let class = gauge_class();
        let err = create_instance(&class, &[Value::Null]).err().unwrap();
        assert_eq!(
            err,
            ConstructionError::NoMatchingConstructor {
                class: class.name(),
                signature: "null".into(),
            }
        );
    }

    #[test]
    fn test_constructor_failure_is_reported() {
        let class = gauge_class();
        let err = create_instance(&class, &[Value::from("abc")]).err().unwrap();
        assert!(matches!(err, ConstructionError::Failed(_)));
    }

    #[test]
    fn test_constructor_panic_is_caught() {
        let class = gauge_class();
        let err = create_instance(&class, &[Value::from(1), Value::from(2)])
            .err()
            .unwrap();
        assert!(matches!(err, ConstructionError::Panicked { ref message, .. } if message == "two-argument gauge"));
    }

    #[test]
    fn test_construct_checks_arguments() {
        let class = gauge_class();
        let int_ctor = &class.constructors()[2];
        assert!(matches!(
            construct(int_ctor, &[]),
            Err(ConstructionError::ArityMismatch { expected: 1, found: 0, .. })
        ));
        assert!(matches!(
            construct(int_ctor, &[Value::from("x")]),
            Err(ConstructionError::NoMatchingConstructor { .. })
        ));
        assert_eq!(construct(int_ctor, &[Value::from(3)]).unwrap().reading(), 3);
    }

    #[test]
    fn test_merge_object_copies_state() {
        let class = gauge_class();
        let old = create_instance(&class, &[Value::from(41)]).unwrap();
        let mut new = create_instance(&class, &[]).unwrap();
        merge_object(&*old, &mut *new).unwrap();
        assert_eq!(new.reading(), 41);
    }

    #[test]
    fn test_describe_args() {
        let args = [Value::from(1), Value::Null, Value::from("s")];
        assert_eq!(describe_args(&args), "int, null, str");
    }
}
