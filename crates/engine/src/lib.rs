//! Hermes Engine - Construction and Introspection Facility
//!
//! This crate handles:
//! - Describing implementation classes and their constructors
//! - Describing proxy classes and their target hooks
//! - Building backing objects from dynamic argument lists
//! - Merging state between backing objects
//!
//! # Architecture
//!
//! An [`ImplementClass`] lists the constructors of one concrete type in
//! declaration order. [`create_instance`] picks the first constructor whose
//! parameters accept the runtime argument types (see
//! [`match_assignable_types`]) and invokes it, catching panics.
//! [`merge_object`] uses the [`Reloadable`](hermes_sdk::Reloadable) capability
//! to move state from an old backing object into its replacement.

pub mod class;
pub mod error;
pub mod proxy;
pub mod reflect;

pub use error::{ConstructionError, HookError};
pub use class::{Args, Constructor, ImplementClass, ImplementClassBuilder};
pub use proxy::{downcast_proxy, ProxyClass, ProxyClassBuilder, ProxyObject};
pub use reflect::{
    construct, create_instance, describe_args, match_assignable_types, merge_object,
    panic_message, runtime_types,
};
