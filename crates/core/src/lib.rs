//! Hermes - Core Logic
//!
//! Swaps the implementation behind long-lived proxy handles at runtime. A
//! [`ClassManager`] owns the active implementation class of a service
//! interface, builds instances of it, and on [`ClassManager::update`] moves
//! every registered proxy onto the new class with its state carried over.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - Values, object state and the capability traits
//! - [`engine`] - Class descriptors, construction and state merge

// Allow the crate to refer to itself as `hermes_core` for proc macro compatibility
extern crate self as hermes_core;

pub use hermes_engine as engine;
pub use hermes_sdk as sdk;

pub mod catalogue;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod probe;
pub mod registry;

// Re-export commonly used items
pub use catalogue::ConstructorCatalogue;
pub use error::{ManagerError, MatchError};
pub use manager::{
    ClassManager, Instance, ListenerKey, ManagerMode, Proxy, SwapCallback, SwapFailure,
    SwapReport,
};
pub use probe::{probe, ProxyCapability};
pub use registry::{InstanceRegistry, LiveEntry, ProxyKey};

// Re-export config types
pub use config::{ConfigError, ConfigResult, CoreConfig};

// Re-export the types most callers need from the lower crates
pub use hermes_engine::{
    Args, ConstructionError, Constructor, HookError, ImplementClass, ProxyClass, ProxyObject,
};
pub use hermes_sdk::{
    Implements, MergeError, ObjectState, ParamType, ReloadProxy, Reloadable, StateValue,
    TargetCell, Value,
};

// Re-export macros
pub use hermes_macros::{ReloadProxy, Reloadable};
