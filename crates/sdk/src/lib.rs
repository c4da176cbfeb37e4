//! Hermes SDK - Hot-swap contract types
//!
//! This crate contains the types shared by every part of the hot-swap system:
//! the dynamic values passed to constructors, the state exported during a
//! swap, and the capability traits implementation and proxy types opt into.
//!
//! # Modules
//!
//! - [`value`] - Dynamic argument values and parameter types
//! - [`state`] - Transferable object state
//! - [`reload`] - `Reloadable`, `ReloadProxy`, `Implements` and `TargetCell`
//! - [`error`] - State merge errors

pub mod error;
pub mod reload;
pub mod state;
pub mod value;

pub use error::MergeError;
pub use reload::{Implements, ReloadProxy, Reloadable, TargetCell};
pub use state::{ObjectState, StateValue};
pub use value::{ArgType, ObjectValue, ParamType, Value};
