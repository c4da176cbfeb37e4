//! Error types for the class manager

use hermes_engine::{ConstructionError, HookError};
use hermes_sdk::MergeError;

/// Error type for overload resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// No implementation class has been installed yet
    #[error("No implementation registered")]
    NoImplementation,

    /// The implementation has no constructor taking this many arguments
    #[error("{class} has no constructor taking {arity} arguments")]
    ArityMismatch { class: &'static str, arity: usize },

    /// Constructors of the right arity exist but none accepts the argument types
    #[error("No constructor of {class} accepts ({signature})")]
    NoAssignableConstructor { class: &'static str, signature: String },
}

/// Error type for class manager operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    /// The manager runs without a proxy class
    #[error("Manager is not reloadable")]
    NotReloadable,

    /// The proxy was built by a different manager
    #[error("Proxy belongs to another manager")]
    ForeignProxy,

    /// User code panicked while a proxy was being swapped
    #[error("Swap panicked: {message}")]
    Panicked { message: String },
}
