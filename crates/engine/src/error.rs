//! Error types for construction and proxy hook invocation

/// Error type for building backing objects
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// The constructor was called with the wrong number of arguments
    #[error("{class} constructor takes {expected} arguments, got {found}")]
    ArityMismatch {
        class: &'static str,
        expected: usize,
        found: usize,
    },

    /// No declared constructor accepts the given argument types
    #[error("No constructor of {class} accepts ({signature})")]
    NoMatchingConstructor { class: &'static str, signature: String },

    /// An argument could not be read as the type the constructor expected
    #[error("Argument {index}: expected {expected}, found {found}")]
    BadArgument {
        index: usize,
        expected: &'static str,
        found: String,
    },

    /// The constructor body reported a failure
    #[error("Construction failed: {0}")]
    Failed(String),

    /// The constructor body panicked
    #[error("Constructor of {class} panicked: {message}")]
    Panicked { class: &'static str, message: String },
}

/// Error type for invoking a proxy's target hooks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    /// The proxy object is not of the type the hook was built for
    #[error("Proxy is not a {expected}")]
    ProxyTypeMismatch { expected: &'static str },

    /// The proxy has no backing object installed
    #[error("Proxy {proxy} has no reload target")]
    EmptyTarget { proxy: &'static str },
}
