//! Error types for state transfer

/// Error type for merging state from one backing object into another
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A field exists on both sides but the exported value has the wrong shape
    #[error("Field `{field}` of {target} cannot accept a {found} value from {source_type}")]
    FieldTypeMismatch {
        target: &'static str,
        source_type: &'static str,
        field: String,
        found: String,
    },

    /// The destination refuses state from this source entirely
    #[error("{target} cannot merge state from {source_type}")]
    Incompatible {
        target: &'static str,
        source_type: &'static str,
    },
}
