use thiserror::Error;

/// Errors reported by tree insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The key has no defined ordering relative to a key already in the tree, e.g. a NaN float.
    ///
    /// The tree is left unchanged.
    #[error("key cannot be ordered against the existing keys of the tree")]
    Incomparable,
}
