use thiserror::Error;

/// Error type shared by the segstore crates.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A segment whose start position is after its end position.
    #[error("invalid segment: start {0} is after end {1}")]
    InvalidSegment(String, String),

    /// The store has been disposed; no further operation is possible.
    #[error("segment store has been disposed")]
    Disposed,

    /// The store has been finalized and no longer accepts insertions.
    #[error("segment store is finalized and no longer accepts insertions")]
    Sealed,

    /// Writing or removing the durable snapshot failed. The in-memory store
    /// stays valid and queryable when this is returned.
    #[error("failed to persist segment store: {0}")]
    Persistence(String),
}

/// Result type alias for segstore operations.
pub type Result<T> = std::result::Result<T, StoreError>;
