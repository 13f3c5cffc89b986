//! # Core models for segstore.
//!
//! This crate holds the leaf types shared by the rest of the workspace: the
//! [`Segment`](models::Segment) interval value, the [`FieldValue`](models::FieldValue)
//! payload kinds produced by trace format adapters, and the common
//! [`StoreError`](errors::StoreError) type.
//!
pub mod errors;
pub mod models;

// re-export for cleaner imports
pub use self::errors::{Result, StoreError};
pub use self::models::{FieldValue, Position, Segment};
