//! # Durable snapshots for segment stores.
//!
//! This crate reads and writes `.segs` files - little-endian binary
//! snapshots of a full segment set, sufficient to reconstruct an
//! equivalent queryable store without re-ingesting the original trace.
//! The payload of each segment goes through the [`PayloadCodec`] trait,
//! so persistence is a capability of the payload type rather than a
//! requirement on every store.
//!
pub mod consts;
pub mod error;
pub mod snapshot;

// re-expose core functions
pub use consts::*;
pub use error::*;
pub use snapshot::*;
