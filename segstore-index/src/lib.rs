//! Overlap indexes for interval segments derived from trace events.
//!
//! This crate provides the data structures that answer "which segments
//! overlap this range?" over large collections of intervals, such as the
//! function call durations or lock hold times a trace analysis session
//! derives from millions of timestamped events.
//!
//! Both bounds of every segment and every query are inclusive, and a query
//! whose start exceeds its end is normalized by swapping, so a stabbing
//! query at position `p` is exactly the range query `[p, p]`.
//!
//! ## Quick Start
//!
//! ```rust
//! use segstore_core::Segment;
//! use segstore_index::{FlatIndex, OverlapIndex};
//!
//! let segments = vec![
//!     Segment { start: 1i64, end: 5, payload: "vfs_read" },
//!     Segment { start: 10, end: 12, payload: "vfs_write" },
//!     Segment { start: 0, end: 20, payload: "do_syscall" },
//! ];
//!
//! let index = FlatIndex::build(segments);
//!
//! // everything crossing position 11
//! let hits = index.find(11, 11);
//! assert_eq!(hits.len(), 2); // vfs_write and do_syscall
//! ```
//!
//! Two backends are available behind the [`OverlapIndex`] trait:
//!
//! * [`FlatIndex`] - a start-sorted array augmented with a suffix-max-end
//!   array. Built once, queried with a binary search plus a pruned forward
//!   scan. The default backend.
//! * [`IntervalTree`] - a balanced tree keyed by start position where each
//!   node carries the maximum end in its subtree. Queries descend with
//!   subtree pruning, which degrades more gracefully under deeply nested
//!   segment populations.

/// Flat sorted-array index.
///
/// See [`FlatIndex`] for details.
pub mod flat;

/// Augmented interval tree index.
///
/// See [`IntervalTree`] for details.
pub mod tree;

/// Core trait for overlap indexes.
///
/// See [`OverlapIndex`] for details.
pub mod traits;

// re-exports
pub use self::flat::FlatIndex;
pub use self::traits::OverlapIndex;
pub use self::tree::IntervalTree;

use num_traits::PrimInt;
use segstore_core::Segment;

/// The overlap index backend to use for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Start-sorted array with suffix-max-end pruning.
    #[default]
    Flat,
    /// Balanced start-keyed tree with max-end augmentation.
    Tree,
}

/// Build the selected backend from a finalized segment list.
pub fn build_index<I, E>(kind: IndexKind, segments: Vec<Segment<I, E>>) -> Box<dyn OverlapIndex<I, E>>
where
    I: PrimInt + Send + Sync + 'static,
    E: Eq + Clone + Send + Sync + 'static,
{
    match kind {
        IndexKind::Flat => Box::new(FlatIndex::build(segments)),
        IndexKind::Tree => Box::new(IntervalTree::build(segments)),
    }
}
