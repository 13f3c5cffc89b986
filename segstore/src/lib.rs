//! # segstore: a segment store for trace analysis.
//!
//! A trace analysis session derives intervals from streams of timestamped
//! events - function call durations, lock hold times, request latencies -
//! and needs to answer "which segments overlap this position or range?"
//! interactively over millions of them. This crate ties the workspace
//! together into that store: a collection-like container with a
//! single-writer build phase, an immutable multi-reader query phase, and
//! optional durable snapshots on close.
//!
//! ## Quick Start
//!
//! ```rust
//! use segstore::{IndexKind, MemStore, Segment, SegmentStore};
//!
//! let store = MemStore::new(IndexKind::Flat);
//! store.add_all(vec![
//!     Segment::new(1, 5, "vfs_read"),
//!     Segment::new(10, 12, "vfs_write"),
//!     Segment::new(4, 4, "page_fault"),
//!     Segment::new(0, 20, "do_syscall"),
//! ]).unwrap();
//! store.finalize().unwrap();
//!
//! // everything crossing position 4
//! assert_eq!(store.intersecting(4).unwrap().len(), 3);
//!
//! // the whole store, ordered by a caller-supplied comparator
//! let by_span = store.iter_sorted(|a, b| (a.end - a.start).cmp(&(b.end - b.start))).unwrap();
//! let spans: Vec<i64> = by_span.iter().map(|s| s.end - s.start).collect();
//! assert_eq!(spans, vec![0, 2, 4, 20]);
//!
//! store.dispose();
//! assert!(store.intersecting(4).is_err());
//! ```
//!
//! ## Persistence
//!
//! A store built with [`MemStore::with_snapshot`] writes its content to a
//! `.segs` file on `close(true)`; [`MemStore::open`] reconstructs an
//! equivalent queryable store from that file without re-ingesting the
//! trace. Payload types opt into this through
//! [`segstore_io::PayloadCodec`] - the bundled [`FieldValue`] payload
//! (integer, text, integer array, float, as produced by trace format
//! adapters) implements it out of the box.

pub mod memory;
pub mod store;
pub mod view;

// re-exports
pub use self::memory::MemStore;
pub use self::store::SegmentStore;
pub use self::view::{SegmentSeq, SeqIter};

// re-expose the workspace surface
pub use segstore_core::{FieldValue, Position, Result, Segment, StoreError};
pub use segstore_index::{FlatIndex, IndexKind, IntervalTree, OverlapIndex};
pub use segstore_io::PayloadCodec;
