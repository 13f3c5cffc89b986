use std::cmp::Ordering;

use segstore_core::{Position, Result, Segment};

use crate::view::SegmentSeq;

/// The collection-like contract of a segment store.
///
/// A store passes through three states: it starts out *building* (accepting
/// insertions, answering queries over the provisional buffer), becomes
/// *queryable* after an explicit [`finalize`](SegmentStore::finalize) or
/// [`close`](SegmentStore::close), and ends *disposed*, after which every
/// operation except a repeat [`dispose`](SegmentStore::dispose) fails with
/// [`StoreError::Disposed`](segstore_core::StoreError::Disposed) - callers
/// can always tell "no matches" from "store destroyed".
///
/// [`intersecting_range`](SegmentStore::intersecting_range) is the single
/// mandatory query primitive; the point, ordered, and whole-store variants
/// are derived from it once, here, so backends cannot drift apart. Removal
/// of individual segments is deliberately absent: segments are write-once
/// within a build phase, and only whole-store disposal releases them.
pub trait SegmentStore<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    /// Insert one segment. Only legal while building; a segment with
    /// `start > end` is rejected before any state changes.
    fn add(&self, segment: Segment<Position, E>) -> Result<()>;

    /// Insert a batch. The whole batch is validated up front: if any
    /// segment is invalid, nothing is inserted.
    fn add_all(&self, segments: Vec<Segment<Position, E>>) -> Result<()>;

    /// Number of segments accepted so far.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Membership by value equality: bounds and payload. Implemented as an
    /// overlap query narrowed to the segment's own bounds followed by an
    /// exact scan, since several segments may share the same bounds.
    fn contains(&self, segment: &Segment<Position, E>) -> Result<bool> {
        let hits = self.intersecting_range(segment.start, segment.end)?;
        Ok(hits.iter().any(|s| s == segment))
    }

    /// All segments inclusively overlapping `[start, end]`, captured as a
    /// snapshot. Ranges are accepted in either orientation. This is the
    /// one mandatory query primitive.
    fn intersecting_range(&self, start: Position, end: Position) -> Result<SegmentSeq<E>>;

    /// All segments inclusively crossing `position`; the degenerate range
    /// `[position, position]`.
    fn intersecting(&self, position: Position) -> Result<SegmentSeq<E>> {
        self.intersecting_range(position, position)
    }

    /// Range query with a caller-supplied total order for traversal.
    fn intersecting_range_sorted<F>(
        &self,
        start: Position,
        end: Position,
        order: F,
    ) -> Result<SegmentSeq<E>>
    where
        F: Fn(&Segment<Position, E>, &Segment<Position, E>) -> Ordering + Send + Sync + 'static,
        Self: Sized,
    {
        Ok(self.intersecting_range(start, end)?.sorted_by(order))
    }

    /// Stabbing query with a caller-supplied total order for traversal.
    fn intersecting_sorted<F>(&self, position: Position, order: F) -> Result<SegmentSeq<E>>
    where
        F: Fn(&Segment<Position, E>, &Segment<Position, E>) -> Ordering + Send + Sync + 'static,
        Self: Sized,
    {
        self.intersecting_range_sorted(position, position, order)
    }

    /// Every segment in the store, in the index's native traversal order
    /// (insertion order while building, `(start, end)` order once
    /// finalized).
    fn iter_all(&self) -> Result<SegmentSeq<E>> {
        self.intersecting_range(Position::MIN, Position::MAX)
    }

    /// Every segment in the store, in the supplied order.
    fn iter_sorted<F>(&self, order: F) -> Result<SegmentSeq<E>>
    where
        F: Fn(&Segment<Position, E>, &Segment<Position, E>) -> Ordering + Send + Sync + 'static,
        Self: Sized,
    {
        self.intersecting_range_sorted(Position::MIN, Position::MAX, order)
    }

    /// Transition from building to queryable: publish the accepted
    /// segments into the query-optimized index. Idempotent; once
    /// finalized, further insertions are rejected.
    fn finalize(&self) -> Result<()>;

    /// Release all in-memory structures. Idempotent; synchronizes with
    /// in-flight queries, which either complete first or observe the
    /// disposed state.
    fn dispose(&self);

    /// Terminal close. Finalizes the content, then either persists it
    /// durably (`persist = true`, where the store has a snapshot
    /// configured) or removes any partial on-disk artifact
    /// (`persist = false`), and finally releases in-memory state. On a
    /// persistence failure the store is left intact and queryable.
    fn close(&self, persist: bool) -> Result<()>;
}
