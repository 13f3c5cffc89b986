use num_traits::PrimInt;

use super::OverlapIndex;
use crate::traits::normalize_query;
use segstore_core::Segment;

/// A flat, start-sorted overlap index.
///
/// Segments are kept in one array sorted by `(start, end)`. Alongside it the
/// index stores a suffix-max-end array (`suffix_max_ends[i]` is the largest
/// end among `segments[i..]`) and the span of the longest segment. A query
/// `[q_start, q_end]` then:
///
/// 1. binary-searches the scan start: no segment beginning before
///    `q_start - max_span` can reach `q_start`;
/// 2. binary-searches the scan stop: no segment beginning after `q_end`
///    can overlap;
/// 3. scans forward between the two, emitting segments whose end reaches
///    `q_start` and stopping early as soon as the suffix-max-end shows that
///    no remaining candidate can still qualify.
///
/// This keeps queries near `O(log n + k)` for `k` results and degrades
/// gracefully (never incorrectly) when segments nest heavily.
///
/// # Examples
///
/// ```
/// use segstore_core::Segment;
/// use segstore_index::{FlatIndex, OverlapIndex};
///
/// let held_locks = vec![
///     Segment { start: 100i64, end: 150, payload: "mmap_sem" },
///     Segment { start: 200, end: 250, payload: "rq_lock" },
///     Segment { start: 225, end: 275, payload: "rcu_node" },
/// ];
///
/// let index = FlatIndex::build(held_locks);
/// assert_eq!(index.find(210, 240).len(), 2);
/// assert_eq!(index.count(210, 240), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FlatIndex<I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync,
{
    /// Segments sorted by (start, end).
    segments: Vec<Segment<I, E>>,
    /// Sorted start positions, for counting queries.
    starts: Vec<I>,
    /// Sorted end positions, for counting queries.
    ends: Vec<I>,
    /// Largest end position in `segments[i..]`.
    suffix_max_ends: Vec<I>,
    /// Span of the longest segment; `None` when a span overflows `I`, in
    /// which case queries scan from the first segment.
    max_span: Option<I>,
}

impl<I, E> OverlapIndex<I, E> for FlatIndex<I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync,
{
    fn build(mut segments: Vec<Segment<I, E>>) -> Self
    where
        Self: Sized,
    {
        segments.sort_by(|a, b| a.by_position(b));

        let (mut starts, mut ends): (Vec<_>, Vec<_>) =
            segments.iter().map(|s| (s.start, s.end)).unzip();
        starts.sort_unstable();
        ends.sort_unstable();

        // An under-estimated span would move the scan start past
        // qualifying segments, so overflow degrades to "unbounded".
        let mut max_span = Some(I::zero());
        for seg in segments.iter() {
            match seg.end.checked_sub(&seg.start) {
                Some(span) => {
                    if max_span.is_some_and(|current| span > current) {
                        max_span = Some(span);
                    }
                }
                None => max_span = None,
            }
        }

        let mut suffix_max_ends = vec![I::zero(); segments.len()];
        let mut running = I::min_value();
        for (i, seg) in segments.iter().enumerate().rev() {
            if seg.end > running {
                running = seg.end;
            }
            suffix_max_ends[i] = running;
        }

        FlatIndex {
            segments,
            starts,
            ends,
            suffix_max_ends,
            max_span,
        }
    }

    #[inline]
    fn find(&self, start: I, end: I) -> Vec<Segment<I, E>> {
        self.find_iter(start, end).cloned().collect()
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Segment<I, E>> + 'a> {
        Box::new(IterFind::new(self, start, end))
    }

    /// Count overlaps from the two sorted endpoint arrays: subtract the
    /// segments ending before the query and those starting after it. The
    /// two excluded sets cannot intersect for well-formed segments.
    #[inline]
    fn count(&self, start: I, end: I) -> usize {
        let (start, end) = normalize_query(start, end);
        let len = self.segments.len();
        let end_before = self.ends.partition_point(|&e| e < start);
        let start_after = len - self.starts.partition_point(|&s| s <= end);
        len - end_before - start_after
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Segment<I, E>> + 'a> {
        Box::new(self.segments.iter())
    }

    #[inline]
    fn len(&self) -> usize {
        self.segments.len()
    }
}

/// An iterator over the segments of a [`FlatIndex`] that overlap a query
/// range, in `(start, end)` order.
///
/// Created by [`find_iter`](OverlapIndex::find_iter). Yields references
/// without allocating a result vector.
#[derive(Debug)]
pub struct IterFind<'a, I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync + 'a,
{
    inner: &'a FlatIndex<I, E>,
    off: usize,
    upper: usize,
    q_start: I,
}

impl<'a, I, E> IterFind<'a, I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync + 'a,
{
    fn new(inner: &'a FlatIndex<I, E>, start: I, end: I) -> Self {
        let (q_start, q_end) = normalize_query(start, end);
        // no segment starting before `q_start - max_span` can reach the
        // query; any overflow on the way degrades to scanning from 0
        let off = match inner.max_span.and_then(|span| q_start.checked_sub(&span)) {
            Some(scan_floor) => inner.segments.partition_point(|s| s.start < scan_floor),
            None => 0,
        };
        Self {
            inner,
            off,
            upper: inner.segments.partition_point(|s| s.start <= q_end),
            q_start,
        }
    }
}

impl<'a, I, E> Iterator for IterFind<'a, I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync + 'a,
{
    type Item = &'a Segment<I, E>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.off < self.upper {
            if self.inner.suffix_max_ends[self.off] < self.q_start {
                // nothing from here on can still reach the query
                return None;
            }
            let seg = &self.inner.segments[self.off];
            self.off += 1;
            if seg.end >= self.q_start {
                return Some(seg);
            }
        }
        None
    }
}

impl<I, E> IntoIterator for FlatIndex<I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync,
{
    type Item = Segment<I, E>;
    type IntoIter = ::std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a, I, E> IntoIterator for &'a FlatIndex<I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync + 'a,
{
    type Item = &'a Segment<I, E>;
    type IntoIter = std::slice::Iter<'a, Segment<I, E>>;

    fn into_iter(self) -> std::slice::Iter<'a, Segment<I, E>> {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn segments() -> Vec<Segment<i64, &'static str>> {
        vec![
            Segment::new(1, 5, "a"),
            Segment::new(10, 12, "b"),
            Segment::new(4, 4, "c"),
            Segment::new(0, 20, "d"),
        ]
    }

    fn payloads(hits: &[Segment<i64, &'static str>]) -> Vec<&'static str> {
        let mut vals: Vec<&str> = hits.iter().map(|s| s.payload).collect();
        vals.sort_unstable();
        vals
    }

    #[rstest]
    fn test_build_and_len(segments: Vec<Segment<i64, &'static str>>) {
        let index = FlatIndex::build(segments.clone());
        assert_eq!(index.len(), segments.len());
        assert!(!index.is_empty());
    }

    #[rstest]
    fn test_stab_query(segments: Vec<Segment<i64, &'static str>>) {
        let index = FlatIndex::build(segments);

        // position 4 crosses everything but (10, 12)
        assert_eq!(payloads(&index.find(4, 4)), vec!["a", "c", "d"]);

        // only the enclosing segment crosses (6, 9)
        assert_eq!(payloads(&index.find(6, 9)), vec!["d"]);

        // (1, 5) starts after 0, so position 0 only hits (0, 20)
        assert_eq!(payloads(&index.find(0, 0)), vec!["d"]);
    }

    #[rstest]
    fn test_inclusive_boundaries(segments: Vec<Segment<i64, &'static str>>) {
        let index = FlatIndex::build(segments);
        assert_eq!(payloads(&index.find(5, 5)), vec!["a", "d"]);
        assert_eq!(payloads(&index.find(12, 30)), vec!["b", "d"]);
    }

    #[rstest]
    fn test_reversed_query_is_normalized(segments: Vec<Segment<i64, &'static str>>) {
        let index = FlatIndex::build(segments);
        assert_eq!(index.find(9, 6), index.find(6, 9));
        assert_eq!(index.count(9, 6), index.count(6, 9));
    }

    #[rstest]
    fn test_full_range_returns_all(segments: Vec<Segment<i64, &'static str>>) {
        let n = segments.len();
        let index = FlatIndex::build(segments);
        assert_eq!(index.find(i64::MIN, i64::MAX).len(), n);
        assert_eq!(index.count(i64::MIN, i64::MAX), n);
    }

    #[rstest]
    fn test_count_matches_find(segments: Vec<Segment<i64, &'static str>>) {
        let index = FlatIndex::build(segments);
        for (a, b) in [(4, 4), (6, 9), (0, 0), (-10, -1), (21, 100), (5, 10)] {
            assert_eq!(index.count(a, b), index.find(a, b).len(), "range ({a}, {b})");
        }
    }

    #[rstest]
    fn test_empty_index() {
        let index: FlatIndex<i64, &str> = FlatIndex::build(vec![]);
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
        assert!(index.find(1, 2).is_empty());
        assert_eq!(index.count(1, 2), 0);
    }

    #[rstest]
    fn test_negative_positions() {
        let index = FlatIndex::build(vec![
            Segment::new(-100i64, -50, "early"),
            Segment::new(-60, 10, "crossing"),
            Segment::new(5, 8, "late"),
        ]);
        assert_eq!(payloads(&index.find(-55, -55)), vec!["crossing", "early"]);
        assert_eq!(payloads(&index.find(0, 6)), vec!["crossing", "late"]);
    }

    #[rstest]
    fn test_nested_population_early_exit_is_safe() {
        // one giant segment forces a wide scan window; the suffix max must
        // not cut off qualifying hits behind non-qualifying ones
        let mut segs = vec![Segment::new(0i64, 1_000_000, 0u32)];
        segs.extend((0..100).map(|i| Segment::new(i * 10, i * 10 + 5, i as u32 + 1)));
        let index = FlatIndex::build(segs);

        let hits = index.find(503, 504);
        assert_eq!(hits.len(), 2); // the giant and (500, 505)
        assert_eq!(index.count(503, 504), 2);
    }

    #[rstest]
    fn test_iter_is_position_sorted(segments: Vec<Segment<i64, &'static str>>) {
        let index = FlatIndex::build(segments);
        let bounds: Vec<(i64, i64)> = index.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, vec![(0, 20), (1, 5), (4, 4), (10, 12)]);
    }

    #[rstest]
    fn test_duplicate_bounds_all_reported() {
        let index = FlatIndex::build(vec![
            Segment::new(3i64, 7, "first"),
            Segment::new(3, 7, "second"),
        ]);
        assert_eq!(payloads(&index.find(5, 5)), vec!["first", "second"]);
    }

    #[rstest]
    fn test_extreme_span_segment() {
        let index = FlatIndex::build(vec![
            Segment::new(i64::MIN, i64::MAX, "all"),
            Segment::new(0, 0, "origin"),
        ]);
        assert_eq!(payloads(&index.find(0, 0)), vec!["all", "origin"]);
        assert_eq!(payloads(&index.find(i64::MIN, i64::MIN)), vec!["all"]);
    }
}
