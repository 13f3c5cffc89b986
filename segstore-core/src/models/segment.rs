use std::cmp::Ordering;

use num_traits::PrimInt;

/// Position along the trace axis, typically a nanosecond timestamp.
pub type Position = i64;

/// An immutable interval on a one-dimensional axis with an attached payload.
///
/// Both bounds are inclusive. A zero-length segment (`start == end`)
/// represents a point event. Segments are value types: two segments are
/// equal when their bounds and payloads are equal.
///
/// # Examples
///
/// ```
/// use segstore_core::Segment;
///
/// let call = Segment { start: 100i64, end: 250, payload: "sys_read" };
/// assert!(call.overlaps(200, 300));
/// assert!(!call.overlaps(251, 300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment<I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub payload: E,
}

impl<I, E> Segment<I, E>
where
    I: PrimInt + Send + Sync,
    E: Eq + Clone + Send + Sync,
{
    pub fn new(start: I, end: I, payload: E) -> Self {
        Self {
            start,
            end,
            payload,
        }
    }

    /// A segment is well formed when its start does not exceed its end.
    /// Stores reject ill-formed segments at insertion time.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Inclusive overlap test against the query range `[start, end]`.
    #[inline]
    pub fn overlaps(&self, start: I, end: I) -> bool {
        self.start <= end && self.end >= start
    }

    /// Deterministic default ordering: by start position, then end position.
    /// Payloads never participate in ordering.
    #[inline]
    pub fn by_position(&self, other: &Self) -> Ordering {
        (self.start, self.end).cmp(&(other.start, other.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1, 5, 4, 4, true)]
    #[case(10, 12, 4, 4, false)]
    #[case(0, 20, 6, 9, true)]
    #[case(1, 5, 5, 9, true)] // boundary touch is an overlap
    #[case(1, 5, 6, 9, false)]
    #[case(4, 4, 4, 4, true)] // point event stabs itself
    fn test_inclusive_overlap(
        #[case] start: i64,
        #[case] end: i64,
        #[case] q_start: i64,
        #[case] q_end: i64,
        #[case] expected: bool,
    ) {
        let seg = Segment::new(start, end, ());
        assert_eq!(seg.overlaps(q_start, q_end), expected);
    }

    #[rstest]
    fn test_value_equality_includes_payload() {
        let a = Segment::new(1i64, 5, "lock_a");
        let b = Segment::new(1i64, 5, "lock_b");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        // same bounds still order as equal
        assert_eq!(a.by_position(&b), Ordering::Equal);
    }

    #[rstest]
    fn test_ordering_by_start_then_end() {
        let mut segs = vec![
            Segment::new(10i64, 12, ()),
            Segment::new(1, 5, ()),
            Segment::new(1, 3, ()),
        ];
        segs.sort_by(|a, b| a.by_position(b));
        let bounds: Vec<(i64, i64)> = segs.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, vec![(1, 3), (1, 5), (10, 12)]);
    }

    #[rstest]
    fn test_well_formedness() {
        assert!(Segment::new(3i64, 3, ()).is_well_formed());
        assert!(Segment::new(-5i64, 5, ()).is_well_formed());
        assert!(!Segment::new(5i64, -5, ()).is_well_formed());
    }
}
