use std::cmp::Ordering;
use std::fmt;
use std::slice;

use segstore_core::{Position, Segment};

type Order<E> = Box<dyn Fn(&Segment<Position, E>, &Segment<Position, E>) -> Ordering + Send + Sync>;

/// An eager snapshot of query results, exposed as a lazy, restartable
/// sequence.
///
/// The matching segments are captured when the query runs, so later changes
/// to the store (finalize, dispose) never affect a sequence already handed
/// out. When an ordering is attached via [`sorted_by`](SegmentSeq::sorted_by),
/// each traversal re-sorts the same captured snapshot; without one, the
/// snapshot is traversed in the order the index produced it.
pub struct SegmentSeq<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    items: Vec<Segment<Position, E>>,
    order: Option<Order<E>>,
}

impl<E> SegmentSeq<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    pub(crate) fn unordered(items: Vec<Segment<Position, E>>) -> Self {
        Self { items, order: None }
    }

    /// Attach a total order. Traversals then yield the snapshot sorted by
    /// it; the sort is stable, so segments the comparator considers equal
    /// keep their captured relative order.
    pub fn sorted_by<F>(mut self, order: F) -> Self
    where
        F: Fn(&Segment<Position, E>, &Segment<Position, E>) -> Ordering + Send + Sync + 'static,
    {
        self.order = Some(Box::new(order));
        self
    }

    /// Number of segments captured by this sequence.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Start a traversal. Sequences are restartable: every call begins a
    /// fresh pass over the same snapshot.
    pub fn iter(&self) -> SeqIter<'_, E> {
        match &self.order {
            None => SeqIter {
                inner: Inner::Plain(self.items.iter()),
            },
            Some(order) => {
                let mut perm: Vec<usize> = (0..self.items.len()).collect();
                perm.sort_by(|&a, &b| order(&self.items[a], &self.items[b]));
                SeqIter {
                    inner: Inner::Permuted {
                        items: &self.items,
                        perm: perm.into_iter(),
                    },
                }
            }
        }
    }

    /// Collect the sequence, in traversal order, into an owned vector.
    pub fn to_vec(&self) -> Vec<Segment<Position, E>> {
        self.iter().cloned().collect()
    }
}

impl<E> fmt::Debug for SegmentSeq<E>
where
    E: Eq + Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentSeq")
            .field("items", &self.items)
            .field("ordered", &self.order.is_some())
            .finish()
    }
}

/// A single traversal over a [`SegmentSeq`].
pub struct SeqIter<'a, E>
where
    E: Eq + Clone + Send + Sync + 'a,
{
    inner: Inner<'a, E>,
}

enum Inner<'a, E>
where
    E: Eq + Clone + Send + Sync + 'a,
{
    Plain(slice::Iter<'a, Segment<Position, E>>),
    Permuted {
        items: &'a [Segment<Position, E>],
        perm: std::vec::IntoIter<usize>,
    },
}

impl<'a, E> Iterator for SeqIter<'a, E>
where
    E: Eq + Clone + Send + Sync + 'a,
{
    type Item = &'a Segment<Position, E>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Plain(it) => it.next(),
            Inner::Permuted { items, perm } => perm.next().map(|i| &items[i]),
        }
    }
}

impl<'a, E> IntoIterator for &'a SegmentSeq<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    type Item = &'a Segment<Position, E>;
    type IntoIter = SeqIter<'a, E>;

    fn into_iter(self) -> SeqIter<'a, E> {
        self.iter()
    }
}
