use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use segstore_core::{Position, Result, Segment, StoreError};
use segstore_index::{IndexKind, OverlapIndex, build_index};
use segstore_io::PayloadCodec;

use crate::store::SegmentStore;
use crate::view::SegmentSeq;

enum State<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    /// Single-writer phase: insertions go to a provisional buffer, queries
    /// take a slow path over it.
    Building(Vec<Segment<Position, E>>),
    /// Published phase: the index is immutable and shared by readers.
    Queryable(Box<dyn OverlapIndex<Position, E>>),
    Disposed,
}

type PersistFn<E> =
    Box<dyn Fn(&Path, &[Segment<Position, E>]) -> segstore_io::Result<()> + Send + Sync>;

/// Where and how a store writes its durable snapshot. Installed only by
/// the codec-aware constructors, so persistence stays a per-payload
/// capability instead of a universal bound.
struct SnapshotTarget<E> {
    path: PathBuf,
    write: PersistFn<E>,
}

/// The in-memory segment store.
///
/// All state sits behind one `RwLock`: insertions and lifecycle
/// transitions take the write lock, queries take the read lock and return
/// eager snapshots, so a query result never borrows index memory past its
/// read guard. Releasing the write lock at finalize doubles as the
/// publication barrier - every insertion accepted before the transition is
/// visible to every reader after it, and teardown waits for in-flight
/// queries the same way.
///
/// # Examples
///
/// ```
/// use segstore::{IndexKind, MemStore, Segment, SegmentStore};
///
/// let store = MemStore::new(IndexKind::Flat);
/// store.add(Segment::new(100i64, 250, "sys_read")).unwrap();
/// store.finalize().unwrap();
/// assert_eq!(store.intersecting(200).unwrap().len(), 1);
/// ```
pub struct MemStore<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    state: RwLock<State<E>>,
    kind: IndexKind,
    snapshot: Option<SnapshotTarget<E>>,
}

impl<E> MemStore<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    /// A memory-only store over the selected index backend. Its
    /// [`close`](SegmentStore::close) never touches disk.
    pub fn new(kind: IndexKind) -> Self {
        Self {
            state: RwLock::new(State::Building(Vec::new())),
            kind,
            snapshot: None,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State<E>> {
        // a poisoned lock only means a writer panicked; the state enum
        // itself is always structurally valid
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State<E>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn content(state: &State<E>) -> Result<Vec<Segment<Position, E>>> {
        match state {
            State::Building(buffer) => Ok(buffer.clone()),
            State::Queryable(index) => Ok(index.iter().cloned().collect()),
            State::Disposed => Err(StoreError::Disposed),
        }
    }
}

impl<E> MemStore<E>
where
    E: PayloadCodec + Eq + Clone + Send + Sync + 'static,
{
    /// A store that will write its content to `path` on
    /// [`close(true)`](SegmentStore::close).
    pub fn with_snapshot(kind: IndexKind, path: impl Into<PathBuf>) -> Self {
        Self {
            state: RwLock::new(State::Building(Vec::new())),
            kind,
            snapshot: Some(SnapshotTarget {
                path: path.into(),
                write: Box::new(|path, segments| segstore_io::write_segments(path, segments)),
            }),
        }
    }

    /// Reconstruct a queryable store from a snapshot written by an earlier
    /// session. Overlap query results are set-equal to the original
    /// store's for every range.
    pub fn open(kind: IndexKind, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let segments = segstore_io::read_segments(&path)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        Ok(Self {
            state: RwLock::new(State::Queryable(build_index(kind, segments))),
            kind,
            snapshot: Some(SnapshotTarget {
                path,
                write: Box::new(|path, segments| segstore_io::write_segments(path, segments)),
            }),
        })
    }
}

impl<E> SegmentStore<E> for MemStore<E>
where
    E: Eq + Clone + Send + Sync + 'static,
{
    fn add(&self, segment: Segment<Position, E>) -> Result<()> {
        let mut state = self.write_state();
        match &mut *state {
            State::Building(buffer) => {
                if !segment.is_well_formed() {
                    return Err(StoreError::InvalidSegment(
                        segment.start.to_string(),
                        segment.end.to_string(),
                    ));
                }
                buffer.push(segment);
                Ok(())
            }
            State::Queryable(_) => Err(StoreError::Sealed),
            State::Disposed => Err(StoreError::Disposed),
        }
    }

    fn add_all(&self, segments: Vec<Segment<Position, E>>) -> Result<()> {
        let mut state = self.write_state();
        match &mut *state {
            State::Building(buffer) => {
                // validate the whole batch before touching the buffer
                if let Some(bad) = segments.iter().find(|s| !s.is_well_formed()) {
                    return Err(StoreError::InvalidSegment(
                        bad.start.to_string(),
                        bad.end.to_string(),
                    ));
                }
                buffer.extend(segments);
                Ok(())
            }
            State::Queryable(_) => Err(StoreError::Sealed),
            State::Disposed => Err(StoreError::Disposed),
        }
    }

    fn len(&self) -> Result<usize> {
        match &*self.read_state() {
            State::Building(buffer) => Ok(buffer.len()),
            State::Queryable(index) => Ok(index.len()),
            State::Disposed => Err(StoreError::Disposed),
        }
    }

    fn intersecting_range(&self, start: Position, end: Position) -> Result<SegmentSeq<E>> {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        match &*self.read_state() {
            State::Building(buffer) => Ok(SegmentSeq::unordered(
                buffer
                    .iter()
                    .filter(|s| s.overlaps(start, end))
                    .cloned()
                    .collect(),
            )),
            State::Queryable(index) => Ok(SegmentSeq::unordered(index.find(start, end))),
            State::Disposed => Err(StoreError::Disposed),
        }
    }

    fn finalize(&self) -> Result<()> {
        let mut state = self.write_state();
        match std::mem::replace(&mut *state, State::Disposed) {
            State::Building(buffer) => {
                *state = State::Queryable(build_index(self.kind, buffer));
                Ok(())
            }
            queryable @ State::Queryable(_) => {
                *state = queryable;
                Ok(())
            }
            State::Disposed => Err(StoreError::Disposed),
        }
    }

    fn dispose(&self) {
        let mut state = self.write_state();
        *state = State::Disposed;
    }

    fn close(&self, persist: bool) -> Result<()> {
        let mut state = self.write_state();
        if matches!(&*state, State::Disposed) {
            return Err(StoreError::Disposed);
        }
        if persist {
            if let Some(target) = &self.snapshot {
                let content = Self::content(&state)?;
                (target.write)(&target.path, &content)
                    .map_err(|e| StoreError::Persistence(e.to_string()))?;
            }
        } else if let Some(target) = &self.snapshot {
            match std::fs::remove_file(&target.path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Persistence(e.to_string())),
            }
        }
        *state = State::Disposed;
        Ok(())
    }
}
