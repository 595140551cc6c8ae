use crate::error::{ShelfError, ShelfResult};
use shelf_types::Record;

/// Ordered, position-addressed collection of records.
///
/// Positions are always the contiguous range `[0, len)`. Appends land at the
/// end; removing a record shifts every later record down by one, so there are
/// never gaps. Bounds are checked before any mutation, so a failed `get` or
/// `remove` leaves the store exactly as it was.
///
/// Positions are signed at this boundary: a negative position is out of
/// bounds, never a wrap-around index from the end.
///
/// ```rust
/// use shelf_core::store::IndexedCollectionStore;
/// use shelf_types::Record;
///
/// let mut store = IndexedCollectionStore::new();
/// store.append(Record::new().with_field("name", "Jon"));
/// store.append(Record::new().with_field("name", "Linda"));
///
/// let removed = store.remove(0).unwrap();
/// assert_eq!(removed.get("name").and_then(|v| v.as_str()), Some("Jon"));
/// assert_eq!(store.get(0).unwrap().get("name").and_then(|v| v.as_str()), Some("Linda"));
/// assert!(store.get(-1).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndexedCollectionStore {
    records: Vec<Record>,
}

impl IndexedCollectionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Create an empty store with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self { records: Vec::with_capacity(capacity) }
    }

    /// Append a record and return its position (the length before insert).
    pub fn append(&mut self, record: Record) -> usize {
        let position = self.records.len();
        self.records.push(record);
        position
    }

    /// Borrow the record at `position`.
    pub fn get(&self, position: i64) -> ShelfResult<&Record> {
        let index = self.check_bounds(position)?;
        Ok(&self.records[index])
    }

    /// Remove and return the record at `position`, closing the gap.
    pub fn remove(&mut self, position: i64) -> ShelfResult<Record> {
        let index = self.check_bounds(position)?;
        Ok(self.records.remove(index))
    }

    /// Snapshot of every record in insertion order.
    pub fn list(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Number of stored records; positions run `0..len`
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check_bounds(&self, position: i64) -> ShelfResult<usize> {
        usize::try_from(position)
            .ok()
            .filter(|index| *index < self.records.len())
            .ok_or_else(|| ShelfError::out_of_bounds(position, self.records.len()))
    }
}

impl FromIterator<Record> for IndexedCollectionStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}
