//! Entity persistence.
//!
//! Reducers never write to a [`Store`] directly: they stage changes in a
//! [`Batch`] which is committed once the whole event has been reduced, so an
//! event that is skipped or fails leaves the store untouched.

use std::collections::HashMap;

use crate::entity::{Entity, EntityKind, Record};

/// Key-value persistence with a separate id namespace per entity type.
pub trait Store {
    fn get(&self, kind: EntityKind, id: &str) -> Option<&Record>;

    fn put(&mut self, record: Record);

    /// Deletes the record, returning whether it existed.
    fn delete(&mut self, kind: EntityKind, id: &str) -> bool;

    fn load<E: Entity>(&self, id: &str) -> Option<E>
    where
        Self: Sized,
    {
        self.get(E::KIND, id).and_then(E::from_record).cloned()
    }

    fn save<E: Entity>(&mut self, entity: E)
    where
        Self: Sized,
    {
        self.put(entity.into_record())
    }

    fn remove<E: Entity>(&mut self, id: &str) -> bool
    where
        Self: Sized,
    {
        self.delete(E::KIND, id)
    }
}

/// In-memory [`Store`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: HashMap<(EntityKind, String), Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of stored entities of the given type.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.records.keys().filter(|(k, _)| *k == kind).count()
    }

    /// All stored entities of one type, in no particular order.
    pub fn all<'a, E: Entity + 'a>(&'a self) -> impl Iterator<Item = &'a E> {
        self.records
            .iter()
            .filter(|((kind, _), _)| *kind == E::KIND)
            .filter_map(|(_, record)| E::from_record(record))
    }
}

impl Store for MemoryStore {
    fn get(&self, kind: EntityKind, id: &str) -> Option<&Record> {
        self.records.get(&(kind, id.to_string()))
    }

    fn put(&mut self, record: Record) {
        self.records
            .insert((record.kind(), record.id().to_string()), record);
    }

    fn delete(&mut self, kind: EntityKind, id: &str) -> bool {
        self.records.remove(&(kind, id.to_string())).is_some()
    }
}

#[derive(Clone, Debug)]
enum Op {
    Put(Record),
    Delete(EntityKind, String),
}

impl Op {
    fn matches(&self, kind: EntityKind, id: &str) -> bool {
        match self {
            Op::Put(record) => record.kind() == kind && record.id() == id,
            Op::Delete(k, i) => *k == kind && i == id,
        }
    }
}

/// Writes of a single event, staged on top of a store.
///
/// Loads observe staged writes. Dropping the batch without calling
/// [`Batch::commit`] discards everything.
#[derive(Debug)]
pub struct Batch<'s, S: Store> {
    store: &'s mut S,
    ops: Vec<Op>,
}

impl<'s, S: Store> Batch<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store, ops: vec![] }
    }

    pub fn load<E: Entity>(&self, id: &str) -> Option<E> {
        match self.ops.iter().rev().find(|op| op.matches(E::KIND, id)) {
            Some(Op::Put(record)) => E::from_record(record).cloned(),
            Some(Op::Delete(..)) => None,
            None => self.store.load(id),
        }
    }

    pub fn exists<E: Entity>(&self, id: &str) -> bool {
        match self.ops.iter().rev().find(|op| op.matches(E::KIND, id)) {
            Some(op) => matches!(op, Op::Put(_)),
            None => self.store.get(E::KIND, id).is_some(),
        }
    }

    pub fn save<E: Entity>(&mut self, entity: E) {
        self.ops.push(Op::Put(entity.into_record()));
    }

    pub fn remove<E: Entity>(&mut self, id: &str) {
        self.ops.push(Op::Delete(E::KIND, id.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Applies staged writes in order, returning the number of writes.
    pub fn commit(self) -> usize {
        let writes = self.ops.len();
        for op in self.ops {
            match op {
                Op::Put(record) => self.store.put(record),
                Op::Delete(kind, id) => {
                    self.store.delete(kind, &id);
                }
            }
        }
        writes
    }
}
