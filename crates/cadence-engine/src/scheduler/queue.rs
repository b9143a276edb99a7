use std::collections::HashMap;
use std::fmt;

use crate::id::{EngineId, EntityId};
use crate::time::FrameTime;

/// Work queued for one stage. Runs exactly once.
pub type StageCallback = Box<dyn FnOnce(&FrameTime)>;

/// Coalescing key for a queued update.
///
/// Updates queued by the same entity, in the same stage, under the same key are merged into one
/// entry whose callbacks run in insertion order.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum UpdateKey {
    Named(String),
    /// Fresh token; never collides with another update.
    Token(u64),
}

impl From<&str> for UpdateKey {
    fn from(s: &str) -> Self {
        UpdateKey::Named(s.to_string())
    }
}

impl From<String> for UpdateKey {
    fn from(s: String) -> Self {
        UpdateKey::Named(s)
    }
}

/// One keyed entry of a stage queue.
pub struct QueueEntry {
    entity: EntityId,
    key: UpdateKey,
    callbacks: Vec<StageCallback>,
}

impl QueueEntry {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn key(&self) -> &UpdateKey {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn add_callback(&mut self, callback: StageCallback) {
        self.callbacks.push(callback);
    }

    /// Consumes the entry, running its callbacks in order.
    pub fn run(self, time: &FrameTime) {
        for callback in self.callbacks {
            callback(time);
        }
    }
}

impl fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEntry")
            .field("entity", &self.entity)
            .field("key", &self.key)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[derive(Debug)]
struct EntityBucket {
    owner: Option<EngineId>,
    entries: Vec<QueueEntry>,
}

/// All work queued for one stage of one frame, grouped by entity.
///
/// Entries of one entity keep insertion order; there is no ordering between entities.
/// The scheduler swaps in a fresh queue when a stage starts, so anything queued while the stage
/// runs lands in the next frame.
#[derive(Debug, Default)]
pub struct StageQueue {
    buckets: HashMap<EntityId, EntityBucket>,
}

impl StageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `callback` under (`entity`, `key`), merging with an existing entry.
    pub fn insert(
        &mut self,
        entity: EntityId,
        owner: Option<EngineId>,
        key: UpdateKey,
        callback: StageCallback,
    ) {
        let bucket = self
            .buckets
            .entry(entity)
            .or_insert_with(|| EntityBucket { owner, entries: Vec::new() });

        match bucket.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.add_callback(callback),
            None => bucket.entries.push(QueueEntry {
                entity,
                key,
                callbacks: vec![callback],
            }),
        }
    }

    pub fn entry_mut(&mut self, entity: EntityId, key: &UpdateKey) -> Option<&mut QueueEntry> {
        self.buckets
            .get_mut(&entity)?
            .entries
            .iter_mut()
            .find(|e| &e.key == key)
    }

    /// Removes and returns every entry whose entity belongs to `owner`
    /// (`None` selects ownerless entities).
    pub fn take_owned_by(&mut self, owner: Option<EngineId>) -> Vec<QueueEntry> {
        let ids: Vec<EntityId> = self
            .buckets
            .iter()
            .filter(|(_, b)| b.owner == owner)
            .map(|(id, _)| *id)
            .collect();

        ids.into_iter()
            .filter_map(|id| self.buckets.remove(&id))
            .flat_map(|b| b.entries)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn callback_count(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|b| b.entries.iter())
            .map(QueueEntry::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> StageCallback {
        let log = Rc::clone(log);
        Box::new(move |_| log.borrow_mut().push(tag))
    }

    #[test]
    fn same_key_coalesces_into_one_entry() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut q = StageQueue::new();
        q.insert(EntityId(1), None, "layout".into(), recorder(&log, "a"));
        q.insert(EntityId(1), None, "layout".into(), recorder(&log, "b"));

        assert_eq!(q.entity_count(), 1);
        assert_eq!(q.callback_count(), 2);

        let entries = q.take_owned_by(None);
        assert_eq!(entries.len(), 1);
        for e in entries {
            e.run(&FrameTime::synthetic(0, 0.0));
        }
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn distinct_tokens_do_not_coalesce() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut q = StageQueue::new();
        q.insert(EntityId(1), None, UpdateKey::Token(1), recorder(&log, "a"));
        q.insert(EntityId(1), None, UpdateKey::Token(2), recorder(&log, "b"));
        assert_eq!(q.take_owned_by(None).len(), 2);
    }

    #[test]
    fn take_owned_by_leaves_other_engines_alone() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut q = StageQueue::new();
        q.insert(EntityId(1), Some(EngineId(1)), UpdateKey::Token(1), recorder(&log, "e1"));
        q.insert(EntityId(2), Some(EngineId(2)), UpdateKey::Token(2), recorder(&log, "e2"));

        let taken = q.take_owned_by(Some(EngineId(1)));
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].entity(), EntityId(1));
        assert_eq!(q.entity_count(), 1);
    }

    #[test]
    fn late_callbacks_append_to_existing_entry() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut q = StageQueue::new();
        let key = UpdateKey::from("measure");
        q.insert(EntityId(9), None, key.clone(), recorder(&log, "first"));
        q.entry_mut(EntityId(9), &key)
            .expect("entry exists")
            .add_callback(recorder(&log, "late"));

        for e in q.take_owned_by(None) {
            e.run(&FrameTime::synthetic(0, 0.0));
        }
        assert_eq!(*log.borrow(), vec!["first", "late"]);
    }
}
