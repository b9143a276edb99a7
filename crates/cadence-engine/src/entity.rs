//! Schedulable entities.
//!
//! An [`Entity`] is a cheap, clonable handle addressed by [`EntityId`]. It is bound to at most
//! one engine for its whole life; entities without an engine live in the scheduler's ownerless
//! partition and their queued work is run by the scheduler directly.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::coords::Vec2;
use crate::id::{EngineId, EntityId};
use crate::scheduler::{global, QueueHandle, Stage, UpdateKey};
use crate::surface::Engine;
use crate::time::FrameTime;

/// Placement of an entity inside its engine's world: `world = local * scale + translation`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec2,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn local_from_world(self, world: Vec2) -> Vec2 {
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        (world - self.translation) / scale
    }

    pub fn world_from_local(self, local: Vec2) -> Vec2 {
        local * self.scale + self.translation
    }
}

struct EntityInner {
    id: EntityId,
    owner: Option<(EngineId, Weak<Engine>)>,
    transform: Cell<Transform>,
}

/// Handle to a schedulable object.
#[derive(Clone)]
pub struct Entity {
    inner: Rc<EntityInner>,
}

impl Entity {
    /// Creates an entity bound to `owner` (or ownerless) and registers it with the scheduler.
    pub fn new(owner: Option<&Rc<Engine>>) -> Self {
        let manager = global();
        let owner = owner.map(|engine| (manager.engine_id(engine), Rc::downgrade(engine)));
        let entity = Self {
            inner: Rc::new(EntityInner {
                id: EntityId(manager.next_global_id()),
                owner,
                transform: Cell::new(Transform::default()),
            }),
        };
        manager.register_object(&entity);
        entity
    }

    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    pub fn owner_id(&self) -> Option<EngineId> {
        self.inner.owner.as_ref().map(|(id, _)| *id)
    }

    /// The owning engine, if it is still alive.
    pub fn engine(&self) -> Option<Rc<Engine>> {
        self.inner.owner.as_ref().and_then(|(_, e)| e.upgrade())
    }

    pub fn transform(&self) -> Transform {
        self.inner.transform.get()
    }

    pub fn set_transform(&self, transform: Transform) {
        self.inner.transform.set(transform);
    }

    pub fn translate(&self, by: Vec2) {
        let mut t = self.inner.transform.get();
        t.translation = t.translation + by;
        self.inner.transform.set(t);
    }

    /// Removes the entity from the scheduler's registry. Work already queued still runs.
    pub fn detach(&self) -> bool {
        global().unregister_object(self)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.inner.id)
            .field("owner", &self.owner_id())
            .field("transform", &self.inner.transform.get())
            .finish()
    }
}

/// Anything that carries an [`Entity`] and can queue per-stage work through it.
pub trait Schedulable {
    fn entity(&self) -> &Entity;

    /// Queues `callback` at `stage` under a fresh key.
    fn queue_update<F>(&self, stage: Stage, callback: F) -> QueueHandle
    where
        Self: Sized,
        F: FnOnce(&FrameTime) + 'static,
    {
        global().queue_update(stage, self.entity(), None, Box::new(callback))
    }

    /// Queues `callback` at `stage` under `key`, merging with earlier work under the same key.
    fn queue_update_keyed<K, F>(&self, stage: Stage, key: K, callback: F) -> QueueHandle
    where
        Self: Sized,
        K: Into<UpdateKey>,
        F: FnOnce(&FrameTime) + 'static,
    {
        global().queue_update(stage, self.entity(), Some(key.into()), Box::new(callback))
    }
}

impl Schedulable for Entity {
    fn entity(&self) -> &Entity {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::scheduler::GlobalManager;

    #[test]
    fn ids_are_unique_and_owner_is_recorded() {
        GlobalManager::reset();
        let e = Engine::new(EngineConfig::default());
        e.register();
        let a = Entity::new(Some(&e));
        let b = Entity::new(None);

        assert_ne!(a.id(), b.id());
        assert_eq!(a.owner_id(), e.id());
        assert_eq!(b.owner_id(), None);
        assert!(a.engine().is_some());
    }

    #[test]
    fn entities_are_registered_in_their_owner_partition() {
        GlobalManager::reset();
        let e = Engine::new(EngineConfig::default());
        e.register();
        let a = Entity::new(Some(&e));

        let table = global().object_table(Some(&e), false).expect("partition exists");
        assert!(table.borrow().contains(a.id()));
        assert!(a.detach());
        assert!(!a.detach());
    }

    #[test]
    fn transform_maps_between_world_and_local() {
        let t = Transform {
            translation: Vec2::new(10.0, 20.0),
            scale: 2.0,
        };
        let local = t.local_from_world(Vec2::new(30.0, 20.0));
        assert_eq!(local, Vec2::new(10.0, 0.0));
        assert_eq!(t.world_from_local(local), Vec2::new(30.0, 20.0));
    }
}
