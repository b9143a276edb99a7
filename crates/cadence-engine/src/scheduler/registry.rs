use std::collections::HashMap;

use crate::entity::Entity;
use crate::id::EntityId;

/// One registry partition: the entities owned by a single engine, or the ownerless entities
/// bound only to the global context.
#[derive(Debug, Default)]
pub struct ObjectTable {
    objects: HashMap<EntityId, Entity>,
}

impl ObjectTable {
    pub fn insert(&mut self, entity: Entity) -> bool {
        self.objects.insert(entity.id(), entity).is_none()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.objects.keys().copied()
    }
}
