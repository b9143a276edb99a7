//! Explicit identifiers.
//!
//! Registries are keyed by allocated ids rather than by object identity. Entity, listener and
//! subscriber ids come from the scheduler's global token counter
//! ([`crate::scheduler::GlobalManager::next_global_id`]); engine ids are sequential and assigned
//! the first time the scheduler sees an engine.

use std::fmt;

/// Sequential id of a registered surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EngineId(pub u32);

/// Id of a schedulable entity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId(pub u64);

/// Id of an [`crate::input::InputControl`] listener.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ListenerId(pub u64);

/// Caller-chosen id of a coordinator subscription. Re-using an id replaces the subscription.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SubscriberId(pub u64);

/// Platform pointer id (mouse, pen or one touch contact).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PointerId(pub u64);

impl PointerId {
    /// Id used for the (single) mouse pointer.
    pub const MOUSE: PointerId = PointerId(0);
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
