//! Library error type.
//!
//! Most misuse in the scheduler and input layer is logged and ignored so that one stale entity
//! cannot stop the shared frame loop. The variants here cover the cases where continuing would
//! corrupt shared state, plus hook failures caught by the frame loop's error boundary.

use crate::id::{EngineId, EntityId};
use crate::scheduler::Stage;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A stage name did not match any of `READ_1` … `WRITE_3`.
    #[error("unknown stage name {0:?}; expected READ_1..READ_3 or WRITE_1..WRITE_3")]
    UnknownStage(String),

    /// An operation needs the entity's owning engine but the entity was never assigned one.
    #[error("{entity} has no owning engine; bind it to an engine before attaching input")]
    Unowned { entity: EntityId },

    /// The engine has no registration record (never registered, or already unregistered).
    #[error("{engine} is not registered with the scheduler")]
    EngineNotRegistered { engine: EngineId },

    /// `add_callback` on a queue entry whose stage already drained.
    #[error("queue entry for {entity} at {stage} was already consumed")]
    EntryConsumed { entity: EntityId, stage: Stage },

    /// A panic escaped an engine hook; the frame loop contained it.
    #[error("{engine} panicked during {phase}: {message}")]
    HookPanicked {
        engine: EngineId,
        phase: String,
        message: String,
    },

    /// A panic escaped a callback of an ownerless entity.
    #[error("ownerless work panicked during {stage}: {message}")]
    OwnerlessPanicked { stage: Stage, message: String },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
