//! Coordinated frame scheduler.
//!
//! A single [`GlobalManager`] per thread batches work from every surface into six ordered
//! stages (`READ_1`, `WRITE_1`, `READ_2`, `WRITE_2`, `READ_3`, `WRITE_3`). Entities queue
//! callbacks per stage; each engine drains the callbacks of its own entities when the stage
//! runs. Read stages are for layout queries, write stages for mutation, so no surface forces a
//! layout in the middle of another surface's writes.
//!
//! The platform drives the loop through a [`FrameDriver`]; [`ManualDriver`] serves tests and
//! headless use.

mod driver;
mod manager;
mod queue;
mod registry;
mod stage;

pub use driver::{FrameDriver, ManualDriver};
pub use manager::{global, GlobalManager, QueueHandle};
pub use queue::{QueueEntry, StageCallback, StageQueue, UpdateKey};
pub use registry::ObjectTable;
pub use stage::Stage;
