use std::cell::Cell;
use std::rc::Rc;

/// Platform per-frame callback.
///
/// The scheduler asks for the next frame at the end of every tick while engines are registered,
/// and cancels once the last engine leaves. The platform answers by calling
/// [`super::GlobalManager::tick`] when the frame is due.
pub trait FrameDriver {
    fn request_frame(&self);

    fn cancel_frame(&self) {}
}

/// Driver for headless use and tests: records requests, the caller ticks by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualDriver {
    pending: Rc<Cell<bool>>,
    requests: Rc<Cell<u64>>,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame is currently requested.
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Clears and returns the pending flag.
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }

    /// Total number of requests seen.
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}

impl FrameDriver for ManualDriver {
    fn request_frame(&self) {
        self.pending.set(true);
        self.requests.set(self.requests.get() + 1);
    }

    fn cancel_frame(&self) {
        self.pending.set(false);
    }
}
