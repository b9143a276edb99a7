//! Ordered handler lists with disposers.
//!
//! `on(event, handler)` registration used by engines and input controls. Handlers run in
//! registration order; disposing removes one handler without disturbing the others.
//! Emission works on a snapshot, so a handler may register or dispose handlers (including
//! itself) while being invoked.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

struct Slots<E> {
    next: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

/// Shared, ordered list of `Fn(&E)` handlers.
pub struct HandlerList<E> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E> Clone for HandlerList<E> {
    fn clone(&self) -> Self {
        Self { slots: Rc::clone(&self.slots) }
    }
}

impl<E: 'static> HandlerList<E> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots { next: 0, handlers: Vec::new() })),
        }
    }

    /// Appends `handler`; the returned [`Disposer`] removes it again.
    pub fn add<F>(&self, handler: F) -> Disposer
    where
        F: Fn(&E) + 'static,
    {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next;
            slots.next += 1;
            slots.handlers.push((id, Rc::new(handler)));
            id
        };

        let weak: Weak<RefCell<Slots<E>>> = Rc::downgrade(&self.slots);
        Disposer::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.borrow_mut().handlers.retain(|(h, _)| *h != id);
            }
        })
    }

    /// Invokes every handler registered at the time of the call, in order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Handler<E>> = self
            .slots
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        for handler in snapshot {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.borrow_mut().handlers.clear();
    }
}

impl<E: 'static> Default for HandlerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes a registered handler when [`Disposer::dispose`] is called.
///
/// Dropping a disposer without calling `dispose` leaves the handler registered.
pub struct Disposer {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Disposer {
    pub(crate) fn new(remove: impl FnOnce() + 'static) -> Self {
        Self { remove: Some(Box::new(remove)) }
    }

    pub fn dispose(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("armed", &self.remove.is_some())
            .finish()
    }
}
