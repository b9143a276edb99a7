use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::config::DragLimit;
use crate::coords::Vec2;
use crate::id::{EngineId, ListenerId, PointerId, SubscriberId};
use crate::scheduler::global;
use crate::surface::Engine;

use super::control::InputControl;
use super::event::{
    DragEndPayload, DragPayload, DragStartPayload, InputEvent, InputEventKind, PinchPayload,
    Position, ReleaseReason,
};
use super::gesture::{
    DragGesture, Gesture, GestureKey, GestureState, GestureTable, PinchGesture, PinchSnapshot,
};
use super::pointer::{PointerRecord, PointerTable};
use super::types::{RawPointerEvent, RawPointerKind};

/// Subscriber callback: receives the id of the engine whose frame the event is expressed in.
pub type SubscriberFn = Rc<dyn Fn(EngineId, &InputEvent)>;

struct Subscription {
    id: SubscriberId,
    /// `None` delivers once per registered engine.
    scope: Option<Weak<Engine>>,
    callback: SubscriberFn,
}

type Delivery = (Rc<InputControl>, InputEvent);

/// Per-engine gesture coordinator.
///
/// Owns the pointer and gesture tables shared by every input control of its engine, resolves
/// listener ids to controls, and re-broadcasts global and pinch events to subscribers. Handlers
/// never run while the tables are borrowed: events are collected first, then delivered.
pub struct GlobalInputControl {
    engine_id: EngineId,
    engine: Weak<Engine>,
    drag_limit: Cell<DragLimit>,
    pointers: RefCell<PointerTable>,
    gestures: RefCell<GestureTable>,
    listeners: RefCell<HashMap<ListenerId, Weak<InputControl>>>,
    subscribers: RefCell<HashMap<InputEventKind, Vec<Subscription>>>,
}

impl GlobalInputControl {
    pub(crate) fn new(engine_id: EngineId, engine: &Rc<Engine>) -> Self {
        Self {
            engine_id,
            engine: Rc::downgrade(engine),
            drag_limit: Cell::new(engine.config().max_simultaneous_drags),
            pointers: RefCell::new(PointerTable::default()),
            gestures: RefCell::new(GestureTable::default()),
            listeners: RefCell::new(HashMap::new()),
            subscribers: RefCell::new(HashMap::new()),
        }
    }

    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    pub fn drag_limit(&self) -> DragLimit {
        self.drag_limit.get()
    }

    /// Takes effect on the next drag that starts.
    pub fn set_drag_limit(&self, limit: DragLimit) {
        self.drag_limit.set(limit);
    }

    // ── listeners ─────────────────────────────────────────────────────────

    pub(crate) fn enroll(&self, control: &Rc<InputControl>) {
        self.listeners
            .borrow_mut()
            .insert(control.id(), Rc::downgrade(control));
    }

    pub(crate) fn forget(&self, listener: ListenerId) {
        self.listeners.borrow_mut().remove(&listener);
    }

    pub fn resolve(&self, listener: ListenerId) -> Option<Rc<InputControl>> {
        self.listeners
            .borrow()
            .get(&listener)
            .and_then(Weak::upgrade)
    }

    fn resolve_all(&self, listeners: &[ListenerId]) -> Vec<Rc<InputControl>> {
        listeners.iter().filter_map(|id| self.resolve(*id)).collect()
    }

    // ── table queries ─────────────────────────────────────────────────────

    pub fn pointer(&self, pointer: PointerId) -> Option<PointerRecord> {
        self.pointers.borrow().get(pointer).cloned()
    }

    pub fn is_tracked(&self, pointer: PointerId) -> bool {
        self.pointers.borrow().contains(pointer)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.borrow().len()
    }

    pub fn gesture(&self, key: &GestureKey) -> Option<Gesture> {
        self.gestures.borrow().get(key).cloned()
    }

    pub fn gesture_count(&self) -> usize {
        self.gestures.borrow().len()
    }

    pub fn drag_count(&self) -> usize {
        self.gestures.borrow().drag_count()
    }

    pub fn drag_members(&self, pointer: PointerId) -> Option<Vec<ListenerId>> {
        self.gestures
            .borrow()
            .drag(pointer)
            .map(|d| d.members.clone())
    }

    /// Whether `listener` pressed `pointer` or is a member of its drag.
    pub(crate) fn is_involved(&self, pointer: PointerId, listener: ListenerId) -> bool {
        let owner = self
            .pointers
            .borrow()
            .get(pointer)
            .is_some_and(|r| r.owner == listener);
        owner
            || self
                .gestures
                .borrow()
                .drag(pointer)
                .is_some_and(|d| d.members.contains(&listener))
    }

    // ── pointer table ─────────────────────────────────────────────────────

    pub(crate) fn press(&self, listener: ListenerId, ev: &RawPointerEvent) {
        self.pointers.borrow_mut().press(
            ev.pointer,
            listener,
            ev.screen,
            ev.timestamp_ms,
            ev.button(),
        );
        log::trace!("pointer {} down via {listener}", ev.pointer);
    }

    fn move_pointer(&self, pointer: PointerId, at: Vec2) -> bool {
        self.pointers.borrow_mut().move_to(pointer, at)
    }

    /// Applies the table side of a raw event once every listener has seen it: a move advances
    /// the pointer and dispatches on behalf of its owner, up and cancel release it.
    pub(crate) fn complete(&self, ev: &RawPointerEvent) {
        match ev.kind {
            RawPointerKind::Move => {
                let Some(owner) = self.pointers.borrow().get(ev.pointer).map(|r| r.owner) else {
                    return;
                };
                if self.move_pointer(ev.pointer, ev.screen) {
                    self.dispatch_move(owner);
                }
            }
            RawPointerKind::Up(_) => self.finalize(ev.pointer, ev.screen, ReleaseReason::Up),
            RawPointerKind::Cancel => self.finalize(ev.pointer, ev.screen, ReleaseReason::Cancel),
            RawPointerKind::Down(_) | RawPointerKind::Wheel(_) => {}
        }
    }

    // ── drags ─────────────────────────────────────────────────────────────

    /// Creates the drag for `pointer` seeded with `listener` and `seeds`, or adds them to the
    /// existing drag. Returns whether the drag was created, and the listeners that joined.
    pub(crate) fn begin_drag(
        &self,
        pointer: PointerId,
        listener: ListenerId,
        seeds: &[ListenerId],
    ) -> (bool, Vec<ListenerId>) {
        let mut gestures = self.gestures.borrow_mut();
        let mut joined = Vec::new();
        let created = match gestures.drag_mut(pointer) {
            Some(drag) => {
                if drag.add_member(listener) {
                    joined.push(listener);
                }
                false
            }
            None => {
                gestures.insert(
                    GestureKey::Drag(pointer),
                    Gesture::Drag(DragGesture::new(pointer, listener)),
                );
                joined.push(listener);
                true
            }
        };

        if let Some(drag) = gestures.drag_mut(pointer) {
            for seed in seeds {
                if drag.add_member(*seed) {
                    joined.push(*seed);
                }
            }
        }
        (created, joined)
    }

    /// Adds `listener` to the active drag of `pointer`. Returns `false` if there is no such drag
    /// or the listener already belongs to it.
    pub(crate) fn join_drag(&self, pointer: PointerId, listener: ListenerId) -> bool {
        match self.gestures.borrow_mut().drag_mut(pointer) {
            Some(drag) if drag.state == GestureState::Active => drag.add_member(listener),
            _ => false,
        }
    }

    pub(crate) fn emit_drag_start(&self, pointer: PointerId, listeners: &[ListenerId]) {
        let Some(record) = self.pointer(pointer) else {
            return;
        };
        let batch: Vec<Delivery> = self
            .resolve_all(listeners)
            .into_iter()
            .map(|member| {
                let start = member.position(record.start);
                (member, InputEvent::DragStart(DragStartPayload { pointer, start }))
            })
            .collect();
        deliver(batch);
    }

    /// Releases the oldest drags until the limit holds. `protect` (the drag that was just
    /// created) is never chosen.
    pub(crate) fn enforce_drag_limit(&self, protect: PointerId) {
        let limit = self.drag_limit.get();
        while limit.exceeded_by(self.drag_count()) {
            let oldest = {
                let pointers = self.pointers.borrow();
                let gestures = self.gestures.borrow();
                gestures
                    .drag_pointers()
                    .into_iter()
                    .filter(|p| *p != protect)
                    .filter_map(|p| pointers.get(p))
                    .min_by(|a, b| a.cmp_press_order(b))
                    .map(|r| (r.id, r.current))
            };
            let Some((victim, at)) = oldest else {
                break;
            };
            log::debug!("drag limit {limit:?} reached; releasing pointer {victim}");
            self.finalize(victim, at, ReleaseReason::Evicted);
        }
    }

    // ── move dispatch ─────────────────────────────────────────────────────

    /// Multi-pointer dispatch after a pointer owned by `dispatcher` changed position.
    pub(crate) fn dispatch_move(&self, dispatcher: ListenerId) {
        let owned = self.pointers.borrow().owned_by(dispatcher);
        let mut batch: Vec<Delivery> = Vec::new();

        for pointer in owned {
            self.pointers.borrow_mut().bump_moves(pointer);
            let Some(record) = self.pointer(pointer) else {
                continue;
            };
            let members = match self.gestures.borrow().drag(pointer) {
                Some(d) if d.state == GestureState::Active => d.members.clone(),
                _ => continue,
            };
            for member in self.resolve_all(&members) {
                let start = member.position(record.start);
                let position = member.position(record.current);
                let ev = InputEvent::Drag(DragPayload {
                    pointer,
                    start,
                    position,
                    delta: position.delta_from(&start),
                });
                batch.push((member, ev));
            }
        }
        deliver(batch);

        if self.pointer_count() >= 2 {
            self.detect_pinches();
        }
    }

    /// Pairs adjacent pointers by press order and advances their pinch gestures.
    fn detect_pinches(&self) {
        let ordered: Vec<PointerRecord> = self
            .pointers
            .borrow()
            .by_press_order()
            .into_iter()
            .cloned()
            .collect();

        let mut transitions: Vec<(InputEventKind, PinchPayload, Vec<ListenerId>)> = Vec::new();
        for pair in ordered.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let key = GestureKey::Pinch(a.id, b.id);
            let current = PinchSnapshot::new([a.id, b.id], [a.current, b.current]);

            let mut gestures = self.gestures.borrow_mut();
            let (members, start) = match gestures.pinch_mut(&key) {
                Some(pinch) => {
                    pinch.current = current;
                    (pinch.members.clone(), pinch.start)
                }
                None => {
                    let start = PinchSnapshot::new([a.id, b.id], [a.start, b.start]);
                    let members = pinch_members(&gestures, a, b);
                    gestures.insert(
                        key,
                        Gesture::Pinch(PinchGesture {
                            state: GestureState::Active,
                            members: members.clone(),
                            start,
                            current,
                        }),
                    );
                    let payload = self.pinch_payload(key, &start, &current);
                    transitions.push((InputEventKind::PinchStart, payload, members.clone()));
                    (members, start)
                }
            };
            let payload = self.pinch_payload(key, &start, &current);
            transitions.push((InputEventKind::Pinch, payload, members));
        }

        for (kind, payload, members) in transitions {
            self.deliver_pinch(kind, payload, &members);
        }
    }

    fn pinch_payload(
        &self,
        key: GestureKey,
        start: &PinchSnapshot,
        current: &PinchSnapshot,
    ) -> PinchPayload {
        let engine = self.engine.upgrade();
        let project = |screen: Vec2| match &engine {
            Some(engine) => engine.project(screen),
            None => Position::identity(screen),
        };
        PinchPayload {
            key,
            pair: current.pair,
            positions: [project(current.screen[0]), project(current.screen[1])],
            distance: current.distance,
            start_distance: start.distance,
        }
    }

    fn deliver_pinch(&self, kind: InputEventKind, payload: PinchPayload, members: &[ListenerId]) {
        let wrap = |p: PinchPayload| match kind {
            InputEventKind::PinchStart => InputEvent::PinchStart(p),
            InputEventKind::PinchEnd => InputEvent::PinchEnd(p),
            _ => InputEvent::Pinch(p),
        };

        let batch: Vec<Delivery> = self
            .resolve_all(members)
            .into_iter()
            .map(|member| {
                let positions = [
                    member.position(payload.positions[0].screen),
                    member.position(payload.positions[1].screen),
                ];
                (member, wrap(PinchPayload { positions, ..payload }))
            })
            .collect();
        deliver(batch);
        self.broadcast(&wrap(payload));
    }

    // ── release ───────────────────────────────────────────────────────────

    /// Ends tracking of `pointer` at `end`: marks its drag released, sends `DragEnd` to every
    /// member, deletes the records, then ends pinches involving the pointer.
    /// Up, cancel and eviction all go through here.
    pub(crate) fn finalize(&self, pointer: PointerId, end: Vec2, reason: ReleaseReason) {
        if !self.is_tracked(pointer) {
            return;
        }
        // Already ending: a DragEnd handler released the pointer again.
        if matches!(self.gestures.borrow().drag(pointer), Some(d) if d.state == GestureState::Release) {
            return;
        }
        self.pointers.borrow_mut().set_end(pointer, end);
        let Some(record) = self.pointer(pointer) else {
            return;
        };

        let members = match self.gestures.borrow_mut().drag_mut(pointer) {
            Some(drag) => {
                drag.state = GestureState::Release;
                drag.members.clone()
            }
            None => Vec::new(),
        };

        let batch: Vec<Delivery> = self
            .resolve_all(&members)
            .into_iter()
            .map(|member| {
                let ev = InputEvent::DragEnd(DragEndPayload {
                    pointer,
                    start: member.position(record.start),
                    end: member.position(end),
                    reason,
                });
                (member, ev)
            })
            .collect();
        deliver(batch);

        self.pointers.borrow_mut().remove(pointer);
        let key = GestureKey::Drag(pointer);
        let released = matches!(self.gestures.borrow().get(&key), Some(g) if g.state() == GestureState::Release);
        if released {
            self.gestures.borrow_mut().remove(&key);
        }
        log::trace!("pointer {pointer} released ({reason:?})");

        let pinches = self.gestures.borrow_mut().take_pinches_involving(pointer);
        for (key, mut pinch) in pinches {
            pinch.state = GestureState::Release;
            let payload = self.pinch_payload(key, &pinch.start, &pinch.current);
            self.deliver_pinch(InputEventKind::PinchEnd, payload, &pinch.members);
        }
    }

    /// Drops every tracked pointer and gesture without emitting anything.
    pub fn clear(&self) {
        self.pointers.borrow_mut().clear();
        self.gestures.borrow_mut().clear();
    }

    // ── subscriptions ─────────────────────────────────────────────────────

    /// Subscribes `callback` to `kind`. With `scope` the event is re-projected into that engine;
    /// without it the callback runs once per registered engine. Re-using `id` replaces the
    /// earlier subscription.
    pub fn subscribe<F>(
        &self,
        kind: InputEventKind,
        id: SubscriberId,
        scope: Option<&Rc<Engine>>,
        callback: F,
    ) where
        F: Fn(EngineId, &InputEvent) + 'static,
    {
        let sub = Subscription {
            id,
            scope: scope.map(Rc::downgrade),
            callback: Rc::new(callback),
        };
        let mut subscribers = self.subscribers.borrow_mut();
        let list = subscribers.entry(kind).or_default();
        match list.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = sub,
            None => list.push(sub),
        }
    }

    /// Removes a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, kind: InputEventKind, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let Some(list) = subscribers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|s| s.id != id);
        before != list.len()
    }

    pub fn subscriber_count(&self, kind: InputEventKind) -> usize {
        self.subscribers.borrow().get(&kind).map_or(0, Vec::len)
    }

    pub(crate) fn broadcast(&self, event: &InputEvent) {
        let subs: Vec<(Option<Weak<Engine>>, SubscriberFn)> = match self
            .subscribers
            .borrow()
            .get(&event.kind())
        {
            Some(list) => list
                .iter()
                .map(|s| (s.scope.clone(), Rc::clone(&s.callback)))
                .collect(),
            None => return,
        };

        for (scope, callback) in subs {
            match scope {
                Some(weak) => {
                    let Some(engine) = weak.upgrade() else {
                        continue;
                    };
                    if let Some(id) = engine.id() {
                        callback(id, &event.reprojected(&engine));
                    }
                }
                None => {
                    for engine in global().engines() {
                        if let Some(id) = engine.id() {
                            callback(id, &event.reprojected(&engine));
                        }
                    }
                }
            }
        }
    }
}

/// Members of a new pinch: the members of both pointers' drags, or their owners.
fn pinch_members(gestures: &GestureTable, a: &PointerRecord, b: &PointerRecord) -> Vec<ListenerId> {
    let mut members: Vec<ListenerId> = Vec::new();
    for record in [a, b] {
        let from_drag = gestures.drag(record.id).map(|d| d.members.clone());
        for id in from_drag.unwrap_or_else(|| vec![record.owner]) {
            if !members.contains(&id) {
                members.push(id);
            }
        }
    }
    members
}

fn deliver(batch: Vec<Delivery>) {
    for (control, event) in batch {
        control.emit(&event);
    }
}
