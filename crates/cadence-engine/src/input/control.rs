use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::coords::{Rect, Vec2};
use crate::entity::Entity;
use crate::error::{EngineError, Result};
use crate::handlers::{Disposer, HandlerList};
use crate::id::{EngineId, ListenerId, PointerId};
use crate::scheduler::global;
use crate::surface::Engine;

use super::coordinator::GlobalInputControl;
use super::event::{
    DragStartPayload, InputEvent, InputEventKind, PointerPayload, Position, ReleaseReason,
    WheelPayload,
};
use super::types::{MouseWheelDelta, RawPointerEvent, RawPointerKind};

enum Flavor {
    /// One per engine; sees every event inside the engine's bounds.
    Global,
    /// Bound to an interactive entity.
    Local(Entity),
}

/// Pointer normalizer for one listener.
///
/// Turns raw pointer events into the canonical event vocabulary. Pointer and gesture state is
/// kept by the engine's [`GlobalInputControl`], so several controls can take part in one drag.
pub struct InputControl {
    id: ListenerId,
    engine_id: EngineId,
    engine: Weak<Engine>,
    flavor: Flavor,
    /// World-space hit area of a local control. `None` accepts the whole engine.
    hit_area: Cell<Option<Rect>>,
    handlers: RefCell<HashMap<InputEventKind, HandlerList<InputEvent>>>,
    /// Listeners added to every drag this control starts.
    drag_members: RefCell<Vec<ListenerId>>,
    this: Weak<InputControl>,
}

impl InputControl {
    fn build(engine: &Rc<Engine>, engine_id: EngineId, flavor: Flavor) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            id: ListenerId(global().next_global_id()),
            engine_id,
            engine: Rc::downgrade(engine),
            flavor,
            hit_area: Cell::new(None),
            handlers: RefCell::new(HashMap::new()),
            drag_members: RefCell::new(Vec::new()),
            this: this.clone(),
        })
    }

    /// Engine-global control. Use [`Engine::global_input`], which caches it.
    pub(crate) fn new_global(engine: &Rc<Engine>) -> Result<Rc<Self>> {
        let manager = global();
        let engine_id = manager.engine_id(engine);
        let coordinator = manager
            .coordinator(engine_id)
            .ok_or(EngineError::EngineNotRegistered { engine: engine_id })?;

        let control = Self::build(engine, engine_id, Flavor::Global);
        coordinator.enroll(&control);
        Ok(control)
    }

    /// Control for an interactive entity of a registered engine.
    ///
    /// Fails with [`EngineError::Unowned`] when the entity has no engine.
    pub fn local(entity: &Entity) -> Result<Rc<Self>> {
        let engine_id = entity
            .owner_id()
            .ok_or(EngineError::Unowned { entity: entity.id() })?;
        let engine = entity
            .engine()
            .ok_or(EngineError::EngineNotRegistered { engine: engine_id })?;
        let coordinator = global()
            .coordinator(engine_id)
            .ok_or(EngineError::EngineNotRegistered { engine: engine_id })?;

        let control = Self::build(&engine, engine_id, Flavor::Local(entity.clone()));
        coordinator.enroll(&control);
        engine.attach_control(&control);
        log::debug!("{} listens for {} on {engine_id}", control.id, entity.id());
        Ok(control)
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    pub fn is_global(&self) -> bool {
        matches!(self.flavor, Flavor::Global)
    }

    pub fn entity(&self) -> Option<&Entity> {
        match &self.flavor {
            Flavor::Global => None,
            Flavor::Local(entity) => Some(entity),
        }
    }

    pub fn hit_area(&self) -> Option<Rect> {
        self.hit_area.get()
    }

    pub fn set_hit_area(&self, area: Option<Rect>) {
        self.hit_area.set(area.map(Rect::normalized));
    }

    fn coordinator(&self) -> Option<Rc<GlobalInputControl>> {
        global().coordinator(self.engine_id)
    }

    // ── handlers ──────────────────────────────────────────────────────────

    /// Registers `handler` for `kind`. Handlers of one kind run in registration order.
    pub fn on<F>(&self, kind: InputEventKind, handler: F) -> Disposer
    where
        F: Fn(&InputEvent) + 'static,
    {
        let list = self
            .handlers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .clone();
        list.add(handler)
    }

    pub fn handler_count(&self, kind: InputEventKind) -> usize {
        self.handlers.borrow().get(&kind).map_or(0, HandlerList::len)
    }

    /// Runs this control's handlers for `event`. Events of the global control (pinches aside)
    /// are re-broadcast to the coordinator's subscribers.
    pub(crate) fn emit(&self, event: &InputEvent) {
        let list = self.handlers.borrow().get(&event.kind()).cloned();
        if let Some(list) = list {
            list.emit(event);
        }
        if self.is_global() && !event.kind().is_pinch() {
            if let Some(coordinator) = self.coordinator() {
                coordinator.broadcast(event);
            }
        }
    }

    // ── drag membership ───────────────────────────────────────────────────

    /// Adds `member` to every drag this control starts from now on.
    pub fn add_drag_member(&self, member: &Rc<InputControl>) -> bool {
        if member.id == self.id {
            return false;
        }
        if let Some(coordinator) = self.coordinator() {
            coordinator.enroll(member);
        }
        let mut members = self.drag_members.borrow_mut();
        if members.contains(&member.id) {
            return false;
        }
        members.push(member.id);
        true
    }

    pub fn remove_drag_member(&self, member: ListenerId) -> bool {
        let mut members = self.drag_members.borrow_mut();
        let before = members.len();
        members.retain(|m| *m != member);
        before != members.len()
    }

    pub fn drag_members(&self) -> Vec<ListenerId> {
        self.drag_members.borrow().clone()
    }

    /// Joins the active drag of `pointer`, on this control's engine or any other registered
    /// engine. The control receives `DragStart` and then every event of the drag.
    /// Returns `false` when there is no such drag or the control already takes part.
    pub fn pick_up(&self, pointer: PointerId) -> bool {
        let Some(this) = self.this.upgrade() else {
            return false;
        };
        let manager = global();
        let mut candidates: Vec<Rc<GlobalInputControl>> = self.coordinator().into_iter().collect();
        candidates.extend(
            manager
                .engines()
                .iter()
                .filter_map(|e| e.id())
                .filter(|id| *id != self.engine_id)
                .filter_map(|id| manager.coordinator(id)),
        );

        for coordinator in candidates {
            if coordinator.drag_members(pointer).is_none() {
                continue;
            }
            coordinator.enroll(&this);
            if !coordinator.join_drag(pointer, self.id) {
                log::trace!("{} already takes part in drag {pointer}", self.id);
                return false;
            }
            if let Some(record) = coordinator.pointer(pointer) {
                let start = self.position(record.start);
                self.emit(&InputEvent::DragStart(DragStartPayload { pointer, start }));
            }
            return true;
        }
        false
    }

    // ── coordinates ───────────────────────────────────────────────────────

    /// `screen` in this control's frame: the engine's camera, then the entity transform.
    pub fn position(&self, screen: Vec2) -> Position {
        let mut position = match self.engine.upgrade() {
            Some(engine) => engine.project(screen),
            None => Position::identity(screen),
        };
        if let Flavor::Local(entity) = &self.flavor {
            position.local = entity.transform().local_from_world(position.world);
        }
        position
    }

    /// Whether a press or wheel at `screen` lands on this control.
    pub fn accepts(&self, screen: Vec2) -> bool {
        let Some(engine) = self.engine.upgrade() else {
            return false;
        };
        if !engine.bounds().contains(screen) {
            return false;
        }
        match (&self.flavor, self.hit_area.get()) {
            (Flavor::Local(_), Some(area)) => area.contains(engine.project(screen).world),
            _ => true,
        }
    }

    // ── raw events ────────────────────────────────────────────────────────

    /// Processes one raw event, including the release of the pointer on up or cancel.
    pub fn handle(&self, ev: &RawPointerEvent) {
        self.receive(ev);
        if let Some(coordinator) = self.coordinator() {
            coordinator.complete(ev);
        }
    }

    /// Per-listener part of [`InputControl::handle`]. When an engine routes one event to several
    /// controls it calls this on each, then completes the event once on the coordinator.
    pub(crate) fn receive(&self, ev: &RawPointerEvent) {
        let Some(coordinator) = self.coordinator() else {
            log::trace!("{}: {} is not registered; dropping input", self.id, self.engine_id);
            return;
        };
        match ev.kind {
            RawPointerKind::Down(_) => self.on_down(&coordinator, ev),
            RawPointerKind::Move => self.on_move(&coordinator, ev),
            RawPointerKind::Up(_) | RawPointerKind::Cancel => self.on_up(&coordinator, ev),
            RawPointerKind::Wheel(delta) => self.on_wheel(ev, delta),
        }
    }

    fn pointer_payload(&self, ev: &RawPointerEvent) -> PointerPayload {
        PointerPayload {
            pointer: ev.pointer,
            position: self.position(ev.screen),
            button: ev.button(),
            origin: self.id,
            modifiers: ev.modifiers,
        }
    }

    fn on_down(&self, coordinator: &GlobalInputControl, ev: &RawPointerEvent) {
        if !self.accepts(ev.screen) {
            log::trace!("{}: press at {:?} outside bounds", self.id, ev.screen);
            return;
        }

        match coordinator.pointer(ev.pointer) {
            Some(record) if record.owner == self.id => {
                // Missed release: close the stale press before starting over.
                coordinator.finalize(ev.pointer, record.current, ReleaseReason::Cancel);
                coordinator.press(self.id, ev);
            }
            Some(_) => {}
            None => coordinator.press(self.id, ev),
        }

        self.emit(&InputEvent::PointerDown(self.pointer_payload(ev)));

        let seeds = self.drag_members.borrow().clone();
        let (created, joined) = coordinator.begin_drag(ev.pointer, self.id, &seeds);
        if created {
            coordinator.enforce_drag_limit(ev.pointer);
        }
        coordinator.emit_drag_start(ev.pointer, &joined);
    }

    fn on_move(&self, coordinator: &GlobalInputControl, ev: &RawPointerEvent) {
        let deliver = if coordinator.is_tracked(ev.pointer) {
            self.is_global() || coordinator.is_involved(ev.pointer, self.id)
        } else {
            self.accepts(ev.screen)
        };
        if deliver {
            self.emit(&InputEvent::PointerMove(self.pointer_payload(ev)));
        }
    }

    fn on_up(&self, coordinator: &GlobalInputControl, ev: &RawPointerEvent) {
        let deliver = if coordinator.is_tracked(ev.pointer) {
            self.is_global() || coordinator.is_involved(ev.pointer, self.id)
        } else {
            self.accepts(ev.screen)
        };
        if deliver {
            self.emit(&InputEvent::PointerUp(self.pointer_payload(ev)));
        }
    }

    fn on_wheel(&self, ev: &RawPointerEvent, delta: MouseWheelDelta) {
        if !self.accepts(ev.screen) {
            return;
        }
        let delta = delta.to_pixels();
        let world_delta = self
            .engine
            .upgrade()
            .map_or(delta, |engine| engine.world_delta_from_screen(delta));
        self.emit(&InputEvent::Wheel(WheelPayload {
            position: self.position(ev.screen),
            delta,
            world_delta,
            modifiers: ev.modifiers,
        }));
    }

    /// Stops listening: detaches from the engine and the coordinator. Active drags continue for
    /// their other members.
    pub fn detach(&self) {
        if let Some(engine) = self.engine.upgrade() {
            engine.detach_control(self.id);
        }
        if let Some(coordinator) = self.coordinator() {
            coordinator.forget(self.id);
        }
    }
}

impl fmt::Debug for InputControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputControl")
            .field("id", &self.id)
            .field("engine", &self.engine_id)
            .field("global", &self.is_global())
            .field("hit_area", &self.hit_area.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PanZoomCamera;
    use crate::config::EngineConfig;
    use crate::coords::Viewport;
    use crate::input::{DragEndPayload, DragPayload, GestureKey, Gesture};
    use crate::scheduler::GlobalManager;

    type Log = Rc<RefCell<Vec<InputEvent>>>;

    fn engine(bounds: Rect) -> Rc<Engine> {
        let e = Engine::new(EngineConfig::default().with_bounds(bounds));
        e.register();
        e
    }

    fn record(control: &InputControl, kinds: &[InputEventKind]) -> Log {
        let log: Log = Default::default();
        for kind in kinds {
            let l = Rc::clone(&log);
            control.on(*kind, move |ev| l.borrow_mut().push(*ev));
        }
        log
    }

    fn kinds(log: &Log) -> Vec<InputEventKind> {
        log.borrow().iter().map(InputEvent::kind).collect()
    }

    fn drags(log: &Log) -> Vec<DragPayload> {
        log.borrow()
            .iter()
            .filter_map(|e| match e {
                InputEvent::Drag(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    fn drag_ends(log: &Log) -> Vec<DragEndPayload> {
        log.borrow()
            .iter()
            .filter_map(|e| match e {
                InputEvent::DragEnd(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    const P0: PointerId = PointerId(0);
    const P1: PointerId = PointerId(1);

    // ── single pointer ────────────────────────────────────────────────────

    #[test]
    fn press_then_move_emits_down_drag_start_and_drag() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let input = e1.global_input().expect("registered");
        let log = record(&input, &InputEventKind::ALL);

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(50.0, 50.0), 0.0));
        assert_eq!(kinds(&log), vec![InputEventKind::PointerDown, InputEventKind::DragStart]);

        e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(80.0, 50.0), 16.0));
        let d = drags(&log);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].delta.screen.x, 30.0);
        assert_eq!(d[0].delta.screen.y, 0.0);
        assert_eq!(d[0].delta.world, v(30.0, 0.0));
    }

    #[test]
    fn press_outside_bounds_is_ignored() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let input = e1.global_input().expect("registered");
        let log = record(&input, &InputEventKind::ALL);

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(250.0, 50.0), 0.0));
        e1.dispatch_pointer(&RawPointerEvent::wheel(
            v(250.0, 50.0),
            MouseWheelDelta::Line { x: 0.0, y: 1.0 },
            1.0,
        ));
        assert!(log.borrow().is_empty());
        assert_eq!(e1.coordinator().expect("registered").pointer_count(), 0);
    }

    #[test]
    fn hover_inside_bounds_emits_pointer_move_only() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let input = e1.global_input().expect("registered");
        let log = record(&input, &InputEventKind::ALL);

        e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(10.0, 10.0), 0.0));
        e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(300.0, 10.0), 1.0));
        assert_eq!(kinds(&log), vec![InputEventKind::PointerMove]);
    }

    #[test]
    fn release_clears_both_tables() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let c = e1.coordinator().expect("registered");
        e1.global_input().expect("registered");

        for end in [
            RawPointerEvent::up(P0, v(20.0, 20.0), 2.0),
            RawPointerEvent::cancel(P0, v(20.0, 20.0), 2.0),
        ] {
            e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
            e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(20.0, 20.0), 1.0));
            assert!(c.is_tracked(P0));
            assert!(c.gesture(&GestureKey::Drag(P0)).is_some());

            e1.dispatch_pointer(&end);
            assert!(!c.is_tracked(P0));
            assert!(c.gesture(&GestureKey::Drag(P0)).is_none());
        }
    }

    #[test]
    fn cancel_ends_a_drag_exactly_like_up() {
        let run = |end: fn(PointerId, Vec2, f64) -> RawPointerEvent| {
            GlobalManager::reset();
            let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
            let input = e1.global_input().expect("registered");
            let o = e1.create_entity();
            let local = InputControl::local(&o).expect("owned");
            local.add_drag_member(&input);
            let a = record(&local, &[InputEventKind::DragEnd]);
            let b = record(&input, &[InputEventKind::DragEnd]);

            e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
            e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(40.0, 30.0), 1.0));
            e1.dispatch_pointer(&end(P0, v(40.0, 30.0), 2.0));

            let ends: Vec<(PointerId, Position, Position)> = drag_ends(&a)
                .into_iter()
                .chain(drag_ends(&b))
                .map(|d| (d.pointer, d.start, d.end))
                .collect();
            ends
        };

        let by_up = run(RawPointerEvent::up);
        let by_cancel = run(RawPointerEvent::cancel);
        assert_eq!(by_up.len(), 2);
        assert_eq!(by_up, by_cancel);
        assert_eq!(by_up[0].2.screen, v(40.0, 30.0));
    }

    #[test]
    fn up_for_untracked_pointer_inside_bounds_still_emits_pointer_up() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let input = e1.global_input().expect("registered");
        let log = record(&input, &InputEventKind::ALL);

        e1.dispatch_pointer(&RawPointerEvent::up(P0, v(10.0, 10.0), 0.0));
        assert_eq!(kinds(&log), vec![InputEventKind::PointerUp]);
    }

    #[test]
    fn wheel_carries_world_delta() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let camera = Rc::new(PanZoomCamera::new(Viewport::new(200.0, 200.0)));
        camera.set_zoom(2.0);
        e1.set_camera(camera);
        let input = e1.global_input().expect("registered");
        let log = record(&input, &[InputEventKind::Wheel]);

        e1.dispatch_pointer(&RawPointerEvent::wheel(
            v(10.0, 10.0),
            MouseWheelDelta::Pixel { x: 0.0, y: 20.0 },
            0.0,
        ));
        match log.borrow().first() {
            Some(InputEvent::Wheel(w)) => {
                assert_eq!(w.delta, v(0.0, 20.0));
                assert_eq!(w.world_delta, v(0.0, 10.0));
            }
            other => panic!("expected wheel, got {other:?}"),
        }
    }

    // ── local controls ────────────────────────────────────────────────────

    #[test]
    fn local_requires_an_owned_entity() {
        GlobalManager::reset();
        let orphan = Entity::new(None);
        let err = InputControl::local(&orphan).expect_err("ownerless");
        assert_eq!(err, EngineError::Unowned { entity: orphan.id() });
    }

    #[test]
    fn local_of_unregistered_engine_is_rejected() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let o = e1.create_entity();
        let id = e1.id().expect("registered");
        e1.unregister();
        assert_eq!(
            InputControl::local(&o).expect_err("unregistered"),
            EngineError::EngineNotRegistered { engine: id }
        );
    }

    #[test]
    fn hit_area_limits_local_presses() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let o = e1.create_entity();
        let local = InputControl::local(&o).expect("owned");
        local.set_hit_area(Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let log = record(&local, &[InputEventKind::PointerDown]);

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(100.0, 100.0), 0.0));
        e1.dispatch_pointer(&RawPointerEvent::up(P0, v(100.0, 100.0), 1.0));
        assert!(log.borrow().is_empty());

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 2.0));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn local_positions_follow_the_entity_transform() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let o = e1.create_entity();
        o.translate(v(100.0, 0.0));
        let local = InputControl::local(&o).expect("owned");
        let log = record(&local, &[InputEventKind::PointerDown]);

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(110.0, 5.0), 0.0));
        match log.borrow().first() {
            Some(InputEvent::PointerDown(p)) => {
                assert_eq!(p.position.world, v(110.0, 5.0));
                assert_eq!(p.position.local, v(10.0, 5.0));
                assert_eq!(p.origin, local.id());
            }
            other => panic!("expected pointer down, got {other:?}"),
        }
    }

    #[test]
    fn drag_members_each_get_one_drag_in_their_own_frame() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let e2 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let zoomed = Rc::new(PanZoomCamera::new(Viewport::new(200.0, 200.0)));
        zoomed.set_zoom(2.0);
        e2.set_camera(zoomed);

        let a = InputControl::local(&e1.create_entity()).expect("owned");
        let b = InputControl::local(&e2.create_entity()).expect("owned");
        assert!(a.add_drag_member(&b));
        assert!(!a.add_drag_member(&b));
        let log_a = record(&a, &[InputEventKind::DragStart, InputEventKind::Drag]);
        let log_b = record(&b, &[InputEventKind::DragStart, InputEventKind::Drag]);

        // The engine-wide control joins after the seeded members.
        let g1 = e1.global_input().expect("registered");
        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
        assert_eq!(
            e1.coordinator().expect("registered").drag_members(P0),
            Some(vec![a.id(), b.id(), g1.id()])
        );
        e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(30.0, 10.0), 1.0));

        assert_eq!(kinds(&log_a), vec![InputEventKind::DragStart, InputEventKind::Drag]);
        assert_eq!(kinds(&log_b), vec![InputEventKind::DragStart, InputEventKind::Drag]);
        assert_eq!(drags(&log_a)[0].delta.world, v(20.0, 0.0));
        assert_eq!(drags(&log_b)[0].delta.world, v(10.0, 0.0));
        assert_eq!(drags(&log_b)[0].delta.screen, v(20.0, 0.0));
    }

    #[test]
    fn repeated_pick_up_joins_once() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let e2 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let a = InputControl::local(&e1.create_entity()).expect("owned");
        let b = InputControl::local(&e2.create_entity()).expect("owned");
        let c = InputControl::local(&e2.create_entity()).expect("owned");
        let log_b = record(&b, &[InputEventKind::DragStart, InputEventKind::DragEnd]);

        assert!(!b.pick_up(P0));
        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
        assert!(b.pick_up(P0));
        assert!(!b.pick_up(P0));
        assert!(c.pick_up(P0));
        assert!(!b.pick_up(P0));

        let coordinator = e1.coordinator().expect("registered");
        let g1 = e1.global_input().expect("registered");
        assert_eq!(
            coordinator.drag_members(P0),
            Some(vec![a.id(), g1.id(), b.id(), c.id()])
        );

        e1.dispatch_pointer(&RawPointerEvent::up(P0, v(10.0, 10.0), 1.0));
        assert_eq!(kinds(&log_b), vec![InputEventKind::DragStart, InputEventKind::DragEnd]);
    }

    #[test]
    fn detached_control_stops_receiving() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let local = InputControl::local(&e1.create_entity()).expect("owned");
        let log = record(&local, &InputEventKind::ALL);
        local.detach();

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn handle_runs_a_full_drag_on_one_control() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let input = e1.global_input().expect("registered");
        let log = record(
            &input,
            &[InputEventKind::DragStart, InputEventKind::Drag, InputEventKind::DragEnd],
        );

        input.handle(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
        input.handle(&RawPointerEvent::move_to(P0, v(25.0, 10.0), 1.0));
        input.handle(&RawPointerEvent::up(P0, v(25.0, 10.0), 2.0));

        assert_eq!(
            kinds(&log),
            vec![InputEventKind::DragStart, InputEventKind::Drag, InputEventKind::DragEnd]
        );
        assert_eq!(drag_ends(&log)[0].reason, ReleaseReason::Up);
        assert_eq!(e1.coordinator().expect("registered").pointer_count(), 0);
    }

    #[test]
    fn drag_follows_the_owner_even_when_another_control_sees_the_move_first() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let input = e1.global_input().expect("registered");
        let bystander = InputControl::local(&e1.create_entity()).expect("owned");
        bystander.set_hit_area(Some(Rect::new(150.0, 150.0, 10.0, 10.0)));
        let log = record(&input, &[InputEventKind::Drag]);
        let ignored = record(&bystander, &InputEventKind::ALL);

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
        e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(20.0, 10.0), 1.0));

        assert_eq!(drags(&log).len(), 1);
        assert!(ignored.borrow().is_empty());
    }

    #[test]
    fn disposed_handler_is_not_called() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(0.0, 0.0, 200.0, 200.0));
        let input = e1.global_input().expect("registered");
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let d = input.on(InputEventKind::PointerDown, move |_| h.set(h.get() + 1));
        assert_eq!(input.handler_count(InputEventKind::PointerDown), 1);
        d.dispose();

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(10.0, 10.0), 0.0));
        assert_eq!(hits.get(), 0);
    }

    // ── pinch ─────────────────────────────────────────────────────────────

    #[test]
    fn two_pointers_form_one_pinch() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(-500.0, -500.0, 1000.0, 1000.0));
        let input = e1.global_input().expect("registered");
        let log = record(&input, &[InputEventKind::PinchStart, InputEventKind::Pinch]);

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(0.0, 0.0), 0.0));
        e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(10.0, 0.0), 0.5));
        e1.dispatch_pointer(&RawPointerEvent::down(P1, v(100.0, 0.0), 1.0));
        e1.dispatch_pointer(&RawPointerEvent::move_to(P1, v(90.0, 0.0), 1.5));

        assert_eq!(kinds(&log), vec![InputEventKind::PinchStart, InputEventKind::Pinch]);

        let key = GestureKey::Pinch(P0, P1);
        assert_eq!(key.to_string(), "0-1");
        match e1.coordinator().expect("registered").gesture(&key) {
            Some(Gesture::Pinch(pinch)) => {
                assert_eq!(pinch.start.distance, 100.0);
                assert_eq!(pinch.current.distance, 80.0);
            }
            other => panic!("expected pinch, got {other:?}"),
        }
        match log.borrow().last() {
            Some(InputEvent::Pinch(p)) => {
                assert_eq!(p.start_distance, 100.0);
                assert_eq!(p.distance, 80.0);
                assert_eq!(p.pair, [P0, P1]);
            }
            other => panic!("expected pinch, got {other:?}"),
        }
    }

    #[test]
    fn later_moves_only_emit_pinch() {
        GlobalManager::reset();
        let e1 = engine(Rect::new(-500.0, -500.0, 1000.0, 1000.0));
        let input = e1.global_input().expect("registered");
        let log = record(&input, &[InputEventKind::PinchStart, InputEventKind::Pinch]);

        e1.dispatch_pointer(&RawPointerEvent::down(P0, v(0.0, 0.0), 0.0));
        e1.dispatch_pointer(&RawPointerEvent::down(P1, v(100.0, 0.0), 1.0));
        e1.dispatch_pointer(&RawPointerEvent::move_to(P0, v(10.0, 0.0), 2.0));
        e1.dispatch_pointer(&RawPointerEvent::move_to(P1, v(90.0, 0.0), 3.0));

        assert_eq!(
            kinds(&log),
            vec![InputEventKind::PinchStart, InputEventKind::Pinch, InputEventKind::Pinch]
        );
    }
}
