use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::camera::Camera;
use crate::config::{DragLimit, EngineConfig};
use crate::coords::{Rect, Vec2};
use crate::entity::Entity;
use crate::error::Result;
use crate::handlers::{Disposer, HandlerList};
use crate::id::{EngineId, ListenerId};
use crate::input::{GlobalInputControl, InputControl, Position, RawPointerEvent};
use crate::scheduler::{global, Stage, StageQueue};
use crate::time::FrameTime;

/// Payload of [`Engine::on_stage`]: one stage finished for this engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StageEvent {
    pub engine: EngineId,
    pub stage: Stage,
    pub time: FrameTime,
    /// Callbacks of this engine's entities that ran in the stage.
    pub callbacks: usize,
}

/// One rendering surface.
///
/// Owns its bounds, camera and input controls; frame timing and the object registry are shared
/// through the scheduler.
pub struct Engine {
    id: Cell<Option<EngineId>>,
    config: RefCell<EngineConfig>,
    camera: RefCell<Option<Rc<dyn Camera>>>,

    /// Local controls in attach order.
    controls: RefCell<Vec<Weak<InputControl>>>,
    global_input: RefCell<Option<Rc<InputControl>>>,

    stage_handlers: HandlerList<StageEvent>,
    animation_handlers: HandlerList<FrameTime>,
    post_render_handlers: HandlerList<FrameTime>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Rc<Self> {
        Rc::new(Self {
            id: Cell::new(None),
            config: RefCell::new(config),
            camera: RefCell::new(None),
            controls: RefCell::new(Vec::new()),
            global_input: RefCell::new(None),
            stage_handlers: HandlerList::new(),
            animation_handlers: HandlerList::new(),
            post_render_handlers: HandlerList::new(),
        })
    }

    /// Assigned by the scheduler the first time it sees this engine.
    pub fn id(&self) -> Option<EngineId> {
        self.id.get()
    }

    pub(crate) fn assign_id(&self, id: EngineId) {
        self.id.set(Some(id));
    }

    pub(crate) fn clear_id(&self) {
        self.id.set(None);
        self.drop_global_input();
    }

    pub(crate) fn drop_global_input(&self) {
        self.global_input.borrow_mut().take();
    }

    pub fn register(self: &Rc<Self>) -> EngineId {
        global().register_engine(self)
    }

    pub fn unregister(&self) -> bool {
        global().unregister_engine(self)
    }

    pub fn is_registered(&self) -> bool {
        self.id().is_some_and(|id| global().is_registered(id))
    }

    pub fn coordinator(&self) -> Option<Rc<GlobalInputControl>> {
        global().coordinator(self.id()?)
    }

    // ── configuration ─────────────────────────────────────────────────────

    pub fn config(&self) -> EngineConfig {
        self.config.borrow().clone()
    }

    /// Cached surface bounds in screen pixels.
    pub fn bounds(&self) -> Rect {
        self.config.borrow().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.config.borrow_mut().bounds = bounds.normalized();
    }

    pub fn set_drag_limit(&self, limit: DragLimit) {
        self.config.borrow_mut().max_simultaneous_drags = limit;
        if let Some(coordinator) = self.coordinator() {
            coordinator.set_drag_limit(limit);
        }
    }

    pub fn camera(&self) -> Option<Rc<dyn Camera>> {
        self.camera.borrow().clone()
    }

    pub fn set_camera(&self, camera: Rc<dyn Camera>) {
        *self.camera.borrow_mut() = Some(camera);
    }

    pub fn clear_camera(&self) {
        self.camera.borrow_mut().take();
    }

    // ── coordinates ───────────────────────────────────────────────────────

    /// `screen` in camera and world space. Without a camera every space equals screen space.
    pub fn project(&self, screen: Vec2) -> Position {
        match self.camera() {
            Some(camera) => {
                let cam = camera.camera_from_screen(screen);
                let world = camera.world_from_camera(cam);
                Position {
                    screen,
                    camera: cam,
                    world,
                    local: world,
                }
            }
            None => Position::identity(screen),
        }
    }

    /// A screen-space distance in world units.
    pub fn world_delta_from_screen(&self, delta: Vec2) -> Vec2 {
        match self.camera() {
            Some(camera) => camera.world_delta_from_camera_delta(delta),
            None => delta,
        }
    }

    /// A world-space distance in screen units.
    pub fn screen_delta_from_world(&self, delta: Vec2) -> Vec2 {
        match self.camera() {
            Some(camera) => camera.camera_delta_from_world_delta(delta),
            None => delta,
        }
    }

    // ── entities & input ──────────────────────────────────────────────────

    pub fn create_entity(self: &Rc<Self>) -> Entity {
        Entity::new(Some(self))
    }

    /// The engine-wide input control. Created when the engine registers.
    pub fn global_input(self: &Rc<Self>) -> Result<Rc<InputControl>> {
        if let Some(control) = self.global_input.borrow().as_ref() {
            return Ok(Rc::clone(control));
        }
        let control = InputControl::new_global(self)?;
        *self.global_input.borrow_mut() = Some(Rc::clone(&control));
        Ok(control)
    }

    pub(crate) fn attach_control(&self, control: &Rc<InputControl>) {
        self.controls.borrow_mut().push(Rc::downgrade(control));
    }

    pub(crate) fn detach_control(&self, listener: ListenerId) {
        self.controls
            .borrow_mut()
            .retain(|c| c.upgrade().is_some_and(|c| c.id() != listener));
    }

    /// Routes a raw pointer event: local controls first (last attached first), then the
    /// engine-global control. Moves, ups and cancels reach the gesture tables after every control
    /// saw them.
    pub fn dispatch_pointer(&self, ev: &RawPointerEvent) {
        let mut targets: Vec<Rc<InputControl>> = {
            let mut controls = self.controls.borrow_mut();
            controls.retain(|c| c.strong_count() > 0);
            controls.iter().rev().filter_map(Weak::upgrade).collect()
        };
        if let Some(control) = self.global_input.borrow().as_ref() {
            targets.push(Rc::clone(control));
        }

        for control in &targets {
            control.receive(ev);
        }
        if let Some(coordinator) = self.coordinator() {
            coordinator.complete(ev);
        }
    }

    // ── frame hooks ───────────────────────────────────────────────────────

    /// Runs the work of this engine's entities queued for `stage`, then notifies stage handlers.
    pub fn process_stage(&self, stage: Stage, queue: &mut StageQueue, time: &FrameTime) {
        let Some(id) = self.id() else {
            return;
        };
        let entries = queue.take_owned_by(Some(id));
        let callbacks = entries.iter().map(|e| e.len()).sum();
        for entry in entries {
            entry.run(time);
        }
        if callbacks > 0 {
            log::trace!("{id} {stage}: {callbacks} callback(s)");
        }

        self.stage_handlers.emit(&StageEvent {
            engine: id,
            stage,
            time: *time,
            callbacks,
        });
    }

    /// Advances declarative animations. Runs between `WRITE_2` and `READ_3`.
    pub fn process_animations(&self, time: &FrameTime) {
        self.animation_handlers.emit(time);
    }

    /// Runs after `WRITE_3`, once per frame.
    pub fn process_post_render(&self, time: &FrameTime) {
        self.post_render_handlers.emit(time);
    }

    pub fn on_stage<F>(&self, handler: F) -> Disposer
    where
        F: Fn(&StageEvent) + 'static,
    {
        self.stage_handlers.add(handler)
    }

    pub fn on_animation_frame<F>(&self, handler: F) -> Disposer
    where
        F: Fn(&FrameTime) + 'static,
    {
        self.animation_handlers.add(handler)
    }

    pub fn on_post_render<F>(&self, handler: F) -> Disposer
    where
        F: Fn(&FrameTime) + 'static,
    {
        self.post_render_handlers.add(handler)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.id.get())
            .field("bounds", &self.bounds())
            .field("camera", &self.camera.borrow().is_some())
            .field("controls", &self.controls.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PanZoomCamera;
    use crate::coords::Viewport;
    use crate::entity::Schedulable;
    use crate::scheduler::GlobalManager;

    #[test]
    fn project_without_camera_is_identity() {
        let e = Engine::new(EngineConfig::default());
        let p = e.project(Vec2::new(3.0, 4.0));
        assert_eq!(p, Position::identity(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn project_goes_through_the_camera() {
        let e = Engine::new(EngineConfig::default());
        let camera = Rc::new(PanZoomCamera::new(
            Viewport::new(100.0, 100.0).with_offset(Vec2::new(10.0, 0.0)),
        ));
        camera.set_zoom(2.0);
        camera.set_pan(Vec2::new(5.0, 5.0));
        e.set_camera(camera);

        let p = e.project(Vec2::new(30.0, 20.0));
        assert_eq!(p.camera, Vec2::new(20.0, 20.0));
        assert_eq!(p.world, Vec2::new(15.0, 15.0));
        assert_eq!(e.world_delta_from_screen(Vec2::new(4.0, 0.0)), Vec2::new(2.0, 0.0));
        assert_eq!(e.screen_delta_from_world(Vec2::new(2.0, 0.0)), Vec2::new(4.0, 0.0));

        e.clear_camera();
        assert_eq!(e.project(Vec2::new(30.0, 20.0)).world, Vec2::new(30.0, 20.0));
    }

    #[test]
    fn stage_handlers_see_callback_counts() {
        GlobalManager::reset();
        let e = Engine::new(EngineConfig::default());
        e.register();
        let o = e.create_entity();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        e.on_stage(move |ev| s.borrow_mut().push((ev.stage, ev.callbacks)));
        o.queue_update(Stage::Write2, |_| {});
        o.queue_update(Stage::Write2, |_| {});

        global().tick_with(FrameTime::synthetic(0, 0.0));
        let seen = seen.borrow();
        assert_eq!(seen.len(), Stage::COUNT);
        assert_eq!(seen[3], (Stage::Write2, 2));
        assert_eq!(seen[0], (Stage::Read1, 0));
    }

    #[test]
    fn global_input_is_cached_and_needs_registration() {
        GlobalManager::reset();
        let e = Engine::new(EngineConfig::default());
        assert!(e.global_input().is_err());

        e.register();
        let a = e.global_input().expect("registered");
        let b = e.global_input().expect("registered");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn set_drag_limit_reaches_the_coordinator() {
        GlobalManager::reset();
        let e = Engine::new(EngineConfig::default());
        e.register();
        e.set_drag_limit(DragLimit::at_most(2));
        assert_eq!(
            e.coordinator().expect("registered").drag_limit(),
            DragLimit::at_most(2)
        );
    }
}
