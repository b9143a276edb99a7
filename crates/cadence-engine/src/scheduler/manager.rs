use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::config::SchedulerConfig;
use crate::entity::Entity;
use crate::error::{EngineError, Result};
use crate::id::{EngineId, EntityId};
use crate::input::GlobalInputControl;
use crate::surface::Engine;
use crate::time::{FrameClock, FrameTime};

use super::driver::{FrameDriver, ManualDriver};
use super::queue::{StageCallback, StageQueue, UpdateKey};
use super::registry::ObjectTable;
use super::stage::Stage;

thread_local! {
    static MANAGER: RefCell<Option<Rc<GlobalManager>>> = const { RefCell::new(None) };
}

/// Returns the thread's scheduler, creating it with the default configuration on first use.
pub fn global() -> Rc<GlobalManager> {
    MANAGER.with(|slot| {
        Rc::clone(
            slot.borrow_mut()
                .get_or_insert_with(|| Rc::new(GlobalManager::new(SchedulerConfig::default()))),
        )
    })
}

type Partition = Rc<RefCell<ObjectTable>>;

struct EngineRecord {
    id: EngineId,
    engine: Rc<Engine>,
    coordinator: Rc<GlobalInputControl>,
}

/// Frame scheduler and object registry shared by every surface on the thread.
///
/// One frame runs the six stages in order. Within a stage every registered engine drains its
/// own entities' work from the stage's shared queue before the next stage starts, so reads of all
/// surfaces happen before writes of any surface.
pub struct GlobalManager {
    config: SchedulerConfig,

    /// Active engines in registration order.
    engines: RefCell<Vec<EngineRecord>>,
    partitions: RefCell<HashMap<Option<EngineId>, Partition>>,
    queues: RefCell<[StageQueue; Stage::COUNT]>,

    next_token: Cell<u64>,
    next_engine: Cell<u32>,

    clock: RefCell<FrameClock>,
    driver: RefCell<Box<dyn FrameDriver>>,
    running: Cell<bool>,
    in_frame: Cell<bool>,
    frames_run: Cell<u64>,
    last_frame: Cell<Option<FrameTime>>,
}

impl GlobalManager {
    fn new(config: SchedulerConfig) -> Self {
        let clock = FrameClock::with_clamps(config.dt_min, config.dt_max);
        Self {
            config,
            engines: RefCell::new(Vec::new()),
            partitions: RefCell::new(HashMap::new()),
            queues: RefCell::new(Default::default()),
            next_token: Cell::new(0),
            next_engine: Cell::new(0),
            clock: RefCell::new(clock),
            driver: RefCell::new(Box::new(ManualDriver::new())),
            running: Cell::new(false),
            in_frame: Cell::new(false),
            frames_run: Cell::new(0),
            last_frame: Cell::new(None),
        }
    }

    /// Replaces the thread's scheduler with a fresh one using `config`.
    pub fn install(config: SchedulerConfig) -> Rc<GlobalManager> {
        Self::reset();
        let manager = Rc::new(GlobalManager::new(config));
        MANAGER.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&manager)));
        manager
    }

    /// Tears down the thread's scheduler. The next [`global`] call builds a new one.
    ///
    /// Engines that were registered lose their ids and must be registered again.
    pub fn reset() {
        let old = MANAGER.with(|slot| slot.borrow_mut().take());
        if let Some(old) = old {
            old.stop_loop();
            let records = std::mem::take(&mut *old.engines.borrow_mut());
            for record in &records {
                record.engine.clear_id();
            }
            log::debug!("scheduler reset ({} engine(s) dropped)", records.len());
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Installs the platform frame callback. A pending frame is re-requested on the new driver.
    pub fn set_driver(&self, driver: Box<dyn FrameDriver>) {
        let old = self.driver.replace(driver);
        old.cancel_frame();
        if self.running.get() && !self.in_frame.get() {
            self.driver.borrow().request_frame();
        }
    }

    // ── ids ───────────────────────────────────────────────────────────────

    /// Fresh process-wide token. Never returns the same value twice for one scheduler.
    pub fn next_global_id(&self) -> u64 {
        let id = self.next_token.get() + 1;
        self.next_token.set(id);
        id
    }

    /// Id of `engine`, assigned sequentially the first time the scheduler sees it.
    pub fn engine_id(&self, engine: &Engine) -> EngineId {
        if let Some(id) = engine.id() {
            return id;
        }
        let id = EngineId(self.next_engine.get() + 1);
        self.next_engine.set(id.0);
        engine.assign_id(id);
        id
    }

    // ── engines ───────────────────────────────────────────────────────────

    /// Adds `engine` to the active set with its gesture coordinator and engine-wide input
    /// control. The first registration starts the frame loop.
    pub fn register_engine(&self, engine: &Rc<Engine>) -> EngineId {
        let id = self.engine_id(engine);
        let first = {
            let mut engines = self.engines.borrow_mut();
            if engines.iter().any(|r| r.id == id) {
                return id;
            }
            let coordinator = Rc::new(GlobalInputControl::new(id, engine));
            engines.push(EngineRecord {
                id,
                engine: Rc::clone(engine),
                coordinator,
            });
            engines.len() == 1
        };

        log::info!("{id} registered");
        if let Err(e) = engine.global_input() {
            log::warn!("{id}: no engine-wide input control: {e}");
        }
        if first {
            self.start_loop();
        }
        id
    }

    /// Removes `engine`, dropping its registry partition and gesture coordinator.
    /// The loop stops once no engines remain. Returns `false` if it was not registered.
    pub fn unregister_engine(&self, engine: &Engine) -> bool {
        let Some(id) = engine.id() else {
            log::warn!("unregister_engine: engine was never registered");
            return false;
        };

        let (record, now_empty) = {
            let mut engines = self.engines.borrow_mut();
            let Some(pos) = engines.iter().position(|r| r.id == id) else {
                return false;
            };
            let record = engines.remove(pos);
            (record, engines.is_empty())
        };
        let partition = self.partitions.borrow_mut().remove(&Some(id));
        engine.drop_global_input();

        log::info!(
            "{id} unregistered ({} object(s) released)",
            partition.as_ref().map_or(0, |p| p.borrow().len())
        );
        drop(record);

        if now_empty {
            self.stop_loop();
        }
        true
    }

    pub fn is_registered(&self, id: EngineId) -> bool {
        self.engines.borrow().iter().any(|r| r.id == id)
    }

    pub fn engine(&self, id: EngineId) -> Option<Rc<Engine>> {
        self.engines
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .map(|r| Rc::clone(&r.engine))
    }

    /// Registered engines in registration order.
    pub fn engines(&self) -> Vec<Rc<Engine>> {
        self.engines
            .borrow()
            .iter()
            .map(|r| Rc::clone(&r.engine))
            .collect()
    }

    pub fn engine_count(&self) -> usize {
        self.engines.borrow().len()
    }

    /// Gesture coordinator of a registered engine.
    pub fn coordinator(&self, id: EngineId) -> Option<Rc<GlobalInputControl>> {
        self.engines
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .map(|r| Rc::clone(&r.coordinator))
    }

    // ── object registry ───────────────────────────────────────────────────

    /// Registry partition of `owner`, or the shared ownerless partition for `None`.
    pub fn object_table(&self, owner: Option<&Engine>, create: bool) -> Option<Partition> {
        let key = owner.map(|e| self.engine_id(e));
        let mut partitions = self.partitions.borrow_mut();
        if create {
            Some(Rc::clone(partitions.entry(key).or_default()))
        } else {
            partitions.get(&key).cloned()
        }
    }

    pub fn register_object(&self, entity: &Entity) {
        let mut partitions = self.partitions.borrow_mut();
        let table = partitions.entry(entity.owner_id()).or_default();
        if !table.borrow_mut().insert(entity.clone()) {
            log::trace!("{} registered twice", entity.id());
        }
    }

    /// Removes `entity` from its partition; a partition left empty is deleted.
    pub fn unregister_object(&self, entity: &Entity) -> bool {
        let key = entity.owner_id();
        let mut partitions = self.partitions.borrow_mut();
        let Some(table) = partitions.get(&key) else {
            return false;
        };

        let (removed, empty) = {
            let mut table = table.borrow_mut();
            let removed = table.remove(entity.id()).is_some();
            (removed, table.is_empty())
        };
        if empty {
            partitions.remove(&key);
        }
        removed
    }

    // ── stage queues ──────────────────────────────────────────────────────

    /// Queues `callback` for `entity` at `stage`. Without a key a fresh token is used, so the
    /// entry never merges with another.
    pub fn queue_update(
        &self,
        stage: Stage,
        entity: &Entity,
        key: Option<UpdateKey>,
        callback: StageCallback,
    ) -> QueueHandle {
        let key = key.unwrap_or_else(|| UpdateKey::Token(self.next_global_id()));
        self.queues.borrow_mut()[stage.index()].insert(
            entity.id(),
            entity.owner_id(),
            key.clone(),
            callback,
        );
        QueueHandle {
            stage,
            entity: entity.id(),
            key,
        }
    }

    fn append_callback(&self, handle: &QueueHandle, callback: StageCallback) -> Result<()> {
        let mut queues = self.queues.borrow_mut();
        match queues[handle.stage.index()].entry_mut(handle.entity, &handle.key) {
            Some(entry) => {
                entry.add_callback(callback);
                Ok(())
            }
            None => Err(EngineError::EntryConsumed {
                entity: handle.entity,
                stage: handle.stage,
            }),
        }
    }

    /// Callbacks currently waiting in `stage`'s queue.
    pub fn pending_callbacks(&self, stage: Stage) -> usize {
        self.queues.borrow()[stage.index()].callback_count()
    }

    // ── frame loop ────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Frames completed since the scheduler was created.
    pub fn frames_run(&self) -> u64 {
        self.frames_run.get()
    }

    /// Timing of the most recent completed frame.
    pub fn last_frame(&self) -> Option<FrameTime> {
        self.last_frame.get()
    }

    fn start_loop(&self) {
        if self.running.replace(true) {
            return;
        }
        self.clock.borrow_mut().reset();
        log::info!("frame loop started");
        self.driver.borrow().request_frame();
    }

    fn stop_loop(&self) {
        if !self.running.replace(false) {
            return;
        }
        self.driver.borrow().cancel_frame();
        log::info!("frame loop stopped");
    }

    /// Runs one frame stamped by the scheduler's clock.
    pub fn tick(&self) -> bool {
        if !self.running.get() {
            return false;
        }
        let time = self.clock.borrow_mut().tick();
        self.tick_with(time)
    }

    /// Runs one frame with an explicit timestamp. Returns `false` when the loop is stopped or a
    /// frame is already in progress.
    pub fn tick_with(&self, time: FrameTime) -> bool {
        if !self.running.get() {
            return false;
        }
        if self.in_frame.replace(true) {
            log::warn!("tick requested while frame {} is running; ignored", time.frame_index);
            return false;
        }

        log::trace!("frame {} ({} engine(s))", time.frame_index, self.engine_count());

        for stage in Stage::ALL {
            // Engines registered by an earlier stage join from here on.
            let engines = self.registered();
            if stage == Stage::Read3 {
                for (id, engine) in &engines {
                    self.guarded(*id, "animations", || engine.process_animations(&time));
                }
            }

            let mut queue = std::mem::take(&mut self.queues.borrow_mut()[stage.index()]);
            for (id, engine) in &engines {
                self.guarded(*id, stage.as_str(), || {
                    engine.process_stage(stage, &mut queue, &time)
                });
            }
            self.drain_leftovers(stage, queue, &time);
        }

        for (id, engine) in &self.registered() {
            self.guarded(*id, "post_render", || engine.process_post_render(&time));
        }

        self.frames_run.set(self.frames_run.get() + 1);
        self.last_frame.set(Some(time));
        self.in_frame.set(false);

        if self.running.get() {
            self.driver.borrow().request_frame();
        }
        true
    }

    fn registered(&self) -> Vec<(EngineId, Rc<Engine>)> {
        self.engines
            .borrow()
            .iter()
            .map(|r| (r.id, Rc::clone(&r.engine)))
            .collect()
    }

    /// Runs one engine hook; a panic is logged and does not stop the frame.
    fn guarded(&self, engine: EngineId, phase: &str, hook: impl FnOnce()) {
        if !self.is_registered(engine) {
            return;
        }
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(hook)) {
            let err = EngineError::HookPanicked {
                engine,
                phase: phase.to_string(),
                message: panic_message(&*payload),
            };
            log::error!("{err}");
        }
    }

    fn drain_leftovers(&self, stage: Stage, mut queue: StageQueue, time: &FrameTime) {
        let ownerless = queue.take_owned_by(None);
        if !ownerless.is_empty() {
            let run = AssertUnwindSafe(|| {
                for entry in ownerless {
                    entry.run(time);
                }
            });
            if let Err(payload) = panic::catch_unwind(run) {
                let err = EngineError::OwnerlessPanicked {
                    stage,
                    message: panic_message(&*payload),
                };
                log::error!("{err}");
            }
        }

        if !queue.is_empty() {
            log::debug!(
                "{stage}: dropped {} callback(s) of {} entity(ies) with no registered engine",
                queue.callback_count(),
                queue.entity_count()
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Handle to a queued entry, for appending callbacks before its stage drains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueHandle {
    stage: Stage,
    entity: EntityId,
    key: UpdateKey,
}

impl QueueHandle {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn key(&self) -> &UpdateKey {
        &self.key
    }

    /// Appends `callback` to the entry. Fails with [`EngineError::EntryConsumed`] once the
    /// entry's stage has drained.
    pub fn add_callback(&self, callback: impl FnOnce(&FrameTime) + 'static) -> Result<()> {
        global().append_callback(self, Box::new(callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::entity::Schedulable;

    fn fresh() -> Rc<GlobalManager> {
        GlobalManager::reset();
        global()
    }

    fn engine() -> Rc<Engine> {
        let e = Engine::new(EngineConfig::default());
        e.register();
        e
    }

    fn frame(i: u64) -> FrameTime {
        FrameTime::synthetic(i, i as f64 * 16.0)
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn push(log: &Log, s: impl Into<String>) {
        log.borrow_mut().push(s.into());
    }

    // ── ids & registration ────────────────────────────────────────────────

    #[test]
    fn global_ids_are_unique() {
        let m = fresh();
        let a = m.next_global_id();
        let b = m.next_global_id();
        assert_ne!(a, b);
    }

    #[test]
    fn engine_ids_are_sequential_and_stable() {
        let m = fresh();
        let e1 = engine();
        let e2 = engine();
        assert_eq!(e1.id(), Some(EngineId(1)));
        assert_eq!(e2.id(), Some(EngineId(2)));
        assert_eq!(m.register_engine(&e1), EngineId(1));
        assert_eq!(m.engine_count(), 2);
    }

    #[test]
    fn first_engine_starts_and_last_stops_the_loop() {
        let m = fresh();
        let driver = ManualDriver::new();
        m.set_driver(Box::new(driver.clone()));
        assert!(!m.is_running());

        let e1 = engine();
        assert!(m.is_running());
        assert!(driver.take_pending());

        let e2 = engine();
        e1.unregister();
        assert!(m.is_running());
        e2.unregister();
        assert!(!m.is_running());
        assert!(!driver.is_pending());
        assert!(!m.tick_with(frame(0)));
    }

    #[test]
    fn tick_rearms_while_running() {
        let m = fresh();
        let driver = ManualDriver::new();
        m.set_driver(Box::new(driver.clone()));
        let _e = engine();
        driver.take_pending();

        assert!(m.last_frame().is_none());
        assert!(m.tick_with(frame(0)));
        assert!(driver.is_pending());
        assert_eq!(m.frames_run(), 1);
        assert_eq!(m.last_frame().map(|t| t.frame_index), Some(0));
    }

    #[test]
    fn unregister_drops_partition_and_coordinator() {
        let m = fresh();
        let e = engine();
        let id = e.id().expect("registered");
        let _o = e.create_entity();
        assert!(m.object_table(Some(&e), false).is_some());
        assert!(m.coordinator(id).is_some());

        assert!(m.unregister_engine(&e));
        assert!(m.object_table(Some(&e), false).is_none());
        assert!(m.coordinator(id).is_none());
        assert!(!m.unregister_engine(&e));
    }

    #[test]
    fn emptied_partition_is_deleted() {
        let m = fresh();
        let o = Entity::new(None);
        assert_eq!(m.object_table(None, false).map(|t| t.borrow().len()), Some(1));
        o.detach();
        assert!(m.object_table(None, false).is_none());
    }

    // ── stage order ───────────────────────────────────────────────────────

    #[test]
    fn stages_run_in_fixed_order_around_animations_and_post_render() {
        let _m = fresh();
        let e = engine();
        let o = e.create_entity();
        let log: Log = Default::default();

        for stage in Stage::ALL.iter().rev() {
            let l = Rc::clone(&log);
            o.queue_update(*stage, move |_| push(&l, stage.as_str()));
        }
        let l = Rc::clone(&log);
        e.on_animation_frame(move |_| push(&l, "animations"));
        let l = Rc::clone(&log);
        e.on_post_render(move |_| push(&l, "post_render"));

        global().tick_with(frame(0));
        assert_eq!(
            *log.borrow(),
            vec![
                "READ_1", "WRITE_1", "READ_2", "WRITE_2", "animations", "READ_3", "WRITE_3",
                "post_render"
            ]
        );
    }

    #[test]
    fn every_engine_reads_before_any_engine_writes() {
        let _m = fresh();
        let e1 = engine();
        let e2 = engine();
        let a = e1.create_entity();
        let b = e2.create_entity();
        let log: Log = Default::default();

        for (name, o) in [("e1", &a), ("e2", &b)] {
            let l = Rc::clone(&log);
            o.queue_update(Stage::Write1, move |_| push(&l, format!("{name} write")));
            let l = Rc::clone(&log);
            o.queue_update(Stage::Read1, move |_| push(&l, format!("{name} read")));
        }

        global().tick_with(frame(0));
        assert_eq!(*log.borrow(), vec!["e1 read", "e2 read", "e1 write", "e2 write"]);
    }

    #[test]
    fn work_runs_only_in_the_owning_engine() {
        let _m = fresh();
        let e1 = engine();
        let e2 = engine();
        let o1 = e1.create_entity();
        let seen: Log = Default::default();
        let hits = Rc::new(Cell::new(0));

        for (name, e) in [("e1", &e1), ("e2", &e2)] {
            let s = Rc::clone(&seen);
            e.on_stage(move |ev| {
                if ev.stage == Stage::Write1 {
                    push(&s, name);
                }
            });
        }
        let h = Rc::clone(&hits);
        o1.queue_update(Stage::Write1, move |_| h.set(h.get() + 1));

        global().tick_with(frame(0));
        assert_eq!(*seen.borrow(), vec!["e1", "e2"]);
        assert_eq!(hits.get(), 1);

        global().tick_with(frame(1));
        assert_eq!(hits.get(), 1);
    }

    // ── queue semantics ───────────────────────────────────────────────────

    #[test]
    fn keyed_updates_coalesce_within_a_frame() {
        let _m = fresh();
        let e = engine();
        let o = e.create_entity();
        let log: Log = Default::default();

        let l = Rc::clone(&log);
        let first = o.queue_update_keyed(Stage::Read2, "measure", move |_| push(&l, "a"));
        let l = Rc::clone(&log);
        let second = o.queue_update_keyed(Stage::Read2, "measure", move |_| push(&l, "b"));
        assert_eq!(first, second);
        assert_eq!(global().pending_callbacks(Stage::Read2), 2);

        global().tick_with(frame(0));
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn work_queued_during_a_stage_waits_for_the_next_frame() {
        let _m = fresh();
        let e = engine();
        let o = e.create_entity();
        let log: Log = Default::default();

        let l = Rc::clone(&log);
        let inner = o.clone();
        o.queue_update(Stage::Write1, move |t| {
            push(&l, format!("outer {}", t.frame_index));
            let l = Rc::clone(&l);
            inner.queue_update(Stage::Write1, move |t| push(&l, format!("inner {}", t.frame_index)));
        });

        global().tick_with(frame(0));
        assert_eq!(*log.borrow(), vec!["outer 0"]);
        global().tick_with(frame(1));
        assert_eq!(*log.borrow(), vec!["outer 0", "inner 1"]);
    }

    #[test]
    fn work_queued_for_a_later_stage_runs_in_the_same_frame() {
        let _m = fresh();
        let e = engine();
        let o = e.create_entity();
        let log: Log = Default::default();

        let l = Rc::clone(&log);
        let inner = o.clone();
        o.queue_update(Stage::Read1, move |_| {
            let l = Rc::clone(&l);
            inner.queue_update(Stage::Write3, move |t| push(&l, format!("write3 {}", t.frame_index)));
        });

        global().tick_with(frame(0));
        assert_eq!(*log.borrow(), vec!["write3 0"]);
    }

    #[test]
    fn engine_registered_mid_frame_drains_later_stages() {
        let _m = fresh();
        let e1 = engine();
        let o1 = e1.create_entity();
        let hits = Rc::new(Cell::new(0));
        let late: Rc<RefCell<Option<Rc<Engine>>>> = Default::default();

        let h = Rc::clone(&hits);
        let slot = Rc::clone(&late);
        o1.queue_update(Stage::Read1, move |_| {
            let e2 = engine();
            let o2 = e2.create_entity();
            let h = Rc::clone(&h);
            o2.queue_update(Stage::Write1, move |_| h.set(h.get() + 1));
            *slot.borrow_mut() = Some(e2);
        });

        global().tick_with(frame(0));
        assert_eq!(hits.get(), 1);
        assert!(late.borrow().is_some());

        global().tick_with(frame(1));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn add_callback_fails_after_the_stage_drained() {
        let _m = fresh();
        let e = engine();
        let o = e.create_entity();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let handle = o.queue_update(Stage::Read1, move |_| h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        handle.add_callback(move |_| h.set(h.get() + 10)).expect("entry pending");

        global().tick_with(frame(0));
        assert_eq!(hits.get(), 11);
        assert_eq!(
            handle.add_callback(|_| {}),
            Err(EngineError::EntryConsumed {
                entity: o.id(),
                stage: Stage::Read1
            })
        );
    }

    #[test]
    fn ownerless_work_is_run_by_the_scheduler() {
        let _m = fresh();
        let _e = engine();
        let o = Entity::new(None);
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        o.queue_update(Stage::Write2, move |_| h.set(h.get() + 1));
        global().tick_with(frame(0));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn work_of_unregistered_engines_is_dropped() {
        let _m = fresh();
        let _keep = engine();
        let gone = engine();
        let o = gone.create_entity();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        o.queue_update(Stage::Read1, move |_| h.set(h.get() + 1));
        gone.unregister();

        global().tick_with(frame(0));
        assert_eq!(hits.get(), 0);
        assert_eq!(global().pending_callbacks(Stage::Read1), 0);
    }

    // ── error boundary ────────────────────────────────────────────────────

    #[test]
    fn panicking_engine_does_not_stop_the_frame() {
        let _m = fresh();
        let bad = engine();
        let good = engine();
        let a = bad.create_entity();
        let b = good.create_entity();
        let log: Log = Default::default();

        a.queue_update(Stage::Read1, |_| panic!("layout exploded"));
        let l = Rc::clone(&log);
        b.queue_update(Stage::Read1, move |_| push(&l, "good read1"));
        let l = Rc::clone(&log);
        a.queue_update(Stage::Write1, move |_| push(&l, "bad write1"));

        assert!(global().tick_with(frame(0)));
        assert_eq!(*log.borrow(), vec!["good read1", "bad write1"]);

        assert!(global().tick_with(frame(1)));
        assert_eq!(global().frames_run(), 2);
    }

    #[test]
    fn reset_forgets_engines() {
        let m = fresh();
        let e = engine();
        assert!(m.is_running());

        GlobalManager::reset();
        assert!(!m.is_running());
        assert_eq!(e.id(), None);
        assert_eq!(global().engine_count(), 0);
    }
}
