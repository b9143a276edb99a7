use std::cell::Cell;
use std::rc::{Rc, Weak};

use anyhow::{Context, Result};
use cadence_engine::prelude::*;
use winit::dpi::LogicalSize;
use winit::window::CursorIcon;

const CARD_SIZE: f32 = 120.0;
const WHEEL_ZOOM_STEP: f32 = 0.0015;

/// Subscriber ids used on every window's coordinator.
const GESTURE_LOG: SubscriberId = SubscriberId(1);
const DRAG_LOG: SubscriberId = SubscriberId(2);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let initial = RuntimeConfig {
        title: "cadence studio".to_string(),
        initial_size: LogicalSize::new(960.0, 640.0),
        engine: EngineConfig::default().from_env(),
    };

    Runtime::run(initial, SchedulerConfig::default(), Studio::default())
        .context("studio runtime failed")
}

/// A draggable square whose hit area follows its transform.
struct Card {
    entity: Entity,
    control: Rc<InputControl>,
}

impl Card {
    fn spawn(engine: &Rc<Engine>, at: Vec2) -> Result<Self> {
        let entity = engine.create_entity();
        entity.set_transform(Transform { translation: at, scale: 1.0 });

        let control = InputControl::local(&entity)
            .with_context(|| format!("failed to attach a control to {}", entity.id()))?;
        control.set_hit_area(Some(card_rect(at)));

        let card = Self { entity, control };
        card.wire_drag();
        Ok(card)
    }

    fn wire_drag(&self) {
        let grabbed = Rc::new(Cell::new(Vec2::ZERO));

        let entity = self.entity.clone();
        let origin = Rc::clone(&grabbed);
        self.control.on(InputEventKind::DragStart, move |_| {
            origin.set(entity.transform().translation);
        });

        let entity = self.entity.clone();
        let control: Weak<InputControl> = Rc::downgrade(&self.control);
        self.control.on(InputEventKind::Drag, move |ev| {
            let InputEvent::Drag(drag) = ev else {
                return;
            };
            let target = grabbed.get() + drag.delta.world;
            let moved = entity.clone();
            let control = control.clone();
            // Moves coalesce into one write per frame.
            entity.queue_update_keyed(Stage::Write1, "move", move |_| {
                moved.set_transform(Transform { translation: target, scale: 1.0 });
                if let Some(control) = control.upgrade() {
                    control.set_hit_area(Some(card_rect(target)));
                }
            });
        });
    }
}

fn card_rect(at: Vec2) -> Rect {
    Rect::new(at.x, at.y, CARD_SIZE, CARD_SIZE)
}

#[derive(Default)]
struct Studio {
    windows: usize,
    cards: Vec<Card>,
    disposers: Vec<Disposer>,
}

impl Studio {
    fn wire_camera(&mut self, engine: &Rc<Engine>, bounds: Rect) -> Result<()> {
        let camera = Rc::new(PanZoomCamera::new(Viewport::new(bounds.size.x, bounds.size.y)));
        engine.set_camera(camera.clone());

        let global = engine
            .global_input()
            .context("engine-wide input control unavailable")?;

        let zoom = Rc::clone(&camera);
        self.disposers.push(global.on(InputEventKind::Wheel, move |ev| {
            if let InputEvent::Wheel(wheel) = ev {
                zoom.set_zoom(zoom.zoom() * (1.0 - wheel.delta.y * WHEEL_ZOOM_STEP));
            }
        }));

        let pinch_base = Rc::new(Cell::new(1.0_f32));
        let base = Rc::clone(&pinch_base);
        let zoom = Rc::clone(&camera);
        self.disposers.push(global.on(InputEventKind::PinchStart, move |_| {
            base.set(zoom.zoom());
        }));
        self.disposers.push(global.on(InputEventKind::Pinch, move |ev| {
            if let InputEvent::Pinch(pinch) = ev {
                camera.set_zoom(pinch_base.get() * pinch.scale());
            }
        }));
        Ok(())
    }

    fn wire_logging(&mut self, engine: &Rc<Engine>) -> Result<()> {
        let coordinator = engine
            .coordinator()
            .context("engine has no input coordinator")?;

        for kind in [InputEventKind::PinchStart, InputEventKind::PinchEnd] {
            coordinator.subscribe(kind, GESTURE_LOG, Some(engine), move |engine, ev| {
                if let InputEvent::PinchStart(p) | InputEvent::PinchEnd(p) = ev {
                    log::info!("{engine}: {kind} {} (scale {:.2})", p.key, p.scale());
                }
            });
        }
        coordinator.subscribe(InputEventKind::DragEnd, DRAG_LOG, Some(engine), |engine, ev| {
            if let InputEvent::DragEnd(end) = ev {
                log::debug!(
                    "{engine}: drag of {:?} ended ({:?}) at {:?}",
                    end.pointer,
                    end.reason,
                    end.end.world
                );
            }
        });

        self.disposers.push(engine.on_stage(|ev| {
            if ev.callbacks > 0 {
                log::trace!("{} {}: {} callback(s)", ev.engine, ev.stage, ev.callbacks);
            }
        }));
        Ok(())
    }

    fn populate(&mut self, engine: &Rc<Engine>) -> Result<()> {
        for i in 0..3 {
            let at = Vec2::new(80.0 + i as f32 * 180.0, 120.0);
            self.cards.push(Card::spawn(engine, at)?);
        }
        Ok(())
    }
}

impl App for Studio {
    fn on_surface_created(&mut self, ctx: &mut SurfaceCtx<'_>) -> AppControl {
        self.windows += 1;
        ctx.window.set_cursor(CursorIcon::Grab);

        let bounds = ctx.window.bounds();
        let wired = self
            .wire_camera(ctx.engine, bounds)
            .and_then(|()| self.wire_logging(ctx.engine))
            .and_then(|()| self.populate(ctx.engine));
        if let Err(e) = wired {
            log::error!("failed to set up surface: {e:#}");
            return AppControl::Exit;
        }

        if self.windows == 1 {
            ctx.runtime.create_window(RuntimeConfig {
                title: "cadence studio (second view)".to_string(),
                initial_size: LogicalSize::new(640.0, 480.0),
                ..RuntimeConfig::default()
            });
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if ctx.frames_run % 600 == 0 {
            log::debug!(
                "frame {} ({:.1} ms), {} card(s)",
                ctx.frames_run,
                ctx.time.dt * 1000.0,
                self.cards.len()
            );
        }
        AppControl::Continue
    }
}
