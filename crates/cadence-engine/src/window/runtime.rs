use anyhow::{Context, Result};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::{EngineConfig, SchedulerConfig};
use crate::coords::Rect;
use crate::core::{logical_size, App as CoreApp, AppControl, FrameCtx, SurfaceCtx, WindowCtx};
use crate::input::platform::translate_window_event;
use crate::input::PointerState;
use crate::scheduler::{global, FrameDriver, GlobalManager};
use crate::surface::Engine;
use crate::time::FrameTime;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Engine settings for the window's surface. Bounds follow the window size.
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "cadence".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            engine: EngineConfig::default(),
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn create_window(&mut self, config: RuntimeConfig) {
        self.commands.push(Command::CreateWindow(config));
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.commands.push(Command::CloseWindow(id));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    CreateWindow(RuntimeConfig),
    CloseWindow(WindowId),
    Exit,
}

/// Frame driver backed by the event loop: a request arms the next `about_to_wait` tick.
struct EventLoopDriver {
    pending: Rc<Cell<bool>>,
}

impl FrameDriver for EventLoopDriver {
    fn request_frame(&self) {
        self.pending.set(true);
    }

    fn cancel_frame(&self) {
        self.pending.set(false);
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(initial: RuntimeConfig, scheduler: SchedulerConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let pending = Rc::new(Cell::new(false));
        let manager = GlobalManager::install(scheduler);
        manager.set_driver(Box::new(EventLoopDriver {
            pending: Rc::clone(&pending),
        }));

        let mut state = AppState::new(initial, app, pending);
        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        GlobalManager::reset();
        Ok(())
    }
}

struct WindowEntry {
    window: Window,
    engine: Rc<Engine>,
    pointer: PointerState,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    app: A,

    windows: HashMap<WindowId, WindowEntry>,
    exit_requested: bool,

    origin: Instant,
    frame_pending: Rc<Cell<bool>>,
    next_frame: Instant,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, app: A, frame_pending: Rc<Cell<bool>>) -> Self {
        let now = Instant::now();
        Self {
            initial,
            app,
            windows: HashMap::new(),
            exit_requested: false,
            origin: now,
            frame_pending,
            next_frame: now,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn timestamp_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn create_window_entry(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: RuntimeConfig,
    ) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let (w, h) = logical_size(&window);
        let engine = Engine::new(config.engine.with_bounds(Rect::new(0.0, 0.0, w, h)));
        let engine_id = engine.register();
        log::info!("window {id:?} bound to {engine_id}");

        let mut runtime_ctx = RuntimeCtx::default();
        let control = {
            let mut ctx = SurfaceCtx {
                window: WindowCtx { id, window: &window },
                engine: &engine,
                runtime: &mut runtime_ctx,
            };
            self.app.on_surface_created(&mut ctx)
        };

        self.windows.insert(
            id,
            WindowEntry {
                window,
                engine,
                pointer: PointerState::default(),
            },
        );

        if control == AppControl::Exit {
            runtime_ctx.exit();
        }
        self.apply_commands(event_loop, runtime_ctx);
        Ok(id)
    }

    fn destroy_window_entry(&mut self, id: WindowId) {
        if let Some(entry) = self.windows.remove(&id) {
            entry.engine.unregister();
        }
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::CreateWindow(cfg) => {
                    if let Err(e) = self.create_window_entry(event_loop, cfg) {
                        log::error!("failed to create window: {e:#}");
                        self.request_exit();
                    }
                }
                Command::CloseWindow(id) => self.destroy_window_entry(id),
                Command::Exit => self.request_exit(),
            }
        }

        if self.windows.is_empty() {
            self.request_exit();
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    /// Runs one scheduler frame if one was requested and the frame interval elapsed.
    fn drive_frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if !self.frame_pending.get() || now < self.next_frame {
            return;
        }
        self.frame_pending.set(false);

        let manager = global();
        let interval = manager.config().frame_interval;
        self.next_frame = now + interval;

        if !manager.tick() {
            return;
        }

        let time = manager
            .last_frame()
            .unwrap_or_else(|| FrameTime::synthetic(manager.frames_run(), self.timestamp_ms()));

        let mut runtime_ctx = RuntimeCtx::default();
        let control = {
            let mut ctx = FrameCtx {
                time,
                frames_run: manager.frames_run(),
                runtime: &mut runtime_ctx,
            };
            self.app.on_frame(&mut ctx)
        };
        if control == AppControl::Exit {
            runtime_ctx.exit();
        }
        self.apply_commands(event_loop, runtime_ctx);
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop, self.initial.clone()) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit();
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        self.drive_frame(event_loop);

        if self.frame_pending.get() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let timestamp_ms = self.timestamp_ms();
        let Some(entry) = self.windows.get_mut(&window_id) else {
            return;
        };

        if let Some(input) = translate_window_event(&entry.window, &entry.pointer, &event, timestamp_ms) {
            for raw in entry.pointer.apply(input) {
                entry.engine.dispatch_pointer(&raw);
            }
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.request_exit();
            event_loop.exit();
            return;
        }

        // Runtime-managed window lifecycle / resize handling.
        match &event {
            WindowEvent::CloseRequested => {
                self.destroy_window_entry(window_id);
                if self.windows.is_empty() {
                    self.request_exit();
                    event_loop.exit();
                }
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.windows.get(&window_id) {
                    let (w, h) = logical_size(&entry.window);
                    entry.engine.set_bounds(Rect::new(0.0, 0.0, w, h));
                    log::debug!("{window_id:?} resized to {w}x{h}");
                }
            }

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
