//! Window/event-loop driver.
//!
//! easel keeps the original blocking call shape (`refresh`, `wait_*`), so
//! instead of handing the thread to `EventLoop::run_app`, the driver pumps
//! the winit event loop cooperatively with `pump_app_events` from inside
//! those calls. Exactly one window exists per driver, and at most one
//! driver exists per process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

use crate::gpu::Gpu;
use crate::input::{winit_map, InputQueue, InputState};

/// Process-wide single-window guard. Opening a second window while one is
/// open is an error by design; there is no sensible meaning for it in a
/// single-threaded teaching API.
static WINDOW_OPEN: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
pub(crate) struct DriverConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub fullscreen: bool,
}

struct Handler {
    config: DriverConfig,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    input: InputState,
    queue: InputQueue,
    closed: bool,
}

impl Handler {
    fn new(config: DriverConfig) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            input: InputState::default(),
            queue: InputQueue::default(),
            closed: false,
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.gpu = None;
        self.window = None;
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.closed {
            return;
        }

        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        if self.config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                self.close();
                return;
            }
        };

        match pollster::block_on(Gpu::new(window.clone())) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("GPU initialization failed: {e:#}");
                self.close();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match &event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.close();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(*new_size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) {
                    gpu.resize(window.inner_size());
                }
            }
            _ => winit_map::apply_window_event(&mut self.input, &mut self.queue, &event),
        }
    }
}

/// Owns the event loop, window, GPU context and input state.
pub(crate) struct Driver {
    event_loop: EventLoop<()>,
    handler: Handler,
}

impl Driver {
    /// Creates the window and initializes the GPU, pumping the event loop
    /// until both exist.
    pub fn open(config: DriverConfig) -> Result<Self> {
        if WINDOW_OPEN.swap(true, Ordering::SeqCst) {
            anyhow::bail!("a window is already open; easel supports one window at a time");
        }

        let event_loop = match EventLoop::new().context("failed to create event loop") {
            Ok(el) => el,
            Err(e) => {
                WINDOW_OPEN.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let mut driver = Self { event_loop, handler: Handler::new(config) };

        // `resumed` fires during the first pump; wait for it to finish
        // window + GPU setup (or fail).
        while driver.handler.window.is_none() && !driver.handler.closed {
            driver.pump();
        }

        if driver.handler.closed {
            anyhow::bail!("window setup failed");
        }
        Ok(driver)
    }

    /// Processes pending window events without blocking.
    pub fn pump(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);
        if let PumpStatus::Exit(_) = status {
            self.handler.close();
        }
    }

    pub fn alive(&self) -> bool {
        !self.handler.closed && self.handler.window.is_some()
    }

    pub fn close(&mut self) {
        self.handler.close();
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.handler.window.as_ref()
    }

    pub fn gpu(&self) -> Option<&Gpu> {
        self.handler.gpu.as_ref()
    }

    pub fn gpu_mut(&mut self) -> Option<&mut Gpu> {
        self.handler.gpu.as_mut()
    }

    pub fn input(&self) -> &InputState {
        &self.handler.input
    }

    pub fn queue_mut(&mut self) -> &mut InputQueue {
        &mut self.handler.queue
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        WINDOW_OPEN.store(false, Ordering::SeqCst);
    }
}
