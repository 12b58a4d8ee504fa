use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState};
use crate::time::FrameClock;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "pixelshade".to_string(),
            initial_size: LogicalSize::new(960.0, 720.0),
        }
    }
}

pub struct Runtime;

impl Runtime {
    /// Opens the window and redraws continuously until `app` exits, the window
    /// closes, or something fails.
    ///
    /// Window or GPU setup failures and errors from `App::on_frame` are returned.
    pub fn run<A: App + 'static>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create the event loop")?;
        let mut driver = Driver {
            config,
            gpu_init,
            app,
            entry: None,
            error: None,
            stopped: false,
        };
        event_loop
            .run_app(&mut driver)
            .context("event loop failed")?;

        driver.error.map_or(Ok(()), Err)
    }
}

/// The window with everything that lives as long as it does.
#[self_referencing]
struct WindowEntry {
    input: InputState,
    input_frame: InputFrame,
    clock: FrameClock,
    window: Window,
    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowEntry {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create the window")?;

        WindowEntryTryBuilder {
            input: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")
    }

    fn request_redraw(&self) {
        self.borrow_window().request_redraw();
    }

    fn feed_input(&mut self, event: &WindowEvent) {
        self.with_mut(|f| {
            if let Some(ev) = translate_window_event(event, f.window.scale_factor()) {
                f.input.apply_event(f.input_frame, ev);
            }
        });
    }

    fn sync_size(&mut self) {
        self.with_mut(|f| f.gpu.resize(f.window.inner_size()));
    }

    fn frame<A: App>(&mut self, id: WindowId, app: &mut A) -> Result<AppControl> {
        self.with_mut(|f| {
            let mut ctx = FrameCtx {
                window: WindowCtx { id, window: f.window },
                gpu: f.gpu,
                input: f.input,
                input_frame: f.input_frame,
                time: f.clock.tick(),
            };
            let control = app.on_frame(&mut ctx);
            f.input_frame.clear();
            control
        })
    }
}

struct Driver<A> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    // Dropped before the event loop returns, so the GPU goes before the app.
    entry: Option<WindowEntry>,
    error: Option<anyhow::Error>,
    stopped: bool,
}

impl<A: App> Driver<A> {
    fn stop(&mut self, event_loop: &ActiveEventLoop, error: Option<anyhow::Error>) {
        if let Some(e) = error {
            log::error!("{e:#}");
            self.error.get_or_insert(e);
        }
        self.stopped = true;
        self.entry = None;
        event_loop.exit();
    }
}

impl<A: App> ApplicationHandler for Driver<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.stopped {
            return;
        }
        match WindowEntry::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(entry) => {
                entry.request_redraw();
                self.entry = Some(entry);
            }
            Err(e) => self.stop(event_loop, Some(e)),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.stopped {
            event_loop.exit();
            return;
        }
        // The light moves every frame; Fifo presentation paces the loop.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.entry {
            entry.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        entry.feed_input(&event);
        if self.app.on_window_event(id, &event) == AppControl::Exit {
            self.stop(event_loop, None);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.stop(event_loop, None),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                entry.sync_size();
                entry.request_redraw();
            }
            WindowEvent::RedrawRequested => match entry.frame(id, &mut self.app) {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => self.stop(event_loop, None),
                Err(e) => self.stop(event_loop, Some(e)),
            },
            _ => {}
        }
    }
}
