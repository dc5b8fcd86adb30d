use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use tracing::{error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::WindowBuilder;

use crate::field::FieldHost;
use crate::types::{RendererConfig, SurfaceAlpha};

/// Produces a fresh configuration when the user asks for a reload.
pub type ConfigReloader = Box<dyn FnMut() -> Result<RendererConfig>>;

/// Entry point that opens the host window and drives the field until it closes.
pub struct Renderer {
    config: RendererConfig,
    reloader: Option<ConfigReloader>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            reloader: None,
        }
    }

    /// Installs the callback used when `R` is pressed.
    pub fn with_reloader(mut self, reloader: ConfigReloader) -> Self {
        self.reloader = Some(reloader);
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Blocks on the winit event loop.
    pub fn run(self) -> Result<()> {
        let Self {
            config,
            mut reloader,
        } = self;

        let event_loop =
            EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let (width, height) = config.surface_size;
        let window = WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_transparent(config.surface_alpha == SurfaceAlpha::Transparent)
            .build(&event_loop)
            .map_err(|err| anyhow!("failed to create window: {err}"))?;
        let window = Arc::new(window);

        let mut host = FieldHost::new(window.clone());
        if !host.mount(&config)? {
            info!("no GPU available; window stays empty");
        }

        event_loop
            .run(move |event, elwt| match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        host.unmount();
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if is_reload_key(&event) {
                            if let Some(reload) = reloader.as_mut() {
                                reload_field(&mut host, reload);
                            }
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        host.pointer_moved(position);
                    }
                    WindowEvent::Resized(size) => {
                        host.resize(size);
                    }
                    WindowEvent::RedrawRequested => match host.redraw(Instant::now()) {
                        None | Some(Ok(_)) => {}
                        Some(Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                            host.recover_surface();
                        }
                        Some(Err(wgpu::SurfaceError::OutOfMemory)) => {
                            error!("surface out of memory; exiting");
                            host.unmount();
                            elwt.exit();
                        }
                        Some(Err(wgpu::SurfaceError::Timeout)) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Some(Err(other)) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    },
                    _ => {}
                },
                Event::LoopExiting => {
                    host.unmount();
                }
                _ => {}
            })
            .map_err(|err| anyhow!("window event loop error: {err}"))
    }
}

fn is_reload_key(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && !event.repeat
        && matches!(&event.logical_key, Key::Character(value) if value.eq_ignore_ascii_case("r"))
}

fn reload_field(host: &mut FieldHost, reload: &mut ConfigReloader) {
    let config = match reload() {
        Ok(config) => config,
        Err(err) => {
            error!("failed to reload configuration: {err:?}");
            return;
        }
    };
    match host.reconfigure(&config) {
        Ok(true) => info!(
            rendering = host.is_rendering(),
            "configuration changed; particle field rebuilt"
        ),
        Ok(false) => info!("configuration unchanged; keeping current field"),
        Err(err) => error!("failed to rebuild particle field: {err:?}"),
    }
}
