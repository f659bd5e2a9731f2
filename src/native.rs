//! Native windowed shell: winit event loop, wgpu rendering.

use std::sync::Arc;

use glam::Vec2;
use web_time::Instant;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
    window::WindowBuilder,
};

use body_gpu::{ClearColor, GpuContext, GpuError, RenderConfig};

use crate::config::ViewerConfig;
use crate::constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};
use crate::keyboard::Key;
use crate::model::LoadError;
use crate::render::SceneRenderer;
use crate::viewer::{PointerButton, Viewer};

/// Pixels per wheel "line" for devices reporting pixel deltas.
const PIXELS_PER_LINE: f64 = 20.0;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] GpuError),

    #[error("Failed to start loading the model: {0}")]
    Load(#[from] LoadError),
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Tab => Key::Tab,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        KeyCode::KeyR => Key::R,
        _ => Key::Other,
    }
}

fn map_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Open the window and run until it is closed.
pub fn run(config: ViewerConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;

    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Body Explorer")
            .with_inner_size(LogicalSize::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT))
            .build(&event_loop)?,
    );

    let mut gpu_ctx = pollster::block_on(GpuContext::new(window.clone()))?;
    let render_config = RenderConfig::default().with_clear_color(ClearColor::DARK_GRAY);
    let mut renderer = SceneRenderer::new(&gpu_ctx, render_config)?;

    let mut viewer = Viewer::new(config);
    viewer.resize(gpu_ctx.width() as f32, gpu_ctx.height() as f32);
    viewer.on_part_select(|region| match region {
        Some(region) => log::info!("Selected region: {}", region),
        None => log::info!("Selection cleared"),
    });
    viewer.on_loaded(|| log::info!("Model ready"));
    viewer.start_loading()?;

    log::info!("Controls: drag to orbit, right-drag to pan, scroll to zoom, R to reset");
    log::info!("Tab/Shift+Tab to focus hotspots, Enter or Space to select, Escape to clear");

    let mut modifiers = ModifiersState::empty();
    let mut title = String::new();
    let mut uploaded = false;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    viewer.cancel_loading();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    gpu_ctx.resize(size.width, size.height);
                    viewer.resize(gpu_ctx.width() as f32, gpu_ctx.height() as f32);
                    window.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    renderer.render(&gpu_ctx, &viewer);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    viewer.pointer_moved(Vec2::new(position.x as f32, position.y as f32));
                    window.request_redraw();
                }
                WindowEvent::CursorLeft { .. } => {
                    viewer.pointer_left();
                    window.request_redraw();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    let Some(button) = map_button(button) else {
                        return;
                    };
                    let position = viewer.pointer().unwrap_or(Vec2::ZERO);
                    match state {
                        ElementState::Pressed => viewer.pointer_pressed(button, position),
                        ElementState::Released => viewer.pointer_released(button, position),
                    }
                    window.request_redraw();
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_x, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                    };
                    viewer.wheel(lines);
                    window.request_redraw();
                }
                WindowEvent::ModifiersChanged(new) => {
                    modifiers = new.state();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state != ElementState::Pressed {
                        return;
                    }
                    if let PhysicalKey::Code(code) = event.physical_key {
                        viewer.key_pressed(map_key(code), modifiers.shift_key());
                        window.request_redraw();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let mut needs_redraw = viewer.frame(Instant::now());

                if !uploaded {
                    if let Some(scene) = viewer.model() {
                        uploaded = true;
                        needs_redraw = true;
                        if let Err(e) = renderer.upload_model(&gpu_ctx, scene) {
                            log::error!("Failed to upload model: {}", e);
                        }
                    }
                }

                let next_title = viewer.title();
                if next_title != title {
                    window.set_title(&next_title);
                    title = next_title;
                    needs_redraw = true;
                }

                // Keep polling while the load or its overlay is in flight
                if viewer.load_overlay().is_visible() {
                    elwt.set_control_flow(ControlFlow::Poll);
                    needs_redraw = true;
                }

                if needs_redraw {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}
