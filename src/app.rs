//! Window, event loop and per-frame rendering.

use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use crate::assets;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::interaction::{InputEvent, InteractionState, ScrollDirection, ViewParams, HELP_TEXT};
use crate::renderer::Renderer;

/// Owns the interaction state and the pointer bits winit reports separately
/// from button presses.
pub struct SceneController {
    state: InteractionState,
    cursor: PhysicalPosition<f64>,
    modifier_held: bool,
}

impl SceneController {
    pub fn new(params: ViewParams) -> Self {
        Self {
            state: InteractionState::new(params),
            cursor: PhysicalPosition::new(0.0, 0.0),
            modifier_held: false,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Feeds a window event through the interaction state machine. Returns
    /// true when the event was consumed.
    pub fn input(&mut self, event: &WindowEvent<'_>) -> bool {
        let Some(input) = self.translate(event) else {
            return false;
        };
        let (next, consumed) = self.state.apply(input);
        self.state = next;
        consumed
    }

    fn translate(&mut self, event: &WindowEvent<'_>) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifier_held = modifiers.ctrl() || modifiers.logo();
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                Some(InputEvent::PointerMove {
                    x: position.x,
                    y: position.y,
                })
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => Some(match state {
                ElementState::Pressed => InputEvent::PointerDown {
                    x: self.cursor.x,
                    y: self.cursor.y,
                    modifier: self.modifier_held,
                },
                ElementState::Released => InputEvent::PointerUp,
            }),
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y as f64,
                    MouseScrollDelta::PixelDelta(px) => px.y,
                };
                // Positive wheel deltas scroll up, which zooms in.
                if amount > 0.0 {
                    Some(InputEvent::Scroll(ScrollDirection::In))
                } else if amount < 0.0 {
                    Some(InputEvent::Scroll(ScrollDirection::Out))
                } else {
                    None
                }
            }
            WindowEvent::ReceivedCharacter(c) => Some(InputEvent::Key(*c)),
            _ => None,
        }
    }
}

fn window_title(base: &str, help_visible: bool) -> String {
    if help_visible {
        format!("{base} (help shown in log)")
    } else {
        format!("{base} (press h for help)")
    }
}

//
// =========== MAIN + EVENT LOOP ===========
//

/// Loads the sky tables, opens the window and runs the event loop. Only
/// returns on a startup failure; a failed table load never reaches the window.
pub async fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    config.validate()?;
    let tables = assets::load_tables(&config.assets)?;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(window_title(&config.window.title, false))
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
        .build(&event_loop)?;

    let renderer = Renderer::new(&window, &tables, &config).await?;
    drop(tables);

    let initial = config
        .display
        .initial_preset
        .and_then(ViewParams::preset)
        .unwrap_or_default();
    let controller = SceneController::new(initial);
    log::info!("starting with {:?}", initial);

    event_loop_body(event_loop, window, renderer, controller, config.window.title)
}

fn event_loop_body(
    event_loop: EventLoop<()>,
    window: Window,
    renderer: Renderer,
    mut controller: SceneController,
    title: String,
) -> ! {
    let mut renderer = Some(renderer);
    let mut help_visible = controller.state().help_visible;

    event_loop.run(move |event, _, control_flow| {
        if let Event::LoopDestroyed = event {
            if let Some(state) = renderer.take() {
                state.shutdown();
            }
            return;
        }
        let Some(state) = renderer.as_mut() else {
            return;
        };
        match &event {
            Event::WindowEvent { event, window_id } if *window_id == window.id() => {
                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => *control_flow = ControlFlow::Exit,

                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        state.resize(**new_inner_size);
                    }
                    _ => {
                        controller.input(event);
                        let visible = controller.state().help_visible;
                        if visible != help_visible {
                            help_visible = visible;
                            if visible {
                                log::info!("\n{HELP_TEXT}");
                            }
                            window.set_title(&window_title(&title, visible));
                        }
                    }
                }
            }
            Event::RedrawRequested(_) => {
                state.update(&controller.state().params);
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {:?}", e),
                }
            }
            Event::MainEventsCleared => {
                // keep redrawing
                window.request_redraw();
            }
            _ => {}
        }
    })
}
