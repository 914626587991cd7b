//! The winit event loop and its windows.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use mullion_graphics::UiPoint;
use mullion_render_common::RenderWindow;
use mullion_shell::{
    PlatformWindow, SharedWindow, WindowError, WindowEvent, WindowOptions, WindowSystem,
};
use mullion_ui::{CursorKind, Modifiers};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent as OsEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder, WindowId};

use crate::translate;
use crate::translate::DoubleClickTracker;

/// Window system backed by a winit event loop.
///
/// Each [`pump`](WindowSystem::pump) runs one non-blocking sweep of
/// the OS queue and parks every event on the window it targets. The
/// registry holds weak references, so dropping the last shared handle
/// closes the OS window; dead entries are pruned on the next sweep.
pub struct WinitWindowSystem {
    event_loop: EventLoop<()>,
    windows: Rc<RefCell<HashMap<WindowId, Weak<RefCell<WinitPlatformWindow>>>>>,
}

impl WinitWindowSystem {
    pub fn new() -> Result<Self, WindowError> {
        let event_loop = EventLoop::new().map_err(|error| WindowError::EventLoop {
            message: error.to_string(),
        })?;
        Ok(Self {
            event_loop,
            windows: Rc::new(RefCell::new(HashMap::new())),
        })
    }
}

impl WindowSystem for WinitWindowSystem {
    fn pump(&mut self) {
        let windows = self.windows.clone();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _target| {
                if let Event::WindowEvent { window_id, event } = event {
                    let target = windows.borrow().get(&window_id).and_then(Weak::upgrade);
                    if let Some(window) = target {
                        window.borrow_mut().on_event(event);
                    }
                }
            });
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop asked to exit with code {code}");
        }
        self.windows
            .borrow_mut()
            .retain(|_, window| window.strong_count() > 0);
    }

    fn create_window(&mut self, options: &WindowOptions) -> Result<SharedWindow, WindowError> {
        let mut builder = WindowBuilder::new()
            .with_title(&options.title)
            .with_inner_size(PhysicalSize::new(options.width, options.height))
            .with_decorations(options.decorations);
        if let Some(position) = options.position {
            builder = builder.with_position(PhysicalPosition::new(position.x, position.y));
        }
        let window = builder
            .build(&self.event_loop)
            .map_err(|error| WindowError::Creation {
                message: error.to_string(),
            })?;
        let id = window.id();
        log::debug!(
            "created a {}x{} os window {id:?}",
            options.width,
            options.height
        );
        let shared = Rc::new(RefCell::new(WinitPlatformWindow::new(window)));
        self.windows.borrow_mut().insert(id, Rc::downgrade(&shared));
        Ok(shared)
    }
}

/// One OS window plus the shell events swept onto it since the last
/// drain.
pub struct WinitPlatformWindow {
    window: Window,
    events: Vec<WindowEvent>,
    closed: bool,
    /// Last reported cursor position, attached to button and wheel
    /// events since winit does not carry one itself.
    cursor: UiPoint,
    modifiers: Modifiers,
    clicks: DoubleClickTracker,
}

impl WinitPlatformWindow {
    fn new(window: Window) -> Self {
        Self {
            window,
            events: Vec::new(),
            closed: false,
            cursor: UiPoint::ZERO,
            modifiers: Modifiers::NONE,
            clicks: DoubleClickTracker::new(),
        }
    }

    fn on_event(&mut self, event: OsEvent) {
        match event {
            OsEvent::CloseRequested => {
                self.closed = true;
            }
            OsEvent::Resized(size) => {
                self.events.push(WindowEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            OsEvent::CursorMoved { position, .. } => {
                self.cursor = UiPoint::new(position.x as i32, position.y as i32);
                self.events.push(WindowEvent::MouseMove {
                    position: self.cursor,
                });
            }
            OsEvent::MouseInput { state, button, .. } => {
                let Some(button) = translate::translate_button(button) else {
                    return;
                };
                let position = self.cursor;
                self.events.push(match state {
                    ElementState::Pressed => {
                        if self.clicks.register(button, position, Instant::now()) {
                            WindowEvent::MouseDoubleClick { button, position }
                        } else {
                            WindowEvent::MouseDown { button, position }
                        }
                    }
                    ElementState::Released => WindowEvent::MouseUp { button, position },
                });
            }
            OsEvent::MouseWheel { delta, .. } => {
                let steps = translate::wheel_steps(delta);
                if steps != 0 {
                    self.events.push(WindowEvent::MouseWheel {
                        delta: steps,
                        position: self.cursor,
                    });
                }
            }
            OsEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let key = translate::translate_key(code);
                let modifiers = self.modifiers;
                self.events.push(match state {
                    ElementState::Pressed => WindowEvent::KeyDown { key, modifiers },
                    ElementState::Released => WindowEvent::KeyUp { key, modifiers },
                });
            }
            OsEvent::ModifiersChanged(modifiers) => {
                self.modifiers = translate::translate_modifiers(modifiers.state());
            }
            _ => {}
        }
    }
}

impl PlatformWindow for WinitPlatformWindow {
    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn position(&self) -> UiPoint {
        match self.window.outer_position() {
            Ok(position) => UiPoint::new(position.x, position.y),
            // Wayland reports no desktop position.
            Err(_) => UiPoint::ZERO,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        let _ = self
            .window
            .request_inner_size(PhysicalSize::new(width, height));
    }

    fn set_position(&mut self, position: UiPoint) {
        self.window
            .set_outer_position(PhysicalPosition::new(position.x, position.y));
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.window
            .set_cursor_icon(translate::translate_cursor(cursor));
    }

    fn closed(&self) -> bool {
        self.closed
    }

    fn take_events(&mut self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.events)
    }

    fn render_window(&self) -> &dyn RenderWindow {
        &self.window
    }
}
