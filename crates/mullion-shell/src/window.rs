//! The platform window seam.
//!
//! The shell talks to the OS through two traits: a [`WindowSystem`]
//! that owns the process event loop and hands out windows, and a
//! [`PlatformWindow`] per OS window. Window systems sweep the OS queue
//! once per pump tick and park each event on the window it belongs to;
//! the pump drains those queues through [`PlatformWindow::take_events`].

use std::cell::RefCell;
use std::rc::Rc;

use mullion_graphics::UiPoint;
use mullion_render_common::{Backend, RenderWindow};
use mullion_ui::{CursorKind, KeyCode, Modifiers, PointerButton};

/// One translated OS event, in window-local pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowEvent {
    MouseMove {
        position: UiPoint,
    },
    MouseDown {
        button: PointerButton,
        position: UiPoint,
    },
    MouseUp {
        button: PointerButton,
        position: UiPoint,
    },
    MouseDoubleClick {
        button: PointerButton,
        position: UiPoint,
    },
    MouseWheel {
        delta: i32,
        position: UiPoint,
    },
    KeyDown {
        key: KeyCode,
        modifiers: Modifiers,
    },
    KeyUp {
        key: KeyCode,
        modifiers: Modifiers,
    },
    Resized {
        width: u32,
        height: u32,
    },
}

/// How a root surface's OS window is created.
#[derive(Clone, Debug)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub position: Option<UiPoint>,
    pub decorations: bool,
    pub backend: Backend,
}

impl WindowOptions {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            position: None,
            decorations: true,
            backend: Backend::native(),
        }
    }

    pub fn with_position(mut self, position: UiPoint) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Undecorated window, used for surfaces nested inside another
    /// frame's window.
    pub fn borderless(mut self) -> Self {
        self.decorations = false;
        self
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::new("mullion", 800, 600)
    }
}

/// One OS window owned by a root surface.
pub trait PlatformWindow {
    /// Inner size in pixels.
    fn size(&self) -> (u32, u32);

    /// Outer position on the desktop.
    fn position(&self) -> UiPoint;

    fn resize(&mut self, width: u32, height: u32);

    fn set_position(&mut self, position: UiPoint);

    fn set_cursor(&mut self, cursor: CursorKind);

    /// True once the OS reported the window closed. A closed window
    /// yields no further events.
    fn closed(&self) -> bool;

    /// Drains the events gathered since the last call, oldest first.
    fn take_events(&mut self) -> Vec<WindowEvent>;

    /// The handle source GPU surfaces are created against. The shell
    /// keeps the window alive for as long as any such surface exists.
    fn render_window(&self) -> &dyn RenderWindow;
}

pub type SharedWindow = Rc<RefCell<dyn PlatformWindow>>;

/// Owns the OS event loop and creates windows on it.
pub trait WindowSystem {
    /// Runs one sweep of the OS event queue, distributing events onto
    /// the windows they target. Called once per pump tick.
    fn pump(&mut self);

    fn create_window(&mut self, options: &WindowOptions) -> Result<SharedWindow, WindowError>;
}

#[derive(Debug)]
pub enum WindowError {
    Creation { message: String },
    EventLoop { message: String },
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::Creation { message } => {
                write!(f, "window creation failed: {message}")
            }
            WindowError::EventLoop { message } => {
                write!(f, "event loop creation failed: {message}")
            }
        }
    }
}

impl std::error::Error for WindowError {}
