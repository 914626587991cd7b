//! Scripted platform doubles backing the shell and pump tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mullion_graphics::UiPoint;
use mullion_render_common::{
    Backend, DeviceError, DeviceFactory, NullFonts, RecordingDevice, RecordingDeviceFactory,
    RenderWindow, SharedDevice,
};
use mullion_ui::{
    CursorKind, FrameHook, FrameId, FrameTree, KeyCode, Modifiers, PointerButton,
};
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};

use crate::shell::Shell;
use crate::theme::StaticTheme;
use crate::window::{
    PlatformWindow, SharedWindow, WindowError, WindowEvent, WindowOptions, WindowSystem,
};

/// A window that never touches an OS. Tests script events in and read
/// back the calls the shell made.
pub struct ScriptedWindow {
    pub options: WindowOptions,
    size: (u32, u32),
    position: UiPoint,
    closed: bool,
    events: Vec<WindowEvent>,
    pub cursors: Vec<CursorKind>,
    pub resizes: Vec<(u32, u32)>,
    pub moves: Vec<UiPoint>,
}

impl ScriptedWindow {
    fn new(options: &WindowOptions) -> Self {
        Self {
            options: options.clone(),
            size: (options.width, options.height),
            position: options.position.unwrap_or(UiPoint::ZERO),
            closed: false,
            events: Vec::new(),
            cursors: Vec::new(),
            resizes: Vec::new(),
            moves: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: WindowEvent) {
        self.events.push(event);
    }

    /// Scripts an OS-driven resize: the reported size changes and the
    /// matching event is queued, without recording a shell call.
    pub fn os_resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.events.push(WindowEvent::Resized { width, height });
    }

    /// Scripts the OS moving the window, as a user drag would.
    pub fn os_move(&mut self, position: UiPoint) {
        self.position = position;
    }

    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl HasWindowHandle for ScriptedWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

impl HasDisplayHandle for ScriptedWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

impl PlatformWindow for ScriptedWindow {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn position(&self) -> UiPoint {
        self.position
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.resizes.push((width, height));
    }

    fn set_position(&mut self, position: UiPoint) {
        self.position = position;
        self.moves.push(position);
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.cursors.push(cursor);
    }

    fn closed(&self) -> bool {
        self.closed
    }

    fn take_events(&mut self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.events)
    }

    fn render_window(&self) -> &dyn RenderWindow {
        self
    }
}

/// Hands out scripted windows and keeps handles for inspection after
/// the system has moved into the shell.
#[derive(Clone, Default)]
pub struct ScriptedWindowSystem {
    created: Rc<RefCell<Vec<Rc<RefCell<ScriptedWindow>>>>>,
    pumps: Rc<Cell<usize>>,
    fail_next: Rc<Cell<bool>>,
}

impl ScriptedWindowSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `index`th window ever created, oldest first.
    pub fn window(&self, index: usize) -> Rc<RefCell<ScriptedWindow>> {
        self.created.borrow()[index].clone()
    }

    pub fn window_count(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn pumps(&self) -> usize {
        self.pumps.get()
    }

    pub fn fail_next_creation(&self) {
        self.fail_next.set(true);
    }
}

impl WindowSystem for ScriptedWindowSystem {
    fn pump(&mut self) {
        self.pumps.set(self.pumps.get() + 1);
    }

    fn create_window(&mut self, options: &WindowOptions) -> Result<SharedWindow, WindowError> {
        if self.fail_next.take() {
            return Err(WindowError::Creation {
                message: "scripted failure".into(),
            });
        }
        let window = Rc::new(RefCell::new(ScriptedWindow::new(options)));
        self.created.borrow_mut().push(window.clone());
        Ok(window)
    }
}

/// Clonable wrapper around a recording factory, keeping the created
/// devices reachable after the factory moves into the shell.
#[derive(Clone, Default)]
pub struct SharedRecordingFactory {
    inner: Rc<RefCell<RecordingDeviceFactory>>,
}

impl SharedRecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `index`th device ever created, oldest first.
    pub fn device(&self, index: usize) -> Rc<RefCell<RecordingDevice>> {
        self.inner.borrow().created()[index].clone()
    }

    pub fn device_count(&self) -> usize {
        self.inner.borrow().created().len()
    }
}

impl DeviceFactory for SharedRecordingFactory {
    fn create_device(
        &mut self,
        window: &dyn RenderWindow,
        backend: Backend,
        width: u32,
        height: u32,
    ) -> Result<SharedDevice, DeviceError> {
        self.inner
            .borrow_mut()
            .create_device(window, backend, width, height)
    }
}

/// Everything a [`PumpProbe`] hook observed, in dispatch order.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeEvent {
    MouseDown(FrameId, PointerButton, UiPoint),
    DoubleClick(FrameId, PointerButton, UiPoint),
    Wheel(FrameId, UiPoint, i32),
    KeyDown(FrameId, KeyCode),
    Closed(FrameId),
}

pub type ProbeLog = Rc<RefCell<Vec<ProbeEvent>>>;

/// Hook appending the callbacks the pump is expected to deliver.
pub struct PumpProbe {
    log: ProbeLog,
}

impl PumpProbe {
    /// Installs a fresh probe on `id` and returns its log.
    pub fn install(tree: &mut FrameTree, id: FrameId) -> ProbeLog {
        let log: ProbeLog = Rc::new(RefCell::new(Vec::new()));
        let hook = PumpProbe {
            log: Rc::clone(&log),
        };
        tree.node_mut(id).set_hook(Rc::new(RefCell::new(hook)));
        log
    }
}

impl FrameHook for PumpProbe {
    fn on_mouse_down(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        position: UiPoint,
    ) {
        self.log
            .borrow_mut()
            .push(ProbeEvent::MouseDown(id, button, position));
    }

    fn on_mouse_double_click(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        position: UiPoint,
    ) {
        self.log
            .borrow_mut()
            .push(ProbeEvent::DoubleClick(id, button, position));
    }

    fn on_mouse_wheel(&mut self, _tree: &mut FrameTree, id: FrameId, position: UiPoint, delta: i32) {
        self.log
            .borrow_mut()
            .push(ProbeEvent::Wheel(id, position, delta));
    }

    fn on_key_down(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        key: KeyCode,
        _modifiers: Modifiers,
    ) {
        self.log.borrow_mut().push(ProbeEvent::KeyDown(id, key));
    }

    fn on_close(&mut self, _tree: &mut FrameTree, id: FrameId) {
        self.log.borrow_mut().push(ProbeEvent::Closed(id));
    }
}

/// A shell wired to scripted windows and recording devices, returned
/// with the handles tests use to poke both sides.
pub fn scripted_shell() -> (Shell, ScriptedWindowSystem, SharedRecordingFactory) {
    let windows = ScriptedWindowSystem::new();
    let devices = SharedRecordingFactory::new();
    let shell = Shell::new(
        windows.clone(),
        devices.clone(),
        StaticTheme::default(),
        NullFonts::new(),
    );
    (shell, windows, devices)
}
