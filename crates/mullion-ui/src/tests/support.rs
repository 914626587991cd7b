//! Shared fixtures for the crate tests.

use std::cell::RefCell;
use std::rc::Rc;

use mullion_graphics::UiPoint;

use crate::hook::FrameHook;
use crate::input::{KeyCode, Modifiers, PointerButton};
use crate::node::FrameId;
use crate::tree::FrameTree;

/// Everything a [`Recorder`] hook observed, in dispatch order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    Moved(FrameId, UiPoint),
    Resized(FrameId, i32, i32),
    MouseMove(FrameId, UiPoint),
    MouseEnter(FrameId, UiPoint),
    MouseLeave(FrameId, UiPoint),
    MouseDown(FrameId, PointerButton, UiPoint),
    MouseUp(FrameId, PointerButton, UiPoint),
    DoubleClick(FrameId, PointerButton, UiPoint),
    Wheel(FrameId, UiPoint, i32),
    KeyDown(FrameId, KeyCode, Modifiers),
    KeyUp(FrameId, KeyCode, Modifiers),
    DragMove(FrameId, UiPoint),
    ChildAdded(FrameId, FrameId),
    ChildRemoved(FrameId, FrameId),
    ChildrenChanged(FrameId),
}

pub type EventLog = Rc<RefCell<Vec<RecordedEvent>>>;

/// Hook that appends every callback it sees to a shared log. Several
/// frames can share one log to assert cross-frame ordering.
pub struct Recorder {
    log: EventLog,
}

impl Recorder {
    /// Installs a fresh recorder on `id` and returns its log.
    pub fn install(tree: &mut FrameTree, id: FrameId) -> EventLog {
        let log: EventLog = Rc::new(RefCell::new(Vec::new()));
        Recorder::install_shared(tree, id, &log);
        log
    }

    /// Installs a recorder on `id` that appends to an existing `log`.
    pub fn install_shared(tree: &mut FrameTree, id: FrameId, log: &EventLog) {
        let hook = Recorder {
            log: Rc::clone(log),
        };
        tree.node_mut(id).set_hook(Rc::new(RefCell::new(hook)));
    }
}

/// Drains `log` into a plain vector for assertions.
pub fn drain(log: &EventLog) -> Vec<RecordedEvent> {
    log.borrow_mut().drain(..).collect()
}

impl FrameHook for Recorder {
    fn on_move(&mut self, _tree: &mut FrameTree, id: FrameId, position: UiPoint) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::Moved(id, position));
    }

    fn on_resize(&mut self, _tree: &mut FrameTree, id: FrameId, width: i32, height: i32) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::Resized(id, width, height));
    }

    fn on_mouse_move(&mut self, _tree: &mut FrameTree, id: FrameId, position: UiPoint) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::MouseMove(id, position));
    }

    fn on_mouse_enter(&mut self, _tree: &mut FrameTree, id: FrameId, position: UiPoint) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::MouseEnter(id, position));
    }

    fn on_mouse_leave(&mut self, _tree: &mut FrameTree, id: FrameId, position: UiPoint) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::MouseLeave(id, position));
    }

    fn on_mouse_down(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        position: UiPoint,
    ) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::MouseDown(id, button, position));
    }

    fn on_mouse_up(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        position: UiPoint,
    ) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::MouseUp(id, button, position));
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
            .push(RecordedEvent::DoubleClick(id, button, position));
    }

    fn on_mouse_wheel(&mut self, _tree: &mut FrameTree, id: FrameId, position: UiPoint, delta: i32) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::Wheel(id, position, delta));
    }

    fn on_key_down(
        &mut self,
        _tree: &mut FrameTree,
        id: FrameId,
        key: KeyCode,
        modifiers: Modifiers,
    ) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::KeyDown(id, key, modifiers));
    }

    fn on_key_up(&mut self, _tree: &mut FrameTree, id: FrameId, key: KeyCode, modifiers: Modifiers) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::KeyUp(id, key, modifiers));
    }

    fn on_drag_move(&mut self, _tree: &mut FrameTree, id: FrameId, position: UiPoint) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::DragMove(id, position));
    }

    fn on_add_child(&mut self, _tree: &mut FrameTree, id: FrameId, child: FrameId) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::ChildAdded(id, child));
    }

    fn on_remove_child(&mut self, _tree: &mut FrameTree, id: FrameId, child: FrameId) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::ChildRemoved(id, child));
    }

    fn on_children_changed(&mut self, _tree: &mut FrameTree, id: FrameId) {
        self.log
            .borrow_mut()
            .push(RecordedEvent::ChildrenChanged(id));
    }
}
