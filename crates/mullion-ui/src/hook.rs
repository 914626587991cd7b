//! Behavior hooks attached to frames.
//!
//! A [`FrameHook`] is how widgets and applications extend a plain frame:
//! the tree and the input router invoke it after their own built-in
//! handling (geometry upkeep, drag and resize tracking, focus raising).
//! Hooks are shared `Rc<RefCell<..>>` values so a handler can reach back
//! into the tree that invoked it without aliasing the node it hangs off.

use std::cell::RefCell;
use std::rc::Rc;

use mullion_graphics::UiPoint;
use mullion_render_common::DrawCommandBuffer;

use crate::input::{KeyCode, Modifiers, PointerButton};
use crate::node::FrameId;
use crate::tree::FrameTree;

/// A hook installed on one frame. All methods default to no-ops.
#[allow(unused_variables)]
pub trait FrameHook {
    /// The frame's position changed. Fired only on an actual change.
    fn on_move(&mut self, tree: &mut FrameTree, id: FrameId, position: UiPoint) {}

    /// The frame's size changed. Fired only on an actual change.
    fn on_resize(&mut self, tree: &mut FrameTree, id: FrameId, width: i32, height: i32) {}

    /// Emit paint packets for the frame body. The surrounding transform
    /// scope is already pushed; coordinates are frame-local.
    fn on_paint(&mut self, tree: &FrameTree, id: FrameId, cmd: &mut DrawCommandBuffer) {}

    fn on_mouse_move(&mut self, tree: &mut FrameTree, id: FrameId, position: UiPoint) {}

    fn on_mouse_enter(&mut self, tree: &mut FrameTree, id: FrameId, position: UiPoint) {}

    fn on_mouse_leave(&mut self, tree: &mut FrameTree, id: FrameId, position: UiPoint) {}

    fn on_mouse_down(
        &mut self,
        tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        position: UiPoint,
    ) {
    }

    fn on_mouse_up(
        &mut self,
        tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        position: UiPoint,
    ) {
    }

    fn on_mouse_double_click(
        &mut self,
        tree: &mut FrameTree,
        id: FrameId,
        button: PointerButton,
        position: UiPoint,
    ) {
    }

    fn on_mouse_wheel(&mut self, tree: &mut FrameTree, id: FrameId, position: UiPoint, delta: i32) {
    }

    fn on_key_down(&mut self, tree: &mut FrameTree, id: FrameId, key: KeyCode, modifiers: Modifiers) {
    }

    fn on_key_up(&mut self, tree: &mut FrameTree, id: FrameId, key: KeyCode, modifiers: Modifiers) {}

    /// The frame moved because it is being dragged. Fired for every move
    /// while the drag is held, after the position update.
    fn on_drag_move(&mut self, tree: &mut FrameTree, id: FrameId, position: UiPoint) {}

    /// The OS window backing this frame's surface was closed.
    fn on_close(&mut self, tree: &mut FrameTree, id: FrameId) {}

    fn on_add_child(&mut self, tree: &mut FrameTree, id: FrameId, child: FrameId) {}

    /// Fired with the child still present in the child list.
    fn on_remove_child(&mut self, tree: &mut FrameTree, id: FrameId, child: FrameId) {}

    fn on_children_changed(&mut self, tree: &mut FrameTree, id: FrameId) {}
}

/// Shared handle to a hook, cloned out of the node before each call.
pub type SharedHook = Rc<RefCell<dyn FrameHook>>;
