//! Drag and resize interaction against a frame's pointer events.
//!
//! A drag is press-anchored: the frame position is re-derived every
//! move from the position and global pointer recorded at press time, so
//! clamping against the configured bounds never loses pointer travel. A
//! resize is incremental: each move applies the global delta since the
//! previous one to whichever edges the grabbed region controls, clamped
//! so the moving edge stops at the minimum size.

use mullion_graphics::UiPoint;

use crate::input::{AllowedMovement, CursorKind, PointerButton, ResizeRegion};
use crate::node::FrameId;
use crate::tree::FrameTree;

/// Thickness of the resize band along each frame edge, in pixels.
pub const RESIZE_BORDER: i32 = 4;

/// Classifies a frame-local point against the nine-way resize grid for
/// a frame of the given size. Corner bands win over edge bands, and the
/// left and top bands win when a tiny frame makes bands overlap.
pub fn resize_region(size: UiPoint, point: UiPoint) -> ResizeRegion {
    if point.x < 0 || point.y < 0 || point.x >= size.x || point.y >= size.y {
        return ResizeRegion::Outside;
    }
    let horizontal = if point.x < RESIZE_BORDER {
        0
    } else if point.x >= size.x - RESIZE_BORDER {
        2
    } else {
        1
    };
    let vertical = if point.y < RESIZE_BORDER {
        0
    } else if point.y >= size.y - RESIZE_BORDER {
        2
    } else {
        1
    };
    match (vertical, horizontal) {
        (0, 0) => ResizeRegion::TopLeft,
        (0, 1) => ResizeRegion::TopCenter,
        (0, _) => ResizeRegion::TopRight,
        (1, 0) => ResizeRegion::MiddleLeft,
        (1, 1) => ResizeRegion::Center,
        (1, _) => ResizeRegion::MiddleRight,
        (2, 0) => ResizeRegion::BottomLeft,
        (2, 1) => ResizeRegion::BottomCenter,
        (_, _) => ResizeRegion::BottomRight,
    }
}

/// The cursor shown while hovering or holding a resize region.
pub fn region_cursor(region: ResizeRegion) -> CursorKind {
    match region {
        ResizeRegion::TopLeft | ResizeRegion::BottomRight => CursorKind::SizeNwse,
        ResizeRegion::TopRight | ResizeRegion::BottomLeft => CursorKind::SizeNesw,
        ResizeRegion::TopCenter | ResizeRegion::BottomCenter => CursorKind::SizeNs,
        ResizeRegion::MiddleLeft | ResizeRegion::MiddleRight => CursorKind::SizeWe,
        ResizeRegion::Center | ResizeRegion::Outside => CursorKind::Arrow,
    }
}

/// Runs the built-in press behavior for `id`: raise on focus, then
/// engage a resize grab on the border or a drag press in the body.
/// Returns true when the frame took pointer capture.
pub(crate) fn handle_mouse_down(
    tree: &mut FrameTree,
    id: FrameId,
    button: PointerButton,
    local: UiPoint,
) -> bool {
    if tree.node(id).can_focus() {
        tree.move_to_top(id);
    }
    if button != PointerButton::Primary {
        return false;
    }
    let node = tree.node(id);
    if node.can_resize() {
        let region = resize_region(node.area().size(), local);
        if region.is_handle() {
            let global = tree.global_position(id) + local;
            let state = &mut tree.slot_mut(id).interaction;
            state.grabbed = true;
            state.grab_region = region;
            state.grab_cursor = region_cursor(region);
            state.pointer_global = global;
            return true;
        }
    }
    if tree.node(id).can_move() != AllowedMovement::None {
        let global = tree.global_position(id) + local;
        let origin = tree.node(id).area().origin();
        let state = &mut tree.slot_mut(id).interaction;
        state.mouse_down = true;
        state.pointer_global = global;
        state.press_origin = origin;
        return true;
    }
    false
}

/// Runs the built-in move behavior for `id` and reports the cursor the
/// frame wants shown: the grab cursor while resizing, a band cursor
/// while hovering the border, an arrow otherwise.
pub(crate) fn handle_mouse_move(tree: &mut FrameTree, id: FrameId, local: UiPoint) -> CursorKind {
    let global = tree.global_position(id) + local;
    let state = tree.node(id).interaction;
    if state.grabbed {
        let delta = global - state.pointer_global;
        tree.slot_mut(id).interaction.pointer_global = global;
        apply_resize(tree, id, state.grab_region, delta);
        return tree.node(id).interaction.grab_cursor;
    }
    if state.mouse_down {
        let node = tree.node(id);
        let delta = global - state.pointer_global;
        let mut position = state.press_origin;
        match node.can_move() {
            AllowedMovement::All => position += delta,
            AllowedMovement::Horizontal => position.x += delta.x,
            AllowedMovement::Vertical => position.y += delta.y,
            AllowedMovement::None => {}
        }
        position = force_legal_position(position, node.min_position, node.max_position);
        tree.set_position(id, position);
        if let Some(hook) = tree.hook(id) {
            hook.borrow_mut().on_drag_move(tree, id, position);
        }
        return CursorKind::Arrow;
    }
    if tree.node(id).can_resize() {
        let region = resize_region(tree.node(id).area().size(), local);
        if region.is_handle() {
            return region_cursor(region);
        }
    }
    CursorKind::Arrow
}

/// Releases whichever engagement the primary button held. Returns true
/// when a capture should be dropped.
pub(crate) fn handle_mouse_up(tree: &mut FrameTree, id: FrameId, button: PointerButton) -> bool {
    if button != PointerButton::Primary {
        return false;
    }
    let state = &mut tree.slot_mut(id).interaction;
    if state.grabbed {
        state.grabbed = false;
        return true;
    }
    if state.mouse_down {
        state.mouse_down = false;
        return true;
    }
    false
}

/// Drops an engagement without routing a button event. Used when a
/// frame loses the capture race to another frame under the same press.
pub(crate) fn cancel_engagement(tree: &mut FrameTree, id: FrameId) {
    let state = &mut tree.slot_mut(id).interaction;
    state.mouse_down = false;
    state.grabbed = false;
}

fn force_legal_position(
    position: UiPoint,
    min: Option<UiPoint>,
    max: Option<UiPoint>,
) -> UiPoint {
    let mut legal = position;
    if let Some(min) = min {
        legal = legal.max(min);
    }
    if let Some(max) = max {
        legal = legal.min(max);
    }
    legal
}

/// Applies one incremental resize step. The delta is clamped per axis
/// before any edge moves so a frame at its minimum stays put instead of
/// snapping.
fn apply_resize(tree: &mut FrameTree, id: FrameId, region: ResizeRegion, delta: UiPoint) {
    let area = tree.node(id).area();
    let min = tree.node(id).min_size();
    let mut delta = delta;
    match region {
        ResizeRegion::TopLeft | ResizeRegion::MiddleLeft | ResizeRegion::BottomLeft => {
            delta.x = delta.x.min(area.width - min.x);
        }
        ResizeRegion::TopRight | ResizeRegion::MiddleRight | ResizeRegion::BottomRight => {
            delta.x = delta.x.max(min.x - area.width);
        }
        _ => {}
    }
    match region {
        ResizeRegion::TopLeft | ResizeRegion::TopCenter | ResizeRegion::TopRight => {
            delta.y = delta.y.min(area.height - min.y);
        }
        ResizeRegion::BottomLeft | ResizeRegion::BottomCenter | ResizeRegion::BottomRight => {
            delta.y = delta.y.max(min.y - area.height);
        }
        _ => {}
    }
    match region {
        ResizeRegion::TopLeft => {
            tree.set_left(id, area.x + delta.x);
            tree.set_top(id, area.y + delta.y);
            tree.set_width(id, area.width - delta.x);
            tree.set_height(id, area.height - delta.y);
        }
        ResizeRegion::TopCenter => {
            tree.set_top(id, area.y + delta.y);
            tree.set_height(id, area.height - delta.y);
        }
        ResizeRegion::TopRight => {
            tree.set_top(id, area.y + delta.y);
            tree.set_width(id, area.width + delta.x);
            tree.set_height(id, area.height - delta.y);
        }
        ResizeRegion::MiddleLeft => {
            tree.set_left(id, area.x + delta.x);
            tree.set_width(id, area.width - delta.x);
        }
        ResizeRegion::MiddleRight => {
            tree.set_width(id, area.width + delta.x);
        }
        ResizeRegion::BottomLeft => {
            tree.set_left(id, area.x + delta.x);
            tree.set_width(id, area.width - delta.x);
            tree.set_height(id, area.height + delta.y);
        }
        ResizeRegion::BottomCenter => {
            tree.set_height(id, area.height + delta.y);
        }
        ResizeRegion::BottomRight => {
            tree.set_width(id, area.width + delta.x);
            tree.set_height(id, area.height + delta.y);
        }
        ResizeRegion::Center | ResizeRegion::Outside => {}
    }
}
