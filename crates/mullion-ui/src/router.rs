//! Hit-test routing of window events into the frame tree.
//!
//! Points arrive in the local space of the frame whose window produced
//! the event. They are first translated up to that frame's outermost
//! ancestor, then either redirected wholesale to the captured frame or
//! walked down the tree: children are visited topmost first, the
//! running clip is intersected with each level's bounds and client
//! insets, and the first frame accepting mouse messages under the point
//! wins, with blocking frames pruning everything beneath them.
//!
//! The router owns the capture, hover and last-press state that decides
//! redirection, enter/leave transitions and keyboard fan-out.

use mullion_graphics::{UiPoint, UiRect};
use smallvec::SmallVec;

use crate::drag;
use crate::input::{CursorKind, KeyCode, Modifiers, PointerButton};
use crate::node::FrameId;
use crate::tree::FrameTree;

/// One frame hit by a routed point, with the point in its local space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitTarget {
    pub frame: FrameId,
    pub point: UiPoint,
}

/// Routes pointer and key events and owns the capture state.
#[derive(Default)]
pub struct InputRouter {
    captured: Option<FrameId>,
    last_move: Option<FrameId>,
    last_down: Option<FrameId>,
    cursor: Option<CursorKind>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame currently holding pointer capture, if any.
    pub fn captured(&self) -> Option<FrameId> {
        self.captured
    }

    pub fn is_captured(&self, id: FrameId) -> bool {
        self.captured == Some(id)
    }

    /// The frame the pointer was over after the last move dispatch.
    pub fn hovered(&self) -> Option<FrameId> {
        self.last_move
    }

    /// The topmost frame hit by the last button press.
    pub fn last_pressed(&self) -> Option<FrameId> {
        self.last_down
    }

    /// The cursor requested by the last move dispatch, if it produced
    /// one. The windowing layer applies this to the source window.
    pub fn take_cursor(&mut self) -> Option<CursorKind> {
        self.cursor.take()
    }

    /// Drops any references the router holds to `id`.
    pub fn forget(&mut self, id: FrameId) {
        if self.captured == Some(id) {
            self.captured = None;
        }
        if self.last_move == Some(id) {
            self.last_move = None;
        }
        if self.last_down == Some(id) {
            self.last_down = None;
        }
    }

    /// Resolves the frames under `point` without dispatching anything.
    /// Honors capture redirection like the dispatch calls do.
    pub fn hit_test(&self, tree: &FrameTree, source: FrameId, point: UiPoint) -> Vec<HitTarget> {
        self.targets_for(tree, source, point).into_vec()
    }

    pub fn mouse_move(&mut self, tree: &mut FrameTree, source: FrameId, point: UiPoint) {
        self.prune_dead(tree);
        let targets = self.targets_for(tree, source, point);
        if targets.is_empty() {
            return;
        }
        for (index, target) in targets.iter().enumerate() {
            if !tree.contains(target.frame) {
                continue;
            }
            let cursor = drag::handle_mouse_move(tree, target.frame, target.point);
            if index == 0 {
                self.cursor = Some(cursor);
            }
            if let Some(hook) = tree.hook(target.frame) {
                hook.borrow_mut()
                    .on_mouse_move(tree, target.frame, target.point);
            }
        }
        if let Some(last) = self.last_move {
            let still_hit = targets.iter().any(|target| target.frame == last);
            if !still_hit && tree.contains(last) {
                // departing frame gets a final move, then the leave
                let local = retranslate(tree, source, point, last);
                if let Some(hook) = tree.hook(last) {
                    hook.borrow_mut().on_mouse_move(tree, last, local);
                }
                if let Some(hook) = tree.hook(last) {
                    hook.borrow_mut().on_mouse_leave(tree, last, local);
                }
            }
        }
        let topmost = targets[0];
        if self.last_move != Some(topmost.frame) && tree.contains(topmost.frame) {
            if let Some(hook) = tree.hook(topmost.frame) {
                hook.borrow_mut()
                    .on_mouse_enter(tree, topmost.frame, topmost.point);
            }
        }
        self.last_move = Some(topmost.frame);
    }

    pub fn mouse_down(
        &mut self,
        tree: &mut FrameTree,
        source: FrameId,
        point: UiPoint,
        button: PointerButton,
    ) {
        self.prune_dead(tree);
        let targets = self.targets_for(tree, source, point);
        for target in &targets {
            if !tree.contains(target.frame) {
                continue;
            }
            if drag::handle_mouse_down(tree, target.frame, button, target.point) {
                // last engaging target wins; the loser goes back to idle
                if let Some(previous) = self.captured.replace(target.frame) {
                    if previous != target.frame && tree.contains(previous) {
                        drag::cancel_engagement(tree, previous);
                    }
                }
            }
            if let Some(hook) = tree.hook(target.frame) {
                hook.borrow_mut()
                    .on_mouse_down(tree, target.frame, button, target.point);
            }
        }
        if let Some(first) = targets.first() {
            if tree.contains(first.frame) {
                self.last_down = Some(first.frame);
            }
        }
    }

    pub fn mouse_up(
        &mut self,
        tree: &mut FrameTree,
        source: FrameId,
        point: UiPoint,
        button: PointerButton,
    ) {
        self.prune_dead(tree);
        let targets = self.targets_for(tree, source, point);
        for target in &targets {
            if !tree.contains(target.frame) {
                continue;
            }
            if drag::handle_mouse_up(tree, target.frame, button)
                && self.captured == Some(target.frame)
            {
                self.captured = None;
            }
            if let Some(hook) = tree.hook(target.frame) {
                hook.borrow_mut()
                    .on_mouse_up(tree, target.frame, button, target.point);
            }
        }
    }

    pub fn mouse_double_click(
        &mut self,
        tree: &mut FrameTree,
        source: FrameId,
        point: UiPoint,
        button: PointerButton,
    ) {
        self.prune_dead(tree);
        let targets = self.targets_for(tree, source, point);
        for target in &targets {
            if !tree.contains(target.frame) {
                continue;
            }
            if let Some(hook) = tree.hook(target.frame) {
                hook.borrow_mut()
                    .on_mouse_double_click(tree, target.frame, button, target.point);
            }
        }
    }

    pub fn mouse_wheel(
        &mut self,
        tree: &mut FrameTree,
        source: FrameId,
        point: UiPoint,
        delta: i32,
    ) {
        self.prune_dead(tree);
        let targets = self.targets_for(tree, source, point);
        for target in &targets {
            if !tree.contains(target.frame) {
                continue;
            }
            if let Some(hook) = tree.hook(target.frame) {
                hook.borrow_mut()
                    .on_mouse_wheel(tree, target.frame, target.point, delta);
            }
        }
    }

    /// Keys go to the frame whose window saw them and to the frame of
    /// the last press, once each.
    pub fn key_down(
        &mut self,
        tree: &mut FrameTree,
        source: FrameId,
        key: KeyCode,
        modifiers: Modifiers,
    ) {
        self.prune_dead(tree);
        if let Some(hook) = tree.hook(source) {
            hook.borrow_mut().on_key_down(tree, source, key, modifiers);
        }
        if let Some(last) = self.last_down {
            if last != source && tree.contains(last) {
                if let Some(hook) = tree.hook(last) {
                    hook.borrow_mut().on_key_down(tree, last, key, modifiers);
                }
            }
        }
    }

    pub fn key_up(
        &mut self,
        tree: &mut FrameTree,
        source: FrameId,
        key: KeyCode,
        modifiers: Modifiers,
    ) {
        self.prune_dead(tree);
        if let Some(hook) = tree.hook(source) {
            hook.borrow_mut().on_key_up(tree, source, key, modifiers);
        }
        if let Some(last) = self.last_down {
            if last != source && tree.contains(last) {
                if let Some(hook) = tree.hook(last) {
                    hook.borrow_mut().on_key_up(tree, last, key, modifiers);
                }
            }
        }
    }

    fn targets_for(
        &self,
        tree: &FrameTree,
        source: FrameId,
        point: UiPoint,
    ) -> SmallVec<[HitTarget; 4]> {
        let mut targets = SmallVec::new();
        if let Some(captured) = self.captured {
            if tree.contains(captured) {
                targets.push(HitTarget {
                    frame: captured,
                    point: retranslate(tree, source, point, captured),
                });
            }
            return targets;
        }
        let mut local = point;
        let top = translate_towards_root(tree, source, &mut local);
        let clip = client_rect(tree, top);
        let mut blocking = false;
        collect_hits(tree, top, local, &mut blocking, clip, &mut targets);
        targets
    }

    fn prune_dead(&mut self, tree: &FrameTree) {
        if self.captured.map_or(false, |id| !tree.contains(id)) {
            self.captured = None;
        }
        if self.last_move.map_or(false, |id| !tree.contains(id)) {
            self.last_move = None;
        }
        if self.last_down.map_or(false, |id| !tree.contains(id)) {
            self.last_down = None;
        }
    }
}

/// Walks `point` from `frame`-local space up into the local space of
/// the outermost ancestor, which is returned.
fn translate_towards_root(tree: &FrameTree, frame: FrameId, point: &mut UiPoint) -> FrameId {
    let mut current = frame;
    while let Some(parent) = tree.parent(current) {
        *point += tree.node(current).area().origin();
        current = parent;
    }
    current
}

/// Translates a `source`-local point into `target`-local space through
/// the shared tree-global space.
fn retranslate(tree: &FrameTree, source: FrameId, point: UiPoint, target: FrameId) -> UiPoint {
    let mut local = point;
    let top = translate_towards_root(tree, source, &mut local);
    local + tree.node(top).area().origin() - tree.global_position(target)
}

/// The frame-local rectangle children are clipped to.
fn client_rect(tree: &FrameTree, id: FrameId) -> UiRect {
    let node = tree.node(id);
    let area = node.area();
    UiRect::new(0, 0, area.width, area.height).inset(node.client_insets())
}

fn collect_hits(
    tree: &FrameTree,
    frame: FrameId,
    point: UiPoint,
    blocking: &mut bool,
    clip: UiRect,
    out: &mut SmallVec<[HitTarget; 4]>,
) {
    let own_client = client_rect(tree, frame);
    for &child in tree.children(frame).iter().rev() {
        let child_area = tree.node(child).area();
        let revised = clip
            .intersect(&child_area)
            .intersect(&own_client)
            .translate(-child_area.origin());
        collect_hits(
            tree,
            child,
            point - child_area.origin(),
            blocking,
            revised,
            out,
        );
    }
    let node = tree.node(frame);
    let inside_bounds = point.x >= 0
        && point.y >= 0
        && point.x < node.area().width
        && point.y < node.area().height;
    if inside_bounds && clip.contains(point) && !*blocking {
        if node.can_receive_mouse() {
            out.push(HitTarget { frame, point });
        }
        if node.blocks_mouse() {
            *blocking = true;
        }
    }
}
