//! Geometry setters and anchor constraint propagation.
//!
//! An anchor makes one frame's edge drive another frame's edge. The
//! anchor is stored on the driving frame; whenever one of its edges in
//! the anchor's source mask changes, the target edge is re-derived from
//! the driving frame's current extent plus the margin. Propagation is
//! one level deep: a driven frame's own anchors are not re-run in the
//! same call, so anchor cycles cannot recurse.
//!
//! Setter semantics, edge by edge:
//! - `set_position`/`set_x`/`set_y`/`set_left`/`set_top` move the frame
//!   without resizing and do not propagate.
//! - `set_right`/`set_bottom` resize against the fixed opposite edge.
//! - `set_width`/`set_right` propagate the horizontal edges,
//!   `set_height`/`set_bottom` the vertical ones, `set_size` all four.
//! - Sizes clamp to the frame minimum; hooks fire only on real change.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use mullion_graphics::UiPoint;

use crate::node::FrameId;
use crate::tree::{FrameTree, GeometrySync};

/// Set of rectangle edges, used both to name the driving edges of an
/// anchor and to describe which edges a geometry change touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeMask(u8);

impl EdgeMask {
    pub const NONE: Self = Self(0);
    pub const LEFT: Self = Self(1);
    pub const TOP: Self = Self(1 << 1);
    pub const RIGHT: Self = Self(1 << 2);
    pub const BOTTOM: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    pub const fn union(self, other: EdgeMask) -> EdgeMask {
        EdgeMask(self.0 | other.0)
    }

    /// True when every edge of `other` is present in `self`.
    pub fn contains(self, other: EdgeMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when the two masks share at least one edge.
    pub fn intersects(self, other: EdgeMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EdgeMask {
    type Output = EdgeMask;

    fn bitor(self, rhs: EdgeMask) -> EdgeMask {
        self.union(rhs)
    }
}

impl BitOrAssign for EdgeMask {
    fn bitor_assign(&mut self, rhs: EdgeMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for EdgeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (mask, name) in [
            (EdgeMask::LEFT, "left"),
            (EdgeMask::TOP, "top"),
            (EdgeMask::RIGHT, "right"),
            (EdgeMask::BOTTOM, "bottom"),
        ] {
            if self.intersects(mask) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// A directed edge constraint from the owning frame onto `target`.
///
/// `margin.x` applies to the horizontal rules, `margin.y` to the
/// vertical ones. Anchors are not cleaned up when the target dies;
/// stale targets are skipped with a warning during propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub target: FrameId,
    /// Edges of the owning frame that drive this anchor.
    pub source_edges: EdgeMask,
    /// Edges of the target that get driven.
    pub target_edges: EdgeMask,
    pub margin: UiPoint,
}

impl FrameTree {
    /// Registers an anchor on `id` and applies it immediately.
    pub fn add_anchor(&mut self, id: FrameId, anchor: Anchor) {
        self.node_mut(id).anchors.push(anchor);
        self.propagate_edges(id, EdgeMask::ALL);
    }

    /// Removes the first anchor matching on target and both edge masks.
    /// The margin does not participate in the match.
    pub fn remove_anchor(&mut self, id: FrameId, anchor: Anchor) {
        let anchors = &mut self.node_mut(id).anchors;
        let found = anchors.iter().position(|a| {
            a.target == anchor.target
                && a.source_edges == anchor.source_edges
                && a.target_edges == anchor.target_edges
        });
        match found {
            Some(at) => {
                anchors.remove(at);
            }
            None => panic!("tried to remove an anchor that frame {id} does not have"),
        }
    }

    pub fn anchors(&self, id: FrameId) -> &[Anchor] {
        &self.node(id).anchors
    }

    /// The frame's offset in tree-global space: its own position plus
    /// every ancestor's.
    pub fn global_position(&self, id: FrameId) -> UiPoint {
        let mut position = self.node(id).area.origin();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            position += self.node(parent).area.origin();
            current = parent;
        }
        position
    }

    /// Moves the frame. Never propagates or resizes.
    pub fn set_position(&mut self, id: FrameId, position: UiPoint) {
        self.drive_position(id, position);
    }

    pub fn set_x(&mut self, id: FrameId, x: i32) {
        let y = self.node(id).area.y;
        self.drive_position(id, UiPoint::new(x, y));
    }

    pub fn set_y(&mut self, id: FrameId, y: i32) {
        let x = self.node(id).area.x;
        self.drive_position(id, UiPoint::new(x, y));
    }

    /// Resizes the frame, clamped to its minimum, and propagates every
    /// edge to its anchors when anything changed.
    pub fn set_size(&mut self, id: FrameId, size: UiPoint) {
        let node = self.slot_mut(id);
        let clamped = size.max(node.min_size);
        if node.area.size() == clamped {
            return;
        }
        node.area.width = clamped.x;
        node.area.height = clamped.y;
        self.syncs.push(GeometrySync::Resized(id));
        self.propagate_edges(id, EdgeMask::ALL);
        if let Some(hook) = self.hook(id) {
            hook.borrow_mut().on_resize(self, id, clamped.x, clamped.y);
        }
    }

    pub fn set_width(&mut self, id: FrameId, width: i32) {
        if self.drive_width(id, width) {
            self.propagate_edges(id, EdgeMask::RIGHT | EdgeMask::LEFT);
        }
    }

    pub fn set_height(&mut self, id: FrameId, height: i32) {
        if self.drive_height(id, height) {
            self.propagate_edges(id, EdgeMask::TOP | EdgeMask::BOTTOM);
        }
    }

    /// Moves the left edge, keeping the size.
    pub fn set_left(&mut self, id: FrameId, left: i32) {
        self.drive_left(id, left);
    }

    /// Moves the top edge, keeping the size.
    pub fn set_top(&mut self, id: FrameId, top: i32) {
        self.drive_top(id, top);
    }

    /// Moves the right edge by resizing against the fixed left edge.
    pub fn set_right(&mut self, id: FrameId, right: i32) {
        if self.drive_right(id, right) {
            self.propagate_edges(id, EdgeMask::RIGHT | EdgeMask::LEFT);
        }
    }

    /// Moves the bottom edge by resizing against the fixed top edge.
    pub fn set_bottom(&mut self, id: FrameId, bottom: i32) {
        if self.drive_bottom(id, bottom) {
            self.propagate_edges(id, EdgeMask::TOP | EdgeMask::BOTTOM);
        }
    }

    /// Applies every anchor on `id` whose source mask intersects
    /// `changed`. Driven targets get their hooks and window syncs but
    /// their own anchors are left alone.
    pub(crate) fn propagate_edges(&mut self, id: FrameId, changed: EdgeMask) {
        if self.node(id).anchors.is_empty() {
            return;
        }
        let anchors = self.node(id).anchors.clone();
        for anchor in anchors {
            if !anchor.source_edges.intersects(changed) {
                continue;
            }
            if !self.contains(anchor.target) {
                log::warn!(
                    "anchor target {} of frame {id} is gone, skipping propagation",
                    anchor.target
                );
                continue;
            }
            let size = self.node(id).area.size();
            let target = anchor.target;
            let margin = anchor.margin;
            if anchor.source_edges.intersects(EdgeMask::BOTTOM) {
                if anchor.target_edges.intersects(EdgeMask::TOP) {
                    self.drive_top(target, size.y + margin.y);
                }
                if anchor.target_edges.intersects(EdgeMask::BOTTOM) {
                    self.drive_bottom(target, size.y + margin.y);
                }
            }
            if anchor.source_edges.intersects(EdgeMask::TOP) {
                if anchor.target_edges.intersects(EdgeMask::TOP) {
                    self.drive_top(target, margin.y);
                }
                if anchor.target_edges.intersects(EdgeMask::BOTTOM) {
                    self.drive_bottom(target, margin.y);
                }
            }
            if anchor.source_edges.intersects(EdgeMask::RIGHT) {
                if anchor.target_edges.intersects(EdgeMask::RIGHT) {
                    self.drive_right(target, size.x + margin.x);
                }
                if anchor.target_edges.intersects(EdgeMask::LEFT) {
                    self.drive_left(target, size.x + margin.x);
                }
            }
            if anchor.source_edges.intersects(EdgeMask::LEFT) {
                if anchor.target_edges.intersects(EdgeMask::RIGHT) {
                    self.drive_right(target, margin.x);
                }
                if anchor.target_edges.intersects(EdgeMask::LEFT) {
                    self.drive_left(target, margin.x);
                }
            }
        }
    }

    fn drive_position(&mut self, id: FrameId, position: UiPoint) -> bool {
        let node = self.slot_mut(id);
        if node.area.origin() == position {
            return false;
        }
        node.area.x = position.x;
        node.area.y = position.y;
        self.syncs.push(GeometrySync::Moved(id));
        if let Some(hook) = self.hook(id) {
            hook.borrow_mut().on_move(self, id, position);
        }
        true
    }

    fn drive_left(&mut self, id: FrameId, left: i32) -> bool {
        let y = self.node(id).area.y;
        self.drive_position(id, UiPoint::new(left, y))
    }

    fn drive_top(&mut self, id: FrameId, top: i32) -> bool {
        let x = self.node(id).area.x;
        self.drive_position(id, UiPoint::new(x, top))
    }

    fn drive_width(&mut self, id: FrameId, width: i32) -> bool {
        let node = self.slot_mut(id);
        let width = width.max(node.min_size.x);
        if node.area.width == width {
            return false;
        }
        node.area.width = width;
        let height = node.area.height;
        self.syncs.push(GeometrySync::Resized(id));
        if let Some(hook) = self.hook(id) {
            hook.borrow_mut().on_resize(self, id, width, height);
        }
        true
    }

    fn drive_height(&mut self, id: FrameId, height: i32) -> bool {
        let node = self.slot_mut(id);
        let height = height.max(node.min_size.y);
        if node.area.height == height {
            return false;
        }
        node.area.height = height;
        let width = node.area.width;
        self.syncs.push(GeometrySync::Resized(id));
        if let Some(hook) = self.hook(id) {
            hook.borrow_mut().on_resize(self, id, width, height);
        }
        true
    }

    fn drive_right(&mut self, id: FrameId, right: i32) -> bool {
        let x = self.node(id).area.x;
        self.drive_width(id, right - x)
    }

    fn drive_bottom(&mut self, id: FrameId, bottom: i32) -> bool {
        let y = self.node(id).area.y;
        self.drive_height(id, bottom - y)
    }
}
