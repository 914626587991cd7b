//! The frame arena: ownership, ordering and z-stacking.
//!
//! Frames live in slot storage and refer to each other by [`FrameId`].
//! A child list owns its members; the parent back-reference is only
//! ever written by [`FrameTree::add_child`] and
//! [`FrameTree::remove_child`], so a frame appears in exactly one
//! parent's list at a time. Within a child list, frames flagged
//! always-on-top form a run at the end; normal frames never sort after
//! them, and the reorder operations keep the two partitions separate.

use mullion_render_common::Backend;

use crate::hook::SharedHook;
use crate::node::{FrameId, FrameNode};

/// Geometry change the windowing layer must mirror, drained per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometrySync {
    Moved(FrameId),
    Resized(FrameId),
}

#[derive(Default)]
pub struct FrameTree {
    nodes: Vec<Option<FrameNode>>,
    pub(crate) syncs: Vec<GeometrySync>,
}

impl FrameTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parentless frame of the given size, clamped to the
    /// default minimum.
    pub fn create_frame(&mut self, width: i32, height: i32) -> FrameId {
        let id = FrameId(self.nodes.len());
        self.nodes.push(Some(FrameNode::new(width, height)));
        id
    }

    /// Detaches `id` from its parent and frees it together with its
    /// whole subtree. Removal hooks fire for `id` only; descendants are
    /// dropped silently with it.
    pub fn destroy(&mut self, id: FrameId) {
        if let Some(parent) = self.node(id).parent {
            self.remove_child(parent, id);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: FrameId) {
        let children = std::mem::take(&mut self.slot_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.0] = None;
    }

    pub fn contains(&self, id: FrameId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn get(&self, id: FrameId) -> Option<&FrameNode> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Panics if `id` was destroyed or never created.
    pub fn node(&self, id: FrameId) -> &FrameNode {
        self.slot(id)
    }

    /// Mutable access for per-node configuration. Geometry and tree
    /// structure go through the `FrameTree` methods instead.
    pub fn node_mut(&mut self, id: FrameId) -> &mut FrameNode {
        self.slot_mut(id)
    }

    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.slot(id).parent
    }

    pub fn children(&self, id: FrameId) -> &[FrameId] {
        &self.slot(id).children
    }

    /// Number of live frames.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live frames in creation order.
    pub fn frames(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| FrameId(index))
    }

    /// The outermost ancestor of `id`, which is `id` itself when it has
    /// no parent.
    pub fn top_of(&self, id: FrameId) -> FrameId {
        let mut current = id;
        while let Some(parent) = self.slot(current).parent {
            current = parent;
        }
        current
    }

    /// Inserts `child` into `parent`'s child list, detaching it from any
    /// current parent first. Normal children land just before the
    /// always-on-top run; on-top children are appended at the end.
    pub fn add_child(&mut self, parent: FrameId, child: FrameId) {
        assert!(parent != child, "cannot make frame {parent} its own child");
        assert!(
            !self.slot(parent).children.contains(&child),
            "frame {parent} already owns frame {child}"
        );
        if let Some(old_parent) = self.slot(child).parent {
            self.remove_child(old_parent, child);
        }
        let at = if self.slot(child).always_on_top {
            self.slot(parent).children.len()
        } else {
            self.first_on_top_index(parent)
        };
        self.slot_mut(parent).children.insert(at, child);
        self.slot_mut(child).parent = Some(parent);
        if let Some(hook) = self.hook(parent) {
            hook.borrow_mut().on_add_child(self, parent, child);
        }
        if let Some(hook) = self.hook(parent) {
            hook.borrow_mut().on_children_changed(self, parent);
        }
    }

    /// Removes `child` from `parent`'s list. The removal hook fires
    /// before the child leaves the list.
    pub fn remove_child(&mut self, parent: FrameId, child: FrameId) {
        assert!(
            self.slot(parent).children.contains(&child),
            "frame {child} is not a child of frame {parent}"
        );
        if let Some(hook) = self.hook(parent) {
            hook.borrow_mut().on_remove_child(self, parent, child);
        }
        // the hook may have reordered the list, find the child again
        if let Some(at) = self.slot(parent).children.iter().position(|&c| c == child) {
            self.slot_mut(parent).children.remove(at);
            self.slot_mut(child).parent = None;
        }
        if let Some(hook) = self.hook(parent) {
            hook.borrow_mut().on_children_changed(self, parent);
        }
    }

    /// Moves `child` under `new_parent`, or detaches it entirely.
    pub fn reparent(&mut self, child: FrameId, new_parent: Option<FrameId>) {
        match new_parent {
            Some(parent) => self.add_child(parent, child),
            None => {
                if let Some(parent) = self.slot(child).parent {
                    self.remove_child(parent, child);
                }
            }
        }
    }

    /// Raises `id` to the top of its partition: the end of the list for
    /// on-top frames, just below the on-top run otherwise.
    pub fn move_to_top(&mut self, id: FrameId) {
        let Some(parent) = self.slot(id).parent else {
            return;
        };
        let at = self.child_index(parent, id);
        self.slot_mut(parent).children.remove(at);
        let to = if self.slot(id).always_on_top {
            self.slot(parent).children.len()
        } else {
            self.first_on_top_index(parent)
        };
        self.slot_mut(parent).children.insert(to, id);
    }

    /// Swaps `id` with the sibling above it; stops at the top of its
    /// partition.
    pub fn move_up(&mut self, id: FrameId) {
        let Some(parent) = self.slot(id).parent else {
            return;
        };
        let at = self.child_index(parent, id);
        if at + 1 >= self.slot(parent).children.len() {
            return;
        }
        let above = self.slot(parent).children[at + 1];
        if !self.slot(id).always_on_top && self.slot(above).always_on_top {
            return;
        }
        self.slot_mut(parent).children.swap(at, at + 1);
    }

    /// Swaps `id` with the sibling below it; stops at the bottom of its
    /// partition.
    pub fn move_down(&mut self, id: FrameId) {
        let Some(parent) = self.slot(id).parent else {
            return;
        };
        let at = self.child_index(parent, id);
        if at == 0 {
            return;
        }
        let below = self.slot(parent).children[at - 1];
        if self.slot(id).always_on_top && !self.slot(below).always_on_top {
            return;
        }
        self.slot_mut(parent).children.swap(at, at - 1);
    }

    /// Lowers `id` to the bottom of its partition.
    pub fn move_to_bottom(&mut self, id: FrameId) {
        let Some(parent) = self.slot(id).parent else {
            return;
        };
        let at = self.child_index(parent, id);
        self.slot_mut(parent).children.remove(at);
        let to = if self.slot(id).always_on_top {
            self.first_on_top_index(parent)
        } else {
            0
        };
        self.slot_mut(parent).children.insert(to, id);
    }

    /// Changes the partition flag, re-slotting the frame under its
    /// parent when it has one.
    pub fn set_always_on_top(&mut self, id: FrameId, on_top: bool) {
        if self.slot(id).always_on_top == on_top {
            return;
        }
        self.slot_mut(id).always_on_top = on_top;
        if let Some(parent) = self.slot(id).parent {
            let at = self.child_index(parent, id);
            self.slot_mut(parent).children.remove(at);
            let to = if on_top {
                self.slot(parent).children.len()
            } else {
                self.first_on_top_index(parent)
            };
            self.slot_mut(parent).children.insert(to, id);
        }
    }

    /// Sets the graphics backend on `id` and every descendant.
    pub fn set_backend(&mut self, id: FrameId, backend: Backend) {
        self.slot_mut(id).backend = backend;
        let children = self.slot(id).children.clone();
        for child in children {
            self.set_backend(child, backend);
        }
    }

    /// Drains the window-mirroring queue accumulated by geometry
    /// changes since the last call.
    pub fn take_syncs(&mut self) -> Vec<GeometrySync> {
        std::mem::take(&mut self.syncs)
    }

    /// The hook installed on `id`, cloned out so the caller can invoke
    /// it while mutating the tree.
    pub fn hook(&self, id: FrameId) -> Option<SharedHook> {
        self.get(id).and_then(|node| node.hook.clone())
    }

    fn slot(&self, id: FrameId) -> &FrameNode {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("frame {id} is not alive"),
        }
    }

    pub(crate) fn slot_mut(&mut self, id: FrameId) -> &mut FrameNode {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("frame {id} is not alive"),
        }
    }

    fn child_index(&self, parent: FrameId, child: FrameId) -> usize {
        match self.slot(parent).children.iter().position(|&c| c == child) {
            Some(at) => at,
            None => panic!("frame {child} is missing from the child list of frame {parent}"),
        }
    }

    /// Index of the first always-on-top child, or the list length when
    /// there is none. Normal children insert here.
    fn first_on_top_index(&self, parent: FrameId) -> usize {
        let children = &self.slot(parent).children;
        for (index, &child) in children.iter().enumerate() {
            if self.slot(child).always_on_top {
                return index;
            }
        }
        children.len()
    }
}
