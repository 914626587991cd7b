//! Retained frame tree with anchor layout, drag/resize capture and
//! hit-test input routing.
//!
//! Frames live in a [`FrameTree`] and are addressed by [`FrameId`].
//! Geometry changes flow through the tree's setter methods so that
//! anchors can propagate edges to sibling frames and hooks observe
//! every move and resize. Window events enter through an
//! [`InputRouter`], which translates them across the tree, resolves
//! the frames under the pointer and drives the built-in drag and
//! resize behaviors before handing each event to the frame's
//! [`FrameHook`].

mod anchors;
mod drag;
mod hook;
mod input;
mod node;
mod router;
mod tree;

pub use anchors::{Anchor, EdgeMask};
pub use drag::{region_cursor, resize_region, RESIZE_BORDER};
pub use hook::{FrameHook, SharedHook};
pub use input::{
    AllowedMovement, CursorKind, KeyCode, Modifiers, PointerButton, ResizeRegion,
};
pub use node::{FrameId, FrameNode, DEFAULT_MINIMUM_SIZE};
pub use router::{HitTarget, InputRouter};
pub use tree::{FrameTree, GeometrySync};

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tree_tests;

#[cfg(test)]
#[path = "tests/anchor_tests.rs"]
mod anchor_tests;

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod drag_tests;

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod router_tests;
