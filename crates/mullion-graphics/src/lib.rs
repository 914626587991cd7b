//! Pixel-space geometry, color and image data for Mullion
//!
//! Leaf crate shared by the UI tree, the command buffer and the render
//! backends. Everything here is plain value data in integer pixel space.

mod color;
mod geometry;
mod image;

pub use color::*;
pub use geometry::*;
pub use image::*;
