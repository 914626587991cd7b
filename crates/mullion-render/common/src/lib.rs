//! Command buffer protocol and rendering contracts for Mullion
//!
//! The UI core records paint operations into a [`DrawCommandBuffer`] as
//! backend-agnostic packets. A [`RenderDevice`] implementation (one per
//! root surface that owns a device) later replays those packets into its
//! own command lists. The traits here are the seam between the retained
//! tree and any concrete GPU stack; `RecordingDevice` is the headless
//! implementation used by tests.

mod backend;
mod buffer;
mod device;
mod font;
mod packet;
mod recording;

pub use backend::Backend;
pub use buffer::{DrawCommandBuffer, ScopeTransform};
pub use device::{
    BackendList, DeviceError, DeviceFactory, RenderBatch, RenderDevice, RenderWindow,
    SharedDevice,
};
pub use font::{FontError, FontLibrary, FontProvider, GlyphQuad, GlyphRun, NullFonts};
pub use packet::{CommandPacket, ForeignList, ImagePacket, RectanglePacket, TextPacket};
pub use recording::{RecordedList, RecordedOp, RecordingDevice, RecordingDeviceFactory};

#[cfg(test)]
#[path = "tests/buffer_tests.rs"]
mod buffer_tests;
