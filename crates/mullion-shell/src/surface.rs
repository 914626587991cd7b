//! Root surfaces: the OS window and optional GPU device behind a frame.

use mullion_graphics::UiPoint;
use mullion_render_common::{DrawCommandBuffer, SharedDevice};
use mullion_ui::FrameId;

use crate::window::SharedWindow;

/// The windowing resources owned by exactly one frame.
///
/// Every surface has an OS window. A device is present only when the
/// frame renders independently: it has no parent, or its backend
/// differs from its parent's. A forced root with a matching backend
/// keeps a window for input and stacking but records into the
/// ancestor's buffer.
pub struct RootSurface {
    pub(crate) frame: FrameId,
    // Declared before the window so the swapchain drops first.
    pub(crate) device: Option<SharedDevice>,
    pub(crate) window: SharedWindow,
    pub(crate) buffer: DrawCommandBuffer,
    pub(crate) dirty: bool,
    /// Last screen position pushed to a nested window, to skip
    /// redundant OS moves.
    pub(crate) last_position: Option<UiPoint>,
}

impl RootSurface {
    pub(crate) fn new(frame: FrameId, window: SharedWindow, device: Option<SharedDevice>) -> Self {
        Self {
            frame,
            window,
            device,
            buffer: DrawCommandBuffer::new(),
            dirty: true,
            last_position: None,
        }
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn window(&self) -> SharedWindow {
        self.window.clone()
    }

    pub fn device(&self) -> Option<SharedDevice> {
        self.device.clone()
    }

    /// Whether this surface drives its own render walk.
    pub fn owns_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Blocks until the device has finished all in-flight work. Called
    /// before the surface is torn down or its swap chain resized.
    pub(crate) fn wait_idle(&mut self) {
        if let Some(device) = &self.device {
            device.borrow_mut().wait_idle();
        }
    }
}
