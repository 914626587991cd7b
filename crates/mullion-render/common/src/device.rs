//! The render device seam consumed by root surfaces.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use mullion_graphics::{Color, ImageData, UiPoint, UiRect};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::backend::Backend;
use crate::font::GlyphRun;

/// An opaque, fully recorded backend command list.
pub struct BackendList(Box<dyn Any>);

impl BackendList {
    pub fn new<T: Any>(raw: T) -> Self {
        Self(Box::new(raw))
    }

    /// Recovers the concrete list type; `None` when the list was built by
    /// a different device implementation.
    pub fn downcast<T: Any>(self) -> Option<Box<T>> {
        self.0.downcast().ok()
    }
}

impl std::fmt::Debug for BackendList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BackendList")
    }
}

/// A recorded command list paired with the device that must run it.
/// `device == None` means the surface's own device.
pub struct RenderBatch {
    pub list: BackendList,
    pub device: Option<SharedDevice>,
}

pub type SharedDevice = Rc<RefCell<dyn RenderDevice>>;

/// A window that can back a GPU surface. The shell guarantees the window
/// outlives any device created against it.
pub trait RenderWindow: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle + ?Sized> RenderWindow for T {}

/// One GPU device + swap chain + submission context, owned by a root
/// surface. All methods are driven from the single pump thread.
///
/// List protocol: `begin_list` opens the device's current list (at most
/// one open at a time), the `draw_*` calls record into it, `end_list`
/// closes it out. `DrawCommandBuffer::record_commands` is the only
/// expected driver.
pub trait RenderDevice {
    fn backend(&self) -> Backend;

    /// Current swap-chain extent in pixels.
    fn surface_size(&self) -> (u32, u32);

    fn begin_list(&mut self);

    /// Records a clear of the frame's render target into the open list.
    fn clear_target(&mut self, color: Color);

    fn draw_rect(&mut self, rect: UiRect, color: Color, scissor: UiRect);

    fn draw_image(&mut self, rect: UiRect, image: &ImageData, scissor: UiRect);

    /// Records one glyph run at `origin`. Returns `false` when the glyph
    /// upload ring is exhausted; the run is dropped and the caller frees
    /// capacity by presenting before recording more text.
    fn draw_glyphs(&mut self, origin: UiPoint, run: &GlyphRun, scissor: UiRect) -> bool;

    fn end_list(&mut self) -> BackendList;

    fn submit(&mut self, list: BackendList);

    /// Submits and waits for the list to finish on the GPU.
    fn submit_blocking(&mut self, list: BackendList);

    /// Presents the frame. `blocking` waits for the presentation to
    /// complete before returning.
    fn present(&mut self, blocking: bool);

    fn resize(&mut self, width: u32, height: u32);

    fn wait_idle(&mut self);

    /// Reads the last completed frame back as CPU pixels, used to
    /// composite this surface's output into a different device's target.
    fn grab_output(&mut self) -> Option<ImageData>;
}

/// Creates devices for root surfaces as frames acquire them.
pub trait DeviceFactory {
    fn create_device(
        &mut self,
        window: &dyn RenderWindow,
        backend: Backend,
        width: u32,
        height: u32,
    ) -> Result<SharedDevice, DeviceError>;
}

#[derive(Debug)]
pub enum DeviceError {
    /// No adapter accepted the requested backend.
    AdapterUnavailable { backend: Backend },
    /// The adapter refused to yield a device.
    DeviceRequest { backend: Backend, message: String },
    /// Surface creation against the window handle failed.
    SurfaceCreation { message: String },
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::AdapterUnavailable { backend } => {
                write!(f, "no {backend} adapter available")
            }
            DeviceError::DeviceRequest { backend, message } => {
                write!(f, "{backend} device request failed: {message}")
            }
            DeviceError::SurfaceCreation { message } => {
                write!(f, "surface creation failed: {message}")
            }
        }
    }
}

impl std::error::Error for DeviceError {}
