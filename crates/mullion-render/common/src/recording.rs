//! Headless recording device for tests.
//!
//! Mirrors the real device protocol while capturing every recorded
//! operation, so buffer, shell and pump behavior can be asserted without
//! a GPU. The glyph ring is modeled with a configurable capacity that
//! drains on present, matching the real backend's exhaustion behavior.

use std::cell::RefCell;
use std::rc::Rc;

use mullion_graphics::{Color, ImageData, ImageId, UiPoint, UiRect};

use crate::backend::Backend;
use crate::device::{
    BackendList, DeviceError, DeviceFactory, RenderDevice, RenderWindow, SharedDevice,
};
use crate::font::GlyphRun;

#[derive(Clone, Debug, PartialEq)]
pub enum RecordedOp {
    Clear {
        color: Color,
    },
    Rect {
        rect: UiRect,
        color: Color,
        scissor: UiRect,
    },
    Image {
        rect: UiRect,
        image: ImageId,
        scissor: UiRect,
    },
    Glyphs {
        origin: UiPoint,
        count: usize,
        scissor: UiRect,
    },
}

/// The concrete list type produced by [`RecordingDevice::end_list`].
#[derive(Clone, Debug, Default)]
pub struct RecordedList {
    pub ops: Vec<RecordedOp>,
}

pub struct RecordingDevice {
    backend: Backend,
    size: (u32, u32),
    current: Option<Vec<RecordedOp>>,
    submitted: Vec<RecordedList>,
    foreign_submits: usize,
    blocking_submits: usize,
    presents: usize,
    idle_waits: usize,
    resizes: Vec<(u32, u32)>,
    glyph_capacity: usize,
    glyphs_in_flight: usize,
}

impl RecordingDevice {
    pub fn new(backend: Backend, width: u32, height: u32) -> Self {
        Self {
            backend,
            size: (width, height),
            current: None,
            submitted: Vec::new(),
            foreign_submits: 0,
            blocking_submits: 0,
            presents: 0,
            idle_waits: 0,
            resizes: Vec::new(),
            glyph_capacity: usize::MAX,
            glyphs_in_flight: 0,
        }
    }

    /// Caps the modeled glyph upload ring, so exhaustion paths can be
    /// exercised.
    pub fn with_glyph_capacity(mut self, capacity: usize) -> Self {
        self.glyph_capacity = capacity;
        self
    }

    pub fn submitted(&self) -> &[RecordedList] {
        &self.submitted
    }

    /// All submitted operations in submission order.
    pub fn submitted_ops(&self) -> Vec<RecordedOp> {
        self.submitted
            .iter()
            .flat_map(|list| list.ops.iter().cloned())
            .collect()
    }

    pub fn foreign_submits(&self) -> usize {
        self.foreign_submits
    }

    pub fn blocking_submits(&self) -> usize {
        self.blocking_submits
    }

    pub fn presents(&self) -> usize {
        self.presents
    }

    pub fn idle_waits(&self) -> usize {
        self.idle_waits
    }

    pub fn resizes(&self) -> &[(u32, u32)] {
        &self.resizes
    }

    fn record(&mut self, op: RecordedOp) {
        self.current
            .as_mut()
            .expect("recording without an open list")
            .push(op);
    }
}

impl RenderDevice for RecordingDevice {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn begin_list(&mut self) {
        assert!(self.current.is_none(), "device list is already open");
        self.current = Some(Vec::new());
    }

    fn clear_target(&mut self, color: Color) {
        self.record(RecordedOp::Clear { color });
    }

    fn draw_rect(&mut self, rect: UiRect, color: Color, scissor: UiRect) {
        self.record(RecordedOp::Rect {
            rect,
            color,
            scissor,
        });
    }

    fn draw_image(&mut self, rect: UiRect, image: &ImageData, scissor: UiRect) {
        self.record(RecordedOp::Image {
            rect,
            image: image.id(),
            scissor,
        });
    }

    fn draw_glyphs(&mut self, origin: UiPoint, run: &GlyphRun, scissor: UiRect) -> bool {
        if self.glyphs_in_flight + run.glyphs.len() > self.glyph_capacity {
            return false;
        }
        self.glyphs_in_flight += run.glyphs.len();
        self.record(RecordedOp::Glyphs {
            origin,
            count: run.glyphs.len(),
            scissor,
        });
        true
    }

    fn end_list(&mut self) -> BackendList {
        let ops = self.current.take().expect("ending a list that is not open");
        BackendList::new(RecordedList { ops })
    }

    fn submit(&mut self, list: BackendList) {
        match list.downcast::<RecordedList>() {
            Some(recorded) => self.submitted.push(*recorded),
            None => self.foreign_submits += 1,
        }
    }

    fn submit_blocking(&mut self, list: BackendList) {
        self.blocking_submits += 1;
        self.submit(list);
    }

    fn present(&mut self, _blocking: bool) {
        self.presents += 1;
        self.glyphs_in_flight = 0;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.resizes.push((width, height));
    }

    fn wait_idle(&mut self) {
        self.idle_waits += 1;
    }

    fn grab_output(&mut self) -> Option<ImageData> {
        Some(ImageData::solid(self.size.0.max(1), self.size.1.max(1), [
            0, 0, 0, 255,
        ]))
    }
}

/// Dispenses recording devices and keeps handles to them so tests can
/// inspect what each surface recorded.
#[derive(Default)]
pub struct RecordingDeviceFactory {
    created: Vec<Rc<RefCell<RecordingDevice>>>,
    glyph_capacity: Option<usize>,
}

impl RecordingDeviceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyph_capacity(mut self, capacity: usize) -> Self {
        self.glyph_capacity = Some(capacity);
        self
    }

    pub fn created(&self) -> &[Rc<RefCell<RecordingDevice>>] {
        &self.created
    }
}

impl DeviceFactory for RecordingDeviceFactory {
    fn create_device(
        &mut self,
        _window: &dyn RenderWindow,
        backend: Backend,
        width: u32,
        height: u32,
    ) -> Result<SharedDevice, DeviceError> {
        let mut device = RecordingDevice::new(backend, width, height);
        if let Some(capacity) = self.glyph_capacity {
            device = device.with_glyph_capacity(capacity);
        }
        let device = Rc::new(RefCell::new(device));
        self.created.push(device.clone());
        Ok(device)
    }
}
