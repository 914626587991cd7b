//! The shell: binds frames to root surfaces and drives the render walk.
//!
//! A frame owns a root surface when it has no parent, is forced to be a
//! root, or uses a different graphics backend than its parent. The
//! surface always carries an OS window; it carries a device only when
//! the frame renders independently (no parent, or a backend mismatch).
//! [`Shell::sync_surfaces`] reconciles a subtree against those rules
//! after reparenting, force-root toggles and backend changes.
//!
//! Rendering starts at every dirty parentless surface: the walk paints
//! the root, recurses through children inside pushed transform scopes,
//! and when it meets a child owning its own device it renders that
//! subtree through the child's surface, reads the output back and
//! composites it into the parent's buffer as an image packet.

use mullion_graphics::{Color, UiPoint, UiRect};
use mullion_render_common::{
    Backend, DeviceError, DeviceFactory, DrawCommandBuffer, FontProvider, ScopeTransform,
    SharedDevice,
};
use mullion_ui::{CursorKind, FrameId, FrameTree, GeometrySync, InputRouter};

use crate::surface::RootSurface;
use crate::theme::{Theme, ThemeColor};
use crate::window::{SharedWindow, WindowError, WindowEvent, WindowOptions, WindowSystem};

#[derive(Debug)]
pub enum ShellError {
    Window(WindowError),
    Device(DeviceError),
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::Window(error) => write!(f, "{error}"),
            ShellError::Device(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<WindowError> for ShellError {
    fn from(error: WindowError) -> Self {
        ShellError::Window(error)
    }
}

impl From<DeviceError> for ShellError {
    fn from(error: DeviceError) -> Self {
        ShellError::Device(error)
    }
}

pub struct Shell {
    tree: FrameTree,
    router: InputRouter,
    // Surfaces are declared before the window system so their windows
    // and devices drop before the event loop that created them.
    surfaces: Vec<RootSurface>,
    windows: Box<dyn WindowSystem>,
    devices: Box<dyn DeviceFactory>,
    theme: Box<dyn Theme>,
    fonts: Box<dyn FontProvider>,
}

impl Shell {
    pub fn new(
        windows: impl WindowSystem + 'static,
        devices: impl DeviceFactory + 'static,
        theme: impl Theme + 'static,
        fonts: impl FontProvider + 'static,
    ) -> Self {
        Self {
            tree: FrameTree::new(),
            router: InputRouter::new(),
            windows: Box::new(windows),
            devices: Box::new(devices),
            theme: Box::new(theme),
            fonts: Box::new(fonts),
            surfaces: Vec::new(),
        }
    }

    pub fn tree(&self) -> &FrameTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FrameTree {
        &mut self.tree
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn theme(&self) -> &dyn Theme {
        self.theme.as_ref()
    }

    /// Creates a parentless frame backed by a fresh window and device.
    /// On failure no frame is left behind.
    pub fn create_root(&mut self, options: &WindowOptions) -> Result<FrameId, ShellError> {
        let id = self
            .tree
            .create_frame(options.width as i32, options.height as i32);
        self.tree.set_backend(id, options.backend);
        if let Err(error) = self.attach_surface(id, options) {
            self.tree.destroy(id);
            return Err(error);
        }
        Ok(id)
    }

    /// Creates a plain child frame sharing `parent`'s surface.
    pub fn create_child(&mut self, parent: FrameId, area: UiRect) -> FrameId {
        let id = self.tree.create_frame(area.width, area.height);
        let backend = self.tree.node(parent).backend();
        self.tree.set_backend(id, backend);
        self.tree.add_child(parent, id);
        self.tree.set_position(id, area.origin());
        id
    }

    /// Creates a child rendered by its own device on `backend`, nested
    /// inside `parent` through a borderless window and composited into
    /// the parent's output.
    pub fn create_embedded(
        &mut self,
        parent: FrameId,
        area: UiRect,
        backend: Backend,
    ) -> Result<FrameId, ShellError> {
        let id = self.tree.create_frame(area.width, area.height);
        self.tree.add_child(parent, id);
        self.tree.set_position(id, area.origin());
        self.tree.set_backend(id, backend);
        if let Err(error) = self.sync_surfaces(id) {
            self.tree.destroy(id);
            return Err(error);
        }
        self.invalidate(parent);
        Ok(id)
    }

    /// Moves `child` under `new_parent` (or detaches it) and reconciles
    /// the surfaces of the moved subtree.
    pub fn reparent(
        &mut self,
        child: FrameId,
        new_parent: Option<FrameId>,
    ) -> Result<(), ShellError> {
        let old_top = self.tree.top_of(child);
        self.tree.reparent(child, new_parent);
        self.sync_surfaces(child)?;
        if self.tree.contains(old_top) {
            self.invalidate(old_top);
        }
        self.invalidate(child);
        Ok(())
    }

    /// Makes `id` own a root surface regardless of its parent, or
    /// revokes that, tearing the surface down.
    pub fn set_force_root(&mut self, id: FrameId, value: bool) -> Result<(), ShellError> {
        self.tree.node_mut(id).set_force_root(value);
        self.sync_surfaces(id)?;
        self.invalidate(id);
        Ok(())
    }

    /// Switches `id` and its whole subtree to `backend` and reconciles
    /// surfaces, so a backend change re-homes rendering immediately.
    pub fn set_backend(&mut self, id: FrameId, backend: Backend) -> Result<(), ShellError> {
        self.tree.set_backend(id, backend);
        self.sync_surfaces(id)?;
        self.invalidate(id);
        Ok(())
    }

    /// Destroys `id` and its subtree, tearing down any surfaces owned
    /// within it.
    pub fn destroy_frame(&mut self, id: FrameId) {
        let parent = self.tree.parent(id);
        for frame in self.collect_subtree(id) {
            if let Some(index) = self.surface_index(frame) {
                self.teardown_surface(index);
            }
            self.router.forget(frame);
        }
        self.tree.destroy(id);
        if let Some(parent) = parent {
            self.invalidate(parent);
        }
    }

    /// The device rendering `id`: walks up to the nearest ancestor
    /// surface that owns one. Panics when the frame does not resolve to
    /// any root, since it has no valid render target.
    pub fn device(&self, id: FrameId) -> SharedDevice {
        let mut current = id;
        loop {
            if let Some(index) = self.surface_index(current) {
                if let Some(device) = &self.surfaces[index].device {
                    return device.clone();
                }
            }
            match self.tree.parent(current) {
                Some(parent) => current = parent,
                None => panic!("unattached frame {id} has no device"),
            }
        }
    }

    /// The OS window hosting `id`: walks up to the nearest owning
    /// surface. Panics when the frame does not resolve to any root.
    pub fn window(&self, id: FrameId) -> SharedWindow {
        let mut current = id;
        loop {
            if let Some(index) = self.surface_index(current) {
                return self.surfaces[index].window.clone();
            }
            match self.tree.parent(current) {
                Some(parent) => current = parent,
                None => panic!("unattached frame {id} has no window"),
            }
        }
    }

    /// The surface owned by `id` itself, when it is a root.
    pub fn surface(&self, id: FrameId) -> Option<&RootSurface> {
        self.surface_index(id).map(|index| &self.surfaces[index])
    }

    pub fn surfaces(&self) -> &[RootSurface] {
        &self.surfaces
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Marks the root surface above `id` dirty so the next render pass
    /// repaints it. A frame not under any device-owning root is left
    /// alone.
    pub fn invalidate(&mut self, id: FrameId) {
        let top = self.tree.top_of(id);
        if let Some(index) = self.surface_index(top) {
            if self.surfaces[index].device.is_some() {
                self.surfaces[index].dirty = true;
            }
        }
    }

    /// Renders every dirty top-level surface. Embedded device-owning
    /// surfaces are rendered inside their ancestor's walk, so a dirty
    /// one first propagates dirtiness to its top-level root.
    pub fn render(&mut self) {
        let embedded_dirty: Vec<FrameId> = self
            .surfaces
            .iter()
            .filter(|surface| {
                surface.dirty
                    && surface.device.is_some()
                    && self.tree.parent(surface.frame).is_some()
            })
            .map(|surface| surface.frame)
            .collect();
        for frame in embedded_dirty {
            self.invalidate(frame);
        }

        for index in 0..self.surfaces.len() {
            let frame = self.surfaces[index].frame;
            if !self.surfaces[index].dirty
                || !self.surfaces[index].owns_device()
                || self.tree.parent(frame).is_some()
            {
                continue;
            }
            self.render_root(index);
        }
    }

    /// Routes one window event delivered to the frame owning the source
    /// window.
    pub fn route_event(&mut self, source: FrameId, event: WindowEvent) {
        match event {
            WindowEvent::MouseMove { position } => {
                self.router.mouse_move(&mut self.tree, source, position);
            }
            WindowEvent::MouseDown { button, position } => {
                self.router
                    .mouse_down(&mut self.tree, source, position, button);
                // a press may raise the hit frame over its siblings
                self.invalidate(source);
            }
            WindowEvent::MouseUp { button, position } => {
                self.router
                    .mouse_up(&mut self.tree, source, position, button);
            }
            WindowEvent::MouseDoubleClick { button, position } => {
                self.router
                    .mouse_double_click(&mut self.tree, source, position, button);
            }
            WindowEvent::MouseWheel { delta, position } => {
                self.router
                    .mouse_wheel(&mut self.tree, source, position, delta);
            }
            WindowEvent::KeyDown { key, modifiers } => {
                self.router.key_down(&mut self.tree, source, key, modifiers);
            }
            WindowEvent::KeyUp { key, modifiers } => {
                self.router.key_up(&mut self.tree, source, key, modifiers);
            }
            WindowEvent::Resized { width, height } => {
                self.handle_os_resize(source, width, height);
            }
        }
    }

    /// The cursor the last routed move decided on, if any.
    pub fn take_cursor(&mut self) -> Option<CursorKind> {
        self.router.take_cursor()
    }

    /// Applies an OS-reported window resize: node size first (anchors
    /// propagate from it), then the swap chain after an idle wait.
    fn handle_os_resize(&mut self, id: FrameId, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.tree
            .set_size(id, UiPoint::new(width as i32, height as i32));
        if let Some(index) = self.surface_index(id) {
            if let Some(device) = self.surfaces[index].device.clone() {
                device.borrow_mut().wait_idle();
                device.borrow_mut().resize(width, height);
            }
        }
        self.invalidate(id);
    }

    /// Mirrors queued geometry changes onto OS windows and keeps nested
    /// windows glued to their frame's global offset.
    pub fn drain_geometry_syncs(&mut self) {
        for sync in self.tree.take_syncs() {
            let id = match sync {
                GeometrySync::Moved(id) | GeometrySync::Resized(id) => id,
            };
            if !self.tree.contains(id) {
                continue;
            }
            if let GeometrySync::Resized(_) = sync {
                if let Some(index) = self.surface_index(id) {
                    let size = self.tree.node(id).area().size();
                    let (width, height) = self.surfaces[index].window.borrow().size();
                    if (width as i32, height as i32) != (size.x, size.y) {
                        self.surfaces[index]
                            .window
                            .borrow_mut()
                            .resize(size.x.max(1) as u32, size.y.max(1) as u32);
                    }
                }
            }
            self.invalidate(id);
        }
        self.reposition_nested_windows();
    }

    /// Ensures every frame in the subtree of `id` owns exactly the
    /// surface resources the ownership rules grant it.
    pub fn sync_surfaces(&mut self, id: FrameId) -> Result<(), ShellError> {
        for frame in self.collect_subtree(id) {
            self.sync_frame_surface(frame)?;
        }
        Ok(())
    }

    pub(crate) fn pump_windows(&mut self) {
        self.windows.pump();
    }

    pub(crate) fn surface_entry(&self, index: usize) -> (FrameId, SharedWindow) {
        let surface = &self.surfaces[index];
        (surface.frame, surface.window.clone())
    }

    /// Tears down the surface owned by `frame`, waiting out in-flight
    /// GPU work first. Used by the pump's close protocol. The frame
    /// itself stays in the tree unless its close hook destroyed it.
    pub(crate) fn close_surface(&mut self, frame: FrameId) {
        if let Some(index) = self.surface_index(frame) {
            self.teardown_surface(index);
        }
        if self.tree.contains(frame) {
            for id in self.collect_subtree(frame) {
                self.router.forget(id);
            }
        }
    }

    fn wants_window(&self, id: FrameId) -> bool {
        match self.tree.parent(id) {
            None => true,
            Some(parent) => {
                let node = self.tree.node(id);
                node.force_root() || node.backend() != self.tree.node(parent).backend()
            }
        }
    }

    fn wants_device(&self, id: FrameId) -> bool {
        match self.tree.parent(id) {
            None => true,
            Some(parent) => self.tree.node(id).backend() != self.tree.node(parent).backend(),
        }
    }

    fn sync_frame_surface(&mut self, id: FrameId) -> Result<(), ShellError> {
        let wants_window = self.wants_window(id);
        let wants_device = wants_window && self.wants_device(id);
        match (self.surface_index(id), wants_window) {
            (Some(index), false) => {
                self.teardown_surface(index);
            }
            (None, true) => {
                let node = self.tree.node(id);
                let area = node.area();
                let backend = node.backend();
                let mut options = WindowOptions::new(
                    String::new(),
                    area.width.max(1) as u32,
                    area.height.max(1) as u32,
                )
                .with_backend(backend)
                .with_position(self.screen_position(id));
                if self.tree.parent(id).is_some() {
                    options = options.borderless();
                }
                self.attach_surface(id, &options)?;
            }
            (Some(index), true) => {
                let backend = self.tree.node(id).backend();
                let current = self.surfaces[index]
                    .device
                    .as_ref()
                    .map(|device| device.borrow().backend());
                match (current, wants_device) {
                    (Some(active), true) if active == backend => {}
                    (Some(_), true) => {
                        self.surfaces[index].wait_idle();
                        self.surfaces[index].device = None;
                        self.create_surface_device(index, backend)?;
                    }
                    (Some(_), false) => {
                        self.surfaces[index].wait_idle();
                        self.surfaces[index].device = None;
                        self.surfaces[index].buffer = DrawCommandBuffer::new();
                        log::info!("frame {id} released its device, window kept");
                    }
                    (None, true) => {
                        self.create_surface_device(index, backend)?;
                    }
                    (None, false) => {}
                }
            }
            (None, false) => {}
        }
        Ok(())
    }

    fn attach_surface(&mut self, id: FrameId, options: &WindowOptions) -> Result<(), ShellError> {
        let window = self.windows.create_window(options)?;
        let device = if self.wants_device(id) {
            let window_ref = window.borrow();
            let (width, height) = window_ref.size();
            let device =
                self.devices
                    .create_device(window_ref.render_window(), options.backend, width, height)?;
            drop(window_ref);
            Some(device)
        } else {
            None
        };
        log::info!(
            "frame {id} acquired a root surface ({}, own device: {})",
            options.backend,
            device.is_some()
        );
        let mut surface = RootSurface::new(id, window, device);
        surface.last_position = options.position;
        self.surfaces.push(surface);
        Ok(())
    }

    fn create_surface_device(&mut self, index: usize, backend: Backend) -> Result<(), ShellError> {
        let window = self.surfaces[index].window.clone();
        let window_ref = window.borrow();
        let (width, height) = window_ref.size();
        let device = self
            .devices
            .create_device(window_ref.render_window(), backend, width, height)?;
        drop(window_ref);
        log::info!(
            "frame {} acquired a {backend} device",
            self.surfaces[index].frame
        );
        self.surfaces[index].device = Some(device);
        self.surfaces[index].dirty = true;
        Ok(())
    }

    fn teardown_surface(&mut self, index: usize) {
        let mut surface = self.surfaces.remove(index);
        surface.wait_idle();
        log::info!("frame {} released its root surface", surface.frame);
    }

    fn surface_index(&self, id: FrameId) -> Option<usize> {
        self.surfaces.iter().position(|surface| surface.frame == id)
    }

    fn collect_subtree(&self, id: FrameId) -> Vec<FrameId> {
        let mut frames = vec![id];
        let mut cursor = 0;
        while cursor < frames.len() {
            frames.extend_from_slice(self.tree.children(frames[cursor]));
            cursor += 1;
        }
        frames
    }

    fn render_root(&mut self, index: usize) {
        let frame = self.surfaces[index].frame;
        let Some(device) = self.surfaces[index].device.clone() else {
            return;
        };
        let area = self.tree.node(frame).area();
        let mut buffer = std::mem::take(&mut self.surfaces[index].buffer);
        buffer.open();
        buffer.reset();
        buffer.push_transform(ScopeTransform::frame(UiRect::new(
            0,
            0,
            area.width,
            area.height,
        )));
        self.paint_frame(frame, &mut buffer);
        self.render_children(frame, &mut buffer);
        buffer.pop_transform();
        buffer.close();

        let clear = self.theme.color(ThemeColor::WindowBackground);
        let batches = buffer.record_commands(&mut *device.borrow_mut(), self.fonts.as_mut(), clear);
        for batch in batches {
            match batch.device {
                Some(foreign) => {
                    foreign.borrow_mut().submit(batch.list);
                    foreign.borrow_mut().present(true);
                }
                None => device.borrow_mut().submit_blocking(batch.list),
            }
        }
        device.borrow_mut().present(false);
        self.surfaces[index].buffer = buffer;
        self.surfaces[index].dirty = false;
        log::debug!("rendered root surface of frame {frame}");
    }

    fn paint_frame(&mut self, id: FrameId, buffer: &mut DrawCommandBuffer) {
        let node = self.tree.node(id);
        if node.draw_background() {
            let color = if node.background() == Color::TRANSPARENT {
                self.theme.color(ThemeColor::FrameBackground)
            } else {
                node.background()
            };
            buffer.draw_rectangle(0, 0, node.width(), node.height(), color);
        }
        if let Some(hook) = self.tree.hook(id) {
            hook.borrow_mut().on_paint(&self.tree, id, buffer);
        }
    }

    fn render_children(&mut self, parent: FrameId, buffer: &mut DrawCommandBuffer) {
        let children: Vec<FrameId> = self.tree.children(parent).to_vec();
        for child in children {
            let area = self.tree.node(child).area();
            buffer.push_transform(ScopeTransform::frame(area));
            let top = buffer.current_transform();
            // a fully clipped subtree has nothing visible to record
            if top.clip.width != 0 && top.clip.height != 0 {
                let foreign = self
                    .surface_index(child)
                    .filter(|&index| self.surfaces[index].owns_device());
                match foreign {
                    Some(child_index) => {
                        self.render_root(child_index);
                        let grabbed = self.surfaces[child_index]
                            .device
                            .as_ref()
                            .and_then(|device| device.borrow_mut().grab_output());
                        match grabbed {
                            Some(image) => {
                                buffer.draw_image(0, 0, area.width, area.height, image);
                            }
                            None => {
                                log::warn!("no output to composite from frame {child}");
                            }
                        }
                    }
                    None => {
                        self.paint_frame(child, buffer);
                        self.render_children(child, buffer);
                    }
                }
            }
            buffer.pop_transform();
        }
    }

    /// Screen position for the window of `id`: the hosting top-level
    /// window's position plus the frame's offset from that root.
    fn screen_position(&self, id: FrameId) -> UiPoint {
        let top = self.tree.top_of(id);
        if top == id {
            return self.tree.node(id).area().origin();
        }
        let offset = self.tree.global_position(id) - self.tree.node(top).area().origin();
        match self.surface_index(top) {
            Some(top_index) => self.surfaces[top_index].window.borrow().position() + offset,
            None => offset,
        }
    }

    fn reposition_nested_windows(&mut self) {
        for index in 0..self.surfaces.len() {
            let frame = self.surfaces[index].frame;
            if self.tree.parent(frame).is_none() {
                continue;
            }
            let expected = self.screen_position(frame);
            if self.surfaces[index].last_position != Some(expected) {
                self.surfaces[index]
                    .window
                    .borrow_mut()
                    .set_position(expected);
                self.surfaces[index].last_position = Some(expected);
            }
        }
    }
}
