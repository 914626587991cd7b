//! The deferred draw command buffer.

use mullion_graphics::{Color, ImageData, UiPoint, UiRect};

use crate::device::{BackendList, RenderBatch, RenderDevice, SharedDevice};
use crate::font::FontProvider;
use crate::packet::{CommandPacket, ForeignList, ImagePacket, RectanglePacket, TextPacket};

/// One entry of the transform stack: the object-space origin paint calls
/// are offset by, and the clip rectangle captured into their packets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeTransform {
    pub object: UiRect,
    pub clip: UiRect,
}

impl ScopeTransform {
    pub fn new(object: UiRect, clip: UiRect) -> Self {
        Self { object, clip }
    }

    /// The common case: a frame scope where the clip equals the frame
    /// rectangle.
    pub fn frame(rect: UiRect) -> Self {
        Self {
            object: rect,
            clip: rect,
        }
    }
}

/// Records paint packets for one root surface per frame.
///
/// Protocol: `open` + `reset`, record through the `draw_*` calls inside
/// pushed transform scopes, `close`, then `record_commands` to replay the
/// packets into backend command lists. `open` on an already open buffer
/// is a fatal assertion; the buffer is not a lock, just a reentrancy
/// guard for the single pump-driven call site.
pub struct DrawCommandBuffer {
    open: bool,
    packets: Vec<CommandPacket>,
    stack: Vec<ScopeTransform>,
}

impl DrawCommandBuffer {
    pub fn new() -> Self {
        Self {
            open: false,
            packets: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        assert!(!self.open, "command buffer is already open");
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Clears the packets of the previous frame.
    pub fn reset(&mut self) {
        self.packets.clear();
    }

    pub fn packets(&self) -> &[CommandPacket] {
        &self.packets
    }

    /// Pushes a scope. Against a non-empty stack the object origin
    /// accumulates onto the current one (the pushed size is taken as is)
    /// and the clip is shifted into the current space and intersected
    /// with the current clip, so nested scopes can never escape an
    /// ancestor's scissor.
    pub fn push_transform(&mut self, t: ScopeTransform) {
        if let Some(current) = self.stack.last() {
            let object = UiRect::new(
                current.object.x + t.object.x,
                current.object.y + t.object.y,
                t.object.width.max(0),
                t.object.height.max(0),
            );
            let shifted = UiRect::new(
                current.clip.x + t.clip.x,
                current.clip.y + t.clip.y,
                t.clip.width,
                t.clip.height,
            );
            let clip = current.clip.intersect(&shifted);
            self.stack.push(ScopeTransform { object, clip });
        } else {
            self.stack.push(t);
        }
    }

    pub fn pop_transform(&mut self) -> ScopeTransform {
        self.stack
            .pop()
            .unwrap_or_else(|| panic!("transform stack underflow"))
    }

    pub fn current_transform(&self) -> ScopeTransform {
        *self
            .stack
            .last()
            .unwrap_or_else(|| panic!("transform stack is empty"))
    }

    pub fn draw_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let t = self.current_transform();
        self.packets.push(CommandPacket::Rectangle {
            packet: RectanglePacket {
                x: t.object.x + x,
                y: t.object.y + y,
                width,
                height,
                color,
            },
            scissor: t.clip,
        });
    }

    pub fn draw_image(&mut self, x: i32, y: i32, width: i32, height: i32, image: ImageData) {
        let t = self.current_transform();
        self.packets.push(CommandPacket::Image {
            packet: ImagePacket {
                x: t.object.x + x,
                y: t.object.y + y,
                width,
                height,
                image,
            },
            scissor: t.clip,
        });
    }

    pub fn draw_text(&mut self, x: i32, y: i32, width: i32, height: i32, text: impl Into<String>) {
        let t = self.current_transform();
        self.packets.push(CommandPacket::Text {
            packet: TextPacket {
                x: t.object.x + x,
                y: t.object.y + y,
                width,
                height,
                text: text.into(),
            },
            scissor: t.clip,
        });
    }

    /// Injects a prebuilt backend command list. It is submitted verbatim
    /// in its slot relative to the surrounding packets; `device` names
    /// the foreign device that must run it, `None` for the surface's own.
    pub fn execute_command_list(&mut self, list: BackendList, device: Option<SharedDevice>) {
        self.packets.push(CommandPacket::SubCommandList {
            list: ForeignList::new(list, device),
        });
    }

    /// Replays the packet list into backend command lists, starting a
    /// fresh list after every injected sub-list so submission order is
    /// preserved. The first list clears the render target. Returns the
    /// lists in submission order; injected lists carry their foreign
    /// device.
    pub fn record_commands(
        &mut self,
        device: &mut dyn RenderDevice,
        fonts: &mut dyn FontProvider,
        clear: Color,
    ) -> Vec<RenderBatch> {
        assert!(!self.open, "recording an open command buffer");

        let mut batches = Vec::new();
        let mut list_open = true;
        device.begin_list();
        device.clear_target(clear);

        for packet in &mut self.packets {
            match packet {
                CommandPacket::Rectangle { packet, scissor } => {
                    if !list_open {
                        device.begin_list();
                        list_open = true;
                    }
                    device.draw_rect(
                        UiRect::new(packet.x, packet.y, packet.width, packet.height),
                        packet.color,
                        *scissor,
                    );
                }
                CommandPacket::Image { packet, scissor } => {
                    if !list_open {
                        device.begin_list();
                        list_open = true;
                    }
                    device.draw_image(
                        UiRect::new(packet.x, packet.y, packet.width, packet.height),
                        &packet.image,
                        *scissor,
                    );
                }
                CommandPacket::Text { packet, scissor } => {
                    if !list_open {
                        device.begin_list();
                        list_open = true;
                    }
                    let run = fonts.render_text(&packet.text);
                    if !device.draw_glyphs(UiPoint::new(packet.x, packet.y), &run, *scissor) {
                        log::warn!(
                            "glyph upload ring exhausted, dropping run of {} glyphs",
                            run.glyphs.len()
                        );
                    }
                }
                CommandPacket::SubCommandList { list } => {
                    if list_open {
                        batches.push(RenderBatch {
                            list: device.end_list(),
                            device: None,
                        });
                        list_open = false;
                    }
                    if let Some(foreign) = list.list.take() {
                        batches.push(RenderBatch {
                            list: foreign,
                            device: list.device.clone(),
                        });
                    }
                }
            }
        }

        if !list_open {
            device.begin_list();
        }
        batches.push(RenderBatch {
            list: device.end_list(),
            device: None,
        });
        batches
    }
}

impl Default for DrawCommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}
