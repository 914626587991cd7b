//! Deferred paint packets.

use mullion_graphics::{Color, ImageData, UiRect};

use crate::device::{BackendList, SharedDevice};

/// A solid rectangle in root-surface space.
#[derive(Clone, Debug, PartialEq)]
pub struct RectanglePacket {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: Color,
}

/// A textured quad. The device resolves `image` through its texture
/// cache keyed by the image identity.
#[derive(Clone, Debug)]
pub struct ImagePacket {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub image: ImageData,
}

/// A text run. Glyph expansion happens at record time through the
/// frame's font provider.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPacket {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub text: String,
}

/// A prebuilt backend command list injected into the packet stream.
///
/// When `device` is set, the list belongs to another root surface's
/// device and is submitted (and presented) there in its slot; when it is
/// `None` the list runs on the recording surface's own device.
pub struct ForeignList {
    pub(crate) list: Option<BackendList>,
    pub(crate) device: Option<SharedDevice>,
}

impl ForeignList {
    pub fn new(list: BackendList, device: Option<SharedDevice>) -> Self {
        Self {
            list: Some(list),
            device,
        }
    }
}

impl std::fmt::Debug for ForeignList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignList")
            .field("taken", &self.list.is_none())
            .field("foreign_device", &self.device.is_some())
            .finish()
    }
}

/// One deferred paint operation plus the scissor rectangle captured from
/// the transform stack when it was recorded.
#[derive(Debug)]
pub enum CommandPacket {
    Rectangle {
        packet: RectanglePacket,
        scissor: UiRect,
    },
    Image {
        packet: ImagePacket,
        scissor: UiRect,
    },
    Text {
        packet: TextPacket,
        scissor: UiRect,
    },
    SubCommandList {
        list: ForeignList,
    },
}
