//! Platform-independent input types routed through the frame tree.

/// A single mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button on a right-handed mouse; drives drags, resizes and focus.
    Primary,
    Secondary,
    Middle,
}

/// Cursor shapes a frame can request from its window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorKind {
    #[default]
    Arrow,
    /// Diagonal resize, north-west to south-east.
    SizeNwse,
    /// Diagonal resize, north-east to south-west.
    SizeNesw,
    /// Vertical resize.
    SizeNs,
    /// Horizontal resize.
    SizeWe,
}

/// Which axes a frame may be dragged along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AllowedMovement {
    #[default]
    None,
    Horizontal,
    Vertical,
    All,
}

/// Where a local point falls relative to a frame's resize border.
///
/// The frame interior splits into a nine-way grid against the border
/// thickness; `Center` is the non-resizing interior and `Outside` is
/// anything beyond the frame bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeRegion {
    #[default]
    Outside,
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl ResizeRegion {
    /// True for the eight bands that start a resize when grabbed.
    pub fn is_handle(self) -> bool {
        !matches!(self, ResizeRegion::Center | ResizeRegion::Outside)
    }
}

/// Modifier keys state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Returns true if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    /// Returns true if Ctrl (or Cmd on macOS) is pressed.
    pub fn command_or_ctrl(&self) -> bool {
        #[cfg(target_os = "macos")]
        {
            self.meta
        }
        #[cfg(not(target_os = "macos"))]
        {
            self.ctrl
        }
    }
}

/// Physical key codes, independent of keyboard layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,

    Backspace,
    Delete,
    Enter,
    Tab,
    Space,
    Escape,

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,

    /// Key not recognized or not mapped.
    Unknown,
}
