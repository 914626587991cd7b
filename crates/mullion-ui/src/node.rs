//! Frame node data: geometry, behavior flags and interaction state.

use std::fmt;

use mullion_graphics::{Color, Insets, UiPoint, UiRect};
use mullion_render_common::Backend;
use smallvec::SmallVec;

use crate::anchors::Anchor;
use crate::hook::SharedHook;
use crate::input::{AllowedMovement, CursorKind, ResizeRegion};

/// Opaque handle to a frame in a [`FrameTree`](crate::FrameTree).
///
/// Handles are never reused; a destroyed frame's id stays dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) usize);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frames never shrink below this unless a smaller minimum is set.
pub const DEFAULT_MINIMUM_SIZE: UiPoint = UiPoint::new(20, 20);

/// Live pointer-interaction state for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InteractionState {
    /// Primary button went down inside the frame's draggable body.
    pub mouse_down: bool,
    /// Frame position at the moment the drag press landed.
    pub press_origin: UiPoint,
    /// For drags: the global press point. For resizes: the last global
    /// point observed, walked forward each move.
    pub pointer_global: UiPoint,
    pub grabbed: bool,
    pub grab_region: ResizeRegion,
    pub grab_cursor: CursorKind,
}

/// One node of the frame tree.
///
/// Geometry and tree structure are only mutable through
/// [`FrameTree`](crate::FrameTree) methods so that anchor propagation,
/// ordering invariants and change hooks stay consistent; the setters
/// here cover inert per-node configuration.
pub struct FrameNode {
    pub(crate) parent: Option<FrameId>,
    pub(crate) children: Vec<FrameId>,
    pub(crate) area: UiRect,
    pub(crate) client_insets: Insets,
    pub(crate) min_size: UiPoint,
    pub(crate) always_on_top: bool,
    pub(crate) can_receive_mouse: bool,
    pub(crate) blocks_mouse: bool,
    pub(crate) can_focus: bool,
    pub(crate) can_move: AllowedMovement,
    pub(crate) can_resize: bool,
    pub(crate) min_position: Option<UiPoint>,
    pub(crate) max_position: Option<UiPoint>,
    pub(crate) draw_background: bool,
    pub(crate) background: Color,
    pub(crate) force_root: bool,
    pub(crate) backend: Backend,
    pub(crate) anchors: SmallVec<[Anchor; 4]>,
    pub(crate) interaction: InteractionState,
    pub(crate) hook: Option<SharedHook>,
}

impl FrameNode {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        let min_size = DEFAULT_MINIMUM_SIZE;
        Self {
            parent: None,
            children: Vec::new(),
            area: UiRect::new(0, 0, width.max(min_size.x), height.max(min_size.y)),
            client_insets: Insets::ZERO,
            min_size,
            always_on_top: false,
            can_receive_mouse: true,
            blocks_mouse: true,
            can_focus: true,
            can_move: AllowedMovement::None,
            can_resize: false,
            min_position: None,
            max_position: None,
            draw_background: true,
            background: Color::TRANSPARENT,
            force_root: false,
            backend: Backend::native(),
            anchors: SmallVec::new(),
            interaction: InteractionState::default(),
            hook: None,
        }
    }

    pub fn area(&self) -> UiRect {
        self.area
    }

    pub fn position(&self) -> UiPoint {
        self.area.origin()
    }

    pub fn width(&self) -> i32 {
        self.area.width
    }

    pub fn height(&self) -> i32 {
        self.area.height
    }

    pub fn client_insets(&self) -> Insets {
        self.client_insets
    }

    pub fn set_client_insets(&mut self, insets: Insets) {
        self.client_insets = insets;
    }

    pub fn min_size(&self) -> UiPoint {
        self.min_size
    }

    /// New minimum takes effect on the next size change; the current
    /// size is left alone.
    pub fn set_min_size(&mut self, min_size: UiPoint) {
        self.min_size = min_size;
    }

    pub fn always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn can_receive_mouse(&self) -> bool {
        self.can_receive_mouse
    }

    pub fn set_can_receive_mouse(&mut self, value: bool) {
        self.can_receive_mouse = value;
    }

    pub fn blocks_mouse(&self) -> bool {
        self.blocks_mouse
    }

    pub fn set_blocks_mouse(&mut self, value: bool) {
        self.blocks_mouse = value;
    }

    pub fn can_focus(&self) -> bool {
        self.can_focus
    }

    pub fn set_can_focus(&mut self, value: bool) {
        self.can_focus = value;
    }

    pub fn can_move(&self) -> AllowedMovement {
        self.can_move
    }

    pub fn set_can_move(&mut self, movement: AllowedMovement) {
        self.can_move = movement;
    }

    pub fn can_resize(&self) -> bool {
        self.can_resize
    }

    pub fn set_can_resize(&mut self, value: bool) {
        self.can_resize = value;
    }

    /// Lowest position a drag may reach, per axis. `None` leaves the
    /// axis unbounded.
    pub fn set_min_position(&mut self, position: Option<UiPoint>) {
        self.min_position = position;
    }

    /// Highest position a drag may reach, per axis.
    pub fn set_max_position(&mut self, position: Option<UiPoint>) {
        self.max_position = position;
    }

    pub fn draw_background(&self) -> bool {
        self.draw_background
    }

    pub fn set_draw_background(&mut self, value: bool) {
        self.draw_background = value;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Whether this frame insists on owning a root surface even with a
    /// parent present.
    pub fn force_root(&self) -> bool {
        self.force_root
    }

    /// Takes effect when the owning shell next reconciles surfaces.
    pub fn set_force_root(&mut self, value: bool) {
        self.force_root = value;
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn set_hook(&mut self, hook: SharedHook) {
        self.hook = Some(hook);
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    /// The frame is currently being dragged or resize-grabbed.
    pub fn is_engaged(&self) -> bool {
        self.interaction.mouse_down || self.interaction.grabbed
    }
}
