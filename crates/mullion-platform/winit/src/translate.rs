//! Translation from winit input types to shell input types.

use std::time::{Duration, Instant};

use mullion_graphics::UiPoint;
use mullion_ui::{CursorKind, KeyCode, Modifiers, PointerButton};
use winit::event::{MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode as OsKey, ModifiersState};
use winit::window::CursorIcon;

/// Pixels of travel per wheel step when the OS reports pixel deltas
/// instead of lines.
const WHEEL_PIXELS_PER_STEP: f64 = 40.0;

/// Two presses of the same button within this window and within
/// [`DOUBLE_CLICK_SLOP`] of each other form a double click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_SLOP: i32 = 4;

pub(crate) fn translate_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

pub(crate) fn wheel_steps(delta: MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => lines.round() as i32,
        MouseScrollDelta::PixelDelta(position) => {
            (position.y / WHEEL_PIXELS_PER_STEP).round() as i32
        }
    }
}

pub(crate) fn translate_cursor(cursor: CursorKind) -> CursorIcon {
    match cursor {
        CursorKind::Arrow => CursorIcon::Default,
        CursorKind::SizeNwse => CursorIcon::NwseResize,
        CursorKind::SizeNesw => CursorIcon::NeswResize,
        CursorKind::SizeNs => CursorIcon::NsResize,
        CursorKind::SizeWe => CursorIcon::EwResize,
    }
}

pub(crate) fn translate_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

pub(crate) fn translate_key(key: OsKey) -> KeyCode {
    match key {
        OsKey::KeyA => KeyCode::A,
        OsKey::KeyB => KeyCode::B,
        OsKey::KeyC => KeyCode::C,
        OsKey::KeyD => KeyCode::D,
        OsKey::KeyE => KeyCode::E,
        OsKey::KeyF => KeyCode::F,
        OsKey::KeyG => KeyCode::G,
        OsKey::KeyH => KeyCode::H,
        OsKey::KeyI => KeyCode::I,
        OsKey::KeyJ => KeyCode::J,
        OsKey::KeyK => KeyCode::K,
        OsKey::KeyL => KeyCode::L,
        OsKey::KeyM => KeyCode::M,
        OsKey::KeyN => KeyCode::N,
        OsKey::KeyO => KeyCode::O,
        OsKey::KeyP => KeyCode::P,
        OsKey::KeyQ => KeyCode::Q,
        OsKey::KeyR => KeyCode::R,
        OsKey::KeyS => KeyCode::S,
        OsKey::KeyT => KeyCode::T,
        OsKey::KeyU => KeyCode::U,
        OsKey::KeyV => KeyCode::V,
        OsKey::KeyW => KeyCode::W,
        OsKey::KeyX => KeyCode::X,
        OsKey::KeyY => KeyCode::Y,
        OsKey::KeyZ => KeyCode::Z,
        OsKey::Digit0 => KeyCode::Digit0,
        OsKey::Digit1 => KeyCode::Digit1,
        OsKey::Digit2 => KeyCode::Digit2,
        OsKey::Digit3 => KeyCode::Digit3,
        OsKey::Digit4 => KeyCode::Digit4,
        OsKey::Digit5 => KeyCode::Digit5,
        OsKey::Digit6 => KeyCode::Digit6,
        OsKey::Digit7 => KeyCode::Digit7,
        OsKey::Digit8 => KeyCode::Digit8,
        OsKey::Digit9 => KeyCode::Digit9,
        OsKey::F1 => KeyCode::F1,
        OsKey::F2 => KeyCode::F2,
        OsKey::F3 => KeyCode::F3,
        OsKey::F4 => KeyCode::F4,
        OsKey::F5 => KeyCode::F5,
        OsKey::F6 => KeyCode::F6,
        OsKey::F7 => KeyCode::F7,
        OsKey::F8 => KeyCode::F8,
        OsKey::F9 => KeyCode::F9,
        OsKey::F10 => KeyCode::F10,
        OsKey::F11 => KeyCode::F11,
        OsKey::F12 => KeyCode::F12,
        OsKey::ArrowUp => KeyCode::ArrowUp,
        OsKey::ArrowDown => KeyCode::ArrowDown,
        OsKey::ArrowLeft => KeyCode::ArrowLeft,
        OsKey::ArrowRight => KeyCode::ArrowRight,
        OsKey::Home => KeyCode::Home,
        OsKey::End => KeyCode::End,
        OsKey::PageUp => KeyCode::PageUp,
        OsKey::PageDown => KeyCode::PageDown,
        OsKey::Backspace => KeyCode::Backspace,
        OsKey::Delete => KeyCode::Delete,
        OsKey::Enter => KeyCode::Enter,
        OsKey::Tab => KeyCode::Tab,
        OsKey::Space => KeyCode::Space,
        OsKey::Escape => KeyCode::Escape,
        OsKey::ShiftLeft => KeyCode::ShiftLeft,
        OsKey::ShiftRight => KeyCode::ShiftRight,
        OsKey::ControlLeft => KeyCode::ControlLeft,
        OsKey::ControlRight => KeyCode::ControlRight,
        OsKey::AltLeft => KeyCode::AltLeft,
        OsKey::AltRight => KeyCode::AltRight,
        OsKey::SuperLeft => KeyCode::MetaLeft,
        OsKey::SuperRight => KeyCode::MetaRight,
        _ => KeyCode::Unknown,
    }
}

/// Folds the second of two rapid presses into a double click.
pub(crate) struct DoubleClickTracker {
    last: Option<(PointerButton, Instant, UiPoint)>,
}

impl DoubleClickTracker {
    pub(crate) fn new() -> Self {
        Self { last: None }
    }

    /// Registers a press and reports whether it completes a double
    /// click. A completing press clears the state, so the third press
    /// of a triple click starts a fresh cycle.
    pub(crate) fn register(
        &mut self,
        button: PointerButton,
        position: UiPoint,
        now: Instant,
    ) -> bool {
        if let Some((last_button, at, origin)) = self.last {
            let near = (position.x - origin.x).abs() <= DOUBLE_CLICK_SLOP
                && (position.y - origin.y).abs() <= DOUBLE_CLICK_SLOP;
            if last_button == button && near && now.duration_since(at) <= DOUBLE_CLICK_WINDOW {
                self.last = None;
                return true;
            }
        }
        self.last = Some((button, now, position));
        false
    }
}
