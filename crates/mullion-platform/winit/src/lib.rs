//! Winit-backed window system for the mullion shell.
//!
//! [`WinitWindowSystem`] plugs a winit event loop into the shell's
//! window seam. The loop is polled with `pump_events` once per shell
//! tick instead of taking over the thread, so the application keeps
//! driving its own frame loop. Raw winit events are translated into
//! shell window events, with double clicks synthesized from press
//! timing the way Win32 does for `CS_DBLCLKS` windows.

mod system;
mod translate;

pub use system::{WinitPlatformWindow, WinitWindowSystem};

#[cfg(test)]
#[path = "tests/translate_tests.rs"]
mod translate_tests;
