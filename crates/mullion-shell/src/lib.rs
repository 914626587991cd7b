//! Root surfaces, render walk and message pump for Mullion.
//!
//! The shell sits between the frame tree and the platform: it decides
//! which frames own OS windows and GPU devices, reconciles those
//! resources when the tree is restructured, walks dirty roots into
//! draw command buffers and pumps window events back into the router.
//!
//! Platform backends plug in through [`WindowSystem`] and the render
//! backends through the device factory, so the whole layer runs
//! against scripted fakes in tests.

mod pump;
mod shell;
mod surface;
mod theme;
mod window;

pub use pump::MessagePump;
pub use shell::{Shell, ShellError};
pub use surface::RootSurface;
pub use theme::{StaticTheme, Theme, ThemeColor};
pub use window::{
    PlatformWindow, SharedWindow, WindowError, WindowEvent, WindowOptions, WindowSystem,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod shell_tests;

#[cfg(test)]
#[path = "tests/pump_tests.rs"]
mod pump_tests;
