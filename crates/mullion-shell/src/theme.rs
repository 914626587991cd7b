//! Named colors resolved for default frame painting.

use mullion_graphics::Color;

/// The color roles the shell resolves while painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeColor {
    /// Clear color of a root surface's render target.
    WindowBackground,
    /// Default fill of a frame that draws its background without an
    /// explicit color.
    FrameBackground,
    Accent,
    Text,
}

pub trait Theme {
    fn color(&self, name: ThemeColor) -> Color;
}

/// A fixed palette. The default is the dark scheme the demo uses.
#[derive(Clone, Copy, Debug)]
pub struct StaticTheme {
    pub window_background: Color,
    pub frame_background: Color,
    pub accent: Color,
    pub text: Color,
}

impl Default for StaticTheme {
    fn default() -> Self {
        Self {
            window_background: Color::rgb(0.10, 0.10, 0.12),
            frame_background: Color::rgb(0.17, 0.17, 0.20),
            accent: Color::rgb(0.26, 0.42, 0.69),
            text: Color::rgb(0.87, 0.87, 0.87),
        }
    }
}

impl Theme for StaticTheme {
    fn color(&self, name: ThemeColor) -> Color {
        match name {
            ThemeColor::WindowBackground => self.window_background,
            ThemeColor::FrameBackground => self.frame_background,
            ThemeColor::Accent => self.accent,
            ThemeColor::Text => self.text,
        }
    }
}
