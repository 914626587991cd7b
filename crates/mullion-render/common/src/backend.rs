//! Graphics backend selection.

/// Which GPU API family a root surface renders with. Two frames compare
/// backends to decide whether a child can share its parent's device or
/// needs a surface of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Vulkan,
    Dx12,
    Metal,
    Gl,
}

impl Backend {
    /// The native backend for the current platform.
    pub fn native() -> Backend {
        #[cfg(target_os = "windows")]
        {
            Backend::Dx12
        }
        #[cfg(target_os = "macos")]
        {
            Backend::Metal
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            Backend::Vulkan
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::native()
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Backend::Vulkan => "vulkan",
            Backend::Dx12 => "dx12",
            Backend::Metal => "metal",
            Backend::Gl => "gl",
        };
        f.write_str(name)
    }
}
