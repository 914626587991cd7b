//! wgpu backend for the Mullion render device abstraction.
//!
//! Provides [`WgpuDevice`], a render device that records draw packets
//! into deferred command lists and replays them as render passes over
//! an offscreen frame target, plus [`WgpuDeviceFactory`] for the shell
//! to create one device per root surface.

mod render;
mod shaders;

pub use render::{WgpuDevice, WgpuDeviceFactory, WgpuList};
