//! Platform abstraction layer for the Keel renderer.
//!
//! This crate provides platform-specific functionality:
//! - Window management via winit
//! - Input state tracking (keyboard, mouse)
//! - Vulkan surface creation from raw window handles

mod input;
mod window;

pub use input::{button_index, InputState};
pub use window::{get_required_extensions, Surface, Window};
