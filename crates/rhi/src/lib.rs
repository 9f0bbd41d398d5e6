//! Vulkan abstraction layer (Render Hardware Interface).
//!
//! This crate provides a safe abstraction over Vulkan using the `ash` crate.
//! It handles:
//! - Instance and device creation
//! - Swapchain management
//! - Render pass and framebuffer management
//! - Command buffer recording
//! - Synchronization primitives

mod error;

pub mod command;
pub mod device;
pub mod instance;
pub mod physical_device;
pub mod render_target;
pub mod swapchain;
pub mod sync;

pub use error::{InitStage, RhiError, RhiResult};

// Re-export ash types that users might need
pub use ash::vk;
