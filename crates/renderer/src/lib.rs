//! Frame orchestration on top of the RHI layer.
//!
//! [`Renderer`] owns the device, swapchain, render targets and per-frame
//! resources, and drives the acquire / record / submit / present cycle.

pub mod executor;
pub mod frame;
pub mod renderer;

pub use executor::{AcquireOutcome, FrameExecutor, PresentOutcome};
pub use frame::{FrameCursor, FramePhase};
pub use renderer::Renderer;
