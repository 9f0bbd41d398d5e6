//! Core utilities for the Keel renderer.
//!
//! This crate provides foundational types and utilities used across the renderer:
//! - Error types and result aliases
//! - Renderer configuration
//! - Logging initialization
//! - Timer utilities

mod config;
mod error;
mod logging;
mod timer;

pub use config::{Extent, PresentPreference, RendererConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
