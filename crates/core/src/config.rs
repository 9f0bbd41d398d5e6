//! Renderer configuration.

/// A two-dimensional pixel extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero (e.g. a minimized window).
    pub const fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Preferred presentation behavior, resolved against what the surface
/// actually supports when the swapchain is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentPreference {
    /// FIFO. Always available, caps the frame rate to the display.
    Vsync,
    /// Mailbox if available, otherwise FIFO. Low latency without tearing.
    LowLatency,
    /// Immediate if available, otherwise Mailbox, otherwise FIFO. May tear.
    NoVsync,
}

/// Startup configuration for the renderer.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Application name reported to the Vulkan driver.
    pub app_name: String,

    /// Minimum Vulkan API version (major, minor) a GPU must expose.
    pub min_api_version: (u32, u32),

    /// Window and swapchain size used at startup.
    pub initial_extent: Extent,

    /// Presentation mode preference.
    pub present_preference: PresentPreference,

    /// Enable the Khronos validation layer and debug messenger.
    pub enable_validation: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Keel".to_string(),
            min_api_version: (1, 1),
            initial_extent: Extent::new(1280, 720),
            present_preference: PresentPreference::Vsync,
            enable_validation: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RendererConfig::default();
        assert_eq!(config.min_api_version, (1, 1));
        assert_eq!(config.initial_extent, Extent::new(1280, 720));
        assert_eq!(config.present_preference, PresentPreference::Vsync);
    }

    #[test]
    fn zero_extent() {
        assert!(Extent::new(0, 720).is_zero());
        assert!(Extent::new(1280, 0).is_zero());
        assert!(!Extent::new(1280, 720).is_zero());
    }
}
