//! RHI-specific error types.

use std::fmt;

use thiserror::Error;

/// Device bring-up stage, used to report where initialization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Instance,
    Surface,
    PhysicalDevice,
    LogicalDevice,
    Swapchain,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::Instance => "instance creation",
            InitStage::Surface => "surface creation",
            InitStage::PhysicalDevice => "physical device selection",
            InitStage::LogicalDevice => "logical device creation",
            InitStage::Swapchain => "swapchain creation",
        };
        f.write_str(name)
    }
}

/// RHI-specific error type.
#[derive(Error, Debug)]
pub enum RhiError {
    /// Vulkan API error
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] ash::vk::Result),

    /// Failed to load Vulkan library
    #[error("Failed to load Vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    /// Device initialization failure with the stage that failed
    #[error("Device initialization failed during {stage}: {source}")]
    DeviceInit {
        stage: InitStage,
        source: ash::vk::Result,
    },

    /// No suitable GPU found
    #[error("No suitable GPU found")]
    NoSuitableGpu,

    /// Surface creation error
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Swapchain error
    #[error("Swapchain error: {0}")]
    SwapchainError(String),
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_stage_appears_in_message() {
        let err = RhiError::DeviceInit {
            stage: InitStage::LogicalDevice,
            source: ash::vk::Result::ERROR_INITIALIZATION_FAILED,
        };
        let message = err.to_string();
        assert!(message.contains("logical device creation"));
    }

    #[test]
    fn every_init_stage_names_its_phase() {
        let cases = [
            (InitStage::Instance, "instance creation"),
            (InitStage::Surface, "surface creation"),
            (InitStage::PhysicalDevice, "physical device selection"),
            (InitStage::LogicalDevice, "logical device creation"),
            (InitStage::Swapchain, "swapchain creation"),
        ];

        for (stage, phase) in cases {
            let err = RhiError::DeviceInit {
                stage,
                source: ash::vk::Result::ERROR_INITIALIZATION_FAILED,
            };
            assert!(
                err.to_string().contains(phase),
                "stage {:?} should report '{}'",
                stage,
                phase
            );
        }
    }
}
