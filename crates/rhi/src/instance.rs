//! Vulkan instance management.
//!
//! This module handles VkInstance creation, validation layers, and debug messengers.
//!
//! # Overview
//!
//! The [`Instance`] struct provides a safe abstraction over the Vulkan instance,
//! including optional validation layer support for debugging purposes. The
//! surface extensions required by the windowing platform are supplied by the
//! caller, so this crate stays free of any platform-specific listing.

use std::ffi::{CStr, CString};

use ash::{Entry, vk};
use tracing::{error, info, warn};

use keel_core::RendererConfig;

use crate::error::{InitStage, RhiError};

/// The Khronos validation layer name.
const VALIDATION_LAYER_NAME: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Vulkan instance wrapper with optional validation layer support.
///
/// This struct manages the lifetime of the Vulkan instance and its associated
/// debug utilities. When dropped, it properly cleans up all Vulkan resources.
pub struct Instance {
    /// Vulkan entry point loader
    entry: Entry,
    /// Vulkan instance handle
    instance: ash::Instance,
    /// Debug utils extension loader (only present when validation is enabled)
    debug_utils: Option<ash::ext::debug_utils::Instance>,
    /// Debug messenger handle (only present when validation is enabled)
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl Instance {
    /// Creates a new Vulkan instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Application name, minimum API version, and validation flag
    /// * `surface_extensions` - Instance extensions required by the windowing
    ///   platform, typically from `ash_window::enumerate_required_extensions`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Vulkan library cannot be loaded
    /// - Instance creation fails
    /// - Debug messenger setup fails (when validation is enabled)
    pub fn new(
        config: &RendererConfig,
        surface_extensions: &[*const i8],
    ) -> Result<Self, RhiError> {
        // Load the Vulkan library
        let entry = unsafe { Entry::load()? };

        let validation_available =
            config.enable_validation && Self::is_validation_layer_available(&entry)?;

        let app_name =
            CString::new(config.app_name.as_str()).unwrap_or_else(|_| CString::from(c"Keel"));
        let (api_major, api_minor) = config.min_api_version;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(c"Keel")
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::make_api_version(0, api_major, api_minor, 0));

        // Collect required extensions
        let mut extensions = surface_extensions.to_vec();
        if validation_available {
            extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        // Set up layers
        let layers = if validation_available {
            vec![VALIDATION_LAYER_NAME.as_ptr()]
        } else {
            vec![]
        };

        // Create instance
        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(|e| RhiError::DeviceInit {
                    stage: InitStage::Instance,
                    source: e,
                })?
        };

        info!(
            "Vulkan instance created (requested API version {}.{})",
            api_major, api_minor
        );

        // Set up debug messenger if validation is enabled
        let (debug_utils, debug_messenger) = if validation_available {
            let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);
            let messenger = Self::setup_debug_messenger(&debug_utils)?;
            info!("Debug messenger created");
            (Some(debug_utils), Some(messenger))
        } else {
            (None, None)
        };

        if validation_available {
            info!("Validation layers enabled");
        } else if config.enable_validation {
            warn!("Validation layers were requested but are not available");
        }

        Ok(Self {
            entry,
            instance,
            debug_utils,
            debug_messenger,
        })
    }

    /// Returns the Vulkan instance handle.
    #[inline]
    pub fn handle(&self) -> &ash::Instance {
        &self.instance
    }

    /// Returns the Vulkan entry point loader.
    #[inline]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Returns whether validation layers are enabled.
    #[inline]
    pub fn has_validation(&self) -> bool {
        self.debug_messenger.is_some()
    }

    /// Checks if the Khronos validation layer is available.
    fn is_validation_layer_available(entry: &Entry) -> Result<bool, RhiError> {
        let available_layers = unsafe { entry.enumerate_instance_layer_properties()? };

        let validation_layer_name = VALIDATION_LAYER_NAME.to_bytes_with_nul();

        let found = available_layers.iter().any(|layer| {
            let layer_name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
            layer_name.to_bytes_with_nul() == validation_layer_name
        });

        Ok(found)
    }

    /// Sets up the debug messenger for validation layer callbacks.
    fn setup_debug_messenger(
        debug_utils: &ash::ext::debug_utils::Instance,
    ) -> Result<vk::DebugUtilsMessengerEXT, RhiError> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe {
            debug_utils
                .create_debug_utils_messenger(&create_info, None)
                .map_err(RhiError::from)?
        };

        Ok(messenger)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            // Destroy debug messenger before instance
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils, self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
        info!("Vulkan instance destroyed");
    }
}

/// Debug callback function for validation layer messages.
///
/// This function is called by the Vulkan validation layer when it detects
/// issues with API usage. Messages are logged using the tracing crate.
///
/// # Safety
///
/// This function is called from the Vulkan driver and must follow the
/// Vulkan specification for debug callbacks.
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = unsafe { &*p_callback_data };
    let message = if callback_data.p_message.is_null() {
        std::borrow::Cow::Borrowed("(no message)")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message).to_string_lossy() }
    };

    let type_str = match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => "General",
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "Validation",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "Performance",
        _ => "Unknown",
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            error!("[Vulkan {}] {}", type_str, message);
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            warn!("[Vulkan {}] {}", type_str, message);
        }
        _ => {
            info!("[Vulkan {}] {}", type_str, message);
        }
    }

    // Returning VK_FALSE indicates the call should not be aborted
    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_creation_without_validation() {
        // This test requires Vulkan to be installed
        let config = RendererConfig {
            enable_validation: false,
            ..Default::default()
        };
        match Instance::new(&config, &[]) {
            Ok(instance) => {
                assert!(!instance.has_validation());
            }
            Err(e) => {
                // No loader or no driver on this machine - skip
                eprintln!("Skipping test: Vulkan not available ({:?})", e);
            }
        }
    }

    #[test]
    fn instance_creation_with_validation() {
        // This test requires the Vulkan SDK with validation layers
        let config = RendererConfig {
            enable_validation: true,
            ..Default::default()
        };
        match Instance::new(&config, &[]) {
            Ok(instance) => {
                // Validation might or might not be available depending on the system
                if instance.has_validation() {
                    assert!(instance.debug_utils.is_some());
                    assert!(instance.debug_messenger.is_some());
                }
            }
            Err(e) => {
                // No loader or no driver on this machine - skip
                eprintln!("Skipping test: Vulkan not available ({:?})", e);
            }
        }
    }
}
