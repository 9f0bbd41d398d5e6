//! RAII wrappers around Vulkan synchronization objects.
//!
//! Semaphores order work between queue operations on the GPU; fences let
//! the host block until submitted work completes. [`FrameSync`] bundles
//! the three objects one in-flight frame slot needs.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Binary semaphore, created unsignaled.
pub struct Semaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();

        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };

        Ok(Self { device, semaphore })
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Host-waitable fence.
///
/// The frame loop keeps one per in-flight slot and waits on it before
/// touching that slot's command buffer again.
pub struct Fence {
    device: Arc<Device>,
    fence: vk::Fence,
}

impl Fence {
    /// Creates a fence, optionally already signaled. A signaled fence lets
    /// the first wait on a slot pass before any work was ever submitted.
    pub fn new(device: Arc<Device>, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::default().flags(flags);

        let fence = unsafe { device.handle().create_fence(&create_info, None)? };

        Ok(Self { device, fence })
    }

    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    /// Blocks until the fence signals or `timeout` nanoseconds pass.
    /// `u64::MAX` waits indefinitely.
    pub fn wait(&self, timeout: u64) -> Result<(), RhiError> {
        let fences = [self.fence];
        unsafe {
            self.device
                .handle()
                .wait_for_fences(&fences, true, timeout)?
        };
        Ok(())
    }

    /// Returns the fence to the unsignaled state. Must not be called while
    /// a queue submission still references it.
    pub fn reset(&self) -> Result<(), RhiError> {
        let fences = [self.fence];
        unsafe { self.device.handle().reset_fences(&fences)? };
        Ok(())
    }

    /// Non-blocking signal check.
    pub fn is_signaled(&self) -> bool {
        let result = unsafe { self.device.handle().get_fence_status(self.fence) };
        matches!(result, Ok(true))
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_fence(self.fence, None);
        }
    }
}

/// Number of frames the CPU may record ahead of the GPU.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Synchronization bundle for one in-flight frame slot.
///
/// Acquisition signals `image_available`; the submission waits on it,
/// then signals `render_finished` for presentation and the in-flight
/// fence for the host. The fence starts signaled so the slot's first
/// frame does not block on work that was never submitted.
pub struct FrameSync {
    image_available_semaphore: Semaphore,
    render_finished_semaphore: Semaphore,
    in_flight_fence: Fence,
}

impl FrameSync {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let image_available_semaphore = Semaphore::new(device.clone())?;
        let render_finished_semaphore = Semaphore::new(device.clone())?;
        let in_flight_fence = Fence::new(device, true)?;

        debug!("Created frame synchronization primitives");

        Ok(Self {
            image_available_semaphore,
            render_finished_semaphore,
            in_flight_fence,
        })
    }

    #[inline]
    pub fn in_flight_fence(&self) -> &Fence {
        &self.in_flight_fence
    }

    #[inline]
    pub fn image_available_handle(&self) -> vk::Semaphore {
        self.image_available_semaphore.handle()
    }

    #[inline]
    pub fn render_finished_handle(&self) -> vk::Semaphore {
        self.render_finished_semaphore.handle()
    }

    #[inline]
    pub fn in_flight_fence_handle(&self) -> vk::Fence {
        self.in_flight_fence.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_frames_in_flight_constant() {
        assert!(MAX_FRAMES_IN_FLIGHT >= 1);
        assert!(MAX_FRAMES_IN_FLIGHT <= 4);
    }

    #[test]
    fn sync_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Semaphore>();
        assert_send_sync::<Fence>();
        assert_send_sync::<FrameSync>();
    }
}
