//! Per-frame execution resources and the acquire / submit / present cycle.
//!
//! The executor owns one command buffer and one synchronization bundle per
//! in-flight slot, and drives them through the GPU handoff points. What
//! gets recorded between acquire and submit is the caller's business.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info, warn};

use keel_rhi::command::{CommandBuffer, CommandPool};
use keel_rhi::device::Device;
use keel_rhi::render_target::RenderTargets;
use keel_rhi::swapchain::Swapchain;
use keel_rhi::sync::{FrameSync, MAX_FRAMES_IN_FLIGHT};
use keel_rhi::{RhiError, RhiResult};

use crate::frame::FrameCursor;

/// Result of asking the swapchain for the next image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired and the frame may proceed. A suboptimal
    /// swapchain still acquires; the mismatch is reported at present.
    Acquired(u32),
    /// The swapchain no longer matches the surface and must be rebuilt
    /// before any image can be acquired.
    OutOfDate,
}

/// Result of queueing an image for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The image was presented and the swapchain is still usable.
    Presented,
    /// The image was handed off, but the swapchain is out of date or
    /// suboptimal and should be rebuilt before the next frame.
    NeedsRebuild,
}

/// Command buffer and synchronization primitives for one in-flight slot.
struct FrameData {
    command_buffer: CommandBuffer,
    sync: FrameSync,
}

impl FrameData {
    fn new(device: Arc<Device>, pool: &CommandPool) -> RhiResult<Self> {
        Ok(Self {
            command_buffer: CommandBuffer::new(Arc::clone(&device), pool)?,
            sync: FrameSync::new(device)?,
        })
    }
}

/// Drives the per-frame cycle across `MAX_FRAMES_IN_FLIGHT` slots.
///
/// Each slot carries its own command buffer and sync bundle, so the CPU can
/// record frame N+1 while the GPU still works on frame N. The in-flight
/// fence of a slot gates reuse of that slot's resources.
pub struct FrameExecutor {
    device: Arc<Device>,
    command_pool: CommandPool,
    frames: Vec<FrameData>,
    cursor: FrameCursor,
}

impl FrameExecutor {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let command_pool = CommandPool::new(Arc::clone(&device), device.graphics_family())?;

        let mut frames = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            frames.push(FrameData::new(Arc::clone(&device), &command_pool)?);
        }

        info!(
            frames_in_flight = MAX_FRAMES_IN_FLIGHT,
            "Frame executor created"
        );

        Ok(Self {
            device,
            command_pool,
            frames,
            cursor: FrameCursor::new(),
        })
    }

    pub fn cursor(&self) -> &FrameCursor {
        &self.cursor
    }

    /// Command buffer of the active slot, for recording draw commands
    /// between `begin` and `submit`.
    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.frames[self.cursor.slot()].command_buffer
    }

    fn current(&self) -> &FrameData {
        &self.frames[self.cursor.slot()]
    }

    /// Blocks until the GPU has finished the work previously submitted
    /// from the active slot.
    pub fn wait_for_slot(&self) -> RhiResult<()> {
        self.current().sync.in_flight_fence().wait(u64::MAX)
    }

    /// Asks the swapchain for the next image, signaling the slot's
    /// image-available semaphore once it is ready.
    pub fn acquire(&self, swapchain: &Swapchain) -> RhiResult<AcquireOutcome> {
        match swapchain.acquire_next_image(self.current().sync.image_available_handle()) {
            Ok((image_index, suboptimal)) => {
                if suboptimal {
                    debug!("Swapchain suboptimal at acquire, rendering anyway");
                }
                Ok(AcquireOutcome::Acquired(image_index))
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date at acquire");
                Ok(AcquireOutcome::OutOfDate)
            }
            Err(e) => Err(RhiError::from(e)),
        }
    }

    /// Starts recording into the active slot: resets the command buffer
    /// and opens the render pass on the acquired image.
    ///
    /// The in-flight fence must already be waited on via `wait_for_slot`.
    /// The fence stays signaled until `submit`, so a recording failure
    /// leaves the slot reusable.
    pub fn begin(
        &mut self,
        render_targets: &RenderTargets,
        image_index: u32,
        clear_color: [f32; 4],
    ) -> RhiResult<()> {
        self.cursor.begin(image_index);

        let frame = &self.frames[self.cursor.slot()];
        frame.command_buffer.reset()?;
        frame.command_buffer.begin()?;

        let extent = render_targets.extent();
        frame.command_buffer.begin_render_pass(
            render_targets.render_pass(),
            render_targets.framebuffer(image_index as usize),
            extent,
            clear_color,
        );
        frame.command_buffer.set_viewport(extent);
        frame.command_buffer.set_scissor(extent);

        Ok(())
    }

    /// Closes the render pass and submits the slot's command buffer.
    ///
    /// The submission waits on the image-available semaphore at the color
    /// attachment output stage and signals the render-finished semaphore
    /// plus the in-flight fence.
    pub fn submit(&mut self) -> RhiResult<()> {
        let frame = &self.frames[self.cursor.slot()];

        frame.command_buffer.end_render_pass();
        frame.command_buffer.end()?;

        let wait_semaphores = [frame.sync.image_available_handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [frame.sync.render_finished_handle()];
        let command_buffers = [frame.command_buffer.handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        // Reset only now that work is about to be queued. The submission is
        // the only thing that signals this fence again.
        frame.sync.in_flight_fence().reset()?;

        unsafe {
            self.device
                .submit_graphics(&[submit_info], frame.sync.in_flight_fence_handle())?;
        }

        self.cursor.mark_submitted();
        Ok(())
    }

    /// Queues the acquired image for presentation and completes the frame,
    /// advancing to the next slot.
    pub fn present(&mut self, swapchain: &Swapchain) -> RhiResult<PresentOutcome> {
        let frame = &self.frames[self.cursor.slot()];
        let image_index = self.cursor.image_index();

        let outcome = match swapchain.present(
            self.device.present_queue(),
            image_index,
            frame.sync.render_finished_handle(),
        ) {
            Ok(false) => PresentOutcome::Presented,
            Ok(true) => {
                debug!("Swapchain suboptimal at present");
                PresentOutcome::NeedsRebuild
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date at present");
                PresentOutcome::NeedsRebuild
            }
            Err(e) => {
                warn!("Presentation failed: {:?}", e);
                return Err(RhiError::from(e));
            }
        };

        self.cursor.mark_presented();
        self.cursor.finish();
        Ok(outcome)
    }

    /// Abandons the frame in the active slot without presenting, used when
    /// the swapchain went stale mid-frame or recording failed. The slot is
    /// not advanced.
    pub fn abort_frame(&mut self) {
        self.cursor.abort();
    }

    /// Waits for every in-flight fence. Call before tearing down or
    /// recreating resources the pending frames may still reference.
    pub fn wait_for_all_frames(&self) -> RhiResult<()> {
        for frame in &self.frames {
            frame.sync.in_flight_fence().wait(u64::MAX)?;
        }
        Ok(())
    }

    pub fn command_pool(&self) -> &CommandPool {
        &self.command_pool
    }
}
