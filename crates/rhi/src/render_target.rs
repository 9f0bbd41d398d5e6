//! Render pass and framebuffers for the swapchain images.
//!
//! # Overview
//!
//! The [`RenderTargets`] struct owns a single-subpass render pass with one
//! color attachment matching the swapchain format, plus one framebuffer per
//! swapchain image view. It is rebuilt from scratch whenever the swapchain
//! is recreated; the old set must be destroyed before the swapchain's image
//! views go away.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use crate::device::Device;
use crate::error::RhiError;
use crate::swapchain::Swapchain;

/// Render pass and per-image framebuffers derived from a swapchain.
///
/// The color attachment is cleared on load, stored on completion, and
/// transitioned from UNDEFINED to PRESENT_SRC_KHR across the pass, so no
/// explicit layout transitions are needed in the frame loop.
pub struct RenderTargets {
    device: Arc<Device>,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    extent: vk::Extent2D,
}

impl RenderTargets {
    /// Creates the render pass and one framebuffer per swapchain image.
    ///
    /// # Errors
    ///
    /// Returns an error if render pass or framebuffer creation fails.
    pub fn new(device: Arc<Device>, swapchain: &Swapchain) -> Result<Self, RhiError> {
        let render_pass = create_render_pass(&device, swapchain.format())?;

        let extent = swapchain.extent();
        let framebuffers = match create_framebuffers(&device, render_pass, swapchain) {
            Ok(framebuffers) => framebuffers,
            Err(e) => {
                unsafe { device.handle().destroy_render_pass(render_pass, None) };
                return Err(e);
            }
        };

        info!(
            "Render targets created: {} framebuffers at {}x{}",
            framebuffers.len(),
            extent.width,
            extent.height
        );

        Ok(Self {
            device,
            render_pass,
            framebuffers,
            extent,
        })
    }

    /// Returns the render pass handle.
    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// Returns the framebuffer for the given swapchain image index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn framebuffer(&self, index: usize) -> vk::Framebuffer {
        self.framebuffers[index]
    }

    /// Returns the number of framebuffers (one per swapchain image).
    #[inline]
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Returns the extent the framebuffers were created with.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for RenderTargets {
    fn drop(&mut self) {
        unsafe {
            // Framebuffers reference the render pass, destroy them first
            for &framebuffer in &self.framebuffers {
                self.device.handle().destroy_framebuffer(framebuffer, None);
            }
            self.device
                .handle()
                .destroy_render_pass(self.render_pass, None);
        }
        debug!(
            "Render targets destroyed ({} framebuffers)",
            self.framebuffers.len()
        );
    }
}

/// Creates a single-subpass render pass with one color attachment.
fn create_render_pass(device: &Device, format: vk::Format) -> Result<vk::RenderPass, RhiError> {
    let color_attachment = vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

    let color_attachment_ref = vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    let color_refs = [color_attachment_ref];
    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs);

    // Wait for the image-available semaphore before writing color output
    let dependency = vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

    let attachments = [color_attachment];
    let subpasses = [subpass];
    let dependencies = [dependency];

    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    let render_pass = unsafe { device.handle().create_render_pass(&create_info, None)? };
    debug!("Render pass created for format {:?}", format);

    Ok(render_pass)
}

/// Creates one framebuffer per swapchain image view.
fn create_framebuffers(
    device: &Device,
    render_pass: vk::RenderPass,
    swapchain: &Swapchain,
) -> Result<Vec<vk::Framebuffer>, RhiError> {
    let extent = swapchain.extent();
    let mut framebuffers = Vec::with_capacity(swapchain.image_views().len());

    for &image_view in swapchain.image_views() {
        let attachments = [image_view];

        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = match unsafe { device.handle().create_framebuffer(&create_info, None) } {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                // Clean up the framebuffers created so far
                for &framebuffer in &framebuffers {
                    unsafe { device.handle().destroy_framebuffer(framebuffer, None) };
                }
                return Err(e.into());
            }
        };

        framebuffers.push(framebuffer);
    }

    Ok(framebuffers)
}
