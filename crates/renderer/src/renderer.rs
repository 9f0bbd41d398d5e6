//! Top-level renderer facade.
//!
//! Owns the full Vulkan object graph, from instance down to per-frame
//! resources, and exposes a small frame API to the application loop.

use std::mem::ManuallyDrop;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use keel_core::{Error, Extent, RendererConfig, Result};
use keel_platform::{Surface, Window};
use keel_rhi::device::Device;
use keel_rhi::instance::Instance;
use keel_rhi::physical_device::select_physical_device;
use keel_rhi::render_target::RenderTargets;
use keel_rhi::swapchain::Swapchain;
use keel_rhi::RhiError;

use crate::executor::{AcquireOutcome, FrameExecutor, PresentOutcome};

/// Clear color applied to the swapchain image each frame.
const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.15, 1.0];

fn rhi_err(e: RhiError) -> Error {
    Error::Vulkan(e.to_string())
}

/// Owns the graphics device and everything built on top of it.
///
/// Fields are wrapped in `ManuallyDrop` so teardown can run in dependency
/// order: render targets and swapchain before the device, the device
/// before the surface, the surface before the instance. `render_targets`
/// is an `Option` instead, so a failed rebuild leaves the renderer in a
/// recoverable state rather than with a dangling framebuffer set.
pub struct Renderer {
    config: RendererConfig,
    surface_extent: Extent,
    pending_rebuild: bool,
    poisoned: bool,
    shut_down: bool,

    executor: ManuallyDrop<FrameExecutor>,
    render_targets: Option<RenderTargets>,
    swapchain: ManuallyDrop<Swapchain>,
    device: ManuallyDrop<Arc<Device>>,
    surface: ManuallyDrop<Surface>,
    instance: ManuallyDrop<Instance>,
}

impl Renderer {
    /// Brings up the full device stack against the given window.
    ///
    /// Selects a physical device, creates the logical device, swapchain,
    /// render targets and frame executor. Fails if no GPU satisfies the
    /// configured minimum API version with graphics, present and
    /// swapchain support.
    pub fn new(window: &Window, config: RendererConfig) -> Result<Self> {
        let surface_extensions = window.required_extensions()?;
        let instance = Instance::new(&config, &surface_extensions).map_err(rhi_err)?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(rhi_err)?;

        let physical_device_info = select_physical_device(
            instance.handle(),
            surface.handle(),
            surface.loader(),
            config.min_api_version,
        )
        .map_err(rhi_err)?;
        info!(
            gpu = physical_device_info.device_name(),
            kind = physical_device_info.device_type_name(),
            "Selected physical device"
        );

        let device = Device::new(&instance, &physical_device_info).map_err(rhi_err)?;

        let surface_extent = window.drawable_extent();
        let swapchain = Swapchain::new(
            &instance,
            Arc::clone(&device),
            surface.handle(),
            surface_extent,
            config.present_preference,
        )
        .map_err(rhi_err)?;

        let render_targets =
            RenderTargets::new(Arc::clone(&device), &swapchain).map_err(rhi_err)?;

        let executor = FrameExecutor::new(Arc::clone(&device)).map_err(rhi_err)?;

        info!(
            width = surface_extent.width,
            height = surface_extent.height,
            images = swapchain.image_count(),
            "Renderer initialized"
        );

        Ok(Self {
            config,
            surface_extent,
            pending_rebuild: false,
            poisoned: false,
            shut_down: false,
            executor: ManuallyDrop::new(executor),
            render_targets: Some(render_targets),
            swapchain: ManuallyDrop::new(swapchain),
            device: ManuallyDrop::new(device),
            surface: ManuallyDrop::new(surface),
            instance: ManuallyDrop::new(instance),
        })
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    /// Command buffer of the frame being recorded, for issuing draw
    /// commands between `begin_frame` and `end_frame`.
    pub fn command_buffer(&self) -> &keel_rhi::command::CommandBuffer {
        self.executor.command_buffer()
    }

    /// Notes a new surface size. The swapchain is rebuilt lazily at the
    /// start of the next frame rather than per resize event.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.surface_extent = Extent::new(width, height);
        self.pending_rebuild = true;
        debug!(width, height, "Surface resized");
    }

    /// Marks the renderer unusable after a hard frame error. The slot's
    /// fence may never signal again, so later frames are refused up front
    /// instead of blocking on it.
    fn poison(&mut self, err: RhiError) -> Error {
        error!("Frame failed, refusing further frames: {}", err);
        self.poisoned = true;
        self.executor.abort_frame();
        rhi_err(err)
    }

    /// Starts a frame: waits for the slot's previous work, acquires a
    /// swapchain image and opens the render pass.
    ///
    /// Returns `false` when no frame can be produced right now, either
    /// because the surface has zero area (minimized) or because the
    /// swapchain had to be rebuilt and the frame was skipped. A hard
    /// error poisons the renderer; every later call returns the same
    /// refusal instead of waiting on sync objects that will never signal.
    pub fn begin_frame(&mut self) -> Result<bool> {
        if self.shut_down {
            return Ok(false);
        }
        if self.poisoned {
            return Err(Error::Internal(
                "renderer disabled after an earlier frame error".into(),
            ));
        }
        if self.surface_extent.is_zero() {
            return Ok(false);
        }

        if self.pending_rebuild || self.render_targets.is_none() {
            self.rebuild_swapchain()?;
        }

        if let Err(e) = self.executor.wait_for_slot() {
            return Err(self.poison(e));
        }

        let outcome = match self.executor.acquire(&self.swapchain) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.poison(e)),
        };

        match outcome {
            AcquireOutcome::Acquired(image_index) => {
                let render_targets = self
                    .render_targets
                    .as_ref()
                    .ok_or_else(|| Error::Internal("render targets missing".into()))?;
                if let Err(e) = self.executor.begin(render_targets, image_index, CLEAR_COLOR) {
                    return Err(self.poison(e));
                }
                Ok(true)
            }
            AcquireOutcome::OutOfDate => {
                self.rebuild_swapchain()?;
                Ok(false)
            }
        }
    }

    /// Finishes the frame started by `begin_frame`: submits the command
    /// buffer and presents the image. A stale swapchain reported at
    /// present is noted and rebuilt before the next frame.
    pub fn end_frame(&mut self) -> Result<()> {
        if let Err(e) = self.executor.submit() {
            return Err(self.poison(e));
        }

        match self.executor.present(&self.swapchain) {
            Ok(PresentOutcome::Presented) => {}
            Ok(PresentOutcome::NeedsRebuild) => self.pending_rebuild = true,
            Err(e) => return Err(self.poison(e)),
        }
        Ok(())
    }

    /// Runs one complete frame. A skipped frame (minimized window or
    /// swapchain rebuild) is not an error.
    pub fn render_frame(&mut self) -> Result<()> {
        if self.begin_frame()? {
            self.end_frame()?;
        }
        Ok(())
    }

    /// Recreates the swapchain and render targets for the current surface
    /// size. Any frame in flight is drained first.
    fn rebuild_swapchain(&mut self) -> Result<()> {
        self.executor.wait_for_all_frames().map_err(rhi_err)?;
        if self.executor.cursor().is_recording() {
            self.executor.abort_frame();
        }

        // Framebuffers reference the old image views, so they go first.
        self.render_targets = None;

        self.swapchain
            .recreate(
                &self.instance,
                self.surface.handle(),
                self.surface_extent,
                self.config.present_preference,
            )
            .map_err(rhi_err)?;

        self.render_targets = Some(
            RenderTargets::new(Arc::clone(&self.device), &self.swapchain).map_err(rhi_err)?,
        );
        self.pending_rebuild = false;

        info!(
            width = self.swapchain.extent().width,
            height = self.swapchain.extent().height,
            "Swapchain rebuilt"
        );
        Ok(())
    }

    /// Tears everything down in dependency order. Safe to call more than
    /// once; `Drop` calls this if the application did not.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        if let Err(e) = self.device.wait_idle() {
            error!("Device wait failed during shutdown: {}", e);
        }

        self.render_targets = None;
        unsafe {
            ManuallyDrop::drop(&mut self.swapchain);
            ManuallyDrop::drop(&mut self.executor);
            let device = ManuallyDrop::take(&mut self.device);
            if Arc::strong_count(&device) > 1 {
                warn!("Device still shared at shutdown");
            }
            drop(device);
            ManuallyDrop::drop(&mut self.surface);
            ManuallyDrop::drop(&mut self.instance);
        }

        info!("Renderer shut down");
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
