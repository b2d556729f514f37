//! Device: factory for every resource kind, owner of queues and per-frame
//! statistics (§4.G).

use crate::backend::Backend;
use crate::buffer::{IndexBufferDesc, StorageBufferDesc, UniformBufferDesc, VertexBufferDesc};
use crate::descriptor::MemoryDesc;
use crate::error::{CapacityKind, Error, Result};
use crate::handle::{Handle, Kind};
use crate::pipeline::{ComputePipelineDesc, RaytracePipelineDesc, RenderPipelineDesc};
use crate::queue::CommandQueue;
use crate::render_pass::RenderPassDesc;
use crate::render_target::RenderTargetDesc;
use crate::shader::Decompiler;
use crate::sync::Semaphore;
use crate::texture::{TextureArrayBufferDesc, TextureBufferDesc};
use crate::traits::{
    ComputePipelineObject, IndexBufferObject, RaytracePipelineObject, RenderPassObject,
    RenderPipelineObject, RenderTargetObject, StorageBufferObject, TextureArrayBufferObject,
    TextureBufferObject, UniformBufferObject, VertexArrayObjectObject, VertexBufferObject,
    VideoMemoryObject,
};
use crate::vao::{VertexArrayObjectBuffers, VertexArrayObjectDesc};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Severity of a [`DebugMessage`] reported through a device's debug callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum DebugSeverity {
    Info,
    Warning,
    Error,
}

/// One diagnostic reported through [`Device::set_debug_callback`]: a
/// severity plus human-readable text. Mirrors the payload the source's
/// OpenGL debug extension hands to its global callback.
#[derive(Clone, Debug)]
pub struct DebugMessage {
    pub severity: DebugSeverity,
    pub text: String,
}

/// A device-scoped sink for [`DebugMessage`]s (§9 "Global mutable state":
/// the source keeps a file-level callback for its OpenGL debug messages;
/// this crate moves that slot onto `Device` so multiple devices can coexist
/// without sharing process-global state).
pub type DebugCallback = Box<dyn Fn(DebugMessage) + Send + Sync>;

fn default_debug_callback(message: DebugMessage) {
    match message.severity {
        DebugSeverity::Info => log::debug!("{}", message.text),
        DebugSeverity::Warning => log::warn!("{}", message.text),
        DebugSeverity::Error => log::error!("{}", message.text),
    }
}

/// Device limits and capabilities, threaded into the frame-graph builder
/// (§B.5 of the supplemented features) and consulted by the capacity checks
/// on uniform/storage buffer creation (invariant 3).
#[derive(Copy, Clone, Debug)]
pub struct DeviceInfo {
    pub uniform_buffer_max: u64,
    pub storage_buffer_max: u64,
    pub max_texture_array_size: u32,
    pub max_anisotropy: f32,
}

/// Per-frame statistics accumulated by command queues and reset by
/// [`Device::frame_stats`] (§4.F, §4.G).
#[derive(Copy, Clone, Debug, Default)]
pub struct FrameStats {
    pub draw_calls: u64,
    pub polys: u64,
    pub bytes_uploaded: u64,
    pub bytes_downloaded: u64,
}

/// Factory for every GPU resource kind. Owns the render/compute/transfer
/// queue lists and the accumulated frame statistics; the reference backend
/// places its one queue in both the render and compute lists and has no
/// transfer queues (§4.G).
pub struct Device {
    backend: Rc<dyn Backend>,
    info: DeviceInfo,
    stats: Rc<RefCell<FrameStats>>,
    render_queues: Vec<Rc<RefCell<CommandQueue>>>,
    compute_queues: Vec<Rc<RefCell<CommandQueue>>>,
    transfer_queues: Vec<Rc<RefCell<CommandQueue>>>,
    debug_callback: RefCell<DebugCallback>,
}

impl fmt::Debug for Device {
    // `debug_callback` is a `Box<dyn Fn(..)>`, which isn't `Debug`, so the
    // struct can't just derive it; every other field delegates normally.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("backend", &self.backend)
            .field("info", &self.info)
            .field("stats", &self.stats)
            .field("render_queues", &self.render_queues)
            .field("compute_queues", &self.compute_queues)
            .field("transfer_queues", &self.transfer_queues)
            .field("debug_callback", &"DebugCallback(..)")
            .finish()
    }
}

impl Device {
    pub fn new(backend: Rc<dyn Backend>) -> Device {
        let info = backend.device_info();
        let stats = Rc::new(RefCell::new(FrameStats::default()));
        let queue = Rc::new(RefCell::new(CommandQueue::new(
            backend.clone(),
            stats.clone(),
        )));
        log::debug!("device created: {:?}", info);
        Device {
            backend,
            info,
            stats,
            render_queues: vec![queue.clone()],
            compute_queues: vec![queue],
            transfer_queues: Vec::new(),
            debug_callback: RefCell::new(Box::new(default_debug_callback)),
        }
    }

    pub fn info(&self) -> DeviceInfo {
        self.info
    }

    /// Installs `callback` as this device's debug message sink, replacing
    /// whichever callback (default or previously installed) was in place.
    /// Per-device, so multiple devices never share process-global state
    /// (§9 "Global mutable state").
    pub fn set_debug_callback(&self, callback: DebugCallback) {
        *self.debug_callback.borrow_mut() = callback;
    }

    /// Reports `message` to the currently installed debug callback. Used
    /// internally alongside `log::` at the same call sites, and available
    /// to a real backend that needs to forward driver diagnostics through
    /// the device rather than a global.
    pub fn emit_debug(&self, severity: DebugSeverity, text: impl Into<String>) {
        (self.debug_callback.borrow())(DebugMessage {
            severity,
            text: text.into(),
        });
    }

    pub fn render_queues(&self) -> &[Rc<RefCell<CommandQueue>>] {
        &self.render_queues
    }

    pub fn compute_queues(&self) -> &[Rc<RefCell<CommandQueue>>] {
        &self.compute_queues
    }

    pub fn transfer_queues(&self) -> &[Rc<RefCell<CommandQueue>>] {
        &self.transfer_queues
    }

    /// Returns the statistics accumulated since the last call, and resets
    /// them atomically.
    pub fn frame_stats(&self) -> FrameStats {
        self.stats.replace(FrameStats::default())
    }

    /// Accounts for bytes copied into a resource outside of a queue submit
    /// (frame-graph `upload`, §4.H), so `frame_stats` reflects them too.
    pub(crate) fn record_upload_bytes(&self, bytes: u64) {
        self.stats.borrow_mut().bytes_uploaded += bytes;
    }

    pub fn create_command_buffer(&self) -> crate::command_buffer::CommandBuffer<'_> {
        crate::command_buffer::CommandBuffer::new()
    }

    pub fn create_semaphore(&self) -> Semaphore {
        Semaphore(Handle::new(Kind::Semaphore, self.backend.create_semaphore()))
    }

    pub fn create_vertex_buffer(
        &self,
        desc: VertexBufferDesc,
    ) -> Result<Handle<dyn VertexBufferObject>> {
        log::debug!("creating vertex buffer: {:?}", desc);
        let obj = self.backend.create_vertex_buffer(&desc)?;
        Ok(Handle::new(Kind::VertexBuffer, obj))
    }

    pub fn create_index_buffer(
        &self,
        desc: IndexBufferDesc,
    ) -> Result<Handle<dyn IndexBufferObject>> {
        log::debug!("creating index buffer: {:?}", desc);
        let obj = self.backend.create_index_buffer(&desc)?;
        Ok(Handle::new(Kind::IndexBuffer, obj))
    }

    /// Fails with [`Error::Capacity`] if `desc.size` exceeds
    /// [`DeviceInfo::uniform_buffer_max`] (invariant 3).
    pub fn create_shader_uniform_buffer(
        &self,
        desc: UniformBufferDesc,
    ) -> Result<Handle<dyn UniformBufferObject>> {
        if desc.size > self.info.uniform_buffer_max {
            let text = format!(
                "uniform buffer of size {} exceeds device max {}",
                desc.size, self.info.uniform_buffer_max
            );
            log::error!("{}", text);
            self.emit_debug(DebugSeverity::Error, text);
            return Err(Error::Capacity {
                kind: CapacityKind::ShaderUniformBuffer,
                requested: desc.size,
                limit: self.info.uniform_buffer_max,
            });
        }
        log::debug!("creating uniform buffer: {:?}", desc);
        let obj = self.backend.create_uniform_buffer(&desc)?;
        Ok(Handle::new(Kind::UniformBuffer, obj))
    }

    /// Fails with [`Error::Capacity`] if `desc.size` exceeds
    /// [`DeviceInfo::storage_buffer_max`] (invariant 3).
    pub fn create_shader_storage_buffer(
        &self,
        desc: StorageBufferDesc,
    ) -> Result<Handle<dyn StorageBufferObject>> {
        if desc.size > self.info.storage_buffer_max {
            let text = format!(
                "storage buffer of size {} exceeds device max {}",
                desc.size, self.info.storage_buffer_max
            );
            log::error!("{}", text);
            self.emit_debug(DebugSeverity::Error, text);
            return Err(Error::Capacity {
                kind: CapacityKind::ShaderStorageBuffer,
                requested: desc.size,
                limit: self.info.storage_buffer_max,
            });
        }
        log::debug!("creating storage buffer: {:?}", desc);
        let obj = self.backend.create_storage_buffer(&desc)?;
        Ok(Handle::new(Kind::StorageBuffer, obj))
    }

    /// Creates a texture buffer. If `desc.mip_map_levels` cannot be backed
    /// at the requested size, retries once with a single mip level before
    /// propagating the backend's error (§7 "the single documented mipmap-level retry").
    pub fn create_texture_buffer(
        &self,
        desc: TextureBufferDesc,
    ) -> Result<Handle<dyn TextureBufferObject>> {
        log::debug!("creating texture buffer: {:?}", desc);
        match self.backend.create_texture_buffer(&desc) {
            Ok(obj) => Ok(Handle::new(Kind::TextureBuffer, obj)),
            Err(e) if desc.mip_map_levels > 1 => {
                let text = format!(
                    "texture creation failed with {} mip levels ({}), retrying with 1",
                    desc.mip_map_levels, e
                );
                log::warn!("{}", text);
                self.emit_debug(DebugSeverity::Warning, text);
                let retry = TextureBufferDesc {
                    mip_map_levels: 1,
                    ..desc
                };
                let obj = self.backend.create_texture_buffer(&retry)?;
                Ok(Handle::new(Kind::TextureBuffer, obj))
            }
            Err(e) => Err(e),
        }
    }

    pub fn create_texture_array_buffer(
        &self,
        desc: TextureArrayBufferDesc,
    ) -> Result<Handle<dyn TextureArrayBufferObject>> {
        log::debug!("creating texture array buffer: {:?}", desc);
        let obj = self.backend.create_texture_array_buffer(&desc)?;
        Ok(Handle::new(Kind::TextureArrayBuffer, obj))
    }

    pub fn create_vertex_array_object(
        &self,
        desc: VertexArrayObjectDesc,
        buffers: VertexArrayObjectBuffers<'_>,
    ) -> Result<Handle<dyn VertexArrayObjectObject>> {
        log::debug!("creating vertex array object");
        let obj = self.backend.create_vertex_array_object(&desc, &buffers)?;
        Ok(Handle::new(Kind::VertexArrayObject, obj))
    }

    pub fn create_render_target(
        &self,
        desc: RenderTargetDesc,
    ) -> Result<Handle<dyn RenderTargetObject>> {
        log::debug!("creating render target: {:?}", desc);
        let obj = self.backend.create_render_target(&desc)?;
        Ok(Handle::new(Kind::RenderTarget, obj))
    }

    pub fn create_render_pass(&self, desc: RenderPassDesc) -> Result<Handle<dyn RenderPassObject>> {
        log::debug!("creating render pass: {:?}", desc);
        let obj = self.backend.create_render_pass(&desc)?;
        Ok(Handle::new(Kind::RenderPass, obj))
    }

    pub fn create_render_pipeline(
        &self,
        desc: RenderPipelineDesc,
        decompiler: &dyn Decompiler,
    ) -> Result<Handle<dyn RenderPipelineObject>> {
        log::debug!("creating render pipeline");
        match self.backend.create_render_pipeline(&desc, decompiler) {
            Ok(obj) => Ok(Handle::new(Kind::RenderPipeline, obj)),
            Err(e) => {
                let text = format!("render pipeline compile/link failed: {}", e);
                log::error!("{}", text);
                self.emit_debug(DebugSeverity::Error, text);
                Err(e)
            }
        }
    }

    pub fn create_compute_pipeline(
        &self,
        desc: ComputePipelineDesc,
        decompiler: &dyn Decompiler,
    ) -> Result<Handle<dyn ComputePipelineObject>> {
        log::debug!("creating compute pipeline");
        match self.backend.create_compute_pipeline(&desc, decompiler) {
            Ok(obj) => Ok(Handle::new(Kind::ComputePipeline, obj)),
            Err(e) => {
                let text = format!("compute pipeline compile/link failed: {}", e);
                log::error!("{}", text);
                self.emit_debug(DebugSeverity::Error, text);
                Err(e)
            }
        }
    }

    /// Interface only: raytracing pipeline behaviour is an explicit non-goal
    /// (§1); the backend is free to return `Err` unconditionally.
    pub fn create_raytrace_pipeline(
        &self,
        desc: RaytracePipelineDesc,
    ) -> Result<Handle<dyn RaytracePipelineObject>> {
        let obj = self.backend.create_raytrace_pipeline(&desc)?;
        Ok(Handle::new(Kind::RaytracePipeline, obj))
    }

    pub fn create_memory(&self, desc: MemoryDesc) -> Result<Handle<dyn VideoMemoryObject>> {
        log::debug!("creating video memory allocation: {:?}", desc);
        let obj = self.backend.create_memory(&desc)?;
        Ok(Handle::new(Kind::VideoMemory, obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::buffer::UniformBufferDesc;
    use crate::descriptor::BufferType;
    use std::sync::{Arc, Mutex};

    #[test]
    fn installed_debug_callback_replaces_the_default_one() {
        let device = Device::new(Rc::new(MockBackend::new()));
        let seen: Arc<Mutex<Vec<DebugMessage>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        device.set_debug_callback(Box::new(move |message| sink.lock().unwrap().push(message)));

        let info = device.info();
        let err = device
            .create_shader_uniform_buffer(UniformBufferDesc {
                size: info.uniform_buffer_max + 1,
                buffer_type: BufferType::HostVisible,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Capacity { .. }));

        let messages = seen.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, DebugSeverity::Error);
    }
}
