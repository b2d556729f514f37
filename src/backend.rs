//! The backend ABI (§1 "the object model is the ABI; backends implement it").
//!
//! A [`Backend`] is the seam between this crate and a concrete GPU driver
//! (OpenGL in the reference source). It creates the boxed trait objects
//! behind every [`crate::handle::Handle`] and executes validated commands;
//! [`crate::queue::CommandQueue`] is the only caller.

use crate::buffer::{IndexBufferDesc, StorageBufferDesc, UniformBufferDesc, VertexBufferDesc};
use crate::command::Command;
use crate::descriptor::MemoryDesc;
use crate::device::DeviceInfo;
use crate::error::Result;
use crate::pipeline::{ComputePipelineDesc, RaytracePipelineDesc, RenderPipelineDesc};
use crate::render_pass::RenderPassDesc;
use crate::render_target::RenderTargetDesc;
use crate::shader::Decompiler;
use crate::texture::{TextureArrayBufferDesc, TextureBufferDesc};
use crate::traits::{
    ComputePipelineObject, FenceObject, IndexBufferObject, RaytracePipelineObject,
    RenderPassObject, RenderPipelineObject, RenderTargetObject, SemaphoreObject,
    StorageBufferObject, TextureArrayBufferObject, TextureBufferObject, UniformBufferObject,
    VertexArrayObjectObject, VertexBufferObject, VideoMemoryObject,
};
use crate::vao::{VertexArrayObjectBuffers, VertexArrayObjectDesc};
use std::fmt::Debug;

/// Implemented once per concrete GPU driver. Every `create_*` method mirrors
/// one of [`crate::device::Device`]'s factory methods (§4.G); `execute`
/// carries out one command that the queue has already validated against the
/// invariants in §3, and `submit` flushes accumulated work and returns a
/// completion fence.
pub trait Backend: Debug {
    fn device_info(&self) -> DeviceInfo;

    fn create_vertex_buffer(&self, desc: &VertexBufferDesc) -> Result<Box<dyn VertexBufferObject>>;
    fn create_index_buffer(&self, desc: &IndexBufferDesc) -> Result<Box<dyn IndexBufferObject>>;
    fn create_uniform_buffer(
        &self,
        desc: &UniformBufferDesc,
    ) -> Result<Box<dyn UniformBufferObject>>;
    fn create_storage_buffer(
        &self,
        desc: &StorageBufferDesc,
    ) -> Result<Box<dyn StorageBufferObject>>;
    fn create_texture_buffer(
        &self,
        desc: &TextureBufferDesc,
    ) -> Result<Box<dyn TextureBufferObject>>;
    fn create_texture_array_buffer(
        &self,
        desc: &TextureArrayBufferDesc,
    ) -> Result<Box<dyn TextureArrayBufferObject>>;
    fn create_vertex_array_object(
        &self,
        desc: &VertexArrayObjectDesc,
        buffers: &VertexArrayObjectBuffers<'_>,
    ) -> Result<Box<dyn VertexArrayObjectObject>>;
    fn create_render_target(&self, desc: &RenderTargetDesc) -> Result<Box<dyn RenderTargetObject>>;
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Box<dyn RenderPassObject>>;
    fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDesc,
        decompiler: &dyn Decompiler,
    ) -> Result<Box<dyn RenderPipelineObject>>;
    fn create_compute_pipeline(
        &self,
        desc: &ComputePipelineDesc,
        decompiler: &dyn Decompiler,
    ) -> Result<Box<dyn ComputePipelineObject>>;
    fn create_raytrace_pipeline(
        &self,
        desc: &RaytracePipelineDesc,
    ) -> Result<Box<dyn RaytracePipelineObject>>;
    fn create_memory(&self, desc: &MemoryDesc) -> Result<Box<dyn VideoMemoryObject>>;
    fn create_semaphore(&self) -> Box<dyn SemaphoreObject>;

    /// Executes one already-validated command.
    fn execute(&self, command: &Command) -> Result<()>;

    /// Flushes the commands executed since the last `submit` and returns a
    /// fence that completes once that work finishes (§4.F "Submit").
    fn submit(
        &self,
        wait_semaphores: &[&dyn SemaphoreObject],
        signal_semaphores: &[&dyn SemaphoreObject],
    ) -> Result<Box<dyn FenceObject>>;
}

#[cfg(any(test, feature = "mock-backend"))]
pub mod mock;
