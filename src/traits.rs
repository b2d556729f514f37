//! Backend object traits: one per resource kind (§4.B, §9 "Polymorphism").
//!
//! The C++ source this crate generalises from uses deep virtual inheritance
//! (`RenderObject -> TextureBuffer -> OGLTextureBuffer`) with `dynamic_cast`
//! at use-sites. A trait per resource kind plus [`downcast_rs`]'s
//! `Downcast` gives the same shape without a base class: backends implement
//! the trait matching a resource's [`crate::handle::Kind`], and code that
//! needs the concrete backend type downcasts through `Downcast`, trusting
//! (as the teacher crate's own `traits.rs` already does) that a handle's
//! tag and its backend object always agree, since only `Device` factory
//! methods construct one from the other.
//!
//! `CommandBuffer` and `CommandQueue` have no backend object trait here:
//! both are implemented directly as concrete, backend-agnostic types
//! ([`crate::command_buffer::CommandBuffer`], [`crate::queue::CommandQueue`])
//! that drive a [`crate::backend::Backend`] rather than being backend
//! objects themselves.

use crate::buffer::{IndexBufferDesc, StorageBufferDesc, UniformBufferDesc, VertexBufferDesc};
use crate::descriptor::MemoryDesc;
use crate::error::Result;
use crate::pipeline::{ComputePipelineDesc, RaytracePipelineDesc, RenderPipelineDesc};
use crate::render_pass::RenderPassDesc;
use crate::render_target::RenderTargetDesc;
use crate::texture::{TextureArrayBufferDesc, TextureBufferDesc};
use crate::vao::VertexArrayObjectDesc;
use downcast_rs::impl_downcast;
pub use downcast_rs::Downcast;
use std::fmt::Debug;

pub trait VertexBufferObject: Downcast + Debug {
    fn description(&self) -> &VertexBufferDesc;
    /// Copies `data` into the buffer starting at `offset` bytes (frame-graph
    /// `upload`, GLOSSARY "Upload").
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}

pub trait IndexBufferObject: Downcast + Debug {
    fn description(&self) -> &IndexBufferDesc;
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}

pub trait UniformBufferObject: Downcast + Debug {
    fn description(&self) -> &UniformBufferDesc;
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}

pub trait StorageBufferObject: Downcast + Debug {
    fn description(&self) -> &StorageBufferDesc;
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}

pub trait TextureBufferObject: Downcast + Debug {
    fn description(&self) -> &TextureBufferDesc;
    /// Uploads raw texel data starting at linear byte `offset` (§4.H "upload").
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}

pub trait TextureArrayBufferObject: Downcast + Debug {
    fn description(&self) -> &TextureArrayBufferDesc;
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}

pub trait VertexArrayObjectObject: Downcast + Debug {
    fn description(&self) -> &VertexArrayObjectDesc;
    /// Byte size of the bound vertex buffer, a kind-specific accessor in
    /// the spirit of the `vertexBuffer()` accessor §4.B calls out by name.
    fn vertex_buffer_size(&self) -> u64;
    fn index_buffer_size(&self) -> Option<u64>;
    fn instance_buffer_size(&self) -> Option<u64>;
}

pub trait RenderTargetObject: Downcast + Debug {
    fn description(&self) -> &RenderTargetDesc;
}

pub trait RenderPassObject: Downcast + Debug {
    fn description(&self) -> &RenderPassDesc;
}

pub trait RenderPipelineObject: Downcast + Debug {
    fn description(&self) -> &RenderPipelineDesc;
}

pub trait ComputePipelineObject: Downcast + Debug {
    fn description(&self) -> &ComputePipelineDesc;
}

/// Interface only: raytracing pipeline behaviour is an explicit non-goal
/// (§1). A backend may implement this trait to let the resource kind exist
/// without supporting any real raytrace execution.
pub trait RaytracePipelineObject: Downcast + Debug {
    fn description(&self) -> &RaytracePipelineDesc;
}

/// A CPU-awaitable completion token returned by [`crate::queue::CommandQueue::submit`].
///
/// The source's `OGLFence` is a no-op (`wait` returns immediately,
/// `is_complete` always true); per the spec's resolution of that open
/// question this trait requires a real, backend-backed implementation.
pub trait FenceObject: Downcast + Debug {
    /// Blocks the calling thread until the fence's submission completes.
    fn wait(&self) -> Result<()>;
    /// Non-blocking poll, equivalent to `wait` returning immediately once true.
    fn is_complete(&self) -> bool;
    /// The error the submission failed with, if any, once complete.
    fn get_exception(&self) -> Option<crate::error::Error>;
}

/// An ordering token coupling the completion of one submission with the
/// start of another (GLOSSARY "Semaphore").
pub trait SemaphoreObject: Downcast + Debug {}

pub trait VideoMemoryObject: Downcast + Debug {
    fn description(&self) -> &MemoryDesc;
}

impl_downcast!(VertexBufferObject);
impl_downcast!(IndexBufferObject);
impl_downcast!(UniformBufferObject);
impl_downcast!(StorageBufferObject);
impl_downcast!(TextureBufferObject);
impl_downcast!(TextureArrayBufferObject);
impl_downcast!(VertexArrayObjectObject);
impl_downcast!(RenderTargetObject);
impl_downcast!(RenderPassObject);
impl_downcast!(RenderPipelineObject);
impl_downcast!(ComputePipelineObject);
impl_downcast!(RaytracePipelineObject);
impl_downcast!(FenceObject);
impl_downcast!(SemaphoreObject);
impl_downcast!(VideoMemoryObject);
