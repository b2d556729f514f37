//! In-memory test backend (§A.4 of the supplemented features).
//!
//! Backs every resource kind with a plain `Vec<u8>` and never touches a real
//! GPU, so the object model, command queue and frame graph can be exercised
//! in a unit test without a driver. `execute` is a no-op: every invariant it
//! would need to check has already been validated by
//! [`crate::queue::CommandQueue`] by the time a command reaches the backend,
//! and this backend does no actual rasterisation.
//!
//! Gated the same way the teacher crate gates its own test doubles: on by
//! default under `#[cfg(test)]`, and behind the `mock-backend` feature for
//! downstream crates that want to drive a [`crate::device::Device`] without
//! a real GPU.

use crate::buffer::{IndexBufferDesc, StorageBufferDesc, UniformBufferDesc, VertexBufferDesc};
use crate::command::Command;
use crate::descriptor::MemoryDesc;
use crate::device::DeviceInfo;
use crate::error::{CapacityKind, Error, Result};
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
use std::cell::RefCell;

fn bounds_check(what: &'static str, offset: u64, data_len: usize, capacity: u64) -> Result<()> {
    if offset + data_len as u64 > capacity {
        return Err(Error::InvalidRange {
            what,
            offset: offset as i64,
            count: data_len as i64,
            bound: capacity,
        });
    }
    Ok(())
}

/// Highest mip level count a texture of `size` can support, `1x1` always
/// supporting exactly one. Used to make the single documented mip-level
/// retry (§7) reachable from a test without a real driver.
fn max_mip_levels(size: crate::descriptor::Extent2) -> u32 {
    32 - size.width.max(size.height).max(1).leading_zeros()
}

macro_rules! mock_buffer {
    ($name:ident, $desc:ty, $trait:ty) => {
        #[derive(Debug)]
        struct $name {
            desc: $desc,
            data: RefCell<Vec<u8>>,
        }

        impl $name {
            fn new(desc: $desc) -> $name {
                let data = RefCell::new(vec![0u8; desc.size as usize]);
                $name { desc, data }
            }
        }

        impl $trait for $name {
            fn description(&self) -> &$desc {
                &self.desc
            }

            fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
                bounds_check("buffer write", offset, data.len(), self.desc.size)?;
                let mut buf = self.data.borrow_mut();
                buf[offset as usize..offset as usize + data.len()].copy_from_slice(data);
                Ok(())
            }
        }
    };
}

mock_buffer!(MockVertexBuffer, VertexBufferDesc, VertexBufferObject);
mock_buffer!(MockIndexBuffer, IndexBufferDesc, IndexBufferObject);
mock_buffer!(MockUniformBuffer, UniformBufferDesc, UniformBufferObject);
mock_buffer!(MockStorageBuffer, StorageBufferDesc, StorageBufferObject);

/// Bytes backing a texture, approximated as four bytes per texel regardless
/// of `desc.format` — plenty for a backend whose only job is to bounds-check
/// `write` calls in tests.
fn texture_byte_size(desc: &TextureBufferDesc) -> u64 {
    4 * desc.size.width as u64 * desc.size.height as u64
}

#[derive(Debug)]
struct MockTextureBuffer {
    desc: TextureBufferDesc,
    data: RefCell<Vec<u8>>,
}

impl TextureBufferObject for MockTextureBuffer {
    fn description(&self) -> &TextureBufferDesc {
        &self.desc
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        bounds_check("texture write", offset, data.len(), texture_byte_size(&self.desc))?;
        let mut buf = self.data.borrow_mut();
        buf[offset as usize..offset as usize + data.len()].copy_from_slice(data);
        Ok(())
    }
}

#[derive(Debug)]
struct MockTextureArrayBuffer {
    desc: TextureArrayBufferDesc,
    data: RefCell<Vec<u8>>,
}

impl TextureArrayBufferObject for MockTextureArrayBuffer {
    fn description(&self) -> &TextureArrayBufferDesc {
        &self.desc
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let capacity = texture_byte_size(&self.desc.texture) * self.desc.texture_count as u64;
        bounds_check("texture array write", offset, data.len(), capacity)?;
        let mut buf = self.data.borrow_mut();
        buf[offset as usize..offset as usize + data.len()].copy_from_slice(data);
        Ok(())
    }
}

#[derive(Debug)]
struct MockVertexArrayObject {
    desc: VertexArrayObjectDesc,
    vertex_buffer_size: u64,
    index_buffer_size: Option<u64>,
    instance_buffer_size: Option<u64>,
}

impl VertexArrayObjectObject for MockVertexArrayObject {
    fn description(&self) -> &VertexArrayObjectDesc {
        &self.desc
    }

    fn vertex_buffer_size(&self) -> u64 {
        self.vertex_buffer_size
    }

    fn index_buffer_size(&self) -> Option<u64> {
        self.index_buffer_size
    }

    fn instance_buffer_size(&self) -> Option<u64> {
        self.instance_buffer_size
    }
}

macro_rules! mock_desc_only {
    ($name:ident, $desc:ty, $trait:ty) => {
        #[derive(Debug)]
        struct $name {
            desc: $desc,
        }

        impl $trait for $name {
            fn description(&self) -> &$desc {
                &self.desc
            }
        }
    };
}

mock_desc_only!(MockRenderTarget, RenderTargetDesc, RenderTargetObject);
mock_desc_only!(MockRenderPass, RenderPassDesc, RenderPassObject);
mock_desc_only!(MockRenderPipeline, RenderPipelineDesc, RenderPipelineObject);
mock_desc_only!(MockComputePipeline, ComputePipelineDesc, ComputePipelineObject);
mock_desc_only!(MockVideoMemory, MemoryDesc, VideoMemoryObject);

#[derive(Debug, Default)]
struct MockSemaphore;
impl SemaphoreObject for MockSemaphore {}

/// Completes immediately: the mock backend executes every command
/// synchronously in [`MockBackend::execute`], so by the time a fence is
/// handed back there is no outstanding work left to wait for.
#[derive(Debug, Default)]
struct MockFence;

impl FenceObject for MockFence {
    fn wait(&self) -> Result<()> {
        Ok(())
    }

    fn is_complete(&self) -> bool {
        true
    }

    fn get_exception(&self) -> Option<Error> {
        None
    }
}

/// An in-memory [`crate::backend::Backend`] for tests and tooling that want
/// a working `Device` without a GPU driver.
#[derive(Debug)]
pub struct MockBackend {
    info: DeviceInfo,
}

impl Default for MockBackend {
    fn default() -> Self {
        MockBackend::new()
    }
}

impl MockBackend {
    pub fn new() -> MockBackend {
        MockBackend::with_info(DeviceInfo {
            uniform_buffer_max: 16 * 1024,
            storage_buffer_max: 128 * 1024 * 1024,
            max_texture_array_size: 2048,
            max_anisotropy: 16.0,
        })
    }

    pub fn with_info(info: DeviceInfo) -> MockBackend {
        MockBackend { info }
    }
}

impl crate::backend::Backend for MockBackend {
    fn device_info(&self) -> DeviceInfo {
        self.info
    }

    fn create_vertex_buffer(&self, desc: &VertexBufferDesc) -> Result<Box<dyn VertexBufferObject>> {
        Ok(Box::new(MockVertexBuffer::new(*desc)))
    }

    fn create_index_buffer(&self, desc: &IndexBufferDesc) -> Result<Box<dyn IndexBufferObject>> {
        Ok(Box::new(MockIndexBuffer::new(*desc)))
    }

    fn create_uniform_buffer(&self, desc: &UniformBufferDesc) -> Result<Box<dyn UniformBufferObject>> {
        Ok(Box::new(MockUniformBuffer::new(*desc)))
    }

    fn create_storage_buffer(&self, desc: &StorageBufferDesc) -> Result<Box<dyn StorageBufferObject>> {
        Ok(Box::new(MockStorageBuffer::new(*desc)))
    }

    fn create_texture_buffer(&self, desc: &TextureBufferDesc) -> Result<Box<dyn TextureBufferObject>> {
        let max = max_mip_levels(desc.size);
        if desc.mip_map_levels > max {
            return Err(Error::Capacity {
                kind: CapacityKind::MipMapLevels,
                requested: desc.mip_map_levels as u64,
                limit: max as u64,
            });
        }
        Ok(Box::new(MockTextureBuffer {
            desc: *desc,
            data: RefCell::new(vec![0u8; texture_byte_size(desc) as usize]),
        }))
    }

    fn create_texture_array_buffer(
        &self,
        desc: &TextureArrayBufferDesc,
    ) -> Result<Box<dyn TextureArrayBufferObject>> {
        let capacity = texture_byte_size(&desc.texture) * desc.texture_count as u64;
        Ok(Box::new(MockTextureArrayBuffer {
            desc: *desc,
            data: RefCell::new(vec![0u8; capacity as usize]),
        }))
    }

    fn create_vertex_array_object(
        &self,
        desc: &VertexArrayObjectDesc,
        buffers: &VertexArrayObjectBuffers<'_>,
    ) -> Result<Box<dyn VertexArrayObjectObject>> {
        Ok(Box::new(MockVertexArrayObject {
            desc: desc.clone(),
            vertex_buffer_size: buffers.vertex_buffer.description().size,
            index_buffer_size: buffers.index_buffer.map(|b| b.description().size),
            instance_buffer_size: buffers.instance_buffer.map(|b| b.description().size),
        }))
    }

    fn create_render_target(&self, desc: &RenderTargetDesc) -> Result<Box<dyn RenderTargetObject>> {
        Ok(Box::new(MockRenderTarget { desc: *desc }))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Box<dyn RenderPassObject>> {
        Ok(Box::new(MockRenderPass { desc: *desc }))
    }

    fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDesc,
        _decompiler: &dyn Decompiler,
    ) -> Result<Box<dyn RenderPipelineObject>> {
        Ok(Box::new(MockRenderPipeline { desc: desc.clone() }))
    }

    fn create_compute_pipeline(
        &self,
        desc: &ComputePipelineDesc,
        _decompiler: &dyn Decompiler,
    ) -> Result<Box<dyn ComputePipelineObject>> {
        Ok(Box::new(MockComputePipeline { desc: desc.clone() }))
    }

    fn create_raytrace_pipeline(&self, _desc: &RaytracePipelineDesc) -> Result<Box<dyn RaytracePipelineObject>> {
        Err(Error::InvalidState(
            "raytracing pipelines are not supported by any backend (non-goal)",
        ))
    }

    fn create_memory(&self, desc: &MemoryDesc) -> Result<Box<dyn VideoMemoryObject>> {
        Ok(Box::new(MockVideoMemory { desc: *desc }))
    }

    fn create_semaphore(&self) -> Box<dyn SemaphoreObject> {
        Box::new(MockSemaphore)
    }

    fn execute(&self, _command: &Command) -> Result<()> {
        Ok(())
    }

    fn submit(
        &self,
        _wait_semaphores: &[&dyn SemaphoreObject],
        _signal_semaphores: &[&dyn SemaphoreObject],
    ) -> Result<Box<dyn FenceObject>> {
        Ok(Box::new(MockFence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::descriptor::{BufferType, Extent2};

    #[test]
    fn vertex_buffer_write_out_of_range_fails() {
        let backend = MockBackend::new();
        let buf = backend
            .create_vertex_buffer(&VertexBufferDesc {
                size: 16,
                buffer_type: BufferType::DeviceLocal,
            })
            .unwrap();
        assert!(buf.write(8, &[0u8; 16]).is_err());
        assert!(buf.write(0, &[0u8; 16]).is_ok());
    }

    #[test]
    fn oversized_mip_map_levels_fail_then_succeed_at_one() {
        let backend = MockBackend::new();
        let desc = TextureBufferDesc {
            size: Extent2::new(1, 1),
            mip_map_levels: 4,
            ..TextureBufferDesc::default()
        };
        assert!(backend.create_texture_buffer(&desc).is_err());
        let retry = TextureBufferDesc {
            mip_map_levels: 1,
            ..desc
        };
        assert!(backend.create_texture_buffer(&retry).is_ok());
    }
}
