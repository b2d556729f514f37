//! Command records (§4.C).
//!
//! A command is a `(kind, payload)` tagged pair, not a closure: execution
//! semantics live in [`crate::queue::CommandQueue`], which pattern-matches on
//! the variant. This keeps the single, inlineable dispatch the source's
//! `switch (command.type)` already has (§9 "Command variant vs. virtual
//! calls") instead of a virtual call per command.
//!
//! Every variant that references a resource borrows it (`&'a Handle<...>`)
//! rather than owning or cloning it, so a command buffer cannot outlive the
//! handles it records (§4.B, §9 "Ownership & destruction").

use crate::descriptor::{ColorRgba, Extent2, TextureFiltering, Vec2i};
use crate::handle::Handle;
use crate::pipeline::ShaderStage;
use crate::traits::{
    ComputePipelineObject, IndexBufferObject, RenderPassObject, RenderPipelineObject,
    RenderTargetObject, StorageBufferObject, TextureArrayBufferObject, TextureBufferObject,
    UniformBufferObject, VertexArrayObjectObject, VertexBufferObject,
};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

/// A non-instanced draw call over vertex offset `offset..offset+count`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ArrayDrawCall {
    pub offset: u32,
    pub count: u32,
}

/// A non-instanced indexed draw call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IndexedDrawCall {
    pub offset: u32,
    pub count: u32,
    pub index_type: IndexType,
}

/// The access mode a shader stage is granted over a bound resource.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

/// A reference to exactly one of the four bindable resource kinds
/// (invariant 5: must match the pipeline's declared `BindingKind` at that slot).
#[derive(Copy, Clone, Debug)]
pub enum ShaderResourceRef<'a> {
    Texture(&'a Handle<dyn TextureBufferObject>),
    TextureArray(&'a Handle<dyn TextureArrayBufferObject>),
    Uniform(&'a Handle<dyn UniformBufferObject>),
    Storage(&'a Handle<dyn StorageBufferObject>),
}

/// One binding slot: a resource plus the access mode each shader stage uses
/// it with.
#[derive(Clone, Debug)]
pub struct ShaderResourceBinding<'a> {
    pub resource: ShaderResourceRef<'a>,
    pub access: BTreeMap<ShaderStage, AccessMode>,
}

#[derive(Copy, Clone, Debug)]
pub struct BlitCommand<'a> {
    pub source: &'a Handle<dyn TextureBufferObject>,
    pub target: &'a Handle<dyn TextureBufferObject>,
    pub source_offset: Vec2i,
    pub source_extent: Extent2,
    pub target_offset: Vec2i,
    pub target_extent: Extent2,
    pub filter: TextureFiltering,
}

#[derive(Copy, Clone, Debug)]
pub struct BeginPassCommand<'a> {
    pub pass: &'a Handle<dyn RenderPassObject>,
    pub target: &'a Handle<dyn RenderTargetObject>,
}

#[derive(Copy, Clone, Debug)]
pub struct ViewportCommand {
    pub offset: Vec2i,
    pub size: Extent2,
}

/// A byte-range copy between two resources of the same kind, shared by every
/// `COPY_*` command (§4.F: `readOffset + count <= source.size`, `writeOffset
/// + count <= target.size`).
#[derive(Copy, Clone, Debug)]
pub struct CopyCommand<'a, O: ?Sized> {
    pub source: &'a Handle<O>,
    pub target: &'a Handle<O>,
    pub read_offset: u64,
    pub write_offset: u64,
    pub count: u64,
}

#[derive(Copy, Clone, Debug)]
pub struct ComputeExecuteCommand {
    pub num_groups: [u32; 3],
}

/// A recorded, tagged command value (§4.C).
#[derive(Clone, Debug)]
pub enum Command<'a> {
    None,
    BlitColor(BlitCommand<'a>),
    BlitDepth(BlitCommand<'a>),
    BlitStencil(BlitCommand<'a>),
    BeginPass(BeginPassCommand<'a>),
    EndPass,
    ClearColor(ColorRgba),
    ClearDepth(f32),
    SetViewport(ViewportCommand),
    DrawArray(ArrayDrawCall),
    DrawIndexed(IndexedDrawCall),
    DrawArrayInstanced {
        call: ArrayDrawCall,
        instance_count: u32,
    },
    DrawIndexedInstanced {
        call: IndexedDrawCall,
        instance_count: u32,
    },
    DrawArrayMulti(Vec<ArrayDrawCall>),
    DrawIndexedMulti(Vec<IndexedDrawCall>),
    DrawIndexedBaseVertex {
        call: IndexedDrawCall,
        base_vertex: i32,
    },
    DrawIndexedInstancedBaseVertex {
        call: IndexedDrawCall,
        instance_count: u32,
        base_vertex: i32,
    },
    DrawIndexedMultiBaseVertex {
        calls: Vec<IndexedDrawCall>,
        base_vertices: Vec<i32>,
    },
    BindPipeline(&'a Handle<dyn RenderPipelineObject>),
    BindVertexArrayObject(&'a Handle<dyn VertexArrayObjectObject>),
    BindShaderResources(Vec<ShaderResourceBinding<'a>>),
    CopyTexture(CopyCommand<'a, dyn TextureBufferObject>),
    CopyTextureArray(CopyCommand<'a, dyn TextureArrayBufferObject>),
    CopyIndexBuffer(CopyCommand<'a, dyn IndexBufferObject>),
    CopyVertexBuffer(CopyCommand<'a, dyn VertexBufferObject>),
    CopyShaderStorageBuffer(CopyCommand<'a, dyn StorageBufferObject>),
    CopyShaderUniformBuffer(CopyCommand<'a, dyn UniformBufferObject>),
    ComputeBindPipeline(&'a Handle<dyn ComputePipelineObject>),
    ComputeExecute(ComputeExecuteCommand),
    DebugBeginGroup(String),
    DebugEndGroup,
}

impl<'a> Command<'a> {
    /// Whether this command is only legal while a pass is running
    /// (invariant 6). `None` and debug markers are legal in either state.
    pub fn requires_in_pass(&self) -> bool {
        matches!(
            self,
            Command::ClearColor(_)
                | Command::ClearDepth(_)
                | Command::SetViewport(_)
                | Command::DrawArray(_)
                | Command::DrawIndexed(_)
                | Command::DrawArrayInstanced { .. }
                | Command::DrawIndexedInstanced { .. }
                | Command::DrawArrayMulti(_)
                | Command::DrawIndexedMulti(_)
                | Command::DrawIndexedBaseVertex { .. }
                | Command::DrawIndexedInstancedBaseVertex { .. }
                | Command::DrawIndexedMultiBaseVertex { .. }
                | Command::BindPipeline(_)
                | Command::BindVertexArrayObject(_)
                | Command::BindShaderResources(_)
                | Command::ComputeBindPipeline(_)
                | Command::ComputeExecute(_)
        )
    }

    /// Whether this command is only legal outside of a pass (invariant 6).
    pub fn requires_out_of_pass(&self) -> bool {
        matches!(
            self,
            Command::BlitColor(_)
                | Command::BlitDepth(_)
                | Command::BlitStencil(_)
                | Command::CopyTexture(_)
                | Command::CopyTextureArray(_)
                | Command::CopyIndexBuffer(_)
                | Command::CopyVertexBuffer(_)
                | Command::CopyShaderStorageBuffer(_)
                | Command::CopyShaderUniformBuffer(_)
        )
    }
}
