//! Frame-local resource identity and the declarative command record the
//! builder produces for the allocator to execute (§4.H, §4.I).

use crate::buffer::{IndexBufferDesc, StorageBufferDesc, UniformBufferDesc, VertexBufferDesc};
use crate::command::{AccessMode, ArrayDrawCall, IndexedDrawCall};
use crate::descriptor::{ColorRgba, Extent2, TextureFiltering, Vec2i};
use crate::frame_graph::slot::FrameGraphSlot;
use crate::pipeline::{BindingKind, ComputePipelineDesc, RenderPipelineDesc, ShaderStage};
use crate::render_pass::RenderPassDesc;
use crate::render_target::RenderTargetDesc;
use crate::texture::{TextureArrayBufferDesc, TextureBufferDesc};
use crate::vao::VertexArrayObjectDesc;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A handle into the frame graph: a monotonic counter, assigned by every
/// `create*` builder call (§4.H "Resource identity inside the graph").
/// Distinct from [`crate::handle::Handle`], which only exists once the
/// allocator has realised a frame-graph resource against a device.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameGraphResource(pub(crate) u64);

/// Which buffer/texture kind a `Copy` command's two [`FrameGraphResource`]s
/// refer to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CopyResourceKind {
    VertexBuffer,
    IndexBuffer,
    UniformBuffer,
    StorageBuffer,
    TextureBuffer,
    TextureArrayBuffer,
}

/// The value a `create*` call declares for a fresh [`FrameGraphResource`].
#[derive(Clone, Debug)]
pub enum ResourceCreation {
    VertexBuffer(VertexBufferDesc),
    IndexBuffer(IndexBufferDesc),
    UniformBuffer(UniformBufferDesc),
    StorageBuffer(StorageBufferDesc),
    TextureBuffer(TextureBufferDesc),
    TextureArrayBuffer(TextureArrayBufferDesc),
    VertexArrayObject {
        desc: VertexArrayObjectDesc,
        vertex_buffer: FrameGraphResource,
        index_buffer: Option<FrameGraphResource>,
        instance_buffer: Option<FrameGraphResource>,
    },
    RenderTarget(RenderTargetDesc),
    RenderPass(RenderPassDesc),
    RenderPipeline(RenderPipelineDesc),
    ComputePipeline(ComputePipelineDesc),
}

/// A callable invoked by the allocator during execution to fetch the bytes
/// for an `upload` (§4.H: "permits deferring large CPU work into the
/// execution phase"). Must be side-effect-free other than returning bytes
/// (§9 "Coroutines / async").
pub type UploadSource = Rc<dyn Fn() -> Vec<u8>>;

/// One declarative operation recorded by [`crate::frame_graph::builder::FrameGraphBuilder`]
/// during a pass's `setup` (§4.H). Unlike [`crate::command::Command`], every
/// resource reference here is a plain, `Copy` [`FrameGraphResource`] id — the
/// allocator resolves these to real handles when it realises the graph (§4.I).
#[derive(Clone)]
pub enum FrameGraphCommand {
    Create {
        id: FrameGraphResource,
        creation: ResourceCreation,
    },
    Upload {
        target: FrameGraphResource,
        source: UploadSource,
    },
    Copy {
        kind: CopyResourceKind,
        source: FrameGraphResource,
        target: FrameGraphResource,
        read_offset: u64,
        write_offset: u64,
        count: u64,
    },
    BlitColor(BlitDecl),
    BlitDepth(BlitDecl),
    BlitStencil(BlitDecl),
    BeginPass {
        pass: FrameGraphResource,
        target: FrameGraphResource,
    },
    FinishPass,
    ClearColor(ColorRgba),
    ClearDepth(f32),
    SetViewport { offset: Vec2i, size: Extent2 },
    BindPipeline(FrameGraphResource),
    BindVertexBuffers(FrameGraphResource),
    BindShaderResources(Vec<FrameGraphShaderResourceBinding>),
    DrawArray(ArrayDrawCall),
    DrawIndexed(IndexedDrawCall),
    DrawArrayInstanced { call: ArrayDrawCall, instance_count: u32 },
    DrawIndexedInstanced { call: IndexedDrawCall, instance_count: u32 },
    DrawArrayMulti(Vec<ArrayDrawCall>),
    DrawIndexedMulti(Vec<IndexedDrawCall>),
    DrawIndexedBaseVertex { call: IndexedDrawCall, base_vertex: i32 },
    DrawIndexedInstancedBaseVertex {
        call: IndexedDrawCall,
        instance_count: u32,
        base_vertex: i32,
    },
    DrawIndexedMultiBaseVertex {
        calls: Vec<IndexedDrawCall>,
        base_vertices: Vec<i32>,
    },
    ComputeBindPipeline(FrameGraphResource),
    DispatchCompute([u32; 3]),
    DebugBeginGroup(String),
    DebugEndGroup,
    Persist(FrameGraphResource),
    AssignSlot(FrameGraphSlot, FrameGraphResource),
}

impl fmt::Debug for FrameGraphCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // `Upload`'s closure isn't `Debug`; name the variant instead of
        // deriving, matching how the teacher crate hand-writes `Debug` for
        // similar closure-carrying types.
        f.write_str(match self {
            FrameGraphCommand::Create { .. } => "Create",
            FrameGraphCommand::Upload { .. } => "Upload",
            FrameGraphCommand::Copy { .. } => "Copy",
            FrameGraphCommand::BlitColor(_) => "BlitColor",
            FrameGraphCommand::BlitDepth(_) => "BlitDepth",
            FrameGraphCommand::BlitStencil(_) => "BlitStencil",
            FrameGraphCommand::BeginPass { .. } => "BeginPass",
            FrameGraphCommand::FinishPass => "FinishPass",
            FrameGraphCommand::ClearColor(_) => "ClearColor",
            FrameGraphCommand::ClearDepth(_) => "ClearDepth",
            FrameGraphCommand::SetViewport { .. } => "SetViewport",
            FrameGraphCommand::BindPipeline(_) => "BindPipeline",
            FrameGraphCommand::BindVertexBuffers(_) => "BindVertexBuffers",
            FrameGraphCommand::BindShaderResources(_) => "BindShaderResources",
            FrameGraphCommand::DrawArray(_) => "DrawArray",
            FrameGraphCommand::DrawIndexed(_) => "DrawIndexed",
            FrameGraphCommand::DrawArrayInstanced { .. } => "DrawArrayInstanced",
            FrameGraphCommand::DrawIndexedInstanced { .. } => "DrawIndexedInstanced",
            FrameGraphCommand::DrawArrayMulti(_) => "DrawArrayMulti",
            FrameGraphCommand::DrawIndexedMulti(_) => "DrawIndexedMulti",
            FrameGraphCommand::DrawIndexedBaseVertex { .. } => "DrawIndexedBaseVertex",
            FrameGraphCommand::DrawIndexedInstancedBaseVertex { .. } => {
                "DrawIndexedInstancedBaseVertex"
            }
            FrameGraphCommand::DrawIndexedMultiBaseVertex { .. } => "DrawIndexedMultiBaseVertex",
            FrameGraphCommand::ComputeBindPipeline(_) => "ComputeBindPipeline",
            FrameGraphCommand::DispatchCompute(_) => "DispatchCompute",
            FrameGraphCommand::DebugBeginGroup(_) => "DebugBeginGroup",
            FrameGraphCommand::DebugEndGroup => "DebugEndGroup",
            FrameGraphCommand::Persist(_) => "Persist",
            FrameGraphCommand::AssignSlot(_, _) => "AssignSlot",
        })
    }
}

/// One `bind_shader_resources` entry: which frame-graph resource, which
/// binding kind it must be realised as, and the per-stage access mode
/// (mirrors [`crate::command::ShaderResourceBinding`], but by untyped id
/// rather than borrowed handle).
#[derive(Clone, Debug)]
pub struct FrameGraphShaderResourceBinding {
    pub resource: FrameGraphResource,
    pub kind: BindingKind,
    pub access: BTreeMap<ShaderStage, AccessMode>,
}

#[derive(Copy, Clone, Debug)]
pub struct BlitDecl {
    pub source: FrameGraphResource,
    pub target: FrameGraphResource,
    pub source_offset: Vec2i,
    pub source_extent: Extent2,
    pub target_offset: Vec2i,
    pub target_extent: Extent2,
    pub filter: TextureFiltering,
}

/// One pass's recorded set-up: every declarative call made by `pass.setup`.
#[derive(Clone, Debug, Default)]
pub struct PassRecord {
    pub name: String,
    pub commands: Vec<FrameGraphCommand>,
}
