//! Pipeline descriptors: the compiled, immutable combination of shaders,
//! binding layout, vertex layout and fixed-function state (§3, §4.G).

use crate::descriptor::{BlendEquation, BlendMode, DepthTestMode, FaceCullingMode, StencilAction, StencilMode, Winding};
use crate::shader::ShaderStageDesc;
use crate::vao::VertexLayout;
use std::collections::BTreeMap;

/// The shader stage a [`ShaderStageDesc`] is attached to. Ordered so that a
/// `RenderPipelineDesc`'s stage map has a stable iteration order for hashing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

/// What kind of resource a pipeline binding slot expects; must match the
/// [`crate::handle::Kind`] of whatever is bound there at draw time (invariant 5).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BindingKind {
    Texture,
    TextureArray,
    UniformBuffer,
    StorageBuffer,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveTopology {
    /// Number of vertices making up one primitive, used to turn an element
    /// count into a polygon count for draw statistics (§4.F).
    pub fn primitive_size(self) -> u32 {
        match self {
            PrimitiveTopology::Points => 1,
            PrimitiveTopology::Lines | PrimitiveTopology::LineStrip => 2,
            PrimitiveTopology::Triangles
            | PrimitiveTopology::TriangleStrip
            | PrimitiveTopology::TriangleFan => 3,
        }
    }
}

/// Depth test + write fixed-function state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DepthState {
    pub test_enabled: bool,
    pub write_enabled: bool,
    pub mode: DepthTestMode,
}

impl Default for DepthState {
    fn default() -> Self {
        DepthState {
            test_enabled: false,
            write_enabled: true,
            mode: DepthTestMode::Less,
        }
    }
}

/// Stencil test fixed-function state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StencilState {
    pub test_enabled: bool,
    pub read_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
    pub mode: StencilMode,
    pub on_fail: StencilAction,
    pub on_depth_fail: StencilAction,
    pub on_pass: StencilAction,
}

impl Default for StencilState {
    fn default() -> Self {
        StencilState {
            test_enabled: false,
            read_mask: 0xFFFF_FFFF,
            write_mask: 0xFFFF_FFFF,
            reference: 0,
            mode: StencilMode::Always,
            on_fail: StencilAction::Keep,
            on_depth_fail: StencilAction::Keep,
            on_pass: StencilAction::Keep,
        }
    }
}

/// Separate color/alpha blend fixed-function state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlendState {
    pub enabled: bool,
    pub color_src: BlendMode,
    pub color_dst: BlendMode,
    pub color_equation: BlendEquation,
    pub alpha_src: BlendMode,
    pub alpha_dst: BlendMode,
    pub alpha_equation: BlendEquation,
}

impl Default for BlendState {
    fn default() -> Self {
        BlendState {
            enabled: false,
            color_src: BlendMode::One,
            color_dst: BlendMode::Zero,
            color_equation: BlendEquation::Add,
            alpha_src: BlendMode::One,
            alpha_dst: BlendMode::Zero,
            alpha_equation: BlendEquation::Add,
        }
    }
}

/// Multisample fixed-function state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MultisampleState {
    pub enabled: bool,
    pub samples: u32,
}

impl Default for MultisampleState {
    fn default() -> Self {
        MultisampleState {
            enabled: false,
            samples: 1,
        }
    }
}

/// Descriptor for a `RenderPipeline` resource.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RenderPipelineDesc {
    pub shader_stages: BTreeMap<ShaderStage, ShaderStageDesc>,
    pub bindings: Vec<BindingKind>,
    pub primitive: PrimitiveTopology,
    pub vertex_layout: VertexLayout,
    pub instance_array_layout: Option<VertexLayout>,
    pub face_culling: FaceCullingMode,
    pub winding: Winding,
    pub depth: DepthState,
    pub stencil: StencilState,
    pub blend: BlendState,
    pub multisample: MultisampleState,
}

/// Descriptor for a `ComputePipeline` resource.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ComputePipelineDesc {
    pub shader: ShaderStageDesc,
    pub bindings: Vec<BindingKind>,
}

/// Descriptor for a `RaytracePipeline` resource.
///
/// Interface only: raytracing pipeline behaviour is an explicit non-goal
/// (§1). The backend trait's methods exist so the resource kind can be
/// created and stored, but no backend is expected to implement real
/// raytracing semantics against this descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct RaytracePipelineDesc {
    pub shader: Option<ShaderStageDesc>,
}
