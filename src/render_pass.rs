//! Render pass descriptor and command-factory helpers (§4.E, GLOSSARY
//! "Render pass").
//!
//! A render pass object's only state is its attachment signature; equality
//! between two passes is equality of that signature (invariant 4). The
//! factory helpers below don't execute anything themselves — they build the
//! [`Command`] values that a pass's `setup` records into the frame graph
//! (§4.H) or that are appended directly to a [`crate::command_buffer::CommandBuffer`].

use crate::command::{
    ArrayDrawCall, BeginPassCommand, BlitCommand, Command, ComputeExecuteCommand, IndexedDrawCall,
    ShaderResourceBinding, ViewportCommand,
};
use crate::descriptor::{ColorRgba, Extent2, TextureFiltering, Vec2i};
use crate::handle::Handle;
use crate::traits::{
    ComputePipelineObject, RenderPassObject, RenderPipelineObject, RenderTargetObject,
    TextureBufferObject, VertexArrayObjectObject,
};

/// Descriptor for a `RenderPass` resource: the attachment signature a render
/// target must match to begin the pass (invariant 4).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RenderPassDesc {
    pub num_color_attachments: u32,
    pub has_depth_stencil_attachment: bool,
}

impl RenderPassDesc {
    pub fn signature(&self) -> (u32, bool) {
        (self.num_color_attachments, self.has_depth_stencil_attachment)
    }
}

/// A borrowed render pass handle, offering command-factory helpers (§4.E).
///
/// These are plain value constructors, not recording calls: nothing is
/// appended to any buffer until the caller passes the returned [`Command`]
/// to [`crate::command_buffer::CommandBuffer::add`] or a frame-graph builder
/// call.
#[derive(Copy, Clone, Debug)]
pub struct RenderPass<'a>(pub &'a Handle<dyn RenderPassObject>);

impl<'a> RenderPass<'a> {
    pub fn begin(&self, target: &'a Handle<dyn RenderTargetObject>) -> Command<'a> {
        Command::BeginPass(BeginPassCommand {
            pass: self.0,
            target,
        })
    }

    pub fn end(&self) -> Command<'a> {
        Command::EndPass
    }

    pub fn set_viewport(&self, offset: Vec2i, size: Extent2) -> Command<'a> {
        Command::SetViewport(ViewportCommand { offset, size })
    }

    pub fn clear_color_attachments(&self, color: ColorRgba) -> Command<'a> {
        Command::ClearColor(color)
    }

    pub fn clear_depth_attachment(&self, depth: f32) -> Command<'a> {
        Command::ClearDepth(depth)
    }

    pub fn bind_pipeline(&self, pipeline: &'a Handle<dyn RenderPipelineObject>) -> Command<'a> {
        Command::BindPipeline(pipeline)
    }

    pub fn bind_vertex_array_object(
        &self,
        vao: &'a Handle<dyn VertexArrayObjectObject>,
    ) -> Command<'a> {
        Command::BindVertexArrayObject(vao)
    }

    pub fn bind_shader_resources(&self, bindings: Vec<ShaderResourceBinding<'a>>) -> Command<'a> {
        Command::BindShaderResources(bindings)
    }

    pub fn draw_array(&self, offset: u32, count: u32) -> Command<'a> {
        Command::DrawArray(ArrayDrawCall { offset, count })
    }

    pub fn draw_indexed(&self, call: IndexedDrawCall) -> Command<'a> {
        Command::DrawIndexed(call)
    }

    pub fn draw_array_instanced(
        &self,
        offset: u32,
        count: u32,
        instance_count: u32,
    ) -> Command<'a> {
        Command::DrawArrayInstanced {
            call: ArrayDrawCall { offset, count },
            instance_count,
        }
    }

    pub fn draw_indexed_instanced(
        &self,
        call: IndexedDrawCall,
        instance_count: u32,
    ) -> Command<'a> {
        Command::DrawIndexedInstanced {
            call,
            instance_count,
        }
    }

    pub fn draw_array_multi(&self, calls: Vec<ArrayDrawCall>) -> Command<'a> {
        Command::DrawArrayMulti(calls)
    }

    pub fn draw_indexed_multi(&self, calls: Vec<IndexedDrawCall>) -> Command<'a> {
        Command::DrawIndexedMulti(calls)
    }

    pub fn draw_indexed_base_vertex(&self, call: IndexedDrawCall, base_vertex: i32) -> Command<'a> {
        Command::DrawIndexedBaseVertex { call, base_vertex }
    }

    pub fn draw_indexed_instanced_base_vertex(
        &self,
        call: IndexedDrawCall,
        instance_count: u32,
        base_vertex: i32,
    ) -> Command<'a> {
        Command::DrawIndexedInstancedBaseVertex {
            call,
            instance_count,
            base_vertex,
        }
    }

    pub fn draw_indexed_multi_base_vertex(
        &self,
        calls: Vec<IndexedDrawCall>,
        base_vertices: Vec<i32>,
    ) -> Command<'a> {
        Command::DrawIndexedMultiBaseVertex {
            calls,
            base_vertices,
        }
    }

    pub fn bind_compute_pipeline(
        &self,
        pipeline: &'a Handle<dyn ComputePipelineObject>,
    ) -> Command<'a> {
        Command::ComputeBindPipeline(pipeline)
    }

    pub fn dispatch_compute(&self, num_groups: [u32; 3]) -> Command<'a> {
        Command::ComputeExecute(ComputeExecuteCommand { num_groups })
    }

    pub fn begin_debug_group(&self, name: impl Into<String>) -> Command<'a> {
        Command::DebugBeginGroup(name.into())
    }

    pub fn end_debug_group(&self) -> Command<'a> {
        Command::DebugEndGroup
    }
}

/// Free functions for the two commands that are legal outside of a pass and
/// so don't need a [`RenderPass`] receiver: blits and copies. Grouped here
/// because they share the blit/copy payload types with the in-pass helpers.
pub fn blit_color<'a>(
    source: &'a Handle<dyn TextureBufferObject>,
    target: &'a Handle<dyn TextureBufferObject>,
    source_offset: Vec2i,
    source_extent: Extent2,
    target_offset: Vec2i,
    target_extent: Extent2,
    filter: TextureFiltering,
) -> Command<'a> {
    Command::BlitColor(BlitCommand {
        source,
        target,
        source_offset,
        source_extent,
        target_offset,
        target_extent,
        filter,
    })
}

pub fn blit_depth<'a>(
    source: &'a Handle<dyn TextureBufferObject>,
    target: &'a Handle<dyn TextureBufferObject>,
    source_offset: Vec2i,
    source_extent: Extent2,
    target_offset: Vec2i,
    target_extent: Extent2,
    filter: TextureFiltering,
) -> Command<'a> {
    Command::BlitDepth(BlitCommand {
        source,
        target,
        source_offset,
        source_extent,
        target_offset,
        target_extent,
        filter,
    })
}

pub fn blit_stencil<'a>(
    source: &'a Handle<dyn TextureBufferObject>,
    target: &'a Handle<dyn TextureBufferObject>,
    source_offset: Vec2i,
    source_extent: Extent2,
    target_offset: Vec2i,
    target_extent: Extent2,
    filter: TextureFiltering,
) -> Command<'a> {
    Command::BlitStencil(BlitCommand {
        source,
        target,
        source_offset,
        source_extent,
        target_offset,
        target_extent,
        filter,
    })
}
