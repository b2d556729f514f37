//! Command queue (§4.F): validates bindings, interprets the command stream
//! against a backend, issues fences.

use crate::backend::Backend;
use crate::command::{Command, CopyCommand, ShaderResourceRef};
use crate::command_buffer::CommandBuffer;
use crate::device::FrameStats;
use crate::error::{Error, Result};
use crate::pipeline::BindingKind;
use crate::sync::{Fence, Semaphore};
use crate::traits::{
    FenceObject, IndexBufferObject, SemaphoreObject, StorageBufferObject, UniformBufferObject,
    VertexBufferObject,
};
use std::cell::RefCell;
use std::rc::Rc;

/// The queue's render-pass/binding state machine (§4.F). Lives on
/// [`CommandQueue`] itself and carries across `submit` calls — splitting one
/// submission into two (`submit([b1, b2])` vs. `submit([b1]); submit([b2])`)
/// must have identical observable effects (§8 "submission-order round
/// trip"), which only holds if a pass left open by one submission is still
/// open for the next. On a validation error mid-submission, the state resets
/// to idle/unbound rather than rolling back to whatever it was before the
/// failing submission (§7 "Propagation policy": "rolled back to no pass
/// running, no pipeline bound").
#[derive(Default, Clone, Debug)]
struct QueueState {
    in_pass: bool,
    render_pipeline_bindings: Option<Vec<BindingKind>>,
    primitive_size: u32,
    compute_pipeline_bound: bool,
    vao_bound: bool,
    vao_has_index_buffer: bool,
    bound_resources: Vec<BindingKind>,
}

impl QueueState {
    fn validate_bindings(&self) -> Result<()> {
        let expected = self
            .render_pipeline_bindings
            .as_ref()
            .ok_or(Error::InvalidState("draw with no pipeline bound"))?;
        if !self.vao_bound {
            return Err(Error::InvalidState("draw with no vertex array object bound"));
        }
        if expected.len() != self.bound_resources.len() {
            return Err(Error::InvalidState(
                "bound shader resource count does not match pipeline binding count",
            ));
        }
        for (i, (want, got)) in expected.iter().zip(self.bound_resources.iter()).enumerate() {
            if want != got {
                log::error!(
                    "binding {} mismatch: pipeline expects {:?}, bound resource is {:?}",
                    i,
                    want,
                    got
                );
                return Err(Error::InvalidState("bound resource kind does not match pipeline binding"));
            }
        }
        Ok(())
    }

    fn validate_indexed_draw(&self) -> Result<()> {
        self.validate_bindings()?;
        if !self.vao_has_index_buffer {
            return Err(Error::InvalidState("indexed draw with no index buffer bound"));
        }
        Ok(())
    }
}

fn binding_kind_of(r: &ShaderResourceRef) -> BindingKind {
    match r {
        ShaderResourceRef::Texture(_) => BindingKind::Texture,
        ShaderResourceRef::TextureArray(_) => BindingKind::TextureArray,
        ShaderResourceRef::Uniform(_) => BindingKind::UniformBuffer,
        ShaderResourceRef::Storage(_) => BindingKind::StorageBuffer,
    }
}

/// A buffer-like backend object whose descriptor carries a byte size, used
/// to validate `COPY_*` commands generically over the four buffer kinds
/// (§4.F "Buffer copies validate ranges").
trait ByteSized {
    fn byte_size(&self) -> u64;
}

impl ByteSized for dyn VertexBufferObject {
    fn byte_size(&self) -> u64 {
        self.description().size
    }
}
impl ByteSized for dyn IndexBufferObject {
    fn byte_size(&self) -> u64 {
        self.description().size
    }
}
impl ByteSized for dyn UniformBufferObject {
    fn byte_size(&self) -> u64 {
        self.description().size
    }
}
impl ByteSized for dyn StorageBufferObject {
    fn byte_size(&self) -> u64 {
        self.description().size
    }
}

fn validate_copy_range<O: ?Sized + ByteSized>(cmd: &CopyCommand<'_, O>) -> Result<()> {
    let source_size = cmd.source.byte_size();
    let target_size = cmd.target.byte_size();
    if cmd.read_offset + cmd.count > source_size {
        return Err(Error::InvalidRange {
            what: "copy source",
            offset: cmd.read_offset as i64,
            count: cmd.count as i64,
            bound: source_size,
        });
    }
    if cmd.write_offset + cmd.count > target_size {
        return Err(Error::InvalidRange {
            what: "copy target",
            offset: cmd.write_offset as i64,
            count: cmd.count as i64,
            bound: target_size,
        });
    }
    Ok(())
}

/// Interprets submitted command buffers against a [`Backend`] (§4.F).
#[derive(Debug)]
pub struct CommandQueue {
    backend: Rc<dyn Backend>,
    stats: Rc<RefCell<FrameStats>>,
    state: RefCell<QueueState>,
}

impl CommandQueue {
    pub(crate) fn new(backend: Rc<dyn Backend>, stats: Rc<RefCell<FrameStats>>) -> CommandQueue {
        CommandQueue {
            backend,
            stats,
            state: RefCell::new(QueueState::default()),
        }
    }

    /// Interprets `buffers` in order, and within each buffer, in recorded
    /// order. Waits precede the work; signals fire after it completes
    /// (§4.F "Submit"). On validation failure, no further commands execute
    /// and the error is returned; work already executed by the backend
    /// before the failing command stands (§7 "Propagation policy" —
    /// "partial work already submitted is allowed to complete").
    pub fn submit(
        &self,
        buffers: &[CommandBuffer<'_>],
        wait_semaphores: &[&Semaphore],
        signal_semaphores: &[&Semaphore],
    ) -> Result<Fence> {
        for buffer in buffers {
            if !buffer.is_sealed() {
                return Err(Error::InvalidState("submitted a command buffer that was never ended"));
            }
        }

        let mut local_stats = FrameStats::default();
        let mut state = self.state.borrow().clone();

        for buffer in buffers {
            for command in buffer.commands() {
                if let Err(err) = self.validate_and_execute(command, &mut state, &mut local_stats) {
                    *self.state.borrow_mut() = QueueState::default();
                    return Err(err);
                }
            }
        }

        *self.state.borrow_mut() = state;
        *self.stats.borrow_mut() = accumulate(*self.stats.borrow(), local_stats);

        let waits: Vec<&dyn SemaphoreObject> = wait_semaphores.iter().map(|s| &*s.0).collect();
        let signals: Vec<&dyn SemaphoreObject> = signal_semaphores.iter().map(|s| &*s.0).collect();
        let fence_obj = self.backend.submit(&waits, &signals)?;
        Ok(Fence(crate::handle::Handle::new(
            crate::handle::Kind::Fence,
            fence_obj,
        )))
    }

    fn validate_and_execute(
        &self,
        command: &Command<'_>,
        state: &mut QueueState,
        stats: &mut FrameStats,
    ) -> Result<()> {
        if command.requires_in_pass() && !state.in_pass {
            return Err(Error::InvalidState("command requires an active render pass"));
        }
        if command.requires_out_of_pass() && state.in_pass {
            return Err(Error::InvalidState("command is illegal while a render pass is active"));
        }

        match command {
            Command::BeginPass(begin) => {
                if state.in_pass {
                    return Err(Error::InvalidState("begin pass while a pass is already running"));
                }
                let expected = begin.pass.description().signature();
                let actual = begin.target.description().signature();
                if expected != actual {
                    return Err(Error::IncompatibleTarget {
                        expected_color: expected.0,
                        expected_depth_stencil: expected.1,
                        actual_color: actual.0,
                        actual_depth_stencil: actual.1,
                    });
                }
                state.in_pass = true;
            }
            Command::EndPass => {
                if !state.in_pass {
                    return Err(Error::InvalidState("end pass with no pass running"));
                }
                state.in_pass = false;
                state.render_pipeline_bindings = None;
                state.compute_pipeline_bound = false;
                state.vao_bound = false;
                state.vao_has_index_buffer = false;
                state.bound_resources.clear();
            }
            Command::BindPipeline(pipeline) => {
                let desc = pipeline.description();
                state.render_pipeline_bindings = Some(desc.bindings.clone());
                state.primitive_size = desc.primitive.primitive_size();
            }
            Command::ComputeBindPipeline(_) => {
                state.compute_pipeline_bound = true;
            }
            Command::BindVertexArrayObject(vao) => {
                state.vao_bound = true;
                state.vao_has_index_buffer = vao.index_buffer_size().is_some();
            }
            Command::BindShaderResources(bindings) => {
                state.bound_resources = bindings.iter().map(|b| binding_kind_of(&b.resource)).collect();
            }
            Command::DrawArray(call) => {
                state.validate_bindings()?;
                record_draw(stats, 1, call.count, state.primitive_size);
            }
            Command::DrawIndexed(call) => {
                state.validate_indexed_draw()?;
                record_draw(stats, 1, call.count, state.primitive_size);
            }
            Command::DrawArrayInstanced { call, instance_count } => {
                state.validate_bindings()?;
                record_draw(stats, 1, call.count * instance_count, state.primitive_size);
            }
            Command::DrawIndexedInstanced { call, instance_count } => {
                state.validate_indexed_draw()?;
                record_draw(stats, 1, call.count * instance_count, state.primitive_size);
            }
            Command::DrawArrayMulti(calls) => {
                state.validate_bindings()?;
                let total: u32 = calls.iter().map(|c| c.count).sum();
                record_draw(stats, calls.len() as u64, total, state.primitive_size);
            }
            Command::DrawIndexedMulti(calls) => {
                state.validate_indexed_draw()?;
                let total: u32 = calls.iter().map(|c| c.count).sum();
                record_draw(stats, calls.len() as u64, total, state.primitive_size);
            }
            Command::DrawIndexedBaseVertex { call, .. } => {
                state.validate_indexed_draw()?;
                record_draw(stats, 1, call.count, state.primitive_size);
            }
            Command::DrawIndexedInstancedBaseVertex { call, instance_count, .. } => {
                state.validate_indexed_draw()?;
                record_draw(stats, 1, call.count * instance_count, state.primitive_size);
            }
            Command::DrawIndexedMultiBaseVertex { calls, .. } => {
                state.validate_indexed_draw()?;
                let total: u32 = calls.iter().map(|c| c.count).sum();
                record_draw(stats, calls.len() as u64, total, state.primitive_size);
            }
            Command::CopyVertexBuffer(cmd) => validate_copy_range(cmd)?,
            Command::CopyIndexBuffer(cmd) => validate_copy_range(cmd)?,
            Command::CopyShaderUniformBuffer(cmd) => validate_copy_range(cmd)?,
            Command::CopyShaderStorageBuffer(cmd) => validate_copy_range(cmd)?,
            Command::BlitColor(blit) | Command::BlitDepth(blit) | Command::BlitStencil(blit) => {
                if blit.source_offset.x < 0 || blit.source_offset.y < 0 {
                    return Err(Error::InvalidRange {
                        what: "blit source offset",
                        offset: blit.source_offset.x.min(blit.source_offset.y) as i64,
                        count: 0,
                        bound: 0,
                    });
                }
                if blit.target_offset.x < 0 || blit.target_offset.y < 0 {
                    return Err(Error::InvalidRange {
                        what: "blit target offset",
                        offset: blit.target_offset.x.min(blit.target_offset.y) as i64,
                        count: 0,
                        bound: 0,
                    });
                }
                let source_size = blit.source.description().size;
                if blit.source_offset.x as u32 + blit.source_extent.width > source_size.width
                    || blit.source_offset.y as u32 + blit.source_extent.height > source_size.height
                {
                    return Err(Error::InvalidRange {
                        what: "blit source rect",
                        offset: 0,
                        count: 0,
                        bound: (source_size.width as u64) * (source_size.height as u64),
                    });
                }
                let target_size = blit.target.description().size;
                if blit.target_offset.x as u32 + blit.target_extent.width > target_size.width
                    || blit.target_offset.y as u32 + blit.target_extent.height > target_size.height
                {
                    return Err(Error::InvalidRange {
                        what: "blit target rect",
                        offset: 0,
                        count: 0,
                        bound: (target_size.width as u64) * (target_size.height as u64),
                    });
                }
            }
            _ => {}
        }

        self.backend.execute(command)
    }
}

fn record_draw(stats: &mut FrameStats, draw_calls: u64, elements: u32, primitive_size: u32) {
    stats.draw_calls += draw_calls;
    stats.polys += (elements / primitive_size.max(1)) as u64;
}

fn accumulate(a: FrameStats, b: FrameStats) -> FrameStats {
    FrameStats {
        draw_calls: a.draw_calls + b.draw_calls,
        polys: a.polys + b.polys,
        bytes_uploaded: a.bytes_uploaded + b.bytes_uploaded,
        bytes_downloaded: a.bytes_downloaded + b.bytes_downloaded,
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::mock::MockBackend;
    use crate::buffer::{UniformBufferDesc, VertexBufferDesc};
    use crate::command::{ArrayDrawCall, Command, ShaderResourceBinding, ShaderResourceRef};
    use crate::descriptor::{BufferType, Extent2, Vec2i};
    use crate::device::Device;
    use crate::error::Error;
    use crate::pipeline::{BindingKind, PrimitiveTopology, RenderPipelineDesc, ShaderStage};
    use crate::render_pass::{blit_color, RenderPass};
    use crate::render_target::RenderTargetDesc;
    use crate::shader::{NoDecompiler, ShaderStageDesc};
    use crate::texture::TextureBufferDesc;
    use crate::vao::{VertexArrayObjectBuffers, VertexArrayObjectDesc, VertexLayout};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn device() -> Device {
        Device::new(Rc::new(MockBackend::new()))
    }

    fn pipeline_with_one_uniform_binding(device: &Device) -> crate::handle::Handle<dyn crate::traits::RenderPipelineObject> {
        let mut shader_stages = BTreeMap::new();
        shader_stages.insert(ShaderStage::Vertex, ShaderStageDesc::new(&b"x"[..], "main"));
        shader_stages.insert(ShaderStage::Fragment, ShaderStageDesc::new(&b"x"[..], "main"));
        device
            .create_render_pipeline(
                RenderPipelineDesc {
                    shader_stages,
                    bindings: vec![BindingKind::UniformBuffer],
                    primitive: PrimitiveTopology::Triangles,
                    vertex_layout: VertexLayout::default(),
                    instance_array_layout: None,
                    face_culling: crate::descriptor::FaceCullingMode::None,
                    winding: crate::descriptor::Winding::CounterClockwise,
                    depth: Default::default(),
                    stencil: Default::default(),
                    blend: Default::default(),
                    multisample: Default::default(),
                },
                &NoDecompiler,
            )
            .unwrap()
    }

    /// §8 quantified invariant: a draw with a bound resource list whose
    /// kinds don't match the pipeline's declared bindings fails.
    #[test]
    fn draw_fails_when_bound_resource_kind_does_not_match_pipeline_binding() {
        let device = device();
        let pipeline = pipeline_with_one_uniform_binding(&device);

        let vertex_buffer = device
            .create_vertex_buffer(VertexBufferDesc {
                size: 12,
                buffer_type: BufferType::HostVisible,
            })
            .unwrap();
        let vao = device
            .create_vertex_array_object(
                VertexArrayObjectDesc::default(),
                VertexArrayObjectBuffers {
                    vertex_buffer: &vertex_buffer,
                    index_buffer: None,
                    instance_buffer: None,
                },
            )
            .unwrap();
        // Pipeline declares a uniform buffer binding; bind a texture instead.
        let texture = device
            .create_texture_buffer(TextureBufferDesc::default())
            .unwrap();

        let pass_desc = crate::render_pass::RenderPassDesc {
            num_color_attachments: 1,
            has_depth_stencil_attachment: false,
        };
        let pass = device.create_render_pass(pass_desc).unwrap();
        let target = device
            .create_render_target(RenderTargetDesc {
                size: Extent2::new(4, 4),
                multisample: false,
                samples: 1,
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            })
            .unwrap();
        let render_pass = RenderPass(&pass);

        let mut buffer = device.create_command_buffer();
        buffer.begin().unwrap();
        buffer.add(render_pass.begin(&target)).unwrap();
        buffer.add(Command::BindPipeline(&pipeline)).unwrap();
        buffer.add(Command::BindVertexArrayObject(&vao)).unwrap();
        buffer
            .add(Command::BindShaderResources(vec![ShaderResourceBinding {
                resource: ShaderResourceRef::Texture(&texture),
                access: BTreeMap::new(),
            }]))
            .unwrap();
        buffer
            .add(Command::DrawArray(ArrayDrawCall { offset: 0, count: 3 }))
            .unwrap();
        buffer.add(render_pass.end()).unwrap();
        buffer.end().unwrap();

        let queue = device.render_queues()[0].clone();
        let err = queue.borrow().submit(&[buffer], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    /// §8 quantified invariant: a draw with no pipeline bound fails.
    #[test]
    fn draw_with_no_pipeline_bound_fails() {
        let device = device();
        let vertex_buffer = device
            .create_vertex_buffer(VertexBufferDesc {
                size: 12,
                buffer_type: BufferType::HostVisible,
            })
            .unwrap();
        let vao = device
            .create_vertex_array_object(
                VertexArrayObjectDesc::default(),
                VertexArrayObjectBuffers {
                    vertex_buffer: &vertex_buffer,
                    index_buffer: None,
                    instance_buffer: None,
                },
            )
            .unwrap();
        let pass = device
            .create_render_pass(crate::render_pass::RenderPassDesc {
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            })
            .unwrap();
        let target = device
            .create_render_target(RenderTargetDesc {
                size: Extent2::new(4, 4),
                multisample: false,
                samples: 1,
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            })
            .unwrap();
        let render_pass = RenderPass(&pass);

        let mut buffer = device.create_command_buffer();
        buffer.begin().unwrap();
        buffer.add(render_pass.begin(&target)).unwrap();
        buffer.add(Command::BindVertexArrayObject(&vao)).unwrap();
        buffer
            .add(Command::DrawArray(ArrayDrawCall { offset: 0, count: 3 }))
            .unwrap();
        buffer.add(render_pass.end()).unwrap();
        buffer.end().unwrap();

        let queue = device.render_queues()[0].clone();
        let err = queue.borrow().submit(&[buffer], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    /// §8 quantified invariant: a blit with a negative offset fails.
    #[test]
    fn blit_with_negative_source_offset_fails() {
        let device = device();
        let source = device
            .create_texture_buffer(TextureBufferDesc::default())
            .unwrap();
        let target = device
            .create_texture_buffer(TextureBufferDesc::default())
            .unwrap();

        let mut buffer = device.create_command_buffer();
        buffer.begin().unwrap();
        buffer
            .add(blit_color(
                &source,
                &target,
                Vec2i::new(-1, 0),
                Extent2::new(1, 1),
                Vec2i::new(0, 0),
                Extent2::new(1, 1),
                crate::descriptor::TextureFiltering::Nearest,
            ))
            .unwrap();
        buffer.end().unwrap();

        let queue = device.render_queues()[0].clone();
        let err = queue.borrow().submit(&[buffer], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    /// §8 quantified invariant: `copy(src,dst,readOffset,writeOffset,count)`
    /// with a write range exceeding the target's size fails.
    #[test]
    fn copy_write_range_exceeding_target_size_fails() {
        let device = device();
        let src = device
            .create_vertex_buffer(VertexBufferDesc {
                size: 64,
                buffer_type: BufferType::HostVisible,
            })
            .unwrap();
        let dst = device
            .create_vertex_buffer(VertexBufferDesc {
                size: 16,
                buffer_type: BufferType::HostVisible,
            })
            .unwrap();

        let mut buffer = device.create_command_buffer();
        buffer.begin().unwrap();
        buffer
            .add(Command::CopyVertexBuffer(crate::command::CopyCommand {
                source: &src,
                target: &dst,
                read_offset: 0,
                write_offset: 0,
                count: 32,
            }))
            .unwrap();
        buffer.end().unwrap();

        let queue = device.render_queues()[0].clone();
        let err = queue.borrow().submit(&[buffer], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    /// Exercises the uniform-buffer-backed binding path so the "matches"
    /// half of invariant 5 is covered alongside the "mismatches" tests above.
    #[test]
    fn draw_succeeds_when_bound_resource_kind_matches_pipeline_binding() {
        let device = device();
        let pipeline = pipeline_with_one_uniform_binding(&device);
        let uniform = device
            .create_shader_uniform_buffer(UniformBufferDesc {
                size: 64,
                buffer_type: BufferType::HostVisible,
            })
            .unwrap();
        let vertex_buffer = device
            .create_vertex_buffer(VertexBufferDesc {
                size: 12,
                buffer_type: BufferType::HostVisible,
            })
            .unwrap();
        let vao = device
            .create_vertex_array_object(
                VertexArrayObjectDesc::default(),
                VertexArrayObjectBuffers {
                    vertex_buffer: &vertex_buffer,
                    index_buffer: None,
                    instance_buffer: None,
                },
            )
            .unwrap();
        let pass = device
            .create_render_pass(crate::render_pass::RenderPassDesc {
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            })
            .unwrap();
        let target = device
            .create_render_target(RenderTargetDesc {
                size: Extent2::new(4, 4),
                multisample: false,
                samples: 1,
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            })
            .unwrap();
        let render_pass = RenderPass(&pass);

        let mut buffer = device.create_command_buffer();
        buffer.begin().unwrap();
        buffer.add(render_pass.begin(&target)).unwrap();
        buffer.add(Command::BindPipeline(&pipeline)).unwrap();
        buffer.add(Command::BindVertexArrayObject(&vao)).unwrap();
        buffer
            .add(Command::BindShaderResources(vec![ShaderResourceBinding {
                resource: ShaderResourceRef::Uniform(&uniform),
                access: BTreeMap::new(),
            }]))
            .unwrap();
        buffer
            .add(Command::DrawArray(ArrayDrawCall { offset: 0, count: 3 }))
            .unwrap();
        buffer.add(render_pass.end()).unwrap();
        buffer.end().unwrap();

        let queue = device.render_queues()[0].clone();
        queue.borrow().submit(&[buffer], &[], &[]).unwrap();
    }

    /// §8 quantified invariant / §8 submission-order round trip: a pass left
    /// open by one `submit` call is still open for the next — a second
    /// `begin_pass` on a separate submission fails exactly as it would
    /// within a single submission.
    #[test]
    fn begin_pass_state_carries_across_separate_submit_calls() {
        let device = device();
        let pass = device
            .create_render_pass(crate::render_pass::RenderPassDesc {
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            })
            .unwrap();
        let target = device
            .create_render_target(RenderTargetDesc {
                size: Extent2::new(4, 4),
                multisample: false,
                samples: 1,
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            })
            .unwrap();
        let render_pass = RenderPass(&pass);
        let queue = device.render_queues()[0].clone();

        let mut first = device.create_command_buffer();
        first.begin().unwrap();
        first.add(render_pass.begin(&target)).unwrap();
        first.end().unwrap();
        queue.borrow().submit(&[first], &[], &[]).unwrap();

        let mut second = device.create_command_buffer();
        second.begin().unwrap();
        second.add(render_pass.begin(&target)).unwrap();
        second.end().unwrap();
        let err = queue.borrow().submit(&[second], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }
}
