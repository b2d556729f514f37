//! The frame graph allocator (§4.I): realises a recorded graph against a
//! [`Device`] and executes it.
//!
//! Two responsibilities per frame, matching the design notes' resolution of
//! "frame-graph set-up vs. execute" (§9: "implementers may split the two
//! phases so long as the externally observable order of commands is
//! preserved"):
//!
//! 1. **Resource realisation.** Walk every pass's recorded commands in
//!    order; every `Create` is turned into a real backend object via
//!    `Device`, and every `Upload` writes its bytes straight into the
//!    already-realised target, without going through a queue.
//! 2. **Pass execution.** Walk the same commands again, translating every
//!    remaining declarative operation into a real [`Command`] appended to a
//!    per-pass [`CommandBuffer`], then submit that buffer before moving to
//!    the next pass. Inter-pass ordering is declaration order.
//!
//! Handles `persist`ed out of a frame survive into the [`FxHashMap`] this
//! allocator keeps between calls to [`FrameGraphAllocator::execute_frame`];
//! everything else is dropped (and, with it, the backend object its `Rc`
//! was the last owner of) once the frame ends.

use crate::command::{
    BeginPassCommand, BlitCommand, Command, ComputeExecuteCommand, CopyCommand,
    ShaderResourceBinding, ShaderResourceRef, ViewportCommand,
};
use crate::command_buffer::CommandBuffer;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::frame_graph::builder::{FrameGraphBuilder, BACK_BUFFER};
use crate::frame_graph::resource::{
    CopyResourceKind, FrameGraphCommand, FrameGraphResource, PassRecord, ResourceCreation,
};
use crate::frame_graph::slot::FrameGraphSlot;
use crate::handle::Handle;
use crate::render_target::RenderTargetDesc;
use crate::scene::Scene;
use crate::settings::Settings;
use crate::shader::Decompiler;
use crate::traits::{
    ComputePipelineObject, IndexBufferObject, RenderPassObject, RenderPipelineObject,
    RenderTargetObject, StorageBufferObject, TextureArrayBufferObject, TextureBufferObject,
    UniformBufferObject, VertexArrayObjectObject, VertexBufferObject,
};
use crate::vao::VertexArrayObjectBuffers;
use fxhash::FxHashMap;
use std::rc::Rc;

/// Implemented by every render pass a scene contributes to the frame graph
/// (§4.H, §4.I). Grounded in the original engine's `FrameGraphPass::setup`
/// contract: a pass does nothing but record declarative calls against the
/// builder it is handed.
pub trait FrameGraphPass {
    /// A stable, human-readable name, used as the recorded pass's name and
    /// in allocator diagnostics.
    fn name(&self) -> &str;

    /// Records this pass's resource creation, bindings and draws against
    /// `builder`. Must not keep any state across calls other than what the
    /// builder itself records (§9 "Coroutines / async": passes are not
    /// resumable).
    fn setup(&self, builder: &FrameGraphBuilder<'_>) -> Result<()>;
}

/// A frame-graph resource, realised against a real device. One `Rc` per
/// kind rather than a single `Rc<dyn Any>`-style cell, so looking one up
/// doesn't need a downcast: the kind is already known from which `create_*`
/// recorded it.
#[derive(Clone, Debug)]
enum Realized {
    VertexBuffer(Rc<Handle<dyn VertexBufferObject>>),
    IndexBuffer(Rc<Handle<dyn IndexBufferObject>>),
    UniformBuffer(Rc<Handle<dyn UniformBufferObject>>),
    StorageBuffer(Rc<Handle<dyn StorageBufferObject>>),
    TextureBuffer(Rc<Handle<dyn TextureBufferObject>>),
    TextureArrayBuffer(Rc<Handle<dyn TextureArrayBufferObject>>),
    VertexArrayObject(Rc<Handle<dyn VertexArrayObjectObject>>),
    RenderTarget(Rc<Handle<dyn RenderTargetObject>>),
    RenderPass(Rc<Handle<dyn RenderPassObject>>),
    RenderPipeline(Rc<Handle<dyn RenderPipelineObject>>),
    ComputePipeline(Rc<Handle<dyn ComputePipelineObject>>),
}

macro_rules! realized_accessor {
    ($name:ident, $variant:ident, $trait:ty) => {
        fn $name(&self) -> Result<&Handle<$trait>> {
            match self {
                Realized::$variant(h) => Ok(h),
                _ => Err(Error::InvalidState(concat!(
                    "frame graph resource is not a ",
                    stringify!($variant)
                ))),
            }
        }
    };
}

impl Realized {
    realized_accessor!(vertex_buffer, VertexBuffer, dyn VertexBufferObject);
    realized_accessor!(index_buffer, IndexBuffer, dyn IndexBufferObject);
    realized_accessor!(uniform_buffer, UniformBuffer, dyn UniformBufferObject);
    realized_accessor!(storage_buffer, StorageBuffer, dyn StorageBufferObject);
    realized_accessor!(texture_buffer, TextureBuffer, dyn TextureBufferObject);
    realized_accessor!(
        texture_array_buffer,
        TextureArrayBuffer,
        dyn TextureArrayBufferObject
    );
    realized_accessor!(
        vertex_array_object,
        VertexArrayObject,
        dyn VertexArrayObjectObject
    );
    realized_accessor!(render_target, RenderTarget, dyn RenderTargetObject);
    realized_accessor!(render_pass, RenderPass, dyn RenderPassObject);
    realized_accessor!(render_pipeline, RenderPipeline, dyn RenderPipelineObject);
    realized_accessor!(
        compute_pipeline,
        ComputePipeline,
        dyn ComputePipelineObject
    );
}

fn lookup(resources: &FxHashMap<FrameGraphResource, Realized>, id: FrameGraphResource) -> Result<&Realized> {
    resources.get(&id).ok_or(Error::UnknownResource(id.0))
}

/// Realises and executes one frame graph against a [`Device`], carrying
/// `persist`ed resources forward across calls.
#[derive(Debug)]
pub struct FrameGraphAllocator {
    persisted: FxHashMap<FrameGraphResource, Realized>,
    persisted_slots: FxHashMap<FrameGraphSlot, FrameGraphResource>,
    back_buffer: Option<(RenderTargetDesc, Rc<Handle<dyn RenderTargetObject>>)>,
    next_persistent_id: u64,
}

impl Default for FrameGraphAllocator {
    fn default() -> Self {
        FrameGraphAllocator::new()
    }
}

impl FrameGraphAllocator {
    pub fn new() -> FrameGraphAllocator {
        FrameGraphAllocator {
            persisted: FxHashMap::default(),
            persisted_slots: FxHashMap::default(),
            back_buffer: None,
            next_persistent_id: 1,
        }
    }

    /// Runs one frame: builds the graph by calling `setup` on every pass in
    /// order, then realises and executes it against `device`. Fails fast —
    /// an error from any pass's `setup`, or from realising/executing any
    /// recorded pass, stops the frame immediately; GPU work already
    /// submitted for earlier passes stands (§7 "Propagation policy").
    #[allow(clippy::too_many_arguments)]
    pub fn execute_frame(
        &mut self,
        device: &Device,
        decompiler: &dyn Decompiler,
        back_buffer_desc: RenderTargetDesc,
        scene: &Scene,
        settings: Settings,
        passes: &[&dyn FrameGraphPass],
    ) -> Result<()> {
        let back_buffer = self.realise_back_buffer(device, back_buffer_desc)?;

        let initial_slots = self
            .persisted_slots
            .iter()
            .map(|(slot, id)| (*slot, *id))
            .collect();
        let builder = FrameGraphBuilder::new(
            back_buffer_desc,
            device.info(),
            scene,
            settings,
            self.next_persistent_id,
            initial_slots,
        );
        for pass in passes {
            builder.begin_pass(pass.name())?;
            pass.setup(&builder)?;
            builder.finish_pass()?;
        }
        let (pass_records, persisted_ids, slots, next_id) = builder.into_parts();
        self.next_persistent_id = next_id;

        let mut resources: FxHashMap<FrameGraphResource, Realized> = self.persisted.clone();
        resources.insert(BACK_BUFFER, Realized::RenderTarget(back_buffer));

        for pass in &pass_records {
            log::debug!("frame graph: realising pass `{}`", pass.name);
            self.realise_pass(device, decompiler, pass, &mut resources)?;
            log::debug!("frame graph: executing pass `{}`", pass.name);
            execute_pass(device, pass, &resources)?;
        }

        let persisted_ids: std::collections::HashSet<FrameGraphResource> =
            persisted_ids.into_iter().collect();
        let mut carried = FxHashMap::default();
        for id in &persisted_ids {
            if let Some(realized) = resources.get(id) {
                carried.insert(*id, realized.clone());
            }
        }
        log::debug!(
            "frame graph: {} resource(s) persisted into next frame",
            carried.len()
        );
        self.persisted = carried;

        // A slot only survives into the next frame if the resource it names
        // is itself persisted — a slot assigned to a transient resource that
        // this frame drops is not readable next frame either (§4.I).
        self.persisted_slots = slots
            .into_iter()
            .filter(|(_, id)| persisted_ids.contains(id))
            .collect();

        Ok(())
    }

    fn realise_back_buffer(
        &mut self,
        device: &Device,
        desc: RenderTargetDesc,
    ) -> Result<Rc<Handle<dyn RenderTargetObject>>> {
        if let Some((existing_desc, handle)) = &self.back_buffer {
            if *existing_desc == desc {
                return Ok(handle.clone());
            }
        }
        log::debug!("frame graph: (re)creating back buffer: {:?}", desc);
        let handle = Rc::new(device.create_render_target(desc)?);
        self.back_buffer = Some((desc, handle.clone()));
        Ok(handle)
    }

    fn realise_pass(
        &self,
        device: &Device,
        decompiler: &dyn Decompiler,
        pass: &PassRecord,
        resources: &mut FxHashMap<FrameGraphResource, Realized>,
    ) -> Result<()> {
        for command in &pass.commands {
            match command {
                FrameGraphCommand::Create { id, creation } => {
                    let realized = realise_creation(device, decompiler, creation, resources)?;
                    resources.insert(*id, realized);
                }
                FrameGraphCommand::Upload { target, source } => {
                    let bytes = source();
                    let realized = lookup(resources, *target)?;
                    write_bytes(realized, &bytes)?;
                    device.record_upload_bytes(bytes.len() as u64);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn realise_creation(
    device: &Device,
    decompiler: &dyn Decompiler,
    creation: &ResourceCreation,
    resources: &FxHashMap<FrameGraphResource, Realized>,
) -> Result<Realized> {
    Ok(match creation {
        ResourceCreation::VertexBuffer(desc) => {
            Realized::VertexBuffer(Rc::new(device.create_vertex_buffer(*desc)?))
        }
        ResourceCreation::IndexBuffer(desc) => {
            Realized::IndexBuffer(Rc::new(device.create_index_buffer(*desc)?))
        }
        ResourceCreation::UniformBuffer(desc) => {
            Realized::UniformBuffer(Rc::new(device.create_shader_uniform_buffer(*desc)?))
        }
        ResourceCreation::StorageBuffer(desc) => {
            Realized::StorageBuffer(Rc::new(device.create_shader_storage_buffer(*desc)?))
        }
        ResourceCreation::TextureBuffer(desc) => {
            Realized::TextureBuffer(Rc::new(device.create_texture_buffer(*desc)?))
        }
        ResourceCreation::TextureArrayBuffer(desc) => {
            Realized::TextureArrayBuffer(Rc::new(device.create_texture_array_buffer(*desc)?))
        }
        ResourceCreation::VertexArrayObject {
            desc,
            vertex_buffer,
            index_buffer,
            instance_buffer,
        } => {
            let vb = lookup(resources, *vertex_buffer)?.vertex_buffer()?;
            let ib = index_buffer
                .map(|id| lookup(resources, id).and_then(Realized::index_buffer))
                .transpose()?;
            let inst = instance_buffer
                .map(|id| lookup(resources, id).and_then(Realized::vertex_buffer))
                .transpose()?;
            let buffers = VertexArrayObjectBuffers {
                vertex_buffer: vb,
                index_buffer: ib,
                instance_buffer: inst,
            };
            Realized::VertexArrayObject(Rc::new(
                device.create_vertex_array_object(desc.clone(), buffers)?,
            ))
        }
        ResourceCreation::RenderTarget(desc) => {
            Realized::RenderTarget(Rc::new(device.create_render_target(*desc)?))
        }
        ResourceCreation::RenderPass(desc) => {
            Realized::RenderPass(Rc::new(device.create_render_pass(*desc)?))
        }
        ResourceCreation::RenderPipeline(desc) => Realized::RenderPipeline(Rc::new(
            device.create_render_pipeline(desc.clone(), decompiler)?,
        )),
        ResourceCreation::ComputePipeline(desc) => Realized::ComputePipeline(Rc::new(
            device.create_compute_pipeline(desc.clone(), decompiler)?,
        )),
    })
}

fn write_bytes(realized: &Realized, bytes: &[u8]) -> Result<()> {
    match realized {
        Realized::VertexBuffer(h) => h.write(0, bytes),
        Realized::IndexBuffer(h) => h.write(0, bytes),
        Realized::UniformBuffer(h) => h.write(0, bytes),
        Realized::StorageBuffer(h) => h.write(0, bytes),
        Realized::TextureBuffer(h) => h.write(0, bytes),
        Realized::TextureArrayBuffer(h) => h.write(0, bytes),
        _ => Err(Error::InvalidState(
            "upload target is not a writable buffer or texture resource",
        )),
    }
}

/// Translates one pass's remaining recorded commands into a real
/// [`CommandBuffer`] and submits it to the device's first render queue
/// (§4.G: the reference backend puts its one queue in both the render and
/// compute lists, so render and compute passes share a queue here too).
fn execute_pass(
    device: &Device,
    pass: &PassRecord,
    resources: &FxHashMap<FrameGraphResource, Realized>,
) -> Result<()> {
    let mut buffer = CommandBuffer::new();
    buffer.begin()?;

    for command in &pass.commands {
        match translate(command, resources)? {
            Some(real) => buffer.add(real)?,
            None => {}
        }
    }

    buffer.end()?;

    let queue = device
        .render_queues()
        .first()
        .ok_or(Error::InvalidState("device has no render queue"))?;
    queue.borrow().submit(&[buffer], &[], &[])?;
    Ok(())
}

fn translate<'r>(
    command: &FrameGraphCommand,
    resources: &'r FxHashMap<FrameGraphResource, Realized>,
) -> Result<Option<Command<'r>>> {
    Ok(Some(match command {
        FrameGraphCommand::Create { .. }
        | FrameGraphCommand::Upload { .. }
        | FrameGraphCommand::Persist(_)
        | FrameGraphCommand::AssignSlot(_, _) => return Ok(None),

        FrameGraphCommand::Copy {
            kind,
            source,
            target,
            read_offset,
            write_offset,
            count,
        } => translate_copy(*kind, *source, *target, *read_offset, *write_offset, *count, resources)?,

        FrameGraphCommand::BlitColor(decl) => Command::BlitColor(BlitCommand {
            source: lookup(resources, decl.source)?.texture_buffer()?,
            target: lookup(resources, decl.target)?.texture_buffer()?,
            source_offset: decl.source_offset,
            source_extent: decl.source_extent,
            target_offset: decl.target_offset,
            target_extent: decl.target_extent,
            filter: decl.filter,
        }),
        FrameGraphCommand::BlitDepth(decl) => Command::BlitDepth(BlitCommand {
            source: lookup(resources, decl.source)?.texture_buffer()?,
            target: lookup(resources, decl.target)?.texture_buffer()?,
            source_offset: decl.source_offset,
            source_extent: decl.source_extent,
            target_offset: decl.target_offset,
            target_extent: decl.target_extent,
            filter: decl.filter,
        }),
        FrameGraphCommand::BlitStencil(decl) => Command::BlitStencil(BlitCommand {
            source: lookup(resources, decl.source)?.texture_buffer()?,
            target: lookup(resources, decl.target)?.texture_buffer()?,
            source_offset: decl.source_offset,
            source_extent: decl.source_extent,
            target_offset: decl.target_offset,
            target_extent: decl.target_extent,
            filter: decl.filter,
        }),

        FrameGraphCommand::BeginPass { pass, target } => Command::BeginPass(BeginPassCommand {
            pass: lookup(resources, *pass)?.render_pass()?,
            target: lookup(resources, *target)?.render_target()?,
        }),
        FrameGraphCommand::FinishPass => Command::EndPass,
        FrameGraphCommand::ClearColor(color) => Command::ClearColor(*color),
        FrameGraphCommand::ClearDepth(depth) => Command::ClearDepth(*depth),
        FrameGraphCommand::SetViewport { offset, size } => Command::SetViewport(ViewportCommand {
            offset: *offset,
            size: *size,
        }),
        FrameGraphCommand::BindPipeline(id) => {
            Command::BindPipeline(lookup(resources, *id)?.render_pipeline()?)
        }
        FrameGraphCommand::BindVertexBuffers(id) => {
            Command::BindVertexArrayObject(lookup(resources, *id)?.vertex_array_object()?)
        }
        FrameGraphCommand::BindShaderResources(bindings) => {
            let mut resolved = Vec::with_capacity(bindings.len());
            for binding in bindings {
                let realized = lookup(resources, binding.resource)?;
                let resource = match binding.kind {
                    crate::pipeline::BindingKind::Texture => {
                        ShaderResourceRef::Texture(realized.texture_buffer()?)
                    }
                    crate::pipeline::BindingKind::TextureArray => {
                        ShaderResourceRef::TextureArray(realized.texture_array_buffer()?)
                    }
                    crate::pipeline::BindingKind::UniformBuffer => {
                        ShaderResourceRef::Uniform(realized.uniform_buffer()?)
                    }
                    crate::pipeline::BindingKind::StorageBuffer => {
                        ShaderResourceRef::Storage(realized.storage_buffer()?)
                    }
                };
                resolved.push(ShaderResourceBinding {
                    resource,
                    access: binding.access.clone(),
                });
            }
            Command::BindShaderResources(resolved)
        }
        FrameGraphCommand::DrawArray(call) => Command::DrawArray(*call),
        FrameGraphCommand::DrawIndexed(call) => Command::DrawIndexed(*call),
        FrameGraphCommand::DrawArrayInstanced { call, instance_count } => {
            Command::DrawArrayInstanced {
                call: *call,
                instance_count: *instance_count,
            }
        }
        FrameGraphCommand::DrawIndexedInstanced { call, instance_count } => {
            Command::DrawIndexedInstanced {
                call: *call,
                instance_count: *instance_count,
            }
        }
        FrameGraphCommand::DrawArrayMulti(calls) => Command::DrawArrayMulti(calls.clone()),
        FrameGraphCommand::DrawIndexedMulti(calls) => Command::DrawIndexedMulti(calls.clone()),
        FrameGraphCommand::DrawIndexedBaseVertex { call, base_vertex } => {
            Command::DrawIndexedBaseVertex {
                call: *call,
                base_vertex: *base_vertex,
            }
        }
        FrameGraphCommand::DrawIndexedInstancedBaseVertex {
            call,
            instance_count,
            base_vertex,
        } => Command::DrawIndexedInstancedBaseVertex {
            call: *call,
            instance_count: *instance_count,
            base_vertex: *base_vertex,
        },
        FrameGraphCommand::DrawIndexedMultiBaseVertex { calls, base_vertices } => {
            Command::DrawIndexedMultiBaseVertex {
                calls: calls.clone(),
                base_vertices: base_vertices.clone(),
            }
        }
        FrameGraphCommand::ComputeBindPipeline(id) => {
            Command::ComputeBindPipeline(lookup(resources, *id)?.compute_pipeline()?)
        }
        FrameGraphCommand::DispatchCompute(groups) => {
            Command::ComputeExecute(ComputeExecuteCommand { num_groups: *groups })
        }
        FrameGraphCommand::DebugBeginGroup(name) => Command::DebugBeginGroup(name.clone()),
        FrameGraphCommand::DebugEndGroup => Command::DebugEndGroup,
    }))
}

#[allow(clippy::too_many_arguments)]
fn translate_copy<'r>(
    kind: CopyResourceKind,
    source: FrameGraphResource,
    target: FrameGraphResource,
    read_offset: u64,
    write_offset: u64,
    count: u64,
    resources: &'r FxHashMap<FrameGraphResource, Realized>,
) -> Result<Command<'r>> {
    macro_rules! copy_command {
        ($variant:ident, $accessor:ident) => {{
            let source = lookup(resources, source)?.$accessor()?;
            let target = lookup(resources, target)?.$accessor()?;
            Command::$variant(CopyCommand {
                source,
                target,
                read_offset,
                write_offset,
                count,
            })
        }};
    }
    Ok(match kind {
        CopyResourceKind::VertexBuffer => copy_command!(CopyVertexBuffer, vertex_buffer),
        CopyResourceKind::IndexBuffer => copy_command!(CopyIndexBuffer, index_buffer),
        CopyResourceKind::UniformBuffer => {
            copy_command!(CopyShaderUniformBuffer, uniform_buffer)
        }
        CopyResourceKind::StorageBuffer => {
            copy_command!(CopyShaderStorageBuffer, storage_buffer)
        }
        CopyResourceKind::TextureBuffer => copy_command!(CopyTexture, texture_buffer),
        CopyResourceKind::TextureArrayBuffer => {
            copy_command!(CopyTextureArray, texture_array_buffer)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::buffer::VertexBufferDesc;
    use crate::descriptor::{BufferType, ColorRgba, Extent2};
    use crate::render_pass::RenderPassDesc;
    use crate::scene::Scene;
    use crate::settings::Settings;
    use crate::shader::NoDecompiler;

    struct ClearScreen;

    impl FrameGraphPass for ClearScreen {
        fn name(&self) -> &str {
            "clear_screen"
        }

        fn setup(&self, builder: &FrameGraphBuilder<'_>) -> Result<()> {
            let pass = builder.create_render_pass(RenderPassDesc {
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            });
            builder.begin_render_pass(pass, builder.back_buffer())?;
            builder.clear_color(ColorRgba::new(1.0, 0.0, 0.0, 1.0))?;
            builder.finish_render_pass()?;
            Ok(())
        }
    }

    fn back_buffer_desc() -> RenderTargetDesc {
        RenderTargetDesc {
            size: Extent2::new(64, 64),
            multisample: false,
            samples: 1,
            num_color_attachments: 1,
            has_depth_stencil_attachment: false,
        }
    }

    #[test]
    fn executes_a_single_pass_against_the_back_buffer() {
        let device = Device::new(Rc::new(MockBackend::new()));
        let mut allocator = FrameGraphAllocator::new();
        let scene = Scene::default();
        let pass = ClearScreen;
        let passes: Vec<&dyn FrameGraphPass> = vec![&pass];

        allocator
            .execute_frame(
                &device,
                &NoDecompiler,
                back_buffer_desc(),
                &scene,
                Settings::default(),
                &passes,
            )
            .unwrap();

        assert!(allocator.back_buffer.is_some());
    }

    struct PersistOneBuffer;

    impl FrameGraphPass for PersistOneBuffer {
        fn name(&self) -> &str {
            "persist_one_buffer"
        }

        fn setup(&self, builder: &FrameGraphBuilder<'_>) -> Result<()> {
            let buf = builder.create_vertex_buffer(VertexBufferDesc {
                size: 64,
                buffer_type: BufferType::DeviceLocal,
            });
            builder.persist(buf)?;
            builder.assign_slot(FrameGraphSlot::User(0), buf)?;
            Ok(())
        }
    }

    #[test]
    fn persisted_resources_carry_into_the_allocator_between_frames() {
        let device = Device::new(Rc::new(MockBackend::new()));
        let mut allocator = FrameGraphAllocator::new();
        let scene = Scene::default();
        let pass = PersistOneBuffer;
        let passes: Vec<&dyn FrameGraphPass> = vec![&pass];

        allocator
            .execute_frame(
                &device,
                &NoDecompiler,
                back_buffer_desc(),
                &scene,
                Settings::default(),
                &passes,
            )
            .unwrap();
        assert_eq!(allocator.persisted.len(), 1);

        allocator
            .execute_frame(
                &device,
                &NoDecompiler,
                back_buffer_desc(),
                &scene,
                Settings::default(),
                &passes,
            )
            .unwrap();
        assert_eq!(allocator.persisted.len(), 1);
    }

    struct ReadSlotZero;

    impl FrameGraphPass for ReadSlotZero {
        fn name(&self) -> &str {
            "read_slot_zero"
        }

        fn setup(&self, builder: &FrameGraphBuilder<'_>) -> Result<()> {
            builder.get_slot(FrameGraphSlot::User(0))?;
            Ok(())
        }
    }

    /// §4.I: a slot assigned by a pass that only runs on the first frame
    /// still resolves for a pass reading it on the second frame, because its
    /// resource was persisted.
    #[test]
    fn slot_assigned_in_one_frame_resolves_in_the_next_frame_without_reassignment() {
        let device = Device::new(Rc::new(MockBackend::new()));
        let mut allocator = FrameGraphAllocator::new();
        let scene = Scene::default();

        let write_pass = PersistOneBuffer;
        allocator
            .execute_frame(
                &device,
                &NoDecompiler,
                back_buffer_desc(),
                &scene,
                Settings::default(),
                &[&write_pass],
            )
            .unwrap();
        assert_eq!(allocator.persisted_slots.len(), 1);

        let read_pass = ReadSlotZero;
        allocator
            .execute_frame(
                &device,
                &NoDecompiler,
                back_buffer_desc(),
                &scene,
                Settings::default(),
                &[&read_pass],
            )
            .unwrap();
        assert_eq!(allocator.persisted_slots.len(), 1);
    }
}
