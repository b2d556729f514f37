//! The frame-graph builder: the declarative API a pass's `setup` closure
//! records against (§4.H). Nothing here touches a device; every call appends
//! a [`FrameGraphCommand`] to the currently open pass and returns the
//! [`FrameGraphResource`] id the allocator will later realise.

use crate::buffer::{IndexBufferDesc, StorageBufferDesc, UniformBufferDesc, VertexBufferDesc};
use crate::command::{ArrayDrawCall, IndexedDrawCall};
use crate::descriptor::{ColorRgba, Extent2, TextureFiltering, Vec2i};
use crate::device::DeviceInfo;
use crate::error::{Error, Result};
use crate::frame_graph::resource::{
    BlitDecl, CopyResourceKind, FrameGraphCommand, FrameGraphShaderResourceBinding, PassRecord,
    ResourceCreation, UploadSource,
};
use crate::frame_graph::slot::FrameGraphSlot;
use crate::pipeline::{ComputePipelineDesc, RenderPipelineDesc};
use crate::render_pass::RenderPassDesc;
use crate::render_target::RenderTargetDesc;
use crate::scene::Scene;
use crate::settings::Settings;
use crate::texture::{TextureArrayBufferDesc, TextureBufferDesc};
use crate::vao::VertexArrayObjectDesc;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use super::resource::FrameGraphResource;

/// The reserved id of the swap chain's back buffer, bound by the allocator
/// before any pass runs (§4.H "the back buffer is always resource 0").
pub const BACK_BUFFER: FrameGraphResource = FrameGraphResource(0);

/// Accumulates one frame's passes. Constructed once per frame with the scene
/// to read, the settings in effect, the device's capabilities, and whichever
/// handles were `persist`ed out of the previous frame (§4.H, §4.I).
pub struct FrameGraphBuilder<'a> {
    scene: &'a Scene,
    settings: Settings,
    device_info: DeviceInfo,
    back_buffer_desc: RenderTargetDesc,
    next_id: Cell<u64>,
    passes: RefCell<Vec<PassRecord>>,
    current: RefCell<Option<PassRecord>>,
    persisted: RefCell<Vec<FrameGraphResource>>,
    slots: RefCell<BTreeMap<FrameGraphSlot, FrameGraphResource>>,
    assigned_this_frame: RefCell<BTreeSet<FrameGraphSlot>>,
}

impl<'a> FrameGraphBuilder<'a> {
    /// `next_persistent_id` is the first id the allocator has not already
    /// handed out to a handle carried over from the previous frame, so fresh
    /// ids never collide with persisted ones (§4.H "Resource identity").
    /// `initial_slots` seeds this frame's slot table with whatever the
    /// allocator carried forward from the last frame a slot's resource was
    /// assigned in (§4.I "slot reads... resolve to the upstream producer's
    /// frame handle") — a slot assigned by a pass that doesn't run every
    /// frame must still resolve for a pass that reads it this frame.
    pub fn new(
        back_buffer_desc: RenderTargetDesc,
        device_info: DeviceInfo,
        scene: &'a Scene,
        settings: Settings,
        next_persistent_id: u64,
        initial_slots: BTreeMap<FrameGraphSlot, FrameGraphResource>,
    ) -> FrameGraphBuilder<'a> {
        FrameGraphBuilder {
            scene,
            settings,
            device_info,
            back_buffer_desc,
            next_id: Cell::new(next_persistent_id.max(1)),
            passes: RefCell::new(Vec::new()),
            current: RefCell::new(None),
            persisted: RefCell::new(Vec::new()),
            slots: RefCell::new(initial_slots),
            assigned_this_frame: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.device_info
    }

    pub fn back_buffer(&self) -> FrameGraphResource {
        BACK_BUFFER
    }

    /// The resolution passes should render at: the back buffer's size scaled
    /// by `Settings::render_scale` (§B.2 of the supplemented features).
    pub fn render_resolution(&self) -> Extent2 {
        self.back_buffer_desc.size.scaled(self.settings.render_scale)
    }

    fn fresh_id(&self) -> FrameGraphResource {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        FrameGraphResource(id)
    }

    fn record(&self, command: FrameGraphCommand) -> Result<()> {
        let mut current = self.current.borrow_mut();
        match current.as_mut() {
            Some(pass) => {
                pass.commands.push(command);
                Ok(())
            }
            None => Err(Error::InvalidState(
                "frame graph command recorded outside of begin_pass/finish_pass",
            )),
        }
    }

    fn create(&self, creation: ResourceCreation) -> FrameGraphResource {
        let id = self.fresh_id();
        // Infallible: begin_pass must always precede a create call, and a
        // caller that violates that gets the same InvalidState any other
        // out-of-pass recording would.
        let _ = self.record(FrameGraphCommand::Create { id, creation });
        id
    }

    /// Opens a new pass under `name`. Fails if a pass is already open.
    pub fn begin_pass(&self, name: impl Into<String>) -> Result<()> {
        if self.current.borrow().is_some() {
            return Err(Error::InvalidState("begin_pass called before the previous pass finished"));
        }
        *self.current.borrow_mut() = Some(PassRecord {
            name: name.into(),
            commands: Vec::new(),
        });
        Ok(())
    }

    /// Closes the currently open pass and appends it to the frame's timeline.
    pub fn finish_pass(&self) -> Result<()> {
        let pass = self
            .current
            .borrow_mut()
            .take()
            .ok_or(Error::InvalidState("finish_pass called with no pass open"))?;
        self.passes.borrow_mut().push(pass);
        Ok(())
    }

    /// Consumes the builder, returning the recorded passes, the fresh ids it
    /// persisted, and the slot assignments made this frame. Called by the
    /// allocator once the scene's passes have all run their `setup` (§4.I).
    pub fn into_parts(
        self,
    ) -> (
        Vec<PassRecord>,
        Vec<FrameGraphResource>,
        BTreeMap<FrameGraphSlot, FrameGraphResource>,
        u64,
    ) {
        (
            self.passes.into_inner(),
            self.persisted.into_inner(),
            self.slots.into_inner(),
            self.next_id.get(),
        )
    }

    pub fn create_vertex_buffer(&self, desc: VertexBufferDesc) -> FrameGraphResource {
        self.create(ResourceCreation::VertexBuffer(desc))
    }

    pub fn create_index_buffer(&self, desc: IndexBufferDesc) -> FrameGraphResource {
        self.create(ResourceCreation::IndexBuffer(desc))
    }

    pub fn create_uniform_buffer(&self, desc: UniformBufferDesc) -> FrameGraphResource {
        self.create(ResourceCreation::UniformBuffer(desc))
    }

    pub fn create_storage_buffer(&self, desc: StorageBufferDesc) -> FrameGraphResource {
        self.create(ResourceCreation::StorageBuffer(desc))
    }

    pub fn create_texture(&self, desc: TextureBufferDesc) -> FrameGraphResource {
        self.create(ResourceCreation::TextureBuffer(desc))
    }

    pub fn create_texture_array(&self, desc: TextureArrayBufferDesc) -> FrameGraphResource {
        self.create(ResourceCreation::TextureArrayBuffer(desc))
    }

    pub fn create_vertex_array_object(
        &self,
        desc: VertexArrayObjectDesc,
        vertex_buffer: FrameGraphResource,
        index_buffer: Option<FrameGraphResource>,
        instance_buffer: Option<FrameGraphResource>,
    ) -> FrameGraphResource {
        self.create(ResourceCreation::VertexArrayObject {
            desc,
            vertex_buffer,
            index_buffer,
            instance_buffer,
        })
    }

    pub fn create_render_target(&self, desc: RenderTargetDesc) -> FrameGraphResource {
        self.create(ResourceCreation::RenderTarget(desc))
    }

    pub fn create_render_pass(&self, desc: RenderPassDesc) -> FrameGraphResource {
        self.create(ResourceCreation::RenderPass(desc))
    }

    pub fn create_render_pipeline(&self, desc: RenderPipelineDesc) -> FrameGraphResource {
        self.create(ResourceCreation::RenderPipeline(desc))
    }

    pub fn create_compute_pipeline(&self, desc: ComputePipelineDesc) -> FrameGraphResource {
        self.create(ResourceCreation::ComputePipeline(desc))
    }

    /// Defers a CPU-side data fetch into the allocator's execution phase
    /// (§4.H: "permits deferring large CPU work"). `source` must be pure.
    pub fn upload(&self, target: FrameGraphResource, source: impl Fn() -> Vec<u8> + 'static) -> Result<()> {
        self.record(FrameGraphCommand::Upload {
            target,
            source: std::rc::Rc::new(source) as UploadSource,
        })
    }

    pub fn copy(
        &self,
        kind: CopyResourceKind,
        source: FrameGraphResource,
        target: FrameGraphResource,
        read_offset: u64,
        write_offset: u64,
        count: u64,
    ) -> Result<()> {
        self.record(FrameGraphCommand::Copy {
            kind,
            source,
            target,
            read_offset,
            write_offset,
            count,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn blit_color(
        &self,
        source: FrameGraphResource,
        target: FrameGraphResource,
        source_offset: Vec2i,
        source_extent: Extent2,
        target_offset: Vec2i,
        target_extent: Extent2,
        filter: TextureFiltering,
    ) -> Result<()> {
        self.record(FrameGraphCommand::BlitColor(BlitDecl {
            source,
            target,
            source_offset,
            source_extent,
            target_offset,
            target_extent,
            filter,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn blit_depth(
        &self,
        source: FrameGraphResource,
        target: FrameGraphResource,
        source_offset: Vec2i,
        source_extent: Extent2,
        target_offset: Vec2i,
        target_extent: Extent2,
        filter: TextureFiltering,
    ) -> Result<()> {
        self.record(FrameGraphCommand::BlitDepth(BlitDecl {
            source,
            target,
            source_offset,
            source_extent,
            target_offset,
            target_extent,
            filter,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn blit_stencil(
        &self,
        source: FrameGraphResource,
        target: FrameGraphResource,
        source_offset: Vec2i,
        source_extent: Extent2,
        target_offset: Vec2i,
        target_extent: Extent2,
        filter: TextureFiltering,
    ) -> Result<()> {
        self.record(FrameGraphCommand::BlitStencil(BlitDecl {
            source,
            target,
            source_offset,
            source_extent,
            target_offset,
            target_extent,
            filter,
        }))
    }

    pub fn begin_render_pass(&self, pass: FrameGraphResource, target: FrameGraphResource) -> Result<()> {
        self.record(FrameGraphCommand::BeginPass { pass, target })
    }

    pub fn finish_render_pass(&self) -> Result<()> {
        self.record(FrameGraphCommand::FinishPass)
    }

    pub fn clear_color(&self, color: ColorRgba) -> Result<()> {
        self.record(FrameGraphCommand::ClearColor(color))
    }

    pub fn clear_depth(&self, depth: f32) -> Result<()> {
        self.record(FrameGraphCommand::ClearDepth(depth))
    }

    pub fn set_viewport(&self, offset: Vec2i, size: Extent2) -> Result<()> {
        self.record(FrameGraphCommand::SetViewport { offset, size })
    }

    pub fn bind_pipeline(&self, pipeline: FrameGraphResource) -> Result<()> {
        self.record(FrameGraphCommand::BindPipeline(pipeline))
    }

    pub fn bind_vertex_array_object(&self, vao: FrameGraphResource) -> Result<()> {
        self.record(FrameGraphCommand::BindVertexBuffers(vao))
    }

    pub fn bind_shader_resources(&self, bindings: Vec<FrameGraphShaderResourceBinding>) -> Result<()> {
        self.record(FrameGraphCommand::BindShaderResources(bindings))
    }

    pub fn draw_array(&self, offset: u32, count: u32) -> Result<()> {
        self.record(FrameGraphCommand::DrawArray(ArrayDrawCall { offset, count }))
    }

    pub fn draw_indexed(&self, call: IndexedDrawCall) -> Result<()> {
        self.record(FrameGraphCommand::DrawIndexed(call))
    }

    pub fn draw_array_instanced(&self, offset: u32, count: u32, instance_count: u32) -> Result<()> {
        self.record(FrameGraphCommand::DrawArrayInstanced {
            call: ArrayDrawCall { offset, count },
            instance_count,
        })
    }

    pub fn draw_indexed_instanced(&self, call: IndexedDrawCall, instance_count: u32) -> Result<()> {
        self.record(FrameGraphCommand::DrawIndexedInstanced { call, instance_count })
    }

    pub fn draw_array_multi(&self, calls: Vec<ArrayDrawCall>) -> Result<()> {
        self.record(FrameGraphCommand::DrawArrayMulti(calls))
    }

    pub fn draw_indexed_multi(&self, calls: Vec<IndexedDrawCall>) -> Result<()> {
        self.record(FrameGraphCommand::DrawIndexedMulti(calls))
    }

    pub fn draw_indexed_base_vertex(&self, call: IndexedDrawCall, base_vertex: i32) -> Result<()> {
        self.record(FrameGraphCommand::DrawIndexedBaseVertex { call, base_vertex })
    }

    pub fn draw_indexed_instanced_base_vertex(
        &self,
        call: IndexedDrawCall,
        instance_count: u32,
        base_vertex: i32,
    ) -> Result<()> {
        self.record(FrameGraphCommand::DrawIndexedInstancedBaseVertex {
            call,
            instance_count,
            base_vertex,
        })
    }

    pub fn draw_indexed_multi_base_vertex(
        &self,
        calls: Vec<IndexedDrawCall>,
        base_vertices: Vec<i32>,
    ) -> Result<()> {
        self.record(FrameGraphCommand::DrawIndexedMultiBaseVertex { calls, base_vertices })
    }

    pub fn bind_compute_pipeline(&self, pipeline: FrameGraphResource) -> Result<()> {
        self.record(FrameGraphCommand::ComputeBindPipeline(pipeline))
    }

    pub fn dispatch_compute(&self, num_groups: [u32; 3]) -> Result<()> {
        self.record(FrameGraphCommand::DispatchCompute(num_groups))
    }

    pub fn begin_debug_group(&self, name: impl Into<String>) -> Result<()> {
        self.record(FrameGraphCommand::DebugBeginGroup(name.into()))
    }

    pub fn end_debug_group(&self) -> Result<()> {
        self.record(FrameGraphCommand::DebugEndGroup)
    }

    /// Marks `resource` to survive into next frame's `persisted` set
    /// (§4.H "Persistence across frames").
    pub fn persist(&self, resource: FrameGraphResource) -> Result<()> {
        self.persisted.borrow_mut().push(resource);
        self.record(FrameGraphCommand::Persist(resource))
    }

    /// Publishes `resource` under `slot` for this frame. Fails if the slot
    /// was already assigned earlier in the same frame (§4.H, GLOSSARY "Slot").
    /// A slot carried over from a previous frame (because its producer
    /// didn't run this frame) is not "already assigned" for this purpose —
    /// only an assignment recorded since this builder was constructed counts.
    pub fn assign_slot(&self, slot: FrameGraphSlot, resource: FrameGraphResource) -> Result<()> {
        if !self.assigned_this_frame.borrow_mut().insert(slot) {
            return Err(Error::UnboundSlot(slot));
        }
        self.slots.borrow_mut().insert(slot, resource);
        self.record(FrameGraphCommand::AssignSlot(slot, resource))
    }

    /// Reads a slot's value, failing if nothing has assigned it yet this
    /// frame (§4.H `getSlot`).
    pub fn get_slot(&self, slot: FrameGraphSlot) -> Result<FrameGraphResource> {
        self.slots
            .borrow()
            .get(&slot)
            .copied()
            .ok_or(Error::UnboundSlot(slot))
    }

    /// Non-failing query form of [`FrameGraphBuilder::get_slot`] (§4.H
    /// `checkSlot`, a supplemented convenience over the distilled API).
    pub fn check_slot(&self, slot: FrameGraphSlot) -> Option<FrameGraphResource> {
        self.slots.borrow().get(&slot).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Extent2;
    use crate::device::DeviceInfo;
    use crate::scene::Scene;

    fn test_builder(scene: &Scene) -> FrameGraphBuilder<'_> {
        FrameGraphBuilder::new(
            RenderTargetDesc {
                size: Extent2::new(64, 64),
                multisample: false,
                samples: 1,
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            },
            DeviceInfo {
                uniform_buffer_max: 16 * 1024,
                storage_buffer_max: 128 * 1024 * 1024,
                max_texture_array_size: 2048,
                max_anisotropy: 16.0,
            },
            scene,
            Settings::default(),
            1,
            BTreeMap::new(),
        )
    }

    /// §8 quantified invariant: a slot that is read but never written fails
    /// set-up with `UnboundSlot`.
    #[test]
    fn get_slot_on_unassigned_slot_fails() {
        let scene = Scene::default();
        let builder = test_builder(&scene);
        let err = builder.get_slot(FrameGraphSlot::ScreenColor).unwrap_err();
        assert!(matches!(err, Error::UnboundSlot(FrameGraphSlot::ScreenColor)));
        assert_eq!(builder.check_slot(FrameGraphSlot::ScreenColor), None);
    }

    /// §4.H / §7: reassigning an already-bound slot in the same frame fails.
    #[test]
    fn assigning_an_already_bound_slot_twice_fails() {
        let scene = Scene::default();
        let builder = test_builder(&scene);
        builder.begin_pass("p").unwrap();
        let a = builder.create_vertex_buffer(VertexBufferDesc {
            size: 16,
            buffer_type: crate::descriptor::BufferType::DeviceLocal,
        });
        let b = builder.create_vertex_buffer(VertexBufferDesc {
            size: 16,
            buffer_type: crate::descriptor::BufferType::DeviceLocal,
        });
        builder.assign_slot(FrameGraphSlot::User(1), a).unwrap();
        let err = builder.assign_slot(FrameGraphSlot::User(1), b).unwrap_err();
        assert!(matches!(err, Error::UnboundSlot(FrameGraphSlot::User(1))));
        assert_eq!(builder.get_slot(FrameGraphSlot::User(1)).unwrap(), a);
    }

    /// §4.I: a slot seeded from a previous frame (its producer pass did not
    /// run this frame) resolves via `get_slot` without this frame assigning
    /// it, and is still free to be reassigned once this frame.
    #[test]
    fn slot_seeded_from_previous_frame_resolves_and_can_be_reassigned_once() {
        let scene = Scene::default();
        let mut initial_slots = BTreeMap::new();
        let carried = FrameGraphResource(7);
        initial_slots.insert(FrameGraphSlot::User(2), carried);
        let builder = FrameGraphBuilder::new(
            RenderTargetDesc {
                size: Extent2::new(64, 64),
                multisample: false,
                samples: 1,
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            },
            DeviceInfo {
                uniform_buffer_max: 16 * 1024,
                storage_buffer_max: 128 * 1024 * 1024,
                max_texture_array_size: 2048,
                max_anisotropy: 16.0,
            },
            &scene,
            Settings::default(),
            8,
            initial_slots,
        );

        assert_eq!(builder.get_slot(FrameGraphSlot::User(2)).unwrap(), carried);

        builder.begin_pass("p").unwrap();
        let fresh = builder.create_vertex_buffer(VertexBufferDesc {
            size: 16,
            buffer_type: crate::descriptor::BufferType::DeviceLocal,
        });
        builder.assign_slot(FrameGraphSlot::User(2), fresh).unwrap();
        assert_eq!(builder.get_slot(FrameGraphSlot::User(2)).unwrap(), fresh);

        let err = builder.assign_slot(FrameGraphSlot::User(2), fresh).unwrap_err();
        assert!(matches!(err, Error::UnboundSlot(FrameGraphSlot::User(2))));
    }

    /// §4.H: render resolution is the back buffer's size scaled by
    /// `Settings::render_scale`.
    #[test]
    fn render_resolution_scales_the_back_buffer_size() {
        let scene = Scene::default();
        let mut builder = test_builder(&scene);
        builder.settings.render_scale = 0.5;
        assert_eq!(builder.render_resolution(), Extent2::new(32, 32));
    }
}
