//! End-to-end scenarios driven against the in-memory mock backend: a render
//! pipeline drawing real geometry, the validation failures a queue submit is
//! expected to catch, and a frame graph carrying a resource across frames.
//!
//! Requires the `mock-backend` feature: `cargo test --features mock-backend`.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use vex_gpu::backend::mock::MockBackend;
use vex_gpu::buffer::{IndexBufferDesc, UniformBufferDesc, VertexBufferDesc};
use vex_gpu::command::{
    AccessMode, ArrayDrawCall, IndexType, IndexedDrawCall, ShaderResourceBinding, ShaderResourceRef,
};
use vex_gpu::descriptor::{BufferType, ColorRgba, Extent2, Vec2i};
use vex_gpu::device::Device;
use vex_gpu::error::{CapacityKind, Error};
use vex_gpu::frame_graph::{FrameGraphAllocator, FrameGraphBuilder, FrameGraphPass, FrameGraphSlot};
use vex_gpu::pipeline::{BindingKind, PrimitiveTopology, RenderPipelineDesc, ShaderStage};
use vex_gpu::render_pass::{RenderPass, RenderPassDesc};
use vex_gpu::render_target::RenderTargetDesc;
use vex_gpu::scene::Scene;
use vex_gpu::settings::Settings;
use vex_gpu::shader::{NoDecompiler, ShaderStageDesc};
use vex_gpu::texture::TextureBufferDesc;
use vex_gpu::vao::{AttributeShape, ComponentType, VertexArrayObjectBuffers, VertexArrayObjectDesc, VertexAttribute, VertexLayout};

fn mock_device() -> Device {
    Device::new(Rc::new(MockBackend::new()))
}

fn passthrough_shader(entry_point: &str) -> ShaderStageDesc {
    ShaderStageDesc::new(Arc::from(&b"not-spirv"[..]), entry_point)
}

fn pos3_layout() -> VertexLayout {
    VertexLayout::new(
        12,
        vec![VertexAttribute {
            shape: AttributeShape::Vec3,
            component_type: ComponentType::F32,
            offset: 0,
        }],
    )
}

fn single_color_target(width: u32, height: u32, depth_stencil: bool) -> RenderTargetDesc {
    RenderTargetDesc {
        size: Extent2::new(width, height),
        multisample: false,
        samples: 1,
        num_color_attachments: 1,
        has_depth_stencil_attachment: depth_stencil,
    }
}

fn basic_render_pipeline(vertex_layout: VertexLayout, instance_array_layout: Option<VertexLayout>) -> RenderPipelineDesc {
    let mut shader_stages = BTreeMap::new();
    shader_stages.insert(ShaderStage::Vertex, passthrough_shader("vs_main"));
    shader_stages.insert(ShaderStage::Fragment, passthrough_shader("fs_main"));
    RenderPipelineDesc {
        shader_stages,
        bindings: Vec::new(),
        primitive: PrimitiveTopology::Triangles,
        vertex_layout,
        instance_array_layout,
        face_culling: vex_gpu::descriptor::FaceCullingMode::None,
        winding: vex_gpu::descriptor::Winding::CounterClockwise,
        depth: Default::default(),
        stencil: Default::default(),
        blend: Default::default(),
        multisample: Default::default(),
    }
}

/// Scenario 1: a single triangle draws once and counts as one polygon.
#[test]
fn single_triangle_records_one_draw_call_and_one_polygon() {
    let device = mock_device();

    let vertex_buffer = device
        .create_vertex_buffer(VertexBufferDesc {
            size: 3 * 12,
            buffer_type: BufferType::HostVisible,
        })
        .unwrap();
    vertex_buffer
        .write(0, bytemuck_triangle_bytes())
        .unwrap();

    let vao = device
        .create_vertex_array_object(
            VertexArrayObjectDesc {
                vertex_layout: pos3_layout(),
                instance_array_layout: None,
            },
            VertexArrayObjectBuffers {
                vertex_buffer: &vertex_buffer,
                index_buffer: None,
                instance_buffer: None,
            },
        )
        .unwrap();

    let pipeline = device
        .create_render_pipeline(basic_render_pipeline(pos3_layout(), None), &NoDecompiler)
        .unwrap();

    let pass_desc = RenderPassDesc {
        num_color_attachments: 1,
        has_depth_stencil_attachment: false,
    };
    let pass = device.create_render_pass(pass_desc).unwrap();
    let target = device.create_render_target(single_color_target(64, 64, false)).unwrap();

    let render_pass = RenderPass(&pass);
    let mut buffer = device.create_command_buffer();
    buffer.begin().unwrap();
    buffer.add(render_pass.begin(&target)).unwrap();
    buffer.add(render_pass.clear_color_attachments(ColorRgba::new(0.0, 0.0, 0.0, 1.0))).unwrap();
    buffer.add(render_pass.set_viewport(Vec2i::new(0, 0), Extent2::new(64, 64))).unwrap();
    buffer.add(vex_gpu::command::Command::BindPipeline(&pipeline)).unwrap();
    buffer.add(vex_gpu::command::Command::BindVertexArrayObject(&vao)).unwrap();
    buffer
        .add(vex_gpu::command::Command::DrawArray(ArrayDrawCall { offset: 0, count: 3 }))
        .unwrap();
    buffer.add(render_pass.end()).unwrap();
    buffer.end().unwrap();

    let queue = device.render_queues()[0].clone();
    queue.borrow().submit(&[buffer], &[], &[]).unwrap();

    let stats = device.frame_stats();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.polys, 1);
}

fn bytemuck_triangle_bytes() -> &'static [u8] {
    // (-1,-1,0),(1,-1,0),(0,1,0) as f32 triples, little-endian.
    const BYTES: [u8; 36] = {
        let v: [f32; 9] = [-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0];
        unsafe { std::mem::transmute(v) }
    };
    &BYTES
}

/// Scenario 2: instanced indexed draw of a quad over 10 instances counts
/// 10 * (6 indices / 3 per triangle) = 20 polygons.
#[test]
fn indexed_instancing_counts_polys_per_instance() {
    let device = mock_device();

    let vertex_buffer = device
        .create_vertex_buffer(VertexBufferDesc {
            size: 4 * 12,
            buffer_type: BufferType::HostVisible,
        })
        .unwrap();
    let index_buffer = device
        .create_index_buffer(IndexBufferDesc {
            size: 6 * 4,
            buffer_type: BufferType::HostVisible,
        })
        .unwrap();
    let instance_buffer = device
        .create_vertex_buffer(VertexBufferDesc {
            size: 10 * 64,
            buffer_type: BufferType::HostVisible,
        })
        .unwrap();

    let instance_layout = VertexLayout::new(
        64,
        vec![VertexAttribute {
            shape: AttributeShape::Mat4,
            component_type: ComponentType::F32,
            offset: 0,
        }],
    );

    let vao = device
        .create_vertex_array_object(
            VertexArrayObjectDesc {
                vertex_layout: pos3_layout(),
                instance_array_layout: Some(instance_layout.clone()),
            },
            VertexArrayObjectBuffers {
                vertex_buffer: &vertex_buffer,
                index_buffer: Some(&index_buffer),
                instance_buffer: Some(&instance_buffer),
            },
        )
        .unwrap();

    let pipeline = device
        .create_render_pipeline(
            basic_render_pipeline(pos3_layout(), Some(instance_layout)),
            &NoDecompiler,
        )
        .unwrap();

    let pass = device
        .create_render_pass(RenderPassDesc {
            num_color_attachments: 1,
            has_depth_stencil_attachment: false,
        })
        .unwrap();
    let target = device.create_render_target(single_color_target(64, 64, false)).unwrap();
    let render_pass = RenderPass(&pass);

    let mut buffer = device.create_command_buffer();
    buffer.begin().unwrap();
    buffer.add(render_pass.begin(&target)).unwrap();
    buffer.add(vex_gpu::command::Command::BindPipeline(&pipeline)).unwrap();
    buffer.add(vex_gpu::command::Command::BindVertexArrayObject(&vao)).unwrap();
    buffer
        .add(vex_gpu::command::Command::DrawIndexedInstanced {
            call: IndexedDrawCall {
                offset: 0,
                count: 6,
                index_type: IndexType::U32,
            },
            instance_count: 10,
        })
        .unwrap();
    buffer.add(render_pass.end()).unwrap();
    buffer.end().unwrap();

    let queue = device.render_queues()[0].clone();
    queue.borrow().submit(&[buffer], &[], &[]).unwrap();

    let stats = device.frame_stats();
    assert_eq!(stats.polys, 20);
}

/// Scenario 3: an out-of-range buffer copy fails submission and transfers
/// nothing.
#[test]
fn out_of_range_copy_fails_and_transfers_nothing() {
    let device = mock_device();

    let src = device
        .create_vertex_buffer(VertexBufferDesc {
            size: 64,
            buffer_type: BufferType::HostVisible,
        })
        .unwrap();
    let dst = device
        .create_vertex_buffer(VertexBufferDesc {
            size: 64,
            buffer_type: BufferType::HostVisible,
        })
        .unwrap();

    let mut buffer = device.create_command_buffer();
    buffer.begin().unwrap();
    buffer
        .add(vex_gpu::command::Command::CopyVertexBuffer(vex_gpu::command::CopyCommand {
            source: &src,
            target: &dst,
            read_offset: 32,
            write_offset: 0,
            count: 64,
        }))
        .unwrap();
    buffer.end().unwrap();

    let queue = device.render_queues()[0].clone();
    let err = queue.borrow().submit(&[buffer], &[], &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));

    let stats = device.frame_stats();
    assert_eq!(stats.bytes_uploaded, 0);
    assert_eq!(stats.bytes_downloaded, 0);
}

/// Scenario 4: beginning a pass against a target whose attachment signature
/// doesn't match the pass fails with `IncompatibleTarget`.
#[test]
fn attachment_signature_mismatch_fails_begin_pass() {
    let device = mock_device();

    let pass = device
        .create_render_pass(RenderPassDesc {
            num_color_attachments: 1,
            has_depth_stencil_attachment: true,
        })
        .unwrap();
    let target = device
        .create_render_target(single_color_target(64, 64, false).with_two_color_attachments())
        .unwrap();
    let render_pass = RenderPass(&pass);

    let mut buffer = device.create_command_buffer();
    buffer.begin().unwrap();
    buffer.add(render_pass.begin(&target)).unwrap();
    buffer.end().unwrap();

    let queue = device.render_queues()[0].clone();
    let err = queue.borrow().submit(&[buffer], &[], &[]).unwrap_err();
    assert!(matches!(err, Error::IncompatibleTarget { .. }));
}

trait WithTwoColorAttachments {
    fn with_two_color_attachments(self) -> Self;
}

impl WithTwoColorAttachments for RenderTargetDesc {
    fn with_two_color_attachments(mut self) -> Self {
        self.num_color_attachments = 2;
        self
    }
}

/// Scenario 5: a texture persisted and slotted in one frame is visible to
/// the next frame's pass under the same slot.
#[test]
fn persisted_texture_survives_into_the_next_frame_via_a_slot() {
    struct WriteRedToTexture;

    impl FrameGraphPass for WriteRedToTexture {
        fn name(&self) -> &str {
            "write_red_to_texture"
        }

        fn setup(&self, builder: &FrameGraphBuilder<'_>) -> vex_gpu::error::Result<()> {
            let texture = builder.create_texture(TextureBufferDesc {
                size: Extent2::new(4, 4),
                ..Default::default()
            });
            builder.upload(texture, || vec![255u8, 0, 0, 255].repeat(16))?;
            builder.persist(texture)?;
            builder.assign_slot(FrameGraphSlot::User(300), texture)?;
            Ok(())
        }
    }

    struct ReadSlotIntoBackBuffer;

    impl FrameGraphPass for ReadSlotIntoBackBuffer {
        fn name(&self) -> &str {
            "read_slot_into_back_buffer"
        }

        fn setup(&self, builder: &FrameGraphBuilder<'_>) -> vex_gpu::error::Result<()> {
            let texture = builder.get_slot(FrameGraphSlot::User(300))?;
            let pass = builder.create_render_pass(RenderPassDesc {
                num_color_attachments: 1,
                has_depth_stencil_attachment: false,
            });
            builder.begin_render_pass(pass, builder.back_buffer())?;
            builder.bind_shader_resources(vec![vex_gpu::frame_graph::FrameGraphShaderResourceBinding {
                resource: texture,
                kind: BindingKind::Texture,
                access: {
                    let mut m = BTreeMap::new();
                    m.insert(ShaderStage::Fragment, AccessMode::Read);
                    m
                },
            }])?;
            builder.finish_render_pass()?;
            Ok(())
        }
    }

    let device = mock_device();
    let mut allocator = FrameGraphAllocator::new();
    let scene = Scene::default();
    let back_buffer_desc = single_color_target(4, 4, false);

    let write_pass = WriteRedToTexture;
    allocator
        .execute_frame(
            &device,
            &NoDecompiler,
            back_buffer_desc,
            &scene,
            Settings::default(),
            &[&write_pass],
        )
        .unwrap();

    let read_pass = ReadSlotIntoBackBuffer;
    allocator
        .execute_frame(
            &device,
            &NoDecompiler,
            back_buffer_desc,
            &scene,
            Settings::default(),
            &[&read_pass],
        )
        .unwrap();
}

/// Scenario 6: a uniform buffer over the device's advertised limit is
/// rejected before any handle is created.
#[test]
fn oversized_uniform_buffer_is_rejected_with_capacity_error() {
    let device = mock_device();
    let info = device.info();

    let err = device
        .create_shader_uniform_buffer(UniformBufferDesc {
            size: info.uniform_buffer_max + 1024,
            buffer_type: BufferType::HostVisible,
        })
        .unwrap_err();

    match err {
        Error::Capacity { kind, requested, limit } => {
            assert_eq!(kind, CapacityKind::ShaderUniformBuffer);
            assert_eq!(limit, info.uniform_buffer_max);
            assert_eq!(requested, info.uniform_buffer_max + 1024);
        }
        other => panic!("expected Capacity error, got {:?}", other),
    }
}
