//! Tower renderer
//!
//! Draws every mesh of the scene graph with two instanced draw calls: one
//! for unit cubes scaled into blocks, one for unit quads scaled into the
//! floor. Instance data is rebuilt from the scene each frame.

use bytemuck::{Pod, Zeroable};
use jenga_render::{Camera, InstanceBatches, InstanceData, SceneGraph, SceneUniforms};
use wgpu::util::DeviceExt;
use wgpu::*;

const INITIAL_INSTANCE_CAPACITY: usize = 64;

/// Vertex of the unit primitives
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [VertexAttribute; 2] = [
        VertexAttribute {
            format: VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0, // position
        },
        VertexAttribute {
            format: VertexFormat::Float32x3,
            offset: 12,
            shader_location: 1, // normal
        },
    ];

    fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const INSTANCE_ATTRIBUTES: [VertexAttribute; 8] = [
    VertexAttribute { format: VertexFormat::Float32x4, offset: 0, shader_location: 2 },
    VertexAttribute { format: VertexFormat::Float32x4, offset: 16, shader_location: 3 },
    VertexAttribute { format: VertexFormat::Float32x4, offset: 32, shader_location: 4 },
    VertexAttribute { format: VertexFormat::Float32x4, offset: 48, shader_location: 5 },
    VertexAttribute { format: VertexFormat::Float32x4, offset: 64, shader_location: 6 },
    VertexAttribute { format: VertexFormat::Float32x4, offset: 80, shader_location: 7 },
    VertexAttribute { format: VertexFormat::Float32x4, offset: 96, shader_location: 8 },
    VertexAttribute { format: VertexFormat::Float32x4, offset: 112, shader_location: 9 },
];

fn instance_layout() -> VertexBufferLayout<'static> {
    VertexBufferLayout {
        array_stride: InstanceData::SIZE as BufferAddress,
        step_mode: VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES,
    }
}

/// Unit cube centered on the origin, counter-clockwise faces seen from outside
pub fn generate_cube() -> (Vec<Vertex>, Vec<u16>) {
    // (normal, u, v) with u x v = normal
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];
    const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in FACES {
        let base = vertices.len() as u16;
        for (cu, cv) in CORNERS {
            let position = [
                normal[0] * 0.5 + u[0] * cu + v[0] * cv,
                normal[1] * 0.5 + u[1] * cu + v[1] * cv,
                normal[2] * 0.5 + u[2] * cu + v[2] * cv,
            ];
            vertices.push(Vertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Unit quad in the XY plane facing +Z
pub fn generate_quad() -> (Vec<Vertex>, Vec<u16>) {
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex { position: [-0.5, -0.5, 0.0], normal },
        Vertex { position: [0.5, -0.5, 0.0], normal },
        Vertex { position: [0.5, 0.5, 0.0], normal },
        Vertex { position: [-0.5, 0.5, 0.0], normal },
    ];
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &Device, label: &str, vertices: &[Vertex], indices: &[u16]) -> Self {
        let vertex_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(&format!("{}_vertices", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(&format!("{}_indices", label)),
            contents: bytemuck::cast_slice(indices),
            usage: BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Growable instance buffer
struct InstanceBuffer {
    label: &'static str,
    buffer: Buffer,
    capacity: usize,
    count: u32,
}

impl InstanceBuffer {
    fn new(device: &Device, label: &'static str, capacity: usize) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
            count: 0,
        }
    }

    fn allocate(device: &Device, label: &str, capacity: usize) -> Buffer {
        device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: (capacity * InstanceData::SIZE) as BufferAddress,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload(&mut self, device: &Device, queue: &Queue, instances: &[InstanceData]) {
        if instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("Instance buffer '{}' grown to {}", self.label, self.capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
        self.count = instances.len() as u32;
    }
}

/// Renders a scene graph into a surface texture
pub struct TowerRenderer {
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
    cube: GpuMesh,
    quad: GpuMesh,
    box_instances: InstanceBuffer,
    plane_instances: InstanceBuffer,
    depth_texture: Texture,
    depth_view: TextureView,
    batches: InstanceBatches,
}

impl TowerRenderer {
    pub fn new(device: &Device, format: TextureFormat, size: (u32, u32)) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &uniform_bind_group_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout(), instance_layout()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                // The floor is visible from below
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let (cube_vertices, cube_indices) = generate_cube();
        let (quad_vertices, quad_indices) = generate_quad();

        let (depth_texture, depth_view) = Self::create_depth_texture(device, size);

        log::info!("Tower renderer created ({:?})", format);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube: GpuMesh::new(device, "cube", &cube_vertices, &cube_indices),
            quad: GpuMesh::new(device, "quad", &quad_vertices, &quad_indices),
            box_instances: InstanceBuffer::new(device, "box_instances", INITIAL_INSTANCE_CAPACITY),
            plane_instances: InstanceBuffer::new(device, "plane_instances", 1),
            depth_texture,
            depth_view,
            batches: InstanceBatches::default(),
        }
    }

    fn create_depth_texture(device: &Device, size: (u32, u32)) -> (Texture, TextureView) {
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("depth_texture"),
            size: Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Depth32Float,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreate the depth buffer for a new surface size
    pub fn resize(&mut self, device: &Device, size: (u32, u32)) {
        let (texture, view) = Self::create_depth_texture(device, size);
        self.depth_texture = texture;
        self.depth_view = view;
    }

    /// Depth buffer size in pixels
    pub fn depth_size(&self) -> (u32, u32) {
        (self.depth_texture.width(), self.depth_texture.height())
    }

    /// Draw `scene` from `camera` into `target`
    pub fn render(
        &mut self,
        device: &Device,
        queue: &Queue,
        target: &TextureView,
        scene: &SceneGraph,
        camera: &Camera,
    ) {
        let uniforms = SceneUniforms::new(scene, camera);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.batches.refill(scene);
        self.box_instances.upload(device, queue, &self.batches.boxes);
        self.plane_instances.upload(device, queue, &self.batches.planes);

        let clear = scene.clear_color;
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            for (mesh, instances) in [(&self.cube, &self.box_instances), (&self.quad, &self.plane_instances)] {
                if instances.count == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, instances.buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint16);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..instances.count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_cube_faces_wind_outward() {
        let (vertices, indices) = generate_cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);

        for triangle in indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(vertices[triangle[i] as usize].position));
            let normal = Vec3::from_array(vertices[triangle[0] as usize].normal);
            let winding = (b - a).cross(c - a);
            assert!(winding.dot(normal) > 0.0, "triangle {:?} winds inward", triangle);
        }
    }

    #[test]
    fn test_cube_is_unit_sized() {
        let (vertices, _) = generate_cube();
        for vertex in &vertices {
            assert!(vertex.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn test_quad_faces_positive_z() {
        let (vertices, indices) = generate_quad();
        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(vertices[indices[i] as usize].position));
        assert!((b - a).cross(c - a).z > 0.0);
    }

    #[test]
    fn test_instance_attributes_cover_instance_data() {
        let last = INSTANCE_ATTRIBUTES[INSTANCE_ATTRIBUTES.len() - 1];
        assert_eq!(last.offset as usize + 16, InstanceData::SIZE);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }
}
