use glam::{Mat4, Vec3};
use wgpu::*;

use crate::config::hex_to_rgb;
use crate::model::{AviatorScene, Camera, DrawItem, MeshId};
use crate::utils::{MeshBuffer, Vertex};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 3],
    pub _pad: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.to_array(),
            _pad: 0.0,
        }
    }
}

/// Hemisphere + directional light and linear fog, one vec4 per row
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub sun_color: [f32; 3],
    pub hemisphere_intensity: f32,
    pub sky_color: [f32; 3],
    pub fog_near: f32,
    pub ground_color: [f32; 3],
    pub fog_far: f32,
    pub fog_color: [f32; 3],
    /// 1.0 when the target is a linear format and the shader must encode sRGB itself
    pub encode_srgb: f32,
}

impl LightingUniform {
    pub fn from_scene(scene: &AviatorScene, format: TextureFormat) -> Self {
        let lights = &scene.lights;
        // Directional light shines from its position toward the origin
        let sun_dir = lights.sun_position.try_normalize().unwrap_or(Vec3::Y);
        Self {
            sun_dir: sun_dir.to_array(),
            sun_intensity: lights.sun_intensity,
            sun_color: hex_to_rgb(lights.sun_color),
            hemisphere_intensity: lights.hemisphere_intensity,
            sky_color: hex_to_rgb(lights.hemisphere_sky),
            fog_near: scene.fog.near,
            ground_color: hex_to_rgb(lights.hemisphere_ground),
            fog_far: scene.fog.far,
            fog_color: hex_to_rgb(scene.fog.color),
            encode_srgb: if format.is_srgb() { 0.0 } else { 1.0 },
        }
    }
}

/// Per-draw model matrix, fed as a per-instance vertex attribute
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    pub const ATTRIBUTES: [VertexAttribute; 4] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4
    ];

    pub fn from_matrix(model: Mat4) -> Self {
        Self { model: model.to_cols_array_2d() }
    }

    pub fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Clear color matching the fog. sRGB targets expect linear values.
pub fn clear_color(fog_hex: u32, format: TextureFormat) -> Color {
    let [r, g, b] = hex_to_rgb(fog_hex);
    let channel = |c: f32| {
        let c = c as f64;
        if format.is_srgb() { c.powf(2.2) } else { c }
    };
    Color { r: channel(r), g: channel(g), b: channel(b), a: 1.0 }
}

/// Stable partition: opaque draws first, then transparent. Returns the opaque count.
pub fn order_draws(draws: Vec<DrawItem>, is_transparent: impl Fn(MeshId) -> bool) -> (Vec<DrawItem>, usize) {
    let (mut ordered, transparent): (Vec<_>, Vec<_>) = draws.into_iter().partition(|d| !is_transparent(d.mesh));
    let opaque_count = ordered.len();
    ordered.extend(transparent);
    (ordered, opaque_count)
}

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub lighting_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub struct PipelineResources {
    pub opaque_pipeline: wgpu::RenderPipeline,
    pub transparent_pipeline: wgpu::RenderPipeline,
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lighting_buffer"),
        size: std::mem::size_of::<LightingUniform>() as BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        // Fog needs the eye position in the fragment stage
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[uniform_entry(0), uniform_entry(1)],
    });

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_scene_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> PipelineResources {
    let shader_src = include_str!("../shaders/scene.wgsl");
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let build = |label: &str, depth_write_enabled: bool| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), InstanceRaw::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::ALPHA_BLENDING), write_mask: wgpu::ColorWrites::ALL })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        })
    };

    PipelineResources {
        opaque_pipeline: build("opaque_pipeline", true),
        transparent_pipeline: build("transparent_pipeline", false),
    }
}

fn create_instance_buffer(device: &Device, capacity: usize) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some("instance_buffer"),
        size: (capacity.max(1) * std::mem::size_of::<InstanceRaw>()) as BufferAddress,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

///////////////////////////////////////////////////////////////////////////////

/// Consolidated render state to avoid parameter explosion
pub struct RenderState {
    // wgpu resources
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    // Pipelines
    pipelines: PipelineResources,
    camera: CameraResources,
    depth_view: TextureView,

    // Meshes, indexed by MeshId
    meshes: Vec<MeshBuffer>,
    instance_buffer: Buffer,
    instance_capacity: usize,
    clear_color: Color,
}

impl RenderState {
    /// Upload every mesh of the scene once and build the pipelines
    pub fn new(device: &Device, config: &SurfaceConfiguration, scene: &AviatorScene) -> Self {
        let camera = create_camera_resources(device);
        let pipelines = create_scene_pipelines(device, config.format, &camera.bind_group_layout);
        let (_, depth_view) = create_depth_texture(device, config.width, config.height);

        let meshes: Vec<MeshBuffer> = scene.meshes.iter().map(|(_, mesh)| mesh.upload(device)).collect();
        let instance_capacity = scene.draw_count().next_power_of_two();

        tracing::debug!(meshes = meshes.len(), instance_capacity, "render state created");

        Self {
            format: config.format,
            alpha_mode: config.alpha_mode,
            width: config.width,
            height: config.height,
            pipelines,
            camera,
            depth_view,
            meshes,
            instance_buffer: create_instance_buffer(device, instance_capacity),
            instance_capacity,
            clear_color: clear_color(scene.fog.color, config.format),
        }
    }

    fn surface_config(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Reconfigure the surface and depth buffer. Zero sizes (minimized window) are ignored.
    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        surface.configure(device, &self.surface_config());
        let (_, depth_view) = create_depth_texture(device, width, height);
        self.depth_view = depth_view;
        tracing::debug!(width, height, "surface resized");
        true
    }

    fn is_transparent(&self, mesh: MeshId) -> bool {
        self.meshes.get(mesh.0).is_some_and(|m| m.transparent)
    }

    /// Render one frame. Lost or outdated surfaces are reconfigured and the frame skipped.
    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        camera: &Camera,
        scene: &AviatorScene,
    ) -> Result<(), SurfaceError> {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated, reconfiguring");
                surface.configure(device, &self.surface_config());
                return Ok(());
            }
            Err(SurfaceError::Timeout) => {
                tracing::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(camera)));
        queue.write_buffer(
            &self.camera.lighting_buffer,
            0,
            bytemuck::bytes_of(&LightingUniform::from_scene(scene, self.format)),
        );

        let (draws, opaque_count) = order_draws(scene.collect_draws(), |id| self.is_transparent(id));
        if draws.len() > self.instance_capacity {
            self.instance_capacity = draws.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            tracing::debug!(capacity = self.instance_capacity, "instance buffer grown");
        }
        let instances: Vec<InstanceRaw> = draws.iter().map(|d| InstanceRaw::from_matrix(d.model)).collect();
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipelines.opaque_pipeline);
            rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);
            rp.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for (i, draw) in draws.iter().enumerate() {
                if i == opaque_count {
                    rp.set_pipeline(&self.pipelines.transparent_pipeline);
                }
                let Some(mesh_buffer) = self.meshes.get(draw.mesh.0) else { continue };
                if mesh_buffer.index_count == 0 {
                    continue; // Skip empty meshes
                }
                let instance = i as u32;
                rp.set_vertex_buffer(0, mesh_buffer.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh_buffer.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh_buffer.index_count, 0, instance..instance + 1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn draw(mesh: usize) -> DrawItem {
        DrawItem { mesh: MeshId(mesh), model: Mat4::from_translation(Vec3::new(mesh as f32, 0.0, 0.0)) }
    }

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 80);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 64);
    }

    #[test]
    fn test_transparent_draws_go_last() {
        let draws = vec![draw(0), draw(1), draw(2), draw(3)];
        let (ordered, opaque_count) = order_draws(draws, |id| id.0 == 0 || id.0 == 2);
        assert_eq!(opaque_count, 2);
        let order: Vec<usize> = ordered.iter().map(|d| d.mesh.0).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_scene_has_one_transparent_draw() {
        let scene = AviatorScene::new(&SceneConfig::default(), 3);
        let is_transparent = |id: MeshId| scene.meshes.get(id).is_some_and(|m| m.is_transparent());
        let (ordered, opaque_count) = order_draws(scene.collect_draws(), is_transparent);
        assert_eq!(ordered.len(), scene.draw_count());
        assert_eq!(ordered.len() - opaque_count, 1);
    }

    #[test]
    fn test_lighting_from_scene() {
        let scene = AviatorScene::new(&SceneConfig::default(), 3);
        let lighting = LightingUniform::from_scene(&scene, TextureFormat::Bgra8UnormSrgb);
        let sun = Vec3::from(lighting.sun_dir);
        assert!((sun.length() - 1.0).abs() < 1e-5);
        assert!(sun.y > 0.0);
        assert_eq!(lighting.fog_near, 100.0);
        assert_eq!(lighting.fog_far, 950.0);
        assert_eq!(lighting.encode_srgb, 0.0);
        assert_eq!(LightingUniform::from_scene(&scene, TextureFormat::Bgra8Unorm).encode_srgb, 1.0);
    }

    #[test]
    fn test_clear_color_is_fog() {
        let raw = clear_color(0xf7d9aa, TextureFormat::Rgba8Unorm);
        assert!((raw.r - 247.0 / 255.0).abs() < 1e-6);
        assert!((raw.b - 170.0 / 255.0).abs() < 1e-6);
        let linear = clear_color(0xf7d9aa, TextureFormat::Rgba8UnormSrgb);
        assert!(linear.b < raw.b);
        assert_eq!(linear.a, 1.0);
    }
}
