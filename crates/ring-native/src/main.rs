use std::time::Instant;
use wgpu::util::DeviceExt;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ring_core::{AmplitudeSource, ResponseCurve, RingConfig, RingDeformer, RingTopology};

mod audio;

const CAMERA_Z: f32 = 32.0;
const CURVE_SEED: u64 = 42;
const GLOBAL_SENSITIVITY: f32 = 1.0;

// The two sub-mesh appearances, fixed at construction.
const FILL_COLOR: [f32; 4] = [0.18, 0.32, 0.55, 0.85];
const WIRE_COLOR: [f32; 4] = [0.55, 0.85, 1.0, 1.0];

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniforms {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    fill_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    wire_index_buffer: wgpu::Buffer,
    triangle_index_buffer: wgpu::Buffer,
    wire_index_count: u32,
    triangle_index_count: u32,
    fill_uniforms: wgpu::Buffer,
    wire_uniforms: wgpu::Buffer,
    fill_bind_group: wgpu::BindGroup,
    wire_bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
    last_frame: Instant,
    deformer: RingDeformer,
    source: Box<dyn AmplitudeSource>,
}

impl<'w> GpuState<'w> {
    async fn new(
        window: &'w winit::window::Window,
        deformer: RingDeformer,
        topology: &RingTopology,
        source: Box<dyn AmplitudeSource>,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ring_shader"),
            source: wgpu::ShaderSource::Wgsl(ring_core::RING_WGSL.into()),
        });

        // One shared vertex buffer, rewritten every frame by the deformer.
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ring_vertices"),
            contents: bytemuck::cast_slice(deformer.vertices()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        // Both index buffers are immutable after construction.
        let wire_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ring_wire_indices"),
            contents: bytemuck::cast_slice(&topology.wire_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let triangle_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ring_triangle_indices"),
            contents: bytemuck::cast_slice(&topology.triangle_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let fill_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fill_uniforms"),
            size: std::mem::size_of::<MaterialUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let wire_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wire_uniforms"),
            size: std::mem::size_of::<MaterialUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let fill_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fill_bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: fill_uniforms.as_entire_binding(),
            }],
        });
        let wire_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("wire_bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wire_uniforms.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vec3>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            }],
        };

        let make_pipeline = |label: &str, topology: wgpu::PrimitiveTopology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: std::slice::from_ref(&vertex_layout),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    ..wgpu::PrimitiveState::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                cache: None,
                multiview: None,
            })
        };
        let fill_pipeline = make_pipeline("fill_pipeline", wgpu::PrimitiveTopology::TriangleList);
        let wire_pipeline = make_pipeline("wire_pipeline", wgpu::PrimitiveTopology::LineList);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            fill_pipeline,
            wire_pipeline,
            vertex_buffer,
            wire_index_buffer,
            triangle_index_buffer,
            wire_index_count: topology.wire_indices.len() as u32,
            triangle_index_count: topology.triangle_indices.len() as u32,
            fill_uniforms,
            wire_uniforms,
            fill_bind_group,
            wire_bind_group,
            width: size.width,
            height: size.height,
            last_frame: Instant::now(),
            deformer,
            source,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn view_proj(&self) -> [[f32; 4]; 4] {
        let aspect = self.width as f32 / self.height as f32;
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, aspect, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y);
        (proj * view).to_cols_array_2d()
    }

    /// Advance the ring one frame and stage the new vertices for upload.
    /// The only error here is the amplitude source breaking its contract.
    fn advance(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.deformer.update_from(dt, self.source.as_mut())?;
        self.queue.write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(self.deformer.vertices()),
        );
        Ok(())
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_proj = self.view_proj();
        self.queue.write_buffer(
            &self.fill_uniforms,
            0,
            bytemuck::bytes_of(&MaterialUniforms {
                view_proj,
                color: FILL_COLOR,
            }),
        );
        self.queue.write_buffer(
            &self.wire_uniforms,
            0,
            bytemuck::bytes_of(&MaterialUniforms {
                view_proj,
                color: WIRE_COLOR,
            }),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.04,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            rpass.set_pipeline(&self.fill_pipeline);
            rpass.set_bind_group(0, &self.fill_bind_group, &[]);
            rpass.set_index_buffer(
                self.triangle_index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            rpass.draw_indexed(0..self.triangle_index_count, 0, 0..1);

            rpass.set_pipeline(&self.wire_pipeline);
            rpass.set_bind_group(0, &self.wire_bind_group, &[]);
            rpass.set_index_buffer(self.wire_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..self.wire_index_count, 0, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = RingConfig::default();
    let topology = RingTopology::build(&config);
    let mut rng = StdRng::seed_from_u64(CURVE_SEED);
    let curves = ResponseCurve::generate_set(&config, &mut rng);
    let deformer = RingDeformer::new(config, &topology, curves);
    log::info!(
        "[ring] segments={} r={} w={} power={} curve_seed={CURVE_SEED}",
        config.segments,
        config.inner_radius,
        config.wall_width,
        config.weighting_power
    );

    // The capture stream must outlive the event loop.
    let (source, _stream) = audio::create_source(CURVE_SEED, GLOBAL_SENSITIVITY);

    let event_loop = EventLoop::new().expect("event loop");
    let window = WindowBuilder::new()
        .with_title("Pulse Ring (native)")
        .build(&event_loop)
        .expect("window");

    let mut state =
        pollster::block_on(GpuState::new(&window, deformer, &topology, source)).expect("gpu");

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => state.resize(size),
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => elwt.exit(),
            Event::AboutToWait => {
                if let Err(e) = state.advance() {
                    log::error!("amplitude source contract violation: {e}");
                    elwt.exit();
                    return;
                }
                match state.render() {
                    Ok(_) => state.window.request_redraw(),
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(_) => {}
                }
            }
            _ => {}
        })
        .unwrap();
}
