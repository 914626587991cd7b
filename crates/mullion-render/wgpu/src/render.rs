//! GPU device implementation using wgpu.
//!
//! Each [`WgpuDevice`] owns one surface, one offscreen frame target and
//! the pipelines to draw the packet kinds the command buffer records.
//! Lists are recorded CPU-side as [`WgpuList`] ops and turned into real
//! render passes at submit time; `present` blits the frame target onto
//! the swap chain, which keeps the last completed frame readable for
//! cross-device compositing via `grab_output`.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::rc::Rc;
use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use lru::LruCache;
use mullion_graphics::{Color, ImageData, ImageId, UiPoint, UiRect};
use mullion_render_common::{
    Backend, BackendList, DeviceError, DeviceFactory, GlyphRun, RenderDevice, RenderWindow,
    SharedDevice,
};
use crate::shaders;

/// Glyph quads that may be recorded between two presents. Exhaustion is
/// reported through `draw_glyphs` returning `false`.
const GLYPH_RING_CAPACITY: usize = 100_000;
const TEXTURE_CACHE_CAPACITY: usize = 64;
const INITIAL_QUAD_CAPACITY: usize = 256;

/// All drawing goes through the offscreen target in this format; the
/// blit pipeline converts to whatever format the surface wants.
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
    uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4, 2 => Float32x2];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Uniforms {
    viewport: [f32; 2],
    _padding: [f32; 2],
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

enum ListOp {
    Clear(Color),
    Rect {
        rect: UiRect,
        color: Color,
        scissor: UiRect,
    },
    Image {
        rect: UiRect,
        image: ImageData,
        scissor: UiRect,
    },
    Glyphs {
        origin: UiPoint,
        run: GlyphRun,
        scissor: UiRect,
    },
}

/// The concrete command list type built by [`WgpuDevice`] between
/// `begin_list` and `end_list`. Ops stay CPU-side until submission.
pub struct WgpuList {
    ops: Vec<ListOp>,
}

enum StepBinding {
    Solid,
    Textured(Rc<wgpu::BindGroup>),
}

/// One draw call of a translated list: an index range plus the scissor
/// and pipeline binding it runs under.
struct DrawStep {
    binding: StepBinding,
    range: Range<u32>,
    scissor: UiRect,
}

/// The offscreen texture every list renders into. Kept samplable for
/// the present blit and copyable for readback.
struct FrameTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl FrameTarget {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Target Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        Self {
            texture,
            view,
            bind_group,
            width,
            height,
        }
    }
}

pub struct WgpuDevice {
    backend: Backend,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    target: FrameTarget,
    solid_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_buffer: wgpu::Buffer,
    index_capacity: usize,
    textures: LruCache<ImageId, Rc<wgpu::BindGroup>>,
    current: Option<Vec<ListOp>>,
    glyphs_in_flight: usize,
}

impl WgpuDevice {
    /// Creates a device and swap chain against `window` for the
    /// requested backend. The window must outlive the device.
    pub fn new(
        window: &dyn RenderWindow,
        backend: Backend,
        width: u32,
        height: u32,
    ) -> Result<Self, DeviceError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: backend_mask(backend),
            ..Default::default()
        });

        let raw_display_handle = window
            .display_handle()
            .map_err(|error| DeviceError::SurfaceCreation {
                message: error.to_string(),
            })?
            .as_raw();
        let raw_window_handle = window
            .window_handle()
            .map_err(|error| DeviceError::SurfaceCreation {
                message: error.to_string(),
            })?
            .as_raw();
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle,
                raw_window_handle,
            })
        }
        .map_err(|error| DeviceError::SurfaceCreation {
            message: error.to_string(),
        })?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|_| DeviceError::AdapterUnavailable { backend })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Mullion Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        }))
        .map_err(|error| DeviceError::DeviceRequest {
            backend,
            message: error.to_string(),
        })?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let quad_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::QUAD_SHADER.into()),
        });
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // The solid layout must not list the texture group: draws are
        // validated against every slot of the pipeline layout, and solid
        // steps never bind one.
        let solid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Solid Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Textured Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let solid_pipeline = quad_pipeline(
            &device,
            &solid_layout,
            &quad_shader,
            "fs_solid",
            "Solid Pipeline",
        );
        let textured_pipeline = quad_pipeline(
            &device,
            &textured_layout,
            &quad_shader,
            "fs_textured",
            "Textured Pipeline",
        );

        let blit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&texture_layout],
            push_constant_ranges: &[],
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&blit_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_blit"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_blit"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Quad Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_capacity = INITIAL_QUAD_CAPACITY * 4;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Vertex Buffer"),
            size: (std::mem::size_of::<Vertex>() * vertex_capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_capacity = INITIAL_QUAD_CAPACITY * 6;
        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Index Buffer"),
            size: (std::mem::size_of::<u32>() * index_capacity) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let target = FrameTarget::new(&device, &texture_layout, &sampler, width, height);
        let capacity = NonZeroUsize::new(TEXTURE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);

        log::info!("created {backend} device ({width}x{height}, {surface_format:?})");

        Ok(Self {
            backend,
            device,
            queue,
            surface,
            surface_config,
            target,
            solid_pipeline,
            textured_pipeline,
            blit_pipeline,
            texture_layout,
            sampler,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity,
            index_buffer,
            index_capacity,
            textures: LruCache::new(capacity),
            current: None,
            glyphs_in_flight: 0,
        })
    }

    fn record(&mut self, op: ListOp) {
        self.current
            .as_mut()
            .expect("recording without an open list")
            .push(op);
    }

    /// Resolves `image` through the texture cache, uploading it on a
    /// miss. Fresh pixel contents always carry a fresh identity, so a
    /// stale entry can never be returned.
    fn texture_bind_group(&mut self, image: &ImageData) -> Rc<wgpu::BindGroup> {
        if let Some(existing) = self.textures.get(&image.id()) {
            return existing.clone();
        }

        let size = wgpu::Extent3d {
            width: image.width().max(1),
            height: image.height().max(1),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Image Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = Rc::new(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Image Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
        self.textures.put(image.id(), bind_group.clone());
        bind_group
    }

    fn ensure_capacity(&mut self, vertices_needed: usize, indices_needed: usize) {
        if vertices_needed > self.vertex_capacity {
            let new_cap = vertices_needed.next_power_of_two();
            self.vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Quad Vertex Buffer"),
                size: (std::mem::size_of::<Vertex>() * new_cap) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.vertex_capacity = new_cap;
        }
        if indices_needed > self.index_capacity {
            let new_cap = indices_needed.next_power_of_two();
            self.index_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Quad Index Buffer"),
                size: (std::mem::size_of::<u32>() * new_cap) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.index_capacity = new_cap;
        }
    }

    /// Translates a recorded list into one render pass against the
    /// frame target and submits it.
    fn run_list(&mut self, list: WgpuList) {
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut steps: Vec<DrawStep> = Vec::new();
        let mut load = wgpu::LoadOp::Load;
        let full_target = UiRect::new(0, 0, self.target.width as i32, self.target.height as i32);

        for (position, op) in list.ops.into_iter().enumerate() {
            match op {
                ListOp::Clear(color) => {
                    if position == 0 {
                        load = wgpu::LoadOp::Clear(wgpu::Color {
                            r: color.r as f64,
                            g: color.g as f64,
                            b: color.b as f64,
                            a: color.a as f64,
                        });
                    } else {
                        // a clear after other ops paints over them
                        let start = indices.len() as u32;
                        push_quad(
                            &mut vertices,
                            &mut indices,
                            full_target,
                            [color.r, color.g, color.b, color.a],
                            [[0.0, 0.0], [0.0, 0.0]],
                        );
                        steps.push(DrawStep {
                            binding: StepBinding::Solid,
                            range: start..indices.len() as u32,
                            scissor: full_target,
                        });
                    }
                }
                ListOp::Rect {
                    rect,
                    color,
                    scissor,
                } => {
                    let start = indices.len() as u32;
                    push_quad(
                        &mut vertices,
                        &mut indices,
                        rect,
                        [color.r, color.g, color.b, color.a],
                        [[0.0, 0.0], [0.0, 0.0]],
                    );
                    steps.push(DrawStep {
                        binding: StepBinding::Solid,
                        range: start..indices.len() as u32,
                        scissor,
                    });
                }
                ListOp::Image {
                    rect,
                    image,
                    scissor,
                } => {
                    let bind_group = self.texture_bind_group(&image);
                    let start = indices.len() as u32;
                    push_quad(
                        &mut vertices,
                        &mut indices,
                        rect,
                        WHITE,
                        [[0.0, 0.0], [1.0, 1.0]],
                    );
                    steps.push(DrawStep {
                        binding: StepBinding::Textured(bind_group),
                        range: start..indices.len() as u32,
                        scissor,
                    });
                }
                ListOp::Glyphs {
                    origin,
                    run,
                    scissor,
                } => {
                    if run.glyphs.is_empty() {
                        continue;
                    }
                    let bind_group = self.texture_bind_group(&run.atlas);
                    let atlas_width = run.atlas.width().max(1) as f32;
                    let atlas_height = run.atlas.height().max(1) as f32;
                    let start = indices.len() as u32;
                    for quad in &run.glyphs {
                        let dst = quad.dst.translate(origin);
                        let uv = [
                            [
                                quad.src.x as f32 / atlas_width,
                                quad.src.y as f32 / atlas_height,
                            ],
                            [
                                (quad.src.x + quad.src.width) as f32 / atlas_width,
                                (quad.src.y + quad.src.height) as f32 / atlas_height,
                            ],
                        ];
                        push_quad(&mut vertices, &mut indices, dst, WHITE, uv);
                    }
                    steps.push(DrawStep {
                        binding: StepBinding::Textured(bind_group),
                        range: start..indices.len() as u32,
                        scissor,
                    });
                }
            }
        }

        if steps.is_empty() && matches!(load, wgpu::LoadOp::Load) {
            return;
        }

        let uniforms = Uniforms {
            viewport: [self.target.width as f32, self.target.height as f32],
            _padding: [0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        if !vertices.is_empty() {
            self.ensure_capacity(vertices.len(), indices.len());
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
            self.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("List Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("List Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for step in &steps {
                let Some((x, y, w, h)) =
                    clamp_scissor(step.scissor, self.target.width, self.target.height)
                else {
                    continue;
                };
                pass.set_scissor_rect(x, y, w, h);
                match &step.binding {
                    StepBinding::Solid => pass.set_pipeline(&self.solid_pipeline),
                    StepBinding::Textured(bind_group) => {
                        pass.set_pipeline(&self.textured_pipeline);
                        pass.set_bind_group(1, bind_group.as_ref(), &[]);
                    }
                }
                pass.draw_indexed(step.range.clone(), 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl RenderDevice for WgpuDevice {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn begin_list(&mut self) {
        assert!(self.current.is_none(), "device list is already open");
        self.current = Some(Vec::new());
    }

    fn clear_target(&mut self, color: Color) {
        self.record(ListOp::Clear(color));
    }

    fn draw_rect(&mut self, rect: UiRect, color: Color, scissor: UiRect) {
        self.record(ListOp::Rect {
            rect,
            color,
            scissor,
        });
    }

    fn draw_image(&mut self, rect: UiRect, image: &ImageData, scissor: UiRect) {
        self.record(ListOp::Image {
            rect,
            image: image.clone(),
            scissor,
        });
    }

    fn draw_glyphs(&mut self, origin: UiPoint, run: &GlyphRun, scissor: UiRect) -> bool {
        if self.glyphs_in_flight + run.glyphs.len() > GLYPH_RING_CAPACITY {
            return false;
        }
        self.glyphs_in_flight += run.glyphs.len();
        self.record(ListOp::Glyphs {
            origin,
            run: run.clone(),
            scissor,
        });
        true
    }

    fn end_list(&mut self) -> BackendList {
        let ops = self.current.take().expect("ending a list that is not open");
        BackendList::new(WgpuList { ops })
    }

    fn submit(&mut self, list: BackendList) {
        match list.downcast::<WgpuList>() {
            Some(list) => self.run_list(*list),
            None => log::warn!("dropping a command list built by another device"),
        }
    }

    fn submit_blocking(&mut self, list: BackendList) {
        self.submit(list);
        self.wait_idle();
    }

    fn present(&mut self, blocking: bool) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                match self.surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(error) => {
                        log::warn!("skipping present after reconfigure: {error}");
                        return;
                    }
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                return;
            }
            Err(error) => {
                log::debug!("skipping present: {error}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.target.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        if blocking {
            self.wait_idle();
        }
        self.glyphs_in_flight = 0;
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.surface_config.width && height == self.surface_config.height {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.target = FrameTarget::new(
            &self.device,
            &self.texture_layout,
            &self.sampler,
            width,
            height,
        );
        log::debug!("resized {} surface to {width}x{height}", self.backend);
    }

    fn wait_idle(&mut self) {
        let _ = self.device.poll(wgpu::PollType::Wait);
    }

    fn grab_output(&mut self) -> Option<ImageData> {
        let width = self.target.width;
        let height = self.target.height;
        let bytes_per_row = 4 * width;
        let padded_bytes_per_row = bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::Wait);
        match receiver.recv() {
            Ok(Ok(())) => {}
            _ => {
                log::warn!("frame readback mapping failed");
                return None;
            }
        }

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity(bytes_per_row as usize * height as usize);
        for row in 0..height as usize {
            let start = row * padded_bytes_per_row as usize;
            pixels.extend_from_slice(&mapped[start..start + bytes_per_row as usize]);
        }
        drop(mapped);
        staging.unmap();

        Some(ImageData::from_rgba8(width, height, pixels))
    }
}

/// Creates a fresh instance, surface and device per requesting root
/// surface, honoring each one's backend choice.
#[derive(Default)]
pub struct WgpuDeviceFactory;

impl WgpuDeviceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceFactory for WgpuDeviceFactory {
    fn create_device(
        &mut self,
        window: &dyn RenderWindow,
        backend: Backend,
        width: u32,
        height: u32,
    ) -> Result<SharedDevice, DeviceError> {
        let device = WgpuDevice::new(window, backend, width, height)?;
        Ok(Rc::new(RefCell::new(device)))
    }
}

fn backend_mask(backend: Backend) -> wgpu::Backends {
    match backend {
        Backend::Vulkan => wgpu::Backends::VULKAN,
        Backend::Dx12 => wgpu::Backends::DX12,
        Backend::Metal => wgpu::Backends::METAL,
        Backend::Gl => wgpu::Backends::GL,
    }
}

fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    }
}

fn quad_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[Vertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: primitive_state(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn push_quad(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    rect: UiRect,
    color: [f32; 4],
    uv: [[f32; 2]; 2],
) {
    let base = vertices.len() as u32;
    let left = rect.x as f32;
    let top = rect.y as f32;
    let right = (rect.x + rect.width) as f32;
    let bottom = (rect.y + rect.height) as f32;
    let [[u0, v0], [u1, v1]] = uv;
    vertices.extend_from_slice(&[
        Vertex {
            position: [left, top],
            color,
            uv: [u0, v0],
        },
        Vertex {
            position: [right, top],
            color,
            uv: [u1, v0],
        },
        Vertex {
            position: [left, bottom],
            color,
            uv: [u0, v1],
        },
        Vertex {
            position: [right, bottom],
            color,
            uv: [u1, v1],
        },
    ]);
    indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
}

/// Clamps a packet scissor to the target bounds; `None` means nothing
/// survives and the draw is skipped.
fn clamp_scissor(scissor: UiRect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let left = scissor.x.clamp(0, width as i32);
    let top = scissor.y.clamp(0, height as i32);
    let right = (scissor.x + scissor.width).clamp(0, width as i32);
    let bottom = (scissor.y + scissor.height).clamp(0, height as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}
