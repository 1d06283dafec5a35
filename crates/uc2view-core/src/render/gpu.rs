//! wgpu render path (Metal / Vulkan / DX12 / GL).
//!
//! The frame lives in an `R16Uint` texture and is never normalized on upload;
//! the fragment stage applies window/level/gamma and the vertex stage applies
//! the view transform to a full-frame quad.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{fit_samples, BackendKind, Presentation, RenderBackend, UploadReport, WindowLevel};
use crate::error::{Result, ViewerError};
use crate::frame::PixelBuffer;
use crate::view::ViewTransform;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DISPLAY_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

// ---------------------------------------------------------------------------
// GPU-side layouts (must match window_level.wgsl)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Params {
    /// min, max, gamma, unused
    window: [f32; 4],
    /// Columns of a mat3x3, each padded to 16 bytes.
    transform: [[f32; 4]; 3],
}

impl Params {
    fn new(window: &WindowLevel, view: &ViewTransform) -> Self {
        let w = window.sanitized();
        let m = view.matrix();
        Self {
            window: [w.min as f32, w.max as f32, w.gamma as f32, 0.0],
            transform: [
                [m[0][0], m[0][1], m[0][2], 0.0],
                [m[1][0], m[1][1], m[1][2], 0.0],
                [m[2][0], m[2][1], m[2][2], 0.0],
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

/// Triangle strip covering [-1, 1]²; texture row 0 is at the top.
const QUAD: [Vertex; 4] = [
    Vertex { pos: [-1.0, -1.0], uv: [0.0, 1.0] },
    Vertex { pos: [1.0, -1.0], uv: [1.0, 1.0] },
    Vertex { pos: [-1.0, 1.0], uv: [0.0, 0.0] },
    Vertex { pos: [1.0, 1.0], uv: [1.0, 0.0] },
];

struct FrameTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

struct Target {
    texture: wgpu::Texture,
    render_view: wgpu::TextureView,
    display_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    quad: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    frame: Option<FrameTexture>,
    target: Option<Target>,
    viewport: Option<(u32, u32)>,
    generation: u64,
    has_frame: bool,
    draws: u64,
}

impl GpuRenderer {
    /// Create a headless renderer on its own device.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| unavailable(format!("no suitable GPU adapter found: {e}")))?;

        let adapter_name = adapter.get_info().name.clone();
        tracing::info!("GPU adapter: {adapter_name}");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("uc2view"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            ..Default::default()
        }))
        .map_err(|e| unavailable(format!("failed to create GPU device: {e}")))?;

        Self::from_device(device, queue, adapter_name)
    }

    /// Build on a device owned by someone else (e.g. the UI's wgpu context).
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, adapter_name: String) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("window_level"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/window_level.wgsl").into()),
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("window_level"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Uint,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("window_level"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("window_level"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("window_level_params"),
            contents: bytemuck::bytes_of(&Params::new(
                &WindowLevel::default(),
                &ViewTransform::IDENTITY,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(unavailable(format!("shader pipeline rejected: {err}")));
        }

        Ok(Self {
            device,
            queue,
            adapter_name,
            pipeline,
            bind_layout,
            quad,
            uniforms,
            frame: None,
            target: None,
            viewport: None,
            generation: 0,
            has_frame: false,
            draws: 0,
        })
    }

    /// Draw a known two-pixel pattern and read it back. Fails when the
    /// pipeline does not produce black then white.
    pub fn self_test(&mut self) -> Result<()> {
        let pattern = PixelBuffer::new(2, 1, vec![0, u16::MAX])?;
        self.configure(2, 1)?;
        self.upload_frame(&pattern)?;
        self.draw(&WindowLevel::default(), &ViewTransform::IDENTITY)?;
        let pixels = self.read_pixels()?;

        // Leave no trace of the pattern for the first real frame.
        self.frame = None;
        self.target = None;
        self.has_frame = false;
        self.draws = 0;

        match pixels.as_slice() {
            [r0, _, _, a0, r1, _, _, a1, ..] if *r0 < 8 && *r1 > 247 && *a0 == 255 && *a1 == 255 => {
                tracing::debug!("GPU self-test passed");
                Ok(())
            }
            other => Err(unavailable(format!(
                "self-test produced unexpected pixels {:?}",
                &other[..other.len().min(8)]
            ))),
        }
    }

    /// Read back the last render target as tightly packed RGBA8.
    pub fn read_pixels(&self) -> Result<Vec<u8>> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| unavailable("nothing has been drawn yet".into()))?;

        let unpadded = target.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: padded as u64 * target.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut enc = self.device.create_command_encoder(&Default::default());
        enc.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(target.height),
                },
            },
            extent(target.width, target.height),
        );
        self.queue.submit(std::iter::once(enc.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        slice.map_async(wgpu::MapMode::Read, move |r| {
            tx.send(r).ok();
        });
        self.device.poll(wgpu::PollType::wait_indefinitely()).ok();
        rx.recv()
            .map_err(|_| unavailable("GPU readback channel closed".into()))?
            .map_err(|e| unavailable(format!("buffer mapping failed: {e}")))?;

        let data = slice.get_mapped_range();
        let mut out = Vec::with_capacity((unpadded * target.height) as usize);
        for row in data.chunks(padded as usize) {
            out.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(data);
        staging.unmap();
        Ok(out)
    }

    fn ensure_target(&mut self) {
        let Some((iw, ih)) = self.dimensions() else {
            return;
        };
        let (w, h) = self.viewport.unwrap_or((iw, ih));
        if let Some(t) = &self.target {
            if (t.width, t.height) == (w, h) {
                return;
            }
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("display"),
            size: extent(w, h),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[DISPLAY_FORMAT],
        });
        let render_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let display_view = texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(DISPLAY_FORMAT),
            ..Default::default()
        });
        self.generation += 1;
        tracing::debug!("GPU target resized to {w}x{h}");
        self.target = Some(Target {
            texture,
            render_view,
            display_view,
            width: w,
            height: h,
        });
    }
}

impl RenderBackend for GpuRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn name(&self) -> &str {
        &self.adapter_name
    }

    fn configure(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(f) = &self.frame {
            if (f.width, f.height) == (width, height) {
                return Ok(());
            }
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(unavailable(format!(
                "{width}x{height} frame exceeds the texture limit of {max}"
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R16Uint,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("window_level"),
            layout: &self.bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.uniforms.as_entire_binding(),
                },
            ],
        });

        tracing::debug!("GPU frame texture resized to {width}x{height}");
        self.frame = Some(FrameTexture {
            texture,
            bind_group,
            width,
            height,
        });
        self.has_frame = false;
        Ok(())
    }

    fn upload_frame(&mut self, pixels: &PixelBuffer) -> Result<UploadReport> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| unavailable("upload before configure".into()))?;
        let (fitted, report) = fit_samples(pixels.samples(), frame.width, frame.height);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&fitted),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * 2),
                rows_per_image: Some(frame.height),
            },
            extent(frame.width, frame.height),
        );
        self.has_frame = true;
        Ok(report)
    }

    fn draw(&mut self, window: &WindowLevel, view: &ViewTransform) -> Result<()> {
        if !self.has_frame {
            return Ok(());
        }
        self.ensure_target();
        let (Some(frame), Some(target)) = (&self.frame, &self.target) else {
            return Ok(());
        };

        self.queue
            .write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&Params::new(window, view)));

        let mut enc = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("window_level"),
        });
        {
            let mut pass = enc.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("window_level"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.render_view,
                    depth_slice: None,
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
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &frame.bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad.slice(..));
            pass.draw(0..QUAD.len() as u32, 0..1);
        }
        self.queue.submit(std::iter::once(enc.finish()));
        self.draws += 1;
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width > 0 && height > 0).then_some((width, height));
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.frame.as_ref().map(|f| (f.width, f.height))
    }

    fn presentation(&self) -> Presentation<'_> {
        match &self.target {
            Some(t) if self.draws > 0 => Presentation::Texture {
                view: &t.display_view,
                width: t.width,
                height: t.height,
                generation: self.generation,
            },
            _ => Presentation::Empty,
        }
    }

    fn draw_count(&self) -> u64 {
        self.draws
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn unavailable(msg: String) -> ViewerError {
    ViewerError::RenderBackendUnavailable(msg)
}
