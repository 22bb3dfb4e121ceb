// renderer.rs - wgpu Rendering Pipeline for Session Surfaces
//
// Draws CPU-side RGBA images onto a window surface as textured quads.
// The overlay uses it to stretch each captured region over the whole screen
// and composite the crosshair on top; the HUD uses it on a transparent
// surface to show the rasterized pill.
//
// Each image lives in a `Layer`: a texture, its bind group and a six-vertex
// quad. Textures are reallocated only when the image size changes.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use log::{debug, info, warn};
use winit::window::Window;

/// Pixel rectangle on the surface: x, y, width, height
pub type QuadRect = (i32, i32, u32, u32);

/// Where a layer sits on the surface. The quad is recomputed from the
/// anchor whenever the image or the surface size changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Stretched over the whole surface
    Fill,
    /// Drawn at its own pixel size in the middle of the surface
    Centered,
}

/// A textured quad drawn by the renderer
struct Layer {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    size: (u32, u32),
    anchor: Anchor,
}

/// The renderer that displays RGBA images in one window
pub struct FrameRenderer {
    /// The wgpu surface (the window's drawable area)
    surface: wgpu::Surface<'static>,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Surface configuration (format, size, alpha mode)
    config: wgpu::SurfaceConfiguration,

    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    /// Clear color: opaque black for the overlay, transparent for the HUD
    clear_color: wgpu::Color,

    /// Full-surface image
    base: Option<Layer>,
    /// Image kept centered on top of `base`
    overlay: Option<Layer>,

    /// Frame counter for debugging
    frame_count: u64,
}

impl FrameRenderer {
    /// Create a renderer for `window`. A transparent renderer leaves
    /// everything outside its images see-through.
    pub fn new(window: Arc<Window>, transparent: bool) -> Result<Self> {
        info!("Initializing wgpu renderer (transparent: {})", transparent);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let window_size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| anyhow!("Failed to find suitable GPU adapter: {:?}", e))?;

        debug!("Adapter acquired: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("ZoomIt Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .context("Failed to create device and queue")?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
        let alpha_mode = pick_alpha_mode(&capabilities.alpha_modes, transparent);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            "Surface configured: {}x{} {:?} {:?}",
            config.width, config.height, config.format, config.alpha_mode
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ZoomIt Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        // Linear filtering keeps the magnified image smooth
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let clear_color = if transparent {
            wgpu::Color::TRANSPARENT
        } else {
            wgpu::Color::BLACK
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            bind_group_layout,
            sampler,
            clear_color,
            base: None,
            overlay: None,
            frame_count: 0,
        })
    }

    /// Resize the renderer (called when the window is resized)
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!("Resizing renderer to {}x{}", width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        let surface = (width, height);
        for layer in [self.base.as_ref(), self.overlay.as_ref()].into_iter().flatten() {
            write_quad(&self.queue, layer, surface);
        }
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Replace the image stretched over the whole surface
    pub fn upload_base(&mut self, image: &RgbaImage) {
        let layer = self.base.take();
        self.base = Some(self.upload(layer, image, Anchor::Fill));
    }

    /// Center `image` at its pixel size on top of the base image, or
    /// remove the overlay with `None`. It stays centered across resizes.
    pub fn set_overlay(&mut self, overlay: Option<&RgbaImage>) {
        self.overlay = match overlay {
            Some(image) => {
                let layer = self.overlay.take();
                Some(self.upload(layer, image, Anchor::Centered))
            }
            None => None,
        };
    }

    /// Draw the base image and the overlay, then present
    pub fn render(&mut self) -> Result<()> {
        let Some(output) = self.acquire()? else {
            return Ok(());
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            for layer in [self.base.as_ref(), self.overlay.as_ref()].into_iter().flatten() {
                render_pass.set_bind_group(0, &layer.bind_group, &[]);
                render_pass.set_vertex_buffer(0, layer.vertex_buffer.slice(..));
                render_pass.draw(0..6, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.frame_count += 1;
        if self.frame_count % 600 == 0 {
            debug!("Rendered frame #{}", self.frame_count);
        }
        Ok(())
    }

    /// Get the next surface texture. A lost or outdated surface is
    /// reconfigured and the frame skipped.
    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(output) => Ok(Some(output)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("Surface timed out, skipping frame");
                Ok(None)
            }
            Err(e) => Err(anyhow!("Failed to get surface texture: {}", e)),
        }
    }

    /// Upload `image` into `layer`, reusing its texture when the size matches
    fn upload(&self, layer: Option<Layer>, image: &RgbaImage, anchor: Anchor) -> Layer {
        let size = image.dimensions();
        let mut layer = match layer {
            Some(layer) if layer.size == size => layer,
            _ => self.create_layer(size),
        };
        layer.anchor = anchor;

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &layer.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.0 * 4),
                rows_per_image: Some(size.1),
            },
            extent(size),
        );
        write_quad(&self.queue, &layer, (self.config.width, self.config.height));
        layer
    }

    fn create_layer(&self, size: (u32, u32)) -> Layer {
        debug!("Allocating {}x{} layer texture", size.0, size.1);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Layer Texture"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Layer Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Layer Vertex Buffer"),
            size: std::mem::size_of::<[Vertex; 6]>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Layer {
            texture,
            bind_group,
            vertex_buffer,
            size,
            anchor: Anchor::Fill,
        }
    }
}

fn extent((width, height): (u32, u32)) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

fn write_quad(queue: &wgpu::Queue, layer: &Layer, surface: (u32, u32)) {
    let rect = layer_rect(layer.anchor, layer.size, surface);
    let vertices = quad_vertices(rect, surface);
    queue.write_buffer(&layer.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
}

/// Pixel rectangle of an `image`-sized layer on a `surface`-sized target
fn layer_rect(anchor: Anchor, image: (u32, u32), surface: (u32, u32)) -> QuadRect {
    match anchor {
        Anchor::Fill => (0, 0, surface.0, surface.1),
        Anchor::Centered => (
            (surface.0 as i32 - image.0 as i32) / 2,
            (surface.1 as i32 - image.1 as i32) / 2,
            image.0,
            image.1,
        ),
    }
}

/// Prefer a compositing mode that honors alpha for transparent surfaces
fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode], transparent: bool) -> wgpu::CompositeAlphaMode {
    use wgpu::CompositeAlphaMode::*;

    let preferred: &[wgpu::CompositeAlphaMode] = if transparent {
        &[PreMultiplied, PostMultiplied, Inherit]
    } else {
        &[Opaque]
    };
    preferred
        .iter()
        .copied()
        .find(|mode| modes.contains(mode))
        .or_else(|| modes.first().copied())
        .unwrap_or(Auto)
}

// Vertex structure for a textured quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 2],
    tex_coords: [f32; 2],
}

impl Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Two triangles covering `rect` (top-left origin, pixels) in NDC
fn quad_vertices(rect: QuadRect, surface: (u32, u32)) -> [Vertex; 6] {
    let (x, y, width, height) = rect;
    let surface_w = surface.0.max(1) as f32;
    let surface_h = surface.1.max(1) as f32;

    let left = x as f32 / surface_w * 2.0 - 1.0;
    let right = (x as f32 + width as f32) / surface_w * 2.0 - 1.0;
    let top = 1.0 - y as f32 / surface_h * 2.0;
    let bottom = 1.0 - (y as f32 + height as f32) / surface_h * 2.0;

    let bottom_left = Vertex { position: [left, bottom], tex_coords: [0.0, 1.0] };
    let bottom_right = Vertex { position: [right, bottom], tex_coords: [1.0, 1.0] };
    let top_right = Vertex { position: [right, top], tex_coords: [1.0, 0.0] };
    let top_left = Vertex { position: [left, top], tex_coords: [0.0, 0.0] };

    [bottom_left, bottom_right, top_right, bottom_left, top_right, top_left]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_surface_quad() {
        let quad = quad_vertices((0, 0, 1920, 1080), (1920, 1080));
        assert_eq!(quad[0].position, [-1.0, -1.0]);
        assert_eq!(quad[2].position, [1.0, 1.0]);
        assert_eq!(quad[5].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn test_centered_quad() {
        // 200x100 box centered on a 400x200 surface
        let quad = quad_vertices((100, 50, 200, 100), (400, 200));
        assert_eq!(quad[5].position, [-0.5, 0.5]);
        assert_eq!(quad[1].position, [0.5, -0.5]);
    }

    #[test]
    fn test_centered_layer_follows_resize() {
        let glyph = (44, 44);
        assert_eq!(layer_rect(Anchor::Centered, glyph, (1920, 1080)), (938, 518, 44, 44));
        // Same layer after the surface shrinks
        assert_eq!(layer_rect(Anchor::Centered, glyph, (1600, 900)), (778, 428, 44, 44));
        assert_eq!(layer_rect(Anchor::Fill, glyph, (1600, 900)), (0, 0, 1600, 900));
    }

    #[test]
    fn test_alpha_mode_preference() {
        use wgpu::CompositeAlphaMode::*;

        assert_eq!(pick_alpha_mode(&[Opaque, PostMultiplied], true), PostMultiplied);
        assert_eq!(pick_alpha_mode(&[Opaque, PostMultiplied], false), Opaque);
        assert_eq!(pick_alpha_mode(&[Inherit], false), Inherit);
        assert_eq!(pick_alpha_mode(&[], true), Auto);
    }
}
