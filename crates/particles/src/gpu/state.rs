use anyhow::Result;
use bytemuck::Zeroable;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::buffer::ParticleBuffer;
use crate::render_loop::FrameTarget;
use crate::types::{Antialiasing, SurfaceAlpha};

use super::buffers::ParticleBuffers;
use super::context::GpuContext;
use super::pipeline::{ParticlePipeline, VERTICES_PER_SPRITE};
use super::uniforms::FieldUniforms;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    fn for_context(context: &GpuContext) -> Option<Self> {
        (context.sample_count > 1).then(|| {
            Self::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }
}

/// Device, swapchain, pipeline and particle buffers for one field generation.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: ParticlePipeline,
    particles: ParticleBuffers,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    multisample_target: Option<MultisampleTarget>,
}

impl GpuState {
    /// The window behind `target` must outlive the returned state.
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        surface_alpha: SurfaceAlpha,
        particles: &ParticleBuffer,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size, antialiasing, surface_alpha)?;
        let pipeline = ParticlePipeline::new(
            &context.device,
            context.surface_format,
            context.sample_count,
        )?;
        let particles = ParticleBuffers::upload(&context.device, particles)?;

        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("field uniforms"),
                contents: bytemuck::bytes_of(&FieldUniforms::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("field uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let multisample_target = MultisampleTarget::for_context(&context);

        tracing::info!(
            particles = particles.count,
            width = context.size.width,
            height = context.size.height,
            sample_count = context.sample_count,
            "particle field uploaded to GPU"
        );

        Ok(Self {
            context,
            pipeline,
            particles,
            uniform_buffer,
            uniform_bind_group,
            multisample_target,
        })
    }
}

impl FrameTarget for GpuState {
    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if size == self.context.size {
            self.context.reconfigure();
            return;
        }
        self.context.resize(size);
        self.multisample_target = MultisampleTarget::for_context(&self.context);
    }

    fn write_uniforms(&mut self, uniforms: &FieldUniforms) {
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    fn draw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("particle encoder"),
                });

        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("particle pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            self.particles.bind(&mut pass);
            pass.draw(0..VERTICES_PER_SPRITE, 0..self.particles.count);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        self.particles.destroy();
        self.uniform_buffer.destroy();
        tracing::debug!(particles = self.particles.count, "released particle GPU resources");
    }
}
