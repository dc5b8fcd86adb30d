use anyhow::{anyhow, bail, Result};
use wgpu::util::DeviceExt;

use crate::buffer::ParticleBuffer;

use super::pipeline::ATTRIBUTE_STRIDE;

/// Bytes needed for one per-instance attribute buffer holding `count` particles.
pub(crate) fn attribute_buffer_size(count: u32) -> wgpu::BufferAddress {
    u64::from(count) * ATTRIBUTE_STRIDE
}

/// Rejects particle counts whose attribute buffers the device cannot allocate.
pub(crate) fn check_capacity(count: u32, limits: &wgpu::Limits) -> Result<()> {
    let required = attribute_buffer_size(count);
    if required > limits.max_buffer_size {
        bail!(
            "{count} particles need {required} bytes per attribute buffer; \
             the device allows at most {}",
            limits.max_buffer_size
        );
    }
    Ok(())
}

/// GPU copies of the three attribute arrays. Written once, never resized.
pub(crate) struct ParticleBuffers {
    pub positions: wgpu::Buffer,
    pub seeds: wgpu::Buffer,
    pub colors: wgpu::Buffer,
    pub count: u32,
}

impl ParticleBuffers {
    pub fn upload(device: &wgpu::Device, particles: &ParticleBuffer) -> Result<Self> {
        check_capacity(particles.count(), &device.limits())?;

        let upload = |label: &str, data: &[f32]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let buffers = Self {
            positions: upload("particle positions", particles.positions()),
            seeds: upload("particle seeds", particles.seeds()),
            colors: upload("particle colors", particles.colors()),
            count: particles.count(),
        };
        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(err) = validation.or(out_of_memory) {
            buffers.destroy();
            return Err(anyhow!("failed to upload particle buffers: {err}"));
        }
        Ok(buffers)
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.seeds.slice(..));
        pass.set_vertex_buffer(2, self.colors.slice(..));
    }

    /// Frees the device memory immediately instead of waiting for drop.
    pub fn destroy(&self) {
        self.positions.destroy();
        self.seeds.destroy();
        self.colors.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_buffers_hold_three_floats_per_particle() {
        assert_eq!(attribute_buffer_size(0), 0);
        assert_eq!(attribute_buffer_size(150), 1800);
        assert_eq!(attribute_buffer_size(u32::MAX), u64::from(u32::MAX) * 12);
    }

    #[test]
    fn capacity_check_follows_device_limits() {
        let limits = wgpu::Limits::default();
        assert!(check_capacity(150, &limits).is_ok());

        let fits = (limits.max_buffer_size / ATTRIBUTE_STRIDE) as u32;
        assert!(check_capacity(fits, &limits).is_ok());

        let err = check_capacity(100_000_000, &limits).expect_err("1.2 GB buffers rejected");
        assert!(err.to_string().contains("100000000 particles"));
    }

    #[test]
    fn capacity_check_uses_the_given_limits() {
        let limits = wgpu::Limits {
            max_buffer_size: 1200,
            ..wgpu::Limits::default()
        };
        assert!(check_capacity(100, &limits).is_ok());
        assert!(check_capacity(101, &limits).is_err());
    }
}
