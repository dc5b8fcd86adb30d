use glam::Vec3;
use rand::Rng;

use crate::palette::Palette;

/// One particle's attributes, read back out of the packed arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Initial placement inside the spawn cube.
    pub position: Vec3,
    /// `x`/`y` drive drift phase and hover pull, `z` scales drift and point size.
    pub seed: Vec3,
    pub color: Vec3,
}

/// The three parallel attribute arrays uploaded to the GPU once per field.
///
/// Each array holds exactly `3 * count` floats and is never resized after
/// generation.
#[derive(Debug, Clone)]
pub struct ParticleBuffer {
    count: u32,
    positions: Vec<f32>,
    seeds: Vec<f32>,
    colors: Vec<f32>,
}

impl ParticleBuffer {
    /// Samples positions in a cube of edge `spread` centred on the origin,
    /// per-particle seeds, and palette colours.
    ///
    /// `seed.z` lands in `[1 - size_randomness, 1]`.
    pub fn generate<R: Rng + ?Sized>(
        count: u32,
        spread: f32,
        size_randomness: f32,
        palette: &Palette,
        rng: &mut R,
    ) -> Self {
        let len = count as usize * 3;
        let mut positions = Vec::with_capacity(len);
        let mut seeds = Vec::with_capacity(len);
        let mut colors = Vec::with_capacity(len);

        for _ in 0..count {
            for _ in 0..3 {
                positions.push((rng.gen::<f32>() - 0.5) * spread);
            }

            seeds.push(rng.gen::<f32>());
            seeds.push(rng.gen::<f32>());
            seeds.push(rng.gen::<f32>() * size_randomness + (1.0 - size_randomness));

            colors.extend_from_slice(&palette.sample(rng));
        }

        tracing::debug!(
            count,
            spread,
            size_randomness,
            palette = palette.len(),
            "generated particle attributes"
        );

        Self {
            count,
            positions,
            seeds,
            colors,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn seeds(&self) -> &[f32] {
        &self.seeds
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn particle(&self, index: usize) -> Option<Particle> {
        let range = index * 3..index * 3 + 3;
        Some(Particle {
            position: Vec3::from_slice(self.positions.get(range.clone())?),
            seed: Vec3::from_slice(self.seeds.get(range.clone())?),
            color: Vec3::from_slice(self.colors.get(range)?),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.count as usize).filter_map(move |index| self.particle(index))
    }
}
