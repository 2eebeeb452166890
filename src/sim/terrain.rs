//! Terrain height field
//!
//! A layered sine/cosine "roughness" field evaluated in world space. It holds
//! only constants, so any two calls with the same coordinates agree and
//! neighbouring chunks meet without seams.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One periodic layer of the height field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainLayer {
    pub freq_x: f32,
    pub freq_z: f32,
    pub phase: f32,
    pub amplitude: f32,
}

impl TerrainLayer {
    #[inline]
    fn sample(&self, x: f32, z: f32) -> f32 {
        let along_x = (x * self.freq_x + self.phase).sin();
        let along_z = (z * self.freq_z + self.phase * 0.5).cos();
        self.amplitude * along_x * along_z
    }
}

/// Pure height function of world (x, z)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainField {
    layers: [TerrainLayer; 3],
}

impl Default for TerrainField {
    fn default() -> Self {
        Self {
            layers: [
                // Rolling hills
                TerrainLayer {
                    freq_x: 0.021,
                    freq_z: 0.017,
                    phase: 0.0,
                    amplitude: 4.0,
                },
                // Bumps
                TerrainLayer {
                    freq_x: 0.063,
                    freq_z: 0.071,
                    phase: 1.3,
                    amplitude: 1.2,
                },
                // Roughness
                TerrainLayer {
                    freq_x: 0.19,
                    freq_z: 0.17,
                    phase: 2.7,
                    amplitude: 0.35,
                },
            ],
        }
    }
}

impl TerrainField {
    pub fn new(layers: [TerrainLayer; 3]) -> Self {
        Self { layers }
    }

    /// Terrain height at world (x, z)
    #[inline]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.layers.iter().map(|l| l.sample(x, z)).sum()
    }

    /// Largest absolute height the field can produce
    pub fn max_amplitude(&self) -> f32 {
        self.layers.iter().map(|l| l.amplitude.abs()).sum()
    }

    /// Surface normal by central differences
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        const EPS: f32 = 0.25;
        let dx = self.height_at(x + EPS, z) - self.height_at(x - EPS, z);
        let dz = self.height_at(x, z + EPS) - self.height_at(x, z - EPS);
        Vec3::new(-dx, 2.0 * EPS, -dz).normalize_or(Vec3::Y)
    }

    /// Point on the surface at (x, z)
    #[inline]
    pub fn surface(&self, x: f32, z: f32) -> Vec3 {
        Vec3::new(x, self.height_at(x, z), z)
    }
}
