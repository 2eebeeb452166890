//! Per-world asset catalog
//!
//! Variant palettes shared by generation and entity creation. One catalog is
//! built per world and passed by reference, so independent worlds (and tests)
//! never share hidden state.

use serde::{Deserialize, Serialize};

/// Villager hair styles (indices into the renderer's hair meshes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HairStyle {
    Bald,
    Short,
    Long,
    Bun,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub grass_tints: Vec<[f32; 3]>,
    pub flower_colors: Vec<[f32; 3]>,
    pub mushroom_caps: Vec<[f32; 3]>,
    pub foliage_tints: Vec<[f32; 3]>,
    pub berry_colors: Vec<[f32; 3]>,
    pub house_walls: Vec<[f32; 3]>,
    pub hair_styles: Vec<HairStyle>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// The shipped palette set
    pub fn standard() -> Self {
        Self {
            grass_tints: vec![[0.33, 0.62, 0.24], [0.4, 0.7, 0.28], [0.28, 0.55, 0.22]],
            flower_colors: vec![
                [0.95, 0.2, 0.25], // red
                [0.98, 0.85, 0.2], // yellow
                [0.6, 0.35, 0.9],  // violet
                [1.0, 1.0, 1.0],   // white
                [0.3, 0.5, 1.0],   // blue
            ],
            mushroom_caps: vec![[0.85, 0.1, 0.1], [0.6, 0.4, 0.25], [0.95, 0.9, 0.8]],
            foliage_tints: vec![[0.2, 0.5, 0.18], [0.25, 0.58, 0.2], [0.35, 0.55, 0.15]],
            berry_colors: vec![[0.8, 0.1, 0.2], [0.2, 0.2, 0.7], [0.95, 0.6, 0.1]],
            house_walls: vec![[0.85, 0.75, 0.6], [0.7, 0.55, 0.4], [0.9, 0.88, 0.82]],
            hair_styles: vec![HairStyle::Bald, HairStyle::Short, HairStyle::Long, HairStyle::Bun],
        }
    }

    pub fn hair_style(&self, variant: u8) -> HairStyle {
        self.hair_styles
            .get(variant as usize)
            .copied()
            .unwrap_or(HairStyle::Short)
    }
}

/// Number of variants for a palette; never zero so seeded picks stay total
#[inline]
pub(crate) fn variants<T>(palette: &[T]) -> u64 {
    palette.len().max(1) as u64
}

/// Palette lookup with a neutral fallback for empty palettes
#[inline]
pub(crate) fn tint(palette: &[[f32; 3]], variant: u8) -> [f32; 3] {
    palette.get(variant as usize).copied().unwrap_or([1.0, 1.0, 1.0])
}
