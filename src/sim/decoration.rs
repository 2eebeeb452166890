//! Seeded decoration placement
//!
//! Every decision here is a pure function of (seed, chunk coordinate): each
//! integer cell rolls a hash per decoration kind against a density threshold,
//! optionally modulated by a low-frequency patchiness field, and a second hash
//! picks the variant. Trees, bushes and the optional village are rolled once
//! per chunk with their own salts.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, variants};
use super::chunk::ChunkCoord;
use super::hash::{pick, range, roll};
use super::terrain::TerrainField;
use super::village::{Village, sample_village};
use crate::consts::CHUNK_SIZE;
use crate::tuning::DensityTuning;

/// Hash salts. Changing any of these changes every generated world.
mod salt {
    pub const DIRT: u64 = 0x11;
    pub const GRASS: u64 = 0x12;
    pub const FLOWER: u64 = 0x13;
    pub const MUSHROOM: u64 = 0x14;
    pub const VARIANT: u64 = 0x20;
    pub const JITTER_X: u64 = 0x30;
    pub const JITTER_Z: u64 = 0x31;
    pub const YAW: u64 = 0x32;
    pub const SCALE: u64 = 0x33;
    pub const PATCH_PHASE_X: u64 = 0x40;
    pub const PATCH_PHASE_Z: u64 = 0x41;
    pub const TREE: u64 = 0x100;
    pub const BUSH: u64 = 0x300;
    /// Stride between per-attempt salt blocks
    pub const STRIDE: u64 = 16;
}

/// Patchiness wavelengths (radians per world unit)
const PATCH_FREQ_X: f64 = 0.045;
const PATCH_FREQ_Z: f64 = 0.038;

/// Decoration kinds, grouped this way for batched drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DecorationKind {
    DirtPatch,
    Grass,
    Flower,
    Mushroom,
    Tree,
    Bush,
    Nest,
}

impl DecorationKind {
    pub const ALL: [DecorationKind; 7] = [
        DecorationKind::DirtPatch,
        DecorationKind::Grass,
        DecorationKind::Flower,
        DecorationKind::Mushroom,
        DecorationKind::Tree,
        DecorationKind::Bush,
        DecorationKind::Nest,
    ];

    /// Per-kind salt offset for variant picks
    fn variant_salt(self) -> u64 {
        salt::VARIANT + self as u64
    }
}

/// One placed decoration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorationInstance {
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
    /// Index into the kind's catalog palette
    pub variant: u8,
}

/// Decoration instances grouped by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecorationSet {
    by_kind: BTreeMap<DecorationKind, Vec<DecorationInstance>>,
}

impl DecorationSet {
    pub fn push(&mut self, kind: DecorationKind, instance: DecorationInstance) {
        self.by_kind.entry(kind).or_default().push(instance);
    }

    pub fn instances(&self, kind: DecorationKind) -> &[DecorationInstance] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: DecorationKind) -> usize {
        self.instances(kind).len()
    }

    pub fn total(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DecorationKind, &[DecorationInstance])> {
        self.by_kind.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub(crate) fn clear(&mut self) {
        self.by_kind.clear();
    }
}

/// Stable identity of a tree: its chunk plus placement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId {
    pub chunk: ChunkCoord,
    pub index: u32,
}

/// A placed tree and what it hosts
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub id: TreeId,
    /// Trunk base on the terrain
    pub base: Vec3,
    pub trunk_height: f32,
    /// World-space centres of the leaf cubes
    pub leaf_cells: Vec<Vec3>,
    pub nest: Option<Vec3>,
    /// Birds spawned on this tree (0-3)
    pub bird_count: u8,
    pub variant: u8,
}

impl Tree {
    /// Height of the top of the canopy
    pub fn canopy_top(&self) -> f32 {
        self.leaf_cells
            .iter()
            .map(|c| c.y)
            .fold(self.base.y + self.trunk_height, f32::max)
            + 0.5
    }

    /// Landing spots on top of each leaf cube
    pub fn perches(&self) -> Vec<Vec3> {
        self.leaf_cells.iter().map(|c| *c + Vec3::Y * 0.5).collect()
    }
}

/// Everything the sampler decides for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLayout {
    pub coord: ChunkCoord,
    pub decorations: DecorationSet,
    pub trees: Vec<Tree>,
    pub village: Option<Village>,
}

impl ChunkLayout {
    pub fn bird_count(&self) -> usize {
        self.trees.iter().map(|t| t.bird_count as usize).sum()
    }
}

/// Deterministic per-chunk placement
pub struct DecorationSampler<'a> {
    seed: u64,
    density: &'a DensityTuning,
    catalog: &'a Catalog,
    terrain: &'a TerrainField,
    patch_phase: (f64, f64),
}

impl<'a> DecorationSampler<'a> {
    pub fn new(
        seed: u64,
        density: &'a DensityTuning,
        catalog: &'a Catalog,
        terrain: &'a TerrainField,
    ) -> Self {
        let patch_phase = (
            roll(seed, 0, 0, salt::PATCH_PHASE_X) * TAU,
            roll(seed, 0, 0, salt::PATCH_PHASE_Z) * TAU,
        );
        Self {
            seed,
            density,
            catalog,
            terrain,
            patch_phase,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn terrain(&self) -> &TerrainField {
        self.terrain
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn density(&self) -> &DensityTuning {
        self.density
    }

    /// Low-frequency patchiness in [0, 1] at a world cell
    pub fn patchiness(&self, wx: i32, wz: i32) -> f64 {
        let (px, pz) = self.patch_phase;
        0.5 + 0.5 * (wx as f64 * PATCH_FREQ_X + px).sin() * (wz as f64 * PATCH_FREQ_Z + pz).cos()
    }

    /// Generate the full layout for a chunk
    pub fn generate_chunk(&self, coord: ChunkCoord) -> ChunkLayout {
        let village = sample_village(self, coord);
        let mut decorations = DecorationSet::default();

        self.place_ground_cover(coord, &mut decorations);
        let trees = self.place_trees(coord, village.as_ref(), &mut decorations);
        self.place_bushes(coord, village.as_ref(), &mut decorations);

        ChunkLayout {
            coord,
            decorations,
            trees,
            village,
        }
    }

    fn place_ground_cover(&self, coord: ChunkCoord, out: &mut DecorationSet) {
        let (ox, oz) = coord.origin_cell();
        let d = self.density;
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let wx = ox.wrapping_add(lx);
                let wz = oz.wrapping_add(lz);
                let patch = self.patchiness(wx, wz);

                if roll(self.seed, wx, wz, salt::DIRT) < d.dirt_patch_ratio {
                    let dirt = self.cell_instance(wx, wz, DecorationKind::DirtPatch, 1);
                    out.push(DecorationKind::DirtPatch, dirt);
                } else if roll(self.seed, wx, wz, salt::GRASS) < d.grass * patch {
                    let n = variants(&self.catalog.grass_tints);
                    let grass = self.cell_instance(wx, wz, DecorationKind::Grass, n);
                    out.push(DecorationKind::Grass, grass);
                }

                if roll(self.seed, wx, wz, salt::FLOWER) < d.flower * patch {
                    let n = variants(&self.catalog.flower_colors);
                    let flower = self.cell_instance(wx, wz, DecorationKind::Flower, n);
                    out.push(DecorationKind::Flower, flower);
                } else if roll(self.seed, wx, wz, salt::MUSHROOM) < d.mushroom * (1.0 - patch) {
                    let n = variants(&self.catalog.mushroom_caps);
                    let mushroom = self.cell_instance(wx, wz, DecorationKind::Mushroom, n);
                    out.push(DecorationKind::Mushroom, mushroom);
                }
            }
        }
    }

    /// Instance jittered inside its cell and sat on the terrain
    fn cell_instance(
        &self,
        wx: i32,
        wz: i32,
        kind: DecorationKind,
        variants: u64,
    ) -> DecorationInstance {
        let x = wx as f32 + range(self.seed, wx, wz, salt::JITTER_X, 0.1, 0.9);
        let z = wz as f32 + range(self.seed, wx, wz, salt::JITTER_Z, 0.1, 0.9);
        DecorationInstance {
            position: self.terrain.surface(x, z),
            yaw: range(self.seed, wx, wz, salt::YAW, 0.0, std::f32::consts::TAU),
            scale: range(self.seed, wx, wz, salt::SCALE, 0.8, 1.2),
            variant: pick(self.seed, wx, wz, kind.variant_salt(), variants) as u8,
        }
    }

    /// Chunk-level attempt position, `margin` cells from the edges
    fn attempt_position(&self, coord: ChunkCoord, base_salt: u64, margin: i32) -> (f64, f64) {
        let span = (CHUNK_SIZE - 2 * margin).max(1) as u64;
        let (ox, oz) = coord.origin_cell();
        let lx = margin as u64 + pick(self.seed, coord.x, coord.z, base_salt + 1, span);
        let lz = margin as u64 + pick(self.seed, coord.x, coord.z, base_salt + 2, span);
        (ox as f64 + lx as f64 + 0.5, oz as f64 + lz as f64 + 0.5)
    }

    fn in_clearing(&self, village: Option<&Village>, x: f64, z: f64) -> bool {
        village.is_some_and(|v| {
            let dx = x - v.center_x;
            let dz = z - v.center_z;
            dx * dx + dz * dz < self.density.village_clearing * self.density.village_clearing
        })
    }

    fn place_trees(
        &self,
        coord: ChunkCoord,
        village: Option<&Village>,
        out: &mut DecorationSet,
    ) -> Vec<Tree> {
        let d = self.density;
        let (cx, cz) = (coord.x, coord.z);
        let mut trees = Vec::new();

        for i in 0..d.tree_attempts {
            let s = salt::TREE + i as u64 * salt::STRIDE;
            if roll(self.seed, cx, cz, s) >= d.tree_chance {
                continue;
            }
            let (x, z) = self.attempt_position(coord, s, 3);
            if self.in_clearing(village, x, z) {
                continue;
            }

            let base = self.terrain.surface(x as f32, z as f32);
            let trunk_height = 3.0 + pick(self.seed, cx, cz, s + 3, 3) as f32;
            let leaf_count = 3 + pick(self.seed, cx, cz, s + 4, 7) as u32;
            let leaf_cells = canopy_cells(base, trunk_height, leaf_count);

            let bird_count = if roll(self.seed, cx, cz, s + 5) < d.bird_chance {
                1 + pick(self.seed, cx, cz, s + 6, 3) as u8
            } else {
                0
            };
            let nested = leaf_count >= d.nest_min_leaf_cells
                && roll(self.seed, cx, cz, s + 7) < d.nest_chance;
            let nest = nested.then(|| base + Vec3::Y * (trunk_height + 1.6));

            let foliage = variants(&self.catalog.foliage_tints);
            let variant = pick(self.seed, cx, cz, s + 8, foliage) as u8;
            let yaw = range(self.seed, cx, cz, s + 9, 0.0, std::f32::consts::TAU);
            let scale = range(self.seed, cx, cz, s + 10, 0.9, 1.15);

            out.push(
                DecorationKind::Tree,
                DecorationInstance {
                    position: base,
                    yaw,
                    scale,
                    variant,
                },
            );
            if let Some(nest) = nest {
                out.push(
                    DecorationKind::Nest,
                    DecorationInstance {
                        position: nest,
                        yaw,
                        scale: 1.0,
                        variant: 0,
                    },
                );
            }

            trees.push(Tree {
                id: TreeId { chunk: coord, index: i },
                base,
                trunk_height,
                leaf_cells,
                nest,
                bird_count,
                variant,
            });
        }
        trees
    }

    fn place_bushes(&self, coord: ChunkCoord, village: Option<&Village>, out: &mut DecorationSet) {
        let d = self.density;
        let (cx, cz) = (coord.x, coord.z);
        let berries = variants(&self.catalog.berry_colors);
        for i in 0..d.bush_attempts {
            let s = salt::BUSH + i as u64 * salt::STRIDE;
            if roll(self.seed, cx, cz, s) >= d.bush_chance {
                continue;
            }
            let (x, z) = self.attempt_position(coord, s, 2);
            if self.in_clearing(village, x, z) {
                continue;
            }
            out.push(
                DecorationKind::Bush,
                DecorationInstance {
                    position: self.terrain.surface(x as f32, z as f32),
                    yaw: range(self.seed, cx, cz, s + 4, 0.0, std::f32::consts::TAU),
                    scale: range(self.seed, cx, cz, s + 5, 0.7, 1.3),
                    variant: pick(self.seed, cx, cz, s + 3, berries) as u8,
                },
            );
        }
    }
}

/// Leaf cube centres: one crowning cell plus a ring below it
fn canopy_cells(base: Vec3, trunk_height: f32, count: u32) -> Vec<Vec3> {
    let top = base + Vec3::Y * (trunk_height + 1.0);
    let ring = count.saturating_sub(1).max(1);
    let mut cells = Vec::with_capacity(count as usize);
    cells.push(top);
    for k in 0..count.saturating_sub(1) {
        let angle = k as f32 * std::f32::consts::TAU / ring as f32;
        cells.push(base + Vec3::new(angle.cos(), trunk_height + 0.2, angle.sin()));
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler_parts() -> (DensityTuning, Catalog, TerrainField) {
        (DensityTuning::default(), Catalog::standard(), TerrainField::default())
    }

    #[test]
    fn test_generation_is_deterministic() {
        let (d, c, t) = sampler_parts();
        let a = DecorationSampler::new(777, &d, &c, &t);
        let b = DecorationSampler::new(777, &d, &c, &t);
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 9), ChunkCoord::new(100, -100)] {
            assert_eq!(a.generate_chunk(coord), b.generate_chunk(coord));
        }
    }

    #[test]
    fn test_tree_ids_unique_with_many_attempts() {
        let (mut d, c, t) = sampler_parts();
        d.tree_attempts = 300;
        d.tree_chance = 1.0;
        d.village_chance = 0.0;
        let layout = DecorationSampler::new(5, &d, &c, &t).generate_chunk(ChunkCoord::new(1, 1));
        assert_eq!(layout.trees.len(), 300);
        let mut ids: Vec<TreeId> = layout.trees.iter().map(|tree| tree.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 300);
        assert_eq!(layout.trees[299].id.index, 299);
    }

    #[test]
    fn test_seed_changes_layout() {
        let (d, c, t) = sampler_parts();
        let a = DecorationSampler::new(1, &d, &c, &t).generate_chunk(ChunkCoord::new(0, 0));
        let b = DecorationSampler::new(2, &d, &c, &t).generate_chunk(ChunkCoord::new(0, 0));
        assert_ne!(a.decorations, b.decorations);
    }

    #[test]
    fn test_instances_stay_inside_chunk_and_on_ground() {
        let (d, c, t) = sampler_parts();
        let sampler = DecorationSampler::new(99, &d, &c, &t);
        let coord = ChunkCoord::new(-2, 5);
        let layout = sampler.generate_chunk(coord);
        let origin = coord.origin();
        for (kind, instances) in layout.decorations.iter() {
            for inst in instances {
                let lx = inst.position.x - origin.x;
                let lz = inst.position.z - origin.z;
                assert!((0.0..CHUNK_SIZE as f32).contains(&lx), "{kind:?} x {lx}");
                assert!((0.0..CHUNK_SIZE as f32).contains(&lz), "{kind:?} z {lz}");
                if kind != DecorationKind::Nest {
                    let ground = t.height_at(inst.position.x, inst.position.z);
                    assert!((inst.position.y - ground).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_nests_need_enough_leaves() {
        let (d, c, t) = sampler_parts();
        let sampler = DecorationSampler::new(5, &d, &c, &t);
        let mut nests = 0;
        for x in -6..6 {
            for z in -6..6 {
                let layout = sampler.generate_chunk(ChunkCoord::new(x, z));
                for tree in &layout.trees {
                    assert!(tree.bird_count <= 3);
                    assert!(!tree.leaf_cells.is_empty());
                    if tree.nest.is_some() {
                        nests += 1;
                        assert!(tree.leaf_cells.len() >= d.nest_min_leaf_cells as usize);
                    }
                }
                let nested = layout.trees.iter().filter(|t| t.nest.is_some()).count();
                assert_eq!(layout.decorations.count(DecorationKind::Nest), nested);
            }
        }
        assert!(nests > 0, "expected some nests across 144 chunks");
    }

    #[test]
    fn test_variants_within_palettes() {
        let (d, c, t) = sampler_parts();
        let layout = DecorationSampler::new(3, &d, &c, &t).generate_chunk(ChunkCoord::new(1, 1));
        for inst in layout.decorations.instances(DecorationKind::Flower) {
            assert!((inst.variant as usize) < c.flower_colors.len());
        }
        for inst in layout.decorations.instances(DecorationKind::Mushroom) {
            assert!((inst.variant as usize) < c.mushroom_caps.len());
        }
    }

    #[test]
    fn test_zero_density_is_empty() {
        let d = DensityTuning {
            dirt_patch_ratio: 0.0,
            grass: 0.0,
            flower: 0.0,
            mushroom: 0.0,
            tree_chance: 0.0,
            bush_chance: 0.0,
            village_chance: 0.0,
            ..DensityTuning::default()
        };
        let (_, c, t) = sampler_parts();
        let layout = DecorationSampler::new(8, &d, &c, &t).generate_chunk(ChunkCoord::new(0, 0));
        assert_eq!(layout.decorations.total(), 0);
        assert!(layout.trees.is_empty());
        assert!(layout.village.is_none());
    }

    #[test]
    fn test_extreme_coordinates_are_total() {
        let (d, c, t) = sampler_parts();
        let sampler = DecorationSampler::new(u64::MAX, &d, &c, &t);
        let layout = sampler.generate_chunk(ChunkCoord::new(i32::MAX, i32::MIN));
        assert_eq!(layout.coord, ChunkCoord::new(i32::MAX, i32::MIN));
    }
}
