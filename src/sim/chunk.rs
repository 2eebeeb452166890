//! Chunk coordinates and the chunk record owned by the streamer

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::decoration::{ChunkLayout, DecorationKind, DecorationInstance, Tree};
use super::entity::EntityId;
use super::village::Village;
use crate::consts::CHUNK_SIZE;

/// Integer (x, z) identifying a square region of `CHUNK_SIZE` world units
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing world (x, z)
    pub fn from_world(x: f32, z: f32) -> Self {
        let size = CHUNK_SIZE as f32;
        Self {
            x: (x / size).floor() as i32,
            z: (z / size).floor() as i32,
        }
    }

    /// World-space integer cell of this chunk's minimum corner
    #[inline]
    pub fn origin_cell(&self) -> (i32, i32) {
        (
            self.x.wrapping_mul(CHUNK_SIZE),
            self.z.wrapping_mul(CHUNK_SIZE),
        )
    }

    /// World-space minimum corner
    #[inline]
    pub fn origin(&self) -> Vec3 {
        let (x, z) = self.origin_cell();
        Vec3::new(x as f32, 0.0, z as f32)
    }

    /// Squared distance in chunk units
    #[inline]
    pub fn distance_sq(&self, other: ChunkCoord) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dz = self.z as i64 - other.z as i64;
        dx * dx + dz * dz
    }

    /// Whether `other` lies inside a circular radius around `self`
    #[inline]
    pub fn within_radius(&self, other: ChunkCoord, radius: u32) -> bool {
        self.distance_sq(other) <= (radius as i64) * (radius as i64)
    }

    /// Every coordinate within `radius`, nearest first then by coordinate
    pub fn neighborhood(&self, radius: u32) -> Vec<ChunkCoord> {
        let r = radius as i32;
        let mut coords: Vec<ChunkCoord> = (-r..=r)
            .flat_map(|dz| (-r..=r).map(move |dx| (dx, dz)))
            .map(|(dx, dz)| ChunkCoord::new(self.x.wrapping_add(dx), self.z.wrapping_add(dz)))
            .filter(|c| self.within_radius(*c, radius))
            .collect();
        coords.sort_by_key(|c| (self.distance_sq(*c), *c));
        coords
    }
}

/// Lifecycle of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Active,
    TornDown,
}

/// A generated chunk and everything it owns
#[derive(Debug, Clone)]
pub struct Chunk {
    coord: ChunkCoord,
    state: ChunkState,
    layout: ChunkLayout,
    entity_ids: Vec<EntityId>,
}

impl Chunk {
    /// Wrap a freshly sampled layout as an Active chunk
    pub fn activate(layout: ChunkLayout) -> Self {
        Self {
            coord: layout.coord,
            state: ChunkState::Active,
            layout,
            entity_ids: Vec::new(),
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    pub fn trees(&self) -> &[Tree] {
        &self.layout.trees
    }

    pub fn village(&self) -> Option<&Village> {
        self.layout.village.as_ref()
    }

    pub fn instances(&self, kind: DecorationKind) -> &[DecorationInstance] {
        self.layout.decorations.instances(kind)
    }

    pub fn entity_ids(&self) -> &[EntityId] {
        &self.entity_ids
    }

    pub(crate) fn adopt(&mut self, id: EntityId) {
        debug_assert_eq!(self.state, ChunkState::Active);
        self.entity_ids.push(id);
    }

    /// Release everything the chunk owns and mark it TornDown
    pub(crate) fn tear_down(&mut self) {
        self.layout.decorations.clear();
        self.layout.trees.clear();
        self.layout.village = None;
        self.entity_ids.clear();
        self.state = ChunkState::TornDown;
    }
}
