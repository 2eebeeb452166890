//! Chunk streaming around the player
//!
//! Keeps every chunk within the render radius Active and tears down the rest.
//! Work only happens when the player's chunk changes.

use std::collections::BTreeMap;

use super::chunk::{Chunk, ChunkCoord};
use super::decoration::DecorationSampler;
use super::entity::EntityDirector;
use super::events::WorldEvent;

/// Summary of one reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamReport {
    pub center: ChunkCoord,
    /// Nearest first
    pub generated: Vec<ChunkCoord>,
    pub torn_down: Vec<ChunkCoord>,
    pub spawned: usize,
    pub despawned: usize,
}

#[derive(Debug)]
pub struct WorldStreamer {
    chunks: BTreeMap<ChunkCoord, Chunk>,
    render_radius: u32,
    last_center: Option<ChunkCoord>,
}

impl WorldStreamer {
    pub fn new(render_radius: u32) -> Self {
        Self {
            chunks: BTreeMap::new(),
            render_radius,
            last_center: None,
        }
    }

    pub fn render_radius(&self) -> u32 {
        self.render_radius
    }

    /// Chunk the last reconciliation centred on
    pub fn center(&self) -> Option<ChunkCoord> {
        self.last_center
    }

    pub fn is_active(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Active chunks in coordinate order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn active_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bring the active set in line with the player's position.
    ///
    /// Returns `None` when the player is still in the chunk of the previous
    /// call.
    pub fn reconcile(
        &mut self,
        player_x: f32,
        player_z: f32,
        sampler: &DecorationSampler<'_>,
        director: &mut EntityDirector,
        events: &mut Vec<WorldEvent>,
    ) -> Option<StreamReport> {
        let center = ChunkCoord::from_world(player_x, player_z);
        if self.last_center == Some(center) {
            return None;
        }
        self.last_center = Some(center);
        Some(self.rebuild(center, sampler, director, events))
    }

    /// Change the radius and reconcile immediately around the last centre
    pub fn set_render_radius(
        &mut self,
        radius: u32,
        sampler: &DecorationSampler<'_>,
        director: &mut EntityDirector,
        events: &mut Vec<WorldEvent>,
    ) -> Option<StreamReport> {
        self.render_radius = radius;
        let center = self.last_center?;
        Some(self.rebuild(center, sampler, director, events))
    }

    fn rebuild(
        &mut self,
        center: ChunkCoord,
        sampler: &DecorationSampler<'_>,
        director: &mut EntityDirector,
        events: &mut Vec<WorldEvent>,
    ) -> StreamReport {
        let mut report = StreamReport {
            center,
            ..StreamReport::default()
        };

        // Tear down first so nothing outlives its chunk into AI work
        let leaving: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .copied()
            .filter(|c| !center.within_radius(*c, self.render_radius))
            .collect();
        for coord in leaving {
            if let Some(mut chunk) = self.chunks.remove(&coord) {
                if chunk.village().is_some() {
                    events.push(WorldEvent::VillageAmbientStop { village: coord });
                }
                report.despawned += director.despawn_chunk(coord);
                chunk.tear_down();
                report.torn_down.push(coord);
            }
        }

        for coord in center.neighborhood(self.render_radius) {
            if self.chunks.contains_key(&coord) {
                continue;
            }
            let mut chunk = Chunk::activate(sampler.generate_chunk(coord));
            report.spawned += director.spawn_for_chunk(&mut chunk, sampler.seed());
            if let Some(village) = chunk.village() {
                events.push(WorldEvent::VillageAmbientStart {
                    village: coord,
                    position: village.center(),
                });
            }
            log::debug!(
                "Generated chunk ({}, {}): {} decorations, {} trees",
                coord.x,
                coord.z,
                chunk.layout().decorations.total(),
                chunk.trees().len()
            );
            self.chunks.insert(coord, chunk);
            report.generated.push(coord);
        }

        director.prune_orphans(|c| self.chunks.contains_key(&c));

        log::debug!(
            "Streamed around ({}, {}): +{} -{} chunks, {} active",
            center.x,
            center.z,
            report.generated.len(),
            report.torn_down.len(),
            self.chunks.len()
        );
        report
    }

    /// Tear down everything
    pub fn clear(&mut self, director: &mut EntityDirector, events: &mut Vec<WorldEvent>) {
        for (coord, mut chunk) in std::mem::take(&mut self.chunks) {
            if chunk.village().is_some() {
                events.push(WorldEvent::VillageAmbientStop { village: coord });
            }
            director.despawn_chunk(coord);
            chunk.tear_down();
        }
        self.last_center = None;
    }
}
