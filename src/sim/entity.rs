//! Live entities and the director that owns them
//!
//! Every entity is bound to the chunk that spawned it. The director is the
//! only writer of the entity set; the AI components iterate it mutably once
//! per tick and the streamer removes a chunk's entities in the same step the
//! chunk is torn down.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bird::{Bird, Roost};
use super::chunk::{Chunk, ChunkCoord};
use super::hash::range;
use super::terrain::TerrainField;
use super::villager::Villager;

/// Hash salt for initial perch timers
const BIRD_TIMER_SALT: u64 = 0x700;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Per-entity offset so neighbours don't animate in lockstep
    pub fn animation_phase(self) -> f32 {
        self.0 as f32 * 0.37
    }
}

/// Per-frame environment shared by the AI components
#[derive(Debug, Clone, Copy)]
pub struct AiContext<'a> {
    /// Seconds since world creation (drives animation phases)
    pub elapsed: f32,
    pub day_factor: f32,
    pub is_daytime: bool,
    pub player_position: Vec3,
    pub terrain: &'a TerrainField,
}

/// Uniform sample in [lo, hi]; tolerates an empty or inverted range
#[inline]
pub(crate) fn between(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    lo + (hi - lo) * rng.random::<f32>()
}

/// Kind-specific state
#[derive(Debug, Clone)]
pub enum EntityKind {
    Bird(Bird),
    Villager(Villager),
}

/// A live creature
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Owning chunk
    pub chunk: ChunkCoord,
    pub position: Vec3,
    /// Yaw only; there is no pitch or roll to drift
    pub yaw: f32,
    pub kind: EntityKind,
}

impl Entity {
    /// Short state label for debugging and overlays
    pub fn state_tag(&self) -> &'static str {
        match &self.kind {
            EntityKind::Bird(bird) => bird.state_tag(),
            EntityKind::Villager(villager) => villager.routine.as_str(),
        }
    }

    /// Root orientation built from yaw alone
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn as_bird(&self) -> Option<&Bird> {
        match &self.kind {
            EntityKind::Bird(bird) => Some(bird),
            EntityKind::Villager(_) => None,
        }
    }

    pub fn as_villager(&self) -> Option<&Villager> {
        match &self.kind {
            EntityKind::Villager(villager) => Some(villager),
            EntityKind::Bird(_) => None,
        }
    }
}

/// Owner of every live bird and villager
#[derive(Debug, Default)]
pub struct EntityDirector {
    /// Sorted by id for deterministic iteration
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityDirector {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn insert(
        &mut self,
        chunk: &mut Chunk,
        position: Vec3,
        yaw: f32,
        kind: EntityKind,
    ) -> EntityId {
        let id = self.allocate_id();
        chunk.adopt(id);
        self.entities.push(Entity {
            id,
            chunk: chunk.coord(),
            position,
            yaw,
            kind,
        });
        id
    }

    /// Spawn the birds and villagers a freshly activated chunk hosts
    pub fn spawn_for_chunk(&mut self, chunk: &mut Chunk, seed: u64) -> usize {
        let coord = chunk.coord();
        let mut births: Vec<(Vec3, f32, EntityKind)> = Vec::new();

        for tree in chunk.trees() {
            let perches = tree.perches();
            for j in 0..tree.bird_count as usize {
                let roost = Roost {
                    tree_id: tree.id,
                    tree_base: tree.base,
                    canopy_top: tree.canopy_top(),
                    perches: perches.clone(),
                    // One nest per tree; it belongs to the first bird
                    nest: if j == 0 { tree.nest } else { None },
                };
                let landing_spot = perches[j % perches.len()];
                let salt = BIRD_TIMER_SALT + tree.id.index as u64 * 8 + j as u64;
                let timer = range(seed, coord.x, coord.z, salt, 2.0, 10.0);
                let bird = Bird::new(roost, landing_spot, timer);
                let position = bird.perch(0.15);
                let yaw = j as f32 * 2.1;
                births.push((position, yaw, EntityKind::Bird(bird)));
            }
        }

        if let Some(village) = chunk.village() {
            for resident in &village.residents {
                let villager = Villager::from_resident(resident);
                let yaw = crate::yaw_towards(village.well - resident.home_point);
                births.push((resident.home_point, yaw, EntityKind::Villager(villager)));
            }
        }

        let count = births.len();
        for (position, yaw, kind) in births {
            self.insert(chunk, position, yaw, kind);
        }
        if count > 0 {
            log::debug!("Spawned {count} entities for chunk ({}, {})", coord.x, coord.z);
        }
        count
    }

    /// Remove every entity owned by `coord`; returns how many were removed
    pub fn despawn_chunk(&mut self, coord: ChunkCoord) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.chunk != coord);
        before - self.entities.len()
    }

    /// Drop entities whose chunk is no longer active.
    ///
    /// An orphan is a bookkeeping bug: development builds stop here, release
    /// builds shed the orphan and keep running.
    pub fn prune_orphans(&mut self, is_active: impl Fn(ChunkCoord) -> bool) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| {
            let keep = is_active(e.chunk);
            if !keep {
                log::warn!(
                    "Dropping orphaned entity {:?} of chunk ({}, {})",
                    e.id,
                    e.chunk.x,
                    e.chunk.z
                );
            }
            keep
        });
        let dropped = before - self.entities.len();
        debug_assert_eq!(dropped, 0, "entities outlived their chunk");
        dropped
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn owned_by(&self, coord: ChunkCoord) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.chunk == coord)
    }

    pub fn bird_count(&self) -> usize {
        self.entities.iter().filter(|e| e.as_bird().is_some()).count()
    }

    pub fn villager_count(&self) -> usize {
        self.entities.iter().filter(|e| e.as_villager().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::Catalog;
    use crate::sim::decoration::DecorationSampler;
    use crate::sim::terrain::TerrainField;
    use crate::tuning::DensityTuning;

    #[test]
    fn test_animation_phase_is_per_entity() {
        assert_eq!(EntityId(0).animation_phase(), 0.0);
        assert_eq!(EntityId(4).animation_phase(), EntityId(4).animation_phase());
        assert_ne!(EntityId(1).animation_phase(), EntityId(2).animation_phase());
    }

    fn busy_density() -> DensityTuning {
        DensityTuning {
            tree_chance: 1.0,
            bird_chance: 1.0,
            village_chance: 1.0,
            village_clearing: 0.0,
            ..DensityTuning::default()
        }
    }

    fn active_chunk(seed: u64, coord: ChunkCoord, density: &DensityTuning) -> Chunk {
        let catalog = Catalog::standard();
        let terrain = TerrainField::default();
        let sampler = DecorationSampler::new(seed, density, &catalog, &terrain);
        Chunk::activate(sampler.generate_chunk(coord))
    }

    #[test]
    fn test_spawn_binds_entities_to_chunk() {
        let density = busy_density();
        let mut chunk = active_chunk(3, ChunkCoord::new(1, 2), &density);
        let mut director = EntityDirector::new();
        let spawned = director.spawn_for_chunk(&mut chunk, 3);

        let residents = chunk.village().map_or(0, |v| v.residents.len());
        let expected = chunk.layout().bird_count() + residents;
        assert_eq!(spawned, expected);
        assert_eq!(chunk.entity_ids().len(), spawned);
        assert!(director.entities().iter().all(|e| e.chunk == chunk.coord()));
        assert!(director.bird_count() > 0);
        assert!(director.villager_count() >= 3);
    }

    #[test]
    fn test_ids_sorted_and_unique() {
        let density = busy_density();
        let mut director = EntityDirector::new();
        for x in 0..3 {
            let mut chunk = active_chunk(11, ChunkCoord::new(x, 0), &density);
            director.spawn_for_chunk(&mut chunk, 11);
        }
        assert!(director.entities().windows(2).all(|w| w[0].id < w[1].id));
        let middle = director.entities()[director.len() / 2].id;
        assert_eq!(director.get(middle).map(|e| e.id), Some(middle));
    }

    #[test]
    fn test_despawn_removes_only_that_chunk() {
        let density = busy_density();
        let mut director = EntityDirector::new();
        let mut a = active_chunk(5, ChunkCoord::new(0, 0), &density);
        let mut b = active_chunk(5, ChunkCoord::new(0, 1), &density);
        let in_a = director.spawn_for_chunk(&mut a, 5);
        let in_b = director.spawn_for_chunk(&mut b, 5);

        assert_eq!(director.despawn_chunk(a.coord()), in_a);
        assert_eq!(director.len(), in_b);
        assert_eq!(director.owned_by(a.coord()).count(), 0);
        assert_eq!(director.despawn_chunk(a.coord()), 0);
    }

    #[test]
    fn test_first_bird_owns_the_nest() {
        let density = DensityTuning {
            nest_chance: 1.0,
            nest_min_leaf_cells: 0,
            ..busy_density()
        };
        let mut chunk = active_chunk(21, ChunkCoord::new(4, 4), &density);
        let mut director = EntityDirector::new();
        director.spawn_for_chunk(&mut chunk, 21);

        for tree in chunk.trees() {
            let nested = director
                .entities()
                .iter()
                .filter_map(Entity::as_bird)
                .filter(|b| b.roost.tree_id == tree.id && b.roost.nest.is_some())
                .count();
            assert_eq!(nested, 1);
        }
    }

    #[test]
    fn test_bird_spawns_at_its_perch() {
        let density = busy_density();
        let mut chunk = active_chunk(8, ChunkCoord::new(-1, 3), &density);
        let mut director = EntityDirector::new();
        director.spawn_for_chunk(&mut chunk, 8);
        for e in director.entities() {
            if let Some(bird) = e.as_bird() {
                assert!(e.position.distance(bird.perch(0.15)) < 1e-5);
                assert_eq!(e.state_tag(), "Sitting");
            }
        }
    }
}
