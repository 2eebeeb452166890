//! World state
//!
//! Everything one running world owns. A world is rebuilt from its seed and
//! settings; there is no save/load surface.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bird::BirdFlightAi;
use super::catalog::Catalog;
use super::clock::DayNightClock;
use super::decoration::DecorationSampler;
use super::entity::EntityDirector;
use super::events::WorldEvent;
use super::particles::ParticleSystem;
use super::player::PlayerController;
use super::streamer::{StreamReport, WorldStreamer};
use super::terrain::TerrainField;
use super::villager::{RoutineState, VillagerRoutineAi};
use crate::settings::Settings;

/// Particle stream is decorrelated from the behaviour stream
const PARTICLE_SEED_SALT: u64 = 0x5eed_9a27_1c1e_0001;

/// Which body parts the renderer should hide
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    FirstPerson,
    ThirdPerson,
}

/// Counters for logging and overlays
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub frame: u64,
    pub active_chunks: usize,
    pub birds: usize,
    pub flying_birds: usize,
    pub villagers: usize,
    pub sleeping_villagers: usize,
    pub particles: usize,
    pub time_of_day: f32,
    pub day_index: u64,
}

#[derive(Debug)]
pub struct World {
    pub seed: u64,
    pub settings: Settings,
    /// Palettes shared by generation and rendering
    pub catalog: Catalog,
    pub terrain: TerrainField,
    pub clock: DayNightClock,
    pub streamer: WorldStreamer,
    pub director: EntityDirector,
    pub birds: BirdFlightAi,
    pub villagers: VillagerRoutineAi,
    pub player: PlayerController,
    pub particles: ParticleSystem,
    pub camera_mode: CameraMode,
    /// Ticks since creation
    pub frame: u64,
    /// Behaviour randomness (flight rolls, wander targets, timers)
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<WorldEvent>,
    last_report: Option<StreamReport>,
}

impl World {
    /// Create a world and stream in the chunks around the spawn point.
    /// Settings that fail validation are replaced by defaults (seed kept).
    pub fn new(settings: Settings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                log::warn!("Using default settings: {err}");
                Settings::default().with_seed(settings.seed)
            }
        };
        let seed = settings.seed;
        let tuning = settings.tuning.clone();
        let terrain = TerrainField::default();
        let capacity = settings.max_particles();

        let mut world = Self {
            seed,
            catalog: Catalog::standard(),
            clock: DayNightClock::new(&tuning.clock),
            streamer: WorldStreamer::new(settings.render_distance()),
            director: EntityDirector::new(),
            birds: BirdFlightAi::new(tuning.bird),
            villagers: VillagerRoutineAi::new(tuning.villager),
            player: PlayerController::new(tuning.player, &terrain, 0.5, 0.5),
            particles: ParticleSystem::new(capacity, seed ^ PARTICLE_SEED_SALT),
            camera_mode: CameraMode::default(),
            frame: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            last_report: None,
            terrain,
            settings,
        };
        world.stream();

        log::info!(
            "World created: seed {}, render distance {}, {} chunks, {} entities",
            seed,
            world.streamer.render_radius(),
            world.streamer.active_count(),
            world.director.len()
        );
        world
    }

    /// Default settings with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Settings::default().with_seed(seed))
    }

    /// Reconcile chunks around the player
    pub(crate) fn stream(&mut self) {
        let pos = self.player.position();
        let sampler = DecorationSampler::new(
            self.seed,
            &self.settings.tuning.density,
            &self.catalog,
            &self.terrain,
        );
        if let Some(report) = self
            .streamer
            .reconcile(pos.x, pos.z, &sampler, &mut self.director, &mut self.events)
        {
            self.last_report = Some(report);
        }
    }

    /// Change render distance at runtime
    pub fn set_render_distance(&mut self, radius: u32) {
        self.settings.render_distance = Some(radius);
        let sampler = DecorationSampler::new(
            self.seed,
            &self.settings.tuning.density,
            &self.catalog,
            &self.terrain,
        );
        if let Some(report) =
            self.streamer
                .set_render_radius(radius, &sampler, &mut self.director, &mut self.events)
        {
            self.last_report = Some(report);
        }
    }

    /// Most recent reconciliation, if any ran
    pub fn last_stream_report(&self) -> Option<&StreamReport> {
        self.last_report.as_ref()
    }

    /// Events collected since the last drain
    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Hand this frame's events to the host
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn player_position(&self) -> Vec3 {
        self.player.position()
    }

    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            frame: self.frame,
            active_chunks: self.streamer.active_count(),
            particles: self.particles.active_count(),
            time_of_day: self.clock.time_of_day(),
            day_index: self.clock.day_index(),
            ..WorldStats::default()
        };
        for e in self.director.entities() {
            if let Some(bird) = e.as_bird() {
                stats.birds += 1;
                stats.flying_birds += bird.is_flying() as usize;
            } else if let Some(villager) = e.as_villager() {
                stats.villagers += 1;
                stats.sleeping_villagers += (villager.routine == RoutineState::Sleeping) as usize;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;
    use crate::sim::chunk::ChunkCoord;

    #[test]
    fn test_new_world_streams_spawn_area() {
        let world = World::with_seed(12345);
        let radius = world.settings.render_distance();
        assert!(world.streamer.is_active(ChunkCoord::new(0, 0)));
        let expected = ChunkCoord::new(0, 0).neighborhood(radius).len();
        assert_eq!(world.streamer.active_count(), expected);
        assert_eq!(world.last_stream_report().map(|r| r.generated.len()), Some(expected));
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let mut settings = Settings::default().with_seed(99);
        settings.tuning.bird.min_speed = 10.0;
        settings.tuning.bird.max_speed = 4.0;
        assert!(settings.validate().is_err());

        let mut world = World::new(settings);
        assert_eq!(world.seed, 99);
        assert_eq!(world.settings.tuning, crate::tuning::Tuning::default());
        assert!(world.birds.tuning().min_speed <= world.birds.tuning().max_speed);
        for _ in 0..600 {
            crate::sim::tick::tick(&mut world, &Default::default(), 1.0 / 30.0);
        }
    }

    #[test]
    fn test_particles_disabled_means_empty_pool() {
        let settings = Settings {
            particles: false,
            ..Settings::from_preset(QualityPreset::Low)
        };
        let world = World::new(settings);
        assert_eq!(world.particles.capacity(), 0);
    }

    #[test]
    fn test_stats_count_entities() {
        let world = World::with_seed(7);
        let stats = world.stats();
        assert_eq!(stats.birds + stats.villagers, world.director.len());
        assert_eq!(stats.flying_birds, 0);
    }

    #[test]
    fn test_render_distance_change() {
        let mut world = World::with_seed(3);
        world.set_render_distance(1);
        assert_eq!(world.streamer.active_count(), 5);
        assert_eq!(world.settings.render_distance(), 1);
    }
}
