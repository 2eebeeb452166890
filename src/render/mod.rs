//! Read-only frame snapshots for the renderer
//!
//! The simulation never calls into a graphics API. Each frame the host builds
//! a `FrameView` and uploads what it needs; instance records are `Pod` so
//! batches go to the GPU as raw bytes.

pub mod instance;

pub use instance::{InstanceRaw, ParticleInstance, decoration_tint};

use glam::{Quat, Vec3};

use crate::sim::catalog::HairStyle;
use crate::sim::chunk::ChunkCoord;
use crate::sim::clock::SkyState;
use crate::sim::decoration::DecorationKind;
use crate::sim::entity::{EntityId, EntityKind};
use crate::sim::pose::{AnimationHints, Pose, animate};
use crate::sim::state::{CameraMode, World};
use crate::sim::villager::Profession;

/// One instanced draw: a decoration kind within one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkBatch {
    pub chunk: ChunkCoord,
    pub kind: DecorationKind,
    pub instances: Vec<InstanceRaw>,
}

impl ChunkBatch {
    /// Bytes ready for an instance buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityLook {
    Bird,
    Villager { profession: Profession, hair: HairStyle },
}

/// A creature as the renderer sees it
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub look: EntityLook,
    pub position: Vec3,
    pub rotation: Quat,
    pub state: &'static str,
    pub hints: AnimationHints,
    pub pose: Pose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec3,
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub camera_mode: CameraMode,
    /// Full body is drawn only in third person
    pub show_body: bool,
    /// First-person arms and held item
    pub show_arms: bool,
    pub equipped_item: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub sky: SkyState,
    pub batches: Vec<ChunkBatch>,
    pub houses: Vec<InstanceRaw>,
    pub entities: Vec<EntityView>,
    pub particles: Vec<ParticleInstance>,
    pub player: PlayerView,
}

impl FrameView {
    /// Snapshot everything visible this frame
    pub fn build(world: &World) -> Self {
        let catalog = &world.catalog;

        let mut batches = Vec::new();
        let mut houses = Vec::new();
        for chunk in world.streamer.chunks() {
            for (kind, instances) in chunk.layout().decorations.iter() {
                if instances.is_empty() {
                    continue;
                }
                batches.push(ChunkBatch {
                    chunk: chunk.coord(),
                    kind,
                    instances: instances
                        .iter()
                        .map(|i| InstanceRaw::from_decoration(kind, i, catalog))
                        .collect(),
                });
            }
            if let Some(village) = chunk.village() {
                houses.extend(village.houses.iter().map(|h| InstanceRaw::from_house(h, catalog)));
            }
        }

        let elapsed = world.clock.elapsed();
        let entities = world
            .director
            .entities()
            .iter()
            .map(|e| {
                let (hints, pose) = animate(e, elapsed, world.birds.tuning());
                let look = match &e.kind {
                    EntityKind::Bird(_) => EntityLook::Bird,
                    EntityKind::Villager(v) => EntityLook::Villager {
                        profession: v.profession,
                        hair: catalog.hair_style(v.hair_variant),
                    },
                };
                EntityView {
                    id: e.id,
                    look,
                    position: e.position,
                    rotation: e.orientation(),
                    state: e.state_tag(),
                    hints,
                    pose,
                }
            })
            .collect();

        let particles = world.particles.iter_active().map(ParticleInstance::from).collect();

        let state = world.player.state();
        let third_person = world.camera_mode == CameraMode::ThirdPerson;
        let player = PlayerView {
            position: state.position,
            eye: state.position + Vec3::Y * 0.6,
            yaw: state.yaw,
            pitch: state.pitch,
            camera_mode: world.camera_mode,
            show_body: third_person,
            show_arms: !third_person,
            equipped_item: state.equipped_item,
        };

        Self {
            sky: *world.clock.sky(),
            batches,
            houses,
            entities,
            particles,
            player,
        }
    }

    /// Instances of one kind across all chunks
    pub fn instance_count(&self, kind: DecorationKind) -> usize {
        self.batches
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.instances.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{QualityPreset, Settings};
    use crate::sim::tick::{TickInput, tick};

    fn world() -> World {
        World::new(Settings::from_preset(QualityPreset::Low).with_seed(12345))
    }

    #[test]
    fn test_frame_mirrors_world() {
        let world = world();
        let frame = FrameView::build(&world);
        assert_eq!(frame.entities.len(), world.director.len());
        let generated: usize = world
            .streamer
            .chunks()
            .map(|c| c.layout().decorations.count(DecorationKind::Grass))
            .sum();
        assert_eq!(frame.instance_count(DecorationKind::Grass), generated);
        for batch in &frame.batches {
            assert_eq!(batch.as_bytes().len(), batch.instances.len() * 32);
        }
    }

    #[test]
    fn test_camera_mode_controls_visibility() {
        let mut world = world();
        let frame = FrameView::build(&world);
        assert!(frame.player.show_arms && !frame.player.show_body);

        let third = TickInput {
            camera_mode: CameraMode::ThirdPerson,
            ..Default::default()
        };
        tick(&mut world, &third, 0.016);
        let frame = FrameView::build(&world);
        assert!(frame.player.show_body && !frame.player.show_arms);
    }

    #[test]
    fn test_particles_appear_after_fire() {
        let mut world = world();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &fire, 0.016);
        let frame = FrameView::build(&world);
        assert_eq!(frame.particles.len(), world.particles.active_count());
        assert!(!frame.particles.is_empty());
    }
}
