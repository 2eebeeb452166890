//! Per-frame simulation step
//!
//! Advances every subsystem once, in a fixed order: clock, entity AI, player,
//! streaming, particles.

use glam::{Vec2, Vec3};

use super::entity::AiContext;
use super::events::WorldEvent;
use super::particles::EmitRequest;
use super::player::PlayerInput;
use super::state::{CameraMode, World};
use crate::consts::MAX_FRAME_DT;

/// Eye height above the body centre
const EYE_OFFSET: f32 = 0.6;
/// Sparks start this far in front of the eye
const MUZZLE_DISTANCE: f32 = 0.8;

/// Host input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// x strafes right, y walks forward
    pub movement: Vec2,
    /// Held state; the player jumps on the press edge
    pub jump: bool,
    pub run: bool,
    /// Fire the equipped item (one-shot)
    pub fire: bool,
    /// Touch turn stick in [-1, 1]
    pub turn: f32,
    /// Mouse look delta in radians
    pub look_delta: Vec2,
    pub camera_mode: CameraMode,
    pub equipped_item: u8,
}

impl TickInput {
    fn player_input(&self) -> PlayerInput {
        PlayerInput {
            movement: self.movement,
            jump: self.jump,
            run: self.run,
            turn: self.turn,
            look_delta: self.look_delta,
        }
    }
}

/// Advance the world by `dt` seconds (clamped to `MAX_FRAME_DT`).
///
/// Events are appended to the world's buffer and stay there until the host
/// calls [`World::drain_events`]; hosts are expected to drain once per frame.
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
    world.frame += 1;
    world.camera_mode = input.camera_mode;
    world.player.set_equipped_item(input.equipped_item);

    // Clock first so AI sees this frame's time of day
    world.clock.advance(dt);

    let ctx = AiContext {
        elapsed: world.clock.elapsed(),
        day_factor: world.clock.day_factor(),
        is_daytime: world.clock.is_daytime(),
        player_position: world.player.position(),
        terrain: &world.terrain,
    };
    world
        .birds
        .advance(world.director.entities_mut(), &ctx, &mut world.rng, &mut world.events, dt);
    world
        .villagers
        .advance(world.director.entities_mut(), &ctx, &mut world.rng, dt);

    let step = world.player.advance(dt, &input.player_input(), &world.terrain);
    if step.landed {
        let feet = world.player.position() - Vec3::Y * world.player.tuning().half_height;
        world.events.push(WorldEvent::Footstep { position: feet });
        world.particles.emit(&EmitRequest::landing_dust(feet));
    }
    if input.fire {
        let eye = world.player.position() + Vec3::Y * EYE_OFFSET;
        let direction = world.player.look_direction();
        world.events.push(WorldEvent::WeaponFire {
            position: eye,
            direction,
            item: input.equipped_item,
        });
        world
            .particles
            .emit(&EmitRequest::muzzle_sparks(eye + direction * MUZZLE_DISTANCE, direction));
    }

    world.stream();
    world.particles.advance(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{QualityPreset, Settings};

    const DT: f32 = 1.0 / 60.0;

    fn walk() -> TickInput {
        TickInput {
            movement: Vec2::new(0.0, 1.0),
            run: true,
            ..Default::default()
        }
    }

    fn small_world(seed: u64) -> World {
        World::new(Settings::from_preset(QualityPreset::Low).with_seed(seed))
    }

    #[test]
    fn test_events_accumulate_until_drained() {
        let mut world = small_world(3);
        world.drain_events();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &fire, DT);
        tick(&mut world, &fire, DT);
        let shots = |events: &[WorldEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, WorldEvent::WeaponFire { .. }))
                .count()
        };
        assert_eq!(shots(world.events()), 2);
        assert_eq!(shots(&world.drain_events()), 2);
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_tick_advances_clock_and_frame() {
        let mut world = small_world(1);
        let before = world.clock.elapsed();
        tick(&mut world, &TickInput::default(), DT);
        assert_eq!(world.frame, 1);
        assert!((world.clock.elapsed() - before - DT).abs() < 1e-6);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut world = small_world(1);
        tick(&mut world, &TickInput::default(), 5.0);
        assert!((world.clock.elapsed() - MAX_FRAME_DT).abs() < 1e-6);
        tick(&mut world, &TickInput::default(), f32::NAN);
        tick(&mut world, &TickInput::default(), -1.0);
        assert!((world.clock.elapsed() - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_landing_emits_footstep_and_dust() {
        let mut world = small_world(2);
        world.drain_events();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut world, &jump, DT);
        let mut landed = false;
        for _ in 0..200 {
            tick(&mut world, &TickInput::default(), DT);
            if world.events().iter().any(|e| matches!(e, WorldEvent::Footstep { .. })) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(world.particles.active_count() > 0);
    }

    #[test]
    fn test_fire_emits_event_with_item() {
        let mut world = small_world(3);
        world.drain_events();
        let fire = TickInput {
            fire: true,
            equipped_item: 2,
            ..Default::default()
        };
        tick(&mut world, &fire, DT);
        let fired: Vec<_> = world
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                WorldEvent::WeaponFire { item, direction, .. } => Some((item, direction)),
                _ => None,
            })
            .collect();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, 2);
        assert!((fired[0].1.length() - 1.0).abs() < 1e-5);
        assert_eq!(world.player.state().equipped_item, 2);
    }

    #[test]
    fn test_walking_streams_and_never_orphans() {
        let mut world = small_world(4);
        let start = world.streamer.center();
        for _ in 0..1_200 {
            tick(&mut world, &walk(), DT);
            world.drain_events();
            for e in world.director.entities() {
                assert!(world.streamer.is_active(e.chunk));
            }
        }
        assert_ne!(world.streamer.center(), start);
        let pos = world.player_position();
        assert!(pos.y >= world.terrain.height_at(pos.x, pos.z));
    }

    #[test]
    fn test_determinism() {
        // Same seed and inputs give the same world
        let mut a = small_world(99999);
        let mut b = small_world(99999);
        let inputs = [
            walk(),
            TickInput {
                turn: 0.5,
                jump: true,
                ..walk()
            },
            TickInput::default(),
            TickInput {
                fire: true,
                ..Default::default()
            },
        ];
        for i in 0..2_000 {
            let input = &inputs[(i / 50) % inputs.len()];
            tick(&mut a, input, DT);
            tick(&mut b, input, DT);
        }

        assert_eq!(a.player.state(), b.player.state());
        assert_eq!(a.director.len(), b.director.len());
        for (ea, eb) in a.director.entities().iter().zip(b.director.entities()) {
            assert_eq!(ea.id, eb.id);
            assert_eq!(ea.position, eb.position);
            assert_eq!(ea.state_tag(), eb.state_tag());
        }
        assert_eq!(a.drain_events(), b.drain_events());
        assert_eq!(a.stats(), b.stats());
    }
}
