//! Kinematic player controller
//!
//! No physics engine: movement is integrated directly and the terrain height
//! field is the only collider.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::terrain::TerrainField;
use crate::consts::GRAVITY;
use crate::tuning::PlayerTuning;
use crate::{normalize_angle, yaw_forward};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Centre of the body; feet are `half_height` below
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub yaw: f32,
    /// First-person look only
    pub pitch: f32,
    pub grounded: bool,
    pub running: bool,
    /// Opaque to the simulation
    pub equipped_item: u8,
}

/// Player intent for one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// x strafes right, y walks forward; magnitude above 1 is clamped
    pub movement: Vec2,
    /// Held state; jumps fire on the press edge
    pub jump: bool,
    pub run: bool,
    /// Touch turn stick in [-1, 1]; positive turns right
    pub turn: f32,
    /// Mouse look in radians (x yaw right, y pitch down)
    pub look_delta: Vec2,
}

/// What happened during a step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStep {
    /// Touched down after being airborne
    pub landed: bool,
    pub jumped: bool,
    /// Horizontal distance covered
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    state: PlayerState,
    tuning: PlayerTuning,
    jump_was_held: bool,
}

impl PlayerController {
    /// Spawn standing on the terrain at (x, z)
    pub fn new(tuning: PlayerTuning, terrain: &TerrainField, x: f32, z: f32) -> Self {
        let position = Vec3::new(x, terrain.height_at(x, z) + tuning.half_height, z);
        Self {
            state: PlayerState {
                position,
                vertical_velocity: 0.0,
                yaw: 0.0,
                pitch: 0.0,
                grounded: true,
                running: false,
                equipped_item: 0,
            },
            tuning,
            jump_was_held: false,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn set_equipped_item(&mut self, item: u8) {
        self.state.equipped_item = item;
    }

    /// Unit view direction including pitch
    pub fn look_direction(&self) -> Vec3 {
        let (sp, cp) = self.state.pitch.sin_cos();
        let flat = yaw_forward(self.state.yaw);
        Vec3::new(flat.x * cp, sp, flat.z * cp)
    }

    pub fn advance(&mut self, dt: f32, input: &PlayerInput, terrain: &TerrainField) -> PlayerStep {
        let t = &self.tuning;
        let s = &mut self.state;
        let mut step = PlayerStep::default();

        // Look
        let turn = input.turn.clamp(-1.0, 1.0) * t.turn_speed * dt;
        s.yaw = normalize_angle(s.yaw - turn - input.look_delta.x);
        s.pitch = (s.pitch - input.look_delta.y).clamp(-t.max_pitch, t.max_pitch);

        // Walk
        let magnitude = input.movement.length().min(1.0);
        s.running = input.run && magnitude > t.run_threshold;
        if magnitude > 0.0 {
            let dir = input.movement.normalize_or_zero() * magnitude;
            let forward = yaw_forward(s.yaw);
            let right = Vec3::new(-forward.z, 0.0, forward.x);
            let speed = t.walk_speed * if s.running { t.run_multiplier } else { 1.0 };
            let delta = (right * dir.x + forward * dir.y) * speed * dt;
            s.position += delta;
            step.distance = delta.length();
        }

        // Jump on the press edge only
        let was_grounded = s.grounded;
        if input.jump && !self.jump_was_held && s.grounded {
            s.vertical_velocity = t.jump_impulse;
            s.grounded = false;
            step.jumped = true;
        }
        self.jump_was_held = input.jump;

        // Fall, then resolve against the ground
        let floor = terrain.height_at(s.position.x, s.position.z) + t.half_height;
        if s.grounded && s.position.y - floor <= t.ground_snap {
            s.position.y = floor;
            s.vertical_velocity = 0.0;
        } else {
            s.vertical_velocity -= GRAVITY * dt;
            s.position.y += s.vertical_velocity * dt;
            if s.position.y <= floor {
                s.position.y = floor;
                s.vertical_velocity = 0.0;
                s.grounded = true;
            } else {
                s.grounded = false;
            }
        }

        step.landed = !was_grounded && s.grounded;
        step
    }
}
