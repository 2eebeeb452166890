//! Wildwood - simulation core of an infinite, seed-generated world
//!
//! Core modules:
//! - `sim`: Deterministic world simulation (terrain, decoration, streaming, AI, player, particles)
//! - `render`: Read-only frame snapshots and GPU-ready instance records for the renderer
//! - `settings`: World settings and quality presets
//! - `tuning`: Data-driven behaviour and density tables

pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings, SettingsError};
pub use sim::{TickInput, World, tick};
pub use tuning::Tuning;

use glam::Vec3;

/// World configuration constants
pub mod consts {
    /// Edge length of a square chunk in world units
    pub const CHUNK_SIZE: i32 = 32;
    /// Largest frame delta the core will integrate in one step (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Gravity shared by the player and grounded villagers (units/s²)
    pub const GRAVITY: f32 = 20.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    angle = angle.rem_euclid(2.0 * PI);
    if angle >= PI {
        angle -= 2.0 * PI;
    }
    angle
}

/// Signed shortest rotation from `from` to `to`, in [-π, π)
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Interpolate an angle toward a target along the shortest arc
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    normalize_angle(from + shortest_angle_delta(from, to) * t.clamp(0.0, 1.0))
}

/// Yaw that faces along `dir` in the XZ plane (yaw 0 looks down -Z)
#[inline]
pub fn yaw_towards(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

/// Unit forward vector in the XZ plane for a yaw
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}
