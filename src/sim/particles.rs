//! Pooled particle simulation
//!
//! Every slot is allocated up front. Emitting claims free slots, expiry hands
//! them back; nothing allocates after construction.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::GRAVITY;

#[derive(Debug, Clone, Copy, Default)]
pub struct Particle {
    pub active: bool,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds left
    pub life: f32,
    pub max_life: f32,
    pub size_start: f32,
    pub size_end: f32,
    pub color_start: [f32; 4],
    pub color_end: [f32; 4],
    pub rotation: f32,
    pub rotation_speed: f32,
    pub gravity_scale: f32,
    /// Interpolated each advance
    pub size: f32,
    pub color: [f32; 4],
}

/// Ranges a burst samples from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitRequest {
    pub origin: Vec3,
    pub count: u32,
    pub base_velocity: Vec3,
    /// Per-axis ± spread added to `base_velocity`
    pub velocity_jitter: Vec3,
    pub life: (f32, f32),
    pub size: (f32, f32),
    /// End size as a fraction of the start size
    pub end_size_ratio: f32,
    pub color_start: [f32; 4],
    pub color_end: [f32; 4],
    /// ± brightness variation applied to both colours
    pub color_jitter: f32,
    pub gravity_scale: f32,
    /// Largest spin rate (rad/s) in either direction
    pub spin: f32,
}

impl EmitRequest {
    /// Dust kicked up when the player lands
    pub fn landing_dust(feet: Vec3) -> Self {
        Self {
            origin: feet,
            count: 12,
            base_velocity: Vec3::new(0.0, 1.2, 0.0),
            velocity_jitter: Vec3::new(2.0, 0.6, 2.0),
            life: (0.4, 0.9),
            size: (0.15, 0.3),
            end_size_ratio: 2.0,
            color_start: [0.55, 0.45, 0.32, 0.8],
            color_end: [0.6, 0.5, 0.4, 0.0],
            color_jitter: 0.05,
            gravity_scale: 0.2,
            spin: 2.0,
        }
    }

    /// Sparks thrown forward from a fired item
    pub fn muzzle_sparks(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            count: 8,
            base_velocity: direction.normalize_or(Vec3::NEG_Z) * 9.0,
            velocity_jitter: Vec3::splat(1.5),
            life: (0.15, 0.35),
            size: (0.05, 0.1),
            end_size_ratio: 0.2,
            color_start: [1.0, 0.85, 0.4, 1.0],
            color_end: [1.0, 0.3, 0.05, 0.0],
            color_jitter: 0.1,
            gravity_scale: 0.5,
            spin: 8.0,
        }
    }
}

/// What the renderer needs from a live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub position: Vec3,
    pub size: f32,
    pub color: [f32; 4],
    pub rotation: f32,
}

#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Indices of inactive slots
    free: Vec<usize>,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            // Reversed so slot 0 is handed out first
            free: (0..capacity).rev().collect(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.particles.len() - self.free.len()
    }

    /// Activate up to `request.count` slots; returns how many were used
    pub fn emit(&mut self, request: &EmitRequest) -> usize {
        let n = (request.count as usize).min(self.free.len());
        for _ in 0..n {
            let Some(index) = self.free.pop() else { break };
            let rng = &mut self.rng;
            let jitter = Vec3::new(
                signed(rng) * request.velocity_jitter.x,
                signed(rng) * request.velocity_jitter.y,
                signed(rng) * request.velocity_jitter.z,
            );
            let life = sample(rng, request.life).max(f32::EPSILON);
            let size = sample(rng, request.size);
            let shade = signed(rng) * request.color_jitter;
            let color_start = shaded(request.color_start, shade);
            self.particles[index] = Particle {
                active: true,
                position: request.origin,
                velocity: request.base_velocity + jitter,
                life,
                max_life: life,
                size_start: size,
                size_end: size * request.end_size_ratio,
                color_start,
                color_end: shaded(request.color_end, shade),
                rotation: rng.random::<f32>() * std::f32::consts::TAU,
                rotation_speed: signed(rng) * request.spin,
                gravity_scale: request.gravity_scale,
                size,
                color: color_start,
            };
        }
        n
    }

    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for (index, p) in self.particles.iter_mut().enumerate() {
            if !p.active {
                continue;
            }
            p.life -= dt;
            if p.life <= 0.0 {
                p.active = false;
                self.free.push(index);
                continue;
            }
            p.velocity.y -= GRAVITY * p.gravity_scale * dt;
            p.position += p.velocity * dt;
            p.rotation += p.rotation_speed * dt;

            // 1 at birth, 0 at death
            let f = p.life / p.max_life;
            p.size = p.size_end + (p.size_start - p.size_end) * f;
            for i in 0..4 {
                p.color[i] = p.color_end[i] + (p.color_start[i] - p.color_end[i]) * f;
            }
        }
    }

    /// Live particles in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = ParticleView> + '_ {
        self.particles.iter().filter(|p| p.active).map(|p| ParticleView {
            position: p.position,
            size: p.size,
            color: p.color,
            rotation: p.rotation,
        })
    }

    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.active = false;
        }
        self.free.clear();
        self.free.extend((0..self.particles.len()).rev());
    }
}

#[inline]
fn signed(rng: &mut Pcg32) -> f32 {
    rng.random::<f32>() * 2.0 - 1.0
}

#[inline]
fn sample(rng: &mut Pcg32, (lo, hi): (f32, f32)) -> f32 {
    lo + (hi - lo) * rng.random::<f32>()
}

fn shaded(color: [f32; 4], shade: f32) -> [f32; 4] {
    [
        (color[0] + shade).clamp(0.0, 1.0),
        (color[1] + shade).clamp(0.0, 1.0),
        (color[2] + shade).clamp(0.0, 1.0),
        color[3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_caps_at_free_slots() {
        let mut ps = ParticleSystem::new(10, 1);
        let dust = EmitRequest::landing_dust(Vec3::ZERO);
        assert_eq!(ps.emit(&dust), 10);
        assert_eq!(ps.active_count(), 10);
        // Pool exhausted: silently nothing
        assert_eq!(ps.emit(&dust), 0);
        assert_eq!(ps.capacity(), 10);
    }

    #[test]
    fn test_particles_expire_and_free_slots() {
        let mut ps = ParticleSystem::new(32, 2);
        ps.emit(&EmitRequest::muzzle_sparks(Vec3::ZERO, Vec3::X));
        assert_eq!(ps.active_count(), 8);
        for _ in 0..30 {
            ps.advance(0.02);
        }
        assert_eq!(ps.active_count(), 0);
        assert_eq!(ps.iter_active().count(), 0);
        assert_eq!(ps.emit(&EmitRequest::muzzle_sparks(Vec3::ZERO, Vec3::X)), 8);
    }

    #[test]
    fn test_size_and_colour_interpolate() {
        let mut ps = ParticleSystem::new(4, 3);
        let request = EmitRequest {
            count: 1,
            life: (1.0, 1.0),
            size: (1.0, 1.0),
            end_size_ratio: 3.0,
            color_jitter: 0.0,
            color_start: [1.0, 1.0, 1.0, 1.0],
            color_end: [0.0, 0.0, 0.0, 0.0],
            ..EmitRequest::landing_dust(Vec3::ZERO)
        };
        ps.emit(&request);
        ps.advance(0.5);
        let p = ps.iter_active().next().unwrap();
        assert!((p.size - 2.0).abs() < 1e-5);
        assert!((p.color[3] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut ps = ParticleSystem::new(1, 4);
        let request = EmitRequest {
            count: 1,
            base_velocity: Vec3::ZERO,
            velocity_jitter: Vec3::ZERO,
            life: (5.0, 5.0),
            gravity_scale: 1.0,
            ..EmitRequest::landing_dust(Vec3::ZERO)
        };
        ps.emit(&request);
        ps.advance(0.1);
        ps.advance(0.1);
        assert!(ps.iter_active().next().unwrap().position.y < 0.0);
    }

    #[test]
    fn test_pool_never_grows() {
        let mut ps = ParticleSystem::new(16, 5);
        for _ in 0..100 {
            ps.emit(&EmitRequest::landing_dust(Vec3::ZERO));
            ps.advance(0.05);
            assert!(ps.active_count() <= 16);
            assert_eq!(ps.capacity(), 16);
        }
        ps.clear();
        assert_eq!(ps.active_count(), 0);
    }
}
