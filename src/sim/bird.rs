//! Bird flight AI
//!
//! One state machine per bird: perched on its home tree, or flying in one of
//! four modes. Every flying mode ends in `Returning`, and `Returning` always
//! lands, so a bird can never get stuck in the air.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::decoration::TreeId;
use super::entity::{AiContext, Entity, EntityId, EntityKind, between};
use super::events::WorldEvent;
use crate::tuning::BirdTuning;
use crate::{normalize_angle, yaw_towards};

/// Where a bird lives
#[derive(Debug, Clone, PartialEq)]
pub struct Roost {
    pub tree_id: TreeId,
    pub tree_base: Vec3,
    pub canopy_top: f32,
    /// Landing spots on the canopy; never empty
    pub perches: Vec<Vec3>,
    pub nest: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwoopPhase {
    Dive,
    PullUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnStage {
    /// Heading for a point above the perch
    Approach,
    /// Dropping onto the perch
    Descend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightMode {
    Circling { angle: f32, radius: f32, altitude: f32 },
    Exploring,
    Swooping { phase: SwoopPhase, target: Vec3 },
    Returning { stage: ReturnStage },
}

/// Flight mode without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightModeKind {
    None,
    Circling,
    Exploring,
    Swooping,
    Returning,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BirdState {
    Sitting,
    Flying(FlightMode),
}

#[derive(Debug, Clone)]
pub struct Bird {
    pub state: BirdState,
    /// Seconds left in the current state
    pub state_timer: f32,
    pub roost: Roost,
    pub landing_spot: Vec3,
    pub velocity: Vec3,
    flap_offset: f32,
}

impl Bird {
    pub fn new(roost: Roost, landing_spot: Vec3, state_timer: f32) -> Self {
        debug_assert!(!roost.perches.is_empty(), "a roost needs at least one perch");
        Self {
            state: BirdState::Sitting,
            state_timer,
            roost,
            landing_spot,
            velocity: Vec3::ZERO,
            flap_offset: state_timer * 1.7,
        }
    }

    /// Where the bird should be while sitting
    pub fn perch(&self, nest_raise: f32) -> Vec3 {
        match self.roost.nest {
            Some(nest) => nest + Vec3::Y * nest_raise,
            None => self.landing_spot,
        }
    }

    pub fn is_flying(&self) -> bool {
        matches!(self.state, BirdState::Flying(_))
    }

    pub fn flight_mode(&self) -> FlightModeKind {
        match self.state {
            BirdState::Sitting => FlightModeKind::None,
            BirdState::Flying(FlightMode::Circling { .. }) => FlightModeKind::Circling,
            BirdState::Flying(FlightMode::Exploring) => FlightModeKind::Exploring,
            BirdState::Flying(FlightMode::Swooping { .. }) => FlightModeKind::Swooping,
            BirdState::Flying(FlightMode::Returning { .. }) => FlightModeKind::Returning,
        }
    }

    pub fn state_tag(&self) -> &'static str {
        match self.flight_mode() {
            FlightModeKind::None => "Sitting",
            FlightModeKind::Circling => "Circling",
            FlightModeKind::Exploring => "Exploring",
            FlightModeKind::Swooping => "Swooping",
            FlightModeKind::Returning => "Returning",
        }
    }

    /// Wing angle for the renderer; a continuous function of time in flight
    pub fn wing_flap_angle(&self, elapsed: f32, tuning: &BirdTuning) -> f32 {
        if self.is_flying() {
            (elapsed * tuning.flap_rate + self.flap_offset).sin() * tuning.flap_amplitude
        } else {
            0.0
        }
    }
}

/// Snapshot of an exploring bird for flocking
#[derive(Debug, Clone, Copy)]
struct FlockMember {
    id: EntityId,
    position: Vec3,
    velocity: Vec3,
}

/// Drives every bird once per tick
#[derive(Debug)]
pub struct BirdFlightAi {
    tuning: BirdTuning,
    /// Reused every tick
    flock: Vec<FlockMember>,
}

impl BirdFlightAi {
    pub fn new(tuning: BirdTuning) -> Self {
        Self {
            tuning,
            flock: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &BirdTuning {
        &self.tuning
    }

    pub fn advance(
        &mut self,
        entities: &mut [Entity],
        ctx: &AiContext<'_>,
        rng: &mut Pcg32,
        events: &mut Vec<WorldEvent>,
        dt: f32,
    ) {
        if dt <= 0.0 {
            return;
        }

        // Flocking reads positions from the start of the frame
        self.flock.clear();
        self.flock.extend(entities.iter().filter_map(|e| match &e.kind {
            EntityKind::Bird(b) if b.flight_mode() == FlightModeKind::Exploring => {
                Some(FlockMember {
                    id: e.id,
                    position: e.position,
                    velocity: b.velocity,
                })
            }
            _ => None,
        }));

        for entity in entities.iter_mut() {
            let Entity {
                id,
                position,
                yaw,
                kind: EntityKind::Bird(bird),
                ..
            } = entity
            else {
                continue;
            };
            let mut step = Step {
                tuning: &self.tuning,
                ctx,
                rng: &mut *rng,
                id: *id,
                pos: position,
                yaw,
                bird,
                dt,
                active: ctx.day_factor >= self.tuning.active_day_factor,
            };
            match step.bird.state {
                BirdState::Sitting => step.sit(events),
                BirdState::Flying(FlightMode::Circling {
                    angle,
                    radius,
                    altitude,
                }) => step.circle(angle, radius, altitude),
                BirdState::Flying(FlightMode::Exploring) => step.explore(&self.flock),
                BirdState::Flying(FlightMode::Swooping { phase, target }) => {
                    step.swoop(phase, target)
                }
                BirdState::Flying(FlightMode::Returning { stage }) => step.return_home(stage),
            }
        }
    }
}

/// One bird's update for one tick
struct Step<'a, 'c> {
    tuning: &'a BirdTuning,
    ctx: &'a AiContext<'c>,
    rng: &'a mut Pcg32,
    id: EntityId,
    pos: &'a mut Vec3,
    yaw: &'a mut f32,
    bird: &'a mut Bird,
    dt: f32,
    /// Bright enough for birds to be out
    active: bool,
}

impl Step<'_, '_> {
    fn sit(&mut self, events: &mut Vec<WorldEvent>) {
        let t = self.tuning;
        let perch = self.bird.perch(t.nest_raise);
        if self.pos.distance(perch) > t.perch_drift_limit {
            self.start_return();
            return;
        }

        self.bird.velocity = Vec3::ZERO;
        if self.active && self.rng.random::<f32>() < t.chirp_chance_per_sec * self.dt {
            events.push(WorldEvent::BirdChirp {
                entity: self.id,
                position: *self.pos,
            });
        }

        self.bird.state_timer -= self.dt;
        if self.bird.state_timer > 0.0 {
            return;
        }
        if !self.active {
            self.bird.state_timer = between(self.rng, t.sit_time);
            return;
        }
        self.take_off();
    }

    /// Weighted pick of a flight mode: 50% circle, 35% explore, 15% swoop
    fn take_off(&mut self) {
        let t = self.tuning;
        let roost = &self.bird.roost;
        let r: f32 = self.rng.random();
        if r < 0.5 {
            let offset = *self.pos - roost.tree_base;
            let altitude = roost.canopy_top + between(self.rng, t.circle_altitude);
            self.bird.state = BirdState::Flying(FlightMode::Circling {
                angle: offset.z.atan2(offset.x),
                radius: between(self.rng, t.circle_radius),
                altitude,
            });
            self.bird.state_timer = between(self.rng, t.circle_time);
        } else if r < 0.85 {
            let a = self.rng.random::<f32>() * TAU;
            self.bird.velocity = Vec3::new(a.cos(), 0.5, a.sin()).normalize() * t.min_speed;
            self.bird.state = BirdState::Flying(FlightMode::Exploring);
            self.bird.state_timer = between(self.rng, t.explore_time);
        } else {
            let a = self.rng.random::<f32>() * TAU;
            let d = between(self.rng, (2.0, t.swoop_spread.max(2.0)));
            let x = roost.tree_base.x + a.cos() * d;
            let z = roost.tree_base.z + a.sin() * d;
            let target = self.ctx.terrain.surface(x, z) + Vec3::Y * 1.5;
            self.bird.state = BirdState::Flying(FlightMode::Swooping {
                phase: SwoopPhase::Dive,
                target,
            });
            self.bird.state_timer = t.swoop_timeout;
        }
    }

    fn circle(&mut self, angle: f32, radius: f32, altitude: f32) {
        let t = self.tuning;
        let angle = normalize_angle(angle + t.circle_angular_speed * self.dt);
        let base = self.bird.roost.tree_base;
        let target = Vec3::new(
            base.x + angle.cos() * radius,
            altitude,
            base.z + angle.sin() * radius,
        );
        self.glide_to(target);
        // Look along the orbit
        *self.yaw = yaw_towards(Vec3::new(-angle.sin(), 0.0, angle.cos()));
        self.bird.state = BirdState::Flying(FlightMode::Circling {
            angle,
            radius,
            altitude,
        });

        self.bird.state_timer -= self.dt;
        if self.bird.state_timer <= 0.0 || !self.active {
            if self.bird.roost.nest.is_none() {
                let i = self.rng.random_range(0..self.bird.roost.perches.len());
                self.bird.landing_spot = self.bird.roost.perches[i];
            }
            self.start_return();
        }
    }

    fn explore(&mut self, flock: &[FlockMember]) {
        let t = self.tuning;
        let pos = *self.pos;
        let velocity = self.bird.velocity;

        let mut neighbors = 0u32;
        let mut sum_velocity = Vec3::ZERO;
        let mut sum_position = Vec3::ZERO;
        let mut away = Vec3::ZERO;
        for member in flock.iter().filter(|m| m.id != self.id) {
            let offset = pos - member.position;
            let d = offset.length();
            if d >= t.perception_radius {
                continue;
            }
            neighbors += 1;
            sum_velocity += member.velocity;
            sum_position += member.position;
            if d < t.separation_distance && d > 1e-4 {
                away += offset / (d * d);
            }
        }

        let mut steer = if neighbors > 0 {
            let inv = 1.0 / neighbors as f32;
            let alignment = sum_velocity * inv - velocity;
            let cohesion = (sum_position * inv - pos) - velocity;
            let separation = if away != Vec3::ZERO {
                away.normalize() * t.max_speed - velocity
            } else {
                Vec3::ZERO
            };
            alignment * t.alignment_weight
                + cohesion * t.cohesion_weight
                + separation * t.separation_weight
        } else {
            let a = self.rng.random::<f32>() * TAU;
            Vec3::new(a.cos(), self.rng.random::<f32>() - 0.5, a.sin()) * t.wander_strength
        };

        // Soft leash to home and a cruise band above the canopy
        let roost = &self.bird.roost;
        let to_home = (roost.tree_base - pos).with_y(0.0);
        if to_home.length() > t.leash_radius {
            steer += to_home.normalize() * t.leash_strength;
        }
        if pos.y < roost.canopy_top {
            steer.y += t.leash_strength;
        } else if pos.y > roost.canopy_top + t.leash_radius * 0.5 {
            steer.y -= t.leash_strength;
        }

        let (lo, hi) = speed_band(t);
        let velocity = clamp_speed(velocity + steer * self.dt, lo, hi, *self.yaw);
        let mut next = pos + velocity * self.dt;
        next.y = next.y.max(self.ctx.terrain.height_at(next.x, next.z) + t.min_clearance);
        *self.pos = next;
        self.bird.velocity = velocity;
        face(self.yaw, velocity);

        self.bird.state_timer -= self.dt;
        if self.bird.state_timer <= 0.0 || !self.active {
            self.start_return();
        }
    }

    fn swoop(&mut self, phase: SwoopPhase, target: Vec3) {
        let t = self.tuning;
        self.bird.state_timer -= self.dt;
        if self.bird.state_timer <= 0.0 {
            self.start_return();
            return;
        }

        self.glide_to(target);
        if self.pos.distance(target) >= 1.0 {
            return;
        }
        match phase {
            SwoopPhase::Dive => {
                self.bird.state = BirdState::Flying(FlightMode::Swooping {
                    phase: SwoopPhase::PullUp,
                    target: target + Vec3::Y * t.swoop_pull_up,
                });
            }
            SwoopPhase::PullUp => {
                let offset = *self.pos - self.bird.roost.tree_base;
                let altitude = self.bird.roost.canopy_top + between(self.rng, t.circle_altitude);
                self.bird.state = BirdState::Flying(FlightMode::Circling {
                    angle: offset.z.atan2(offset.x),
                    radius: between(self.rng, t.circle_radius),
                    altitude,
                });
                self.bird.state_timer = between(self.rng, t.circle_time);
            }
        }
    }

    fn return_home(&mut self, stage: ReturnStage) {
        let t = self.tuning;
        let perch = self.bird.perch(t.nest_raise);
        match stage {
            ReturnStage::Approach => {
                let above = perch + Vec3::Y * t.approach_height;
                self.glide_to(above);
                if self.pos.distance(above) < t.approach_tolerance {
                    self.bird.state = BirdState::Flying(FlightMode::Returning {
                        stage: ReturnStage::Descend,
                    });
                }
            }
            ReturnStage::Descend => {
                self.glide_to(perch);
                if self.pos.distance(perch) < t.arrive_tolerance {
                    self.land(perch);
                }
            }
        }
    }

    fn land(&mut self, perch: Vec3) {
        *self.pos = perch;
        self.bird.velocity = Vec3::ZERO;
        self.bird.state = BirdState::Sitting;
        self.bird.state_timer = between(self.rng, self.tuning.sit_time);

        // Face outward from the trunk, with some spread
        let outward = (perch - self.bird.roost.tree_base).with_y(0.0);
        let base_yaw = if outward.length_squared() > 1e-6 {
            yaw_towards(outward)
        } else {
            self.rng.random::<f32>() * TAU
        };
        *self.yaw = normalize_angle(base_yaw + (self.rng.random::<f32>() - 0.5) * FRAC_PI_2);
    }

    fn start_return(&mut self) {
        self.bird.state = BirdState::Flying(FlightMode::Returning {
            stage: ReturnStage::Approach,
        });
    }

    /// Exponential glide toward `target`, bounded to the speed band so it
    /// always arrives in finite time
    fn glide_to(&mut self, target: Vec3) {
        let t = self.tuning;
        let to = target - *self.pos;
        let dist = to.length();
        if dist <= f32::EPSILON {
            self.bird.velocity = Vec3::ZERO;
            return;
        }
        let (lo, hi) = speed_band(t);
        let step = (dist * (t.glide_rate * self.dt).min(1.0))
            .clamp(lo * self.dt, hi * self.dt)
            .min(dist);
        let delta = to / dist * step;
        *self.pos += delta;
        self.bird.velocity = delta / self.dt;
        face(self.yaw, delta);
    }
}

/// Speed band with ordered, finite bounds
fn speed_band(t: &BirdTuning) -> (f32, f32) {
    let lo = if t.min_speed.is_finite() { t.min_speed.max(0.0) } else { 0.0 };
    let hi = if t.max_speed.is_finite() { t.max_speed.max(0.0) } else { lo };
    (lo.min(hi), lo.max(hi))
}

/// Keep speed inside [min, max]; a stalled bird restarts along its heading
fn clamp_speed(v: Vec3, min: f32, max: f32, yaw: f32) -> Vec3 {
    let speed = v.length();
    if speed <= 1e-6 {
        crate::yaw_forward(yaw) * min
    } else {
        v * (speed.clamp(min, max) / speed)
    }
}

/// Turn to face a horizontal direction, leaving yaw alone for vertical motion
fn face(yaw: &mut f32, dir: Vec3) {
    let flat = dir.with_y(0.0);
    if flat.length_squared() > 1e-8 {
        *yaw = yaw_towards(flat);
    }
}
