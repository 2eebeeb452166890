//! Villager routine AI
//!
//! Daily routine state machine: work and wander by day, walk home and sleep
//! by night, and stop to look at the player when they come close.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{AiContext, Entity, EntityKind, between};
use super::village::Resident;
use crate::consts::GRAVITY;
use crate::tuning::VillagerTuning;
use crate::{lerp_angle, yaw_towards};

/// Grounded villagers follow the terrain down slopes up to this drop per step
const GROUND_SNAP: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    Farmer,
    Librarian,
    Blacksmith,
    Nitwit,
}

impl Profession {
    pub const ALL: [Profession; 4] = [
        Profession::Farmer,
        Profession::Librarian,
        Profession::Blacksmith,
        Profession::Nitwit,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutineState {
    Idle,
    Wandering,
    GoingToWork,
    Working,
    GoingHome,
    Sleeping,
    LookingAtPlayer,
}

impl RoutineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineState::Idle => "Idle",
            RoutineState::Wandering => "Wandering",
            RoutineState::GoingToWork => "GoingToWork",
            RoutineState::Working => "Working",
            RoutineState::GoingHome => "GoingHome",
            RoutineState::Sleeping => "Sleeping",
            RoutineState::LookingAtPlayer => "LookingAtPlayer",
        }
    }

    /// States that walk toward a target
    pub fn is_travel(&self) -> bool {
        matches!(
            self,
            RoutineState::Wandering | RoutineState::GoingToWork | RoutineState::GoingHome
        )
    }

    /// States a villager may be in while the sun is up
    pub fn is_day_state(&self) -> bool {
        matches!(
            self,
            RoutineState::Idle
                | RoutineState::Wandering
                | RoutineState::GoingToWork
                | RoutineState::Working
        )
    }
}

/// Values the renderer reads to animate a villager
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VillagerMotion {
    pub is_moving: bool,
    pub work_bob_offset: f32,
    pub head_nod: f32,
}

#[derive(Debug, Clone)]
pub struct Villager {
    pub profession: Profession,
    pub routine: RoutineState,
    /// State to resume after looking at the player
    pub saved_state: Option<RoutineState>,
    saved_target: Option<Vec3>,
    pub home_point: Vec3,
    pub work_point: Option<Vec3>,
    pub target: Option<Vec3>,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub state_timer: f32,
    pub hair_variant: u8,
    /// Yaw the villager is turning toward
    pub target_yaw: Option<f32>,
    pub motion: VillagerMotion,
}

impl Villager {
    pub fn from_resident(resident: &Resident) -> Self {
        Self {
            profession: resident.profession,
            routine: RoutineState::Idle,
            saved_state: None,
            saved_target: None,
            home_point: resident.home_point,
            work_point: resident.work_point,
            target: None,
            vertical_velocity: 0.0,
            grounded: true,
            state_timer: resident.initial_timer,
            hair_variant: resident.hair_variant,
            target_yaw: None,
            motion: VillagerMotion::default(),
        }
    }

    fn enter(&mut self, routine: RoutineState, target: Option<Vec3>, timer: f32) {
        self.routine = routine;
        self.target = target;
        self.state_timer = timer;
    }
}

#[derive(Debug)]
pub struct VillagerRoutineAi {
    tuning: VillagerTuning,
}

impl VillagerRoutineAi {
    pub fn new(tuning: VillagerTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &VillagerTuning {
        &self.tuning
    }

    pub fn advance(&self, entities: &mut [Entity], ctx: &AiContext<'_>, rng: &mut Pcg32, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for entity in entities.iter_mut() {
            let Entity {
                id,
                position,
                yaw,
                kind: EntityKind::Villager(villager),
                ..
            } = entity
            else {
                continue;
            };
            self.step(villager, position, yaw, ctx, rng, id.animation_phase(), dt);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn step(
        &self,
        v: &mut Villager,
        pos: &mut Vec3,
        yaw: &mut f32,
        ctx: &AiContext<'_>,
        rng: &mut Pcg32,
        phase: f32,
        dt: f32,
    ) {
        let t = &self.tuning;
        v.motion = VillagerMotion::default();

        self.gate_by_time(v, ctx, rng);
        self.check_proximity(v, *pos, ctx, rng);

        match v.routine {
            RoutineState::Idle => {
                v.state_timer -= dt;
                if v.state_timer <= 0.0 && ctx.is_daytime {
                    self.choose_next(v, *pos, rng);
                }
            }
            RoutineState::Wandering | RoutineState::GoingToWork | RoutineState::GoingHome => {
                self.travel(v, pos, rng, dt);
                if v.routine == RoutineState::Wandering {
                    v.state_timer -= dt;
                    if v.state_timer <= 0.0 {
                        self.choose_next(v, *pos, rng);
                    }
                }
            }
            RoutineState::Working => {
                let bob = (ctx.elapsed * t.work_bob_rate + phase).sin();
                v.motion.work_bob_offset = bob * t.work_bob_amplitude;
                v.motion.head_nod = bob * 0.5 * t.work_bob_amplitude;
                v.state_timer -= dt;
                if v.state_timer <= 0.0 {
                    v.enter(RoutineState::Idle, None, between(rng, t.idle_time));
                }
            }
            RoutineState::Sleeping => {
                let settle = (t.sleep_settle_rate * dt).min(1.0);
                pos.x += (v.home_point.x - pos.x) * settle;
                pos.z += (v.home_point.z - pos.z) * settle;
            }
            RoutineState::LookingAtPlayer => {
                v.target_yaw = Some(yaw_towards(ctx.player_position - *pos));
            }
        }

        ground(v, pos, ctx, dt);
        if let Some(target_yaw) = v.target_yaw {
            *yaw = lerp_angle(*yaw, target_yaw, t.turn_rate * dt);
        }
    }

    /// Night sends everyone home; morning wakes the sleepers
    fn gate_by_time(&self, v: &mut Villager, ctx: &AiContext<'_>, rng: &mut Pcg32) {
        if ctx.is_daytime {
            match v.routine {
                RoutineState::Sleeping | RoutineState::GoingHome => {
                    v.enter(RoutineState::Idle, None, between(rng, self.tuning.idle_time));
                }
                // Undo the nightfall rewrite so release by day resumes a day state
                RoutineState::LookingAtPlayer
                    if matches!(
                        v.saved_state,
                        Some(RoutineState::Sleeping | RoutineState::GoingHome)
                    ) =>
                {
                    v.saved_state = Some(RoutineState::Idle);
                    v.saved_target = None;
                }
                _ => {}
            }
            return;
        }
        match v.routine {
            RoutineState::Sleeping | RoutineState::GoingHome => {}
            RoutineState::LookingAtPlayer => {
                v.saved_state = Some(RoutineState::GoingHome);
                v.saved_target = Some(v.home_point);
            }
            _ => v.enter(RoutineState::GoingHome, Some(v.home_point), 0.0),
        }
    }

    fn check_proximity(&self, v: &mut Villager, pos: Vec3, ctx: &AiContext<'_>, rng: &mut Pcg32) {
        let t = &self.tuning;
        let reach = t.interaction_radius * t.interaction_radius;
        let near = (ctx.player_position - pos).with_y(0.0).length_squared() <= reach;
        match v.routine {
            RoutineState::Sleeping => {}
            RoutineState::LookingAtPlayer if !near => {
                let resumed = v.saved_state.take().unwrap_or(RoutineState::Idle);
                let target = v.saved_target.take();
                let timer = between(rng, t.resume_time);
                v.enter(resumed, target, timer);
                if resumed.is_travel() && v.target.is_none() {
                    // Nothing to walk to; settle instead
                    v.routine = RoutineState::Idle;
                }
            }
            RoutineState::LookingAtPlayer => {}
            _ if near => {
                v.saved_state = Some(v.routine);
                v.saved_target = v.target.take();
                v.routine = RoutineState::LookingAtPlayer;
            }
            _ => {}
        }
    }

    /// Daytime decision when an idle or wander timer runs out
    fn choose_next(&self, v: &mut Villager, pos: Vec3, rng: &mut Pcg32) {
        let t = &self.tuning;
        if let (Profession::Farmer, Some(work)) = (v.profession, v.work_point) {
            if rng.random::<f32>() < t.work_chance {
                v.enter(RoutineState::GoingToWork, Some(work), 0.0);
                return;
            }
        }
        let angle = rng.random::<f32>() * TAU;
        let radius = rng.random::<f32>() * t.wander_radius;
        let target = v.home_point + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        let distance = (target - pos).with_y(0.0).length();
        let timer = distance / t.walk_speed.max(f32::EPSILON) + 1.0;
        v.enter(RoutineState::Wandering, Some(target), timer);
    }

    /// Straight-line walk toward the current target; arrival ends the leg
    fn travel(&self, v: &mut Villager, pos: &mut Vec3, rng: &mut Pcg32, dt: f32) {
        let t = &self.tuning;
        let target = match (v.target, v.routine) {
            (Some(target), _) => target,
            (None, RoutineState::GoingHome) => v.home_point,
            (None, RoutineState::GoingToWork) => match v.work_point {
                Some(work) => work,
                None => {
                    v.enter(RoutineState::Idle, None, between(rng, t.idle_time));
                    return;
                }
            },
            _ => {
                v.enter(RoutineState::Idle, None, between(rng, t.idle_time));
                return;
            }
        };
        v.target = Some(target);

        let to = (target - *pos).with_y(0.0);
        if to.length_squared() < t.arrive_distance_sq {
            match v.routine {
                RoutineState::GoingHome => v.enter(RoutineState::Sleeping, None, 0.0),
                RoutineState::GoingToWork => {
                    v.enter(RoutineState::Working, None, between(rng, t.work_time))
                }
                _ => v.enter(RoutineState::Idle, None, between(rng, t.idle_time)),
            }
            return;
        }

        let dist = to.length();
        let step = (t.walk_speed * dt).min(dist);
        *pos += to / dist * step;
        v.target_yaw = Some(yaw_towards(to));
        v.motion.is_moving = true;
    }
}

/// Gravity with a terrain floor, matching the player's grounding rule
fn ground(v: &mut Villager, pos: &mut Vec3, ctx: &AiContext<'_>, dt: f32) {
    let floor = ctx.terrain.height_at(pos.x, pos.z);
    if v.grounded && pos.y - floor <= GROUND_SNAP {
        pos.y = floor;
        v.vertical_velocity = 0.0;
        return;
    }
    v.vertical_velocity -= GRAVITY * dt;
    pos.y += v.vertical_velocity * dt;
    if pos.y <= floor {
        pos.y = floor;
        v.vertical_velocity = 0.0;
        v.grounded = true;
    } else {
        v.grounded = false;
    }
}
