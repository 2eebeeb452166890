//! Data-driven tuning tables
//!
//! Every constant the simulation consults at runtime lives here so a host can
//! override it from the settings file. Defaults reproduce the shipped world.

use serde::{Deserialize, Serialize};

/// All tuning tables, loaded once at world creation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub density: DensityTuning,
    pub bird: BirdTuning,
    pub villager: VillagerTuning,
    pub player: PlayerTuning,
    pub clock: ClockTuning,
}

/// Placement probabilities for the decoration sampler.
///
/// Kept in f64 so threshold comparisons against hash rolls are exact and
/// stable across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityTuning {
    /// Fraction of cells that become bare dirt
    pub dirt_patch_ratio: f64,
    /// Grass probability at full patchiness
    pub grass: f64,
    /// Flower probability at full patchiness
    pub flower: f64,
    /// Mushroom probability in full shade (inverse patchiness)
    pub mushroom: f64,
    pub tree_attempts: u32,
    pub tree_chance: f64,
    pub bush_attempts: u32,
    pub bush_chance: f64,
    /// Chance a tree hosts 1-3 birds
    pub bird_chance: f64,
    /// Chance a tree with enough leaf cells carries a nest
    pub nest_chance: f64,
    pub nest_min_leaf_cells: u32,
    /// One roll per chunk
    pub village_chance: f64,
    /// No trees or bushes closer than this to a village centre
    pub village_clearing: f64,
}

impl Default for DensityTuning {
    fn default() -> Self {
        Self {
            dirt_patch_ratio: 0.04,
            grass: 0.30,
            flower: 0.05,
            mushroom: 0.012,
            tree_attempts: 5,
            tree_chance: 0.45,
            bush_attempts: 4,
            bush_chance: 0.5,
            bird_chance: 0.35,
            nest_chance: 0.4,
            nest_min_leaf_cells: 5,
            village_chance: 0.12,
            village_clearing: 14.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdTuning {
    /// Perch drift that forces a return flight
    pub perch_drift_limit: f32,
    /// Height a nested bird sits above the nest
    pub nest_raise: f32,
    pub sit_time: (f32, f32),
    pub circle_time: (f32, f32),
    pub circle_radius: (f32, f32),
    /// Altitude above the canopy top
    pub circle_altitude: (f32, f32),
    /// Orbit speed (rad/s)
    pub circle_angular_speed: f32,
    pub explore_time: (f32, f32),
    /// Give up on a swoop that never reaches its target
    pub swoop_timeout: f32,
    pub swoop_pull_up: f32,
    pub swoop_spread: f32,
    pub perception_radius: f32,
    pub separation_distance: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub separation_weight: f32,
    pub wander_strength: f32,
    /// Horizontal distance from home before exploring birds get pulled back
    pub leash_radius: f32,
    pub leash_strength: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Exponential follow rate for glides (1/s)
    pub glide_rate: f32,
    pub approach_height: f32,
    pub approach_tolerance: f32,
    pub arrive_tolerance: f32,
    pub min_clearance: f32,
    /// Below this day factor perched birds stay put and airborne birds head home
    pub active_day_factor: f32,
    pub chirp_chance_per_sec: f32,
    pub flap_rate: f32,
    pub flap_amplitude: f32,
}

impl Default for BirdTuning {
    fn default() -> Self {
        Self {
            perch_drift_limit: 1.5,
            nest_raise: 0.15,
            sit_time: (5.0, 15.0),
            circle_time: (8.0, 16.0),
            circle_radius: (10.0, 20.0),
            circle_altitude: (5.0, 10.0),
            circle_angular_speed: 0.6,
            explore_time: (15.0, 25.0),
            swoop_timeout: 20.0,
            swoop_pull_up: 15.0,
            swoop_spread: 6.0,
            perception_radius: 15.0,
            separation_distance: 3.0,
            alignment_weight: 1.0,
            cohesion_weight: 0.6,
            separation_weight: 1.5,
            wander_strength: 6.0,
            leash_radius: 40.0,
            leash_strength: 4.0,
            min_speed: 4.0,
            max_speed: 9.0,
            glide_rate: 2.0,
            approach_height: 3.0,
            approach_tolerance: 0.5,
            arrive_tolerance: 0.2,
            min_clearance: 2.0,
            active_day_factor: 0.3,
            chirp_chance_per_sec: 0.08,
            flap_rate: 18.0,
            flap_amplitude: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillagerTuning {
    pub walk_speed: f32,
    pub interaction_radius: f32,
    pub wander_radius: f32,
    /// Squared horizontal distance that counts as arrived
    pub arrive_distance_sq: f32,
    pub idle_time: (f32, f32),
    pub work_time: (f32, f32),
    pub resume_time: (f32, f32),
    /// Chance a farmer with a work point heads to work on timer expiry
    pub work_chance: f32,
    /// Yaw interpolation rate (1/s)
    pub turn_rate: f32,
    /// Sleeping villagers ease toward home at this rate (1/s)
    pub sleep_settle_rate: f32,
    pub work_bob_rate: f32,
    pub work_bob_amplitude: f32,
}

impl Default for VillagerTuning {
    fn default() -> Self {
        Self {
            walk_speed: 1.6,
            interaction_radius: 4.0,
            wander_radius: 8.0,
            arrive_distance_sq: 0.09,
            idle_time: (2.0, 5.0),
            work_time: (6.0, 12.0),
            resume_time: (0.5, 1.5),
            work_chance: 0.5,
            turn_rate: 8.0,
            sleep_settle_rate: 2.0,
            work_bob_rate: 6.0,
            work_bob_amplitude: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub walk_speed: f32,
    pub run_multiplier: f32,
    /// Movement magnitude required before running kicks in
    pub run_threshold: f32,
    /// Touch turn speed (rad/s at full deflection)
    pub turn_speed: f32,
    pub jump_impulse: f32,
    pub half_height: f32,
    /// Grounded players stick to downhill slopes within this drop
    pub ground_snap: f32,
    pub max_pitch: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            run_multiplier: 1.8,
            run_threshold: 0.1,
            turn_speed: 2.5,
            jump_impulse: 8.0,
            half_height: 0.9,
            ground_snap: 0.35,
            max_pitch: 1.5,
        }
    }
}

/// One sample of the day cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Fraction of the cycle in [0, 1); 0 is midnight
    pub time: f32,
    pub sky: [f32; 3],
    pub fog: [f32; 3],
    pub sun: f32,
    pub ambient: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockTuning {
    /// Seconds per full day
    pub cycle_length: f32,
    /// Seconds added to elapsed time (a fresh world starts in the morning)
    pub start_offset: f32,
    /// Day window as cycle fractions
    pub day_start: f32,
    pub day_end: f32,
    pub keyframes: Vec<Keyframe>,
}

impl Default for ClockTuning {
    fn default() -> Self {
        let cycle_length = 600.0;
        Self {
            cycle_length,
            start_offset: cycle_length * 0.3,
            day_start: 0.23,
            day_end: 0.77,
            keyframes: default_keyframes(),
        }
    }
}

fn default_keyframes() -> Vec<Keyframe> {
    vec![
        Keyframe {
            time: 0.0,
            sky: [0.02, 0.03, 0.09],
            fog: [0.03, 0.04, 0.1],
            sun: 0.0,
            ambient: 0.12,
        },
        Keyframe {
            time: 0.2,
            sky: [0.08, 0.08, 0.2],
            fog: [0.1, 0.1, 0.2],
            sun: 0.0,
            ambient: 0.15,
        },
        Keyframe {
            time: 0.26,
            sky: [0.95, 0.55, 0.35],
            fog: [0.85, 0.6, 0.45],
            sun: 0.45,
            ambient: 0.35,
        },
        Keyframe {
            time: 0.35,
            sky: [0.5, 0.75, 0.95],
            fog: [0.7, 0.8, 0.9],
            sun: 1.0,
            ambient: 0.6,
        },
        Keyframe {
            time: 0.5,
            sky: [0.45, 0.72, 1.0],
            fog: [0.72, 0.84, 0.95],
            sun: 1.2,
            ambient: 0.7,
        },
        Keyframe {
            time: 0.65,
            sky: [0.5, 0.72, 0.92],
            fog: [0.72, 0.8, 0.88],
            sun: 1.0,
            ambient: 0.6,
        },
        Keyframe {
            time: 0.74,
            sky: [0.95, 0.45, 0.3],
            fog: [0.8, 0.5, 0.4],
            sun: 0.45,
            ambient: 0.35,
        },
        Keyframe {
            time: 0.8,
            sky: [0.08, 0.07, 0.18],
            fog: [0.1, 0.09, 0.18],
            sun: 0.0,
            ambient: 0.15,
        },
    ]
}
