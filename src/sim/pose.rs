//! Skeleton poses and animation hints
//!
//! The core hands the renderer named joints with local transforms; building a
//! scene graph from them is the renderer's job.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::bird::Bird;
use super::entity::{Entity, EntityKind};
use super::villager::{RoutineState, Villager};
use crate::tuning::BirdTuning;

/// Stride frequency of walking villagers (rad/s)
const STRIDE_RATE: f32 = 8.0;
const STRIDE_SWING: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    Body,
    Head,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    LeftWing,
    RightWing,
    Tail,
}

/// Transform of a joint relative to its parent (the body for everything but
/// the body itself, which is relative to the entity root)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTransform {
    pub joint: Joint,
    pub translation: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    pub joints: Vec<JointTransform>,
}

impl Pose {
    fn with(mut self, joint: Joint, translation: Vec3, rotation: Quat) -> Self {
        self.joints.push(JointTransform {
            joint,
            translation,
            rotation,
        });
        self
    }

    pub fn get(&self, joint: Joint) -> Option<&JointTransform> {
        self.joints.iter().find(|j| j.joint == joint)
    }
}

/// Semantic animation state, so renderers need not re-derive it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationHints {
    pub is_moving: bool,
    pub work_bob_offset: f32,
    pub head_nod: f32,
    pub wing_flap_angle: f32,
    pub leg_swing: f32,
}

/// Hints and pose for any entity at `elapsed` seconds
pub fn animate(entity: &Entity, elapsed: f32, bird_tuning: &BirdTuning) -> (AnimationHints, Pose) {
    match &entity.kind {
        EntityKind::Bird(bird) => bird_pose(bird, elapsed, bird_tuning),
        EntityKind::Villager(villager) => {
            villager_pose(villager, elapsed, entity.id.animation_phase())
        }
    }
}

pub fn bird_pose(bird: &Bird, elapsed: f32, tuning: &BirdTuning) -> (AnimationHints, Pose) {
    let flap = bird.wing_flap_angle(elapsed, tuning);
    let hints = AnimationHints {
        is_moving: bird.is_flying(),
        wing_flap_angle: flap,
        ..AnimationHints::default()
    };

    // Nose follows the climb or dive
    let pitch = if bird.is_flying() && bird.velocity.length_squared() > 1e-6 {
        let v = bird.velocity;
        v.y.atan2(v.with_y(0.0).length()).clamp(-0.8, 0.8)
    } else {
        0.0
    };

    let pose = Pose::default()
        .with(Joint::Body, Vec3::ZERO, Quat::from_rotation_x(pitch))
        .with(Joint::Head, Vec3::new(0.0, 0.12, -0.18), Quat::IDENTITY)
        .with(Joint::LeftWing, Vec3::new(-0.1, 0.05, 0.0), Quat::from_rotation_z(flap))
        .with(Joint::RightWing, Vec3::new(0.1, 0.05, 0.0), Quat::from_rotation_z(-flap))
        .with(Joint::Tail, Vec3::new(0.0, 0.02, 0.2), Quat::from_rotation_x(-pitch * 0.5));
    (hints, pose)
}

pub fn villager_pose(villager: &Villager, elapsed: f32, phase: f32) -> (AnimationHints, Pose) {
    let motion = villager.motion;
    let leg_swing = if motion.is_moving {
        (elapsed * STRIDE_RATE + phase).sin() * STRIDE_SWING
    } else {
        0.0
    };
    let hints = AnimationHints {
        is_moving: motion.is_moving,
        work_bob_offset: motion.work_bob_offset,
        head_nod: motion.head_nod,
        wing_flap_angle: 0.0,
        leg_swing,
    };

    let (arm_pitch, body_drop) = match villager.routine {
        // Both arms hoeing together
        RoutineState::Working => (-0.9 + motion.work_bob_offset * 4.0, motion.work_bob_offset),
        RoutineState::Sleeping => (0.0, -0.1),
        _ => (0.0, 0.0),
    };
    let left_arm = if arm_pitch != 0.0 { arm_pitch } else { -leg_swing };

    let pose = Pose::default()
        .with(Joint::Body, Vec3::new(0.0, 1.0 + body_drop, 0.0), Quat::IDENTITY)
        .with(Joint::Head, Vec3::new(0.0, 0.75, 0.0), Quat::from_rotation_x(motion.head_nod))
        .with(Joint::LeftArm, Vec3::new(-0.4, 0.5, 0.0), Quat::from_rotation_x(left_arm))
        .with(
            Joint::RightArm,
            Vec3::new(0.4, 0.5, 0.0),
            Quat::from_rotation_x(if arm_pitch != 0.0 { arm_pitch } else { leg_swing }),
        )
        .with(Joint::LeftLeg, Vec3::new(-0.15, -0.1, 0.0), Quat::from_rotation_x(leg_swing))
        .with(Joint::RightLeg, Vec3::new(0.15, -0.1, 0.0), Quat::from_rotation_x(-leg_swing));
    (hints, pose)
}
