//! Discrete events for the audio collaborator
//!
//! The core decides *when* something is audible; the host decides how it
//! sounds. Events are collected during a tick and drained by the host.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::chunk::ChunkCoord;
use super::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A perched bird may chirp
    BirdChirp { entity: EntityId, position: Vec3 },
    /// A village came into range; start its ambient loop
    VillageAmbientStart { village: ChunkCoord, position: Vec3 },
    /// A village was streamed out; stop its ambient loop
    VillageAmbientStop { village: ChunkCoord },
    /// The player touched down after being airborne
    Footstep { position: Vec3 },
    /// The equipped item was fired
    WeaponFire {
        position: Vec3,
        direction: Vec3,
        item: u8,
    },
}
