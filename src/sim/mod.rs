//! Deterministic simulation module
//!
//! All world logic lives here. This module must be pure and deterministic:
//! - Layout is a pure function of (seed, coordinates)
//! - Seeded RNG only
//! - Stable iteration order (by chunk coordinate and entity ID)
//! - No rendering or platform dependencies

pub mod bird;
pub mod catalog;
pub mod chunk;
pub mod clock;
pub mod decoration;
pub mod entity;
pub mod events;
pub mod hash;
pub mod particles;
pub mod player;
pub mod pose;
pub mod state;
pub mod streamer;
pub mod terrain;
pub mod tick;
pub mod village;
pub mod villager;

pub use bird::{Bird, BirdFlightAi, BirdState, FlightMode, FlightModeKind, Roost};
pub use catalog::{Catalog, HairStyle};
pub use chunk::{Chunk, ChunkCoord, ChunkState};
pub use clock::{DayNightClock, SkyState};
pub use decoration::{
    ChunkLayout, DecorationInstance, DecorationKind, DecorationSampler, Tree, TreeId,
};
pub use entity::{AiContext, Entity, EntityDirector, EntityId, EntityKind};
pub use events::WorldEvent;
pub use particles::{EmitRequest, ParticleSystem, ParticleView};
pub use player::{PlayerController, PlayerInput, PlayerState, PlayerStep};
pub use pose::{AnimationHints, Joint, JointTransform, Pose};
pub use state::{CameraMode, World, WorldStats};
pub use streamer::{StreamReport, WorldStreamer};
pub use terrain::TerrainField;
pub use tick::{TickInput, tick};
pub use village::{FarmPlot, House, Resident, Village};
pub use villager::{Profession, RoutineState, Villager, VillagerRoutineAi};
