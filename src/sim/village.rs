//! Village layout
//!
//! A village is rolled once per chunk. Houses sit on a ring around a central
//! well, the farm plot sits between the first two houses, and the resident
//! roster (one more villager than there are houses) is fixed at layout time.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::catalog::variants;
use super::chunk::ChunkCoord;
use super::decoration::DecorationSampler;
use super::hash::{pick, range, roll};
use super::villager::Profession;
use crate::consts::CHUNK_SIZE;

mod salt {
    pub const GATE: u64 = 0x500;
    pub const OFFSET_X: u64 = 0x501;
    pub const OFFSET_Z: u64 = 0x502;
    pub const HOUSES: u64 = 0x503;
    pub const ANGLE: u64 = 0x504;
    pub const PROFESSION: u64 = 0x510;
    pub const HAIR: u64 = 0x520;
    pub const WALLS: u64 = 0x530;
    pub const TIMER: u64 = 0x540;
}

const HOUSE_RING: f32 = 9.0;
const FARM_RING: f32 = 7.0;
const DOOR_OFFSET: f32 = 2.5;
const FARM_HALF_EXTENT: f32 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub position: Vec3,
    /// Facing the well
    pub yaw: f32,
    /// Point in front of the door; residents sleep here
    pub door: Vec3,
    pub wall_variant: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlot {
    pub center: Vec3,
    pub half_extent: f32,
    pub work_points: Vec<Vec3>,
}

/// A resident decided at layout time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub profession: Profession,
    pub home_point: Vec3,
    pub work_point: Option<Vec3>,
    pub hair_variant: u8,
    pub initial_timer: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    pub chunk: ChunkCoord,
    /// Exact centre in f64 so clearing tests match layout math
    pub center_x: f64,
    pub center_z: f64,
    pub houses: Vec<House>,
    pub farm: FarmPlot,
    pub well: Vec3,
    pub residents: Vec<Resident>,
}

impl Village {
    pub fn center(&self) -> Vec3 {
        self.well
    }
}

/// Roll for and lay out the chunk's village, if any
pub fn sample_village(sampler: &DecorationSampler<'_>, coord: ChunkCoord) -> Option<Village> {
    let seed = sampler.seed();
    let (cx, cz) = (coord.x, coord.z);
    if roll(seed, cx, cz, salt::GATE) >= sampler.density().village_chance {
        return None;
    }

    let terrain = sampler.terrain();
    let catalog = sampler.catalog();
    let (ox, oz) = coord.origin_cell();
    let half = (CHUNK_SIZE / 2) as f64;
    let center_x = ox as f64 + half + pick(seed, cx, cz, salt::OFFSET_X, 7) as f64 - 3.0;
    let center_z = oz as f64 + half + pick(seed, cx, cz, salt::OFFSET_Z, 7) as f64 - 3.0;
    let well = terrain.surface(center_x as f32, center_z as f32);

    let house_count = 2 + pick(seed, cx, cz, salt::HOUSES, 2) as usize;
    let base_angle = range(seed, cx, cz, salt::ANGLE, 0.0, TAU);
    let houses: Vec<House> = (0..house_count)
        .map(|i| {
            let angle = base_angle + i as f32 * TAU / house_count as f32;
            let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
            let spot = well + dir * HOUSE_RING;
            let door = well + dir * (HOUSE_RING - DOOR_OFFSET);
            House {
                position: terrain.surface(spot.x, spot.z),
                yaw: crate::yaw_towards(-dir),
                door: terrain.surface(door.x, door.z),
                wall_variant: pick(
                    seed,
                    cx,
                    cz,
                    salt::WALLS + i as u64,
                    variants(&catalog.house_walls),
                ) as u8,
            }
        })
        .collect();

    let farm_angle = base_angle + TAU / (2.0 * house_count as f32);
    let farm_center = well + Vec3::new(farm_angle.cos(), 0.0, farm_angle.sin()) * FARM_RING;
    let work_points = [(-1.0_f32, -1.0_f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
        .iter()
        .map(|&(sx, sz)| {
            let x = farm_center.x + sx * (FARM_HALF_EXTENT - 1.0);
            let z = farm_center.z + sz * (FARM_HALF_EXTENT - 1.0);
            terrain.surface(x, z)
        })
        .collect::<Vec<_>>();
    let farm = FarmPlot {
        center: terrain.surface(farm_center.x, farm_center.z),
        half_extent: FARM_HALF_EXTENT,
        work_points,
    };

    let resident_count = house_count + 1;
    let residents = (0..resident_count)
        .map(|i| {
            // The first resident always farms so the plot is worked
            let profession = if i == 0 {
                Profession::Farmer
            } else {
                Profession::ALL[pick(seed, cx, cz, salt::PROFESSION + i as u64, 4) as usize]
            };
            let work_point = (profession == Profession::Farmer)
                .then(|| farm.work_points[i % farm.work_points.len()]);
            Resident {
                profession,
                home_point: houses[i % houses.len()].door,
                work_point,
                hair_variant: pick(
                    seed,
                    cx,
                    cz,
                    salt::HAIR + i as u64,
                    variants(&catalog.hair_styles),
                ) as u8,
                initial_timer: range(seed, cx, cz, salt::TIMER + i as u64, 1.0, 4.0),
            }
        })
        .collect();

    Some(Village {
        chunk: coord,
        center_x,
        center_z,
        houses,
        farm,
        well,
        residents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::Catalog;
    use crate::sim::terrain::TerrainField;
    use crate::tuning::DensityTuning;

    fn find_village(seed: u64) -> Village {
        let d = DensityTuning::default();
        let c = Catalog::standard();
        let t = TerrainField::default();
        let sampler = DecorationSampler::new(seed, &d, &c, &t);
        (0..64)
            .flat_map(|x| (0..64).map(move |z| ChunkCoord::new(x, z)))
            .find_map(|coord| sample_village(&sampler, coord))
            .expect("a 12% gate must hit within 4096 chunks")
    }

    #[test]
    fn test_village_shape() {
        let village = find_village(12345);
        assert!((2..=3).contains(&village.houses.len()));
        assert_eq!(village.residents.len(), village.houses.len() + 1);
        assert_eq!(village.farm.work_points.len(), 4);
        assert_eq!(village.residents[0].profession, Profession::Farmer);
        for r in &village.residents {
            assert_eq!(r.work_point.is_some(), r.profession == Profession::Farmer);
            assert!(village.houses.iter().any(|h| h.door == r.home_point));
        }
    }

    #[test]
    fn test_village_fits_in_chunk() {
        let village = find_village(4242);
        let origin = village.chunk.origin();
        let max = CHUNK_SIZE as f32;
        let landmarks = [village.farm.center, village.well];
        for p in village.houses.iter().map(|h| h.position).chain(landmarks) {
            assert!((0.0..max).contains(&(p.x - origin.x)));
            assert!((0.0..max).contains(&(p.z - origin.z)));
        }
    }

    #[test]
    fn test_houses_face_the_well() {
        let village = find_village(7);
        for house in &village.houses {
            let facing = crate::yaw_forward(house.yaw);
            let to_well = (village.well - house.position).with_y(0.0).normalize();
            assert!(facing.dot(to_well) > 0.99);
        }
    }
}
