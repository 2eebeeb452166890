//! GPU-ready instance records
//!
//! Plain `#[repr(C)]` structs the renderer can upload without conversion.

use bytemuck::{Pod, Zeroable};

use crate::sim::catalog::{Catalog, tint};
use crate::sim::decoration::{DecorationInstance, DecorationKind};
use crate::sim::particles::ParticleView;
use crate::sim::village::House;

/// One instanced mesh: placement plus tint
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub position: [f32; 3],
    pub yaw: f32,
    pub tint: [f32; 3],
    pub scale: f32,
}

impl InstanceRaw {
    pub fn from_decoration(
        kind: DecorationKind,
        instance: &DecorationInstance,
        catalog: &Catalog,
    ) -> Self {
        Self {
            position: instance.position.to_array(),
            yaw: instance.yaw,
            tint: decoration_tint(kind, instance.variant, catalog),
            scale: instance.scale,
        }
    }

    pub fn from_house(house: &House, catalog: &Catalog) -> Self {
        Self {
            position: house.position.to_array(),
            yaw: house.yaw,
            tint: tint(&catalog.house_walls, house.wall_variant),
            scale: 1.0,
        }
    }
}

/// Billboard particle
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
    pub rotation: f32,
    pub _pad: [f32; 3],
}

impl From<ParticleView> for ParticleInstance {
    fn from(p: ParticleView) -> Self {
        Self {
            position: p.position.to_array(),
            size: p.size,
            color: p.color,
            rotation: p.rotation,
            _pad: [0.0; 3],
        }
    }
}

/// Fixed colours for kinds without a palette
pub mod colors {
    pub const DIRT: [f32; 3] = [0.45, 0.33, 0.22];
    pub const NEST: [f32; 3] = [0.5, 0.38, 0.2];
}

/// Palette colour for a decoration variant
pub fn decoration_tint(kind: DecorationKind, variant: u8, catalog: &Catalog) -> [f32; 3] {
    match kind {
        DecorationKind::DirtPatch => colors::DIRT,
        DecorationKind::Grass => tint(&catalog.grass_tints, variant),
        DecorationKind::Flower => tint(&catalog.flower_colors, variant),
        DecorationKind::Mushroom => tint(&catalog.mushroom_caps, variant),
        DecorationKind::Tree => tint(&catalog.foliage_tints, variant),
        DecorationKind::Bush => tint(&catalog.berry_colors, variant),
        DecorationKind::Nest => colors::NEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_record_sizes_are_gpu_friendly() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 32);
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 48);
    }

    #[test]
    fn test_flower_tint_follows_variant() {
        let catalog = Catalog::standard();
        let instance = DecorationInstance {
            position: Vec3::new(1.0, 2.0, 3.0),
            yaw: 0.5,
            scale: 1.1,
            variant: 2,
        };
        let raw = InstanceRaw::from_decoration(DecorationKind::Flower, &instance, &catalog);
        assert_eq!(raw.tint, catalog.flower_colors[2]);
        assert_eq!(raw.position, [1.0, 2.0, 3.0]);
        let bytes: &[u8] = bytemuck::bytes_of(&raw);
        assert_eq!(bytes.len(), 32);
    }
}
