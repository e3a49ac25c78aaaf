use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-voxel material flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct VoxelFlags: u8 {
        /// Rendered as a whole unit cube rather than as part of the density surface.
        const IS_BLOCK = 1;
        const IS_GROUND = 2;
    }
}

/// One cell of voxel data: flags, a density byte and an RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Voxel {
    pub flags: VoxelFlags,
    pub density: u8,
    pub color: [u8; 4],
}

impl Voxel {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];

    /// A solid block voxel.
    pub fn block(color: [u8; 4]) -> Self {
        Self {
            flags: VoxelFlags::IS_BLOCK,
            density: 0,
            color,
        }
    }

    /// A density-field voxel sampled by the surface extractor.
    pub fn with_density(density: u8) -> Self {
        Self {
            flags: VoxelFlags::empty(),
            density,
            color: Self::WHITE,
        }
    }

    pub fn is_block(&self) -> bool {
        self.flags.contains(VoxelFlags::IS_BLOCK)
    }

    /// Density scaled to `[0, 2]`; the surface sits at 0.5.
    pub fn density_value(&self) -> f32 {
        f32::from(self.density) / f32::from(u8::MAX) * 2.0
    }

    /// Colour as normalized floats.
    pub fn color_f32(&self) -> [f32; 4] {
        self.color.map(|c| f32::from(c) / f32::from(u8::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_flag() {
        assert!(Voxel::block(Voxel::WHITE).is_block());
        assert!(!Voxel::with_density(200).is_block());
        assert!(!Voxel::default().is_block());
    }

    #[test]
    fn density_scale() {
        assert_eq!(Voxel::with_density(0).density_value(), 0.0);
        assert_eq!(Voxel::with_density(255).density_value(), 2.0);
        assert!(Voxel::with_density(63).density_value() < 0.5);
        assert!(Voxel::with_density(64).density_value() > 0.5);
    }

    #[test]
    fn color_normalized() {
        let v = Voxel::block([255, 0, 51, 255]);
        assert_eq!(v.color_f32(), [1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn flags_combine() {
        let flags = VoxelFlags::IS_BLOCK | VoxelFlags::IS_GROUND;
        assert_eq!(flags.bits(), 3);
        assert!(flags.contains(VoxelFlags::IS_GROUND));
    }
}
