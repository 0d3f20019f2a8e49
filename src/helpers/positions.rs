use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Address of one unit rail cell on the grid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    #[inline]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn zero() -> Self {
        Self { x: 0, y: 0, z: 0 }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Cell containing a continuous world position.
    #[inline]
    pub fn from_world(pos: Vec3) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            z: pos.z.floor() as i32,
        }
    }

    /// Minimum corner of the cell as a world position.
    #[inline]
    pub fn base(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Horizontal center of the cell at an explicit height.
    #[inline]
    pub fn center_at(self, y: f32) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, y, self.z as f32 + 0.5)
    }

    #[inline]
    pub fn dist2(&self, other: &CellCoord) -> u32 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        let dz = self.z as i64 - other.z as i64;
        (dx * dx + dy * dy + dz * dz) as u32
    }
}

impl Default for CellCoord {
    fn default() -> Self {
        CellCoord::zero()
    }
}
