pub mod carts;

use crate::helpers::positions::CellCoord;
use crate::world::carts::edges::Edge;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rail piece classification, attached to the template at registration time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RailKind {
    Straight,
    Corner,
    TJunction,
    Switch,
    Slope,
    Accelerator,
}

/// Height of the running surface above the cell base.
pub const RAIL_HEIGHT: f32 = 0.1;
/// Height of a slope's crest above the cell base.
pub const SLOPE_CREST: f32 = 1.1;

/// Raw path geometry of one rail cell: an ordered polyline in unit-cell
/// space (0-1 per axis) plus a kind tag.
///
/// The points may or may not already be rotated by the source; the
/// geometry resolver sorts that out per cell.
#[derive(Debug, Clone)]
pub struct RailGeometry {
    pub points: Vec<Vec3>,
    pub kind: RailKind,
}

impl RailGeometry {
    pub fn new(points: Vec<Vec3>, kind: RailKind) -> Self {
        Self { points, kind }
    }

    /// Straight run, Z-aligned in raw form.
    pub fn straight() -> Self {
        Self::new(
            vec![
                Vec3::new(0.5, RAIL_HEIGHT, 0.0),
                Vec3::new(0.5, RAIL_HEIGHT, 1.0),
            ],
            RailKind::Straight,
        )
    }

    /// Accelerator rail: straight run that boosts carts passing over it.
    pub fn accelerator() -> Self {
        Self {
            kind: RailKind::Accelerator,
            ..Self::straight()
        }
    }

    /// Corner joining two (non-opposite) edges through the cell center.
    /// Corner geometry arrives already oriented, so the edges are explicit.
    pub fn corner(a: Edge, b: Edge) -> Self {
        Self::new(
            vec![
                a.unit_midpoint(RAIL_HEIGHT),
                Vec3::new(0.5, RAIL_HEIGHT, 0.5),
                b.unit_midpoint(RAIL_HEIGHT),
            ],
            RailKind::Corner,
        )
    }

    /// T-junction. The raw geometry only encodes the bar (east-west);
    /// the stem and the closed edge come from the rotation table.
    pub fn t_junction() -> Self {
        Self::new(
            vec![
                Vec3::new(0.0, RAIL_HEIGHT, 0.5),
                Vec3::new(1.0, RAIL_HEIGHT, 0.5),
            ],
            RailKind::TJunction,
        )
    }

    /// Switch: navigates like a T-junction (deterministic exit priority).
    pub fn switch() -> Self {
        Self {
            kind: RailKind::Switch,
            ..Self::t_junction()
        }
    }

    /// 45° slope, raw form descending along +Z. The actual downhill
    /// direction is ignored here and probed from neighbors instead.
    pub fn slope() -> Self {
        Self::new(
            vec![
                Vec3::new(0.5, SLOPE_CREST, 0.0),
                Vec3::new(0.5, RAIL_HEIGHT, 1.0),
            ],
            RailKind::Slope,
        )
    }
}

/// Read-only world queries the physics core depends on.
pub trait RailLookup {
    /// Raw rail geometry of a cell, if the cell holds a rail.
    fn rail_at(&self, cell: CellCoord) -> Option<&RailGeometry>;

    /// Declared rotation index of a cell, 0..=3 (quarter turns clockwise).
    fn rotation_at(&self, cell: CellCoord) -> u8;
}

#[derive(Debug, Clone)]
pub struct RailCell {
    pub geometry: RailGeometry,
    pub rotation: u8,
}

/// In-memory rail network, the `RailLookup` used by the simulation host
/// and by every test fixture.
#[derive(Debug, Default)]
pub struct RailGrid {
    cells: HashMap<CellCoord, RailCell>,
}

impl RailGrid {
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    pub fn place(&mut self, cell: CellCoord, geometry: RailGeometry, rotation: u8) {
        self.cells.insert(
            cell,
            RailCell {
                geometry,
                rotation: rotation % 4,
            },
        );
    }

    pub fn remove(&mut self, cell: CellCoord) -> Option<RailCell> {
        self.cells.remove(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellCoord, &RailCell)> {
        self.cells.iter()
    }
}

impl RailLookup for RailGrid {
    #[inline]
    fn rail_at(&self, cell: CellCoord) -> Option<&RailGeometry> {
        self.cells.get(&cell).map(|c| &c.geometry)
    }

    #[inline]
    fn rotation_at(&self, cell: CellCoord) -> u8 {
        self.cells.get(&cell).map(|c| c.rotation).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_stores_and_removes_cells() {
        let mut grid = RailGrid::new();
        let cell = CellCoord::new(1, 0, 2);
        grid.place(cell, RailGeometry::straight(), 1);

        assert_eq!(grid.len(), 1);
        assert!(grid.rail_at(cell).is_some());
        assert_eq!(grid.rotation_at(cell), 1);
        assert!(grid.rail_at(CellCoord::zero()).is_none());

        grid.remove(cell);
        assert!(grid.is_empty());
    }

    #[test]
    fn rotation_wraps_to_quarter_turns() {
        let mut grid = RailGrid::new();
        grid.place(CellCoord::zero(), RailGeometry::t_junction(), 5);
        assert_eq!(grid.rotation_at(CellCoord::zero()), 1);
    }

    #[test]
    fn corner_template_touches_both_edges() {
        let corner = RailGeometry::corner(Edge::West, Edge::South);
        let first = corner.points.first().unwrap();
        let last = corner.points.last().unwrap();
        assert_eq!(*first, Vec3::new(0.0, RAIL_HEIGHT, 0.5));
        assert_eq!(*last, Vec3::new(0.5, RAIL_HEIGHT, 1.0));
    }
}
