use crate::helpers::positions::CellCoord;
use crate::world::carts::edges::{Edge, EdgeSet};
use crate::world::{RailGeometry, RailKind, RailLookup, RAIL_HEIGHT, SLOPE_CREST};
use glam::Vec3;
use std::f32::consts::FRAC_1_SQRT_2;

/// Vertical delta above which a rail counts as a slope.
pub const SLOPE_THRESHOLD: f32 = 0.1;

/// Neighbor probe order for slope/axis detection: +Z, +X, -Z, -X.
const PROBE_ORDER: [Edge; 4] = [Edge::South, Edge::East, Edge::North, Edge::West];

/// One rail cell, normalized: classified, oriented into world space, and
/// with its structural connectivity resolved.
#[derive(Debug, Clone)]
pub struct ResolvedRail {
    pub cell: CellCoord,
    pub is_slope: bool,
    pub is_corner: bool,
    pub is_t_junction: bool,
    pub is_accelerator: bool,
    pub connected: EdgeSet,
    pub shape: RailShape,
}

#[derive(Debug, Clone)]
pub enum RailShape {
    /// Oriented world-space polyline along the running surface.
    Flat { points: Vec<Vec3> },
    /// Descending line from crest to foot, with the downhill tangent.
    Slope { high: Vec3, low: Vec3, dir: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Z,
}

/// Normalize the raw geometry of one cell.
///
/// Returns `None` when the cell has no rail or only degenerate geometry
/// (fewer than two points, or non-finite coordinates).
pub fn resolve_rail(lookup: &impl RailLookup, cell: CellCoord) -> Option<ResolvedRail> {
    let geometry = lookup.rail_at(cell)?;
    let points = usable_points(geometry)?;
    let rotation = lookup.rotation_at(cell) % 4;

    let first = points[0];
    let last = points[points.len() - 1];
    let is_slope = (last.y - first.y).abs() > SLOPE_THRESHOLD;
    let is_t_junction = matches!(geometry.kind, RailKind::TJunction | RailKind::Switch);
    let is_accelerator = geometry.kind == RailKind::Accelerator;

    if is_slope {
        let downhill = slope_downhill(lookup, cell);
        let (high, low) = slope_endpoints(cell, downhill);
        let (dx, dz) = downhill.cell_offset();
        let dir = Vec3::new(
            dx as f32 * FRAC_1_SQRT_2,
            -FRAC_1_SQRT_2,
            dz as f32 * FRAC_1_SQRT_2,
        );
        return Some(ResolvedRail {
            cell,
            is_slope: true,
            is_corner: false,
            is_t_junction,
            is_accelerator,
            connected: EdgeSet::EMPTY,
            shape: RailShape::Slope { high, low, dir },
        });
    }

    // Flat geometry: endpoints differing on both horizontal axes form a corner.
    let looks_like_corner =
        (first.x - last.x).abs() > 0.1 && (first.z - last.z).abs() > 0.1;
    let is_corner = geometry.kind == RailKind::Corner || looks_like_corner;

    // Corner points arrive already oriented. Straight rails (and T bars) may
    // come pre-rotated or not, inconsistently, so compare the raw endpoint
    // axis against what the connected neighbors imply and apply at most one
    // 90° correction. The declared rotation index is not trusted here.
    let effective_rotation = if is_corner {
        0
    } else {
        let raw_x_aligned = (last.x - first.x).abs() > (last.z - first.z).abs();
        let desired_x_aligned = flat_axis(lookup, cell) == Axis::X;
        if raw_x_aligned != desired_x_aligned {
            1
        } else {
            0
        }
    };

    let base = cell.base();
    let world_points: Vec<Vec3> = points
        .iter()
        .map(|p| base + rotate_unit(*p, effective_rotation))
        .collect();

    let connected = if is_t_junction {
        t_junction_edges(rotation)
    } else {
        let rot_first = rotate_unit(first, effective_rotation);
        let rot_last = rotate_unit(last, effective_rotation);
        let mut set = EdgeSet::EMPTY;
        set.insert(Edge::from_unit_point(rot_first.x, rot_first.z));
        set.insert(Edge::from_unit_point(rot_last.x, rot_last.z));
        set
    };

    Some(ResolvedRail {
        cell,
        is_slope: false,
        is_corner,
        is_t_junction,
        is_accelerator,
        connected,
        shape: RailShape::Flat {
            points: world_points,
        },
    })
}

/// Declared connectivity of a T-junction by rotation: bar plus stem, one
/// edge always closed.
pub fn t_junction_edges(rotation: u8) -> EdgeSet {
    match rotation % 4 {
        0 => EdgeSet::from_edges(&[Edge::South, Edge::East, Edge::West]), // closed north
        1 => EdgeSet::from_edges(&[Edge::East, Edge::North, Edge::South]), // closed west
        2 => EdgeSet::from_edges(&[Edge::North, Edge::East, Edge::West]), // closed south
        _ => EdgeSet::from_edges(&[Edge::West, Edge::North, Edge::South]), // closed east
    }
}

/// Whether a cell holds usable rail geometry.
pub fn has_rail_at(lookup: &impl RailLookup, cell: CellCoord) -> bool {
    lookup
        .rail_at(cell)
        .map(|g| usable_points(g).is_some())
        .unwrap_or(false)
}

/// Whether rail continues past an edge of a cell, checking the neighbor
/// column one level down and one level up as well (slopes connect there).
pub fn has_rail_toward(lookup: &impl RailLookup, cell: CellCoord, edge: Edge) -> bool {
    let (dx, dz) = edge.cell_offset();
    has_rail_at(lookup, cell.offset(dx, 0, dz))
        || has_rail_at(lookup, cell.offset(dx, -1, dz))
        || has_rail_at(lookup, cell.offset(dx, 1, dz))
}

/// Raw slope profile of a neighbor, if it holds a rail.
fn slope_profile(lookup: &impl RailLookup, cell: CellCoord) -> Option<bool> {
    let points = usable_points(lookup.rail_at(cell)?)?;
    let dy = (points[points.len() - 1].y - points[0].y).abs();
    Some(dy > SLOPE_THRESHOLD)
}

/// Downhill direction of a slope cell. The raw geometry ignores rotation,
/// so the direction is inferred from neighboring rails, first hit wins:
/// any rail one level below, then a flat rail at grade (the foot joins
/// it), then a rail one level above (the crest joins it, downhill is the
/// opposite way). Defaults to +Z.
fn slope_downhill(lookup: &impl RailLookup, cell: CellCoord) -> Edge {
    for edge in PROBE_ORDER {
        let (dx, dz) = edge.cell_offset();
        if has_rail_at(lookup, cell.offset(dx, -1, dz)) {
            return edge;
        }
    }
    for edge in PROBE_ORDER {
        let (dx, dz) = edge.cell_offset();
        if slope_profile(lookup, cell.offset(dx, 0, dz)) == Some(false) {
            return edge;
        }
    }
    for edge in PROBE_ORDER {
        let (dx, dz) = edge.cell_offset();
        if has_rail_at(lookup, cell.offset(dx, 1, dz)) {
            return edge.opposite();
        }
    }
    Edge::South
}

/// Crest and foot of a slope cell for a given downhill direction.
fn slope_endpoints(cell: CellCoord, downhill: Edge) -> (Vec3, Vec3) {
    let base = cell.base();
    let high = base + downhill.opposite().unit_midpoint(SLOPE_CREST);
    let low = base + downhill.unit_midpoint(RAIL_HEIGHT);
    (high, low)
}

/// Axis a flat straight rail should run along, implied by which neighbors
/// actually hold rail. Ambiguous cases fall back to slope neighbors, then
/// default to Z-aligned.
fn flat_axis(lookup: &impl RailLookup, cell: CellCoord) -> Axis {
    let column = |dx: i32, dz: i32| {
        has_rail_at(lookup, cell.offset(dx, 0, dz))
            || has_rail_at(lookup, cell.offset(dx, -1, dz))
            || has_rail_at(lookup, cell.offset(dx, 1, dz))
    };

    let x_axis = column(1, 0) || column(-1, 0);
    let z_axis = column(0, 1) || column(0, -1);

    if x_axis && !z_axis {
        return Axis::X;
    }
    if z_axis && !x_axis {
        return Axis::Z;
    }

    // Both or neither: slope connections are the more reliable hint.
    for edge in PROBE_ORDER {
        let (dx, dz) = edge.cell_offset();
        for dy in [0, -1] {
            if slope_profile(lookup, cell.offset(dx, dy, dz)) == Some(true) {
                return if dx != 0 { Axis::X } else { Axis::Z };
            }
        }
    }
    Axis::Z
}

/// Rotate a unit-cell point around the cell center by quarter turns
/// clockwise. Height is untouched.
fn rotate_unit(p: Vec3, rotation: u8) -> Vec3 {
    let dx = p.x - 0.5;
    let dz = p.z - 0.5;
    let (rx, rz) = match rotation % 4 {
        0 => (dx, dz),
        1 => (dz, -dx),
        2 => (-dx, -dz),
        _ => (-dz, dx),
    };
    Vec3::new(0.5 + rx, p.y, 0.5 + rz)
}

/// Filter out degenerate geometry before it reaches any math.
fn usable_points(geometry: &RailGeometry) -> Option<&[Vec3]> {
    if geometry.points.len() < 2 {
        return None;
    }
    if !geometry.points.iter().all(|p| p.is_finite()) {
        return None;
    }
    Some(&geometry.points)
}
