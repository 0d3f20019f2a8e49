use crate::world::carts::edges::Edge;
use crate::world::carts::rail_geometry::has_rail_toward;
use crate::world::carts::rail_snap::RailSnap;
use crate::world::RailLookup;
use glam::Vec2;
use log::debug;

/// Resolved exit of a junction cell for an incoming cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionChoice {
    /// Already moving towards a connected, rail-backed edge: keep going
    /// without re-deriving a choice (the cart has turned on an earlier
    /// sub-step and is now just passing through).
    PassThrough(Edge),
    /// T-junction straight-ahead exit.
    Straight(Edge),
    /// Turning exit; the integrator snaps to the cell center and applies
    /// corner friction.
    Turn(Edge),
    /// No rail-backed exit.
    DeadEnd,
}

impl JunctionChoice {
    pub fn exit(self) -> Option<Edge> {
        match self {
            JunctionChoice::PassThrough(e)
            | JunctionChoice::Straight(e)
            | JunctionChoice::Turn(e) => Some(e),
            JunctionChoice::DeadEnd => None,
        }
    }
}

/// Deterministically pick the exit edge of a junction (T-junction or
/// corner) snap for a cart moving in `world_dir`.
///
/// An edge qualifies only when it is both declared connected (by the rail
/// kind and rotation) and rail-backed (a neighbor rail actually exists in
/// that direction). T-junctions prefer straight, then right, then left.
pub fn choose_exit(
    lookup: &impl RailLookup,
    snap: &RailSnap,
    world_dir: Vec2,
) -> JunctionChoice {
    let heading = Edge::from_direction(world_dir);
    let entry = heading.opposite();

    let open = |edge: Edge| snap.connected.contains(edge) && has_rail_toward(lookup, snap.cell, edge);

    if open(heading) {
        return JunctionChoice::PassThrough(heading);
    }

    if snap.is_t_junction {
        let straight = heading;
        let right = straight.turn_right();
        let left = straight.turn_left();

        if open(straight) {
            debug!("t-junction at {:?}: going straight {:?}", snap.cell, straight);
            return JunctionChoice::Straight(straight);
        }
        if open(right) {
            debug!("t-junction at {:?}: turning right to {:?}", snap.cell, right);
            return JunctionChoice::Turn(right);
        }
        if open(left) {
            debug!("t-junction at {:?}: turning left to {:?}", snap.cell, left);
            return JunctionChoice::Turn(left);
        }
    } else {
        // Corner: the single connected edge that is not the entry.
        for edge in Edge::ALL {
            if edge != entry && open(edge) {
                debug!("corner at {:?}: exit {:?}", snap.cell, edge);
                return JunctionChoice::Turn(edge);
            }
        }
    }

    debug!("dead end at {:?}: no rail-backed exit", snap.cell);
    JunctionChoice::DeadEnd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::positions::CellCoord;
    use crate::world::carts::rail_snap::snap_to_cell;
    use crate::world::{RailGeometry, RailGrid};
    use glam::Vec3;

    fn cell(x: i32, y: i32, z: i32) -> CellCoord {
        CellCoord::new(x, y, z)
    }

    /// T-junction at the origin, rotation 0 (connected south/east/west),
    /// with whichever branch rails the test asks for.
    fn t_grid(east: bool, south: bool, west: bool) -> RailGrid {
        let mut grid = RailGrid::new();
        grid.place(cell(0, 0, 0), RailGeometry::t_junction(), 0);
        if east {
            grid.place(cell(1, 0, 0), RailGeometry::straight(), 0);
        }
        if south {
            grid.place(cell(0, 0, 1), RailGeometry::straight(), 0);
        }
        if west {
            grid.place(cell(-1, 0, 0), RailGeometry::straight(), 0);
        }
        grid
    }

    fn t_snap(grid: &RailGrid, incoming: Vec2) -> RailSnap {
        snap_to_cell(grid, Vec3::new(0.5, 0.1, 0.5), cell(0, 0, 0), incoming)
            .expect("junction cell must snap")
    }

    #[test]
    fn t_junction_prefers_straight() {
        let grid = t_grid(true, true, true);
        let dir = Vec2::new(1.0, 0.0); // entering from the west
        let choice = choose_exit(&grid, &t_snap(&grid, dir), dir);
        // Straight ahead is connected and backed: pass through.
        assert_eq!(choice, JunctionChoice::PassThrough(Edge::East));
    }

    #[test]
    fn t_junction_turns_right_when_straight_is_missing() {
        let grid = t_grid(false, true, true);
        let dir = Vec2::new(1.0, 0.0);
        let choice = choose_exit(&grid, &t_snap(&grid, dir), dir);
        assert_eq!(choice, JunctionChoice::Turn(Edge::South));
    }

    #[test]
    fn t_junction_turns_left_as_last_resort() {
        // Entering from the east moving west: straight = west, right =
        // north (closed on rotation 0), left = south.
        let grid = t_grid(true, true, false);
        let dir = Vec2::new(-1.0, 0.0);
        let choice = choose_exit(&grid, &t_snap(&grid, dir), dir);
        assert_eq!(choice, JunctionChoice::Turn(Edge::South));
    }

    #[test]
    fn t_junction_with_no_exit_is_a_dead_end() {
        let grid = t_grid(false, false, true);
        let dir = Vec2::new(1.0, 0.0);
        let choice = choose_exit(&grid, &t_snap(&grid, dir), dir);
        assert_eq!(choice, JunctionChoice::DeadEnd);
    }

    #[test]
    fn switch_navigates_like_a_t_junction() {
        let mut grid = RailGrid::new();
        grid.place(cell(0, 0, 0), RailGeometry::switch(), 0);
        grid.place(cell(0, 0, 1), RailGeometry::straight(), 0);
        grid.place(cell(-1, 0, 0), RailGeometry::straight(), 0);

        let dir = Vec2::new(1.0, 0.0);
        let snap = snap_to_cell(&grid, Vec3::new(0.5, 0.1, 0.5), cell(0, 0, 0), dir)
            .expect("switch cell must snap");
        assert!(snap.is_t_junction);
        assert_eq!(choose_exit(&grid, &snap, dir), JunctionChoice::Turn(Edge::South));
    }

    #[test]
    fn corner_exits_through_its_only_other_edge() {
        let mut grid = RailGrid::new();
        grid.place(cell(0, 0, 0), RailGeometry::corner(Edge::West, Edge::South), 0);
        grid.place(cell(-1, 0, 0), RailGeometry::straight(), 0);
        grid.place(cell(0, 0, 1), RailGeometry::straight(), 0);

        // Entering from the west heading east.
        let east = Vec2::new(1.0, 0.0);
        let snap =
            snap_to_cell(&grid, Vec3::new(0.3, 0.1, 0.5), cell(0, 0, 0), east).unwrap();
        assert_eq!(choose_exit(&grid, &snap, east), JunctionChoice::Turn(Edge::South));

        // Entering from the south heading north exits west.
        let north = Vec2::new(0.0, -1.0);
        let snap =
            snap_to_cell(&grid, Vec3::new(0.5, 0.1, 0.7), cell(0, 0, 0), north).unwrap();
        assert_eq!(choose_exit(&grid, &snap, north), JunctionChoice::Turn(Edge::West));
    }

    #[test]
    fn corner_without_backing_rail_is_a_dead_end() {
        let mut grid = RailGrid::new();
        grid.place(cell(0, 0, 0), RailGeometry::corner(Edge::West, Edge::South), 0);
        grid.place(cell(-1, 0, 0), RailGeometry::straight(), 0);
        // Declared-connected south edge, but no rail behind it.

        let east = Vec2::new(1.0, 0.0);
        let snap =
            snap_to_cell(&grid, Vec3::new(0.3, 0.1, 0.5), cell(0, 0, 0), east).unwrap();
        assert_eq!(choose_exit(&grid, &snap, east), JunctionChoice::DeadEnd);
    }
}
