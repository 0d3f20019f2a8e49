use glam::Vec2;

/// Cardinal edge of a rail cell.
/// Convention: west = -X, east = +X, south = +Z, north = -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    West,
    East,
    South,
    North,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::West, Edge::East, Edge::South, Edge::North];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Edge::West => 0,
            Edge::East => 1,
            Edge::South => 2,
            Edge::North => 3,
        }
    }

    #[inline]
    pub fn opposite(self) -> Edge {
        match self {
            Edge::West => Edge::East,
            Edge::East => Edge::West,
            Edge::South => Edge::North,
            Edge::North => Edge::South,
        }
    }

    /// Exit edge after a clockwise (right-hand) turn.
    #[inline]
    pub fn turn_right(self) -> Edge {
        match self {
            Edge::North => Edge::East,
            Edge::East => Edge::South,
            Edge::South => Edge::West,
            Edge::West => Edge::North,
        }
    }

    /// Exit edge after a counter-clockwise (left-hand) turn.
    #[inline]
    pub fn turn_left(self) -> Edge {
        match self {
            Edge::North => Edge::West,
            Edge::West => Edge::South,
            Edge::South => Edge::East,
            Edge::East => Edge::North,
        }
    }

    /// Horizontal cell offset of the neighbor behind this edge.
    #[inline]
    pub fn cell_offset(self) -> (i32, i32) {
        match self {
            Edge::West => (-1, 0),
            Edge::East => (1, 0),
            Edge::South => (0, 1),
            Edge::North => (0, -1),
        }
    }

    /// Unit direction that exits through this edge. `x` is world X, `y` is world Z.
    #[inline]
    pub fn direction(self) -> Vec2 {
        let (dx, dz) = self.cell_offset();
        Vec2::new(dx as f32, dz as f32)
    }

    /// Edge a movement direction is heading towards.
    #[inline]
    pub fn from_direction(dir: Vec2) -> Edge {
        if dir.x.abs() > dir.y.abs() {
            if dir.x > 0.0 {
                Edge::East
            } else {
                Edge::West
            }
        } else if dir.y > 0.0 {
            Edge::South
        } else {
            Edge::North
        }
    }

    /// Nearest edge to a point in unit-cell coordinates (0-1 per axis).
    pub fn from_unit_point(x: f32, z: f32) -> Edge {
        let dist_west = x;
        let dist_east = 1.0 - x;
        let dist_north = z;
        let dist_south = 1.0 - z;

        let min = dist_west.min(dist_east).min(dist_north).min(dist_south);
        if min == dist_west {
            Edge::West
        } else if min == dist_east {
            Edge::East
        } else if min == dist_north {
            Edge::North
        } else {
            Edge::South
        }
    }

    /// Midpoint of this edge in unit-cell coordinates at a given height.
    #[inline]
    pub fn unit_midpoint(self, y: f32) -> glam::Vec3 {
        match self {
            Edge::West => glam::Vec3::new(0.0, y, 0.5),
            Edge::East => glam::Vec3::new(1.0, y, 0.5),
            Edge::South => glam::Vec3::new(0.5, y, 1.0),
            Edge::North => glam::Vec3::new(0.5, y, 0.0),
        }
    }
}

/// Set of cell edges a rail piece declares connectable, from its endpoint
/// geometry or rotation table. Whether a neighbor rail actually backs an
/// edge is checked separately at navigation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeSet([bool; 4]);

impl EdgeSet {
    pub const EMPTY: EdgeSet = EdgeSet([false; 4]);

    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut set = Self::EMPTY;
        for &e in edges {
            set.insert(e);
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, edge: Edge) {
        self.0[edge.index()] = true;
    }

    #[inline]
    pub fn contains(self, edge: Edge) -> bool {
        self.0[edge.index()]
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        !self.0.iter().any(|&b| b)
    }

    pub fn iter(self) -> impl Iterator<Item = Edge> {
        Edge::ALL.into_iter().filter(move |e| self.contains(*e))
    }

    pub fn count(self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_and_left_turns_are_inverse() {
        for edge in Edge::ALL {
            assert_eq!(edge.turn_right().turn_left(), edge);
            assert_eq!(edge.turn_left().turn_right(), edge);
            assert_eq!(edge.opposite().opposite(), edge);
        }
    }

    #[test]
    fn heading_east_enters_through_west() {
        let heading = Edge::from_direction(Vec2::new(1.0, 0.0));
        assert_eq!(heading, Edge::East);
        assert_eq!(heading.opposite(), Edge::West);
    }

    #[test]
    fn unit_point_maps_to_nearest_edge() {
        assert_eq!(Edge::from_unit_point(0.0, 0.5), Edge::West);
        assert_eq!(Edge::from_unit_point(1.0, 0.5), Edge::East);
        assert_eq!(Edge::from_unit_point(0.5, 0.05), Edge::North);
        assert_eq!(Edge::from_unit_point(0.5, 0.95), Edge::South);
    }

    #[test]
    fn edge_set_tracks_membership() {
        let set = EdgeSet::from_edges(&[Edge::West, Edge::South]);
        assert!(set.contains(Edge::West));
        assert!(set.contains(Edge::South));
        assert!(!set.contains(Edge::East));
        assert_eq!(set.count(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Edge::West, Edge::South]);
    }
}
