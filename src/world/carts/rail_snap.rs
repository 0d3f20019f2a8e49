use crate::helpers::positions::CellCoord;
use crate::world::carts::edges::EdgeSet;
use crate::world::carts::rail_geometry::{resolve_rail, RailShape};
use crate::world::{RailLookup, RAIL_HEIGHT};
use glam::{Vec2, Vec3};

/// A resolved point on the rail network.
#[derive(Debug, Clone)]
pub struct RailSnap {
    pub position: Vec3,
    /// Tangent of the snapped segment. On slopes the positive direction
    /// points downhill (`dir.y < 0`).
    pub dir: Vec3,
    pub cell: CellCoord,
    pub distance_sq: f32,
    pub is_slope: bool,
    pub is_corner: bool,
    pub is_t_junction: bool,
    pub is_accelerator: bool,
    pub connected: EdgeSet,
}

/// Fast-path radius: a snap in the cart's own cell this close wins outright.
const CURRENT_CELL_SNAP_SQ: f32 = 0.25;
/// Parametric overshoot tolerated when projecting onto flat segments.
const SEGMENT_OVERSHOOT: f32 = 0.2;
/// Parametric overshoot tolerated on slopes before the snap is rejected.
const SLOPE_OVERSHOOT: f32 = 0.15;
/// A cart this far below a slope's foot has already left it.
const SLOPE_EXIT_DROP: f32 = 0.3;
/// Candidates behind the preferred direction (dot below this) are penalized.
const BEHIND_DOT: f32 = -0.3;

/// One ring of the widening search.
struct SearchPhase {
    radius: i32,
    y_min: i32,
    y_max: i32,
    /// Skip cells already covered by the near phase.
    skip_inner: bool,
    max_dist_sq: f32,
    /// Flat score added to every candidate of this phase.
    bias: f32,
    behind_penalty_flat: f32,
    /// Small nudge away from near-perpendicular segments.
    perpendicular_penalty: f32,
}

const NEAR_PHASE: SearchPhase = SearchPhase {
    radius: 1,
    y_min: -1,
    y_max: 1,
    skip_inner: false,
    max_dist_sq: 1.5,
    bias: 0.0,
    behind_penalty_flat: 10.0,
    perpendicular_penalty: 0.5,
};

// The wide ring trades discrimination for reach, and deliberately refuses
// to snap across long gaps: stricter distance cap plus a flat bias.
const WIDE_PHASE: SearchPhase = SearchPhase {
    radius: 2,
    y_min: -2,
    y_max: 1,
    skip_inner: true,
    max_dist_sq: 2.0,
    bias: 5.0,
    behind_penalty_flat: 20.0,
    perpendicular_penalty: 0.0,
};

/// Find the best rail snap near a position, biased by a preferred movement
/// direction (zero when unknown).
pub fn find_best_snap(
    lookup: &impl RailLookup,
    query: Vec3,
    preferred: Vec2,
) -> Option<RailSnap> {
    let origin = CellCoord::from_world(query);
    let has_preferred = preferred.length() > 0.01;
    let preferred = if has_preferred {
        preferred.normalize()
    } else {
        Vec2::ZERO
    };

    // Common case: still riding the rail in the current cell.
    if let Some(snap) = snap_to_cell(lookup, query, origin, preferred) {
        if snap.distance_sq <= CURRENT_CELL_SNAP_SQ {
            return Some(snap);
        }
    }

    scan_phase(lookup, query, origin, preferred, has_preferred, &NEAR_PHASE)
        .or_else(|| scan_phase(lookup, query, origin, preferred, has_preferred, &WIDE_PHASE))
}

fn scan_phase(
    lookup: &impl RailLookup,
    query: Vec3,
    origin: CellCoord,
    preferred: Vec2,
    has_preferred: bool,
    phase: &SearchPhase,
) -> Option<RailSnap> {
    let mut best: Option<(f32, RailSnap)> = None;

    for dy in (phase.y_min..=phase.y_max).rev() {
        for dx in -phase.radius..=phase.radius {
            for dz in -phase.radius..=phase.radius {
                if phase.skip_inner
                    && dx.abs() <= 1
                    && dz.abs() <= 1
                    && (-1..=1).contains(&dy)
                {
                    continue;
                }

                let cell = origin.offset(dx, dy, dz);
                let Some(snap) = snap_to_cell(lookup, query, cell, preferred) else {
                    continue;
                };
                if snap.distance_sq > phase.max_dist_sq {
                    continue;
                }

                let mut score = snap.distance_sq + phase.bias;
                if has_preferred {
                    score += behind_penalty(&snap, query, preferred, phase.behind_penalty_flat);
                    if phase.perpendicular_penalty > 0.0 {
                        score += perpendicular_penalty(&snap, preferred, phase.perpendicular_penalty);
                    }
                }

                if best.as_ref().map(|(s, _)| score < *s).unwrap_or(true) {
                    best = Some((score, snap));
                }
            }
        }
    }

    best.map(|(_, snap)| snap)
}

/// Heavy penalty for candidates roughly behind the cart; slopes get double
/// (re-snapping to a slope just left looks terrible).
fn behind_penalty(snap: &RailSnap, query: Vec3, preferred: Vec2, flat_penalty: f32) -> f32 {
    let to_cell = Vec2::new(
        snap.cell.x as f32 + 0.5 - query.x,
        snap.cell.z as f32 + 0.5 - query.z,
    );
    let len = to_cell.length();
    if len <= 0.3 {
        return 0.0;
    }
    if preferred.dot(to_cell / len) < BEHIND_DOT {
        if snap.is_slope {
            20.0
        } else {
            flat_penalty
        }
    } else {
        0.0
    }
}

fn perpendicular_penalty(snap: &RailSnap, preferred: Vec2, penalty: f32) -> f32 {
    let horiz = Vec2::new(snap.dir.x, snap.dir.z);
    let len = horiz.length();
    if len > 0.01 && preferred.dot(horiz / len).abs() < 0.3 {
        penalty
    } else {
        0.0
    }
}

/// Project a position onto the rail of one cell, if any.
///
/// The incoming direction filters junction branches: T-junction segments
/// nearly perpendicular to it are excluded outright (picking the wrong
/// branch there is visually wrong), corner segments only get a soft
/// penalty (corners need tolerance mid-turn).
pub fn snap_to_cell(
    lookup: &impl RailLookup,
    query: Vec3,
    cell: CellCoord,
    incoming: Vec2,
) -> Option<RailSnap> {
    let rail = resolve_rail(lookup, cell)?;
    let has_incoming = incoming.x.abs() > 0.01 || incoming.y.abs() > 0.01;

    match &rail.shape {
        RailShape::Slope { high, low, dir } => {
            let seg = *low - *high;
            let len_sq = seg.length_squared();
            let mut t = 0.5;
            if len_sq > 1e-4 {
                t = (query - *high).dot(seg) / len_sq;
            }
            // Past either end, or fallen below the foot: the cart has
            // already left this slope.
            if t < -SLOPE_OVERSHOOT || t > 1.0 + SLOPE_OVERSHOOT {
                return None;
            }
            if query.y < high.y.min(low.y) - SLOPE_EXIT_DROP {
                return None;
            }
            let t = t.clamp(0.0, 1.0);
            let position = *high + seg * t;
            Some(RailSnap {
                position,
                dir: *dir,
                cell,
                distance_sq: position.distance_squared(query),
                is_slope: true,
                is_corner: false,
                is_t_junction: rail.is_t_junction,
                is_accelerator: rail.is_accelerator,
                connected: rail.connected,
            })
        }
        RailShape::Flat { points } => {
            let mut best_score = f32::MAX;
            let mut best: Option<(Vec3, Vec3)> = None;

            for pair in points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let seg = b - a;
                let len_sq = seg.length_squared();
                if len_sq < 1e-4 {
                    continue;
                }

                let t = (query - a).dot(seg) / len_sq;
                if t < -SEGMENT_OVERSHOOT || t > 1.0 + SEGMENT_OVERSHOOT {
                    continue;
                }
                let candidate = a + seg * t.clamp(0.0, 1.0);
                let dist_sq = candidate.distance_squared(query);

                let horiz = Vec2::new(seg.x, seg.z);
                let horiz_len = horiz.length();
                let align = if has_incoming && horiz_len > 0.01 {
                    incoming.dot(horiz / horiz_len).abs()
                } else {
                    1.0
                };

                if rail.is_t_junction && has_incoming && align < 0.3 {
                    continue;
                }
                let mut score = dist_sq;
                if rail.is_corner && has_incoming && align < 0.5 {
                    score += 5.0;
                }

                if score < best_score {
                    best_score = score;
                    best = Some((candidate, seg / len_sq.sqrt()));
                }
            }

            // A T-junction approached perpendicular to its only encoded
            // branch still accepts the cart: keep its x/z (snapping to the
            // center would drag it backward every tick), lift to rail
            // height, and let the junction navigator pick the exit.
            if best.is_none() && rail.is_t_junction {
                let center = cell.center_at(query.y);
                let to_center_sq = Vec2::new(center.x - query.x, center.z - query.z)
                    .length_squared();
                if to_center_sq < 1.5 {
                    best = Some((
                        Vec3::new(query.x, cell.y as f32 + RAIL_HEIGHT, query.z),
                        Vec3::new(incoming.x, 0.0, incoming.y),
                    ));
                }
            }

            let (position, dir) = best?;
            Some(RailSnap {
                position,
                dir,
                cell,
                distance_sq: position.distance_squared(query),
                is_slope: false,
                is_corner: rail.is_corner,
                is_t_junction: rail.is_t_junction,
                is_accelerator: rail.is_accelerator,
                connected: rail.connected,
            })
        }
    }
}
