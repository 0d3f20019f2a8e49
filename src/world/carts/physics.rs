use crate::config::PhysicsConfig;
use crate::world::carts::cart_structs::Cart;
use crate::world::carts::edges::Edge;
use crate::world::carts::junction::{choose_exit, JunctionChoice};
use crate::world::carts::rail_geometry::has_rail_toward;
use crate::world::carts::rail_snap::{find_best_snap, RailSnap};
use crate::world::{RailLookup, RAIL_HEIGHT};
use glam::{Vec2, Vec3};
use log::debug;

/// Longest distance covered by one sub-step. Faster carts split their
/// per-tick movement so they cannot tunnel through a junction cell.
pub const MAX_STEP_SIZE: f32 = 0.4;

/// Result of integrating one cart for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Moving,
    Resting,
    /// No rail within snapping range; the cart's rail state was cleared.
    OffNetwork,
}

/// Advance one cart by `dt` seconds along the rail network.
///
/// A non-positive `dt` leaves the cart untouched. Losing the network
/// entirely clears the cart's rail state; losing it mid-step (running off
/// the end of a rail) parks the cart back on the last confirmed snap.
pub fn tick_cart(
    lookup: &impl RailLookup,
    cart: &mut Cart,
    cfg: &PhysicsConfig,
    dt: f32,
) -> TickOutcome {
    if dt <= 0.0 {
        return if cart.velocity > 0.0 {
            TickOutcome::Moving
        } else {
            TickOutcome::Resting
        };
    }

    let preferred = cart.world_dir.unwrap_or(Vec2::ZERO);
    let Some(start_snap) = find_best_snap(lookup, cart.position, preferred) else {
        cart.clear_rail_state();
        return TickOutcome::OffNetwork;
    };

    // A cart parked on a slope starts rolling on its own. Anything
    // already moving, however slowly, keeps its speed so an uphill
    // climb can stall and reverse.
    if start_snap.is_slope && cart.velocity < cfg.min_speed {
        cart.velocity = cfg.initial_push;
    }

    if !start_snap.is_slope && cart.velocity < cfg.min_speed {
        cart.position = start_snap.position;
        cart.velocity = 0.0;
        cart.world_dir = None;
        return TickOutcome::Resting;
    }

    // Travel direction, persisted across ticks so junction decisions stay
    // stable while the cart crosses a cell.
    let mut dir = match cart.world_dir {
        Some(d) => d,
        None => {
            let horiz = Vec2::new(start_snap.dir.x, start_snap.dir.z);
            if horiz.length() > 0.01 {
                round_cardinal(horiz.normalize())
            } else {
                Vec2::new(0.0, 1.0)
            }
        }
    };

    if start_snap.is_slope {
        let tangent = effective_tangent(&start_snap, dir);
        let accel = cfg.acceleration * tangent.y.abs() * dt;
        if tangent.y < 0.0 {
            cart.velocity += accel * cfg.slope_boost;
        } else {
            cart.velocity -= accel * cfg.uphill_drag;
            if cart.velocity < 0.0 {
                // Stalled on the climb: roll back down.
                cart.velocity = -cart.velocity;
                dir = -dir;
            }
        }
    }

    cart.velocity *= cfg.friction;

    if start_snap.is_accelerator {
        cart.velocity = boosted(cart.velocity, cfg);
    }

    cart.velocity = cart.velocity.min(cfg.max_speed);

    // Friction may have dropped a flat cart below the rest threshold
    // this tick.
    if cart.velocity < cfg.min_speed && !start_snap.is_slope {
        cart.velocity = 0.0;
    }

    let mut snap = start_snap.clone();
    let mut lost_rail = false;
    let mut remaining = cart.velocity * dt;

    while remaining > 1e-6 {
        let step = remaining.min(MAX_STEP_SIZE);
        remaining -= step;

        // Horizontal advance follows the world direction at full step
        // length; only the vertical component comes from the rail
        // tangent. Normalizing the whole step would slow slopes down.
        let tangent = effective_tangent(&snap, dir);
        let next_pos = snap.position + Vec3::new(dir.x, tangent.y, dir.y) * step;

        let Some(mut next) = find_best_snap(lookup, next_pos, dir) else {
            lost_rail = true;
            break;
        };
        let entered_new_cell = next.cell != snap.cell;

        if next.is_t_junction || next.is_corner {
            match choose_exit(lookup, &next, dir) {
                JunctionChoice::PassThrough(_) | JunctionChoice::Straight(_) => {
                    snap = next;
                }
                JunctionChoice::Turn(exit) => {
                    dir = exit.direction();
                    cart.velocity *= cfg.corner_friction;
                    next.position = next.cell.center_at(next.cell.y as f32 + RAIL_HEIGHT);
                    next.dir = Vec3::new(dir.x, 0.0, dir.y);
                    snap = next;
                }
                JunctionChoice::DeadEnd => {
                    cart.velocity = 0.0;
                    snap = next;
                    break;
                }
            }
        } else if !next.is_slope {
            // Arriving sideways on a straight rail (e.g. pushed onto a
            // line it does not continue past): pick up the rail's own
            // axis instead of drifting off it.
            let horiz = Vec2::new(next.dir.x, next.dir.z);
            if horiz.length() > 0.01 && dir.dot(horiz.normalize()).abs() < 0.3 {
                let heading = Edge::from_direction(dir);
                if !has_rail_toward(lookup, next.cell, heading) {
                    let forward = Edge::from_direction(horiz);
                    let back = forward.opposite();
                    if has_rail_toward(lookup, next.cell, forward) {
                        dir = forward.direction();
                    } else if has_rail_toward(lookup, next.cell, back) {
                        dir = back.direction();
                    } else {
                        cart.velocity = 0.0;
                        snap = next;
                        break;
                    }
                }
            }
            snap = next;
        } else {
            snap = next;
        }

        if entered_new_cell && snap.is_accelerator {
            cart.velocity = (cart.velocity * cfg.accelerator_boost).min(cfg.max_speed);
        }
    }

    if lost_rail {
        // Rail ended under the cart: put it back on the last confirmed
        // snap rather than leaving it floating off the network.
        debug!("cart {} ran off the rail near {:?}", cart.id, snap.cell);
        cart.position = start_snap.position;
        cart.velocity = 0.0;
        cart.world_dir = None;
        return TickOutcome::Resting;
    }

    cart.position = snap.position;

    if cart.velocity > cfg.min_speed {
        let tangent = effective_tangent(&snap, dir);
        cart.world_dir = Some(dir);
        cart.yaw = dir.x.atan2(dir.y);
        cart.pitch = (-tangent.y).clamp(-1.0, 1.0).asin();
        TickOutcome::Moving
    } else {
        cart.world_dir = None;
        TickOutcome::Resting
    }
}

/// Unit tangent of a snap, flipped so its horizontal part agrees with the
/// travel direction. Slopes keep their vertical component, so uphill
/// travel yields a rising tangent.
fn effective_tangent(snap: &RailSnap, dir: Vec2) -> Vec3 {
    let mut t = snap.dir;
    let horiz = Vec2::new(t.x, t.z);
    if horiz.length_squared() > 1e-4 && horiz.dot(dir) < 0.0 {
        t = -t;
    }
    if t.length_squared() > 1e-4 {
        t.normalize()
    } else {
        Vec3::new(dir.x, 0.0, dir.y)
    }
}

/// Accelerator kick: multiplicative, with a fixed shove when even the
/// boosted speed stays below the rest threshold.
fn boosted(velocity: f32, cfg: &PhysicsConfig) -> f32 {
    let boosted = velocity * cfg.accelerator_boost;
    if boosted < cfg.min_speed {
        cfg.initial_push * 2.0
    } else {
        boosted
    }
}

/// Snap a direction to the dominant cardinal axis.
fn round_cardinal(v: Vec2) -> Vec2 {
    if v.x.abs() > v.y.abs() {
        Vec2::new(v.x.signum(), 0.0)
    } else if v.y.abs() > 0.01 {
        Vec2::new(0.0, v.y.signum())
    } else {
        v
    }
}
