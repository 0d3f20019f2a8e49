//! Rail-constrained cart navigation and physics.
//!
//! The world is a grid of unit cells, some of which hold a piece of rail
//! geometry (a short polyline plus a rotation and a kind tag). Carts do
//! not move freely: every tick they snap to the nearest rail, follow its
//! tangent, and navigate junctions deterministically. The host supplies
//! the network through the [`RailLookup`](world::RailLookup) trait;
//! [`RailGrid`](world::RailGrid) is the bundled in-memory implementation.

pub mod config;
pub mod helpers;
pub mod world;

pub use config::PhysicsConfig;
pub use helpers::positions::CellCoord;
pub use world::carts::cart_simulation::CartSimSystem;
pub use world::carts::cart_structs::{Cart, CartId, CartStorage};
pub use world::carts::edges::{Edge, EdgeSet};
pub use world::carts::junction::{choose_exit, JunctionChoice};
pub use world::carts::physics::{tick_cart, TickOutcome};
pub use world::carts::rail_snap::{find_best_snap, RailSnap};
pub use world::{RailGeometry, RailGrid, RailKind, RailLookup};
