pub mod cart_simulation;
pub mod cart_structs;
pub mod edges;
pub mod junction;
pub mod physics;
pub mod rail_geometry;
pub mod rail_snap;
