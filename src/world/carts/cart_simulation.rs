use crate::config::PhysicsConfig;
use crate::world::carts::cart_structs::CartStorage;
use crate::world::carts::physics::tick_cart;
use crate::world::RailLookup;
use log::trace;

/// Drives every cart through the physics step once per tick.
#[derive(Debug, Default)]
pub struct CartSimSystem {
    pub tick: u64,
}

impl CartSimSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_all(
        &mut self,
        lookup: &impl RailLookup,
        carts: &mut CartStorage,
        cfg: &PhysicsConfig,
        dt: f32,
    ) {
        self.tick += 1;
        trace!("cart tick {} ({} carts)", self.tick, carts.cart_count());
        for cart in carts.iter_mut() {
            tick_cart(lookup, cart, cfg, dt);
        }
    }

    /// Same as [`tick_all`](Self::tick_all), fanned out over the rayon
    /// pool. Carts are independent, the rail network is only read.
    pub fn par_tick_all(
        &mut self,
        lookup: &(impl RailLookup + Sync),
        carts: &mut CartStorage,
        cfg: &PhysicsConfig,
        dt: f32,
    ) {
        use rayon::iter::ParallelIterator;
        self.tick += 1;
        carts.par_iter_mut().for_each(|cart| {
            tick_cart(lookup, cart, cfg, dt);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::positions::CellCoord;
    use crate::world::{RailGeometry, RailGrid};
    use glam::{Vec2, Vec3};

    fn two_lane_grid() -> RailGrid {
        let mut grid = RailGrid::new();
        for x in 0..4 {
            grid.place(CellCoord::new(x, 0, 0), RailGeometry::straight(), 0);
            grid.place(CellCoord::new(x, 0, 5), RailGeometry::straight(), 0);
        }
        grid
    }

    #[test]
    fn all_carts_advance_each_tick() {
        let grid = two_lane_grid();
        let mut carts = CartStorage::new();
        let a = carts.spawn(Vec3::new(0.5, 0.1, 0.5));
        let b = carts.spawn(Vec3::new(0.5, 0.1, 5.5));
        for id in [a, b] {
            let cart = carts.get_mut(id).unwrap();
            cart.velocity = 2.0;
            cart.world_dir = Some(Vec2::new(1.0, 0.0));
        }

        let mut sim = CartSimSystem::new();
        let cfg = PhysicsConfig::default();
        for _ in 0..10 {
            sim.tick_all(&grid, &mut carts, &cfg, 0.05);
        }

        assert_eq!(sim.tick, 10);
        assert!(carts.get(a).unwrap().position.x > 1.0);
        assert!(carts.get(b).unwrap().position.x > 1.0);
    }

    #[test]
    fn parallel_tick_matches_the_sequential_result() {
        let grid = two_lane_grid();
        let cfg = PhysicsConfig::default();

        let mut seq = CartStorage::new();
        let mut par = CartStorage::new();
        for storage in [&mut seq, &mut par] {
            let id = storage.spawn(Vec3::new(0.5, 0.1, 0.5));
            let cart = storage.get_mut(id).unwrap();
            cart.velocity = 3.0;
            cart.world_dir = Some(Vec2::new(1.0, 0.0));
        }

        let mut sim_a = CartSimSystem::new();
        let mut sim_b = CartSimSystem::new();
        for _ in 0..8 {
            sim_a.tick_all(&grid, &mut seq, &cfg, 0.05);
            sim_b.par_tick_all(&grid, &mut par, &cfg, 0.05);
        }

        assert_eq!(seq.get(0), par.get(0));
    }
}
