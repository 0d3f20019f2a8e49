use glam::{Vec2, Vec3};

pub type CartId = u32;

/// One cart riding the rail network.
///
/// Speed is a non-negative scalar along the rail; the direction of travel
/// lives in `world_dir` and reversals flip it rather than going negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: CartId,
    pub position: Vec3,
    pub velocity: f32,
    /// Persisted horizontal travel direction. `x` is world X, `y` is
    /// world Z. `None` while the cart is stopped or off the network.
    pub world_dir: Option<Vec2>,
    /// Facing, radians. Yaw around +Y, pitch positive nose-down.
    pub yaw: f32,
    pub pitch: f32,
}

impl Cart {
    pub fn new(id: CartId, position: Vec3) -> Self {
        Self {
            id,
            position,
            velocity: 0.0,
            world_dir: None,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Forget everything tied to the rail the cart was on.
    pub fn clear_rail_state(&mut self) {
        self.velocity = 0.0;
        self.world_dir = None;
        self.yaw = 0.0;
        self.pitch = 0.0;
    }
}

/// Slot-addressed cart storage. Despawned slots go on a free list and are
/// reused by later spawns, so `CartId` is just the slot index.
#[derive(Debug, Default)]
pub struct CartStorage {
    slots: Vec<Option<Cart>>,
    free_list: Vec<usize>,
}

impl CartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, position: Vec3) -> CartId {
        match self.free_list.pop() {
            Some(slot) => {
                self.slots[slot] = Some(Cart::new(slot as CartId, position));
                slot as CartId
            }
            None => {
                let slot = self.slots.len();
                self.slots.push(Some(Cart::new(slot as CartId, position)));
                slot as CartId
            }
        }
    }

    pub fn despawn(&mut self, id: CartId) -> Option<Cart> {
        let slot = self.slots.get_mut(id as usize)?;
        let cart = slot.take()?;
        self.free_list.push(id as usize);
        Some(cart)
    }

    #[inline]
    pub fn get(&self, id: CartId) -> Option<&Cart> {
        self.slots.get(id as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: CartId) -> Option<&mut Cart> {
        self.slots.get_mut(id as usize)?.as_mut()
    }

    pub fn cart_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cart> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cart> {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    pub fn par_iter_mut(&mut self) -> impl rayon::iter::ParallelIterator<Item = &mut Cart> {
        use rayon::prelude::*;
        self.slots.par_iter_mut().filter_map(|s| s.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn despawned_slots_are_reused() {
        let mut carts = CartStorage::new();
        let a = carts.spawn(Vec3::ZERO);
        let b = carts.spawn(Vec3::ONE);
        assert_eq!(carts.cart_count(), 2);

        assert!(carts.despawn(a).is_some());
        assert!(carts.get(a).is_none());
        assert_eq!(carts.cart_count(), 1);

        let c = carts.spawn(Vec3::ZERO);
        assert_eq!(c, a, "freed slot should be reused");
        assert_eq!(carts.cart_count(), 2);
        assert!(carts.get(b).is_some());
    }

    #[test]
    fn despawning_twice_is_a_noop() {
        let mut carts = CartStorage::new();
        let id = carts.spawn(Vec3::ZERO);
        assert!(carts.despawn(id).is_some());
        assert!(carts.despawn(id).is_none());
        assert_eq!(carts.cart_count(), 0);
    }

    #[test]
    fn clear_rail_state_resets_motion() {
        let mut cart = Cart::new(0, Vec3::ZERO);
        cart.velocity = 3.0;
        cart.world_dir = Some(Vec2::new(1.0, 0.0));
        cart.yaw = 1.0;
        cart.clear_rail_state();
        assert_eq!(cart.velocity, 0.0);
        assert!(cart.world_dir.is_none());
        assert_eq!(cart.yaw, 0.0);
    }
}
