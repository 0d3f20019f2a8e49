use serde::{Deserialize, Serialize};

/// Tuning knobs of the cart integrator. All speeds are in cells per
/// second, all per-tick factors are dimensionless multipliers.
///
/// Deserializes leniently: any field missing from the source falls back
/// to its default, so a config file only needs the values it overrides.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Hard speed cap, applied after every acceleration source.
    pub max_speed: f32,
    /// Gravity strength along slope tangents.
    pub acceleration: f32,
    /// Rolling resistance, applied once per tick.
    pub friction: f32,
    /// Extra speed loss when turning through a junction.
    pub corner_friction: f32,
    /// Below this a cart on flat rail is considered at rest.
    pub min_speed: f32,
    /// Downhill gravity multiplier.
    pub slope_boost: f32,
    /// Uphill gravity multiplier (lower than 1 so climbs bleed slower).
    pub uphill_drag: f32,
    /// Speed given to a cart that starts rolling on a slope.
    pub initial_push: f32,
    /// Per-tick speed multiplier while on an accelerator rail.
    pub accelerator_boost: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_speed: 12.0,
            acceleration: 8.0,
            friction: 0.985,
            corner_friction: 0.95,
            min_speed: 0.005,
            slope_boost: 1.5,
            uphill_drag: 0.7,
            initial_push: 0.3,
            accelerator_boost: 1.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_the_default() {
        let cfg: PhysicsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, PhysicsConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let cfg: PhysicsConfig =
            serde_json::from_str(r#"{ "max_speed": 6.0, "friction": 0.9 }"#).unwrap();
        assert_eq!(cfg.max_speed, 6.0);
        assert_eq!(cfg.friction, 0.9);
        assert_eq!(cfg.initial_push, PhysicsConfig::default().initial_push);
    }
}
