use serde::{Deserialize, Serialize};

/// Body policy applied uniformly to every registered body, whatever its kind.
///
/// The defaults give the soft, floaty motion of the bounded box scene; they are not physical
/// defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ConfigPhysics {
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_scale: f32,
}

impl Default for ConfigPhysics {
    fn default() -> Self {
        ConfigPhysics {
            linear_damping: 0.5,
            angular_damping: 0.8,
            gravity_scale: 0.2,
        }
    }
}

/// Mass and surface material of a single body. Zero mass makes the body static.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ConfigMaterial {
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
}

impl Default for ConfigMaterial {
    fn default() -> Self {
        ConfigMaterial {
            mass: 0.0,
            restitution: 0.0,
            friction: 1.0,
        }
    }
}

impl ConfigMaterial {
    pub fn with_mass(mass: f32) -> Self {
        ConfigMaterial {
            mass,
            ..Default::default()
        }
    }
}
