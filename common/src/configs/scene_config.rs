use serde::{Deserialize, Serialize};

use crate::configs::physics_config::ConfigMaterial;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ConfigBoundary {
    /// edge length of the inner, open cube
    pub size: f32,
    pub thickness: f32,
}

impl Default for ConfigBoundary {
    fn default() -> Self {
        ConfigBoundary {
            size: 10.0,
            thickness: 10.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ConfigScene {
    pub boundary: ConfigBoundary,
    pub cursor_radius: f32,
    pub objects_per_kind: u32,
    /// objects spawn uniformly in [-spawn_extent, spawn_extent) on each axis
    pub spawn_extent: f32,
    pub object_material: ConfigMaterial,
    pub seed: Option<u64>,
}

impl Default for ConfigScene {
    fn default() -> Self {
        ConfigScene {
            boundary: ConfigBoundary::default(),
            cursor_radius: 2.0,
            objects_per_kind: 10,
            spawn_extent: 3.0,
            object_material: ConfigMaterial {
                mass: 1.0,
                restitution: 0.1,
                friction: 0.0,
            },
            seed: None,
        }
    }
}
