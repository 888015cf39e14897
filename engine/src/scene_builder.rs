use common::configs::physics_config::ConfigMaterial;
use common::configs::scene_config::ConfigScene;
use common::core::components::{RenderableHandle, Transform};
use common::core::scene::{Renderable, Scene};
use common::geometry::Geometry;
use derive_more::Constructor;
use glam::{Quat, Vec3};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulation::collider_factory;
use crate::simulation::registry::{BodySyncRegistry, RegistryError};

pub const CURSOR_NAME: &str = "cursor";

/// Adds `renderable` to the scene together with its body.
///
/// The collider is built and the body registered before the renderable enters the scene, so a
/// rejected shape leaves both the scene and the registry untouched.
pub fn add_body(
    scene: &mut Scene,
    registry: &mut BodySyncRegistry,
    renderable: Renderable,
    material: ConfigMaterial,
) -> Result<RenderableHandle, RegistryError> {
    let descriptor = collider_factory::from_geometry(&renderable.geometry, material)?;
    let handle = scene.next_handle();
    registry.register_body(
        handle,
        &descriptor,
        renderable.transform.translation,
        renderable.transform.rotation,
    )?;
    Ok(scene.add(renderable))
}

/// Builds the bounded box scene: six static walls, the cursor probe and a population of
/// dynamic solids.
#[derive(Constructor)]
pub struct SceneBuilder {
    config: ConfigScene,
}

impl SceneBuilder {
    pub fn build(
        &self,
        scene: &mut Scene,
        registry: &mut BodySyncRegistry,
    ) -> Result<(), RegistryError> {
        self.create_boundary(scene, registry)?;
        self.create_cursor(scene, registry)?;
        self.create_objects(scene, registry)?;
        info!(
            "Scene ready: {} renderables, {} bodies ({} dynamic)",
            scene.len(),
            registry.len(),
            registry.dynamic_handles().len()
        );
        Ok(())
    }

    fn create_boundary(
        &self,
        scene: &mut Scene,
        registry: &mut BodySyncRegistry,
    ) -> Result<(), RegistryError> {
        let size = self.config.boundary.size;
        let thickness = self.config.boundary.thickness;
        let edge = size + thickness * 2.0;
        let offset = (size + thickness) / 2.0;

        let walls = [
            ("top", Vec3::new(edge, thickness, edge), Vec3::Y),
            ("bottom", Vec3::new(edge, thickness, edge), Vec3::NEG_Y),
            ("right", Vec3::new(thickness, edge, edge), Vec3::X),
            ("left", Vec3::new(thickness, edge, edge), Vec3::NEG_X),
            ("front", Vec3::new(edge, edge, thickness), Vec3::Z),
            ("back", Vec3::new(edge, edge, thickness), Vec3::NEG_Z),
        ];
        for (name, dimensions, direction) in walls {
            let renderable = Renderable::new(
                Geometry::Box {
                    width: dimensions.x,
                    height: dimensions.y,
                    depth: dimensions.z,
                },
                Transform::from_translation(direction * offset),
            )
            .named(name)
            .hidden();
            add_body(scene, registry, renderable, ConfigMaterial::default())?;
        }
        debug!("Boundary of size {} built", size);
        Ok(())
    }

    fn create_cursor(
        &self,
        scene: &mut Scene,
        registry: &mut BodySyncRegistry,
    ) -> Result<(), RegistryError> {
        let renderable = Renderable::new(
            Geometry::Sphere {
                radius: self.config.cursor_radius,
            },
            Transform::default(),
        )
        .named(CURSOR_NAME)
        .hidden();
        add_body(scene, registry, renderable, ConfigMaterial::default())?;
        Ok(())
    }

    fn create_objects(
        &self,
        scene: &mut Scene,
        registry: &mut BodySyncRegistry,
    ) -> Result<(), RegistryError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let extent = self.config.spawn_extent;

        let kinds = [
            Geometry::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            },
            Geometry::Sphere { radius: 0.7 },
            Geometry::Tetrahedron { radius: 1.0 },
            Geometry::Octahedron { radius: 1.0 },
            Geometry::Torus {
                radius: 0.7,
                tube: 0.35,
                radial_segments: 18,
                tubular_segments: 26,
            },
        ];
        for _ in 0..self.config.objects_per_kind {
            for geometry in &kinds {
                let position = random_position(&mut rng, extent);
                let renderable =
                    Renderable::new(geometry.clone(), Transform::from_translation(position));
                add_body(scene, registry, renderable, self.config.object_material)?;
            }
        }
        Ok(())
    }

    /// Drops an arbitrary mesh into the box as a dynamic convex hull.
    pub fn add_mesh(
        &self,
        scene: &mut Scene,
        registry: &mut BodySyncRegistry,
        geometry: Geometry,
        position: Vec3,
    ) -> Result<RenderableHandle, RegistryError> {
        let renderable = Renderable::new(
            geometry,
            Transform::from_translation_rotation(position, Quat::IDENTITY),
        );
        add_body(scene, registry, renderable, self.config.object_material)
    }
}

fn random_position(rng: &mut StdRng, extent: f32) -> Vec3 {
    if extent <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}
