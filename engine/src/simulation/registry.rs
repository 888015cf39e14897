use std::collections::HashMap;

use common::configs::physics_config::ConfigPhysics;
use common::core::components::RenderableHandle;
use common::core::scene::TransformSink;
use derive_more::{Display, Error};
use glam::{Quat, Vec3};
use log::{debug, trace, warn};
use rapier3d::prelude::*;

use crate::simulation::collider_factory::{ColliderDescriptor, Shape, ShapeError};
use crate::simulation::convert;
use crate::simulation::physics_state::PhysicsState;

pub const DEFAULT_LINEAR_DAMPING: f32 = 0.5;
pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.8;
pub const DEFAULT_GRAVITY_SCALE: f32 = 0.2;

#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[display(fmt = "{}", _0)]
    Shape(ShapeError),
    #[display(fmt = "renderable {} already has a rigid body", handle)]
    AlreadyRegistered { handle: RenderableHandle },
    #[display(fmt = "renderable {} has a non-finite or degenerate transform", handle)]
    InvalidTransform { handle: RenderableHandle },
    #[display(fmt = "invalid timestep: {}", dt)]
    InvalidTimestep { dt: f32 },
}

impl From<ShapeError> for RegistryError {
    fn from(e: ShapeError) -> Self {
        RegistryError::Shape(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// Identifier of a rigid body inside the registry's world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub RigidBodyHandle);

/// Owns the simulation world and keeps each registered renderable paired with exactly one
/// rigid body.
///
/// Bodies live as long as the registry. The association is a plain lookup table keyed by
/// handle, so it keeps neither the renderable nor the body alive on its own.
pub struct BodySyncRegistry {
    physics_state: PhysicsState,
    policy: ConfigPhysics,
    bodies: HashMap<RenderableHandle, RigidBodyHandle>,
    // registration order, used for the per-frame sync
    dynamic: Vec<RenderableHandle>,
}

impl Default for BodySyncRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BodySyncRegistry {
    pub fn new() -> Self {
        Self::with_policy(ConfigPhysics {
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            gravity_scale: DEFAULT_GRAVITY_SCALE,
        })
    }

    /// Creates a registry whose bodies all get the damping and gravity scale of `policy`.
    pub fn with_policy(policy: ConfigPhysics) -> Self {
        BodySyncRegistry {
            physics_state: PhysicsState::new(),
            policy,
            bodies: HashMap::new(),
            dynamic: Vec::new(),
        }
    }

    pub fn policy(&self) -> &ConfigPhysics {
        &self.policy
    }

    pub fn physics_state(&self) -> &PhysicsState {
        &self.physics_state
    }

    /// Creates the body and its single collider for `handle`.
    ///
    /// The body is dynamic when the descriptor has mass and static otherwise. The orientation
    /// need not be normalized but must not be zero. Registration is all-or-nothing: on error
    /// neither the world nor the association table is touched.
    pub fn register_body(
        &mut self,
        handle: RenderableHandle,
        descriptor: &ColliderDescriptor,
        position: Vec3,
        orientation: Quat,
    ) -> Result<BodyId, RegistryError> {
        if self.bodies.contains_key(&handle) {
            warn!("Refusing to register {} twice", handle);
            return Err(RegistryError::AlreadyRegistered { handle });
        }
        if !position.is_finite() || !orientation.is_finite() || orientation.length() == 0.0 {
            warn!("Refusing to register {} at {} {}", handle, position, orientation);
            return Err(RegistryError::InvalidTransform { handle });
        }

        let collider = convert::collider_builder(descriptor)
            .ok_or_else(|| {
                let points = match &descriptor.shape {
                    Shape::ConvexHull { points } => points.len(),
                    _ => 0,
                };
                warn!("Backend rejected the convex hull of {}", handle);
                ShapeError::DegenerateHull { points }
            })?
            .build();

        let kind = if descriptor.is_dynamic() {
            BodyKind::Dynamic
        } else {
            BodyKind::Static
        };
        let builder = match kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let rigid_body = builder
            .position(convert::to_isometry(position, orientation))
            .linear_damping(self.policy.linear_damping)
            .angular_damping(self.policy.angular_damping)
            .gravity_scale(self.policy.gravity_scale)
            .build();

        let (body_handle, _) = self.physics_state.insert_body(rigid_body, collider);
        self.bodies.insert(handle, body_handle);
        if kind == BodyKind::Dynamic {
            self.dynamic.push(handle);
        }

        debug!("Registered {:?} body for {} at {}", kind, handle, position);
        Ok(BodyId(body_handle))
    }

    fn rigid_body(&self, handle: RenderableHandle) -> Option<&RigidBody> {
        self.physics_state.rigid_body(*self.bodies.get(&handle)?)
    }

    fn rigid_body_mut(&mut self, handle: RenderableHandle) -> Option<&mut RigidBody> {
        let body_handle = *self.bodies.get(&handle)?;
        self.physics_state.rigid_body_mut(body_handle)
    }

    pub fn body_id(&self, handle: RenderableHandle) -> Option<BodyId> {
        self.bodies.get(&handle).copied().map(BodyId)
    }

    pub fn body_kind(&self, handle: RenderableHandle) -> Option<BodyKind> {
        self.rigid_body(handle).map(|body| {
            if body.is_dynamic() {
                BodyKind::Dynamic
            } else {
                BodyKind::Static
            }
        })
    }

    pub fn position(&self, handle: RenderableHandle) -> Option<Vec3> {
        self.rigid_body(handle)
            .map(|body| convert::from_vector(body.translation()))
    }

    pub fn orientation(&self, handle: RenderableHandle) -> Option<Quat> {
        self.rigid_body(handle)
            .map(|body| convert::from_rotation(body.rotation()))
    }

    /// Dynamic renderables, in registration order.
    pub fn dynamic_handles(&self) -> &[RenderableHandle] {
        &self.dynamic
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Copies the body's transform onto its renderable. No-op for unregistered handles.
    pub fn sync_body_to_renderable<S: TransformSink + ?Sized>(
        &self,
        handle: RenderableHandle,
        sink: &mut S,
    ) {
        if let Some(body) = self.rigid_body(handle) {
            sink.set_transform(
                handle,
                convert::from_vector(body.translation()),
                convert::from_rotation(body.rotation()),
            );
        }
    }

    /// Teleports the body to the renderable's position. Orientation is left alone.
    pub fn sync_renderable_to_body(&mut self, handle: RenderableHandle, position: Vec3) {
        if let Some(body) = self.rigid_body_mut(handle) {
            body.set_translation(convert::to_vector(position), true);
        }
    }

    pub fn sync_dynamic<S: TransformSink + ?Sized>(&self, sink: &mut S) {
        for handle in &self.dynamic {
            self.sync_body_to_renderable(*handle, sink);
        }
    }

    /// Advances the world by `delta_seconds`, without touching any renderable.
    ///
    /// The timestep is set right before stepping; there is no accumulator or substepping. A
    /// zero delta leaves the world as it is.
    pub fn step(&mut self, delta_seconds: f32) -> Result<(), RegistryError> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(RegistryError::InvalidTimestep { dt: delta_seconds });
        }
        if delta_seconds == 0.0 {
            return Ok(());
        }
        trace!(
            "Stepping {} bodies by {}s",
            self.physics_state.bodies.len(),
            delta_seconds
        );
        self.physics_state.set_delta_time(delta_seconds);
        self.physics_state.step();
        Ok(())
    }

    /// Steps the world, then pushes every dynamic body's new transform to its renderable.
    pub fn step_and_sync<S: TransformSink + ?Sized>(
        &mut self,
        delta_seconds: f32,
        sink: &mut S,
    ) -> Result<(), RegistryError> {
        self.step(delta_seconds)?;
        self.sync_dynamic(sink);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use common::configs::physics_config::ConfigMaterial;
    use common::core::components::Transform;

    use crate::simulation::collider_factory::{box_shape, convex_hull_shape, sphere_shape};

    const DT: f32 = 1.0 / 60.0;

    fn ball(mass: f32) -> ColliderDescriptor {
        sphere_shape(
            1.0,
            ConfigMaterial {
                mass,
                restitution: 0.1,
                friction: 0.0,
            },
        )
        .unwrap()
    }

    fn transforms(handles: &[RenderableHandle]) -> HashMap<RenderableHandle, Transform> {
        handles
            .iter()
            .map(|h| (*h, Transform::default()))
            .collect()
    }

    #[test]
    fn test_kind_follows_mass() {
        let mut registry = BodySyncRegistry::new();
        let masses = [0.0, 1.0, 0.0, 0.001, 25.0];
        for (i, mass) in masses.iter().enumerate() {
            let handle = RenderableHandle(i as u32);
            registry
                .register_body(handle, &ball(*mass), Vec3::ZERO, Quat::IDENTITY)
                .unwrap();
        }

        for (i, mass) in masses.iter().enumerate() {
            let expected = if *mass > 0.0 {
                BodyKind::Dynamic
            } else {
                BodyKind::Static
            };
            assert_eq!(registry.body_kind(RenderableHandle(i as u32)), Some(expected));
        }
        assert_eq!(
            registry.dynamic_handles(),
            &[RenderableHandle(1), RenderableHandle(3), RenderableHandle(4)]
        );
        assert_eq!(registry.len(), masses.len());
    }

    #[test]
    fn test_policy_applies_to_every_body() {
        let mut registry = BodySyncRegistry::new();
        registry
            .register_body(RenderableHandle(0), &ball(0.0), Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        let id = registry
            .register_body(RenderableHandle(1), &ball(1.0), Vec3::ONE, Quat::IDENTITY)
            .unwrap();
        assert_eq!(registry.body_id(RenderableHandle(1)), Some(id));

        for body_handle in registry.bodies.values() {
            let body = registry.physics_state().rigid_body(*body_handle).unwrap();
            assert_eq!(body.linear_damping(), DEFAULT_LINEAR_DAMPING);
            assert_eq!(body.angular_damping(), DEFAULT_ANGULAR_DAMPING);
            assert_eq!(body.gravity_scale(), DEFAULT_GRAVITY_SCALE);
        }
        assert_eq!(registry.physics_state().colliders.len(), 2);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ConfigPhysics {
            linear_damping: 0.0,
            angular_damping: 0.1,
            gravity_scale: 1.0,
        };
        let mut registry = BodySyncRegistry::with_policy(policy);
        let id = registry
            .register_body(RenderableHandle(0), &ball(1.0), Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        let body = registry.physics_state().rigid_body(id.0).unwrap();
        assert_eq!(body.gravity_scale(), 1.0);
        assert_eq!(body.linear_damping(), 0.0);
        assert_eq!(registry.policy(), &policy);
    }

    #[test]
    fn test_register_twice_fails_without_side_effects() {
        let mut registry = BodySyncRegistry::new();
        let handle = RenderableHandle(0);
        let first = registry
            .register_body(handle, &ball(1.0), Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY)
            .unwrap();

        let second =
            registry.register_body(handle, &ball(0.0), Vec3::splat(5.0), Quat::IDENTITY);
        assert_eq!(second, Err(RegistryError::AlreadyRegistered { handle }));

        assert_eq!(registry.body_id(handle), Some(first));
        assert_eq!(registry.body_kind(handle), Some(BodyKind::Dynamic));
        assert_eq!(registry.position(handle), Some(Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(registry.dynamic_handles(), &[handle]);
        assert_eq!(registry.physics_state().bodies.len(), 1);
        assert_eq!(registry.physics_state().colliders.len(), 1);
    }

    #[test]
    fn test_degenerate_hull_never_creates_a_body() {
        let mut registry = BodySyncRegistry::new();
        let colinear = [Vec3::ZERO, Vec3::ONE, Vec3::splat(2.0)];
        let result = convex_hull_shape(&colinear, ConfigMaterial::with_mass(1.0))
            .map_err(RegistryError::from)
            .and_then(|descriptor| {
                let handle = RenderableHandle(0);
                registry.register_body(handle, &descriptor, Vec3::ZERO, Quat::IDENTITY)
            });

        assert_eq!(
            result,
            Err(RegistryError::Shape(ShapeError::DegenerateHull { points: 3 }))
        );
        assert!(registry.is_empty());
        assert!(registry.dynamic_handles().is_empty());
        assert_eq!(registry.physics_state().bodies.len(), 0);
    }

    #[test]
    fn test_non_finite_transform_is_rejected() {
        let mut registry = BodySyncRegistry::new();
        let handle = RenderableHandle(0);
        let invalid = [
            (Vec3::new(f32::NAN, 0.0, 0.0), Quat::IDENTITY),
            (Vec3::new(0.0, f32::INFINITY, 0.0), Quat::IDENTITY),
            (Vec3::ZERO, Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0)),
            (Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)),
        ];
        for (position, orientation) in invalid {
            assert_eq!(
                registry.register_body(handle, &ball(1.0), position, orientation),
                Err(RegistryError::InvalidTransform { handle })
            );
        }
        assert!(registry.is_empty());
        assert!(registry.dynamic_handles().is_empty());
        assert_eq!(registry.physics_state().bodies.len(), 0);
        assert_eq!(registry.physics_state().colliders.len(), 0);

        // the handle is still free after the rejected attempts
        registry
            .register_body(handle, &ball(1.0), Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 2.0))
            .unwrap();
        registry.step(DT).unwrap();
        assert!(registry.position(handle).unwrap().is_finite());
        assert!(registry.orientation(handle).unwrap().is_finite());
    }

    #[test]
    fn test_unregistered_lookups_are_empty() {
        let mut registry = BodySyncRegistry::new();
        let missing = RenderableHandle(9);
        assert_eq!(registry.position(missing), None);
        assert_eq!(registry.orientation(missing), None);
        assert_eq!(registry.body_kind(missing), None);
        assert_eq!(registry.body_id(missing), None);

        let mut sink = transforms(&[missing]);
        registry.sync_body_to_renderable(missing, &mut sink);
        registry.sync_renderable_to_body(missing, Vec3::ONE);
        assert_eq!(sink[&missing], Transform::default());
    }

    #[test]
    fn test_invalid_timestep() {
        let mut registry = BodySyncRegistry::new();
        assert_eq!(
            registry.step(-0.1),
            Err(RegistryError::InvalidTimestep { dt: -0.1 })
        );
        assert!(registry.step(f32::NAN).is_err());
        assert!(registry.step(f32::INFINITY).is_err());
        assert!(registry.step(0.0).is_ok());
    }

    #[test]
    fn test_zero_timestep_does_not_move_bodies() {
        let mut registry = BodySyncRegistry::new();
        let handle = RenderableHandle(0);
        registry
            .register_body(handle, &ball(1.0), Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY)
            .unwrap();
        registry.step(0.0).unwrap();
        assert_eq!(registry.position(handle), Some(Vec3::new(0.0, 3.0, 0.0)));
    }

    #[test]
    fn test_queries_are_idempotent() {
        let mut registry = BodySyncRegistry::new();
        let handle = RenderableHandle(0);
        registry
            .register_body(
                handle,
                &ball(1.0),
                Vec3::new(0.0, 3.0, 0.0),
                Quat::from_rotation_x(0.4),
            )
            .unwrap();
        registry.step(DT).unwrap();

        assert_eq!(registry.position(handle), registry.position(handle));
        assert_eq!(registry.orientation(handle), registry.orientation(handle));
    }

    #[test]
    fn test_renderables_match_bodies_after_step() {
        let mut registry = BodySyncRegistry::new();
        let handles = (0..4).map(RenderableHandle).collect::<Vec<_>>();
        for (i, handle) in handles.iter().enumerate() {
            let mass = if i == 0 { 0.0 } else { 1.0 };
            registry
                .register_body(
                    *handle,
                    &ball(mass),
                    Vec3::new(i as f32 * 3.0, 2.0, 0.0),
                    Quat::from_rotation_z(i as f32),
                )
                .unwrap();
        }
        let mut sink = transforms(&handles);

        for _ in 0..10 {
            registry.step_and_sync(DT, &mut sink).unwrap();
            for handle in &handles[1..] {
                assert_eq!(Some(sink[handle].translation), registry.position(*handle));
                assert_eq!(Some(sink[handle].rotation), registry.orientation(*handle));
            }
        }
        // static bodies are not part of the per-frame sync
        assert_eq!(sink[&handles[0]], Transform::default());
    }

    #[test]
    fn test_step_without_sync_leaves_renderables() {
        let mut registry = BodySyncRegistry::new();
        let handle = RenderableHandle(0);
        registry
            .register_body(handle, &ball(1.0), Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY)
            .unwrap();
        let mut sink = transforms(&[handle]);

        registry.step(DT).unwrap();
        assert_eq!(sink[&handle], Transform::default());

        registry.sync_body_to_renderable(handle, &mut sink);
        assert_eq!(Some(sink[&handle].translation), registry.position(handle));
        assert!(sink[&handle].translation.y < 3.0);
    }

    #[test]
    fn test_kinematic_probe_moves_only_when_pushed() {
        let mut registry = BodySyncRegistry::new();
        let probe = RenderableHandle(0);
        let orientation = Quat::from_rotation_y(0.5);
        registry
            .register_body(probe, &ball(0.0), Vec3::ZERO, orientation)
            .unwrap();

        let target = Vec3::new(1.0, 2.0, 3.0);
        registry.sync_renderable_to_body(probe, target);
        assert_eq!(registry.position(probe), Some(target));

        for _ in 0..30 {
            registry.step(DT).unwrap();
        }
        assert_eq!(registry.position(probe), Some(target));
        let after = registry.orientation(probe).unwrap();
        assert_relative_eq!(after.dot(orientation).abs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_probe_pushes_dynamic_bodies() {
        let mut registry = BodySyncRegistry::with_policy(ConfigPhysics {
            gravity_scale: 0.0,
            ..Default::default()
        });
        let probe = RenderableHandle(0);
        let ball_handle = RenderableHandle(1);
        registry
            .register_body(probe, &ball(0.0), Vec3::new(-5.0, 0.0, 0.0), Quat::IDENTITY)
            .unwrap();
        registry
            .register_body(ball_handle, &ball(1.0), Vec3::ZERO, Quat::IDENTITY)
            .unwrap();

        for i in 0..60 {
            let x = -5.0 + i as f32 * 0.1;
            registry.sync_renderable_to_body(probe, Vec3::new(x, 0.0, 0.0));
            registry.step(DT).unwrap();
        }
        assert!(registry.position(ball_handle).unwrap().x > 0.0);
    }

    #[test]
    fn test_sphere_settles_on_floor() {
        let mut registry = BodySyncRegistry::new();
        let floor = RenderableHandle(0);
        let sphere = RenderableHandle(1);

        // top face of the floor at y = -5
        let slab = box_shape(10.0, 0.5, 10.0, ConfigMaterial::default()).unwrap();
        registry
            .register_body(floor, &slab, Vec3::new(0.0, -5.5, 0.0), Quat::IDENTITY)
            .unwrap();
        registry
            .register_body(sphere, &ball(1.0), Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY)
            .unwrap();

        let mut sink = transforms(&[floor, sphere]);
        let mut heights = Vec::new();
        for _ in 0..600 {
            registry.step_and_sync(DT, &mut sink).unwrap();
            heights.push(sink[&sphere].translation.y);
        }

        assert!(heights[120] < 5.0);
        let lowest = heights.iter().copied().fold(f32::INFINITY, f32::min);
        // penetration into the floor stays under 0.05 even on impact
        assert!(lowest > -4.05, "sphere sank to {}", lowest);

        let resting = heights[599];
        assert!(resting > -4.05 && resting < -3.9, "sphere rests at {}", resting);
        assert!((heights[540] - resting).abs() < 1e-3);
        assert_eq!(registry.position(floor), Some(Vec3::new(0.0, -5.5, 0.0)));
    }
}
