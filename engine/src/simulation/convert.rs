//! Conversions between the render-side glam types and the nalgebra types rapier speaks.

use glam::{Quat, Vec3};
use nalgebra::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

use crate::simulation::collider_factory::{ColliderDescriptor, Shape};

pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// The quaternion is renormalized on the way in.
pub fn to_rotation(q: Quat) -> Rotation<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn from_rotation(r: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(r.i, r.j, r.k, r.w)
}

pub fn to_isometry(translation: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(to_vector(translation).into(), to_rotation(rotation))
}

/// Collider for a descriptor, carrying its mass and surface material.
///
/// Returns `None` when the backend cannot build a hull from the descriptor's points.
pub fn collider_builder(descriptor: &ColliderDescriptor) -> Option<ColliderBuilder> {
    let builder = match &descriptor.shape {
        Shape::Box {
            half_width,
            half_height,
            half_depth,
        } => ColliderBuilder::cuboid(*half_width, *half_height, *half_depth),
        Shape::Sphere { radius } => ColliderBuilder::ball(*radius),
        Shape::ConvexHull { points } => {
            let points = points.iter().copied().map(to_point).collect::<Vec<_>>();
            ColliderBuilder::convex_hull(&points)?
        }
    };
    Some(
        builder
            .mass(descriptor.mass)
            .restitution(descriptor.restitution)
            .friction(descriptor.friction),
    )
}
