use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Render geometry of a primitive solid, in its local frame (centered on the origin).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
    Tetrahedron { radius: f32 },
    Octahedron { radius: f32 },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    /// Arbitrary mesh, kept as its vertex positions only.
    Mesh { vertices: Vec<Vec3> },
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Tetrahedron { .. } => "tetrahedron",
            Geometry::Octahedron { .. } => "octahedron",
            Geometry::Torus { .. } => "torus",
            Geometry::Mesh { .. } => "mesh",
        }
    }
}

/// Corners of a regular tetrahedron inscribed in a sphere of `radius`.
pub fn tetrahedron_vertices(radius: f32) -> Vec<Vec3> {
    [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ]
    .iter()
    .map(|v| v.normalize() * radius)
    .collect()
}

pub fn octahedron_vertices(radius: f32) -> Vec<Vec3> {
    vec![
        Vec3::X * radius,
        Vec3::NEG_X * radius,
        Vec3::Y * radius,
        Vec3::NEG_Y * radius,
        Vec3::Z * radius,
        Vec3::NEG_Z * radius,
    ]
}

/// Ring of tube cross sections around the z axis. Segment counts below 3 are raised to 3.
pub fn torus_vertices(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> Vec<Vec3> {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let mut vertices =
        Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let ring = radius + tube * v.cos();
            vertices.push(Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin()));
        }
    }
    vertices
}
