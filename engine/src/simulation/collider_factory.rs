//! Backend-independent collision shape descriptions.
//!
//! Every constructor validates its input and never touches the physics world; turning a
//! descriptor into an actual collider is the registry's job.

use common::configs::physics_config::ConfigMaterial;
use common::geometry::{octahedron_vertices, tetrahedron_vertices, torus_vertices, Geometry};
use derive_more::{Display, Error};
use glam::Vec3;

/// Relative tolerance (against the point cloud's extent) under which a hull is considered flat.
const HULL_TOLERANCE: f32 = 1e-5;

#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum ShapeError {
    #[display(
        fmt = "cannot build a convex hull from {} points spanning less than 3 dimensions",
        points
    )]
    DegenerateHull { points: usize },
    #[display(fmt = "invalid {}: {}", name, value)]
    InvalidDimension { name: &'static str, value: f32 },
    #[display(fmt = "invalid material {}: {}", name, value)]
    InvalidMaterial { name: &'static str, value: f32 },
}

pub type ShapeResult = Result<ColliderDescriptor, ShapeError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Box {
        half_width: f32,
        half_height: f32,
        half_depth: f32,
    },
    Sphere {
        radius: f32,
    },
    ConvexHull {
        points: Vec<Vec3>,
    },
}

/// Collision shape plus the mass and surface parameters of the body it will be attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderDescriptor {
    pub shape: Shape,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
}

impl ColliderDescriptor {
    /// A body is dynamic exactly when it has mass.
    pub fn is_dynamic(&self) -> bool {
        self.mass > 0.0
    }

    fn new(shape: Shape, material: ConfigMaterial) -> ShapeResult {
        if !material.mass.is_finite() || material.mass < 0.0 {
            return Err(ShapeError::InvalidMaterial {
                name: "mass",
                value: material.mass,
            });
        }
        if !(0.0..=1.0).contains(&material.restitution) {
            return Err(ShapeError::InvalidMaterial {
                name: "restitution",
                value: material.restitution,
            });
        }
        if !material.friction.is_finite() || material.friction < 0.0 {
            return Err(ShapeError::InvalidMaterial {
                name: "friction",
                value: material.friction,
            });
        }
        Ok(ColliderDescriptor {
            shape,
            mass: material.mass,
            restitution: material.restitution,
            friction: material.friction,
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<f32, ShapeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidDimension { name, value })
    }
}

/// Cuboid given by its half extents. `ConfigMaterial::default()` gives a static body with no
/// bounce and a friction of 1.
pub fn box_shape(
    half_width: f32,
    half_height: f32,
    half_depth: f32,
    material: ConfigMaterial,
) -> ShapeResult {
    let shape = Shape::Box {
        half_width: non_negative("half_width", half_width)?,
        half_height: non_negative("half_height", half_height)?,
        half_depth: non_negative("half_depth", half_depth)?,
    };
    ColliderDescriptor::new(shape, material)
}

pub fn sphere_shape(radius: f32, material: ConfigMaterial) -> ShapeResult {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ShapeError::InvalidDimension {
            name: "radius",
            value: radius,
        });
    }
    ColliderDescriptor::new(Shape::Sphere { radius }, material)
}

/// Convex hull of an arbitrary point cloud. Fails with [`ShapeError::DegenerateHull`] unless
/// the cloud holds at least 4 points that are not coplanar.
pub fn convex_hull_shape(points: &[Vec3], material: ConfigMaterial) -> ShapeResult {
    if is_degenerate(points) {
        return Err(ShapeError::DegenerateHull {
            points: points.len(),
        });
    }
    ColliderDescriptor::new(
        Shape::ConvexHull {
            points: points.to_vec(),
        },
        material,
    )
}

/// Collider for a render geometry: boxes and spheres map to primitives, anything else is
/// approximated by the hull of its vertices.
pub fn from_geometry(geometry: &Geometry, material: ConfigMaterial) -> ShapeResult {
    match *geometry {
        Geometry::Box {
            width,
            height,
            depth,
        } => box_shape(width / 2.0, height / 2.0, depth / 2.0, material),
        Geometry::Sphere { radius } => sphere_shape(radius, material),
        Geometry::Tetrahedron { radius } => {
            convex_hull_shape(&tetrahedron_vertices(radius), material)
        }
        Geometry::Octahedron { radius } => {
            convex_hull_shape(&octahedron_vertices(radius), material)
        }
        Geometry::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => convex_hull_shape(
            &torus_vertices(radius, tube, radial_segments, tubular_segments),
            material,
        ),
        Geometry::Mesh { ref vertices } => convex_hull_shape(vertices, material),
    }
}

/// Point maximizing `metric` over the offsets from `origin`.
fn farthest(points: &[Vec3], origin: Vec3, metric: impl Fn(Vec3) -> f32) -> (Vec3, f32) {
    points
        .iter()
        .map(|p| (*p, metric(*p - origin)))
        .fold((origin, 0.0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
}

fn is_degenerate(points: &[Vec3]) -> bool {
    if points.len() < 4 || points.iter().any(|p| !p.is_finite()) {
        return true;
    }

    let (min, max) = points
        .iter()
        .fold((points[0], points[0]), |(min, max), p| (min.min(*p), max.max(*p)));
    let epsilon = (max - min).max_element() * HULL_TOLERANCE;
    if epsilon <= 0.0 {
        return true;
    }

    let origin = points[0];
    let (a, length) = farthest(points, origin, |d| d.length());
    if length < epsilon {
        return true;
    }
    let axis = (a - origin) / length;

    let (b, distance_to_line) = farthest(points, origin, |d| d.cross(axis).length());
    if distance_to_line < epsilon {
        return true;
    }
    let normal = axis.cross(b - origin).normalize();

    let (_, distance_to_plane) = farthest(points, origin, |d| d.dot(normal).abs());
    distance_to_plane < epsilon
}
