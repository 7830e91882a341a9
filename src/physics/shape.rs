//! Plane-bounded hull shapes and the swept point test.
//!
//! A [`Shape`] is a static asset: a list of flat convex polygons in the owning
//! entity's local space. It is built once, shared behind an `Arc`, and never
//! mutated afterwards.

use glam::Vec3;
use thiserror::Error;

use super::collision::Collision;

/// Fewest vertices that describe a flat polygon.
pub const MIN_PLANE_VERTICES: usize = 3;

/// Hits closer to the segment start than this are treated as "already touching".
const MIN_TIME_TO_IMPACT: f32 = 1e-6;
/// Segments nearly parallel to a plane never cross it.
const PARALLEL_EPSILON: f32 = 1e-9;
/// Slack allowed when testing a point against polygon edges.
const EDGE_TOLERANCE: f32 = 1e-4;
/// Points closer than this are merged when collecting shape vertices.
const WELD_DISTANCE: f32 = 1e-6;

/// Errors raised while building a shape. Any of these makes the asset unusable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("shape has no planes")]
    NoPlanes,
    #[error("plane {plane} has {count} vertices, at least {MIN_PLANE_VERTICES} are required")]
    TooFewVertices { plane: usize, count: usize },
    #[error("plane {plane} has zero area, its normal is undefined")]
    DegeneratePlane { plane: usize },
    #[error("plane {plane} contains a non-finite vertex")]
    NonFinite { plane: usize },
}

/// A flat convex polygon with a precomputed outward normal.
///
/// Vertices wind counter-clockwise when seen from the outside.
#[derive(Debug, Clone)]
pub struct Plane {
    vertices: Vec<Vec3>,
    normal: Vec3,
    /// Signed distance of the plane from the origin along `normal`.
    distance: f32,
}

impl Plane {
    /// Build a plane from polygon vertices. `index` is only used for error reporting.
    pub fn new(vertices: Vec<Vec3>, index: usize) -> Result<Self, GeometryError> {
        if vertices.len() < MIN_PLANE_VERTICES {
            return Err(GeometryError::TooFewVertices {
                plane: index,
                count: vertices.len(),
            });
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::NonFinite { plane: index });
        }

        let normal = newell_normal(&vertices)
            .try_normalize()
            .ok_or(GeometryError::DegeneratePlane { plane: index })?;
        let centroid = vertices.iter().copied().sum::<Vec3>() / vertices.len() as f32;

        Ok(Self {
            distance: normal.dot(centroid),
            vertices,
            normal,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Unit outward normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Whether a point lying in the plane falls inside the polygon.
    pub fn contains(&self, point: Vec3) -> bool {
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let edge = b - a;
            let edge_len = edge.length();
            if edge_len <= WELD_DISTANCE {
                continue;
            }
            // Distance of the point inside the edge line, positive towards the interior.
            let inside = edge.cross(point - a).dot(self.normal) / edge_len;
            if inside < -EDGE_TOLERANCE {
                return false;
            }
        }
        true
    }

    /// Fraction along `start -> start + direction` where the segment crosses
    /// this polygon, with the crossing point.
    pub fn intersect(&self, start: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let denom = self.normal.dot(direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.distance - self.normal.dot(start)) / denom;
        if !(t > MIN_TIME_TO_IMPACT && t <= 1.0) {
            return None;
        }

        let point = start + direction * t;
        self.contains(point).then_some((t, point))
    }
}

/// Newell's method: robust polygon normal, length equals twice the area.
fn newell_normal(vertices: &[Vec3]) -> Vec3 {
    let n = vertices.len();
    let mut normal = Vec3::ZERO;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// An immutable hull made of planes, in the owning entity's local space.
#[derive(Debug, Clone)]
pub struct Shape {
    planes: Vec<Plane>,
    points: Vec<Vec3>,
    bounding_radius: f32,
}

impl Shape {
    /// Build a shape from polygons given as vertex lists.
    pub fn from_polygons<I, P>(polygons: I) -> Result<Self, GeometryError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<Vec3>>,
    {
        let planes = polygons
            .into_iter()
            .enumerate()
            .map(|(index, vertices)| Plane::new(vertices.into(), index))
            .collect::<Result<Vec<_>, _>>()?;

        if planes.is_empty() {
            return Err(GeometryError::NoPlanes);
        }

        let mut points: Vec<Vec3> = Vec::new();
        for plane in &planes {
            for &v in plane.vertices() {
                if !points.iter().any(|p| p.distance_squared(v) <= WELD_DISTANCE * WELD_DISTANCE) {
                    points.push(v);
                }
            }
        }

        let bounding_radius = points.iter().map(|p| p.length()).fold(0.0, f32::max);

        Ok(Self {
            planes,
            points,
            bounding_radius,
        })
    }

    /// Axis-aligned box centered on the local origin.
    pub fn cuboid(half_extents: Vec3) -> Result<Self, GeometryError> {
        let h = half_extents;
        let faces = [
            (Vec3::X * h.x, Vec3::Y * h.y, Vec3::Z * h.z),
            (Vec3::NEG_X * h.x, Vec3::Z * h.z, Vec3::Y * h.y),
            (Vec3::Y * h.y, Vec3::Z * h.z, Vec3::X * h.x),
            (Vec3::NEG_Y * h.y, Vec3::X * h.x, Vec3::Z * h.z),
            (Vec3::Z * h.z, Vec3::X * h.x, Vec3::Y * h.y),
            (Vec3::NEG_Z * h.z, Vec3::Y * h.y, Vec3::X * h.x),
        ];
        Self::from_polygons(faces.map(|(center, u, v)| quad(center, u, v)))
    }

    /// Single square facing `normal`, centered on `center`.
    pub fn square(center: Vec3, normal: Vec3, half_size: f32) -> Result<Self, GeometryError> {
        let normal = normal
            .try_normalize()
            .ok_or(GeometryError::DegeneratePlane { plane: 0 })?;
        let u = normal.any_orthonormal_vector() * half_size;
        let v = normal.cross(u);
        Self::from_polygons([quad(center, u, v)])
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Distinct vertices of the shape (the hitpoints of a moving entity).
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Radius of the sphere around the local origin that encloses every vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Earliest crossing of the local-space segment `start -> start + direction`
    /// with any plane of this shape.
    ///
    /// The returned hit position is in local space.
    pub fn maximum_movement(&self, start: Vec3, direction: Vec3) -> Option<Collision> {
        if direction.length_squared() == 0.0 {
            return None;
        }

        let mut best: Option<Collision> = None;
        for plane in &self.planes {
            let Some((t, point)) = plane.intersect(start, direction) else {
                continue;
            };
            if best.map_or(true, |b| t < b.time_to_impact) {
                best = Some(Collision::new(t, plane.normal(), point));
            }
        }
        best
    }
}

/// Quad around `center` spanned by `u` and `v`, wound so its normal is `u × v`.
fn quad(center: Vec3, u: Vec3, v: Vec3) -> Vec<Vec3> {
    vec![
        center - u - v,
        center + u - v,
        center + u + v,
        center - u + v,
    ]
}
