//! Sampled signed distance grid.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::MeshModel;
use crate::rig::DistanceField;

/// A signed distance function sampled on a regular grid.
///
/// Samples store the exact distance to the nearest triangle, negated when
/// the generalized winding number marks the sample as inside. Queries
/// between samples are trilinear; queries outside the grid add the distance
/// to the grid box.
#[derive(Debug, Clone)]
pub struct GridField {
    origin: Point3<f64>,
    cell: f64,
    /// Cells per axis; the grid has `dims[i] + 1` samples along axis `i`.
    dims: [usize; 3],
    samples: Vec<f64>,
}

impl GridField {
    /// Sample the signed distance of `mesh` on a grid with `resolution`
    /// cells along the longest side of its bounds, padded by one cell.
    pub fn new(mesh: &MeshModel, resolution: usize, parallel: bool) -> Self {
        let resolution = resolution.max(2);
        let (min, max) = mesh
            .bounding_box()
            .unwrap_or((Point3::origin(), Point3::new(1.0, 1.0, 1.0)));

        let extent = max - min;
        let longest = extent.x.max(extent.y).max(extent.z);
        let cell = if longest > 0.0 {
            longest / resolution as f64
        } else {
            1.0 / resolution as f64
        };

        let origin = min - Vector3::repeat(cell);
        let dims = [0, 1, 2].map(|i| (extent[i] / cell).ceil() as usize + 2);

        let triangles: Vec<[Point3<f64>; 3]> =
            (0..mesh.num_faces()).map(|f| mesh.face_positions(f)).collect();
        let loose_points: Vec<Point3<f64>> = if triangles.is_empty() {
            mesh.vertices.iter().map(|v| v.position).collect()
        } else {
            Vec::new()
        };

        let sx = dims[0] + 1;
        let sy = dims[1] + 1;
        let sz = dims[2] + 1;
        let sample_at = |index: usize| {
            let i = index % sx;
            let j = (index / sx) % sy;
            let k = index / (sx * sy);
            let p = origin + Vector3::new(i as f64, j as f64, k as f64) * cell;
            if triangles.is_empty() {
                nearest_point_distance(&p, &loose_points)
            } else {
                signed_distance_to_triangles(&p, &triangles)
            }
        };

        let count = sx * sy * sz;
        let samples: Vec<f64> = if parallel {
            (0..count).into_par_iter().map(sample_at).collect()
        } else {
            (0..count).map(sample_at).collect()
        };

        Self {
            origin,
            cell,
            dims,
            samples,
        }
    }

    /// Cells per axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Edge length of a grid cell.
    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    /// Central-difference gradient of the field at `p`.
    pub fn gradient(&self, p: &Point3<f64>) -> Vector3<f64> {
        let h = self.cell * 0.5;
        Vector3::from_fn(|axis, _| {
            let mut offset = Vector3::zeros();
            offset[axis] = h;
            (self.signed_distance(&(p + offset)) - self.signed_distance(&(p - offset))) / (2.0 * h)
        })
    }

    #[inline]
    fn sample(&self, i: usize, j: usize, k: usize) -> f64 {
        let sx = self.dims[0] + 1;
        let sy = self.dims[1] + 1;
        self.samples[i + sx * (j + sy * k)]
    }
}

impl DistanceField for GridField {
    fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        let mut local = (p - self.origin) / self.cell;
        let mut outside = Vector3::zeros();
        for axis in 0..3 {
            let upper = self.dims[axis] as f64;
            let clamped = local[axis].clamp(0.0, upper);
            outside[axis] = (local[axis] - clamped) * self.cell;
            local[axis] = clamped;
        }

        let base = [0, 1, 2].map(|axis| (local[axis].floor() as usize).min(self.dims[axis] - 1));
        let t = Vector3::from_fn(|axis, _| local[axis] - base[axis] as f64);
        let [i, j, k] = base;

        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let c00 = lerp(self.sample(i, j, k), self.sample(i + 1, j, k), t.x);
        let c10 = lerp(self.sample(i, j + 1, k), self.sample(i + 1, j + 1, k), t.x);
        let c01 = lerp(self.sample(i, j, k + 1), self.sample(i + 1, j, k + 1), t.x);
        let c11 = lerp(self.sample(i, j + 1, k + 1), self.sample(i + 1, j + 1, k + 1), t.x);
        let inside = lerp(lerp(c00, c10, t.y), lerp(c01, c11, t.y), t.z);

        inside + outside.norm()
    }

    fn sample_spacing(&self) -> f64 {
        self.cell
    }
}

fn nearest_point_distance(p: &Point3<f64>, points: &[Point3<f64>]) -> f64 {
    points
        .iter()
        .map(|q| (p - q).norm())
        .fold(f64::INFINITY, f64::min)
}

fn signed_distance_to_triangles(p: &Point3<f64>, triangles: &[[Point3<f64>; 3]]) -> f64 {
    let mut nearest = f64::INFINITY;
    let mut winding = 0.0;

    for [a, b, c] in triangles {
        let closest = closest_point_on_triangle(p, a, b, c);
        nearest = nearest.min((p - closest).norm_squared());
        winding += solid_angle(p, a, b, c);
    }

    let distance = nearest.sqrt();
    if (winding / (4.0 * PI)).abs() > 0.5 {
        -distance
    } else {
        distance
    }
}

/// Signed solid angle subtended by triangle `abc` at `p`.
fn solid_angle(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let a = a - p;
    let b = b - p;
    let c = c - p;
    let (la, lb, lc) = (a.norm(), b.norm(), c.norm());

    let numerator = a.dot(&b.cross(&c));
    let denominator = la * lb * lc + a.dot(&b) * lc + b.dot(&c) * la + c.dot(&a) * lb;
    2.0 * numerator.atan2(denominator)
}

/// Closest point to `p` on triangle `abc` (Voronoi region test).
fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}
