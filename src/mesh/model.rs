//! Triangle mesh with the normalization frame used during rigging.

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::error::{Result, RigError};

/// Length of the longest bounding-box side after normalization.
pub const NORMALIZED_EXTENT: f64 = 0.9;

/// Skinning algorithm requested for the mesh.
///
/// The choice travels with the mesh to downstream animation tools; the
/// rigging stages themselves do not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SkinningAlgorithm {
    /// Linear blend skinning.
    #[default]
    Lbs,
    /// Dual quaternion skinning.
    Dqs,
    /// Blend of LBS and DQS; `blend_weight` is the LBS share.
    Mix {
        /// How much of the LBS result to keep.
        blend_weight: f32,
    },
}

impl SkinningAlgorithm {
    /// Blend weight reported for algorithms without an explicit one.
    pub const DEFAULT_BLEND_WEIGHT: f32 = 0.5;

    /// The blend weight handed to the mesh loader.
    pub fn blend_weight(&self) -> f32 {
        match *self {
            SkinningAlgorithm::Mix { blend_weight } => blend_weight,
            SkinningAlgorithm::Lbs | SkinningAlgorithm::Dqs => Self::DEFAULT_BLEND_WEIGHT,
        }
    }

    /// Command-line name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            SkinningAlgorithm::Lbs => "LBS",
            SkinningAlgorithm::Dqs => "DQS",
            SkinningAlgorithm::Mix { .. } => "MIX",
        }
    }
}

/// A mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshVertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,
    /// Unit normal, zero until [`MeshModel::compute_vertex_normals`] runs.
    pub normal: Vector3<f64>,
}

impl MeshVertex {
    /// Create a vertex at `position` with a zero normal.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
        }
    }
}

/// A triangle mesh together with the affine frame established by
/// [`normalize_bounding_box`](MeshModel::normalize_bounding_box).
///
/// Normalized coordinates relate to the loaded (rotated) coordinates by
/// `normalized = offset + original * scale`.
#[derive(Debug, Clone)]
pub struct MeshModel {
    /// Vertices in file order.
    pub vertices: Vec<MeshVertex>,
    /// Triangles as vertex index triples.
    pub faces: Vec<[usize; 3]>,
    /// Translation of the normalization frame.
    pub offset: Vector3<f64>,
    /// Uniform scale of the normalization frame.
    pub scale: f64,
    /// Skinning algorithm the mesh was loaded for.
    pub skinning: SkinningAlgorithm,
}

impl Default for MeshModel {
    fn default() -> Self {
        Self::new(SkinningAlgorithm::default())
    }
}

impl MeshModel {
    /// Create an empty mesh.
    pub fn new(skinning: SkinningAlgorithm) -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            offset: Vector3::zeros(),
            scale: 1.0,
            skinning,
        }
    }

    /// Build a mesh from positions and triangles.
    ///
    /// Every face index must refer to an existing position.
    pub fn from_triangles(
        positions: &[Point3<f64>],
        faces: &[[usize; 3]],
        skinning: SkinningAlgorithm,
    ) -> Result<Self> {
        for (fi, face) in faces.iter().enumerate() {
            if let Some(&vi) = face.iter().find(|&&vi| vi >= positions.len()) {
                return Err(RigError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }

        let mut mesh = Self::new(skinning);
        mesh.vertices = positions.iter().copied().map(MeshVertex::new).collect();
        mesh.faces = faces.to_vec();
        Ok(mesh)
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Positions of the three corners of face `f`.
    pub fn face_positions(&self, f: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[f];
        [
            self.vertices[a].position,
            self.vertices[b].position,
            self.vertices[c].position,
        ]
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Rotate every vertex position in place: `position = rotation * position`.
    pub fn apply_rotation(&mut self, rotation: &UnitQuaternion<f64>) {
        for v in &mut self.vertices {
            v.position = rotation * v.position;
        }
    }

    /// Fit the mesh into the unit cube.
    ///
    /// The longest side of the bounding box becomes [`NORMALIZED_EXTENT`] and
    /// the box is centered at `(0.5, 0.5, 0.5)`. The applied transform is
    /// composed into [`offset`](Self::offset) and [`scale`](Self::scale).
    pub fn normalize_bounding_box(&mut self) {
        let Some((min, max)) = self.bounding_box() else {
            return;
        };

        let size = max - min;
        let longest = size.x.max(size.y).max(size.z);
        let cscale = if longest > 0.0 {
            NORMALIZED_EXTENT / longest
        } else {
            1.0
        };
        let center = Point3::from((min.coords + max.coords) * 0.5);
        let ctoadd = Vector3::repeat(0.5) - center.coords * cscale;

        for v in &mut self.vertices {
            v.position = Point3::from(ctoadd + v.position.coords * cscale);
        }

        self.offset = ctoadd + self.offset * cscale;
        self.scale *= cscale;
    }

    /// Recompute per-vertex normals from area-weighted face normals.
    ///
    /// Vertices not referenced by any face get a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];

        for f in 0..self.faces.len() {
            let [p0, p1, p2] = self.face_positions(f);
            let n = (p1 - p0).cross(&(p2 - p0)); // Area-weighted (not normalized)
            for &vi in &self.faces[f] {
                normals[vi] += n;
            }
        }

        for (v, n) in self.vertices.iter_mut().zip(normals) {
            v.normal = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        }
    }

    /// Map a point from the original frame into the normalized frame.
    #[inline]
    pub fn to_normalized(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.offset + p.coords * self.scale)
    }

    /// Map a point from the normalized frame back into the original frame.
    #[inline]
    pub fn to_original(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from((p.coords - self.offset) / self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn create_box(min: Point3<f64>, max: Point3<f64>) -> MeshModel {
        let positions = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ];
        let faces = vec![
            [0, 2, 1], [0, 3, 2], // bottom
            [4, 5, 6], [4, 6, 7], // top
            [0, 1, 5], [0, 5, 4], // front
            [2, 3, 7], [2, 7, 6], // back
            [1, 2, 6], [1, 6, 5], // right
            [0, 4, 7], [0, 7, 3], // left
        ];
        MeshModel::from_triangles(&positions, &faces, SkinningAlgorithm::Lbs).unwrap()
    }

    #[test]
    fn test_from_triangles_rejects_bad_index() {
        let positions = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let err = MeshModel::from_triangles(&positions, &[[0, 1, 2]], SkinningAlgorithm::Lbs)
            .unwrap_err();
        assert!(matches!(err, RigError::InvalidVertexIndex { face: 0, vertex: 2 }));
    }

    #[test]
    fn test_normalize_bounding_box_frame() {
        let mut mesh = create_box(Point3::new(-2.0, 0.0, 1.0), Point3::new(2.0, 1.0, 2.0));
        let original: Vec<_> = mesh.vertices.iter().map(|v| v.position).collect();

        mesh.normalize_bounding_box();

        let (min, max) = mesh.bounding_box().unwrap();
        assert_relative_eq!(max.x - min.x, NORMALIZED_EXTENT, epsilon = 1e-12);
        assert_relative_eq!((min.x + max.x) * 0.5, 0.5, epsilon = 1e-12);
        assert_relative_eq!((min.y + max.y) * 0.5, 0.5, epsilon = 1e-12);
        assert_relative_eq!((min.z + max.z) * 0.5, 0.5, epsilon = 1e-12);
        assert_relative_eq!(mesh.scale, 0.9 / 4.0, epsilon = 1e-12);

        for (v, p) in mesh.vertices.iter().zip(&original) {
            assert_relative_eq!(mesh.to_original(&v.position), *p, epsilon = 1e-12);
            assert_relative_eq!(mesh.to_normalized(p), v.position, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_normalize_twice_composes_frame() {
        let mut mesh = create_box(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 5.0, 5.0));
        let original = mesh.vertices[6].position;

        mesh.normalize_bounding_box();
        mesh.normalize_bounding_box();

        assert_relative_eq!(mesh.to_original(&mesh.vertices[6].position), original, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_degenerate_mesh() {
        let positions = vec![Point3::new(3.0, 3.0, 3.0)];
        let mut mesh = MeshModel::from_triangles(&positions, &[], SkinningAlgorithm::Dqs).unwrap();

        mesh.normalize_bounding_box();

        assert_eq!(mesh.scale, 1.0);
        assert_relative_eq!(mesh.vertices[0].position, Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_apply_rotation() {
        let mut mesh = create_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);

        mesh.apply_rotation(&rotation);

        // (1, 0, 0) -> (0, 1, 0)
        assert_relative_eq!(mesh.vertices[1].position, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_vertex_normals_point_outward() {
        let mut mesh = create_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.compute_vertex_normals();

        let center = Point3::new(0.5, 0.5, 0.5);
        for v in &mesh.vertices {
            assert_relative_eq!(v.normal.norm(), 1.0, epsilon = 1e-12);
            assert!(v.normal.dot(&(v.position - center)) > 0.0);
        }
    }

    #[test]
    fn test_isolated_vertex_has_zero_normal() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ];
        let mut mesh =
            MeshModel::from_triangles(&positions, &[[0, 1, 2]], SkinningAlgorithm::Lbs).unwrap();
        mesh.compute_vertex_normals();

        assert_relative_eq!(mesh.vertices[0].normal, Vector3::z());
        assert_eq!(mesh.vertices[3].normal, Vector3::zeros());
    }

    #[test]
    fn test_skinning_blend_weight() {
        assert_eq!(SkinningAlgorithm::Lbs.blend_weight(), 0.5);
        assert_eq!(SkinningAlgorithm::Dqs.blend_weight(), 0.5);
        assert_eq!(SkinningAlgorithm::Mix { blend_weight: 0.25 }.blend_weight(), 0.25);
        assert_eq!(SkinningAlgorithm::Mix { blend_weight: 0.25 }.name(), "MIX");
    }
}
