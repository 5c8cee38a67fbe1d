//! A self-contained [`RigBackend`].
//!
//! The reference backend makes the binary usable without an external
//! rigging library. It is deliberately simple:
//!
//! - [`GridField`] samples a signed distance function on a regular grid.
//! - Fitting centers the skeleton in the mesh and pulls stray joints inward
//!   along the field gradient.
//! - Weights fall off with distance to each bone, restricted to the bones a
//!   vertex can see through the interior of the mesh.
//!
//! Grid construction and weight solving run on the rayon thread pool when
//! [`ReferenceOptions::parallel`] is set.

mod field;
mod fit;
mod weights;

use nalgebra::Point3;
use tracing::{debug, warn};

use super::{Attachment, RigBackend, RigOutput, VisibilityTester};
use crate::mesh::MeshModel;
use crate::skeleton::Skeleton;

pub use field::GridField;

/// Options for the reference backend.
#[derive(Debug, Clone)]
pub struct ReferenceOptions {
    /// Grid cells along the longest side of the mesh bounds.
    pub grid_resolution: usize,

    /// Maximum gradient steps when pulling a joint inside the mesh.
    pub max_projection_steps: usize,

    /// Depth below the surface at which vertices are sampled and joints are
    /// placed.
    pub surface_offset: f64,

    /// Exponent applied to the squared bone distance when weighting.
    pub falloff: f64,

    /// How far outside the surface a visibility sample may lie.
    pub visibility_tolerance: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for ReferenceOptions {
    fn default() -> Self {
        Self {
            grid_resolution: 24,
            max_projection_steps: 64,
            surface_offset: 0.01,
            falloff: 2.0,
            visibility_tolerance: 0.01,
            parallel: true,
        }
    }
}

impl ReferenceOptions {
    /// Set the grid resolution (at least 2).
    pub fn with_grid_resolution(mut self, resolution: usize) -> Self {
        self.grid_resolution = resolution.max(2);
        self
    }

    /// Set the maximum number of projection steps.
    pub fn with_max_projection_steps(mut self, steps: usize) -> Self {
        self.max_projection_steps = steps;
        self
    }

    /// Set the surface offset.
    pub fn with_surface_offset(mut self, offset: f64) -> Self {
        self.surface_offset = offset.max(0.0);
        self
    }

    /// Set the weight falloff exponent.
    pub fn with_falloff(mut self, falloff: f64) -> Self {
        self.falloff = falloff;
        self
    }

    /// Set the visibility tolerance.
    pub fn with_visibility_tolerance(mut self, tolerance: f64) -> Self {
        self.visibility_tolerance = tolerance;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Grid-field backend.
#[derive(Debug, Clone, Default)]
pub struct ReferenceBackend {
    options: ReferenceOptions,
}

impl ReferenceBackend {
    /// Create a backend with the given options.
    pub fn new(options: ReferenceOptions) -> Self {
        Self { options }
    }

    /// The backend options.
    pub fn options(&self) -> &ReferenceOptions {
        &self.options
    }
}

impl RigBackend for ReferenceBackend {
    type Field = GridField;

    fn fit(&self, skeleton: &Skeleton, mesh: &MeshModel) -> RigOutput {
        let field = self.build_field(mesh);

        let embedding = fit::fit_embedding(&field, skeleton, mesh, &self.options);
        if embedding.is_empty() {
            warn!("could not place every joint inside the mesh");
            return RigOutput::failed();
        }

        let tester = VisibilityTester::new(&field).with_tolerance(self.visibility_tolerance());
        let attachment = self.build_attachment(mesh, skeleton, &embedding, &tester);

        RigOutput {
            embedding,
            attachment: Some(attachment),
        }
    }

    fn build_field(&self, mesh: &MeshModel) -> GridField {
        let field = GridField::new(mesh, self.options.grid_resolution, self.options.parallel);
        debug!(
            dims = ?field.dims(),
            spacing = field.cell_size(),
            "built distance grid"
        );
        field
    }

    fn build_attachment(
        &self,
        mesh: &MeshModel,
        skeleton: &Skeleton,
        embedding: &[Point3<f64>],
        tester: &VisibilityTester<'_, GridField>,
    ) -> Attachment {
        weights::solve(mesh, skeleton, embedding, tester, &self.options)
    }

    fn visibility_tolerance(&self) -> f64 {
        self.options.visibility_tolerance
    }
}

#[cfg(test)]
pub(crate) mod test_meshes {
    use nalgebra::Point3;

    use crate::mesh::{MeshModel, SkinningAlgorithm};

    /// Closed, outward-wound box spanning `min`..`max`.
    pub fn closed_box(min: Point3<f64>, max: Point3<f64>) -> MeshModel {
        let v = |x: bool, y: bool, z: bool| {
            Point3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let positions = vec![
            v(false, false, false),
            v(true, false, false),
            v(true, true, false),
            v(false, true, false),
            v(false, false, true),
            v(true, false, true),
            v(true, true, true),
            v(false, true, true),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [1, 2, 6],
            [1, 6, 5],
            [0, 4, 7],
            [0, 7, 3],
        ];
        let mut mesh = MeshModel::from_triangles(&positions, &faces, SkinningAlgorithm::Lbs).unwrap();
        mesh.compute_vertex_normals();
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::test_meshes::closed_box;
    use super::*;
    use crate::skeleton::Preset;

    #[test]
    fn test_options_builders() {
        let options = ReferenceOptions::default()
            .with_grid_resolution(1)
            .with_surface_offset(-1.0)
            .sequential();
        assert_eq!(options.grid_resolution, 2);
        assert_eq!(options.surface_offset, 0.0);
        assert!(!options.parallel);
    }

    #[test]
    fn test_fit_inside_box() {
        let mut mesh = closed_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        mesh.normalize_bounding_box();
        mesh.compute_vertex_normals();

        let mut skeleton = Skeleton::preset(Preset::Human);
        skeleton.scale(0.7 * 0.5);

        let backend = ReferenceBackend::new(ReferenceOptions::default().sequential());
        let output = backend.fit(&skeleton, &mesh);
        assert!(!output.is_failed());
        assert_eq!(output.embedding.len(), skeleton.joint_count());

        let field = backend.build_field(&mesh);
        for p in &output.embedding {
            assert!(crate::rig::DistanceField::signed_distance(&field, p) <= 0.0);
        }

        let attachment = output.attachment.unwrap();
        assert_eq!(attachment.num_vertices(), mesh.num_vertices());
    }
}
