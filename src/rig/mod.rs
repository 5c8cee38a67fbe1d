//! Rig pipeline controller.
//!
//! The controller turns a preprocessed mesh and a skeleton into a joint
//! embedding plus a per-vertex [`Attachment`]. The geometric work is done by
//! a [`RigBackend`]; the controller only chooses the strategy, enforces the
//! failure gates and owns the intermediate resources.
//!
//! Two strategies are available:
//!
//! - [`FitStrategy::Automatic`] hands the scaled skeleton to
//!   [`RigBackend::fit`].
//! - [`FitStrategy::Direct`] builds a distance field, seeds the embedding
//!   from the template's default joint positions mapped into the mesh's
//!   normalized frame, and solves the attachment against that embedding.
//!
//! # Example
//!
//! ```no_run
//! use skelfit::prelude::*;
//! use skelfit::rig::reference::ReferenceBackend;
//!
//! let mut mesh = skelfit::io::load("model.obj", SkinningAlgorithm::Lbs).unwrap();
//! mesh.normalize_bounding_box();
//! mesh.compute_vertex_normals();
//!
//! let template = Skeleton::preset(Preset::Human);
//! let mut fit_skeleton = template.clone();
//! fit_skeleton.scale(0.7);
//!
//! let backend = ReferenceBackend::default();
//! let result = RigController::new(&backend)
//!     .run(&fit_skeleton, &template, &mesh, FitStrategy::Direct)
//!     .unwrap();
//! assert_eq!(result.embedding.len(), template.joint_count());
//! ```

pub mod reference;

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::error::{Result, RigError};
use crate::mesh::MeshModel;
use crate::skeleton::Skeleton;

/// Default tolerance for [`VisibilityTester`]: samples may sit this far
/// outside the surface and still count as inside.
pub const DEFAULT_VISIBILITY_TOLERANCE: f64 = 1e-4;

/// A signed distance function over a mesh.
///
/// Negative values are inside the surface, positive values outside.
pub trait DistanceField {
    /// Signed distance from `p` to the surface.
    fn signed_distance(&self, p: &Point3<f64>) -> f64;

    /// Largest step at which the field can be sampled without skipping
    /// features. Used by [`VisibilityTester`] to space its samples.
    fn sample_spacing(&self) -> f64 {
        0.01
    }
}

/// Segment visibility queries against a borrowed [`DistanceField`].
///
/// Two points see each other when the straight segment between them stays
/// inside the surface.
#[derive(Debug)]
pub struct VisibilityTester<'a, F> {
    field: &'a F,
    tolerance: f64,
}

impl<'a, F: DistanceField> VisibilityTester<'a, F> {
    /// Create a tester with [`DEFAULT_VISIBILITY_TOLERANCE`].
    pub fn new(field: &'a F) -> Self {
        Self {
            field,
            tolerance: DEFAULT_VISIBILITY_TOLERANCE,
        }
    }

    /// Set the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The field being tested against.
    pub fn field(&self) -> &'a F {
        self.field
    }

    /// Whether every sample on the segment `a`..`b` lies inside the surface.
    pub fn can_see(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        let spacing = self.field.sample_spacing().max(f64::EPSILON) * 0.5;
        let length = (b - a).norm();
        let steps = ((length / spacing).ceil() as usize).max(1);

        (0..=steps).all(|i| {
            let t = i as f64 / steps as f64;
            let p = a + (b - a) * t;
            self.field.signed_distance(&p) <= self.tolerance
        })
    }
}

/// Per-vertex skinning weights.
///
/// Row `v` holds one weight per joint. Weight `j` is the influence of the
/// bone from joint `j` to its parent, so the root column carries no bone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    weights: Vec<Vec<f64>>,
}

impl Attachment {
    /// Wrap precomputed weight rows.
    pub fn new(weights: Vec<Vec<f64>>) -> Self {
        Self { weights }
    }

    /// Number of vertex rows.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.weights.len()
    }

    /// Weights for vertex `vertex`, one per joint.
    #[inline]
    pub fn weights_for(&self, vertex: usize) -> &[f64] {
        &self.weights[vertex]
    }

    /// Iterate over all rows in vertex order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.weights.iter().map(Vec::as_slice)
    }
}

/// What an automatic fit produces.
///
/// An empty embedding means the fit failed; the attachment may then be
/// absent as well.
#[derive(Debug, Clone, Default)]
pub struct RigOutput {
    /// Joint positions in the mesh's normalized frame.
    pub embedding: Vec<Point3<f64>>,
    /// Skinning weights, if the backend got that far.
    pub attachment: Option<Attachment>,
}

impl RigOutput {
    /// A fit that produced nothing.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Whether this output is unusable.
    pub fn is_failed(&self) -> bool {
        self.embedding.is_empty() || self.attachment.is_none()
    }
}

/// The geometric capabilities the controller needs.
pub trait RigBackend {
    /// Distance field built for the direct branch.
    type Field: DistanceField;

    /// Fit `skeleton` into `mesh`, producing an embedding and attachment.
    fn fit(&self, skeleton: &Skeleton, mesh: &MeshModel) -> RigOutput;

    /// Build a distance field over `mesh`.
    fn build_field(&self, mesh: &MeshModel) -> Self::Field;

    /// Solve skinning weights for a fixed embedding.
    fn build_attachment(
        &self,
        mesh: &MeshModel,
        skeleton: &Skeleton,
        embedding: &[Point3<f64>],
        tester: &VisibilityTester<'_, Self::Field>,
    ) -> Attachment;

    /// Tolerance the controller uses when wrapping a field in a tester.
    fn visibility_tolerance(&self) -> f64 {
        DEFAULT_VISIBILITY_TOLERANCE
    }
}

/// How joints are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitStrategy {
    /// Let the backend search for an embedding.
    #[default]
    Automatic,
    /// Use the template's default joint positions as-is.
    Direct,
}

impl FitStrategy {
    /// Strategy for the `no_fit` flag of a run.
    pub fn from_no_fit(no_fit: bool) -> Self {
        if no_fit {
            FitStrategy::Direct
        } else {
            FitStrategy::Automatic
        }
    }
}

/// A validated rig, ready for export.
#[derive(Debug, Clone)]
pub struct RigResult {
    /// Joint positions in the mesh's normalized frame, one per joint.
    pub embedding: Vec<Point3<f64>>,
    /// Skinning weights, one row per mesh vertex.
    pub attachment: Attachment,
}

/// Runs a [`RigBackend`] and gates its output.
#[derive(Debug)]
pub struct RigController<'b, B> {
    backend: &'b B,
}

impl<'b, B: RigBackend> RigController<'b, B> {
    /// Create a controller over `backend`.
    pub fn new(backend: &'b B) -> Self {
        Self { backend }
    }

    /// Produce a rig for `mesh`.
    ///
    /// `fit_skeleton` is the scaled skeleton used by the automatic strategy;
    /// `template` is the configured skeleton whose default positions seed the
    /// direct strategy. Both must describe the same joint hierarchy.
    pub fn run(
        &self,
        fit_skeleton: &Skeleton,
        template: &Skeleton,
        mesh: &MeshModel,
        strategy: FitStrategy,
    ) -> Result<RigResult> {
        let (output, expected_joints) = match strategy {
            FitStrategy::Automatic => {
                debug!(joints = fit_skeleton.joint_count(), "running automatic fit");
                (self.backend.fit(fit_skeleton, mesh), fit_skeleton.joint_count())
            }
            FitStrategy::Direct => {
                debug!(joints = template.joint_count(), "running direct embedding");
                (self.embed_directly(template, mesh), template.joint_count())
            }
        };

        let RigOutput {
            embedding,
            attachment,
        } = output;

        let attachment = match attachment {
            Some(attachment) if !embedding.is_empty() => attachment,
            _ => {
                warn!(?strategy, "backend produced no embedding");
                return Err(RigError::EmbeddingFailed);
            }
        };

        if embedding.len() != expected_joints {
            return Err(RigError::EmbeddingMismatch {
                expected: expected_joints,
                actual: embedding.len(),
            });
        }

        if attachment.num_vertices() != mesh.num_vertices() {
            return Err(RigError::AttachmentMismatch {
                vertex: mesh.num_vertices(),
                expected: mesh.num_vertices(),
                actual: attachment.num_vertices(),
            });
        }

        if let Some((vertex, row)) = attachment
            .rows()
            .enumerate()
            .find(|(_, row)| row.len() != embedding.len())
        {
            return Err(RigError::AttachmentMismatch {
                vertex,
                expected: embedding.len(),
                actual: row.len(),
            });
        }

        info!(
            joints = embedding.len(),
            vertices = attachment.num_vertices(),
            "rig complete"
        );

        Ok(RigResult {
            embedding,
            attachment,
        })
    }

    /// The direct branch. The field lives only for the duration of this call.
    fn embed_directly(&self, template: &Skeleton, mesh: &MeshModel) -> RigOutput {
        let field = self.backend.build_field(mesh);
        let tester =
            VisibilityTester::new(&field).with_tolerance(self.backend.visibility_tolerance());

        let embedding: Vec<Point3<f64>> = template
            .default_positions()
            .iter()
            .map(|p| mesh.to_normalized(p))
            .collect();

        let attachment = self
            .backend
            .build_attachment(mesh, template, &embedding, &tester);

        RigOutput {
            embedding,
            attachment: Some(attachment),
        }
    }
}
