//! End-to-end rigging run.
//!
//! [`Pipeline::run`] executes the stages in order, each a hard gate:
//!
//! 1. load the mesh (an error or an empty mesh aborts)
//! 2. rotate, normalize and recompute normals
//! 3. scale a copy of the skeleton for fitting
//! 4. fit or embed directly via the [`RigController`]
//! 5. write `skeleton.out` and `attachment.out`
//!
//! Nothing is written unless every earlier stage succeeded.

use tracing::{debug, info};

use crate::config::RunConfiguration;
use crate::error::{Result, RigError};
use crate::export::{self, ExportPaths};
use crate::io::{FileMeshLoader, MeshLoader};
use crate::mesh::MeshModel;
use crate::rig::reference::ReferenceBackend;
use crate::rig::{FitStrategy, RigBackend, RigController};
use crate::skeleton::Skeleton;

/// Factor between skeleton template units and the normalized mesh box.
///
/// The fit skeleton is scaled by `skeleton_scale * SKELETON_SCALE_HEURISTIC`.
pub const SKELETON_SCALE_HEURISTIC: f64 = 0.7;

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// The written files.
    pub paths: ExportPaths,
    /// Number of joints written.
    pub joints: usize,
    /// Number of attachment rows written.
    pub vertices: usize,
}

/// The rigging pipeline over a mesh source and a backend.
#[derive(Debug, Clone)]
pub struct Pipeline<L, B> {
    loader: L,
    backend: B,
}

impl Default for Pipeline<FileMeshLoader, ReferenceBackend> {
    fn default() -> Self {
        Self::new(FileMeshLoader, ReferenceBackend::default())
    }
}

impl<L: MeshLoader, B: RigBackend> Pipeline<L, B> {
    /// Create a pipeline.
    pub fn new(loader: L, backend: B) -> Self {
        Self { loader, backend }
    }

    /// Run every stage for `config`.
    pub fn run(&self, config: &RunConfiguration) -> Result<ExportReport> {
        if config.stop_at_mesh || config.stop_after_circles {
            debug!(
                stop_at_mesh = config.stop_at_mesh,
                stop_after_circles = config.stop_after_circles,
                "stage flags are accepted but have no effect"
            );
        }

        let mut mesh = self.load_mesh(config)?;
        let fit_skeleton = preprocess(config, &mut mesh);

        let result = RigController::new(&self.backend).run(
            &fit_skeleton,
            &config.skeleton,
            &mesh,
            FitStrategy::from_no_fit(config.no_fit),
        )?;

        // The template carries the hierarchy for both strategies
        let paths = export::export_rig(&config.output_dir, &result, &config.skeleton, &mesh)?;

        Ok(ExportReport {
            paths,
            joints: result.embedding.len(),
            vertices: result.attachment.num_vertices(),
        })
    }

    /// Load the mesh named by `config`, rejecting empty meshes.
    pub fn load_mesh(&self, config: &RunConfiguration) -> Result<MeshModel> {
        let mesh = self
            .loader
            .load(&config.filename, config.skinning)
            .map_err(|e| match e {
                RigError::Io(io) => RigError::load(&config.filename, io),
                other => other,
            })?;
        if mesh.is_empty() {
            return Err(RigError::EmptyMesh {
                path: config.filename.clone(),
            });
        }

        info!(
            path = %config.filename.display(),
            vertices = mesh.num_vertices(),
            faces = mesh.num_faces(),
            skinning = mesh.skinning.name(),
            "mesh loaded"
        );
        Ok(mesh)
    }
}

/// Apply the configured transform to `mesh` and return the fit skeleton.
///
/// The mesh is rotated, normalized into the unit cube and given fresh
/// normals. The returned skeleton is a copy of the template scaled by
/// [`RunConfiguration::fit_scale`].
pub fn preprocess(config: &RunConfiguration, mesh: &mut MeshModel) -> Skeleton {
    mesh.apply_rotation(&config.mesh_transform);
    mesh.normalize_bounding_box();
    mesh.compute_vertex_normals();

    let mut skeleton = config.skeleton.clone();
    skeleton.scale(config.fit_scale());

    debug!(
        offset = ?mesh.offset,
        scale = mesh.scale,
        skeleton_scale = config.fit_scale(),
        "preprocessed mesh"
    );
    skeleton
}
