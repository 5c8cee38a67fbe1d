//! # skelfit
//!
//! Skeleton embedding and skin attachment export for character meshes.
//!
//! skelfit takes a triangle mesh and a skeleton template, places the
//! skeleton's joints inside the mesh and computes per-vertex skinning
//! weights, then writes both as plain-text files (`skeleton.out` and
//! `attachment.out`) for downstream animation tools.
//!
//! ## Features
//!
//! - **Run configuration**: the legacy single-dash command syntax, folded
//!   into an immutable [`RunConfiguration`](config::RunConfiguration)
//! - **Skeleton templates**: human, horse, quad and centaur presets, or
//!   skeleton files
//! - **Pluggable rigging**: the controller drives any
//!   [`RigBackend`](rig::RigBackend); a grid-field reference backend is
//!   included
//! - **Multiple file formats**: OBJ, OFF, PLY, STL, glTF
//! - **Exact output notation**: stream-compatible `%g` numbers and four
//!   decimal weights
//!
//! ## Quick Start
//!
//! ```no_run
//! use skelfit::prelude::*;
//!
//! let config = RunConfiguration::from_tokens(&["skelfit", "model.obj", "-outdir", "rig"]).unwrap();
//! let report = Pipeline::default().run(&config).unwrap();
//! println!("wrote {}", report.paths.skeleton.display());
//! ```
//!
//! ## Driving the Stages Directly
//!
//! ```
//! use skelfit::prelude::*;
//! use skelfit::rig::reference::{ReferenceBackend, ReferenceOptions};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mut mesh = MeshModel::from_triangles(&positions, &faces, SkinningAlgorithm::Lbs).unwrap();
//!
//! let config = RunConfiguration::new("tetra.obj");
//! let fit_skeleton = skelfit::pipeline::preprocess(&config, &mut mesh);
//!
//! let backend = ReferenceBackend::new(ReferenceOptions::default().with_grid_resolution(8));
//! let result = RigController::new(&backend)
//!     .run(&fit_skeleton, &config.skeleton, &mesh, FitStrategy::Direct)
//!     .unwrap();
//!
//! let mut out = Vec::new();
//! skelfit::export::write_skeleton(&mut out, &result.embedding, &config.skeleton, &mesh).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap().lines().count(), 18);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod mesh;
pub mod pipeline;
pub mod rig;
pub mod skeleton;

pub use error::{ConfigError, Result, RigError};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use skelfit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RunConfiguration;
    pub use crate::error::{ConfigError, Result, RigError};
    pub use crate::io::{FileMeshLoader, MeshLoader};
    pub use crate::mesh::{MeshModel, SkinningAlgorithm};
    pub use crate::pipeline::Pipeline;
    pub use crate::rig::{
        Attachment, DistanceField, FitStrategy, RigBackend, RigController, RigOutput, RigResult,
        VisibilityTester,
    };
    pub use crate::skeleton::{Joint, Preset, Skeleton};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_direct_rig_of_tetrahedron() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mut mesh = MeshModel::from_triangles(&positions, &faces, SkinningAlgorithm::Lbs).unwrap();

        let config = RunConfiguration::new("tetra.obj");
        let fit_skeleton = crate::pipeline::preprocess(&config, &mut mesh);

        let backend = crate::rig::reference::ReferenceBackend::default();
        let result = RigController::new(&backend)
            .run(&fit_skeleton, &config.skeleton, &mesh, FitStrategy::Direct)
            .unwrap();

        assert_eq!(result.embedding.len(), 18);
        assert_eq!(result.attachment.num_vertices(), 4);
        for row in result.attachment.rows() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
