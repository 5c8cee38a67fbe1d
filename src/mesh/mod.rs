//! Mesh data used by the rigging pipeline.
//!
//! The pipeline works on a plain triangle soup ([`MeshModel`]) rather than a
//! connectivity structure: the stages only need positions, normals and the
//! affine frame that maps the mesh into the unit cube.
//!
//! # Normalization Frame
//!
//! After [`MeshModel::normalize_bounding_box`], positions live in a frame where
//! the mesh's longest side is `0.9` and its center is `(0.5, 0.5, 0.5)`:
//!
//! ```
//! use skelfit::mesh::{MeshModel, SkinningAlgorithm};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(0.0, 2.0, 0.0),
//! ];
//! let mut mesh = MeshModel::from_triangles(&positions, &[[0, 1, 2]], SkinningAlgorithm::Lbs).unwrap();
//! mesh.normalize_bounding_box();
//!
//! let back = mesh.to_original(&mesh.vertices[1].position);
//! assert!((back - positions[1]).norm() < 1e-12);
//! ```

mod model;

pub use model::{MeshModel, MeshVertex, SkinningAlgorithm, NORMALIZED_EXTENT};
