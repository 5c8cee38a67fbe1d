//! Mesh loading.
//!
//! The pipeline reaches the filesystem through the [`MeshLoader`] trait so
//! tests can substitute in-memory meshes. [`FileMeshLoader`] is the default
//! implementation and dispatches on the file extension.
//!
//! # Supported Formats
//!
//! | Format | Extension | Notes |
//! |--------|-----------|-------|
//! | Wavefront OBJ | `.obj` | Polygons are fan-triangulated |
//! | Object File Format | `.off` | Polygons are fan-triangulated |
//! | PLY | `.ply` | Stanford polygon format |
//! | STL | `.stl` | Binary and ASCII |
//! | glTF | `.gltf`, `.glb` | All triangle primitives are merged |
//!
//! Only positions and triangles are read. Normals are recomputed by the
//! pipeline after the pre-transform.
//!
//! ```no_run
//! use skelfit::io;
//! use skelfit::mesh::SkinningAlgorithm;
//!
//! let mesh = io::load("model.obj", SkinningAlgorithm::Lbs).unwrap();
//! println!("{} vertices", mesh.num_vertices());
//! ```

pub mod gltf;
pub mod obj;
pub mod off;
pub mod ply;
pub mod stl;

use std::path::Path;

use tracing::debug;

use crate::error::{Result, RigError};
use crate::mesh::{MeshModel, SkinningAlgorithm};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// Object File Format.
    Off,
    /// PLY (Stanford polygon) format.
    Ply,
    /// STL (stereolithography) format.
    Stl,
    /// glTF format.
    Gltf,
    /// glTF binary format.
    Glb,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "off" => Some(Format::Off),
            "ply" => Some(Format::Ply),
            "stl" => Some(Format::Stl),
            "gltf" => Some(Format::Gltf),
            "glb" => Some(Format::Glb),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Source of meshes for the pipeline.
pub trait MeshLoader {
    /// Load the mesh at `path` for the given skinning algorithm.
    ///
    /// Implementations may return a mesh without vertices; the pipeline
    /// treats that as a load failure.
    fn load(&self, path: &Path, skinning: SkinningAlgorithm) -> Result<MeshModel>;
}

/// Loads meshes from files, choosing the parser by extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMeshLoader;

impl MeshLoader for FileMeshLoader {
    fn load(&self, path: &Path, skinning: SkinningAlgorithm) -> Result<MeshModel> {
        load(path, skinning)
    }
}

/// Load a mesh from a file with automatic format detection.
pub fn load<P: AsRef<Path>>(path: P, skinning: SkinningAlgorithm) -> Result<MeshModel> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| RigError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    let mut mesh = match format {
        Format::Obj => obj::load(path)?,
        Format::Off => off::load(path)?,
        Format::Ply => ply::load(path)?,
        Format::Stl => stl::load(path)?,
        Format::Gltf | Format::Glb => gltf::load(path)?,
    };
    mesh.skinning = skinning;

    debug!(
        path = %path.display(),
        ?format,
        vertices = mesh.num_vertices(),
        faces = mesh.num_faces(),
        "loaded mesh"
    );

    Ok(mesh)
}

/// Split a polygon into a triangle fan, appending to `faces`.
pub(crate) fn triangulate_fan(polygon: &[usize], faces: &mut Vec<[usize; 3]>) {
    for i in 1..polygon.len().saturating_sub(1) {
        faces.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}
