//! glTF format support.
//!
//! Loads every triangle primitive of a glTF or GLB file into one mesh.
//! Node transforms are not applied: positions are taken in mesh space, which
//! is what the rigging tools expect for single-character assets.

use std::path::Path;

use nalgebra::Point3;

use super::triangulate_fan;
use crate::error::{Result, RigError};
use crate::mesh::{MeshModel, SkinningAlgorithm};

/// Load a mesh from a glTF or GLB file.
///
/// # Example
///
/// ```no_run
/// use skelfit::io::gltf;
///
/// let mesh = gltf::load("character.glb").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshModel> {
    let path = path.as_ref();

    let (document, buffers, _images) = ::gltf::import(path).map_err(|e| RigError::load(path, e))?;

    let mut all_vertices: Vec<Point3<f64>> = Vec::new();
    let mut all_faces: Vec<[usize; 3]> = Vec::new();

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let vertex_offset = all_vertices.len();

            // Read positions
            if let Some(positions) = reader.read_positions() {
                for pos in positions {
                    all_vertices.push(Point3::new(pos[0] as f64, pos[1] as f64, pos[2] as f64));
                }
            }

            // Read indices
            if let Some(indices) = reader.read_indices() {
                let indices: Vec<usize> = indices.into_u32().map(|i| i as usize).collect();

                // Convert to triangles based on primitive mode
                match primitive.mode() {
                    ::gltf::mesh::Mode::Triangles => {
                        for chunk in indices.chunks(3) {
                            if chunk.len() == 3 {
                                all_faces.push([
                                    chunk[0] + vertex_offset,
                                    chunk[1] + vertex_offset,
                                    chunk[2] + vertex_offset,
                                ]);
                            }
                        }
                    }
                    ::gltf::mesh::Mode::TriangleStrip => {
                        for i in 0..indices.len().saturating_sub(2) {
                            if i % 2 == 0 {
                                all_faces.push([
                                    indices[i] + vertex_offset,
                                    indices[i + 1] + vertex_offset,
                                    indices[i + 2] + vertex_offset,
                                ]);
                            } else {
                                // Reverse winding for odd triangles
                                all_faces.push([
                                    indices[i] + vertex_offset,
                                    indices[i + 2] + vertex_offset,
                                    indices[i + 1] + vertex_offset,
                                ]);
                            }
                        }
                    }
                    ::gltf::mesh::Mode::TriangleFan => {
                        let fan: Vec<usize> = indices.iter().map(|i| i + vertex_offset).collect();
                        triangulate_fan(&fan, &mut all_faces);
                    }
                    _ => {
                        // Skip non-triangle primitives (points, lines)
                    }
                }
            }
        }
    }

    if all_faces.is_empty() && !all_vertices.is_empty() {
        return Err(RigError::load(path, "glTF file contains no triangle primitives"));
    }

    MeshModel::from_triangles(&all_vertices, &all_faces, SkinningAlgorithm::default())
        .map_err(|e| RigError::load(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/character.glb").unwrap_err();
        assert!(matches!(err, RigError::Load { .. }));
    }
}
