//! STL (stereolithography) format support.
//!
//! STL stores three corners per triangle. Corners with bit-identical
//! coordinates are merged so the mesh has shared vertices and smooth
//! vertex normals.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{Result, RigError};
use crate::mesh::{MeshModel, SkinningAlgorithm};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format.
///
/// # Example
///
/// ```no_run
/// use skelfit::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshModel> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| RigError::load(path, e))?;

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut lookup: HashMap<[u32; 3], usize> = HashMap::new();
    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(stl.faces.len());

    let mut find_or_add_vertex = |v: &stl_io::Vertex| -> usize {
        let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
        *lookup.entry(key).or_insert_with(|| {
            vertices.push(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            vertices.len() - 1
        })
    };

    for tri in &stl.faces {
        let i0 = find_or_add_vertex(&stl.vertices[tri.vertices[0]]);
        let i1 = find_or_add_vertex(&stl.vertices[tri.vertices[1]]);
        let i2 = find_or_add_vertex(&stl.vertices[tri.vertices[2]]);

        // Skip degenerate triangles
        if i0 != i1 && i1 != i2 && i0 != i2 {
            faces.push([i0, i1, i2]);
        }
    }

    MeshModel::from_triangles(&vertices, &faces, SkinningAlgorithm::default())
        .map_err(|e| RigError::load(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ascii_stl_merges_corners() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.stl");
        std::fs::write(
            &path,
            "solid pair\n\
             facet normal 0 0 1\n\
             outer loop\n\
             vertex 0 0 0\n\
             vertex 1 0 0\n\
             vertex 1 1 0\n\
             endloop\n\
             endfacet\n\
             facet normal 0 0 1\n\
             outer loop\n\
             vertex 0 0 0\n\
             vertex 1 1 0\n\
             vertex 0 1 0\n\
             endloop\n\
             endfacet\n\
             endsolid pair\n",
        )
        .unwrap();

        let mesh = load(&path).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
    }
}
