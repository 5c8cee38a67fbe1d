//! PLY (Stanford polygon) format support.
//!
//! Reads the `vertex` and `face` elements of ASCII and binary PLY files.
//! Polygons with more than three corners are fan-triangulated.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use super::triangulate_fan;
use crate::error::{Result, RigError};
use crate::mesh::{MeshModel, SkinningAlgorithm};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use skelfit::io::ply;
///
/// let mesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshModel> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| RigError::load(path, e))?;

    // Extract vertices
    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| RigError::load(path, "PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let x = get_float_property(vertex, "x")
            .ok_or_else(|| RigError::load(path, "vertex missing x coordinate"))?;
        let y = get_float_property(vertex, "y")
            .ok_or_else(|| RigError::load(path, "vertex missing y coordinate"))?;
        let z = get_float_property(vertex, "z")
            .ok_or_else(|| RigError::load(path, "vertex missing z coordinate"))?;
        vertices.push(Point3::new(x, y, z));
    }

    // Point clouds have no face element; the pipeline still needs the vertices
    let Some(face_element) = ply.payload.get("face") else {
        return MeshModel::from_triangles(&vertices, &[], SkinningAlgorithm::default());
    };

    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| RigError::load(path, "face missing vertex_indices property"))?;
        triangulate_fan(&indices, &mut faces);
    }

    MeshModel::from_triangles(&vertices, &faces, SkinningAlgorithm::default())
        .map_err(|e| RigError::load(path, e))
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ascii_ply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.ply");
        std::fs::write(
            &path,
            "ply\n\
             format ascii 1.0\n\
             element vertex 4\n\
             property float x\n\
             property float y\n\
             property float z\n\
             element face 1\n\
             property list uchar int vertex_indices\n\
             end_header\n\
             0 0 0\n\
             1 0 0\n\
             1 1 0\n\
             0 1 0\n\
             4 0 1 2 3\n",
        )
        .unwrap();

        let mesh = load(&path).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(load("/nonexistent/mesh.ply"), Err(RigError::Io(_))));
    }
}
