//! Wavefront OBJ format support.
//!
//! Reads `v` and `f` records; texture and normal references in face
//! records (`f 1/2/3 ...`) are ignored, and negative indices are resolved
//! relative to the vertices read so far.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;

use super::triangulate_fan;
use crate::error::{Result, RigError};
use crate::mesh::{MeshModel, SkinningAlgorithm};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use skelfit::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshModel> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse(BufReader::new(file), path)
}

/// Parse OBJ text from a reader; `path` is used in errors only.
pub fn parse<R: BufRead>(reader: R, path: &Path) -> Result<MeshModel> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();
    let mut polygon: Vec<usize> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let mut words = line.split_whitespace();
        match words.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    let word = words.next().ok_or_else(|| {
                        RigError::load(path, format!("line {}: vertex has fewer than 3 coordinates", lineno + 1))
                    })?;
                    *c = word.parse().map_err(|_| {
                        RigError::load(path, format!("line {}: invalid coordinate `{}`", lineno + 1, word))
                    })?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                polygon.clear();
                for word in words {
                    let index = word.split('/').next().unwrap_or(word);
                    let index: i64 = index.parse().map_err(|_| {
                        RigError::load(path, format!("line {}: invalid face index `{}`", lineno + 1, word))
                    })?;
                    let resolved = match index {
                        i if i > 0 => i - 1,
                        i if i < 0 => vertices.len() as i64 + i,
                        _ => -1,
                    };
                    if resolved < 0 {
                        return Err(RigError::load(
                            path,
                            format!("line {}: face index {} out of range", lineno + 1, index),
                        ));
                    }
                    polygon.push(resolved as usize);
                }
                triangulate_fan(&polygon, &mut faces);
            }
            _ => {}
        }
    }

    MeshModel::from_triangles(&vertices, &faces, SkinningAlgorithm::default()).map_err(|e| {
        RigError::load(path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> Result<MeshModel> {
        parse(text.as_bytes(), Path::new("test.obj"))
    }

    #[test]
    fn test_parse_quad_with_attributes() {
        let mesh = parse_str(
            "# a quad\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 1 1 0\n\
             v 0 1 0\n\
             vn 0 0 1\n\
             f 1/1/1 2/2/1 3/3/1 4//1\n",
        )
        .unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_parse_negative_indices() {
        let mesh = parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_parse_rejects_out_of_range_face() {
        let err = parse_str("v 0 0 0\nv 1 0 0\nf 1 2 7\n").unwrap_err();
        assert!(matches!(err, RigError::Load { .. }));

        assert!(parse_str("v 0 0 0\nf 0 1 2\n").is_err());
    }

    #[test]
    fn test_parse_empty_file() {
        let mesh = parse_str("# nothing here\n").unwrap();
        assert!(mesh.is_empty());
    }
}
