//! Object File Format (OFF) support.

use std::fs;
use std::path::Path;

use nalgebra::Point3;

use super::triangulate_fan;
use crate::error::{Result, RigError};
use crate::mesh::{MeshModel, SkinningAlgorithm};

/// Load a mesh from an OFF file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshModel> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse(&text, path)
}

/// Parse OFF text; `path` is used in errors only.
pub fn parse(text: &str, path: &Path) -> Result<MeshModel> {
    // Comments run to the end of the line
    let mut tokens = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .peekable();

    // The header keyword is optional in some writers
    if tokens.peek().is_some_and(|t| t.ends_with("OFF")) {
        tokens.next();
    }

    let mut next_number = |what: &str| -> Result<f64> {
        let token = tokens
            .next()
            .ok_or_else(|| RigError::load(path, format!("unexpected end of file reading {}", what)))?;
        token
            .parse()
            .map_err(|_| RigError::load(path, format!("invalid {} `{}`", what, token)))
    };

    let num_vertices = count(next_number("vertex count")?, "vertex count", path)?;
    let num_faces = count(next_number("face count")?, "face count", path)?;
    let _num_edges = next_number("edge count")?;

    // Header counts are untrusted; every element needs at least two bytes
    let limit = text.len() / 2;
    let mut vertices = Vec::with_capacity(num_vertices.min(limit));
    for _ in 0..num_vertices {
        let x = next_number("coordinate")?;
        let y = next_number("coordinate")?;
        let z = next_number("coordinate")?;
        vertices.push(Point3::new(x, y, z));
    }

    let mut faces = Vec::with_capacity(num_faces.min(limit));
    let mut polygon = Vec::new();
    for _ in 0..num_faces {
        let n = count(next_number("face size")?, "face size", path)?;
        polygon.clear();
        for _ in 0..n {
            polygon.push(count(next_number("face index")?, "face index", path)?);
        }
        triangulate_fan(&polygon, &mut faces);
    }

    MeshModel::from_triangles(&vertices, &faces, SkinningAlgorithm::default())
        .map_err(|e| RigError::load(path, e))
}

/// Interpret `value` as a non-negative integer.
fn count(value: f64, what: &str, path: &Path) -> Result<usize> {
    if value.fract() != 0.0 || value < 0.0 || value > usize::MAX as f64 {
        return Err(RigError::load(path, format!("invalid {} `{}`", what, value)));
    }
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tetrahedron() {
        let text = "OFF\n\
                    # tetrahedron\n\
                    4 4 6\n\
                    0 0 0\n\
                    1 0 0\n\
                    0.5 1 0\n\
                    0.5 0.5 1\n\
                    3 0 2 1\n\
                    3 0 1 3\n\
                    3 1 2 3\n\
                    3 2 0 3\n";
        let mesh = parse(text, Path::new("tet.off")).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.faces[3], [2, 0, 3]);
    }

    #[test]
    fn test_parse_without_header() {
        let mesh = parse("3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n", Path::new("bare.off")).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_parse_truncated() {
        let err = parse("OFF\n3 1 0\n0 0 0\n1 0 0\n", Path::new("bad.off")).unwrap_err();
        assert!(err.to_string().contains("unexpected end of file"));
    }

    #[test]
    fn test_parse_huge_header_count() {
        let err = parse("OFF\n100000000000000000 0 0\n", Path::new("huge.off")).unwrap_err();
        assert!(matches!(err, RigError::Load { .. }));
        assert!(err.to_string().contains("unexpected end of file"));
    }

    #[test]
    fn test_parse_rejects_bad_counts() {
        for header in ["-3 1 0", "2.5 1 0", "3 -1 0", "NaN 0 0"] {
            let text = format!("OFF\n{}\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n", header);
            let err = parse(&text, Path::new("bad.off")).unwrap_err();
            assert!(err.to_string().contains("invalid"), "{}: {}", header, err);
        }

        let err = parse("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1.5 2\n", Path::new("bad.off"))
            .unwrap_err();
        assert!(err.to_string().contains("invalid face index"));
    }
}
