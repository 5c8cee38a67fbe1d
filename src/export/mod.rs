//! Rig serialization.
//!
//! A rig is written as two plain-text files in the output directory:
//!
//! - `skeleton.out`: one line `i x y z parent` per joint, with coordinates
//!   mapped back into the mesh's original frame and `-1` as the root parent.
//! - `attachment.out`: one line per mesh vertex holding that vertex's joint
//!   weights, each rounded half up to four decimals and followed by a space.
//!
//! Numbers use `%g` notation (see [`General`]).
//!
//! ```no_run
//! use skelfit::export;
//! # fn demo(result: &skelfit::rig::RigResult, skeleton: &skelfit::skeleton::Skeleton,
//! #         mesh: &skelfit::mesh::MeshModel) -> skelfit::Result<()> {
//! let paths = export::export_rig("out", result, skeleton, mesh)?;
//! println!("{}", paths.skeleton.display());
//! # Ok(())
//! # }
//! ```

mod format;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use tracing::info;

use crate::error::{Result, RigError};
use crate::mesh::MeshModel;
use crate::rig::{Attachment, RigResult};
use crate::skeleton::Skeleton;

pub use format::{format_general, round4, General, SIGNIFICANT_DIGITS};

/// File name of the embedded skeleton.
pub const SKELETON_FILE: &str = "skeleton.out";

/// File name of the attachment weights.
pub const ATTACHMENT_FILE: &str = "attachment.out";

/// Write one line per joint: index, original-frame position and parent.
pub fn write_skeleton<W: Write>(
    writer: &mut W,
    embedding: &[Point3<f64>],
    skeleton: &Skeleton,
    mesh: &MeshModel,
) -> std::io::Result<()> {
    for (i, p) in embedding.iter().enumerate() {
        let p = mesh.to_original(p);
        writeln!(
            writer,
            "{} {} {} {} {}",
            i,
            General(p.x),
            General(p.y),
            General(p.z),
            skeleton.parent_value(i)
        )?;
    }
    Ok(())
}

/// Write one line per vertex with each rounded weight followed by a space.
pub fn write_attachment<W: Write>(writer: &mut W, attachment: &Attachment) -> std::io::Result<()> {
    for row in attachment.rows() {
        for &w in row {
            write!(writer, "{} ", General(round4(w)))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Where [`export_rig`] wrote its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Path of `skeleton.out`.
    pub skeleton: PathBuf,
    /// Path of `attachment.out`.
    pub attachment: PathBuf,
}

impl ExportPaths {
    /// The file paths inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            skeleton: dir.join(SKELETON_FILE),
            attachment: dir.join(ATTACHMENT_FILE),
        }
    }
}

/// Write `skeleton.out` and then `attachment.out` into `dir`.
///
/// The directory is created if needed. A failure on the skeleton file means
/// the attachment file is not attempted.
pub fn export_rig<P: AsRef<Path>>(
    dir: P,
    result: &RigResult,
    skeleton: &Skeleton,
    mesh: &MeshModel,
) -> Result<ExportPaths> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| RigError::export(dir, e))?;

    let paths = ExportPaths::in_dir(dir);

    write_file(&paths.skeleton, |w| {
        write_skeleton(w, &result.embedding, skeleton, mesh)
    })?;
    write_file(&paths.attachment, |w| write_attachment(w, &result.attachment))?;

    info!(
        skeleton = %paths.skeleton.display(),
        attachment = %paths.attachment.display(),
        "wrote rig"
    );

    Ok(paths)
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| RigError::export(path, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(|e| RigError::export(path, e))?;
    writer.flush().map_err(|e| RigError::export(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SkinningAlgorithm;
    use crate::skeleton::Preset;
    use nalgebra::Vector3;

    fn normalized_mesh(vertices: usize) -> MeshModel {
        let positions: Vec<Point3<f64>> = (0..vertices)
            .map(|i| Point3::new(i as f64, 0.0, 0.0))
            .collect();
        let mut mesh = MeshModel::from_triangles(&positions, &[], SkinningAlgorithm::Lbs).unwrap();
        mesh.offset = Vector3::new(0.5, 0.25, 0.0);
        mesh.scale = 0.5;
        mesh
    }

    #[test]
    fn test_write_skeleton_lines() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_joint("root", Point3::origin(), None);
        skeleton.add_joint("tip", Point3::origin(), Some(root));

        let mesh = normalized_mesh(1);
        let embedding = vec![Point3::new(0.5, 0.25, 0.0), Point3::new(1.0, 0.75, 0.25)];

        let mut out = Vec::new();
        write_skeleton(&mut out, &embedding, &skeleton, &mesh).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0 0 0 0 -1\n1 1 1 0.5 0\n");
    }

    #[test]
    fn test_write_attachment_rounds_and_keeps_trailing_space() {
        let attachment = Attachment::new(vec![vec![0.0, 0.12345, 0.87655], vec![0.0, 1.0, 0.00001]]);

        let mut out = Vec::new();
        write_attachment(&mut out, &attachment).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0 0.1235 0.8766 \n0 1 0 \n"
        );
    }

    #[test]
    fn test_export_rig_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("rig");

        let skeleton = Skeleton::preset(Preset::Human);
        let mesh = normalized_mesh(2);
        let result = RigResult {
            embedding: skeleton.default_positions(),
            attachment: Attachment::new(vec![vec![0.0; skeleton.joint_count()]; 2]),
        };

        let paths = export_rig(&out_dir, &result, &skeleton, &mesh).unwrap();
        assert_eq!(paths, ExportPaths::in_dir(&out_dir));

        let skel = std::fs::read_to_string(&paths.skeleton).unwrap();
        assert_eq!(skel.lines().count(), 18);
        let attach = std::fs::read_to_string(&paths.attachment).unwrap();
        assert_eq!(attach.lines().count(), 2);
    }

    #[test]
    fn test_export_rig_reports_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let skeleton = Skeleton::preset(Preset::Quad);
        let result = RigResult {
            embedding: skeleton.default_positions(),
            attachment: Attachment::default(),
        };
        let err = export_rig(blocker.join("sub"), &result, &skeleton, &normalized_mesh(0)).unwrap_err();
        assert!(matches!(err, RigError::Export { .. }));
        assert!(!blocker.join("sub").join(SKELETON_FILE).exists());
    }
}
