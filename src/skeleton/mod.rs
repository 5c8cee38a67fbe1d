//! Skeleton templates.
//!
//! A [`Skeleton`] is an ordered list of joints forming a tree: every joint
//! except the root names a parent that was declared before it. Each joint
//! carries a default position in skeleton-local units, which doubles as the
//! fallback embedding when automatic fitting is disabled.
//!
//! Templates come from the built-in [presets](Preset) or from a skeleton file
//! (see [`Skeleton::from_file`]).

mod presets;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{Result, RigError};

pub use presets::Preset;

/// Factor applied to joint positions read from skeleton files.
///
/// Skeleton files are authored at half the scale of the built-in presets.
pub const FILE_POSITION_SCALE: f64 = 2.0;

/// Parent value written for the root joint.
pub const ROOT_PARENT: i64 = -1;

/// A joint of a skeleton template.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    /// Joint name.
    pub name: String,
    /// Default position in skeleton-local units.
    pub position: Point3<f64>,
    /// Index of the parent joint; `None` for the root.
    pub parent: Option<usize>,
}

/// A skeleton template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
    symmetric: Vec<(usize, usize)>,
    feet: Vec<usize>,
    fat: Vec<usize>,
}

impl Skeleton {
    /// Create an empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate a built-in preset.
    pub fn preset(preset: Preset) -> Self {
        preset.build()
    }

    /// Append a joint and return its index.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not refer to an existing joint.
    pub fn add_joint(&mut self, name: &str, position: Point3<f64>, parent: Option<usize>) -> usize {
        if let Some(p) = parent {
            assert!(p < self.joints.len(), "parent {} of joint {} does not exist", p, name);
        }
        let index = self.joints.len();
        self.joints.push(Joint {
            name: name.to_string(),
            position,
            parent,
        });
        index
    }

    /// Declare two joints as mirror images of each other.
    pub fn make_symmetric(&mut self, a: usize, b: usize) {
        self.symmetric.push((a.min(b), a.max(b)));
    }

    /// Mark a joint as a foot (expected to rest near the bottom of the mesh).
    pub fn set_foot(&mut self, joint: usize) {
        self.feet.push(joint);
    }

    /// Mark a joint as lying in a thick part of the body.
    pub fn set_fat(&mut self, joint: usize) {
        self.fat.push(joint);
    }

    /// Number of joints.
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Whether the skeleton has no joints.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// All joints in declaration order.
    #[inline]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// The joint at `index`.
    #[inline]
    pub fn joint(&self, index: usize) -> &Joint {
        &self.joints[index]
    }

    /// Index of the joint called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    /// Parent index of every joint, aligned with joint order.
    pub fn parent_indices(&self) -> Vec<Option<usize>> {
        self.joints.iter().map(|j| j.parent).collect()
    }

    /// Parent index of `index` in the on-disk convention ([`ROOT_PARENT`] for the root).
    pub fn parent_value(&self, index: usize) -> i64 {
        self.joints[index]
            .parent
            .map_or(ROOT_PARENT, |p| p as i64)
    }

    /// Default joint positions, aligned with joint order.
    pub fn default_positions(&self) -> Vec<Point3<f64>> {
        self.joints.iter().map(|j| j.position).collect()
    }

    /// Iterate over bones as `(parent, child)` joint pairs.
    pub fn bones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.parent.map(|p| (p, i)))
    }

    /// Mirror pairs declared by the template.
    pub fn symmetric_pairs(&self) -> &[(usize, usize)] {
        &self.symmetric
    }

    /// Foot joints declared by the template.
    pub fn feet(&self) -> &[usize] {
        &self.feet
    }

    /// Fat joints declared by the template.
    pub fn fat_joints(&self) -> &[usize] {
        &self.fat
    }

    /// Scale every joint position about the origin.
    pub fn scale(&mut self, factor: f64) {
        for j in &mut self.joints {
            j.position *= factor;
        }
    }

    /// Compute the bounding box of the default joint positions.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.joints.first()?.position;
        let mut min = first;
        let mut max = first;

        for j in &self.joints {
            for i in 0..3 {
                min[i] = min[i].min(j.position[i]);
                max[i] = max[i].max(j.position[i]);
            }
        }

        Some((min, max))
    }

    /// Load a skeleton from a file.
    ///
    /// Each non-empty line holds `name x y z parent`, where `parent` is the
    /// name of an earlier joint or `-1` for the root. Lines with fewer than
    /// five fields and lines starting with `#` are skipped. Positions are
    /// multiplied by [`FILE_POSITION_SCALE`].
    ///
    /// Files written by [`export::write_skeleton`](crate::export::write_skeleton)
    /// use joint indices as names and can be read back directly.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use skelfit::skeleton::Skeleton;
    ///
    /// let skeleton = Skeleton::from_file("biped.skel").unwrap();
    /// println!("{} joints", skeleton.joint_count());
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RigError::SkeletonFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse a skeleton from any buffered reader; `path` is used in errors only.
    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<Self> {
        let error = |line: usize, message: String| RigError::SkeletonFile {
            path: path.to_path_buf(),
            message: format!("line {}: {}", line, message),
        };

        let mut skeleton = Skeleton::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let lineno = lineno + 1;
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() < 5 || words[0].starts_with('#') {
                continue;
            }

            let mut coords = [0.0; 3];
            for (c, word) in coords.iter_mut().zip(&words[1..4]) {
                *c = word
                    .parse::<f64>()
                    .map_err(|_| error(lineno, format!("invalid coordinate `{}`", word)))?;
            }

            let name = words[0];
            if skeleton.index_of(name).is_some() {
                return Err(error(lineno, format!("duplicate joint `{}`", name)));
            }

            let parent = match words[4] {
                "-1" => None,
                parent => Some(skeleton.index_of(parent).ok_or_else(|| {
                    error(lineno, format!("unknown parent `{}` of joint `{}`", parent, name))
                })?),
            };
            if parent.is_none() && !skeleton.is_empty() {
                return Err(error(lineno, format!("second root joint `{}`", name)));
            }

            let position = Point3::new(coords[0], coords[1], coords[2]) * FILE_POSITION_SCALE;
            skeleton.add_joint(name, position, parent);
        }

        if skeleton.is_empty() {
            return Err(RigError::SkeletonFile {
                path: path.to_path_buf(),
                message: "skeleton file contains no joints".to_string(),
            });
        }

        Ok(skeleton)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> Result<Skeleton> {
        Skeleton::from_reader(text.as_bytes(), Path::new("test.skel"))
    }

    #[test]
    fn test_from_reader_resolves_parents() {
        let skeleton = parse(
            "root 0 0 0 -1\n\
             # comment line with enough words to count\n\
             spine 0 0.25 0 root\n\
             \n\
             head 0 0.5 0 spine\n\
             arm 0.1 0.4 0 spine\n",
        )
        .unwrap();

        assert_eq!(skeleton.joint_count(), 4);
        assert_eq!(
            skeleton.parent_indices(),
            vec![None, Some(0), Some(1), Some(1)]
        );
        assert_relative_eq!(skeleton.joint(2).position, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(skeleton.parent_value(0), ROOT_PARENT);
        assert_eq!(skeleton.parent_value(3), 1);
    }

    #[test]
    fn test_from_reader_rejects_unknown_parent() {
        let err = parse("root 0 0 0 -1\nleaf 1 0 0 missing\n").unwrap_err();
        assert!(err.to_string().contains("unknown parent `missing`"));
    }

    #[test]
    fn test_from_reader_rejects_bad_coordinate() {
        let err = parse("root 0 zero 0 -1\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_from_reader_rejects_empty() {
        assert!(matches!(parse("\n\n").unwrap_err(), RigError::SkeletonFile { .. }));
    }

    #[test]
    fn test_from_reader_rejects_second_root() {
        assert!(parse("a 0 0 0 -1\nb 0 0 0 -1\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Skeleton::from_file("/nonexistent/skeleton.skel").unwrap_err();
        assert!(matches!(err, RigError::SkeletonFile { .. }));
    }

    #[test]
    fn test_scale_and_bones() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_joint("root", Point3::new(0.0, 1.0, 0.0), None);
        let tip = skeleton.add_joint("tip", Point3::new(0.0, 2.0, 1.0), Some(root));

        skeleton.scale(0.5);

        assert_relative_eq!(skeleton.joint(tip).position, Point3::new(0.0, 1.0, 0.5));
        assert_eq!(skeleton.bones().collect::<Vec<_>>(), vec![(root, tip)]);

        let (min, max) = skeleton.bounding_box().unwrap();
        assert_relative_eq!(min, Point3::new(0.0, 0.5, 0.0));
        assert_relative_eq!(max, Point3::new(0.0, 1.0, 0.5));
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_add_joint_requires_existing_parent() {
        let mut skeleton = Skeleton::new();
        skeleton.add_joint("orphan", Point3::origin(), Some(3));
    }
}
