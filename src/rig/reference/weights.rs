//! Visibility-restricted inverse-distance skinning weights.

use nalgebra::Point3;
use rayon::prelude::*;

use super::{GridField, ReferenceOptions};
use crate::mesh::MeshModel;
use crate::rig::{Attachment, VisibilityTester};
use crate::skeleton::Skeleton;

const DISTANCE_EPSILON: f64 = 1e-8;

/// Solve an attachment for a fixed embedding.
///
/// Each row has one weight per joint and sums to 1. A skeleton without bones
/// binds every vertex to its root.
pub(super) fn solve(
    mesh: &MeshModel,
    skeleton: &Skeleton,
    embedding: &[Point3<f64>],
    tester: &VisibilityTester<'_, GridField>,
    options: &ReferenceOptions,
) -> Attachment {
    let bones: Vec<(usize, usize)> = skeleton
        .bones()
        .filter(|&(parent, child)| parent < embedding.len() && child < embedding.len())
        .collect();

    let row_for = |v: usize| {
        let vertex = &mesh.vertices[v];
        let sample = vertex.position - vertex.normal * options.surface_offset;
        vertex_weights(&sample, embedding, &bones, tester, options.falloff)
    };

    let weights: Vec<Vec<f64>> = if options.parallel {
        (0..mesh.num_vertices()).into_par_iter().map(row_for).collect()
    } else {
        (0..mesh.num_vertices()).map(row_for).collect()
    };

    Attachment::new(weights)
}

fn vertex_weights(
    sample: &Point3<f64>,
    embedding: &[Point3<f64>],
    bones: &[(usize, usize)],
    tester: &VisibilityTester<'_, GridField>,
    falloff: f64,
) -> Vec<f64> {
    let mut row = vec![0.0; embedding.len()];
    if bones.is_empty() {
        if let Some(root) = row.first_mut() {
            *root = 1.0;
        }
        return row;
    }

    let mut nearest = (f64::INFINITY, bones[0].1);
    for &(parent, child) in bones {
        let closest = closest_point_on_segment(sample, &embedding[parent], &embedding[child]);
        let d2 = (sample - closest).norm_squared();
        if d2 < nearest.0 {
            nearest = (d2, child);
        }
        if tester.can_see(sample, &closest) {
            row[child] = (d2 + DISTANCE_EPSILON).powf(-falloff);
        }
    }

    let total: f64 = row.iter().sum();
    if total > 0.0 {
        for w in &mut row {
            *w /= total;
        }
    } else {
        row[nearest.1] = 1.0;
    }

    row
}

fn closest_point_on_segment(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::reference::test_meshes::closed_box;
    use approx::assert_relative_eq;

    fn two_bone_skeleton() -> Skeleton {
        let mut s = Skeleton::new();
        let root = s.add_joint("root", Point3::new(0.5, 0.1, 0.5), None);
        let mid = s.add_joint("mid", Point3::new(0.5, 0.5, 0.5), Some(root));
        s.add_joint("tip", Point3::new(0.5, 0.9, 0.5), Some(mid));
        s
    }

    #[test]
    fn test_rows_are_normalized_and_root_is_zero() {
        let mesh = closed_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let field = GridField::new(&mesh, 10, false);
        let tester = VisibilityTester::new(&field).with_tolerance(0.01);
        let skeleton = two_bone_skeleton();
        let embedding = skeleton.default_positions();

        let attachment = solve(
            &mesh,
            &skeleton,
            &embedding,
            &tester,
            &ReferenceOptions::default().sequential(),
        );

        assert_eq!(attachment.num_vertices(), 8);
        for row in attachment.rows() {
            assert_eq!(row.len(), 3);
            assert_eq!(row[0], 0.0);
            assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(row.iter().all(|&w| w >= 0.0));
        }

        // Bottom corners lean on the lower bone, top corners on the upper one
        assert!(attachment.weights_for(0)[1] > attachment.weights_for(0)[2]);
        assert!(attachment.weights_for(6)[2] > attachment.weights_for(6)[1]);
    }

    #[test]
    fn test_single_joint_binds_root() {
        let mesh = closed_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let field = GridField::new(&mesh, 4, false);
        let tester = VisibilityTester::new(&field);

        let mut skeleton = Skeleton::new();
        skeleton.add_joint("root", Point3::new(0.5, 0.5, 0.5), None);

        let attachment = solve(
            &mesh,
            &skeleton,
            &skeleton.default_positions(),
            &tester,
            &ReferenceOptions::default(),
        );
        assert!(attachment.rows().all(|row| row == [1.0]));
    }

    #[test]
    fn test_hidden_bones_fall_back_to_nearest() {
        let mesh = closed_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let field = GridField::new(&mesh, 10, false);
        let tester = VisibilityTester::new(&field);

        // Every bone lies outside the box, so nothing is visible
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_joint("root", Point3::new(3.0, 0.0, 0.0), None);
        skeleton.add_joint("near", Point3::new(3.0, 1.0, 0.0), Some(root));
        skeleton.add_joint("far", Point3::new(9.0, 0.0, 0.0), Some(root));

        let row = vertex_weights(
            &Point3::new(0.9, 0.5, 0.1),
            &skeleton.default_positions(),
            &skeleton.bones().collect::<Vec<_>>(),
            &tester,
            2.0,
        );
        assert_eq!(row, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_closest_point_on_segment() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.0, 2.0, 0.0);
        assert_relative_eq!(
            closest_point_on_segment(&Point3::new(1.0, 1.0, 0.0), &a, &b),
            Point3::new(0.0, 1.0, 0.0)
        );
        assert_relative_eq!(closest_point_on_segment(&Point3::new(0.0, -3.0, 0.0), &a, &b), a);
        assert_relative_eq!(closest_point_on_segment(&Point3::new(1.0, 1.0, 0.0), &a, &a), a);
    }
}
