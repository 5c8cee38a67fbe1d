//! Joint placement for the reference backend.

use nalgebra::{Point3, Vector3};
use tracing::debug;

use super::{GridField, ReferenceOptions};
use crate::mesh::MeshModel;
use crate::rig::DistanceField;
use crate::skeleton::Skeleton;

/// Place every joint of `skeleton` inside `mesh`.
///
/// The skeleton is translated so its bounding box is centered on the mesh
/// bounding box, then lowered until its feet touch the bottom of the mesh
/// box. Each joint that lies outside (or within `surface_offset` of the
/// surface) is stepped along the negative field gradient; fat joints are
/// pushed at least one cell deep. Symmetric pairs are finally averaged
/// across the mirror plane. Returns an empty embedding if any joint cannot
/// be brought inside.
pub(super) fn fit_embedding(
    field: &GridField,
    skeleton: &Skeleton,
    mesh: &MeshModel,
    options: &ReferenceOptions,
) -> Vec<Point3<f64>> {
    let (Some(mesh_box), Some(skeleton_box)) = (mesh.bounding_box(), skeleton.bounding_box()) else {
        return Vec::new();
    };

    let mut translation = center(mesh_box) - center(skeleton_box);
    translation.y += ground_offset(skeleton, mesh_box.0.y, translation.y);

    let margin = -options.surface_offset;
    let fat_margin = -options.surface_offset.max(field.cell_size());

    let mut embedding = Vec::with_capacity(skeleton.joint_count());
    for (index, joint) in skeleton.joints().iter().enumerate() {
        let start = joint.position + translation;
        let target = if skeleton.fat_joints().contains(&index) {
            fat_margin
        } else {
            margin
        };
        match project_inside(field, start, target, options.max_projection_steps) {
            Some(p) => embedding.push(p),
            None => {
                debug!(joint = %joint.name, index, "joint stayed outside the mesh");
                return Vec::new();
            }
        }
    }

    let mirror_x = center(mesh_box).x;
    symmetrize(field, &mut embedding, skeleton.symmetric_pairs(), mirror_x);

    embedding
}

fn center((min, max): (Point3<f64>, Point3<f64>)) -> Vector3<f64> {
    (min.coords + max.coords) * 0.5
}

/// Vertical shift that puts the lowest foot on the floor of the mesh box.
///
/// `lift` is the vertical translation already applied. Only ever lowers the
/// skeleton, so one whose feet already reach the floor stays centered.
fn ground_offset(skeleton: &Skeleton, mesh_floor: f64, lift: f64) -> f64 {
    skeleton
        .feet()
        .iter()
        .map(|&f| skeleton.joint(f).position.y + lift)
        .reduce(f64::min)
        .map_or(0.0, |lowest| (mesh_floor - lowest).min(0.0))
}

/// Average each symmetric pair across the plane `x = mirror_x`.
///
/// A pair keeps its projected positions if the mirrored ones would leave
/// the surface.
fn symmetrize(
    field: &GridField,
    embedding: &mut [Point3<f64>],
    pairs: &[(usize, usize)],
    mirror_x: f64,
) {
    let mirror = |p: Point3<f64>| Point3::new(2.0 * mirror_x - p.x, p.y, p.z);

    for &(a, b) in pairs {
        let left = Point3::from((embedding[a].coords + mirror(embedding[b]).coords) * 0.5);
        let right = mirror(left);
        if field.signed_distance(&left) <= 0.0 && field.signed_distance(&right) <= 0.0 {
            embedding[a] = left;
            embedding[b] = right;
        }
    }
}

/// Step `p` against the gradient until the field is at most `target`.
///
/// Succeeds as long as the final point is inside the surface, even if the
/// target depth was not reached.
fn project_inside(
    field: &GridField,
    mut p: Point3<f64>,
    target: f64,
    max_steps: usize,
) -> Option<Point3<f64>> {
    for _ in 0..max_steps {
        let d = field.signed_distance(&p);
        if d <= target {
            return Some(p);
        }

        let direction = field.gradient(&p).try_normalize(f64::EPSILON)?;
        // Never step further than one cell so thin parts are not overshot
        let step = (d - target).min(field.cell_size());
        p -= direction * step;
    }

    (field.signed_distance(&p) <= 0.0).then_some(p)
}
