//! Built-in skeleton templates.
//!
//! Joint order is part of the output format: `skeleton.out` lists joints in
//! exactly the order they are declared here.

use nalgebra::Point3;

use super::Skeleton;

/// The built-in skeleton templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Biped with arms, legs and a head.
    Human,
    /// Quadruped with hocked hind legs.
    Horse,
    /// Generic quadruped.
    Quad,
    /// Quadruped body with a human torso.
    Centaur,
}

impl Preset {
    /// All presets.
    pub const ALL: [Preset; 4] = [Preset::Human, Preset::Horse, Preset::Quad, Preset::Centaur];

    /// Look up a preset by its command-line name.
    pub fn from_name(name: &str) -> Option<Preset> {
        match name {
            "human" => Some(Preset::Human),
            "horse" => Some(Preset::Horse),
            "quad" => Some(Preset::Quad),
            "centaur" => Some(Preset::Centaur),
            _ => None,
        }
    }

    /// Command-line name of the preset.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Human => "human",
            Preset::Horse => "horse",
            Preset::Quad => "quad",
            Preset::Centaur => "centaur",
        }
    }

    /// Build the skeleton.
    pub fn build(&self) -> Skeleton {
        match self {
            Preset::Human => human(),
            Preset::Horse => horse(),
            Preset::Quad => quad(),
            Preset::Centaur => centaur(),
        }
    }
}

#[inline]
fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
    Point3::new(x, y, z)
}

fn human() -> Skeleton {
    let mut s = Skeleton::new();
    let shoulders = s.add_joint("shoulders", p(0.0, 0.5, 0.0), None);
    let back = s.add_joint("back", p(0.0, 0.15, 0.0), Some(shoulders));
    let hips = s.add_joint("hips", p(0.0, 0.0, 0.0), Some(back));
    let head = s.add_joint("head", p(0.0, 0.7, 0.0), Some(shoulders));

    let lthigh = s.add_joint("lthigh", p(-0.1, 0.0, 0.0), Some(hips));
    let lknee = s.add_joint("lknee", p(-0.15, -0.35, 0.0), Some(lthigh));
    let lankle = s.add_joint("lankle", p(-0.15, -0.8, 0.0), Some(lknee));
    let lfoot = s.add_joint("lfoot", p(-0.15, -0.8, 0.1), Some(lankle));

    let rthigh = s.add_joint("rthigh", p(0.1, 0.0, 0.0), Some(hips));
    let rknee = s.add_joint("rknee", p(0.15, -0.35, 0.0), Some(rthigh));
    let rankle = s.add_joint("rankle", p(0.15, -0.8, 0.0), Some(rknee));
    let rfoot = s.add_joint("rfoot", p(0.15, -0.8, 0.1), Some(rankle));

    let lshoulder = s.add_joint("lshoulder", p(-0.2, 0.5, 0.0), Some(shoulders));
    let lelbow = s.add_joint("lelbow", p(-0.4, 0.25, 0.075), Some(lshoulder));
    let lhand = s.add_joint("lhand", p(-0.6, 0.0, 0.15), Some(lelbow));

    let rshoulder = s.add_joint("rshoulder", p(0.2, 0.5, 0.0), Some(shoulders));
    let relbow = s.add_joint("relbow", p(0.4, 0.25, 0.075), Some(rshoulder));
    let rhand = s.add_joint("rhand", p(0.6, 0.0, 0.15), Some(relbow));

    for (l, r) in [
        (lthigh, rthigh),
        (lknee, rknee),
        (lankle, rankle),
        (lfoot, rfoot),
        (lshoulder, rshoulder),
        (lelbow, relbow),
        (lhand, rhand),
    ] {
        s.make_symmetric(l, r);
    }

    s.set_foot(lfoot);
    s.set_foot(rfoot);

    s.set_fat(hips);
    s.set_fat(shoulders);
    s.set_fat(head);

    s
}

/// Spine, neck and hips shared by the four-legged presets.
fn quadruped_trunk(s: &mut Skeleton) -> (usize, usize) {
    let shoulders = s.add_joint("shoulders", p(0.0, 0.0, 0.5), None);
    let back = s.add_joint("back", p(0.0, 0.0, 0.0), Some(shoulders));
    let hips = s.add_joint("hips", p(0.0, 0.0, -0.5), Some(back));
    (shoulders, hips)
}

fn horse() -> Skeleton {
    let mut s = Skeleton::new();
    let (shoulders, hips) = quadruped_trunk(&mut s);
    let neck = s.add_joint("neck", p(0.0, 0.2, 0.63), Some(shoulders));
    let head = s.add_joint("head", p(0.0, 0.2, 0.9), Some(neck));

    let lthigh = s.add_joint("lthigh", p(-0.15, 0.0, -0.5), Some(hips));
    let lhknee = s.add_joint("lhknee", p(-0.2, -0.2, -0.45), Some(lthigh));
    let lhheel = s.add_joint("lhheel", p(-0.2, -0.4, -0.5), Some(lhknee));
    let lhfoot = s.add_joint("lhfoot", p(-0.2, -0.8, -0.5), Some(lhheel));

    let rthigh = s.add_joint("rthigh", p(0.15, 0.0, -0.5), Some(hips));
    let rhknee = s.add_joint("rhknee", p(0.2, -0.2, -0.45), Some(rthigh));
    let rhheel = s.add_joint("rhheel", p(0.2, -0.4, -0.5), Some(rhknee));
    let rhfoot = s.add_joint("rhfoot", p(0.2, -0.8, -0.5), Some(rhheel));

    let lshoulder = s.add_joint("lshoulder", p(-0.2, 0.0, 0.5), Some(shoulders));
    let lfknee = s.add_joint("lfknee", p(-0.2, -0.4, 0.5), Some(lshoulder));
    let lffoot = s.add_joint("lffoot", p(-0.2, -0.8, 0.5), Some(lfknee));

    let rshoulder = s.add_joint("rshoulder", p(0.2, 0.0, 0.5), Some(shoulders));
    let rfknee = s.add_joint("rfknee", p(0.2, -0.4, 0.5), Some(rshoulder));
    let rffoot = s.add_joint("rffoot", p(0.2, -0.8, 0.5), Some(rfknee));

    s.add_joint("tail", p(0.0, 0.0, -0.7), Some(hips));

    for (l, r) in [
        (lthigh, rthigh),
        (lhknee, rhknee),
        (lhheel, rhheel),
        (lhfoot, rhfoot),
        (lshoulder, rshoulder),
        (lfknee, rfknee),
        (lffoot, rffoot),
    ] {
        s.make_symmetric(l, r);
    }

    for foot in [lhfoot, rhfoot, lffoot, rffoot] {
        s.set_foot(foot);
    }

    s.set_fat(hips);
    s.set_fat(shoulders);
    s.set_fat(head);

    s
}

fn quad() -> Skeleton {
    let mut s = Skeleton::new();
    let (shoulders, hips) = quadruped_trunk(&mut s);
    let neck = s.add_joint("neck", p(0.0, 0.2, 0.63), Some(shoulders));
    let head = s.add_joint("head", p(0.0, 0.2, 0.9), Some(neck));

    let lthigh = s.add_joint("lthigh", p(-0.15, 0.0, -0.5), Some(hips));
    let lhknee = s.add_joint("lhknee", p(-0.2, -0.4, -0.5), Some(lthigh));
    let lhfoot = s.add_joint("lhfoot", p(-0.2, -0.8, -0.5), Some(lhknee));

    let rthigh = s.add_joint("rthigh", p(0.15, 0.0, -0.5), Some(hips));
    let rhknee = s.add_joint("rhknee", p(0.2, -0.4, -0.5), Some(rthigh));
    let rhfoot = s.add_joint("rhfoot", p(0.2, -0.8, -0.5), Some(rhknee));

    let lshoulder = s.add_joint("lshoulder", p(-0.2, 0.0, 0.5), Some(shoulders));
    let lfknee = s.add_joint("lfknee", p(-0.2, -0.4, 0.5), Some(lshoulder));
    let lffoot = s.add_joint("lffoot", p(-0.2, -0.8, 0.5), Some(lfknee));

    let rshoulder = s.add_joint("rshoulder", p(0.2, 0.0, 0.5), Some(shoulders));
    let rfknee = s.add_joint("rfknee", p(0.2, -0.4, 0.5), Some(rshoulder));
    let rffoot = s.add_joint("rffoot", p(0.2, -0.8, 0.5), Some(rfknee));

    s.add_joint("tail", p(0.0, 0.0, -0.7), Some(hips));

    for (l, r) in [
        (lthigh, rthigh),
        (lhknee, rhknee),
        (lhfoot, rhfoot),
        (lshoulder, rshoulder),
        (lfknee, rfknee),
        (lffoot, rffoot),
    ] {
        s.make_symmetric(l, r);
    }

    for foot in [lhfoot, rhfoot, lffoot, rffoot] {
        s.set_foot(foot);
    }

    s.set_fat(hips);
    s.set_fat(shoulders);
    s.set_fat(head);

    s
}

fn centaur() -> Skeleton {
    let mut s = Skeleton::new();
    let (shoulders, hips) = quadruped_trunk(&mut s);

    let hback = s.add_joint("hback", p(0.0, 0.25, 0.5), Some(shoulders));
    let hshoulders = s.add_joint("hshoulders", p(0.0, 0.5, 0.5), Some(hback));
    let head = s.add_joint("head", p(0.0, 0.7, 0.5), Some(hshoulders));

    let lthigh = s.add_joint("lthigh", p(-0.15, 0.0, -0.5), Some(hips));
    let lhknee = s.add_joint("lhknee", p(-0.2, -0.4, -0.45), Some(lthigh));
    let lhfoot = s.add_joint("lhfoot", p(-0.2, -0.8, -0.5), Some(lhknee));

    let rthigh = s.add_joint("rthigh", p(0.15, 0.0, -0.5), Some(hips));
    let rhknee = s.add_joint("rhknee", p(0.2, -0.4, -0.45), Some(rthigh));
    let rhfoot = s.add_joint("rhfoot", p(0.2, -0.8, -0.5), Some(rhknee));

    let lshoulder = s.add_joint("lshoulder", p(-0.15, 0.0, 0.5), Some(shoulders));
    let lfknee = s.add_joint("lfknee", p(-0.15, -0.4, 0.5), Some(lshoulder));
    let lffoot = s.add_joint("lffoot", p(-0.15, -0.8, 0.5), Some(lfknee));

    let rshoulder = s.add_joint("rshoulder", p(0.15, 0.0, 0.5), Some(shoulders));
    let rfknee = s.add_joint("rfknee", p(0.15, -0.4, 0.5), Some(rshoulder));
    let rffoot = s.add_joint("rffoot", p(0.15, -0.8, 0.5), Some(rfknee));

    let hlshoulder = s.add_joint("hlshoulder", p(-0.2, 0.5, 0.5), Some(hshoulders));
    let hlelbow = s.add_joint("hlelbow", p(-0.4, 0.25, 0.575), Some(hlshoulder));
    let hlhand = s.add_joint("hlhand", p(-0.6, 0.0, 0.65), Some(hlelbow));

    let hrshoulder = s.add_joint("hrshoulder", p(0.2, 0.5, 0.5), Some(hshoulders));
    let hrelbow = s.add_joint("hrelbow", p(0.4, 0.25, 0.575), Some(hrshoulder));
    let hrhand = s.add_joint("hrhand", p(0.6, 0.0, 0.65), Some(hrelbow));

    s.add_joint("tail", p(0.0, 0.0, -0.7), Some(hips));

    for (l, r) in [
        (lthigh, rthigh),
        (lhknee, rhknee),
        (lhfoot, rhfoot),
        (lshoulder, rshoulder),
        (lfknee, rfknee),
        (lffoot, rffoot),
        (hlshoulder, hrshoulder),
        (hlelbow, hrelbow),
        (hlhand, hrhand),
    ] {
        s.make_symmetric(l, r);
    }

    for foot in [lhfoot, rhfoot, lffoot, rffoot] {
        s.set_foot(foot);
    }

    s.set_fat(hips);
    s.set_fat(shoulders);
    s.set_fat(hshoulders);
    s.set_fat(head);

    s
}
