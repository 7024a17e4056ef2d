#![allow(dead_code)]
use chainsolver::context::Context;
use chainsolver::geometry::{Mat3, Vec3};
use chainsolver::module_db::{ModuleDb, PairTransform, Radii};

pub fn radii(r: f32) -> Radii {
    Radii {
        avg_all: r,
        max_ca: r,
        max_heavy: r,
    }
}

/// Rotation by 90 degrees about z, row convention.
pub fn rot_z90() -> Mat3 {
    Mat3::from_rows([[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
}

/// Two modules that alternate forever along +x, 15 units apart. Every chain
/// this database can produce is a straight evenly spaced line.
pub fn line_db() -> ModuleDb {
    let step = PairTransform::new(
        Vec3::new(15.0, 0.0, 0.0),
        Mat3::IDENTITY,
        Vec3::new(15.0, 0.0, 0.0),
    );
    ModuleDb::new(
        vec!["corner".into(), "strut".into()],
        vec![None, Some(step), Some(step), None],
        vec![radii(1.0), radii(1.0)],
    )
    .unwrap()
}

/// Three modules chained alpha -> beta -> gamma with a 90-degree turn per
/// step; used for exact hand-computed synthesis coordinates.
pub fn turn_db() -> ModuleDb {
    let first = PairTransform::new(Vec3::new(5.0, 0.0, 0.0), rot_z90(), Vec3::new(5.0, 0.0, 0.0));
    let second = PairTransform::new(Vec3::new(0.0, 5.0, 0.0), rot_z90(), Vec3::new(0.0, 5.0, 0.0));
    ModuleDb::new(
        vec!["alpha".into(), "beta".into(), "gamma".into()],
        vec![
            None,
            Some(first),
            None,
            None,
            None,
            Some(second),
            None,
            None,
            None,
        ],
        vec![radii(1.0), radii(1.0), radii(1.0)],
    )
    .unwrap()
}

/// Three fully connected modules; the transform for appending module `b`
/// translates by 12 units along axis `b`. Chains never self-collide, so
/// every operator always has candidates.
pub fn grid_db() -> ModuleDb {
    let dirs = [
        Vec3::new(12.0, 0.0, 0.0),
        Vec3::new(0.0, 12.0, 0.0),
        Vec3::new(0.0, 0.0, 12.0),
    ];
    let mut transforms = Vec::with_capacity(9);
    for _a in 0..3 {
        for b in 0..3 {
            transforms.push(Some(PairTransform::new(dirs[b], Mat3::IDENTITY, dirs[b])));
        }
    }
    ModuleDb::new(
        vec!["hub".into(), "arm".into(), "twist".into()],
        transforms,
        vec![radii(1.0), radii(1.0), radii(1.0)],
    )
    .unwrap()
}

/// Four modules in a fixed chain 0 -> 1 -> 2 -> 3. The last pair's `com_b`
/// is parameterized so tests can steer it onto (or away from) the first
/// module's position.
pub fn bump_db(last_com_b: Vec3) -> ModuleDb {
    let step = PairTransform::new(
        Vec3::new(10.0, 0.0, 0.0),
        Mat3::IDENTITY,
        Vec3::new(10.0, 0.0, 0.0),
    );
    let last = PairTransform::new(last_com_b, Mat3::IDENTITY, Vec3::new(10.0, 0.0, 0.0));
    let mut transforms = vec![None; 16];
    transforms[1] = Some(step); // 0 -> 1
    transforms[6] = Some(step); // 1 -> 2
    transforms[11] = Some(last); // 2 -> 3
    ModuleDb::new(
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
        transforms,
        vec![radii(1.0), radii(1.0), radii(1.0), radii(1.0)],
    )
    .unwrap()
}

pub fn line_target(points: usize, spacing: f32) -> Vec<Vec3> {
    (0..points)
        .map(|i| Vec3::new(spacing * i as f32, 0.0, 0.0))
        .collect()
}

pub fn context(db: ModuleDb, target: Vec<Vec3>, avg_pair_dist: f32, len_dev: usize) -> Context {
    Context::new(db, target, avg_pair_dist, len_dev)
}

/// The 10-point mobile shape from the superposition reference data.
#[allow(clippy::excessive_precision)]
pub fn shape_a() -> Vec<Vec3> {
    vec![
        Vec3::new(4.7008892286345, 42.938597096873, 14.4318130193692),
        Vec3::new(-20.3679194392227, 27.5712678608402, -12.1390617339732),
        Vec3::new(24.4692807074156, -1.32083675968276, 31.1580458282477),
        Vec3::new(-31.1044984967455, -6.41414114190809, 3.28255887994549),
        Vec3::new(18.6775433365315, -5.32162505701938, -14.9272896423117),
        Vec3::new(-31.648884426273, -19.3650527983443, 43.9001561999887),
        Vec3::new(-13.1515403509663, 0.850865538112699, 37.5942811492984),
        Vec3::new(12.561856072969, 1.07715641721097, 5.01563428984222),
        Vec3::new(28.0227435151377, 31.7627708322262, 12.2475086001227),
        Vec3::new(-41.8874231134215, 29.4831416883453, 8.70447045314168),
    ]
}

/// The 10-point reference shape paired with [shape_a].
#[allow(clippy::excessive_precision)]
pub fn shape_b() -> Vec<Vec3> {
    vec![
        Vec3::new(-29.2257707266972, -18.8897713349587, 9.48960740086143),
        Vec3::new(-19.8753669720509, 42.3379642103244, -23.7788252219155),
        Vec3::new(-2.90766514824093, -6.9792608670416, 10.2843089382083),
        Vec3::new(-26.9511839788441, -31.5183679875864, 21.1215780433683),
        Vec3::new(34.4308792695389, 40.4880968679893, -27.825326598276),
        Vec3::new(-30.5235710432951, 47.9748378356085, -38.2582349144194),
        Vec3::new(-27.4078219027601, -6.11300268738968, -20.3324126781673),
        Vec3::new(-32.9291952852141, -38.8880776559401, -18.1221698074118),
        Vec3::new(-27.2335702183446, -24.1935304087933, -7.58332402861928),
        Vec3::new(-6.43013158961009, -9.12801538874479, 0.785828466111815),
    ]
}
