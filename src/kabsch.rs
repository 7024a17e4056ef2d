//! Shape scoring: arc-length resampling plus closed-form Kabsch RMSD.
//!
//! The 3x3 Kabsch solver follows the TM-align / Rosetta formulation: the
//! eigenvalues of R'R come from the characteristic cubic in closed form, so
//! no iterative SVD is needed. All internal arithmetic is f64; the paths
//! themselves are f32.
use crate::geometry::{path_length, Vec3};

const SQRT3: f64 = 1.732_050_807_568_88;
const TOL: f64 = 0.01;
const EPSILON: f64 = 0.000_000_01;
const IP: [usize; 9] = [0, 1, 3, 1, 2, 4, 3, 4, 5];
const IP2312: [usize; 4] = [1, 2, 0, 1];

/// Optimal rigid superposition of `mobile` onto `target`.
#[derive(Clone, Copy, Debug)]
pub struct Superposition {
    /// Residual sum `e0 - 2(s0 + s1 ± s2)` over the eigenvalue square
    /// roots, with the sign of the smallest set by `det(R)`. Not divided
    /// by the point count.
    pub rms: f64,
    pub rot: [[f64; 3]; 3],
    pub tran: [f64; 3],
}

/// Shape-similarity score of `mobile` against `target` (lower is better).
/// Unequal lengths are reconciled by resampling the shorter path to the
/// longer's point count first. The score is invariant under rigid-body
/// transforms of the mobile path.
///
/// Panics when the superposition cannot be computed; both paths are
/// validated non-empty long before scoring, so that is an invariant
/// violation.
pub fn score(mobile: &[Vec3], target: &[Vec3]) -> f32 {
    let rms = if mobile.len() == target.len() {
        rms_only(mobile, target)
    } else if mobile.len() < target.len() {
        let resampled = resample(target, mobile);
        rms_only(&resampled, target)
    } else {
        let resampled = resample(mobile, target);
        rms_only(mobile, &resampled)
    };
    rms as f32
}

fn rms_only(x: &[Vec3], y: &[Vec3]) -> f64 {
    match kabsch_core(x, y, false) {
        Some(result) => result.rms,
        None => panic!("kabsch scoring failed: {} x {} points", x.len(), y.len()),
    }
}

/// Full superposition with rotation matrix and translation vector.
pub fn superpose(mobile: &[Vec3], target: &[Vec3]) -> Option<Superposition> {
    kabsch_core(mobile, target, true)
}

/// Resample `shorter` against `longer`: both paths are piecewise-linear
/// curves parameterized by cumulative arc-length proportion. The output has
/// exactly `longer.len()` points, starts at the shorter's first point, and
/// emits the linear interpolant on the shorter's segments wherever the
/// longer's proportions fall inside them. The shorter's last point is
/// appended when the proportion walk did not already produce it.
pub fn resample(longer: &[Vec3], shorter: &[Vec3]) -> Vec<Vec3> {
    let n = longer.len();
    let longer_total = path_length(longer);
    let shorter_total = path_length(shorter);

    let mut out = Vec::with_capacity(n);
    out.push(shorter[0]);

    let mut longer_prop = 0.0f32;
    let mut shorter_prop = 0.0f32;
    let mut mpi = 1usize;
    for i in 1..shorter.len() {
        let base = shorter[i - 1];
        let next = shorter[i];
        let base_prop = shorter_prop;
        let segment = next.dist_to(&base) / shorter_total;
        let vec = next - base;

        shorter_prop += segment;
        while longer_prop <= shorter_prop && mpi < n {
            let longer_segment = longer[mpi].dist_to(&longer[mpi - 1]) / longer_total;
            if longer_prop + longer_segment > shorter_prop {
                break;
            }
            longer_prop += longer_segment;

            let s = (longer_prop - base_prop) / segment;
            out.push(base + vec * s);
            mpi += 1;
        }
    }

    // The walk usually lands exactly on the final point; append it otherwise.
    if out.len() < n {
        out.push(*shorter.last().unwrap());
    }

    out
}

#[allow(clippy::needless_range_loop)]
fn kabsch_core(xs: &[Vec3], ys: &[Vec3], compute_transform: bool) -> Option<Superposition> {
    let n = xs.len().min(ys.len());
    if n < 1 {
        return None;
    }

    let mut u = [[0.0f64; 3]; 3];
    let mut t = [0.0f64; 3];
    let mut a = [[0.0f64; 3]; 3];
    let mut b = [[0.0f64; 3]; 3];
    let mut r = [[0.0f64; 3]; 3];
    for i in 0..3 {
        u[i][i] = 1.0;
        a[i][i] = 1.0;
    }

    let mut xc = [0.0f64; 3];
    let mut yc = [0.0f64; 3];
    for i in 0..n {
        let x = [xs[i].x as f64, xs[i].y as f64, xs[i].z as f64];
        let y = [ys[i].x as f64, ys[i].y as f64, ys[i].z as f64];
        for j in 0..3 {
            xc[j] += x[j];
            yc[j] += y[j];
        }
    }
    for j in 0..3 {
        xc[j] /= n as f64;
        yc[j] /= n as f64;
    }

    // e0 is the total centred spread; r the y-by-x cross-covariance.
    let mut e0 = 0.0f64;
    for m in 0..n {
        let x = [xs[m].x as f64, xs[m].y as f64, xs[m].z as f64];
        let y = [ys[m].x as f64, ys[m].y as f64, ys[m].z as f64];
        for i in 0..3 {
            e0 += (x[i] - xc[i]) * (x[i] - xc[i]) + (y[i] - yc[i]) * (y[i] - yc[i]);
            let d = y[i] - yc[i];
            for j in 0..3 {
                r[i][j] += d * (x[j] - xc[j]);
            }
        }
    }

    let mut det = r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
        - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
        + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0]);
    let sigma = det;

    // Packed lower triangle of r'r.
    let mut rr = [0.0f64; 6];
    let mut m = 0;
    for j in 0..3 {
        for i in 0..=j {
            rr[m] = r[0][i] * r[0][j] + r[1][i] * r[1][j] + r[2][i] * r[2][j];
            m += 1;
        }
    }

    let spur = (rr[0] + rr[2] + rr[5]) / 3.0;
    let cof = (((((rr[2] * rr[5] - rr[4] * rr[4]) + rr[0] * rr[5]) - rr[3] * rr[3])
        + rr[0] * rr[2])
        - rr[1] * rr[1])
        / 3.0;
    det *= det;

    let mut e = [spur; 3];
    let mut a_failed = false;
    let mut b_failed = false;

    if spur > 0.0 {
        let d = spur * spur;
        let h = d - cof;
        let g = (spur * cof - det) / 2.0 - spur * h;

        if h > 0.0 {
            let sqrth = h.sqrt();
            let mut d = h * h * h - g * g;
            if d < 0.0 {
                d = 0.0;
            }
            d = d.sqrt().atan2(-g) / 3.0;
            let cth = sqrth * d.cos();
            let sth = sqrth * SQRT3 * d.sin();
            e[0] = (spur + cth) + cth;
            e[1] = (spur - cth) + sth;
            e[2] = (spur - cth) - sth;

            if compute_transform {
                // Eigenvectors of r'r for the outer eigenvalues, with the
                // standard index-rotation fallback on degeneracy.
                for l in (0..3).step_by(2) {
                    let d = e[l];
                    let mut ss = [
                        (d - rr[2]) * (d - rr[5]) - rr[4] * rr[4],
                        (d - rr[5]) * rr[1] + rr[3] * rr[4],
                        (d - rr[0]) * (d - rr[5]) - rr[3] * rr[3],
                        (d - rr[2]) * rr[3] + rr[1] * rr[4],
                        (d - rr[0]) * rr[4] + rr[1] * rr[3],
                        (d - rr[0]) * (d - rr[2]) - rr[1] * rr[1],
                    ];
                    for s in ss.iter_mut() {
                        if s.abs() <= EPSILON {
                            *s = 0.0;
                        }
                    }

                    let j = if ss[0].abs() >= ss[2].abs() {
                        if ss[0].abs() < ss[5].abs() {
                            2
                        } else {
                            0
                        }
                    } else if ss[2].abs() >= ss[5].abs() {
                        1
                    } else {
                        2
                    };

                    let mut d = 0.0;
                    for i in 0..3 {
                        let k = IP[i + 3 * j];
                        a[i][l] = ss[k];
                        d += ss[k] * ss[k];
                    }
                    let d = if d > EPSILON { 1.0 / d.sqrt() } else { 0.0 };
                    for i in 0..3 {
                        a[i][l] *= d;
                    }
                }

                let d = a[0][0] * a[0][2] + a[1][0] * a[1][2] + a[2][0] * a[2][2];
                let (m1, m) = if (e[0] - e[1]) > (e[1] - e[2]) {
                    (2, 0)
                } else {
                    (0, 2)
                };
                let mut p = 0.0;
                for i in 0..3 {
                    a[i][m1] -= d * a[i][m];
                    p += a[i][m1] * a[i][m1];
                }
                if p <= TOL {
                    let mut p = 1.0;
                    let mut j = 0;
                    for i in 0..3 {
                        if p < a[i][m].abs() {
                            continue;
                        }
                        p = a[i][m].abs();
                        j = i;
                    }
                    let k = IP2312[j];
                    let l = IP2312[j + 1];
                    let p = (a[k][m] * a[k][m] + a[l][m] * a[l][m]).sqrt();
                    if p > TOL {
                        a[j][m1] = 0.0;
                        a[k][m1] = -a[l][m] / p;
                        a[l][m1] = a[k][m] / p;
                    } else {
                        a_failed = true;
                    }
                } else {
                    let p = 1.0 / p.sqrt();
                    for i in 0..3 {
                        a[i][m1] *= p;
                    }
                }
                if !a_failed {
                    a[0][1] = a[1][2] * a[2][0] - a[1][0] * a[2][2];
                    a[1][1] = a[2][2] * a[0][0] - a[2][0] * a[0][2];
                    a[2][1] = a[0][2] * a[1][0] - a[0][0] * a[1][2];
                }
            }
        }

        if compute_transform && !a_failed {
            for l in 0..2 {
                let mut d = 0.0;
                for i in 0..3 {
                    b[i][l] = r[i][0] * a[0][l] + r[i][1] * a[1][l] + r[i][2] * a[2][l];
                    d += b[i][l] * b[i][l];
                }
                let d = if d > EPSILON { 1.0 / d.sqrt() } else { 0.0 };
                for i in 0..3 {
                    b[i][l] *= d;
                }
            }
            let d = b[0][0] * b[0][1] + b[1][0] * b[1][1] + b[2][0] * b[2][1];
            let mut p = 0.0;
            for i in 0..3 {
                b[i][1] -= d * b[i][0];
                p += b[i][1] * b[i][1];
            }
            if p <= TOL {
                let mut p = 1.0;
                let mut j = 0;
                for i in 0..3 {
                    if p < b[i][0].abs() {
                        continue;
                    }
                    p = b[i][0].abs();
                    j = i;
                }
                let k = IP2312[j];
                let l = IP2312[j + 1];
                let p = (b[k][0] * b[k][0] + b[l][0] * b[l][0]).sqrt();
                if p > TOL {
                    b[j][1] = 0.0;
                    b[k][1] = -b[l][0] / p;
                    b[l][1] = b[k][0] / p;
                } else {
                    b_failed = true;
                }
            } else {
                let p = 1.0 / p.sqrt();
                for i in 0..3 {
                    b[i][1] *= p;
                }
            }
            if !b_failed {
                b[0][2] = b[1][0] * b[2][1] - b[1][1] * b[2][0];
                b[1][2] = b[2][0] * b[0][1] - b[2][1] * b[0][0];
                b[2][2] = b[0][0] * b[1][1] - b[0][1] * b[1][0];
                for i in 0..3 {
                    for j in 0..3 {
                        u[i][j] = b[i][0] * a[j][0] + b[i][1] * a[j][1] + b[i][2] * a[j][2];
                    }
                }
            }

            for i in 0..3 {
                t[i] = ((yc[i] - u[i][0] * xc[0]) - u[i][1] * xc[1]) - u[i][2] * xc[2];
            }
        }
    } else {
        for i in 0..3 {
            t[i] = ((yc[i] - u[i][0] * xc[0]) - u[i][1] * xc[1]) - u[i][2] * xc[2];
        }
    }

    for ev in e.iter_mut() {
        if *ev < 0.0 {
            *ev = 0.0;
        }
        *ev = ev.sqrt();
    }
    let mut d = e[2];
    if sigma < 0.0 {
        d = -d;
    }
    d = (d + e[1]) + e[0];
    let mut rms = (e0 - d) - d;
    if rms < 0.0 {
        rms = 0.0;
    }

    Some(Superposition { rms, rot: u, tran: t })
}
