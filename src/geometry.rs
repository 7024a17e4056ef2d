//! 3D vector and 3x3 matrix primitives for rigid-body composition.
//!
//! Rotations follow the row convention of the pair-transform tables:
//! `v.rotated(&m)` treats `v` as a row vector, i.e. the result is the linear
//! combination of the matrix rows weighted by the vector components.
use bytemuck::{Pod, Zeroable};
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// A 3D point or displacement. Also doubles as a centre-of-mass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, rhs: &Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Row-vector times matrix: the component-weighted sum of `m`'s rows.
    pub fn rotated(&self, m: &Mat3) -> Vec3 {
        m.rows[0] * self.x + m.rows[1] * self.y + m.rows[2] * self.z
    }

    pub fn dist_to(&self, rhs: &Vec3) -> f32 {
        let dx = self.x - rhs.x;
        let dy = self.y - rhs.y;
        let dz = self.z - rhs.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn approx_eq(&self, rhs: &Vec3, tolerance: f32) -> bool {
        (self.x - rhs.x).abs() <= tolerance
            && (self.y - rhs.y).abs() <= tolerance
            && (self.z - rhs.z).abs() <= tolerance
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, f: f32) -> Vec3 {
        Vec3::new(self.x * f, self.y * f, self.z * f)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

/// A row-major 3x3 matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mat3 {
    pub rows: [Vec3; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        rows: [
            Vec3 {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: 1.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
        ],
    };

    pub fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self {
            rows: [
                Vec3::new(rows[0][0], rows[0][1], rows[0][2]),
                Vec3::new(rows[1][0], rows[1][1], rows[1][2]),
                Vec3::new(rows[2][0], rows[2][1], rows[2][2]),
            ],
        }
    }

    /// Matrix times column vector.
    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        Vec3::new(self.rows[0].dot(v), self.rows[1].dot(v), self.rows[2].dot(v))
    }

    pub fn mul_mat(&self, rhs: &Mat3) -> Mat3 {
        let t = rhs.transpose();
        Mat3 {
            rows: [
                Vec3::new(
                    self.rows[0].dot(&t.rows[0]),
                    self.rows[0].dot(&t.rows[1]),
                    self.rows[0].dot(&t.rows[2]),
                ),
                Vec3::new(
                    self.rows[1].dot(&t.rows[0]),
                    self.rows[1].dot(&t.rows[1]),
                    self.rows[1].dot(&t.rows[2]),
                ),
                Vec3::new(
                    self.rows[2].dot(&t.rows[0]),
                    self.rows[2].dot(&t.rows[1]),
                    self.rows[2].dot(&t.rows[2]),
                ),
            ],
        }
    }

    pub fn transpose(&self) -> Mat3 {
        Mat3 {
            rows: [
                Vec3::new(self.rows[0].x, self.rows[1].x, self.rows[2].x),
                Vec3::new(self.rows[0].y, self.rows[1].y, self.rows[2].y),
                Vec3::new(self.rows[0].z, self.rows[1].z, self.rows[2].z),
            ],
        }
    }
}

/// An ordered 3D point path.
pub type Points = Vec<Vec3>;

/// Total piecewise-linear length of a path.
pub fn path_length(points: &[Vec3]) -> f32 {
    points
        .windows(2)
        .map(|pair| pair[0].dist_to(&pair[1]))
        .sum()
}
