//! 2D affine transform algebra.
//!
//! A `Matrix` maps `p ↦ (a·x + c·y + e, b·x + d·y + f)`. Composition is read
//! right-to-left: `a.compose(b)` applies `b` first, then `a`. The builder
//! methods (`translate`, `rotate`, `scale`) post-compose, so
//! `Matrix::IDENTITY.translate(..).rotate(..).scale(..)` scales a point first,
//! then rotates it, then translates it.

use std::ops::{Add, Mul, Sub};

// ─── Points & vectors ────────────────────────────────────────────────────

/// A position in some 2D coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A displacement. Handle deltas are vectors: they ignore translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Unit vector in the same direction, or `None` if shorter than `eps`.
    pub fn normalized(self, eps: f64) -> Option<Vector> {
        let len = self.length();
        (len > eps).then(|| Vector::new(self.dx / len, self.dy / len))
    }

    /// The right-hand normal `(dy, -dx)`. Not normalized.
    pub fn right_normal(self) -> Vector {
        Vector::new(self.dy, -self.dx)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.dx * rhs, self.dy * rhs)
    }
}

// ─── Matrix ──────────────────────────────────────────────────────────────

/// 2D affine matrix, column-major in the canvas convention:
///
/// ```text
/// [a c e]
/// [b d f]
/// [0 0 1]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn from_translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counter-clockwise rotation in a y-up frame (clockwise on a y-down canvas).
    pub fn from_rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// `self` after `other`: the result maps `p` to `self(other(p))`.
    #[must_use]
    pub fn compose(self, other: Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    #[must_use]
    pub fn translate(self, tx: f64, ty: f64) -> Matrix {
        self.compose(Matrix::from_translation(tx, ty))
    }

    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Matrix {
        self.compose(Matrix::from_scale(sx, sy))
    }

    #[must_use]
    pub fn rotate(self, radians: f64) -> Matrix {
        self.compose(Matrix::from_rotation(radians))
    }

    /// Full affine map, translation included.
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Linear part only. Use for handle deltas and other directions.
    pub fn transform_vec(&self, v: Vector) -> Vector {
        Vector::new(self.a * v.dx + self.c * v.dy, self.b * v.dx + self.d * v.dy)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse map, or `None` when the matrix collapses the plane.
    pub fn inverse(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Matrix {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix::IDENTITY
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Matrix, eps: f64) -> bool {
        self.as_coeffs()
            .iter()
            .zip(other.as_coeffs())
            .all(|(l, r)| (l - r).abs() <= eps)
    }

    pub fn as_coeffs(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        self.compose(rhs)
    }
}

impl Mul<Point> for Matrix {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        self.transform_point(rhs)
    }
}
