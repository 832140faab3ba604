//! Explicit 2D affine transform math.
//!
//! SVG expresses transforms as the 2x3 matrix `[a c e; b d f]` mapping
//! `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`. Ancestor transforms compose
//! ancestor-first: the cumulative transform of a nested element is
//! `parent_ctm * element_transform`.

use serde::{Deserialize, Serialize};

use super::Point;

/// A 2D affine transform in SVG `(a, b, c, d, e, f)` component order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation about the origin by `degrees`, positive toward +Y.
    pub fn rotation(degrees: f64) -> Self {
        let r = degrees.to_radians();
        let (sin, cos) = r.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation about `(cx, cy)`, the SVG `rotate(a, cx, cy)` form.
    pub fn rotation_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translation(cx, cy)
            .multiply(&Self::rotation(degrees))
            .multiply(&Self::translation(-cx, -cy))
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// Matrix product `self * other`: `other` is applied first, then `self`.
    ///
    /// For CTM accumulation this means `ctm = parent.multiply(&child)`.
    pub fn multiply(&self, other: &Transform2D) -> Transform2D {
        Transform2D::new(
            self.a * other.a + self.c * other.b,
            self.b * other.a + self.d * other.b,
            self.a * other.c + self.c * other.d,
            self.b * other.c + self.d * other.d,
            self.a * other.e + self.c * other.f + self.e,
            self.b * other.e + self.d * other.f + self.f,
        )
    }

    pub fn apply(&self, p: &Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Whether this transform preserves circles (uniform scale + rotation,
    /// possibly reflected). Circular arcs stay circular exactly when this
    /// holds; anything else turns them elliptical.
    pub fn is_similarity(&self, tolerance: f64) -> bool {
        let col1 = self.a * self.a + self.b * self.b;
        let col2 = self.c * self.c + self.d * self.d;
        let dot = self.a * self.c + self.b * self.d;
        let scale = col1.max(col2).max(1e-12);
        (col1 - col2).abs() <= tolerance * scale && dot.abs() <= tolerance * scale
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Uniform scale factor of a similarity transform.
    pub fn similarity_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }
}
