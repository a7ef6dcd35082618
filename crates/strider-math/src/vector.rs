use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::{Vec2, Vec3};

/// Tolerance below which a length is treated as zero.
pub const CMP_EPSILON: f32 = 0.00001;

/// Operations the motion resolver needs from a 2D or 3D vector.
///
/// Implemented for [`glam::Vec2`] and [`glam::Vec3`]. Default methods are
/// written purely in terms of the required ones so that both dimensions share
/// one definition of `slide` and `angle_to`.
pub trait MotionVector:
    Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + AddAssign
    + SubAssign
{
    /// The zero vector.
    const ZERO: Self;

    /// Number of components (2 or 3).
    const DIM: usize;

    /// Dot product.
    fn dot(self, rhs: Self) -> f32;

    /// Euclidean length.
    fn length(self) -> f32;

    /// Squared Euclidean length.
    fn length_squared(self) -> f32;

    /// Unit vector in the same direction, or zero if the length is (near) zero.
    fn normalize_or_zero(self) -> Self;

    /// Returns the component on `axis` (0 = x, 1 = y, 2 = z).
    fn component(self, axis: usize) -> f32;

    /// Returns a copy with the component on `axis` replaced by `value`.
    fn with_component(self, axis: usize, value: f32) -> Self;

    /// Component-wise absolute value.
    fn abs_components(self) -> Self;

    /// True if every component is finite.
    fn is_finite_vector(self) -> bool;

    /// True if this is exactly the zero vector.
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Removes the component of `self` along the unit `normal`: `v - (v·n)n`.
    fn slide(self, normal: Self) -> Self {
        self - normal * self.dot(normal)
    }

    /// Unsigned angle in radians between two unit vectors.
    ///
    /// The dot product is clamped before `acos` so rounding never yields NaN.
    fn angle_to(self, other: Self) -> f32 {
        self.dot(other).clamp(-1.0, 1.0).acos()
    }
}

impl MotionVector for Vec2 {
    const ZERO: Self = Vec2::ZERO;
    const DIM: usize = 2;

    fn dot(self, rhs: Self) -> f32 {
        Vec2::dot(self, rhs)
    }

    fn length(self) -> f32 {
        Vec2::length(self)
    }

    fn length_squared(self) -> f32 {
        Vec2::length_squared(self)
    }

    fn normalize_or_zero(self) -> Self {
        Vec2::normalize_or_zero(self)
    }

    fn component(self, axis: usize) -> f32 {
        self[axis]
    }

    fn with_component(self, axis: usize, value: f32) -> Self {
        let mut v = self;
        v[axis] = value;
        v
    }

    fn abs_components(self) -> Self {
        self.abs()
    }

    fn is_finite_vector(self) -> bool {
        self.is_finite()
    }
}

impl MotionVector for Vec3 {
    const ZERO: Self = Vec3::ZERO;
    const DIM: usize = 3;

    fn dot(self, rhs: Self) -> f32 {
        Vec3::dot(self, rhs)
    }

    fn length(self) -> f32 {
        Vec3::length(self)
    }

    fn length_squared(self) -> f32 {
        Vec3::length_squared(self)
    }

    fn normalize_or_zero(self) -> Self {
        Vec3::normalize_or_zero(self)
    }

    fn component(self, axis: usize) -> f32 {
        self[axis]
    }

    fn with_component(self, axis: usize, value: f32) -> Self {
        let mut v = self;
        v[axis] = value;
        v
    }

    fn abs_components(self) -> Self {
        self.abs()
    }

    fn is_finite_vector(self) -> bool {
        self.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_removes_normal_component() {
        let v = Vec2::new(3.0, 4.0);
        let n = Vec2::new(0.0, -1.0);
        let s = MotionVector::slide(v, n);
        assert_eq!(s, Vec2::new(3.0, 0.0));
        assert!(MotionVector::dot(s, n).abs() < 1e-6);
    }

    #[test]
    fn test_slide_3d_on_tilted_plane() {
        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        let v = Vec3::new(2.0, -5.0, 1.5);
        let s = MotionVector::slide(v, n);
        assert!(MotionVector::dot(s, n).abs() < 1e-5, "slide left {s:?}");
        assert!((s.z - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_angle_to_clamps_rounding() {
        let up = Vec2::new(0.0, -1.0);
        // Slightly longer than unit: acos would be NaN without the clamp.
        let n = Vec2::new(0.0, -1.000_000_1);
        let angle = MotionVector::angle_to(n, up);
        assert!(angle.is_finite());
        assert!(angle < 1e-3);
    }

    #[test]
    fn test_angle_between_perpendicular_vectors() {
        let a = Vec3::X;
        let b = Vec3::Y;
        let angle = MotionVector::angle_to(a, b);
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_component_access() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.component(2), 3.0);
        assert_eq!(v.with_component(1, 9.0), Vec3::new(1.0, 9.0, 3.0));
    }
}
