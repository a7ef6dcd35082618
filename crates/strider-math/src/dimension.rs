use std::fmt::Debug;

use glam::{Affine2, Affine3A, Mat2, Mat3A, Vec2, Vec3};

use crate::transform::BodyTransform;
use crate::vector::MotionVector;

/// Binds the resolver to a concrete spatial dimension.
pub trait Dimension: Copy + Debug + Default + Send + Sync + 'static {
    type Vector: MotionVector;
    type Transform: BodyTransform<Vector = Self::Vector>;
    /// Angular velocity: a scalar in 2D, a vector in 3D.
    type Angular: Copy + Debug + Default + PartialEq + Send + Sync + 'static;

    const NAME: &'static str;

    /// Velocity of a point at offset `r` from a body origin moving with
    /// `linear` and spinning with `angular`.
    fn point_velocity(linear: Self::Vector, angular: Self::Angular, r: Self::Vector) -> Self::Vector;

    /// Rotates the basis of `transform` by `angular * dt` about its origin.
    fn integrate_rotation(transform: &mut Self::Transform, angular: Self::Angular, dt: f32);
}

/// Planar motion. Angular velocity is a scalar about the out-of-plane axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dim2;

/// Spatial motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dim3;

impl Dimension for Dim2 {
    type Vector = Vec2;
    type Transform = Affine2;
    type Angular = f32;

    const NAME: &'static str = "2d";

    fn point_velocity(linear: Vec2, angular: f32, r: Vec2) -> Vec2 {
        linear + Vec2::new(-angular * r.y, angular * r.x)
    }

    fn integrate_rotation(transform: &mut Affine2, angular: f32, dt: f32) {
        if angular != 0.0 {
            transform.matrix2 = Mat2::from_angle(angular * dt) * transform.matrix2;
        }
    }
}

impl Dimension for Dim3 {
    type Vector = Vec3;
    type Transform = Affine3A;
    type Angular = Vec3;

    const NAME: &'static str = "3d";

    fn point_velocity(linear: Vec3, angular: Vec3, r: Vec3) -> Vec3 {
        linear + angular.cross(r)
    }

    fn integrate_rotation(transform: &mut Affine3A, angular: Vec3, dt: f32) {
        let speed = angular.length();
        if speed > 0.0 {
            let rotation = Mat3A::from_axis_angle(angular / speed, speed * dt);
            transform.matrix3 = rotation * transform.matrix3;
        }
    }
}
