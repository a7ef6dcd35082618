use std::fmt::Debug;

use glam::{Affine2, Affine3A, Vec2, Vec3, Vec3A};

use crate::vector::MotionVector;

/// Rigid placement of a body: a linear part plus an origin.
///
/// Only the origin is ever changed by the motion resolver. The linear part
/// (rotation, possibly scale) is carried through untouched.
pub trait BodyTransform: Copy + Debug + PartialEq + Send + Sync + 'static {
    type Vector: MotionVector;

    const IDENTITY: Self;

    /// Identity basis placed at `origin`.
    fn from_origin(origin: Self::Vector) -> Self;

    fn origin(&self) -> Self::Vector;

    fn set_origin(&mut self, origin: Self::Vector);

    /// Copy of this transform with the origin moved by `offset`.
    fn translated(&self, offset: Self::Vector) -> Self {
        let mut t = *self;
        t.set_origin(self.origin() + offset);
        t
    }

    /// Maps a point from local to world space.
    fn transform_point(&self, p: Self::Vector) -> Self::Vector;

    /// Maps a direction from local to world space (ignores the origin).
    fn transform_vector(&self, v: Self::Vector) -> Self::Vector;
}

impl BodyTransform for Affine2 {
    type Vector = Vec2;

    const IDENTITY: Self = Affine2::IDENTITY;

    fn from_origin(origin: Vec2) -> Self {
        Affine2::from_translation(origin)
    }

    fn origin(&self) -> Vec2 {
        self.translation
    }

    fn set_origin(&mut self, origin: Vec2) {
        self.translation = origin;
    }

    fn transform_point(&self, p: Vec2) -> Vec2 {
        self.transform_point2(p)
    }

    fn transform_vector(&self, v: Vec2) -> Vec2 {
        self.transform_vector2(v)
    }
}

impl BodyTransform for Affine3A {
    type Vector = Vec3;

    const IDENTITY: Self = Affine3A::IDENTITY;

    fn from_origin(origin: Vec3) -> Self {
        Affine3A::from_translation(origin)
    }

    fn origin(&self) -> Vec3 {
        Vec3::from(self.translation)
    }

    fn set_origin(&mut self, origin: Vec3) {
        self.translation = Vec3A::from(origin);
    }

    fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_point3(p)
    }

    fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.transform_vector3(v)
    }
}
