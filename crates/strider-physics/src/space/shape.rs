//! Collider shape descriptions and separation rays.

use strider_math::{Dimension, MotionVector};

/// Collider shape in body-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<D: Dimension> {
    /// Solid half-space bounded by the plane through the local origin.
    /// `normal` points out of the solid.
    HalfSpace { normal: D::Vector },
    /// Ball centred on the local origin.
    Ball { radius: f32 },
    /// Box centred on the local origin.
    Cuboid { half_extents: D::Vector },
}

impl<D: Dimension> Shape<D> {
    /// Half-space with a normalised outward normal.
    pub fn half_space(normal: D::Vector) -> Self {
        Shape::HalfSpace {
            normal: normal.normalize_or_zero(),
        }
    }

    pub fn ball(radius: f32) -> Self {
        Shape::Ball {
            radius: radius.max(0.0),
        }
    }

    pub fn cuboid(half_extents: D::Vector) -> Self {
        Shape::Cuboid {
            half_extents: half_extents.abs_components(),
        }
    }
}

/// Separation ray attached to a body, in body-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationRay<D: Dimension> {
    pub origin: D::Vector,
    pub direction: D::Vector,
    pub length: f32,
}

impl<D: Dimension> SeparationRay<D> {
    pub fn new(origin: D::Vector, direction: D::Vector, length: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            length: length.max(0.0),
        }
    }
}
