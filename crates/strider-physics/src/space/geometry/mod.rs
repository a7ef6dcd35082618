//! Collider geometry and the narrow-phase queries the space runs on it.
//!
//! Each dimension builds its colliders as parry shapes and answers three
//! questions about a ball (the margin-inflated mover) or a ray: how far is it
//! from a collider, when does it first touch one while moving, and where does
//! a ray enter one. Everything above this layer is dimension-agnostic.

mod dim2;
mod dim3;

use std::fmt::Debug;

use strider_math::Dimension;

use super::shape::Shape;

pub use dim2::Collider2d;
pub use dim3::Collider3d;

/// Closest-feature data between a query and one collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity<V> {
    /// Signed distance; negative when overlapping.
    pub distance: f32,
    /// Unit normal on the collider surface, pointing out of the collider.
    pub normal: V,
    /// Closest point on the collider surface.
    pub point: V,
}

/// First touch of a ball cast along a motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit<V> {
    /// Fraction of the motion at which the ball touches.
    pub t: f32,
    pub normal: V,
    pub point: V,
}

/// A [`Dimension`] the space can collide in.
pub trait SpaceDimension: Dimension {
    /// Collider built once from a body's [`Shape`].
    type Collider: Debug + Clone + Send + Sync + 'static;

    fn build_collider(shape: &Shape<Self>) -> Self::Collider;

    /// Ball of `radius` at `center` against `collider` placed at `at`.
    ///
    /// `None` when the gap is larger than `prediction`.
    fn ball_contact(
        center: Self::Vector,
        radius: f32,
        collider: &Self::Collider,
        at: &Self::Transform,
        prediction: f32,
    ) -> Option<Proximity<Self::Vector>>;

    /// Earliest fraction in `[0, 1]` of `motion` at which the ball touches.
    fn ball_cast(
        center: Self::Vector,
        radius: f32,
        motion: Self::Vector,
        collider: &Self::Collider,
        at: &Self::Transform,
    ) -> Option<CastHit<Self::Vector>>;

    /// Entry of a unit-direction ray within `max_distance`.
    ///
    /// A ray starting inside hits at distance zero, with the normal of the
    /// nearest face.
    fn ray_cast(
        origin: Self::Vector,
        direction: Self::Vector,
        max_distance: f32,
        collider: &Self::Collider,
        at: &Self::Transform,
    ) -> Option<Proximity<Self::Vector>>;
}

#[cfg(test)]
mod tests;
