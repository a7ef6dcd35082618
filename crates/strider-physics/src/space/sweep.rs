//! Margin-inflated ball sweeps against convex colliders.
//!
//! A sweep runs in three phases: depenetrate the inflated ball, cast it
//! along the motion for the earliest contact, then gather the contact
//! descriptor with a rest query at the unsafe position.

use strider_math::{BodyTransform, MotionVector};

use super::body::Body;
use super::geometry::{Proximity, SpaceDimension};
use super::shape::SeparationRay;
use crate::handle::BodyHandle;

/// Gap below which a sweep is considered touching.
pub(crate) const CAST_EPSILON: f32 = 1.0e-4;
/// Cosine below which a touching sweep counts as moving into the surface.
pub(crate) const DIRECTION_EPSILON: f32 = 1.0e-3;
/// Gap within which a collider contributes to the rest query.
pub(crate) const REST_EPSILON: f32 = 2.0e-3;
/// Penetration tolerated before depenetration kicks in.
const RECOVERY_EPSILON: f32 = 1.0e-6;
const RECOVERY_PASSES: usize = 4;

/// One collider of one body, as seen by a mover.
#[derive(Clone, Copy)]
pub(crate) struct ColliderRef<'a, D: SpaceDimension> {
    pub handle: BodyHandle,
    pub body: &'a Body<D>,
    pub shape_index: usize,
    pub collider: &'a D::Collider,
}

impl<D: SpaceDimension> ColliderRef<'_, D> {
    fn at(&self) -> &D::Transform {
        &self.body.desc.transform
    }

    /// Ball contact if the gap is at most `prediction`.
    pub fn contact(
        &self,
        center: D::Vector,
        radius: f32,
        prediction: f32,
    ) -> Option<Proximity<D::Vector>> {
        D::ball_contact(center, radius, self.collider, self.at(), prediction)
    }
}

/// Earliest contact of a moving ball with one collider.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Impact<V> {
    /// Fraction of the motion at which contact is made.
    pub t: f32,
    /// Gap left at `t`; zero for a cast hit.
    pub gap: f32,
    pub normal: V,
    pub point: V,
}

/// Earliest touch of a ball of `radius` moving from `start` along `motion`.
///
/// A ball already touching counts only while the motion pushes into the
/// surface; sliding along or leaving it is free.
pub(crate) fn time_of_impact<D: SpaceDimension>(
    collider: &ColliderRef<'_, D>,
    start: D::Vector,
    motion: D::Vector,
    radius: f32,
) -> Option<Impact<D::Vector>> {
    if let Some(touch) = collider.contact(start, radius, CAST_EPSILON) {
        let approach = touch.normal.dot(motion);
        if approach >= -DIRECTION_EPSILON * motion.length() {
            return None;
        }
        return Some(Impact {
            t: 0.0,
            gap: touch.distance,
            normal: touch.normal,
            point: touch.point,
        });
    }
    let hit = D::ball_cast(start, radius, motion, collider.collider, collider.at())?;
    Some(Impact {
        t: hit.t,
        gap: 0.0,
        normal: hit.normal,
        point: hit.point,
    })
}

/// Pushes a ball of `radius` at `center` out of every overlapping collider.
pub(crate) fn recover<D: SpaceDimension>(
    colliders: &[ColliderRef<'_, D>],
    center: D::Vector,
    radius: f32,
) -> D::Vector {
    let mut center = center;
    for _ in 0..RECOVERY_PASSES {
        let mut moved = false;
        for collider in colliders {
            let Some(contact) = collider.contact(center, radius, 0.0) else {
                continue;
            };
            if contact.distance < -RECOVERY_EPSILON {
                center += contact.normal * (-contact.distance);
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
    center
}

/// A candidate contact for the rest query.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RestContact<V> {
    pub collider: usize,
    pub local_shape: usize,
    pub point: V,
    pub normal: V,
    /// Penetration into the margin band (negative gap).
    pub depth: f32,
}

/// Deepest collider within the margin band of a ball at `center`.
pub(crate) fn rest_contact<D: SpaceDimension>(
    colliders: &[ColliderRef<'_, D>],
    center: D::Vector,
    radius: f32,
    local_shape: usize,
) -> Option<RestContact<D::Vector>> {
    let mut best: Option<RestContact<D::Vector>> = None;
    for (index, collider) in colliders.iter().enumerate() {
        let Some(contact) = collider.contact(center, radius, REST_EPSILON) else {
            continue;
        };
        let depth = -contact.distance;
        if best.is_none_or(|b| depth > b.depth) {
            best = Some(RestContact {
                collider: index,
                local_shape,
                point: contact.point,
                normal: contact.normal,
                depth,
            });
        }
    }
    best
}

/// First hit of a separation ray across every collider.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RayHit<V> {
    pub collider: usize,
    /// Distance along the ray.
    pub distance: f32,
    pub point: V,
    pub normal: V,
}

pub(crate) fn cast_ray<D: SpaceDimension>(
    colliders: &[ColliderRef<'_, D>],
    origin: D::Vector,
    direction: D::Vector,
    reach: f32,
) -> Option<RayHit<D::Vector>> {
    let mut best: Option<RayHit<D::Vector>> = None;
    for (index, collider) in colliders.iter().enumerate() {
        let Some(hit) = D::ray_cast(origin, direction, reach, collider.collider, collider.at())
        else {
            continue;
        };
        if best.is_none_or(|b| hit.distance < b.distance) {
            best = Some(RayHit {
                collider: index,
                distance: hit.distance,
                point: hit.point,
                normal: hit.normal,
            });
        }
    }
    best
}

/// Separation rays of a mover in world space at `transform`.
pub(crate) fn world_rays<'a, D: SpaceDimension>(
    rays: &'a [SeparationRay<D>],
    transform: &'a D::Transform,
) -> impl Iterator<Item = (usize, D::Vector, D::Vector, f32)> + 'a {
    rays.iter().enumerate().filter_map(move |(i, ray)| {
        let direction = transform.transform_vector(ray.direction).normalize_or_zero();
        if direction.is_zero() {
            return None;
        }
        Some((i, transform.transform_point(ray.origin), direction, ray.length))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::body::{BodyDesc, BodyMode};
    use crate::space::shape::Shape;
    use glam::Vec2;
    use strider_math::Dim2;

    fn floor_body() -> Body<Dim2> {
        Body::new(
            BodyDesc::at(BodyMode::Static, Vec2::new(0.0, 10.0))
                .with_shape(Shape::half_space(Vec2::new(0.0, -1.0))),
        )
    }

    fn refs(body: &Body<Dim2>) -> Vec<ColliderRef<'_, Dim2>> {
        body.colliders
            .iter()
            .enumerate()
            .map(|(shape_index, collider)| ColliderRef {
                handle: BodyHandle::new(0, 0),
                body,
                shape_index,
                collider,
            })
            .collect()
    }

    #[test]
    fn test_time_of_impact_straight_down() {
        let body = floor_body();
        let colliders = refs(&body);
        let impact = time_of_impact(&colliders[0], Vec2::ZERO, Vec2::new(0.0, 20.0), 1.0)
            .expect("hit floor");
        // Ball surface reaches y = 10 when the center is at 9.
        assert!((impact.t - 9.0 / 20.0).abs() < 1e-4, "t={}", impact.t);
    }

    #[test]
    fn test_time_of_impact_parallel_misses() {
        let body = floor_body();
        let colliders = refs(&body);
        let start = Vec2::new(0.0, 9.0);
        assert!(time_of_impact(&colliders[0], start, Vec2::new(5.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_time_of_impact_touching_and_pushing_is_immediate() {
        let body = floor_body();
        let colliders = refs(&body);
        let impact = time_of_impact(&colliders[0], Vec2::new(0.0, 9.0), Vec2::new(1.0, 1.0), 1.0)
            .expect("moving into the floor");
        assert_eq!(impact.t, 0.0);
    }

    #[test]
    fn test_recover_pushes_to_band_edge() {
        let body = floor_body();
        let colliders = refs(&body);
        let out = recover(&colliders, Vec2::new(2.0, 9.8), 0.5);
        assert!((out.y - 9.5).abs() < 1e-5, "got {out:?}");
        assert_eq!(out.x, 2.0);
    }

    #[test]
    fn test_rest_contact_within_band_only() {
        let body = floor_body();
        let colliders = refs(&body);
        assert!(rest_contact(&colliders, Vec2::new(0.0, 9.5), 0.5, 0).is_some());
        assert!(rest_contact(&colliders, Vec2::new(0.0, 9.4), 0.5, 0).is_none());
    }

    #[test]
    fn test_cast_ray_hits_floor() {
        let body = floor_body();
        let colliders = refs(&body);
        let hit = cast_ray(&colliders, Vec2::new(0.0, 9.0), Vec2::new(0.0, 1.0), 2.0)
            .expect("ray reaches the floor");
        assert!((hit.distance - 1.0).abs() < 1e-3, "distance={}", hit.distance);
        assert!(cast_ray(&colliders, Vec2::new(0.0, 9.0), Vec2::new(0.0, 1.0), 0.5).is_none());
    }
}
