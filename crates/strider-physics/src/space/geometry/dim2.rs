use std::fmt;

use glam::{Affine2, Vec2};
use parry2d::na::{Isometry2, Point2, Unit, Vector2};
use parry2d::query::{self, PointQuery, Ray, RayCast, ShapeCastOptions};
use parry2d::shape::{Ball, Shape as ParryShape, SharedShape};
use strider_math::{CMP_EPSILON, Dim2};

use super::{CastHit, Proximity, SpaceDimension};
use crate::space::shape::Shape;

/// A planar collider.
#[derive(Clone)]
pub struct Collider2d(SharedShape);

impl Collider2d {
    fn shape(&self) -> &dyn ParryShape {
        self.0.as_ref()
    }
}

impl fmt::Debug for Collider2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Collider2d").field(&self.0.shape_type()).finish()
    }
}

fn to_vector(v: Vec2) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}

fn to_point(v: Vec2) -> Point2<f32> {
    Point2::new(v.x, v.y)
}

fn from_vector(v: &Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn from_point(p: &Point2<f32>) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// Rigid part of `transform`. Scale and shear are dropped.
fn isometry(transform: &Affine2) -> Isometry2<f32> {
    let x_axis = transform.matrix2.x_axis;
    Isometry2::new(to_vector(transform.translation), x_axis.y.atan2(x_axis.x))
}

fn ball_at(center: Vec2) -> Isometry2<f32> {
    Isometry2::translation(center.x, center.y)
}

impl SpaceDimension for Dim2 {
    type Collider = Collider2d;

    fn build_collider(shape: &Shape<Self>) -> Collider2d {
        let shared = match *shape {
            Shape::HalfSpace { normal } => SharedShape::halfspace(
                Unit::try_new(to_vector(normal), CMP_EPSILON).unwrap_or_else(Vector2::y_axis),
            ),
            Shape::Ball { radius } => SharedShape::ball(radius),
            Shape::Cuboid { half_extents } => SharedShape::cuboid(half_extents.x, half_extents.y),
        };
        Collider2d(shared)
    }

    fn ball_contact(
        center: Vec2,
        radius: f32,
        collider: &Collider2d,
        at: &Affine2,
        prediction: f32,
    ) -> Option<Proximity<Vec2>> {
        let contact = query::contact(
            &ball_at(center),
            &Ball::new(radius),
            &isometry(at),
            collider.shape(),
            prediction,
        )
        .ok()
        .flatten()?;
        Some(Proximity {
            distance: contact.dist,
            normal: from_vector(&contact.normal2),
            point: from_point(&contact.point2),
        })
    }

    fn ball_cast(
        center: Vec2,
        radius: f32,
        motion: Vec2,
        collider: &Collider2d,
        at: &Affine2,
    ) -> Option<CastHit<Vec2>> {
        let collider_pos = isometry(at);
        let mut options = ShapeCastOptions::with_max_time_of_impact(1.0);
        options.stop_at_penetration = true;
        let hit = query::cast_shapes(
            &ball_at(center),
            &to_vector(motion),
            &Ball::new(radius),
            &collider_pos,
            &Vector2::zeros(),
            collider.shape(),
            options,
        )
        .ok()
        .flatten()?;
        // Witness and normal come back in the collider's local frame.
        Some(CastHit {
            t: hit.time_of_impact,
            normal: from_vector(&(collider_pos * hit.normal2)),
            point: from_point(&(collider_pos * hit.witness2)),
        })
    }

    fn ray_cast(
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        collider: &Collider2d,
        at: &Affine2,
    ) -> Option<Proximity<Vec2>> {
        let pos = isometry(at);
        let ray = Ray::new(to_point(origin), to_vector(direction));
        let hit = collider
            .shape()
            .cast_ray_and_get_normal(&pos, &ray, max_distance, true)?;
        let mut normal = from_vector(&hit.normal).normalize_or_zero();
        if hit.time_of_impact <= 0.0 {
            let projection = collider.shape().project_point(&pos, &ray.origin, false);
            let outward = from_point(&projection.point) - origin;
            if projection.is_inside && outward.length_squared() > 0.0 {
                normal = outward.normalize();
            }
        }
        if normal == Vec2::ZERO {
            normal = -direction;
        }
        Some(Proximity {
            distance: hit.time_of_impact,
            normal,
            point: origin + direction * hit.time_of_impact,
        })
    }
}
