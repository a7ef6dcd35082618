use std::fmt;

use glam::{Affine3A, Vec3};
use parry3d::na::{Isometry3, Point3, Quaternion, Translation3, Unit, UnitQuaternion, Vector3};
use parry3d::query::{self, PointQuery, Ray, RayCast, ShapeCastOptions};
use parry3d::shape::{Ball, Shape as ParryShape, SharedShape};
use strider_math::{CMP_EPSILON, Dim3};

use super::{CastHit, Proximity, SpaceDimension};
use crate::space::shape::Shape;

/// A spatial collider.
#[derive(Clone)]
pub struct Collider3d(SharedShape);

impl Collider3d {
    fn shape(&self) -> &dyn ParryShape {
        self.0.as_ref()
    }
}

impl fmt::Debug for Collider3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Collider3d").field(&self.0.shape_type()).finish()
    }
}

fn to_vector(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

fn to_point(v: Vec3) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

fn from_vector(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn from_point(p: &Point3<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Rigid part of `transform`. Scale is dropped.
fn isometry(transform: &Affine3A) -> Isometry3<f32> {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    Isometry3::from_parts(
        Translation3::new(translation.x, translation.y, translation.z),
        UnitQuaternion::new_normalize(Quaternion::new(
            rotation.w, rotation.x, rotation.y, rotation.z,
        )),
    )
}

fn ball_at(center: Vec3) -> Isometry3<f32> {
    Isometry3::translation(center.x, center.y, center.z)
}

impl SpaceDimension for Dim3 {
    type Collider = Collider3d;

    fn build_collider(shape: &Shape<Self>) -> Collider3d {
        let shared = match *shape {
            Shape::HalfSpace { normal } => SharedShape::halfspace(
                Unit::try_new(to_vector(normal), CMP_EPSILON).unwrap_or_else(Vector3::y_axis),
            ),
            Shape::Ball { radius } => SharedShape::ball(radius),
            Shape::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        };
        Collider3d(shared)
    }

    fn ball_contact(
        center: Vec3,
        radius: f32,
        collider: &Collider3d,
        at: &Affine3A,
        prediction: f32,
    ) -> Option<Proximity<Vec3>> {
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
        center: Vec3,
        radius: f32,
        motion: Vec3,
        collider: &Collider3d,
        at: &Affine3A,
    ) -> Option<CastHit<Vec3>> {
        let collider_pos = isometry(at);
        let mut options = ShapeCastOptions::with_max_time_of_impact(1.0);
        options.stop_at_penetration = true;
        let hit = query::cast_shapes(
            &ball_at(center),
            &to_vector(motion),
            &Ball::new(radius),
            &collider_pos,
            &Vector3::zeros(),
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
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        collider: &Collider3d,
        at: &Affine3A,
    ) -> Option<Proximity<Vec3>> {
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
        if normal == Vec3::ZERO {
            normal = -direction;
        }
        Some(Proximity {
            distance: hit.time_of_impact,
            normal,
            point: origin + direction * hit.time_of_impact,
        })
    }
}
