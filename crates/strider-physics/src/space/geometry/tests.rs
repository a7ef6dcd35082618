use glam::{Affine2, Affine3A, Vec2, Vec3};
use strider_math::{Dim2, Dim3};

use super::*;

fn floor() -> (Collider2d, Affine2) {
    // Floor at y = 10, solid below (y-down world).
    let collider = Dim2::build_collider(&Shape::half_space(Vec2::new(0.0, -1.0)));
    (collider, Affine2::from_translation(Vec2::new(0.0, 10.0)))
}

#[test]
fn test_ball_contact_with_half_space() {
    let (collider, at) = floor();
    let p = Dim2::ball_contact(Vec2::new(3.0, 9.0), 0.5, &collider, &at, 1.0)
        .expect("within prediction");
    assert!((p.distance - 0.5).abs() < 1e-5, "got {}", p.distance);
    assert!((p.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
    assert!((p.point - Vec2::new(3.0, 10.0)).length() < 1e-4);

    assert!(Dim2::ball_contact(Vec2::new(3.0, 9.0), 0.5, &collider, &at, 0.1).is_none());
}

#[test]
fn test_ball_contact_reports_penetration() {
    let (collider, at) = floor();
    let p = Dim2::ball_contact(Vec2::new(0.0, 9.8), 0.5, &collider, &at, 0.0)
        .expect("overlapping");
    assert!((p.distance + 0.3).abs() < 1e-5, "got {}", p.distance);
    assert!((p.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
}

#[test]
fn test_rotated_cuboid_normal_follows_transform() {
    let collider = Dim2::build_collider(&Shape::cuboid(Vec2::new(2.0, 0.5)));
    // After a quarter turn the long axis points along y.
    let at = Affine2::from_angle(std::f32::consts::FRAC_PI_2);
    let p = Dim2::ball_contact(Vec2::new(0.0, 3.0), 0.5, &collider, &at, 1.0)
        .expect("within prediction");
    assert!((p.distance - 0.5).abs() < 1e-4, "got {}", p.distance);
    assert!((p.normal - Vec2::Y).length() < 1e-4, "got {:?}", p.normal);
}

#[test]
fn test_cuboid_face_and_edge_in_3d() {
    let collider = Dim3::build_collider(&Shape::cuboid(Vec3::splat(1.0)));
    let at = Affine3A::IDENTITY;

    let face = Dim3::ball_contact(Vec3::new(0.2, 3.0, -0.1), 0.5, &collider, &at, 5.0)
        .expect("face in range");
    assert!((face.distance - 1.5).abs() < 1e-4);
    assert!((face.normal - Vec3::Y).length() < 1e-4);

    let edge = Dim3::ball_contact(Vec3::new(2.0, 2.0, 0.0), 0.5, &collider, &at, 5.0)
        .expect("edge in range");
    assert!((edge.distance - (2.0_f32.sqrt() - 0.5)).abs() < 1e-4);
    assert!((edge.normal - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-4);
}

#[test]
fn test_ball_cast_reports_time_and_world_normal() {
    let (collider, at) = floor();
    let hit = Dim2::ball_cast(Vec2::ZERO, 1.0, Vec2::new(0.0, 20.0), &collider, &at)
        .expect("reaches the floor");
    // Ball surface reaches y = 10 when the center is at 9.
    assert!((hit.t - 9.0 / 20.0).abs() < 1e-4, "t={}", hit.t);
    assert!((hit.normal - Vec2::new(0.0, -1.0)).length() < 1e-4);
    assert!((hit.point.y - 10.0).abs() < 1e-3);

    assert!(Dim2::ball_cast(Vec2::ZERO, 1.0, Vec2::new(0.0, 5.0), &collider, &at).is_none());
}

#[test]
fn test_ball_cast_against_rotated_box_in_3d() {
    let collider = Dim3::build_collider(&Shape::cuboid(Vec3::new(1.0, 1.0, 1.0)));
    let at = Affine3A::from_rotation_translation(
        glam::Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
        Vec3::new(0.0, 0.0, 10.0),
    );
    let hit = Dim3::ball_cast(Vec3::ZERO, 0.5, Vec3::new(0.0, 0.0, 20.0), &collider, &at)
        .expect("hits the box edge");
    // A vertical edge faces the mover after an eighth turn.
    let edge_z = 10.0 - 2.0_f32.sqrt();
    assert!((hit.t - (edge_z - 0.5) / 20.0).abs() < 1e-3, "t={}", hit.t);
    assert!((hit.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-2, "n={:?}", hit.normal);
}

#[test]
fn test_ray_cast_outside_and_inside() {
    let (collider, at) = floor();
    let hit = Dim2::ray_cast(Vec2::new(0.0, 9.0), Vec2::Y, 2.0, &collider, &at)
        .expect("ray reaches the floor");
    assert!((hit.distance - 1.0).abs() < 1e-4, "distance={}", hit.distance);
    assert!((hit.normal - Vec2::new(0.0, -1.0)).length() < 1e-4);
    assert!(Dim2::ray_cast(Vec2::new(0.0, 9.0), Vec2::Y, 0.5, &collider, &at).is_none());

    let inside = Dim2::ray_cast(Vec2::new(0.0, 10.5), Vec2::Y, 2.0, &collider, &at)
        .expect("origin inside");
    assert_eq!(inside.distance, 0.0);
    assert!((inside.normal - Vec2::new(0.0, -1.0)).length() < 1e-4, "n={:?}", inside.normal);
}

#[test]
fn test_collider_debug_names_the_shape() {
    let collider = Dim3::build_collider(&Shape::ball(1.0));
    assert!(format!("{collider:?}").contains("Ball"));
}
