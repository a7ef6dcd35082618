//! End-to-end motion scenarios in a y-up 3D world at 60 Hz.

use glam::{Affine3A, Vec3};
use strider_math::{BodyTransform, Dim3};

use crate::{BodyDesc, BodyHandle, BodyMode, KinematicBody, Shape, ShapeSpace, SlideParams};

const UP: Vec3 = Vec3::Y;
const RADIUS: f32 = 0.05;
/// Ball radius plus the default safe margin.
const REACH: f32 = RADIUS + 0.08;
const DT: f32 = 1.0 / 60.0;

fn character(space: &mut ShapeSpace<Dim3>, origin: Vec3) -> KinematicBody<Dim3> {
    let handle = space.add_body(
        BodyDesc::at(BodyMode::Character, origin).with_shape(Shape::ball(RADIUS)),
    );
    let mut body = KinematicBody::new(handle, Affine3A::from_origin(origin));
    body.enter_world(space).unwrap();
    body
}

fn plane(space: &mut ShapeSpace<Dim3>, point: Vec3, normal: Vec3) -> BodyHandle {
    space.add_body(BodyDesc::at(BodyMode::Static, point).with_shape(Shape::half_space(normal)))
}

fn params() -> SlideParams<Dim3> {
    SlideParams::<Dim3>::default().with_up(UP)
}

fn approx(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).length() <= eps
}

#[test]
fn test_landing_on_flat_floor() {
    let mut space = ShapeSpace::<Dim3>::new();
    let floor = plane(&mut space, Vec3::ZERO, UP);
    let mut body = character(&mut space, Vec3::new(0.0, 0.2, 0.0));

    let residual = body.move_and_slide(&mut space, Vec3::new(0.0, -60.0, 0.0), &params());

    assert!(body.is_on_floor());
    assert!(!body.is_on_wall());
    assert_eq!(body.floor_body(), Some(floor));
    assert!(approx(body.floor_normal(), UP, 1e-4), "got {:?}", body.floor_normal());
    assert!(residual.length() < 1e-4, "got {residual:?}");
    assert!((body.origin().y - REACH).abs() < 1e-3, "got {:?}", body.origin());
    assert_eq!(space.body_transform(body.handle()).unwrap().origin(), body.origin());
}

#[test]
fn test_landing_into_corner_keeps_tangent_motion() {
    let mut space = ShapeSpace::<Dim3>::new();
    plane(&mut space, Vec3::ZERO, UP);
    let wall = plane(&mut space, Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_X);
    let mut body = character(&mut space, Vec3::new(0.5, 0.2, 0.0));

    let residual = body.move_and_slide(&mut space, Vec3::new(60.0, -60.0, 120.0), &params());

    assert!(body.is_on_floor());
    assert!(body.is_on_wall());
    assert!(body.slide_count() >= 2);
    assert_eq!(body.slide_collision(1).map(|record| record.collider()), Some(wall));
    assert!(approx(residual, Vec3::new(0.0, 0.0, 120.0), 1e-2), "got {residual:?}");
    let origin = body.origin();
    assert!((origin.x - (1.0 - REACH)).abs() < 1e-3, "got {origin:?}");
    assert!((origin.y - REACH).abs() < 1e-3, "got {origin:?}");
    assert!((origin.z - 2.0).abs() < 1e-3, "got {origin:?}");
}

#[test]
fn test_wall_slide() {
    let mut space = ShapeSpace::<Dim3>::new();
    plane(&mut space, Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_X);
    let mut body = character(&mut space, Vec3::new(0.5, 0.0, 0.0));

    let residual = body.move_and_slide(&mut space, Vec3::new(60.0, 0.0, 30.0), &params());

    assert!(body.is_on_wall());
    assert!(!body.is_on_floor());
    assert!(!body.is_on_ceiling());
    assert!(approx(residual, Vec3::new(0.0, 0.0, 30.0), 1e-3), "got {residual:?}");
    assert!(approx(body.origin(), Vec3::new(1.0 - REACH, 0.0, 0.5), 1e-3), "got {:?}", body.origin());
}

#[test]
fn test_snap_after_leaving_ledge() {
    let mut space = ShapeSpace::<Dim3>::new();
    // Top face at y = 0 for x <= 0.
    let ledge = space.add_body(
        BodyDesc::at(BodyMode::Static, Vec3::new(-5.0, -0.5, 0.0))
            .with_shape(Shape::cuboid(Vec3::new(5.0, 0.5, 5.0))),
    );
    let lower = plane(&mut space, Vec3::new(0.0, -0.3, 0.0), UP);
    let mut body = character(&mut space, Vec3::new(-0.05, REACH, 0.0));

    body.move_and_slide(&mut space, Vec3::new(0.0, -1.0, 0.0), &params());
    assert!(body.is_on_floor());
    assert_eq!(body.floor_body(), Some(ledge));

    let residual = body.move_and_slide_with_snap(
        &mut space,
        Vec3::new(12.0, 0.0, 0.0),
        Vec3::new(0.0, -0.5, 0.0),
        &params(),
    );

    assert!(body.is_on_floor());
    assert_eq!(body.floor_body(), Some(lower));
    assert!((body.origin().y - (REACH - 0.3)).abs() < 1e-3, "got {:?}", body.origin());
    assert!((body.origin().x - 0.15).abs() < 1e-3, "got {:?}", body.origin());
    assert_eq!(residual, Vec3::new(12.0, 0.0, 0.0));
    assert_eq!(body.slide_count(), 0);
}

fn platform_scene(linear: Vec3, angular: Vec3) -> (ShapeSpace<Dim3>, BodyHandle) {
    let mut space = ShapeSpace::<Dim3>::new();
    let platform = space.add_body(
        BodyDesc::at(BodyMode::Kinematic, Vec3::new(0.0, -0.5, 0.0))
            .with_shape(Shape::cuboid(Vec3::new(2.0, 0.5, 2.0)))
            .with_velocity(linear, angular),
    );
    (space, platform)
}

#[test]
fn test_moving_platform_carry() {
    let (mut space, platform) = platform_scene(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);
    let mut body = character(&mut space, Vec3::new(0.0, REACH, 0.0));

    body.move_and_slide(&mut space, Vec3::new(0.0, -1.0, 0.0), &params());
    assert!(body.is_on_floor());
    let before = body.origin();

    for _ in 0..30 {
        space.step(DT);
        body.move_and_slide(&mut space, Vec3::new(0.0, -1.0, 0.0), &params());
        space.end_step();
        assert!(body.is_on_floor());
    }

    assert_eq!(body.floor_body(), Some(platform));
    assert!(approx(body.floor_velocity(), Vec3::new(3.0, 0.0, 0.0), 1e-3));
    assert!((body.origin().x - before.x - 1.5).abs() < 1e-3, "got {:?}", body.origin());
    assert!((body.origin().y - before.y).abs() < 1e-3, "got {:?}", body.origin());
}

#[test]
fn test_yawing_platform_carries_at_body_position() {
    let spin = Vec3::new(0.0, 1.0, 0.0);
    let (mut space, platform) = platform_scene(Vec3::ZERO, Vec3::ZERO);
    let mut body = character(&mut space, Vec3::new(1.5, REACH, 0.0));
    body.move_and_slide(&mut space, Vec3::new(0.0, -1.0, 0.0), &params());
    assert_eq!(body.floor_body(), Some(platform));

    space.set_velocity(platform, Vec3::ZERO, spin).unwrap();
    let before = body.origin();
    body.move_and_slide(&mut space, Vec3::ZERO, &params());

    let expected = spin.cross(before - Vec3::new(0.0, -0.5, 0.0)) * DT;
    let moved = body.origin() - before;
    assert!(approx(moved, expected, 1e-4), "moved {moved:?}, expected {expected:?}");
    assert!(moved.z < -0.02, "got {moved:?}");
    assert!(body.is_on_floor());
}
