//! The demo level: ground, a raised step, a ramp, a patrolling platform and
//! a wall, plus the systems that walk the character through it.

use bevy_ecs::prelude::*;
use glam::{Affine2, Vec2};
use strider_config::Config;
use strider_math::{BodyTransform, Dim2};
use strider_physics::{
    BodyDesc, BodyHandle, BodyMode, CharacterMotion, FixedTick, KinematicBody, MotionError,
    MotionQuery, Shape, ShapeSpace, SlideParams,
};
use tracing::{info, warn};

/// Up in the y-down demo world.
pub const UP: Vec2 = Vec2::new(0.0, -1.0);

const CHARACTER_RADIUS: f32 = 0.4;
const WALK_SPEED: f32 = 4.0;
const PLATFORM_SPEED: f32 = 2.0;

/// Marks the walking character.
#[derive(Component)]
pub struct Player;

/// Horizontal speed the walk system drives the player at.
#[derive(Resource, Debug, Clone, Copy)]
pub struct WalkSpeed(pub f32);

/// A kinematic platform moving back and forth between two x positions.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Patrol {
    pub platform: BodyHandle,
    pub min_x: f32,
    pub max_x: f32,
}

/// How often the frame schedule reports the player state.
#[derive(Resource, Debug, Clone, Copy)]
pub struct StateLogInterval(pub u32);

/// Populates `world` with the level, the player and the demo resources.
pub fn build(world: &mut World, config: &Config) -> Result<Entity, MotionError> {
    let mut space = ShapeSpace::<Dim2>::new();

    let ground = space.add_body(
        BodyDesc::at(BodyMode::Static, Vec2::ZERO)
            .with_shape(Shape::half_space(UP))
            .with_user_id(1),
    );
    let step = space.add_body(
        BodyDesc::at(BodyMode::Static, Vec2::new(-6.0, -0.15))
            .with_shape(Shape::cuboid(Vec2::new(4.0, 0.15)))
            .with_user_id(2),
    );
    // Ramp rising to the right at 20 degrees.
    let ramp = space.add_body(
        BodyDesc::new(
            BodyMode::Static,
            Affine2::from_angle_translation(-20f32.to_radians(), Vec2::new(5.0, 0.0)),
        )
        .with_shape(Shape::cuboid(Vec2::new(2.5, 0.4)))
        .with_user_id(3),
    );
    let platform = space.add_body(
        BodyDesc::at(BodyMode::Kinematic, Vec2::new(10.0, -1.5))
            .with_shape(Shape::cuboid(Vec2::new(1.5, 0.2)))
            .with_velocity(Vec2::new(PLATFORM_SPEED, 0.0), 0.0)
            .with_user_id(4),
    );
    let wall = space.add_body(
        BodyDesc::at(BodyMode::Static, Vec2::new(16.0, 0.0))
            .with_shape(Shape::half_space(Vec2::new(-1.0, 0.0)))
            .with_user_id(5),
    );
    info!(?ground, ?step, ?ramp, ?platform, ?wall, "level built");

    let start = Vec2::new(-9.0, -2.0);
    let handle = space.add_body(
        BodyDesc::at(BodyMode::Character, start)
            .with_shape(Shape::ball(CHARACTER_RADIUS))
            .with_user_id(100),
    );
    let mut body =
        KinematicBody::<Dim2>::from_config(handle, Affine2::from_origin(start), &config.motion);
    body.enter_world(&mut space)?;

    let params = SlideParams::<Dim2>::from_config(&config.motion, UP);
    let gravity = Vec2::from(config.physics.gravity);
    let motion = CharacterMotion::new(params)
        .with_gravity(gravity)
        .with_snap(UP * -config.motion.snap_length);

    world.insert_resource(space);
    world.insert_resource(WalkSpeed(WALK_SPEED));
    world.insert_resource(Patrol {
        platform,
        min_x: 9.0,
        max_x: 13.0,
    });
    world.insert_resource(StateLogInterval(config.debug.log_state_every_ticks));
    Ok(world.spawn((Player, body, motion)).id())
}

/// Keeps the player walking right.
pub fn walk_system(
    speed: Res<WalkSpeed>,
    mut players: Query<&mut CharacterMotion<Dim2>, With<Player>>,
) {
    for mut motion in &mut players {
        motion.velocity.x = speed.0;
    }
}

/// Reverses the platform at the ends of its patrol.
pub fn patrol_system(patrol: Res<Patrol>, mut space: ResMut<ShapeSpace<Dim2>>) {
    let Some(state) = space.direct_state(patrol.platform) else {
        return;
    };
    let x = state.origin().x;
    let vx = state.linear_velocity.x;
    let past_end = (x >= patrol.max_x && vx > 0.0) || (x <= patrol.min_x && vx < 0.0);
    if !past_end {
        return;
    }
    if let Err(err) = space.set_velocity(patrol.platform, Vec2::new(-vx, 0.0), 0.0) {
        warn!(%err, "platform velocity update failed");
    }
}

/// Reports the player state every [`StateLogInterval`] ticks.
pub fn log_state_system(
    tick: Res<FixedTick>,
    interval: Res<StateLogInterval>,
    mut last_logged: Local<u64>,
    players: Query<(&KinematicBody<Dim2>, &CharacterMotion<Dim2>), With<Player>>,
) {
    if interval.0 == 0 || tick.tick < *last_logged + u64::from(interval.0) {
        return;
    }
    *last_logged = tick.tick;
    for (body, motion) in &players {
        info!(
            tick = tick.tick,
            x = body.origin().x,
            y = body.origin().y,
            on_floor = body.is_on_floor(),
            on_wall = body.is_on_wall(),
            on_ceiling = body.is_on_ceiling(),
            floor = ?body.floor_body(),
            slides = body.slide_count(),
            velocity = ?motion.last_residual,
            "player state"
        );
    }
}
