//! ECS systems that step a [`ShapeSpace`] and drive kinematic characters.
//!
//! All systems are generic over the [`SpaceDimension`]; register them with the
//! concrete one, e.g. `physics_step_system::<Dim2>`.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;
use strider_math::{Dimension, MotionVector};

use crate::handle::BodyHandle;
use crate::kinematic_body::KinematicBody;
use crate::slide::SlideParams;
use crate::space::{ShapeSpace, SpaceDimension};

/// Length and index of the fixed tick currently running.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FixedTick {
    /// Tick length in seconds.
    pub dt: f32,
    /// Ticks run so far, including the current one.
    pub tick: u64,
}

impl FixedTick {
    pub fn new(dt: f32) -> Self {
        Self { dt, tick: 0 }
    }
}

impl Default for FixedTick {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

/// Velocity-driven character input for [`character_motion_system`].
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CharacterMotion<D: Dimension> {
    /// Velocity fed to the next slide. Replaced by the residual afterwards.
    pub velocity: D::Vector,
    /// Acceleration added to `velocity` every tick.
    pub gravity: D::Vector,
    /// Floor snap motion; zero disables snapping.
    pub snap: D::Vector,
    pub params: SlideParams<D>,
    /// Residual velocity returned by the last slide.
    pub last_residual: D::Vector,
}

impl<D: Dimension> CharacterMotion<D> {
    pub fn new(params: SlideParams<D>) -> Self {
        Self {
            velocity: D::Vector::ZERO,
            gravity: D::Vector::ZERO,
            snap: D::Vector::ZERO,
            params,
            last_residual: D::Vector::ZERO,
        }
    }

    pub fn with_gravity(mut self, gravity: D::Vector) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_snap(mut self, snap: D::Vector) -> Self {
        self.snap = snap;
        self
    }
}

/// Starts a physics step: integrates the space by the tick length.
///
/// **Stage:** fixed tick, first.
pub fn physics_step_system<D: SpaceDimension>(
    tick: Res<FixedTick>,
    mut space: ResMut<ShapeSpace<D>>,
) {
    space.step(tick.dt);
}

/// Delivers the transforms the space reached this step to bodies running
/// in sync-to-physics mode.
///
/// **Stage:** fixed tick, after [`physics_step_system`].
pub fn sync_to_physics_system<D: SpaceDimension>(
    mut space: ResMut<ShapeSpace<D>>,
    mut bodies: Query<&mut KinematicBody<D>>,
) {
    let notifications = space.drain_state_notifications();
    if notifications.is_empty() {
        return;
    }
    // Later notifications for the same body win.
    let latest: FxHashMap<BodyHandle, D::Transform> = notifications.into_iter().collect();
    for mut body in &mut bodies {
        if let Some(transform) = latest.get(&body.handle()) {
            body.on_physics_state(*transform);
        }
    }
}

/// Moves every character by its velocity plus gravity, sliding and snapping.
///
/// **Stage:** fixed tick, after [`sync_to_physics_system`]. Bodies in
/// sync-to-physics mode are left to the space.
pub fn character_motion_system<D: SpaceDimension>(
    tick: Res<FixedTick>,
    mut space: ResMut<ShapeSpace<D>>,
    mut characters: Query<(&mut KinematicBody<D>, &mut CharacterMotion<D>)>,
) {
    for (mut body, mut motion) in &mut characters {
        if body.is_sync_to_physics() {
            continue;
        }
        let velocity = motion.velocity + motion.gravity * tick.dt;
        let params = motion.params;
        let residual = body.move_and_slide_with_snap(&mut *space, velocity, motion.snap, &params);
        motion.velocity = residual;
        motion.last_residual = residual;
    }
}

/// Ends the physics step opened by [`physics_step_system`].
///
/// **Stage:** fixed tick, last.
pub fn physics_step_end_system<D: SpaceDimension>(mut space: ResMut<ShapeSpace<D>>) {
    space.end_step();
}
