//! Kinematic character motion: collide-and-slide against a physics world.
//!
//! A [`KinematicBody`] is moved by the resolver rather than by forces. Each
//! motion call sweeps its shape through the world via [`MotionQuery`],
//! produces [`CollisionRecord`]s, slides along what it hits and tracks
//! floor, wall and ceiling contact in its [`MotionState`]. [`ShapeSpace`] is
//! the world the resolver runs against, with its narrow phase on parry in 2D
//! and 3D; [`PhysicsSchedule`] drives both on a fixed tick inside a
//! `bevy_ecs` world.

mod collision;
mod error;
mod handle;
mod kinematic_body;
mod mover;
mod query;
mod schedule;
mod slide;
mod space;
mod state;
mod sync;
mod systems;

pub use collision::{CollisionRecord, ContactKind, FLOOR_ANGLE_THRESHOLD};
pub use error::{MotionError, QueryError};
pub use handle::BodyHandle;
pub use kinematic_body::{DEFAULT_SAFE_MARGIN, KinematicBody};
pub use mover::{MAX_RAY_RESULTS, SLIDING_PRECISION};
pub use query::{
    DirectBodyState, MotionQuery, MotionResult, RaySeparation, RaySeparationHit, SweepContact,
    SweepParams,
};
pub use schedule::{PhysicsSchedule, PhysicsSet};
pub use slide::{STOP_ON_SLOPE_THRESHOLD, SlideParams};
pub use space::{
    BodyDesc, BodyMode, Collider2d, Collider3d, FrameClock, SeparationRay, Shape, ShapeSpace,
    SpaceDimension,
};
pub use state::MotionState;
pub use strider_config::PlatformVelocityOnLeave;
pub use systems::{
    CharacterMotion, FixedTick, character_motion_system, physics_step_end_system,
    physics_step_system, sync_to_physics_system,
};

#[cfg(test)]
mod scenario3d_tests;
