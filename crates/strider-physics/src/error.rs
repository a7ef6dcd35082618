//! Error types for motion queries and the kinematic resolver.

use crate::handle::BodyHandle;

/// Failures reported by a [`MotionQuery`](crate::MotionQuery) implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The body exists but is not currently part of a space.
    #[error("body {0:?} is not in a physics space")]
    BodyNotInSpace(BodyHandle),

    /// The handle does not name a live body (removed or never created).
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
}

/// Failures of the kinematic motion resolver.
///
/// None of these are fatal: motion calls degrade to a neutral answer and log
/// the condition once per body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MotionError {
    /// The body has not entered a physics world.
    #[error("body {0:?} is not in a physics world")]
    NotInWorld(BodyHandle),

    /// The physics world rejected a query for the body.
    #[error("physics world unavailable for body {0:?}")]
    WorldUnavailable(BodyHandle),

    /// A caller-supplied value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A direct motion call was made while sync-to-physics is enabled.
    #[error("move_and_slide and move_and_collide do not work with sync-to-physics enabled")]
    SyncMisuse,
}
