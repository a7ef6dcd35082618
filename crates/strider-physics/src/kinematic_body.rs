//! The character-controlled body: owned transform, motion settings and the
//! per-body contact state. Motion operations live in `mover`, `slide` and
//! `sync`.

use std::sync::atomic::{AtomicU8, Ordering};

use bevy_ecs::prelude::*;
use strider_config::{MotionConfig, PlatformVelocityOnLeave};
use strider_math::{AxisMask, BodyAxis, BodyTransform, Dimension, MotionVector};

use crate::collision::CollisionRecord;
use crate::error::{MotionError, QueryError};
use crate::handle::BodyHandle;
use crate::query::MotionQuery;
use crate::state::MotionState;

/// Default safety margin for sweeps.
pub const DEFAULT_SAFE_MARGIN: f32 = 0.08;

// --- One-shot warnings ---

const WARN_NOT_IN_WORLD: u8 = 1 << 0;
const WARN_WORLD_UNAVAILABLE: u8 = 1 << 1;
const WARN_SYNC_MISUSE: u8 = 1 << 2;

/// Per-body set of conditions already reported.
///
/// Atomic so read-only queries such as `test_move` can still report.
#[derive(Default)]
pub(crate) struct WarnOnce(AtomicU8);

impl WarnOnce {
    /// Returns true the first time `flag` is raised since it was last cleared.
    fn raise(&self, flag: u8) -> bool {
        self.0.fetch_or(flag, Ordering::Relaxed) & flag == 0
    }

    fn clear(&self, flag: u8) {
        self.0.fetch_and(!flag, Ordering::Relaxed);
    }
}

impl Clone for WarnOnce {
    fn clone(&self) -> Self {
        Self(AtomicU8::new(self.0.load(Ordering::Relaxed)))
    }
}

impl std::fmt::Debug for WarnOnce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WarnOnce({:#05b})", self.0.load(Ordering::Relaxed))
    }
}

// --- Body ---

/// A body moved by the resolver rather than by the solver.
///
/// The physics world owns the body record addressed by [`BodyHandle`]; this
/// component owns the transform between motion calls and commits it back
/// on exit.
#[derive(Component, Debug, Clone)]
pub struct KinematicBody<D: Dimension> {
    pub(crate) handle: BodyHandle,
    pub(crate) transform: D::Transform,
    pub(crate) margin: f32,
    pub(crate) axis_lock: AxisMask,
    pub(crate) state: MotionState<D>,
    pub(crate) platform_on_leave: PlatformVelocityOnLeave,
    pub(crate) sync_to_physics: bool,
    pub(crate) last_valid_transform: D::Transform,
    pub(crate) in_world: bool,
    warnings: WarnOnce,
}

impl<D: Dimension> KinematicBody<D> {
    pub fn new(handle: BodyHandle, transform: D::Transform) -> Self {
        Self {
            handle,
            transform,
            margin: DEFAULT_SAFE_MARGIN,
            axis_lock: AxisMask::NONE,
            state: MotionState::default(),
            platform_on_leave: PlatformVelocityOnLeave::Always,
            sync_to_physics: false,
            last_valid_transform: transform,
            in_world: false,
            warnings: WarnOnce::default(),
        }
    }

    /// Body with margin and platform behaviour taken from `config`.
    ///
    /// `config.sync_to_physics` is applied by [`Self::enter_world`], which
    /// is where the state observer gets registered.
    pub fn from_config(handle: BodyHandle, transform: D::Transform, config: &MotionConfig) -> Self {
        let mut body = Self::new(handle, transform);
        if config.safe_margin > 0.0 && config.safe_margin.is_finite() {
            body.margin = config.safe_margin;
        }
        body.platform_on_leave = config.platform_on_leave;
        body.sync_to_physics = config.sync_to_physics;
        body
    }

    // --- Lifecycle ---

    /// Attaches the body to `world`: captures the last valid transform,
    /// clears the contact state and writes the transform through.
    pub fn enter_world<W: MotionQuery<D>>(&mut self, world: &mut W) -> Result<(), MotionError> {
        world
            .commit_transform(self.handle, &self.transform)
            .map_err(|err| self.query_failed(err))?;
        if self.sync_to_physics {
            world
                .set_state_observer(self.handle, true)
                .map_err(|err| self.query_failed(err))?;
        }
        self.in_world = true;
        self.last_valid_transform = self.transform;
        self.state.reset();
        self.warnings.clear(WARN_NOT_IN_WORLD | WARN_WORLD_UNAVAILABLE);
        tracing::debug!(body = ?self.handle, sync = self.sync_to_physics, "kinematic body entered world");
        Ok(())
    }

    /// Detaches the body. Motion calls report [`MotionError::NotInWorld`]
    /// until the next [`Self::enter_world`].
    pub fn exit_world<W: MotionQuery<D>>(&mut self, world: &mut W) {
        if self.in_world
            && self.sync_to_physics
            && let Err(err) = world.set_state_observer(self.handle, false)
        {
            tracing::debug!(body = ?self.handle, %err, "state observer already gone");
        }
        self.in_world = false;
        tracing::debug!(body = ?self.handle, "kinematic body exited world");
    }

    pub fn is_in_world(&self) -> bool {
        self.in_world
    }

    // --- Accessors ---

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Resolver-owned transform.
    pub fn transform(&self) -> &D::Transform {
        &self.transform
    }

    pub fn origin(&self) -> D::Vector {
        self.transform.origin()
    }

    pub fn safe_margin(&self) -> f32 {
        self.margin
    }

    /// Sets the sweep margin. Rejects non-positive or non-finite values and
    /// keeps the previous margin.
    pub fn set_safe_margin(&mut self, margin: f32) -> Result<(), MotionError> {
        if !(margin > 0.0 && margin.is_finite()) {
            let err = MotionError::InvalidArgument("safe margin must be positive and finite");
            tracing::warn!(body = ?self.handle, margin, "{err}");
            return Err(err);
        }
        self.margin = margin;
        Ok(())
    }

    pub fn axis_lock(&self) -> AxisMask {
        self.axis_lock
    }

    pub fn set_axis_lock(&mut self, axis: BodyAxis, locked: bool) {
        self.axis_lock.set(axis, locked);
    }

    pub fn is_axis_locked(&self, axis: BodyAxis) -> bool {
        self.axis_lock.is_locked(axis)
    }

    pub fn moving_platform_apply_velocity_on_leave(&self) -> PlatformVelocityOnLeave {
        self.platform_on_leave
    }

    pub fn set_moving_platform_apply_velocity_on_leave(&mut self, mode: PlatformVelocityOnLeave) {
        self.platform_on_leave = mode;
    }

    pub fn is_sync_to_physics(&self) -> bool {
        self.sync_to_physics
    }

    /// Last transform received from the physics world in sync mode.
    pub fn last_valid_transform(&self) -> &D::Transform {
        &self.last_valid_transform
    }

    // --- Contact state ---

    pub fn state(&self) -> &MotionState<D> {
        &self.state
    }

    pub fn is_on_floor(&self) -> bool {
        self.state.is_on_floor()
    }

    pub fn is_on_wall(&self) -> bool {
        self.state.is_on_wall()
    }

    pub fn is_on_ceiling(&self) -> bool {
        self.state.is_on_ceiling()
    }

    pub fn floor_normal(&self) -> D::Vector {
        self.state.floor_normal()
    }

    /// Angle in radians between the floor normal and `up`.
    pub fn floor_angle(&self, up: D::Vector) -> Result<f32, MotionError> {
        let up = up.normalize_or_zero();
        if up.is_zero() {
            let err = MotionError::InvalidArgument("up direction must be non-zero");
            tracing::warn!(body = ?self.handle, "{err}");
            return Err(err);
        }
        Ok(self.state.floor_normal().angle_to(up))
    }

    pub fn floor_velocity(&self) -> D::Vector {
        self.state.floor_velocity()
    }

    pub fn floor_body(&self) -> Option<BodyHandle> {
        self.state.floor_body()
    }

    pub fn slide_count(&self) -> usize {
        self.state.slide_count()
    }

    pub fn slide_collision(&self, index: usize) -> Option<&CollisionRecord<D>> {
        self.state.slide_collision(index)
    }

    pub fn last_slide_collision(&self) -> Option<&CollisionRecord<D>> {
        self.state.last_slide_collision()
    }

    // --- Reporting ---

    /// Checks that the body can query a world, reporting once if not.
    pub(crate) fn ensure_in_world(&self) -> Result<(), MotionError> {
        if self.in_world {
            return Ok(());
        }
        let err = MotionError::NotInWorld(self.handle);
        if self.warnings.raise(WARN_NOT_IN_WORLD) {
            tracing::warn!(body = ?self.handle, "{err}");
        }
        Err(err)
    }

    /// Maps a query failure to [`MotionError::WorldUnavailable`], reporting once.
    pub(crate) fn query_failed(&self, err: QueryError) -> MotionError {
        if self.warnings.raise(WARN_WORLD_UNAVAILABLE) {
            tracing::warn!(body = ?self.handle, cause = %err, "physics world query failed");
        } else {
            tracing::trace!(body = ?self.handle, cause = %err, "physics world query failed");
        }
        MotionError::WorldUnavailable(self.handle)
    }

    pub(crate) fn query_succeeded(&self) {
        self.warnings.clear(WARN_WORLD_UNAVAILABLE);
    }

    /// Reports a direct motion call made in sync mode, once until sync is disabled.
    pub(crate) fn check_sync_misuse(&self) {
        if self.sync_to_physics && self.warnings.raise(WARN_SYNC_MISUSE) {
            tracing::warn!(body = ?self.handle, "{}", MotionError::SyncMisuse);
        }
    }

    pub(crate) fn clear_sync_misuse(&self) {
        self.warnings.clear(WARN_SYNC_MISUSE);
    }

    /// Writes the resolver transform into the world.
    pub(crate) fn commit<W: MotionQuery<D>>(&self, world: &mut W) {
        if let Err(err) = world.commit_transform(self.handle, &self.transform) {
            self.query_failed(err);
        }
    }
}
