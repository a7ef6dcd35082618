//! Sync-to-physics: the physics world owns the transform and the body
//! follows it once per step.
//!
//! While enabled, external transform writes are forwarded to the world as
//! state updates and the visible transform snaps back to the last state the
//! world reported. The direct motion calls warn in this mode.

use strider_math::Dimension;

use crate::error::MotionError;
use crate::kinematic_body::KinematicBody;
use crate::query::MotionQuery;

impl<D: Dimension> KinematicBody<D> {
    /// Enables or disables sync-to-physics, registering the body as a state
    /// observer of `world` when it is already in one.
    pub fn set_sync_to_physics<W: MotionQuery<D>>(
        &mut self,
        world: &mut W,
        enabled: bool,
    ) -> Result<(), MotionError> {
        if self.sync_to_physics == enabled {
            return Ok(());
        }
        if self.in_world {
            world
                .set_state_observer(self.handle, enabled)
                .map_err(|err| self.query_failed(err))?;
        }
        self.sync_to_physics = enabled;
        if enabled {
            self.last_valid_transform = self.transform;
        } else {
            self.clear_sync_misuse();
        }
        tracing::debug!(body = ?self.handle, enabled, "sync to physics changed");
        Ok(())
    }

    /// Delivers the transform the world reached this step. Ignored unless
    /// sync-to-physics is enabled.
    pub fn on_physics_state(&mut self, transform: D::Transform) {
        if !self.sync_to_physics {
            return;
        }
        self.last_valid_transform = transform;
        self.transform = transform;
    }

    /// Sets the body transform from outside the resolver.
    ///
    /// With sync-to-physics enabled the transform is queued as a state
    /// update and the visible transform stays at the last valid one until
    /// the world reports back. Otherwise it is applied and committed.
    pub fn set_global_transform<W: MotionQuery<D>>(
        &mut self,
        world: &mut W,
        transform: D::Transform,
    ) -> Result<(), MotionError> {
        if self.sync_to_physics && self.in_world {
            world
                .queue_state_transform(self.handle, &transform)
                .map_err(|err| self.query_failed(err))?;
            self.transform = self.last_valid_transform;
            return Ok(());
        }
        self.transform = transform;
        if self.in_world {
            world
                .commit_transform(self.handle, &self.transform)
                .map_err(|err| self.query_failed(err))?;
        }
        Ok(())
    }
}
