//! Iterated sliding with floor/wall/ceiling tracking, stop-on-slope, floor
//! snapping and moving-platform carry.

use std::f32::consts::FRAC_PI_4;

use rustc_hash::FxHashSet;
use strider_config::{MotionConfig, PlatformVelocityOnLeave};
use strider_math::{BodyTransform, Dimension, MotionVector};

use crate::collision::ContactKind;
use crate::kinematic_body::KinematicBody;
use crate::query::MotionQuery;

/// Velocity direction counts as straight down when `|dir + up|` is below this.
pub const STOP_ON_SLOPE_THRESHOLD: f32 = 0.01;

/// Per-call options of [`KinematicBody::move_and_slide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideParams<D: Dimension> {
    /// Up direction for floor/wall/ceiling classification. Zero makes every
    /// contact a wall.
    pub up: D::Vector,
    /// Hold the body on floors instead of sliding down them.
    pub stop_on_slope: bool,
    /// Slide iteration cap.
    pub max_slides: u32,
    /// Steepest floor, in radians from `up`.
    pub floor_max_angle: f32,
    /// Treat rigid bodies as immovable.
    pub infinite_inertia: bool,
}

impl<D: Dimension> Default for SlideParams<D> {
    fn default() -> Self {
        Self {
            up: D::Vector::ZERO,
            stop_on_slope: false,
            max_slides: 4,
            floor_max_angle: FRAC_PI_4,
            infinite_inertia: true,
        }
    }
}

impl<D: Dimension> SlideParams<D> {
    /// Parameters from the motion config, with the caller's `up`.
    pub fn from_config(config: &MotionConfig, up: D::Vector) -> Self {
        Self {
            up,
            stop_on_slope: config.stop_on_slope,
            max_slides: config.max_slides,
            floor_max_angle: config.floor_max_angle(),
            infinite_inertia: config.infinite_inertia,
        }
    }

    pub fn with_up(mut self, up: D::Vector) -> Self {
        self.up = up;
        self
    }

    pub fn with_stop_on_slope(mut self, stop_on_slope: bool) -> Self {
        self.stop_on_slope = stop_on_slope;
        self
    }

    pub fn with_max_slides(mut self, max_slides: u32) -> Self {
        self.max_slides = max_slides;
        self
    }

    pub fn with_floor_max_angle(mut self, floor_max_angle: f32) -> Self {
        self.floor_max_angle = floor_max_angle;
        self
    }

    pub fn with_infinite_inertia(mut self, infinite_inertia: bool) -> Self {
        self.infinite_inertia = infinite_inertia;
        self
    }
}

impl<D: Dimension> KinematicBody<D> {
    /// Moves the body by `velocity * dt`, sliding along whatever it hits.
    ///
    /// Returns the velocity left after sliding (plus the platform velocity
    /// when the body just left a moving floor). A body that is not in a
    /// world returns `velocity` unchanged.
    pub fn move_and_slide<W: MotionQuery<D>>(
        &mut self,
        world: &mut W,
        velocity: D::Vector,
        params: &SlideParams<D>,
    ) -> D::Vector {
        self.move_and_slide_with_snap(world, velocity, D::Vector::ZERO, params)
    }

    /// [`Self::move_and_slide`], then re-attaches the body to a floor it just
    /// left by probing along `snap`.
    pub fn move_and_slide_with_snap<W: MotionQuery<D>>(
        &mut self,
        world: &mut W,
        velocity: D::Vector,
        snap: D::Vector,
        params: &SlideParams<D>,
    ) -> D::Vector {
        if self.ensure_in_world().is_err() {
            return velocity;
        }
        let residual = self.slide(&*world, velocity, snap, params);
        self.commit(world);
        residual
    }

    fn slide<W: MotionQuery<D>>(
        &mut self,
        world: &W,
        velocity: D::Vector,
        snap: D::Vector,
        params: &SlideParams<D>,
    ) -> D::Vector {
        self.check_sync_misuse();

        let up = params.up.normalize_or_zero();
        let floor_max_angle = params.floor_max_angle;
        let mut body_velocity = self.axis_lock.apply(velocity);
        let body_velocity_normal = body_velocity.normalize_or_zero();
        let was_on_floor = self.state.on_floor;

        // Platform velocity, sampled where the body stands.
        let mut current_floor_velocity = self.state.floor_velocity;
        let mut prev_floor_body = self.state.floor_body;
        if self.state.on_floor
            && let Some(floor) = prev_floor_body
        {
            match world.direct_state(floor) {
                Some(floor_state) => {
                    let local = self.transform.origin() - floor_state.origin();
                    current_floor_velocity = floor_state.velocity_at_local_point(local);
                }
                None => {
                    tracing::debug!(body = ?self.handle, floor = ?floor, "floor body is gone");
                    current_floor_velocity = D::Vector::ZERO;
                    prev_floor_body = None;
                }
            }
        }

        self.state.reset();
        let delta = world.delta_time();

        if !current_floor_velocity.is_zero()
            && let Some(floor) = prev_floor_body
        {
            let mut exclude = FxHashSet::default();
            exclude.insert(floor);
            if let Some(record) = self.collide(
                world,
                current_floor_velocity * delta,
                params.infinite_inertia,
                true,
                false,
                false,
                &exclude,
            ) {
                self.state.push(record, up, floor_max_angle);
            }
        }

        let mut motion = body_velocity * delta;
        let mut sliding_enabled = !params.stop_on_slope;
        let no_exclusions = FxHashSet::default();

        for _ in 0..params.max_slides {
            let mut found_collision = false;

            for pass in 0..2 {
                let record = if pass == 0 {
                    let record = self.collide(
                        world,
                        motion,
                        params.infinite_inertia,
                        true,
                        false,
                        !sliding_enabled,
                        &no_exclusions,
                    );
                    if record.is_none() {
                        // Motion completed.
                        motion = D::Vector::ZERO;
                    }
                    record
                } else {
                    self.separate_raycast_shapes(world, params.infinite_inertia)
                        .map(|record| record.with_motion(D::Vector::ZERO, motion))
                };

                if let Some(record) = record {
                    found_collision = true;
                    motion = record.remainder();
                    let normal = record.normal();
                    let travel = record.travel();
                    self.state.push(record, up, floor_max_angle);

                    if self.state.on_floor
                        && params.stop_on_slope
                        && (body_velocity_normal + up).length() < STOP_ON_SLOPE_THRESHOLD
                    {
                        let undo = if travel.length() > self.margin {
                            travel.slide(up)
                        } else {
                            travel
                        };
                        self.transform.set_origin(self.transform.origin() - undo);
                        tracing::trace!(body = ?self.handle, "held on slope");
                        return D::Vector::ZERO;
                    }

                    if sliding_enabled || !self.state.on_floor {
                        motion = motion.slide(normal);
                        body_velocity = self.axis_lock.apply(body_velocity.slide(normal));
                    }
                }

                sliding_enabled = true;
            }

            if !found_collision || motion.is_zero() {
                break;
            }
        }

        if was_on_floor && !snap.is_zero() && !self.state.on_floor && !up.is_zero() {
            self.snap_to_floor(world, snap, up, params);
        }

        if self.platform_on_leave != PlatformVelocityOnLeave::Never && !self.state.on_floor {
            let mut carried = current_floor_velocity;
            if self.platform_on_leave == PlatformVelocityOnLeave::UpwardOnly
                && carried.dot(up) < 0.0
            {
                carried = carried.slide(up);
            }
            return body_velocity + carried;
        }

        body_velocity
    }

    /// Tests a move along `snap` and, when a floor is within reach, attaches to it.
    fn snap_to_floor<W: MotionQuery<D>>(
        &mut self,
        world: &W,
        snap: D::Vector,
        up: D::Vector,
        params: &SlideParams<D>,
    ) {
        let no_exclusions = FxHashSet::default();
        let Some(record) = self.collide(
            world,
            snap,
            params.infinite_inertia,
            false,
            true,
            false,
            &no_exclusions,
        ) else {
            return;
        };

        if self.state.classify_floor_only(&record, up, params.floor_max_angle) != ContactKind::Floor {
            return;
        }

        let mut travel = record.travel();
        if params.stop_on_slope {
            // Only move along up; the snap move's depenetration may have strayed sideways.
            travel = if travel.length() > self.margin {
                up * up.dot(travel)
            } else {
                D::Vector::ZERO
            };
        }
        let applied = self.axis_lock.apply(travel);
        self.transform.set_origin(self.transform.origin() + applied);
        tracing::trace!(body = ?self.handle, travel = ?applied, "snapped to floor");
    }
}
