//! The contract the kinematic resolver consumes from a physics world.
//!
//! The resolver never inspects shapes. Everything it knows about the world
//! comes through [`MotionQuery`]: a margin-inflated shape sweep, separation-ray
//! separation, and direct body-state lookup, plus the two writes it needs
//! (committing its own transform and pushing a state transform in
//! sync-to-physics mode).

use rustc_hash::FxHashSet;
use strider_math::{BodyTransform, Dimension};

use crate::error::QueryError;
use crate::handle::BodyHandle;

/// Options for one [`MotionQuery::sweep`].
#[derive(Debug, Clone, Copy)]
pub struct SweepParams<'a> {
    /// Ignore rigid (dynamic) bodies, treating the mover as immovable by them.
    pub infinite_inertia: bool,
    /// Symmetric inflation of the swept volume.
    pub margin: f32,
    /// Skip the mover's separation rays when gathering the contact.
    pub exclude_raycast_shapes: bool,
    /// Bodies the sweep must ignore.
    pub exclude: &'a FxHashSet<BodyHandle>,
}

/// Contact descriptor of a colliding sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepContact<D: Dimension> {
    pub point: D::Vector,
    /// Unit normal pointing from the collider toward the mover.
    pub normal: D::Vector,
    /// Penetration of the margin-inflated mover at the unsafe position.
    pub depth: f32,
    pub collider: BodyHandle,
    /// Scene-side identity of the collider.
    pub collider_id: u64,
    pub collider_shape: usize,
    pub local_shape: usize,
    /// Velocity of the collider at the contact point.
    pub collider_velocity: D::Vector,
    /// Largest fraction of the motion that stays clear of the margin band.
    pub safe_fraction: f32,
    /// First fraction at which contact is made.
    pub unsafe_fraction: f32,
}

/// Outcome of a sweep: the translation actually achievable (including any
/// depenetration applied at the start), what is left over, and the contact
/// when the sweep collided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionResult<D: Dimension> {
    pub travel: D::Vector,
    pub remainder: D::Vector,
    pub contact: Option<SweepContact<D>>,
}

impl<D: Dimension> MotionResult<D> {
    pub fn is_colliding(&self) -> bool {
        self.contact.is_some()
    }
}

/// One separation ray pushed out of geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySeparationHit<D: Dimension> {
    pub point: D::Vector,
    pub normal: D::Vector,
    pub depth: f32,
    pub collider: BodyHandle,
    pub collider_id: u64,
    pub collider_shape: usize,
    pub local_shape: usize,
    pub collider_velocity: D::Vector,
}

/// Result of [`MotionQuery::ray_separate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RaySeparation<D: Dimension> {
    /// Accumulated translation that pushes the rays out of geometry.
    pub recover: D::Vector,
    pub hits: Vec<RaySeparationHit<D>>,
}

/// Snapshot of a body as the physics world sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectBodyState<D: Dimension> {
    pub transform: D::Transform,
    pub linear_velocity: D::Vector,
    pub angular_velocity: D::Angular,
}

impl<D: Dimension> DirectBodyState<D> {
    /// Velocity of the point at offset `local` from the body origin
    /// (world-aligned offset).
    pub fn velocity_at_local_point(&self, local: D::Vector) -> D::Vector {
        D::point_velocity(self.linear_velocity, self.angular_velocity, local)
    }

    pub fn origin(&self) -> D::Vector {
        self.transform.origin()
    }
}

/// Physics-world operations used by [`KinematicBody`](crate::KinematicBody).
///
/// Queries are synchronous and take `&self`; the resolver assumes nothing
/// else mutates the body while a motion call is running.
pub trait MotionQuery<D: Dimension> {
    /// Shape-casts `body` from `from` along `motion`.
    fn sweep(
        &self,
        body: BodyHandle,
        from: &D::Transform,
        motion: D::Vector,
        params: &SweepParams<'_>,
    ) -> Result<MotionResult<D>, QueryError>;

    /// Pushes the body's separation rays out of penetrating geometry.
    fn ray_separate(
        &self,
        body: BodyHandle,
        from: &D::Transform,
        infinite_inertia: bool,
        max_results: usize,
        margin: f32,
    ) -> Result<RaySeparation<D>, QueryError>;

    /// Current state of `body`, or `None` if it no longer exists.
    fn direct_state(&self, body: BodyHandle) -> Option<DirectBodyState<D>>;

    /// Physics step length while a step is running, frame length otherwise.
    fn delta_time(&self) -> f32;

    /// Writes the resolver's transform for `body` into the world immediately.
    fn commit_transform(
        &mut self,
        body: BodyHandle,
        transform: &D::Transform,
    ) -> Result<(), QueryError>;

    /// Requests that `body` reach `transform` on the next physics step.
    fn queue_state_transform(
        &mut self,
        body: BodyHandle,
        transform: &D::Transform,
    ) -> Result<(), QueryError>;

    /// Registers or removes `body` as a receiver of per-step state updates.
    fn set_state_observer(&mut self, body: BodyHandle, enabled: bool) -> Result<(), QueryError>;
}
