//! Collision records produced by the single-step mover and contact
//! classification against an up direction.

use strider_math::{Dimension, MotionVector};

use crate::handle::BodyHandle;
use crate::query::{RaySeparationHit, SweepContact};

/// Added to the floor angle limit so canonical angles such as 45° do not sit
/// on a precision fence.
pub const FLOOR_ANGLE_THRESHOLD: f32 = 0.01;

/// One contact produced by a sweep. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionRecord<D: Dimension> {
    pub(crate) collider: BodyHandle,
    pub(crate) collider_id: u64,
    pub(crate) collider_shape: usize,
    pub(crate) local_shape: usize,
    pub(crate) point: D::Vector,
    pub(crate) normal: D::Vector,
    pub(crate) travel: D::Vector,
    pub(crate) remainder: D::Vector,
    pub(crate) collider_velocity: D::Vector,
    pub(crate) safe_fraction: f32,
    pub(crate) unsafe_fraction: f32,
    pub(crate) depth: f32,
}

impl<D: Dimension> CollisionRecord<D> {
    pub(crate) fn from_sweep(
        contact: &SweepContact<D>,
        travel: D::Vector,
        remainder: D::Vector,
    ) -> Self {
        Self {
            collider: contact.collider,
            collider_id: contact.collider_id,
            collider_shape: contact.collider_shape,
            local_shape: contact.local_shape,
            point: contact.point,
            normal: contact.normal,
            travel,
            remainder,
            collider_velocity: contact.collider_velocity,
            safe_fraction: contact.safe_fraction.clamp(0.0, 1.0),
            unsafe_fraction: contact.unsafe_fraction.clamp(contact.safe_fraction.clamp(0.0, 1.0), 1.0),
            depth: contact.depth.max(0.0),
        }
    }

    /// Record for a separation-ray separation. The body was pushed by `recover`
    /// and did not consume any of its motion.
    pub(crate) fn from_ray_hit(hit: &RaySeparationHit<D>, recover: D::Vector) -> Self {
        Self {
            collider: hit.collider,
            collider_id: hit.collider_id,
            collider_shape: hit.collider_shape,
            local_shape: hit.local_shape,
            point: hit.point,
            normal: hit.normal,
            travel: recover,
            remainder: D::Vector::ZERO,
            collider_velocity: hit.collider_velocity,
            safe_fraction: 0.0,
            unsafe_fraction: 0.0,
            depth: hit.depth.max(0.0),
        }
    }

    /// Copy with `travel` and `remainder` replaced.
    pub(crate) fn with_motion(mut self, travel: D::Vector, remainder: D::Vector) -> Self {
        self.travel = travel;
        self.remainder = remainder;
        self
    }

    pub fn collider(&self) -> BodyHandle {
        self.collider
    }

    pub fn collider_id(&self) -> u64 {
        self.collider_id
    }

    pub fn collider_shape(&self) -> usize {
        self.collider_shape
    }

    pub fn local_shape(&self) -> usize {
        self.local_shape
    }

    pub fn point(&self) -> D::Vector {
        self.point
    }

    /// Unit normal pointing from the collider toward the moving body.
    pub fn normal(&self) -> D::Vector {
        self.normal
    }

    /// Translation actually applied.
    pub fn travel(&self) -> D::Vector {
        self.travel
    }

    /// Motion left unconsumed. `travel + remainder` is the requested motion.
    pub fn remainder(&self) -> D::Vector {
        self.remainder
    }

    pub fn collider_velocity(&self) -> D::Vector {
        self.collider_velocity
    }

    pub fn safe_fraction(&self) -> f32 {
        self.safe_fraction
    }

    pub fn unsafe_fraction(&self) -> f32 {
        self.unsafe_fraction
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// True when the contact stopped the motion short of completion.
    /// A resting contact found after a full motion is not blocking.
    pub fn is_blocking(&self) -> bool {
        self.safe_fraction < 1.0
    }

    /// Angle in radians between the contact normal and `up`.
    pub fn angle(&self, up: D::Vector) -> f32 {
        self.normal.angle_to(up.normalize_or_zero())
    }

    /// Classifies this contact against `up`.
    pub fn kind(&self, up: D::Vector, floor_max_angle: f32) -> ContactKind {
        ContactKind::classify(self.normal, up, floor_max_angle)
    }
}

/// Floor / wall / ceiling classification of one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Floor,
    Wall,
    Ceiling,
}

impl ContactKind {
    /// Classifies a contact `normal` against the unit `up` direction.
    ///
    /// A zero `up` makes every contact a wall. Floor is tested before
    /// ceiling, so one contact never yields both.
    pub fn classify<V: MotionVector>(normal: V, up: V, floor_max_angle: f32) -> ContactKind {
        if up.is_zero() {
            return ContactKind::Wall;
        }
        let limit = floor_max_angle + FLOOR_ANGLE_THRESHOLD;
        if normal.angle_to(up) <= limit {
            ContactKind::Floor
        } else if normal.angle_to(-up) <= limit {
            ContactKind::Ceiling
        } else {
            ContactKind::Wall
        }
    }
}
