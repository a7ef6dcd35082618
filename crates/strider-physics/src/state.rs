//! Per-body contact state rebuilt by every slide call.

use strider_math::{Dimension, MotionVector};

use crate::collision::{CollisionRecord, ContactKind};
use crate::handle::BodyHandle;

/// Floor/wall/ceiling flags, floor details and the ordered contact list of
/// the most recent slide call.
///
/// The flags and floor fields persist between calls until the next slide
/// resets them. `colliders` lives for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState<D: Dimension> {
    pub(crate) on_floor: bool,
    pub(crate) on_wall: bool,
    pub(crate) on_ceiling: bool,
    pub(crate) floor_normal: D::Vector,
    pub(crate) floor_body: Option<BodyHandle>,
    pub(crate) floor_velocity: D::Vector,
    pub(crate) colliders: Vec<CollisionRecord<D>>,
}

impl<D: Dimension> Default for MotionState<D> {
    fn default() -> Self {
        Self {
            on_floor: false,
            on_wall: false,
            on_ceiling: false,
            floor_normal: D::Vector::ZERO,
            floor_body: None,
            floor_velocity: D::Vector::ZERO,
            colliders: Vec::new(),
        }
    }
}

impl<D: Dimension> MotionState<D> {
    /// Clears everything a slide call recomputes.
    pub(crate) fn reset(&mut self) {
        self.on_floor = false;
        self.on_wall = false;
        self.on_ceiling = false;
        self.floor_normal = D::Vector::ZERO;
        self.floor_body = None;
        self.floor_velocity = D::Vector::ZERO;
        self.colliders.clear();
    }

    /// Applies the classification of `record` to the flags. Floor contacts
    /// also take over the floor normal, body and velocity.
    pub(crate) fn classify(
        &mut self,
        record: &CollisionRecord<D>,
        up: D::Vector,
        floor_max_angle: f32,
    ) -> ContactKind {
        let kind = record.kind(up, floor_max_angle);
        match kind {
            ContactKind::Floor => self.set_floor(record),
            ContactKind::Ceiling => self.on_ceiling = true,
            ContactKind::Wall => self.on_wall = true,
        }
        kind
    }

    /// Like [`Self::classify`], but only a floor contact changes the state.
    pub(crate) fn classify_floor_only(
        &mut self,
        record: &CollisionRecord<D>,
        up: D::Vector,
        floor_max_angle: f32,
    ) -> ContactKind {
        let kind = record.kind(up, floor_max_angle);
        if kind == ContactKind::Floor {
            self.set_floor(record);
        }
        kind
    }

    fn set_floor(&mut self, record: &CollisionRecord<D>) {
        self.on_floor = true;
        self.floor_normal = record.normal();
        self.floor_body = Some(record.collider());
        self.floor_velocity = record.collider_velocity();
    }

    /// Appends `record` in arrival order and classifies it.
    pub(crate) fn push(
        &mut self,
        record: CollisionRecord<D>,
        up: D::Vector,
        floor_max_angle: f32,
    ) -> ContactKind {
        let kind = self.classify(&record, up, floor_max_angle);
        self.colliders.push(record);
        kind
    }

    pub fn is_on_floor(&self) -> bool {
        self.on_floor
    }

    pub fn is_on_wall(&self) -> bool {
        self.on_wall
    }

    pub fn is_on_ceiling(&self) -> bool {
        self.on_ceiling
    }

    /// Normal of the last floor contact; zero when not on a floor.
    pub fn floor_normal(&self) -> D::Vector {
        self.floor_normal
    }

    pub fn floor_body(&self) -> Option<BodyHandle> {
        self.floor_body
    }

    /// Velocity of the floor at the last floor contact point.
    pub fn floor_velocity(&self) -> D::Vector {
        self.floor_velocity
    }

    pub fn slide_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn slide_collision(&self, index: usize) -> Option<&CollisionRecord<D>> {
        self.colliders.get(index)
    }

    pub fn last_slide_collision(&self) -> Option<&CollisionRecord<D>> {
        self.colliders.last()
    }

    pub fn colliders(&self) -> &[CollisionRecord<D>] {
        &self.colliders
    }
}
