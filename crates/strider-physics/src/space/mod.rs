//! In-repo physics space implementing [`MotionQuery`].
//!
//! [`ShapeSpace`] is a small arena of bodies with convex colliders. The
//! narrow phase (contacts, shape casts, ray casts) runs on parry; this module
//! keeps the arena, the margin and fraction bookkeeping of a sweep, and the
//! step that integrates kinematic velocities.

mod body;
mod clock;
mod geometry;
mod shape;
mod sweep;

use std::sync::atomic::{AtomicUsize, Ordering};

use bevy_ecs::prelude::*;
use rustc_hash::FxHashSet;
use strider_math::{BodyTransform, MotionVector};

use crate::error::QueryError;
use crate::handle::BodyHandle;
use crate::query::{
    DirectBodyState, MotionQuery, MotionResult, RaySeparation, RaySeparationHit, SweepContact,
    SweepParams,
};

pub use body::{BodyDesc, BodyMode};
pub use clock::FrameClock;
pub use geometry::{Collider2d, Collider3d, SpaceDimension};
pub use shape::{SeparationRay, Shape};

use body::Body;
use sweep::{CAST_EPSILON, ColliderRef, RestContact};

struct Slot<D: SpaceDimension> {
    generation: u32,
    body: Option<Body<D>>,
}

/// Arena of bodies addressed by generational [`BodyHandle`]s.
///
/// Insert as a resource; motion systems borrow it mutably for the final
/// transform commit and immutably for queries.
#[derive(Resource)]
pub struct ShapeSpace<D: SpaceDimension> {
    slots: Vec<Slot<D>>,
    free: Vec<u32>,
    clock: FrameClock,
    notifications: Vec<(BodyHandle, D::Transform)>,
    sweeps: AtomicUsize,
    ray_queries: AtomicUsize,
}

impl<D: SpaceDimension> ShapeSpace<D> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            clock: FrameClock::default(),
            notifications: Vec::new(),
            sweeps: AtomicUsize::new(0),
            ray_queries: AtomicUsize::new(0),
        }
    }

    pub fn add_body(&mut self, desc: BodyDesc<D>) -> BodyHandle {
        let body = Body::new(desc);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle::new(index, 0)
    }

    /// Removes a body. Its handle stops resolving. Returns false for stale handles.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if slot.generation != handle.generation() || slot.body.is_none() {
            return false;
        }
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index() as u32);
        true
    }

    /// Takes a body out of (or back into) the space without destroying it.
    pub fn set_body_enabled(&mut self, handle: BodyHandle, enabled: bool) -> Result<(), QueryError> {
        self.body_mut(handle)?.enabled = enabled;
        Ok(())
    }

    pub fn set_velocity(
        &mut self,
        handle: BodyHandle,
        linear: D::Vector,
        angular: D::Angular,
    ) -> Result<(), QueryError> {
        let body = self.body_mut(handle)?;
        body.desc.linear_velocity = linear;
        body.desc.angular_velocity = angular;
        Ok(())
    }

    pub fn body_transform(&self, handle: BodyHandle) -> Option<D::Transform> {
        self.body(handle).ok().map(|body| body.desc.transform)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_ok()
    }

    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.body.is_some()).count()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// Starts a physics step of length `dt`: applies pending state
    /// transforms, integrates velocities and queues a state notification
    /// for every observed body. Motion calls made until [`Self::end_step`]
    /// use `dt` as their delta time.
    pub fn step(&mut self, dt: f32) {
        self.clock.begin_physics_step(dt);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            if !body.enabled {
                continue;
            }
            body.integrate(dt);
            if body.observed {
                let handle = BodyHandle::new(index as u32, slot.generation);
                self.notifications.push((handle, body.desc.transform));
            }
        }
        tracing::trace!(
            dt,
            bodies = self.slots.len(),
            notifications = self.notifications.len(),
            "space stepped"
        );
    }

    pub fn end_step(&mut self) {
        self.clock.end_physics_step();
    }

    /// State updates produced by the last step(s), oldest first.
    pub fn drain_state_notifications(&mut self) -> Vec<(BodyHandle, D::Transform)> {
        std::mem::take(&mut self.notifications)
    }

    /// Number of sweeps performed since the last reset.
    pub fn sweep_count(&self) -> usize {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Number of ray-separation queries performed since the last reset.
    pub fn ray_query_count(&self) -> usize {
        self.ray_queries.load(Ordering::Relaxed)
    }

    pub fn reset_counters(&self) {
        self.sweeps.store(0, Ordering::Relaxed);
        self.ray_queries.store(0, Ordering::Relaxed);
    }

    fn body(&self, handle: BodyHandle) -> Result<&Body<D>, QueryError> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.body.as_ref())
            .ok_or(QueryError::UnknownBody(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body<D>, QueryError> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.body.as_mut())
            .ok_or(QueryError::UnknownBody(handle))
    }

    /// A live body that is currently part of the space.
    fn active_body(&self, handle: BodyHandle) -> Result<&Body<D>, QueryError> {
        let body = self.body(handle)?;
        if !body.enabled {
            return Err(QueryError::BodyNotInSpace(handle));
        }
        Ok(body)
    }

    /// Every collider the mover can collide with.
    fn colliders_for<'a>(
        &'a self,
        mover: BodyHandle,
        mask: u32,
        infinite_inertia: bool,
        exclude: &FxHashSet<BodyHandle>,
    ) -> Vec<ColliderRef<'a, D>> {
        let mut out = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(body) = slot.body.as_ref() else {
                continue;
            };
            let handle = BodyHandle::new(index as u32, slot.generation);
            if handle == mover || exclude.contains(&handle) || !body.interacts_with(mask) {
                continue;
            }
            if infinite_inertia && body.desc.mode == BodyMode::Rigid {
                continue;
            }
            for (shape_index, collider) in body.colliders.iter().enumerate() {
                out.push(ColliderRef {
                    handle,
                    body,
                    shape_index,
                    collider,
                });
            }
        }
        out
    }

    fn contact_from(
        colliders: &[ColliderRef<'_, D>],
        rest: RestContact<D::Vector>,
        safe_fraction: f32,
        unsafe_fraction: f32,
    ) -> SweepContact<D> {
        let collider = &colliders[rest.collider];
        SweepContact {
            point: rest.point,
            normal: rest.normal,
            depth: rest.depth.max(0.0),
            collider: collider.handle,
            collider_id: collider.body.desc.user_id,
            collider_shape: collider.shape_index,
            local_shape: rest.local_shape,
            collider_velocity: collider.body.velocity_at(rest.point),
            safe_fraction,
            unsafe_fraction,
        }
    }
}

impl<D: SpaceDimension> Default for ShapeSpace<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: SpaceDimension> MotionQuery<D> for ShapeSpace<D> {
    fn sweep(
        &self,
        body: BodyHandle,
        from: &D::Transform,
        motion: D::Vector,
        params: &SweepParams<'_>,
    ) -> Result<MotionResult<D>, QueryError> {
        let mover = self.active_body(body)?;
        self.sweeps.fetch_add(1, Ordering::Relaxed);

        let colliders =
            self.colliders_for(body, mover.desc.mask, params.infinite_inertia, params.exclude);
        let radius = mover.sweep_radius() + params.margin;
        let start = from.origin();
        let recovered = sweep::recover(&colliders, start, radius);

        let len = motion.length();
        let mut first: Option<(usize, sweep::Impact<D::Vector>)> = None;
        if len > strider_math::CMP_EPSILON {
            for (index, collider) in colliders.iter().enumerate() {
                if let Some(impact) = sweep::time_of_impact(collider, recovered, motion, radius)
                    && first.as_ref().is_none_or(|(_, best)| impact.t < best.t)
                {
                    first = Some((index, impact));
                }
            }
        }

        let (safe_fraction, unsafe_fraction) = match &first {
            Some((_, impact)) => {
                let safe = impact.t.clamp(0.0, 1.0);
                let ahead = (impact.gap.max(0.0) + 2.0 * CAST_EPSILON) / len;
                (safe, (safe + ahead).min(1.0))
            }
            None => (1.0, 1.0),
        };

        let travel = (recovered - start) + motion * safe_fraction;
        let remainder = motion - travel;

        // Rest query at the unsafe position.
        let rest_center = recovered + motion * unsafe_fraction;
        let local_shape = mover.sweep_shape_index();
        let mut rest = sweep::rest_contact(&colliders, rest_center, radius, local_shape);

        if !params.exclude_raycast_shapes {
            let rest_transform = from.translated(rest_center - start);
            let shape_count = mover.desc.shapes.len();
            for (ray_index, origin, direction, length) in
                sweep::world_rays(&mover.desc.rays, &rest_transform)
            {
                let reach = length + params.margin;
                let Some(hit) = sweep::cast_ray(&colliders, origin, direction, reach) else {
                    continue;
                };
                let depth = reach - hit.distance;
                if rest.as_ref().is_none_or(|r| depth > r.depth) {
                    rest = Some(RestContact {
                        collider: hit.collider,
                        local_shape: shape_count + ray_index,
                        point: hit.point,
                        normal: hit.normal,
                        depth,
                    });
                }
            }
        }

        // A cast that stopped short of the band still reports its collider.
        if rest.is_none()
            && let Some((index, impact)) = &first
        {
            rest = Some(RestContact {
                collider: *index,
                local_shape,
                point: impact.point,
                normal: impact.normal,
                depth: radius - (rest_center - impact.point).dot(impact.normal),
            });
        }

        let contact =
            rest.map(|rest| Self::contact_from(&colliders, rest, safe_fraction, unsafe_fraction));

        Ok(MotionResult {
            travel,
            remainder,
            contact,
        })
    }

    fn ray_separate(
        &self,
        body: BodyHandle,
        from: &D::Transform,
        infinite_inertia: bool,
        max_results: usize,
        margin: f32,
    ) -> Result<RaySeparation<D>, QueryError> {
        let mover = self.active_body(body)?;
        self.ray_queries.fetch_add(1, Ordering::Relaxed);

        let mut recover = D::Vector::ZERO;
        let mut hits = Vec::new();
        if mover.desc.rays.is_empty() {
            return Ok(RaySeparation { recover, hits });
        }

        let colliders =
            self.colliders_for(body, mover.desc.mask, infinite_inertia, &FxHashSet::default());
        let shape_count = mover.desc.shapes.len();
        for (ray_index, origin, direction, length) in sweep::world_rays(&mover.desc.rays, from) {
            let origin = origin + recover;
            let reach = length + margin;
            let Some(hit) = sweep::cast_ray(&colliders, origin, direction, reach) else {
                continue;
            };
            let penetration = (length - hit.distance).max(0.0);
            recover -= direction * penetration;
            if hits.len() < max_results {
                let collider = &colliders[hit.collider];
                hits.push(RaySeparationHit {
                    point: hit.point,
                    normal: hit.normal,
                    depth: reach - hit.distance,
                    collider: collider.handle,
                    collider_id: collider.body.desc.user_id,
                    collider_shape: collider.shape_index,
                    local_shape: shape_count + ray_index,
                    collider_velocity: collider.body.velocity_at(hit.point),
                });
            }
        }
        Ok(RaySeparation { recover, hits })
    }

    fn direct_state(&self, body: BodyHandle) -> Option<DirectBodyState<D>> {
        let body = self.body(body).ok()?;
        Some(DirectBodyState {
            transform: body.desc.transform,
            linear_velocity: body.desc.linear_velocity,
            angular_velocity: body.desc.angular_velocity,
        })
    }

    fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    fn commit_transform(
        &mut self,
        body: BodyHandle,
        transform: &D::Transform,
    ) -> Result<(), QueryError> {
        self.body_mut(body)?.desc.transform = *transform;
        Ok(())
    }

    fn queue_state_transform(
        &mut self,
        body: BodyHandle,
        transform: &D::Transform,
    ) -> Result<(), QueryError> {
        self.body_mut(body)?.pending_transform = Some(*transform);
        Ok(())
    }

    fn set_state_observer(&mut self, body: BodyHandle, enabled: bool) -> Result<(), QueryError> {
        self.body_mut(body)?.observed = enabled;
        Ok(())
    }
}
