//! Single-step mover: one sweep, optional slide cancellation, transform update.

use rustc_hash::FxHashSet;
use strider_math::{BodyTransform, CMP_EPSILON, Dimension, MotionVector};

use crate::collision::CollisionRecord;
use crate::handle::BodyHandle;
use crate::kinematic_body::KinematicBody;
use crate::query::{MotionQuery, SweepParams};

/// Base tolerance of the slide-cancellation test.
pub const SLIDING_PRECISION: f32 = 0.001;

/// Separation-ray results considered by raycast-shape separation.
pub const MAX_RAY_RESULTS: usize = 8;

impl<D: Dimension> KinematicBody<D> {
    /// Moves the body along `motion`, stopping at the first contact.
    ///
    /// Returns the contact, or `None` when the motion completed freely (or
    /// the body could not query its world). Unless `test_only`, the
    /// transform advances by the record's travel and is committed to the
    /// world.
    pub fn move_and_collide<W: MotionQuery<D>>(
        &mut self,
        world: &mut W,
        motion: D::Vector,
        infinite_inertia: bool,
        exclude_raycast_shapes: bool,
        test_only: bool,
    ) -> Option<CollisionRecord<D>> {
        self.ensure_in_world().ok()?;
        let record = self.collide(
            &*world,
            motion,
            infinite_inertia,
            exclude_raycast_shapes,
            test_only,
            true,
            &FxHashSet::default(),
        );
        if !test_only {
            self.commit(world);
        }
        record
    }

    /// True if sweeping from `from` by `motion` is stopped short of completion.
    ///
    /// Never changes the body or the world.
    pub fn test_move<W: MotionQuery<D>>(
        &self,
        world: &W,
        from: &D::Transform,
        motion: D::Vector,
        infinite_inertia: bool,
    ) -> bool {
        if self.ensure_in_world().is_err() {
            return false;
        }
        let exclude = FxHashSet::default();
        let params = SweepParams {
            infinite_inertia,
            margin: self.margin,
            exclude_raycast_shapes: true,
            exclude: &exclude,
        };
        match world.sweep(self.handle, from, motion, &params) {
            Ok(result) => result
                .contact
                .is_some_and(|contact| contact.safe_fraction < 1.0),
            Err(err) => {
                self.query_failed(err);
                false
            }
        }
    }

    /// The collide-and-advance step shared by every motion call. Updates
    /// only the resolver transform; callers commit.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn collide<W: MotionQuery<D>>(
        &mut self,
        world: &W,
        motion: D::Vector,
        infinite_inertia: bool,
        exclude_raycast_shapes: bool,
        test_only: bool,
        cancel_sliding: bool,
        exclude: &FxHashSet<BodyHandle>,
    ) -> Option<CollisionRecord<D>> {
        self.check_sync_misuse();

        let params = SweepParams {
            infinite_inertia,
            margin: self.margin,
            exclude_raycast_shapes,
            exclude,
        };
        let result = match world.sweep(self.handle, &self.transform, motion, &params) {
            Ok(result) => {
                self.query_succeeded();
                result
            }
            Err(err) => {
                self.query_failed(err);
                return None;
            }
        };

        let mut travel = result.travel;
        let mut remainder = result.remainder;

        // Keep the achieved motion along the requested direction so that
        // depenetration does not drift a resting body sideways, unless the
        // contact is deep enough to risk tunnelling.
        let mut cancel_sliding = cancel_sliding;
        if cancel_sliding {
            let motion_length = motion.length();
            let mut precision = SLIDING_PRECISION;
            if let Some(contact) = &result.contact {
                precision += motion_length * (contact.unsafe_fraction - contact.safe_fraction);
                if contact.depth > self.margin + precision {
                    cancel_sliding = false;
                }
            }
            if cancel_sliding {
                let motion_normal = if motion_length > CMP_EPSILON {
                    motion / motion_length
                } else {
                    D::Vector::ZERO
                };
                let projected = travel.dot(motion_normal);
                let recovery = travel - motion_normal * projected;
                if recovery.length() < self.margin + precision {
                    travel = motion_normal * projected;
                    remainder = motion - travel;
                }
            }
        }

        let record = result
            .contact
            .map(|contact| CollisionRecord::from_sweep(&contact, travel, remainder));

        if !test_only {
            let applied = self.axis_lock.apply(travel);
            self.transform.set_origin(self.transform.origin() + applied);
        }

        if let Some(record) = &record {
            tracing::trace!(
                body = ?self.handle,
                collider = ?record.collider(),
                safe = record.safe_fraction(),
                depth = record.depth(),
                "sweep collided"
            );
        }
        record
    }

    /// Pushes the body's separation rays out of geometry and reports the deepest
    /// hit. The recovery is applied to the transform even when no hit is
    /// reported.
    pub(crate) fn separate_raycast_shapes<W: MotionQuery<D>>(
        &mut self,
        world: &W,
        infinite_inertia: bool,
    ) -> Option<CollisionRecord<D>> {
        let separation = match world.ray_separate(
            self.handle,
            &self.transform,
            infinite_inertia,
            MAX_RAY_RESULTS,
            self.margin,
        ) {
            Ok(separation) => separation,
            Err(err) => {
                self.query_failed(err);
                return None;
            }
        };

        self.transform
            .set_origin(self.transform.origin() + separation.recover);

        let deepest = separation
            .hits
            .iter()
            .reduce(|best, hit| if hit.depth > best.depth { hit } else { best })?;
        Some(CollisionRecord::from_ray_hit(deepest, separation.recover))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{BodyDesc, BodyMode, SeparationRay, Shape, ShapeSpace};
    use glam::{Affine2, Vec2};
    use strider_math::{BodyAxis, Dim2};

    const RADIUS: f32 = 0.05;

    fn space_with_floor() -> ShapeSpace<Dim2> {
        let mut space = ShapeSpace::<Dim2>::new();
        space.add_body(
            BodyDesc::at(BodyMode::Static, Vec2::new(0.0, 10.0))
                .with_shape(Shape::half_space(Vec2::new(0.0, -1.0))),
        );
        space
    }

    fn spawn(space: &mut ShapeSpace<Dim2>, origin: Vec2) -> KinematicBody<Dim2> {
        let handle = space.add_body(
            BodyDesc::at(BodyMode::Character, origin).with_shape(Shape::ball(RADIUS)),
        );
        let mut body = KinematicBody::new(handle, Affine2::from_origin(origin));
        body.enter_world(space).unwrap();
        body
    }

    #[test]
    fn test_free_motion_moves_fully() {
        let mut space = ShapeSpace::<Dim2>::new();
        let mut body = spawn(&mut space, Vec2::ZERO);
        let hit = body.move_and_collide(&mut space, Vec2::new(1.0, 2.0), true, true, false);
        assert!(hit.is_none());
        assert_eq!(body.origin(), Vec2::new(1.0, 2.0));
        assert_eq!(space.body_transform(body.handle()).unwrap().translation, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_blocked_motion_stops_at_margin() {
        let mut space = space_with_floor();
        let mut body = spawn(&mut space, Vec2::new(0.0, 9.0));
        let motion = Vec2::new(0.0, 2.0);
        let hit = body
            .move_and_collide(&mut space, motion, true, true, false)
            .expect("floor is in the way");
        assert!((hit.travel() + hit.remainder() - motion).length() < 1e-5);
        assert!((hit.normal() - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert!(hit.is_blocking());
        let expected = 10.0 - RADIUS - body.safe_margin();
        assert!((body.origin().y - expected).abs() < 1e-3, "got {:?}", body.origin());
    }

    #[test]
    fn test_test_only_leaves_transform() {
        let mut space = space_with_floor();
        let mut body = spawn(&mut space, Vec2::new(0.0, 9.0));
        let hit = body.move_and_collide(&mut space, Vec2::new(0.0, 2.0), true, true, true);
        assert!(hit.is_some());
        assert_eq!(body.origin(), Vec2::new(0.0, 9.0));
    }

    #[test]
    fn test_cancel_sliding_removes_lateral_recovery() {
        let mut space = space_with_floor();
        // Slightly inside the margin band: depenetration pushes straight up.
        let mut body = spawn(&mut space, Vec2::new(0.0, 9.9));
        let motion = Vec2::new(0.5, 0.0);

        let mut raw = body.clone();
        raw.collide(&space, motion, true, true, false, false, &FxHashSet::default())
            .expect("resting contact");
        assert!(raw.origin().y < 9.9, "recovery applied, got {:?}", raw.origin());

        let hit = body
            .collide(&space, motion, true, true, false, true, &FxHashSet::default())
            .expect("resting contact");
        assert_eq!(hit.travel(), Vec2::new(0.5, 0.0));
        assert!((hit.travel() + hit.remainder() - motion).length() < 1e-6);
        assert!((body.origin() - Vec2::new(0.5, 9.9)).length() < 1e-5);
    }

    #[test]
    fn test_axis_lock_zeroes_applied_component() {
        let mut space = ShapeSpace::<Dim2>::new();
        let mut body = spawn(&mut space, Vec2::ZERO);
        body.set_axis_lock(BodyAxis::Y, true);
        body.move_and_collide(&mut space, Vec2::new(1.0, 1.0), true, true, false);
        assert!(
            (body.origin() - Vec2::new(1.0, 0.0)).length() < 1e-5,
            "got {:?}",
            body.origin()
        );
    }

    #[test]
    fn test_move_is_read_only() {
        let mut space = space_with_floor();
        let body = spawn(&mut space, Vec2::new(0.0, 9.0));
        let from = Affine2::from_origin(Vec2::new(0.0, 9.0));
        let before = body.clone();
        assert!(body.test_move(&space, &from, Vec2::new(0.0, 2.0), true));
        assert!(!body.test_move(&space, &from, Vec2::new(0.0, -2.0), true));
        assert_eq!(body.origin(), before.origin());
        assert_eq!(body.state(), before.state());
    }

    #[test]
    fn test_not_in_world_is_neutral() {
        let mut space = space_with_floor();
        let handle = space.add_body(
            BodyDesc::at(BodyMode::Character, Vec2::new(0.0, 9.0)).with_shape(Shape::ball(RADIUS)),
        );
        let mut body = KinematicBody::<Dim2>::new(handle, Affine2::from_origin(Vec2::new(0.0, 9.0)));
        assert!(body.move_and_collide(&mut space, Vec2::new(0.0, 2.0), true, true, false).is_none());
        assert!(!body.test_move(&space, &Affine2::IDENTITY, Vec2::new(0.0, 20.0), true));
        assert_eq!(body.origin(), Vec2::new(0.0, 9.0));
    }

    #[test]
    fn test_removed_body_degrades_to_no_collision() {
        let mut space = space_with_floor();
        let mut body = spawn(&mut space, Vec2::new(0.0, 9.0));
        space.remove_body(body.handle());
        assert!(body.move_and_collide(&mut space, Vec2::new(0.0, 2.0), true, true, false).is_none());
        assert_eq!(body.origin(), Vec2::new(0.0, 9.0));
    }

    #[test]
    fn test_separate_raycast_shapes_picks_deepest() {
        let mut space = ShapeSpace::<Dim2>::new();
        space.add_body(
            BodyDesc::at(BodyMode::Static, Vec2::new(0.0, 1.0))
                .with_shape(Shape::half_space(Vec2::new(0.0, -1.0))),
        );
        let handle = space.add_body(
            BodyDesc::at(BodyMode::Character, Vec2::ZERO)
                .with_ray(SeparationRay::new(Vec2::new(0.5, 0.0), Vec2::new(0.0, 1.0), 1.2))
                .with_ray(SeparationRay::new(Vec2::ZERO, Vec2::new(0.0, 1.0), 1.5)),
        );
        let mut body = KinematicBody::<Dim2>::new(handle, Affine2::IDENTITY);
        body.enter_world(&mut space).unwrap();

        let record = body.separate_raycast_shapes(&space, true).expect("rays penetrate");
        assert_eq!(record.remainder(), Vec2::ZERO);
        assert_eq!(record.travel(), body.origin());
        assert!(body.origin().y < -0.4, "pushed back up, got {:?}", body.origin());
        assert!((record.normal() - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }
}
