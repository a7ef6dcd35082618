//! Fixed-tick schedule that steps the physics space and runs character motion.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs, IntoSystemSetConfigs};
use strider_config::PhysicsConfig;

use crate::space::SpaceDimension;
use crate::systems::{
    FixedTick, character_motion_system, physics_step_end_system, physics_step_system,
    sync_to_physics_system,
};

/// Default cap on fixed ticks per frame (spiral-of-death guard).
const MAX_FIXED_STEPS_PER_FRAME: u32 = 10;

/// Ordered phases of one fixed tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    /// Space integration and state delivery.
    Step,
    /// Gameplay that sets character velocities.
    Input,
    /// Kinematic character motion.
    Motion,
    /// Closes the physics step.
    End,
}

/// Runs a fixed-tick [`Schedule`] from a variable frame time with a
/// time accumulator, followed by a per-frame schedule.
pub struct PhysicsSchedule {
    fixed: Schedule,
    frame: Schedule,
    fixed_accumulator: f64,
    fixed_dt: f64,
    max_steps_per_frame: u32,
}

impl PhysicsSchedule {
    /// Empty schedules ticking every `fixed_dt` seconds.
    pub fn new(fixed_dt: f64) -> Self {
        let mut fixed = Schedule::default();
        fixed.set_executor_kind(ExecutorKind::SingleThreaded);
        fixed.configure_sets(
            (
                PhysicsSet::Step,
                PhysicsSet::Input,
                PhysicsSet::Motion,
                PhysicsSet::End,
            )
                .chain(),
        );
        let mut frame = Schedule::default();
        frame.set_executor_kind(ExecutorKind::SingleThreaded);

        Self {
            fixed,
            frame,
            fixed_accumulator: 0.0,
            fixed_dt,
            max_steps_per_frame: MAX_FIXED_STEPS_PER_FRAME,
        }
    }

    /// Tick rate and step cap from the physics config.
    pub fn from_config(config: &PhysicsConfig) -> Self {
        let mut schedule = Self::new(f64::from(config.fixed_dt()));
        schedule.max_steps_per_frame = config.max_steps_per_frame.max(1);
        schedule
    }

    /// Registers the space step, sync delivery and character motion systems
    /// for dimension `D`.
    pub fn with_motion_systems<D: SpaceDimension>(mut self) -> Self {
        self.fixed.add_systems(
            (physics_step_system::<D>, sync_to_physics_system::<D>)
                .chain()
                .in_set(PhysicsSet::Step),
        );
        self.fixed
            .add_systems(character_motion_system::<D>.in_set(PhysicsSet::Motion));
        self.fixed
            .add_systems(physics_step_end_system::<D>.in_set(PhysicsSet::End));
        self
    }

    /// Adds a system to every fixed tick. Place it with [`PhysicsSet`].
    pub fn add_fixed_system<M>(&mut self, system: impl IntoSystemConfigs<M>) {
        self.fixed.add_systems(system);
    }

    /// Adds a system that runs once per frame after the fixed ticks.
    pub fn add_frame_system<M>(&mut self, system: impl IntoSystemConfigs<M>) {
        self.frame.add_systems(system);
    }

    /// Advances by `frame_dt` seconds: runs 0 to `max_steps_per_frame` fixed
    /// ticks, then the frame schedule. Returns the number of ticks run.
    pub fn run(&mut self, world: &mut World, frame_dt: f64) -> u32 {
        if !world.contains_resource::<FixedTick>() {
            world.insert_resource(FixedTick::new(self.fixed_dt as f32));
        }

        self.fixed_accumulator += frame_dt;
        let mut steps: u32 = 0;
        while self.fixed_accumulator >= self.fixed_dt && steps < self.max_steps_per_frame {
            {
                let mut tick = world.resource_mut::<FixedTick>();
                tick.dt = self.fixed_dt as f32;
                tick.tick += 1;
            }
            self.fixed.run(world);
            self.fixed_accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == self.max_steps_per_frame && self.fixed_accumulator >= self.fixed_dt {
            tracing::debug!(
                backlog = self.fixed_accumulator,
                steps,
                "fixed tick cap reached"
            );
        }

        self.frame.run(world);
        steps
    }

    /// Current accumulator value in seconds.
    pub fn fixed_accumulator(&self) -> f64 {
        self.fixed_accumulator
    }

    /// Fixed timestep in seconds.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn max_steps_per_frame(&self) -> u32 {
        self.max_steps_per_frame
    }

    /// Force-initializes both schedules, validating the system graph.
    pub fn initialize(&mut self, world: &mut World) {
        if let Err(err) = self.fixed.initialize(world) {
            tracing::error!(%err, "fixed schedule failed to initialize");
        }
        if let Err(err) = self.frame.initialize(world) {
            tracing::error!(%err, "frame schedule failed to initialize");
        }
    }
}

impl Default for PhysicsSchedule {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
