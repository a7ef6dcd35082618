//! Strider demo: walks a kinematic character across a small 2D level on a
//! fixed physics tick and logs what it touches.

mod scene;

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use strider_config::{CliArgs, Config};
use strider_math::Dim2;
use strider_physics::{KinematicBody, PhysicsSchedule, PhysicsSet};
use tracing::{error, info};

const DEFAULT_TICKS: u32 = 600;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("strider"))
            .unwrap_or_else(|| PathBuf::from(".strider"))
    });
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strider_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        tick_rate = config.physics.tick_rate_hz,
        margin = config.motion.safe_margin,
        max_slides = config.motion.max_slides,
        floor_max_angle = config.motion.floor_max_angle_degrees,
        stop_on_slope = config.motion.stop_on_slope,
        snap = config.motion.snap_length,
        "Strider demo starting"
    );

    let mut world = World::new();
    let player = match scene::build(&mut world, &config) {
        Ok(entity) => entity,
        Err(err) => {
            error!(%err, "failed to place the player");
            return;
        }
    };

    let mut schedule = PhysicsSchedule::from_config(&config.physics).with_motion_systems::<Dim2>();
    schedule.add_fixed_system(
        (scene::walk_system, scene::patrol_system).in_set(PhysicsSet::Input),
    );
    schedule.add_frame_system(scene::log_state_system);
    schedule.initialize(&mut world);

    let ticks = args.ticks.unwrap_or(DEFAULT_TICKS);
    let frame_dt = schedule.fixed_dt();
    let mut ran = 0;
    while ran < ticks {
        ran += schedule.run(&mut world, frame_dt);
    }

    if let Some(body) = world.get::<KinematicBody<Dim2>>(player) {
        info!(
            ticks = ran,
            x = body.origin().x,
            y = body.origin().y,
            on_floor = body.is_on_floor(),
            on_wall = body.is_on_wall(),
            "Strider demo finished"
        );
    }
}
