//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strider command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "strider", about = "Kinematic character motion demo")]
pub struct CliArgs {
    /// Number of physics ticks to simulate before exiting.
    #[arg(long)]
    pub ticks: Option<u32>,

    /// Safety margin kept between the body and other shapes.
    #[arg(long)]
    pub margin: Option<f32>,

    /// Maximum slide iterations per call.
    #[arg(long)]
    pub max_slides: Option<u32>,

    /// Steepest walkable surface in degrees.
    #[arg(long)]
    pub floor_max_angle: Option<f32>,

    /// Hold the body on slopes instead of sliding down.
    #[arg(long)]
    pub stop_on_slope: Option<bool>,

    /// Floor snap length (0 disables snapping).
    #[arg(long)]
    pub snap: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(margin) = args.margin {
            self.motion.safe_margin = margin;
        }
        if let Some(slides) = args.max_slides {
            self.motion.max_slides = slides;
        }
        if let Some(angle) = args.floor_max_angle {
            self.motion.floor_max_angle_degrees = angle;
        }
        if let Some(stop) = args.stop_on_slope {
            self.motion.stop_on_slope = stop;
        }
        if let Some(snap) = args.snap {
            self.motion.snap_length = snap;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            ticks: None,
            margin: None,
            max_slides: None,
            floor_max_angle: None,
            stop_on_slope: None,
            snap: None,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            margin: Some(0.05),
            stop_on_slope: Some(true),
            log_level: Some("debug".to_string()),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.motion.safe_margin, 0.05);
        assert!(config.motion.stop_on_slope);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.motion.max_slides, 4);
        assert_eq!(config.physics.tick_rate_hz, 60);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parse_flags() {
        let args = CliArgs::parse_from([
            "strider",
            "--ticks",
            "120",
            "--snap",
            "0.5",
            "--stop-on-slope",
            "true",
        ]);
        assert_eq!(args.ticks, Some(120));
        assert_eq!(args.snap, Some(0.5));
        assert_eq!(args.stop_on_slope, Some(true));
        assert!(args.config.is_none());
    }
}
