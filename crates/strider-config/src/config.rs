//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fixed-step simulation settings.
    pub physics: PhysicsConfig,
    /// Character motion resolver settings.
    pub motion: MotionConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Fixed-step simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Physics ticks per second.
    pub tick_rate_hz: u32,
    /// Upper bound on fixed steps run for one frame (spiral-of-death guard).
    pub max_steps_per_frame: u32,
    /// Gravity acceleration applied to characters, in world units per s².
    /// Two components; a 3D world uses them as x and y.
    pub gravity: [f32; 2],
}

/// What happens to the platform velocity when a body leaves its floor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlatformVelocityOnLeave {
    /// Add the full platform velocity to the returned velocity.
    #[default]
    Always,
    /// Add it, but drop any downward component along `up` first.
    UpwardOnly,
    /// Never add it.
    Never,
}

/// Character motion resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Safety margin kept between the body and other shapes.
    pub safe_margin: f32,
    /// Maximum slide iterations per `move_and_slide` call.
    pub max_slides: u32,
    /// Steepest surface (degrees from `up`) still treated as floor.
    pub floor_max_angle_degrees: f32,
    /// Hold the body on slopes instead of sliding down.
    pub stop_on_slope: bool,
    /// Treat rigid bodies as immovable (ignored by sweeps).
    pub infinite_inertia: bool,
    /// Length of the floor snap motion (0 disables snapping).
    pub snap_length: f32,
    /// Platform velocity behaviour when the body leaves its floor.
    pub platform_on_leave: PlatformVelocityOnLeave,
    /// Drive the body from physics server state instead of moving it directly.
    pub sync_to_physics: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log character state every N ticks (0 = never).
    pub log_state_every_ticks: u32,
}

// --- Default implementations ---

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            max_steps_per_frame: 10,
            gravity: [0.0, 9.8],
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            safe_margin: 0.08,
            max_slides: 4,
            floor_max_angle_degrees: 45.0,
            stop_on_slope: false,
            infinite_inertia: true,
            snap_length: 0.0,
            platform_on_leave: PlatformVelocityOnLeave::Always,
            sync_to_physics: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_state_every_ticks: 60,
        }
    }
}

impl PhysicsConfig {
    /// Fixed timestep in seconds.
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }
}

impl MotionConfig {
    /// `floor_max_angle_degrees` converted to radians.
    pub fn floor_max_angle(&self) -> f32 {
        self.floor_max_angle_degrees.to_radians()
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects values the resolver cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.motion.safe_margin > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "motion.safe_margin",
                reason: "must be positive",
            });
        }
        if self.motion.snap_length < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "motion.snap_length",
                reason: "must not be negative",
            });
        }
        if self.physics.tick_rate_hz == 0 {
            return Err(ConfigError::InvalidValue {
                field: "physics.tick_rate_hz",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("tick_rate_hz: 60"));
        assert!(ron_str.contains("platform_on_leave: Always"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.motion.platform_on_leave = PlatformVelocityOnLeave::UpwardOnly;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `motion` section entirely
        let ron_str = "(physics: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.motion, MotionConfig::default());
    }

    #[test]
    fn test_partial_motion_section() {
        let ron_str = "(motion: (stop_on_slope: true, snap_length: 0.5))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert!(config.motion.stop_on_slope);
        assert_eq!(config.motion.snap_length, 0.5);
        assert_eq!(config.motion.max_slides, 4);
        assert_eq!(config.motion.safe_margin, 0.08);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.motion.safe_margin = 0.02;
        config.motion.max_slides = 6;
        config.debug.log_level = "debug".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_load_rejects_nonpositive_margin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "(motion: (safe_margin: 0.0))").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "motion.safe_margin",
                ..
            })
        ));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.motion.floor_max_angle_degrees = 30.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().motion.floor_max_angle_degrees, 30.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_dt_and_angle_conversion() {
        let config = Config::default();
        assert!((config.physics.fixed_dt() - 1.0 / 60.0).abs() < 1e-7);
        assert!((config.motion.floor_max_angle() - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }
}
