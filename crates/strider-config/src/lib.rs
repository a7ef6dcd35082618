//! Configuration for the Strider motion stack.
//!
//! Settings persist to disk as `config.ron`, can be overridden from the
//! command line via clap, and tolerate missing or unknown fields so old
//! files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, MotionConfig, PhysicsConfig, PlatformVelocityOnLeave};
pub use error::ConfigError;
