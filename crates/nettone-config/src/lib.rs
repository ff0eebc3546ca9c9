//! Configuration for the nettone synth.
//!
//! A single TOML file holds the sample rate, the control socket address,
//! the audio device selection and FM trigger settings. Every field has a
//! default, and a missing default file simply means "use the defaults".
//!
//! # Example
//!
//! ```rust,no_run
//! use nettone_config::{SynthConfig, paths};
//!
//! let mut config = SynthConfig::load_or_default(None).unwrap();
//! config.control.port = 7000;
//! config.save(paths::default_config_path()).unwrap();
//! ```

mod config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

pub use config::{ControlConfig, FmConfig, OutputConfig, SynthConfig};
pub use error::ConfigError;
pub use paths::{default_config_path, user_config_dir};
