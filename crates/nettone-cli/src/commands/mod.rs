//! CLI command implementations.

pub mod config;
pub mod devices;
pub mod render;
pub mod run;
pub mod send;

use std::path::Path;

use anyhow::Context;
use nettone_config::SynthConfig;

/// Load and validate the configuration named on the command line, or the
/// default one.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<SynthConfig> {
    SynthConfig::load_or_default(path).with_context(|| match path {
        Some(p) => format!("loading config from {}", p.display()),
        None => "loading default config".to_string(),
    })
}
