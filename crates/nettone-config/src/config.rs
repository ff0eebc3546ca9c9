//! The synth configuration file.

use std::net::IpAddr;
use std::path::Path;

use nettone_synth::{DEFAULT_CONTROL_PORT, DEFAULT_SAMPLE_RATE, FM_VELOCITY};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::default_config_path;

/// Top-level configuration.
///
/// Every field has a default, so an empty file (or no file) is valid.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 44100
///
/// [control]
/// bind_address = "0.0.0.0"
/// port = 6001
///
/// [output]
/// device = "USB Audio"
/// buffer_blocks = 8
///
/// [fm]
/// velocity = 100
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Control socket settings.
    pub control: ControlConfig,
    /// Audio output settings.
    pub output: OutputConfig,
    /// FM bridge settings.
    pub fm: FmConfig,
}

/// Where the control socket listens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// IP address to bind.
    pub bind_address: String,
    /// UDP port.
    pub port: u16,
}

/// Audio device settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Device name substring; unset means the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Rendered blocks queued ahead of the device.
    pub buffer_blocks: usize,
}

/// FM bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FmConfig {
    /// Velocity sent with every FM trigger (MIDI range).
    pub velocity: u8,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            control: ControlConfig::default(),
            output: OutputConfig::default(),
            fm: FmConfig::default(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_CONTROL_PORT,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            device: None,
            buffer_blocks: 8,
        }
    }
}

impl Default for FmConfig {
    fn default() -> Self {
        Self {
            velocity: FM_VELOCITY,
        }
    }
}

impl ControlConfig {
    /// `address:port` in a form [`std::net::ToSocketAddrs`] accepts,
    /// bracketing IPv6 literals.
    pub fn socket_addr(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.port)
        } else {
            format!("{}:{}", self.bind_address, self.port)
        }
    }
}

impl SynthConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load `path` if given, otherwise the default file when it exists,
    /// otherwise built-in defaults. The result is validated.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::load(p)?,
            None => {
                let default = default_config_path();
                if default.is_file() {
                    Self::load(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Reject values the synth cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("sample_rate", "must be non-zero"));
        }
        if self.control.port == 0 {
            return Err(ConfigError::invalid("control.port", "must be non-zero"));
        }
        if self.control.bind_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::invalid(
                "control.bind_address",
                format!("'{}' is not an IP address", self.control.bind_address),
            ));
        }
        if self.output.buffer_blocks == 0 {
            return Err(ConfigError::invalid("output.buffer_blocks", "must be non-zero"));
        }
        if self.fm.velocity > 127 {
            return Err(ConfigError::invalid(
                "fm.velocity",
                format!("{} is outside 0..=127", self.fm.velocity),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = SynthConfig::default();
        assert_eq!(c.sample_rate, 44100);
        assert_eq!(c.control.bind_address, "0.0.0.0");
        assert_eq!(c.control.port, 6001);
        assert_eq!(c.output.device, None);
        assert_eq!(c.output.buffer_blocks, 8);
        assert_eq!(c.fm.velocity, 100);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(SynthConfig::from_toml("").unwrap(), SynthConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = SynthConfig::from_toml("[control]\nport = 7000\n").unwrap();
        assert_eq!(c.control.port, 7000);
        assert_eq!(c.control.bind_address, "0.0.0.0");
        assert_eq!(c.sample_rate, 44100);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SynthConfig::from_toml("[control]\nprot = 7000\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn unset_device_is_not_serialized() {
        let toml = SynthConfig::default().to_toml().unwrap();
        assert!(!toml.contains("device"));
        assert!(toml.contains("port = 6001"));
    }

    #[test]
    fn validate_rejects_zeros() {
        let mut c = SynthConfig::default();
        c.sample_rate = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Invalid { field: "sample_rate", .. })
        ));

        let mut c = SynthConfig::default();
        c.control.port = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Invalid { field: "control.port", .. })
        ));

        let mut c = SynthConfig::default();
        c.output.buffer_blocks = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Invalid { field: "output.buffer_blocks", .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_address_and_velocity() {
        let mut c = SynthConfig::default();
        c.control.bind_address = "localhost".to_string();
        assert!(c.validate().is_err());

        let mut c = SynthConfig::default();
        c.fm.velocity = 200;
        assert!(c.validate().is_err());
    }

    #[test]
    fn socket_addr_brackets_ipv6() {
        let mut c = ControlConfig::default();
        assert_eq!(c.socket_addr(), "0.0.0.0:6001");
        c.bind_address = "::1".to_string();
        assert_eq!(c.socket_addr(), "[::1]:6001");
    }
}
