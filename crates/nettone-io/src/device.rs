//! Output device discovery via cpal.

use crate::{Error, Result};
use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

fn describe(device: &Device) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let (default_sample_rate, channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((48000, 2));
    Some(AudioDevice {
        name,
        default_sample_rate,
        channels,
    })
}

/// List every output-capable device on the default host.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    Ok(devices.filter_map(|d| describe(&d)).collect())
}

/// The host's default output device, if any.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().as_ref().and_then(describe))
}

/// Find an output device whose name contains `name` (case-insensitive), or
/// the default device when `name` is `None`.
pub(crate) fn find_output_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            let devices = host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;

            for device in devices {
                if let Ok(dev_name) = device_name(&device)
                    && dev_name.to_lowercase().contains(search_lower.as_str())
                {
                    return Ok(device);
                }
            }
            Err(Error::DeviceNotFound(format!(
                "no output device matching '{}'",
                search
            )))
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}
