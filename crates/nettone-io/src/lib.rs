//! Device and network I/O for the nettone synth.
//!
//! This crate provides:
//!
//! - **Output sinks**: [`CpalSink`] for a live audio device and [`WavSink`]
//!   for offline rendering, both implementing
//!   [`OutputSink`](nettone_synth::OutputSink)
//! - **Control transport**: [`ControlServer`] receives command datagrams and
//!   feeds them to a [`Controller`](nettone_synth::Controller);
//!   [`ControlClient`] sends them
//! - **Devices**: [`list_output_devices`] and [`default_output_device`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nettone_io::{ControlServer, CpalSink, SinkConfig};
//! use nettone_synth::{SilentFm, SynthEngine};
//!
//! let (controller, mut renderer) = SynthEngine::<SilentFm>::new(44100, SilentFm).split();
//! let server = ControlServer::bind(("0.0.0.0", 6001))?;
//! let mut sink = CpalSink::open(&SinkConfig::default())?;
//!
//! std::thread::spawn(move || server.serve(&controller, &running));
//! renderer.run(&mut sink, &running);
//! ```

mod client;
mod cpal_sink;
mod device;
mod server;
mod wav;

pub use client::ControlClient;
pub use cpal_sink::{CpalSink, SinkConfig};
pub use device::{AudioDevice, default_output_device, list_output_devices};
pub use server::{ControlServer, DEFAULT_CONTROL_PORT};
pub use wav::{WavSink, read_wav_mono};

/// Error types for nettone I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A host:port did not resolve to any socket address.
    #[error("Address did not resolve: {0}")]
    Resolve(String),

    /// Command payload exceeds what the synth reads per datagram.
    #[error("Command is {len} bytes, limit is {max}")]
    CommandTooLong {
        /// Encoded payload length.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for nettone I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
