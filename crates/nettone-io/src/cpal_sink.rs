//! Live audio output through cpal.
//!
//! The render thread pushes whole blocks into a bounded queue; the cpal
//! callback drains it one frame at a time. A full queue makes
//! [`CpalSink::write`] wait, which is what paces rendering to the device
//! clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError};
use nettone_synth::{BLOCK_SIZE, DEFAULT_SAMPLE_RATE, OutputBlock, OutputSink, SinkError};

use crate::device::{device_name, find_output_device};
use crate::{Error, Result};

/// Settings for opening a [`CpalSink`].
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Device name substring; `None` selects the host default.
    pub device: Option<String>,
    /// Stream sample rate in Hz.
    pub sample_rate: u32,
    /// Blocks queued between the render thread and the device.
    pub buffer_blocks: usize,
    /// Longest a write waits for queue space before reporting a short write.
    pub write_timeout: Duration,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_blocks: 8,
            write_timeout: Duration::from_secs(1),
        }
    }
}

/// [`OutputSink`] that plays mono 16-bit blocks on an audio device.
///
/// Each sample is converted to `f32` and copied to every device channel.
pub struct CpalSink {
    tx: Sender<OutputBlock>,
    stream: cpal::Stream,
    underruns: Arc<AtomicU64>,
    write_timeout: Duration,
    device: String,
    channels: u16,
}

impl CpalSink {
    /// Open the configured device and start its stream.
    pub fn open(config: &SinkConfig) -> Result<Self> {
        let device = find_output_device(config.device.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".to_string());

        let default_config = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        let channels = default_config.channels().max(1);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = crossbeam_channel::bounded::<OutputBlock>(config.buffer_blocks.max(1));
        let underruns = Arc::new(AtomicU64::new(0));
        let mut feed = BlockFeed::new(rx, Arc::clone(&underruns));
        let frame_len = usize::from(channels);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    feed.fill(data, frame_len);
                },
                |err| tracing::error!(error = %err, "audio output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;

        tracing::info!(
            device = %name,
            sample_rate = config.sample_rate,
            channels,
            buffer_blocks = config.buffer_blocks,
            "audio output started"
        );

        Ok(Self {
            tx,
            stream,
            underruns,
            write_timeout: config.write_timeout,
            device: name,
            channels,
        })
    }

    /// Name of the device in use.
    pub fn device_name(&self) -> &str {
        &self.device
    }

    /// Device channel count; every channel carries the same signal.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Callback periods that found the queue empty.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// Stop the device stream.
    pub fn pause(&self) -> Result<()> {
        self.stream.pause().map_err(|e| Error::Stream(e.to_string()))
    }
}

impl OutputSink for CpalSink {
    fn write(&mut self, samples: &[i16]) -> std::result::Result<usize, SinkError> {
        let n = samples.len().min(BLOCK_SIZE);
        let mut block = [0i16; BLOCK_SIZE];
        block[..n].copy_from_slice(&samples[..n]);

        match self.tx.send_timeout(block, self.write_timeout) {
            Ok(()) => Ok(n),
            Err(SendTimeoutError::Timeout(_)) => Ok(0),
            Err(SendTimeoutError::Disconnected(_)) => Err(SinkError::Closed),
        }
    }
}

/// Callback-side state: the block being played and where we are in it.
struct BlockFeed {
    rx: Receiver<OutputBlock>,
    current: OutputBlock,
    pos: usize,
    underruns: Arc<AtomicU64>,
}

impl BlockFeed {
    fn new(rx: Receiver<OutputBlock>, underruns: Arc<AtomicU64>) -> Self {
        Self {
            rx,
            current: [0; BLOCK_SIZE],
            pos: BLOCK_SIZE,
            underruns,
        }
    }

    /// Fill an interleaved buffer of `frame_len`-channel frames.
    fn fill(&mut self, data: &mut [f32], frame_len: usize) {
        let mut starved = false;
        for frame in data.chunks_mut(frame_len) {
            if self.pos == BLOCK_SIZE {
                match self.rx.try_recv() {
                    Ok(block) => {
                        self.current = block;
                        self.pos = 0;
                    }
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                        frame.fill(0.0);
                        starved = true;
                        continue;
                    }
                }
            }
            let sample = f32::from(self.current[self.pos]) / 32768.0;
            frame.fill(sample);
            self.pos += 1;
        }
        if starved {
            self.underruns.fetch_add(1, Ordering::Relaxed);
        }
    }
}
