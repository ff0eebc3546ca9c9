//! WAV file output for offline rendering.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use nettone_synth::{OutputSink, SinkError};

use crate::Result;

/// [`OutputSink`] that writes mono 16-bit PCM to a WAV file.
///
/// Writes never block on a clock, so a renderer driving this sink runs as
/// fast as it can. Call [`WavSink::finalize`] to patch the header; dropping
/// the sink also finalizes but swallows errors.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    frames: u64,
}

impl WavSink {
    /// Create (or truncate) `path` for writing at `sample_rate`.
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)?;
        Ok(Self { writer, frames: 0 })
    }

    /// Samples written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flush and close the file.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

impl OutputSink for WavSink {
    fn write(&mut self, samples: &[i16]) -> std::result::Result<usize, SinkError> {
        for (i, &s) in samples.iter().enumerate() {
            if let Err(e) = self.writer.write_sample(s) {
                self.frames += i as u64;
                return match e {
                    hound::Error::IoError(io) => Err(SinkError::Io(io)),
                    other => Err(SinkError::Unavailable(other.to_string())),
                };
            }
        }
        self.frames += samples.len() as u64;
        Ok(samples.len())
    }
}

/// Read a 16-bit integer WAV, returning its sample rate and the first
/// channel's samples.
pub fn read_wav_mono<P: AsRef<Path>>(path: P) -> Result<(u32, Vec<i16>)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));
    let samples = reader
        .samples::<i16>()
        .step_by(channels)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((spec.sample_rate, samples))
}
