//! Boundary to the audio output device.

/// Errors reported by an [`OutputSink`].
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The device is gone or refused the write.
    #[error("output device unavailable: {0}")]
    Unavailable(String),

    /// The sink has been shut down and will accept nothing more.
    #[error("output sink closed")]
    Closed,

    /// Underlying I/O failure (files, pipes).
    #[error("output I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumer of finished PCM blocks.
///
/// `write` blocks until the device has room, which is what paces the render
/// loop to real time. It returns how many samples were accepted; a short
/// count is not an error but is counted by the engine.
pub trait OutputSink: Send {
    /// Hand one block of mono signed 16-bit samples to the device.
    fn write(&mut self, samples: &[i16]) -> Result<usize, SinkError>;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn write(&mut self, samples: &[i16]) -> Result<usize, SinkError> {
        (**self).write(samples)
    }
}

/// Sink that appends every block to memory. Never blocks.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    samples: Vec<i16>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Consume the sink, returning the collected samples.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, samples: &[i16]) -> Result<usize, SinkError> {
        self.samples.extend_from_slice(samples);
        Ok(samples.len())
    }
}
