//! Synth engine: the owned bundle of tables, voices, and FM bridge, and the
//! two task handles it splits into.
//!
//! ```text
//!                    SynthEngine::split()
//!                 ┌──────────┴───────────┐
//!                 ▼                      ▼
//!           Controller               Renderer
//!  (datagrams → VoiceBank)   (VoiceBank → blocks → sink)
//!                 │    Arc<VoiceBank>    ▲
//!                 ├──────────────────────┤
//!                 │  FmEvent channel     │
//!                 └──────────────────────┘
//! ```
//!
//! The controller only stores into atomics and does a non-blocking
//! `try_send`, so it never waits on rendering. The renderer only loads
//! atomics and drains the channel without blocking, so it never waits on
//! control. Its single suspension point is the sink write.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::fm::{FM_VELOCITY, FmBridge, FmEvent, fm_retrigger};
use crate::protocol::{Command, CommandError};
use crate::sink::OutputSink;
use crate::stats::EngineStats;
use crate::tables::{TABLE_CENTER, WaveTables};
use crate::voice::{VOICE_COUNT, Voice, VoiceBank};
use crate::waveform::Waveform;

/// Samples per rendered block.
pub const BLOCK_SIZE: usize = 256;

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Capacity of the control → render FM event queue.
pub const FM_QUEUE_DEPTH: usize = 64;

/// One rendered block of mono signed 16-bit samples.
pub type OutputBlock = [i16; BLOCK_SIZE];

/// Owned synth state, constructed once at startup.
///
/// Split it with [`SynthEngine::split`] to obtain the handle for each task.
pub struct SynthEngine<B: FmBridge, const N: usize = VOICE_COUNT> {
    bank: Arc<VoiceBank<N>>,
    tables: Arc<WaveTables>,
    stats: Arc<EngineStats>,
    bridge: B,
    sample_rate: f32,
    fm_velocity: u8,
}

impl<B: FmBridge, const N: usize> SynthEngine<B, N> {
    /// Build tables and a silent voice bank.
    pub fn new(sample_rate: u32, bridge: B) -> Self {
        Self {
            bank: Arc::new(VoiceBank::new()),
            tables: Arc::new(WaveTables::build()),
            stats: Arc::new(EngineStats::new()),
            bridge,
            sample_rate: sample_rate as f32,
            fm_velocity: FM_VELOCITY,
        }
    }

    /// Override the velocity sent with FM triggers.
    pub fn with_fm_velocity(mut self, velocity: u8) -> Self {
        self.fm_velocity = velocity;
        self
    }

    /// Initialize the FM bridge and hand out the control and render halves.
    pub fn split(mut self) -> (Controller<N>, Renderer<B, N>) {
        self.bridge.init();
        let (fm_tx, fm_rx) = bounded(FM_QUEUE_DEPTH);

        let controller = Controller {
            bank: Arc::clone(&self.bank),
            stats: Arc::clone(&self.stats),
            fm_tx,
            fm_velocity: self.fm_velocity,
        };

        let renderer = Renderer {
            bank: self.bank,
            tables: self.tables,
            stats: self.stats,
            bridge: self.bridge,
            fm_rx,
            sample_rate: self.sample_rate,
            noise: Noise::new(),
            fm_scratch: [0; BLOCK_SIZE],
        };

        (controller, renderer)
    }
}

/// Control-task handle: decodes commands and applies them to the bank.
#[derive(Clone)]
pub struct Controller<const N: usize = VOICE_COUNT> {
    bank: Arc<VoiceBank<N>>,
    stats: Arc<EngineStats>,
    fm_tx: Sender<FmEvent>,
    fm_velocity: u8,
}

impl<const N: usize> Controller<N> {
    /// Decode one datagram payload and apply it.
    pub fn handle_datagram(&self, payload: &[u8]) -> Result<Voice, CommandError> {
        self.apply(&Command::decode(payload))
    }

    /// Apply a decoded command, then re-trigger the FM bridge if the
    /// resulting voice is on FM (see [`fm_retrigger`]).
    pub fn apply(&self, command: &Command) -> Result<Voice, CommandError> {
        let voice = match command.apply(&self.bank) {
            Ok(voice) => voice,
            Err(e) => {
                self.stats.record_rejected();
                tracing::warn!(error = %e, command = %command, "command rejected");
                return Err(e);
            }
        };
        self.stats.record_applied();

        tracing::debug!(
            voice = command.voice.unwrap_or(0),
            waveform = %voice.waveform,
            amplitude = voice.amplitude,
            frequency = voice.frequency,
            note = ?voice.note,
            patch = voice.patch,
            "voice updated"
        );

        if let Some(event) = fm_retrigger(&voice, self.fm_velocity) {
            match self.fm_tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    let dropped = self.stats.record_fm_dropped();
                    tracing::warn!(dropped, "FM event queue full, trigger dropped");
                }
                // Renderer gone; nothing left to trigger.
                Err(TrySendError::Disconnected(_)) => {
                    self.stats.record_fm_dropped();
                }
            }
        }

        Ok(voice)
    }

    /// Return every voice to its startup state.
    pub fn reset_all(&self) {
        self.bank.reset_all();
        tracing::info!("all voices reset");
    }

    /// Shared voice bank.
    pub fn bank(&self) -> &VoiceBank<N> {
        &self.bank
    }

    /// Shared counters.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }
}

/// Render-task handle: owns the FM bridge and produces blocks.
pub struct Renderer<B: FmBridge, const N: usize = VOICE_COUNT> {
    bank: Arc<VoiceBank<N>>,
    tables: Arc<WaveTables>,
    stats: Arc<EngineStats>,
    bridge: B,
    fm_rx: Receiver<FmEvent>,
    sample_rate: f32,
    noise: Noise,
    fm_scratch: [i16; BLOCK_SIZE],
}

impl<B: FmBridge, const N: usize> Renderer<B, N> {
    /// Render the next block from the current voice state.
    pub fn render_block(&mut self) -> OutputBlock {
        let mut block = [0; BLOCK_SIZE];
        self.render_into(&mut block);
        block
    }

    /// Render the next block into `out`. Performs no heap allocation.
    pub fn render_into(&mut self, out: &mut OutputBlock) {
        while let Ok(event) = self.fm_rx.try_recv() {
            event.dispatch(&mut self.bridge);
        }

        let mut acc = [0.0f32; BLOCK_SIZE];

        for id in 0..N {
            let waveform = self.bank.waveform(id);
            let amplitude = self.bank.amplitude(id);
            match waveform {
                Waveform::Off => {}
                Waveform::Fm => self.mix_fm(&mut acc, amplitude),
                Waveform::Noise => {
                    for a in &mut acc {
                        *a += self.noise.next_sample() * amplitude;
                    }
                }
                _ => self.mix_table(&mut acc, id, waveform, amplitude),
            }
        }

        // Float-to-int `as` truncates toward zero and saturates at the i16
        // limits, so heavy mixes clip instead of wrapping around.
        for (o, a) in out.iter_mut().zip(&acc) {
            *o = *a as i16;
        }

        self.stats.record_block();
    }

    fn mix_fm(&mut self, acc: &mut [f32; BLOCK_SIZE], amplitude: f32) {
        let written = self.bridge.render(&mut self.fm_scratch).min(BLOCK_SIZE);
        if written < BLOCK_SIZE {
            self.fm_scratch[written..].fill(0);
            let short = self.stats.record_short_fm_render();
            if short.is_power_of_two() {
                tracing::warn!(written, short, "FM bridge rendered a short block");
            }
        }
        for (a, &s) in acc.iter_mut().zip(&self.fm_scratch) {
            *a += f32::from(s) * amplitude;
        }
    }

    fn mix_table(&self, acc: &mut [f32; BLOCK_SIZE], id: usize, waveform: Waveform, amplitude: f32) {
        let Some(table) = self.tables.get(waveform) else {
            return;
        };
        let len = table.len();
        let len_f = len as f32;

        let skip = self.bank.frequency(id) / self.sample_rate * len_f;
        // Below one table step per sample (~3 Hz on the short tables) the
        // voice is not rendered at all.
        if skip.is_nan() || skip < 1.0 {
            return;
        }

        // The waveform may have changed since the phase was stored, and the
        // tables differ in length.
        let mut phase = wrap_phase(self.bank.phase(id), len_f);
        let center = f32::from(TABLE_CENTER);

        for a in acc.iter_mut() {
            let index = phase as usize;
            let frac = phase - index as f32;
            let x0 = f32::from(table[index]) - center;
            let x1 = f32::from(table[(index + 1) % len]) - center;
            *a += (x0 + (x1 - x0) * frac) * amplitude;

            phase += skip;
            if phase >= len_f {
                phase = wrap_phase(phase - len_f, len_f);
            }
        }

        self.bank.store_phase(id, phase);
    }

    /// Hand `block` to `sink`, counting failures instead of propagating
    /// them. Returns the number of samples the sink accepted.
    pub fn deliver<S: OutputSink + ?Sized>(&self, block: &OutputBlock, sink: &mut S) -> usize {
        match sink.write(block) {
            Ok(accepted) => {
                if accepted < block.len() {
                    let short = self.stats.record_short_write();
                    if short.is_power_of_two() {
                        tracing::warn!(accepted, short, "sink accepted a partial block");
                    }
                }
                accepted
            }
            Err(e) => {
                let errors = self.stats.record_sink_error();
                // Log with exponential backoff so a dead device does not
                // flood the log at the block rate.
                if errors.is_power_of_two() {
                    tracing::warn!(error = %e, errors, "sink write failed");
                }
                0
            }
        }
    }

    /// Render and deliver one block.
    pub fn step<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let block = self.render_block();
        self.deliver(&block, sink)
    }

    /// Render and deliver exactly `count` blocks.
    pub fn run_blocks<S: OutputSink + ?Sized>(&mut self, sink: &mut S, count: usize) {
        for _ in 0..count {
            self.step(sink);
        }
    }

    /// Render and deliver blocks back to back until `running` is cleared.
    ///
    /// Pacing comes entirely from the sink's blocking write.
    pub fn run<S: OutputSink + ?Sized>(&mut self, sink: &mut S, running: &AtomicBool) {
        tracing::info!(sample_rate = self.sample_rate, block = BLOCK_SIZE, "render loop started");
        while running.load(Ordering::Relaxed) {
            self.step(sink);
        }
        tracing::info!(stats = %self.stats.snapshot(), "render loop stopped");
    }

    /// Shared voice bank.
    pub fn bank(&self) -> &VoiceBank<N> {
        &self.bank
    }

    /// Shared counters.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// The FM bridge.
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Fold `phase` into `[0, len)`. Non-finite phases restart at 0.
#[inline]
fn wrap_phase(phase: f32, len: f32) -> f32 {
    if !phase.is_finite() {
        return 0.0;
    }
    if (0.0..len).contains(&phase) {
        return phase;
    }
    let wrapped = phase.rem_euclid(len);
    // rem_euclid can round up to exactly `len` for tiny negative inputs.
    if wrapped < len { wrapped } else { 0.0 }
}

/// Xorshift white-noise source.
struct Noise {
    state: u32,
}

impl Noise {
    fn new() -> Self {
        Self { state: 0x12345678 }
    }

    /// Uniform sample over the full signed 16-bit range.
    #[inline]
    fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        ((x >> 16) as i32 - 32768) as f32
    }
}
