//! Nettone Synth - network-controlled wavetable voice engine
//!
//! This crate holds the real-time core of nettone: a fixed bank of voices,
//! each playing one waveform, mixed into fixed-size blocks of signed 16-bit
//! samples and written to an output device. Voices are driven by a compact
//! text protocol, one command per UDP datagram.
//!
//! # Core Components
//!
//! ## Waveforms and Tables
//!
//! - [`Waveform`] - Sine, Square, Sawtooth, Triangle, Noise, Fm, Off
//! - [`WaveTables`] - Precomputed single-cycle tables for the four
//!   table-backed waveforms
//!
//! ## Voices
//!
//! - [`VoiceBank`] - Lock-free per-field voice storage shared by both tasks
//! - [`Voice`] - Snapshot of one voice
//! - [`midi_to_freq`] - Note to frequency (note 57 = 440 Hz)
//!
//! ## Control Protocol
//!
//! - [`Command`] - Decoded command, with [`Command::decode`] and a wire
//!   encoder via `Display`
//!
//! ```rust
//! use nettone_synth::{Command, VoiceBank};
//!
//! let bank: VoiceBank = VoiceBank::new();
//! Command::decode(b"v2n69").apply(&bank).unwrap();
//! Command::decode(b"v2f300").apply(&bank).unwrap();
//!
//! let voice = bank.get(2).unwrap();
//! assert_eq!(voice.note, Some(69));
//! assert_eq!(voice.frequency, 300.0);
//! ```
//!
//! ## Engine
//!
//! - [`SynthEngine`] - Owned startup state, split into the two task handles
//! - [`Controller`] - Control task: applies commands, raises FM triggers
//! - [`Renderer`] - Render task: mixes blocks and writes them to an
//!   [`OutputSink`]
//! - [`FmBridge`] - Boundary to the external FM tone generator
//! - [`EngineStats`] - Counters for rejected commands and collaborator faults
//!
//! # Example: Offline Render
//!
//! ```rust
//! use nettone_synth::{BLOCK_SIZE, MemorySink, SilentFm, SynthEngine};
//!
//! let engine: SynthEngine<SilentFm> = SynthEngine::new(44100, SilentFm);
//! let (controller, mut renderer) = engine.split();
//!
//! controller.handle_datagram(b"v0w0f220a0.5").unwrap();
//!
//! let mut sink = MemorySink::new();
//! renderer.run_blocks(&mut sink, 4);
//! assert_eq!(sink.samples().len(), 4 * BLOCK_SIZE);
//! ```

pub mod engine;
pub mod fm;
pub mod protocol;
pub mod sink;
pub mod stats;
pub mod tables;
pub mod voice;
pub mod waveform;

pub use engine::{
    BLOCK_SIZE, Controller, DEFAULT_SAMPLE_RATE, FM_QUEUE_DEPTH, OutputBlock, Renderer,
    SynthEngine,
};
pub use fm::{FM_VELOCITY, FmBridge, FmEvent, SilentFm, fm_retrigger};
pub use protocol::{Command, CommandError, DEFAULT_CONTROL_PORT, MAX_COMMAND_LEN};
pub use sink::{MemorySink, OutputSink, SinkError};
pub use stats::{EngineStats, StatsSnapshot};
pub use tables::{SHAPE_TABLE_LEN, SINE_TABLE_LEN, TABLE_CENTER, WaveTables};
pub use voice::{A440_NOTE, VOICE_COUNT, Voice, VoiceBank, midi_to_freq};
pub use waveform::Waveform;
