//! Boundary to the external FM tone generator.
//!
//! The FM engine itself lives outside this crate. The synth only needs to
//! start notes on it and later pull rendered samples from it, which is what
//! [`FmBridge`] captures.
//!
//! Events raised by the control task are not delivered to the bridge
//! directly. They travel as [`FmEvent`] values through a bounded channel and
//! the render task, which owns the bridge, applies them at the start of the
//! next block.

use crate::voice::Voice;
use crate::waveform::Waveform;

/// Velocity sent with every FM note-on and frequency-on event.
pub const FM_VELOCITY: u8 = 100;

/// External FM renderer.
///
/// Implementations are owned by the render task and are never shared, so
/// the methods take `&mut self`.
pub trait FmBridge: Send {
    /// Prepare the engine. Called once before any other method.
    fn init(&mut self) {}

    /// Start a note by MIDI number.
    fn note_on(&mut self, note: u8, velocity: u8, patch: u16);

    /// Start a note by frequency in Hz.
    fn freq_on(&mut self, frequency: f32, velocity: u8, patch: u16);

    /// Fill `out` with the next samples.
    ///
    /// Returns how many samples were written. Anything short of `out.len()`
    /// is treated as silence for the remainder and counted as a short
    /// render.
    fn render(&mut self, out: &mut [i16]) -> usize;
}

/// Note or frequency trigger destined for the FM bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FmEvent {
    /// Start a note by MIDI number.
    NoteOn {
        /// MIDI note.
        note: u8,
        /// Trigger velocity.
        velocity: u8,
        /// Patch selector.
        patch: u16,
    },
    /// Start a note by frequency.
    FreqOn {
        /// Frequency in Hz.
        frequency: f32,
        /// Trigger velocity.
        velocity: u8,
        /// Patch selector.
        patch: u16,
    },
}

impl FmEvent {
    /// Deliver this event to `bridge`.
    pub fn dispatch<B: FmBridge + ?Sized>(self, bridge: &mut B) {
        match self {
            FmEvent::NoteOn {
                note,
                velocity,
                patch,
            } => bridge.note_on(note, velocity, patch),
            FmEvent::FreqOn {
                frequency,
                velocity,
                patch,
            } => bridge.freq_on(frequency, velocity, patch),
        }
    }
}

/// Decide whether a command applied to `voice` should re-trigger the FM
/// bridge, and with what.
///
/// Every command that leaves a voice on [`Waveform::Fm`] re-triggers it,
/// including amplitude-only or patch-only updates, so each message restarts
/// the bridge's envelope. A voice with a nonzero note triggers by note;
/// otherwise it triggers by its current frequency.
pub fn fm_retrigger(voice: &Voice, velocity: u8) -> Option<FmEvent> {
    if voice.waveform != Waveform::Fm {
        return None;
    }
    Some(match voice.note {
        Some(note) if note > 0 => FmEvent::NoteOn {
            note,
            velocity,
            patch: voice.patch,
        },
        _ => FmEvent::FreqOn {
            frequency: voice.frequency,
            velocity,
            patch: voice.patch,
        },
    })
}

/// Bridge that accepts every event and renders silence.
///
/// Used when no FM engine is linked in.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFm;

impl FmBridge for SilentFm {
    fn note_on(&mut self, _note: u8, _velocity: u8, _patch: u16) {}

    fn freq_on(&mut self, _frequency: f32, _velocity: u8, _patch: u16) {}

    fn render(&mut self, out: &mut [i16]) -> usize {
        out.fill(0);
        out.len()
    }
}

impl<B: FmBridge + ?Sized> FmBridge for Box<B> {
    fn init(&mut self) {
        (**self).init();
    }

    fn note_on(&mut self, note: u8, velocity: u8, patch: u16) {
        (**self).note_on(note, velocity, patch);
    }

    fn freq_on(&mut self, frequency: f32, velocity: u8, patch: u16) {
        (**self).freq_on(frequency, velocity, patch);
    }

    fn render(&mut self, out: &mut [i16]) -> usize {
        (**self).render(out)
    }
}
