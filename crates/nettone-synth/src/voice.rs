//! Lock-free voice bank shared by the control and render tasks.
//!
//! Each voice field is stored in its own atomic and accessed with relaxed
//! ordering. A reader may observe a voice mid-update (for example a new
//! frequency paired with the previous waveform); such tearing lasts at most
//! one render block and is accepted. Neither side ever waits on the other.
//!
//! `phase` is written only by the render task. The control task never
//! touches it except through [`VoiceBank::reset_all`].

use crate::waveform::Waveform;
use core::sync::atomic::{AtomicI16, AtomicU8, AtomicU16, AtomicU32, Ordering};

/// Number of voices in the default bank.
pub const VOICE_COUNT: usize = 10;

/// MIDI note that maps to 440 Hz.
///
/// This is an octave below the usual A4 = 69 convention and is part of the
/// wire contract: existing clients pick notes against this mapping.
pub const A440_NOTE: u8 = 57;

/// Sentinel stored in the note atomic when no note has been received.
const NOTE_UNSET: i16 = -1;

/// Convert a MIDI note number to a frequency in Hz.
///
/// Uses equal temperament with note 57 at 440 Hz, so note 69 is 880 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (f32::from(note) - f32::from(A440_NOTE)) / 12.0)
}

/// Lock-free `f32` cell.
#[derive(Debug, Default)]
pub(crate) struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub(crate) fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub(crate) fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Point-in-time copy of one voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    /// Active waveform.
    pub waveform: Waveform,
    /// Fractional position into the active table.
    pub phase: f32,
    /// FM patch selector.
    pub patch: u16,
    /// Last note received, if any.
    pub note: Option<u8>,
    /// Oscillator frequency in Hz.
    pub frequency: f32,
    /// Linear output gain.
    pub amplitude: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            waveform: Waveform::Off,
            phase: 0.0,
            patch: 0,
            note: None,
            frequency: 0.0,
            amplitude: 0.0,
        }
    }
}

#[derive(Debug)]
struct VoiceCell {
    waveform: AtomicU8,
    phase: AtomicF32,
    patch: AtomicU16,
    note: AtomicI16,
    frequency: AtomicF32,
    amplitude: AtomicF32,
}

impl VoiceCell {
    fn new() -> Self {
        Self {
            waveform: AtomicU8::new(Waveform::Off.code()),
            phase: AtomicF32::new(0.0),
            patch: AtomicU16::new(0),
            note: AtomicI16::new(NOTE_UNSET),
            frequency: AtomicF32::new(0.0),
            amplitude: AtomicF32::new(0.0),
        }
    }

    fn reset(&self) {
        self.waveform.store(Waveform::Off.code(), Ordering::Relaxed);
        self.phase.store(0.0);
        self.patch.store(0, Ordering::Relaxed);
        self.note.store(NOTE_UNSET, Ordering::Relaxed);
        self.frequency.store(0.0);
        self.amplitude.store(0.0);
    }

    fn waveform(&self) -> Waveform {
        // Only valid codes are ever stored.
        Waveform::from_code(self.waveform.load(Ordering::Relaxed)).unwrap_or(Waveform::Off)
    }

    fn snapshot(&self) -> Voice {
        let note = self.note.load(Ordering::Relaxed);
        Voice {
            waveform: self.waveform(),
            phase: self.phase.load(),
            patch: self.patch.load(Ordering::Relaxed),
            note: u8::try_from(note).ok(),
            frequency: self.frequency.load(),
            amplitude: self.amplitude.load(),
        }
    }
}

/// Fixed-size bank of `N` voices.
///
/// All setters take `&self` and return `None` when `id` is outside the bank,
/// so callers can share the bank behind an `Arc` without any locking.
///
/// # Example
///
/// ```rust
/// use nettone_synth::{VoiceBank, Waveform};
///
/// let bank: VoiceBank<4> = VoiceBank::new();
/// bank.set_waveform(1, Waveform::Sine).unwrap();
/// bank.set_note(1, 57).unwrap();
/// assert_eq!(bank.get(1).unwrap().frequency, 440.0);
/// assert!(bank.set_amplitude(4, 1.0).is_none());
/// ```
#[derive(Debug)]
pub struct VoiceBank<const N: usize = VOICE_COUNT> {
    cells: [VoiceCell; N],
}

impl<const N: usize> Default for VoiceBank<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> VoiceBank<N> {
    /// Create a bank with every voice off, silent, and at phase zero.
    pub fn new() -> Self {
        Self {
            cells: core::array::from_fn(|_| VoiceCell::new()),
        }
    }

    /// Number of voices.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the bank has no voices.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Snapshot of voice `id`.
    pub fn get(&self, id: usize) -> Option<Voice> {
        self.cells.get(id).map(VoiceCell::snapshot)
    }

    /// Snapshot of every voice.
    pub fn snapshot(&self) -> [Voice; N] {
        core::array::from_fn(|i| self.cells[i].snapshot())
    }

    /// Set the note and derive the frequency from it.
    pub fn set_note(&self, id: usize, note: u8) -> Option<()> {
        let cell = self.cells.get(id)?;
        cell.note.store(i16::from(note), Ordering::Relaxed);
        cell.frequency.store(midi_to_freq(note));
        Some(())
    }

    /// Set the frequency directly, leaving the note untouched.
    pub fn set_frequency(&self, id: usize, hz: f32) -> Option<()> {
        self.cells.get(id)?.frequency.store(hz);
        Some(())
    }

    /// Set the active waveform.
    pub fn set_waveform(&self, id: usize, waveform: Waveform) -> Option<()> {
        self.cells
            .get(id)?
            .waveform
            .store(waveform.code(), Ordering::Relaxed);
        Some(())
    }

    /// Set the FM patch selector.
    pub fn set_patch(&self, id: usize, patch: u16) -> Option<()> {
        self.cells.get(id)?.patch.store(patch, Ordering::Relaxed);
        Some(())
    }

    /// Set the linear output gain.
    pub fn set_amplitude(&self, id: usize, amplitude: f32) -> Option<()> {
        self.cells.get(id)?.amplitude.store(amplitude);
        Some(())
    }

    /// Return every voice to its startup state.
    pub fn reset_all(&self) {
        for cell in &self.cells {
            cell.reset();
        }
    }

    #[inline]
    pub(crate) fn waveform(&self, id: usize) -> Waveform {
        self.cells[id].waveform()
    }

    #[inline]
    pub(crate) fn frequency(&self, id: usize) -> f32 {
        self.cells[id].frequency.load()
    }

    #[inline]
    pub(crate) fn amplitude(&self, id: usize) -> f32 {
        self.cells[id].amplitude.load()
    }

    #[inline]
    pub(crate) fn phase(&self, id: usize) -> f32 {
        self.cells[id].phase.load()
    }

    #[inline]
    pub(crate) fn store_phase(&self, id: usize, phase: f32) {
        self.cells[id].phase.store(phase);
    }
}
