//! Text control protocol.
//!
//! One datagram carries one command: a run of single-letter lowercase tags,
//! each immediately followed by a decimal literal, with no separators.
//!
//! | tag | field     | literal | notes                                   |
//! |-----|-----------|---------|-----------------------------------------|
//! | `v` | voice     | integer | defaults to 0 when absent               |
//! | `n` | note      | integer | 0..=127, also sets the frequency        |
//! | `w` | waveform  | integer | wire code, see [`Waveform`]             |
//! | `p` | patch     | integer | FM patch, 0..=65535                     |
//! | `f` | frequency | float   | Hz, overrides a note-derived frequency  |
//! | `a` | amplitude | float   | linear gain                             |
//!
//! `v0w0f220a0.5` selects voice 0, sine, 220 Hz at half amplitude.
//!
//! # Field boundaries
//!
//! A byte starts a new field only if it lies in `b'a'..=b'z'`. Firmware in
//! the field has shipped with the test written as `b >= 'a' || b <= 'z'`,
//! which is true for every byte and splits the payload after each character;
//! that only worked for payload shapes where every literal was a single
//! digit long or happened to be re-read correctly by a prefix parser. The
//! range test here is the corrected one. End of input and a NUL byte also
//! close the current field.
//!
//! # Literals
//!
//! Literals are read with leading-prefix semantics: optional whitespace, an
//! optional sign, then digits (and, for float fields, an optional fraction).
//! Trailing junk is ignored. A field whose literal has no digits, is
//! negative, is not finite, or is out of range for the field is left unset
//! and has no effect. Unknown tags are ignored. Repeated tags keep the last
//! valid value.

use crate::voice::{Voice, VoiceBank};
use crate::waveform::Waveform;
use core::fmt;

/// Largest payload the control socket reads per datagram.
pub const MAX_COMMAND_LEN: usize = 80;

/// UDP port the synth listens on unless configured otherwise.
pub const DEFAULT_CONTROL_PORT: u16 = 6001;

/// Errors raised while applying a decoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The target voice does not exist in the bank.
    #[error("voice {voice} out of range (bank has {count} voices)")]
    VoiceOutOfRange {
        /// Requested voice index.
        voice: usize,
        /// Number of voices in the bank.
        count: usize,
    },
}

/// One decoded control command.
///
/// Every field is optional; unset fields leave the voice untouched.
///
/// ```rust
/// use nettone_synth::{Command, Waveform};
///
/// let cmd = Command::decode(b"v0w0f220a0.5");
/// assert_eq!(cmd.voice, Some(0));
/// assert_eq!(cmd.waveform, Some(Waveform::Sine));
/// assert_eq!(cmd.frequency, Some(220.0));
/// assert_eq!(cmd.amplitude, Some(0.5));
/// assert_eq!(cmd.to_string(), "v0w0f220a0.5");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Command {
    /// Target voice. Negative or overflowing literals decode to
    /// `usize::MAX` so the command is rejected instead of landing on
    /// voice 0.
    pub voice: Option<usize>,
    /// MIDI note.
    pub note: Option<u8>,
    /// Waveform.
    pub waveform: Option<Waveform>,
    /// FM patch.
    pub patch: Option<u16>,
    /// Frequency in Hz.
    pub frequency: Option<f32>,
    /// Linear amplitude.
    pub amplitude: Option<f32>,
}

impl Command {
    /// Empty command targeting `voice`.
    pub fn for_voice(voice: usize) -> Self {
        Self {
            voice: Some(voice),
            ..Self::default()
        }
    }

    /// Command that switches `voice` off and zeroes its amplitude.
    pub fn silence(voice: usize) -> Self {
        Self::for_voice(voice)
            .with_waveform(Waveform::Off)
            .with_amplitude(0.0)
    }

    /// Set the note.
    pub fn with_note(mut self, note: u8) -> Self {
        self.note = Some(note);
        self
    }

    /// Set the waveform.
    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = Some(waveform);
        self
    }

    /// Set the FM patch.
    pub fn with_patch(mut self, patch: u16) -> Self {
        self.patch = Some(patch);
        self
    }

    /// Set the frequency.
    pub fn with_frequency(mut self, hz: f32) -> Self {
        self.frequency = Some(hz);
        self
    }

    /// Set the amplitude.
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Decode one datagram payload. Never fails; see the module docs for
    /// how malformed fields degrade.
    pub fn decode(payload: &[u8]) -> Self {
        let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
        let payload = &payload[..end];

        let mut cmd = Self::default();
        let mut tag = None;
        let mut start = 0;

        for (i, &b) in payload.iter().enumerate() {
            if b.is_ascii_lowercase() {
                if let Some(t) = tag {
                    cmd.close_field(t, &payload[start..i]);
                }
                tag = Some(b);
                start = i + 1;
            }
        }
        if let Some(t) = tag {
            cmd.close_field(t, &payload[start..]);
        }

        cmd
    }

    /// Store the literal for `tag`. Invalid literals leave the field as it
    /// was, so an earlier valid duplicate survives.
    fn close_field(&mut self, tag: u8, literal: &[u8]) {
        match tag {
            b'v' => {
                let voice = parse_int(literal).map(|lit| {
                    lit.value()
                        .and_then(|v| usize::try_from(v).ok())
                        .unwrap_or(usize::MAX)
                });
                self.voice = voice.or(self.voice);
            }
            b'n' => {
                let note = parse_int(literal)
                    .and_then(IntLiteral::value)
                    .and_then(|n| u8::try_from(n).ok())
                    .filter(|&n| n <= 127);
                self.note = note.or(self.note);
            }
            b'w' => {
                let waveform = parse_int(literal)
                    .and_then(IntLiteral::value)
                    .and_then(|w| u8::try_from(w).ok())
                    .and_then(Waveform::from_code);
                self.waveform = waveform.or(self.waveform);
            }
            b'p' => {
                let patch = parse_int(literal)
                    .and_then(IntLiteral::value)
                    .and_then(|p| u16::try_from(p).ok());
                self.patch = patch.or(self.patch);
            }
            b'f' => {
                let hz = parse_float(literal).filter(|f| *f >= 0.0);
                self.frequency = hz.or(self.frequency);
            }
            b'a' => {
                let amplitude = parse_float(literal).filter(|a| *a >= 0.0);
                self.amplitude = amplitude.or(self.amplitude);
            }
            _ => {}
        }
    }

    /// Apply this command to `bank` and return the resulting voice.
    ///
    /// Fields are applied in a fixed order: note (which also sets the
    /// frequency), waveform, patch, frequency, amplitude. A command that
    /// carries both a note and a frequency therefore ends up at the explicit
    /// frequency while still recording the note.
    pub fn apply<const N: usize>(&self, bank: &VoiceBank<N>) -> Result<Voice, CommandError> {
        let id = self.voice.unwrap_or(0);
        let out_of_range = || CommandError::VoiceOutOfRange {
            voice: id,
            count: N,
        };

        if let Some(note) = self.note {
            bank.set_note(id, note).ok_or_else(out_of_range)?;
        }
        if let Some(waveform) = self.waveform {
            bank.set_waveform(id, waveform).ok_or_else(out_of_range)?;
        }
        if let Some(patch) = self.patch {
            bank.set_patch(id, patch).ok_or_else(out_of_range)?;
        }
        if let Some(hz) = self.frequency {
            bank.set_frequency(id, hz).ok_or_else(out_of_range)?;
        }
        if let Some(amplitude) = self.amplitude {
            bank.set_amplitude(id, amplitude).ok_or_else(out_of_range)?;
        }

        bank.get(id).ok_or_else(out_of_range)
    }
}

impl fmt::Display for Command {
    /// Wire form. Float fields use `Display`, which never emits exponents,
    /// so the output always decodes back to the same command.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(v) = self.voice {
            write!(f, "v{}", v)?;
        }
        if let Some(w) = self.waveform {
            write!(f, "w{}", w.code())?;
        }
        if let Some(n) = self.note {
            write!(f, "n{}", n)?;
        }
        if let Some(p) = self.patch {
            write!(f, "p{}", p)?;
        }
        if let Some(hz) = self.frequency {
            write!(f, "f{}", hz)?;
        }
        if let Some(a) = self.amplitude {
            write!(f, "a{}", a)?;
        }
        Ok(())
    }
}

fn skip_whitespace(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(s.len());
    &s[start..]
}

/// A signed integer prefix, or the fact that its digits do not fit an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntLiteral {
    Value(i64),
    Overflow,
}

impl IntLiteral {
    fn value(self) -> Option<i64> {
        match self {
            IntLiteral::Value(v) => Some(v),
            IntLiteral::Overflow => None,
        }
    }
}

/// Signed integer prefix. `None` when there are no digits.
fn parse_int(s: &[u8]) -> Option<IntLiteral> {
    let s = skip_whitespace(s);
    let (negative, digits) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }
    let magnitude = digits[..len]
        .iter()
        .try_fold(0i64, |acc, &d| acc.checked_mul(10)?.checked_add(i64::from(d - b'0')));
    Some(match magnitude {
        Some(m) if negative => IntLiteral::Value(-m),
        Some(m) => IntLiteral::Value(m),
        None => IntLiteral::Overflow,
    })
}

/// Decimal float prefix (`[+-]digits[.digits]`), finite values only.
fn parse_float(s: &[u8]) -> Option<f32> {
    let s = skip_whitespace(s);
    let mut end = usize::from(matches!(s.first(), Some(b'-' | b'+')));
    let int_digits = s[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;
    let mut frac_digits = 0;
    if s.get(end) == Some(&b'.') {
        frac_digits = s[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    core::str::from_utf8(&s[..end])
        .ok()?
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_payload() {
        let cmd = Command::decode(b"v0w0f220a0.5");
        assert_eq!(
            cmd,
            Command::for_voice(0)
                .with_waveform(Waveform::Sine)
                .with_frequency(220.0)
                .with_amplitude(0.5)
        );
    }

    #[test]
    fn multi_digit_literals_are_not_split() {
        let cmd = Command::decode(b"v12n100p1234f1234.75a10");
        assert_eq!(cmd.voice, Some(12));
        assert_eq!(cmd.note, Some(100));
        assert_eq!(cmd.patch, Some(1234));
        assert_eq!(cmd.frequency, Some(1234.75));
        assert_eq!(cmd.amplitude, Some(10.0));
    }

    #[test]
    fn uppercase_and_punctuation_do_not_start_fields() {
        let cmd = Command::decode(b"v3Xa0.25!");
        assert_eq!(cmd.voice, Some(3));
        assert_eq!(cmd.amplitude, Some(0.25));
    }

    #[test]
    fn empty_literal_is_unset() {
        let cmd = Command::decode(b"vnw");
        assert!(cmd.is_empty());
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let cmd = Command::decode(b"x99v1z3a1");
        assert_eq!(cmd, Command::for_voice(1).with_amplitude(1.0));
    }

    #[test]
    fn out_of_range_literals_are_unset() {
        let cmd = Command::decode(b"n128w7p70000f-3a-0.5");
        assert!(cmd.is_empty(), "{cmd:?}");
    }

    #[test]
    fn negative_voice_is_never_voice_zero() {
        assert_eq!(Command::decode(b"v-1a1").voice, Some(usize::MAX));
        assert_eq!(
            Command::decode(b"v99999999999999999999999a1").voice,
            Some(usize::MAX)
        );
    }

    #[test]
    fn overflowing_literals_are_flagged() {
        assert_eq!(parse_int(b"42x"), Some(IntLiteral::Value(42)));
        assert_eq!(parse_int(b"-7"), Some(IntLiteral::Value(-7)));
        assert_eq!(
            parse_int(b"9223372036854775807"),
            Some(IntLiteral::Value(i64::MAX))
        );
        assert_eq!(parse_int(b"9223372036854775808"), Some(IntLiteral::Overflow));
        assert_eq!(parse_int(b"-"), None);
    }

    #[test]
    fn overflowing_voice_is_rejected_and_other_fields_unset() {
        let bank: VoiceBank = VoiceBank::new();
        let cmd = Command::decode(b"v18446744073709551616w0a1");
        assert_eq!(cmd.voice, Some(usize::MAX));
        assert!(cmd.apply(&bank).is_err());

        let cmd = Command::decode(b"v1n99999999999999999999p99999999999999999999");
        assert_eq!(cmd, Command::for_voice(1));
    }

    #[test]
    fn integer_fields_stop_at_fraction() {
        assert_eq!(Command::decode(b"v2.9").voice, Some(2));
    }

    #[test]
    fn float_fields_accept_bare_fraction_and_sign() {
        assert_eq!(Command::decode(b"a.5").amplitude, Some(0.5));
        assert_eq!(Command::decode(b"f+440.").frequency, Some(440.0));
        assert_eq!(Command::decode(b"a-").amplitude, None);
        assert_eq!(Command::decode(b"a.").amplitude, None);
    }

    #[test]
    fn nul_terminates_payload() {
        let cmd = Command::decode(b"v1a0.5\0w3");
        assert_eq!(cmd.waveform, None);
        assert_eq!(cmd.amplitude, Some(0.5));
    }

    #[test]
    fn last_valid_duplicate_wins() {
        assert_eq!(Command::decode(b"a0.1a0.2").amplitude, Some(0.2));
        assert_eq!(Command::decode(b"a0.1a").amplitude, Some(0.1));
    }

    #[test]
    fn leading_bytes_before_first_tag_are_ignored() {
        assert_eq!(Command::decode(b"42 v1").voice, Some(1));
    }

    #[test]
    fn apply_order_lets_frequency_override_note() {
        let bank: VoiceBank<4> = VoiceBank::new();
        let voice = Command::decode(b"v1n57f300").apply(&bank).unwrap();
        assert_eq!(voice.note, Some(57));
        assert_eq!(voice.frequency, 300.0);
    }

    #[test]
    fn apply_defaults_to_voice_zero() {
        let bank: VoiceBank<2> = VoiceBank::new();
        Command::decode(b"a0.7").apply(&bank).unwrap();
        assert_eq!(bank.get(0).unwrap().amplitude, 0.7);
    }

    #[test]
    fn apply_rejects_missing_voice() {
        let bank: VoiceBank<2> = VoiceBank::new();
        let err = Command::decode(b"v2a1").apply(&bank).unwrap_err();
        assert_eq!(err, CommandError::VoiceOutOfRange { voice: 2, count: 2 });
        assert_eq!(bank.get(0).unwrap().amplitude, 0.0);
        assert_eq!(bank.get(1).unwrap().amplitude, 0.0);
    }

    #[test]
    fn display_round_trips() {
        let cmd = Command::for_voice(3)
            .with_waveform(Waveform::Fm)
            .with_note(64)
            .with_patch(12)
            .with_frequency(0.001)
            .with_amplitude(0.75);
        assert_eq!(Command::decode(cmd.to_string().as_bytes()), cmd);
    }

    #[test]
    fn silence_turns_voice_off() {
        assert_eq!(Command::silence(4).to_string(), "v4w6a0");
    }
}
