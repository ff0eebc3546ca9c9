//! Voice waveform kinds and their wire codes.

/// Waveform a voice is currently producing.
///
/// The discriminants are the codes carried by the `w` field of the control
/// protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Waveform {
    /// Interpolated lookup into the sine table.
    Sine = 0,
    /// Interpolated lookup into the square table.
    Square = 1,
    /// Interpolated lookup into the sawtooth table.
    Sawtooth = 2,
    /// Interpolated lookup into the triangle table.
    Triangle = 3,
    /// Uniform white noise, drawn fresh for every sample.
    Noise = 4,
    /// Delegated to the external FM bridge.
    Fm = 5,
    /// Silent; the voice is skipped by the renderer.
    #[default]
    Off = 6,
}

impl Waveform {
    /// Every waveform, in wire-code order.
    pub const ALL: [Waveform; 7] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
        Waveform::Noise,
        Waveform::Fm,
        Waveform::Off,
    ];

    /// Decode a wire code, returning `None` for codes outside `0..=6`.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Wire code of this waveform.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether this waveform is rendered from a lookup table.
    #[inline]
    pub fn is_table_backed(self) -> bool {
        matches!(
            self,
            Waveform::Sine | Waveform::Square | Waveform::Sawtooth | Waveform::Triangle
        )
    }

    /// Lowercase name, as used in logs and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Noise => "noise",
            Waveform::Fm => "fm",
            Waveform::Off => "off",
        }
    }
}

impl core::fmt::Display for Waveform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for Waveform {
    type Err = String;

    /// Parse either a lowercase name (`"saw"` is accepted for sawtooth) or a
    /// numeric wire code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let named = match lower.as_str() {
            "sine" => Some(Waveform::Sine),
            "square" => Some(Waveform::Square),
            "saw" | "sawtooth" => Some(Waveform::Sawtooth),
            "triangle" | "tri" => Some(Waveform::Triangle),
            "noise" => Some(Waveform::Noise),
            "fm" => Some(Waveform::Fm),
            "off" => Some(Waveform::Off),
            _ => None,
        };
        named
            .or_else(|| lower.parse::<u8>().ok().and_then(Waveform::from_code))
            .ok_or_else(|| format!("unknown waveform: '{}'", s))
    }
}
