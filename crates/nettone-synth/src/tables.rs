//! Precomputed single-cycle waveform tables.
//!
//! Every table stores one period as unsigned 16-bit magnitudes centered at
//! [`TABLE_CENTER`]. The renderer remaps entries to signed values by
//! subtracting the center before interpolating.
//!
//! The sine table is much longer than the others since it carries most of
//! the pure-tone material and benefits from the finer resolution.

use crate::waveform::Waveform;
use core::f64::consts::PI;

/// Length of the sine table.
pub const SINE_TABLE_LEN: usize = 16383;

/// Length of the square, sawtooth, and triangle tables.
pub const SHAPE_TABLE_LEN: usize = 2047;

/// Zero crossing of the unsigned table encoding.
pub const TABLE_CENTER: u16 = 32768;

/// Read-only bank of the four table-backed waveforms.
///
/// Built once at startup and shared by every voice. Nothing mutates a table
/// after [`WaveTables::build`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveTables {
    sine: Box<[u16]>,
    square: Box<[u16]>,
    sawtooth: Box<[u16]>,
    triangle: Box<[u16]>,
}

impl WaveTables {
    /// Generate all four tables.
    ///
    /// Pure and deterministic: the same binary always produces the same
    /// tables.
    pub fn build() -> Self {
        let (square, sawtooth, triangle) = shape_tables(SHAPE_TABLE_LEN);
        Self {
            sine: sine_table(SINE_TABLE_LEN),
            square,
            sawtooth,
            triangle,
        }
    }

    /// Table for `waveform`, or `None` if it is not table-backed.
    #[inline]
    pub fn get(&self, waveform: Waveform) -> Option<&[u16]> {
        match waveform {
            Waveform::Sine => Some(&self.sine),
            Waveform::Square => Some(&self.square),
            Waveform::Sawtooth => Some(&self.sawtooth),
            Waveform::Triangle => Some(&self.triangle),
            Waveform::Noise | Waveform::Fm | Waveform::Off => None,
        }
    }

    /// Length of the table backing `waveform` (0 if not table-backed).
    #[inline]
    pub fn len_of(&self, waveform: Waveform) -> usize {
        self.get(waveform).map_or(0, <[u16]>::len)
    }
}

impl Default for WaveTables {
    fn default() -> Self {
        Self::build()
    }
}

fn sine_table(len: usize) -> Box<[u16]> {
    (0..len)
        .map(|i| {
            let s = libm::sin(2.0 * PI * i as f64 / len as f64);
            (f64::from(TABLE_CENTER) + libm::round(s * 32767.0)) as u16
        })
        .collect()
}

/// Square, sawtooth, and triangle tables of equal length.
///
/// The first half is `i < len / 2` (integer division) while the triangle
/// slope divides by the exact half length, so for odd lengths the triangle
/// peaks at index `len / 2`.
fn shape_tables(len: usize) -> (Box<[u16]>, Box<[u16]>, Box<[u16]>) {
    let half = len / 2;
    let half_f = len as f32 / 2.0;

    let mut square = vec![0u16; len];
    let mut sawtooth = vec![0u16; len];
    let mut triangle = vec![0u16; len];

    for i in 0..len {
        let x = i as f32;
        if i < half {
            square[i] = 0;
            triangle[i] = ((x / half_f) * 65535.0) as u16;
        } else {
            square[i] = 0xFFFF;
            // Float-to-int casts saturate, so the slightly negative ramp at
            // the peak index lands on 0 and the peak stays at 65535.
            triangle[i] = 65535 - (((x - half_f) / half_f) * 65535.0) as u16;
        }
        sawtooth[i] = ((x / len as f32) * 65535.0) as u16;
    }

    (
        square.into_boxed_slice(),
        sawtooth.into_boxed_slice(),
        triangle.into_boxed_slice(),
    )
}
