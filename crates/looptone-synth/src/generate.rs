//! Waveform generation.
//!
//! Produces exactly one second of encoded stereo audio for a [`TuneSpec`]. The result is
//! meant to be written to the sink over and over, so every tune is periodic within the
//! second: 440 Hz and 110 Hz both complete whole cycles, and bit patterns repeat over
//! `bit_rate` slots.

use std::f64::consts::PI;

use crate::config::{CHANNELS, PlaybackConfig};
use crate::error::{ConfigError, Error, Result};
use crate::format::{SampleFormat, SampleFrame};
use crate::tune::{SQUARE_BIT_RATE, Symbol, TuneSpec};

/// Frequency of the high sine tone; the low tone is a quarter of it.
pub const CARRIER_HZ: f64 = 440.0;

/// One second of encoded stereo PCM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioBuffer {
    bytes: Vec<u8>,
    sample_format: SampleFormat,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> usize {
        self.bytes.len() / self.sample_format.frame_width()
    }

    /// Decode the frame at `index`.
    pub fn frame(&self, index: usize) -> Option<SampleFrame> {
        let width = self.sample_format.frame_width();
        let start = index.checked_mul(width)?;
        let bytes = self.bytes.get(start..start.checked_add(width)?)?;
        self.sample_format.decode_frame(bytes)
    }
}

/// Generate the loop buffer for `config`.
///
/// Fails on bit patterns that do not fit the sample rate, and if the encoded length is not
/// exactly `sample_rate * CHANNELS * bytes_per_sample`.
pub fn generate(config: &PlaybackConfig) -> Result<AudioBuffer> {
    let fmt = config.sample_format;
    let rate = config.sample_rate;
    let expected = config.buffer_len();
    let mut bytes = Vec::with_capacity(expected);

    match &config.tune {
        TuneSpec::Sine => fill_sine(fmt, rate, &mut bytes, |p| (Some(p), Some(p)))?,
        TuneSpec::SineLowHigh => fill_sine(fmt, rate, &mut bytes, |p| (Some(p / 4.0), Some(p)))?,
        TuneSpec::SineLowOnly => fill_sine(fmt, rate, &mut bytes, |p| (Some(p / 4.0), None))?,
        TuneSpec::SineHighOnly => fill_sine(fmt, rate, &mut bytes, |p| (None, Some(p)))?,
        TuneSpec::Square => fill_bit_pattern(
            fmt,
            rate,
            SQUARE_BIT_RATE,
            &[Symbol::Low, Symbol::High],
            &mut bytes,
        )?,
        TuneSpec::BitPattern { bit_rate, symbols } => {
            fill_bit_pattern(fmt, rate, *bit_rate, symbols, &mut bytes)?
        }
    }

    if bytes.len() != expected {
        return Err(Error::BufferLength {
            expected,
            actual: bytes.len(),
        });
    }

    tracing::debug!(
        tune = %config.tune,
        format = %fmt,
        rate_hz = rate,
        channels = CHANNELS,
        bytes = bytes.len(),
        "generated loop buffer"
    );

    Ok(AudioBuffer {
        bytes,
        sample_format: fmt,
        sample_rate: rate,
    })
}

/// Fill one second of sine output.
///
/// `phases` maps the 440 Hz carrier phase to a phase per channel; `None` is silence.
fn fill_sine<F>(fmt: SampleFormat, rate: u32, out: &mut Vec<u8>, phases: F) -> Result<()>
where
    F: Fn(f64) -> (Option<f64>, Option<f64>),
{
    let max = fmt.max_amplitude();
    let step = 2.0 * PI * CARRIER_HZ / rate as f64;
    let level = |phase: Option<f64>| phase.map_or(0, |p| (p.sin() * max as f64).round() as i64);

    for i in 0..rate {
        let (left, right) = phases(i as f64 * step);
        fmt.encode_frame_into(SampleFrame::new(level(left), level(right)), out)?;
    }
    Ok(())
}

/// Fill one second of a two-level wave.
///
/// Each of the `bit_rate` slots takes `symbols[slot % symbols.len()]` and holds it for
/// `rate / bit_rate` frames at full negative (low) or full positive (high) amplitude.
fn fill_bit_pattern(
    fmt: SampleFormat,
    rate: u32,
    bit_rate: u32,
    symbols: &[Symbol],
    out: &mut Vec<u8>,
) -> Result<()> {
    if symbols.is_empty() {
        return Err(ConfigError::EmptyPattern.into());
    }
    if bit_rate == 0 || rate % bit_rate != 0 {
        return Err(ConfigError::RateNotMultiple { rate, bit_rate }.into());
    }
    if symbols.len() > bit_rate as usize {
        return Err(ConfigError::TooManySymbols {
            symbols: symbols.len(),
            bit_rate,
        }
        .into());
    }

    let max = fmt.max_amplitude();
    let mut low = Vec::with_capacity(fmt.frame_width());
    fmt.encode_frame_into(SampleFrame::mono(-max), &mut low)?;
    let mut high = Vec::with_capacity(fmt.frame_width());
    fmt.encode_frame_into(SampleFrame::mono(max), &mut high)?;

    let frames_per_symbol = (rate / bit_rate) as usize;
    for slot in 0..bit_rate as usize {
        let frame = match symbols[slot % symbols.len()] {
            Symbol::Low => &low,
            Symbol::High => &high,
        };
        for _ in 0..frames_per_symbol {
            out.extend_from_slice(frame);
        }
    }
    Ok(())
}
