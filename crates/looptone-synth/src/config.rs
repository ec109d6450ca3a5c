//! Playback parameters.
//!
//! A [`PlaybackConfig`] fixes the device, sample format, rate and tune for a run. The sample
//! format follows the device when not given explicitly.

use crate::format::SampleFormat;
use crate::tune::TuneSpec;

/// ALSA mixing device used when no `-D` is given.
pub const DEFAULT_DEVICE: &str = "dmix";
/// Frames per second of generated audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
/// Output is always interleaved stereo.
pub const CHANNELS: u16 = 2;

/// Everything needed to generate and play the loop buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Sink endpoint name, passed through to the sink unchanged.
    pub device: String,
    pub sample_format: SampleFormat,
    /// Frames per second.
    pub sample_rate: u32,
    pub tune: TuneSpec,
}

impl PlaybackConfig {
    /// Build a config at [`DEFAULT_SAMPLE_RATE`], inferring the format from the device when
    /// none is given.
    pub fn new(
        device: impl Into<String>,
        sample_format: Option<SampleFormat>,
        tune: TuneSpec,
    ) -> Self {
        let device = device.into();
        let sample_format = sample_format.unwrap_or_else(|| infer_sample_format(&device));
        Self {
            device,
            sample_format,
            sample_rate: DEFAULT_SAMPLE_RATE,
            tune,
        }
    }

    /// Byte length of one second of stereo audio in this format.
    pub fn buffer_len(&self) -> usize {
        self.sample_rate as usize * CHANNELS as usize * self.sample_format.bytes_per_sample()
    }
}

/// `dmix` only accepts 32-bit little endian; everything else gets 16-bit little endian.
pub fn infer_sample_format(device: &str) -> SampleFormat {
    if is_mixing_device(device) {
        SampleFormat::S32Le
    } else {
        SampleFormat::S16Le
    }
}

fn is_mixing_device(device: &str) -> bool {
    device == "dmix" || device.starts_with("dmix:")
}
