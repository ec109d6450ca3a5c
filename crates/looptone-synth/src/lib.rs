//! Waveform synthesis for looptone.
//!
//! Builds a one-second stereo PCM buffer for a [`TuneSpec`] in one of the signed integer
//! [`SampleFormat`]s. Playing it is left to the caller.

pub mod config;
pub mod error;
pub mod format;
pub mod generate;
pub mod tune;

pub use config::{
    CHANNELS, DEFAULT_DEVICE, DEFAULT_SAMPLE_RATE, PlaybackConfig, infer_sample_format,
};
pub use error::{ConfigError, Error, Result};
pub use format::{ByteOrder, SampleFormat, SampleFrame};
pub use generate::{AudioBuffer, CARRIER_HZ, generate};
pub use tune::{SQUARE_BIT_RATE, Symbol, TuneSpec};
