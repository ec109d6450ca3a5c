//! Error types for tune selection, sample packing and buffer generation.

/// Malformed or contradictory playback parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown sample format: {0} (expected S16_LE, S16_BE, S32_LE or S32_BE)")]
    UnknownFormat(String),

    #[error("unknown tune: {0}")]
    UnknownTune(String),

    #[error("bit pattern must contain at least one symbol")]
    EmptyPattern,

    #[error("invalid rate {rate}: rate must be a multiple of bitrate {bit_rate}")]
    RateNotMultiple { rate: u32, bit_rate: u32 },

    #[error("too many symbols for bitrate: {symbols} symbols at {bit_rate} bits/s")]
    TooManySymbols { symbols: usize, bit_rate: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A sample amplitude does not fit the selected format.
    #[error("sample value {value} exceeds the representable range (max {max})")]
    Encoding { value: i64, max: i64 },

    /// The generated buffer does not hold exactly one second of stereo audio.
    #[error("generated buffer is {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
