//! PCM sample formats and stereo frame packing.
//!
//! Frames are always two channels, written left then right. Each channel is a
//! signed integer of the format's width in the format's byte order.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Error, Result};

/// Signed integer PCM formats understood by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    S16Le,
    S16Be,
    S32Le,
    S32Be,
}

/// Byte order of a single channel sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// One instant of stereo audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleFrame {
    pub left: i64,
    pub right: i64,
}

impl SampleFrame {
    pub fn new(left: i64, right: i64) -> Self {
        Self { left, right }
    }

    /// Same value on both channels.
    pub fn mono(value: i64) -> Self {
        Self::new(value, value)
    }
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 4] = [
        SampleFormat::S16Le,
        SampleFormat::S16Be,
        SampleFormat::S32Le,
        SampleFormat::S32Be,
    ];

    /// Name as passed to `aplay -f`.
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::S16Le => "S16_LE",
            SampleFormat::S16Be => "S16_BE",
            SampleFormat::S32Le => "S32_LE",
            SampleFormat::S32Be => "S32_BE",
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::S16Le | SampleFormat::S16Be => 2,
            SampleFormat::S32Le | SampleFormat::S32Be => 4,
        }
    }

    /// Bytes in one stereo frame.
    pub fn frame_width(self) -> usize {
        self.bytes_per_sample() * 2
    }

    pub fn byte_order(self) -> ByteOrder {
        match self {
            SampleFormat::S16Le | SampleFormat::S32Le => ByteOrder::Little,
            SampleFormat::S16Be | SampleFormat::S32Be => ByteOrder::Big,
        }
    }

    /// Largest amplitude used for full-scale output.
    ///
    /// The range is symmetric, so `-max` is the lowest value ever produced even though the
    /// integer type could hold one more negative step.
    pub fn max_amplitude(self) -> i64 {
        match self {
            SampleFormat::S16Le | SampleFormat::S16Be => i16::MAX as i64,
            SampleFormat::S32Le | SampleFormat::S32Be => i32::MAX as i64,
        }
    }

    /// Encode a stereo pair into a freshly allocated frame.
    pub fn encode(self, left: i64, right: i64) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.frame_width());
        self.encode_frame_into(SampleFrame::new(left, right), &mut out)?;
        Ok(out)
    }

    /// Append one encoded frame to `out`.
    ///
    /// Nothing is appended when either channel is out of range.
    pub fn encode_frame_into(self, frame: SampleFrame, out: &mut Vec<u8>) -> Result<()> {
        let max = self.max_amplitude();
        for value in [frame.left, frame.right] {
            if !(-max..=max).contains(&value) {
                return Err(Error::Encoding { value, max });
            }
        }
        self.push_sample(frame.left, out);
        self.push_sample(frame.right, out);
        Ok(())
    }

    /// Decode one frame produced by [`SampleFormat::encode`].
    ///
    /// Returns `None` if `bytes` is not exactly one frame wide.
    pub fn decode_frame(self, bytes: &[u8]) -> Option<SampleFrame> {
        if bytes.len() != self.frame_width() {
            return None;
        }
        let (left, right) = bytes.split_at(self.bytes_per_sample());
        Some(SampleFrame::new(
            self.read_sample(left),
            self.read_sample(right),
        ))
    }

    // Callers have range-checked `value`, so its low `width` bytes are the two's complement
    // sample.
    fn push_sample(self, value: i64, out: &mut Vec<u8>) {
        let width = self.bytes_per_sample();
        let le = value.to_le_bytes();
        match self.byte_order() {
            ByteOrder::Little => out.extend_from_slice(&le[..width]),
            ByteOrder::Big => out.extend(le[..width].iter().rev()),
        }
    }

    fn read_sample(self, b: &[u8]) -> i64 {
        let width = self.bytes_per_sample();
        let mut le = [0u8; 8];
        match self.byte_order() {
            ByteOrder::Little => le[..width].copy_from_slice(b),
            ByteOrder::Big => {
                for (dst, src) in le[..width].iter_mut().zip(b.iter().rev()) {
                    *dst = *src;
                }
            }
        }
        // Shift up and back down to sign-extend from `width` bytes.
        let shift = 64 - 8 * width as u32;
        (i64::from_le_bytes(le) << shift) >> shift
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleFormat::ALL
            .into_iter()
            .find(|fmt| fmt.name() == s)
            .ok_or_else(|| ConfigError::UnknownFormat(s.to_string()))
    }
}
