//! Tune selection: which waveform recipe fills the loop buffer.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Bit rate used by `square` and by `bits:` patterns given on the command line.
pub const SQUARE_BIT_RATE: u32 = 1200;

/// One slot of a bit-pattern wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Low,
    High,
}

impl Symbol {
    /// `'0'` and NUL are low; every other character is high.
    pub fn from_char(c: char) -> Self {
        match c {
            '0' | '\0' => Symbol::Low,
            _ => Symbol::High,
        }
    }

    fn as_char(self) -> char {
        match self {
            Symbol::Low => '0',
            Symbol::High => '1',
        }
    }
}

/// Waveform recipe for the one-second loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuneSpec {
    /// 440 Hz on both channels.
    Sine,
    /// 110 Hz on the left, 440 Hz on the right.
    SineLowHigh,
    /// 110 Hz on the left, right silent.
    SineLowOnly,
    /// Left silent, 440 Hz on the right.
    SineHighOnly,
    /// 600 Hz square wave; shorthand for `bits:01` at [`SQUARE_BIT_RATE`].
    Square,
    /// Two-level wave holding each symbol for `rate / bit_rate` frames.
    BitPattern { bit_rate: u32, symbols: Vec<Symbol> },
}

impl TuneSpec {
    /// Build a bit pattern from its textual form at the given bit rate.
    pub fn bit_pattern(bit_rate: u32, pattern: &str) -> Result<Self, ConfigError> {
        if pattern.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        Ok(TuneSpec::BitPattern {
            bit_rate,
            symbols: pattern.chars().map(Symbol::from_char).collect(),
        })
    }
}

impl FromStr for TuneSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sin" | "sine" => Ok(TuneSpec::Sine),
            "sinlh" => Ok(TuneSpec::SineLowHigh),
            "sinl" => Ok(TuneSpec::SineLowOnly),
            "sinh" => Ok(TuneSpec::SineHighOnly),
            "square" => Ok(TuneSpec::Square),
            other => match other.strip_prefix("bits:") {
                Some(pattern) => TuneSpec::bit_pattern(SQUARE_BIT_RATE, pattern),
                None => Err(ConfigError::UnknownTune(other.to_string())),
            },
        }
    }
}

impl fmt::Display for TuneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuneSpec::Sine => f.write_str("sine"),
            TuneSpec::SineLowHigh => f.write_str("sinlh"),
            TuneSpec::SineLowOnly => f.write_str("sinl"),
            TuneSpec::SineHighOnly => f.write_str("sinh"),
            TuneSpec::Square => f.write_str("square"),
            TuneSpec::BitPattern { bit_rate, symbols } => {
                f.write_str("bits:")?;
                for s in symbols {
                    write!(f, "{}", s.as_char())?;
                }
                if *bit_rate != SQUARE_BIT_RATE {
                    write!(f, "@{bit_rate}")?;
                }
                Ok(())
            }
        }
    }
}
