pub use looptone_synth::PlaybackConfig;

use crate::cli::Args;

/// Resolved settings for one run of the player.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub playback: PlaybackConfig,
    /// Program spawned as the audio sink.
    pub sink_program: String,
}

impl RunConfig {
    pub fn from_args(args: Args) -> Self {
        Self {
            playback: PlaybackConfig::new(args.device, args.format, args.tune),
            sink_program: args.sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use looptone_synth::{SampleFormat, TuneSpec};

    fn resolve(argv: &[&str]) -> RunConfig {
        RunConfig::from_args(Args::try_parse_from(argv).expect("args"))
    }

    #[test]
    fn default_run_targets_dmix_at_s32_le() {
        let cfg = resolve(&["looptone"]);
        assert_eq!(cfg.playback.device, "dmix");
        assert_eq!(cfg.playback.sample_format, SampleFormat::S32Le);
        assert_eq!(cfg.playback.sample_rate, 48_000);
        assert_eq!(cfg.sink_program, "aplay");
    }

    #[test]
    fn default_device_square_infers_s16_le() {
        let cfg = resolve(&["looptone", "-D", "default", "-T", "square"]);
        assert_eq!(cfg.playback.sample_format, SampleFormat::S16Le);
        assert_eq!(cfg.playback.tune, TuneSpec::Square);
    }

    #[test]
    fn explicit_format_wins_over_device() {
        let cfg = resolve(&["looptone", "-D", "dmix:CARD=0", "-f", "S16_BE"]);
        assert_eq!(cfg.playback.sample_format, SampleFormat::S16Be);
    }
}
