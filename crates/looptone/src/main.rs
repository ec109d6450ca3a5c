//! looptone — a minimal tone player for ALSA.
//!
//! Pre-generates one second of stereo PCM (sine, dual-tone sine, square wave or an arbitrary
//! bit pattern) and pipes it to `aplay` in an endless loop. Ctrl-C stops playback and exits
//! with status 0.
//!
//! ```text
//! looptone -D default -T sin        # 440 Hz sine
//! looptone -D default -T sinlh      # 110 Hz left, 440 Hz right
//! looptone -D default -T square     # 600 Hz square wave
//! looptone -D default -T bits:00011 # 1200 bits/s data pattern
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use looptone::config::RunConfig;
use looptone::player::StopSignal;
use looptone::{cli, runtime};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,looptone=info,looptone_synth=info")
        }))
        .init();

    let stop = StopSignal::new();
    runtime::install_stop_handler(stop.clone())?;
    runtime::run(RunConfig::from_args(args), stop)
}
