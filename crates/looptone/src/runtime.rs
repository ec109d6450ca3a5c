//! Looptone runtime helpers.
//!
//! Generates the loop buffer, installs the interrupt handler and drives the player.

use anyhow::{Context, Result};
use looptone_synth::generate;

use crate::config::RunConfig;
use crate::player::{PlaybackOutcome, Player, StopSignal};
use crate::sink::SinkCommand;

/// Route Ctrl-C to `stop`. A second Ctrl-C exits immediately.
pub fn install_stop_handler(stop: StopSignal) -> Result<()> {
    ctrlc::set_handler(move || {
        if stop.request() {
            std::process::exit(130);
        }
        tracing::info!("interrupt received; stopping");
    })
    .context("install Ctrl-C handler")
}

/// Generate the buffer for `config` and play it until `stop` is raised or the sink exits.
pub fn run(config: RunConfig, stop: StopSignal) -> Result<()> {
    let playback = &config.playback;
    tracing::info!(
        device = %playback.device,
        format = %playback.sample_format,
        rate_hz = playback.sample_rate,
        tune = %playback.tune,
        "playback config"
    );

    let buffer = generate(playback).context("generate loop buffer")?;
    tracing::info!(
        bytes = buffer.len(),
        frames = buffer.frame_count(),
        rate_hz = buffer.sample_rate(),
        "loop buffer ready"
    );

    let command = SinkCommand::aplay(config.sink_program.clone(), playback);
    let mut player = Player::new(command);
    match player.play(&buffer, &stop).context("playback")? {
        PlaybackOutcome::Stopped => tracing::info!("playback stopped"),
        PlaybackOutcome::SinkExited => tracing::warn!("sink exited; playback ended"),
    }
    Ok(())
}
