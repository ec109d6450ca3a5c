//! Playback loop.
//!
//! Writes the loop buffer to the sink over and over. There is no timer: the pipe write
//! blocks while the sink's buffer is full, which paces the loop at playback speed.
//!
//! State machine: `NotStarted -> Running -> Stopping -> Stopped`, or `Running -> Failed`
//! when the sink exits with an error on its own. A sink that dies from the same Ctrl-C
//! that stops playback counts as stopped, not failed.

use std::io;
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use looptone_synth::AudioBuffer;

use crate::sink::{SinkCommand, SinkError, SinkProcess};

/// Upper bound on bytes written between stop checks.
const WRITE_CHUNK_BYTES: usize = 16 * 1024;

/// Shared flag raised by the interrupt handler.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` if it was already raised.
    pub fn request(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    NotStarted,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Why the loop ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// A stop was requested.
    Stopped,
    /// The sink exited with status 0 without being asked to.
    SinkExited,
}

pub struct Player {
    command: SinkCommand,
    state: PlaybackState,
}

impl Player {
    pub fn new(command: SinkCommand) -> Self {
        Self {
            command,
            state: PlaybackState::NotStarted,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Spawn the sink and feed it `buffer` until `stop` is raised or the sink goes away.
    ///
    /// The sink's stdin is closed and the process waited on before this returns, whatever
    /// the outcome. Once a stop has been requested the sink's exit status is not inspected.
    pub fn play(
        &mut self,
        buffer: &AudioBuffer,
        stop: &StopSignal,
    ) -> Result<PlaybackOutcome, SinkError> {
        let mut sink = match SinkProcess::spawn(self.command.clone()) {
            Ok(sink) => sink,
            Err(err) => {
                self.transition(PlaybackState::Failed);
                return Err(err);
            }
        };
        self.transition(PlaybackState::Running);

        let write_err = feed(&mut sink, buffer, stop);
        if stop.is_requested() {
            self.transition(PlaybackState::Stopping);
        }
        let finished = sink.finish();

        if stop.is_requested() {
            if let Err(err) = &finished {
                tracing::warn!("sink wait after stop: {err}");
            }
            return Ok(self.stopped());
        }

        let status = match finished {
            Ok(status) => status,
            Err(err) => {
                self.transition(PlaybackState::Failed);
                return Err(err);
            }
        };
        if !status.success() {
            if interrupted_with_sink(status, stop) {
                tracing::debug!(status = %status, "sink ended by interrupt");
                stop.request();
                return Ok(self.stopped());
            }
            self.transition(PlaybackState::Failed);
            return Err(SinkError::Failed {
                command: self.command.to_string(),
                code: status.code(),
            });
        }

        if let Some(err) = write_err {
            tracing::warn!(command = %self.command, "sink stopped reading: {err}");
        }
        self.transition(PlaybackState::Stopped);
        Ok(PlaybackOutcome::SinkExited)
    }

    fn stopped(&mut self) -> PlaybackOutcome {
        if self.state != PlaybackState::Stopping {
            self.transition(PlaybackState::Stopping);
        }
        self.transition(PlaybackState::Stopped);
        PlaybackOutcome::Stopped
    }

    fn transition(&mut self, next: PlaybackState) {
        tracing::debug!(from = ?self.state, to = ?next, "playback state");
        self.state = next;
    }
}

/// How long a failed sink waits for the interrupt handler before the failure is reported.
///
/// A terminal Ctrl-C reaches the whole process group, so the sink can exit (aplay exits 1,
/// other programs die of SIGINT) before the handler thread has raised the stop flag.
const INTERRUPT_GRACE: Duration = Duration::from_millis(250);

#[cfg(unix)]
const SIGINT: i32 = 2;

/// Whether a non-successful sink exit was caused by the same interrupt that stops playback.
fn interrupted_with_sink(status: ExitStatus, stop: &StopSignal) -> bool {
    if killed_by_sigint(status) {
        return true;
    }
    let deadline = Instant::now() + INTERRUPT_GRACE;
    while Instant::now() < deadline {
        if stop.is_requested() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    stop.is_requested()
}

#[cfg(unix)]
fn killed_by_sigint(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn killed_by_sigint(_status: ExitStatus) -> bool {
    false
}

/// Write `buffer` to the sink in a loop. Returns the write error that ended it, or `None`
/// when a stop was requested.
fn feed(sink: &mut SinkProcess, buffer: &AudioBuffer, stop: &StopSignal) -> Option<io::Error> {
    if buffer.is_empty() {
        return None;
    }
    let bytes = buffer.as_bytes();
    let mut loops: u64 = 0;
    loop {
        for chunk in bytes.chunks(WRITE_CHUNK_BYTES) {
            if stop.is_requested() {
                tracing::debug!(loops, "stop requested");
                return None;
            }
            if let Err(err) = sink.write_all(chunk) {
                return Some(err);
            }
        }
        if let Err(err) = sink.flush() {
            return Some(err);
        }
        loops += 1;
        if loops == 1 {
            tracing::debug!(bytes = bytes.len(), "first loop written");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use looptone_synth::{PlaybackConfig, TuneSpec, generate};

    fn sh(script: &str) -> SinkCommand {
        SinkCommand::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    fn square_buffer() -> AudioBuffer {
        generate(&PlaybackConfig::new("default", None, TuneSpec::Square)).expect("generate")
    }

    fn scratch_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("looptone-{}-{name}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn stop_closes_sink_input_and_reports_stopped() {
        let marker = scratch_path("stop-marker");
        let script = format!("cat > /dev/null; echo closed > '{}'", marker.display());
        let mut player = Player::new(sh(&script));
        let stop = StopSignal::new();

        let stopper = {
            let stop = stop.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(200));
                stop.request();
            })
        };
        let outcome = player.play(&square_buffer(), &stop).unwrap();
        stopper.join().unwrap();

        assert_eq!(outcome, PlaybackOutcome::Stopped);
        assert_eq!(player.state(), PlaybackState::Stopped);
        let written = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(written.trim(), "closed");
        let _ = std::fs::remove_file(&marker);
    }

    #[test]
    fn stop_before_start_still_reaps_sink() {
        let stop = StopSignal::new();
        stop.request();
        let mut player = Player::new(sh("cat > /dev/null"));
        assert_eq!(player.play(&square_buffer(), &stop).unwrap(), PlaybackOutcome::Stopped);
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn stop_ignores_sink_exit_status() {
        let stop = StopSignal::new();
        stop.request();
        let mut player = Player::new(sh("cat > /dev/null; exit 9"));
        assert_eq!(player.play(&square_buffer(), &stop).unwrap(), PlaybackOutcome::Stopped);
    }

    #[test]
    fn failing_sink_reports_exit_code() {
        let mut player = Player::new(sh("exit 3"));
        let err = player.play(&square_buffer(), &StopSignal::new()).unwrap_err();
        match err {
            SinkError::Failed { command, code } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(code, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(player.state(), PlaybackState::Failed);
    }

    #[test]
    fn sink_killed_by_sigint_counts_as_stop() {
        let stop = StopSignal::new();
        let mut player = Player::new(sh("kill -INT $$; sleep 5"));
        let outcome = player.play(&square_buffer(), &stop).unwrap();
        assert_eq!(outcome, PlaybackOutcome::Stopped);
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(stop.is_requested());
    }

    #[test]
    fn sink_failure_ahead_of_interrupt_handler_counts_as_stop() {
        // aplay exits 1 on SIGINT; the handler may raise the flag a little later.
        let stop = StopSignal::new();
        let stopper = {
            let stop = stop.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                stop.request();
            })
        };
        let mut player = Player::new(sh("exit 1"));
        let outcome = player.play(&square_buffer(), &stop).unwrap();
        stopper.join().unwrap();
        assert_eq!(outcome, PlaybackOutcome::Stopped);
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn sink_exiting_cleanly_ends_playback() {
        let mut player = Player::new(sh("head -c 1000 > /dev/null"));
        let outcome = player.play(&square_buffer(), &StopSignal::new()).unwrap();
        assert_eq!(outcome, PlaybackOutcome::SinkExited);
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn buffer_is_written_back_to_back() {
        let buffer = square_buffer();
        let take = buffer.len() * 2 + buffer.len() / 2;
        let capture = scratch_path("capture");
        let script = format!("head -c {take} > '{}'", capture.display());
        let mut player = Player::new(sh(&script));

        let outcome = player.play(&buffer, &StopSignal::new()).unwrap();
        assert_eq!(outcome, PlaybackOutcome::SinkExited);

        let captured = std::fs::read(&capture).unwrap();
        let _ = std::fs::remove_file(&capture);
        assert_eq!(captured.len(), take);
        for (i, chunk) in captured.chunks(buffer.len()).enumerate() {
            assert_eq!(chunk, &buffer.as_bytes()[..chunk.len()], "loop {i}");
        }
    }

    #[test]
    fn spawn_failure_marks_player_failed() {
        let mut player = Player::new(SinkCommand::new("/nonexistent/looptone-sink", Vec::new()));
        let err = player.play(&square_buffer(), &StopSignal::new()).unwrap_err();
        assert!(matches!(err, SinkError::Spawn { .. }));
        assert_eq!(player.state(), PlaybackState::Failed);
    }

    #[test]
    fn stop_signal_reports_repeat_requests() {
        let stop = StopSignal::new();
        assert!(!stop.is_requested());
        assert!(!stop.request());
        assert!(stop.request());
        assert!(stop.clone().is_requested());
    }
}
