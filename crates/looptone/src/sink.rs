//! External audio sink process.
//!
//! The sink is spawned with a piped stdin and receives raw interleaved PCM. [`SinkProcess`]
//! owns the child: dropping it closes stdin and waits for the process, so every exit path
//! out of the playback loop reaps the sink.

use std::fmt;
use std::io::{self, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};

use looptone_synth::{CHANNELS, PlaybackConfig};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The sink exited on its own with a non-zero status or was killed by a signal.
    #[error("{command} failed with {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Program plus arguments used to launch the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkCommand {
    program: String,
    args: Vec<String>,
}

impl SinkCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `aplay`-style invocation: device, format, stereo, rate, quiet.
    pub fn aplay(program: impl Into<String>, config: &PlaybackConfig) -> Self {
        let args = vec![
            "-D".to_string(),
            config.device.clone(),
            "-f".to_string(),
            config.sample_format.name().to_string(),
            "-c".to_string(),
            CHANNELS.to_string(),
            "-r".to_string(),
            config.sample_rate.to_string(),
            "-q".to_string(),
        ];
        Self::new(program, args)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for SinkCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())?;
        for arg in self.args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A running sink and the write end of its stdin.
pub struct SinkProcess {
    command: SinkCommand,
    child: Child,
    stdin: Option<ChildStdin>,
    reaped: bool,
}

impl SinkProcess {
    pub fn spawn(command: SinkCommand) -> Result<Self, SinkError> {
        let mut child = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| SinkError::Spawn {
                command: command.to_string(),
                source,
            })?;
        let stdin = child.stdin.take();
        tracing::info!(pid = child.id(), command = %command, "sink started");
        Ok(Self {
            command,
            child,
            stdin,
            reaped: false,
        })
    }

    /// Blocking write; returns once the sink has taken every byte into its pipe.
    pub fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.input()?.write_all(bytes)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.input()?.flush()
    }

    /// Close stdin so the sink sees end of input. Close errors are ignored.
    pub fn close_input(&mut self) {
        if let Some(stdin) = self.stdin.take() {
            drop(stdin);
            tracing::debug!(pid = self.child.id(), "sink input closed");
        }
    }

    /// Close stdin and wait for the sink to exit.
    pub fn finish(mut self) -> Result<ExitStatus, SinkError> {
        self.close_input();
        let status = self.child.wait().map_err(|source| SinkError::Wait {
            command: self.command.to_string(),
            source,
        })?;
        self.reaped = true;
        tracing::debug!(pid = self.child.id(), status = %status, "sink exited");
        Ok(status)
    }

    fn input(&mut self) -> io::Result<&mut ChildStdin> {
        self.stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sink input closed"))
    }
}

impl Drop for SinkProcess {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        self.close_input();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use looptone_synth::{SampleFormat, TuneSpec};

    fn sh(script: &str) -> SinkCommand {
        SinkCommand::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn aplay_args_carry_device_format_channels_rate_and_quiet() {
        let cfg = PlaybackConfig::new("default", None, TuneSpec::Square);
        let cmd = SinkCommand::aplay("aplay", &cfg);
        assert_eq!(cmd.program(), "aplay");
        assert_eq!(
            cmd.args(),
            ["-D", "default", "-f", "S16_LE", "-c", "2", "-r", "48000", "-q"]
        );
        assert_eq!(cmd.to_string(), "aplay -D default -f S16_LE -c 2 -r 48000 -q");
    }

    #[test]
    fn aplay_args_use_explicit_format() {
        let cfg = PlaybackConfig::new("dmix", Some(SampleFormat::S32Be), TuneSpec::Sine);
        let cmd = SinkCommand::aplay("aplay", &cfg);
        assert!(cmd.to_string().contains("-f S32_BE"));
    }

    #[test]
    fn spawn_failure_names_command() {
        let err = SinkProcess::spawn(SinkCommand::new("/nonexistent/looptone-sink", Vec::new()))
            .err()
            .expect("spawn should fail");
        assert!(matches!(err, SinkError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/looptone-sink"));
    }

    #[cfg(unix)]
    #[test]
    fn finish_closes_input_and_reports_status() {
        let mut sink = SinkProcess::spawn(sh("cat > /dev/null; exit 4")).unwrap();
        sink.write_all(b"abc").unwrap();
        sink.flush().unwrap();
        let status = sink.finish().unwrap();
        assert_eq!(status.code(), Some(4));
    }

    #[cfg(unix)]
    #[test]
    fn write_after_close_is_broken_pipe() {
        let mut sink = SinkProcess::spawn(sh("cat > /dev/null")).unwrap();
        sink.close_input();
        let err = sink.write_all(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn failed_error_includes_command_and_code() {
        let err = SinkError::Failed {
            command: "aplay -q".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "aplay -q failed with exit code 1");

        let err = SinkError::Failed {
            command: "aplay -q".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("signal"));
    }
}
