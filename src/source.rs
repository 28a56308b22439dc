//! Landmark frame sources: JSON-lines streams from a file, stdin or a detector process
//!
//! Each line is one detector result:
//! `{"timestamp": 0.033, "hands": [{"score": 0.98, "landmarks": [{"x": .., "y": .., "z": ..}, ...]}]}`

use crate::landmarks::Frame;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// Supplies detector frames on demand. `Ok(None)` is end of stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Timestamps for frames whose detector did not supply one
enum Clock {
    /// Seconds since the source was opened
    Wall(Instant),
    /// `frame_index / fps`, for recorded streams
    FixedRate { fps: f64, index: u64 },
}

impl Clock {
    fn stamp(&mut self) -> f64 {
        match self {
            Clock::Wall(start) => start.elapsed().as_secs_f64(),
            Clock::FixedRate { fps, index } => *index as f64 / *fps,
        }
    }

    fn advance(&mut self) {
        if let Clock::FixedRate { index, .. } = self {
            *index += 1;
        }
    }
}

pub struct JsonLinesSource<R> {
    reader: R,
    clock: Clock,
    line_no: usize,
    line: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Live stream: missing timestamps are wall time since now
    pub fn live(reader: R) -> Self {
        Self::with_clock(reader, Clock::Wall(Instant::now()))
    }

    /// Recorded stream: missing timestamps are derived from the frame rate
    pub fn replay(reader: R, fps: f64) -> Self {
        Self::with_clock(reader, Clock::FixedRate { fps, index: 0 })
    }

    fn with_clock(reader: R, clock: Clock) -> Self {
        Self {
            reader,
            clock,
            line_no: 0,
            line: String::new(),
        }
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .context("Failed to read landmark stream")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }

            let mut frame: Frame = match serde_json::from_str(text) {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Skipping malformed frame on line {}: {}", self.line_no, e);
                    continue;
                }
            };

            if let Some(err) = &frame.error {
                log::warn!("Detector error on line {}: {}", self.line_no, err);
            }

            if frame.timestamp.is_none() {
                frame.timestamp = Some(self.clock.stamp());
            }
            self.clock.advance();

            return Ok(Some(frame));
        }
    }
}

/// Open a JSON-lines input: a file path, or `-` for stdin
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    Ok(Box::new(BufReader::new(file)))
}

/// An external hand-landmark detector writing JSON lines to stdout
pub struct DetectorProcess {
    child: Child,
}

impl DetectorProcess {
    /// Spawn `command` (program and arguments separated by whitespace)
    pub fn spawn(command: &str) -> Result<(Self, JsonLinesSource<BufReader<ChildStdout>>)> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty detector command"))?;

        let mut cmd = Command::new(program);
        cmd.args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Own process group so Ctrl+C reaches us first; we stop the detector ourselves
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to start detector: {}", command))?;
        let stdout = child
            .stdout
            .take()
            .context("Failed to get detector stdout")?;

        log::info!("Started detector (pid {}): {}", child.id(), command);

        Ok((
            Self { child },
            JsonLinesSource::live(BufReader::new(stdout)),
        ))
    }

    pub fn stop(&mut self) -> Result<()> {
        if let Ok(Some(status)) = self.child.try_wait() {
            log::debug!("Detector already exited: {}", status);
            return Ok(());
        }

        // Send SIGINT for graceful shutdown
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let _ = kill(Pid::from_raw(self.child.id() as i32), Signal::SIGINT);
        }

        thread::sleep(Duration::from_millis(100));

        // Force kill if still running
        let _ = self.child.kill();
        self.child.wait().context("Failed to wait for detector")?;
        Ok(())
    }
}
