//! Live tracking loop: a processing thread turns frames into cursor actions,
//! the main thread shows progress and forwards keyboard commands.

use crate::config::{ControlConfig, TrackingConfig};
use crate::control::{open_system_sink, CursorSink, SinkError, SystemControl};
use crate::cursor_types::EventType;
use crate::display::TargetScreen;
use crate::engine::{FrameGesture, GestureEngine};
use crate::landmarks::Frame;
use crate::logging;
use crate::session::SessionLog;
use crate::source::{open_input, DetectorProcess, FrameSource, JsonLinesSource};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Where live frames come from
pub enum FrameInput {
    /// Command line of a detector process
    Detector(String),
    /// JSON-lines file, or `-` for stdin
    Path(PathBuf),
}

impl FrameInput {
    fn is_stdin(&self) -> bool {
        matches!(self, FrameInput::Path(p) if p.as_os_str() == "-")
    }
}

pub struct TrackOptions {
    pub input: FrameInput,
    pub tracking: TrackingConfig,
    pub target: TargetScreen,
    pub control: ControlConfig,
    pub session: Option<PathBuf>,
    pub record_frames: Option<PathBuf>,
}

/// Keyboard commands for the processing thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    Reset,
    Stop,
}

pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "e" | "enable" => Some(Command::Enable),
        "d" | "disable" => Some(Command::Disable),
        "r" | "reset" => Some(Command::Reset),
        "q" | "quit" => Some(Command::Stop),
        _ => None,
    }
}

/// What the processing thread publishes for every frame
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame_index: u64,
    pub timestamp: f64,
    pub gesture: Option<FrameGesture>,
    pub fps: u32,
    pub control_enabled: bool,
    pub sink_error: Option<SinkError>,
}

/// Frames per second over consecutive one-second windows of frame time
#[derive(Debug, Default)]
struct FpsCounter {
    window_start: Option<f64>,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    fn tick(&mut self, timestamp: f64) -> u32 {
        let start = *self.window_start.get_or_insert(timestamp);
        let elapsed = timestamp - start;

        if elapsed >= 1.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = Some(timestamp);
        } else if elapsed < 0.0 {
            // Clock went backwards, start a fresh window
            self.frames = 0;
            self.window_start = Some(timestamp);
        }

        self.frames += 1;
        self.fps
    }
}

/// Per-frame state owned by the processing thread
struct Tracker {
    engine: GestureEngine,
    control: SystemControl,
    sink: Option<Box<dyn CursorSink>>,
    fps: FpsCounter,
    session: SessionLog,
    first_timestamp: Option<f64>,
    frame_index: u64,
}

impl Tracker {
    fn new(engine: GestureEngine, control: SystemControl, session: SessionLog) -> Self {
        Self {
            engine,
            control,
            sink: None,
            fps: FpsCounter::default(),
            session,
            first_timestamp: None,
            frame_index: 0,
        }
    }

    /// Returns false when tracking should stop
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Enable => {
                self.control.enable();
                log::info!("System cursor control enabled");
            }
            Command::Disable => {
                self.control.disable();
                log::info!("System cursor control disabled");
            }
            Command::Reset => {
                self.engine.reset();
                log::info!("Tracking state reset");
            }
            Command::Stop => return false,
        }
        true
    }

    fn step(&mut self, frame: &Frame) -> FrameReport {
        // Sources stamp every frame they hand out
        let timestamp = frame.timestamp.unwrap_or_default();
        let first = *self.first_timestamp.get_or_insert(timestamp);

        self.frame_index += 1;
        self.session.frame_count += 1;
        self.session.duration = (timestamp - first).max(0.0);
        let fps = self.fps.tick(timestamp);

        let gesture = self.engine.process(frame.primary_hand(), timestamp);

        let mut sink_error = None;
        if let Some(gesture) = &gesture {
            self.session.record(gesture);
            if let Err(e) = self.drive(gesture) {
                log::debug!("Sink error at {:.3}s: {}", timestamp, e);
                sink_error = Some(e);
            }
        }

        FrameReport {
            frame_index: self.frame_index,
            timestamp,
            gesture,
            fps,
            control_enabled: self.control.is_enabled(),
            sink_error,
        }
    }

    fn drive(&mut self, gesture: &FrameGesture) -> Result<(), SinkError> {
        if !self.control.is_enabled() {
            return Ok(());
        }

        // The backend is only opened once control is first needed
        if self.sink.is_none() {
            match open_system_sink() {
                Ok(sink) => self.sink = Some(sink),
                Err(e) => {
                    self.control.disable();
                    return Err(SinkError::AccessDenied(format!("{:#}", e)));
                }
            }
        }

        match self.sink.as_mut() {
            Some(sink) => self.control.drive(gesture, &mut **sink),
            None => Ok(()),
        }
    }

    fn into_session(self) -> SessionLog {
        self.session
    }
}

pub fn run(options: TrackOptions) -> Result<()> {
    let engine = GestureEngine::new(&options.tracking, options.target.size)?;
    let control = SystemControl::new(options.control.system_control, options.control.failsafe)
        .with_origin(options.target.origin);
    let session = SessionLog::new(options.target.size, options.tracking.clone());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let read_commands = !options.input.is_stdin();
    let (mut detector, source) = match &options.input {
        FrameInput::Detector(command) => {
            let (detector, source) = DetectorProcess::spawn(command)?;
            (Some(detector), Box::new(source) as Box<dyn FrameSource + Send>)
        }
        FrameInput::Path(path) => {
            let source = JsonLinesSource::live(open_input(path)?);
            (None, Box::new(source) as Box<dyn FrameSource + Send>)
        }
    };

    let frames_out = match &options.record_frames {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
        )),
        None => None,
    };

    println!(
        "Tracking onto {}x{} screen",
        options.target.size.width, options.target.size.height
    );
    if read_commands {
        println!("Commands: e = enable control, d = disable, r = reset, q = quit");
    }
    println!("Press Ctrl+C to stop tracking...\n");

    let (command_tx, command_rx) = mpsc::channel();
    let (report_tx, report_rx) = mpsc::channel();

    if read_commands {
        spawn_command_reader(command_tx.clone());
    }

    let processing = {
        let running = running.clone();
        thread::Builder::new()
            .name("processing".into())
            .spawn(move || {
                let tracker = Tracker::new(engine, control, session);
                process_frames(tracker, source, command_rx, report_tx, running, frames_out)
            })
            .context("Failed to spawn processing thread")?
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {elapsed_precise} {msg}")?);
    let log_guard = logging::attach(&pb);

    let start = Instant::now();

    drain_reports(&report_rx, &pb, &running, || {
        let _ = command_tx.send(Command::Stop);
        // Closing the detector unblocks a processing thread waiting on a frame
        match detector.take() {
            Some(mut detector) => detector.stop(),
            None => Ok(()),
        }
    });

    drop(log_guard);
    pb.finish_and_clear();

    let session = processing
        .join()
        .map_err(|_| anyhow::anyhow!("Processing thread panicked"))?;

    if let Some(mut detector) = detector.take() {
        detector.stop()?;
    }
    let session = session?;

    println!(
        "Tracking complete! Duration: {:.1}s",
        start.elapsed().as_secs_f64()
    );
    print_summary(&session);

    if let Some(path) = &options.session {
        session.save(path)?;
        println!("Session log: {}", path.display());
    }
    if let Some(path) = &options.record_frames {
        println!("Frames: {}", path.display());
    }

    Ok(())
}

fn process_frames(
    mut tracker: Tracker,
    mut source: Box<dyn FrameSource + Send>,
    commands: Receiver<Command>,
    reports: Sender<FrameReport>,
    running: Arc<AtomicBool>,
    mut frames_out: Option<BufWriter<File>>,
) -> Result<SessionLog> {
    'frames: while running.load(Ordering::SeqCst) {
        for command in commands.try_iter() {
            if !tracker.handle_command(command) {
                break 'frames;
            }
        }

        let Some(frame) = source.next_frame()? else {
            log::info!("Landmark stream ended");
            break;
        };

        if let Some(out) = frames_out.as_mut() {
            serde_json::to_writer(&mut *out, &frame)?;
            writeln!(out)?;
        }

        // Presentation went away, nobody is listening
        if reports.send(tracker.step(&frame)).is_err() {
            break;
        }
    }

    if let Some(mut out) = frames_out {
        out.flush().context("Failed to write recorded frames")?;
    }

    Ok(tracker.into_session())
}

/// Show reports until the processing thread hangs up. `stop` runs once, after
/// Ctrl+C; a failure there is logged and draining continues. Returns the
/// number of reports shown.
fn drain_reports(
    reports: &Receiver<FrameReport>,
    pb: &ProgressBar,
    running: &AtomicBool,
    mut stop: impl FnMut() -> Result<()>,
) -> u64 {
    let mut shown = 0;
    let mut stopped = false;

    loop {
        match reports.recv_timeout(Duration::from_millis(100)) {
            Ok(report) => {
                show_report(pb, &report);
                shown += 1;
            }
            Err(RecvTimeoutError::Timeout) => pb.tick(),
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if !stopped && !running.load(Ordering::SeqCst) {
            stopped = true;
            if let Err(e) = stop() {
                log::error!("Failed to stop tracking cleanly: {:#}", e);
            }
        }
    }

    shown
}

fn spawn_command_reader(commands: Sender<Command>) {
    // Blocks on stdin for the life of the process; never joined
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(command) => {
                    if commands.send(command).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => log::warn!("Unknown command {:?} (use e, d, r or q)", line.trim()),
            }
        }
    });
}

fn show_report(pb: &ProgressBar, report: &FrameReport) {
    let state = match &report.gesture {
        None => "no hand".to_string(),
        Some(g) => {
            let mut s = format!("cursor ({}, {})", g.result.cursor.x, g.result.cursor.y);
            if g.result.left_click {
                s.push_str(" [left pinch]");
            }
            if g.result.right_click {
                s.push_str(" [right pinch]");
            }
            s
        }
    };

    pb.set_message(format!(
        "frame {} | {:>3} fps | control {} | {}",
        report.frame_index,
        report.fps,
        if report.control_enabled { "on" } else { "off" },
        state
    ));

    if let Some(g) = &report.gesture {
        if let Some(button) = g.click {
            pb.println(format!(
                "{:?} click at ({}, {}) t={:.2}s",
                button, g.result.cursor.x, g.result.cursor.y, report.timestamp
            ));
        }
    }

    if let Some(e) = &report.sink_error {
        pb.println(format!("Cursor control stopped: {} (press e to re-enable)", e));
    }
}

fn print_summary(session: &SessionLog) {
    println!(
        "  Frames: {} over {:.1}s",
        session.frame_count, session.duration
    );
    println!("  Moves: {}", session.count_events(EventType::Move));
    println!("  Left clicks: {}", session.count_events(EventType::LeftClick));
    println!("  Right clicks: {}", session.count_events(EventType::RightClick));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::ClickButton;
    use crate::geometry::{ScreenPoint, ScreenSize};
    use crate::landmarks::fixtures::{make_hand, make_open_hand};
    use crate::landmarks::HandLandmarks;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        moves: Rc<RefCell<Vec<ScreenPoint>>>,
        clicks: Rc<RefCell<Vec<ClickButton>>>,
    }

    impl CursorSink for RecordingSink {
        fn move_to(&mut self, point: ScreenPoint) -> Result<(), SinkError> {
            self.moves.borrow_mut().push(point);
            Ok(())
        }

        fn click(&mut self, button: ClickButton) -> Result<(), SinkError> {
            self.clicks.borrow_mut().push(button);
            Ok(())
        }

        fn position(&mut self) -> Result<ScreenPoint, SinkError> {
            Ok(self.moves.borrow().last().copied().unwrap_or(ScreenPoint::new(500, 500)))
        }
    }

    fn tracker(control_enabled: bool) -> Tracker {
        let config = TrackingConfig {
            smoothing: 0.0,
            ..Default::default()
        };
        let screen = ScreenSize::new(1920, 1080);
        Tracker::new(
            GestureEngine::new(&config, screen).unwrap(),
            SystemControl::new(control_enabled, true),
            SessionLog::new(screen, config),
        )
    }

    fn frame(t: f64, hand: Option<HandLandmarks>) -> Frame {
        Frame {
            timestamp: Some(t),
            hands: hand.into_iter().collect(),
            error: None,
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("e"), Some(Command::Enable));
        assert_eq!(parse_command(" Disable \n"), Some(Command::Disable));
        assert_eq!(parse_command("r"), Some(Command::Reset));
        assert_eq!(parse_command("Q"), Some(Command::Stop));
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_fps_counter_reports_previous_window() {
        let mut fps = FpsCounter::default();
        let mut last = 0;
        for i in 0..30 {
            last = fps.tick(i as f64 / 30.0);
        }
        // First window not finished yet
        assert_eq!(last, 0);
        assert_eq!(fps.tick(1.0), 30);
        assert_eq!(fps.tick(1.5), 30);
    }

    #[test]
    fn test_fps_counter_handles_backwards_clock() {
        let mut fps = FpsCounter::default();
        fps.tick(5.0);
        fps.tick(2.0);
        assert_eq!(fps.tick(3.0), 1);
    }

    #[test]
    fn test_step_without_hand_is_no_gesture() {
        let mut tracker = tracker(false);
        let report = tracker.step(&frame(0.0, None));
        assert_eq!(report.frame_index, 1);
        assert!(report.gesture.is_none());
        assert!(report.sink_error.is_none());

        let session = tracker.into_session();
        assert_eq!(session.frame_count, 1);
        assert!(session.cursor_events.is_empty());
    }

    #[test]
    fn test_step_records_session() {
        let mut tracker = tracker(false);
        tracker.step(&frame(1.0, Some(make_open_hand((0.5, 0.5)))));
        tracker.step(&frame(1.5, None));
        tracker.step(&frame(2.0, Some(make_hand((0.53, 0.5), (0.5, 0.5), (0.5, 0.7)))));

        let session = tracker.into_session();
        assert_eq!(session.frame_count, 3);
        assert_eq!(session.duration, 1.0);
        assert_eq!(session.count_events(EventType::Move), 2);
        assert_eq!(session.count_events(EventType::LeftClick), 1);
    }

    #[test]
    fn test_enabled_control_drives_sink() {
        let sink = RecordingSink::default();
        let mut tracker = tracker(true);
        tracker.sink = Some(Box::new(sink.clone()));

        let report = tracker.step(&frame(0.0, Some(make_hand((0.53, 0.5), (0.5, 0.5), (0.5, 0.7)))));
        assert!(report.control_enabled);
        assert_eq!(report.gesture.unwrap().click, Some(ClickButton::Left));
        assert_eq!(sink.moves.borrow().len(), 1);
        assert_eq!(*sink.clicks.borrow(), vec![ClickButton::Left]);
    }

    #[test]
    fn test_commands_toggle_control() {
        let sink = RecordingSink::default();
        let mut tracker = tracker(false);
        tracker.sink = Some(Box::new(sink.clone()));

        tracker.step(&frame(0.0, Some(make_open_hand((0.5, 0.5)))));
        assert!(sink.moves.borrow().is_empty());

        assert!(tracker.handle_command(Command::Enable));
        tracker.step(&frame(0.1, Some(make_open_hand((0.5, 0.5)))));
        assert_eq!(sink.moves.borrow().len(), 1);

        assert!(tracker.handle_command(Command::Disable));
        tracker.step(&frame(0.2, Some(make_open_hand((0.5, 0.5)))));
        assert_eq!(sink.moves.borrow().len(), 1);

        assert!(tracker.handle_command(Command::Reset));
        assert!(!tracker.handle_command(Command::Stop));
    }

    #[test]
    fn test_drain_continues_after_failed_stop() {
        let (report_tx, report_rx) = mpsc::channel();
        let running = AtomicBool::new(false);
        let mut stop_calls = 0;

        let mut tracker = tracker(false);
        report_tx.send(tracker.step(&frame(0.0, None))).unwrap();
        report_tx.send(tracker.step(&frame(0.1, None))).unwrap();
        drop(report_tx);

        let shown = drain_reports(&report_rx, &ProgressBar::hidden(), &running, || {
            stop_calls += 1;
            anyhow::bail!("detector already gone")
        });
        assert_eq!(shown, 2);
        assert_eq!(stop_calls, 1);
    }

    #[test]
    fn test_process_frames_until_end_of_stream() {
        let text = "{\"timestamp\": 0.0}\n{\"timestamp\": 0.1}\n{\"timestamp\": 0.2}\n";
        let source = Box::new(JsonLinesSource::replay(Cursor::new(text.as_bytes().to_vec()), 30.0));
        let (_command_tx, command_rx) = mpsc::channel();
        let (report_tx, report_rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));

        let session = process_frames(tracker(false), source, command_rx, report_tx, running, None).unwrap();
        assert_eq!(session.frame_count, 3);

        let indices: Vec<u64> = report_rx.iter().map(|r| r.frame_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_process_frames_stops_on_command() {
        let text = "{\"timestamp\": 0.0}\n{\"timestamp\": 0.1}\n";
        let source = Box::new(JsonLinesSource::replay(Cursor::new(text.as_bytes().to_vec()), 30.0));
        let (command_tx, command_rx) = mpsc::channel();
        let (report_tx, report_rx) = mpsc::channel();
        command_tx.send(Command::Stop).unwrap();

        let running = Arc::new(AtomicBool::new(true));
        let session = process_frames(tracker(false), source, command_rx, report_tx, running, None).unwrap();
        assert_eq!(session.frame_count, 0);
        assert_eq!(report_rx.iter().count(), 0);
    }

    #[test]
    fn test_recorded_frames_replay_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.jsonl");
        let hand = serde_json::to_string(&make_open_hand((0.4, 0.6))).unwrap();
        let text = format!("{{\"hands\": [{}]}}\n{{\"hands\": []}}\n", hand);
        let source = Box::new(JsonLinesSource::replay(Cursor::new(text.into_bytes()), 10.0));
        let (_command_tx, command_rx) = mpsc::channel();
        let (report_tx, _report_rx) = mpsc::channel();
        let out = BufWriter::new(File::create(&path).unwrap());
        let running = Arc::new(AtomicBool::new(true));

        process_frames(tracker(false), source, command_rx, report_tx, running, Some(out)).unwrap();

        let recorded = std::fs::read_to_string(&path).unwrap();
        let frames: Vec<Frame> = recorded
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].timestamp, Some(0.0));
        assert_eq!(frames[1].timestamp, Some(0.1));
        assert_eq!(frames[0].hands.len(), 1);
    }
}
