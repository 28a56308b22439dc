use crate::config::TrackingConfig;
use crate::cursor_types::EventType;
use crate::engine::GestureEngine;
use crate::geometry::ScreenSize;
use crate::logging;
use crate::session::SessionLog;
use crate::source::{FrameSource, JsonLinesSource};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

/// Run the gesture engine over a recorded frame file. The system cursor is never touched.
pub fn replay_file(
    input: &Path,
    fps: f64,
    tracking: &TrackingConfig,
    screen: ScreenSize,
    session_path: Option<&Path>,
) -> Result<()> {
    if !(fps > 0.0) {
        anyhow::bail!("Frame rate must be positive (got {})", fps);
    }

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read frames from {:?}", input))?;
    let frame_count = text.lines().filter(|l| !l.trim().is_empty()).count();

    let mut engine = GestureEngine::new(tracking, screen)?;

    println!("Replaying frames: {}", input.display());
    println!("  Frames: {}", frame_count);
    println!("  Screen: {}x{}", screen.width, screen.height);
    println!(
        "  Sensitivity: {}, smoothing: {}, cooldown: {}s",
        tracking.sensitivity, tracking.smoothing, tracking.click_cooldown
    );

    let pb = ProgressBar::new(frame_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let log_guard = logging::attach(&pb);
    let mut source = JsonLinesSource::replay(text.as_bytes(), fps);
    let session = replay_frames(
        &mut source,
        &mut engine,
        SessionLog::new(screen, tracking.clone()),
        &pb,
    )?;
    drop(log_guard);
    pb.finish_and_clear();

    println!("\nReplay complete! {:.2}s of frames", session.duration);
    println!(
        "  Frames read: {} ({} with a hand)",
        session.frame_count,
        session.count_events(EventType::Move)
    );
    println!("  Left clicks: {}", session.count_events(EventType::LeftClick));
    println!("  Right clicks: {}", session.count_events(EventType::RightClick));

    if let Some(path) = session_path {
        session.save(path)?;
        println!("Session log: {}", path.display());
    }

    Ok(())
}

fn replay_frames(
    source: &mut dyn FrameSource,
    engine: &mut GestureEngine,
    mut session: SessionLog,
    pb: &ProgressBar,
) -> Result<SessionLog> {
    let mut first = None;

    while let Some(frame) = source.next_frame()? {
        let timestamp = frame.timestamp.unwrap_or_default();
        let start = *first.get_or_insert(timestamp);

        session.frame_count += 1;
        session.duration = (timestamp - start).max(0.0);

        if let Some(gesture) = engine.process(frame.primary_hand(), timestamp) {
            session.record(&gesture);
        }
        pb.inc(1);
    }

    Ok(session)
}
