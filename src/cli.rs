use crate::geometry::ScreenSize;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cammouse")]
#[command(about = "Control the mouse cursor with hand gestures from a webcam landmark detector")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available displays
    List {
        #[arg(value_enum)]
        target: ListTarget,
    },

    /// Track a live landmark stream and drive the cursor
    Track {
        /// Detector command that prints landmark JSON lines to stdout
        #[arg(long, conflicts_with = "input", required_unless_present = "input")]
        detector: Option<String>,

        /// Landmark JSON-lines file, or - for stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Config file (default: cammouse.toml in the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Screen size to map onto, e.g. 1920x1080
        #[arg(long, value_parser = parse_screen, conflicts_with = "display")]
        screen: Option<ScreenSize>,

        /// Display index to map onto (see `cammouse list displays`)
        #[arg(long)]
        display: Option<usize>,

        /// Move and click the system cursor from the start
        #[arg(long)]
        system_control: bool,

        /// Keep driving the cursor even when it sits in the top-left corner
        #[arg(long)]
        no_failsafe: bool,

        /// Write a session log (JSON) on exit
        #[arg(long)]
        session: Option<PathBuf>,

        /// Save every received frame as JSON lines for later replay
        #[arg(long)]
        record_frames: Option<PathBuf>,
    },

    /// Run the gesture engine over recorded frames
    Replay {
        /// Landmark JSON-lines file
        input: PathBuf,

        /// Frame rate used to stamp frames without a timestamp
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Screen size to map onto (default: config file, else 1920x1080)
        #[arg(long, value_parser = parse_screen)]
        screen: Option<ScreenSize>,

        /// Config file (default: cammouse.toml in the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Write a session log (JSON)
        #[arg(long)]
        session: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
pub enum ListTarget {
    /// List available displays
    Displays,
}

/// Gesture tuning flags shared by `track` and `replay`
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Cursor sensitivity (> 0)
    #[arg(long)]
    pub sensitivity: Option<f64>,

    /// Cursor smoothing in [0, 1)
    #[arg(long)]
    pub smoothing: Option<f64>,

    /// Thumb-index pinch distance for a left click
    #[arg(long)]
    pub left_threshold: Option<f64>,

    /// Thumb-middle pinch distance for a right click
    #[arg(long)]
    pub right_threshold: Option<f64>,

    /// Seconds between clicks
    #[arg(long)]
    pub cooldown: Option<f64>,

    /// Ignore hands with a lower detector score
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Flip the camera image horizontally
    #[arg(long)]
    pub mirror: bool,
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_screen(s: &str) -> Result<ScreenSize, String> {
    let lower = s.trim().to_ascii_lowercase();
    let (w, h) = lower
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", w))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", h))?;
    if width == 0 || height == 0 {
        return Err(format!("screen size must be positive, got {}x{}", width, height));
    }
    Ok(ScreenSize::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_screen() {
        assert_eq!(parse_screen("1920x1080"), Ok(ScreenSize::new(1920, 1080)));
        assert_eq!(parse_screen("2560X1440"), Ok(ScreenSize::new(2560, 1440)));
        assert!(parse_screen("1920").is_err());
        assert!(parse_screen("0x1080").is_err());
        assert!(parse_screen("axb").is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_track_requires_a_source() {
        assert!(Cli::try_parse_from(["cammouse", "track"]).is_err());
        assert!(Cli::try_parse_from([
            "cammouse", "track", "--detector", "hands", "--input", "-"
        ])
        .is_err());
    }

    #[test]
    fn test_track_flags() {
        let cli = Cli::try_parse_from([
            "cammouse",
            "track",
            "--input",
            "-",
            "--sensitivity",
            "2.5",
            "--mirror",
            "--screen",
            "1280x720",
            "--no-failsafe",
        ])
        .unwrap();

        match cli.command {
            Commands::Track {
                input,
                tuning,
                screen,
                no_failsafe,
                system_control,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("-")));
                assert_eq!(tuning.sensitivity, Some(2.5));
                assert!(tuning.mirror);
                assert_eq!(tuning.cooldown, None);
                assert_eq!(screen, Some(ScreenSize::new(1280, 720)));
                assert!(no_failsafe);
                assert!(!system_control);
            }
            _ => panic!("expected track"),
        }
    }

    #[test]
    fn test_replay_defaults() {
        let cli = Cli::try_parse_from(["cammouse", "replay", "frames.jsonl"]).unwrap();
        match cli.command {
            Commands::Replay { input, fps, screen, .. } => {
                assert_eq!(input, PathBuf::from("frames.jsonl"));
                assert_eq!(fps, 30.0);
                assert!(screen.is_none());
            }
            _ => panic!("expected replay"),
        }
    }
}
