mod classifier;
mod cli;
mod config;
mod control;
mod cursor_types;
mod debounce;
mod display;
mod engine;
mod geometry;
mod landmarks;
mod logging;
mod mapper;
mod replay;
mod session;
mod source;
mod tracker;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ListTarget};
use config::load_config;
use geometry::ScreenSize;
use tracker::{FrameInput, TrackOptions};

/// Replay target when neither the command line nor the config names a size
const DEFAULT_REPLAY_SCREEN: ScreenSize = ScreenSize::new(1920, 1080);

fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::List { target } => match target {
            ListTarget::Displays => {
                let displays = display::list_displays()?;
                if displays.is_empty() {
                    println!("No displays found.");
                } else {
                    println!("Available displays:");
                    for d in displays {
                        println!(
                            "  [{index}] {width}x{height} at ({x}, {y}){main}",
                            index = d.index,
                            width = d.width,
                            height = d.height,
                            x = d.x,
                            y = d.y,
                            main = if d.is_main { " (main)" } else { "" }
                        );
                    }
                }
            }
        },
        Commands::Track {
            detector,
            input,
            config,
            tuning,
            screen,
            display,
            system_control,
            no_failsafe,
            session,
            record_frames,
        } => {
            let mut config = load_config(config.as_deref())?;
            config.tracking.apply_overrides(&tuning);
            config.tracking.validate()?;

            if let Some(size) = screen {
                config.screen.width = Some(size.width);
                config.screen.height = Some(size.height);
            }
            if display.is_some() {
                // An explicit display wins over a size from the config file
                config.screen.display = display;
                config.screen.width = None;
                config.screen.height = None;
            }
            if system_control {
                config.control.system_control = true;
            }
            if no_failsafe {
                config.control.failsafe = false;
            }

            let input = match (detector, input) {
                (Some(command), _) => FrameInput::Detector(command),
                (None, Some(path)) => FrameInput::Path(path),
                (None, None) => anyhow::bail!("Must specify either --detector or --input"),
            };

            let target = display::resolve_target(&config.screen)?;
            tracker::run(TrackOptions {
                input,
                tracking: config.tracking,
                target,
                control: config.control,
                session,
                record_frames,
            })?;
        }
        Commands::Replay {
            input,
            fps,
            screen,
            config,
            tuning,
            session,
        } => {
            let mut config = load_config(config.as_deref())?;
            config.tracking.apply_overrides(&tuning);

            let screen = screen
                .or_else(|| config.screen.size())
                .unwrap_or(DEFAULT_REPLAY_SCREEN);

            replay::replay_file(&input, fps, &config.tracking, screen, session.as_deref())?;
        }
    }

    Ok(())
}
