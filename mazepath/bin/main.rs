use std::process::ExitCode;

use anyhow::Context;
use log::{info, warn};
use mazepath::{MazeConfig, MazeSession, PathFinderState};

fn usage() -> anyhow::Error {
    anyhow::anyhow!("usage: mazepath <config.json> [maze image]")
}

fn run() -> Result<ExitCode, anyhow::Error> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().ok_or_else(usage)?;

    let mut config = MazeConfig::load(&config_path)?;
    if let Some(image) = args.next() {
        config.image = Some(image);
    }

    let mut session = MazeSession::open(config)?;
    let snapshot = session.snapshot();
    info!(
        "maze {}x{} shown at {:?}, scale {:.3}x{:.3}",
        snapshot.width(),
        snapshot.height(),
        snapshot.display_size(),
        snapshot.scale_x(),
        snapshot.scale_y()
    );

    let attempt = session.restart();
    match attempt.state() {
        PathFinderState::PathFound(result) => {
            info!(
                "reached {} from {} in {} steps",
                result.goal,
                result.start,
                result.steps()
            );
        }
        _ => {
            warn!("the goal cannot be reached, the agent stays at the start");
            return Ok(ExitCode::SUCCESS);
        }
    }

    if let Some(playback) = attempt.playback() {
        for frame in playback.frames() {
            println!(
                "{}",
                serde_json::to_string(frame).context("failed to encode frame")?
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
