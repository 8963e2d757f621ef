use std::time::Duration;

use anyhow::Context;
use log::{debug, info};

use crate::config::MazeConfig;
use crate::error::ConfigError;
use crate::find::{find_path, PathFinderState};
use crate::grid::{Cell, Position, StepGrid};
use crate::player::{Frame, Playback};
use crate::snapshot::MazeSnapshot;

/// One search and the playback of its result.
///
/// Attempts are tagged with the session generation they were started in, a
/// restart makes every older attempt stale.
#[derive(Debug)]
pub struct Attempt {
    generation: u64,
    state: PathFinderState<Cell>,
    playback: Option<Playback>,
}

impl Attempt {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &PathFinderState<Cell> {
        &self.state
    }

    pub fn found(&self) -> bool {
        matches!(self.state, PathFinderState::PathFound(_))
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    pub fn cancel(&mut self) {
        if let Some(playback) = &mut self.playback {
            playback.cancel();
        }
    }
}

/// A maze with its configuration, restartable any number of times
#[derive(Debug)]
pub struct MazeSession {
    config: MazeConfig,
    snapshot: MazeSnapshot,
    generation: u64,
}

impl MazeSession {
    /// Pair a config with a snapshot shown at the configured display size
    pub fn new(config: MazeConfig, snapshot: MazeSnapshot) -> Result<Self, ConfigError> {
        config.validate()?;

        let display = (config.display_width, config.display_height);
        if snapshot.display_size() != display {
            return Err(ConfigError::DisplayMismatch {
                config: display,
                snapshot: snapshot.display_size(),
            });
        }

        Ok(Self {
            config,
            snapshot,
            generation: 0,
        })
    }

    /// Load the maze image named by the config
    pub fn open(config: MazeConfig) -> anyhow::Result<Self> {
        let image = config
            .image
            .as_deref()
            .context("no maze image configured")?;
        let snapshot = MazeSnapshot::open(image, config.display_width, config.display_height)?;
        Self::new(config, snapshot).context("invalid maze config")
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &MazeSnapshot {
        &self.snapshot
    }

    pub fn grid(&self) -> StepGrid<'_> {
        StepGrid::from_config(&self.snapshot, &self.config)
    }

    /// Search from the configured start with fresh tables
    pub fn find_path(&self) -> PathFinderState<Cell> {
        let goal = self.config.goal_window();
        debug!(
            "finding path from {} to {:?} (manhattan {}, step {})",
            self.config.start,
            self.config.goal,
            goal.manhattan(self.config.start.x as f64, self.config.start.y as f64),
            self.config.step
        );
        find_path(&self.grid(), self.config.start, goal)
    }

    /// Discard the previous attempt and search again
    pub fn restart(&mut self) -> Attempt {
        self.generation += 1;
        info!("starting attempt {}", self.generation);

        let state = self.find_path();
        let playback = match &state {
            PathFinderState::PathFound(result) => Some(self.config.player().play(&result.path)),
            _ => None,
        };

        Attempt {
            generation: self.generation,
            state,
            playback,
        }
    }

    pub fn is_current(&self, attempt: &Attempt) -> bool {
        attempt.generation == self.generation
    }

    /// Frames of the attempt due at `elapsed`, nothing for a superseded attempt
    pub fn tick<'a>(&self, attempt: &'a mut Attempt, elapsed: Duration) -> &'a [Frame] {
        if !self.is_current(attempt) {
            attempt.cancel();
            return &[];
        }
        match &mut attempt.playback {
            Some(playback) => playback.advance(elapsed),
            None => &[],
        }
    }

    /// Where the sprite sits before any frame is played
    pub fn start_position(&self) -> Position {
        self.config.sprite_offset().apply(self.config.start)
    }

    /// Whether an agent centered at `position` is at the goal
    pub fn is_won(&self, position: Position) -> bool {
        self.config.goal_window().contains(position.x, position.y)
    }
}
