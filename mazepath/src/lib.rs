//! Shortest paths through mazes drawn as images.
//!
//! The maze image is sampled on a lattice of fixed steps in agent space
//! ([`grid::StepGrid`]), pixels are split into walls and open space by a
//! [`walls::WallPolicy`], an A* search ([`find::PathFinder`]) finds the
//! shortest 4-connected route into the goal window and a
//! [`player::PathPlayer`] turns that route into timed sprite positions.

pub mod config;
pub mod error;
pub mod find;
pub mod grid;
pub mod player;
pub mod session;
pub mod snapshot;
pub mod walls;

pub use config::MazeConfig;
pub use error::ConfigError;
pub use find::{
    find_path, Goal, MapStorage, MapTrait, NodeReference, PathFinder, PathFinderState, PathResult,
    Visited, VisitedItem,
};
pub use grid::{Cell, CellStorage, GoalWindow, Position, StepGrid};
pub use player::{Frame, PathPlayer, Playback, SpriteOffset};
pub use session::{Attempt, MazeSession};
pub use snapshot::MazeSnapshot;
pub use walls::{Color, WallPolicy};
