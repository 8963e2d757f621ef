use crate::config::MazeConfig;
use crate::error::ConfigError;
use crate::find::{Goal, MapStorage, MapTrait, NodeReference};
use crate::snapshot::MazeSnapshot;
use crate::walls::WallPolicy;
use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A position in agent space reachable by whole steps
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl NodeReference for Cell {}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A continuous position in agent space
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Cell> for Position {
    fn from(c: Cell) -> Self {
        Self {
            x: c.x as f64,
            y: c.y as f64,
        }
    }
}

/// A MapStorage for the unbounded step lattice, only touched cells are stored
#[derive(Debug)]
pub struct CellStorage<T>(HashMap<Cell, T>);

impl<T> CellStorage<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Cell, &T)> {
        self.0.iter()
    }
}

impl<T: Default + Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Cell;

    fn get(&self, node: Self::Reference) -> T {
        self.0.get(&node).copied().unwrap_or_default()
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        self.0.entry(node).or_default()
    }
}

/// Right, left, down, up in units of one step
const MOVES: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// The implicit 4-connected grid obtained by moving `step` units at a time
/// over a maze image.
#[derive(Debug, Clone, Copy)]
pub struct StepGrid<'a> {
    snapshot: &'a MazeSnapshot,
    policy: WallPolicy,
    step: i32,
}

impl<'a> StepGrid<'a> {
    pub fn new(
        snapshot: &'a MazeSnapshot,
        policy: WallPolicy,
        step: i32,
    ) -> Result<Self, ConfigError> {
        if step <= 0 {
            return Err(ConfigError::Step(step));
        }
        Ok(Self {
            snapshot,
            policy,
            step,
        })
    }

    /// Grid for a config that already passed [`MazeConfig::validate`]
    pub(crate) fn from_config(snapshot: &'a MazeSnapshot, config: &MazeConfig) -> Self {
        debug_assert!(config.step > 0);
        Self {
            snapshot,
            policy: config.walls,
            step: config.step,
        }
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn policy(&self) -> &WallPolicy {
        &self.policy
    }

    /// Whether the agent may stand at this agent space position.
    ///
    /// The position is the point sampled in the image, so callers pass the
    /// visual center of the agent and not the anchor of its sprite.
    pub fn is_valid_move(&self, x: f64, y: f64) -> bool {
        self.snapshot
            .to_pixel(x, y)
            .and_then(|(px, py)| self.snapshot.pixel(px, py))
            .is_some_and(|color| !self.policy.is_wall(color))
    }
}

impl<'a> MapTrait for StepGrid<'a> {
    type Reference = Cell;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn is_valid(&self, node: Self::Reference) -> bool {
        self.is_valid_move(node.x as f64, node.y as f64)
    }

    fn neighbors_of(
        &self,
        node: Self::Reference,
    ) -> impl Iterator<Item = (Self::Reference, usize)> {
        let mut points = Vec::with_capacity(4);

        for (dx, dy) in MOVES {
            let next = node.offset(dx * self.step, dy * self.step);
            if self.is_valid(next) {
                points.push((next, 1));
            }
        }

        points.into_iter()
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage(HashMap::new())
    }
}

/// The area around the goal position that counts as arrival
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalWindow {
    pub center: Position,
    /// half-width of the window, a point this far away on an axis is outside
    pub radius: f64,
    /// step length used to turn distances into move counts
    pub step: f64,
}

impl GoalWindow {
    pub fn new(center: Position, radius: f64, step: i32) -> Self {
        Self {
            center,
            radius,
            step: step as f64,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.center.x).abs() < self.radius && (y - self.center.y).abs() < self.radius
    }

    /// Manhattan distance to the goal position in agent units, truncated
    pub fn manhattan(&self, x: f64, y: f64) -> usize {
        ((x - self.center.x).abs() + (y - self.center.y).abs()) as usize
    }

    /// Fewest moves along one axis that bring a distance `d` inside the window
    fn axis_moves(&self, d: f64) -> usize {
        let d = d.abs();
        if d < self.radius {
            0
        } else {
            ((d - self.radius) / self.step).floor() as usize + 1
        }
    }
}

impl Goal<Cell> for GoalWindow {
    fn is_reached(&self, node: Cell) -> bool {
        self.contains(node.x as f64, node.y as f64)
    }

    /// The Manhattan distance to the window edge counted in whole moves
    fn estimate(&self, node: Cell) -> usize {
        self.axis_moves(node.x as f64 - self.center.x)
            + self.axis_moves(node.y as f64 - self.center.y)
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::find::{find_path, PathFinder, PathFinderState};
    use crate::walls::Color;
    use image::{Rgba, RgbaImage};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    /// One pixel per agent unit, `X` is a wall
    fn snapshot_from(rows: &[&str]) -> MazeSnapshot {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let mut image = RgbaImage::from_pixel(width, height, WHITE);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == 'X' {
                    image.put_pixel(x as u32, y as u32, BLACK);
                }
            }
        }
        MazeSnapshot::new(image, width as f64, height as f64).unwrap()
    }

    fn create_basic_map() -> MazeSnapshot {
        snapshot_from(&[
            "XXXXXXX", //
            "X XXX X", //
            "X XXX X", //
            "X X   X", //
            "X X XXX", //
            "X      ", //
            "XXXXXXX", //
        ])
    }

    fn exact(x: i32, y: i32) -> GoalWindow {
        GoalWindow::new(Position::new(x as f64, y as f64), 0.5, 1)
    }

    #[test]
    fn test_is_valid_move() {
        let snapshot = create_basic_map();
        let grid = StepGrid::new(&snapshot, WallPolicy::default(), 1).unwrap();

        assert!(grid.is_valid_move(1.0, 1.0));
        assert!(!grid.is_valid_move(0.0, 0.0));
        assert!(grid.is_valid_move(6.0, 5.0));
        // one past the last valid index
        assert!(!grid.is_valid_move(7.0, 5.0));
        assert!(!grid.is_valid_move(1.0, 7.0));
        assert!(!grid.is_valid_move(-1.0, 1.0));
    }

    #[test]
    fn test_is_valid_move_scaled() {
        // a 4x4 image shown at 8x8, the wall pixel covers agent 4..8 x 4..8
        let mut image = RgbaImage::from_pixel(4, 4, WHITE);
        image.put_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let snapshot = MazeSnapshot::new(image, 8.0, 8.0).unwrap();
        let grid = StepGrid::new(&snapshot, WallPolicy::blacklist(Color::BLUE), 1).unwrap();

        assert!(grid.is_valid_move(3.9, 3.9));
        assert!(!grid.is_valid_move(4.0, 4.0));
        assert!(!grid.is_valid_move(5.9, 5.9));
        assert!(grid.is_valid_move(6.0, 5.0));
        assert!(!grid.is_valid_move(8.0, 0.0));
    }

    #[test]
    fn test_step_must_be_positive() {
        let snapshot = create_basic_map();

        assert_eq!(
            StepGrid::new(&snapshot, WallPolicy::default(), 0).unwrap_err(),
            ConfigError::Step(0)
        );
        assert_eq!(
            StepGrid::new(&snapshot, WallPolicy::default(), -5).unwrap_err(),
            ConfigError::Step(-5)
        );
    }

    #[test]
    fn test_neighbors() {
        let snapshot = create_basic_map();
        let grid = StepGrid::new(&snapshot, WallPolicy::default(), 1).unwrap();

        let neighbors: Vec<_> = grid.neighbors_of(Cell::new(3, 5)).collect();
        assert_eq!(
            neighbors,
            vec![
                (Cell::new(4, 5), 1),
                (Cell::new(2, 5), 1),
                (Cell::new(3, 4), 1)
            ]
        );
    }

    #[test]
    fn test_basic_route() {
        let snapshot = create_basic_map();
        let grid = StepGrid::new(&snapshot, WallPolicy::default(), 1).unwrap();

        let result = find_path(&grid, Cell::new(1, 1), exact(5, 1))
            .into_path()
            .unwrap();

        assert_eq!(result.total_cost, 12);
        assert_eq!(result.goal, Cell::new(5, 1));
    }

    #[test]
    fn test_basic_no_route() {
        let snapshot = create_basic_map();
        let grid = StepGrid::new(&snapshot, WallPolicy::default(), 1).unwrap();

        // no route to target
        assert_eq!(
            find_path(&grid, Cell::new(1, 1), exact(5, 0)),
            PathFinderState::NoPathFound
        );
    }

    #[test]
    fn test_goal_window_boundary() {
        let goal = GoalWindow::new(Position::new(570.0, 345.0), 20.0, 5);

        assert!(goal.is_reached(Cell::new(570, 345)));
        assert!(goal.is_reached(Cell::new(551, 364)));
        assert!(goal.is_reached(Cell::new(589, 326)));
        // exactly one radius away is outside
        assert!(!goal.is_reached(Cell::new(550, 345)));
        assert!(!goal.is_reached(Cell::new(570, 365)));
        assert!(!goal.is_reached(Cell::new(590, 364)));
    }

    #[test]
    fn test_goal_estimate() {
        let goal = GoalWindow::new(Position::new(570.0, 345.0), 20.0, 5);

        assert_eq!(goal.manhattan(15.0, 380.0), 590);
        assert_eq!(goal.manhattan(15.5, 380.0), 589);
        assert_eq!(goal.estimate(Cell::new(560, 345)), 0);
        // 550 is 20 away, one move to 555 enters the window
        assert_eq!(goal.estimate(Cell::new(550, 345)), 1);
        assert_eq!(goal.estimate(Cell::new(549, 345)), 1);
        assert_eq!(goal.estimate(Cell::new(545, 345)), 2);
        assert_eq!(goal.estimate(Cell::new(15, 380)), 108 + 4);
    }

    #[test]
    fn test_estimate_is_consistent() {
        let goal = GoalWindow::new(Position::new(47.5, 12.0), 7.0, 3);

        for x in -30..90 {
            for y in -30..60 {
                let cell = Cell::new(x, y);
                let h = goal.estimate(cell);
                if goal.is_reached(cell) {
                    assert_eq!(h, 0);
                }
                for (dx, dy) in MOVES {
                    let next = goal.estimate(cell.offset(dx * 3, dy * 3));
                    assert!(h <= next + 1, "{} -> {}", cell, cell.offset(dx * 3, dy * 3));
                }
            }
        }
    }

    #[test]
    fn test_storage_tracks_touched_cells() {
        let snapshot = create_basic_map();
        let grid = StepGrid::new(&snapshot, WallPolicy::default(), 1).unwrap();

        let (state, visited) =
            PathFinder::new(Cell::new(1, 1), exact(1, 2), grid.create_storage()).finish(&grid);

        assert!(state.is_done());
        assert!(!visited.is_empty());
        assert!(visited.len() <= 3);
        assert!(visited.iter().all(|(cell, item)| grid.is_valid(*cell) && item.is_some()));
    }
}
