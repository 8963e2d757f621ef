use std::{path::Path, time::Duration};

use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{Cell, GoalWindow, Position};
use crate::player::{PathPlayer, SpriteOffset};
use crate::walls::WallPolicy;

/// Everything needed to turn a maze image into a path and a playback.
///
/// Stored as JSON, every field is optional and falls back to the defaults of
/// a 600x600 maze with a 20x20 agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Maze image, relative paths are resolved against the config file
    pub image: Option<String>,
    pub display_width: f64,
    pub display_height: f64,
    pub start: Cell,
    pub goal: Position,
    pub step: i32,
    pub tolerance_radius: f64,
    pub step_interval_ms: u64,
    pub sprite_width: f64,
    pub sprite_height: f64,
    /// Overrides the offset derived from the sprite size
    pub sprite_offset: Option<SpriteOffset>,
    pub walls: WallPolicy,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            image: None,
            display_width: 600.0,
            display_height: 600.0,
            start: Cell::new(15, 380),
            goal: Position::new(570.0, 345.0),
            step: 5,
            tolerance_radius: 20.0,
            step_interval_ms: 30,
            sprite_width: 20.0,
            sprite_height: 20.0,
            sprite_offset: None,
            walls: WallPolicy::default(),
        }
    }
}

impl MazeConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: MazeConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        if let (Some(image), Some(dir)) = (&config.image, path.parent()) {
            if Path::new(image).is_relative() {
                config.image = Some(dir.join(image).to_string_lossy().into_owned());
            }
        }

        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step <= 0 {
            return Err(ConfigError::Step(self.step));
        }
        if !(self.tolerance_radius > 0.0) {
            return Err(ConfigError::ToleranceRadius(self.tolerance_radius));
        }
        if !(self.display_width > 0.0 && self.display_height > 0.0) {
            return Err(ConfigError::DisplaySize(
                self.display_width,
                self.display_height,
            ));
        }
        if self.step_interval_ms == 0 {
            return Err(ConfigError::Interval);
        }
        if let WallPolicy::Blacklist { tolerance, .. } = self.walls {
            if !(tolerance >= 0.0) {
                return Err(ConfigError::ColorTolerance(tolerance));
            }
        }

        if !self.lattice_reaches_goal() {
            warn!(
                "no cell reachable from {} in steps of {} lies within {} of the goal {:?}, \
                 the search cannot succeed",
                self.start, self.step, self.tolerance_radius, self.goal
            );
        }

        Ok(())
    }

    /// Whether some cell `start + k * step` falls inside the goal window on
    /// both axes. When false the search explores without ever arriving, even
    /// on a fully open maze.
    pub fn lattice_reaches_goal(&self) -> bool {
        let step = self.step as f64;
        let axis = |start: i32, goal: f64| {
            // nearest lattice coordinate to the goal on this axis
            let k = ((goal - start as f64) / step).round();
            (start as f64 + k * step - goal).abs() < self.tolerance_radius
        };

        self.step > 0 && axis(self.start.x, self.goal.x) && axis(self.start.y, self.goal.y)
    }

    pub fn goal_window(&self) -> GoalWindow {
        GoalWindow::new(self.goal, self.tolerance_radius, self.step)
    }

    pub fn sprite_offset(&self) -> SpriteOffset {
        self.sprite_offset
            .unwrap_or_else(|| SpriteOffset::centered(self.sprite_width, self.sprite_height))
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn player(&self) -> PathPlayer {
        PathPlayer::new(self.step_interval(), self.sprite_offset())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::walls::Color;

    #[test]
    fn test_defaults() {
        let config: MazeConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config, MazeConfig::default());
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.sprite_offset(), SpriteOffset::new(10.0, 10.0));
        assert_eq!(config.step_interval(), Duration::from_millis(30));
        assert!(config.lattice_reaches_goal());
    }

    #[test]
    fn test_parse() {
        let config: MazeConfig = serde_json::from_str(
            r##"{
                "image": "maze.png",
                "start": {"x": 10, "y": 20},
                "goal": {"x": 100.5, "y": 40},
                "step": 10,
                "sprite_offset": {"x": 20, "y": 10},
                "walls": {"policy": "blacklist", "wall": "#0000FF", "tolerance": 0.2}
            }"##,
        )
        .unwrap();

        assert_eq!(config.image.as_deref(), Some("maze.png"));
        assert_eq!(config.start, Cell::new(10, 20));
        assert_eq!(config.goal, Position::new(100.5, 40.0));
        assert_eq!(config.sprite_offset(), SpriteOffset::new(20.0, 10.0));
        assert_eq!(
            config.walls,
            WallPolicy::Blacklist {
                wall: Color::BLUE,
                tolerance: 0.2
            }
        );
        assert_eq!(config.tolerance_radius, 20.0);
    }

    #[test]
    fn test_validate() {
        let invalid = |f: fn(&mut MazeConfig)| {
            let mut config = MazeConfig::default();
            f(&mut config);
            config.validate().unwrap_err()
        };

        assert_eq!(invalid(|c| c.step = 0), ConfigError::Step(0));
        assert_eq!(
            invalid(|c| c.tolerance_radius = 0.0),
            ConfigError::ToleranceRadius(0.0)
        );
        assert_eq!(
            invalid(|c| c.display_height = 0.0),
            ConfigError::DisplaySize(600.0, 0.0)
        );
        assert_eq!(invalid(|c| c.step_interval_ms = 0), ConfigError::Interval);
        assert_eq!(
            invalid(|c| c.walls = WallPolicy::Blacklist {
                wall: Color::BLUE,
                tolerance: -0.1
            }),
            ConfigError::ColorTolerance(-0.1)
        );
    }

    #[test]
    fn test_lattice_hazard() {
        let mut config = MazeConfig {
            start: Cell::new(0, 0),
            goal: Position::new(15.0, 0.0),
            step: 10,
            tolerance_radius: 3.0,
            ..Default::default()
        };

        // lattice x = 10 or 20, both 5 away from the goal
        assert!(!config.lattice_reaches_goal());
        // still valid, the hazard is only reported
        assert_eq!(config.validate(), Ok(()));

        config.tolerance_radius = 5.5;
        assert!(config.lattice_reaches_goal());

        config.tolerance_radius = 3.0;
        config.start = Cell::new(3, 0);
        assert!(config.lattice_reaches_goal());
    }

    #[test]
    fn test_load_resolves_image() {
        let dir = std::env::temp_dir().join(format!("mazepath-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("maze.json");
        std::fs::write(&path, r#"{"image": "maze.png", "step": 2}"#).unwrap();

        let config = MazeConfig::load(&path).unwrap();
        assert_eq!(config.step, 2);
        assert_eq!(
            config.image.map(std::path::PathBuf::from),
            Some(dir.join("maze.png"))
        );

        std::fs::write(&path, r#"{"step": 0}"#).unwrap();
        assert!(MazeConfig::load(&path).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
