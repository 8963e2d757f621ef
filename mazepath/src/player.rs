//! Turns a found path into a timed schedule of sprite positions.
//!
//! The player never touches the sprite itself. It only describes where the
//! sprite should be at which time, the presentation layer owns the timer and
//! moves the sprite when a frame becomes due.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Position};

/// Correction from the point the search samples to the sprite's anchor.
///
/// Path cells are visual centers, a sprite is usually placed by its top-left
/// corner, so each cell is shifted by this amount before it is emitted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteOffset {
    pub x: f64,
    pub y: f64,
}

impl SpriteOffset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset for a sprite anchored at its top-left corner
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            x: width / 2.0,
            y: height / 2.0,
        }
    }

    pub fn apply(&self, cell: Cell) -> Position {
        Position {
            x: cell.x as f64 - self.x,
            y: cell.y as f64 - self.y,
        }
    }
}

/// A sprite position due at `at` after playback started
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "at_ms", with = "millis")]
    pub at: Duration,
    pub x: f64,
    pub y: f64,
}

impl Frame {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathPlayer {
    pub interval: Duration,
    pub offset: SpriteOffset,
}

impl PathPlayer {
    pub fn new(interval: Duration, offset: SpriteOffset) -> Self {
        Self { interval, offset }
    }

    /// Schedule cell `i` of the path at `i * interval`
    pub fn play(&self, path: &[Cell]) -> Playback {
        let frames = path
            .iter()
            .enumerate()
            .map(|(i, &cell)| {
                let position = self.offset.apply(cell);
                Frame {
                    at: self.interval * i as u32,
                    x: position.x,
                    y: position.y,
                }
            })
            .collect();

        Playback {
            frames,
            next: 0,
            cancelled: false,
        }
    }
}

/// Frames of one path, handed out as they become due
#[derive(Clone, Debug)]
pub struct Playback {
    frames: Vec<Frame>,
    next: usize,
    cancelled: bool,
}

impl Playback {
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Time at which the last frame is due
    pub fn duration(&self) -> Duration {
        self.frames.last().map(|f| f.at).unwrap_or_default()
    }

    /// Every not yet emitted frame due at or before `elapsed`, in order
    pub fn advance(&mut self, elapsed: Duration) -> &[Frame] {
        if self.cancelled {
            return &[];
        }

        let start = self.next;
        while self.next < self.frames.len() && self.frames[self.next].at <= elapsed {
            self.next += 1;
        }
        &self.frames[start..self.next]
    }

    /// Stop emitting, already emitted frames stay emitted
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.cancelled || self.next >= self.frames.len()
    }

    /// The most recently emitted frame
    pub fn current(&self) -> Option<&Frame> {
        self.next.checked_sub(1).map(|i| &self.frames[i])
    }
}

impl Iterator for Playback {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.is_finished() {
            return None;
        }
        let frame = self.frames[self.next];
        self.next += 1;
        Some(frame)
    }
}
