use std::{fmt::Display, str::FromStr};

use image::Rgba;
use serde::{Deserialize, Serialize};

/// A color sample with every channel normalized to [0, 1]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// True if every color channel is within `tolerance` of the other color.
    /// The alpha channel is not compared.
    pub fn within(&self, other: &Color, tolerance: f32) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        let [r, g, b, a] = p.0;
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([channel(c.r), channel(c.g), channel(c.b), channel(c.a)])
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Rgba([r, g, b, a]) = Rgba::<u8>::from(*self);
        if a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    /// Parses `#RRGGBB` or `#RRGGBBAA`, the leading `#` is optional
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(anyhow::anyhow!("Invalid color: {}", s));
        }

        let mut channels = [255u8; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
            *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|e| anyhow::anyhow!("Invalid color: {}: {}", s, e))?;
        }

        Ok(Rgba(channels).into())
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// How the colors of a maze image are split into walls and open space.
///
/// The two variants are opposite authoring conventions: a whitelist maze
/// treats any unknown color as a wall, a blacklist maze treats it as open.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum WallPolicy {
    /// Only exactly `open` is walkable, anti-aliased edges included in the walls
    Whitelist { open: Color },
    /// Only colors within `tolerance` of `wall` (per channel) block movement
    Blacklist {
        wall: Color,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
}

fn default_tolerance() -> f32 {
    0.1
}

impl Default for WallPolicy {
    fn default() -> Self {
        WallPolicy::Whitelist { open: Color::WHITE }
    }
}

impl WallPolicy {
    pub fn blacklist(wall: Color) -> Self {
        WallPolicy::Blacklist {
            wall,
            tolerance: default_tolerance(),
        }
    }

    pub fn is_wall(&self, color: Color) -> bool {
        match self {
            WallPolicy::Whitelist { open } => color != *open,
            WallPolicy::Blacklist { wall, tolerance } => color.within(wall, *tolerance),
        }
    }
}
