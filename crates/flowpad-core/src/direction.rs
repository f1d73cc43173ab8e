//! Layout direction and the handle orientation it implies.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::node::HandlePosition;

/// Direction in which a layered layout flows from sources to sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Error returned when a direction name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layout direction `{0}`, expected one of UP, DOWN, LEFT, RIGHT")]
pub struct ParseDirectionError(String);

impl Direction {
    /// Returns true for directions whose layers run left to right or right to left.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Returns true when layer coordinates decrease with depth.
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::Up | Self::Left)
    }

    /// Side where incoming edges attach.
    pub fn target_handle(self) -> HandlePosition {
        match self {
            Self::Down => HandlePosition::Top,
            Self::Up => HandlePosition::Bottom,
            Self::Right => HandlePosition::Left,
            Self::Left => HandlePosition::Right,
        }
    }

    /// Side where outgoing edges attach.
    pub fn source_handle(self) -> HandlePosition {
        match self {
            Self::Down => HandlePosition::Bottom,
            Self::Up => HandlePosition::Top,
            Self::Right => HandlePosition::Right,
            Self::Left => HandlePosition::Left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Self::Up),
            "DOWN" => Ok(Self::Down),
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Reads any casing, so `direction = "down"` in a config file works.
impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction() {
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!(" RIGHT ".parse::<Direction>(), Ok(Direction::Right));
        assert!("diagonal".parse::<Direction>().is_err());
    }

    #[test]
    fn test_handles_face_the_flow() {
        assert_eq!(Direction::Down.target_handle(), HandlePosition::Top);
        assert_eq!(Direction::Down.source_handle(), HandlePosition::Bottom);
        assert_eq!(Direction::Right.target_handle(), HandlePosition::Left);
        assert_eq!(Direction::Right.source_handle(), HandlePosition::Right);
        assert_eq!(Direction::Up.target_handle(), HandlePosition::Bottom);
        assert_eq!(Direction::Left.source_handle(), HandlePosition::Left);
    }

    #[test]
    fn test_orientation_flags() {
        assert!(Direction::Left.is_horizontal());
        assert!(!Direction::Up.is_horizontal());
        assert!(Direction::Up.is_reversed());
        assert!(!Direction::Right.is_reversed());
    }

    #[test]
    fn test_serde_uppercase() {
        let json = serde_json::to_string(&Direction::Right).unwrap();
        assert_eq!(json, "\"RIGHT\"");
        let direction: Direction = serde_json::from_str("\"UP\"").unwrap();
        assert_eq!(direction, Direction::Up);
        let direction: Direction = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(direction, Direction::Left);

        let err = serde_json::from_str::<Direction>("\"sideways\"").unwrap_err();
        assert!(err.to_string().contains("unknown layout direction"));
    }
}
