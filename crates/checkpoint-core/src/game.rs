//! Backlog entry types shared by the server and its tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Where a game sits in the backlog. Any status may move to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Wishlist,
    #[default]
    Backlog,
    Playing,
    Completed,
    Dropped,
}

impl GameStatus {
    pub const ALL: [GameStatus; 5] = [
        GameStatus::Wishlist,
        GameStatus::Backlog,
        GameStatus::Playing,
        GameStatus::Completed,
        GameStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Wishlist => "wishlist",
            GameStatus::Backlog => "backlog",
            GameStatus::Playing => "playing",
            GameStatus::Completed => "completed",
            GameStatus::Dropped => "dropped",
        }
    }

    /// Timestamp changes implied by moving from `self` to `next`.
    pub fn transition(self, next: GameStatus, has_started: bool) -> Transition {
        Transition {
            set_started: next == GameStatus::Playing && !has_started,
            set_completed: next == GameStatus::Completed && self != GameStatus::Completed,
            clear_completed: self == GameStatus::Completed && next != GameStatus::Completed,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        GameStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    pub set_started: bool,
    pub set_completed: bool,
    pub clear_completed: bool,
}

/// Star rating, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(i16);

impl Rating {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 5;

    pub fn new(value: i64) -> Result<Self, Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Rating(value as i16))
        } else {
            Err(Error::InvalidRating {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}
