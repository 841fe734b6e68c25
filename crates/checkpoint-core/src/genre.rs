//! Canonical genre vocabulary.
//!
//! Provider metadata carries hundreds of loosely-named genres. Everything the
//! app stores, filters and charts goes through this closed set instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Horror,
    Strategy,
    #[serde(rename = "RPG")]
    Rpg,
    #[serde(rename = "Action RPG")]
    ActionRpg,
    Roguelike,
    Shooter,
    Action,
    Adventure,
    Fighting,
    Racing,
    Sports,
    Simulation,
    Puzzle,
    Other,
}

impl Genre {
    /// Vocabulary in display order.
    pub const ALL: [Genre; 14] = [
        Genre::Horror,
        Genre::Strategy,
        Genre::Rpg,
        Genre::ActionRpg,
        Genre::Roguelike,
        Genre::Shooter,
        Genre::Action,
        Genre::Adventure,
        Genre::Fighting,
        Genre::Racing,
        Genre::Sports,
        Genre::Simulation,
        Genre::Puzzle,
        Genre::Other,
    ];

    /// Order used to pick one label out of several provider genres.
    /// More specific labels come first.
    pub const PRIORITY: [Genre; 14] = [
        Genre::Horror,
        Genre::Shooter,
        Genre::Rpg,
        Genre::ActionRpg,
        Genre::Roguelike,
        Genre::Strategy,
        Genre::Fighting,
        Genre::Racing,
        Genre::Sports,
        Genre::Simulation,
        Genre::Puzzle,
        Genre::Action,
        Genre::Adventure,
        Genre::Other,
    ];

    /// The label as stored in the database and shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Horror => "Horror",
            Genre::Strategy => "Strategy",
            Genre::Rpg => "RPG",
            Genre::ActionRpg => "Action RPG",
            Genre::Roguelike => "Roguelike",
            Genre::Shooter => "Shooter",
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Fighting => "Fighting",
            Genre::Racing => "Racing",
            Genre::Sports => "Sports",
            Genre::Simulation => "Simulation",
            Genre::Puzzle => "Puzzle",
            Genre::Other => "Other",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = Error;

    /// Parses a stored label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownGenre(s.to_string()))
    }
}
