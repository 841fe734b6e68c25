//! Six-axis display taxonomy used by the stats radar chart.

use serde::Serialize;

use crate::genre::Genre;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DisplayBucket {
    Action,
    Adventure,
    #[serde(rename = "RPG")]
    Rpg,
    Strategy,
    #[serde(rename = "Sim & Sports")]
    SimSports,
    Other,
}

impl DisplayBucket {
    /// Radar axis order.
    pub const ALL: [DisplayBucket; 6] = [
        DisplayBucket::Action,
        DisplayBucket::Adventure,
        DisplayBucket::Rpg,
        DisplayBucket::Strategy,
        DisplayBucket::SimSports,
        DisplayBucket::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayBucket::Action => "Action",
            DisplayBucket::Adventure => "Adventure",
            DisplayBucket::Rpg => "RPG",
            DisplayBucket::Strategy => "Strategy",
            DisplayBucket::SimSports => "Sim & Sports",
            DisplayBucket::Other => "Other",
        }
    }

    /// Bucket a stored genre string. Missing or unrecognised values land in Other.
    pub fn from_stored(stored: Option<&str>) -> Self {
        stored
            .and_then(|s| s.parse::<Genre>().ok())
            .map(DisplayBucket::from)
            .unwrap_or(DisplayBucket::Other)
    }
}

impl From<Genre> for DisplayBucket {
    fn from(genre: Genre) -> Self {
        match genre {
            Genre::Action | Genre::Shooter | Genre::Fighting | Genre::Roguelike => {
                DisplayBucket::Action
            }
            Genre::Adventure | Genre::Horror => DisplayBucket::Adventure,
            Genre::Rpg | Genre::ActionRpg => DisplayBucket::Rpg,
            Genre::Strategy | Genre::Puzzle => DisplayBucket::Strategy,
            Genre::Simulation | Genre::Sports | Genre::Racing => DisplayBucket::SimSports,
            Genre::Other => DisplayBucket::Other,
        }
    }
}

/// Count stored genres per bucket. Every bucket is present, in axis order.
pub fn bucket_counts<'a, I>(stored: I) -> Vec<(DisplayBucket, i64)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts = [0i64; 6];
    for genre in stored {
        let bucket = DisplayBucket::from_stored(genre);
        if let Some(idx) = DisplayBucket::ALL.iter().position(|b| *b == bucket) {
            counts[idx] += 1;
        }
    }
    DisplayBucket::ALL.into_iter().zip(counts).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_genre_has_a_bucket() {
        for genre in Genre::ALL {
            let bucket = DisplayBucket::from(genre);
            assert!(DisplayBucket::ALL.contains(&bucket));
        }
        assert_eq!(DisplayBucket::from(Genre::Horror), DisplayBucket::Adventure);
        assert_eq!(DisplayBucket::from(Genre::ActionRpg), DisplayBucket::Rpg);
        assert_eq!(DisplayBucket::from(Genre::Racing), DisplayBucket::SimSports);
    }

    #[test]
    fn test_from_stored_handles_unknown_and_missing() {
        assert_eq!(DisplayBucket::from_stored(Some("shooter")), DisplayBucket::Action);
        assert_eq!(DisplayBucket::from_stored(Some("Metroidvania")), DisplayBucket::Other);
        assert_eq!(DisplayBucket::from_stored(None), DisplayBucket::Other);
    }

    #[test]
    fn test_bucket_counts_includes_empty_buckets() {
        let counts = bucket_counts([Some("RPG"), Some("Action RPG"), Some("Puzzle"), None]);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts[0], (DisplayBucket::Action, 0));
        assert_eq!(counts[2], (DisplayBucket::Rpg, 2));
        assert_eq!(counts[3], (DisplayBucket::Strategy, 1));
        assert_eq!(counts[5], (DisplayBucket::Other, 1));
    }
}
