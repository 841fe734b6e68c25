//! IGDB `games` payloads.

use serde::Deserialize;

use crate::genre::Genre;
use crate::resolver::GenreInput;

/// Fields requested from IGDB for every lookup.
pub const GAME_FIELDS: &str =
    "fields name,summary,genres.name,themes.name,cover.image_id,first_release_date;";

const COVER_URL_BASE: &str = "https://images.igdb.com/igdb/image/upload/t_cover_big";

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Malformed provider payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CoverRef {
    pub id: i64,
    #[serde(default)]
    pub image_id: Option<String>,
}

/// One row of an IGDB `games` response. Expanded relations are optional.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProviderGame {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub themes: Vec<NamedRef>,
    #[serde(default)]
    pub cover: Option<CoverRef>,
    /// Unix seconds.
    #[serde(default)]
    pub first_release_date: Option<i64>,
}

impl ProviderGame {
    pub fn genre_names(&self) -> Vec<String> {
        names(&self.genres)
    }

    pub fn theme_names(&self) -> Vec<String> {
        names(&self.themes)
    }

    pub fn genre_input(&self) -> GenreInput<'_> {
        GenreInput {
            name: self.name.as_deref(),
            summary: self.summary.as_deref(),
            genres: self.genres.iter().filter_map(|g| g.name.as_deref()).collect(),
            themes: self.themes.iter().filter_map(|t| t.name.as_deref()).collect(),
        }
    }

    pub fn resolved_genre(&self) -> Option<Genre> {
        self.genre_input().resolve()
    }

    pub fn cover_url(&self) -> Option<String> {
        let image_id = self.cover.as_ref()?.image_id.as_deref()?;
        Some(format!("{COVER_URL_BASE}/{image_id}.jpg"))
    }
}

fn names(refs: &[NamedRef]) -> Vec<String> {
    refs.iter().filter_map(|r| r.name.clone()).collect()
}

/// Parse an IGDB `games` response body.
pub fn parse_games(body: &str) -> Result<Vec<ProviderGame>, MetadataError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESIDENT_EVIL: &str = r#"[{
        "id": 1234,
        "name": "Resident Evil",
        "summary": "A survival horror game set in a mansion.",
        "genres": [{"id": 31, "name": "Adventure"}, {"id": 5, "name": "Shooter"}],
        "themes": [{"id": 19, "name": "Horror"}, {"id": 21, "name": "Survival"}],
        "cover": {"id": 77, "image_id": "co1abc"},
        "first_release_date": 827971200
    }]"#;

    #[test]
    fn test_parse_full_row() {
        let games = parse_games(RESIDENT_EVIL).unwrap();
        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.genre_names(), vec!["Adventure", "Shooter"]);
        assert_eq!(game.theme_names(), vec!["Horror", "Survival"]);
        assert_eq!(
            game.cover_url().as_deref(),
            Some("https://images.igdb.com/igdb/image/upload/t_cover_big/co1abc.jpg")
        );
        assert_eq!(game.resolved_genre(), Some(Genre::Horror));
    }

    #[test]
    fn test_parse_sparse_row() {
        let games = parse_games(r#"[{"id": 9}]"#).unwrap();
        let game = &games[0];
        assert!(game.genres.is_empty());
        assert_eq!(game.cover_url(), None);
        assert_eq!(game.resolved_genre(), None);
    }

    #[test]
    fn test_unexpanded_relation_is_an_error() {
        // Without ".name" IGDB returns bare ids, which this model does not accept.
        assert!(parse_games(r#"[{"id": 9, "genres": [12, 31]}]"#).is_err());
    }
}
