use axum::{extract::Query, Extension, Json};
use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

use checkpoint_core::metadata::ProviderGame;
use checkpoint_core::{DisplayBucket, Genre};

use super::{require_igdb, SharedIgdb};
use crate::error::AppError;

const DEFAULT_SEARCH_LIMIT: u32 = 10;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub igdb_id: i64,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub cover_url: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<Genre>,
    pub bucket: DisplayBucket,
}

impl From<ProviderGame> for SearchHit {
    fn from(game: ProviderGame) -> Self {
        let genre = game.resolved_genre();
        Self {
            igdb_id: game.id,
            genres: game.genre_names(),
            themes: game.theme_names(),
            cover_url: game.cover_url(),
            release_year: game.first_release_date.and_then(release_year),
            genre,
            bucket: genre.map(DisplayBucket::from).unwrap_or(DisplayBucket::Other),
            name: game.name,
            summary: game.summary,
        }
    }
}

fn release_year(timestamp: i64) -> Option<i32> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.year())
}

/// GET /api/igdb/search?q=&limit=
pub async fn search_igdb(
    Extension(igdb): Extension<SharedIgdb>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let q = params.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Err(AppError::BadRequest("Query parameter 'q' is required".into()));
    }

    let client = require_igdb(&igdb)?;
    let games = client
        .search(q, params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await?;

    tracing::debug!("IGDB search '{}' returned {} hits", q, games.len());
    Ok(Json(games.into_iter().map(SearchHit::from).collect()))
}
