use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;

use checkpoint_core::game::Transition;

use crate::error::AppError;

const GAME_COLUMNS: &str = "id, igdb_id, title, summary, platform, status, rating, genre, \
     provider_genres, provider_themes, cover_url, started_at, completed_at, \
     metadata_synced_at, created_at, updated_at";

/// `$1` is the status, `$2` the genre label; NULL disables either filter.
const LIST_FILTER: &str =
    "($1::text IS NULL OR status = $1) AND ($2::text IS NULL OR LOWER(genre) = LOWER($2))";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub igdb_id: Option<i64>,
    pub title: String,
    pub summary: Option<String>,
    pub platform: Option<String>,
    pub status: String,
    pub rating: Option<i16>,
    pub genre: Option<String>,
    pub provider_genres: Json<Vec<String>>,
    pub provider_themes: Json<Vec<String>>,
    pub cover_url: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a backlog entry. `genre` is already resolved.
#[derive(Debug, Clone, Default)]
pub struct NewGame {
    pub igdb_id: Option<i64>,
    pub title: String,
    pub summary: Option<String>,
    pub platform: Option<String>,
    pub status: String,
    pub rating: Option<i16>,
    pub genre: Option<String>,
    pub provider_genres: Vec<String>,
    pub provider_themes: Vec<String>,
    pub cover_url: Option<String>,
    pub metadata_synced: bool,
}

/// Provider data written by a metadata refresh.
#[derive(Debug, Clone)]
pub struct MetadataUpdate {
    pub summary: Option<String>,
    pub genre: Option<String>,
    pub provider_genres: Vec<String>,
    pub provider_themes: Vec<String>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatsRow {
    pub status: String,
    pub rating: Option<i16>,
    pub genre: Option<String>,
}

pub async fn insert_game(pool: &PgPool, game: &NewGame) -> Result<Game, AppError> {
    let query = format!(
        r#"INSERT INTO games (
            igdb_id, title, summary, platform, status, rating, genre,
            provider_genres, provider_themes, cover_url,
            started_at, completed_at, metadata_synced_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            CASE WHEN $5 = 'playing' THEN NOW() END,
            CASE WHEN $5 = 'completed' THEN NOW() END,
            CASE WHEN $11 THEN NOW() END
        )
        RETURNING {GAME_COLUMNS}"#
    );

    sqlx::query_as::<_, Game>(&query)
        .bind(game.igdb_id)
        .bind(&game.title)
        .bind(&game.summary)
        .bind(&game.platform)
        .bind(&game.status)
        .bind(game.rating)
        .bind(&game.genre)
        .bind(Json(&game.provider_genres))
        .bind(Json(&game.provider_themes))
        .bind(&game.cover_url)
        .bind(game.metadata_synced)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("A game with this IGDB id is already in the backlog".into())
            }
            other => AppError::Sqlx(other),
        })
}

fn list_query() -> String {
    format!(
        r#"SELECT {GAME_COLUMNS} FROM games
           WHERE {LIST_FILTER}
           ORDER BY created_at DESC, id DESC
           LIMIT $3 OFFSET $4"#
    )
}

fn count_query() -> String {
    format!("SELECT COUNT(*) FROM games WHERE {LIST_FILTER}")
}

/// List games newest first, optionally filtered by status and genre label.
pub async fn list_games(
    pool: &PgPool,
    status: Option<&str>,
    genre: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Game>, AppError> {
    sqlx::query_as::<_, Game>(&list_query())
        .bind(status)
        .bind(genre)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::Sqlx)
}

/// Total rows matching the same filters as [`list_games`].
pub async fn count_games(
    pool: &PgPool,
    status: Option<&str>,
    genre: Option<&str>,
) -> Result<i64, AppError> {
    let count: (i64,) = sqlx::query_as(&count_query())
        .bind(status)
        .bind(genre)
        .fetch_one(pool)
        .await
        .map_err(AppError::Sqlx)?;
    Ok(count.0)
}

pub async fn get_game(pool: &PgPool, id: i64) -> Result<Option<Game>, AppError> {
    let query = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1");
    sqlx::query_as::<_, Game>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

/// Overwrite the user-editable fields and the genre derived from them.
pub async fn update_details(
    pool: &PgPool,
    id: i64,
    title: &str,
    summary: Option<&str>,
    platform: Option<&str>,
    genre: Option<&str>,
) -> Result<Option<Game>, AppError> {
    let query = format!(
        r#"UPDATE games SET
               title = $2,
               summary = $3,
               platform = $4,
               genre = $5,
               updated_at = NOW()
           WHERE id = $1
           RETURNING {GAME_COLUMNS}"#
    );

    sqlx::query_as::<_, Game>(&query)
        .bind(id)
        .bind(title)
        .bind(summary)
        .bind(platform)
        .bind(genre)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

pub async fn update_status(
    pool: &PgPool,
    id: i64,
    status: &str,
    transition: Transition,
) -> Result<Option<Game>, AppError> {
    let query = format!(
        r#"UPDATE games SET
               status = $2,
               started_at = CASE WHEN $3 THEN NOW() ELSE started_at END,
               completed_at = CASE
                   WHEN $4 THEN NOW()
                   WHEN $5 THEN NULL
                   ELSE completed_at
               END,
               updated_at = NOW()
           WHERE id = $1
           RETURNING {GAME_COLUMNS}"#
    );

    sqlx::query_as::<_, Game>(&query)
        .bind(id)
        .bind(status)
        .bind(transition.set_started)
        .bind(transition.set_completed)
        .bind(transition.clear_completed)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

pub async fn update_rating(
    pool: &PgPool,
    id: i64,
    rating: Option<i16>,
) -> Result<Option<Game>, AppError> {
    let query = format!(
        "UPDATE games SET rating = $2, updated_at = NOW() WHERE id = $1 RETURNING {GAME_COLUMNS}"
    );

    sqlx::query_as::<_, Game>(&query)
        .bind(id)
        .bind(rating)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

/// Store freshly fetched provider metadata. A missing provider summary keeps the old one.
pub async fn apply_metadata(
    pool: &PgPool,
    id: i64,
    update: &MetadataUpdate,
) -> Result<Option<Game>, AppError> {
    let query = format!(
        r#"UPDATE games SET
               summary = COALESCE($2, summary),
               genre = $3,
               provider_genres = $4,
               provider_themes = $5,
               cover_url = COALESCE($6, cover_url),
               metadata_synced_at = NOW(),
               updated_at = NOW()
           WHERE id = $1
           RETURNING {GAME_COLUMNS}"#
    );

    sqlx::query_as::<_, Game>(&query)
        .bind(id)
        .bind(&update.summary)
        .bind(&update.genre)
        .bind(Json(&update.provider_genres))
        .bind(Json(&update.provider_themes))
        .bind(&update.cover_url)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

/// Returns false when no row matched.
pub async fn delete_game(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM games WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;
    Ok(result.rows_affected() > 0)
}

/// All games that can be refreshed from IGDB, oldest sync first.
pub async fn get_syncable_games(pool: &PgPool) -> Result<Vec<Game>, AppError> {
    let query = format!(
        r#"SELECT {GAME_COLUMNS} FROM games
           WHERE igdb_id IS NOT NULL
           ORDER BY metadata_synced_at ASC NULLS FIRST, id ASC"#
    );

    sqlx::query_as::<_, Game>(&query)
        .fetch_all(pool)
        .await
        .map_err(AppError::Sqlx)
}

pub async fn get_stats_rows(pool: &PgPool) -> Result<Vec<StatsRow>, AppError> {
    sqlx::query_as::<_, StatsRow>("SELECT status, rating, genre FROM games")
        .fetch_all(pool)
        .await
        .map_err(AppError::Sqlx)
}
