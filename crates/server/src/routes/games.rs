use std::time::Duration;

use axum::{extract::Path, extract::Query, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use validator::Validate;

use checkpoint_core::metadata::ProviderGame;
use checkpoint_core::{resolve, GameStatus, Rating};

use super::stats::invalidate_stats_cache;
use super::{require_igdb, SharedIgdb};
use crate::clients::igdb::IgdbClient;
use crate::db::games::{self, Game, MetadataUpdate, NewGame};
use crate::error::AppError;

/// IGDB allows 4 requests per second per client.
const SYNC_REQUEST_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub genre: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub summary: Option<String>,
    #[validate(length(max = 100))]
    pub platform: Option<String>,
    pub status: Option<String>,
    pub rating: Option<i64>,
    pub igdb_id: Option<i64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// Empty string clears the field.
    #[validate(length(max = 5000))]
    pub summary: Option<String>,
    #[validate(length(max = 100))]
    pub platform: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct RatingRequest {
    pub rating: Option<i64>,
}

/// GET /api/games
pub async fn list_games(
    Extension(pool): Extension<PgPool>,
    Query(q): Query<ListQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let status = q
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<GameStatus>)
        .transpose()?;
    let genre = q.genre.as_deref().map(str::trim).filter(|g| !g.is_empty());
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    let status = status.as_ref().map(GameStatus::as_str);

    let games_list = games::list_games(&pool, status, genre, limit, offset).await?;
    let total = games::count_games(&pool, status, genre).await?;

    Ok(Json(serde_json::json!({
        "games": games_list,
        "total": total,
        "limit": limit,
        "offset": offset,
    })))
}

/// GET /api/games/{game_id}
pub async fn get_game(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<i64>,
) -> Result<Json<Game>, AppError> {
    let game = find_game(&pool, game_id).await?;
    Ok(Json(game))
}

/// POST /api/games
pub async fn create_game(
    Extension(pool): Extension<PgPool>,
    Extension(igdb): Extension<SharedIgdb>,
    Json(body): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<Game>), AppError> {
    body.validate()?;

    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title must not be blank".into()));
    }
    let status = match body.status.as_deref() {
        Some(s) => s.parse::<GameStatus>()?,
        None => GameStatus::default(),
    };
    let rating = body.rating.map(Rating::new).transpose()?;

    let mut new_game = NewGame {
        igdb_id: body.igdb_id,
        title,
        summary: non_blank(body.summary),
        platform: non_blank(body.platform),
        status: status.as_str().to_string(),
        rating: rating.map(Rating::get),
        genre: None,
        provider_genres: body.genres,
        provider_themes: body.themes,
        cover_url: None,
        metadata_synced: false,
    };

    // Provider data is an enrichment; a failed lookup never blocks creation.
    let provider = match (body.igdb_id, igdb.as_deref()) {
        (Some(igdb_id), Some(client)) => match client.fetch_game(igdb_id).await {
            Ok(Some(provider)) => Some(provider),
            Ok(None) => {
                tracing::warn!(igdb_id, "IGDB has no game with this id, skipping metadata");
                None
            }
            Err(e) => {
                tracing::warn!(igdb_id, "IGDB lookup failed, skipping metadata: {e}");
                None
            }
        },
        _ => None,
    };
    fill_new_game(&mut new_game, provider.as_ref());

    let game = games::insert_game(&pool, &new_game).await?;
    invalidate_stats_cache();

    tracing::info!(game_id = game.id, genre = ?game.genre, "Added game to backlog");
    Ok((StatusCode::CREATED, Json(game)))
}

/// PUT /api/games/{game_id}
pub async fn update_game(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<i64>,
    Json(body): Json<UpdateGameRequest>,
) -> Result<Json<Game>, AppError> {
    body.validate()?;
    let current = find_game(&pool, game_id).await?;

    let title = match body.title {
        Some(t) if t.trim().is_empty() => {
            return Err(AppError::BadRequest("Title must not be blank".into()))
        }
        Some(t) => t.trim().to_string(),
        None => current.title.clone(),
    };
    let summary = match body.summary {
        Some(s) => non_blank(Some(s)),
        None => current.summary.clone(),
    };
    let platform = match body.platform {
        Some(p) => non_blank(Some(p)),
        None => current.platform.clone(),
    };

    // Genre depends on title and summary, so re-resolve only when they change.
    let genre = if title != current.title || summary != current.summary {
        resolve(
            Some(title.as_str()),
            summary.as_deref(),
            &current.provider_genres.0,
            &current.provider_themes.0,
        )
        .map(|g| g.as_str().to_string())
    } else {
        current.genre.clone()
    };

    let game = games::update_details(
        &pool,
        game_id,
        &title,
        summary.as_deref(),
        platform.as_deref(),
        genre.as_deref(),
    )
    .await?
    .ok_or(AppError::NotFound("Game not found".into()))?;

    invalidate_stats_cache();
    Ok(Json(game))
}

/// PUT /api/games/{game_id}/status
pub async fn update_status(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Game>, AppError> {
    let next: GameStatus = body.status.parse()?;
    let current = find_game(&pool, game_id).await?;
    // Unknown stored statuses are treated as backlog.
    let from = current.status.parse::<GameStatus>().unwrap_or_default();
    let transition = from.transition(next, current.started_at.is_some());

    let game = games::update_status(&pool, game_id, next.as_str(), transition)
        .await?
        .ok_or(AppError::NotFound("Game not found".into()))?;

    invalidate_stats_cache();
    tracing::info!(game_id, from = %from, to = %next, "Status changed");
    Ok(Json(game))
}

/// PUT /api/games/{game_id}/rating
pub async fn update_rating(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<i64>,
    Json(body): Json<RatingRequest>,
) -> Result<Json<Game>, AppError> {
    let rating = body.rating.map(Rating::new).transpose()?;

    let game = games::update_rating(&pool, game_id, rating.map(Rating::get))
        .await?
        .ok_or(AppError::NotFound("Game not found".into()))?;

    invalidate_stats_cache();
    Ok(Json(game))
}

/// DELETE /api/games/{game_id}
pub async fn delete_game(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<i64>,
) -> Result<Json<JsonValue>, AppError> {
    if !games::delete_game(&pool, game_id).await? {
        return Err(AppError::NotFound("Game not found".into()));
    }
    invalidate_stats_cache();
    Ok(Json(serde_json::json!({"success": true})))
}

/// POST /api/games/{game_id}/refresh
pub async fn refresh_game(
    Extension(pool): Extension<PgPool>,
    Extension(igdb): Extension<SharedIgdb>,
    Path(game_id): Path<i64>,
) -> Result<Json<Game>, AppError> {
    let client = require_igdb(&igdb)?;
    let game = find_game(&pool, game_id).await?;

    let refreshed = refresh_from_igdb(&pool, client, &game).await?;
    invalidate_stats_cache();
    Ok(Json(refreshed))
}

/// POST /api/games/sync
/// Refresh every game linked to IGDB. Failures are logged and skipped.
pub async fn sync_games(
    Extension(pool): Extension<PgPool>,
    Extension(igdb): Extension<SharedIgdb>,
) -> Result<Json<JsonValue>, AppError> {
    let client = require_igdb(&igdb)?;
    let candidates = games::get_syncable_games(&pool).await?;
    tracing::info!("Syncing metadata for {} games", candidates.len());

    let mut synced = 0usize;
    let mut skipped = 0usize;

    for game in &candidates {
        tokio::time::sleep(SYNC_REQUEST_INTERVAL).await;
        match refresh_from_igdb(&pool, client, game).await {
            Ok(_) => synced += 1,
            Err(e) => {
                tracing::warn!(game_id = game.id, "Metadata sync skipped: {e}");
                skipped += 1;
            }
        }
    }

    if synced > 0 {
        invalidate_stats_cache();
    }
    tracing::info!(synced, skipped, "Metadata sync finished");

    Ok(Json(serde_json::json!({
        "synced": synced,
        "skipped": skipped,
        "total": candidates.len(),
    })))
}

// ---- Internal helpers ----

async fn find_game(pool: &PgPool, game_id: i64) -> Result<Game, AppError> {
    games::get_game(pool, game_id)
        .await?
        .ok_or(AppError::NotFound("Game not found".into()))
}

async fn refresh_from_igdb(
    pool: &PgPool,
    client: &IgdbClient,
    game: &Game,
) -> Result<Game, AppError> {
    let igdb_id = game
        .igdb_id
        .ok_or(AppError::BadRequest("Game is not linked to IGDB".into()))?;

    let provider = client
        .fetch_game(igdb_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("IGDB has no game with id {igdb_id}")))?;

    let update = metadata_update(&game.title, game.summary.as_deref(), &provider);
    games::apply_metadata(pool, game.id, &update)
        .await?
        .ok_or(AppError::NotFound("Game not found".into()))
}

/// Merge provider data over what we already know and resolve the genre.
/// Provider name and summary win; ours fill the gaps.
fn metadata_update(title: &str, summary: Option<&str>, provider: &ProviderGame) -> MetadataUpdate {
    let name = provider.name.as_deref().unwrap_or(title);
    let summary = provider.summary.as_deref().or(summary);
    let provider_genres = provider.genre_names();
    let provider_themes = provider.theme_names();

    let genre = resolve(Some(name), summary, &provider_genres, &provider_themes)
        .map(|g| g.as_str().to_string());

    MetadataUpdate {
        summary: summary.map(str::to_string),
        genre,
        provider_genres,
        provider_themes,
        cover_url: provider.cover_url(),
    }
}

/// Merge an IGDB row into a new entry and resolve its genre. With a row the
/// genre comes from the same inputs a refresh would use; without one it comes
/// from the request body.
fn fill_new_game(new_game: &mut NewGame, provider: Option<&ProviderGame>) {
    match provider {
        Some(provider) => {
            let update = metadata_update(&new_game.title, new_game.summary.as_deref(), provider);
            new_game.summary = update.summary;
            new_game.genre = update.genre;
            new_game.provider_genres = update.provider_genres;
            new_game.provider_themes = update.provider_themes;
            new_game.cover_url = update.cover_url;
            new_game.metadata_synced = true;
        }
        None => {
            new_game.genre = resolve(
                Some(new_game.title.as_str()),
                new_game.summary.as_deref(),
                &new_game.provider_genres,
                &new_game.provider_themes,
            )
            .map(|g| g.as_str().to_string());
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
