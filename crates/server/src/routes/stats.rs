use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, RwLock};

use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use checkpoint_core::buckets::bucket_counts;
use checkpoint_core::{GameStatus, Genre};

use crate::db::games::{self, StatsRow};
use crate::error::AppError;

// Rebuilt lazily; cleared by every write to the games table.
static STATS_CACHE: LazyLock<RwLock<Option<JsonValue>>> = LazyLock::new(|| RwLock::new(None));
// Bumped on every invalidation. A snapshot is only cached if no write happened
// while it was being computed.
static STATS_GENERATION: AtomicU64 = AtomicU64::new(0);

pub fn invalidate_stats_cache() {
    if let Ok(mut cache) = STATS_CACHE.write() {
        STATS_GENERATION.fetch_add(1, Ordering::SeqCst);
        *cache = None;
    }
}

fn cached_stats() -> Option<JsonValue> {
    STATS_CACHE.read().ok()?.clone()
}

/// Cache `stats` unless the table changed after `generation` was read.
fn store_stats(generation: u64, stats: &JsonValue) -> bool {
    let Ok(mut cache) = STATS_CACHE.write() else {
        return false;
    };
    if STATS_GENERATION.load(Ordering::SeqCst) != generation {
        return false;
    }
    *cache = Some(stats.clone());
    true
}

/// GET /api/games/stats
pub async fn get_game_stats(
    Extension(pool): Extension<PgPool>,
) -> Result<Json<JsonValue>, AppError> {
    if let Some(cached) = cached_stats() {
        return Ok(Json(cached));
    }

    let generation = STATS_GENERATION.load(Ordering::SeqCst);
    let rows = games::get_stats_rows(&pool).await?;
    let stats = summarize(&rows);
    store_stats(generation, &stats);

    Ok(Json(stats))
}

fn summarize(rows: &[StatsRow]) -> JsonValue {
    let total = rows.len() as i64;

    let mut by_status: BTreeMap<&'static str, i64> =
        GameStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for row in rows {
        if let Ok(status) = row.status.parse::<GameStatus>() {
            *by_status.entry(status.as_str()).or_insert(0) += 1;
        }
    }

    let ratings: Vec<i64> = rows.iter().filter_map(|r| r.rating.map(i64::from)).collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        let avg = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
        Some((avg * 100.0).round() / 100.0)
    };

    let completed = by_status
        .get(GameStatus::Completed.as_str())
        .copied()
        .unwrap_or(0);
    let completion_rate = if total == 0 {
        0.0
    } else {
        ((completed as f64 / total as f64) * 1000.0).round() / 1000.0
    };

    let mut by_genre: Vec<JsonValue> = Genre::ALL
        .into_iter()
        .map(|genre| {
            let count = rows
                .iter()
                .filter(|r| {
                    r.genre
                        .as_deref()
                        .and_then(|g| g.parse::<Genre>().ok())
                        == Some(genre)
                })
                .count();
            json!({ "genre": genre, "count": count })
        })
        .collect();
    let unknown = rows
        .iter()
        .filter(|r| r.genre.as_deref().and_then(|g| g.parse::<Genre>().ok()).is_none())
        .count();
    by_genre.push(json!({ "genre": JsonValue::Null, "count": unknown }));

    let radar: Vec<JsonValue> = bucket_counts(rows.iter().map(|r| r.genre.as_deref()))
        .into_iter()
        .map(|(bucket, count)| json!({ "bucket": bucket, "count": count }))
        .collect();

    json!({
        "total": total,
        "byStatus": by_status,
        "ratedCount": ratings.len(),
        "averageRating": average_rating,
        "completionRate": completion_rate,
        "byGenre": by_genre,
        "radar": radar,
    })
}
