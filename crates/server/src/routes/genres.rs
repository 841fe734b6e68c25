use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use checkpoint_core::{resolve, DisplayBucket, Genre};

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub name: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub genre: Option<Genre>,
    pub bucket: DisplayBucket,
}

/// POST /api/genres/resolve
pub async fn resolve_genre(Json(req): Json<ResolveRequest>) -> Json<ResolveResponse> {
    let genre = resolve(
        req.name.as_deref(),
        req.summary.as_deref(),
        &req.genres,
        &req.themes,
    );
    Json(ResolveResponse {
        genre,
        bucket: genre.map(DisplayBucket::from).unwrap_or(DisplayBucket::Other),
    })
}

/// GET /api/genres
pub async fn list_genres() -> Json<JsonValue> {
    let genres: Vec<JsonValue> = Genre::ALL
        .into_iter()
        .map(|g| json!({ "genre": g, "bucket": DisplayBucket::from(g) }))
        .collect();

    Json(json!({
        "genres": genres,
        "buckets": DisplayBucket::ALL,
    }))
}
