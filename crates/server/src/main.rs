use std::sync::Arc;

use server::clients::igdb::IgdbClient;
use server::config;
use server::db;
use server::routes::{self, SharedIgdb};

use anyhow::Context;
use axum::{routing::{get, post, put}, Extension, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::pool::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Running migrations...");
    db::pool::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    // IGDB is optional; without it games are classified from local text only
    let igdb: SharedIgdb = match config.igdb.clone() {
        Some(igdb_config) => {
            tracing::info!("IGDB metadata provider configured");
            Some(Arc::new(IgdbClient::new(igdb_config)?))
        }
        None => {
            tracing::info!("IGDB not configured - metadata lookups disabled");
            None
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Genre vocabulary
        .route("/api/genres", get(routes::genres::list_genres))
        .route("/api/genres/resolve", post(routes::genres::resolve_genre))
        // Games — specific routes before parameterized
        .route(
            "/api/games",
            get(routes::games::list_games).post(routes::games::create_game),
        )
        .route("/api/games/sync", post(routes::games::sync_games))
        .route("/api/games/stats", get(routes::stats::get_game_stats))
        .route(
            "/api/games/{game_id}",
            get(routes::games::get_game)
                .put(routes::games::update_game)
                .delete(routes::games::delete_game),
        )
        .route("/api/games/{game_id}/status", put(routes::games::update_status))
        .route("/api/games/{game_id}/rating", put(routes::games::update_rating))
        .route("/api/games/{game_id}/refresh", post(routes::games::refresh_game))
        // IGDB lookup
        .route("/api/igdb/search", get(routes::igdb::search_igdb))
        // Shared state
        .layer(Extension(pool))
        .layer(Extension(igdb))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
