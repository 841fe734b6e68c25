use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run the full Postgres schema migration inline.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Backlog entries
CREATE TABLE IF NOT EXISTS games (
    id                 BIGSERIAL PRIMARY KEY,
    igdb_id            BIGINT UNIQUE,
    title              TEXT NOT NULL,
    summary            TEXT,
    platform           TEXT,
    status             TEXT NOT NULL DEFAULT 'backlog',
    rating             SMALLINT CHECK (rating BETWEEN 1 AND 5),
    genre              TEXT,
    provider_genres    JSONB NOT NULL DEFAULT '[]'::jsonb,
    provider_themes    JSONB NOT NULL DEFAULT '[]'::jsonb,
    cover_url          TEXT,
    started_at         TIMESTAMPTZ,
    completed_at       TIMESTAMPTZ,
    metadata_synced_at TIMESTAMPTZ,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_games_status     ON games (status);
CREATE INDEX IF NOT EXISTS idx_games_genre      ON games (genre);
CREATE INDEX IF NOT EXISTS idx_games_created_at ON games (created_at DESC);
"#;
