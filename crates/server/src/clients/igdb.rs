use std::time::{Duration, Instant};

use checkpoint_core::metadata::{self, MetadataError, ProviderGame, GAME_FIELDS};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::IgdbConfig;

/// Refresh the token this long before Twitch says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum IgdbError {
    #[error("IGDB credentials are not configured")]
    NotConfigured,

    #[error("Token request failed: {0}")]
    Auth(String),

    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error(transparent)]
    Payload(#[from] MetadataError),
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct IgdbClient {
    client: Client,
    config: IgdbConfig,
    token: RwLock<Option<CachedToken>>,
}

impl IgdbClient {
    pub fn new(config: IgdbConfig) -> Result<Self, IgdbError> {
        let client = Client::builder()
            .user_agent("Checkpoint/1.0")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            config,
            token: RwLock::new(None),
        })
    }

    /// Fetch a single game by IGDB id. `Ok(None)` when IGDB has no such game.
    pub async fn fetch_game(&self, igdb_id: i64) -> Result<Option<ProviderGame>, IgdbError> {
        let body = self.post("games", game_query(igdb_id)).await?;
        let mut games = metadata::parse_games(&body)?;
        Ok(if games.is_empty() {
            None
        } else {
            Some(games.swap_remove(0))
        })
    }

    /// Search games by title.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<ProviderGame>, IgdbError> {
        let body = self.post("games", search_query(query, limit)).await?;
        Ok(metadata::parse_games(&body)?)
    }

    /// POST an Apicalypse query. A 401 drops the cached token and retries once.
    async fn post(&self, endpoint: &str, query: String) -> Result<String, IgdbError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);

        let token = self.access_token().await?;
        let resp = self.send(&url, &token, query.clone()).await?;

        let resp = if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("IGDB rejected the access token, requesting a new one");
            self.invalidate_token().await;
            let token = self.access_token().await?;
            self.send(&url, &token, query).await?
        } else {
            resp
        };

        if !resp.status().is_success() {
            return Err(IgdbError::Status(resp.status().as_u16()));
        }

        Ok(resp.text().await?)
    }

    async fn send(
        &self,
        url: &str,
        token: &str,
        query: String,
    ) -> Result<reqwest::Response, IgdbError> {
        Ok(self
            .client
            .post(url)
            .header("Client-ID", &self.config.client_id)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .body(query)
            .send()
            .await?)
    }

    async fn access_token(&self) -> Result<String, IgdbError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = slot.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.request_token().await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, IgdbError> {
        let resp = self
            .client
            .post(&self.config.token_url)
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| IgdbError::Auth(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(IgdbError::Auth(format!("HTTP {}", resp.status())));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| IgdbError::Auth(format!("JSON parse error: {e}")))?;

        tracing::info!("Obtained IGDB access token (expires in {}s)", token.expires_in);

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}

fn game_query(igdb_id: i64) -> String {
    format!("{GAME_FIELDS} where id = {igdb_id};")
}

fn search_query(query: &str, limit: u32) -> String {
    // Apicalypse strings are double-quoted with no escape syntax.
    let cleaned: String = query
        .chars()
        .filter(|c| *c != '"' && *c != '\\')
        .collect();
    format!("search \"{}\"; {GAME_FIELDS} limit {};", cleaned.trim(), limit.clamp(1, 50))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode as HttpStatus, routing::post, Json, Router};

    #[derive(Default)]
    struct MockCounts {
        token_requests: AtomicUsize,
        game_requests: AtomicUsize,
    }

    /// Local Twitch + IGDB stand-in. `/games` answers 401 to the first
    /// `rejections` requests and an empty result after that.
    async fn mock_igdb(rejections: usize) -> (IgdbConfig, Arc<MockCounts>) {
        let counts = Arc::new(MockCounts::default());
        let app = Router::new()
            .route(
                "/token",
                post(|State(counts): State<Arc<MockCounts>>| async move {
                    let n = counts.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(serde_json::json!({
                        "access_token": format!("token-{n}"),
                        "expires_in": 3600,
                        "token_type": "bearer",
                    }))
                }),
            )
            .route(
                "/games",
                post(move |State(counts): State<Arc<MockCounts>>| async move {
                    let n = counts.game_requests.fetch_add(1, Ordering::SeqCst);
                    if n < rejections {
                        (HttpStatus::UNAUTHORIZED, "[]")
                    } else {
                        (HttpStatus::OK, "[]")
                    }
                }),
            )
            .with_state(counts.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = IgdbConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            base_url: format!("http://{addr}"),
            token_url: format!("http://{addr}/token"),
        };
        (config, counts)
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_token_and_retries_once() {
        let (config, counts) = mock_igdb(1).await;
        let client = IgdbClient::new(config).unwrap();

        let game = client.fetch_game(1942).await.unwrap();
        assert!(game.is_none());
        assert_eq!(counts.token_requests.load(Ordering::SeqCst), 2);
        assert_eq!(counts.game_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_repeated_unauthorized_is_returned() {
        let (config, counts) = mock_igdb(usize::MAX).await;
        let client = IgdbClient::new(config).unwrap();

        let result = client.fetch_game(1942).await;
        assert!(matches!(result, Err(IgdbError::Status(401))), "got {result:?}");
        assert_eq!(counts.token_requests.load(Ordering::SeqCst), 2);
        assert_eq!(counts.game_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_token_is_reused_between_requests() {
        let (config, counts) = mock_igdb(0).await;
        let client = IgdbClient::new(config).unwrap();

        client.fetch_game(1).await.unwrap();
        client.search("hades", 5).await.unwrap();
        assert_eq!(counts.token_requests.load(Ordering::SeqCst), 1);
        assert_eq!(counts.game_requests.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_game_query() {
        assert_eq!(
            game_query(1942),
            "fields name,summary,genres.name,themes.name,cover.image_id,first_release_date; where id = 1942;"
        );
    }

    #[test]
    fn test_search_query_strips_quotes_and_clamps_limit() {
        let q = search_query(r#"  The "Witcher" 3\ "#, 500);
        assert!(q.starts_with("search \"The Witcher 3\";"), "got {q}");
        assert!(q.ends_with("limit 50;"));

        let q = search_query("Hades", 0);
        assert!(q.ends_with("limit 1;"));
    }

    #[test]
    fn test_client_builds_without_network() {
        let client = IgdbClient::new(IgdbConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            base_url: "http://localhost:9".into(),
            token_url: "http://localhost:9/token".into(),
        });
        assert!(client.is_ok());
    }
}
