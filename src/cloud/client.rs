// ABOUTME: reqwest-backed cloud API client with OAuth2 client-credentials auth.
// ABOUTME: Caches the bearer token until shortly before it expires.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};

use super::CloudApi;
use super::types::{BackupRecord, Embedded, EnvironmentInfo, Notification, OperationResponse};
use crate::config::CloudSettings;
use crate::http::{self, ApiError, Result};
use crate::types::{EnvironmentId, GitRef, NotificationId};

const SERVICE: &str = "Acquia Cloud";

/// Refresh tokens this long before the server would reject them.
const TOKEN_SLACK: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    300
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct AcquiaClient {
    client: reqwest::Client,
    no_redirect: reqwest::Client,
    base_url: String,
    token_url: String,
    key: String,
    secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for AcquiaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquiaClient")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl AcquiaClient {
    pub fn new(
        base_url: impl Into<String>,
        token_url: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: http::client(true)?,
            no_redirect: http::client(false)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            key: key.into(),
            secret: secret.into(),
            token: Mutex::new(None),
        })
    }

    /// Build a client from config, resolving the API key and secret.
    pub fn from_settings(settings: &CloudSettings) -> crate::error::Result<Self> {
        let key = settings.key.resolve()?;
        let secret = settings.secret.resolve()?;
        Ok(Self::new(
            &settings.base_url,
            &settings.token_url,
            key,
            secret,
        )?)
    }

    async fn bearer(&self) -> Result<String> {
        let cached = self
            .token
            .lock()
            .as_ref()
            .filter(|token| token.expires_at > Instant::now())
            .map(|token| token.value.clone());
        if let Some(value) = cached {
            return Ok(value);
        }

        tracing::debug!("Requesting {} access token", SERVICE);
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.key.as_str()),
                ("client_secret", self.secret.as_str()),
            ])
            .send()
            .await?;
        let token: TokenResponse = http::ensure_success(SERVICE, resp).await?.json().await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_SLACK);
        *self.token.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        Ok(http::ensure_success(SERVICE, resp).await?.json().await?)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let resp = self
            .client
            .request(method, self.url(path))
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        Ok(http::ensure_success(SERVICE, resp).await?.json().await?)
    }
}

#[async_trait]
impl CloudApi for AcquiaClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn notification(&self, id: &NotificationId) -> Result<Notification> {
        self.get(&format!("notifications/{}", id)).await
    }

    async fn switch_code(
        &self,
        env: &EnvironmentId,
        git_ref: &GitRef,
    ) -> Result<OperationResponse> {
        self.send_json(
            reqwest::Method::POST,
            &format!("environments/{}/code/actions/switch", env),
            json!({ "branch": git_ref.as_str() }),
        )
        .await
    }

    async fn environment(&self, env: &EnvironmentId) -> Result<EnvironmentInfo> {
        self.get(&format!("environments/{}", env)).await
    }

    async fn set_runtime_version(
        &self,
        env: &EnvironmentId,
        version: &str,
    ) -> Result<OperationResponse> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("environments/{}", env),
            json!({ "version": version }),
        )
        .await
    }

    async fn backups(&self, env: &EnvironmentId, database: &str) -> Result<Vec<BackupRecord>> {
        let list: Embedded<BackupRecord> = self
            .get(&format!("environments/{}/databases/{}/backups", env, database))
            .await?;
        Ok(list.embedded.items)
    }

    async fn create_backup(
        &self,
        env: &EnvironmentId,
        database: &str,
    ) -> Result<OperationResponse> {
        self.send_json(
            reqwest::Method::POST,
            &format!("environments/{}/databases/{}/backups", env, database),
            json!({}),
        )
        .await
    }

    async fn redirect_location(&self, href: &str) -> Result<String> {
        let resp = self
            .no_redirect
            .get(href)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_redirection() {
            http::ensure_success(SERVICE, resp).await?;
            return Err(ApiError::UnexpectedResponse {
                service: SERVICE,
                message: format!("expected a redirect from {}, got {}", href, status),
            });
        }

        resp.headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ApiError::UnexpectedResponse {
                service: SERVICE,
                message: format!("redirect from {} has no Location header", href),
            })
    }
}
