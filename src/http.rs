// ABOUTME: Shared HTTP plumbing for the external API clients.
// ABOUTME: Builds reqwest clients and turns non-2xx responses into ApiError.

use std::time::Duration;

/// Errors from any external REST API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{service} API responded with status {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("unexpected {service} API response: {message}")]
    UnexpectedResponse {
        service: &'static str,
        message: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

const USER_AGENT: &str = concat!("harbormaster/", env!("CARGO_PKG_VERSION"));

/// Build a client with the crate's user agent and request timeout.
pub fn client(follow_redirects: bool) -> Result<reqwest::Client> {
    let policy = if follow_redirects {
        reqwest::redirect::Policy::default()
    } else {
        reqwest::redirect::Policy::none()
    };
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(60))
        .redirect(policy)
        .build()?;
    Ok(client)
}

/// Pass 2xx responses through; anything else becomes `ApiError::Api`.
pub async fn ensure_success(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    tracing::debug!("{} {} -> {}", service, resp.url(), status);
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Api {
        service,
        status: status.as_u16(),
        message: body,
    })
}
