//! Multi-origin JSON fetcher. Candidate origins are tried in order until one
//! produces an HTTP success with a JSON content type; the first winner
//! short-circuits the rest. On total failure the last attempt's error
//! surfaces, rewritten into a proxy-mapping hint on the restricted webview
//! host where a bare network error is not actionable.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use activity_core::origin::HostContext;

/// Error bodies are often whole HTML error pages; keep diagnostics short.
const ERROR_BODY_LIMIT: usize = 180;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("non-JSON response ({content_type}) from {url}")]
    ContentType { content_type: String, url: String },
    #[error("invalid JSON payload: {0}")]
    Decode(String),
    #[error("{0}")]
    ProxyMapping(String),
}

pub type Outcome<T> = Result<T, FetchError>;

pub struct ResilientFetcher {
    client: Client,
    origins: Vec<String>,
    self_origin: String,
    restricted_host: bool,
}

impl ResilientFetcher {
    /// `origins` is the resolved candidate list; `""` entries are resolved
    /// against the host context's own origin. The list is fixed for the
    /// session lifetime.
    pub fn new(host: &HostContext, origins: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            origins,
            self_origin: host.origin(),
            restricted_host: host.is_activity_webview(),
        }
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Outcome<T> {
        self.execute(path, None::<&()>).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Outcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(path, Some(body)).await
    }

    /// POST with the default empty JSON object body.
    pub async fn post_json_empty<T: DeserializeOwned>(&self, path: &str) -> Outcome<T> {
        self.post_json(path, &json!({})).await
    }

    async fn execute<T, B>(&self, path: &str, body: Option<&B>) -> Outcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut last_error = FetchError::Transport("no origin candidates".to_string());
        for origin in &self.origins {
            let url = self.url_for(origin, path);
            match self.attempt(&url, body).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!(%url, error = %err, "origin candidate failed");
                    last_error = err;
                }
            }
        }
        if self.restricted_host {
            warn!(error = %last_error, "all origin candidates failed on the activity host");
            return Err(FetchError::ProxyMapping(format!(
                "request to {path} failed: {last_error}. The activity webview cannot reach the \
                 backend directly; add a URL mapping so that /api routes to the bot's web server."
            )));
        }
        Err(last_error)
    }

    async fn attempt<T, B>(&self, url: &str, body: Option<&B>) -> Outcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = match body {
            None => self.client.get(url),
            Some(body) => self.client.post(url).json(body),
        };
        let response = request
            .header(CACHE_CONTROL, "no-store")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        if !content_type.contains("application/json") {
            return Err(FetchError::ContentType {
                content_type,
                url: url.to_string(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn url_for(&self, origin: &str, path: &str) -> String {
        if origin.is_empty() {
            format!("{}{}", self.self_origin, path)
        } else {
            format!("{origin}{path}")
        }
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_LIMIT {
        trimmed.to_string()
    } else {
        trimmed.chars().take(ERROR_BODY_LIMIT).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_caps_long_bodies() {
        let long = "x".repeat(500);
        assert_eq!(truncate_body(&long).chars().count(), ERROR_BODY_LIMIT);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn empty_origin_resolves_against_self() {
        let host = HostContext::new("https:", "dash.example.com");
        let fetcher = ResilientFetcher::new(&host, vec![String::new()]);
        assert_eq!(
            fetcher.url_for("", "/api/stocks"),
            "https://dash.example.com/api/stocks"
        );
        assert_eq!(
            fetcher.url_for("https://api.example.com", "/api/stocks"),
            "https://api.example.com/api/stocks"
        );
    }
}
