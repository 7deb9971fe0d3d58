use std::collections::HashMap;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ApiConfig;
use crate::error::{QueueError, Result};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const TOKEN_ENV: &str = "GIST_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// A remote versioned document: one gist holding the files of a single queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "html_url", default)]
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub files: HashMap<String, DocumentFile>,
}

/// Storage seam for queue documents. The remote contract is whole-document
/// read/replace only: `update_document` is a blind overwrite with no
/// compare-and-swap, which is why callers layer conflict detection on top.
pub trait DocumentStore: Send + Sync {
    fn list_documents(&self) -> Result<Vec<Document>>;

    /// `Ok(None)` when no document with this id exists.
    fn get_document(&self, id: &str) -> Result<Option<Document>>;

    fn create_document(
        &self,
        description: &str,
        filename: &str,
        content: &str,
        public: bool,
    ) -> Result<Document>;

    fn update_document(&self, id: &str, filename: &str, content: &str) -> Result<Document>;

    /// Content of one file of a document, or `Ok(None)` when the file is
    /// absent. Implementations may need a follow-up fetch when the content
    /// is not inlined.
    fn file_content(&self, document: &Document, filename: &str) -> Result<Option<String>>;
}

/// GitHub Gists client. Transport retry (network errors, rate limiting) lives
/// here and is independent of the conflict-retry loop above it.
pub struct GistClient {
    http: Client,
    base_url: String,
    retry_count: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for GistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GistClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GistClient {
    pub fn new(token: &str, config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|err| QueueError::Auth(format!("invalid {TOKEN_ENV}: {err}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("gistq"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_count: config.retry_count.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// Build a client from `GIST_TOKEN`. A missing token is a startup error,
    /// not something callers can recover from later.
    pub fn from_env(config: &ApiConfig) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                QueueError::Auth(format!(
                    "GitHub token not found, set the {TOKEN_ENV} environment variable"
                ))
            })?;
        Self::new(&token, config)
    }

    /// Login of the authenticated user; used to validate the token.
    pub fn authenticated_user(&self) -> Result<String> {
        let url = format!("{}/user", self.base_url);
        let response = self.send_with_retry(|| self.http.get(&url))?;
        let response = Self::check_status(response, "user lookup")?;
        let value = response.json::<serde_json::Value>()?;
        value
            .get("login")
            .and_then(|login| login.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| QueueError::Storage("user lookup returned no login".to_string()))
    }

    fn send_with_retry(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut last_err: Option<QueueError> = None;

        for attempt in 0..self.retry_count {
            if attempt > 0 {
                thread::sleep(self.retry_delay * attempt);
            }

            match build().send() {
                Ok(response) => {
                    if response.status() == StatusCode::FORBIDDEN && is_rate_limited(&response) {
                        wait_for_rate_limit(&response, self.retry_delay * (attempt + 1));
                        last_err = Some(QueueError::Storage("rate limited".to_string()));
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => last_err = Some(QueueError::Http(err)),
            }
        }

        Err(last_err
            .unwrap_or_else(|| QueueError::Storage("request failed with no attempts".to_string())))
    }

    fn check_status(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(match status {
            StatusCode::NOT_FOUND => QueueError::NotFound(context.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                QueueError::Auth(format!("{context} failed with status {status}"))
            }
            _ => QueueError::Storage(format!("{context} failed with status {status}")),
        })
    }
}

impl DocumentStore for GistClient {
    fn list_documents(&self) -> Result<Vec<Document>> {
        let url = format!("{}/gists", self.base_url);
        let response = self.send_with_retry(|| self.http.get(&url))?;
        let response = Self::check_status(response, "gist listing")?;
        Ok(response.json::<Vec<Document>>()?)
    }

    fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let url = format!("{}/gists/{id}", self.base_url);
        let response = self.send_with_retry(|| self.http.get(&url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response, "gist lookup")?;
        Ok(Some(response.json::<Document>()?))
    }

    fn create_document(
        &self,
        description: &str,
        filename: &str,
        content: &str,
        public: bool,
    ) -> Result<Document> {
        let url = format!("{}/gists", self.base_url);
        let body = json!({
            "description": description,
            "public": public,
            "files": { filename: { "content": content } }
        });
        let response = self.send_with_retry(|| self.http.post(&url).json(&body))?;
        let response = Self::check_status(response, "gist create")?;
        Ok(response.json::<Document>()?)
    }

    fn update_document(&self, id: &str, filename: &str, content: &str) -> Result<Document> {
        let url = format!("{}/gists/{id}", self.base_url);
        let body = json!({
            "files": { filename: { "content": content } }
        });
        let response = self.send_with_retry(|| self.http.patch(&url).json(&body))?;
        let response = Self::check_status(response, "gist update")?;
        Ok(response.json::<Document>()?)
    }

    fn file_content(&self, document: &Document, filename: &str) -> Result<Option<String>> {
        let Some(file) = document.files.get(filename) else {
            return Ok(None);
        };
        if let Some(content) = &file.content {
            return Ok(Some(content.clone()));
        }
        // Large files are not inlined in the gist payload; fall back to the
        // raw endpoint.
        let Some(raw_url) = &file.raw_url else {
            return Ok(None);
        };
        let response = self.send_with_retry(|| self.http.get(raw_url))?;
        let response = Self::check_status(response, "raw content fetch")?;
        Ok(Some(response.text()?))
    }
}

fn is_rate_limited(response: &Response) -> bool {
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim() == "0")
}

fn wait_for_rate_limit(response: &Response, fallback: Duration) {
    let reset = response
        .headers()
        .get("x-ratelimit-reset")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    let wait = match reset {
        Some(reset_epoch) => {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0);
            Duration::from_secs(reset_epoch.saturating_sub(now) + 1)
        }
        None => fallback,
    };
    thread::sleep(wait);
}
