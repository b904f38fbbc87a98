//! reqwest-based client for the note backend.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::api::types::{Category, Topic, TopicNotes};
use crate::session::MAIN_BODY;

/// Errors from backend requests.
///
/// Every variant maps to a `[code] message` alert at the call site; nothing
/// here is retried automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no response from server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server error {code}: {message}")]
    Status { code: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    /// Status code for alert display. Transport and decode failures surface
    /// as 500, matching the "No response from server" fallback.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Status { code, .. } => *code,
            ApiError::Transport(_) | ApiError::Decode(_) => 500,
        }
    }

    /// User-facing message for alert display.
    pub fn message(&self) -> String {
        match self {
            ApiError::Transport(_) => "No response from server".to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) => "Unknown error".to_string(),
        }
    }
}

/// The backend's `message` field is a plain string on some routes and an
/// array of strings on validation failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Messages {
    One(String),
    Many(Vec<String>),
}

impl Messages {
    /// First message, the one shown to the user.
    pub fn first(&self) -> Option<&str> {
        match self {
            Messages::One(s) => Some(s.as_str()),
            Messages::Many(v) => v.first().map(String::as_str),
        }
    }
}

/// Response envelope wrapping every backend payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct Envelope<T> {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    message: Option<Messages>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn first_message(&self) -> String {
        self.message
            .as_ref()
            .and_then(Messages::first)
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Success acknowledgement from a mutation, carried into the status alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub code: u16,
    pub message: String,
}

#[derive(Serialize)]
struct NamePayload<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct TitlePayload<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct ContentPayload<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct LoginPayload<'a> {
    username: &'a str,
    password: &'a str,
}

/// HTTP client holding the base URL and the cookie jar that carries the
/// backend's admin session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Decode("server URL cannot be a base".to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and unwraps the envelope, returning the payload only
    /// when the envelope reports success AND carries data.
    async fn execute<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let env = self.execute_raw::<T>(req).await?;
        match env.data {
            Some(data) => Ok(data),
            None => Err(ApiError::Status {
                code: env.status_code.unwrap_or(500),
                message: env.first_message(),
            }),
        }
    }

    /// Sends a mutation and returns the server's acknowledgement message.
    async fn execute_ack(&self, req: reqwest::RequestBuilder) -> Result<Ack, ApiError> {
        let env = self.execute_raw::<serde_json::Value>(req).await?;
        Ok(Ack {
            code: env.status_code.unwrap_or(200),
            message: env.first_message(),
        })
    }

    async fn execute_raw<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = req.send().await?;
        let http_status = response.status();
        let body = response.bytes().await?;

        let env: Envelope<T> = serde_json::from_slice(&body).map_err(|e| {
            if http_status.is_success() {
                ApiError::Decode(e.to_string())
            } else {
                ApiError::Status {
                    code: http_status.as_u16(),
                    message: http_status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string(),
                }
            }
        })?;

        let code = env.status_code.unwrap_or(http_status.as_u16());
        if !http_status.is_success() || !(200..300).contains(&code) {
            return Err(ApiError::Status {
                code,
                message: env.first_message(),
            });
        }
        Ok(env)
    }

    // --- Categories -------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint(&["categories"])?;
        debug!(%url, "fetching categories");
        self.execute(self.http.get(url)).await
    }

    pub async fn create_category(&self, name: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["categories"])?;
        self.execute_ack(self.http.post(url).json(&NamePayload { name }))
            .await
    }

    pub async fn update_category(&self, id: &str, name: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["categories", id])?;
        self.execute_ack(self.http.put(url).json(&NamePayload { name }))
            .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["categories", id])?;
        self.execute_ack(self.http.delete(url)).await
    }

    // --- Topics -----------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn fetch_topics(&self, category_id: &str) -> Result<Vec<Topic>, ApiError> {
        let url = self.endpoint(&["categories", category_id, "topics"])?;
        debug!(%url, "fetching topics");
        self.execute(self.http.get(url)).await
    }

    /// Fetches a topic's notes with its neighbor links.
    ///
    /// An empty or sentinel id means "no topic selected" and returns
    /// `Ok(None)` without touching the network.
    #[instrument(skip(self))]
    pub async fn fetch_topic_notes(
        &self,
        category_id: &str,
        topic_id: &str,
    ) -> Result<Option<TopicNotes>, ApiError> {
        if topic_id.is_empty() || topic_id == MAIN_BODY {
            return Ok(None);
        }
        let url = self.endpoint(&["categories", category_id, "topics", topic_id])?;
        debug!(%url, "fetching topic notes");
        let notes: TopicNotes = self.execute(self.http.get(url)).await?;
        Ok(Some(notes))
    }

    pub async fn create_topic(&self, category_id: &str, title: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["categories", category_id, "topics"])?;
        self.execute_ack(self.http.post(url).json(&TitlePayload { title }))
            .await
    }

    pub async fn update_topic(
        &self,
        category_id: &str,
        id: &str,
        title: &str,
    ) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["categories", category_id, "topics", id])?;
        self.execute_ack(self.http.put(url).json(&TitlePayload { title }))
            .await
    }

    pub async fn update_topic_notes(
        &self,
        category_id: &str,
        id: &str,
        content: &str,
    ) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["categories", category_id, "topics", id, "notes"])?;
        self.execute_ack(self.http.put(url).json(&ContentPayload { content }))
            .await
    }

    pub async fn delete_topic(&self, category_id: &str, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["categories", category_id, "topics", id])?;
        self.execute_ack(self.http.delete(url)).await
    }

    // --- Admin session ----------------------------------------------------

    /// Logs in as the fixed `admin` user. The session cookie set by the
    /// backend authorizes subsequent mutations.
    pub async fn admin_login(&self, password: &SecretString) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["users", "admin", "login"])?;
        self.execute_ack(self.http.post(url).json(&LoginPayload {
            username: "admin",
            password: password.expose_secret(),
        }))
        .await
    }

    pub async fn admin_logout(&self) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["users", "admin", "logout"])?;
        self.execute_ack(self.http.post(url)).await
    }

    // --- Topic helpers ----------------------------------------------------

    /// Title of a topic, empty for the sentinel/unset id.
    pub async fn fetch_topic_title(
        &self,
        category_id: &str,
        topic_id: &str,
    ) -> Result<String, ApiError> {
        match self.fetch_topic_notes(category_id, topic_id).await? {
            Some(notes) => Ok(notes.current.title),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages_first_from_string() {
        let m: Messages = serde_json::from_str("\"saved\"").unwrap();
        assert_eq!(m.first(), Some("saved"));
    }

    #[test]
    fn test_messages_first_from_array() {
        let m: Messages = serde_json::from_str("[\"bad name\", \"too long\"]").unwrap();
        assert_eq!(m.first(), Some("bad name"));
    }

    #[test]
    fn test_messages_empty_array() {
        let m: Messages = serde_json::from_str("[]").unwrap();
        assert_eq!(m.first(), None);
    }

    #[test]
    fn test_envelope_parses_without_data() {
        let env: Envelope<Vec<Category>> =
            serde_json::from_str(r#"{"statusCode": 404, "message": ["not found"]}"#).unwrap();
        assert_eq!(env.status_code, Some(404));
        assert_eq!(env.first_message(), "not found");
        assert!(env.data.is_none());
    }

    #[test]
    fn test_endpoint_builds_nested_path() {
        let client = ApiClient::new(
            Url::parse("http://localhost:5000").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        let url = client
            .endpoint(&["categories", "c1", "topics", "t1", "notes"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/categories/c1/topics/t1/notes");
    }
}
