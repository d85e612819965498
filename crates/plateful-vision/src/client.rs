//! HTTP client for the image → cuisine classification service.
//!
//! Wraps `reqwest` around a `generateContent`-style vision REST endpoint:
//! the image is sent inline (base64) together with a fixed labeling prompt,
//! and the first candidate's text is returned as the cuisine label.
//! Transient failures are retried with capped exponential back-off;
//! API-level rejections surface as [`VisionError::Api`].

use std::time::Duration;

use base64::Engine as _;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::VisionError;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const CUISINE_PROMPT: &str =
    "Identify the type of Cuisine in this picture. Just Cuisine name. nothing else is required";

/// Client for the vision classification API.
///
/// Use [`VisionClient::new`] for production or
/// [`VisionClient::with_base_url`] to point at a mock server in tests.
pub struct VisionClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl VisionClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, VisionError> {
        Self::with_base_url(
            api_key,
            model,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VisionError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("plateful/0.1 (cuisine-classification)")
            .build()?;

        // Normalise: a trailing slash makes Url::join treat the base as a
        // directory instead of replacing its last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| VisionError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Classify the cuisine shown in an image.
    ///
    /// Sends the image inline with the labeling prompt and returns the
    /// whitespace-trimmed label from the first candidate.
    ///
    /// # Errors
    ///
    /// - [`VisionError::Api`] if the service rejects the request.
    /// - [`VisionError::Http`] on network failure or 5xx (retried first).
    /// - [`VisionError::Deserialize`] if the response shape is unexpected.
    /// - [`VisionError::EmptyResponse`] if no candidate text comes back.
    pub async fn classify_cuisine(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, VisionError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": mime_type, "data": encoded } },
                    { "text": CUISINE_PROMPT },
                ]
            }]
        });

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.generate_content(&body)
        })
        .await
    }

    async fn generate_content(&self, body: &serde_json::Value) -> Result<String, VisionError> {
        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| VisionError::Api(format!("invalid model path: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let resp = self.client.post(url).json(body).send().await?;

        if let Err(e) = resp.error_for_status_ref() {
            if resp.status().is_server_error() {
                // Let the retry layer classify 5xx as transient.
                return Err(VisionError::Http(e));
            }
            let error_body = resp
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            let message = error_body["error"]["message"]
                .as_str()
                .unwrap_or("request rejected")
                .to_owned();
            return Err(VisionError::Api(message));
        }

        let raw: serde_json::Value = resp.json().await?;
        let envelope: GenerateContentResponse =
            serde_json::from_value(raw).map_err(|e| VisionError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;

        let label = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(VisionError::EmptyResponse)?;

        Ok(label)
    }
}
