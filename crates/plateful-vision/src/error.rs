use thiserror::Error;

/// Errors returned by the cuisine classification client.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The vision API returned an error body with a message.
    #[error("vision API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered successfully but produced no usable label.
    #[error("vision API returned no candidates")]
    EmptyResponse,
}
