use thiserror::Error;

/// Errors from the LLM collaborator client.
///
/// Classification itself never fails — any of these downgrades the pipeline
/// to the rule-based stage.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inference service returned an error envelope.
    #[error("LLM API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The reply carried no usable text or no parsable JSON object.
    #[error("unusable LLM reply: {0}")]
    UnusableReply(String),
}
