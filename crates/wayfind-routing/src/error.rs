use thiserror::Error;

/// Errors returned by the routing service client.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The routing service returned an error envelope.
    #[error("routing API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A structurally valid response carried no usable routes/polygons.
    #[error("empty response: {0}")]
    EmptyResponse(String),
}
