use thiserror::Error;

/// Errors from [`crate::RouteOptimizer`] implementations and from
/// [`crate::reconstruct_route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimizeError {
    /// The path had fewer than two waypoints, so there is nothing to route.
    #[error("at least two waypoints are required")]
    EmptyInput,
    /// The request could not reach the provider.
    #[error("network error calling {url}: {message}")]
    NetworkError {
        /// Request URL, with credentials removed.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The provider did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL, with credentials removed.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Request URL, with credentials removed.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The provider reported a routing failure in its response body.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Provider error code or status.
        code: String,
        /// Provider error description.
        message: String,
    },
    /// The response body was not valid JSON of the expected shape.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },
    /// The response parsed but contradicts the submitted path.
    #[error("malformed routing response: {message}")]
    MalformedResponse {
        /// What was inconsistent.
        message: String,
    },
    /// A batch response had no item for this request.
    #[error("batch response has no item for request {index}")]
    MissingBatchItem {
        /// Position of the request in the caller's request slice.
        index: usize,
    },
}
