use reqwest::StatusCode;

use crate::trans::Body;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes of the protocol engine.
///
/// Every engine operation either returns a well-formed result or fails with one of these. The
/// engine performs no silent retries; the polling loop in
/// [`Client::poll_authorization`](crate::Client::poll_authorization) is the only form of waiting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure. Not retried by the engine.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The directory root fetch did not return success.
    #[error("directory fetch failed with status {status}: {body}")]
    Directory { status: StatusCode, body: String },

    /// The fetched directory has no endpoint for the requested resource name.
    #[error("directory has no endpoint for resource {0:?}")]
    UnknownResource(String),

    /// The account key could not be parsed or the signature could not be produced.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The server offered no challenge type we can satisfy.
    #[error("no dns-01 challenge offered, got: {}", offered.join(", "))]
    UnsupportedChallenge { offered: Vec<String> },

    /// Unexpected status code at a protocol step, with the decoded body for diagnostics.
    #[error("unexpected status {status} from {url}")]
    Protocol {
        url: String,
        status: StatusCode,
        body: Box<Body>,
    },

    /// A response that should carry a `Replay-Nonce` header did not.
    #[error("response carried no Replay-Nonce header")]
    MissingNonce,

    /// External cancellation of a poll, e.g. a caller-imposed deadline.
    #[error("cancelled")]
    Cancelled,

    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timestamp formatting: {0}")]
    Time(#[from] time::error::Format),
}
