use serde::{Deserialize, Serialize};

use crate::api;

/// The status of an [`api::Challenge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Pending,
    Processing,
    Valid,
    Invalid,
}

/// A server-offered challenge descriptor.
///
/// # Example JSON
///
/// ```json
/// {
///   "type": "dns-01",
///   "status": "pending",
///   "uri": "https://example.com/acme/challenge/asdf/0",
///   "token": "DGyRejmCefe7v4NfDGDKfA"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Type tag, e.g. `dns-01` or `http-01`.
    #[serde(rename = "type")]
    pub _type: String,

    pub status: ChallengeStatus,

    /// URI the challenge response is POSTed to.
    pub uri: String,

    pub token: String,

    /// Set by the server once the response has been submitted.
    #[serde(rename = "keyAuthorization")]
    pub key_authorization: Option<String>,

    /// Error that occurred while the server was validating the challenge, if any.
    pub error: Option<api::Problem>,
}

/// Payload telling the server to begin validating a challenge.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeResponse {
    resource: &'static str,
    #[serde(rename = "type")]
    _type: String,
    #[serde(rename = "keyAuthorization")]
    key_authorization: String,
}

impl ChallengeResponse {
    pub(crate) fn new(_type: &str, key_authorization: &str) -> Self {
        ChallengeResponse {
            resource: "challenge",
            _type: _type.to_owned(),
            key_authorization: key_authorization.to_owned(),
        }
    }
}
