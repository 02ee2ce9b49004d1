//! JSON API payloads.
//!
//! Not intended to be used directly. Provided to aid debugging.

use std::fmt;

use serde::{Deserialize, Serialize};

mod authorization;
mod certificate;
mod challenge;
mod directory;
mod registration;

pub use self::{
    authorization::{Authorization, AuthorizationStatus, Identifier, NewAuthorization},
    certificate::NewCertificate,
    challenge::{Challenge, ChallengeResponse, ChallengeStatus},
    directory::Resources,
    registration::{FetchRegistration, NewRegistration, Registration, UpdateAgreement},
};

/// A structured JSON error body returned by the server on failure.
///
/// See [RFC 7807](https://datatracker.ietf.org/doc/html/rfc7807).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub _type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self._type),
            _ => write!(f, "{}", self._type),
        }
    }
}
