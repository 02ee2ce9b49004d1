use serde::{Deserialize, Serialize};

use crate::api;

/// The name an authorization vouches for.
///
/// The engine only ever asks for `dns` identifiers, but the server echoes this back verbatim so
/// other types can appear in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub _type: String,
    pub value: String,
}

impl Identifier {
    pub(crate) fn dns(domain: &str) -> Identifier {
        Identifier {
            _type: "dns".to_owned(),
            value: domain.to_owned(),
        }
    }

    pub fn is_dns(&self) -> bool {
        self._type == "dns"
    }
}

/// Payload for creating a new authorization against the `new-authz` resource.
#[derive(Debug, Clone, Serialize)]
pub struct NewAuthorization {
    resource: &'static str,
    identifier: Identifier,
}

impl NewAuthorization {
    pub(crate) fn dns(domain: &str) -> Self {
        NewAuthorization {
            resource: "new-authz",
            identifier: Identifier::dns(domain),
        }
    }
}

/// The status of an [`api::Authorization`].
///
/// Only `pending` triggers further engine action; every other value is terminal from the engine's
/// perspective and is left to the caller to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Pending,
    Valid,
    Invalid,
    Revoked,
    Deactivated,
}

/// A domain-validation attempt, holding the challenges the server offers.
///
/// # Example JSON
///
/// ```json
/// {
///   "identifier": { "type": "dns", "value": "example.com" },
///   "status": "pending",
///   "expires": "2016-05-08T12:00:00Z",
///   "challenges": [
///     {
///       "type": "dns-01",
///       "status": "pending",
///       "uri": "https://example.com/acme/challenge/asdf/0",
///       "token": "DGyRejmCefe7v4NfDGDKfA"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub identifier: Identifier,

    pub status: AuthorizationStatus,

    /// The timestamp after which the server considers this authorization invalid.
    ///
    /// Uses RFC 3339 format.
    pub expires: Option<String>,

    /// The challenges the client can fulfill to prove control of the identifier.
    #[serde(default)]
    pub challenges: Vec<api::Challenge>,
}

impl Authorization {
    pub fn is_pending(&self) -> bool {
        matches!(self.status, AuthorizationStatus::Pending)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.status, AuthorizationStatus::Valid)
    }
}
